use crate::{
    downcast_service, DynSvc, InjectError, InjectResult, Parameter,
    ResolutionPath, Service, Svc,
};
use std::fmt::{Debug, Formatter};

/// A single resolved constructor argument.
pub enum Argument {
    /// A dependency resolved from the locator.
    Service(DynSvc),
    /// A literal value from the registration's parameters.
    Value(Box<dyn Parameter>),
    /// A literal parameter with no value configured.
    Missing,
}

impl Debug for Argument {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Argument::Service(_) => f.write_str("Service(..)"),
            Argument::Value(value) => {
                f.debug_tuple("Value").field(value).finish()
            }
            Argument::Missing => f.write_str("Missing"),
        }
    }
}

/// The ordered arguments passed to a constructor, one per declared
/// parameter.
///
/// ```
/// use runtime_locator::{
///     Implementation, Locator, Parameters, Signature, Svc,
/// };
///
/// struct Greeter(String);
///
/// let mut locator = Locator::new();
/// locator.register_instance("name", Svc::new("world".to_string())).unwrap();
///
/// let greeter = Implementation::factory(
///     Signature::parameters(["§name", "greeting"]),
///     |args| {
///         let name = args.service::<String>(0)?;
///         let greeting: Option<String> = args.value(1)?;
///         let greeting = greeting.unwrap_or_else(|| "hello".to_string());
///         Ok(Greeter(format!("{greeting}, {name}")))
///     },
/// );
///
/// let greeter = locator.resolve_instance(&greeter, &Parameters::new()).unwrap();
/// let greeter = runtime_locator::downcast_service::<Greeter>(greeter).ok().unwrap();
/// assert_eq!("hello, world", greeter.0);
/// ```
#[derive(Debug)]
pub struct Arguments {
    entries: Vec<(String, Argument)>,
    path: ResolutionPath,
}

impl Arguments {
    pub(crate) fn new(path: ResolutionPath) -> Self {
        Arguments {
            entries: Vec::new(),
            path,
        }
    }

    pub(crate) fn push(&mut self, name: String, argument: Argument) {
        self.entries.push((name, argument));
    }

    /// The number of arguments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the constructor declared no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The declared parameter names, in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Gets the argument at the given position.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Argument> {
        self.entries.get(index).map(|(_, argument)| argument)
    }

    /// Gets the argument for the given parameter name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&Argument> {
        self.entries
            .iter()
            .find(|(parameter, _)| parameter == name)
            .map(|(_, argument)| argument)
    }

    /// The resolution path of the service being constructed. Empty for
    /// one-shot constructions.
    #[must_use]
    pub fn path(&self) -> &ResolutionPath {
        &self.path
    }

    /// Gets the dependency at the given position as a `T`.
    pub fn service<T: Service>(&self, index: usize) -> InjectResult<Svc<T>> {
        let expected = std::any::type_name::<T>();
        let (name, argument) = self.entry(index, expected)?;
        match argument {
            Argument::Service(service) => downcast_service(service.clone())
                .map_err(|_| invalid_argument(name, expected)),
            _ => Err(invalid_argument(name, expected)),
        }
    }

    /// Gets the literal value at the given position as a `T`. A parameter
    /// with no configured value yields `None`.
    pub fn value<T: Parameter + Clone>(
        &self,
        index: usize,
    ) -> InjectResult<Option<T>> {
        let expected = std::any::type_name::<T>();
        let (name, argument) = self.entry(index, expected)?;
        match argument {
            Argument::Value(value) => value
                .downcast_ref::<T>()
                .cloned()
                .map(Some)
                .ok_or_else(|| invalid_argument(name, expected)),
            Argument::Missing => Ok(None),
            Argument::Service(_) => Err(invalid_argument(name, expected)),
        }
    }

    fn entry(
        &self,
        index: usize,
        expected: &'static str,
    ) -> InjectResult<(&str, &Argument)> {
        self.entries
            .get(index)
            .map(|(name, argument)| (name.as_str(), argument))
            .ok_or_else(|| invalid_argument(&format!("#{index}"), expected))
    }
}

fn invalid_argument(parameter: &str, expected: &'static str) -> InjectError {
    InjectError::InvalidArgument {
        parameter: parameter.to_owned(),
        expected,
    }
}
