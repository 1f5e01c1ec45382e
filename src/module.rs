use crate::{DynSvc, Implementation, Lifetime, Parameters};
use std::fmt::{Debug, Formatter};

/// A registration waiting to be applied to a [`Locator`](crate::Locator).
pub(crate) enum Registration {
    Constructed {
        type_name: String,
        implementation: Implementation,
        parameters: Parameters,
        lifetime: Lifetime,
    },
    Instance {
        type_name: String,
        instance: DynSvc,
    },
}

impl Registration {
    pub fn type_name(&self) -> &str {
        match self {
            Registration::Constructed { type_name, .. }
            | Registration::Instance { type_name, .. } => type_name,
        }
    }
}

impl Debug for Registration {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Registration::Constructed {
                type_name,
                implementation,
                lifetime,
                ..
            } => f
                .debug_struct("Constructed")
                .field("type_name", type_name)
                .field("implementation", implementation)
                .field("lifetime", lifetime)
                .finish_non_exhaustive(),
            Registration::Instance { type_name, .. } => f
                .debug_struct("Instance")
                .field("type_name", type_name)
                .finish_non_exhaustive(),
        }
    }
}

/// A collection of registrations that can be added all at once to a
/// [`Locator`](crate::Locator). Modules can be used to group together related
/// services and configure the locator in pieces rather than all at once.
///
/// Nothing is validated until the module is added. If any registration in
/// the module is invalid, none of them are applied.
///
/// ```
/// use runtime_locator::{Implementation, Locator, Module, Signature, Svc};
///
/// let mut module = Module::new();
/// module.register_instance("greeting", Svc::new("hello".to_string()));
/// module.register_singleton(
///     "shout",
///     Implementation::factory(
///         Signature::source("function (§greeting) {}"),
///         |args| Ok(args.service::<String>(0)?.to_uppercase()),
///     ),
/// );
///
/// let mut locator = Locator::new();
/// locator.add_module(module).unwrap();
///
/// assert_eq!("HELLO", *locator.get::<String>("shout").unwrap());
/// ```
#[derive(Debug, Default)]
pub struct Module {
    pub(crate) registrations: Vec<Registration>,
}

impl Module {
    /// Creates an empty module.
    #[must_use]
    pub fn new() -> Self {
        Module::default()
    }

    /// Registers a transient implementation without literal parameters.
    pub fn register(&mut self, type_name: &str, implementation: Implementation) {
        self.register_with(
            type_name,
            implementation,
            Parameters::new(),
            Lifetime::Transient,
        );
    }

    /// Registers a singleton implementation without literal parameters.
    pub fn register_singleton(
        &mut self,
        type_name: &str,
        implementation: Implementation,
    ) {
        self.register_with(
            type_name,
            implementation,
            Parameters::new(),
            Lifetime::Singleton,
        );
    }

    /// Registers an implementation with literal parameters and a lifetime.
    pub fn register_with(
        &mut self,
        type_name: &str,
        implementation: Implementation,
        parameters: Parameters,
        lifetime: Lifetime,
    ) {
        self.registrations.push(Registration::Constructed {
            type_name: type_name.to_owned(),
            implementation,
            parameters,
            lifetime,
        });
    }

    /// Registers an instance that has already been built.
    pub fn register_instance(&mut self, type_name: &str, instance: DynSvc) {
        self.registrations.push(Registration::Instance {
            type_name: type_name.to_owned(),
            instance,
        });
    }

    /// The number of pending registrations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    /// Whether the module has no registrations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }
}
