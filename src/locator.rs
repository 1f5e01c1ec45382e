use crate::{
    downcast_service, Argument, Arguments, Constructor, Descriptor, DynSvc,
    Implementation, InjectError, InjectResult, Lifetime, Module, Parameters,
    Registration, Registry, ResolutionPath, Service, Svc, Syntax,
};
use tracing::{debug, trace};

/// A runtime service locator. This holds every registration made under each
/// type name, most recently registered first, and resolves instances by
/// recursively resolving the dependencies each constructor declares.
///
/// Parameters whose names start with the dependency sigil (`§` by default)
/// are resolved from the locator by the rest of their name. Any other
/// parameter is looked up in the literal [`Parameters`] given at
/// registration.
///
/// Each locator owns its registrations. Independent locators never share
/// state.
///
/// ```
/// use runtime_locator::{
///     Implementation, Lifetime, Locator, Parameters, Signature, Svc,
/// };
///
/// struct Logger {
///     prefix: String,
/// }
///
/// struct Service {
///     logger: Svc<Logger>,
/// }
///
/// let mut locator = Locator::new();
/// locator
///     .register_with(
///         "logger",
///         Implementation::factory(
///             Signature::source("function (prefix) {}"),
///             |args| {
///                 let prefix = args.value::<String>(0)?.unwrap_or_default();
///                 Ok(Logger { prefix })
///             },
///         ),
///         Parameters::new().with("prefix", "[app]".to_string()),
///         Lifetime::Singleton,
///     )
///     .unwrap();
/// locator
///     .register(
///         "service",
///         Implementation::factory(
///             Signature::source("function Service(§logger) {}"),
///             |args| Ok(Service { logger: args.service(0)? }),
///         ),
///     )
///     .unwrap();
///
/// let service = locator.get::<Service>("service").unwrap();
/// let logger = locator.get::<Logger>("logger").unwrap();
/// assert_eq!("[app]", service.logger.prefix);
/// assert!(Svc::ptr_eq(&service.logger, &logger));
/// ```
#[derive(Debug, Default)]
pub struct Locator {
    registry: Registry,
    syntax: Syntax,
}

impl Locator {
    /// Creates an empty locator using the default [`Syntax`].
    #[must_use]
    pub fn new() -> Self {
        Locator::default()
    }

    /// Creates an empty locator which reads signatures and dependency names
    /// using the given syntax.
    #[must_use]
    pub fn with_syntax(syntax: Syntax) -> Self {
        Locator {
            registry: Registry::default(),
            syntax,
        }
    }

    /// The syntax used to read signatures and dependency names.
    #[must_use]
    pub fn syntax(&self) -> &Syntax {
        &self.syntax
    }

    /// Registers a transient implementation without literal parameters.
    pub fn register(
        &mut self,
        type_name: &str,
        implementation: Implementation,
    ) -> InjectResult<()> {
        self.register_with(
            type_name,
            implementation,
            Parameters::new(),
            Lifetime::Transient,
        )
    }

    /// Registers a singleton implementation without literal parameters.
    pub fn register_singleton(
        &mut self,
        type_name: &str,
        implementation: Implementation,
    ) -> InjectResult<()> {
        self.register_with(
            type_name,
            implementation,
            Parameters::new(),
            Lifetime::Singleton,
        )
    }

    /// Registers an implementation under a type name. The implementation's
    /// parameter names are read once, here, and fixed for the lifetime of the
    /// registration. Earlier registrations for the same type name are kept
    /// but shadowed by this one.
    pub fn register_with(
        &mut self,
        type_name: &str,
        implementation: Implementation,
        parameters: Parameters,
        lifetime: Lifetime,
    ) -> InjectResult<()> {
        let registration = Registration::Constructed {
            type_name: type_name.to_owned(),
            implementation,
            parameters,
            lifetime,
        };
        validate(&registration)?;
        self.apply(registration);
        Ok(())
    }

    /// Registers an instance that has already been built. Requests for the
    /// type name return this exact instance until it is shadowed by a newer
    /// registration.
    ///
    /// ```
    /// use runtime_locator::{Locator, Svc};
    ///
    /// let mut locator = Locator::new();
    /// let first = Svc::new(1_i32);
    /// let second = Svc::new(2_i32);
    /// locator.register_instance("n", first.clone()).unwrap();
    /// locator.register_instance("n", second.clone()).unwrap();
    ///
    /// assert!(Svc::ptr_eq(&second, &locator.get::<i32>("n").unwrap()));
    /// assert_eq!(2, locator.resolve_all("n").unwrap().len());
    /// ```
    pub fn register_instance(
        &mut self,
        type_name: &str,
        instance: DynSvc,
    ) -> InjectResult<()> {
        let registration = Registration::Instance {
            type_name: type_name.to_owned(),
            instance,
        };
        validate(&registration)?;
        self.apply(registration);
        Ok(())
    }

    /// Adds all the registrations in a module, in the order they were made.
    /// Every registration is validated before any of them is applied.
    pub fn add_module(&mut self, module: Module) -> InjectResult<()> {
        for registration in &module.registrations {
            validate(registration)?;
        }

        let count = module.registrations.len();
        for registration in module.registrations {
            self.apply(registration);
        }

        debug!(count, "added module");
        Ok(())
    }

    /// Removes every registration for a type name. Cached singletons of those
    /// registrations are dropped with them.
    pub fn unregister(&mut self, type_name: &str) -> InjectResult<()> {
        validate_type_name(type_name)?;
        match self.registry.clear(type_name) {
            0 => Err(not_registered(type_name)),
            removed => {
                debug!(type_name, removed, "unregistered type");
                Ok(())
            }
        }
    }

    /// Whether at least one implementation is registered for the type name.
    #[must_use]
    pub fn is_registered(&self, type_name: &str) -> bool {
        self.registration_count(type_name) > 0
    }

    /// The number of implementations registered for the type name.
    #[must_use]
    pub fn registration_count(&self, type_name: &str) -> usize {
        self.registry.count(type_name)
    }

    /// Resolves the most recently registered implementation of a type name.
    pub fn resolve(&self, type_name: &str) -> InjectResult<DynSvc> {
        self.resolve_with(type_name, &ResolutionPath::new())
    }

    /// Resolves a type name and downcasts the result to `T`.
    pub fn get<T: Service>(&self, type_name: &str) -> InjectResult<Svc<T>> {
        let service = self.resolve(type_name)?;
        downcast_service(service).map_err(|_| InjectError::TypeMismatch {
            type_name: type_name.to_owned(),
            expected: std::any::type_name::<T>(),
        })
    }

    /// Resolves a type name if anything is registered for it. Failures while
    /// resolving its dependencies are still returned as errors.
    pub fn try_resolve(&self, type_name: &str) -> InjectResult<Option<DynSvc>> {
        if !self.is_registered(type_name) {
            return Ok(None);
        }

        self.resolve(type_name).map(Some)
    }

    /// Resolves every implementation registered for a type name, most
    /// recently registered first. Fails if nothing is registered.
    pub fn resolve_all(&self, type_name: &str) -> InjectResult<Vec<DynSvc>> {
        if !self.is_registered(type_name) {
            return Err(not_registered(type_name));
        }

        self.resolve_all_optional(type_name)
    }

    /// Resolves every implementation registered for a type name, most
    /// recently registered first. Returns an empty list if nothing is
    /// registered.
    pub fn resolve_all_optional(
        &self,
        type_name: &str,
    ) -> InjectResult<Vec<DynSvc>> {
        let path = ResolutionPath::new().with_request(type_name)?;
        trace!(type_name, "resolving all registrations");
        self.registry
            .iter(type_name)
            .map(|descriptor| descriptor.instantiate(self, &path))
            .collect()
    }

    /// Constructs an implementation once, without registering it. Its
    /// dependencies are resolved from this locator, but the result is never
    /// cached.
    ///
    /// ```
    /// use runtime_locator::{Implementation, Locator, Parameters, Signature};
    ///
    /// let locator = Locator::new();
    /// let sum = Implementation::factory(
    ///     Signature::source("function (a, b) {}"),
    ///     |args| {
    ///         let a: i32 = args.value(0)?.unwrap_or(0);
    ///         let b: i32 = args.value(1)?.unwrap_or(0);
    ///         Ok(a + b)
    ///     },
    /// );
    ///
    /// let parameters = Parameters::new().with("a", 2).with("b", 3);
    /// let result = locator.resolve_instance(&sum, &parameters).unwrap();
    /// assert_eq!(Some(&5), result.downcast_ref::<i32>());
    /// ```
    pub fn resolve_instance(
        &self,
        implementation: &Implementation,
        parameters: &Parameters,
    ) -> InjectResult<DynSvc> {
        let constructor = implementation.constructor().ok_or_else(|| {
            InjectError::InvalidImplementation {
                name: implementation.name().to_owned(),
            }
        })?;

        let parameter_names =
            constructor.signature().parameter_names(&self.syntax);
        self.activate(
            constructor,
            &parameter_names,
            parameters,
            &ResolutionPath::new(),
        )
    }

    fn resolve_with(
        &self,
        type_name: &str,
        path: &ResolutionPath,
    ) -> InjectResult<DynSvc> {
        let path = path.with_request(type_name)?;
        trace!(type_name, depth = path.len(), "resolving");
        self.registry
            .front(type_name)
            .ok_or_else(|| not_registered(type_name))?
            .instantiate(self, &path)
    }

    /// Resolves the arguments for a constructor and invokes it.
    pub(crate) fn activate(
        &self,
        constructor: &Constructor,
        parameter_names: &[String],
        parameters: &Parameters,
        path: &ResolutionPath,
    ) -> InjectResult<DynSvc> {
        let mut arguments = Arguments::new(path.clone());
        for name in parameter_names {
            let argument = match self.syntax.dependency_name(name) {
                Some(dependency) => {
                    Argument::Service(self.resolve_with(dependency, path)?)
                }
                None => parameters
                    .get(name)
                    .map_or(Argument::Missing, |value| {
                        Argument::Value(value.clone_dyn())
                    }),
            };
            arguments.push(name.clone(), argument);
        }

        constructor.construct(&arguments)
    }

    fn apply(&mut self, registration: Registration) {
        match registration {
            Registration::Constructed {
                type_name,
                implementation,
                parameters,
                lifetime,
            } => {
                let parameter_names = implementation
                    .constructor()
                    .map(|constructor| {
                        constructor.signature().parameter_names(&self.syntax)
                    })
                    .unwrap_or_default();
                let descriptor = Descriptor::new(
                    implementation,
                    parameter_names,
                    parameters,
                    lifetime,
                );
                debug!(
                    type_name = type_name.as_str(),
                    implementation = descriptor.name(),
                    parameters = ?descriptor.parameter_names(),
                    ?lifetime,
                    "registered implementation"
                );
                self.registry.add(&type_name, descriptor);
            }
            Registration::Instance {
                type_name,
                instance,
            } => {
                debug!(type_name = type_name.as_str(), "registered instance");
                self.registry
                    .add(&type_name, Descriptor::from_instance(instance));
            }
        }
    }
}

fn validate(registration: &Registration) -> InjectResult<()> {
    validate_type_name(registration.type_name())?;
    match registration {
        Registration::Constructed { implementation, .. }
            if implementation.constructor().is_none() =>
        {
            Err(InjectError::InvalidImplementation {
                name: implementation.name().to_owned(),
            })
        }
        _ => Ok(()),
    }
}

fn validate_type_name(type_name: &str) -> InjectResult<()> {
    if type_name.is_empty() {
        return Err(InjectError::InvalidTypeName);
    }

    Ok(())
}

fn not_registered(type_name: &str) -> InjectError {
    InjectError::NotRegistered {
        type_name: type_name.to_owned(),
    }
}
