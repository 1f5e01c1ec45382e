use crate::{Arguments, DynSvc, InjectResult, Service, Signature, Svc};
use std::{
    fmt::{Debug, Formatter},
    marker::PhantomData,
};

/// A type that knows how to build itself from resolved arguments.
///
/// ## Example
///
/// ```
/// use runtime_locator::{
///     Arguments, Component, InjectResult, Implementation, Locator,
///     Parameters, Lifetime, Signature,
/// };
///
/// struct Database {
///     retries: u32,
/// }
///
/// impl Component for Database {
///     fn signature() -> Signature {
///         Signature::source("function Database(retries) {}")
///     }
///
///     fn construct(arguments: &Arguments) -> InjectResult<Self> {
///         let retries = arguments.value(0)?.unwrap_or(1);
///         Ok(Database { retries })
///     }
/// }
///
/// let mut locator = Locator::new();
/// locator
///     .register_with(
///         "db",
///         Implementation::class::<Database>(),
///         Parameters::new().with("retries", 5_u32),
///         Lifetime::Singleton,
///     )
///     .unwrap();
///
/// let db = locator.get::<Database>("db").unwrap();
/// assert_eq!(5, db.retries);
/// ```
pub trait Component: Service + Sized {
    /// Declares the parameters of [`construct`](Component::construct).
    fn signature() -> Signature;

    /// Builds an instance from arguments matching
    /// [`signature`](Component::signature).
    fn construct(arguments: &Arguments) -> InjectResult<Self>;
}

trait Construct: Service {
    fn construct(&self, arguments: &Arguments) -> InjectResult<DynSvc>;
}

struct FactoryFn<F, R> {
    factory: F,
    marker: PhantomData<fn() -> R>,
}

impl<F, R> Construct for FactoryFn<F, R>
where
    F: Service + Fn(&Arguments) -> InjectResult<R>,
    R: Service,
{
    fn construct(&self, arguments: &Arguments) -> InjectResult<DynSvc> {
        let service = (self.factory)(arguments)?;
        Ok(Svc::new(service))
    }
}

/// A signature paired with the function that builds the service.
pub struct Constructor {
    name: &'static str,
    signature: Signature,
    construct: Box<dyn Construct>,
}

impl Constructor {
    fn new<F, R>(signature: Signature, construct: F) -> Self
    where
        F: Service + Fn(&Arguments) -> InjectResult<R>,
        R: Service,
    {
        Constructor {
            name: std::any::type_name::<R>(),
            signature,
            construct: Box::new(FactoryFn {
                factory: construct,
                marker: PhantomData,
            }),
        }
    }

    /// The name of the type this constructor builds.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The declared parameters of this constructor.
    #[must_use]
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub(crate) fn construct(
        &self,
        arguments: &Arguments,
    ) -> InjectResult<DynSvc> {
        self.construct.construct(arguments)
    }
}

impl Debug for Constructor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Constructor")
            .field("name", &self.name)
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}

/// Something that can be registered with a [`Locator`](crate::Locator).
pub enum Implementation {
    /// A type implementing [`Component`].
    Class(Constructor),
    /// A factory function.
    Factory(Constructor),
    /// An instance that has already been built. These can only be registered
    /// through [`Locator::register_instance`](crate::Locator::register_instance).
    Instance(DynSvc),
}

impl Implementation {
    /// Creates an implementation from a [`Component`].
    #[must_use]
    pub fn class<T: Component>() -> Self {
        Implementation::Class(Constructor::new(T::signature(), T::construct))
    }

    /// Creates an implementation from a factory function. The factory
    /// receives one argument per parameter in `signature`.
    ///
    /// ```
    /// use runtime_locator::{Implementation, Locator, Signature};
    ///
    /// struct Config {
    ///     verbose: bool,
    /// }
    ///
    /// let mut locator = Locator::new();
    /// locator
    ///     .register(
    ///         "config",
    ///         Implementation::factory(Signature::empty(), |_| {
    ///             Ok(Config { verbose: true })
    ///         }),
    ///     )
    ///     .unwrap();
    ///
    /// assert!(locator.get::<Config>("config").unwrap().verbose);
    /// ```
    pub fn factory<F, R>(signature: Signature, factory: F) -> Self
    where
        F: Service + Fn(&Arguments) -> InjectResult<R>,
        R: Service,
    {
        Implementation::Factory(Constructor::new(signature, factory))
    }

    /// Wraps an instance that has already been built.
    #[must_use]
    pub fn instance(instance: DynSvc) -> Self {
        Implementation::Instance(instance)
    }

    /// A name describing this implementation, used in errors and logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Implementation::Class(constructor)
            | Implementation::Factory(constructor) => constructor.name(),
            Implementation::Instance(_) => "<instance>",
        }
    }

    /// Gets the constructor of this implementation, if it has one.
    #[must_use]
    pub fn constructor(&self) -> Option<&Constructor> {
        match self {
            Implementation::Class(constructor)
            | Implementation::Factory(constructor) => Some(constructor),
            Implementation::Instance(_) => None,
        }
    }
}

impl Debug for Implementation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Implementation::Class(constructor) => {
                f.debug_tuple("Class").field(constructor).finish()
            }
            Implementation::Factory(constructor) => {
                f.debug_tuple("Factory").field(constructor).finish()
            }
            Implementation::Instance(_) => f.write_str("Instance(..)"),
        }
    }
}
