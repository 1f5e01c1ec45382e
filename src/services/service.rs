use derive_more::Display;
use downcast_rs::impl_downcast;
use std::error::Error;

#[cfg(feature = "rc")]
macro_rules! feature_unique {
    ({ $($common:tt)* }, { $($rc:tt)* }, { $($_arc:tt)* }) => {
        $($common)*
        $($rc)*
    };
}

#[cfg(feature = "arc")]
macro_rules! feature_unique {
    ({ $($common:tt)* }, { $($_rc:tt)* }, { $($arc:tt)* }) => {
        $($common)*
        $($arc)*
    };
}

feature_unique!(
    {
        /// A reference-counted pointer holding a service. The pointer type is
        /// determined by the feature flags passed to this crate.
        ///
        /// - **rc**: Pointer type is [`Rc<T>`](std::rc::Rc)
        /// - **arc**: Pointer type is [`Arc<T>`](std::sync::Arc) (default)
    },
    {
        pub type Svc<T> = std::rc::Rc<T>;
    },
    {
        pub type Svc<T> = std::sync::Arc<T>;
    }
);

/// A service pointer holding an instance of `dyn Service`. This is what the
/// [`Locator`](crate::Locator) hands out, since type names carry no static
/// type information.
pub type DynSvc = Svc<dyn Service>;

feature_unique!(
    {
        /// Implemented automatically on types that are capable of being a
        /// service.
    },
    {
        pub trait Service: downcast_rs::Downcast {}
        impl<T: ?Sized + downcast_rs::Downcast> Service for T {}
    },
    {
        pub trait Service: downcast_rs::DowncastSync {}
        impl<T: ?Sized + downcast_rs::DowncastSync> Service for T {}
    }
);

#[cfg(feature = "arc")]
impl_downcast!(sync Service);

#[cfg(feature = "rc")]
impl_downcast!(Service);

/// Tries to convert a type-erased service pointer back into a pointer to its
/// concrete type. On failure, the same pointer is handed back.
///
/// ```
/// use runtime_locator::{downcast_service, DynSvc, Svc};
///
/// let service: DynSvc = Svc::new(12_i32);
/// assert!(downcast_service::<String>(service.clone()).is_err());
/// assert_eq!(12, *downcast_service::<i32>(service).ok().unwrap());
/// ```
pub fn downcast_service<T: Service>(service: DynSvc) -> Result<Svc<T>, DynSvc> {
    #[cfg(feature = "arc")]
    let result = service.downcast_arc::<T>();
    #[cfg(feature = "rc")]
    let result = service.downcast_rc::<T>();
    result
}

/// A result from attempting to resolve a service and its dependencies.
pub type InjectResult<T> = Result<T, InjectError>;

/// An error that has occurred during registration or resolution of a service.
#[derive(Debug, Display)]
#[non_exhaustive]
pub enum InjectError {
    /// The type name is empty.
    #[display(fmt = "type names must be non-empty strings")]
    InvalidTypeName,

    /// The implementation cannot be constructed, for example because it is a
    /// prebuilt instance passed where a constructor was expected.
    #[display(fmt = "{} is not a constructible implementation", name)]
    InvalidImplementation {
        /// The name of the rejected implementation.
        name: String,
    },

    /// Nothing is registered for the requested type name.
    #[display(fmt = "{} is not registered", type_name)]
    NotRegistered {
        /// The type name that was requested.
        type_name: String,
    },

    /// A type name appeared twice on the active resolution path.
    #[display(
        fmt = "a cycle was detected during resolution of {} [{}]",
        type_name,
        "fmt_cycle(cycle)"
    )]
    CycleDetected {
        /// The type name that was requested a second time.
        type_name: String,

        /// The chain of type names being resolved, outermost first, ending
        /// with the repeated type name.
        cycle: Vec<String>,
    },

    /// A constructor asked for an argument that does not exist or has a
    /// different type.
    #[display(fmt = "argument {} is not a valid {}", parameter, expected)]
    InvalidArgument {
        /// The parameter name, or its position if it is out of range.
        parameter: String,

        /// What the constructor expected to find.
        expected: &'static str,
    },

    /// The resolved service is not of the requested concrete type.
    #[display(fmt = "{} does not resolve to a {}", type_name, expected)]
    TypeMismatch {
        /// The type name that was requested.
        type_name: String,

        /// The concrete type the caller asked for.
        expected: &'static str,
    },

    /// A constructor failed.
    #[display(fmt = "an error occurred during activation of {}", name)]
    ActivationFailed {
        /// The type name or implementation that failed to activate.
        name: String,

        /// The error returned by the constructor.
        source: Box<dyn Error + Send + Sync + 'static>,
    },
}

impl InjectError {
    /// Wraps an error returned by a constructor.
    pub fn activation_failed(
        name: impl Into<String>,
        source: impl Into<Box<dyn Error + Send + Sync + 'static>>,
    ) -> Self {
        InjectError::ActivationFailed {
            name: name.into(),
            source: source.into(),
        }
    }
}

impl Error for InjectError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            InjectError::ActivationFailed { source, .. } => {
                Some(source.as_ref())
            }
            _ => None,
        }
    }
}

fn fmt_cycle(cycle: &[String]) -> String {
    cycle.join(" -> ")
}
