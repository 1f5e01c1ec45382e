use crate::Service;
use downcast_rs::Downcast;
use std::{collections::HashMap, fmt::Debug};

/// A literal configuration value that can be passed to a constructor.
pub trait Parameter: Service + Debug {
    /// Clones this parameter into a boxed trait object.
    fn clone_dyn(&self) -> Box<dyn Parameter>;
}

impl<T: Service + Debug + Clone> Parameter for T {
    fn clone_dyn(&self) -> Box<dyn Parameter> {
        Box::new(self.clone())
    }
}

impl dyn Parameter {
    /// Tries to downcast this parameter to a concrete type.
    pub fn downcast_ref<T: Parameter>(&self) -> Option<&T> {
        Downcast::as_any(self).downcast_ref()
    }
}

impl Clone for Box<dyn Parameter> {
    fn clone(&self) -> Self {
        self.as_ref().clone_dyn()
    }
}

/// The literal values available to a registration, keyed by parameter name.
///
/// ```
/// use runtime_locator::Parameters;
///
/// let parameters = Parameters::new()
///     .with("retries", 3_u32)
///     .with("host", "localhost".to_string());
///
/// assert_eq!(
///     Some(&3),
///     parameters.get("retries").and_then(|p| p.downcast_ref::<u32>())
/// );
/// assert!(parameters.get("port").is_none());
/// ```
#[derive(Clone, Debug, Default)]
pub struct Parameters {
    values: HashMap<String, Box<dyn Parameter>>,
}

impl Parameters {
    /// Creates an empty set of parameters.
    #[must_use]
    pub fn new() -> Self {
        Parameters::default()
    }

    /// Sets a parameter and returns `self`, for chaining.
    #[must_use]
    pub fn with(mut self, key: &str, value: impl Parameter) -> Self {
        self.insert(key, value);
        self
    }

    /// Sets the value of a parameter. If the parameter was already set, its
    /// previous value is returned.
    pub fn insert(
        &mut self,
        key: &str,
        value: impl Parameter,
    ) -> Option<Box<dyn Parameter>> {
        self.values.insert(key.to_owned(), Box::new(value))
    }

    /// Removes and returns the value of a parameter if it has been set.
    pub fn remove(&mut self, key: &str) -> Option<Box<dyn Parameter>> {
        self.values.remove(key)
    }

    /// Gets the value of a parameter if it has been set.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&dyn Parameter> {
        self.values.get(key).map(AsRef::as_ref)
    }

    /// The number of parameters that have been set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no parameters have been set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
