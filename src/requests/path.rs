use crate::{InjectError, InjectResult};
use tracing::debug;

/// The type names currently being resolved along one chain of requests,
/// outermost first.
///
/// A fresh path is started for every top-level request and handed down as
/// dependencies are resolved, so a type name that shows up twice means the
/// dependency graph contains a cycle.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct ResolutionPath {
    type_names: Vec<String>,
}

impl ResolutionPath {
    /// Creates a new, empty path.
    #[must_use]
    pub fn new() -> Self {
        ResolutionPath::default()
    }

    /// Creates a child path with the given type name appended to the end.
    /// Fails if the type name is already being resolved.
    pub fn with_request(&self, type_name: &str) -> InjectResult<Self> {
        if self.contains(type_name) {
            let mut cycle = self.type_names.clone();
            cycle.push(type_name.to_owned());
            debug!(type_name, ?cycle, "dependency cycle detected");
            return Err(InjectError::CycleDetected {
                type_name: type_name.to_owned(),
                cycle,
            });
        }

        let mut child = self.clone();
        child.type_names.push(type_name.to_owned());
        Ok(child)
    }

    /// Whether the type name is being resolved somewhere along this path.
    #[must_use]
    pub fn contains(&self, type_name: &str) -> bool {
        self.type_names.iter().any(|name| name == type_name)
    }

    /// The type names along this path, outermost first.
    #[must_use]
    pub fn type_names(&self) -> &[String] {
        &self.type_names
    }

    /// The type name being resolved most recently, if any.
    #[must_use]
    pub fn current(&self) -> Option<&str> {
        self.type_names.last().map(String::as_str)
    }

    /// The number of type names on this path.
    #[must_use]
    pub fn len(&self) -> usize {
        self.type_names.len()
    }

    /// Whether this is the path of a top-level request.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.type_names.is_empty()
    }
}
