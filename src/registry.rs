use crate::{
    DynSvc, Implementation, InjectResult, Locator, Parameters, ResolutionPath,
};
use std::{
    collections::{HashMap, VecDeque},
    fmt::{Debug, Formatter},
};
use tracing::trace;

/// How long a resolved service lives.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Lifetime {
    /// A new instance is constructed for every request.
    #[default]
    Transient,
    /// An instance is constructed on the first request and reused for every
    /// request after that.
    Singleton,
}

#[cfg(feature = "arc")]
mod cell {
    use crate::{DynSvc, InjectResult};
    use std::sync::{PoisonError, RwLock};

    #[derive(Default)]
    pub(crate) struct SingletonCell(RwLock<Option<DynSvc>>);

    impl SingletonCell {
        pub fn get(&self) -> Option<DynSvc> {
            self.0
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }

        /// Stores the result of `init` unless an instance is already stored.
        /// The write lock is held while `init` runs, so concurrent requests
        /// wait for the first one instead of constructing again.
        pub fn get_or_try_init<F>(&self, init: F) -> InjectResult<DynSvc>
        where
            F: FnOnce() -> InjectResult<DynSvc>,
        {
            let mut stored =
                self.0.write().unwrap_or_else(PoisonError::into_inner);
            match &mut *stored {
                Some(stored) => Ok(stored.clone()),
                stored @ None => Ok(stored.insert(init()?).clone()),
            }
        }
    }
}

#[cfg(feature = "rc")]
mod cell {
    use crate::{DynSvc, InjectResult};
    use std::cell::RefCell;

    #[derive(Default)]
    pub(crate) struct SingletonCell(RefCell<Option<DynSvc>>);

    impl SingletonCell {
        pub fn get(&self) -> Option<DynSvc> {
            self.0.borrow().clone()
        }

        /// Stores the result of `init` unless an instance is already stored.
        pub fn get_or_try_init<F>(&self, init: F) -> InjectResult<DynSvc>
        where
            F: FnOnce() -> InjectResult<DynSvc>,
        {
            let mut stored = self.0.borrow_mut();
            match &mut *stored {
                Some(stored) => Ok(stored.clone()),
                stored @ None => Ok(stored.insert(init()?).clone()),
            }
        }
    }
}

use cell::SingletonCell;

/// A single registration of an implementation under a type name.
pub(crate) struct Descriptor {
    implementation: Implementation,
    parameter_names: Vec<String>,
    parameters: Parameters,
    lifetime: Lifetime,
    single_instance: SingletonCell,
}

impl Descriptor {
    pub fn new(
        implementation: Implementation,
        parameter_names: Vec<String>,
        parameters: Parameters,
        lifetime: Lifetime,
    ) -> Self {
        Descriptor {
            implementation,
            parameter_names,
            parameters,
            lifetime,
            single_instance: SingletonCell::default(),
        }
    }

    pub fn from_instance(instance: DynSvc) -> Self {
        Descriptor::new(
            Implementation::Instance(instance),
            Vec::new(),
            Parameters::new(),
            Lifetime::Singleton,
        )
    }

    pub fn name(&self) -> &'static str {
        self.implementation.name()
    }

    pub fn parameter_names(&self) -> &[String] {
        &self.parameter_names
    }

    /// Provides an instance of the registered implementation. `path` must
    /// already end with the type name this descriptor is registered under.
    pub fn instantiate(
        &self,
        locator: &Locator,
        path: &ResolutionPath,
    ) -> InjectResult<DynSvc> {
        let constructor = match &self.implementation {
            Implementation::Class(constructor)
            | Implementation::Factory(constructor) => constructor,
            Implementation::Instance(instance) => return Ok(instance.clone()),
        };

        let activate = || {
            locator.activate(
                constructor,
                &self.parameter_names,
                &self.parameters,
                path,
            )
        };

        match self.lifetime {
            Lifetime::Transient => activate(),
            Lifetime::Singleton => {
                if let Some(instance) = self.single_instance.get() {
                    trace!(type_name = path.current(), "singleton cache hit");
                    return Ok(instance);
                }

                // A request for this descriptor made while it is being
                // constructed has the same type name on its path and fails
                // as a cycle before reaching the cell.
                self.single_instance.get_or_try_init(activate)
            }
        }
    }
}

impl Debug for Descriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Descriptor")
            .field("implementation", &self.implementation)
            .field("parameter_names", &self.parameter_names)
            .field("parameters", &self.parameters)
            .field("lifetime", &self.lifetime)
            .field("cached", &self.single_instance.get().is_some())
            .finish()
    }
}

/// Stores the descriptors registered under each type name, most recently
/// registered first.
#[derive(Default)]
pub(crate) struct Registry {
    descriptors: HashMap<String, VecDeque<Descriptor>>,
}

impl Registry {
    pub fn add(&mut self, type_name: &str, descriptor: Descriptor) {
        self.descriptors
            .entry(type_name.to_owned())
            .or_default()
            .push_front(descriptor);
    }

    /// Drops every descriptor registered under the type name, leaving an
    /// empty sequence behind. Returns how many were dropped.
    pub fn clear(&mut self, type_name: &str) -> usize {
        self.descriptors
            .get_mut(type_name)
            .map_or(0, |descriptors| {
                std::mem::take(descriptors).len()
            })
    }

    /// The most recently registered descriptor for the type name.
    pub fn front(&self, type_name: &str) -> Option<&Descriptor> {
        self.descriptors.get(type_name).and_then(VecDeque::front)
    }

    /// All descriptors for the type name, most recently registered first.
    pub fn iter(&self, type_name: &str) -> impl Iterator<Item = &Descriptor> {
        self.descriptors.get(type_name).into_iter().flatten()
    }

    pub fn count(&self, type_name: &str) -> usize {
        self.descriptors.get(type_name).map_or(0, VecDeque::len)
    }
}

impl Debug for Registry {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(
                self.descriptors.iter().filter(|(_, v)| !v.is_empty()).map(
                    |(k, v)| (k, format!("<{} registrations>", v.len())),
                ),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{InjectError, Signature, Svc};

    fn descriptor(value: i32) -> Descriptor {
        Descriptor::new(
            Implementation::factory(Signature::empty(), move |_| Ok(value)),
            Vec::new(),
            Parameters::new(),
            Lifetime::Transient,
        )
    }

    #[test]
    fn newest_descriptor_is_first() {
        let mut registry = Registry::default();
        registry.add("n", descriptor(1));
        registry.add("n", descriptor(2));

        assert_eq!(2, registry.count("n"));
        let lifetimes: Vec<_> =
            registry.iter("n").map(|d| d.lifetime).collect();
        assert_eq!(vec![Lifetime::Transient; 2], lifetimes);
        assert!(registry.front("n").is_some());
    }

    #[test]
    fn cleared_type_is_empty_but_present() {
        let mut registry = Registry::default();
        registry.add("n", descriptor(1));

        assert_eq!(1, registry.clear("n"));
        assert_eq!(0, registry.count("n"));
        assert!(registry.front("n").is_none());
        assert_eq!(0, registry.iter("n").count());
        assert_eq!(0, registry.clear("missing"));
    }

    #[test]
    fn instance_descriptor_returns_its_instance() {
        let instance: DynSvc = Svc::new(5_u8);
        let descriptor = Descriptor::from_instance(instance.clone());
        assert_eq!(Lifetime::Singleton, descriptor.lifetime);
        assert!(descriptor.parameter_names().is_empty());

        let locator = Locator::new();
        let path = ResolutionPath::new().with_request("n").unwrap();
        for _ in 0..2 {
            let provided = descriptor.instantiate(&locator, &path).unwrap();
            assert!(Svc::ptr_eq(&instance, &provided));
        }
    }

    #[test]
    fn singleton_cell_is_set_once() {
        let cell = SingletonCell::default();
        let first: DynSvc = Svc::new(1_u8);
        let stored = cell.get_or_try_init(|| Ok(first.clone())).unwrap();
        let again = cell
            .get_or_try_init(|| panic!("cell should already be set"))
            .unwrap();

        assert!(Svc::ptr_eq(&first, &stored));
        assert!(Svc::ptr_eq(&first, &again));
    }

    #[test]
    fn failed_init_leaves_cell_empty() {
        let cell = SingletonCell::default();
        let result = cell.get_or_try_init(|| {
            Err(InjectError::activation_failed("n", "not yet"))
        });

        assert!(matches!(result, Err(InjectError::ActivationFailed { .. })));
        assert!(cell.get().is_none());
        assert!(cell.get_or_try_init(|| Ok(Svc::new(2_u8))).is_ok());
        assert!(cell.get().is_some());
    }
}
