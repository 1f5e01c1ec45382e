use crate::{
    Arguments, Component, DynSvc, Implementation, InjectError, InjectResult,
    Lifetime, Locator, Module, Parameters, Signature, Svc, Syntax,
};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Mutex,
};

#[derive(Default)]
struct Svc1(pub i32);

impl Component for Svc1 {
    fn signature() -> Signature {
        Signature::source("function Svc1() {}")
    }

    fn construct(_arguments: &Arguments) -> InjectResult<Self> {
        Ok(Svc1::default())
    }
}

struct Svc2 {
    pub dep1: Svc<Svc1>,
}

impl Component for Svc2 {
    fn signature() -> Signature {
        Signature::source("function Svc2(§svc1) {}")
    }

    fn construct(arguments: &Arguments) -> InjectResult<Self> {
        Ok(Svc2 {
            dep1: arguments.service(0)?,
        })
    }
}

struct Svc3 {
    pub dep1: Svc<Svc1>,
    pub dep2: Svc<Svc2>,
    pub label: Option<String>,
}

impl Component for Svc3 {
    fn signature() -> Signature {
        Signature::source("function Svc3(§svc1, label, §svc2) {}")
    }

    fn construct(arguments: &Arguments) -> InjectResult<Self> {
        Ok(Svc3 {
            dep1: arguments.service(0)?,
            label: arguments.value(1)?,
            dep2: arguments.service(2)?,
        })
    }
}

fn counter_factory(counter: &Svc<AtomicUsize>) -> Implementation {
    let counter = counter.clone();
    Implementation::factory(Signature::empty(), move |_| {
        Ok(Svc1(counter.fetch_add(1, Ordering::SeqCst) as i32))
    })
}

fn same(a: &DynSvc, b: &DynSvc) -> bool {
    Svc::ptr_eq(a, b)
}

#[test]
fn can_make_svc1() {
    let mut locator = Locator::new();
    locator
        .register("svc1", Implementation::class::<Svc1>())
        .unwrap();

    let _service: Svc<Svc1> = locator.get("svc1").unwrap();
}

#[test]
fn cant_make_svc1_when_not_registered() {
    let locator = Locator::new();
    match locator.resolve("svc1") {
        Err(InjectError::NotRegistered { type_name }) => {
            assert_eq!("svc1", type_name);
        }
        Err(error) => Err(error).unwrap(),
        Ok(_) => unreachable!("service should not have been created"),
    }

    assert!(locator.try_resolve("svc1").unwrap().is_none());
}

#[test]
fn can_make_svc3() {
    let mut locator = Locator::new();
    locator
        .register("svc1", Implementation::class::<Svc1>())
        .unwrap();
    locator
        .register("svc2", Implementation::class::<Svc2>())
        .unwrap();
    locator
        .register_with(
            "svc3",
            Implementation::class::<Svc3>(),
            Parameters::new().with("label", "third".to_string()),
            Lifetime::Transient,
        )
        .unwrap();

    let svc3: Svc<Svc3> = locator.get("svc3").unwrap();
    assert_eq!(Some("third"), svc3.label.as_deref());
    assert_eq!(0, svc3.dep1.0);
    assert_eq!(0, svc3.dep2.dep1.0);
}

#[test]
fn missing_literal_is_passed_as_none() {
    let mut locator = Locator::new();
    locator
        .register("svc1", Implementation::class::<Svc1>())
        .unwrap();
    locator
        .register("svc2", Implementation::class::<Svc2>())
        .unwrap();
    locator
        .register("svc3", Implementation::class::<Svc3>())
        .unwrap();

    let svc3: Svc<Svc3> = locator.get("svc3").unwrap();
    assert!(svc3.label.is_none());
}

#[test]
fn missing_dependency_error_is_propagated_unchanged() {
    let mut locator = Locator::new();
    locator
        .register("svc2", Implementation::class::<Svc2>())
        .unwrap();
    locator
        .register("svc3", Implementation::class::<Svc3>())
        .unwrap();

    match locator.resolve("svc3") {
        Err(InjectError::NotRegistered { type_name }) => {
            assert_eq!("svc1", type_name);
        }
        Err(error) => Err(error).unwrap(),
        Ok(_) => unreachable!("service should not be able to be activated"),
    }

    // Registered, but its dependency is not
    assert!(locator.try_resolve("svc3").is_err());
}

#[test]
fn dependencies_are_resolved_in_declared_order() {
    let order = Svc::new(Mutex::new(Vec::new()));
    let mut locator = Locator::new();
    for name in ["a", "b", "c"] {
        let order = order.clone();
        locator
            .register(
                name,
                Implementation::factory(Signature::empty(), move |_| {
                    order.lock().unwrap().push(name);
                    Ok(name)
                }),
            )
            .unwrap();
    }
    locator
        .register(
            "root",
            Implementation::factory(
                Signature::source("function (§c, §a, §b) {}"),
                |args| {
                    let names: Vec<&'static str> = (0..args.len())
                        .map(|index| args.service::<&'static str>(index))
                        .map(|service| service.map(|name| *name))
                        .collect::<InjectResult<_>>()?;
                    Ok(names)
                },
            ),
        )
        .unwrap();

    let root: Svc<Vec<&'static str>> = locator.get("root").unwrap();
    assert_eq!(vec!["c", "a", "b"], *root);
    assert_eq!(vec!["c", "a", "b"], *order.lock().unwrap());
}

#[test]
fn newest_registration_wins() {
    let mut locator = Locator::new();
    locator
        .register(
            "n",
            Implementation::factory(Signature::empty(), |_| Ok(1_i32)),
        )
        .unwrap();
    locator
        .register(
            "n",
            Implementation::factory(Signature::empty(), |_| Ok(2_i32)),
        )
        .unwrap();

    assert_eq!(2, *locator.get::<i32>("n").unwrap());

    let all: Vec<i32> = locator
        .resolve_all("n")
        .unwrap()
        .into_iter()
        .map(|service| *service.downcast_ref::<i32>().unwrap())
        .collect();
    assert_eq!(vec![2, 1], all);
    assert_eq!(2, locator.registration_count("n"));
}

#[test]
fn instances_are_returned_by_identity() {
    let mut locator = Locator::new();
    let obj1: DynSvc = Svc::new(Svc1(1));
    let obj2: DynSvc = Svc::new(Svc1(2));
    locator.register_instance("obj", obj1.clone()).unwrap();
    locator.register_instance("obj", obj2.clone()).unwrap();

    for _ in 0..3 {
        assert!(same(&obj2, &locator.resolve("obj").unwrap()));
    }

    let all = locator.resolve_all("obj").unwrap();
    assert_eq!(2, all.len());
    assert!(same(&obj2, &all[0]));
    assert!(same(&obj1, &all[1]));
}

#[test]
fn singleton() {
    let counter = Svc::new(AtomicUsize::new(0));
    let mut locator = Locator::new();
    locator
        .register_singleton("svc1", counter_factory(&counter))
        .unwrap();
    locator
        .register("svc2", Implementation::class::<Svc2>())
        .unwrap();

    let first = locator.resolve("svc1").unwrap();
    let second = locator.resolve("svc1").unwrap();
    let svc2: Svc<Svc2> = locator.get("svc2").unwrap();

    assert!(same(&first, &second));
    assert_eq!(1, counter.load(Ordering::SeqCst));
    assert_eq!(0, svc2.dep1.0);
}

#[test]
fn transient() {
    let counter = Svc::new(AtomicUsize::new(0));
    let mut locator = Locator::new();
    locator.register("svc1", counter_factory(&counter)).unwrap();

    let first: Svc<Svc1> = locator.get("svc1").unwrap();
    let second: Svc<Svc1> = locator.get("svc1").unwrap();

    assert!(!Svc::ptr_eq(&first, &second));
    assert_ne!(first.0, second.0);
    assert_eq!(2, counter.load(Ordering::SeqCst));
}

#[test]
fn singleton_dependencies_are_resolved_once() {
    let counter = Svc::new(AtomicUsize::new(0));
    let mut locator = Locator::new();
    locator.register("svc1", counter_factory(&counter)).unwrap();
    locator
        .register_singleton("svc2", Implementation::class::<Svc2>())
        .unwrap();

    let first: Svc<Svc2> = locator.get("svc2").unwrap();
    let second: Svc<Svc2> = locator.get("svc2").unwrap();

    assert!(Svc::ptr_eq(&first, &second));
    assert_eq!(1, counter.load(Ordering::SeqCst));
}

#[test]
fn resolve_all_caches_each_singleton_separately() {
    let counter = Svc::new(AtomicUsize::new(0));
    let mut locator = Locator::new();
    locator
        .register_singleton("n", counter_factory(&counter))
        .unwrap();
    locator.register("n", counter_factory(&counter)).unwrap();
    locator
        .register_singleton("n", counter_factory(&counter))
        .unwrap();

    let first = locator.resolve_all("n").unwrap();
    let second = locator.resolve_all("n").unwrap();

    assert!(same(&first[0], &second[0]));
    assert!(!same(&first[1], &second[1]));
    assert!(same(&first[2], &second[2]));
    assert_eq!(4, counter.load(Ordering::SeqCst));
}

#[test]
fn resolve_all_strictness() {
    let mut locator = Locator::new();
    assert!(matches!(
        locator.resolve_all("plugins"),
        Err(InjectError::NotRegistered { .. })
    ));
    assert!(locator.resolve_all_optional("plugins").unwrap().is_empty());

    locator.register_instance("plugins", Svc::new(1_u8)).unwrap();
    locator.unregister("plugins").unwrap();
    assert!(matches!(
        locator.resolve_all("plugins"),
        Err(InjectError::NotRegistered { .. })
    ));
    assert!(locator.resolve_all_optional("plugins").unwrap().is_empty());
}

#[test]
fn unregister_removes_every_registration() {
    let mut locator = Locator::new();
    locator
        .register("svc1", Implementation::class::<Svc1>())
        .unwrap();
    locator.register_instance("svc1", Svc::new(Svc1(3))).unwrap();
    assert!(locator.is_registered("svc1"));

    locator.unregister("svc1").unwrap();
    assert!(!locator.is_registered("svc1"));
    assert!(matches!(
        locator.resolve("svc1"),
        Err(InjectError::NotRegistered { .. })
    ));
    assert!(matches!(
        locator.unregister("svc1"),
        Err(InjectError::NotRegistered { .. })
    ));

    // Registering again after unregistering works as usual
    locator.register_instance("svc1", Svc::new(Svc1(4))).unwrap();
    assert_eq!(4, locator.get::<Svc1>("svc1").unwrap().0);
}

#[test]
fn invalid_registrations_are_rejected() {
    let mut locator = Locator::new();
    assert!(matches!(
        locator.register("", Implementation::class::<Svc1>()),
        Err(InjectError::InvalidTypeName)
    ));
    assert!(matches!(
        locator.register_instance("", Svc::new(1_u8)),
        Err(InjectError::InvalidTypeName)
    ));
    assert!(matches!(
        locator.unregister(""),
        Err(InjectError::InvalidTypeName)
    ));
    match locator.register("n", Implementation::instance(Svc::new(1_u8))) {
        Err(InjectError::InvalidImplementation { name }) => {
            assert_eq!("<instance>", name);
        }
        Err(error) => Err(error).unwrap(),
        Ok(_) => unreachable!("instances cannot be registered as constructors"),
    }
    assert!(!locator.is_registered("n"));
    assert!(!locator.is_registered(""));
}

#[test]
fn get_with_wrong_type_fails() {
    let mut locator = Locator::new();
    locator.register_instance("n", Svc::new(1_u8)).unwrap();

    match locator.get::<String>("n") {
        Err(InjectError::TypeMismatch { type_name, expected }) => {
            assert_eq!("n", type_name);
            assert_eq!(std::any::type_name::<String>(), expected);
        }
        Err(error) => Err(error).unwrap(),
        Ok(_) => unreachable!("u8 should not downcast to String"),
    }
}

#[test]
fn resolve_instance_is_never_cached() {
    let mut locator = Locator::new();
    locator
        .register("svc1", Implementation::class::<Svc1>())
        .unwrap();

    let implementation = Implementation::class::<Svc3>();
    let parameters = Parameters::new().with("label", "once".to_string());
    assert!(matches!(
        locator.resolve_instance(&implementation, &parameters),
        Err(InjectError::NotRegistered { .. })
    ));

    locator
        .register("svc2", Implementation::class::<Svc2>())
        .unwrap();
    let first = locator
        .resolve_instance(&implementation, &parameters)
        .unwrap();
    let second = locator
        .resolve_instance(&implementation, &parameters)
        .unwrap();

    assert!(!same(&first, &second));
    assert_eq!(
        Some("once"),
        first.downcast_ref::<Svc3>().unwrap().label.as_deref()
    );
    assert!(!locator.is_registered("svc3"));
}

#[test]
fn resolve_instance_rejects_prebuilt_values() {
    let locator = Locator::new();
    let implementation = Implementation::instance(Svc::new(1_u8));
    match locator.resolve_instance(&implementation, &Parameters::new()) {
        Err(InjectError::InvalidImplementation { name }) => {
            assert_eq!("<instance>", name);
        }
        Err(error) => Err(error).unwrap(),
        Ok(_) => unreachable!("instances cannot be constructed"),
    }
}

#[test]
fn dependency_names_may_contain_any_characters() {
    let mut locator = Locator::new();
    locator.register_instance("my-service", Svc::new(5_i32)).unwrap();
    locator.register_instance("app.config", Svc::new(2_i32)).unwrap();

    let sum = Implementation::factory(
        Signature::parameters(["§my-service", "§app.config"]),
        |args| Ok(*args.service::<i32>(0)? + *args.service::<i32>(1)?),
    );
    let result = locator.resolve_instance(&sum, &Parameters::new()).unwrap();
    assert_eq!(Some(&7), result.downcast_ref::<i32>());

    locator.register("sum", sum).unwrap();
    assert_eq!(7, *locator.get::<i32>("sum").unwrap());
}

#[test]
fn malformed_signature_degrades_to_fewer_parameters() {
    let mut locator = Locator::new();
    locator
        .register(
            "n",
            Implementation::factory(
                Signature::source("(a, b) => a + b"),
                |args| Ok(args.len()),
            ),
        )
        .unwrap();

    assert_eq!(0, *locator.get::<usize>("n").unwrap());
}

#[test]
fn custom_syntax_is_used() {
    let mut locator = Locator::with_syntax(Syntax::new("fn", '$'));
    locator.register_instance("greeting", Svc::new("hi")).unwrap();
    locator
        .register(
            "message",
            Implementation::factory(
                Signature::source("fn new($greeting, name)"),
                |args| {
                    let greeting = args.service::<&'static str>(0)?;
                    let name: String = args.value(1)?.unwrap_or_default();
                    Ok(format!("{greeting} {name}"))
                },
            ),
        )
        .unwrap();

    assert_eq!('$', locator.syntax().sigil());
    assert_eq!("hi ", *locator.get::<String>("message").unwrap());
}

#[test]
fn activation_errors_are_propagated() {
    let mut locator = Locator::new();
    locator
        .register_singleton(
            "flaky",
            Implementation::factory(Signature::empty(), |_| {
                Err::<u8, _>(InjectError::activation_failed(
                    "flaky",
                    "not today",
                ))
            }),
        )
        .unwrap();

    for _ in 0..2 {
        match locator.resolve("flaky") {
            Err(InjectError::ActivationFailed { name, source }) => {
                assert_eq!("flaky", name);
                assert_eq!("not today", source.to_string());
            }
            Err(error) => Err(error).unwrap(),
            Ok(_) => unreachable!("activation should have failed"),
        }
    }
}

#[test]
fn locator_returns_error_on_cycles() {
    let mut locator = Locator::new();
    locator
        .register_singleton(
            "foo",
            Implementation::factory(
                Signature::source("function Foo(§bar) {}"),
                |args| Ok(args.len()),
            ),
        )
        .unwrap();
    locator
        .register_singleton(
            "bar",
            Implementation::factory(Signature::parameters(["§foo"]), |args| {
                Ok(args.len())
            }),
        )
        .unwrap();

    match locator.resolve("foo") {
        Err(InjectError::CycleDetected { type_name, cycle }) => {
            assert_eq!("foo", type_name);
            assert_eq!(vec!["foo", "bar", "foo"], cycle);
        }
        Ok(_) => panic!("somehow created a foo with a cyclic dependency"),
        Err(error) => Err(error).unwrap(),
    }

    // The failed request left nothing behind
    locator.unregister("bar").unwrap();
    locator.register_instance("bar", Svc::new(0_usize)).unwrap();
    assert_eq!(1, *locator.get::<usize>("foo").unwrap());
}

#[test]
fn self_dependency_is_a_cycle() {
    let mut locator = Locator::new();
    locator
        .register(
            "me",
            Implementation::factory(Signature::parameters(["§me"]), |_| {
                Ok(())
            }),
        )
        .unwrap();

    assert!(matches!(
        locator.resolve_all("me"),
        Err(InjectError::CycleDetected { .. })
    ));
}

#[test]
fn diamond_dependencies_are_not_cycles() {
    let mut locator = Locator::new();
    locator
        .register_singleton("svc1", Implementation::class::<Svc1>())
        .unwrap();
    locator
        .register("svc2", Implementation::class::<Svc2>())
        .unwrap();
    locator
        .register("svc3", Implementation::class::<Svc3>())
        .unwrap();

    let svc3: Svc<Svc3> = locator.get("svc3").unwrap();
    assert!(Svc::ptr_eq(&svc3.dep1, &svc3.dep2.dep1));
}

#[test]
fn dependencies_see_their_resolution_path() {
    let mut locator = Locator::new();
    locator
        .register(
            "leaf",
            Implementation::factory(Signature::empty(), |args| {
                Ok(args.path().type_names().join("/"))
            }),
        )
        .unwrap();
    locator
        .register(
            "root",
            Implementation::factory(Signature::parameters(["§leaf"]), |args| {
                let leaf: Svc<String> = args.service(0)?;
                Ok(leaf.as_str().to_owned())
            }),
        )
        .unwrap();

    assert_eq!("root/leaf", *locator.get::<String>("root").unwrap());
    assert_eq!("leaf", *locator.get::<String>("leaf").unwrap());
}

#[test]
fn module_is_applied_in_order() {
    let mut module = Module::new();
    module.register("svc1", Implementation::class::<Svc1>());
    module.register_instance("svc1", Svc::new(Svc1(9)));
    module.register_with(
        "svc3",
        Implementation::class::<Svc3>(),
        Parameters::new().with("label", "mod".to_string()),
        Lifetime::Singleton,
    );
    module.register_singleton("svc2", Implementation::class::<Svc2>());
    assert_eq!(4, module.len());

    let mut locator = Locator::new();
    locator.add_module(module).unwrap();

    let svc3: Svc<Svc3> = locator.get("svc3").unwrap();
    assert_eq!(9, svc3.dep1.0);
    assert_eq!(Some("mod"), svc3.label.as_deref());
    assert_eq!(2, locator.registration_count("svc1"));
}

#[test]
fn invalid_module_changes_nothing() {
    let mut module = Module::new();
    module.register("svc1", Implementation::class::<Svc1>());
    module.register("", Implementation::class::<Svc2>());

    let mut locator = Locator::new();
    assert!(matches!(
        locator.add_module(module),
        Err(InjectError::InvalidTypeName)
    ));
    assert!(!locator.is_registered("svc1"));
}

#[test]
fn locators_are_independent() {
    let mut first = Locator::new();
    let second = Locator::new();
    first.register_instance("n", Svc::new(1_u8)).unwrap();

    assert!(first.is_registered("n"));
    assert!(!second.is_registered("n"));
}

#[cfg(feature = "arc")]
#[test]
fn locator_is_thread_safe() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Locator>();

    let counter = Svc::new(AtomicUsize::new(0));
    let mut locator = Locator::new();
    let constructions = counter.clone();
    locator
        .register_singleton(
            "svc1",
            Implementation::factory(Signature::empty(), move |_| {
                let count = constructions.fetch_add(1, Ordering::SeqCst);
                std::thread::sleep(std::time::Duration::from_millis(50));
                Ok(Svc1(count as i32))
            }),
        )
        .unwrap();

    let locator = &locator;
    let instances: Vec<DynSvc> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(move || locator.resolve("svc1").unwrap()))
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect()
    });

    for instance in &instances[1..] {
        assert!(same(&instances[0], instance));
    }
    assert_eq!(1, counter.load(Ordering::SeqCst));
}
