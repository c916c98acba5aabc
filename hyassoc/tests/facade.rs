use std::{rc::Rc, sync::Arc};

use hyassoc::{
    key::{KeyResolver, SlotKey},
    prelude::*,
    utils::conf::RegistryConfig,
};

/// Example class: associates a greeting when constructed.
struct MyClass {
    token: AssocToken,
}

impl MyClass {
    fn new(registry: &Arc<Registry>) -> Self {
        let instance = MyClass {
            token: AssocToken::new_in(registry),
        };
        instance.associate(String::from("Hello"), "Greeting");
        instance
    }
}

impl Associable for MyClass {
    fn assoc_token(&self) -> &AssocToken {
        &self.token
    }
}

/// Sends every key to the same bucket.
struct ConstantResolver;

impl KeyResolver for ConstantResolver {
    fn resolve(&self, key: &str) -> SlotKey {
        SlotKey::new(0, key)
    }
}

fn registry() -> Arc<Registry> {
    Arc::new(Registry::new())
}

#[test]
fn scenario_age_and_name() {
    let registry = registry();
    let obj = AssocToken::new_in(&registry);

    obj.associate(42i32, "age");
    obj.associate(String::from("Ada"), "name");
    assert_eq!(obj.associated_value::<i32>("age"), Some(42));

    obj.disassociate("name");
    assert!(!obj.is_associated("name"));
    assert!(obj.is_associated("age"));

    obj.disassociate_all();
    assert!(!obj.is_associated("age"));
}

#[test]
fn greeting_associated_in_constructor() {
    let registry = registry();
    let instance = MyClass::new(&registry);

    assert_eq!(
        instance.associated_value::<String>("Greeting").as_deref(),
        Some("Hello")
    );

    instance.associate(String::from("Brielle"), "name");
    instance.associate(42i64, "age");
    assert_eq!(
        instance.associated_value::<String>("name").as_deref(),
        Some("Brielle")
    );
    assert_eq!(instance.associated_value::<i64>("age"), Some(42));
}

#[test]
fn removing_and_checking_for_association() {
    let registry = registry();
    let instance = MyClass::new(&registry);

    let key = "Meaning of life";
    let says_who = "Who said the meaning of life was that value?";

    instance.associate(42i32, key);
    instance.associate(String::from("Douglas Adams"), says_who);
    assert_eq!(
        instance.associated_value::<String>(says_who).as_deref(),
        Some("Douglas Adams")
    );

    instance.disassociate(says_who);
    assert!(!instance.is_associated(says_who));
    assert_eq!(instance.associated_value::<i32>(key), Some(42));
}

#[test]
fn mismatching_type_reads_as_absent() {
    let registry = registry();
    let obj = AssocToken::new_in(&registry);
    obj.associate(42i32, "age");

    assert_eq!(obj.associated_value::<i64>("age"), None);
    assert_eq!(obj.associated_value::<u32>("age"), None);
    assert!(obj.associated_arc::<String>("age").is_none());
    assert!(obj.is_associated("age"));
    assert_eq!(obj.associated_type_name("age"), Some("i32"));
}

#[test]
fn try_accessors_tell_failures_apart() {
    let registry = registry();
    let obj = AssocToken::new_in(&registry);

    match obj.try_associated_value::<i32>("age") {
        Err(AssocError::NotAssociated { key }) => assert_eq!(key, "age"),
        other => panic!("unexpected result: {:?}", other),
    }

    obj.associate(42i32, "age");
    match obj.try_associated_value::<String>("age") {
        Err(AssocError::TypeMismatch {
            key,
            stored,
            requested,
        }) => {
            assert_eq!(key, "age");
            assert_eq!(stored, "i32");
            assert_eq!(requested, std::any::type_name::<String>());
        }
        other => panic!("unexpected result: {:?}", other),
    }

    assert_eq!(obj.try_associated_value::<i32>("age").unwrap(), 42);
}

#[test]
fn reassociating_replaces_value_and_type() {
    let registry = registry();
    let obj = AssocToken::new_in(&registry);

    obj.associate(1u8, "k");
    obj.associate(2u8, "k");
    assert_eq!(obj.associated_value::<u8>("k"), Some(2));

    obj.associate(String::from("two"), "k");
    assert_eq!(obj.associated_value::<u8>("k"), None);
    assert_eq!(obj.associated_value::<String>("k").as_deref(), Some("two"));
    assert_eq!(registry.association_count(obj.id()), 1);
}

#[test]
fn disassociate_is_idempotent() {
    let registry = registry();
    let obj = AssocToken::new_in(&registry);
    obj.associate(1u8, "a");
    obj.associate(2u8, "b");

    obj.disassociate("a");
    obj.disassociate("a");
    assert!(!obj.is_associated("a"));
    assert_eq!(obj.associated_value::<u8>("b"), Some(2));

    // Keys and instances that never had anything are fine too.
    obj.disassociate("never");
    AssocToken::new_in(&registry).disassociate("never");
    AssocToken::new_in(&registry).disassociate_all();
}

#[test]
fn instances_are_isolated() {
    let registry = registry();
    let first = AssocToken::new_in(&registry);
    let second = AssocToken::new_in(&registry);

    first.associate(1u32, "shared");
    assert!(!second.is_associated("shared"));

    second.associate(2u32, "shared");
    assert_eq!(first.associated_value::<u32>("shared"), Some(1));
    assert_eq!(second.associated_value::<u32>("shared"), Some(2));

    first.disassociate_all();
    assert_eq!(second.associated_value::<u32>("shared"), Some(2));
}

#[test]
fn colliding_keys_do_not_alias() {
    let registry = Arc::new(
        Registry::with_resolver(RegistryConfig::default(), ConstantResolver).unwrap(),
    );
    let obj = AssocToken::new_in(&registry);

    obj.associate(1u32, "alpha");
    obj.associate(2u32, "beta");
    obj.associate(String::from("gamma"), "gamma");

    assert_eq!(obj.associated_value::<u32>("alpha"), Some(1));
    assert_eq!(obj.associated_value::<u32>("beta"), Some(2));
    assert_eq!(obj.associated_value::<String>("gamma").as_deref(), Some("gamma"));
    assert!(!obj.is_associated("delta"));

    obj.disassociate("beta");
    assert_eq!(obj.associated_value::<u32>("alpha"), Some(1));
    assert!(!obj.is_associated("beta"));

    let mut keys = obj.associated_keys();
    keys.sort();
    assert_eq!(keys, ["alpha", "gamma"]);
}

#[test]
fn oversized_capacity_is_rejected() {
    let config = RegistryConfig {
        initial_capacity: usize::MAX,
        ..RegistryConfig::default()
    };

    match Registry::with_config(config) {
        Err(AssocError::InvalidConfig(_)) => {}
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn tracked_wraps_foreign_types() {
    let registry = registry();
    let mut numbers = Tracked::new_in(vec![1, 2, 3], &registry);
    numbers.push(4);
    numbers.associate("sorted", "label");

    assert_eq!(numbers.len(), 4);
    assert_eq!(numbers.associated_value::<&'static str>("label"), Some("sorted"));
}

#[test]
fn smart_pointers_forward_to_their_instance() {
    let registry = registry();
    let shared = Arc::new(MyClass::new(&registry));
    let alias = Arc::clone(&shared);

    alias.associate(7u16, "lucky");
    assert_eq!(shared.associated_value::<u16>("lucky"), Some(7));
    assert_eq!(shared.instance_id(), alias.instance_id());

    let local = Rc::new(Tracked::new_in((), &registry));
    local.associate(1u8, "one");
    assert_eq!(Rc::clone(&local).associated_value::<u8>("one"), Some(1));

    let boxed: Box<MyClass> = Box::new(MyClass::new(&registry));
    assert!(boxed.is_associated("Greeting"));
    assert!((&boxed).is_associated("Greeting"));
}

#[test]
fn arc_handles_outlive_disassociation() {
    let registry = registry();
    let obj = AssocToken::new_in(&registry);
    obj.associate(vec![1u8, 2, 3], "bytes");

    let handle = obj.associated_arc::<Vec<u8>>("bytes").unwrap();
    obj.disassociate("bytes");

    assert!(!obj.is_associated("bytes"));
    assert_eq!(*handle, vec![1, 2, 3]);
}
