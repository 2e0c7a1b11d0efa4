use super::*;
use serde_json::{json, Value};

struct TestClass;
struct OtherClass;

fn isolated_store() -> Arc<RegistryStore> {
    Arc::new(RegistryStore::new())
}

fn create_json(
    store: &Arc<RegistryStore>,
    config: RegistryConfig,
) -> RegistryHandle<Value, Value> {
    MetadataFactory::create_in(store.clone(), None, config).unwrap()
}

#[test]
fn test_create_generates_prefixed_unique_ids() {
    let store = isolated_store();
    let a = create_json(&store, RegistryConfig::default());
    let b = create_json(&store, RegistryConfig::default());

    assert!(a.registry_id().starts_with("registry-"));
    assert_ne!(a.registry_id(), b.registry_id());
    assert_eq!(store.len(), 2);
}

#[test]
fn test_creation_is_idempotent_by_id() {
    let store = isolated_store();
    let first = create_json(&store, RegistryConfig::new().with_id("auth").merged());
    let second = create_json(&store, RegistryConfig::new().with_id("auth").merged());

    first.attach_class::<TestClass>(json!({"role": "admin"})).unwrap();

    // Both handles observe the same underlying record.
    assert_eq!(
        second.class_metadata::<TestClass>().unwrap(),
        vec![json!({"role": "admin"})],
    );
    assert_eq!(store.len(), 1);
}

#[test]
fn test_create_rejects_existing_id_with_other_types() {
    let store = isolated_store();
    let _json = create_json(&store, RegistryConfig::new().with_id("auth"));

    let err = MetadataFactory::create_in::<String, String>(
        store.clone(),
        None,
        RegistryConfig::new().with_id("auth"),
    )
    .unwrap_err();
    assert!(matches!(err, RegistryError::TypeMismatch { .. }));
    assert!(err.to_string().contains("auth"));
}

#[test]
fn test_default_policy_replaces() {
    let store = isolated_store();
    let registry = create_json(&store, RegistryConfig::default());

    registry.attach_class::<TestClass>(json!({"role": "a"})).unwrap();
    registry.attach_class::<TestClass>(json!({"role": "b"})).unwrap();

    assert_eq!(
        registry.class_metadata::<TestClass>().unwrap(),
        vec![json!({"role": "b"})],
    );
}

#[test]
fn test_merge_policy_appends_in_attachment_order() {
    let store = isolated_store();
    let registry = create_json(&store, RegistryConfig::new().merged());

    registry.attach_class::<TestClass>(json!({"role": "admin"})).unwrap();
    registry.attach_class::<TestClass>(json!({"level": 5})).unwrap();

    assert_eq!(
        registry.class_metadata::<TestClass>().unwrap(),
        vec![json!({"role": "admin"}), json!({"level": 5})],
    );
}

#[test]
fn test_instance_metadata_equals_class_metadata() {
    let store = isolated_store();
    let registry = create_json(&store, RegistryConfig::new().merged());

    registry.attach_class::<TestClass>(json!({"role": "user"})).unwrap();
    registry.attach_class::<TestClass>(json!({"level": 2})).unwrap();

    let instance = TestClass;
    assert_eq!(
        registry.instance_metadata(&instance).unwrap(),
        registry.class_metadata::<TestClass>().unwrap(),
    );
    assert!(registry.has_instance_metadata(&instance).unwrap());
}

#[test]
fn test_untouched_keys_read_empty() {
    let store = isolated_store();
    let registry = create_json(&store, RegistryConfig::default());

    assert!(registry.class_metadata::<TestClass>().unwrap().is_empty());
    assert!(registry.method_metadata::<TestClass>("run").unwrap().is_empty());
    assert!(!registry.has_class_metadata::<TestClass>().unwrap());
    assert!(!registry.has_method_metadata::<TestClass>("run").unwrap());
    assert!(!registry.has_instance_metadata(&TestClass).unwrap());
}

#[test]
fn test_registries_are_isolated_from_each_other() {
    let store = isolated_store();
    let auth = create_json(&store, RegistryConfig::new().with_id("auth"));
    let routes = create_json(&store, RegistryConfig::new().with_id("routes"));

    auth.attach_class::<TestClass>(json!({"role": "admin"})).unwrap();
    routes.attach_class::<TestClass>(json!({"path": "/users"})).unwrap();

    assert_eq!(
        auth.class_metadata::<TestClass>().unwrap(),
        vec![json!({"role": "admin"})],
    );
    assert_eq!(
        routes.class_metadata::<TestClass>().unwrap(),
        vec![json!({"path": "/users"})],
    );
}

#[test]
fn test_operations_fail_after_store_tampering() {
    let store = isolated_store();
    let registry = create_json(&store, RegistryConfig::new().with_id("auth"));

    store.clear();

    let err = registry.attach_class::<TestClass>(json!({})).unwrap_err();
    assert!(matches!(err, RegistryError::NotFound(_)));
    assert!(err.to_string().contains("auth"));

    let err = registry.class_metadata::<TestClass>().unwrap_err();
    assert!(err.to_string().contains("auth"));
}

#[test]
fn test_reflection_fallback_without_provider() {
    let store = isolated_store();
    let registry: RegistryHandle<Value, Value> =
        MetadataFactory::create_in(store, None, RegistryConfig::new().with_reflection()).unwrap();

    // Degrades to the base operations without failing.
    assert!(registry.reflect().is_none());
    registry.attach_class::<TestClass>(json!({"role": "admin"})).unwrap();
    assert!(registry.has_class_metadata::<TestClass>().unwrap());
}

#[test]
fn test_method_metadata_replace_keeps_most_recent() {
    let store = isolated_store();
    let registry = create_json(&store, RegistryConfig::default());

    registry
        .attach_method::<TestClass>("test_method", json!({"role": "user"}))
        .unwrap();
    registry
        .attach_method::<TestClass>("test_method", json!({"role": "guest"}))
        .unwrap();

    assert_eq!(
        registry.method_metadata::<TestClass>("test_method").unwrap(),
        vec![json!({"role": "guest"})],
    );
}

#[test]
fn test_method_metadata_merge_and_isolation_per_method() {
    let store = isolated_store();
    let registry = create_json(&store, RegistryConfig::new().merged());

    registry.attach_method::<TestClass>("create", json!(1)).unwrap();
    registry.attach_method::<TestClass>("create", json!(2)).unwrap();
    registry.attach_method::<TestClass>("delete", json!(3)).unwrap();
    registry.attach_method::<OtherClass>("create", json!(4)).unwrap();

    assert_eq!(
        registry.method_metadata::<TestClass>("create").unwrap(),
        vec![json!(1), json!(2)],
    );
    assert_eq!(
        registry.method_metadata::<TestClass>("delete").unwrap(),
        vec![json!(3)],
    );
    assert_eq!(
        registry.method_metadata::<OtherClass>("create").unwrap(),
        vec![json!(4)],
    );
}

#[test]
fn test_all_metadata_snapshots() {
    let store = isolated_store();
    let registry = create_json(&store, RegistryConfig::new().merged());

    registry.attach_class::<TestClass>(json!("a")).unwrap();
    registry.attach_class::<OtherClass>(json!("b")).unwrap();
    registry.attach_method::<TestClass>("run", json!("c")).unwrap();

    let classes = registry.all_class_metadata().unwrap();
    assert_eq!(classes.len(), 2);
    assert_eq!(classes[&ClassKey::of::<TestClass>()], vec![json!("a")]);
    assert_eq!(classes[&ClassKey::of::<OtherClass>()], vec![json!("b")]);

    let methods = registry.all_method_metadata().unwrap();
    assert_eq!(methods.len(), 1);
    assert_eq!(methods[&ClassKey::of::<TestClass>()]["run"], vec![json!("c")]);
}

#[test]
fn test_handle_clone_shares_the_record() {
    let store = isolated_store();
    let registry = create_json(&store, RegistryConfig::new().merged());
    let clone = registry.clone();

    registry.attach_class::<TestClass>(json!(1)).unwrap();
    clone.attach_class::<TestClass>(json!(2)).unwrap();

    assert_eq!(
        registry.class_metadata::<TestClass>().unwrap(),
        vec![json!(1), json!(2)],
    );
    assert_eq!(clone.registry_id(), registry.registry_id());
}

#[test]
fn test_create_uses_the_global_store() {
    // Unique ID so parallel tests sharing the global store cannot collide.
    let registry: RegistryHandle<Value, Value> =
        MetadataFactory::create(RegistryConfig::default()).unwrap();
    assert!(RegistryStore::global().has(registry.registry_id()));

    registry.attach_class::<TestClass>(json!({"role": "admin"})).unwrap();
    assert!(registry.has_class_metadata::<TestClass>().unwrap());
}

#[test]
fn test_concurrent_merge_attachments_all_land() {
    let store = isolated_store();
    let registry: RegistryHandle<usize, usize> =
        MetadataFactory::create_in(store, None, RegistryConfig::new().merged()).unwrap();

    let threads: Vec<_> = (0..8usize)
        .map(|t| {
            let registry = registry.clone();
            std::thread::spawn(move || {
                for i in 0..25 {
                    registry.attach_class::<TestClass>(t * 25 + i).unwrap();
                }
            })
        })
        .collect();
    for thread in threads {
        thread.join().unwrap();
    }

    assert_eq!(registry.class_metadata::<TestClass>().unwrap().len(), 200);
}
