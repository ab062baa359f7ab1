use sg_reflect::{Heap, ObjRef, TypeRegistry, Value};

use super::fixtures::{Types, registry};
use super::{member, obj, transfer};
use crate::{Serializer, SerializerOptions};

fn profile(registry: &TypeRegistry, types: &Types, heap: &mut Heap) -> ObjRef {
    let vault = heap.new_object(registry, types.vault).unwrap();
    heap.set_member(registry, vault, "pin", 1234_i32).unwrap();
    let profile = heap.new_object(registry, types.profile).unwrap();
    heap.set_member(registry, profile, "name", "visible").unwrap();
    heap.set_member(registry, profile, "secret", "hidden").unwrap();
    heap.set_member(registry, profile, "vault", Value::Ref(vault)).unwrap();
    profile
}

#[test]
fn everything_passes_by_default() {
    let (registry, types) = registry();
    let mut heap = Heap::new();
    let root = profile(&registry, &types, &mut heap);

    let options = SerializerOptions::default();
    let (loaded, root) = transfer(&registry, &heap, &Value::Ref(root), &registry, options);
    let root = obj(&root);
    assert_eq!(member(&registry, &loaded, root, "secret"), Value::from("hidden"));
    let vault = obj(&member(&registry, &loaded, root, "vault"));
    assert_eq!(member(&registry, &loaded, vault, "pin"), Value::from(1234_i32));
}

#[test]
fn filtered_on_save() {
    let (registry, types) = registry();
    let mut heap = Heap::new();
    let root = profile(&registry, &types, &mut heap);

    let public_only = SerializerOptions::default().public_only(true);
    let bytes = Serializer::with_options(&registry, public_only)
        .save_to_vec(&heap, &Value::Ref(root))
        .unwrap();
    let mut loaded = Heap::new();
    let root = Serializer::new(&registry)
        .load(&mut loaded, &mut bytes.as_slice())
        .unwrap();
    let root = obj(&root);

    assert_eq!(member(&registry, &loaded, root, "name"), Value::from("visible"));
    assert_eq!(member(&registry, &loaded, root, "secret"), Value::Null);
    assert_eq!(member(&registry, &loaded, root, "vault"), Value::Null);
    assert_eq!(loaded.len(), 1);
}

#[test]
fn filtered_on_load() {
    let (registry, types) = registry();
    let mut heap = Heap::new();
    let root = profile(&registry, &types, &mut heap);

    let bytes = Serializer::new(&registry)
        .save_to_vec(&heap, &Value::Ref(root))
        .unwrap();
    let mut loaded = Heap::new();
    let public_only = SerializerOptions::default().public_only(true);
    let root = Serializer::with_options(&registry, public_only)
        .load(&mut loaded, &mut bytes.as_slice())
        .unwrap();
    let root = obj(&root);

    assert_eq!(member(&registry, &loaded, root, "name"), Value::from("visible"));
    assert_eq!(member(&registry, &loaded, root, "secret"), Value::Null);
    assert_eq!(member(&registry, &loaded, root, "vault"), Value::Null);
}

#[test]
fn unmarked_types_are_dropped() {
    let (registry, types) = registry();
    let mut heap = Heap::new();
    let loose = heap.new_object(&registry, types.loose).unwrap();
    heap.set_member(&registry, loose, "note", "unmarked owner").unwrap();

    let options = SerializerOptions::default().public_only(true);
    let (loaded, root) = transfer(&registry, &heap, &Value::Ref(loose), &registry, options);
    assert_eq!(root, Value::Null);
    assert!(loaded.is_empty());
}

#[test]
fn value_roots_stay_public() {
    let (registry, _) = registry();
    let heap = Heap::new();
    let options = SerializerOptions::default().public_only(true);
    let (_, root) = transfer(&registry, &heap, &Value::from("plain"), &registry, options);
    assert_eq!(root, Value::from("plain"));
}
