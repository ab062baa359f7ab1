use sg_reflect::{Heap, Value};

use super::fixtures::registry;
use super::{member, obj};
use crate::{Error, Serializer, SerializerOptions};

#[test]
fn direct_clone_of_cycle() {
    let (registry, types) = registry();
    let mut heap = Heap::new();
    let a = heap.new_object(&registry, types.circular).unwrap();
    heap.set_member(&registry, a, "this", Value::Ref(a)).unwrap();

    let copy = Serializer::new(&registry)
        .clone_direct(&mut heap, &Value::Ref(a))
        .unwrap();
    let copy = obj(&copy);
    assert_ne!(copy, a);
    assert_eq!(member(&registry, &heap, copy, "this"), Value::Ref(copy));
    assert_eq!(member(&registry, &heap, a, "this"), Value::Ref(a));
}

#[test]
fn clones_are_independent() {
    let (registry, types) = registry();
    let mut heap = Heap::new();
    let parent = heap.new_object(&registry, types.parent).unwrap();
    let child = heap.new_object(&registry, types.child).unwrap();
    heap.set_member(&registry, parent, "name", "original").unwrap();
    heap.set_member(&registry, parent, "child", Value::Ref(child)).unwrap();
    heap.set_member(&registry, child, "parent", Value::Ref(parent)).unwrap();

    let mut serializer = Serializer::new(&registry);
    for copy in [
        serializer.clone(&mut heap, &Value::Ref(parent)).unwrap(),
        serializer.clone_direct(&mut heap, &Value::Ref(parent)).unwrap(),
    ] {
        let copy = obj(&copy);
        let copied_child = obj(&member(&registry, &heap, copy, "child"));
        assert_ne!(copied_child, child);
        assert_eq!(member(&registry, &heap, copied_child, "parent"), Value::Ref(copy));

        heap.set_member(&registry, copy, "name", "changed").unwrap();
        assert_eq!(member(&registry, &heap, parent, "name"), Value::from("original"));
    }
}

#[test]
fn direct_clone_of_containers() {
    let (registry, types) = registry();
    let mut heap = Heap::new();
    let derived = heap.new_object(&registry, types.sub_class).unwrap();
    heap.set_member(&registry, derived, "extra", "copied").unwrap();
    let blob = heap.new_bytes([9_u8, 8]).unwrap();
    let scores = heap
        .new_map(&registry, types.scores, [(Value::from("a"), Value::from(1_i32))])
        .unwrap();
    let list = heap
        .new_list(
            &registry,
            types.objects,
            [Value::Ref(derived), Value::Ref(blob), Value::Ref(scores), Value::Ref(derived)],
        )
        .unwrap();

    let copy = Serializer::new(&registry)
        .clone_direct(&mut heap, &Value::Ref(list))
        .unwrap();
    let items = heap.list(obj(&copy)).unwrap().clone();
    assert_eq!(items.len(), 4);
    assert_eq!(items[0], items[3]);
    assert_ne!(items[0], Value::Ref(derived));
    assert_eq!(heap.type_of(obj(&items[0])).unwrap(), types.sub_class);
    assert_eq!(member(&registry, &heap, obj(&items[0]), "extra"), Value::from("copied"));
    assert_eq!(heap.bytes(obj(&items[1])).unwrap(), &[9, 8]);
    assert_eq!(heap.map(obj(&items[2])).unwrap().len(), 1);
}

#[test]
fn values_are_not_cloneable() {
    let (registry, _) = registry();
    let mut heap = Heap::new();
    let mut serializer = Serializer::new(&registry);

    let err = serializer.clone_direct(&mut heap, &Value::from("text")).unwrap_err();
    assert!(matches!(&err, Error::NotCloneable(path) if path == "string"), "{err:?}");
    assert_eq!(serializer.clone_direct(&mut heap, &Value::Null).unwrap(), Value::Null);
}

#[test]
fn direct_clone_respects_privacy() {
    let (registry, types) = registry();
    let mut heap = Heap::new();
    let profile = heap.new_object(&registry, types.profile).unwrap();
    heap.set_member(&registry, profile, "name", "visible").unwrap();
    heap.set_member(&registry, profile, "secret", "hidden").unwrap();

    let options = SerializerOptions::default().public_only(true);
    let copy = Serializer::with_options(&registry, options)
        .clone_direct(&mut heap, &Value::Ref(profile))
        .unwrap();
    assert_eq!(member(&registry, &heap, obj(&copy), "name"), Value::from("visible"));
    assert_eq!(member(&registry, &heap, obj(&copy), "secret"), Value::Null);
}

#[test]
fn clone_keeps_the_lazy_session() {
    let (registry, types) = registry();
    let mut heap = Heap::new();
    let page = heap.new_object(&registry, types.page).unwrap();
    let doc = heap.new_object(&registry, types.doc).unwrap();
    heap.set_member(&registry, doc, "body", Value::Ref(page)).unwrap();

    let mut serializer = Serializer::new(&registry);
    let bytes = serializer.save_to_vec(&heap, &Value::Ref(doc)).unwrap();
    let lazy = obj(&serializer.load_lazy(&mut heap, &mut bytes.as_slice()).unwrap());

    serializer.clone(&mut heap, &Value::Ref(doc)).unwrap();
    assert!(serializer.resolve_member(&mut heap, lazy, "body").unwrap().as_obj().is_some());
}

#[test]
fn clone_of_lazy_graph_resolves_deferred_members() {
    let (registry, types) = registry();
    let mut heap = Heap::new();
    let page = heap.new_object(&registry, types.page).unwrap();
    heap.set_member(&registry, page, "text", "kept").unwrap();
    let doc = heap.new_object(&registry, types.doc).unwrap();
    heap.set_member(&registry, doc, "body", Value::Ref(page)).unwrap();
    heap.set_member(&registry, doc, "pages", 12_i32).unwrap();

    let mut serializer = Serializer::new(&registry);
    let bytes = serializer.save_to_vec(&heap, &Value::Ref(doc)).unwrap();
    let lazy = serializer.load_lazy(&mut heap, &mut bytes.as_slice()).unwrap();

    let copy = obj(&serializer.clone(&mut heap, &lazy).unwrap());
    let direct = obj(&serializer.clone_direct(&mut heap, &lazy).unwrap());
    for copy in [copy, direct] {
        let body = member(&registry, &heap, copy, "body");
        assert_ne!(body.as_obj(), None);
        assert_eq!(member(&registry, &heap, obj(&body), "text"), Value::from("kept"));
        assert_eq!(member(&registry, &heap, copy, "pages"), Value::from(12_i32));
    }
    // The source was resolved in place.
    assert!(heap.slot(&registry, obj(&lazy), "body").unwrap().is_loaded());
}
