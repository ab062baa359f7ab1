use alloc::vec::Vec;

use sg_reflect::heap::Slot;
use sg_reflect::{Heap, TypeRegistry, Value};

use super::fixtures::{Types, registry};
use super::{member, obj};
use crate::{Error, Serializer, SerializerOptions};

/// A doc whose cover page is also its body.
fn saved_doc() -> (TypeRegistry, Types, Vec<u8>) {
    let (registry, types) = registry();
    let mut heap = Heap::new();
    let page = heap.new_object(&registry, types.page).unwrap();
    heap.set_member(&registry, page, "text", "once upon a time").unwrap();
    let doc = heap.new_object(&registry, types.doc).unwrap();
    heap.set_member(&registry, doc, "title", "tale").unwrap();
    heap.set_member(&registry, doc, "body", Value::Ref(page)).unwrap();
    heap.set_member(&registry, doc, "pages", 12_i32).unwrap();

    let bytes = Serializer::new(&registry)
        .save_to_vec(&heap, &Value::Ref(doc))
        .unwrap();
    (registry, types, bytes)
}

#[test]
fn virtual_property_waits_for_resolve() {
    let (registry, types, bytes) = saved_doc();
    let mut heap = Heap::new();
    let mut serializer = Serializer::new(&registry);
    let doc = obj(&serializer.load_lazy(&mut heap, &mut bytes.as_slice()).unwrap());

    assert!(matches!(
        heap.slot(&registry, doc, "body").unwrap(),
        Slot::Unloaded(Some(_))
    ));
    assert_eq!(member(&registry, &heap, doc, "body"), Value::Null);
    assert_eq!(member(&registry, &heap, doc, "title"), Value::from("tale"));
    assert_eq!(member(&registry, &heap, doc, "pages"), Value::from(12_i32));
    // The body is not materialized yet.
    assert_eq!(heap.iter().filter(|(_, o)| o.ty() == types.page).count(), 0);

    let body = serializer.resolve_member(&mut heap, doc, "body").unwrap();
    let page = obj(&body);
    assert_eq!(member(&registry, &heap, page, "text"), Value::from("once upon a time"));
    assert_eq!(heap.slot(&registry, doc, "body").unwrap(), &Slot::Loaded(body.clone()));

    // Resolving again is a plain read.
    assert_eq!(serializer.resolve_member(&mut heap, doc, "body").unwrap(), body);
    assert_eq!(serializer.resolve_member(&mut heap, doc, "title").unwrap(), Value::from("tale"));
}

#[test]
fn lazy_target_keeps_identity() {
    let (registry, types) = registry();
    let mut heap = Heap::new();
    let page = heap.new_object(&registry, types.page).unwrap();
    let doc = heap.new_object(&registry, types.doc).unwrap();
    heap.set_member(&registry, doc, "cover", Value::Ref(page)).unwrap();
    heap.set_member(&registry, doc, "body", Value::Ref(page)).unwrap();

    let options = SerializerOptions::default().lazy(true);
    let mut serializer = Serializer::with_options(&registry, options);
    let bytes = serializer.save_to_vec(&heap, &Value::Ref(doc)).unwrap();
    let mut loaded = Heap::new();
    let doc = obj(&serializer.load(&mut loaded, &mut bytes.as_slice()).unwrap());

    let cover = member(&registry, &loaded, doc, "cover");
    assert!(cover.as_obj().is_some());
    assert_eq!(serializer.resolve_member(&mut loaded, doc, "body").unwrap(), cover);
    assert_eq!(loaded.len(), 2);
}

#[test]
fn eager_load_ignores_virtual() {
    let (registry, _, bytes) = saved_doc();
    let mut heap = Heap::new();
    let doc = obj(&Serializer::new(&registry).load(&mut heap, &mut bytes.as_slice()).unwrap());

    let body = member(&registry, &heap, doc, "body");
    assert_eq!(member(&registry, &heap, obj(&body), "text"), Value::from("once upon a time"));
}

#[test]
fn stale_session() {
    let (registry, _, bytes) = saved_doc();
    let mut heap = Heap::new();
    let mut serializer = Serializer::new(&registry);
    let first = obj(&serializer.load_lazy(&mut heap, &mut bytes.as_slice()).unwrap());
    let second = obj(&serializer.load_lazy(&mut heap, &mut bytes.as_slice()).unwrap());

    let err = serializer.resolve_member(&mut heap, first, "body").unwrap_err();
    assert!(matches!(err, Error::NoActiveSession), "{err:?}");
    assert!(serializer.resolve_member(&mut heap, second, "body").unwrap().as_obj().is_some());

    let third = obj(&serializer.load_lazy(&mut heap, &mut bytes.as_slice()).unwrap());
    serializer.release_session();
    let err = serializer.resolve_member(&mut heap, third, "body").unwrap_err();
    assert!(matches!(err, Error::NoActiveSession), "{err:?}");
    // The member still reads as its default.
    assert_eq!(member(&registry, &heap, third, "body"), Value::Null);
}

#[test]
fn filtered_lazy_member_stays_default() {
    use sg_reflect::info::{MemberInfo, ObjectInfo, TypeInfo};

    let (_, _, bytes) = saved_doc();
    let mut after = TypeRegistry::new();
    after
        .register(TypeInfo::object(
            "app::Page",
            ObjectInfo::new().with_member(MemberInfo::field("text", "string")),
        ))
        .unwrap();
    after
        .register(TypeInfo::object(
            "app::Doc",
            ObjectInfo::new().with_members([
                MemberInfo::field("cover", "app::Page"),
                MemberInfo::property("title", "string"),
                // Now holds a page number instead of a page.
                MemberInfo::property("body", "i32").with_virtual(),
                MemberInfo::property("pages", "i32").with_virtual(),
            ]),
        ))
        .unwrap();

    let mut heap = Heap::new();
    let mut serializer = Serializer::new(&after);
    let doc = obj(&serializer.load_lazy(&mut heap, &mut bytes.as_slice()).unwrap());

    assert_eq!(heap.slot(&after, doc, "body").unwrap(), &Slot::Unloaded(None));
    assert_eq!(serializer.resolve_member(&mut heap, doc, "body").unwrap(), Value::from(0_i32));
    assert_eq!(member(&after, &heap, doc, "pages"), Value::from(12_i32));
}

#[test]
fn save_refuses_deferred_members() {
    let (registry, _, bytes) = saved_doc();
    let mut heap = Heap::new();
    let mut serializer = Serializer::new(&registry);
    let doc = serializer.load_lazy(&mut heap, &mut bytes.as_slice()).unwrap();

    let err = serializer.save_to_vec(&heap, &doc).unwrap_err();
    assert!(matches!(&err, Error::Deferred(member) if member == "app::Doc.body"), "{err:?}");

    assert_eq!(serializer.resolve_all(&mut heap, &doc).unwrap(), 1);
    assert_eq!(serializer.resolve_all(&mut heap, &doc).unwrap(), 0);
    let resaved = serializer.save_to_vec(&heap, &doc).unwrap();

    let mut loaded = Heap::new();
    let copy = obj(&serializer.load(&mut loaded, &mut resaved.as_slice()).unwrap());
    let body = member(&registry, &loaded, copy, "body");
    assert_eq!(member(&registry, &loaded, obj(&body), "text"), Value::from("once upon a time"));
}

#[test]
fn resolve_all_needs_the_session() {
    let (registry, _, bytes) = saved_doc();
    let mut heap = Heap::new();
    let mut serializer = Serializer::new(&registry);
    let doc = serializer.load_lazy(&mut heap, &mut bytes.as_slice()).unwrap();
    serializer.release_session();

    let err = serializer.resolve_all(&mut heap, &doc).unwrap_err();
    assert!(matches!(err, Error::NoActiveSession), "{err:?}");
    assert!(matches!(
        heap.slot(&registry, obj(&doc), "body").unwrap(),
        Slot::Unloaded(Some(_))
    ));
}
