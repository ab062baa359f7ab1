//! Damaged streams: broken structure fails the load, a broken payload
//! costs only its own object.

use alloc::vec::Vec;

use sg_reflect::{Heap, TypeRegistry, Value};

use super::fixtures::{Types, registry};
use super::{member, obj};
use crate::Serializer;

fn saved_doc(title: &str) -> (TypeRegistry, Types, Vec<u8>) {
    let (registry, types) = registry();
    let mut heap = Heap::new();
    let page = heap.new_object(&registry, types.page).unwrap();
    heap.set_member(&registry, page, "text", "first page").unwrap();
    let doc = heap.new_object(&registry, types.doc).unwrap();
    heap.set_member(&registry, doc, "title", title).unwrap();
    heap.set_member(&registry, doc, "cover", Value::Ref(page)).unwrap();
    heap.set_member(&registry, doc, "pages", 12_i32).unwrap();

    let bytes = Serializer::new(&registry)
        .save_to_vec(&heap, &Value::Ref(doc))
        .unwrap();
    (registry, types, bytes)
}

/// Marks the first occurrence of `text` in `bytes` as invalid UTF-8.
fn break_utf8(bytes: &mut [u8], text: &str) {
    let at = bytes
        .windows(text.len())
        .position(|window| window == text.as_bytes())
        .expect("text is not in the stream");
    bytes[at] = 0xFF;
}

#[test]
fn every_truncation_fails() {
    let (registry, _, bytes) = saved_doc("tale");
    let mut serializer = Serializer::new(&registry);

    for len in 0..bytes.len() {
        let prefix = &bytes[..len];
        let mut heap = Heap::new();
        assert!(
            serializer.load(&mut heap, &mut &*prefix).is_err(),
            "a {len} byte prefix loaded"
        );
        assert!(
            serializer.load_lazy(&mut heap, &mut &*prefix).is_err(),
            "a {len} byte prefix loaded lazily"
        );
    }

    let mut heap = Heap::new();
    assert!(serializer.load(&mut heap, &mut bytes.as_slice()).is_ok());
}

#[test]
fn broken_member_spares_its_siblings() {
    let (registry, _, mut bytes) = saved_doc("unreadable");
    break_utf8(&mut bytes, "unreadable");

    let mut heap = Heap::new();
    let doc = obj(&Serializer::new(&registry).load(&mut heap, &mut bytes.as_slice()).unwrap());
    assert_eq!(member(&registry, &heap, doc, "title"), Value::Null);
    assert_eq!(member(&registry, &heap, doc, "pages"), Value::from(12_i32));
    let cover = member(&registry, &heap, doc, "cover");
    assert_eq!(member(&registry, &heap, obj(&cover), "text"), Value::from("first page"));
}

#[test]
fn broken_element_spares_its_siblings() {
    let (registry, types) = registry();
    let mut heap = Heap::new();
    let items = ["alpha", "bravo", "charlie"].map(Value::from);
    let list = heap.new_list(&registry, types.strings, items).unwrap();

    let mut serializer = Serializer::new(&registry);
    let mut bytes = serializer.save_to_vec(&heap, &Value::Ref(list)).unwrap();
    break_utf8(&mut bytes, "bravo");

    let mut loaded = Heap::new();
    let root = serializer.load(&mut loaded, &mut bytes.as_slice()).unwrap();
    assert_eq!(
        loaded.list(obj(&root)).unwrap(),
        &[Value::from("alpha"), Value::Null, Value::from("charlie")]
    );
}
