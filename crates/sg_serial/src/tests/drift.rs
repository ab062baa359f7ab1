//! Loading into a registry that has changed since the save.

use sg_reflect::info::{EnumInfo, MemberInfo, ObjectInfo, PrimitiveKind, TypeInfo};
use sg_reflect::{Heap, TypeRegistry, Value};

use super::fixtures::{base, gadget, sub_class};
use super::{member, obj, transfer};
use crate::SerializerOptions;

fn single(info: TypeInfo) -> TypeRegistry {
    let mut registry = TypeRegistry::new();
    registry.register(info).unwrap();
    registry
}

fn holder(gadget_path: &str) -> TypeInfo {
    TypeInfo::object(
        "app::Holder",
        ObjectInfo::new().with_members([
            MemberInfo::field("gadget", gadget_path),
            MemberInfo::field("label", "string"),
        ]),
    )
}

/// Saves a `app::Holder { gadget: Gadget { serial: 7 }, label: "kept" }`.
fn saved_holder(from: &TypeRegistry, into: &TypeRegistry) -> (Heap, Value) {
    let mut heap = Heap::new();
    let holder_key = from.key_of("app::Holder").unwrap();
    let gadget_key = from.get_with_type_name("Gadget").unwrap().key();
    let holder = heap.new_object(from, holder_key).unwrap();
    let gadget = heap.new_object(from, gadget_key).unwrap();
    heap.set_member(from, gadget, "serial", 7_i32).unwrap();
    heap.set_member(from, holder, "gadget", Value::Ref(gadget)).unwrap();
    heap.set_member(from, holder, "label", "kept").unwrap();
    transfer(from, &heap, &Value::Ref(holder), into, SerializerOptions::default())
}

fn with_holder(gadget_info: Option<TypeInfo>, gadget_path: &str) -> TypeRegistry {
    let mut registry = TypeRegistry::new();
    if let Some(info) = gadget_info {
        registry.register(info).unwrap();
    }
    registry.register(holder(gadget_path)).unwrap();
    registry
}

#[test]
fn field_renamed_to_property() {
    let before = single(TypeInfo::object(
        "app::Setting",
        ObjectInfo::new().with_member(MemberInfo::field("value", "i32")),
    ));
    let after = single(TypeInfo::object(
        "app::Setting",
        ObjectInfo::new().with_member(MemberInfo::property("value", "i32")),
    ));

    let mut heap = Heap::new();
    let setting = heap.new_object(&before, before.key_of("app::Setting").unwrap()).unwrap();
    heap.set_member(&before, setting, "value", 17_i32).unwrap();

    let options = SerializerOptions::default();
    let (loaded, root) = transfer(&before, &heap, &Value::Ref(setting), &after, options.clone());
    assert_eq!(member(&after, &loaded, obj(&root), "value"), Value::from(17_i32));

    // And back again.
    let (loaded, root) = transfer(&after, &loaded, &root, &before, options);
    assert_eq!(member(&before, &loaded, obj(&root), "value"), Value::from(17_i32));
}

#[test]
fn added_and_removed_members() {
    let before = single(TypeInfo::object(
        "app::Setting",
        ObjectInfo::new().with_members([
            MemberInfo::field("removed", "string"),
            MemberInfo::field("value", "i32"),
        ]),
    ));
    let after = single(TypeInfo::object(
        "app::Setting",
        ObjectInfo::new().with_members([
            MemberInfo::field("value", "i32"),
            MemberInfo::field("added", "i32").with_default(3_i32),
        ]),
    ));

    let mut heap = Heap::new();
    let setting = heap.new_object(&before, before.key_of("app::Setting").unwrap()).unwrap();
    heap.set_member(&before, setting, "removed", "gone").unwrap();
    heap.set_member(&before, setting, "value", 17_i32).unwrap();

    let (loaded, root) =
        transfer(&before, &heap, &Value::Ref(setting), &after, SerializerOptions::default());
    let setting = obj(&root);
    assert_eq!(member(&after, &loaded, setting, "value"), Value::from(17_i32));
    assert_eq!(member(&after, &loaded, setting, "added"), Value::from(3_i32));
}

#[test]
fn changed_member_type_is_skipped() {
    let before = single(TypeInfo::object(
        "app::Counter",
        ObjectInfo::new().with_members([
            MemberInfo::field("count", "i32"),
            MemberInfo::field("label", "string"),
        ]),
    ));
    let after = single(TypeInfo::object(
        "app::Counter",
        ObjectInfo::new().with_members([
            MemberInfo::field("count", "i64"),
            MemberInfo::field("label", "string"),
        ]),
    ));

    let mut heap = Heap::new();
    let counter = heap.new_object(&before, before.key_of("app::Counter").unwrap()).unwrap();
    heap.set_member(&before, counter, "count", 9_i32).unwrap();
    heap.set_member(&before, counter, "label", "after the skip").unwrap();

    let (loaded, root) =
        transfer(&before, &heap, &Value::Ref(counter), &after, SerializerOptions::default());
    let counter = obj(&root);
    assert_eq!(member(&after, &loaded, counter, "count"), Value::from(0_i64));
    assert_eq!(member(&after, &loaded, counter, "label"), Value::from("after the skip"));
}

#[test]
fn missing_constructor_loads_null() {
    let before = with_holder(Some(gadget()), "app::Gadget");
    let after = with_holder(
        Some(TypeInfo::object(
            "app::Gadget",
            ObjectInfo::new()
                .without_constructor()
                .with_member(MemberInfo::field("serial", "i32")),
        )),
        "app::Gadget",
    );

    let (loaded, root) = saved_holder(&before, &after);
    let holder = obj(&root);
    assert_eq!(member(&after, &loaded, holder, "gadget"), Value::Null);
    assert_eq!(member(&after, &loaded, holder, "label"), Value::from("kept"));
}

#[test]
fn removed_type_loads_null() {
    let before = with_holder(Some(gadget()), "app::Gadget");
    let after = with_holder(None, "app::Gadget");

    let (loaded, root) = saved_holder(&before, &after);
    let holder = obj(&root);
    assert_eq!(member(&after, &loaded, holder, "gadget"), Value::Null);
    assert_eq!(member(&after, &loaded, holder, "label"), Value::from("kept"));
}

#[test]
fn unknown_root_loads_null() {
    let before = single(gadget());
    let after = TypeRegistry::new();

    let mut heap = Heap::new();
    let gadget = heap.new_object(&before, before.key_of("app::Gadget").unwrap()).unwrap();
    let (loaded, root) =
        transfer(&before, &heap, &Value::Ref(gadget), &after, SerializerOptions::default());
    assert_eq!(root, Value::Null);
    assert!(loaded.is_empty());
}

#[test]
fn kind_change_loads_null() {
    let before = with_holder(Some(gadget()), "app::Gadget");
    let after = with_holder(
        Some(TypeInfo::enumeration(
            "app::Gadget",
            EnumInfo::new(PrimitiveKind::I32).with_variant("Only", 0),
        )),
        "app::Gadget",
    );

    let (loaded, root) = saved_holder(&before, &after);
    let holder = obj(&root);
    assert_eq!(member(&after, &loaded, holder, "label"), Value::from("kept"));
    assert_eq!(member(&after, &loaded, holder, "gadget").as_obj(), None);
}

#[test]
fn moved_type_resolves_by_name() {
    let before = with_holder(Some(gadget()), "app::Gadget");
    let moved = TypeInfo::object(
        "devices::Gadget",
        ObjectInfo::new().with_member(MemberInfo::field("serial", "i32")),
    );
    let after = with_holder(Some(moved), "devices::Gadget");

    let (loaded, root) = saved_holder(&before, &after);
    let gadget = obj(&member(&after, &loaded, obj(&root), "gadget"));
    assert_eq!(loaded.type_of(gadget).unwrap(), after.key_of("devices::Gadget").unwrap());
    assert_eq!(member(&after, &loaded, gadget, "serial"), Value::from(7_i32));
}

#[test]
fn broken_inheritance_loads_null() {
    let mut before = TypeRegistry::new();
    before.register(base()).unwrap();
    let derived_key = before.register(sub_class()).unwrap();
    let bases = before.list_of("app::Base").unwrap();

    let mut after = TypeRegistry::new();
    after.register(base()).unwrap();
    after
        .register(TypeInfo::object(
            "app::SubClass",
            ObjectInfo::new().with_member(MemberInfo::field("extra", "string")),
        ))
        .unwrap();
    after.list_of("app::Base").unwrap();

    let mut heap = Heap::new();
    let derived = heap.new_object(&before, derived_key).unwrap();
    let list = heap
        .new_list(&before, bases, [Value::Ref(derived), Value::Ref(derived)])
        .unwrap();

    let (loaded, root) =
        transfer(&before, &heap, &Value::Ref(list), &after, SerializerOptions::default());
    assert_eq!(loaded.list(obj(&root)).unwrap(), &[Value::Null, Value::Null]);
}
