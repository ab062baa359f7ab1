//! Whole-graph scenarios: save, load and clone against the shared fixtures.

mod cloning;
mod corrupt;
mod drift;
mod lazy;
mod privacy;

use sg_reflect::{Heap, ObjRef, TypeRegistry, Value};

use crate::{Serializer, SerializerOptions};

/// Saves `root` with `from` and loads it into a fresh heap with `into`.
fn transfer(
    from: &TypeRegistry,
    heap: &Heap,
    root: &Value,
    into: &TypeRegistry,
    options: SerializerOptions,
) -> (Heap, Value) {
    let bytes = Serializer::with_options(from, options.clone())
        .save_to_vec(heap, root)
        .unwrap();
    let mut loaded = Heap::new();
    let root = Serializer::with_options(into, options)
        .load(&mut loaded, &mut bytes.as_slice())
        .unwrap();
    (loaded, root)
}

/// Round trips `root` through one registry with default options.
fn round_trip(registry: &TypeRegistry, heap: &Heap, root: &Value) -> (Heap, Value) {
    transfer(registry, heap, root, registry, SerializerOptions::default())
}

fn member(registry: &TypeRegistry, heap: &Heap, obj: ObjRef, name: &str) -> Value {
    heap.member(registry, obj, name).unwrap()
}

fn obj(value: &Value) -> ObjRef {
    value.as_obj().expect("expected an object")
}
