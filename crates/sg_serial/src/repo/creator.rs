use alloc::boxed::Box;
use alloc::vec::Vec;

use sg_reflect::info::TypeShape;
use sg_reflect::registry::{TypeEntry, TypeKey, TypeRegistry};

use crate::Error;
use crate::repo::{Shape, UnknownReason};
use crate::schema::TypeSchema;

/// A strategy claiming the [`Shape`] of a [`TypeSchema`].
///
/// Returns `None` to let the next creator try.
///
/// # Examples
///
/// ```
/// use sg_reflect::registry::TypeRegistry;
/// use sg_serial::repo::UnknownReason;
/// use sg_serial::{RepoCreator, RepoCreators, Shape, TypeSchema};
///
/// /// Never stores timestamps.
/// struct DropDates;
///
/// impl RepoCreator for DropDates {
///     fn try_create(&self, schema: &TypeSchema, _: &TypeRegistry) -> Option<Shape> {
///         let dropped = Shape::Unknown(UnknownReason::NotSerialized);
///         (schema.path() == "DateTime").then_some(dropped)
///     }
/// }
///
/// let mut creators = RepoCreators::new();
/// creators.insert(0, DropDates);
/// assert_eq!(creators.len(), 12);
/// ```
pub trait RepoCreator: Send + Sync + 'static {
    fn try_create(&self, schema: &TypeSchema, registry: &TypeRegistry) -> Option<Shape>;
}

#[inline]
fn live_entry<'r>(schema: &TypeSchema, registry: &'r TypeRegistry) -> Option<&'r TypeEntry> {
    schema.runtime_type().and_then(|key| registry.get(key))
}

/// Claims types that do not resolve, are filtered out or changed kind.
pub struct UnknownCreator;

impl RepoCreator for UnknownCreator {
    fn try_create(&self, schema: &TypeSchema, registry: &TypeRegistry) -> Option<Shape> {
        let Some(entry) = live_entry(schema, registry) else {
            return Some(Shape::Unknown(UnknownReason::UnknownType));
        };
        if !schema.is_serialized() {
            return Some(Shape::Unknown(UnknownReason::NotSerialized));
        }
        let live = entry.info();
        if live.kind() != schema.kind() || live.primitive() != schema.primitive() {
            return Some(Shape::Unknown(UnknownReason::KindChanged));
        }
        None
    }
}

macro_rules! impl_shape_creator {
    ($($(#[$meta:meta])* $name:ident: $pattern:pat => $shape:expr;)*) => {
        $(
            $(#[$meta])*
            pub struct $name;

            impl RepoCreator for $name {
                fn try_create(&self, schema: &TypeSchema, registry: &TypeRegistry) -> Option<Shape> {
                    match live_entry(schema, registry)?.info().shape() {
                        $pattern => Some($shape),
                        _ => None,
                    }
                }
            }
        )*
    };
}

impl_shape_creator! {
    PrimitiveCreator: TypeShape::Primitive(kind) => Shape::Primitive(*kind);
    EnumCreator: TypeShape::Enum(_) => Shape::Enum;
    StringCreator: TypeShape::String => Shape::String;
    /// Claims `DateTime`, `DateTimeOffset`, `TimeSpan`, `TimeZoneInfo` and `Version`.
    DateTimeCreator: shape @ (TypeShape::DateTime
        | TypeShape::DateTimeOffset
        | TypeShape::TimeSpan
        | TypeShape::TimeZone
        | TypeShape::Version) => match shape {
            TypeShape::DateTime => Shape::DateTime,
            TypeShape::DateTimeOffset => Shape::DateTimeOffset,
            TypeShape::TimeSpan => Shape::TimeSpan,
            TypeShape::TimeZone => Shape::TimeZone,
            _ => Shape::Version,
        };
    TypeCreator: TypeShape::Type => Shape::Type;
    ArrayCreator: TypeShape::Array { .. } => Shape::Array;
    ListCreator: TypeShape::List { .. } => Shape::List;
    MapCreator: TypeShape::Map { .. } => Shape::Map;
    SetCreator: TypeShape::Set { .. } => Shape::Set;
}

/// Claims `u8[]` before [`ArrayCreator`] does.
pub struct BytesCreator;

impl RepoCreator for BytesCreator {
    fn try_create(&self, schema: &TypeSchema, registry: &TypeRegistry) -> Option<Shape> {
        let entry = live_entry(schema, registry)?;
        (entry.key() == TypeKey::BYTES).then_some(Shape::Bytes)
    }
}

/// The ordered list of [`RepoCreator`]s, first match wins.
///
/// [`RepoCreators::new`] holds the built-in creators in priority order:
/// unknown, primitive, enum, string, date/time, `Type`, byte array,
/// array, list, map and set. Types no creator claims become
/// [`Shape::Object`], or an unknown stub when they lack a constructor.
///
/// A `RepoCreators` is built once and shared with every
/// [`Serializer`](crate::Serializer) through an `Arc`.
pub struct RepoCreators {
    creators: Vec<Box<dyn RepoCreator>>,
}

impl Default for RepoCreators {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl RepoCreators {
    /// The built-in creators.
    pub fn new() -> Self {
        let mut creators = Self::empty();
        creators.push(UnknownCreator);
        creators.push(PrimitiveCreator);
        creators.push(EnumCreator);
        creators.push(StringCreator);
        creators.push(DateTimeCreator);
        creators.push(TypeCreator);
        creators.push(BytesCreator);
        creators.push(ArrayCreator);
        creators.push(ListCreator);
        creators.push(MapCreator);
        creators.push(SetCreator);
        creators
    }

    /// No creators at all: every resolvable type falls back to [`Shape::Object`].
    #[inline]
    pub const fn empty() -> Self {
        Self {
            creators: Vec::new(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.creators.len()
    }

    /// Appends a creator with the lowest priority.
    pub fn push(&mut self, creator: impl RepoCreator) {
        self.creators.push(Box::new(creator));
    }

    /// Inserts a creator at `index`, ahead of every later one.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn insert(&mut self, index: usize, creator: impl RepoCreator) {
        self.creators.insert(index, Box::new(creator));
    }

    /// Chooses the shape of `schema`.
    pub fn create(&self, schema: &TypeSchema, registry: &TypeRegistry) -> Shape {
        if let Some(shape) = self
            .creators
            .iter()
            .find_map(|creator| creator.try_create(schema, registry))
        {
            return shape;
        }

        match live_entry(schema, registry) {
            Some(entry) => match entry.object_info() {
                Some(object) if object.has_constructor() => Shape::Object,
                Some(_) => {
                    log::warn!("{}", Error::MissingConstructor(entry.path().into()));
                    Shape::Unknown(UnknownReason::MissingConstructor)
                }
                None => Shape::Unknown(UnknownReason::Unhandled),
            },
            None => Shape::Unknown(UnknownReason::UnknownType),
        }
    }
}
