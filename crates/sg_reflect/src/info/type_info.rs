use alloc::sync::Arc;
use core::{error, fmt};

use crate::info::{EnumInfo, ObjectInfo, PrimitiveKind, Visibility};

// -----------------------------------------------------------------------------
// TypeKind

/// An enumeration of the "kinds" of a registered type.
///
/// A [`TypeKind`] is a fast discriminator of [`TypeShape`], and its
/// discriminant is the tag written into serialized type schemas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TypeKind {
    Object = 0,
    Primitive = 1,
    String = 2,
    Enum = 3,
    DateTime = 4,
    DateTimeOffset = 5,
    TimeSpan = 6,
    TimeZone = 7,
    Version = 8,
    Type = 9,
    Array = 10,
    List = 11,
    Map = 12,
    Set = 13,
}

impl TypeKind {
    #[inline]
    pub const fn tag(self) -> u8 {
        self as u8
    }

    pub const fn from_tag(tag: u8) -> Option<Self> {
        Some(match tag {
            0 => Self::Object,
            1 => Self::Primitive,
            2 => Self::String,
            3 => Self::Enum,
            4 => Self::DateTime,
            5 => Self::DateTimeOffset,
            6 => Self::TimeSpan,
            7 => Self::TimeZone,
            8 => Self::Version,
            9 => Self::Type,
            10 => Self::Array,
            11 => Self::List,
            12 => Self::Map,
            13 => Self::Set,
            _ => return None,
        })
    }

    /// Kinds whose values are immutable and live inline in a [`Value`].
    ///
    /// [`Value`]: crate::value::Value
    pub const fn is_value_like(self) -> bool {
        !matches!(
            self,
            Self::Object | Self::Array | Self::List | Self::Map | Self::Set
        )
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Object => "Object",
            Self::Primitive => "Primitive",
            Self::String => "String",
            Self::Enum => "Enum",
            Self::DateTime => "DateTime",
            Self::DateTimeOffset => "DateTimeOffset",
            Self::TimeSpan => "TimeSpan",
            Self::TimeZone => "TimeZone",
            Self::Version => "Version",
            Self::Type => "Type",
            Self::Array => "Array",
            Self::List => "List",
            Self::Map => "Map",
            Self::Set => "Set",
        }
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// Error returned when a `TypeInfo` value is not the expected `TypeKind`.
#[derive(Debug)]
pub struct TypeKindError {
    pub expected: TypeKind,
    pub received: TypeKind,
}

impl fmt::Display for TypeKindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "type kind mismatch: expected {}, received {}",
            self.expected, self.received
        )
    }
}

impl error::Error for TypeKindError {}

// -----------------------------------------------------------------------------
// TypeShape

/// The shape of a registered type.
///
/// Container element types are referenced by path.
#[derive(Debug, Clone)]
pub enum TypeShape {
    Object(ObjectInfo),
    Primitive(PrimitiveKind),
    String,
    Enum(EnumInfo),
    DateTime,
    DateTimeOffset,
    TimeSpan,
    TimeZone,
    Version,
    Type,
    Array { elem: Arc<str> },
    List { elem: Arc<str> },
    Map { key: Arc<str>, value: Arc<str> },
    Set { elem: Arc<str> },
}

impl TypeShape {
    pub const fn kind(&self) -> TypeKind {
        match self {
            Self::Object(_) => TypeKind::Object,
            Self::Primitive(_) => TypeKind::Primitive,
            Self::String => TypeKind::String,
            Self::Enum(_) => TypeKind::Enum,
            Self::DateTime => TypeKind::DateTime,
            Self::DateTimeOffset => TypeKind::DateTimeOffset,
            Self::TimeSpan => TypeKind::TimeSpan,
            Self::TimeZone => TypeKind::TimeZone,
            Self::Version => TypeKind::Version,
            Self::Type => TypeKind::Type,
            Self::Array { .. } => TypeKind::Array,
            Self::List { .. } => TypeKind::List,
            Self::Map { .. } => TypeKind::Map,
            Self::Set { .. } => TypeKind::Set,
        }
    }

    /// Paths of the element types of a container, in key/value order for maps.
    pub fn element_paths(&self) -> impl Iterator<Item = &str> {
        let (a, b) = match self {
            Self::Array { elem } | Self::List { elem } | Self::Set { elem } => (Some(elem), None),
            Self::Map { key, value } => (Some(key), Some(value)),
            _ => (None, None),
        };
        a.into_iter().chain(b).map(|p| &**p)
    }
}

// -----------------------------------------------------------------------------
// TypeInfo

/// Runtime information for one registered type.
///
/// # Content
///
/// - **path**: the unique type path, e.g. `"app::Circular"`.
/// - **visibility**: the data [`Visibility`] attribute.
/// - **shape**: a [`TypeShape`], which can be cast to internal info such as
///   [`ObjectInfo`] through [`as_object`](TypeInfo::as_object).
///
/// # Examples
///
/// ```
/// use sg_reflect::info::{MemberInfo, ObjectInfo, TypeInfo, TypeKind};
///
/// let info = TypeInfo::object(
///     "app::Node",
///     ObjectInfo::new().with_member(MemberInfo::field("next", "app::Node")),
/// )
/// .public();
///
/// assert_eq!(info.kind(), TypeKind::Object);
/// assert_eq!(info.name(), "Node");
/// assert_eq!(info.as_object().unwrap().members().len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct TypeInfo {
    path: Arc<str>,
    visibility: Visibility,
    shape: TypeShape,
}

// Helper macro that implements type-safe accessor methods like `as_object`.
macro_rules! impl_cast_method {
    ($name:ident : $kind:ident => $info:ident) => {
        /// Convert [`TypeInfo`] to specific type information.
        pub const fn $name(&self) -> Result<&$info, TypeKindError> {
            match &self.shape {
                TypeShape::$kind(info) => Ok(info),
                _ => Err(TypeKindError {
                    expected: TypeKind::$kind,
                    received: self.shape.kind(),
                }),
            }
        }
    };
}

impl TypeInfo {
    impl_cast_method!(as_object: Object => ObjectInfo);
    impl_cast_method!(as_enum: Enum => EnumInfo);

    #[inline]
    pub fn new(path: impl Into<Arc<str>>, shape: TypeShape) -> Self {
        Self {
            path: path.into(),
            visibility: Visibility::Unspecified,
            shape,
        }
    }

    #[inline]
    pub fn object(path: impl Into<Arc<str>>, info: ObjectInfo) -> Self {
        Self::new(path, TypeShape::Object(info))
    }

    #[inline]
    pub fn enumeration(path: impl Into<Arc<str>>, info: EnumInfo) -> Self {
        Self::new(path, TypeShape::Enum(info))
    }

    #[inline]
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    #[inline]
    pub fn public(self) -> Self {
        self.with_visibility(Visibility::Public)
    }

    #[inline]
    pub fn private(self) -> Self {
        self.with_visibility(Visibility::Private)
    }

    #[inline]
    pub fn protected(self) -> Self {
        self.with_visibility(Visibility::Protected)
    }

    /// The full, unique type path.
    #[inline]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[inline]
    pub(crate) fn path_arc(&self) -> &Arc<str> {
        &self.path
    }

    /// The path without its module prefix, may be duplicated.
    #[inline]
    pub fn name(&self) -> &str {
        short_name(&self.path)
    }

    #[inline]
    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    #[inline]
    pub fn shape(&self) -> &TypeShape {
        &self.shape
    }

    #[inline]
    pub const fn kind(&self) -> TypeKind {
        self.shape.kind()
    }

    /// The primitive kind, for primitive types.
    pub const fn primitive(&self) -> Option<PrimitiveKind> {
        match &self.shape {
            TypeShape::Primitive(kind) => Some(*kind),
            _ => None,
        }
    }
}

/// Strips the module prefix of the outermost type in `path`.
///
/// `"app::model::List<app::Item>"` becomes `"List<app::Item>"`.
pub(crate) fn short_name(path: &str) -> &str {
    let head_end = path.find('<').unwrap_or(path.len());
    match path[..head_end].rfind("::") {
        Some(i) => &path[i + 2..],
        None => path,
    }
}

#[cfg(test)]
mod tests {
    use super::{TypeKind, short_name};

    #[test]
    fn short_names() {
        assert_eq!(short_name("app::Circular"), "Circular");
        assert_eq!(short_name("List<app::Item>"), "List<app::Item>");
        assert_eq!(short_name("app::m::Pair<a::B, c::D>"), "Pair<a::B, c::D>");
        assert_eq!(short_name("i32"), "i32");
    }

    #[test]
    fn kind_tags() {
        for tag in 0..14 {
            assert_eq!(TypeKind::from_tag(tag).map(TypeKind::tag), Some(tag));
        }
        assert!(TypeKind::from_tag(14).is_none());
        assert!(TypeKind::Version.is_value_like());
        assert!(!TypeKind::List.is_value_like());
    }
}
