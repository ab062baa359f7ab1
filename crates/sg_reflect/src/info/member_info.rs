use alloc::sync::Arc;
use core::fmt;

use crate::info::Visibility;
use crate::value::Value;

// -----------------------------------------------------------------------------
// MemberKind

/// Whether a member is a plain field or a property.
///
/// Serialized objects list fields before properties. Only properties
/// can be loaded lazily.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MemberKind {
    Field = 0,
    Property = 1,
}

impl fmt::Display for MemberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field => f.pad("field"),
            Self::Property => f.pad("property"),
        }
    }
}

// -----------------------------------------------------------------------------
// MemberInfo

/// A field or property of an object type.
///
/// The declared type is referenced by path, so a member may name its own
/// owner (or a type registered later).
///
/// # Examples
///
/// ```
/// use sg_reflect::info::{MemberInfo, MemberKind, Visibility};
///
/// let member = MemberInfo::property("children", "List<app::Node>")
///     .with_virtual()
///     .private();
///
/// assert_eq!(member.kind(), MemberKind::Property);
/// assert!(member.is_virtual());
/// assert_eq!(member.visibility(), Visibility::Private);
/// ```
#[derive(Clone, Debug)]
pub struct MemberInfo {
    name: Arc<str>,
    ty: Arc<str>,
    kind: MemberKind,
    visibility: Visibility,
    is_virtual: bool,
    nullable: bool,
    serialized: bool,
    default: Option<Value>,
}

impl MemberInfo {
    /// Creates a member of the given kind.
    pub fn new(kind: MemberKind, name: impl Into<Arc<str>>, ty: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            kind,
            visibility: Visibility::Unspecified,
            is_virtual: false,
            nullable: false,
            serialized: true,
            default: None,
        }
    }

    #[inline]
    pub fn field(name: impl Into<Arc<str>>, ty: impl Into<Arc<str>>) -> Self {
        Self::new(MemberKind::Field, name, ty)
    }

    #[inline]
    pub fn property(name: impl Into<Arc<str>>, ty: impl Into<Arc<str>>) -> Self {
        Self::new(MemberKind::Property, name, ty)
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

    /// Marks a property as overridable, which makes it eligible for lazy loading.
    ///
    /// Has no effect on fields.
    #[inline]
    pub fn with_virtual(mut self) -> Self {
        self.is_virtual = self.kind == MemberKind::Property;
        self
    }

    /// Allows a primitive-typed member to hold `null`; its default becomes `null`.
    #[inline]
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Excludes the member from serialization entirely.
    #[inline]
    pub fn non_serialized(mut self) -> Self {
        self.serialized = false;
        self
    }

    /// The value a freshly constructed owner holds in this member.
    #[inline]
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path of the declared type.
    #[inline]
    pub fn type_path(&self) -> &str {
        &self.ty
    }

    #[inline]
    pub fn kind(&self) -> MemberKind {
        self.kind
    }

    #[inline]
    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    #[inline]
    pub fn is_virtual(&self) -> bool {
        self.is_virtual
    }

    #[inline]
    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    #[inline]
    pub fn is_serialized(&self) -> bool {
        self.serialized
    }

    /// The explicit constructor default, if one was given.
    #[inline]
    pub fn explicit_default(&self) -> Option<&Value> {
        self.default.as_ref()
    }
}
