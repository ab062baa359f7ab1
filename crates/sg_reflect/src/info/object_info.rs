use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::info::MemberInfo;

// -----------------------------------------------------------------------------
// ObjectInfo

/// A class-like type: ordered members plus an optional base type.
///
/// Members of the base type come first in the flattened member list kept
/// by the [`TypeRegistry`](crate::registry::TypeRegistry).
///
/// # Examples
///
/// ```
/// use sg_reflect::info::{MemberInfo, ObjectInfo};
///
/// let info = ObjectInfo::new()
///     .with_base("app::Base")
///     .with_member(MemberInfo::field("extra", "i32"))
///     .sealed();
///
/// assert_eq!(info.base(), Some("app::Base"));
/// assert_eq!(info.members().len(), 1);
/// assert!(info.is_sealed());
/// assert!(info.has_constructor());
/// ```
#[derive(Clone, Debug)]
pub struct ObjectInfo {
    base: Option<Arc<str>>,
    members: Vec<MemberInfo>,
    sealed: bool,
    has_constructor: bool,
}

impl Default for ObjectInfo {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectInfo {
    /// An unsealed, constructible type with no members.
    #[inline]
    pub const fn new() -> Self {
        Self {
            base: None,
            members: Vec::new(),
            sealed: false,
            has_constructor: true,
        }
    }

    #[inline]
    pub fn with_base(mut self, base: impl Into<Arc<str>>) -> Self {
        self.base = Some(base.into());
        self
    }

    #[inline]
    pub fn with_member(mut self, member: MemberInfo) -> Self {
        self.members.push(member);
        self
    }

    #[inline]
    pub fn with_members(mut self, members: impl IntoIterator<Item = MemberInfo>) -> Self {
        self.members.extend(members);
        self
    }

    /// No derived type can appear where this type is declared.
    #[inline]
    pub fn sealed(mut self) -> Self {
        self.sealed = true;
        self
    }

    /// The type has no accessible default constructor and cannot be materialized.
    #[inline]
    pub fn without_constructor(mut self) -> Self {
        self.has_constructor = false;
        self
    }

    #[inline]
    pub fn base(&self) -> Option<&str> {
        self.base.as_deref()
    }

    /// Members declared on this type only, in declaration order.
    #[inline]
    pub fn members(&self) -> &[MemberInfo] {
        &self.members
    }

    #[inline]
    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    #[inline]
    pub fn has_constructor(&self) -> bool {
        self.has_constructor
    }
}
