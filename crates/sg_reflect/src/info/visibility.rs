use core::fmt;

// -----------------------------------------------------------------------------
// Visibility

/// Data visibility attribute of a type or member.
///
/// Only consulted when a serializer runs in public-only mode:
///
/// - `Public`: always serialized.
/// - `Private`: never serialized.
/// - `Protected`: a type may be carried, but its unmarked members stay private.
/// - `Unspecified`: types are treated as unknown; members follow their owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum Visibility {
    #[default]
    Unspecified = 0,
    Public = 1,
    Private = 2,
    Protected = 3,
}

impl Visibility {
    #[inline]
    pub const fn tag(self) -> u8 {
        self as u8
    }

    pub const fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Self::Unspecified),
            1 => Some(Self::Public),
            2 => Some(Self::Private),
            3 => Some(Self::Protected),
            _ => None,
        }
    }

    #[inline]
    pub const fn is_public(self) -> bool {
        matches!(self, Self::Public)
    }

    #[inline]
    pub const fn is_private(self) -> bool {
        matches!(self, Self::Private)
    }

    #[inline]
    pub const fn is_protected(self) -> bool {
        matches!(self, Self::Protected)
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unspecified => f.pad("Unspecified"),
            Self::Public => f.pad("Public"),
            Self::Private => f.pad("Private"),
            Self::Protected => f.pad("Protected"),
        }
    }
}
