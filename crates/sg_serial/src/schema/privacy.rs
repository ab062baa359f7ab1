use sg_reflect::info::{TypeKind, TypeShape, Visibility};
use sg_reflect::registry::{TypeKey, TypeRegistry};

use crate::Error;

/// The visibility rules of `PublicOnly` mode.
///
/// With `public_only` off every type and member passes.
#[derive(Clone, Copy)]
pub(crate) struct Privacy<'a> {
    registry: &'a TypeRegistry,
    public_only: bool,
}

impl<'a> Privacy<'a> {
    #[inline]
    pub const fn new(registry: &'a TypeRegistry, public_only: bool) -> Self {
        Self {
            registry,
            public_only,
        }
    }

    /// Returns `true` if `key` counts as public data.
    ///
    /// Explicitly public types are, and so are value shapes without an
    /// explicit attribute and containers whose element types are all public.
    pub fn is_public_type(&self, key: TypeKey) -> bool {
        let Some(entry) = self.registry.get(key) else {
            return false;
        };
        match entry.info().visibility() {
            Visibility::Public => true,
            Visibility::Private | Visibility::Protected => false,
            Visibility::Unspecified => match entry.info().shape() {
                TypeShape::Object(_) => false,
                shape if shape.kind().is_value_like() => true,
                shape => shape.element_paths().all(|path| {
                    self.registry
                        .key_of(path)
                        .is_some_and(|elem| self.is_public_type(elem))
                }),
            },
        }
    }

    /// The visibility `key` is treated with when it owns members.
    fn effective_visibility(&self, key: TypeKey) -> Visibility {
        if self.is_public_type(key) {
            return Visibility::Public;
        }
        self.registry
            .get(key)
            .map_or(Visibility::Private, |entry| entry.info().visibility())
    }

    /// Returns `true` if objects of `key` may be written or materialized.
    ///
    /// Logs [`Error::NotPublicNotPrivate`] for object types lacking an
    /// attribute, which are then treated as unknown.
    pub fn is_serialized(&self, key: TypeKey) -> bool {
        if !self.public_only {
            return true;
        }
        match self.effective_visibility(key) {
            Visibility::Public | Visibility::Protected => true,
            Visibility::Private => false,
            Visibility::Unspecified => {
                if let Some(entry) = self.registry.get(key)
                    && entry.info().kind() == TypeKind::Object
                {
                    log::warn!("{}", Error::NotPublicNotPrivate(entry.path().into()));
                }
                false
            }
        }
    }

    /// Returns `true` if a member with `visibility` inside `owner` passes the filter.
    pub fn member_allowed(&self, owner: TypeKey, visibility: Visibility) -> bool {
        if !self.public_only {
            return true;
        }
        match visibility {
            Visibility::Public => true,
            Visibility::Private => false,
            Visibility::Protected => matches!(
                self.effective_visibility(owner),
                Visibility::Public | Visibility::Protected
            ),
            Visibility::Unspecified => self.effective_visibility(owner) == Visibility::Public,
        }
    }
}

/// The stricter of two member visibilities.
///
/// Private is strictest, then unspecified (needs a public owner), then
/// protected, then public.
pub(crate) fn stricter(a: Visibility, b: Visibility) -> Visibility {
    const fn rank(v: Visibility) -> u8 {
        match v {
            Visibility::Public => 0,
            Visibility::Protected => 1,
            Visibility::Unspecified => 2,
            Visibility::Private => 3,
        }
    }
    if rank(a) >= rank(b) { a } else { b }
}
