//! Provide [`TypeSchema`], the per-type metadata written ahead of the data.
//!
//! A schema is built from the live [`TypeRegistry`] on save and parsed back
//! from the stream on load, where its `runtime_type` is resolved against the
//! live registry and may be absent.
//!
//! ```text
//! path (u32 len + UTF-8) | kind u8 | [primitive u8] | flags u8
//! num_objects u32 | data_offset u64 | data_size u64
//! element count u8 | element type index u16 ...
//! [object kinds] field count u16 | MemberSchema ... | property count u16 | MemberSchema ...
//!
//! MemberSchema: name (u32 len + UTF-8) | type index u16 | visibility u8
//! ```

// -----------------------------------------------------------------------------
// Modules

mod privacy;

pub(crate) use privacy::{Privacy, stricter};

// -----------------------------------------------------------------------------
// TypeSchema

use alloc::sync::Arc;
use alloc::vec::Vec;
use std::io::{self, Read, Write};

use bitflags::bitflags;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use sg_reflect::info::{MemberKind, PrimitiveKind, TypeKind, Visibility};
use sg_reflect::registry::{TypeKey, TypeRegistry};

use crate::wire::{invalid_data, read_str, write_str};

bitflags! {
    /// Bitflags stored with every [`TypeSchema`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SchemaFlags: u8 {
        /// Objects of this type are written. Unset types only appear as null.
        const SERIALIZED      = 1 << 0;
        const PUBLIC          = 1 << 1;
        const PRIVATE         = 1 << 2;
        const PROTECTED       = 1 << 3;
        const HAS_CONSTRUCTOR = 1 << 4;
        /// Values of a derived type may appear where this type is declared.
        const HAS_SUB_TYPE    = 1 << 5;
    }
}

/// A serialized field or property of an object type.
#[derive(Debug, Clone)]
pub struct MemberSchema {
    pub(crate) name: Arc<str>,
    pub(crate) kind: MemberKind,
    /// Type index of the declared type.
    pub(crate) type_index: u16,
    pub(crate) visibility: Visibility,
    /// Index into the live object's member slots.
    pub(crate) slot: Option<usize>,
    pub(crate) is_loadable: bool,
    pub(crate) is_lazy: bool,
}

impl MemberSchema {
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn kind(&self) -> MemberKind {
        self.kind
    }

    #[inline]
    pub fn type_index(&self) -> u16 {
        self.type_index
    }

    #[inline]
    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// `false` if the stored bytes of this member are skipped on load.
    #[inline]
    pub fn is_loadable(&self) -> bool {
        self.is_loadable
    }

    #[inline]
    pub fn is_lazy(&self) -> bool {
        self.is_lazy
    }

    fn write<W: Write>(&self, w: &mut W) -> io::Result<()> {
        write_str(w, &self.name)?;
        w.write_u16::<LittleEndian>(self.type_index)?;
        w.write_u8(self.visibility.tag())
    }

    fn read<R: Read>(r: &mut R, kind: MemberKind) -> io::Result<Self> {
        let name = read_str(r)?;
        let type_index = r.read_u16::<LittleEndian>()?;
        let visibility =
            Visibility::from_tag(r.read_u8()?).ok_or_else(|| invalid_data("invalid visibility"))?;
        Ok(Self {
            name,
            kind,
            type_index,
            visibility,
            slot: None,
            is_loadable: false,
            is_lazy: false,
        })
    }
}

/// Metadata of one runtime type within one session.
#[derive(Debug, Clone)]
pub struct TypeSchema {
    pub(crate) path: Arc<str>,
    pub(crate) runtime_type: Option<TypeKey>,
    pub(crate) kind: TypeKind,
    pub(crate) primitive: Option<PrimitiveKind>,
    pub(crate) flags: SchemaFlags,
    pub(crate) num_objects: u32,
    pub(crate) data_offset: u64,
    pub(crate) data_size: u64,
    /// Type indices of the element types, `[key, value]` for maps.
    pub(crate) elements: Vec<u16>,
    /// Fields first, then properties.
    pub(crate) members: Vec<MemberSchema>,
}

impl TypeSchema {
    /// A schema for a path the live registry does not know.
    pub(crate) fn unresolved(path: Arc<str>) -> Self {
        Self {
            path,
            runtime_type: None,
            kind: TypeKind::Object,
            primitive: None,
            flags: SchemaFlags::empty(),
            num_objects: 0,
            data_offset: 0,
            data_size: 0,
            elements: Vec::new(),
            members: Vec::new(),
        }
    }

    /// Describes the live type `key`, without element and member type indices.
    ///
    /// Members that are not serialized or filtered out by `privacy` are left out.
    pub(crate) fn describe(registry: &TypeRegistry, key: TypeKey, privacy: &Privacy<'_>) -> Self {
        let Some(entry) = registry.get(key) else {
            return Self::unresolved(Arc::from(alloc::format!("{key}")));
        };
        let info = entry.info();

        let mut flags = SchemaFlags::empty();
        flags.set(SchemaFlags::SERIALIZED, privacy.is_serialized(key));
        flags.set(SchemaFlags::PUBLIC, privacy.is_public_type(key));
        flags.set(SchemaFlags::PRIVATE, info.visibility().is_private());
        flags.set(SchemaFlags::PROTECTED, info.visibility().is_protected());
        flags.set(
            SchemaFlags::HAS_CONSTRUCTOR,
            entry.object_info().is_none_or(|object| object.has_constructor()),
        );
        flags.set(SchemaFlags::HAS_SUB_TYPE, registry.may_have_subtypes(key));

        let mut members = Vec::new();
        if flags.contains(SchemaFlags::SERIALIZED) {
            for kind in [MemberKind::Field, MemberKind::Property] {
                let selected = entry.members().iter().enumerate().filter(|(_, member)| {
                    member.kind() == kind
                        && member.is_serialized()
                        && privacy.member_allowed(key, member.visibility())
                });
                members.extend(selected.map(|(slot, member)| MemberSchema {
                    name: member.name().into(),
                    kind,
                    type_index: 0,
                    visibility: member.visibility(),
                    slot: Some(slot),
                    is_loadable: true,
                    is_lazy: false,
                }));
            }
        }

        Self {
            path: entry.path().into(),
            runtime_type: Some(key),
            kind: info.kind(),
            primitive: info.primitive(),
            flags,
            num_objects: 0,
            data_offset: 0,
            data_size: 0,
            elements: Vec::new(),
            members,
        }
    }

    /// The stored type path.
    #[inline]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The live type, `None` if the stored type no longer exists.
    #[inline]
    pub fn runtime_type(&self) -> Option<TypeKey> {
        self.runtime_type
    }

    #[inline]
    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    /// The stored primitive kind. Values of primitive types are stored inline.
    #[inline]
    pub fn primitive(&self) -> Option<PrimitiveKind> {
        self.primitive
    }

    #[inline]
    pub fn flags(&self) -> SchemaFlags {
        self.flags
    }

    #[inline]
    pub fn is_serialized(&self) -> bool {
        self.flags.contains(SchemaFlags::SERIALIZED)
    }

    #[inline]
    pub fn has_sub_type(&self) -> bool {
        self.flags.contains(SchemaFlags::HAS_SUB_TYPE)
    }

    #[inline]
    pub fn num_objects(&self) -> u32 {
        self.num_objects
    }

    #[inline]
    pub fn elements(&self) -> &[u16] {
        &self.elements
    }

    #[inline]
    pub fn members(&self) -> &[MemberSchema] {
        &self.members
    }

    pub(crate) fn write<W: Write>(&self, w: &mut W) -> io::Result<()> {
        write_str(w, &self.path)?;
        w.write_u8(self.kind.tag())?;
        if self.kind == TypeKind::Primitive {
            let kind = self.primitive.ok_or_else(|| invalid_data("primitive schema without kind"))?;
            w.write_u8(kind.tag())?;
        }
        w.write_u8(self.flags.bits())?;
        w.write_u32::<LittleEndian>(self.num_objects)?;
        w.write_u64::<LittleEndian>(self.data_offset)?;
        w.write_u64::<LittleEndian>(self.data_size)?;

        let count = u8::try_from(self.elements.len()).map_err(|_| invalid_data("too many element types"))?;
        w.write_u8(count)?;
        for index in &self.elements {
            w.write_u16::<LittleEndian>(*index)?;
        }

        if self.kind == TypeKind::Object {
            for kind in [MemberKind::Field, MemberKind::Property] {
                let members = || self.members.iter().filter(move |m| m.kind == kind);
                let count = u16::try_from(members().count())
                    .map_err(|_| invalid_data("too many members"))?;
                w.write_u16::<LittleEndian>(count)?;
                for member in members() {
                    member.write(w)?;
                }
            }
        }
        Ok(())
    }

    pub(crate) fn read<R: Read>(r: &mut R) -> io::Result<Self> {
        let path = read_str(r)?;
        let kind = TypeKind::from_tag(r.read_u8()?).ok_or_else(|| invalid_data("invalid type kind"))?;
        let primitive = if kind == TypeKind::Primitive {
            let tag = r.read_u8()?;
            Some(PrimitiveKind::from_tag(tag).ok_or_else(|| invalid_data("invalid primitive kind"))?)
        } else {
            None
        };
        let flags = SchemaFlags::from_bits_truncate(r.read_u8()?);
        let num_objects = r.read_u32::<LittleEndian>()?;
        let data_offset = r.read_u64::<LittleEndian>()?;
        let data_size = r.read_u64::<LittleEndian>()?;

        let count = r.read_u8()?;
        let elements = (0..count)
            .map(|_| r.read_u16::<LittleEndian>())
            .collect::<io::Result<Vec<_>>>()?;

        let mut members = Vec::new();
        if kind == TypeKind::Object {
            for member_kind in [MemberKind::Field, MemberKind::Property] {
                let count = r.read_u16::<LittleEndian>()?;
                for _ in 0..count {
                    members.push(MemberSchema::read(r, member_kind)?);
                }
            }
        }

        Ok(Self {
            path,
            runtime_type: None,
            kind,
            primitive,
            flags,
            num_objects,
            data_offset,
            data_size,
            elements,
            members,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use sg_reflect::info::{MemberInfo, MemberKind, ObjectInfo, TypeInfo, TypeKind};
    use sg_reflect::registry::{TypeKey, TypeRegistry};

    use super::{Privacy, SchemaFlags, TypeSchema};

    fn registry() -> (TypeRegistry, TypeKey) {
        let mut registry = TypeRegistry::new();
        let key = registry
            .register(
                TypeInfo::object(
                    "app::Item",
                    ObjectInfo::new()
                        .with_member(MemberInfo::property("label", "string"))
                        .with_member(MemberInfo::field("id", "i32"))
                        .with_member(MemberInfo::field("secret", "string").private())
                        .with_member(MemberInfo::field("cache", "string").non_serialized()),
                )
                .public(),
            )
            .unwrap();
        (registry, key)
    }

    #[test]
    fn fields_come_before_properties() {
        let (registry, key) = registry();
        let schema = TypeSchema::describe(&registry, key, &Privacy::new(&registry, false));
        let names: Vec<_> = schema.members().iter().map(|m| m.name()).collect();
        assert_eq!(names, ["id", "secret", "label"]);
        assert_eq!(schema.members()[2].kind(), MemberKind::Property);
        assert!(schema.flags().contains(SchemaFlags::HAS_SUB_TYPE | SchemaFlags::PUBLIC));
    }

    #[test]
    fn public_only_drops_private_members() {
        let (registry, key) = registry();
        let schema = TypeSchema::describe(&registry, key, &Privacy::new(&registry, true));
        let names: Vec<_> = schema.members().iter().map(|m| m.name()).collect();
        assert_eq!(names, ["id", "label"]);
    }

    #[test]
    fn record_round_trip() {
        let (registry, key) = registry();
        let mut schema = TypeSchema::describe(&registry, key, &Privacy::new(&registry, false));
        schema.num_objects = 3;
        schema.data_offset = 17;
        schema.members[0].type_index = 7;

        let mut buf = Vec::new();
        schema.write(&mut buf).unwrap();
        let back = TypeSchema::read(&mut Cursor::new(buf)).unwrap();

        assert_eq!(back.path(), "app::Item");
        assert_eq!(back.kind(), TypeKind::Object);
        assert_eq!(back.runtime_type(), None);
        assert_eq!(back.num_objects(), 3);
        assert_eq!(back.data_offset, 17);
        assert_eq!(back.members().len(), 3);
        assert_eq!(back.members()[0].type_index(), 7);
        assert_eq!(back.members()[2].kind(), MemberKind::Property);
    }

    #[test]
    fn primitive_record_keeps_its_kind() {
        let registry = TypeRegistry::new();
        let schema = TypeSchema::describe(&registry, TypeKey::F64, &Privacy::new(&registry, false));
        let mut buf = Vec::new();
        schema.write(&mut buf).unwrap();
        let back = TypeSchema::read(&mut Cursor::new(buf)).unwrap();
        assert_eq!(back.primitive(), schema.primitive());
        assert!(back.primitive().is_some());
    }
}
