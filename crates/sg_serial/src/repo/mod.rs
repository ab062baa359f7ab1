//! Provide [`TypeRepo`], the per-type store of one session, and the
//! [`RepoCreators`] registry choosing the [`Shape`] of every repo.
//!
//! ## Contract
//!
//! Every shape implements the same steps, dispatched by the serializer:
//!
//! | Step | Save | Load |
//! |---|---|---|
//! | discovery | `child_objects`: every directly owned value | - |
//! | custom header | element counts of arrays and byte arrays | per-object lengths |
//! | object | payload bytes | `create_object` shell, then `load_object_data` |
//! | clone | `clone_object` shell, then its members | - |
//!
//! Primitive repos own no objects: their values are written inline in the
//! object reference. Value shapes (strings, enums, dates, versions, types)
//! are read as soon as they are referenced and refuse to be cloned.

// -----------------------------------------------------------------------------
// Modules

mod creator;

// -----------------------------------------------------------------------------
// Exports

pub use creator::{
    ArrayCreator, BytesCreator, DateTimeCreator, EnumCreator, ListCreator, MapCreator,
    PrimitiveCreator, RepoCreator, RepoCreators, SetCreator, StringCreator, TypeCreator,
    UnknownCreator,
};

// -----------------------------------------------------------------------------
// TypeRepo

use alloc::vec::Vec;
use core::fmt;
use std::io::{self, Cursor};

use byteorder::{LittleEndian, ReadBytesExt};
use sg_reflect::Value;
use sg_reflect::info::{PrimitiveKind, TypeKind};
use sg_utils::hash::HashMap;

use crate::schema::TypeSchema;

/// Why a repo never materializes its objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnknownReason {
    /// The stored type does not resolve in the live registry.
    UnknownType,
    /// Filtered out, see [`SchemaFlags::SERIALIZED`](crate::SchemaFlags::SERIALIZED).
    NotSerialized,
    /// The live type has no accessible constructor.
    MissingConstructor,
    /// The live type has another [`TypeKind`] than the stored one.
    KindChanged,
    /// No creator claims the shape.
    Unhandled,
}

impl fmt::Display for UnknownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Self::UnknownType => "unknown type",
            Self::NotSerialized => "not serialized",
            Self::MissingConstructor => "missing constructor",
            Self::KindChanged => "kind changed",
            Self::Unhandled => "unhandled shape",
        })
    }
}

/// How the objects of one repo are stored, chosen once per type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// A stub whose objects are skipped and read as `null`.
    Unknown(UnknownReason),
    Primitive(PrimitiveKind),
    String,
    Enum,
    DateTime,
    DateTimeOffset,
    TimeSpan,
    TimeZone,
    Version,
    Type,
    /// `u8[]`, written as raw bytes.
    Bytes,
    Array,
    List,
    Map,
    Set,
    /// Any object type with a constructor, member by member.
    Object,
}

impl Shape {
    /// Returns `true` for shapes whose values are assigned rather than cloned.
    #[inline]
    pub const fn is_value_like(self) -> bool {
        matches!(
            self,
            Self::Primitive(_)
                | Self::String
                | Self::Enum
                | Self::DateTime
                | Self::DateTimeOffset
                | Self::TimeSpan
                | Self::TimeZone
                | Self::Version
                | Self::Type
        )
    }

    #[inline]
    pub const fn is_unknown(self) -> bool {
        matches!(self, Self::Unknown(_))
    }
}

/// All objects of one type within one save, load or clone session.
pub struct TypeRepo {
    pub(crate) type_index: u16,
    pub(crate) schema: TypeSchema,
    pub(crate) shape: Shape,
    // Save side: insertion ordered, deduplicated.
    pub(crate) objects: Vec<Value>,
    pub(crate) index_of: HashMap<Value, u32>,
    // Load side: filled in as objects are referenced.
    pub(crate) loaded: Vec<Option<Value>>,
    pub(crate) lengths: Vec<u32>,
    pub(crate) sizes: Vec<u32>,
    pub(crate) offsets: Vec<usize>,
}

impl fmt::Debug for TypeRepo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRepo")
            .field("type_index", &self.type_index)
            .field("path", &self.schema.path())
            .field("shape", &self.shape)
            .field("objects", &self.num_objects())
            .finish()
    }
}

impl TypeRepo {
    pub(crate) fn new(type_index: u16, schema: TypeSchema, shape: Shape) -> Self {
        Self {
            type_index,
            schema,
            shape,
            objects: Vec::new(),
            index_of: HashMap::default(),
            loaded: Vec::new(),
            lengths: Vec::new(),
            sizes: Vec::new(),
            offsets: Vec::new(),
        }
    }

    #[inline]
    pub fn type_index(&self) -> u16 {
        self.type_index
    }

    #[inline]
    pub fn schema(&self) -> &TypeSchema {
        &self.schema
    }

    #[inline]
    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// The number of objects in this repo: indexed so far when saving or
    /// cloning, stored in the stream once a load has read its section.
    pub fn num_objects(&self) -> usize {
        if self.loaded.is_empty() {
            self.objects.len()
        } else {
            self.loaded.len()
        }
    }

    /// Returns the index of `value`, adding it if it was not seen yet.
    ///
    /// The flag is `true` for a newly added value.
    pub(crate) fn get_or_add(&mut self, value: &Value) -> (u32, bool) {
        if let Some(index) = self.index_of.get(value) {
            return (*index, false);
        }
        let index = self.objects.len() as u32;
        self.objects.push(value.clone());
        self.index_of.insert(value.clone(), index);
        (index, true)
    }

    #[inline]
    pub(crate) fn index_of(&self, value: &Value) -> Option<u32> {
        self.index_of.get(value).copied()
    }

    /// Reads the custom header and the object sizes from this repo's section.
    ///
    /// Offsets are absolute positions in `data`.
    pub(crate) fn load_header(&mut self, data: &[u8]) -> io::Result<()> {
        let count = self.schema.num_objects as usize;
        let start = usize::try_from(self.schema.data_offset)
            .map_err(|_| io::Error::from(io::ErrorKind::UnexpectedEof))?;
        let end = start
            .checked_add(self.schema.data_size as usize)
            .filter(|end| *end <= data.len())
            .ok_or(io::ErrorKind::UnexpectedEof)?;

        let mut r = Cursor::new(&data[start..end]);
        self.lengths = Vec::new();
        if self.schema.kind == TypeKind::Array {
            self.lengths = (0..count)
                .map(|_| r.read_u32::<LittleEndian>())
                .collect::<io::Result<_>>()?;
        }
        self.sizes = (0..count)
            .map(|_| r.read_u32::<LittleEndian>())
            .collect::<io::Result<_>>()?;

        let mut offset = start + r.position() as usize;
        self.offsets = Vec::with_capacity(count);
        for size in &self.sizes {
            self.offsets.push(offset);
            offset += *size as usize;
        }
        if offset > end {
            return Err(io::ErrorKind::UnexpectedEof.into());
        }

        self.loaded = alloc::vec![None; count];
        Ok(())
    }

    /// The stored payload of object `index`.
    pub(crate) fn payload<'d>(&self, data: &'d [u8], index: u32) -> &'d [u8] {
        let index = index as usize;
        match (self.offsets.get(index), self.sizes.get(index)) {
            (Some(offset), Some(size)) => data.get(*offset..*offset + *size as usize).unwrap_or(&[]),
            _ => &[],
        }
    }

    /// The element count recorded in the custom header.
    #[inline]
    pub(crate) fn length(&self, index: u32) -> u32 {
        self.lengths.get(index as usize).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use alloc::sync::Arc;

    use sg_reflect::Value;

    use super::{Shape, TypeRepo};
    use crate::schema::TypeSchema;

    fn repo() -> TypeRepo {
        TypeRepo::new(0, TypeSchema::unresolved(Arc::from("app::Thing")), Shape::Object)
    }

    #[test]
    fn save_side_counts_indexed_objects() {
        let mut repo = repo();
        // A count left over from a described schema does not leak in.
        repo.schema.num_objects = 7;
        assert_eq!(repo.get_or_add(&Value::from("a")), (0, true));
        assert_eq!(repo.get_or_add(&Value::from("b")), (1, true));
        assert_eq!(repo.get_or_add(&Value::from("a")), (0, false));
        assert_eq!(repo.num_objects(), 2);
    }

    #[test]
    fn load_side_counts_stored_objects() {
        let mut repo = repo();
        repo.schema.num_objects = 2;
        repo.schema.data_size = 11;
        let data = [1, 0, 0, 0, 2, 0, 0, 0, b'x', b'y', b'z'];
        repo.load_header(&data).unwrap();

        assert_eq!(repo.num_objects(), 2);
        assert_eq!(repo.payload(&data, 0), b"x");
        assert_eq!(repo.payload(&data, 1), b"yz");
        assert_eq!(repo.payload(&data, 2), b"");
    }

    #[test]
    fn load_header_rejects_overlong_sizes() {
        let mut repo = repo();
        repo.schema.num_objects = 1;
        repo.schema.data_size = 5;
        assert!(repo.load_header(&[9, 0, 0, 0, 0]).is_err());
    }
}
