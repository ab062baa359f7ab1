//! Stream header: magic bytes, format version and label.
//!
//! ```text
//! +-----------------------------------------------------------+
//! | magic "SNPG" (4) | version u16 | name (u32 len + UTF-8)   |
//! +-----------------------------------------------------------+
//! | schema count u16 | TypeSchema[] | root ref                |
//! +-----------------------------------------------------------+
//! | data section of type 0 | data section of type 1 | ...     |
//! +-----------------------------------------------------------+
//! ```

use alloc::string::String;
use std::io::{self, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::wire::{read_string, write_str};
use crate::{Error, Result};

/// Magic bytes: "SNPG"
pub const MAGIC: [u8; 4] = *b"SNPG";

/// Current format version.
pub const FORMAT_VERSION: u16 = 1;

/// The leading block of every stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub version: u16,
    /// Free-form label, see [`SerializerOptions::name`](crate::SerializerOptions::name).
    pub name: String,
}

impl Header {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            version: FORMAT_VERSION,
            name: name.into(),
        }
    }

    pub fn write<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(&MAGIC)?;
        w.write_u16::<LittleEndian>(self.version)?;
        write_str(w, &self.name)
    }

    /// Reads and validates a header.
    ///
    /// Fails with [`Error::BadMagic`] or [`Error::UnsupportedVersion`]
    /// before anything else is parsed.
    pub fn read<R: Read>(r: &mut R) -> Result<Self> {
        let mut magic = [0_u8; 4];
        match r.read_exact(&mut magic) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Err(Error::BadMagic),
            Err(e) => return Err(e.into()),
        }
        if magic != MAGIC {
            return Err(Error::BadMagic);
        }

        let version = r.read_u16::<LittleEndian>()?;
        if version == 0 || version > FORMAT_VERSION {
            return Err(Error::UnsupportedVersion(version));
        }

        Ok(Self {
            version,
            name: read_string(r)?,
        })
    }
}
