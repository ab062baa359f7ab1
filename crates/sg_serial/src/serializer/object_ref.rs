//! The object reference encoding.
//!
//! ```text
//! flag u8 | [type index u16] | inline primitive or object index u32
//! ```
//!
//! - `0`: null, nothing follows.
//! - `1`: the runtime type is the declared type.
//! - `2`: a type index naming the runtime type follows. Only written when
//!   the declared type has `HAS_SUB_TYPE`.
//!
//! Primitive types own no objects, their value follows inline.

use std::io::{self, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

pub(crate) const NULL_REF: u8 = 0;
pub(crate) const SAME_TYPE: u8 = 1;
pub(crate) const SUB_TYPE: u8 = 2;

/// Writes the flag and type index of a non-null reference.
pub(crate) fn write_head<W: Write>(w: &mut W, declared: u16, actual: u16) -> io::Result<()> {
    if actual == declared {
        w.write_u8(SAME_TYPE)
    } else {
        w.write_u8(SUB_TYPE)?;
        w.write_u16::<LittleEndian>(actual)
    }
}

/// Reads the flag and type index, `None` for null.
///
/// Any flag other than `0` and `1` announces a type index.
pub(crate) fn read_head<R: Read>(r: &mut R, declared: u16) -> io::Result<Option<u16>> {
    Ok(match r.read_u8()? {
        NULL_REF => None,
        SAME_TYPE => Some(declared),
        _ => Some(r.read_u16::<LittleEndian>()?),
    })
}
