//! Little-endian primitives shared by the header, schema and payload codecs.

use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use std::io::{self, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use chrono::{DateTime, FixedOffset, TimeDelta, Utc};
use sg_reflect::Value;
use sg_reflect::info::PrimitiveKind;

use crate::{Error, Result};

/// 100 ns ticks per second.
const TICKS_PER_SECOND: i64 = 10_000_000;
const NANOS_PER_TICK: i64 = 100;

#[inline]
pub(crate) fn invalid_data(msg: &'static str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg)
}

// -----------------------------------------------------------------------------
// Strings

pub(crate) fn write_str<W: Write>(w: &mut W, s: &str) -> io::Result<()> {
    let len = u32::try_from(s.len()).map_err(|_| invalid_data("string longer than 4 GiB"))?;
    w.write_u32::<LittleEndian>(len)?;
    w.write_all(s.as_bytes())
}

pub(crate) fn read_string<R: Read>(r: &mut R) -> io::Result<String> {
    let len = r.read_u32::<LittleEndian>()? as usize;
    let bytes = read_exact_vec(r, len)?;
    String::from_utf8(bytes).map_err(|_| invalid_data("string is not valid UTF-8"))
}

#[inline]
pub(crate) fn read_str<R: Read>(r: &mut R) -> io::Result<Arc<str>> {
    read_string(r).map(Arc::from)
}

/// Reads exactly `len` bytes without trusting `len` for the allocation.
pub(crate) fn read_exact_vec<R: Read>(r: &mut R, len: usize) -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    r.take(len as u64).read_to_end(&mut buf)?;
    if buf.len() != len {
        return Err(io::ErrorKind::UnexpectedEof.into());
    }
    Ok(buf)
}

// -----------------------------------------------------------------------------
// Primitives

/// Writes `value` inline, at the width of `kind`.
pub(crate) fn write_primitive<W: Write>(w: &mut W, kind: PrimitiveKind, value: &Value) -> Result<()> {
    match (kind, value) {
        (PrimitiveKind::Bool, Value::Bool(v)) => w.write_u8(u8::from(*v))?,
        (PrimitiveKind::Char, Value::Char(v)) => w.write_u32::<LittleEndian>(u32::from(*v))?,
        (PrimitiveKind::I8, Value::I8(v)) => w.write_i8(*v)?,
        (PrimitiveKind::U8, Value::U8(v)) => w.write_u8(*v)?,
        (PrimitiveKind::I16, Value::I16(v)) => w.write_i16::<LittleEndian>(*v)?,
        (PrimitiveKind::U16, Value::U16(v)) => w.write_u16::<LittleEndian>(*v)?,
        (PrimitiveKind::I32, Value::I32(v)) => w.write_i32::<LittleEndian>(*v)?,
        (PrimitiveKind::U32, Value::U32(v)) => w.write_u32::<LittleEndian>(*v)?,
        (PrimitiveKind::I64, Value::I64(v)) => w.write_i64::<LittleEndian>(*v)?,
        (PrimitiveKind::U64, Value::U64(v)) => w.write_u64::<LittleEndian>(*v)?,
        (PrimitiveKind::F32, Value::F32(v)) => w.write_f32::<LittleEndian>(*v)?,
        (PrimitiveKind::F64, Value::F64(v)) => w.write_f64::<LittleEndian>(*v)?,
        (_, other) => return Err(Error::UnhandledPrimitiveType(alloc::format!("{other:?}"))),
    }
    Ok(())
}

pub(crate) fn read_primitive<R: Read>(r: &mut R, kind: PrimitiveKind) -> io::Result<Value> {
    Ok(match kind {
        PrimitiveKind::Bool => Value::Bool(r.read_u8()? != 0),
        PrimitiveKind::Char => {
            let scalar = r.read_u32::<LittleEndian>()?;
            Value::Char(char::from_u32(scalar).ok_or_else(|| invalid_data("invalid char"))?)
        }
        PrimitiveKind::I8 => Value::I8(r.read_i8()?),
        PrimitiveKind::U8 => Value::U8(r.read_u8()?),
        PrimitiveKind::I16 => Value::I16(r.read_i16::<LittleEndian>()?),
        PrimitiveKind::U16 => Value::U16(r.read_u16::<LittleEndian>()?),
        PrimitiveKind::I32 => Value::I32(r.read_i32::<LittleEndian>()?),
        PrimitiveKind::U32 => Value::U32(r.read_u32::<LittleEndian>()?),
        PrimitiveKind::I64 => Value::I64(r.read_i64::<LittleEndian>()?),
        PrimitiveKind::U64 => Value::U64(r.read_u64::<LittleEndian>()?),
        PrimitiveKind::F32 => Value::F32(r.read_f32::<LittleEndian>()?),
        PrimitiveKind::F64 => Value::F64(r.read_f64::<LittleEndian>()?),
    })
}

/// Advances past one inline primitive of `kind`.
pub(crate) fn skip_primitive<R: Read>(r: &mut R, kind: PrimitiveKind) -> io::Result<()> {
    let mut buf = [0_u8; 8];
    r.read_exact(&mut buf[..kind.size()])
}

// -----------------------------------------------------------------------------
// Time

fn split_ticks(ticks: i64) -> (i64, u32) {
    let secs = ticks.div_euclid(TICKS_PER_SECOND);
    let nanos = ticks.rem_euclid(TICKS_PER_SECOND) * NANOS_PER_TICK;
    (secs, nanos as u32)
}

fn to_ticks(secs: i64, subsec_nanos: i64) -> i64 {
    secs.saturating_mul(TICKS_PER_SECOND)
        .saturating_add(subsec_nanos / NANOS_PER_TICK)
}

/// Ticks since the Unix epoch, truncated to 100 ns.
#[inline]
pub(crate) fn date_time_ticks(value: &DateTime<Utc>) -> i64 {
    to_ticks(value.timestamp(), i64::from(value.timestamp_subsec_nanos()))
}

pub(crate) fn date_time_from_ticks(ticks: i64) -> io::Result<DateTime<Utc>> {
    let (secs, nanos) = split_ticks(ticks);
    DateTime::from_timestamp(secs, nanos).ok_or_else(|| invalid_data("date out of range"))
}

pub(crate) fn write_date_time_offset<W: Write>(w: &mut W, value: &DateTime<FixedOffset>) -> io::Result<()> {
    w.write_i64::<LittleEndian>(date_time_ticks(&value.with_timezone(&Utc)))?;
    w.write_i32::<LittleEndian>(value.offset().local_minus_utc())
}

pub(crate) fn read_date_time_offset<R: Read>(r: &mut R) -> io::Result<DateTime<FixedOffset>> {
    let utc = date_time_from_ticks(r.read_i64::<LittleEndian>()?)?;
    let offset = FixedOffset::east_opt(r.read_i32::<LittleEndian>()?)
        .ok_or_else(|| invalid_data("utc offset out of range"))?;
    Ok(utc.with_timezone(&offset))
}

#[inline]
pub(crate) fn time_span_ticks(value: &TimeDelta) -> i64 {
    to_ticks(value.num_seconds(), i64::from(value.subsec_nanos()))
}

pub(crate) fn time_span_from_ticks(ticks: i64) -> io::Result<TimeDelta> {
    let (secs, nanos) = split_ticks(ticks);
    TimeDelta::new(secs, nanos).ok_or_else(|| invalid_data("time span out of range"))
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use chrono::{FixedOffset, TimeDelta, TimeZone, Utc};
    use sg_reflect::Value;
    use sg_reflect::info::PrimitiveKind;

    use super::*;

    #[test]
    fn primitives_use_their_width() {
        let mut buf = Vec::new();
        write_primitive(&mut buf, PrimitiveKind::U16, &Value::U16(0xABCD)).unwrap();
        write_primitive(&mut buf, PrimitiveKind::Char, &Value::Char('λ')).unwrap();
        assert_eq!(buf.len(), 6);
        assert_eq!(&buf[..2], &[0xCD, 0xAB]);

        let mut r = Cursor::new(buf);
        skip_primitive(&mut r, PrimitiveKind::U16).unwrap();
        assert_eq!(read_primitive(&mut r, PrimitiveKind::Char).unwrap(), Value::Char('λ'));
    }

    #[test]
    fn mismatched_primitive_is_unhandled() {
        let mut buf = Vec::new();
        let err = write_primitive(&mut buf, PrimitiveKind::I32, &Value::from("5")).unwrap_err();
        assert!(matches!(err, Error::UnhandledPrimitiveType(_)));
    }

    #[test]
    fn truncated_string() {
        let mut buf = Vec::new();
        write_str(&mut buf, "hello").unwrap();
        buf.truncate(6);
        let err = read_str(&mut Cursor::new(buf)).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn ticks() {
        let date = Utc.with_ymd_and_hms(1969, 7, 20, 20, 17, 40).unwrap();
        assert_eq!(date_time_from_ticks(date_time_ticks(&date)).unwrap(), date);

        let span = TimeDelta::milliseconds(-1_500);
        assert_eq!(time_span_ticks(&span), -15_000_000);
        assert_eq!(time_span_from_ticks(-15_000_000).unwrap(), span);

        let offset = FixedOffset::west_opt(5 * 3600).unwrap();
        let local = offset.with_ymd_and_hms(2024, 2, 29, 8, 0, 0).unwrap();
        let mut buf = Vec::new();
        write_date_time_offset(&mut buf, &local).unwrap();
        let back = read_date_time_offset(&mut Cursor::new(buf)).unwrap();
        assert_eq!(back, local);
        assert_eq!(back.offset(), local.offset());
    }
}
