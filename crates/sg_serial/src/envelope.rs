//! The text envelope: a saved graph, gzip compressed and base64 encoded.
//!
//! Used where a graph has to travel through text, such as clipboards and
//! settings files.

use alloc::string::String;
use alloc::vec::Vec;
use std::io::{Read, Write};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use sg_reflect::{Heap, Value};

use crate::{Error, Result, Serializer};

/// Saves the graph below `root` and wraps it into base64 text.
///
/// # Examples
///
/// ```
/// use sg_reflect::{Heap, TypeRegistry, Value};
/// use sg_serial::{Serializer, envelope};
///
/// let registry = TypeRegistry::new();
/// let mut heap = Heap::new();
/// let mut serializer = Serializer::new(&registry);
///
/// let text = envelope::to_base64(&serializer, &heap, &Value::from("hello")).unwrap();
/// let back = envelope::from_base64(&mut serializer, &mut heap, &text).unwrap();
/// assert_eq!(back, Value::from("hello"));
/// ```
pub fn to_base64(serializer: &Serializer<'_>, heap: &Heap, root: &Value) -> Result<String> {
    let bytes = serializer.save_to_vec(heap, root)?;
    Ok(STANDARD.encode(compress(&bytes)?))
}

/// Unwraps base64 text produced by [`to_base64`] and loads the graph.
///
/// # Errors
///
/// - [`Error::Base64`] if `text` is not base64.
/// - [`Error::Decompress`] if the decoded bytes are not gzip.
/// - [`Error::BadMagic`] if the decompressed bytes are not a saved graph.
pub fn from_base64(serializer: &mut Serializer<'_>, heap: &mut Heap, text: &str) -> Result<Value> {
    let compressed = STANDARD.decode(text.trim())?;
    let mut bytes = Vec::new();
    GzDecoder::new(compressed.as_slice())
        .read_to_end(&mut bytes)
        .map_err(Error::Decompress)?;
    serializer.load(heap, &mut bytes.as_slice())
}

fn compress(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(bytes)?;
    Ok(encoder.finish()?)
}
