//! Saving to and loading from files.

use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use sg_reflect::{Heap, Value};

use crate::{Header, Result, Serializer};

/// A saved graph on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializerFile {
    path: PathBuf,
}

impl SerializerFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Saves the graph below `root`, replacing the file.
    ///
    /// The file is left untouched if the graph fails to encode.
    pub fn save(&self, serializer: &Serializer<'_>, heap: &Heap, root: &Value) -> Result<()> {
        let bytes = serializer.save_to_vec(heap, root)?;
        fs::write(&self.path, &bytes)?;
        log::debug!("saved {} bytes to {}", bytes.len(), self.path.display());
        Ok(())
    }

    pub fn load(&self, serializer: &mut Serializer<'_>, heap: &mut Heap) -> Result<Value> {
        let mut reader = BufReader::new(File::open(&self.path)?);
        serializer.load(heap, &mut reader)
    }

    pub fn load_lazy(&self, serializer: &mut Serializer<'_>, heap: &mut Heap) -> Result<Value> {
        let mut reader = BufReader::new(File::open(&self.path)?);
        serializer.load_lazy(heap, &mut reader)
    }

    /// Reads only the header, to check a file before loading it.
    pub fn load_header(&self) -> Result<Header> {
        Header::read(&mut BufReader::new(File::open(&self.path)?))
    }
}
