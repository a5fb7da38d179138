//! Where module bytes come from.

use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};

/// A module to ingest.
///
/// Every variant is drained into a single owned buffer exactly once; the
/// metadata read and the executing load both work from that buffer.
pub enum ModuleSource {
    /// A module file on disk.
    File(PathBuf),
    /// An in-memory module.
    Bytes(Vec<u8>),
    /// A readable stream yielding the module.
    Stream(Box<dyn Read + Send>),
}

impl ModuleSource {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File(path.into())
    }

    pub fn stream(reader: impl Read + Send + 'static) -> Self {
        Self::Stream(Box::new(reader))
    }

    /// File path for file sources.
    pub fn location(&self) -> Option<&Path> {
        match self {
            Self::File(path) => Some(path),
            Self::Bytes(_) | Self::Stream(_) => None,
        }
    }

    /// Reads the whole module. Files and streams are closed before returning.
    pub fn into_bytes(self) -> std::io::Result<Vec<u8>> {
        match self {
            Self::File(path) => std::fs::read(path),
            Self::Bytes(bytes) => Ok(bytes),
            Self::Stream(mut reader) => {
                let mut bytes = Vec::new();
                reader.read_to_end(&mut bytes)?;
                Ok(bytes)
            }
        }
    }
}

impl fmt::Debug for ModuleSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => f.debug_tuple("File").field(path).finish(),
            Self::Bytes(bytes) => write!(f, "Bytes({} bytes)", bytes.len()),
            Self::Stream(_) => f.write_str("Stream"),
        }
    }
}

impl From<PathBuf> for ModuleSource {
    fn from(path: PathBuf) -> Self {
        Self::File(path)
    }
}

impl From<&Path> for ModuleSource {
    fn from(path: &Path) -> Self {
        Self::File(path.to_path_buf())
    }
}

impl From<Vec<u8>> for ModuleSource {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}
