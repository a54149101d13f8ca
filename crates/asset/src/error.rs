//! Error type shared by every asset loader.

use std::{io, path::PathBuf};

use thiserror::Error;

/// Which attribute table a face index points into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IndexKind {
    Position,
    TexCoord,
    Normal,
}

impl std::fmt::Display for IndexKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            IndexKind::Position => "position",
            IndexKind::TexCoord => "texcoord",
            IndexKind::Normal => "normal",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("File not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    #[error("I/O error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Line numbers are 1-based.
    #[error("Malformed line {line}: {reason}")]
    MalformedLine { line: usize, reason: String },

    #[error("{kind} index {index} out of range (len={len}) on line {line}")]
    IndexOutOfRange {
        line: usize,
        kind: IndexKind,
        index: i64,
        len: usize,
    },

    #[error("Failed to decode image {}: {source}", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("OBJ contained no triangles")]
    Empty,
}

pub type Result<T> = std::result::Result<T, AssetError>;

impl AssetError {
    pub(crate) fn malformed(line: usize, reason: impl Into<String>) -> Self {
        Self::MalformedLine {
            line,
            reason: reason.into(),
        }
    }

    /// Map an `open()` failure: `NotFound` gets its own variant.
    pub(crate) fn from_open(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        if source.kind() == io::ErrorKind::NotFound {
            Self::FileNotFound { path }
        } else {
            Self::Io { path, source }
        }
    }
}
