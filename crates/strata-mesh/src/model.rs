//! Seam for loading externally authored models.
//!
//! File formats are owned by the embedding application; the renderer only
//! needs something that turns a path into a [`Mesh`].

use std::path::{Path, PathBuf};

use crate::{Color, Mesh};

/// Errors a [`ModelLoader`] can report.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// The model file could not be read.
    #[error("failed to read model {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file was read but its contents are not a valid model.
    #[error("malformed model {path} at line {line}: {reason}")]
    Malformed {
        path: PathBuf,
        line: usize,
        reason: String,
    },
}

/// Produces a mesh from a file, painting every face with `color`.
pub trait ModelLoader {
    fn load(&self, path: &Path, color: Color) -> Result<Mesh, ModelError>;
}
