use std::path::PathBuf;

use strata_config::ConfigError;
use strata_render::RenderError;

/// Everything that can end a `strata` run early.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode {path}: {source}")]
    Png {
        path: PathBuf,
        #[source]
        source: png::EncodingError,
    },

    /// The frame buffer has a zero dimension, so there is nothing to save.
    #[error("frame buffer is empty")]
    EmptyFrame,
}
