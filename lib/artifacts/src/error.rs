use thiserror::Error;

pub type Result<T> = std::result::Result<T, LoadError>;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Manifest error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Bincode error on {file}: {source}")]
    Codec {
        file: String,
        #[source]
        source: bincode::Error,
    },

    #[error("Checksum mismatch for {file}: expected {expected}, got {actual}")]
    Checksum {
        file: String,
        expected: String,
        actual: String,
    },

    #[error("Unsupported bundle version {0}")]
    UnsupportedVersion(u32),

    #[error(transparent)]
    Mismatch(#[from] gamerec_core::Error),

    #[error("Artifact load task failed: {0}")]
    Join(String),
}

impl LoadError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        LoadError::Io {
            path: path.display().to_string(),
            source,
        }
    }
}
