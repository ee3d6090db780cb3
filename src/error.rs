use thiserror::Error;

/// Errors surfaced by the picker library.
///
/// Runtime events never fail; only loading options and configuration can.
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse options JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to parse config: {0}")]
    Toml(#[from] toml_edit::TomlError),

    #[error("invalid config: {0}")]
    Config(String),

    #[error("invalid item: {0}")]
    InvalidItem(String),
}

pub type Result<T> = std::result::Result<T, Error>;
