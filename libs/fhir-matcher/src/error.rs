//! Error types for element matching

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Base and differential navigators are not positioned on corresponding nodes
    #[error("Structure error: {0}")]
    Structure(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Model error: {0}")]
    Models(#[from] ferrum_models::Error),
}
