use thiserror::Error;

#[derive(Error, Debug)]
pub enum GigmapError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Source error: {0}")]
    Source(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}
