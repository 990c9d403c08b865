use thiserror::Error;

#[derive(Debug, Error)]
pub enum SubsyncError {
    #[error("{0}")]
    ParseError(String),

    #[error("Failed to load subtitles: {0}")]
    LoadFailed(String),
}
