use crate::types::LesionId;
use thiserror::Error;

/// Result type for scintimark operations
pub type Result<T> = std::result::Result<T, ScintiError>;

/// Error types for scintimark operations
#[derive(Error, Debug)]
pub enum ScintiError {
    /// No region in the store carries this lesion id
    #[error("Unknown lesion: {0}")]
    UnknownLesion(LesionId),

    /// Soft-tissue lesions keep zone 10 for their whole lifetime
    #[error("Lesion {0} is soft tissue; its zone cannot change")]
    SoftTissueImmutable(LesionId),

    /// Zone label outside the taxonomy
    #[error("Invalid zone: {0}")]
    InvalidZone(String),

    /// `id` attribute that is not integer-like
    #[error("Invalid lesion id: {0}")]
    InvalidLesionId(String),

    /// Degenerate or non-finite geometry
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    /// Placement update or finish without a gesture in progress
    #[error("No lesion placement in progress")]
    NoActivePlacement,

    /// A required collaborator was not supplied before startup
    #[error("Missing dependency: {0}")]
    MissingDependency(&'static str),

    /// A listener reported failure
    #[error("Listener error: {0}")]
    Listener(String),

    /// I/O error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[cfg(feature = "json")]
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl ScintiError {
    /// Returns whether this error is a caller misuse that leaves the store untouched
    pub fn is_misuse(&self) -> bool {
        matches!(
            self,
            ScintiError::UnknownLesion(_)
                | ScintiError::SoftTissueImmutable(_)
                | ScintiError::InvalidZone(_)
                | ScintiError::NoActivePlacement
        )
    }
}

impl From<String> for ScintiError {
    fn from(s: String) -> Self {
        ScintiError::Listener(s)
    }
}

impl From<&str> for ScintiError {
    fn from(s: &str) -> Self {
        ScintiError::Listener(s.to_string())
    }
}
