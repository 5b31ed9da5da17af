use dispute_sml_core::SmlError;
use thiserror::Error;

/// Errors raised while turning a payload into a publication
#[derive(Error, Debug)]
pub enum OracleError {
    /// Payload is not valid JSON or has wrongly typed fields
    #[error("Malformed case payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),

    /// A field parsed but holds a value outside its domain
    #[error("Invalid payload field `{field}`: {reason}")]
    InvalidField { field: &'static str, reason: String },

    /// The model lifecycle failed (unreadable artifact, I/O)
    #[error("Model error: {0}")]
    Model(#[from] SmlError),
}

pub type Result<T> = std::result::Result<T, OracleError>;
