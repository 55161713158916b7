use thiserror::Error;

/// Shared error type for every crate in this workspace.
///
/// A single enum (rather than one per crate) is appropriate here because every crate sits
/// on a single dependency chain feeding one binary; lower-level errors convert in via
/// `#[from]`.
#[derive(Error, Debug)]
pub enum PgError {
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("invalid lifting strategy descriptor '{descriptor}': {reason}")]
    InvalidStrategyDescriptor { descriptor: String, reason: String },

    #[error("I/O failure: {0}")]
    IOFailure(#[from] std::io::Error),

    #[error("bitstream header mismatch: expected magic {expected_magic:#x} version {expected_version:#x}, found magic {found_magic:#x} version {found_version:#x}")]
    VersionMismatch {
        expected_magic: u16,
        expected_version: u16,
        found_magic: u16,
        found_version: u16,
    },

    #[error("operation aborted")]
    Aborted,

    #[error("internal inconsistency: {0}")]
    InternalInconsistency(String),
}

impl From<std::num::ParseIntError> for PgError {
    fn from(error: std::num::ParseIntError) -> Self {
        PgError::InvalidStrategyDescriptor {
            descriptor: String::new(),
            reason: error.to_string(),
        }
    }
}

impl From<std::num::ParseFloatError> for PgError {
    fn from(error: std::num::ParseFloatError) -> Self {
        PgError::InvalidStrategyDescriptor {
            descriptor: String::new(),
            reason: error.to_string(),
        }
    }
}
