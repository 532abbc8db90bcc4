//! Parse and validation errors for the fundamental types.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypesError {
    #[error("invalid wallet address: {0}")]
    InvalidAddress(String),

    #[error("invalid organization id: {0}")]
    InvalidOrganization(String),

    #[error("invalid {kind} id: {reason}")]
    InvalidId { kind: &'static str, reason: String },
}
