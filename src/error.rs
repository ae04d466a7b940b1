//! # KeySSI Errors
//!
//! Error types returned by the crate. Synchronous failures (format, length,
//! missing domain) are raised at the point of violation; failures of
//! external collaborators (enclave, type authority, storage) are carried
//! through the `Signing`, `Derivation` and `Other` variants.

use thiserror::Error;

/// Log an error with `tracing` and return it from the enclosing function.
///
/// # Example
/// ```
/// use keyssi::{tracerr, Error, Result};
///
/// fn with_msg(id: &str) -> Result<()> {
///     tracerr!(Error::InvalidFormat, "bad identifier: {id}")
/// }
///
/// assert!(with_msg("nope").is_err());
/// ```
#[macro_export]
macro_rules! tracerr {
    ($code:path, $($msg:tt)*) => {
        {
        let msg = format!($($msg)*);
        $crate::tracing::error!("{msg}");
        return Err($code(msg).into());
        }
    };
}

/// Errors raised while parsing, deriving, signing or anchoring identifiers.
#[derive(Error, Debug)]
pub enum Error {
    /// The identifier string is malformed: wrong prefix, too few segments
    /// or an encoded form that does not decode to a structured identifier.
    #[error("{0}")]
    InvalidFormat(String),

    /// The full identifier exceeds the maximum permitted length.
    #[error("{0}")]
    LengthLimit(String),

    /// No crypto suite (or type rule) is registered for the type name.
    #[error("{0}")]
    UnknownType(String),

    /// A domain could not be determined for the identifier.
    #[error("{0}")]
    MissingDomain(String),

    /// The signing authority failed to produce a signature.
    #[error("{0}")]
    Signing(String),

    /// The type-derivation authority failed to derive the requested type.
    #[error("{0}")]
    Derivation(String),

    /// A signature or anchor chain failed verification.
    #[error("{0}")]
    Verification(String),

    /// No factory is registered for the requested DSU representation.
    #[error("{0}")]
    InvalidRepresentation(String),

    /// An error returned by an external collaborator.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Stable, machine readable code for the error.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidFormat(_) => "invalid_format",
            Self::LengthLimit(_) => "length_limit",
            Self::UnknownType(_) => "unknown_type",
            Self::MissingDomain(_) => "missing_domain",
            Self::Signing(_) => "signing_error",
            Self::Derivation(_) => "derivation_error",
            Self::Verification(_) => "verification_failed",
            Self::InvalidRepresentation(_) => "invalid_representation",
            Self::Other(_) => "other",
        }
    }

    /// Human readable description of the error.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Other(e) => e.root_cause().to_string(),
            _ => self.to_string(),
        }
    }

    /// Transfer the error to a JSON object with `error` and
    /// `error_description` members.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "error": self.code(),
            "error_description": self.message(),
        })
    }
}
