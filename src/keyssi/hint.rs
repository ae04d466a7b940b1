//! Auxiliary identifier metadata.

use serde_json::{json, Value};

/// Trailing, non-identity metadata attached to a KeySSI.
///
/// Whether a hint is structured is decided once, when it is loaded: hints
/// starting with `{` or `[` are parsed as JSON and anything else (including
/// JSON that fails to parse) is kept raw. The original text is always
/// retained so serialization is lossless.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Hint {
    /// An opaque string.
    Raw(String),

    /// A hint that parsed as JSON.
    Structured {
        /// The hint exactly as it appears in the identifier.
        raw: String,

        /// The parsed value.
        value: Value,
    },
}

impl Hint {
    /// Classify `raw`. Never fails.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        if !raw.starts_with(['{', '[']) {
            return Self::Raw(raw.to_string());
        }
        match serde_json::from_str::<Value>(raw) {
            Ok(value) => Self::Structured {
                raw: raw.to_string(),
                value,
            },
            Err(e) => {
                tracing::debug!("hint is not valid JSON, keeping it raw: {e}");
                Self::Raw(raw.to_string())
            }
        }
    }

    /// The hint as it appears in the identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Raw(raw) | Self::Structured { raw, .. } => raw,
        }
    }

    /// Object view of the hint. Raw hints are wrapped as `{"value": <hint>}`.
    #[must_use]
    pub fn object(&self) -> Value {
        match self {
            Self::Raw(raw) => json!({ "value": raw }),
            Self::Structured { value, .. } => value.clone(),
        }
    }

    /// Look up a key of a structured object hint.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Self::Structured { value, .. } => value.get(key),
            Self::Raw(_) => None,
        }
    }
}
