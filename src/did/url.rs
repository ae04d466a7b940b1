//! Destructure DID URLs into a type and its segments.
//!
//! A segmented DID URL is of the form
//!
//! `did:<type>:<segment>[:<segment>...]`.

use std::fmt::{self, Display, Formatter};

use crate::error::Error;
use crate::Result;

/// Literal prefix of every DID URL.
pub const DID_PREFIX: &str = "did";

/// Rules a DID URL must satisfy to parse.
#[derive(Clone, Copy, Debug)]
pub struct Validator {
    /// Expected first component, usually [`DID_PREFIX`].
    pub prefix: &'static str,

    /// Expected DID type (second component).
    pub did_type: &'static str,

    /// Predicate applied to the remaining segments.
    pub segments: fn(&[String]) -> bool,
}

/// Structure of a segmented DID URL.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DidUrl {
    /// DID type, such as `alias`.
    pub did_type: String,

    /// Type-specific segments, in order.
    pub segments: Vec<String>,
}

impl DidUrl {
    /// Parse `url`, checking it against `validator`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFormat`] if the prefix or type does not match
    /// or the segment predicate rejects the segments.
    pub fn parse(url: &str, validator: &Validator) -> Result<Self> {
        let mut parts = url.split(':');

        let prefix = parts.next().unwrap_or_default();
        if prefix != validator.prefix {
            crate::tracerr!(
                Error::InvalidFormat,
                "{url} does not start with '{}:'",
                validator.prefix
            );
        }
        let did_type = parts.next().unwrap_or_default();
        if did_type != validator.did_type {
            crate::tracerr!(
                Error::InvalidFormat,
                "expected DID type '{}', got '{did_type}'",
                validator.did_type
            );
        }

        let segments = parts.map(ToString::to_string).collect::<Vec<_>>();
        if !(validator.segments)(&segments) {
            crate::tracerr!(Error::InvalidFormat, "invalid segments in DID URL: {url}");
        }

        Ok(Self {
            did_type: did_type.to_string(),
            segments,
        })
    }
}

impl Display for DidUrl {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{DID_PREFIX}:{}", self.did_type)?;
        for segment in &self.segments {
            write!(f, ":{segment}")?;
        }
        Ok(())
    }
}
