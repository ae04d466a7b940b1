//! # Configuration
//!
//! Constants shared by the identifier codec, the [`Environment`] used to
//! resolve `$NAME` domain indirections, and options for the representation
//! [`Factory`](crate::factory::Factory).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::Result;

/// Literal prefix of every canonical KeySSI.
pub const SSI_PREFIX: &str = "ssi";

/// Version assigned when an identifier does not carry one.
pub const DEFAULT_VERSION: &str = "v0";

/// Maximum number of characters in a plain identifier, hint included.
pub const MAX_KEYSSI_LENGTH: usize = 2048;

/// Hint key used to redirect brick storage to another domain.
pub const BRICKS_DOMAIN_KEY: &str = "bricksDomain";

/// Marks a domain that should be read from the environment.
pub const ENV_DOMAIN_MARKER: char = '$';

/// A source of configuration values used to resolve domain indirections.
///
/// A domain such as `$DOMAIN` is looked up as `DOMAIN` at the moment it is
/// read, never when the identifier is parsed.
pub trait Environment {
    /// Return the value of the named variable, if set.
    fn var(&self, name: &str) -> Option<String>;
}

/// The process environment.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProcessEnv;

impl Environment for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl<S: ::std::hash::BuildHasher> Environment for HashMap<String, String, S> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// Resolve a raw domain value, following a `$NAME` indirection through `env`.
///
/// Empty domains resolve to `None`, as do indirections to unset variables.
pub fn resolve_domain(domain: Option<&str>, env: &impl Environment) -> Option<String> {
    let domain = domain.filter(|d| !d.is_empty())?;
    match domain.strip_prefix(ENV_DOMAIN_MARKER) {
        Some(name) => env.var(name),
        None => Some(domain.to_string()),
    }
}

/// Options used to construct a representation [`Factory`](crate::factory::Factory).
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FactoryOptions {
    /// Default domain for DSUs created by the factory.
    pub dl_domain: Option<String>,
}

impl FactoryOptions {
    /// Create options for the given domain.
    #[must_use]
    pub fn new(dl_domain: impl Into<String>) -> Self {
        Self {
            dl_domain: Some(dl_domain.into()),
        }
    }

    /// The configured domain.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingDomain`] if no (non-empty) domain is set.
    pub fn domain(&self) -> Result<&str> {
        match self.dl_domain.as_deref() {
            Some(d) if !d.is_empty() => Ok(d),
            _ => Err(Error::MissingDomain("a DL domain is required".into())),
        }
    }
}
