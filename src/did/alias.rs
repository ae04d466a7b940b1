//! `did:alias` identifiers.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::url::{DidUrl, Validator, DID_PREFIX};
use crate::crypto::psk_hash;
use crate::error::Error;
use crate::Result;

/// DID type of alias identifiers.
pub const ALIAS_DID_TYPE: &str = "alias";

/// Bytes of randomness in each alias seed.
const SEED_LENGTH: usize = 32;

const VALIDATOR: Validator = Validator {
    prefix: DID_PREFIX,
    did_type: ALIAS_DID_TYPE,
    segments: |segments| segments.len() == 2 && segments.iter().all(|s| !s.is_empty()),
};

/// A domain-scoped alias DID: `did:alias:<domain>:<alias>`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AliasDid {
    dl_domain: String,
    alias: String,
}

impl AliasDid {
    /// Create an alias DID, generating a random alias when none is given.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingDomain`] if no (non-empty) domain is given and
    /// [`Error::InvalidFormat`] if either value contains `:`.
    pub fn new(dl_domain: Option<&str>, alias: Option<&str>) -> Result<Self> {
        let alias = match alias.filter(|a| !a.is_empty()) {
            Some(alias) => alias.to_string(),
            None => generate_alias(),
        };
        let Some(dl_domain) = dl_domain.filter(|d| !d.is_empty()) else {
            crate::tracerr!(Error::MissingDomain, "missing the DL domain for alias DID");
        };
        if dl_domain.contains(':') || alias.contains(':') {
            crate::tracerr!(Error::InvalidFormat, "alias DID segments must not contain ':'");
        }

        Ok(Self {
            dl_domain: dl_domain.to_string(),
            alias,
        })
    }

    /// Create an alias DID with a freshly generated alias.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingDomain`] if `dl_domain` is empty.
    pub fn generate(dl_domain: &str) -> Result<Self> {
        Self::new(Some(dl_domain), None)
    }

    /// The alias segment.
    #[must_use]
    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// The domain segment.
    #[must_use]
    pub fn dl_domain(&self) -> &str {
        &self.dl_domain
    }

    /// The DID URL, `did:alias:<domain>:<alias>`.
    #[must_use]
    pub fn to_url(&self) -> String {
        DidUrl {
            did_type: ALIAS_DID_TYPE.to_string(),
            segments: vec![self.dl_domain.clone(), self.alias.clone()],
        }
        .to_string()
    }
}

impl FromStr for AliasDid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let DidUrl { mut segments, .. } = DidUrl::parse(s, &VALIDATOR)?;
        let alias = segments.pop().unwrap_or_default();
        let dl_domain = segments.pop().unwrap_or_default();
        Ok(Self { dl_domain, alias })
    }
}

impl Display for AliasDid {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_url())
    }
}

impl Serialize for AliasDid {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_url())
    }
}

impl<'de> Deserialize<'de> for AliasDid {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let url = String::deserialize(deserializer)?;
        url.parse().map_err(serde::de::Error::custom)
    }
}

// Two independent commitments joined by ':' and base58 encoded. Both halves
// are kept: an encoder that hex-decodes the joined string stops at the ':'
// and keeps only the first hash, which is intentionally not reproduced here.
fn generate_alias() -> String {
    let mut seeds = [[0u8; SEED_LENGTH]; 3];
    for seed in &mut seeds {
        OsRng.fill_bytes(seed);
    }
    let [v1, v2, v3] = seeds;

    let first = psk_hash(hex::encode(psk_hash(&v1)).as_bytes());
    let second = psk_hash(
        format!("{}{}", hex::encode(psk_hash(&v2)), hex::encode(psk_hash(&v3))).as_bytes(),
    );

    let mut combined = first;
    combined.push(b':');
    combined.extend_from_slice(&second);
    bs58::encode(combined).into_string()
}
