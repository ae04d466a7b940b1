//! Signed, hash-linked anchor records.
//!
//! Each record commits to a content hash and to the full identifier of its
//! predecessor, and is signed over
//!
//! `anchor_id || content_hash || previous_identifier || timestamp`
//!
//! where `previous_identifier` is empty for the first (genesis) record and
//! `timestamp` is milliseconds since the Unix epoch in decimal. The order of
//! the concatenation is part of the wire contract.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use chrono::Utc;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::KeySsi;
use crate::crypto::Registry;
use crate::error::Error;
use crate::provider::Provider;
use crate::types::SsiType;
use crate::Result;

/// Separates the timestamp from the signature in the control string.
const CONTROL_SEPARATOR: char = '/';

/// The predecessor of a new anchor record.
#[derive(Clone, Copy, Debug)]
pub enum Previous<'a> {
    /// No predecessor: the record starts the chain.
    Genesis,

    /// A previously built record (or any KeySSI).
    Value(&'a KeySsi),

    /// A previous record's identifier, in plain or opaque form.
    Identifier(&'a str),
}

impl<'a> From<&'a KeySsi> for Previous<'a> {
    fn from(keyssi: &'a KeySsi) -> Self {
        Self::Value(keyssi)
    }
}

impl<'a> From<&'a SignedHashLinkSsi> for Previous<'a> {
    fn from(anchor: &'a SignedHashLinkSsi) -> Self {
        Self::Value(&anchor.keyssi)
    }
}

impl<'a> From<&'a str> for Previous<'a> {
    fn from(identifier: &'a str) -> Self {
        Self::Identifier(identifier)
    }
}

impl<'a> From<&'a String> for Previous<'a> {
    fn from(identifier: &'a String) -> Self {
        identifier.as_str().into()
    }
}

impl<'a, T> From<Option<T>> for Previous<'a>
where
    T: Into<Self>,
{
    fn from(previous: Option<T>) -> Self {
        previous.map_or(Self::Genesis, Into::into)
    }
}

impl Previous<'_> {
    /// The predecessor's plain identifier, or the empty string for genesis.
    ///
    /// # Errors
    ///
    /// Returns an error if an identifier string does not parse.
    pub fn identifier(&self) -> Result<String> {
        match self {
            Self::Genesis => Ok(String::new()),
            Self::Value(keyssi) => Ok(keyssi.identifier(true)),
            Self::Identifier(s) => Ok(KeySsi::auto_load(s)?.identifier(true)),
        }
    }
}

/// Build the data signed for an anchor record.
#[must_use]
pub fn signing_payload(
    anchor_id: &str, content_hash: &str, previous_identifier: &str, timestamp: i64,
) -> String {
    format!("{anchor_id}{content_hash}{previous_identifier}{timestamp}")
}

impl KeySsi {
    /// Build the next anchor record for this KeySSI's resource.
    ///
    /// The record is signed by the provider's enclave over
    /// [`signing_payload`]. Nothing is built if signing fails.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFormat`] if the content hash is empty or
    /// contains `:` or the previous identifier does not parse,
    /// [`Error::Signing`] if the enclave fails, or the type authority's
    /// error if the anchor id cannot be derived.
    pub async fn create_anchor_value<'a>(
        &self, content_hash: &str, previous: impl Into<Previous<'a>>, provider: &impl Provider,
    ) -> Result<SignedHashLinkSsi> {
        validate_content_hash(content_hash)?;

        let anchor_id = self.anchor_id(true, provider)?;
        let previous: Previous<'a> = previous.into();
        let previous_identifier = previous.identifier()?;
        let timestamp = Utc::now().timestamp_millis();

        let payload = signing_payload(&anchor_id, content_hash, &previous_identifier, timestamp);
        let signature = self.sign(payload.as_bytes(), provider).await?;

        let anchor = SignedHashLinkSsi::new(
            self.bricks_domain().as_deref(),
            content_hash,
            timestamp,
            &signature,
            self.version(),
            self.hint(),
        )?;
        tracing::debug!(
            "created anchor for {anchor_id} at {timestamp} (genesis: {})",
            previous_identifier.is_empty()
        );
        Ok(anchor)
    }
}

/// An anchor record: a KeySSI of type `shl` whose specific string is the
/// content hash and whose control string is `<timestamp>/<signature>`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedHashLinkSsi {
    keyssi: KeySsi,
    timestamp: i64,
    signature: String,
}

impl SignedHashLinkSsi {
    /// Assemble a record from its parts.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFormat`] if the content hash or signature is
    /// empty or contains `:`.
    pub fn new(
        domain: Option<&str>, content_hash: &str, timestamp: i64, signature: &str,
        version: &str, hint: Option<&str>,
    ) -> Result<Self> {
        validate_content_hash(content_hash)?;
        if signature.is_empty() {
            crate::tracerr!(Error::InvalidFormat, "anchor signature must not be empty");
        }
        let control = format!("{timestamp}{CONTROL_SEPARATOR}{signature}");
        let keyssi = KeySsi::load(
            SsiType::SignedHashLink.as_str(),
            domain,
            Some(content_hash),
            Some(&control),
            Some(version),
            hint,
        )?;

        Ok(Self {
            keyssi,
            timestamp,
            signature: signature.to_string(),
        })
    }

    /// The committed content hash.
    #[must_use]
    pub fn content_hash(&self) -> &str {
        self.keyssi.specific_string().unwrap_or_default()
    }

    /// Creation time in milliseconds since the Unix epoch.
    #[must_use]
    pub const fn timestamp(&self) -> i64 {
        self.timestamp
    }

    /// The base64 signature.
    #[must_use]
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// The record as a KeySSI.
    #[must_use]
    pub const fn keyssi(&self) -> &KeySsi {
        &self.keyssi
    }

    /// Consume the record, returning the underlying KeySSI.
    #[must_use]
    pub fn into_keyssi(self) -> KeySsi {
        self.keyssi
    }

    /// The record's identifier (see [`KeySsi::identifier`]).
    #[must_use]
    pub fn identifier(&self, plain: bool) -> String {
        self.keyssi.identifier(plain)
    }

    /// Verify the record's signature against its recomputed payload.
    ///
    /// # Errors
    ///
    /// Returns an error if the signature cannot be decoded or no crypto
    /// suite is registered for `shl`.
    pub fn verify(
        &self, anchor_id: &str, previous: Option<&Self>, public_key: &[u8], registry: &Registry,
    ) -> Result<bool> {
        let previous_identifier = previous.map(|p| p.identifier(true)).unwrap_or_default();
        let payload =
            signing_payload(anchor_id, self.content_hash(), &previous_identifier, self.timestamp);
        self.keyssi.verify(payload.as_bytes(), public_key, &self.signature, registry)
    }
}

/// Walk an anchor chain from its genesis record, checking every signature
/// and that timestamps never decrease.
///
/// # Errors
///
/// Returns [`Error::Verification`] naming the first record that fails.
pub fn verify_anchor_chain(
    anchor_id: &str, chain: &[SignedHashLinkSsi], public_key: &[u8], registry: &Registry,
) -> Result<()> {
    let mut previous: Option<&SignedHashLinkSsi> = None;
    for (index, anchor) in chain.iter().enumerate() {
        if let Some(p) = previous {
            if anchor.timestamp < p.timestamp {
                crate::tracerr!(
                    Error::Verification,
                    "anchor {index} is older than its predecessor"
                );
            }
        }
        if !anchor.verify(anchor_id, previous, public_key, registry)? {
            crate::tracerr!(Error::Verification, "anchor {index} has an invalid signature");
        }
        previous = Some(anchor);
    }
    Ok(())
}

impl TryFrom<KeySsi> for SignedHashLinkSsi {
    type Error = Error;

    fn try_from(keyssi: KeySsi) -> Result<Self> {
        if keyssi.type_name() != SsiType::SignedHashLink.as_str() {
            crate::tracerr!(
                Error::InvalidFormat,
                "expected a {} KeySSI, got {}",
                SsiType::SignedHashLink,
                keyssi.type_name()
            );
        }
        if keyssi.specific_string().is_none() {
            crate::tracerr!(Error::InvalidFormat, "anchor has no content hash");
        }
        let Some((timestamp, signature)) =
            keyssi.control_string().and_then(|c| c.split_once(CONTROL_SEPARATOR))
        else {
            crate::tracerr!(Error::InvalidFormat, "anchor control string is malformed");
        };
        let Ok(timestamp) = timestamp.parse::<i64>() else {
            crate::tracerr!(Error::InvalidFormat, "anchor timestamp is not a number: {timestamp}");
        };
        let signature = signature.to_string();

        Ok(Self {
            keyssi,
            timestamp,
            signature,
        })
    }
}

impl FromStr for SignedHashLinkSsi {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        KeySsi::auto_load(s)?.try_into()
    }
}

impl Display for SignedHashLinkSsi {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.keyssi.fmt(f)
    }
}

impl Serialize for SignedHashLinkSsi {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.keyssi.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SignedHashLinkSsi {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let keyssi = KeySsi::deserialize(deserializer)?;
        keyssi.try_into().map_err(serde::de::Error::custom)
    }
}

fn validate_content_hash(content_hash: &str) -> Result<()> {
    if content_hash.is_empty() || content_hash.contains(':') {
        crate::tracerr!(Error::InvalidFormat, "invalid content hash: '{content_hash}'");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_order() {
        let payload = signing_payload("ssi:sza:d::c:v0", "hashB", "ssi:shl:d:hashA:1/sig:v0", 42);
        assert_eq!(payload, "ssi:sza:d::c:v0hashBssi:shl:d:hashA:1/sig:v042");
    }

    #[test]
    fn previous_conversions() {
        assert_eq!(Previous::Genesis.identifier().expect("should resolve"), "");
        let none: Option<&SignedHashLinkSsi> = None;
        assert!(matches!(Previous::from(none), Previous::Genesis));

        let anchor = SignedHashLinkSsi::new(Some("d"), "hashA", 1, "c2ln", "v0", None)
            .expect("should build");
        let encoded = anchor.identifier(false);
        assert_eq!(
            Previous::from(&encoded).identifier().expect("should resolve"),
            anchor.identifier(true)
        );
        assert_eq!(
            Previous::from(Some(&anchor)).identifier().expect("should resolve"),
            "ssi:shl:d:hashA:1/c2ln:v0"
        );
    }

    #[test]
    fn parse_record() {
        let anchor: SignedHashLinkSsi =
            "ssi:shl:d:hashA:1700000000000/c2ln/+A==:v0:hint".parse().expect("should parse");
        assert_eq!(anchor.content_hash(), "hashA");
        assert_eq!(anchor.timestamp(), 1_700_000_000_000);
        assert_eq!(anchor.signature(), "c2ln/+A==");
        assert_eq!(anchor.keyssi().hint(), Some("hint"));
    }

    #[test]
    fn reject_malformed_record() {
        assert!("ssi:seed:d:hashA:1/sig:v0".parse::<SignedHashLinkSsi>().is_err());
        assert!("ssi:shl:d:hashA:nosep:v0".parse::<SignedHashLinkSsi>().is_err());
        assert!("ssi:shl:d:hashA:abc/sig:v0".parse::<SignedHashLinkSsi>().is_err());
        assert!("ssi:shl:d::1/sig:v0".parse::<SignedHashLinkSsi>().is_err());
    }

    #[test]
    fn reject_bad_content_hash() {
        let res = SignedHashLinkSsi::new(Some("d"), "a:b", 1, "sig", "v0", None);
        assert!(matches!(res, Err(Error::InvalidFormat(_))));
        let res = SignedHashLinkSsi::new(Some("d"), "hash", 1, "", "v0", None);
        assert!(matches!(res, Err(Error::InvalidFormat(_))));
    }
}
