//! # Crypto Algorithm Registry
//!
//! Maps a KeySSI type name to the set of cryptographic capabilities bound to
//! it. The registry is a plain lookup table: resolving a type that was never
//! registered is an error and no default algorithm is ever guessed.

use std::collections::HashMap;
use std::fmt::{self, Debug};
use std::sync::Arc;

use anyhow::anyhow;
use base64ct::{Base64, Encoding};
use ed25519_dalek::{Signature, Signer as _, SigningKey, Verifier as _, VerifyingKey};
use sha2::{Digest, Sha256, Sha512};

use crate::error::Error;
use crate::types::SsiType;
use crate::Result;

/// Capability set bound to one or more KeySSI types.
pub trait CryptoSuite: Send + Sync {
    /// Hash the provided bytes.
    fn hash(&self, data: &[u8]) -> Vec<u8>;

    /// Sign `data` with the raw private key.
    ///
    /// # Errors
    ///
    /// Returns an error if the private key is not valid for the suite.
    fn sign(&self, data: &[u8], private_key: &[u8]) -> anyhow::Result<Vec<u8>>;

    /// Verify `signature` over `data` with the raw public key.
    fn verify(&self, data: &[u8], public_key: &[u8], signature: &[u8]) -> bool;

    /// Encode key material into its text form.
    fn encode(&self, data: &[u8]) -> String;

    /// Decode key material from its text form.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid encoding.
    fn decode(&self, data: &str) -> anyhow::Result<Vec<u8>>;

    /// Encode a signature (or other binary value) as base64.
    fn base64_encode(&self, data: &[u8]) -> String;

    /// Decode a base64 signature (or other binary value).
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid base64.
    fn base64_decode(&self, data: &str) -> anyhow::Result<Vec<u8>>;
}

/// Built-in suite: SHA-256 hashing, Ed25519 signatures, base58 key encoding.
#[derive(Clone, Copy, Debug, Default)]
pub struct Ed25519Sha256;

impl CryptoSuite for Ed25519Sha256 {
    fn hash(&self, data: &[u8]) -> Vec<u8> {
        Sha256::digest(data).to_vec()
    }

    fn sign(&self, data: &[u8], private_key: &[u8]) -> anyhow::Result<Vec<u8>> {
        let secret: [u8; 32] = private_key
            .try_into()
            .map_err(|_| anyhow!("private key must be 32 bytes, got {}", private_key.len()))?;
        let signing_key = SigningKey::from_bytes(&secret);
        Ok(signing_key.sign(data).to_bytes().to_vec())
    }

    fn verify(&self, data: &[u8], public_key: &[u8], signature: &[u8]) -> bool {
        let Ok(key_bytes) = <[u8; 32]>::try_from(public_key) else {
            return false;
        };
        let Ok(verifying_key) = VerifyingKey::from_bytes(&key_bytes) else {
            return false;
        };
        let Ok(signature) = Signature::from_slice(signature) else {
            return false;
        };
        verifying_key.verify(data, &signature).is_ok()
    }

    fn encode(&self, data: &[u8]) -> String {
        bs58::encode(data).into_string()
    }

    fn decode(&self, data: &str) -> anyhow::Result<Vec<u8>> {
        bs58::decode(data).into_vec().map_err(|e| anyhow!("invalid base58: {e}"))
    }

    fn base64_encode(&self, data: &[u8]) -> String {
        Base64::encode_string(data)
    }

    fn base64_decode(&self, data: &str) -> anyhow::Result<Vec<u8>> {
        Base64::decode_vec(data).map_err(|e| anyhow!("invalid base64: {e}"))
    }
}

/// Lookup table from KeySSI type name to [`CryptoSuite`].
#[derive(Clone)]
pub struct Registry {
    suites: HashMap<String, Arc<dyn CryptoSuite>>,
}

impl Registry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            suites: HashMap::new(),
        }
    }

    /// Bind `suite` to `type_name`, replacing any previous binding.
    pub fn register(&mut self, type_name: impl Into<String>, suite: Arc<dyn CryptoSuite>) {
        self.suites.insert(type_name.into(), suite);
    }

    /// Whether a suite is bound to `type_name`.
    #[must_use]
    pub fn contains(&self, type_name: &str) -> bool {
        self.suites.contains_key(type_name)
    }

    /// Resolve the suite bound to `type_name`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownType`] if nothing is registered for the type.
    pub fn resolve(&self, type_name: &str) -> Result<Arc<dyn CryptoSuite>> {
        self.suites.get(type_name).cloned().ok_or_else(|| {
            tracing::error!("no crypto suite registered for type {type_name}");
            Error::UnknownType(format!("no crypto suite registered for type {type_name}"))
        })
    }
}

impl Default for Registry {
    /// A registry binding [`Ed25519Sha256`] to every built-in type.
    fn default() -> Self {
        let suite: Arc<dyn CryptoSuite> = Arc::new(Ed25519Sha256);
        let mut registry = Self::new();
        for ssi_type in SsiType::ALL {
            registry.register(ssi_type.as_str(), Arc::clone(&suite));
        }
        registry
    }
}

impl Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut types = self.suites.keys().collect::<Vec<_>>();
        types.sort();
        f.debug_struct("Registry").field("types", &types).finish()
    }
}

/// Encode a plain identifier into its opaque (base58) form.
#[must_use]
pub fn encode_identifier(plain: &str) -> String {
    bs58::encode(plain.as_bytes()).into_string()
}

/// Decode an opaque identifier back into its plain text form.
///
/// # Errors
///
/// Returns [`Error::InvalidFormat`] if the input is not base58 or does not
/// decode to UTF-8.
pub fn decode_identifier(encoded: &str) -> Result<String> {
    let bytes = bs58::decode(encoded)
        .into_vec()
        .map_err(|e| Error::InvalidFormat(format!("identifier is not base58: {e}")))?;
    String::from_utf8(bytes)
        .map_err(|e| Error::InvalidFormat(format!("decoded identifier is not UTF-8: {e}")))
}

/// The two-stage "psk" hash: SHA-256 over SHA-512.
#[must_use]
pub fn psk_hash(data: &[u8]) -> Vec<u8> {
    Sha256::digest(Sha512::digest(data)).to_vec()
}
