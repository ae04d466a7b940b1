use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use dashmap::DashMap;
use ed25519_dalek::{Signer, SigningKey};
use keyssi::{Enclave, KeySsi};
use rand::rngs::OsRng;

/// Ephemeral Ed25519 keyring. Signs with the default key unless a key
/// reference is given.
#[derive(Clone)]
pub struct Keyring {
    default: SigningKey,
    keys: Arc<DashMap<String, SigningKey>>,
}

impl Default for Keyring {
    fn default() -> Self {
        Self::new()
    }
}

impl Keyring {
    /// Create a keyring with a freshly generated default key.
    #[must_use]
    pub fn new() -> Self {
        Self {
            default: SigningKey::generate(&mut OsRng),
            keys: Arc::new(DashMap::new()),
        }
    }

    /// Public key of the default key.
    #[must_use]
    pub fn public_key(&self) -> Vec<u8> {
        self.default.verifying_key().to_bytes().to_vec()
    }

    /// Generate a key under `key_ref`, returning its public key.
    pub fn add_key(&self, key_ref: impl Into<String>) -> Vec<u8> {
        let key = SigningKey::generate(&mut OsRng);
        let public_key = key.verifying_key().to_bytes().to_vec();
        self.keys.insert(key_ref.into(), key);
        public_key
    }

    fn sign(&self, key_ref: Option<&str>, data: &[u8]) -> anyhow::Result<Vec<u8>> {
        let signature = match key_ref {
            None => self.default.sign(data),
            Some(key_ref) => {
                let Some(key) = self.keys.get(key_ref) else {
                    return Err(anyhow!("key not found: {key_ref}"));
                };
                key.sign(data)
            }
        };
        Ok(signature.to_bytes().to_vec())
    }
}

impl Enclave for Keyring {
    async fn sign_for_keyssi(
        &self, key_ref: Option<&str>, _: &KeySsi, data: &[u8],
    ) -> anyhow::Result<Vec<u8>> {
        self.sign(key_ref, data)
    }
}

/// A [`Keyring`] that records every payload it is asked to sign.
#[derive(Clone, Default)]
pub struct RecordingEnclave {
    keyring: Keyring,
    payloads: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl RecordingEnclave {
    /// Create a recording enclave over a new keyring.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Public key of the underlying keyring's default key.
    #[must_use]
    pub fn public_key(&self) -> Vec<u8> {
        self.keyring.public_key()
    }

    /// Payloads signed so far, oldest first.
    #[must_use]
    pub fn payloads(&self) -> Vec<Vec<u8>> {
        self.payloads.lock().expect("lock on payloads mutex failed").clone()
    }
}

impl Enclave for RecordingEnclave {
    async fn sign_for_keyssi(
        &self, key_ref: Option<&str>, keyssi: &KeySsi, data: &[u8],
    ) -> anyhow::Result<Vec<u8>> {
        self.payloads.lock().expect("lock on payloads mutex failed").push(data.to_vec());
        self.keyring.sign_for_keyssi(key_ref, keyssi, data).await
    }
}

/// An enclave that always fails to sign.
#[derive(Clone, Copy, Debug, Default)]
pub struct FailingEnclave;

impl Enclave for FailingEnclave {
    async fn sign_for_keyssi(
        &self, _: Option<&str>, keyssi: &KeySsi, _: &[u8],
    ) -> anyhow::Result<Vec<u8>> {
        Err(anyhow!("enclave is locked: cannot sign for {}", keyssi.type_name()))
    }
}
