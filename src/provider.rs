//! # Provider Traits
//!
//! External authorities a KeySSI reaches out to. None of them are held by
//! the identifier itself: each is passed in for the duration of a single
//! call, so tests can inject deterministic fakes.

use std::future::Future;

use crate::crypto::Registry;
use crate::keyssi::KeySsi;
use crate::Result;

/// [`Provider`] is implemented by callers to supply everything an anchoring
/// operation needs: the crypto registry, the type-derivation authority and
/// the signing enclave.
pub trait Provider: CryptoProvider + TypeAuthority + Enclave {}

/// A blanket implementation for `Provider` trait so that any type
/// implementing the required super traits is considered a `Provider`.
impl<T> Provider for T where T: CryptoProvider + TypeAuthority + Enclave {}

/// [`CryptoProvider`] gives access to the crypto algorithm registry.
pub trait CryptoProvider: Send + Sync {
    /// The registry used to resolve a type's crypto suite.
    fn registry(&self) -> &Registry;
}

/// [`Enclave`] is the signing authority. It holds private key material and
/// signs on behalf of a KeySSI.
pub trait Enclave: Send + Sync {
    /// Sign `data` for `keyssi`, optionally using the key referenced by
    /// `key_ref`. Returns the raw signature bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if no key is available or signing fails.
    fn sign_for_keyssi(
        &self, key_ref: Option<&str>, keyssi: &KeySsi, data: &[u8],
    ) -> impl Future<Output = anyhow::Result<Vec<u8>>> + Send;
}

/// [`TypeAuthority`] owns the relationships between KeySSI types:
/// derivation, root types and the type used for anchoring.
pub trait TypeAuthority: Send + Sync {
    /// Derive a KeySSI of type `target` from `source`. The source is never
    /// modified.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Derivation`](crate::Error::Derivation) if `target`
    /// cannot be reached from the source's type.
    fn derived_type(
        &self, source: &KeySsi, target: &str,
    ) -> impl Future<Output = Result<KeySsi>> + Send;

    /// The name of the type at the root of `keyssi`'s derivation family.
    ///
    /// # Errors
    ///
    /// Returns an error if the type is unknown to the authority.
    fn root_type_name(&self, keyssi: &KeySsi) -> Result<String>;

    /// The KeySSI used to anchor `keyssi`'s history.
    ///
    /// # Errors
    ///
    /// Returns an error if the type is unknown or derivation fails.
    fn anchor_type(&self, keyssi: &KeySsi) -> Result<KeySsi>;

    /// Create an empty (template) KeySSI of the named type.
    ///
    /// # Errors
    ///
    /// Returns an error if the type is unknown to the authority.
    fn create_type(&self, type_name: &str) -> Result<KeySsi>;

    /// The DSU representation used for resources named by `keyssi`, if any.
    fn representation_name(&self, keyssi: &KeySsi) -> Option<String> {
        let _ = keyssi;
        None
    }
}
