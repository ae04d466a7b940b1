//! # KeySSI
//!
//! A KeySSI is a structured, versioned identifier naming a resource and the
//! crypto binding used to sign for it. Its canonical text form is
//!
//! `ssi:<type>:<domain>:<specific>:<control>:<version>[:<hint>]`
//!
//! and its opaque form is the base58 encoding of that text.
//!
//! Equality is content based and covers the full identifier, hint included:
//! two KeySSIs are equal when every field of the canonical form matches. The
//! `can_sign` capability flag is not compared. Anchor identity is narrower:
//! it is the no-hint identifier of the anchor type, so KeySSIs that differ
//! only in their hint are unequal yet share an anchor id.

mod anchor;
mod hint;
mod parse;

use crate::config::{self, Environment, BRICKS_DOMAIN_KEY, DEFAULT_VERSION, MAX_KEYSSI_LENGTH};
use crate::crypto::Registry;
use crate::error::Error;
use crate::provider::{CryptoProvider, Enclave, TypeAuthority};
use crate::Result;

pub use self::anchor::{signing_payload, verify_anchor_chain, Previous, SignedHashLinkSsi};
pub use self::hint::Hint;

/// A self-sovereign identity key.
#[derive(Clone, Debug)]
pub struct KeySsi {
    type_name: String,
    domain: Option<String>,
    specific_string: Option<String>,
    control_string: Option<String>,
    version: String,
    hint: Option<Hint>,
    can_sign: bool,
}

impl KeySsi {
    /// Create a KeySSI from its fields.
    ///
    /// Empty strings are treated as absent, and an absent or empty version
    /// becomes `v0`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFormat`] if the type name is empty or a field
    /// contains the `:` delimiter, and [`Error::LengthLimit`] if the full
    /// identifier is longer than [`MAX_KEYSSI_LENGTH`].
    pub fn load(
        type_name: &str, domain: Option<&str>, specific_string: Option<&str>,
        control_string: Option<&str>, version: Option<&str>, hint: Option<&str>,
    ) -> Result<Self> {
        if type_name.is_empty() {
            crate::tracerr!(Error::InvalidFormat, "KeySSI type name must not be empty");
        }
        for field in [Some(type_name), domain, specific_string, control_string, version] {
            if let Some(f) = field.filter(|f| f.contains(':')) {
                crate::tracerr!(Error::InvalidFormat, "KeySSI field must not contain ':': {f}");
            }
        }

        let keyssi = Self {
            type_name: type_name.to_string(),
            domain: non_empty(domain),
            specific_string: non_empty(specific_string),
            control_string: non_empty(control_string),
            version: non_empty(version).unwrap_or_else(|| DEFAULT_VERSION.to_string()),
            hint: hint.map(Hint::parse),
            can_sign: false,
        };
        keyssi.validate_length()?;
        Ok(keyssi)
    }

    /// Create a template KeySSI: a type (and optional domain) with no key
    /// material.
    ///
    /// # Errors
    ///
    /// Returns an error under the same conditions as [`KeySsi::load`].
    pub fn template(type_name: &str, domain: Option<&str>) -> Result<Self> {
        Self::load(type_name, domain, None, None, None, None)
    }

    /// The type name.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// The domain as stored, without resolving `$NAME` indirections.
    #[must_use]
    pub fn raw_domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    /// The domain, resolving a `$NAME` indirection against `env` now.
    ///
    /// Returns `None` if the domain is absent or refers to an unset variable.
    #[must_use]
    pub fn dl_domain(&self, env: &impl Environment) -> Option<String> {
        config::resolve_domain(self.raw_domain(), env)
    }

    /// The type-specific payload.
    #[must_use]
    pub fn specific_string(&self) -> Option<&str> {
        self.specific_string.as_deref()
    }

    /// The type-specific verification material.
    #[must_use]
    pub fn control_string(&self) -> Option<&str> {
        self.control_string.as_deref()
    }

    /// The version tag.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// The hint text, if any.
    #[must_use]
    pub fn hint(&self) -> Option<&str> {
        self.hint.as_ref().map(Hint::as_str)
    }

    /// The classified hint, if any.
    #[must_use]
    pub const fn hint_value(&self) -> Option<&Hint> {
        self.hint.as_ref()
    }

    /// Replace the hint. Identity (and so the anchor id) is unaffected.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LengthLimit`] if the new hint makes the identifier
    /// too long; the previous hint is kept in that case.
    pub fn set_hint(&mut self, hint: Option<&str>) -> Result<()> {
        let previous = std::mem::replace(&mut self.hint, hint.map(Hint::parse));
        if let Err(e) = self.validate_length() {
            self.hint = previous;
            return Err(e);
        }
        Ok(())
    }

    /// The domain brick storage should use: the hint's `bricksDomain` if
    /// present, otherwise the (unresolved) domain.
    #[must_use]
    pub fn bricks_domain(&self) -> Option<String> {
        self.hint
            .as_ref()
            .and_then(|h| h.get(BRICKS_DOMAIN_KEY))
            .and_then(|v| v.as_str())
            .map(ToString::to_string)
            .or_else(|| self.domain.clone())
    }

    /// Whether this KeySSI names a type rather than a concrete key.
    #[must_use]
    pub const fn is_template(&self) -> bool {
        self.specific_string.is_none() && self.control_string.is_none()
    }

    /// Reinterpret the same key material as another, structurally
    /// compatible, type. No compatibility check is made.
    ///
    /// # Errors
    ///
    /// Returns an error if `new_type` is not a valid type name or the
    /// resulting identifier is too long.
    pub fn cast(&self, new_type: &str) -> Result<Self> {
        tracing::debug!("casting {} to {new_type}", self.type_name);
        let mut cast = Self::load(
            new_type,
            self.raw_domain(),
            self.specific_string(),
            self.control_string(),
            Some(self.version()),
            self.hint(),
        )?;
        cast.can_sign = self.can_sign;
        Ok(cast)
    }

    /// Whether this KeySSI may be used to sign.
    #[must_use]
    pub const fn can_sign(&self) -> bool {
        self.can_sign
    }

    /// Set the signing capability flag.
    pub fn set_can_sign(&mut self, can_sign: bool) {
        self.can_sign = can_sign;
    }

    /// Whether signatures can be verified from this KeySSI alone. Always
    /// `false`: public key material is supplied by the caller.
    #[must_use]
    pub const fn can_be_verified(&self) -> bool {
        false
    }

    /// Whether new anchors may be appended for this KeySSI.
    #[must_use]
    pub const fn can_append(&self) -> bool {
        true
    }

    /// Whether this KeySSI is a transfer record.
    #[must_use]
    pub const fn is_transfer(&self) -> bool {
        false
    }

    /// Whether this KeySSI is an alias.
    #[must_use]
    pub const fn is_alias(&self) -> bool {
        false
    }

    /// The DSU representation (`Bar`, `RawDossier`) for this type.
    #[must_use]
    pub fn dsu_representation_name(&self, authority: &impl TypeAuthority) -> Option<String> {
        authority.representation_name(self)
    }

    /// Derive a KeySSI of type `target` from this one.
    ///
    /// # Errors
    ///
    /// Returns the authority's error if the derivation fails.
    pub async fn derived_type(&self, target: &str, authority: &impl TypeAuthority) -> Result<Self> {
        authority.derived_type(self, target).await
    }

    /// The root type of this KeySSI's family.
    ///
    /// # Errors
    ///
    /// Returns the authority's error if the type is unknown.
    pub fn root_type_name(&self, authority: &impl TypeAuthority) -> Result<String> {
        authority.root_type_name(self)
    }

    /// The no-hint identifier of this KeySSI's anchor type. KeySSIs of one
    /// family that name the same resource share an anchor id.
    ///
    /// # Errors
    ///
    /// Returns the authority's error if the anchor type cannot be derived.
    pub fn anchor_id(&self, plain: bool, authority: &impl TypeAuthority) -> Result<String> {
        Ok(authority.anchor_type(self)?.no_hint_identifier(plain))
    }

    /// Hash `data` with this type's crypto suite.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownType`] if no suite is registered for the type.
    pub fn hash(&self, data: &[u8], registry: &Registry) -> Result<Vec<u8>> {
        Ok(registry.resolve(&self.type_name)?.hash(data))
    }

    /// Sign `data` through the enclave. Returns the signature encoded as
    /// base64 by this type's crypto suite.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownType`] for an unregistered type and
    /// [`Error::Signing`] if the enclave fails.
    pub async fn sign<P>(&self, data: &[u8], provider: &P) -> Result<String>
    where
        P: Enclave + CryptoProvider,
    {
        self.sign_with_key(data, None, provider).await
    }

    /// Sign `data` through the enclave using the key referenced by
    /// `key_ref`, or the enclave's default key when `None`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownType`] for an unregistered type and
    /// [`Error::Signing`] if the enclave fails, including when it holds no
    /// key for `key_ref`.
    pub async fn sign_with_key<P>(
        &self, data: &[u8], key_ref: Option<&str>, provider: &P,
    ) -> Result<String>
    where
        P: Enclave + CryptoProvider,
    {
        let suite = provider.registry().resolve(&self.type_name)?;
        let signature = provider.sign_for_keyssi(key_ref, self, data).await.map_err(|e| {
            tracing::error!("enclave failed to sign for {}: {e}", self.type_name);
            Error::Signing(format!("enclave failed to sign: {e}"))
        })?;
        Ok(suite.base64_encode(&signature))
    }

    /// Verify a base64 `signature` over `data` using `public_key`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownType`] for an unregistered type and
    /// [`Error::Verification`] if the signature is not valid base64.
    pub fn verify(
        &self, data: &[u8], public_key: &[u8], signature: &str, registry: &Registry,
    ) -> Result<bool> {
        let suite = registry.resolve(&self.type_name)?;
        let signature = suite
            .base64_decode(signature)
            .map_err(|e| Error::Verification(format!("signature is not decodable: {e}")))?;
        Ok(suite.verify(data, public_key, &signature))
    }

    fn validate_length(&self) -> Result<()> {
        let length = self.identifier(true).chars().count();
        if length > MAX_KEYSSI_LENGTH {
            crate::tracerr!(
                Error::LengthLimit,
                "identifier length {length} exceeds maximum of {MAX_KEYSSI_LENGTH}"
            );
        }
        Ok(())
    }
}

impl PartialEq for KeySsi {
    fn eq(&self, other: &Self) -> bool {
        self.type_name == other.type_name
            && self.domain == other.domain
            && self.specific_string == other.specific_string
            && self.control_string == other.control_string
            && self.version == other.version
            && self.hint() == other.hint()
    }
}

impl Eq for KeySsi {}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(ToString::to_string)
}
