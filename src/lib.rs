//! # KeySSI
//!
//! Self-sovereign identity keys: structured, versioned identifiers that name
//! a resource and the crypto binding used to sign for it.
//!
//! The crate provides:
//!
//! - [`KeySsi`] parsing and canonical serialization, in both the plain
//!   `ssi:<type>:<domain>:<specific>:<control>:<version>[:<hint>]` form and
//!   its opaque base58 encoding;
//! - type derivation and casting through a [`TypeAuthority`] (by default the
//!   built-in [`TypeTable`]);
//! - a crypto algorithm [`Registry`] keyed by type name;
//! - signed, hash-linked anchor records ([`SignedHashLinkSsi`]) built by
//!   [`KeySsi::create_anchor_value`];
//! - `did:alias` identifiers ([`AliasDid`]).
//!
//! Signing is always delegated to an [`Enclave`] supplied by the caller, so
//! private key material never passes through this crate.
//!
//! # Example
//!
//! ```
//! use keyssi::KeySsi;
//!
//! let keyssi: KeySsi = "ssi:seed:default:abc:def:v0".parse().expect("should parse");
//! assert_eq!(keyssi.type_name(), "seed");
//!
//! let opaque = keyssi.identifier(false);
//! assert_eq!(opaque.parse::<KeySsi>().expect("should parse"), keyssi);
//! ```

pub mod config;
pub mod crypto;
pub mod did;
mod error;
pub mod factory;
pub mod keyssi;
pub mod provider;
pub mod storage;
pub mod types;

#[doc(hidden)]
pub use tracing;

pub use self::config::{Environment, FactoryOptions, ProcessEnv};
pub use self::crypto::{CryptoSuite, Ed25519Sha256, Registry};
pub use self::did::{AliasDid, DidUrl};
pub use self::error::Error;
pub use self::factory::{DsuConfig, Factory, RepresentationFactory};
pub use self::keyssi::{Hint, KeySsi, Previous, SignedHashLinkSsi};
pub use self::provider::{CryptoProvider, Enclave, Provider, TypeAuthority};
pub use self::storage::BrickStorage;
pub use self::types::{Derivation, SsiType, TypeRule, TypeTable};

/// Result type for KeySSI operations.
pub type Result<T, E = Error> = core::result::Result<T, E>;
