//! # DID Aliases
//!
//! Decentralized identifiers of the form `did:alias:<domain>:<alias>`. An
//! alias DID names a resource inside a domain with a random, collision
//! resistant alias instead of key material.
//!
//! DID URLs are handled by the small segmented codec in [`DidUrl`]: a prefix,
//! a DID type and a list of `:`-separated segments checked by a
//! per-type predicate.

mod alias;
mod url;

pub use self::alias::{AliasDid, ALIAS_DID_TYPE};
pub use self::url::{DidUrl, Validator, DID_PREFIX};
