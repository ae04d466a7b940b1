//! # Brick Storage
//!
//! The storage surface anchoring relies on: content-addressed bricks plus an
//! append-only list of versions per alias. Anchor histories are stored as
//! alias versions keyed by the KeySSI's (encoded) anchor id, each version
//! being the encoded identifier of one [`SignedHashLinkSsi`].
//!
//! Serializing concurrent appends to one alias is the store's concern.

use std::future::Future;

use crate::keyssi::{KeySsi, SignedHashLinkSsi};
use crate::provider::Provider;
use crate::Result;

/// [`BrickStorage`] is implemented by brick storage transports.
pub trait BrickStorage: Send + Sync {
    /// Fetch the brick stored under `hash` in `domain`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be reached.
    fn get_brick(
        &self, domain: &str, hash: &str,
    ) -> impl Future<Output = anyhow::Result<Option<Vec<u8>>>> + Send;

    /// Store `brick` in `domain`, returning its hash.
    ///
    /// # Errors
    ///
    /// Returns an error if the brick cannot be stored.
    fn put_brick(
        &self, domain: &str, brick: &[u8],
    ) -> impl Future<Output = anyhow::Result<String>> + Send;

    /// Append `value` to the versions of `alias`.
    ///
    /// # Errors
    ///
    /// Returns an error if the alias cannot be updated.
    fn update_alias(
        &self, alias: &str, value: &str,
    ) -> impl Future<Output = anyhow::Result<()>> + Send;

    /// Every version recorded for `alias`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be reached.
    fn alias_versions(
        &self, alias: &str,
    ) -> impl Future<Output = anyhow::Result<Vec<String>>> + Send;
}

/// Extend `keyssi`'s anchor history with a record committing to
/// `content_hash`, linked to the latest stored record.
///
/// # Errors
///
/// Returns an error if the latest record does not parse, anchoring fails or
/// the store rejects the update. Nothing is stored on failure.
pub async fn append_anchor(
    keyssi: &KeySsi, content_hash: &str, provider: &impl Provider, store: &impl BrickStorage,
) -> Result<SignedHashLinkSsi> {
    let alias = keyssi.anchor_id(false, provider)?;
    let versions = store.alias_versions(&alias).await?;

    let previous = versions.last().map(String::as_str);
    let anchor = keyssi.create_anchor_value(content_hash, previous, provider).await?;
    store.update_alias(&alias, &anchor.identifier(false)).await?;

    tracing::debug!("appended anchor {} for {alias}", versions.len());
    Ok(anchor)
}

/// The stored anchor history of `keyssi`, oldest first.
///
/// # Errors
///
/// Returns an error if a stored record does not parse or the store cannot
/// be reached.
pub async fn anchor_history(
    keyssi: &KeySsi, provider: &impl Provider, store: &impl BrickStorage,
) -> Result<Vec<SignedHashLinkSsi>> {
    let alias = keyssi.anchor_id(false, provider)?;
    store.alias_versions(&alias).await?.iter().map(|v| v.parse()).collect()
}
