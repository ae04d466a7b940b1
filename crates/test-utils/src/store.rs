use std::sync::Arc;

use dashmap::DashMap;
use keyssi::BrickStorage;
use sha2::{Digest, Sha256};

/// In-memory brick store. Bricks are addressed by the hex SHA-256 of their
/// content within a domain.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    bricks: Arc<DashMap<(String, String), Vec<u8>>>,
    aliases: Arc<DashMap<String, Vec<String>>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl BrickStorage for MemoryStore {
    async fn get_brick(&self, domain: &str, hash: &str) -> anyhow::Result<Option<Vec<u8>>> {
        let key = (domain.to_string(), hash.to_string());
        Ok(self.bricks.get(&key).map(|b| b.clone()))
    }

    async fn put_brick(&self, domain: &str, brick: &[u8]) -> anyhow::Result<String> {
        let hash = hex::encode(Sha256::digest(brick));
        self.bricks.insert((domain.to_string(), hash.clone()), brick.to_vec());
        Ok(hash)
    }

    async fn update_alias(&self, alias: &str, value: &str) -> anyhow::Result<()> {
        self.aliases.entry(alias.to_string()).or_default().push(value.to_string());
        Ok(())
    }

    async fn alias_versions(&self, alias: &str) -> anyhow::Result<Vec<String>> {
        Ok(self.aliases.get(alias).map(|v| v.clone()).unwrap_or_default())
    }
}
