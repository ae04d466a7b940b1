use keyssi::{CryptoProvider, Enclave, KeySsi, Registry, Result, TypeAuthority, TypeTable};

use crate::keyring::Keyring;

/// Provider combining the default [`TypeTable`] with a test enclave.
#[derive(Clone, Default)]
pub struct TestProvider<E = Keyring> {
    /// Type authority and crypto registry.
    pub table: TypeTable,

    /// Signing enclave.
    pub enclave: E,
}

impl<E: Enclave> TestProvider<E> {
    /// Create a provider around `enclave`.
    #[must_use]
    pub fn new(enclave: E) -> Self {
        Self {
            table: TypeTable::default(),
            enclave,
        }
    }
}

impl<E: Enclave> CryptoProvider for TestProvider<E> {
    fn registry(&self) -> &Registry {
        self.table.registry()
    }
}

impl<E: Enclave> TypeAuthority for TestProvider<E> {
    async fn derived_type(&self, source: &KeySsi, target: &str) -> Result<KeySsi> {
        self.table.derived_type(source, target).await
    }

    fn root_type_name(&self, keyssi: &KeySsi) -> Result<String> {
        self.table.root_type_name(keyssi)
    }

    fn anchor_type(&self, keyssi: &KeySsi) -> Result<KeySsi> {
        self.table.anchor_type(keyssi)
    }

    fn create_type(&self, type_name: &str) -> Result<KeySsi> {
        self.table.create_type(type_name)
    }

    fn representation_name(&self, keyssi: &KeySsi) -> Option<String> {
        self.table.representation_name(keyssi)
    }
}

impl<E: Enclave> Enclave for TestProvider<E> {
    async fn sign_for_keyssi(
        &self, key_ref: Option<&str>, keyssi: &KeySsi, data: &[u8],
    ) -> anyhow::Result<Vec<u8>> {
        self.enclave.sign_for_keyssi(key_ref, keyssi, data).await
    }
}
