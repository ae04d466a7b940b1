//! # Representation Factory
//!
//! Dispatches DSU creation and loading to a handler registered under a
//! representation name. The concrete representations (`Bar`,
//! `RawDossier`) live outside this crate; only their names are built in.

use std::collections::HashMap;
use std::future::Future;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::FactoryOptions;
use crate::error::Error;
use crate::keyssi::KeySsi;
use crate::provider::TypeAuthority;
use crate::Result;

/// Name of the mutable, brick-backed archive representation.
pub const BAR: &str = "Bar";

/// Name of the raw dossier representation.
pub const RAW_DOSSIER: &str = "RawDossier";

/// Representation names known to every deployment.
pub const BUILTIN_DSU_REPR: [&str; 2] = [BAR, RAW_DOSSIER];

/// Configuration passed to a representation handler.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DsuConfig {
    /// KeySSI (or template) naming the DSU.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyssi: Option<KeySsi>,

    /// Domain for the DSU. Filled from the factory's options when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dl_domain: Option<String>,

    /// Handler-specific options.
    #[serde(flatten)]
    pub options: Map<String, Value>,
}

/// A handler that creates and loads DSUs of one representation.
pub trait RepresentationFactory: Send + Sync {
    /// The DSU produced by the handler.
    type Dsu: Send;

    /// Create a new DSU.
    ///
    /// # Errors
    ///
    /// Returns an error if the DSU cannot be created.
    fn create(&self, config: &DsuConfig) -> impl Future<Output = anyhow::Result<Self::Dsu>> + Send;

    /// Load an existing DSU named by `keyssi`.
    ///
    /// # Errors
    ///
    /// Returns an error if the DSU cannot be loaded.
    fn load(
        &self, keyssi: &KeySsi, config: &DsuConfig,
    ) -> impl Future<Output = anyhow::Result<Self::Dsu>> + Send;
}

/// Registry of representation handlers.
#[derive(Clone, Debug)]
pub struct Factory<H> {
    dl_domain: String,
    factories: HashMap<String, H>,
}

impl<H: RepresentationFactory> Factory<H> {
    /// Create an empty factory.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingDomain`] if the options carry no domain.
    pub fn new(options: &FactoryOptions) -> Result<Self> {
        Ok(Self {
            dl_domain: options.domain()?.to_string(),
            factories: HashMap::new(),
        })
    }

    /// Register `handler` under `representation`, replacing any existing
    /// handler.
    pub fn register_representation(&mut self, representation: impl Into<String>, handler: H) {
        let representation = representation.into();
        tracing::debug!("registering DSU representation {representation}");
        self.factories.insert(representation, handler);
    }

    /// Whether a handler is registered under `representation`.
    #[must_use]
    pub fn is_valid_representation(&self, representation: &str) -> bool {
        self.factories.contains_key(representation)
    }

    /// The default domain for DSUs.
    #[must_use]
    pub fn dl_domain(&self) -> &str {
        &self.dl_domain
    }

    /// Create a DSU of the given representation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRepresentation`] for an unregistered name, or
    /// the handler's error.
    pub async fn create(&self, representation: &str, config: DsuConfig) -> Result<H::Dsu> {
        let handler = self.handler(representation)?;
        let config = self.with_domain(config);
        Ok(handler.create(&config).await?)
    }

    /// Load the DSU named by `keyssi` with the given representation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRepresentation`] for an unregistered name, or
    /// the handler's error.
    pub async fn load(
        &self, keyssi: &KeySsi, representation: &str, config: DsuConfig,
    ) -> Result<H::Dsu> {
        let handler = self.handler(representation)?;
        let config = self.with_domain(config);
        Ok(handler.load(keyssi, &config).await?)
    }

    /// Load the DSU named by `keyssi` using the representation its type maps
    /// to.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRepresentation`] if the type has no
    /// representation or it is not registered.
    pub async fn load_by_type(
        &self, keyssi: &KeySsi, authority: &impl TypeAuthority, config: DsuConfig,
    ) -> Result<H::Dsu> {
        let Some(representation) = keyssi.dsu_representation_name(authority) else {
            crate::tracerr!(
                Error::InvalidRepresentation,
                "no DSU representation for KeySSI type {}",
                keyssi.type_name()
            );
        };
        self.load(keyssi, &representation, config).await
    }

    fn handler(&self, representation: &str) -> Result<&H> {
        let Some(handler) = self.factories.get(representation) else {
            crate::tracerr!(
                Error::InvalidRepresentation,
                "invalid DSU representation: {representation}"
            );
        };
        Ok(handler)
    }

    fn with_domain(&self, mut config: DsuConfig) -> DsuConfig {
        if config.dl_domain.is_none() {
            config.dl_domain = Some(self.dl_domain.clone());
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TypeTable;

    struct Named(&'static str);

    impl RepresentationFactory for Named {
        type Dsu = (String, Option<String>);

        async fn create(&self, config: &DsuConfig) -> anyhow::Result<Self::Dsu> {
            Ok((self.0.to_string(), config.dl_domain.clone()))
        }

        async fn load(&self, keyssi: &KeySsi, config: &DsuConfig) -> anyhow::Result<Self::Dsu> {
            Ok((format!("{}:{}", self.0, keyssi.type_name()), config.dl_domain.clone()))
        }
    }

    fn factory() -> Factory<Named> {
        let mut factory = Factory::new(&FactoryOptions::new("default")).expect("should create");
        factory.register_representation(BAR, Named("bar"));
        factory.register_representation(RAW_DOSSIER, Named("dossier"));
        factory
    }

    #[test]
    fn requires_domain() {
        let res = Factory::<Named>::new(&FactoryOptions::default());
        assert!(matches!(res, Err(Error::MissingDomain(_))));
    }

    #[test]
    fn builtin_names() {
        let factory = factory();
        for name in BUILTIN_DSU_REPR {
            assert!(factory.is_valid_representation(name));
        }
        assert!(!factory.is_valid_representation("Other"));
    }

    #[tokio::test]
    async fn dispatch() {
        let factory = factory();
        let (name, domain) =
            factory.create(BAR, DsuConfig::default()).await.expect("should create");
        assert_eq!(name, "bar");
        assert_eq!(domain.as_deref(), Some("default"));

        let config = DsuConfig {
            dl_domain: Some("other".into()),
            ..DsuConfig::default()
        };
        let (_, domain) = factory.create(RAW_DOSSIER, config).await.expect("should create");
        assert_eq!(domain.as_deref(), Some("other"));
    }

    #[tokio::test]
    async fn unknown_representation() {
        let Err(e) = factory().create("Other", DsuConfig::default()).await else {
            panic!("expected error");
        };
        assert!(matches!(e, Error::InvalidRepresentation(_)));
    }

    #[tokio::test]
    async fn load_by_type() {
        let factory = factory();
        let table = TypeTable::default();

        let keyssi = KeySsi::template("const", Some("default")).expect("should create");
        let (name, _) = factory
            .load_by_type(&keyssi, &table, DsuConfig::default())
            .await
            .expect("should load");
        assert_eq!(name, "dossier:const");

        let hl = KeySsi::template("hl", Some("default")).expect("should create");
        let res = factory.load_by_type(&hl, &table, DsuConfig::default()).await;
        assert!(matches!(res, Err(Error::InvalidRepresentation(_))));
    }
}
