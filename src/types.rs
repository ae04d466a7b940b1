//! # KeySSI Types
//!
//! Built-in type names and the default [`TypeAuthority`], a table of
//! derivation rules keyed by type name.
//!
//! Types form derivation families. Deriving walks the family one step at a
//! time (for example `seed` → `sread` → `sza`) and the last type of the
//! walk is the family's anchor type.

use std::collections::{HashMap, HashSet};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use crate::crypto::Registry;
use crate::error::Error;
use crate::factory::{BAR, RAW_DOSSIER};
use crate::keyssi::KeySsi;
use crate::provider::{CryptoProvider, TypeAuthority};
use crate::Result;

/// KeySSI types known to this crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SsiType {
    /// `seed`: holds the private key of a mutable resource.
    Seed,

    /// `sread`: read access to a `seed` resource.
    SRead,

    /// `sza`: zero-access (anchoring only) form of a `seed` resource.
    SZeroAccess,

    /// `const`: key of an immutable resource.
    Const,

    /// `cza`: zero-access form of a `const` resource.
    ConstZeroAccess,

    /// `array`: `const` key built from an array of values.
    Array,

    /// `wallet`: `const` key used for wallets.
    Wallet,

    /// `pass`: `const` key built from a password.
    Password,

    /// `hl`: link to a content hash.
    HashLink,

    /// `shl`: signed, hash-linked anchor record.
    SignedHashLink,
}

impl SsiType {
    /// Every built-in type.
    pub const ALL: [Self; 10] = [
        Self::Seed,
        Self::SRead,
        Self::SZeroAccess,
        Self::Const,
        Self::ConstZeroAccess,
        Self::Array,
        Self::Wallet,
        Self::Password,
        Self::HashLink,
        Self::SignedHashLink,
    ];

    /// The type name used in identifiers.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Seed => "seed",
            Self::SRead => "sread",
            Self::SZeroAccess => "sza",
            Self::Const => "const",
            Self::ConstZeroAccess => "cza",
            Self::Array => "array",
            Self::Wallet => "wallet",
            Self::Password => "pass",
            Self::HashLink => "hl",
            Self::SignedHashLink => "shl",
        }
    }
}

impl FromStr for SsiType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| Error::UnknownType(format!("unknown KeySSI type: {s}")))
    }
}

impl Display for SsiType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How key material changes when a KeySSI is derived to the next type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Derivation {
    /// Material is carried over unchanged.
    Keep,

    /// The specific string is replaced by the encoded hash of itself.
    HashSpecific,

    /// The specific string is dropped; the control string is kept.
    DropSpecific,

    /// The specific string is dropped and its encoded hash becomes the
    /// control string.
    HashIntoControl,
}

/// Relationships of one type to the rest of its family.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeRule {
    /// Type at the root of the family.
    pub root: String,

    /// Next type in the family and how material is transformed to reach it.
    /// `None` when this type is the family's anchor type.
    pub derives_to: Option<(String, Derivation)>,

    /// DSU representation for resources named by this type.
    pub representation: Option<String>,
}

impl TypeRule {
    fn builtin(root: SsiType, next: Option<(SsiType, Derivation)>, repr: Option<&str>) -> Self {
        Self {
            root: root.as_str().to_string(),
            derives_to: next.map(|(t, d)| (t.as_str().to_string(), d)),
            representation: repr.map(ToString::to_string),
        }
    }
}

/// Default [`TypeAuthority`]: a table of [`TypeRule`]s plus the crypto
/// registry used to hash material during derivation.
#[derive(Clone, Debug)]
pub struct TypeTable {
    rules: HashMap<String, TypeRule>,
    registry: Registry,
}

impl TypeTable {
    /// Create a table with no rules.
    #[must_use]
    pub fn new(registry: Registry) -> Self {
        Self {
            rules: HashMap::new(),
            registry,
        }
    }

    /// Add or replace the rule for `type_name`.
    pub fn register(&mut self, type_name: impl Into<String>, rule: TypeRule) {
        self.rules.insert(type_name.into(), rule);
    }

    /// The rule registered for `type_name`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownType`] if no rule is registered.
    pub fn rule(&self, type_name: &str) -> Result<&TypeRule> {
        self.rules
            .get(type_name)
            .ok_or_else(|| Error::UnknownType(format!("no type rule registered for {type_name}")))
    }

    /// Derive `source` one step along its family, returning `None` when the
    /// source is already the family's anchor type.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Derivation`] if material required by the derivation
    /// is absent, or [`Error::UnknownType`] for unregistered types.
    pub fn derive_once(&self, source: &KeySsi) -> Result<Option<KeySsi>> {
        let Some((next, derivation)) = &self.rule(source.type_name())?.derives_to else {
            return Ok(None);
        };

        let hashed_specific = || -> Result<String> {
            let Some(specific) = source.specific_string() else {
                return Err(Error::Derivation(format!(
                    "cannot derive {next} from {}: specific string is absent",
                    source.type_name()
                )));
            };
            let suite = self.registry.resolve(source.type_name())?;
            Ok(suite.encode(&suite.hash(specific.as_bytes())))
        };

        let control = source.control_string().map(ToString::to_string);
        let (specific, control) = match derivation {
            Derivation::Keep => (source.specific_string().map(ToString::to_string), control),
            Derivation::HashSpecific => (Some(hashed_specific()?), control),
            Derivation::DropSpecific => (None, control),
            Derivation::HashIntoControl => (None, Some(hashed_specific()?)),
        };

        let derived = KeySsi::load(
            next,
            source.raw_domain(),
            specific.as_deref(),
            control.as_deref(),
            Some(source.version()),
            source.hint(),
        )?;
        tracing::debug!("derived {} from {}", derived.type_name(), source.type_name());
        Ok(Some(derived))
    }

    // Walks until `target` is reached, or to the end of the family when
    // `target` is `None`. Revisiting a type is a cycle in the rules.
    fn walk(&self, source: &KeySsi, target: Option<&str>) -> Result<KeySsi> {
        let mut visited = HashSet::new();
        let mut current = source.clone();
        while target != Some(current.type_name()) {
            if !visited.insert(current.type_name().to_string()) {
                crate::tracerr!(
                    Error::Derivation,
                    "cyclic derivation for {} at {}",
                    source.type_name(),
                    current.type_name()
                );
            }
            let Some(next) = self.derive_once(&current)? else {
                let Some(target) = target else {
                    return Ok(current);
                };
                crate::tracerr!(
                    Error::Derivation,
                    "cannot derive {target} from {}: {} has no derived type",
                    source.type_name(),
                    current.type_name()
                );
            };
            current = next;
        }
        Ok(current)
    }
}

impl Default for TypeTable {
    /// A table with the built-in families over the default [`Registry`].
    fn default() -> Self {
        use Derivation::{DropSpecific, HashIntoControl, HashSpecific, Keep};
        use SsiType::{
            Array, Const, ConstZeroAccess, HashLink, Password, SRead, SZeroAccess, Seed,
            SignedHashLink, Wallet,
        };

        let bar = Some(BAR);
        let dossier = Some(RAW_DOSSIER);
        let rules = [
            (Seed, Seed, Some((SRead, HashSpecific)), bar),
            (SRead, Seed, Some((SZeroAccess, DropSpecific)), bar),
            (SZeroAccess, Seed, None, bar),
            (Const, Const, Some((ConstZeroAccess, HashIntoControl)), dossier),
            (ConstZeroAccess, Const, None, dossier),
            (Array, Const, Some((Const, Keep)), dossier),
            (Wallet, Const, Some((Const, Keep)), dossier),
            (Password, Const, Some((Const, HashSpecific)), dossier),
            (HashLink, HashLink, None, None),
            (SignedHashLink, SignedHashLink, None, None),
        ];

        let mut table = Self::new(Registry::default());
        for (ssi_type, root, next, repr) in rules {
            table.register(ssi_type.as_str(), TypeRule::builtin(root, next, repr));
        }
        table
    }
}

impl CryptoProvider for TypeTable {
    fn registry(&self) -> &Registry {
        &self.registry
    }
}

impl TypeAuthority for TypeTable {
    async fn derived_type(&self, source: &KeySsi, target: &str) -> Result<KeySsi> {
        self.walk(source, Some(target))
    }

    fn root_type_name(&self, keyssi: &KeySsi) -> Result<String> {
        Ok(self.rule(keyssi.type_name())?.root.clone())
    }

    fn anchor_type(&self, keyssi: &KeySsi) -> Result<KeySsi> {
        self.walk(keyssi, None)
    }

    fn create_type(&self, type_name: &str) -> Result<KeySsi> {
        self.rule(type_name)?;
        KeySsi::template(type_name, None)
    }

    fn representation_name(&self, keyssi: &KeySsi) -> Option<String> {
        self.rules.get(keyssi.type_name()).and_then(|r| r.representation.clone())
    }
}
