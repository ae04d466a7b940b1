//! Canonical text form, opaque form and parsing.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};

use super::KeySsi;
use crate::config::SSI_PREFIX;
use crate::crypto::{decode_identifier, encode_identifier};
use crate::error::Error;
use crate::Result;

/// Prefix, five positional fields and the hint remainder.
const MAX_SEGMENTS: usize = 7;

impl KeySsi {
    /// Parse an identifier in either its canonical or its opaque form.
    ///
    /// Input without a `:` is assumed to be opaque and is decoded first. The
    /// hint, if present, is everything after the version segment, colons
    /// included.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFormat`] if the input does not decode to a
    /// structured identifier, the prefix is not `ssi` or fewer than six
    /// segments are present. Returns [`Error::LengthLimit`] if the
    /// reconstructed identifier is too long.
    pub fn auto_load(identifier: &str) -> Result<Self> {
        let plain = if identifier.contains(':') {
            identifier.to_string()
        } else {
            decode_identifier(identifier)?
        };
        if !plain.contains(':') {
            crate::tracerr!(
                Error::InvalidFormat,
                "wrong format of SSI: {identifier} does not decode to a structured identifier"
            );
        }

        let segments = plain.splitn(MAX_SEGMENTS, ':').collect::<Vec<_>>();
        if segments[0] != SSI_PREFIX {
            crate::tracerr!(Error::InvalidFormat, "SSI must start with '{SSI_PREFIX}:': {plain}");
        }
        if segments.len() < MAX_SEGMENTS - 1 {
            crate::tracerr!(
                Error::InvalidFormat,
                "SSI has {} segments, expected at least {}",
                segments.len(),
                MAX_SEGMENTS - 1
            );
        }

        let keyssi = Self::load(
            segments[1],
            Some(segments[2]),
            Some(segments[3]),
            Some(segments[4]),
            Some(segments[5]),
            segments.get(6).copied(),
        )?;
        tracing::debug!("loaded {} KeySSI", keyssi.type_name);
        Ok(keyssi)
    }

    /// The identifier without the hint: `ssi:<type>:<domain>:<specific>:<control>:<version>`.
    ///
    /// Returns the canonical text when `plain` is set, otherwise the opaque
    /// encoding of it.
    #[must_use]
    pub fn no_hint_identifier(&self, plain: bool) -> String {
        let identifier = format!(
            "{SSI_PREFIX}:{}:{}:{}:{}:{}",
            self.type_name,
            self.domain.as_deref().unwrap_or_default(),
            self.specific_string.as_deref().unwrap_or_default(),
            self.control_string.as_deref().unwrap_or_default(),
            self.version
        );
        if plain {
            identifier
        } else {
            encode_identifier(&identifier)
        }
    }

    /// The full identifier: the no-hint identifier followed by `:<hint>`
    /// when a hint is set.
    #[must_use]
    pub fn identifier(&self, plain: bool) -> String {
        let mut identifier = self.no_hint_identifier(true);
        if let Some(hint) = self.hint() {
            identifier.push(':');
            identifier.push_str(hint);
        }
        if plain {
            identifier
        } else {
            encode_identifier(&identifier)
        }
    }
}

impl FromStr for KeySsi {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::auto_load(s)
    }
}

impl Display for KeySsi {
    /// Writes the canonical (plain) identifier.
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.identifier(true))
    }
}

/// Serializes to the opaque identifier.
impl Serialize for KeySsi {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.identifier(false))
    }
}

/// Deserializes from either the opaque or the canonical identifier.
impl<'de> Deserialize<'de> for KeySsi {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct KeySsiVisitor;

        impl Visitor<'_> for KeySsiVisitor {
            type Value = KeySsi;

            fn expecting(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
                formatter.write_str("a KeySSI identifier string")
            }

            fn visit_str<E>(self, value: &str) -> Result<KeySsi, E>
            where
                E: de::Error,
            {
                KeySsi::auto_load(value).map_err(de::Error::custom)
            }
        }

        deserializer.deserialize_str(KeySsiVisitor)
    }
}

#[cfg(test)]
mod tests {
    use insta::assert_snapshot;

    use super::*;
    use crate::config::MAX_KEYSSI_LENGTH;

    #[test]
    fn canonical_form() {
        let keyssi = KeySsi::load("seed", Some("default"), Some("abc"), Some("def"), None, None)
            .expect("should load");
        assert_snapshot!(keyssi.identifier(true), @"ssi:seed:default:abc:def:v0");
        assert_eq!(keyssi.identifier(true), keyssi.no_hint_identifier(true));
    }

    #[test]
    fn hint_keeps_colons() {
        let keyssi = KeySsi::auto_load("ssi:seed:default:abc:def:v1:a:b:c").expect("should parse");
        assert_eq!(keyssi.version(), "v1");
        assert_eq!(keyssi.hint(), Some("a:b:c"));
        assert_snapshot!(keyssi.no_hint_identifier(true), @"ssi:seed:default:abc:def:v1");
        assert_eq!(keyssi.identifier(true), "ssi:seed:default:abc:def:v1:a:b:c");
    }

    #[test]
    fn empty_version_defaults() {
        let keyssi = KeySsi::auto_load("ssi:const:default:key::").expect("should parse");
        assert_eq!(keyssi.version(), "v0");
        assert_eq!(keyssi.control_string(), None);
        assert_eq!(keyssi.hint(), None);
    }

    #[test]
    fn opaque_form() {
        let keyssi =
            KeySsi::auto_load(r#"ssi:seed:default:abc:def:v0:{"x":1}"#).expect("should parse");
        let encoded = keyssi.identifier(false);
        assert!(!encoded.contains(':'));

        let decoded = KeySsi::auto_load(&encoded).expect("should parse encoded");
        assert_eq!(decoded, keyssi);
        assert_eq!(decoded.hint_value(), keyssi.hint_value());
    }

    #[test]
    fn template_round_trip() {
        let template = KeySsi::template("seed", Some("default")).expect("should create");
        assert_snapshot!(template.identifier(true), @"ssi:seed:default:::v0");
        let parsed = KeySsi::from_str(&template.identifier(false)).expect("should parse");
        assert!(parsed.is_template());
        assert_eq!(parsed, template);
    }

    #[test]
    fn decoded_without_colon() {
        let encoded = encode_identifier("no-structure-here");
        let Err(e) = KeySsi::auto_load(&encoded) else {
            panic!("expected error");
        };
        assert!(matches!(e, Error::InvalidFormat(_)));
        assert!(e.to_string().contains("does not decode"));
    }

    #[test]
    fn bad_prefix_and_count() {
        assert!(matches!(KeySsi::auto_load("did:seed:a:b:c:v0"), Err(Error::InvalidFormat(_))));
        assert!(matches!(KeySsi::auto_load("ssi:seed:a:b"), Err(Error::InvalidFormat(_))));
        assert!(matches!(KeySsi::auto_load("not base58 0OIl"), Err(Error::InvalidFormat(_))));
    }

    #[test]
    fn length_boundary() {
        let fixed = "ssi:seed:d:".len() + ":c:v0".len();
        let at_limit = "x".repeat(MAX_KEYSSI_LENGTH - fixed);
        let keyssi =
            KeySsi::auto_load(&format!("ssi:seed:d:{at_limit}:c:v0")).expect("should parse");
        assert_eq!(keyssi.identifier(true).len(), MAX_KEYSSI_LENGTH);

        let over = format!("ssi:seed:d:{at_limit}x:c:v0");
        assert!(matches!(KeySsi::auto_load(&over), Err(Error::LengthLimit(_))));
    }

    #[test]
    fn hint_counts_towards_length() {
        let mut keyssi = KeySsi::template("seed", Some("d")).expect("should create");
        let room = MAX_KEYSSI_LENGTH - keyssi.identifier(true).len() - 1;
        keyssi.set_hint(Some(&"h".repeat(room))).expect("should fit");
        let res = keyssi.set_hint(Some(&"h".repeat(room + 1)));
        assert!(matches!(res, Err(Error::LengthLimit(_))));
        assert_eq!(keyssi.hint().map(str::len), Some(room));
    }

    #[test]
    fn serde_uses_opaque_form() {
        let keyssi = KeySsi::load("seed", Some("default"), Some("abc"), Some("def"), None, None)
            .expect("should load");
        let json = serde_json::to_string(&keyssi).expect("should serialize");
        assert_eq!(json, format!("\"{}\"", keyssi.identifier(false)));

        let back: KeySsi = serde_json::from_str(&json).expect("should deserialize");
        assert_eq!(back, keyssi);
        let plain: KeySsi =
            serde_json::from_str("\"ssi:seed:default:abc:def:v0\"").expect("should deserialize");
        assert_eq!(plain, keyssi);
    }
}
