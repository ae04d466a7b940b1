//! Tests for the public KeySSI surface: parsing, serialization, derivation
//! and signing through a provider.

use std::collections::HashMap;

use insta::assert_snapshot;
use keyssi::config::MAX_KEYSSI_LENGTH;
use keyssi::{CryptoProvider, Error, KeySsi, TypeAuthority};
use test_utils::{Keyring, TestProvider};

#[test]
fn round_trip() {
    for identifier in [
        "ssi:seed:default:abc:def:v0",
        "ssi:const:$DOMAIN:key::v1",
        "ssi:sza:default::ctrl:v0:hint",
        r#"ssi:hl:default:hash::v0:{"bricksDomain":"b","k":"a:b"}"#,
        "ssi:custom:d:s:c:v9:x:y:z",
    ] {
        let keyssi = KeySsi::auto_load(identifier).expect("should parse");
        assert_eq!(keyssi.identifier(true), identifier);

        let opaque = keyssi.identifier(false);
        assert_eq!(KeySsi::auto_load(&opaque).expect("should parse opaque"), keyssi);
        assert_eq!(keyssi.to_string(), identifier);
    }
}

#[test]
fn canonical_text() {
    let keyssi = KeySsi::load("seed", Some("default"), Some("abc"), None, Some(""), Some("h"))
        .expect("should load");
    assert_snapshot!(keyssi.identifier(true), @"ssi:seed:default:abc::v0:h");
    assert_snapshot!(keyssi.no_hint_identifier(true), @"ssi:seed:default:abc::v0");
}

#[test]
fn length_limit() {
    let domain = "d".repeat(MAX_KEYSSI_LENGTH);
    let res = KeySsi::template("seed", Some(&domain));
    assert!(matches!(res, Err(Error::LengthLimit(_))));
}

#[test]
fn environment_domain() {
    let keyssi = KeySsi::auto_load("ssi:seed:$BRICKS:abc:def:v0").expect("should parse");
    let env = HashMap::from([("BRICKS".to_string(), "resolved".to_string())]);
    assert_eq!(keyssi.dl_domain(&env).as_deref(), Some("resolved"));
    assert_eq!(keyssi.dl_domain(&HashMap::<String, String>::new()), None);

    // the stored form keeps the indirection
    assert_eq!(keyssi.identifier(true), "ssi:seed:$BRICKS:abc:def:v0");
}

#[tokio::test]
async fn sign_and_verify() {
    let provider = TestProvider::new(Keyring::new());
    let keyssi = KeySsi::auto_load("ssi:seed:default:abc:def:v0").expect("should parse");

    let signature = keyssi.sign(b"data", &provider).await.expect("should sign");
    let public_key = provider.enclave.public_key();
    let registry = provider.registry();
    assert!(keyssi.verify(b"data", &public_key, &signature, registry).expect("should verify"));
    assert!(!keyssi.verify(b"other", &public_key, &signature, registry).expect("should verify"));

    let res = keyssi.verify(b"data", &public_key, "not base64!", registry);
    assert!(matches!(res, Err(Error::Verification(_))));
}

#[tokio::test]
async fn unknown_type_cannot_sign() {
    let provider = TestProvider::new(Keyring::new());
    let keyssi = KeySsi::auto_load("ssi:custom:default:abc:def:v0").expect("should parse");
    let res = keyssi.sign(b"data", &provider).await;
    assert!(matches!(res, Err(Error::UnknownType(_))));
}

#[tokio::test]
async fn derivation_through_provider() {
    let provider = TestProvider::new(Keyring::new());
    let keyssi = KeySsi::auto_load("ssi:pass:default:secret::v0").expect("should parse");

    assert_eq!(keyssi.root_type_name(&provider).expect("should get root"), "const");
    let cza = keyssi.derived_type("cza", &provider).await.expect("should derive");
    assert_eq!(cza.specific_string(), None);
    assert!(cza.control_string().is_some());
    let anchor_id = keyssi.anchor_id(true, &provider).expect("should get anchor id");
    assert_eq!(anchor_id, cza.identifier(true));
    assert_eq!(keyssi.dsu_representation_name(&provider).as_deref(), Some("RawDossier"));

    let template = provider.create_type("seed").expect("should create");
    assert!(template.is_template());
}

#[tokio::test]
async fn sign_with_referenced_key() {
    let provider = TestProvider::new(Keyring::new());
    let keyssi = KeySsi::auto_load("ssi:seed:default:abc:def:v0").expect("should parse");
    let registry = provider.registry();

    let rotated = provider.enclave.add_key("rotated");
    let signature =
        keyssi.sign_with_key(b"data", Some("rotated"), &provider).await.expect("should sign");
    assert!(keyssi.verify(b"data", &rotated, &signature, registry).expect("should verify"));

    let default_key = provider.enclave.public_key();
    assert!(!keyssi.verify(b"data", &default_key, &signature, registry).expect("should verify"));

    let res = keyssi.sign_with_key(b"data", Some("missing"), &provider).await;
    let Err(Error::Signing(msg)) = res else {
        panic!("expected signing error");
    };
    assert!(msg.contains("key not found"));
}
