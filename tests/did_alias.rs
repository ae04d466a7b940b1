//! Tests for `did:alias` identifiers.

use std::collections::HashSet;

use keyssi::did::{DidUrl, Validator, DID_PREFIX};
use keyssi::{AliasDid, Error};

#[test]
fn url_round_trip() {
    let did: AliasDid = "did:alias:domainA:aliasB".parse().expect("should parse");
    assert_eq!(did.dl_domain(), "domainA");
    assert_eq!(did.alias(), "aliasB");
    assert_eq!(did.to_url(), "did:alias:domainA:aliasB");

    let generated = AliasDid::generate("domainA").expect("should generate");
    let parsed: AliasDid = generated.to_url().parse().expect("should parse");
    assert_eq!(parsed, generated);
}

#[test]
fn segment_validation() {
    for url in ["did:alias:onlyone", "did:alias:a:b:c", "did:alias:a:", "did:other:a:b", "alias:a:b"]
    {
        let res = url.parse::<AliasDid>();
        assert!(matches!(res, Err(Error::InvalidFormat(_))), "{url} should be rejected");
    }
}

#[test]
fn aliases_are_unique() {
    let aliases = (0..32)
        .map(|_| AliasDid::generate("default").expect("should generate").alias().to_string())
        .collect::<HashSet<_>>();
    assert_eq!(aliases.len(), 32);
}

#[test]
fn custom_validator() {
    let validator = Validator {
        prefix: DID_PREFIX,
        did_type: "ssi",
        segments: |segments| segments.len() == 1,
    };
    let url = DidUrl::parse("did:ssi:abc", &validator).expect("should parse");
    assert_eq!(url.to_string(), "did:ssi:abc");
    assert!(DidUrl::parse("did:ssi:a:b", &validator).is_err());
}
