//! Integration test: claim verification across the signing and settlement
//! crates, for both key schemes.

use xpay_core::{ClaimSubmission, ErrorKind};
use xpay_crypto::KeyScheme;
use xpay_integration_tests::{channel_hex, simulated_engine, Payer};

fn reason(sub: &ClaimSubmission) -> Option<ErrorKind> {
    let (engine, _) = simulated_engine();
    engine.verify(sub).reason
}

#[test]
fn test_valid_claims_both_schemes() {
    let (engine, _) = simulated_engine();
    for (seed, scheme) in [(1, KeyScheme::Ed25519), (2, KeyScheme::Secp256k1)] {
        let payer = Payer::new(scheme, seed, &channel_hex(0x5D));
        let result = engine.verify(&payer.claim(1_000_000));
        assert!(result.valid, "{} claim should verify", scheme);
        assert_eq!(result.reason, None);
    }
}

#[test]
fn test_lowercase_hex_is_accepted() {
    let payer = Payer::new(KeyScheme::Secp256k1, 3, &channel_hex(0xAB));
    let mut sub = payer.claim(42);
    sub.channel_id = sub.channel_id.to_lowercase();
    sub.signature = sub.signature.to_lowercase();
    sub.public_key = sub.public_key.to_lowercase();
    assert_eq!(reason(&sub), None);
}

#[test]
fn test_malformed_claims_report_exact_reason() {
    let payer = Payer::new(KeyScheme::Ed25519, 4, &channel_hex(0x11));
    let good = payer.claim(500);

    let cases: Vec<(ClaimSubmission, ErrorKind)> = vec![
        (ClaimSubmission { channel_id: "ABCD".into(), ..good.clone() }, ErrorKind::BadChannel),
        (ClaimSubmission { channel_id: "G".repeat(64), ..good.clone() }, ErrorKind::BadChannel),
        (ClaimSubmission { amount: "12a".into(), ..good.clone() }, ErrorKind::BadAmount),
        (ClaimSubmission { amount: "-5".into(), ..good.clone() }, ErrorKind::BadAmount),
        (ClaimSubmission { amount: "1.5".into(), ..good.clone() }, ErrorKind::BadAmount),
        (ClaimSubmission { signature: "XYZ".into(), ..good.clone() }, ErrorKind::BadSignatureHex),
        (ClaimSubmission { signature: "ABC".into(), ..good.clone() }, ErrorKind::VerifyException),
        (ClaimSubmission { public_key: "not-hex".into(), ..good.clone() }, ErrorKind::BadPubkeyHex),
        (ClaimSubmission { public_key: "ED1".into(), ..good.clone() }, ErrorKind::VerifyException),
        (
            ClaimSubmission { amount: "18446744073709551616".into(), ..good.clone() },
            ErrorKind::EncodeError,
        ),
        (ClaimSubmission { public_key: "05".repeat(33), ..good.clone() }, ErrorKind::VerifyException),
        (ClaimSubmission { amount: "501".into(), ..good.clone() }, ErrorKind::BadSignature),
    ];

    for (sub, expected) in cases {
        assert_eq!(reason(&sub), Some(expected), "claim {:?}", sub);
    }
}

#[test]
fn test_first_failing_check_wins() {
    let sub = ClaimSubmission {
        channel_id: "short".into(),
        amount: "abc".into(),
        signature: "zz".into(),
        public_key: "zz".into(),
        device_id: None,
    };
    assert_eq!(reason(&sub), Some(ErrorKind::BadChannel));

    let sub = ClaimSubmission {
        channel_id: channel_hex(0x01),
        ..sub
    };
    assert_eq!(reason(&sub), Some(ErrorKind::BadAmount));
}

#[test]
fn test_resigned_with_other_key_is_bad_signature() {
    let channel = channel_hex(0x77);
    let owner = Payer::new(KeyScheme::Ed25519, 5, &channel);
    let intruder = Payer::new(KeyScheme::Ed25519, 6, &channel);

    let sub = ClaimSubmission {
        signature: intruder.signature(1_000),
        ..owner.claim(1_000)
    };
    assert_eq!(reason(&sub), Some(ErrorKind::BadSignature));

    // Cross-scheme: secp256k1 signature against an Ed25519 key.
    let secp = Payer::new(KeyScheme::Secp256k1, 5, &channel);
    let sub = ClaimSubmission {
        signature: secp.signature(1_000),
        ..owner.claim(1_000)
    };
    assert_eq!(reason(&sub), Some(ErrorKind::BadSignature));
}

#[test]
fn test_signature_is_bound_to_channel() {
    let a = Payer::new(KeyScheme::Secp256k1, 7, &channel_hex(0xA0));
    let sub = ClaimSubmission {
        channel_id: channel_hex(0xB0),
        ..a.claim(9_999)
    };
    assert_eq!(reason(&sub), Some(ErrorKind::BadSignature));
}

#[test]
fn test_garbage_never_panics() {
    let (engine, _) = simulated_engine();
    let junk = ["", " ", "00", "ED", "FF".repeat(33).as_str(), "0".repeat(200).as_str(), "\u{1F600}"]
        .map(String::from);
    for channel in &junk {
        for amount in ["", "0", "1", "99999999999999999999999"] {
            for blob in &junk {
                let sub = ClaimSubmission {
                    channel_id: channel.clone(),
                    amount: amount.to_string(),
                    signature: blob.clone(),
                    public_key: blob.clone(),
                    device_id: None,
                };
                let result = engine.verify(&sub);
                assert!(!result.valid);
                assert!(result.reason.is_some());
            }
        }
    }
}
