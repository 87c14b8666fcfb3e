use ed25519_dalek::{Signer, Verifier};

use crate::codec::encode_claim;
use crate::error::CryptoError;
use crate::hashing::sha512_half;
use crate::keys::{KeyPair, PublicKey};
use xpay_core::{ChannelId, Drops};

/// Sign a message under the key pair's scheme.
///
/// Ed25519 signs the raw message; secp256k1 signs its SHA-512Half and
/// returns a DER-encoded, low-S ECDSA signature.
pub fn sign(message: &[u8], keypair: &KeyPair) -> Vec<u8> {
    match keypair {
        KeyPair::Ed25519(sk) => sk.sign(message).to_bytes().to_vec(),
        KeyPair::Secp256k1(sk) => {
            let secp = secp256k1::Secp256k1::signing_only();
            let digest = secp256k1::Message::from_digest(sha512_half(message));
            secp.sign_ecdsa(&digest, sk).serialize_der().to_vec()
        }
    }
}

/// Verify a signature over `message`.
///
/// Returns `Ok(false)` when the signature is well-formed but does not match,
/// and an error when the signature cannot be interpreted at all.
pub fn verify(message: &[u8], signature: &[u8], pubkey: &PublicKey) -> Result<bool, CryptoError> {
    match pubkey {
        PublicKey::Ed25519(vk) => {
            let sig = ed25519_dalek::Signature::from_slice(signature)
                .map_err(|e| CryptoError::MalformedSignature(e.to_string()))?;
            Ok(vk.verify(message, &sig).is_ok())
        }
        PublicKey::Secp256k1(pk) => {
            let mut sig = secp256k1::ecdsa::Signature::from_der(signature)
                .map_err(|e| CryptoError::MalformedSignature(e.to_string()))?;
            sig.normalize_s();
            let secp = secp256k1::Secp256k1::verification_only();
            let digest = secp256k1::Message::from_digest(sha512_half(message));
            Ok(secp.verify_ecdsa(&digest, &sig, pk).is_ok())
        }
    }
}

/// Sign a channel claim, returning the upper-case hex signature.
pub fn sign_claim(channel_id: &ChannelId, amount: Drops, keypair: &KeyPair) -> String {
    hex::encode_upper(sign(&encode_claim(channel_id, amount), keypair))
}

/// Verify hex-encoded claim fields against an already validated channel and amount.
pub fn verify_claim(
    channel_id: &ChannelId,
    amount: Drops,
    signature_hex: &str,
    pubkey_hex: &str,
) -> Result<bool, CryptoError> {
    let pubkey = PublicKey::from_hex(pubkey_hex)?;
    let signature = hex::decode(signature_hex.trim())
        .map_err(|e| CryptoError::MalformedSignature(format!("invalid hex: {}", e)))?;
    tracing::trace!(channel_id = %channel_id, amount, scheme = %pubkey.scheme(), "verifying claim signature");
    verify(&encode_claim(channel_id, amount), &signature, &pubkey)
}
