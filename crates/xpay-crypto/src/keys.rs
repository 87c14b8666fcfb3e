use ed25519_dalek::{SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use std::fmt;
use zeroize::Zeroizing;

use crate::error::CryptoError;

/// Prefix byte the ledger puts in front of 32-byte Ed25519 public keys.
pub const ED25519_PREFIX: u8 = 0xED;

/// Length of an encoded public key under either scheme.
pub const PUBLIC_KEY_LEN: usize = 33;

/// The ledger's two signing schemes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyScheme {
    Ed25519,
    Secp256k1,
}

impl KeyScheme {
    /// Select the scheme from an encoded public key's first byte.
    pub fn from_prefix(prefix: u8) -> Result<Self, CryptoError> {
        match prefix {
            ED25519_PREFIX => Ok(Self::Ed25519),
            0x02 | 0x03 => Ok(Self::Secp256k1),
            other => Err(CryptoError::UnknownKeyType(other)),
        }
    }
}

impl fmt::Display for KeyScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ed25519 => write!(f, "ed25519"),
            Self::Secp256k1 => write!(f, "secp256k1"),
        }
    }
}

/// A channel key pair under either scheme.
pub enum KeyPair {
    Ed25519(SigningKey),
    Secp256k1(secp256k1::SecretKey),
}

impl KeyPair {
    /// Generate a new random key pair using OS-provided entropy.
    pub fn generate(scheme: KeyScheme) -> Self {
        match scheme {
            KeyScheme::Ed25519 => Self::Ed25519(SigningKey::generate(&mut OsRng)),
            KeyScheme::Secp256k1 => Self::Secp256k1(secp256k1::SecretKey::new(&mut OsRng)),
        }
    }

    /// Create a key pair from a 32-byte secret.
    pub fn from_seed(scheme: KeyScheme, seed: &[u8; 32]) -> Result<Self, CryptoError> {
        match scheme {
            KeyScheme::Ed25519 => Ok(Self::Ed25519(SigningKey::from_bytes(seed))),
            KeyScheme::Secp256k1 => secp256k1::SecretKey::from_slice(seed)
                .map(Self::Secp256k1)
                .map_err(|e| CryptoError::InvalidSecretKey(e.to_string())),
        }
    }

    /// Create a key pair from a hex-encoded 32-byte secret.
    pub fn from_hex(scheme: KeyScheme, secret_hex: &str) -> Result<Self, CryptoError> {
        let bytes = Zeroizing::new(
            hex::decode(secret_hex.trim())
                .map_err(|e| CryptoError::InvalidInput(format!("invalid hex: {}", e)))?,
        );
        if bytes.len() != 32 {
            return Err(CryptoError::InvalidKeyLength {
                expected: 32,
                actual: bytes.len(),
            });
        }
        let mut seed = Zeroizing::new([0u8; 32]);
        seed.copy_from_slice(&bytes);
        Self::from_seed(scheme, &seed)
    }

    pub fn scheme(&self) -> KeyScheme {
        match self {
            Self::Ed25519(_) => KeyScheme::Ed25519,
            Self::Secp256k1(_) => KeyScheme::Secp256k1,
        }
    }

    /// Get the public key.
    pub fn public_key(&self) -> PublicKey {
        match self {
            Self::Ed25519(sk) => PublicKey::Ed25519(sk.verifying_key()),
            Self::Secp256k1(sk) => {
                let secp = secp256k1::Secp256k1::signing_only();
                PublicKey::Secp256k1(secp256k1::PublicKey::from_secret_key(&secp, sk))
            }
        }
    }

    /// Raw secret bytes, zeroized when dropped.
    pub fn secret_bytes(&self) -> Zeroizing<[u8; 32]> {
        match self {
            Self::Ed25519(sk) => Zeroizing::new(sk.to_bytes()),
            Self::Secp256k1(sk) => Zeroizing::new(sk.secret_bytes()),
        }
    }
}

/// A channel public key in the ledger's 33-byte encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublicKey {
    Ed25519(VerifyingKey),
    Secp256k1(secp256k1::PublicKey),
}

impl PublicKey {
    /// Decode a 33-byte ledger public key, dispatching on the prefix byte.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != PUBLIC_KEY_LEN {
            return Err(CryptoError::InvalidKeyLength {
                expected: PUBLIC_KEY_LEN,
                actual: bytes.len(),
            });
        }
        match KeyScheme::from_prefix(bytes[0])? {
            KeyScheme::Ed25519 => {
                let mut raw = [0u8; 32];
                raw.copy_from_slice(&bytes[1..]);
                VerifyingKey::from_bytes(&raw)
                    .map(Self::Ed25519)
                    .map_err(|e| CryptoError::InvalidPublicKey(e.to_string()))
            }
            KeyScheme::Secp256k1 => secp256k1::PublicKey::from_slice(bytes)
                .map(Self::Secp256k1)
                .map_err(|e| CryptoError::InvalidPublicKey(e.to_string())),
        }
    }

    /// Decode from hex, either case.
    pub fn from_hex(hex_str: &str) -> Result<Self, CryptoError> {
        let bytes = hex::decode(hex_str.trim())
            .map_err(|e| CryptoError::InvalidInput(format!("invalid hex: {}", e)))?;
        Self::from_bytes(&bytes)
    }

    pub fn scheme(&self) -> KeyScheme {
        match self {
            Self::Ed25519(_) => KeyScheme::Ed25519,
            Self::Secp256k1(_) => KeyScheme::Secp256k1,
        }
    }

    /// The 33-byte ledger encoding.
    pub fn to_bytes(&self) -> [u8; PUBLIC_KEY_LEN] {
        match self {
            Self::Ed25519(vk) => {
                let mut out = [0u8; PUBLIC_KEY_LEN];
                out[0] = ED25519_PREFIX;
                out[1..].copy_from_slice(vk.as_bytes());
                out
            }
            Self::Secp256k1(pk) => pk.serialize(),
        }
    }

    /// Upper-case hex, the form the ledger prints.
    pub fn to_hex(&self) -> String {
        hex::encode_upper(self.to_bytes())
    }
}
