//! Key material handling (component B): WIF decoding, public-key
//! derivation, and the in-memory `authorization -> private key` map.

use std::collections::HashMap;
use std::sync::RwLock;

use once_cell::sync::Lazy;
use regex::Regex;
use secp256k1::{PublicKey as Secp256k1PublicKey, Secp256k1, SecretKey};

use crate::error::{Error, Result};
use crate::hashing::{base58_decode, base58_encode, double_sha256, ripemd160};

const WIF_VERSION: u8 = 0x80;

static AUTH_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\w+@\w+$").unwrap());

/// A 32-byte secp256k1 private key, recovered from a valid WIF string.
///
/// The raw secret bytes are never exposed outside the keychain; the only
/// operations are signing (via [`crate::signer`]) and public-key derivation.
#[derive(Clone)]
pub struct PrivateKey {
    secret: [u8; 32],
}

impl PrivateKey {
    /// Decodes `wif` (Wallet Import Format) into a private key.
    ///
    /// Validates length, version byte, and the double-SHA-256 checksum,
    /// per the legacy (non-multi-curve) WIF format used by Antelope chains.
    pub fn from_wif(wif: &str) -> Result<Self> {
        let raw = base58_decode(wif).map_err(|e| Error::InvalidKey(e.to_string()))?;
        if raw.len() != 37 {
            return Err(Error::InvalidKey(format!(
                "expected 37 decoded bytes, got {}",
                raw.len()
            )));
        }

        let version = raw[0];
        let secret = &raw[1..33];
        let checksum = &raw[33..37];

        if version != WIF_VERSION {
            return Err(Error::InvalidKeyVersion(version));
        }

        let expected_checksum = &double_sha256(&raw[0..33])[0..4];
        if expected_checksum != checksum {
            return Err(Error::InvalidChecksum);
        }

        let mut secret_bytes = [0u8; 32];
        secret_bytes.copy_from_slice(secret);
        Ok(Self {
            secret: secret_bytes,
        })
    }

    /// Raw 32-byte secret, for handing to the signer.
    pub fn secret_bytes(&self) -> &[u8; 32] {
        &self.secret
    }

    /// Derives the corresponding compressed public key.
    pub fn public_key(&self) -> Result<PublicKey> {
        let secp = Secp256k1::new();
        let secret_key = SecretKey::from_slice(&self.secret)
            .map_err(|e| Error::InvalidKey(e.to_string()))?;
        let public_key = Secp256k1PublicKey::from_secret_key(&secp, &secret_key);
        Ok(PublicKey {
            compressed: public_key.serialize(),
        })
    }
}

/// A 33-byte compressed secp256k1 public key.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PublicKey {
    compressed: [u8; 33],
}

impl PublicKey {
    /// Raw 33-byte compressed point.
    pub fn as_bytes(&self) -> &[u8; 33] {
        &self.compressed
    }

    /// Textual `EOS...` address: `"EOS" || Base58(point || RIPEMD160(point)[0..4])`.
    pub fn to_eos_string(&self) -> String {
        let checksum = ripemd160(&self.compressed);
        let mut payload = self.compressed.to_vec();
        payload.extend_from_slice(&checksum[0..4]);
        format!("EOS{}", base58_encode(&payload))
    }
}

impl std::fmt::Display for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_eos_string())
    }
}

/// Maps `actor@permission` authorizations to their private keys.
///
/// Guarded by an `RwLock` so `add_key` and lookups never observe a torn
/// update under concurrent callers (spec.md §5 permits but does not
/// require concurrent use).
#[derive(Default)]
pub struct Keychain {
    keys: RwLock<HashMap<String, PrivateKey>>,
}

impl Keychain {
    /// Creates an empty keychain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes `wif`, validates `authorization`, and inserts the mapping.
    /// Overwrites any existing entry for the same authorization.
    pub fn add_key(&self, authorization: &str, wif: &str) -> Result<()> {
        if !AUTH_RE.is_match(authorization) {
            return Err(Error::MalformedAuthorization(authorization.to_string()));
        }
        let key = PrivateKey::from_wif(wif)?;
        self.keys
            .write()
            .expect("keychain lock poisoned")
            .insert(authorization.to_string(), key);
        Ok(())
    }

    /// Looks up the private key for `authorization`.
    pub fn private_key(&self, authorization: &str) -> Result<PrivateKey> {
        self.keys
            .read()
            .expect("keychain lock poisoned")
            .get(authorization)
            .cloned()
            .ok_or_else(|| Error::UnknownAuthorization(authorization.to_string()))
    }

    /// Derives the public key / EOS address for a stored authorization.
    pub fn public_key(&self, authorization: &str) -> Result<PublicKey> {
        self.private_key(authorization)?.public_key()
    }
}
