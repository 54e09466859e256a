//! Hashing and Base58 primitives (component A).
//!
//! Thin wrappers around `sha2`, `ripemd`, and `bs58` so the rest of the
//! crate works with plain byte slices instead of each crate's own digest
//! traits.

use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

/// Single SHA-256 digest.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// SHA-256 applied twice, as used by Base58Check.
pub fn double_sha256(data: &[u8]) -> [u8; 32] {
    sha256(&sha256(data))
}

/// RIPEMD-160 digest.
pub fn ripemd160(data: &[u8]) -> [u8; 20] {
    let mut hasher = Ripemd160::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Encodes `payload` as plain Base58 (no checksum).
pub fn base58_encode(payload: &[u8]) -> String {
    bs58::encode(payload).into_string()
}

/// Decodes a plain Base58 string (no checksum) into bytes.
pub fn base58_decode(s: &str) -> Result<Vec<u8>, bs58::decode::Error> {
    bs58::decode(s).into_vec()
}
