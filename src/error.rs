//! Error type for the crate.
//!
//! One small, descriptive enum covers every failure mode described by the
//! component designs; nothing is ever swallowed or remapped locally.

use thiserror::Error;

/// All errors that can be returned by this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// WIF string did not decode to 37 bytes.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// WIF version byte was not `0x80`.
    #[error("invalid key version: expected 0x80, got {0:#04x}")]
    InvalidKeyVersion(u8),

    /// WIF checksum did not match the double-SHA-256 of version||secret.
    #[error("invalid checksum")]
    InvalidChecksum,

    /// `authorization` did not match `^\w+@\w+$`.
    #[error("malformed authorization: {0}")]
    MalformedAuthorization(String),

    /// `authorization` has no entry in the keychain.
    #[error("unknown authorization: {0}")]
    UnknownAuthorization(String),

    /// Action name was not found among the contract's ABI structs.
    #[error("unknown action {action:?} for {account}; known actions: {known:?}")]
    UnknownAction {
        account: String,
        action: String,
        known: Vec<String>,
    },

    /// A struct field declared by the ABI was absent from the value being serialized.
    #[error("missing field {field:?} in struct {struct_name:?}")]
    MissingField { struct_name: String, field: String },

    /// An integer value did not fit in the declared wire width.
    #[error("value {value} out of range for type {type_name}")]
    OutOfRange { type_name: String, value: i128 },

    /// `type` string did not match any known serializer/unserializer rule.
    #[error("unsupported type: {0}")]
    UnsupportedType(String),

    /// The canonical-signature retry loop exhausted its attempt budget.
    #[error("signing failed after {0} attempts without producing a canonical signature")]
    SigningFailed(u32),

    /// The node returned a JSON body containing an `error` field.
    #[error("rpc error: {0}")]
    RpcError(serde_json::Value),

    /// The underlying HTTP request failed.
    #[error("transport error: {0}")]
    TransportError(#[from] reqwest::Error),

    /// A value could not be decoded from / encoded to hex.
    #[error("hex error: {0}")]
    HexError(#[from] hex::FromHexError),

    /// A value could not be parsed as JSON.
    #[error("json error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// A timestamp string did not parse as ISO-8601.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
