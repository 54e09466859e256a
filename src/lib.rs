//! Construct, sign, and submit transactions to an Antelope (EOSIO-family)
//! chain over HTTP JSON-RPC.
//!
//! The crate is organized as five small components that compose from the
//! bottom up: [`hashing`]/base58 primitives, key handling ([`keys`]), the
//! ABI-driven binary [`serializer`] (with [`transaction`] sitting on top
//! for action/transaction packing and [`unserializer`] for table-row
//! decoding), canonical signing ([`signer`]), and the [`client`] that
//! drives an HTTP node through the whole flow.

pub mod abi;
pub mod client;
pub mod error;
pub mod hashing;
pub mod keys;
pub mod name;
pub mod serializer;
pub mod signer;
pub mod transaction;
pub mod unserializer;
pub mod varint;

pub use abi::{Abi, AbiProvider};
pub use client::{Authorization, ChainInfo, Client, PushTransactionResult};
pub use error::{Error, Result};
pub use keys::{Keychain, PrivateKey, PublicKey};
pub use transaction::{Action, PermissionLevel, Transaction, TransactionHeader};
