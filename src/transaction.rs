//! Logical transaction/action types and their composite wire serialization.
//!
//! These sit one layer above the generic `serialize()` DSL: an action's
//! `data` field needs a network round-trip to fetch the target contract's
//! ABI before it can be packed, and a transaction's header/body layout is
//! fixed rather than ABI-driven, so both get dedicated packing functions
//! instead of being expressed as `serialize()` type strings.

use serde_json::{json, Value as Json};

use crate::abi::AbiProvider;
use crate::error::Result;
use crate::serializer::{self, SerializeArgs};
use crate::varint;

/// One `actor@permission` entry in an action's `authorization` array.
#[derive(Debug, Clone)]
pub struct PermissionLevel {
    pub actor: String,
    pub permission: String,
}

/// A single contract action: `account::name(data)` under an authorization list.
#[derive(Debug, Clone)]
pub struct Action {
    pub account: String,
    pub name: String,
    pub authorization: Vec<PermissionLevel>,
    pub data: Json,
}

impl Action {
    /// Packs this action: `account:name || name:name || authorization:struct[] || data:bytes`.
    ///
    /// `data` is serialized against the struct named `self.name` in
    /// `self.account`'s ABI, then wrapped as a length-prefixed `bytes` blob.
    pub fn pack(&self, abi_provider: &dyn AbiProvider) -> Result<Vec<u8>> {
        let abi = abi_provider.abi_for(&self.account)?;
        if abi.find_struct(&self.name).is_none() {
            return Err(crate::error::Error::UnknownAction {
                account: self.account.clone(),
                action: self.name.clone(),
                known: abi.struct_names(),
            });
        }

        let mut out = Vec::new();
        out.extend(crate::name::encode(&self.account)?.to_le_bytes());
        out.extend(crate::name::encode(&self.name)?.to_le_bytes());

        let auth_json: Json = json!(self
            .authorization
            .iter()
            .map(|p| json!({"actor": p.actor, "permission": p.permission}))
            .collect::<Vec<_>>());
        out.extend(serializer::serialize(
            &auth_json,
            "permission_level[]",
            SerializeArgs::default(),
            &permission_level_abi(),
        )?);

        out.extend(serializer::serialize(
            &self.data,
            &self.name,
            SerializeArgs { as_bytes: true },
            &abi,
        )?);

        Ok(out)
    }
}

/// A synthetic single-struct ABI describing `permission_level`, so the
/// generic struct serializer can be reused for an action's `authorization`
/// array without a real network-fetched ABI.
fn permission_level_abi() -> crate::abi::Abi {
    crate::abi::Abi {
        account_name: "__permission_level".to_string(),
        abi: crate::abi::AbiDefinition {
            structs: vec![crate::abi::AbiStruct {
                name: "permission_level".to_string(),
                base: String::new(),
                fields: vec![
                    crate::abi::AbiField { name: "actor".to_string(), type_name: "name".to_string() },
                    crate::abi::AbiField { name: "permission".to_string(), type_name: "name".to_string() },
                ],
            }],
        },
    }
}

/// The six fixed header fields shared by every Antelope transaction.
#[derive(Debug, Clone)]
pub struct TransactionHeader {
    /// ISO-8601 expiration timestamp.
    pub expiration: String,
    pub ref_block_num: u16,
    pub ref_block_prefix: u32,
    pub max_net_usage_words: u32,
    pub max_cpu_usage_ms: u8,
    pub delay_sec: u32,
}

/// A full transaction: header plus one or more actions.
///
/// `context_free_actions` and `transaction_extensions` are always emitted
/// empty; this crate never constructs either.
#[derive(Debug, Clone)]
pub struct Transaction {
    pub header: TransactionHeader,
    pub actions: Vec<Action>,
}

impl Transaction {
    /// Packs the full transaction body as the node expects it on the wire:
    /// header fields, then `context_free_actions` (always empty),
    /// `actions`, then `transaction_extensions` (always empty).
    pub fn pack(&self, abi_provider: &dyn AbiProvider) -> Result<Vec<u8>> {
        let mut out = Vec::new();

        out.extend(serializer::serialize(
            &json!(self.header.expiration),
            "time_point_sec",
            SerializeArgs::default(),
            &empty_abi(),
        )?);
        out.extend(self.header.ref_block_num.to_le_bytes());
        out.extend(self.header.ref_block_prefix.to_le_bytes());
        out.extend(varint::encode(self.header.max_net_usage_words));
        out.push(self.header.max_cpu_usage_ms);
        out.extend(varint::encode(self.header.delay_sec));

        // context_free_actions: always empty.
        out.extend(varint::encode(0));

        out.extend(varint::encode(self.actions.len() as u32));
        for action in &self.actions {
            out.extend(action.pack(abi_provider)?);
        }

        // transaction_extensions: always empty.
        out.extend(varint::encode(0));

        Ok(out)
    }
}

fn empty_abi() -> crate::abi::Abi {
    crate::abi::Abi {
        account_name: String::new(),
        abi: crate::abi::AbiDefinition::default(),
    }
}
