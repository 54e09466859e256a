//! End-to-end `push_transaction` against a mocked chain node.

use httpmock::MockServer;
use serde_json::json;

use antelope::{Authorization, Client};

const TEST_WIF: &str = "5HpHagT65TZzG1PH3CSu63k8DbpvD8s5ip4nEB3kEsreAbuatmU";

fn transfer_abi() -> serde_json::Value {
    json!({
        "account_name": "eosio.token",
        "abi": {
            "structs": [{
                "name": "transfer",
                "base": "",
                "fields": [
                    {"name": "from", "type": "name"},
                    {"name": "to", "type": "name"},
                    {"name": "quantity", "type": "string"},
                    {"name": "memo", "type": "string"}
                ]
            }]
        }
    })
}

fn is_single_sig_k1_signature(body: &serde_json::Value) -> bool {
    body.get("signatures")
        .and_then(|s| s.as_array())
        .map(|sigs| sigs.len() == 1 && sigs[0].as_str().is_some_and(|s| s.starts_with("SIG_K1_")))
        .unwrap_or(false)
}

fn has_even_length_hex_packed_trx(body: &serde_json::Value) -> bool {
    body.get("packed_trx")
        .and_then(|v| v.as_str())
        .map(|s| !s.is_empty() && hex::decode(s).is_ok())
        .unwrap_or(false)
}

#[test]
fn pushes_signed_transaction_with_canonical_signature() {
    let server = MockServer::start();

    let get_info = server.mock(|when, then| {
        when.method("POST").path("/v1/chain/get_info");
        then.status(200).json_body(json!({
            "chain_id": "0".repeat(64),
            "last_irreversible_block_num": 99,
            "last_irreversible_block_id": "0000006300112233445566778899aabbccddeeff0011223344556677889900",
            "last_irreversible_block_time": "2023-01-01T00:00:00.000",
        }));
    });

    let get_abi = server.mock(|when, then| {
        when.method("POST").path("/v1/chain/get_abi");
        then.status(200).json_body(transfer_abi());
    });

    let push_transaction = server.mock(|when, then| {
        when.method("POST")
            .path("/v1/chain/push_transaction")
            .matches(|req| {
                req.body
                    .as_ref()
                    .and_then(|b| serde_json::from_slice::<serde_json::Value>(b).ok())
                    .map(|body| is_single_sig_k1_signature(&body) && has_even_length_hex_packed_trx(&body))
                    .unwrap_or(false)
            });
        then.status(200).json_body(json!({ "transaction_id": "deadbeef" }));
    });

    let client = Client::new(server.base_url()).unwrap();
    client.add_key("alice@active", TEST_WIF).unwrap();

    let result = client
        .push_transaction(
            "eosio.token",
            "transfer",
            json!({"from": "alice", "to": "bob", "quantity": "1.0000 EOS", "memo": "hi"}),
            vec![Authorization { actor: "alice".to_string(), permission: "active".to_string() }],
            Some(30),
        )
        .unwrap();

    get_info.assert();
    get_abi.assert();
    push_transaction.assert();
    assert_eq!(result.transaction_id, "deadbeef");
}

#[test]
fn rejects_unknown_action_before_any_signing() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method("POST").path("/v1/chain/get_info");
        then.status(200).json_body(json!({
            "chain_id": "0".repeat(64),
            "last_irreversible_block_num": 1,
            "last_irreversible_block_id": "0".repeat(64),
            "last_irreversible_block_time": "2023-01-01T00:00:00.000",
        }));
    });
    server.mock(|when, then| {
        when.method("POST").path("/v1/chain/get_abi");
        then.status(200).json_body(transfer_abi());
    });

    let client = Client::new(server.base_url()).unwrap();
    client.add_key("alice@active", TEST_WIF).unwrap();

    let err = client
        .push_transaction(
            "eosio.token",
            "nosuchaction",
            json!({}),
            vec![Authorization { actor: "alice".to_string(), permission: "active".to_string() }],
            None,
        )
        .unwrap_err();

    match err {
        antelope::Error::UnknownAction { known, .. } => assert_eq!(known, vec!["transfer".to_string()]),
        other => panic!("expected UnknownAction, got {other:?}"),
    }
}
