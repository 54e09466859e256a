//! Thin CLI wrapper over the `antelope` library's public API.

use clap::{Parser, Subcommand};
use serde_json::Value as Json;

use antelope::{Authorization, Client};

#[derive(Parser)]
#[command(name = "antelope-cli", about = "Construct, sign, and submit Antelope transactions")]
struct Cli {
    /// Chain HTTP endpoint, e.g. https://jungle4.greymass.com.
    #[arg(long, env = "ANTELOPE_ENDPOINT")]
    endpoint: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Register a signing key for `actor@permission`.
    AddKey {
        authorization: String,
        wif: String,
    },
    /// Fetch and print `get_info`.
    GetInfo,
    /// Fetch and print a contract's ABI.
    GetAbi { account: String },
    /// Fetch table rows.
    GetTableRows {
        account: String,
        table: String,
        scope: String,
        #[arg(long, default_value = "{}")]
        extra: String,
    },
    /// Sign and push a single-action transaction.
    PushTransaction {
        account: String,
        action: String,
        /// JSON object matching the action's ABI struct.
        data: String,
        /// `actor@permission`, repeatable.
        #[arg(long = "auth", required = true)]
        authorizations: Vec<String>,
        /// Signing key for each authorization, same order, `--key` repeatable.
        #[arg(long = "key", required = true)]
        keys: Vec<String>,
        #[arg(long)]
        expiration_secs: Option<i64>,
    },
}

fn main() -> antelope::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let client = Client::new(cli.endpoint)?;

    match cli.command {
        Command::AddKey { authorization, wif } => {
            client.add_key(&authorization, &wif)?;
            println!("added key for {authorization}");
        }
        Command::GetInfo => {
            let info = client.get_info()?;
            println!("{}", serde_json::to_string_pretty(&info)?);
        }
        Command::GetAbi { account } => {
            let abi = client.get_abi(&account)?;
            println!("structs: {:?}", abi.struct_names());
        }
        Command::GetTableRows { account, table, scope, extra } => {
            let extra: Json = serde_json::from_str(&extra)?;
            let rows = client.get_table_rows(&account, &table, &scope, extra)?;
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        Command::PushTransaction { account, action, data, authorizations, keys, expiration_secs } => {
            for (auth, key) in authorizations.iter().zip(keys.iter()) {
                client.add_key(auth, key)?;
            }
            let mut authorization = Vec::with_capacity(authorizations.len());
            for a in &authorizations {
                let (actor, permission) = a
                    .split_once('@')
                    .ok_or_else(|| antelope::Error::MalformedAuthorization(a.clone()))?;
                authorization.push(Authorization { actor: actor.to_string(), permission: permission.to_string() });
            }
            let data: Json = serde_json::from_str(&data)?;
            let result = client.push_transaction(&account, &action, data, authorization, expiration_secs)?;
            println!("transaction_id: {}", result.transaction_id);
        }
    }

    Ok(())
}
