//! `xpay keygen` — Generate a fresh channel key pair.

use clap::Args;
use serde_json::json;
use xpay_crypto::KeyPair;

use super::{print_json, SchemeArg};

#[derive(Args, Debug)]
pub struct KeygenArgs {
    /// Signing scheme.
    #[arg(short, long, value_enum, default_value = "ed25519")]
    pub scheme: SchemeArg,
}

pub fn run(args: &KeygenArgs) -> anyhow::Result<()> {
    let keypair = KeyPair::generate(args.scheme.into());
    let secret = keypair.secret_bytes();
    print_json(&json!({
        "scheme": keypair.scheme().to_string(),
        "secret": hex::encode_upper(secret.as_slice()),
        "pubkey": keypair.public_key().to_hex(),
    }))?;
    eprintln!("Keep the secret offline; the pubkey goes into the channel's PublicKey field.");
    Ok(())
}
