//! `xpay sign` — Sign a payment-channel claim offline.

use clap::Args;
use serde_json::{json, Value};
use xpay_core::{parse_drops, ChannelId};
use xpay_crypto::{sign_claim, KeyPair};

use super::{print_json, SchemeArg};

#[derive(Args, Debug)]
pub struct SignArgs {
    /// Channel id (64 hex chars).
    #[arg(short, long)]
    pub channel_id: String,

    /// Cumulative amount in drops.
    #[arg(short, long)]
    pub amount: String,

    /// Channel secret key (32 bytes, hex).
    #[arg(long)]
    pub secret: String,

    /// Signing scheme of the secret.
    #[arg(short, long, value_enum, default_value = "ed25519")]
    pub scheme: SchemeArg,

    /// Device id to include in the claim.
    #[arg(long)]
    pub device_id: Option<String>,
}

/// Build the signed claim JSON accepted by `/claims/queue`.
pub fn signed_claim(args: &SignArgs) -> anyhow::Result<Value> {
    let channel = ChannelId::parse(&args.channel_id)?;
    let amount = parse_drops(&args.amount)?;
    let keypair = KeyPair::from_hex(args.scheme.into(), &args.secret)?;

    let mut claim = json!({
        "channel_id": channel.as_str(),
        "amount_drops": amount.to_string(),
        "signature": sign_claim(&channel, amount, &keypair),
        "pubkey": keypair.public_key().to_hex(),
    });
    if let Some(device_id) = &args.device_id {
        claim["device_id"] = json!(device_id);
    }
    Ok(claim)
}

pub fn run(args: &SignArgs) -> anyhow::Result<()> {
    print_json(&signed_claim(args)?)
}
