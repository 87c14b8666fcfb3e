//! `xpay settle` — Settle a queued claim.

use clap::Args;
use serde_json::{json, Value};

use super::{report, NodeArgs, NodeClient};

#[derive(Args, Debug)]
pub struct SettleArgs {
    /// Channel to settle; defaults to the largest queued claim.
    #[arg(short, long)]
    pub channel_id: Option<String>,

    #[command(flatten)]
    pub node: NodeArgs,
}

pub async fn run(args: &SettleArgs) -> anyhow::Result<()> {
    let body = match &args.channel_id {
        Some(id) => json!({ "channel_id": id }),
        None => json!({}),
    };
    let client = NodeClient::new(&args.node);
    let (status, resp) = client.post("/claims/settle", &body).await?;
    report(status, &resp)?;
    if resp.get("ok").and_then(Value::as_bool) == Some(false) {
        let reason = resp.get("reason").and_then(Value::as_str).unwrap_or("unknown");
        println!("Nothing settled: {}", reason);
    }
    Ok(())
}
