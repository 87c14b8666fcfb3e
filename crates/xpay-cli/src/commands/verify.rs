//! `xpay verify` — Verify a claim without queueing it.

use clap::Args;
use serde_json::Value;

use super::{print_json, ClaimArgs, NodeArgs, NodeClient};

#[derive(Args, Debug)]
pub struct VerifyArgs {
    #[command(flatten)]
    pub claim: ClaimArgs,

    #[command(flatten)]
    pub node: NodeArgs,
}

pub async fn run(args: &VerifyArgs) -> anyhow::Result<()> {
    let body = args.claim.to_body()?;
    let client = NodeClient::new(&args.node);
    let (status, resp) = client.post("/claims/verify", &body).await?;
    print_json(&resp)?;
    if !status.is_success() {
        anyhow::bail!("verification request failed (HTTP {})", status);
    }
    if resp.get("valid").and_then(Value::as_bool) == Some(true) {
        println!("Claim is VALID");
    } else {
        println!("Claim is INVALID");
    }
    Ok(())
}
