//! `xpay register` — Register a point-of-sale device.

use clap::Args;
use serde_json::json;

use super::{report, NodeArgs, NodeClient};

#[derive(Args, Debug)]
pub struct RegisterArgs {
    /// Device identifier.
    #[arg(short, long)]
    pub device_id: String,

    /// Per-device exposure cap in drops (defaults to the node's cap).
    #[arg(long)]
    pub exposure_cap: Option<u64>,

    #[command(flatten)]
    pub node: NodeArgs,
}

pub async fn run(args: &RegisterArgs) -> anyhow::Result<()> {
    let mut body = json!({ "device_id": args.device_id });
    if let Some(cap) = args.exposure_cap {
        body["exposure_cap_drops"] = json!(cap);
    }
    let client = NodeClient::new(&args.node);
    let (status, resp) = client.post("/devices/register", &body).await?;
    report(status, &resp)
}
