//! `xpay inspect` — Look up a channel's on-ledger entry through the node.

use clap::Args;

use super::{report, NodeArgs, NodeClient};

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Channel id (64 hex chars).
    #[arg(short, long)]
    pub channel_id: String,

    #[command(flatten)]
    pub node: NodeArgs,
}

pub async fn run(args: &InspectArgs) -> anyhow::Result<()> {
    let client = NodeClient::new(&args.node);
    let (status, resp) = client
        .get("/channels/inspect", &[("channel_id", args.channel_id.as_str())])
        .await?;
    report(status, &resp)
}
