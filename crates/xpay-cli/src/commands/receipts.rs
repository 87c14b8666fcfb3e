//! `xpay receipts` — List settlement receipts, most recent first.

use clap::Args;

use super::{report, NodeArgs, NodeClient};

#[derive(Args, Debug)]
pub struct ReceiptsArgs {
    /// Only receipts for this channel.
    #[arg(short, long)]
    pub channel_id: Option<String>,

    #[command(flatten)]
    pub node: NodeArgs,
}

pub async fn run(args: &ReceiptsArgs) -> anyhow::Result<()> {
    let client = NodeClient::new(&args.node);
    let query: Vec<(&str, &str)> = args
        .channel_id
        .as_deref()
        .map(|id| vec![("channel_id", id)])
        .unwrap_or_default();
    let (status, resp) = client.get("/receipts", &query).await?;
    report(status, &resp)
}
