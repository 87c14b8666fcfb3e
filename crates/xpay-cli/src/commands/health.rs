//! `xpay health` — Query the health of a running node.

use clap::Args;

use super::{report, NodeArgs, NodeClient};

#[derive(Args, Debug)]
pub struct HealthArgs {
    #[command(flatten)]
    pub node: NodeArgs,
}

pub async fn run(args: &HealthArgs) -> anyhow::Result<()> {
    let client = NodeClient::new(&args.node);
    let (status, body) = client.get("/health", &[]).await?;
    report(status, &body)
}
