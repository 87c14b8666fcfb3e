//! `xpay queue` — Submit a claim for admission.

use clap::Args;

use super::{report, ClaimArgs, NodeArgs, NodeClient};

#[derive(Args, Debug)]
pub struct QueueArgs {
    #[command(flatten)]
    pub claim: ClaimArgs,

    #[command(flatten)]
    pub node: NodeArgs,
}

pub async fn run(args: &QueueArgs) -> anyhow::Result<()> {
    let body = args.claim.to_body()?;
    let client = NodeClient::new(&args.node);
    let (status, resp) = client.post("/claims/queue", &body).await?;
    report(status, &resp)
}
