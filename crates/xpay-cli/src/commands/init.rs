//! `xpay init` — Write a default node configuration.

use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Directory to initialize (defaults to current directory).
    #[arg(default_value = ".")]
    pub dir: PathBuf,
}

pub const DEFAULT_CONFIG: &str = r#"# XPay Node Configuration

[api]
listen_addr = "127.0.0.1"
port = 3000

[storage]
# "memory" or "rocksdb"
backend = "rocksdb"
data_dir = "./data"

[policy]
exposure_cap_drops = 1500000
routing_tag_base = 700000

[ledger]
# "simulated" or "live". Live settlement needs rpc_url, merchant_address
# and XPAY_MERCHANT_SECRET in the environment.
mode = "simulated"
# rpc_url = "https://s.altnet.rippletest.net:51234"
# merchant_address = "r..."
poll_interval_ms = 1000
max_polls = 20
request_timeout_secs = 10

[auth]
# "open" or "bearer"
mode = "open"
tokens = []

[logging]
level = "info"
format = "text"
"#;

pub fn run(args: &InitArgs) -> anyhow::Result<()> {
    let config_path = args.dir.join("xpay.toml");

    if config_path.exists() {
        anyhow::bail!("configuration file already exists at {}", config_path.display());
    }

    std::fs::create_dir_all(&args.dir)?;
    std::fs::write(&config_path, DEFAULT_CONFIG)?;
    std::fs::create_dir_all(args.dir.join("data"))?;

    println!("Initialized XPay node config at {}", config_path.display());
    println!("Edit xpay.toml to customize your configuration.");
    println!("Run 'xpay-node --config {}' to start the node.", config_path.display());
    Ok(())
}
