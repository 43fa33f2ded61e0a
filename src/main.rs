use anyhow::Result;
use clap::Parser;

use mode_relay::{config::Config, server, util::init_log};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();
    init_log();

    server::run(config).await
}
