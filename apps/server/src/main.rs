use anyhow::Context;
use catalog::domain::config::{AppConfig, AppConfigInner};
use catalog::kernel::config::load_config;
use catalog_logger::Logger;
use catalog_server::Server;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "catalog-server", version, about)]
struct Cli {
    /// Main config file; `catalog-<module>.toml` files are read from the same directory
    #[arg(short, long, default_value = "config/catalog.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cfg: AppConfigInner =
        load_config(Some(&cli.config), &catalog::MODULES).context("Critical: Configuration is malformed")?;
    let cfg = AppConfig::from(cfg);

    let _log = Logger::from_config(env!("CARGO_PKG_NAME"), &cfg.logger)?;

    Server::builder().config(cfg).build().await?.run().await
}
