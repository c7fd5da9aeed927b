#![allow(clippy::print_stdout)]

pub mod handlers;
pub mod models;
pub mod render;

use crate::handlers::{divide, list, undo};
use crate::models::args::{AppCommands, Cli};
use anyhow::{Context, Result};
use clap::Parser;
use cohort::domain::config::ClientConfig;
use cohort::features::division::client::HttpEngine;
use cohort::kernel::config::load_config_or_default;
use cohort_logger::{LevelFilter, Logger};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _log = Logger::builder(env!("CARGO_PKG_NAME")).level(LevelFilter::WARN).init()?;

    let mut cfg: ClientConfig =
        load_config_or_default(Some(&cli.config)).context("Client configuration is malformed")?;
    if let Some(base_url) = cli.base_url {
        cfg.base_url = base_url;
    }
    if let Some(group) = cli.group {
        cfg.group_id = group;
    }

    let engine = HttpEngine::new(&cfg)?;
    match cli.command {
        AppCommands::Divide { plan } => divide::run(engine, &plan).await?,
        AppCommands::Undo { yes } => undo::run(engine, yes).await?,
        AppCommands::List {} => list::run(engine).await?,
    }

    Ok(())
}
