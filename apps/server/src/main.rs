use anyhow::Context;
use cohort::domain::config::ApiConfig;
use cohort::kernel::config::load_config;
use cohort_logger::Logger;
use cohort_server::Server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _log = Logger::builder(env!("CARGO_PKG_NAME")).init()?;

    // optional first argument: config file path, `server` otherwise
    let path = std::env::args().nth(1).unwrap_or_else(|| "server".to_owned());
    let cfg: ApiConfig = load_config(Some(&path)).context("Critical: Configuration is malformed")?;

    Server::builder().config(cfg).build()?.run().await
}
