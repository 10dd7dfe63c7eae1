mod config;
mod relay;

use anyhow::Result;
use clap::Parser;

use config::{DEFAULT_PORT, RelayConfig};
use relay::Relay;

#[derive(Parser)]
#[command(name = "officeverse-relay")]
#[command(about = "Line relay for officeverse clients")]
struct Args {
    #[arg(short, long, default_value = "0.0.0.0")]
    bind: String,

    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    #[arg(short, long, default_value_t = 64)]
    max_clients: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let bind_addr = format!("{}:{}", args.bind, args.port);

    let config = RelayConfig {
        max_clients: args.max_clients,
        ..Default::default()
    };

    let relay = Relay::bind(&bind_addr, config).await?;
    log::info!("Relay listening on {}", relay.local_addr()?);
    let stats = relay.stats();

    tokio::select! {
        result = relay.run() => result?,
        _ = tokio::signal::ctrl_c() => {}
    }

    log::info!(
        "Relay shutting down after {} lines",
        stats.lines_relayed.load(std::sync::atomic::Ordering::Relaxed)
    );
    Ok(())
}
