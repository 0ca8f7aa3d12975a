use clap::Parser;
use nas_cors_proxy::{Config, ProxyServer};
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "nas-cors-proxy",
    about = "CORS-injecting forwarding proxy for a WebDAV NAS share"
)]
struct Args {
    /// Listen port (overrides the config file).
    #[arg(short, long)]
    port: Option<u16>,
    /// Path to a YAML config file.
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let mut config = match args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    if let Some(port) = args.port {
        config.listen.port = port;
    }
    config.validate()?;

    let server = ProxyServer::new(config);
    tokio::select! {
        result = server.run() => result,
        _ = tokio::signal::ctrl_c() => {
            info!("Shutting down");
            Ok(())
        }
    }
}
