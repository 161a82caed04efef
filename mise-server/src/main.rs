use anyhow::{Context, Result};
use clap::Parser;
use mise_server::{build_state, config::Config, routes};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
struct Args {
    /// YAML configuration file
    #[clap(long)]
    config: Option<String>,

    /// The address and optionally port to bind to, overriding the configuration
    #[clap(long)]
    address: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    // initialize tracing
    let file_appender = tracing_appender::rolling::daily(std::env::current_dir()?, "access.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .json()
        .with_writer(non_blocking)
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Parse command line arguments
    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => Config::load(path).with_context(|| format!("Loading {}", path))?,
        None => Config::default(),
    };
    if let Some(address) = args.address {
        config.server.address = address;
    }

    let state = build_state(&config).await?;
    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(&config.server.address)
        .await
        .with_context(|| format!("Binding {}", config.server.address))?;
    tracing::info!("Listening on {}", config.server.address);
    axum::serve(listener, app).await?;
    Ok(())
}
