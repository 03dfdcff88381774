// Web Server Binary Entry Point
//
// Purpose: Serve the upload page and run the dropoff check per upload
// Usage: cargo run --features web --bin web_server -- --port 3000

use clap::Parser;
use dropoff_validator::{create_router, AppState, ServerConfig, ValidatorConfig};
use std::net::IpAddr;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "web_server", about = "Upload page for the delivery vs dropoff check")]
struct Args {
    /// Address to bind
    #[arg(long, default_value = "0.0.0.0")]
    bind: IpAddr,

    /// Port to listen on
    #[arg(long, default_value_t = 3000)]
    port: u16,

    /// JSON file with extra header aliases per canonical column
    #[arg(long)]
    aliases: Option<PathBuf>,

    /// Use only the aliases from --aliases, not the built-in ones
    #[arg(long, requires = "aliases")]
    replace_default_aliases: bool,

    /// Largest accepted upload, in megabytes
    #[arg(long, default_value_t = 20)]
    max_upload_mb: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing (structured logging)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    // Default log level: info for our crate, warn for others
                    "dropoff_validator=info,tower_http=debug,axum=debug,warn".into()
                }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let server_config = ServerConfig {
        bind: args.bind,
        port: args.port,
        max_upload_bytes: args.max_upload_mb * 1024 * 1024,
    };

    tracing::info!("Configuration:");
    tracing::info!("  BIND: {}", server_config.bind);
    tracing::info!("  PORT: {}", server_config.port);
    tracing::info!("  MAX UPLOAD: {} MB", args.max_upload_mb);
    if let Some(path) = &args.aliases {
        tracing::info!("  ALIASES: {:?} (replace defaults: {})", path, args.replace_default_aliases);
    }

    let config = ValidatorConfig::with_alias_file(args.aliases.as_deref(), args.replace_default_aliases)?;
    let state = AppState::new(config);

    let app = create_router(state, &server_config);

    let addr = server_config.socket_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
