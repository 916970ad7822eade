use clap::Parser;
use docbot_adaptor_web::{WebConfig, WebServer};
use docbot_core::config::{load_env, load_env_from_path};
use docbot_core::utils::logger::init_logging;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "run-docbot-web", about = "Serve the docbot backend-for-frontend")]
struct Cli {
    #[arg(long, env = "DOCBOT_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Bind host, overrides DOCBOT_WEB_HOST
    #[arg(long)]
    host: Option<String>,

    /// Bind port, overrides DOCBOT_WEB_PORT
    #[arg(long)]
    port: Option<u16>,

    /// Environment file to load instead of ./.env
    #[arg(long)]
    env_file: Option<PathBuf>,

    /// JSON file seeding the document library, overrides DOCUMENT_CATALOG_PATH
    #[arg(long)]
    catalog: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> docbot_core::Result<()> {
    let cli = Cli::parse();
    std::env::set_var("DOCBOT_LOG_LEVEL", &cli.log_level);
    init_logging();

    match cli.env_file.as_ref() {
        Some(path) => load_env_from_path(path)?,
        None => load_env()?,
    }

    let mut config = WebConfig::from_env();
    if let Some(host) = cli.host {
        config.host = host;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(catalog) = cli.catalog {
        config.catalog_path = Some(catalog);
    }

    info!(
        "Backends: chatbot={} lead={} upload={} documents={}",
        config.backend.chatbot_url,
        config.backend.lead_url,
        config.backend.upload_base_url,
        config.backend.document_base_url
    );

    let mut server = WebServer::new(config)?;
    let addr = server.start().await?;
    info!("Docbot web ready at http://{}", addr);

    #[cfg(unix)]
    {
        let mut term =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()).ok();
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = async {
                if let Some(ref mut s) = term { s.recv().await; }
            } => {},
        }
    }
    #[cfg(not(unix))]
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
    }

    server.stop().await?;
    Ok(())
}
