//! geosrv entry point

use anyhow::Context;
use axum::serve;
use clap::{Parser, Subcommand};
use common::logging::{self, LogConfig};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

use geosrv::app_state::{open_network, open_store, AppState};
use geosrv::config::GeoSrvConfig;
use geosrv::create_routes;

#[cfg(feature = "swagger-ui")]
use geosrv::routes::GeoSrvApiDoc;
#[cfg(feature = "swagger-ui")]
use utoipa::OpenApi;
#[cfg(feature = "swagger-ui")]
use utoipa_swagger_ui::SwaggerUi;

#[derive(Parser, Debug)]
#[command(author, version, about = "Grid geo data service")]
struct Args {
    /// Configuration file (default: config/geosrv.yaml)
    #[arg(short, long, value_name = "FILE", env = "GEOSRV_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the HTTP API (default)
    Serve,
    /// Run one precalculation pass and exit
    Precalculate {
        /// Network id
        network_id: Uuid,
    },
    /// Validate the configuration and probe the store
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = GeoSrvConfig::load(args.config.as_deref()).context("loading configuration")?;

    logging::init_with_config(LogConfig {
        service_name: config.service.name.clone(),
        level: config.logging.level.clone(),
        log_dir: config.logging.dir.clone(),
        enable_file: config.logging.enable_file,
        enable_json: config.logging.enable_json,
    })
    .map_err(|e| anyhow::anyhow!("logging initialization failed: {}", e))?;

    info!("Starting {} v{}", config.service.name, env!("CARGO_PKG_VERSION"));

    match args.command.unwrap_or(Commands::Serve) {
        Commands::Serve => run_service(config).await,
        Commands::Precalculate { network_id } => run_precalculation(config, network_id).await,
        Commands::Check => check_config(config).await,
    }
}

async fn run_service(config: GeoSrvConfig) -> anyhow::Result<()> {
    let addr: SocketAddr = config
        .bind_address()
        .parse()
        .with_context(|| format!("invalid bind address {}", config.bind_address()))?;

    let state = Arc::new(AppState::from_config(config).await?);
    let app = create_routes(state);

    #[cfg(feature = "swagger-ui")]
    let app = {
        info!("Swagger UI at /docs");
        app.merge(SwaggerUi::new("/docs").url("/openapi.json", GeoSrvApiDoc::openapi()))
    };

    let socket = if addr.is_ipv4() {
        tokio::net::TcpSocket::new_v4()
    } else {
        tokio::net::TcpSocket::new_v6()
    }
    .context("creating socket")?;
    socket
        .set_reuseaddr(true)
        .context("setting SO_REUSEADDR")?;
    socket
        .bind(addr)
        .with_context(|| format!("binding {}", addr))?;
    let listener = socket.listen(1024).context("listening")?;

    info!("API server listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    if let Err(e) = serve(listener, app)
        .with_graceful_shutdown(common::shutdown::wait_for_shutdown())
        .await
    {
        error!("Server error: {}", e);
        return Err(e.into());
    }
    info!("Shutdown complete");
    Ok(())
}

async fn run_precalculation(config: GeoSrvConfig, network_id: Uuid) -> anyhow::Result<()> {
    let state = AppState::from_config(config).await?;
    let report = state.precalculation.precalculate(network_id).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

async fn check_config(config: GeoSrvConfig) -> anyhow::Result<()> {
    println!("=== geosrv configuration check ===");
    println!("Service:      {}", config.service.name);
    println!("Bind address: {}", config.bind_address());
    println!("Storage:      {:?}", config.storage.backend);
    println!("Network:      {:?}", config.network);
    println!(
        "Precalculation: concurrency={}, ordered_waves={}, fallback={:?}",
        config.precalculation.concurrency,
        config.precalculation.ordered_waves,
        config.precalculation.fallback
    );

    let store = open_store(&config).await?;
    let lines = store.line_count().await?;
    println!("Store ({}) reachable, {} lines stored", store.backend(), lines);

    let network = open_network(&config)?;
    println!("Network source: {}", network.source());
    Ok(())
}
