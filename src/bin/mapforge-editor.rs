/// mapforge editor bridge - HTTP endpoint for the visual schema editor
///
/// Serves the current schema models and accepts full replacement documents.
/// Saved documents are picked up by any running `mapforge ... --watch`.

use clap::Parser;
use mapforge::bridge::{router, BridgeState};
use mapforge::MapforgeConfig;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mapforge-editor")]
#[command(version, about = "HTTP bridge between the schema editor and the schema file", long_about = None)]
struct Cli {
    /// Path to mapforge.yaml (defaults to ./mapforge.yaml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Port to listen on (overrides config and EDITOR_PORT)
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load environment variables
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), String> {
    let mut config = MapforgeConfig::discover(cli.config.as_deref()).map_err(|e| e.to_string())?;

    if let Ok(host) = std::env::var("EDITOR_HOST") {
        config.editor.host = host;
    }
    if let Ok(port) = std::env::var("EDITOR_PORT") {
        config.editor.port = port
            .parse()
            .map_err(|_| format!("Invalid EDITOR_PORT: {}", port))?;
    }
    if let Some(port) = cli.port {
        config.editor.port = port;
    }

    let project_path = std::env::current_dir().map_err(|e| format!("Failed to resolve working directory: {}", e))?;
    let state = BridgeState {
        schema_path: project_path.join(config.schema_path()),
        form_path: project_path.join(config.forms_path()),
        project_path,
    };

    let addr = config.editor_address();
    tracing::info!("mapforge editor bridge listening on {}", addr);
    tracing::info!("Serving schema file: {}", state.schema_path.display());

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| format!("Failed to bind {}: {}", addr, e))?;
    axum::serve(listener, router(state))
        .await
        .map_err(|e| format!("Server error: {}", e))
}
