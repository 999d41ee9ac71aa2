use std::path::Path;

use operadoras_server::{AppState, Dataset};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("operadoras_server=info")),
        )
        .init();

    let (source, loaded) = match std::env::var("OPERADORAS_DATA") {
        Ok(dir) => {
            let loaded = Dataset::load_dir(Path::new(&dir));
            (dir, loaded)
        }
        Err(_) => {
            tracing::info!("OPERADORAS_DATA not set, serving bundled sample data");
            ("bundled sample".to_string(), Dataset::sample())
        }
    };
    let state = match loaded {
        Ok(dataset) => {
            tracing::info!(%source, operadoras = dataset.operadoras().len(), "dataset loaded");
            AppState::new(dataset)
        }
        Err(e) => {
            tracing::error!(%source, error = %e, "dataset not loaded; data endpoints will answer 500");
            AppState::unavailable(e.to_string())
        }
    };

    let port = std::env::var("PORT").unwrap_or_else(|_| "8000".to_string());
    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "listening");
    operadoras_server::run(listener, state).await?;
    Ok(())
}
