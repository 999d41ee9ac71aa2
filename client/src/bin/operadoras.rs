//! Command-line app shell: opens one route and prints its view.

use anyhow::{bail, Result};
use clap::Parser;
use operadoras_client::{views, Client, ListOptions, Route};
use tracing_subscriber::EnvFilter;

/// Browse operadoras, their expenses and aggregate statistics.
#[derive(Parser)]
#[command(name = "operadoras")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Route to open: `/` for the listing, `/operadoras/{cnpj}` for one operadora
    #[arg(default_value = "/")]
    path: String,

    /// Origin the `/api` base path is resolved against
    #[arg(long, env = "OPERADORAS_API_ORIGIN", default_value = "http://localhost:8000")]
    origin: String,

    /// Listing page
    #[arg(short, long, default_value_t = 1)]
    page: u32,

    /// Listing page size
    #[arg(short, long, default_value_t = 10)]
    limit: u32,

    /// Search by razao social or CNPJ
    #[arg(short, long, default_value = "")]
    q: String,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .init();

    let Some(route) = Route::resolve(&cli.path) else {
        bail!("no view for path {}", cli.path);
    };
    tracing::info!(%route, origin = %cli.origin, "opening view");

    let client = Client::new(&cli.origin)?;
    let options = ListOptions::new().page(cli.page).limit(cli.limit).query(cli.q);
    let rendered = views::render_route(&client, &route, &options).await?;
    print!("{rendered}");
    Ok(())
}
