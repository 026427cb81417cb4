use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use tracing::info;
use tracing_subscriber::EnvFilter;

use pizza_restaurant_service::config::Config;
use pizza_restaurant_service::{router, seed, AppState, Store};

#[derive(Parser)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve,
    /// Replace all rows with demo data
    Seed,
}

#[tokio::main]
pub async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    let store = Store::open(&config.database_url, config.pool_max)?;
    store.run_migrations()?;

    match &cli.command {
        Commands::Serve => serve(config, store).await,
        Commands::Seed => Ok(store.blocking(seed::seed).await?),
    }
}

async fn serve(config: Config, store: Store) -> Result<(), Box<dyn std::error::Error>> {
    let app = router(AppState { store });

    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    info!("Pizza restaurant service listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
