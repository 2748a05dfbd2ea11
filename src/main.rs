use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use termlens::api::{AppState, create_router};
use termlens::config::CONFIG;

#[derive(Parser)]
#[command(name = "termlens", version, about = "Bilingual term definitions with a thumbnail")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve {
        /// Address to bind, overrides BIND_ADDR
        #[arg(long)]
        addr: Option<String>,
    },
    /// Resolve a thumbnail for a term and print its URL
    Image { term: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    // .env may carry RUST_LOG, so load it before the subscriber reads the filter
    dotenvy::dotenv().ok();

    // Initialize tracing subscriber (handles both tracing and log crate)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .init();

    // config parse warnings need the subscriber in place
    let config = &*CONFIG;

    let state = AppState::from_config(config)?;

    match cli.command.unwrap_or(Command::Serve { addr: None }) {
        Command::Serve { addr } => {
            let addr = addr.unwrap_or_else(|| config.bind_addr.clone());
            let app = create_router(state, &config.static_dir);
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!("listening on http://{}", listener.local_addr()?);
            axum::serve(listener, app).await?;
        }
        Command::Image { term } => {
            let term = term.trim();
            if term.is_empty() {
                anyhow::bail!("term must not be empty");
            }
            let url = state.images.resolve(term).await;
            println!("{url}");
        }
    }
    Ok(())
}
