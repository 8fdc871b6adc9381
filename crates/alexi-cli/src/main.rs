use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod app;
mod commands;

use app::App;
use commands::personas::PersonaAction;

#[derive(Parser)]
#[command(name = "alexi")]
#[command(about = "Alexi - chat with a language model under configurable personas", long_about = None)]
struct Cli {
    /// Path to config.toml (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage personas
    Personas {
        #[command(subcommand)]
        action: PersonaAction,
    },
    /// List the models served by the completion endpoint
    Models,
    /// Start an interactive conversation
    Chat {
        /// Persona id to talk to (defaults to the default persona)
        #[arg(long)]
        persona: Option<String>,
    },
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("alexi=info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let app = App::bootstrap(cli.config).await?;

    match cli.command {
        Commands::Personas { action } => commands::personas::run(&app, action).await?,
        Commands::Models => commands::models::run(&app).await?,
        Commands::Chat { persona } => commands::chat::run(&app, persona).await?,
    }

    app.shutdown().await;
    Ok(())
}
