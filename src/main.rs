use std::path::PathBuf;
use std::sync::Arc;

use anyhow::bail;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use corkboard::cli::{
    AdminCommands, BoardCommands, CardCommands, run_board_show, run_card_move, run_init,
    run_user_add,
};
use corkboard::config::ServerConfig;
use corkboard::server::{AppState, create_router};
use corkboard::store::{SqliteStore, Store};

#[derive(Parser)]
#[command(name = "corkboard")]
#[command(about = "A collaborative Kanban board server", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Administrative commands
    Admin {
        #[command(subcommand)]
        command: AdminCommands,
    },

    /// Start the server
    Serve {
        /// TOML config file; flags below override its values
        #[arg(long)]
        config: Option<PathBuf>,

        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(long, short)]
        port: Option<u16>,

        /// Data directory for the database
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },

    /// Inspect boards on a running server
    Board {
        #[command(subcommand)]
        command: BoardCommands,
    },

    /// Change cards on a running server
    Card {
        #[command(subcommand)]
        command: CardCommands,
    },
}

fn init_tracing(log_filter: Option<&str>) -> anyhow::Result<()> {
    let directive = log_filter.unwrap_or("corkboard=info");
    let mut filter = EnvFilter::from_default_env();
    for part in directive.split(',').filter(|p| !p.trim().is_empty()) {
        filter = filter.add_directive(part.trim().parse()?);
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    let token_file = config.admin_token_path();
    if !token_file.exists() {
        bail!(
            "Server not initialized. Run 'corkboard admin init' first to create the database and admin token."
        );
    }

    let store = SqliteStore::new(config.db_path())?;
    if !store.has_admin_token()? {
        bail!(
            "Server not initialized. Run 'corkboard admin init' first to create the database and admin token."
        );
    }
    store.initialize()?;

    info!("Admin token available at {}", token_file.display());

    let state = Arc::new(AppState::new(Arc::new(store), &config));

    let app = create_router(state);
    let addr = config.socket_addr()?;

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// Client commands use blocking HTTP, so only `serve` gets a runtime.
fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Admin { command } => {
            init_tracing(None)?;
            match command {
                AdminCommands::Init {
                    data_dir,
                    non_interactive,
                } => run_init(data_dir, non_interactive)?,
                AdminCommands::UserAdd {
                    data_dir,
                    email,
                    name,
                    no_token,
                    non_interactive,
                } => run_user_add(data_dir, email, name, no_token, non_interactive)?,
            }
        }
        Commands::Serve {
            config,
            host,
            port,
            data_dir,
        } => {
            let mut config = ServerConfig::load(config.as_deref())?;
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(data_dir) = data_dir {
                config.data_dir = data_dir;
            }

            init_tracing(config.log_filter.as_deref())?;

            tokio::runtime::Runtime::new()?.block_on(serve(config))?;
        }
        Commands::Board { command } => {
            init_tracing(None)?;
            match command {
                BoardCommands::Show {
                    board_id,
                    remote,
                    json,
                } => run_board_show(board_id, remote, json)?,
            }
        }
        Commands::Card { command } => {
            init_tracing(None)?;
            match command {
                CardCommands::Move {
                    card_id,
                    board,
                    to,
                    remote,
                } => run_card_move(card_id, board, to, remote)?,
            }
        }
    }

    Ok(())
}
