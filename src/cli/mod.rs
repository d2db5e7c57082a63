mod admin;
mod board;
mod commands;
pub mod http_client;

pub use admin::{run_init, run_user_add};
pub use board::{run_board_show, run_card_move};
pub use commands::{AdminCommands, BoardCommands, CardCommands, RemoteArgs};

use std::path::Path;

use crate::config::ServerConfig;
use crate::store::SqliteStore;

/// Initialize store from data directory, checking it exists
pub fn init_store(data_dir: &Path) -> anyhow::Result<SqliteStore> {
    let config = ServerConfig {
        data_dir: data_dir.to_path_buf(),
        ..ServerConfig::default()
    };
    let db_path = config.db_path();

    if !db_path.exists() {
        anyhow::bail!(
            "Database not found at {}. Run 'corkboard admin init' first.",
            db_path.display()
        );
    }

    SqliteStore::new(&db_path).map_err(Into::into)
}
