use clap::{Args, Subcommand};

#[derive(Subcommand)]
pub enum AdminCommands {
    /// Initialize the server (create database and admin token)
    Init {
        /// Data directory for the database
        #[arg(long, default_value = "./data")]
        data_dir: String,

        /// Skip interactive prompts
        #[arg(long)]
        non_interactive: bool,
    },

    /// Add a user and print a token for them
    UserAdd {
        /// Data directory for the database
        #[arg(long, default_value = "./data")]
        data_dir: String,

        /// Email address, unique across users
        #[arg(long)]
        email: Option<String>,

        /// Display name
        #[arg(long)]
        name: Option<String>,

        /// Do not create a token for the new user
        #[arg(long)]
        no_token: bool,

        /// Skip interactive prompts (requires --email and --name)
        #[arg(long)]
        non_interactive: bool,
    },
}

/// Where the client commands send requests.
#[derive(Args, Clone)]
pub struct RemoteArgs {
    /// Server base URL
    #[arg(long, env = "CORKBOARD_SERVER", default_value = "http://127.0.0.1:8080")]
    pub server: String,

    /// User token
    #[arg(long, env = "CORKBOARD_TOKEN", hide_env_values = true)]
    pub token: String,
}

#[derive(Subcommand)]
pub enum BoardCommands {
    /// Print a board with its lists and cards
    Show {
        /// Board ID
        board_id: String,

        #[command(flatten)]
        remote: RemoteArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum CardCommands {
    /// Move a card to the end of another list
    Move {
        /// Card ID
        card_id: String,

        /// Board the card is on
        #[arg(long)]
        board: String,

        /// Target list ID
        #[arg(long)]
        to: String,

        #[command(flatten)]
        remote: RemoteArgs,
    },
}
