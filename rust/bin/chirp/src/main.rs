//! `chirp`: command-line front end for the feed backend.
//!
//! Opens the redb database named by the config file (or `--data-dir` /
//! `--db`) and runs one feed operation per invocation.
//!
//! ```text
//! chirp register alice
//! chirp post alice "hello @bob"
//! chirp follow alice --as bob
//! chirp timeline --page 2
//! ```

mod commands;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use chirp_core::{ServiceConfig, ServiceError};
use chirp_feed::FeedService;
use clap::{Parser, Subcommand};
use tracing::debug;

use output::Format;

/// Chirp feed CLI.
#[derive(Parser, Debug)]
#[command(name = "chirp", about = "Social feed over a key-value store")]
struct Cli {
    /// Path to config file (default: ~/.chirp/config.toml).
    #[arg(long = "config", global = true, env = "CHIRP_CONFIG")]
    config: Option<PathBuf>,

    /// Data directory (overrides the config file).
    #[arg(long = "data-dir", global = true)]
    data_dir: Option<PathBuf>,

    /// Database file (overrides the config file and --data-dir).
    #[arg(long = "db", global = true)]
    db: Option<PathBuf>,

    /// Output format: table or json.
    #[arg(long = "output", short = 'o', global = true, default_value = "table")]
    output: Format,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create an account.
    Register {
        username: String,
        /// Password (prefer the interactive prompt).
        #[arg(long)]
        password: Option<String>,
    },

    /// Check a username/password pair.
    Login {
        username: String,
        /// Password (prefer the interactive prompt).
        #[arg(long)]
        password: Option<String>,
    },

    /// Publish a post.
    Post {
        /// Author.
        username: String,
        /// Post text. Mentions of registered users become profile links.
        content: String,
    },

    /// Follow a user.
    Follow {
        /// User to follow.
        target: String,
        /// Who follows.
        #[arg(long = "as")]
        follower: String,
    },

    /// Stop following a user.
    Unfollow {
        /// User to stop following.
        target: String,
        /// Who stops following.
        #[arg(long = "as")]
        follower: String,
    },

    /// Show the global timeline.
    Timeline {
        #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
        page: i64,
    },

    /// Show a user's profile and posts.
    Profile {
        username: String,
        #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
        page: i64,
        /// View the profile as this user.
        #[arg(long = "as")]
        viewer: Option<String>,
    },

    /// List the newest users.
    Users {
        #[arg(long)]
        limit: Option<u64>,
    },
}

fn main() -> ExitCode {
    // Initialize logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => match e.downcast_ref::<ServiceError>() {
            Some(err) => {
                eprintln!("error [{}]: {}", err.error_code(), err);
                ExitCode::from(if err.is_client_error() { 1 } else { 2 })
            }
            None => {
                eprintln!("error: {:#}", e);
                ExitCode::from(2)
            }
        },
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    debug!("Loading configuration from {}", config_path.display());
    let mut config = ServiceConfig::load(&config_path)?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = Some(dir);
    }
    if let Some(db) = cli.db {
        config.db_path = Some(db);
    }

    let db_path = config.resolve_db_path();
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let kv: Arc<dyn chirp_kv::KVStore> = Arc::new(
        chirp_kv::RedbStore::open(&db_path)
            .map_err(|e| anyhow::anyhow!("failed to open KV store: {}", e))?,
    );
    let feed = FeedService::new(kv, config.feed.clone());
    let fmt = cli.output;

    match cli.command {
        Commands::Register { username, password } => {
            commands::account::register(&feed, fmt, &username, password)
        }
        Commands::Login { username, password } => {
            commands::account::login(&feed, fmt, &username, password)
        }
        Commands::Post { username, content } => {
            commands::social::post(&feed, fmt, &username, &content)
        }
        Commands::Follow { target, follower } => {
            commands::social::follow(&feed, &target, &follower)
        }
        Commands::Unfollow { target, follower } => {
            commands::social::unfollow(&feed, &target, &follower)
        }
        Commands::Timeline { page } => commands::read::timeline(&feed, fmt, page),
        Commands::Profile {
            username,
            page,
            viewer,
        } => commands::read::profile(&feed, fmt, &username, page, viewer.as_deref()),
        Commands::Users { limit } => {
            let limit = limit.unwrap_or(config.feed.recent_users);
            commands::read::users(&feed, fmt, limit)
        }
    }
}

/// Default config file path: ~/.chirp/config.toml.
fn default_config_path() -> PathBuf {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".chirp").join("config.toml")
}
