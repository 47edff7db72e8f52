//! Conference dialogs - terminal client for a conference chat backend
//!
//! Lists the conference dialogs and room members of the logged-in user and
//! prepares call joins.

mod api;
mod auth;
mod config;
mod join;
mod models;
mod screen;

use anyhow::Result;
use clap::{ArgGroup, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::AppCredentials;
use crate::screen::ConferenceType;

#[derive(Parser)]
#[command(name = "conference-dialogs")]
#[command(about = "Terminal client for conference dialogs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Store application credentials
    Setup {
        /// Application ID
        #[arg(long)]
        app_id: u64,

        #[arg(long)]
        auth_key: String,

        #[arg(long)]
        auth_secret: String,

        /// Custom API endpoint (defaults to the public cloud)
        #[arg(long)]
        endpoint: Option<String>,
    },

    /// Create a user session
    Login {
        /// User login
        login: String,

        /// User password
        #[arg(short, long)]
        password: String,

        /// Create a new session even if a valid one is cached
        #[arg(short, long)]
        force: bool,
    },

    /// Destroy the session and clear cached credentials
    Logout,

    /// Show current session status
    Status,

    /// List dialogs (refreshes dialogs and users together)
    Dialogs {
        /// Keep refreshing every N seconds until Ctrl+C
        #[arg(short, long)]
        watch: Option<u64>,
    },

    /// List users in the current room
    Users,

    /// Create a group dialog
    Create {
        /// Dialog name
        name: String,

        /// Occupant user IDs
        #[arg(short, long, value_delimiter = ',', required = true)]
        occupants: Vec<u64>,
    },

    /// Delete a dialog for the current user
    Delete {
        /// Dialog ID (from `dialogs` output)
        dialog_id: String,
    },

    /// Join a dialog's conference (listener unless --audio or --video)
    #[command(group(ArgGroup::new("media").args(["audio", "video"])))]
    Join {
        /// Dialog ID (from `dialogs` output)
        dialog_id: String,

        /// Publish audio
        #[arg(long)]
        audio: bool,

        /// Publish audio and video
        #[arg(long)]
        video: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    match cli.command {
        Commands::Setup {
            app_id,
            auth_key,
            auth_secret,
            endpoint,
        } => {
            auth::setup(
                AppCredentials {
                    application_id: app_id,
                    auth_key,
                    auth_secret,
                },
                endpoint,
            )?;
        }
        Commands::Login {
            login,
            password,
            force,
        } => {
            tracing::info!("Creating session...");
            auth::login(&login, &password, force).await?;
        }
        Commands::Logout => {
            tracing::info!("Logging out...");
            auth::logout().await?;
        }
        Commands::Status => {
            auth::status()?;
        }
        Commands::Dialogs { watch } => {
            tracing::info!("Fetching dialogs...");
            screen::show_dialogs(watch).await?;
        }
        Commands::Users => {
            screen::show_users().await?;
        }
        Commands::Create { name, occupants } => {
            screen::create_dialog(&name, &occupants).await?;
        }
        Commands::Delete { dialog_id } => {
            screen::delete_dialog(&dialog_id).await?;
        }
        Commands::Join {
            dialog_id,
            audio,
            video,
        } => {
            let conference_type = match (audio, video) {
                (_, true) => Some(ConferenceType::Video),
                (true, false) => Some(ConferenceType::Audio),
                (false, false) => None,
            };
            screen::join_dialog(&dialog_id, conference_type).await?;
        }
    }

    Ok(())
}
