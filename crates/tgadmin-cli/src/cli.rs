//! Command-line surface.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Administer Telegram bots, advertisements and analytics.
#[derive(Parser, Debug)]
#[command(name = "tgadmin", version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path (can also be set via TGADMIN_CONFIG env var)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Log in and store the session token
    Login(CredentialArgs),
    /// Create an account and log in
    Register(CredentialArgs),
    /// Forget the stored session token
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Summary counters
    Dashboard,
    #[command(subcommand)]
    Bots(BotsCommand),
    #[command(subcommand)]
    Ads(AdsCommand),
    #[command(subcommand)]
    Analytics(AnalyticsCommand),
    #[command(subcommand)]
    Media(MediaCommand),
    #[command(subcommand)]
    Profile(ProfileCommand),
    /// Stream real-time notifications until Ctrl-C
    Watch {
        /// Also subscribe to per-bot updates
        #[arg(long = "bot")]
        bots: Vec<u64>,
    },
    /// Print the effective configuration
    Config,
}

#[derive(Args, Debug)]
pub struct CredentialArgs {
    pub username: String,
    /// Read from stdin when omitted
    #[arg(long, env = "TGADMIN_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum BotsCommand {
    /// List bots
    List {
        /// Case-insensitive name filter
        #[arg(long)]
        search: Option<String>,
        /// Only bots in this status (running, stopped, error)
        #[arg(long)]
        status: Option<String>,
    },
    /// Register a bot with its Bot API token
    Add { name: String, token: String },
    Start { id: u64 },
    Stop { id: u64 },
    Restart { id: u64 },
}

#[derive(Subcommand, Debug)]
pub enum AdsCommand {
    List,
    /// Compose an advertisement
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
        /// e.g. 9.99 or $9.99
        #[arg(long)]
        price: String,
        /// Target bot ids
        #[arg(long = "bot", required = true)]
        bots: Vec<u64>,
        /// RFC 3339 time; must be in the future
        #[arg(long)]
        schedule: Option<String>,
        /// Files to upload and attach
        #[arg(long = "media")]
        media: Vec<PathBuf>,
    },
    /// Broadcast now to the advertisement's target bots
    Broadcast { id: u64 },
    Status { id: u64 },
}

#[derive(Subcommand, Debug)]
pub enum AnalyticsCommand {
    /// Per-bot totals from the dashboard metrics
    Overview,
    /// Samples for one bot
    Bot {
        id: u64,
        #[arg(long)]
        days: Option<u32>,
    },
    /// Export rows as JSON
    Export {
        #[arg(long)]
        days: Option<u32>,
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
pub enum MediaCommand {
    /// Upload files and print their URLs
    Upload {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Delete an uploaded file by URL
    Delete { url: String },
}

#[derive(Subcommand, Debug)]
pub enum ProfileCommand {
    Show,
    /// List API keys
    Keys,
    CreateKey { name: String },
    DeleteKey { id: u64 },
    /// Change the password (prompts on stdin)
    Password,
    Activity {
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Update display settings; omitted fields keep their value
    Settings {
        #[arg(long)]
        theme: Option<String>,
        #[arg(long)]
        timezone: Option<String>,
        #[arg(long)]
        language: Option<String>,
    },
}

impl Command {
    /// Commands that run without a session.
    pub fn is_public(&self) -> bool {
        matches!(
            self,
            Self::Login(_) | Self::Register(_) | Self::Logout | Self::Config
        )
    }
}
