//! Clap derive structures for the `wanyumba` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// wanyumba -- admin console for the Wanyumba real-estate platform
#[derive(Debug, Parser)]
#[command(
    name = "wanyumba",
    version,
    about = "Administer the Wanyumba real-estate platform from the command line",
    long_about = "Back-office console for the Wanyumba real-estate platform:\n\
        roles and users, properties, scraped listings, professional-profile\n\
        review, and live scraper monitoring over the push channel.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Admin API base URL (overrides settings)
    #[arg(long, env = "WANYUMBA_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Output format
    #[arg(long, short = 'o', default_value = "table", global = true)]
    pub output: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Request timeout in seconds
    #[arg(long, env = "WANYUMBA_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in to the admin API and store the issued token
    Login(LoginArgs),

    /// End the session and clear the stored token
    Logout,

    /// Manage access-control roles
    #[command(alias = "role")]
    Roles(RolesArgs),

    /// List back-office users
    #[command(alias = "user")]
    Users(UsersArgs),

    /// List managed properties
    #[command(alias = "prop")]
    Properties(PropertiesArgs),

    /// List scraped listings awaiting triage
    #[command(alias = "listing")]
    Listings(ListingsArgs),

    /// Review professional profiles
    #[command(alias = "pro")]
    Pros(ProsArgs),

    /// Monitor and drive the scraper fleet
    Scraper(ScraperArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Per-Command Args ─────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Email to log in with (prompted when omitted)
    #[arg(long)]
    pub email: Option<String>,
}

#[derive(Debug, Args)]
pub struct RolesArgs {
    #[command(subcommand)]
    pub command: RolesCommand,
}

#[derive(Debug, Subcommand)]
pub enum RolesCommand {
    /// List roles
    List,

    /// Create a role
    Create {
        name: String,

        #[arg(long)]
        description: Option<String>,

        /// Permission key (repeatable)
        #[arg(long = "permission", short = 'P')]
        permissions: Vec<String>,
    },

    /// Delete a role by id
    Delete { id: String },
}

#[derive(Debug, Args)]
pub struct UsersArgs {
    #[command(subcommand)]
    pub command: UsersCommand,
}

#[derive(Debug, Subcommand)]
pub enum UsersCommand {
    /// List back-office users
    List,
}

#[derive(Debug, Args)]
pub struct PropertiesArgs {
    #[command(subcommand)]
    pub command: PropertiesCommand,
}

#[derive(Debug, Subcommand)]
pub enum PropertiesCommand {
    /// List properties
    List,
}

#[derive(Debug, Args)]
pub struct ListingsArgs {
    #[command(subcommand)]
    pub command: ListingsCommand,
}

#[derive(Debug, Subcommand)]
pub enum ListingsCommand {
    /// List scraped listings
    List,
}

#[derive(Debug, Args)]
pub struct ProsArgs {
    #[command(subcommand)]
    pub command: ProsCommand,
}

#[derive(Debug, Subcommand)]
pub enum ProsCommand {
    /// List professional profiles
    List,

    /// Approve or reject a profile
    Review {
        id: String,

        /// Approve the profile
        #[arg(long, conflicts_with = "reject")]
        approve: bool,

        /// Reject the profile
        #[arg(long)]
        reject: bool,
    },
}

#[derive(Debug, Args)]
pub struct ScraperArgs {
    #[command(subcommand)]
    pub command: ScraperCommand,
}

#[derive(Debug, Subcommand)]
pub enum ScraperCommand {
    /// Show the last-known status of every site
    Status,

    /// Stream live status updates from the push channel
    Watch,

    /// Trigger a scraper run for one site
    Run { site: String },
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
