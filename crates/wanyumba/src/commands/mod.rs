//! Command handlers, one module per domain.

pub mod listings;
pub mod properties;
pub mod pros;
pub mod roles;
pub mod scraper;
pub mod session;
pub mod users;

use wanyumba_core::Console;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Route a parsed command to its handler.
pub async fn dispatch(cmd: Command, console: &Console, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Login(args) => session::login(console, args, global).await,
        Command::Logout => session::logout(console, global).await,
        Command::Roles(args) => roles::handle(console, args, global).await,
        Command::Users(args) => users::handle(console, args, global).await,
        Command::Properties(args) => properties::handle(console, args, global).await,
        Command::Listings(args) => listings::handle(console, args, global).await,
        Command::Pros(args) => pros::handle(console, args, global).await,
        Command::Scraper(args) => scraper::handle(console, args, global).await,
        // Handled in main() before a console exists.
        Command::Completions(_) => Ok(()),
    }
}

/// Turn a container's rejected state into a CLI failure.
///
/// Fetch failures never escape the sync layer -- they land in the
/// container's error field. The CLI is the view: it renders that field as
/// its own failure.
pub(crate) fn container_error(error: Option<String>) -> Result<(), CliError> {
    match error {
        Some(message) => Err(CliError::Rejected { message }),
        None => Ok(()),
    }
}
