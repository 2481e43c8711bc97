//! User command handlers.

use tabled::Tabled;

use wanyumba_core::Console;
use wanyumba_core::model::AdminUser;

use crate::cli::{GlobalOpts, UsersArgs, UsersCommand};
use crate::error::CliError;
use crate::output;

use super::container_error;

#[derive(Tabled)]
struct UserRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Role")]
    role: String,
    #[tabled(rename = "Active")]
    active: String,
}

impl From<&AdminUser> for UserRow {
    fn from(u: &AdminUser) -> Self {
        Self {
            id: u.id.clone(),
            email: u.email.clone(),
            name: u.name.clone().unwrap_or_default(),
            role: u.role.clone().unwrap_or_default(),
            active: if u.active { "yes".into() } else { "no".into() },
        }
    }
}

pub async fn handle(console: &Console, args: UsersArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        UsersCommand::List => {
            console.refresh_users().await;
            let snap = console.store().users_snapshot();
            container_error(snap.error)?;

            let out = output::render_list(&global.output, &snap.items, |u| UserRow::from(u));
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
