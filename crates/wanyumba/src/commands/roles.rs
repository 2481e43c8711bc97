//! Role command handlers.

use tabled::Tabled;

use wanyumba_core::Console;
use wanyumba_core::model::{NewRole, Role};

use crate::cli::{GlobalOpts, RolesArgs, RolesCommand};
use crate::error::CliError;
use crate::output;

use super::container_error;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct RoleRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "Permissions")]
    permissions: String,
}

impl From<&Role> for RoleRow {
    fn from(r: &Role) -> Self {
        Self {
            id: r.id.clone(),
            name: r.name.clone(),
            description: r.description.clone().unwrap_or_default(),
            permissions: r.permissions.join(", "),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(console: &Console, args: RolesArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        RolesCommand::List => {
            console.refresh_roles().await;
            let snap = console.store().roles_snapshot();
            container_error(snap.error)?;

            let out = output::render_list(&global.output, &snap.items, |r| RoleRow::from(r));
            output::print_output(&out, global.quiet);
            Ok(())
        }

        RolesCommand::Create {
            name,
            description,
            permissions,
        } => {
            let role = console
                .create_role(&NewRole {
                    name,
                    description,
                    permissions,
                })
                .await?;

            if !global.quiet {
                eprintln!("Role '{}' created ({})", role.name, role.id);
            }
            Ok(())
        }

        RolesCommand::Delete { id } => {
            console.delete_role(&id).await?;

            if !global.quiet {
                eprintln!("Role {id} deleted");
            }
            Ok(())
        }
    }
}
