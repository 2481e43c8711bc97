//! Professional-profile review handlers.

use tabled::Tabled;

use wanyumba_core::Console;
use wanyumba_core::model::{Professional, ReviewDecision};

use crate::cli::{GlobalOpts, ProsArgs, ProsCommand};
use crate::error::CliError;
use crate::output;

use super::container_error;

#[derive(Tabled)]
struct ProfessionalRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Profession")]
    profession: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Submitted")]
    submitted: String,
}

impl From<&Professional> for ProfessionalRow {
    fn from(p: &Professional) -> Self {
        Self {
            id: p.id.clone(),
            name: p.name.clone(),
            profession: p.profession.clone().unwrap_or_default(),
            status: p.review_status.to_string(),
            submitted: p
                .submitted_at
                .map(|t| t.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
        }
    }
}

pub async fn handle(console: &Console, args: ProsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ProsCommand::List => {
            console.refresh_professionals().await;
            let snap = console.store().professionals_snapshot();
            container_error(snap.error)?;

            let out = output::render_list(&global.output, &snap.items, |p| ProfessionalRow::from(p));
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ProsCommand::Review { id, approve, reject } => {
            let decision = match (approve, reject) {
                (true, false) => ReviewDecision::Approve,
                (false, true) => ReviewDecision::Reject,
                _ => {
                    return Err(CliError::Validation {
                        field: "decision".into(),
                        reason: "pass exactly one of --approve or --reject".into(),
                    });
                }
            };

            console.review_professional(&id, decision).await?;

            if !global.quiet {
                let verdict = match decision {
                    ReviewDecision::Approve => "approved",
                    ReviewDecision::Reject => "rejected",
                };
                eprintln!("Profile {id} {verdict}");
            }
            Ok(())
        }
    }
}
