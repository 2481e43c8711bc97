//! Property command handlers.

use tabled::Tabled;

use wanyumba_core::Console;
use wanyumba_core::model::Property;

use crate::cli::{GlobalOpts, PropertiesArgs, PropertiesCommand};
use crate::error::CliError;
use crate::output;

use super::container_error;

#[derive(Tabled)]
struct PropertyRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "Location")]
    location: String,
    #[tabled(rename = "Beds")]
    bedrooms: String,
    #[tabled(rename = "Status")]
    status: String,
}

impl From<&Property> for PropertyRow {
    fn from(p: &Property) -> Self {
        let price = match p.price {
            Some(amount) => format!(
                "{amount:.0} {}",
                p.currency.as_deref().unwrap_or("KES")
            ),
            None => String::new(),
        };
        Self {
            id: p.id.clone(),
            title: p.title.clone(),
            price,
            location: p.location.clone().unwrap_or_default(),
            bedrooms: p.bedrooms.map(|b| b.to_string()).unwrap_or_default(),
            status: p.status.to_string(),
        }
    }
}

pub async fn handle(
    console: &Console,
    args: PropertiesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        PropertiesCommand::List => {
            console.refresh_properties().await;
            let snap = console.store().properties_snapshot();
            container_error(snap.error)?;

            let out = output::render_list(&global.output, &snap.items, |p| PropertyRow::from(p));
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
