//! Scraped-listing command handlers.

use tabled::Tabled;

use wanyumba_core::Console;
use wanyumba_core::model::Listing;

use crate::cli::{GlobalOpts, ListingsArgs, ListingsCommand};
use crate::error::CliError;
use crate::output;

use super::container_error;

#[derive(Tabled)]
struct ListingRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Site")]
    site: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Scraped")]
    scraped: String,
}

impl From<&Listing> for ListingRow {
    fn from(l: &Listing) -> Self {
        Self {
            id: l.id.clone(),
            site: l.source_site.clone(),
            title: l.title.clone().unwrap_or_default(),
            price: l.price.map(|p| format!("{p:.0}")).unwrap_or_default(),
            status: l.status.to_string(),
            scraped: l
                .scraped_at
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default(),
        }
    }
}

pub async fn handle(
    console: &Console,
    args: ListingsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        ListingsCommand::List => {
            console.refresh_listings().await;
            let snap = console.store().listings_snapshot();
            container_error(snap.error)?;

            let out = output::render_list(&global.output, &snap.items, |l| ListingRow::from(l));
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
