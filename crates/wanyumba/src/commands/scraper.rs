//! Scraper monitoring handlers.
//!
//! `status` and `watch` activate the push channel: the subscription's
//! `full_status` resync populates the store, after which `watch` keeps
//! streaming incremental updates until interrupted.

use std::time::Duration;

use owo_colors::OwoColorize;
use tabled::Tabled;

use wanyumba_core::{Console, ScraperStatusMap, SiteStatus};

use crate::cli::{GlobalOpts, ScraperArgs, ScraperCommand};
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Clone, serde::Serialize, Tabled)]
struct SiteRow {
    #[tabled(rename = "Site")]
    site: String,
    #[tabled(rename = "Phase")]
    phase: String,
    #[tabled(rename = "Listings")]
    listings: String,
    #[tabled(rename = "Started")]
    started: String,
    #[tabled(rename = "Message")]
    message: String,
}

impl SiteRow {
    fn new(site: &str, status: Option<&SiteStatus>) -> Self {
        match status {
            Some(s) => Self {
                site: site.to_owned(),
                phase: s.phase.clone().unwrap_or_else(|| "unknown".into()),
                listings: s.listings_found.map(|n| n.to_string()).unwrap_or_default(),
                started: s.started_at.clone().unwrap_or_default(),
                message: s.message.clone().unwrap_or_default(),
            },
            None => Self {
                site: site.to_owned(),
                phase: "offline".into(),
                listings: String::new(),
                started: String::new(),
                message: String::new(),
            },
        }
    }
}

fn rows(map: &ScraperStatusMap) -> Vec<SiteRow> {
    let mut sites: Vec<&String> = map.keys().collect();
    sites.sort();
    sites
        .into_iter()
        .map(|site| SiteRow::new(site, map.get(site).and_then(Option::as_ref)))
        .collect()
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    console: &Console,
    args: ScraperArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        ScraperCommand::Status => {
            console.connect().await?;

            // Wait for the post-subscription resync to land; an empty
            // table after the timeout just means no scraper has reported.
            let mut rx = console.store().subscribe_scraper_status();
            let _ = tokio::time::timeout(Duration::from_secs(5), rx.changed()).await;

            let map = console.store().scraper_status();
            let table = rows(&map);
            let out = output::render_list(&global.output, &table, Clone::clone);
            output::print_output(&out, global.quiet);

            console.disconnect().await;
            Ok(())
        }

        ScraperCommand::Watch => {
            console.connect().await?;
            let mut rx = console.store().subscribe_scraper_status();

            if !global.quiet {
                eprintln!("Watching scraper status (Ctrl-C to stop)");
            }

            loop {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => break,
                    changed = rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let map = rx.borrow_and_update().clone();
                        print_update(&map);
                    }
                }
            }

            console.disconnect().await;
            Ok(())
        }

        ScraperCommand::Run { site } => {
            console.trigger_scrape(&site).await?;

            if !global.quiet {
                eprintln!("Scrape triggered for {}", site.to_lowercase());
            }
            Ok(())
        }
    }
}

/// One line per site on every update, colored by phase.
fn print_update(map: &ScraperStatusMap) {
    let now = chrono::Utc::now().format("%H:%M:%S");
    for row in rows(map) {
        let phase = match row.phase.as_str() {
            "running" => row.phase.green().to_string(),
            "failed" => row.phase.red().to_string(),
            "offline" => row.phase.dimmed().to_string(),
            _ => row.phase.clone(),
        };
        println!(
            "{now}  {:<12} {phase:<10} {:>8} {}",
            row.site, row.listings, row.message
        );
    }
}
