// ── Client-side state store ──
//
// State containers with request lifecycle flags, the process-wide
// DataStore that owns them, and the scraper status sub-tree.

mod container;
mod data_store;

pub use container::ContainerSnapshot;
pub use data_store::{DataStore, ScraperStatusMap};
