//! Client-side synchronization layer for the Wanyumba admin console.
//!
//! Keeps local state consistent with the remote admin API through two
//! paths that consumers never need to tell apart:
//!
//! - **pull**: request handlers wrap one HTTP call each and drive a state
//!   container's `pending → fulfilled | rejected` lifecycle;
//! - **push**: the channel bridge routes decoded scraper-status messages
//!   into the same store.
//!
//! Ordering is last-write-wins by arrival: actions apply atomically in
//! the order their triggering events resolve, with no sequencing guards.

mod bridge;
mod config;
mod console;
mod error;
mod fetch;
pub mod model;
pub mod store;

pub use config::ConsoleConfig;
pub use console::Console;
pub use error::CoreError;
pub use store::{ContainerSnapshot, DataStore, ScraperStatusMap};

pub use wanyumba_api::{PushMessage, SiteStatus, TokenStore};
