// ── Domain model ──
//
// Canonical representations of the admin API's entities. Wire names are
// camelCase with `_id` aliases (the API fronts a document store); identity
// is the server-issued `id` string -- uniqueness is enforced remotely, not
// re-validated here.

pub mod listing;
pub mod professional;
pub mod property;
pub mod role;
pub mod user;

// ── Re-exports ──────────────────────────────────────────────────────
// Flat access: `use wanyumba_core::model::*` gives you everything.

pub use listing::{Listing, ListingStatus};
pub use professional::{Professional, ReviewDecision, ReviewStatus};
pub use property::{Property, PropertyStatus};
pub use role::{NewRole, Role};
pub use user::AdminUser;

// Scraper status payloads cross the push channel verbatim; the wire type
// is the domain type.
pub use wanyumba_api::SiteStatus;
