//! Configuration module
//!
//! Loads the kiosk configuration: where the roster, saves, and question
//! banks live, and which admin codes may redeem tickets.

pub mod loader;
pub mod schema;

pub use loader::{load, load_or_default};
pub use schema::{BankPaths, DEFAULT_ADMIN_CODES, RaffleConfig};
