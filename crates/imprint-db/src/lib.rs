//! Database repository for the order record store.
//!
//! The database is used as a plain keyed record store: one row per confirmed
//! order, inserted at confirmation and mutated only by administrative
//! actions. Repositories own a `PgPool` clone and are passed explicitly to
//! every component needing them.

pub mod orders;

pub use orders::{OrderFiles, OrderRepository};
