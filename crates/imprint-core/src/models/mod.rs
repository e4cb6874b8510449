//! Domain models

pub mod order;
pub mod staged;

pub use order::{Order, OrderAdminResponse, OrderResponse, OrderStatus, PrintMode};
pub use staged::StagedFileEntry;
