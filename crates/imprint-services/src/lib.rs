//! Imprint background services: staged-upload retention sweeping and
//! fire-and-forget order notifications.

pub mod notifier;
pub mod sweeper;

pub use notifier::OrderNotifier;
pub use sweeper::RetentionSweeper;
