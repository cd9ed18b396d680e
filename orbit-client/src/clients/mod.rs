//! Typed sub-clients over the platform's HTTP surface.

mod action;
mod inventory;
mod stream;

pub use action::{ActionClient, ActionStatus};
pub use inventory::InventoryClient;
pub use stream::StreamClient;
