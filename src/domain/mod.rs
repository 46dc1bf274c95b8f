//! Domain types shared by storage, services and views.

pub mod id;
pub mod inventory;

pub use id::{AccountId, ClassificationId, InventoryId};
pub use inventory::{Classification, Vehicle};
