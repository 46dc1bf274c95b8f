//! Repository traits and their PostgreSQL implementations.

pub mod account;
pub mod inventory;
pub mod session;

pub use account::{AccountRepository, SqlxAccountRepository};
pub use inventory::{InventoryRepository, SqlxInventoryRepository};
pub use session::{SessionRepository, SqlxSessionRepository};
