//! Request handlers, one module per area of the site.

pub mod account;
pub mod health;
pub mod home;
pub mod inventory;
