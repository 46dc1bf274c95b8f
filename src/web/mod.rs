//! # HTTP Surface
//!
//! Router, handlers, view rendering and error pages for the dealership site.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod server;
pub mod state;
pub mod views;

pub use error::WebError;
pub use routes::build_router;
pub use server::start_server;
pub use state::AppState;
pub use views::{Chrome, MiniJinjaRenderer, Page, ViewRenderer};
