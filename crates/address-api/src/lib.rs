//! Address API library
//!
//! Router, handlers and configuration for the address book REST service.

pub mod config;
pub mod error;
pub mod routes;
pub mod server;
pub mod state;

pub use config::Config;
pub use error::{ApiError, AppError, Result};
pub use server::{cors_layer, create_router, start_server};
pub use state::AppState;
