//! Authentication service: verifies administrator credentials and issues
//! bearer tokens for the catalog API.

pub mod config;
pub mod error;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod state;
pub mod validation;

pub use state::AppState;
