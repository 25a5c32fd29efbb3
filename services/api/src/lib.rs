//! Catalog API: public car listings plus authenticated listing management
//! and photo uploads.

pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod state;
pub mod uploads;
pub mod validation;

pub use state::AppState;
