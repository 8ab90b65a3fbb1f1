//! Bookshelf server
//!
//! A REST JSON API managing users and the books they own, persisted in
//! PostgreSQL through interchangeable storage adapters.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod mapper;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
