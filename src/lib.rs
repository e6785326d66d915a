//! Depot Warehouse Borrowing Management System
//!
//! A Rust implementation of the Depot warehouse-borrowing server, providing
//! a REST JSON API for the borrowing lifecycle: requests, approvals, the
//! borrow/return transaction ledger, condition tracking and damage reports.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
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
