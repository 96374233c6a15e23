//! Service layer for the lobby broker
//!
//! This module contains the main application state and startup/shutdown
//! coordination for the production service.

pub mod app;

pub use app::{AppState, ServiceError};
