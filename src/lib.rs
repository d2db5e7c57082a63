//! # Corkboard
//!
//! A collaborative Kanban board server, usable both as a standalone binary
//! and as a library.
//!
//! Boards hold ordered lists, lists hold ordered cards, and every mutation
//! appends an entry to the board's audit trail.
//!
//! ## Library Usage
//!
//! ```toml
//! [dependencies]
//! corkboard = { version = "0.0.1", default-features = false }
//! ```
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use corkboard::config::ServerConfig;
//! use corkboard::server::{AppState, create_router};
//! use corkboard::store::{SqliteStore, Store};
//!
//! let config = ServerConfig::default();
//! let store = SqliteStore::new(config.db_path()).unwrap();
//! store.initialize().unwrap();
//!
//! let state = Arc::new(AppState::new(Arc::new(store), &config));
//! let router = create_router(state);
//! // Serve with axum...
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` (default): Includes CLI module. Disable with `default-features = false`.

pub mod auth;
#[cfg(feature = "cli")]
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod server;
pub mod service;
pub mod store;
pub mod types;
