//! # Workboard API Server Library
//!
//! HTTP surface of Workboard: users, boards with nested task edits, tasks
//! and JWT authentication.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration from environment variables
//! - `error`: Error type and HTTP response mapping
//! - `extract`: Body, path and query extractors rejecting with `ApiError`
//! - `middleware`: Security headers
//! - `routes`: Route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod routes;
