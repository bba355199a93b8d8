//! # Workboard Shared Library
//!
//! Shared types, persistence and business logic used by the Workboard API
//! server.
//!
//! ## Module Organization
//!
//! - `models`: Database models (users, boards, tasks) and their CRUD operations
//! - `auth`: Password hashing, JWT tokens, request authentication, ownership checks
//! - `db`: Connection pool and migrations
//! - `services`: Board/task reconciliation and read-only board queries

pub mod auth;
pub mod db;
pub mod models;
pub mod services;

/// Current version of the Workboard shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
