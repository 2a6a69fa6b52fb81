//! Database module - MySQL implementations using SQLx
//!
//! This module provides the database access layer:
//! - Connection pool management and schema migrations
//! - The refresh token repository

pub mod connection;
pub mod mysql;

// Re-export commonly used types
pub use connection::{DatabasePool, PoolUsage};
pub use mysql::MySqlTokenRepository;
