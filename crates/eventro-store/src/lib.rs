//! # eventro-store
//!
//! SQLite persistence for Eventro:
//!
//! - r2d2 connection pool with WAL mode and foreign keys enforced
//! - Embedded schema migrations with a `schema_version` table
//! - Stateless repositories (every method takes `&Connection`)
//! - A transactional [`Store`] facade — multi-row writes never expose
//!   partial state

#![deny(unsafe_code)]

pub mod connection;
pub mod errors;
pub mod migrations;
pub mod repositories;
pub mod row_types;
pub mod store;

pub use connection::{new_file, new_in_memory, ConnectionConfig, ConnectionPool, PooledConnection};
pub use errors::{Result, StoreError};
pub use migrations::run_migrations;
pub use store::Store;
