//! # Bookshelf Database Crate
//!
//! This crate acts as a high-level, application-specific interface to the
//! relational store holding users, books, roles and the authorship/borrow
//! link tables.
//!
//! ## Architectural Principles
//!
//! - **Adapter:** This crate encapsulates all database-specific logic. It
//!   provides a clean API to the rest of the application, hiding the
//!   underlying SQL.
//! - **Unit of work per call:** Reads borrow a pooled connection, writes run
//!   in their own transaction that is committed on success and rolled back on
//!   any failure. Nothing spans calls.
//! - **Asynchronous & Pooled:** All operations are asynchronous and share a
//!   `SqlitePool`.
//!
//! ## Public API
//!
//! - `connect` / `connect_in_memory`: build the connection pool.
//! - `init_schema`: apply the embedded migrations and seed the fixed roles.
//! - `disconnect`: close the pool on shutdown.
//! - `DbRepository`: every read and write the service performs.
//! - `DbError`: the specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod connection;
pub mod error;
pub mod repository;

// Re-export the key components to create a clean, public-facing API.
pub use connection::{connect, connect_in_memory, disconnect, init_schema, run_migrations, seed_roles};
pub use error::DbError;
pub use repository::DbRepository;
