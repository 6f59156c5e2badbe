//! # Bookshelf Core Types
//!
//! The shared vocabulary of the workspace: persisted entities, the inbound
//! schemas they are created from, and the composed detail views returned to
//! clients. As a leaf crate it knows nothing about the database pool or HTTP.

pub mod entities;
pub mod enums;
pub mod error;
pub mod schemas;
pub mod validation;

// Re-export the core types to provide a clean public API.
pub use entities::{Book, BookAuthor, BookBorrow, Role, User};
pub use enums::{RoleKind, DEFAULT_ROLE};
pub use error::{FieldIssue, Problem, ValidationError};
pub use schemas::{BookDetail, BookInput, LinkInput, UserDetail, UserInput};
pub use validation::{FieldKind, FieldSpec, Schema};
