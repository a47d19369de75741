//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL-backed stores using Diesel
//! - **memory**: process-local stores for development and tests
//! - **media**: filesystem storage for uploaded images
//! - **security**: password hashing
//!
//! Adapters translate between domain types and infrastructure
//! representations and contain no business logic.

pub mod media;
pub mod memory;
pub mod persistence;
pub mod security;
