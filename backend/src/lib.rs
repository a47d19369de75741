//! Recipe management backend: accounts, recipes, tags, ingredients and
//! recipe images behind a session-authenticated REST API.
//!
//! The crate is laid out hexagonally. [`domain`] holds the model, ports and
//! use-cases; [`inbound`] adapts HTTP onto the driving ports; [`outbound`]
//! implements the driven ports over PostgreSQL, memory and the filesystem.

pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use middleware::Trace;
