//! HTTP inbound adapter exposing the REST endpoints.
//!
//! Handlers translate requests into calls on the driving ports held by
//! [`state::HttpState`] and map domain errors onto HTTP responses.

pub mod attributes;
pub mod error;
pub mod health;
pub mod recipes;
pub mod recipes_dto;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod validation;

pub use error::ApiResult;
