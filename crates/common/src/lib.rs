// ================
// common/src/lib.rs
// ================
//! Shared types for the `ClawControl` backend: the records kept in the
//! document store and the request/response bodies of the HTTP API.

pub mod api;
pub mod entities;

pub use entities::*;
