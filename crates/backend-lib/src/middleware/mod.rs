// ============================
// clawcontrol-backend-lib/src/middleware/mod.rs
// ============================
//! Request middleware.

pub mod rate_limit;

pub use rate_limit::{rate_limit, RateLimitEntry};
