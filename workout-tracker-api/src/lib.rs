//! # workout-tracker-api
//!
//! Shared API types for the workout-tracker service.
//! This crate is designed to be WASM-compatible and can be used by both
//! the backend and browser or native clients.
//!
//! ## Features
//!
//! - Request DTOs (`CredentialsRequest`)
//! - Response DTOs (`AccessTokenResponse`, `RegisterResponse`, `UserResponse`)
//! - Error response format (`ErrorResponse`)
//! - Generic response wrapper (`AppResponse`)
//!
//! ## Example
//!
//! ```rust
//! use workout_tracker_api::CredentialsRequest;
//!
//! let request = CredentialsRequest {
//!     name: "alice".to_string(),
//!     password: "pw123456".to_string(),
//! };
//! ```

pub mod error;
pub mod requests;
pub mod responses;
pub mod result;

// Re-exports for convenient access
pub use error::ErrorResponse;
pub use requests::*;
pub use responses::*;
pub use result::{AppResponse, StatusCode};
