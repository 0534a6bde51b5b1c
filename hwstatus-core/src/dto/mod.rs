//! Data Transfer Objects
//!
//! Shapes of the payloads exchanged with the review API.

pub mod status;

pub use status::{ResponseError, StatusResponse, validate_response};
