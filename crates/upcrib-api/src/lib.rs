//! HTTP client for the upCrib renovation backend.

pub mod client;
pub mod envelope;

pub use client::ApiClient;
pub use envelope::{ApiErrorBody, ApiResponse};
