pub mod config;
pub mod error;
pub mod history;
pub mod question;
pub mod repository;
pub mod session;
pub mod tracking;

// Re-export common error type
pub use error::{Result, UpcribError};
