pub mod config;
pub mod entitlements;
pub mod generate;
pub mod health;
pub mod history;
pub mod questions;
pub mod session;
pub mod upload;
pub mod utils;
