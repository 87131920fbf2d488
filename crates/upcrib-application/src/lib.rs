//! Application layer for upCrib.
//!
//! This crate provides the session workflow built on the API client and the
//! infrastructure layer: the generic polling engine, per-concern workflow
//! handles, and the background generation-tracking service.

pub mod background;
pub mod poller;
pub mod questions;
pub mod session;
pub mod upload;

mod state;

pub use background::BackgroundPollingService;
pub use poller::{PollSnapshot, Poller, PollerState, StopReason, StopWhen};
pub use state::OpState;
pub use questions::QuestionFlow;
pub use session::SessionHandle;
pub use upload::ImageUpload;
