//! Tubely API Library
//!
//! HTTP handlers, authentication, the upload pipeline services and application setup.

pub mod auth;
pub mod error;
mod handlers;
pub mod services;
pub mod setup;
pub mod state;
pub mod telemetry;
pub mod utils;

// Re-exports
pub use error::{ErrorResponse, HttpAppError};
pub use services::{LinkSigner, VideoUploadService};
pub use state::AppState;
