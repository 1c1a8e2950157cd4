//! REST backend access
//!
//! - `client`: authenticated JSON / binary / multipart requests
//! - `resources`: importable resources and their Excel endpoints
//! - `options`: list endpoints exposed as search option providers

pub mod client;
pub mod options;
pub mod resources;

pub use client::{ApiClient, QueryParams};
pub use options::{render_template, RemoteOptionSource};
pub use resources::{outstanding_balances, ImportTarget, ResourceBackend};
