//! Data models for the admin application.

pub mod session;

pub use session::{CurrentUser, keys as session_keys};
