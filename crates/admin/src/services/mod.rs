//! Application services.
//!
//! The service layer owns the session state machine (`auth`) and the
//! paginated catalog fetch (`catalog`); route handlers stay thin.

pub mod auth;
pub mod catalog;
