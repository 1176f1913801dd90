//! Souk core library.
//!
//! Shared types used by the admin application and the CLI. This crate is
//! intentionally free of I/O: it holds the typed ids for backend documents,
//! the validated [`Email`] type, and the [`Price`] type.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::{
    AccountId, CategoryId, Email, EmailError, FileId, Price, PriceError, ProductId, ProfileId,
    SessionId,
};
