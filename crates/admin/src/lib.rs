//! Souk admin library.
//!
//! This crate provides the admin application as a library, allowing it to
//! be tested and reused (the CLI drives the same backend client and auth
//! service).

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod backend;
pub mod config;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
