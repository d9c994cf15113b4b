//! Franklin orders API.
//!
//! Users sign up with a name and password and manage their orders over a
//! JSON API; every protected request carries HTTP Basic credentials.
//!
//! This crate provides the server as a library so it can be tested in
//! process and reused by the CLI.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

pub use config::FranklinConfig;
pub use routes::app;
pub use state::AppState;
