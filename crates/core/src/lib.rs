//! Franklin Core - Shared domain types.
//!
//! This crate provides the types used by every Franklin component:
//! - `server` - HTTP API for users and orders
//! - `cli` - Command-line tools for migrations, seeding and provisioning
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP clients. Database encoding is available behind the `postgres`
//! feature.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, validated user names and pagination windows

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
