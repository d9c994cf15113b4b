//! Core types for Franklin.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod name;
pub mod page;

pub use id::*;
pub use name::{UserName, UserNameError};
pub use page::Page;
