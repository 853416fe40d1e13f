//! Core domain types and utilities for the lantern dashboard client.
//!
//! This crate provides the foundational types and error handling shared
//! by the session and guard crates of the lantern content-management
//! dashboard front-end.

pub mod error;
pub mod id;

pub use error::Result;
pub use id::UserId;
