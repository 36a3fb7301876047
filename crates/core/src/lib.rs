//! Core types and error handling for the phpup ecosystem.
//!
//! This crate holds the pieces every other phpup crate builds on: the
//! error taxonomy, the shared tool data model, and the declarative
//! registry mapping canonical tool names to installation metadata.

pub mod error;
pub mod registry;
pub mod tools;

pub use error::{Error, Result};
