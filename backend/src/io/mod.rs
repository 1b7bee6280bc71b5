//! # IO Module
//!
//! Boundary between a presentation layer and the domain. Each command takes
//! the shared [`crate::AppState`], calls into the intake session and returns
//! a DTO from the `shared` crate. Errors come back as the user-facing message
//! to show inline; nothing in this layer panics.

pub mod commands;
pub mod mappers;

pub use commands::*;
