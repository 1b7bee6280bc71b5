//! # Storage Module
//!
//! Persistence for the civil registry intake core. Two tiers with different
//! lifetimes:
//!
//! - **sqlite**: the durable record store. Committed records live here and
//!   outlive the session.
//! - **preferences**: the ephemeral key-value store holding the in-progress
//!   draft until it is committed or reset.
//!
//! The domain layer only sees the traits in [`traits`], so either tier can be
//! swapped (or faked in tests) without touching the services.

pub mod preferences;
pub mod sqlite;
pub mod traits;

pub use preferences::{FilePreferences, MemoryPreferences};
pub use sqlite::{CitizenRepository, DbConnection};
pub use traits::{CitizenStorage, KeyValueStorage};
