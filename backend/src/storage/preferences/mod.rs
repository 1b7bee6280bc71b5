//! # Preferences Module
//!
//! Ephemeral key-value stores backing the draft cache.

pub mod file_store;
pub mod memory_store;

pub use file_store::FilePreferences;
pub use memory_store::MemoryPreferences;
