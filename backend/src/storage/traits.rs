//! # Storage Traits
//!
//! Storage abstractions used by the domain layer: the durable record store
//! and the ephemeral key-value store that holds the draft form.

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::models::{DomainCitizen, NewCitizen};

/// Durable store of committed citizen records.
///
/// Only `insert_citizen`, `list_citizens_by_code` and `delete_all_citizens`
/// are used by the intake workflow; update and delete are available to
/// future presentation features.
#[async_trait]
pub trait CitizenStorage: Send + Sync {
    /// Insert a record and return the id the store assigned to it
    async fn insert_citizen(&self, citizen: &NewCitizen) -> Result<i64>;

    /// Overwrite every column of the record with the same id.
    /// Returns false if no such record exists.
    async fn update_citizen(&self, citizen: &DomainCitizen) -> Result<bool>;

    /// Returns false if no record had this id
    async fn delete_citizen(&self, id: i64) -> Result<bool>;

    /// All records, ascending by generated code
    async fn list_citizens_by_code(&self) -> Result<Vec<DomainCitizen>>;

    /// Remove every record and return how many were removed
    async fn delete_all_citizens(&self) -> Result<u64>;
}

/// String-to-string store with a single namespace.
///
/// Mutations are visible to the next read in this process as soon as the call
/// returns. Implementations that persist to disk may do so in the background,
/// so a crash right after a mutation can lose it.
pub trait KeyValueStorage: Send + Sync {
    fn get_string(&self, key: &str) -> Result<Option<String>>;

    /// Set several keys in one edit
    fn put_strings(&self, entries: &[(&str, &str)]) -> Result<()>;

    /// Remove the given keys; missing keys are ignored
    fn remove_keys(&self, keys: &[&str]) -> Result<()>;
}
