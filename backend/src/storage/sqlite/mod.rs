//! # SQLite Storage Module
//!
//! Durable record store for committed civil-registry records.
//!
//! - **connection.rs** - database handle, opened once and injected
//! - **citizen_repository.rs** - `ciudadano` table operations

pub mod citizen_repository;
pub mod connection;

pub use citizen_repository::CitizenRepository;
pub use connection::DbConnection;
