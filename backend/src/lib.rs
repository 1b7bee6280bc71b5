//! # Registro Civil Backend
//!
//! Non-UI core of the civil registry intake application. A clerk types a
//! birth date and three name parts; the backend validates them, derives a
//! record code, renders it as a QR image, caches the draft, and on request
//! commits the finished record to the SQLite record store.
//!
//! ## Architecture
//!
//! ```text
//! Presentation layer (any UI toolkit)
//!     ↓
//! IO Layer (commands, DTO mappers)
//!     ↓
//! Domain Layer (validation, code + QR generation, intake session)
//!     ↓
//! Storage Layer (SQLite record store, key-value draft cache)
//! ```
//!
//! [`initialize_backend`] opens every store exactly once and injects the
//! handles into the services; there are no global connections.

pub mod config;
pub mod domain;
pub mod io;
pub mod logging;
pub mod storage;

use anyhow::{Context, Result};
use log::info;
use std::fs;
use std::sync::Arc;

use crate::config::RegistryConfig;
use crate::domain::{CitizenService, DraftService, IntakeSession, QrEncoder};
use crate::storage::{CitizenRepository, DbConnection, FilePreferences};

/// Main application state shared with the presentation layer
#[derive(Clone)]
pub struct AppState {
    pub config: RegistryConfig,
    pub session: Arc<IntakeSession>,
    db: DbConnection,
    preferences: FilePreferences,
}

impl AppState {
    /// Flush the draft cache to disk and close the record store
    pub async fn shutdown(&self) -> Result<()> {
        info!("Shutting down backend");
        self.preferences.sync().await?;
        self.db.close().await;
        Ok(())
    }
}

/// Initialize the backend with all required services.
///
/// Installs the logger at the configured level first; a config that fails
/// validation stops startup before any store is opened.
pub async fn initialize_backend(config: RegistryConfig) -> Result<AppState> {
    config.validate()?;
    logging::init_logging(config.level_filter()?);
    fs::create_dir_all(&config.data_directory).with_context(|| {
        format!("Failed to create data directory {}", config.data_directory.display())
    })?;

    info!("Setting up record store");
    let db = DbConnection::open(config.database_path()).await?;

    info!("Setting up draft cache");
    let preferences = FilePreferences::open(config.draft_path())?;

    info!("Setting up domain model");
    let citizens = CitizenService::new(Arc::new(CitizenRepository::new(db.clone())));
    let drafts = DraftService::new(Arc::new(preferences.clone()));
    let session = IntakeSession::new(drafts, citizens, QrEncoder::new(config.qr_size));
    session.restore()?;

    info!("Setting up application state");
    Ok(AppState {
        config,
        session: Arc::new(session),
        db,
        preferences,
    })
}
