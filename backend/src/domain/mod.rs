//! # Domain Module
//!
//! Business logic of the civil registry intake core: turning four typed
//! fields into a validated, coded, QR-tagged record and committing it.
//!
//! It knows nothing about the UI toolkit or the concrete stores; storage is
//! reached only through the traits in [`crate::storage::traits`].
//!
//! ## Module Organization
//!
//! - **validation**: presence and `DD/MM/YYYY` checks on the form
//! - **code_generator**: initials + date code derivation
//! - **qr_encoder**: QR matrix generation and rasterization
//! - **image_codec**: PNG + Base64 text form of a QR raster
//! - **draft_service**: cache of the in-progress form in the key-value store
//! - **citizen_service**: gateway to the durable record store
//! - **intake_service**: the session tying it all together (generate, commit, reset)
//!
//! ## Business Rules
//!
//! - All four fields are required before a code can be generated
//! - Birth dates are `DD/MM/YYYY` with years 1900 to 2024
//! - Editing any field invalidates a previously generated code and image
//! - A record is only committed with a code and QR image present
//! - The draft cache is cleared only after the durable insert succeeds

pub mod citizen_service;
pub mod code_generator;
pub mod draft_service;
pub mod image_codec;
pub mod intake_service;
pub mod models;
pub mod qr_encoder;
pub mod validation;

pub use citizen_service::CitizenService;
pub use code_generator::generate_code;
pub use draft_service::DraftService;
pub use intake_service::{GeneratedCode, IntakeSession};
pub use qr_encoder::{QrEncoder, QrRaster};
