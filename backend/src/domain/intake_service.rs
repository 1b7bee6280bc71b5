//! # Intake Session
//!
//! Drives one intake form from first keystroke to committed record:
//!
//! ```text
//! edit_field ──> generate ──> (draft cached) ──> commit ──> Committed
//!     ^              │                             │
//!     └── any edit clears code + QR                └──> Failed (draft kept)
//! ```
//!
//! Field edits and `generate` are synchronous. `commit`, `list_records` and
//! `delete_all_records` await the record store and are meant to run off the
//! interactive thread; the session is `Send + Sync` and is shared through an
//! `Arc`.
//!
//! ## Commit ordering
//!
//! 1. Only one commit may be in flight; a second call fails with
//!    [`IntakeError::CommitInProgress`] without touching either store.
//! 2. Without a generated code and QR image the store is never called.
//! 3. The durable insert completes first. Only then is the draft cache
//!    cleared and the form reset. A failed insert leaves both untouched.
//! 4. Edits made while the insert runs are kept. The form is reset only if it
//!    still holds the committed record; a draft generated meanwhile stays
//!    cached.
//! 5. A commit future dropped before the insert settles leaves the session
//!    `Failed`, since the outcome of the insert is unknown.

use log::{debug, error, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use shared::FormField;

use crate::domain::citizen_service::CitizenService;
use crate::domain::code_generator::generate_code;
use crate::domain::draft_service::DraftService;
use crate::domain::image_codec;
use crate::domain::models::{
    CommitState, DomainCitizen, DraftFormState, IntakeError, NewCitizen,
};
use crate::domain::qr_encoder::{QrEncoder, QrRaster};
use crate::domain::validation::{accepts_birth_date_input, validate_form};

/// Result of a successful generate action
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedCode {
    pub code: String,
    pub qr_image: QrRaster,
    /// PNG + Base64 of `qr_image`
    pub qr_png_base64: String,
}

pub struct IntakeSession {
    form: Mutex<DraftFormState>,
    commit_state: Mutex<CommitState>,
    inline_error: Mutex<Option<String>>,
    commit_in_flight: AtomicBool,
    drafts: DraftService,
    citizens: CitizenService,
    encoder: QrEncoder,
}

const COMMIT_INTERRUPTED: &str = "Commit interrupted before the record store answered";

/// Holds the single commit slot until dropped
struct CommitGuard<'a> {
    session: &'a IntakeSession,
}

impl<'a> CommitGuard<'a> {
    fn acquire(session: &'a IntakeSession) -> Option<Self> {
        session
            .commit_in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { session })
    }
}

impl Drop for CommitGuard<'_> {
    fn drop(&mut self) {
        {
            let mut state = self.session.lock_commit_state();
            if *state == CommitState::Committing {
                warn!("{}", COMMIT_INTERRUPTED);
                *state = CommitState::Failed {
                    reason: COMMIT_INTERRUPTED.to_string(),
                };
            }
        }
        self.session.commit_in_flight.store(false, Ordering::Release);
    }
}

impl IntakeSession {
    pub fn new(drafts: DraftService, citizens: CitizenService, encoder: QrEncoder) -> Self {
        Self {
            form: Mutex::new(DraftFormState::default()),
            commit_state: Mutex::new(CommitState::Idle),
            inline_error: Mutex::new(None),
            commit_in_flight: AtomicBool::new(false),
            drafts,
            citizens,
            encoder,
        }
    }

    fn lock_form(&self) -> MutexGuard<'_, DraftFormState> {
        self.form.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_commit_state(&self) -> MutexGuard<'_, CommitState> {
        self.commit_state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_inline_error(&self, message: Option<String>) {
        *self.inline_error.lock().unwrap_or_else(PoisonError::into_inner) = message;
    }

    /// Message of the last failed generate or commit, until the next edit
    pub fn inline_error(&self) -> Option<String> {
        self.inline_error.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Current form contents
    pub fn form(&self) -> DraftFormState {
        self.lock_form().clone()
    }

    pub fn commit_state(&self) -> CommitState {
        self.lock_commit_state().clone()
    }

    pub fn is_commit_in_flight(&self) -> bool {
        self.commit_in_flight.load(Ordering::Acquire)
    }

    /// Load the cached draft into the form.
    ///
    /// A cached code whose image is missing or unreadable gets its image
    /// regenerated; if that fails the code is dropped as well.
    pub fn restore(&self) -> anyhow::Result<DraftFormState> {
        let mut draft = self.drafts.load_draft()?;

        if draft.generated_code.is_empty() {
            draft.qr_image = None;
        } else if draft.qr_image.is_none() {
            match self.render(&draft.generated_code) {
                Ok((raster, encoded)) => {
                    info!("Regenerated QR image for cached code {}", draft.generated_code);
                    let code = std::mem::take(&mut draft.generated_code);
                    draft.set_generated(code, raster, encoded);
                }
                Err(e) => {
                    warn!("Dropping cached code {}: {}", draft.generated_code, e);
                    draft.clear_generated();
                }
            }
        }

        *self.lock_form() = draft.clone();
        if draft.is_blank() {
            debug!("No cached draft to restore");
        } else {
            info!("Restored cached draft (code: '{}')", draft.generated_code);
        }
        Ok(draft)
    }

    /// Apply a field edit from the presentation layer.
    ///
    /// Birth-date edits that are longer than 10 characters or contain
    /// anything besides digits and '/' are ignored and `false` is returned.
    /// Names are stored upper-cased. An accepted edit drops the generated
    /// code and QR image and clears any commit acknowledgment.
    pub fn edit_field(&self, field: FormField, value: &str) -> bool {
        let value = match field {
            FormField::BirthDate => {
                if !accepts_birth_date_input(value) {
                    debug!("Rejected birth date input '{}'", value);
                    return false;
                }
                value.to_string()
            }
            _ => value.to_uppercase(),
        };

        {
            let mut form = self.lock_form();
            *form.field_mut(field) = value;
            form.clear_generated();
        }
        self.set_inline_error(None);

        let mut state = self.lock_commit_state();
        if matches!(*state, CommitState::Committed { .. } | CommitState::Failed { .. }) {
            *state = CommitState::Idle;
        }
        true
    }

    /// Validate the form, derive its code, render the QR image and cache the
    /// draft. Caching failures are logged, never returned.
    pub fn generate(&self) -> Result<GeneratedCode, IntakeError> {
        let result = self.generate_inner();
        self.set_inline_error(result.as_ref().err().map(ToString::to_string));
        result
    }

    fn generate_inner(&self) -> Result<GeneratedCode, IntakeError> {
        let snapshot = {
            let mut form = self.lock_form();
            if let Err(e) = validate_form(&form) {
                debug!("Generate rejected: {}", e);
                return Err(e.into());
            }

            let code = generate_code(
                &form.paternal_surname,
                &form.maternal_surname,
                &form.given_name,
                &form.birth_date,
            );
            let (raster, encoded) = self.render(&code)?;

            form.set_generated(code, raster, encoded);
            form.clone()
        };

        if let Err(e) = self.drafts.save_draft(&snapshot) {
            warn!("Failed to cache draft for code {}: {:#}", snapshot.generated_code, e);
        }
        info!("Generated code {}", snapshot.generated_code);

        Ok(GeneratedCode {
            code: snapshot.generated_code,
            qr_image: snapshot.qr_image.ok_or(IntakeError::CodeNotGenerated)?,
            qr_png_base64: snapshot.qr_image_encoded,
        })
    }

    /// QR raster for `code` together with its PNG + Base64 text
    fn render(&self, code: &str) -> Result<(QrRaster, String), IntakeError> {
        let raster = self.encoder.encode(code)?;
        let encoded = image_codec::encode_png_base64(&raster)?;
        Ok((raster, encoded))
    }

    /// Persist the generated record, then clear the draft and reset the form
    pub async fn commit(&self) -> Result<i64, IntakeError> {
        let result = self.commit_inner().await;
        match &result {
            Err(IntakeError::CommitInProgress) => {}
            other => self.set_inline_error(other.as_ref().err().map(ToString::to_string)),
        }
        result
    }

    async fn commit_inner(&self) -> Result<i64, IntakeError> {
        let _guard = match CommitGuard::acquire(self) {
            Some(guard) => guard,
            None => {
                warn!("Commit rejected: another commit is in flight");
                return Err(IntakeError::CommitInProgress);
            }
        };

        let committed = {
            let form = self.lock_form();
            if !form.is_generated() {
                return Err(IntakeError::CodeNotGenerated);
            }
            form.clone()
        };
        let qr_image_encoded = if committed.qr_image_encoded.is_empty() {
            image_codec::serialize(committed.qr_image.as_ref())?
        } else {
            committed.qr_image_encoded.clone()
        };
        let citizen = NewCitizen {
            birth_date: committed.birth_date.clone(),
            paternal_surname: committed.paternal_surname.clone(),
            maternal_surname: committed.maternal_surname.clone(),
            given_name: committed.given_name.clone(),
            qr_image_encoded,
            generated_code: committed.generated_code.clone(),
        };

        *self.lock_commit_state() = CommitState::Committing;

        match self.citizens.commit(citizen).await {
            Ok(record_id) => {
                self.settle_committed_form(&committed, record_id);
                *self.lock_commit_state() = CommitState::Committed { record_id };
                Ok(record_id)
            }
            Err(e) => {
                let reason = format!("{:#}", e);
                *self.lock_commit_state() = CommitState::Failed { reason: reason.clone() };
                Err(IntakeError::Store(reason))
            }
        }
    }

    /// Reset the form and clear the draft cache after `committed` was stored.
    ///
    /// A form edited during the insert is left alone. Its draft cache is only
    /// cleared when it still holds the committed record, i.e. nothing was
    /// generated since.
    fn settle_committed_form(&self, committed: &DraftFormState, record_id: i64) {
        let clear_cache = {
            let mut form = self.lock_form();
            if *form == *committed {
                *form = DraftFormState::default();
                true
            } else {
                info!(
                    "Form changed while record {} was stored; keeping the new input",
                    record_id
                );
                !form.is_generated()
            }
        };

        if clear_cache {
            if let Err(e) = self.drafts.clear_draft() {
                error!(
                    "Record {} stored but the draft cache could not be cleared: {:#}",
                    record_id, e
                );
            }
        }
    }

    /// Explicit user reset: empty form, no acknowledgment, no cached draft
    pub fn reset(&self) -> anyhow::Result<()> {
        *self.lock_form() = DraftFormState::default();
        *self.lock_commit_state() = CommitState::Idle;
        self.set_inline_error(None);
        self.drafts.clear_draft()?;
        info!("Intake form reset");
        Ok(())
    }

    /// Committed records, ascending by code
    pub async fn list_records(&self) -> Result<Vec<DomainCitizen>, IntakeError> {
        self.citizens
            .list_all()
            .await
            .map_err(|e| IntakeError::Store(format!("{:#}", e)))
    }

    pub async fn delete_all_records(&self) -> Result<u64, IntakeError> {
        self.citizens
            .delete_all()
            .await
            .map_err(|e| IntakeError::Store(format!("{:#}", e)))
    }
}
