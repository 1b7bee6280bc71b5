//! Draft cache: the in-progress form kept in the ephemeral key-value store so
//! an interrupted session can be resumed.
//!
//! Each field is its own key. Saving does not wait for the store to reach
//! disk; values are visible to the next load in this process immediately,
//! but a crash right after a save may lose it or leave some keys stale.

use anyhow::Result;
use log::{debug, info, warn};
use std::borrow::Cow;
use std::sync::Arc;

use crate::domain::image_codec;
use crate::domain::models::DraftFormState;
use crate::storage::traits::KeyValueStorage;

pub const KEY_BIRTH_DATE: &str = "fecha_nac";
pub const KEY_PATERNAL_SURNAME: &str = "paterno";
pub const KEY_MATERNAL_SURNAME: &str = "materno";
pub const KEY_GIVEN_NAME: &str = "nombre";
pub const KEY_GENERATED_CODE: &str = "codigo";
pub const KEY_QR_IMAGE: &str = "qr_bitmap";

/// Every key written by [`DraftService::save_draft`]
pub const DRAFT_KEYS: [&str; 6] = [
    KEY_BIRTH_DATE,
    KEY_PATERNAL_SURNAME,
    KEY_MATERNAL_SURNAME,
    KEY_GIVEN_NAME,
    KEY_GENERATED_CODE,
    KEY_QR_IMAGE,
];

#[derive(Clone)]
pub struct DraftService {
    store: Arc<dyn KeyValueStorage>,
}

impl DraftService {
    pub fn new(store: Arc<dyn KeyValueStorage>) -> Self {
        Self { store }
    }

    /// Write every field of the draft, the QR image as Base64 PNG.
    ///
    /// The image is only encoded here when the state does not already carry
    /// its text form.
    pub fn save_draft(&self, state: &DraftFormState) -> Result<()> {
        let needs_encoding = state.qr_image.is_some() && state.qr_image_encoded.is_empty();
        let qr_encoded: Cow<'_, str> = if needs_encoding {
            match image_codec::serialize(state.qr_image.as_ref()) {
                Ok(encoded) => Cow::Owned(encoded),
                Err(e) => {
                    warn!("Caching draft without its QR image: {}", e);
                    Cow::Borrowed("")
                }
            }
        } else {
            Cow::Borrowed(state.qr_image_encoded.as_str())
        };

        self.store.put_strings(&[
            (KEY_BIRTH_DATE, state.birth_date.as_str()),
            (KEY_PATERNAL_SURNAME, state.paternal_surname.as_str()),
            (KEY_MATERNAL_SURNAME, state.maternal_surname.as_str()),
            (KEY_GIVEN_NAME, state.given_name.as_str()),
            (KEY_GENERATED_CODE, state.generated_code.as_str()),
            (KEY_QR_IMAGE, qr_encoded.as_ref()),
        ])?;

        debug!("Saved draft with code '{}'", state.generated_code);
        Ok(())
    }

    /// Read the cached draft; missing keys read as empty and an unreadable
    /// image reads as absent
    pub fn load_draft(&self) -> Result<DraftFormState> {
        let qr_encoded: String = self.read(KEY_QR_IMAGE)?.split_ascii_whitespace().collect();
        let qr_image = if qr_encoded.is_empty() {
            None
        } else {
            image_codec::deserialize(&qr_encoded)
        };
        let qr_image_encoded = if qr_image.is_some() { qr_encoded } else { String::new() };

        Ok(DraftFormState {
            birth_date: self.read(KEY_BIRTH_DATE)?,
            paternal_surname: self.read(KEY_PATERNAL_SURNAME)?,
            maternal_surname: self.read(KEY_MATERNAL_SURNAME)?,
            given_name: self.read(KEY_GIVEN_NAME)?,
            generated_code: self.read(KEY_GENERATED_CODE)?,
            qr_image,
            qr_image_encoded,
        })
    }

    /// Remove every draft key. Safe to call repeatedly.
    pub fn clear_draft(&self) -> Result<()> {
        self.store.remove_keys(&DRAFT_KEYS)?;
        info!("Cleared cached draft");
        Ok(())
    }

    fn read(&self, key: &str) -> Result<String> {
        Ok(self.store.get_string(key)?.unwrap_or_default())
    }
}
