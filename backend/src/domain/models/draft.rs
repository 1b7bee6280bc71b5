use shared::FormField;

use crate::domain::qr_encoder::QrRaster;

/// In-progress intake form, one per session.
///
/// `qr_image` and its text form are present exactly when `generated_code` is
/// non-empty; all three are dropped together whenever a field is edited.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DraftFormState {
    pub birth_date: String,
    pub paternal_surname: String,
    pub maternal_surname: String,
    pub given_name: String,
    pub generated_code: String,
    pub qr_image: Option<QrRaster>,
    /// PNG + Base64 of `qr_image`, empty when there is no image
    pub qr_image_encoded: String,
}

impl DraftFormState {
    pub fn field(&self, field: FormField) -> &str {
        match field {
            FormField::BirthDate => &self.birth_date,
            FormField::PaternalSurname => &self.paternal_surname,
            FormField::MaternalSurname => &self.maternal_surname,
            FormField::GivenName => &self.given_name,
        }
    }

    pub(crate) fn field_mut(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::BirthDate => &mut self.birth_date,
            FormField::PaternalSurname => &mut self.paternal_surname,
            FormField::MaternalSurname => &mut self.maternal_surname,
            FormField::GivenName => &mut self.given_name,
        }
    }

    /// True when a code and its QR image are both held
    pub fn is_generated(&self) -> bool {
        !self.generated_code.is_empty() && self.qr_image.is_some()
    }

    /// True when nothing at all has been entered
    pub fn is_blank(&self) -> bool {
        *self == Self::default()
    }

    pub(crate) fn set_generated(&mut self, code: String, raster: QrRaster, encoded: String) {
        self.generated_code = code;
        self.qr_image = Some(raster);
        self.qr_image_encoded = encoded;
    }

    pub(crate) fn clear_generated(&mut self) {
        self.generated_code.clear();
        self.qr_image = None;
        self.qr_image_encoded.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_accessors_cover_every_field() {
        let mut state = DraftFormState::default();
        for (i, field) in FormField::ALL.into_iter().enumerate() {
            *state.field_mut(field) = format!("V{}", i);
        }
        assert_eq!(state.birth_date, "V0");
        assert_eq!(state.paternal_surname, "V1");
        assert_eq!(state.maternal_surname, "V2");
        assert_eq!(state.given_name, "V3");
        assert_eq!(state.field(FormField::GivenName), "V3");
    }

    #[test]
    fn test_generated_requires_code_and_image() {
        let mut state = DraftFormState::default();
        assert!(state.is_blank());
        state.generated_code = "LPJ-01012000".to_string();
        assert!(!state.is_generated());
        state.clear_generated();
        assert!(state.generated_code.is_empty());
        assert!(state.is_blank());
    }
}
