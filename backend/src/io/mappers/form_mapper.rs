use shared::{CommitStatus, FormView};

use crate::domain::models::{CommitState, DraftFormState};

/// Mapper from the session's form state to the render snapshot.
pub struct FormMapper;

impl FormMapper {
    pub fn to_commit_status(state: &CommitState) -> CommitStatus {
        match state {
            CommitState::Idle => CommitStatus::Idle,
            CommitState::Committing => CommitStatus::Committing,
            CommitState::Committed { record_id } => CommitStatus::Committed {
                record_id: *record_id,
            },
            CommitState::Failed { reason } => CommitStatus::Failed {
                reason: reason.clone(),
            },
        }
    }

    pub fn to_form_view(
        form: &DraftFormState,
        commit_state: &CommitState,
        inline_error: Option<String>,
    ) -> FormView {
        // code and image are shown together or not at all
        let (generated_code, qr_png_base64, qr_edge) = match form.qr_image.as_ref() {
            Some(raster) if form.is_generated() && !form.qr_image_encoded.is_empty() => (
                form.generated_code.clone(),
                Some(form.qr_image_encoded.clone()),
                Some(raster.edge()),
            ),
            _ => (String::new(), None, None),
        };

        FormView {
            birth_date: form.birth_date.clone(),
            paternal_surname: form.paternal_surname.clone(),
            maternal_surname: form.maternal_surname.clone(),
            given_name: form.given_name.clone(),
            generated_code,
            qr_png_base64,
            qr_edge,
            commit_status: Self::to_commit_status(commit_state),
            show_success: matches!(commit_state, CommitState::Committed { .. }),
            inline_error,
        }
    }
}
