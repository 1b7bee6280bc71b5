//! # Intake Commands
//!
//! The operations a presentation layer invokes: edit a field, generate the
//! code, commit, reset, list and delete records. Async commands touch the
//! record store and should be awaited off the interactive thread; the form
//! view they return afterwards is what the UI renders.

use log::{error, info, warn};
use shared::{
    CitizenListResponse, CommandError, CommitRecordResponse, DeleteAllRecordsResponse, FormView,
    GenerateCodeResponse, ResetFormResponse, UpdateFieldRequest, UpdateFieldResponse,
};

use crate::domain::models::IntakeError;
use crate::io::mappers::{CitizenMapper, FormMapper};
use crate::AppState;

pub const DRAFT_SAVED_MESSAGE: &str = "draft saved temporarily";
pub const RECORD_STORED_MESSAGE: &str = "record stored in the database";
pub const DRAFT_REMOVED_MESSAGE: &str = "temporary data removed";

/// Current form snapshot for rendering
pub fn get_form(state: &AppState) -> FormView {
    let session = &state.session;
    FormMapper::to_form_view(&session.form(), &session.commit_state(), session.inline_error())
}

pub fn update_field(state: &AppState, request: UpdateFieldRequest) -> UpdateFieldResponse {
    let accepted = state.session.edit_field(request.field, &request.value);
    UpdateFieldResponse {
        accepted,
        form: get_form(state),
    }
}

pub fn generate_code(state: &AppState) -> Result<GenerateCodeResponse, CommandError> {
    info!("generate_code");

    match state.session.generate() {
        Ok(generated) => Ok(GenerateCodeResponse {
            qr_edge: generated.qr_image.edge(),
            code: generated.code,
            qr_png_base64: generated.qr_png_base64,
            success_message: DRAFT_SAVED_MESSAGE.to_string(),
        }),
        Err(e) => Err(log_failure("generate code", e)),
    }
}

pub async fn commit_record(state: &AppState) -> Result<CommitRecordResponse, CommandError> {
    info!("commit_record");

    match state.session.commit().await {
        Ok(record_id) => Ok(CommitRecordResponse {
            record_id,
            success_message: RECORD_STORED_MESSAGE.to_string(),
        }),
        Err(e) => Err(log_failure("commit record", e)),
    }
}

pub fn reset_form(state: &AppState) -> Result<ResetFormResponse, CommandError> {
    info!("reset_form");

    match state.session.reset() {
        Ok(()) => Ok(ResetFormResponse {
            success_message: DRAFT_REMOVED_MESSAGE.to_string(),
        }),
        Err(e) => {
            error!("Failed to reset form: {:#}", e);
            Err(CommandError {
                message: format!("Failed to remove temporary data: {}", e),
                retryable: true,
            })
        }
    }
}

pub async fn list_records(state: &AppState) -> Result<CitizenListResponse, CommandError> {
    info!("list_records");

    match state.session.list_records().await {
        Ok(citizens) => Ok(CitizenMapper::to_citizen_list_dto(citizens)),
        Err(e) => Err(log_failure("list records", e)),
    }
}

pub async fn delete_all_records(
    state: &AppState,
) -> Result<DeleteAllRecordsResponse, CommandError> {
    info!("delete_all_records");

    match state.session.delete_all_records().await {
        Ok(deleted_count) => Ok(DeleteAllRecordsResponse {
            deleted_count,
            success_message: format!("{} records deleted", deleted_count),
        }),
        Err(e) => Err(log_failure("delete records", e)),
    }
}

/// Log a failed command at a level matching its cause and turn it into the
/// inline error
fn log_failure(action: &str, e: IntakeError) -> CommandError {
    match &e {
        IntakeError::Validation(_)
        | IntakeError::CodeNotGenerated
        | IntakeError::CommitInProgress => warn!("Cannot {}: {}", action, e),
        IntakeError::Encoding(_) | IntakeError::ImageCodec(_) | IntakeError::Store(_) => {
            error!("Failed to {}: {}", action, e)
        }
    }
    CommandError {
        message: e.to_string(),
        retryable: e.is_retryable(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RegistryConfig;
    use crate::initialize_backend;
    use shared::{CommitStatus, FormField};
    use tempfile::TempDir;

    async fn setup_test() -> (AppState, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let state = initialize_backend(RegistryConfig::with_data_directory(temp_dir.path()))
            .await
            .unwrap();
        (state, temp_dir)
    }

    fn type_field(state: &AppState, field: FormField, value: &str) -> UpdateFieldResponse {
        update_field(
            state,
            UpdateFieldRequest {
                field,
                value: value.to_string(),
            },
        )
    }

    #[tokio::test]
    async fn test_full_intake_flow() {
        let (state, _temp_dir) = setup_test().await;

        type_field(&state, FormField::BirthDate, "01/01/2000");
        type_field(&state, FormField::PaternalSurname, "lopez");
        type_field(&state, FormField::MaternalSurname, "perez");
        let response = type_field(&state, FormField::GivenName, "juan");
        assert!(response.accepted);
        assert_eq!(response.form.given_name, "JUAN");

        let generated = generate_code(&state).unwrap();
        assert_eq!(generated.code, "LPJ-01012000");
        assert_eq!(generated.qr_edge, 512);
        assert_eq!(generated.success_message, "draft saved temporarily");

        let form = get_form(&state);
        assert_eq!(form.generated_code, "LPJ-01012000");
        assert_eq!(form.qr_png_base64.as_deref(), Some(generated.qr_png_base64.as_str()));

        let committed = commit_record(&state).await.unwrap();
        assert_eq!(committed.success_message, "record stored in the database");

        let form = get_form(&state);
        assert!(form.show_success);
        assert_eq!(form.commit_status, CommitStatus::Committed { record_id: committed.record_id });
        assert_eq!(form.birth_date, "");

        let list = list_records(&state).await.unwrap();
        assert_eq!(list.records.len(), 1);
        assert_eq!(list.records[0].code, "LPJ-01012000");
        assert_eq!(list.records[0].qr_png_base64, generated.qr_png_base64);

        let form = type_field(&state, FormField::GivenName, "X").form;
        assert!(!form.show_success);
        assert_eq!(form.commit_status, CommitStatus::Idle);
    }

    #[tokio::test]
    async fn test_errors_become_inline_messages() {
        let (state, _temp_dir) = setup_test().await;

        let err = generate_code(&state).unwrap_err();
        assert_eq!(err.message, "All fields are required");
        assert!(!err.retryable);
        assert_eq!(get_form(&state).inline_error.as_deref(), Some("All fields are required"));

        type_field(&state, FormField::BirthDate, "1/1/2000");
        type_field(&state, FormField::PaternalSurname, "LOPEZ");
        type_field(&state, FormField::MaternalSurname, "PEREZ");
        type_field(&state, FormField::GivenName, "JUAN");
        assert_eq!(get_form(&state).inline_error, None);
        assert_eq!(
            generate_code(&state).unwrap_err().message,
            "Invalid date format. Use DD/MM/YYYY"
        );

        let err = commit_record(&state).await.unwrap_err();
        assert_eq!(err.message, "Code not yet generated");
        assert!(!err.retryable);
        assert!(list_records(&state).await.unwrap().records.is_empty());
    }

    #[tokio::test]
    async fn test_store_failures_are_retryable() {
        let (state, _temp_dir) = setup_test().await;
        state.db.close().await;

        let err = list_records(&state).await.unwrap_err();
        assert!(err.message.starts_with("Record store failure"));
        assert!(err.retryable);
    }

    #[tokio::test]
    async fn test_rejected_date_edit_leaves_form_unchanged() {
        let (state, _temp_dir) = setup_test().await;
        type_field(&state, FormField::BirthDate, "01/01");

        let response = type_field(&state, FormField::BirthDate, "01-01");
        assert!(!response.accepted);
        assert_eq!(response.form.birth_date, "01/01");
    }

    #[tokio::test]
    async fn test_reset_and_delete_all() {
        let (state, _temp_dir) = setup_test().await;
        for given in ["ANA", "JUAN"] {
            type_field(&state, FormField::BirthDate, "01/01/2000");
            type_field(&state, FormField::PaternalSurname, "LOPEZ");
            type_field(&state, FormField::MaternalSurname, "PEREZ");
            type_field(&state, FormField::GivenName, given);
            generate_code(&state).unwrap();
            commit_record(&state).await.unwrap();
        }

        type_field(&state, FormField::GivenName, "LUIS");
        let reset = reset_form(&state).unwrap();
        assert_eq!(reset.success_message, "temporary data removed");
        assert_eq!(get_form(&state).given_name, "");

        let deleted = delete_all_records(&state).await.unwrap();
        assert_eq!(deleted.deleted_count, 2);
        assert!(list_records(&state).await.unwrap().records.is_empty());
    }
}
