use serde::{Deserialize, Serialize};

/// A committed civil-registry record as handed to the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitizenRecord {
    /// Surrogate key assigned by the record store
    pub id: i64,
    /// Birth date exactly as typed (DD/MM/YYYY)
    pub birth_date: String,
    pub paternal_surname: String,
    pub maternal_surname: String,
    pub given_name: String,
    /// Derived identifier, e.g. "LPJ-01012000"
    pub code: String,
    /// Base64 PNG of the QR image stored alongside the record
    pub qr_png_base64: String,
}

/// The four user-editable fields of the intake form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FormField {
    BirthDate,
    PaternalSurname,
    MaternalSurname,
    GivenName,
}

impl FormField {
    pub const ALL: [FormField; 4] = [
        FormField::BirthDate,
        FormField::PaternalSurname,
        FormField::MaternalSurname,
        FormField::GivenName,
    ];

    /// Label shown next to the input
    pub fn label(&self) -> &'static str {
        match self {
            FormField::BirthDate => "FECHA_NAC",
            FormField::PaternalSurname => "PATERNO",
            FormField::MaternalSurname => "MATERNO",
            FormField::GivenName => "NOMBRE",
        }
    }
}

/// Where the current session stands with respect to the record store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CommitStatus {
    Idle,
    Committing,
    Committed { record_id: i64 },
    Failed { reason: String },
}

/// Snapshot of the intake form for rendering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormView {
    pub birth_date: String,
    pub paternal_surname: String,
    pub maternal_surname: String,
    pub given_name: String,
    /// Empty until a code has been generated
    pub generated_code: String,
    /// Base64 PNG of the QR image, present only together with a generated code
    pub qr_png_base64: Option<String>,
    /// Edge length in pixels of the QR image
    pub qr_edge: Option<u32>,
    pub commit_status: CommitStatus,
    /// True right after a successful commit, until the next edit
    pub show_success: bool,
    /// Message of the last failed generate or commit, until the next edit
    pub inline_error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateFieldRequest {
    pub field: FormField,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateFieldResponse {
    /// False when the input filter rejected the edit; the form is unchanged
    pub accepted: bool,
    pub form: FormView,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateCodeResponse {
    pub code: String,
    pub qr_png_base64: String,
    pub qr_edge: u32,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitRecordResponse {
    pub record_id: i64,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitizenListResponse {
    /// Ordered ascending by code
    pub records: Vec<CitizenRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteAllRecordsResponse {
    pub deleted_count: u64,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResetFormResponse {
    pub success_message: String,
}

/// A failed command, shown inline next to the form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandError {
    pub message: String,
    /// True when repeating the same command may succeed without new input
    pub retryable: bool,
}
