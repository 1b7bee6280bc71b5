use crate::domain::image_codec::ImageCodecError;
use crate::domain::qr_encoder::QrEncodingError;
use crate::domain::validation::FormValidationError;

/// Everything that can go wrong while driving the intake form
#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error(transparent)]
    Validation(#[from] FormValidationError),
    #[error(transparent)]
    Encoding(#[from] QrEncodingError),
    #[error(transparent)]
    ImageCodec(#[from] ImageCodecError),
    #[error("Code not yet generated")]
    CodeNotGenerated,
    #[error("A commit is already in progress")]
    CommitInProgress,
    #[error("Record store failure: {0}")]
    Store(String),
}

impl IntakeError {
    /// Store failures can be retried without re-entering anything
    pub fn is_retryable(&self) -> bool {
        matches!(self, IntakeError::Store(_) | IntakeError::CommitInProgress)
    }
}

/// Progress of the explicit commit action.
///
/// `Committing` is entered only after the precondition check passes; the
/// durable insert then moves it to `Committed` or `Failed`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CommitState {
    #[default]
    Idle,
    Committing,
    Committed { record_id: i64 },
    Failed { reason: String },
}
