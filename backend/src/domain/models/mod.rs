pub mod citizen;
pub mod draft;
pub mod intake;

pub use citizen::{DomainCitizen, NewCitizen};
pub use draft::DraftFormState;
pub use intake::{CommitState, IntakeError};
