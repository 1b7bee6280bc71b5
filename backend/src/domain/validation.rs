//! Intake form validation.
//!
//! Presence of all four fields is checked first, then the birth date is
//! checked structurally (`DD/MM/YYYY`) and by range. Days are not checked
//! against the month or leap years: `31/02/2000` is accepted.

use shared::FormField;

use crate::domain::models::DraftFormState;

/// Exact length of a `DD/MM/YYYY` date, separators included
pub const BIRTH_DATE_LENGTH: usize = 10;
pub const MIN_BIRTH_YEAR: u32 = 1900;
pub const MAX_BIRTH_YEAR: u32 = 2024;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DateValidationError {
    #[error("Birth date must be exactly 10 characters, got {0}")]
    WrongLength(usize),
    #[error("Birth date must have 3 parts separated by '/', got {0}")]
    WrongPartCount(usize),
    #[error("Birth date part '{0}' is not a number")]
    NotANumber(String),
    #[error("Day {0} must be between 1 and 31")]
    DayOutOfRange(u32),
    #[error("Month {0} must be between 1 and 12")]
    MonthOutOfRange(u32),
    #[error("Year {0} must be between 1900 and 2024")]
    YearOutOfRange(u32),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormValidationError {
    #[error("All fields are required")]
    MissingFields(Vec<FormField>),
    #[error("Invalid date format. Use DD/MM/YYYY")]
    InvalidDate(#[from] DateValidationError),
}

/// Validate a birth date in `DD/MM/YYYY` form
pub fn validate_date(text: &str) -> Result<(), DateValidationError> {
    let length = text.chars().count();
    if length != BIRTH_DATE_LENGTH {
        return Err(DateValidationError::WrongLength(length));
    }

    let parts: Vec<&str> = text.split('/').collect();
    if parts.len() != 3 {
        return Err(DateValidationError::WrongPartCount(parts.len()));
    }

    let day = parse_part(parts[0])?;
    let month = parse_part(parts[1])?;
    let year = parse_part(parts[2])?;

    if !(1..=31).contains(&day) {
        return Err(DateValidationError::DayOutOfRange(day));
    }
    if !(1..=12).contains(&month) {
        return Err(DateValidationError::MonthOutOfRange(month));
    }
    if !(MIN_BIRTH_YEAR..=MAX_BIRTH_YEAR).contains(&year) {
        return Err(DateValidationError::YearOutOfRange(year));
    }

    Ok(())
}

/// Whole-part base-10 parse: no sign, no whitespace, no empty part
fn parse_part(part: &str) -> Result<u32, DateValidationError> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DateValidationError::NotANumber(part.to_string()));
    }
    part.parse::<u32>()
        .map_err(|_| DateValidationError::NotANumber(part.to_string()))
}

/// Fields that are still empty, in form order
pub fn missing_fields(state: &DraftFormState) -> Vec<FormField> {
    FormField::ALL
        .into_iter()
        .filter(|field| state.field(*field).is_empty())
        .collect()
}

/// Presence check followed by date validation
pub fn validate_form(state: &DraftFormState) -> Result<(), FormValidationError> {
    let missing = missing_fields(state);
    if !missing.is_empty() {
        return Err(FormValidationError::MissingFields(missing));
    }
    validate_date(&state.birth_date)?;
    Ok(())
}

/// Input filter for the birth date field: at most 10 characters, digits and '/' only
pub fn accepts_birth_date_input(text: &str) -> bool {
    text.chars().count() <= BIRTH_DATE_LENGTH
        && text.chars().all(|c| c.is_ascii_digit() || c == '/')
}
