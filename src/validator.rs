use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

use crate::entry::{Entry, EntryForm, Gender};
use crate::labels;

lazy_static! {
    // ASCII only: `\d` would also admit Arabic-Indic digits.
    static ref ID_NUMBER_RE: Regex = Regex::new(r"^[0-9]{14}$").unwrap();
    static ref PHONE_RE: Regex = Regex::new(r"^[0-9]{11}$").unwrap();
}

/// Reason a candidate record was rejected
///
/// The `Display` text is the localized message shown to the submitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{}", labels::FULL_NAME_REQUIRED)]
    FullNameRequired,

    #[error("{}", labels::ID_NUMBER_LENGTH)]
    IdNumberLength,

    #[error("{}", labels::PHONE_LENGTH)]
    PhoneLength,

    #[error("{}", labels::GENDER_REQUIRED)]
    GenderRequired,
}

impl ValidationError {
    /// Stable machine-readable code, independent of the UI language
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::FullNameRequired => "full_name_required",
            ValidationError::IdNumberLength => "id_number_length",
            ValidationError::PhoneLength => "phone_length",
            ValidationError::GenderRequired => "gender_required",
        }
    }
}

/// Validate a candidate record
///
/// Rules are checked in order and the first failure is returned:
/// 1. the full name is not blank after trimming
/// 2. the ID number is exactly 14 ASCII digits
/// 3. the phone is exactly 11 ASCII digits
/// 4. the gender is a recognized value
///
/// No checksum or range check is done on the ID, and nothing is normalized:
/// the accepted entry carries the fields exactly as submitted.
///
/// # Arguments
/// * `candidate` - The raw form values
///
/// # Returns
/// * `Result<Entry, ValidationError>` - The accepted entry or the first rule it broke
///
/// # Examples
/// ```
/// use registration::entry::EntryForm;
/// use registration::validator::{validate, ValidationError};
///
/// let form = EntryForm::new("Ahmed Ali", "123", "01012345678", "male");
/// assert_eq!(validate(&form), Err(ValidationError::IdNumberLength));
/// ```
pub fn validate(candidate: &EntryForm) -> Result<Entry, ValidationError> {
    if candidate.full_name.trim().is_empty() {
        return Err(ValidationError::FullNameRequired);
    }
    if !ID_NUMBER_RE.is_match(&candidate.id_number) {
        return Err(ValidationError::IdNumberLength);
    }
    if !PHONE_RE.is_match(&candidate.phone) {
        return Err(ValidationError::PhoneLength);
    }
    let gender = Gender::parse(&candidate.gender).ok_or(ValidationError::GenderRequired)?;

    Ok(Entry {
        full_name: candidate.full_name.clone(),
        id_number: candidate.id_number.clone(),
        phone: candidate.phone.clone(),
        gender,
    })
}
