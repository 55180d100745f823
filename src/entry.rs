use serde::{Deserialize, Serialize};
use std::fmt;

use crate::labels;

/// Gender of a registrant
///
/// Persisted and exported as its localized label, so a stored block written
/// by the form reads the same as the table shown to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "ذكر")]
    Male,
    #[serde(rename = "أنثى")]
    Female,
}

impl Gender {
    /// Recognize a submitted gender value
    ///
    /// Accepts either the localized label or the English key. Anything else,
    /// including surrounding whitespace or different casing, is not recognized.
    ///
    /// # Arguments
    /// * `value` - The raw value posted by the form
    ///
    /// # Returns
    /// * `Option<Gender>` - The recognized gender, or None
    pub fn parse(value: &str) -> Option<Gender> {
        match value {
            labels::MALE | "male" => Some(Gender::Male),
            labels::FEMALE | "female" => Some(Gender::Female),
            _ => None,
        }
    }

    /// Localized label used in storage, exports and pages
    pub fn label(&self) -> &'static str {
        match self {
            Gender::Male => labels::MALE,
            Gender::Female => labels::FEMALE,
        }
    }

    /// English key used by form controls
    pub fn key(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A validated registration record
///
/// Stores only accept entries that passed [`crate::validator::validate`].
/// `Entry` also deserializes, so anything read back from outside a store
/// (an archive, say) goes through [`EntryForm::from`] and `validate` again
/// before it is appended. Entries are never mutated after they are stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    /// Full name as typed (never empty after trimming)
    pub full_name: String,

    /// National ID, exactly 14 ASCII digits
    pub id_number: String,

    /// Phone number, exactly 11 ASCII digits
    pub phone: String,

    pub gender: Gender,
}

/// Raw candidate record as submitted by the form
///
/// All fields are free text. Missing form fields deserialize as empty
/// strings so that the validator, not the extractor, reports what is wrong.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryForm {
    #[serde(default)]
    pub full_name: String,

    #[serde(default)]
    pub id_number: String,

    #[serde(default)]
    pub phone: String,

    #[serde(default)]
    pub gender: String,
}

impl EntryForm {
    pub fn new(full_name: &str, id_number: &str, phone: &str, gender: &str) -> Self {
        EntryForm {
            full_name: full_name.to_string(),
            id_number: id_number.to_string(),
            phone: phone.to_string(),
            gender: gender.to_string(),
        }
    }

    /// Apply the as-you-type filter of the numeric inputs
    ///
    /// Strips every character that is not an ASCII digit from the ID and
    /// phone fields. Nothing is truncated or padded, and the name and gender
    /// are left untouched.
    pub fn sanitized(mut self) -> Self {
        self.id_number = digits_only(&self.id_number);
        self.phone = digits_only(&self.phone);
        self
    }
}

impl From<&Entry> for EntryForm {
    /// Turn a stored-looking entry back into a candidate for re-validation
    fn from(entry: &Entry) -> Self {
        EntryForm::new(&entry.full_name, &entry.id_number, &entry.phone, entry.gender.label())
    }
}

fn digits_only(input: &str) -> String {
    input.chars().filter(|c| c.is_ascii_digit()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gender_parse_accepts_labels_and_keys() {
        assert_eq!(Gender::parse("ذكر"), Some(Gender::Male));
        assert_eq!(Gender::parse("male"), Some(Gender::Male));
        assert_eq!(Gender::parse("أنثى"), Some(Gender::Female));
        assert_eq!(Gender::parse("female"), Some(Gender::Female));
    }

    #[test]
    fn test_gender_parse_rejects_everything_else() {
        assert_eq!(Gender::parse(""), None);
        assert_eq!(Gender::parse("Male"), None);
        assert_eq!(Gender::parse(" male"), None);
        assert_eq!(Gender::parse("other"), None);
    }

    #[test]
    fn test_entry_json_shape() {
        let entry = Entry {
            full_name: "Ahmed Ali".to_string(),
            id_number: "12345678901234".to_string(),
            phone: "01012345678".to_string(),
            gender: Gender::Male,
        };

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "fullName": "Ahmed Ali",
                "idNumber": "12345678901234",
                "phone": "01012345678",
                "gender": "ذكر",
            })
        );
    }

    #[test]
    fn test_sanitized_strips_non_digits_only() {
        let form = EntryForm::new("  Mona  ", "1234-5678 9012 34", "010-1234-5678", "female").sanitized();

        assert_eq!(form.full_name, "  Mona  ");
        assert_eq!(form.id_number, "12345678901234");
        assert_eq!(form.phone, "01012345678");
        assert_eq!(form.gender, "female");
    }

    #[test]
    fn test_sanitized_drops_non_ascii_digits() {
        // Arabic-Indic digits are filtered like any other non-digit
        let form = EntryForm::new("x", "١٢٣", "٠١٠", "male").sanitized();
        assert_eq!(form.id_number, "");
        assert_eq!(form.phone, "");
    }

    #[test]
    fn test_form_from_entry_keeps_fields_verbatim() {
        let entry = Entry {
            full_name: "   ".to_string(),
            id_number: "123".to_string(),
            phone: "x".to_string(),
            gender: Gender::Female,
        };

        let form = EntryForm::from(&entry);
        assert_eq!(form.full_name, "   ");
        assert_eq!(form.id_number, "123");
        assert_eq!(form.phone, "x");
        assert_eq!(form.gender, "أنثى");
    }

    #[test]
    fn test_form_missing_fields_default_to_empty() {
        let form: EntryForm = serde_json::from_str(r#"{"fullName":"Ali"}"#).unwrap();
        assert_eq!(form.full_name, "Ali");
        assert!(form.id_number.is_empty());
        assert!(form.phone.is_empty());
        assert!(form.gender.is_empty());
    }
}
