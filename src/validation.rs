//! Validation of profile records and appointment requests.
//!
//! Validation never touches a store. A failed check reports every missing
//! field at once so the user can fix the whole form in one pass.

use crate::models::appointment::format_date_br;
use crate::models::{AppointmentRequest, Confirmation, ProfileField, UserProfile};
use chrono::NaiveDate;

/// Reason a record or request was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Required fields were empty, listed in declaration order
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    /// Appointment requested for a day that has already passed
    #[error("Appointment date {date} is before today ({today})")]
    DateInPast { date: NaiveDate, today: NaiveDate },
}

impl ValidationError {
    /// Message suitable for showing to the end user.
    pub fn user_message(&self) -> String {
        match self {
            ValidationError::MissingFields(fields) => format!(
                "Por favor, preencha todos os campos obrigatórios ({}).",
                fields.join(", ")
            ),
            ValidationError::DateInPast { date, .. } => format!(
                "A data {} já passou. Escolha hoje ou uma data futura.",
                format_date_br(*date)
            ),
        }
    }

    /// Field names reported as missing, if any.
    pub fn missing_fields(&self) -> &[&'static str] {
        match self {
            ValidationError::MissingFields(fields) => fields,
            ValidationError::DateInPast { .. } => &[],
        }
    }
}

/// True if `value` is empty or only whitespace.
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Collect the names of fields whose value fails `present`.
fn collect_missing<'a, I, F>(fields: I, present: F) -> Vec<&'static str>
where
    I: IntoIterator<Item = (&'static str, &'a str)>,
    F: Fn(&str) -> bool,
{
    fields
        .into_iter()
        .filter(|(_, value)| !present(value))
        .map(|(name, _)| name)
        .collect()
}

/// Check the required profile fields (`name`, `email`, `phone`, `cpf`).
///
/// A field counts as missing when it is empty after trimming whitespace.
pub fn validate_profile(profile: &UserProfile) -> Result<(), ValidationError> {
    let missing = collect_missing(
        ProfileField::REQUIRED
            .iter()
            .map(|field| (field.as_str(), profile.get(*field))),
        |value| !is_blank(value),
    );
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::MissingFields(missing))
    }
}

/// Validate an appointment request and produce its confirmation.
///
/// Required fields only need to be non-empty (whitespace is accepted, as the
/// booking form always did). Requests dated before `today` are rejected;
/// booking for `today` itself is allowed.
pub fn validate_appointment(
    request: &AppointmentRequest,
    today: NaiveDate,
) -> Result<Confirmation, ValidationError> {
    let specialty_label = request.specialty.map(|s| s.label()).unwrap_or("");
    let missing = collect_missing(
        [
            ("patientName", request.patient_name.as_str()),
            ("patientAge", request.patient_age.as_str()),
            ("phoneNumber", request.phone_number.as_str()),
            ("specialty", specialty_label),
        ],
        |value| !value.is_empty(),
    );
    if !missing.is_empty() {
        return Err(ValidationError::MissingFields(missing));
    }

    if request.date < today {
        return Err(ValidationError::DateInPast {
            date: request.date,
            today,
        });
    }

    // Checked above: a missing specialty is reported as a missing field
    let specialty = request
        .specialty
        .ok_or_else(|| ValidationError::MissingFields(vec!["specialty"]))?;
    Ok(Confirmation::for_request(request.date, specialty))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Specialty;

    fn ana() -> UserProfile {
        UserProfile::new("Ana", "a@x.com", "1199999999", "11122233344")
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn complete_request(date: NaiveDate) -> AppointmentRequest {
        AppointmentRequest {
            patient_name: "Ana".to_string(),
            patient_age: "34".to_string(),
            phone_number: "1199999999".to_string(),
            specialty: Some(Specialty::Cardiologia),
            date,
            symptoms: String::new(),
        }
    }

    #[test]
    fn test_complete_profile_passes() {
        assert!(validate_profile(&ana()).is_ok());
    }

    #[test]
    fn test_optional_fields_not_required() {
        let profile = ana();
        assert!(profile.address.is_empty());
        assert!(validate_profile(&profile).is_ok());
    }

    #[test]
    fn test_each_required_field_is_checked() {
        for field in ProfileField::REQUIRED {
            let mut profile = ana();
            profile.set(field, "");
            let err = validate_profile(&profile).unwrap_err();
            assert_eq!(err.missing_fields(), &[field.as_str()]);
        }
    }

    #[test]
    fn test_whitespace_only_counts_as_missing() {
        let mut profile = ana();
        profile.name = "   ".to_string();
        profile.cpf = "\t\n".to_string();
        let err = validate_profile(&profile).unwrap_err();
        assert_eq!(err, ValidationError::MissingFields(vec!["name", "cpf"]));
        assert!(err.to_string().contains("name, cpf"));
    }

    #[test]
    fn test_appointment_accepts_today() {
        let today = day(2026, 5, 10);
        let confirmation = validate_appointment(&complete_request(today), today).unwrap();
        assert_eq!(confirmation.date, today);
        assert_eq!(confirmation.specialty, Specialty::Cardiologia);
        assert!(confirmation.message.contains("10/05/2026"));
    }

    #[test]
    fn test_appointment_rejects_past_date() {
        let today = day(2026, 5, 10);
        let err = validate_appointment(&complete_request(day(2026, 5, 9)), today).unwrap_err();
        assert_eq!(
            err,
            ValidationError::DateInPast {
                date: day(2026, 5, 9),
                today
            }
        );
        assert!(err.user_message().contains("09/05/2026"));
    }

    #[test]
    fn test_appointment_missing_fields_reported_before_date() {
        let today = day(2026, 5, 10);
        let mut request = complete_request(day(2020, 1, 1));
        request.patient_age.clear();
        request.specialty = None;
        let err = validate_appointment(&request, today).unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingFields(vec!["patientAge", "specialty"])
        );
    }

    #[test]
    fn test_appointment_symptoms_optional() {
        let today = day(2026, 5, 10);
        let request = complete_request(day(2026, 6, 1));
        assert!(request.symptoms.is_empty());
        assert!(validate_appointment(&request, today).is_ok());
    }

    #[test]
    fn test_blank_request_lists_all_required_fields() {
        let today = day(2026, 5, 10);
        let err = validate_appointment(&AppointmentRequest::blank(today), today).unwrap_err();
        assert_eq!(
            err.missing_fields(),
            &["patientName", "patientAge", "phoneNumber", "specialty"]
        );
    }
}
