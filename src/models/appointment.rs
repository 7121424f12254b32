//! Appointment requests.
//!
//! A request only lives for the duration of a submission. It is validated,
//! acknowledged with a [`Confirmation`], and dropped; nothing is stored.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Medical specialties offered for booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Specialty {
    #[serde(rename = "Clínico Geral")]
    ClinicoGeral,
    #[serde(rename = "Cardiologia")]
    Cardiologia,
    #[serde(rename = "Dermatologia")]
    Dermatologia,
    #[serde(rename = "Ginecologia")]
    Ginecologia,
    #[serde(rename = "Ortopedia")]
    Ortopedia,
    #[serde(rename = "Pediatria")]
    Pediatria,
    #[serde(rename = "Psiquiatria")]
    Psiquiatria,
    #[serde(rename = "Neurologia")]
    Neurologia,
}

impl Specialty {
    /// All specialties, in the order they are offered.
    pub fn all() -> &'static [Specialty] {
        &[
            Specialty::ClinicoGeral,
            Specialty::Cardiologia,
            Specialty::Dermatologia,
            Specialty::Ginecologia,
            Specialty::Ortopedia,
            Specialty::Pediatria,
            Specialty::Psiquiatria,
            Specialty::Neurologia,
        ]
    }

    /// Label shown to users.
    pub fn label(&self) -> &'static str {
        match self {
            Specialty::ClinicoGeral => "Clínico Geral",
            Specialty::Cardiologia => "Cardiologia",
            Specialty::Dermatologia => "Dermatologia",
            Specialty::Ginecologia => "Ginecologia",
            Specialty::Ortopedia => "Ortopedia",
            Specialty::Pediatria => "Pediatria",
            Specialty::Psiquiatria => "Psiquiatria",
            Specialty::Neurologia => "Neurologia",
        }
    }

    /// ASCII identifier accepted on the command line.
    pub fn slug(&self) -> &'static str {
        match self {
            Specialty::ClinicoGeral => "clinico-geral",
            Specialty::Cardiologia => "cardiologia",
            Specialty::Dermatologia => "dermatologia",
            Specialty::Ginecologia => "ginecologia",
            Specialty::Ortopedia => "ortopedia",
            Specialty::Pediatria => "pediatria",
            Specialty::Psiquiatria => "psiquiatria",
            Specialty::Neurologia => "neurologia",
        }
    }
}

impl fmt::Display for Specialty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for Specialty {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Specialty::all()
            .iter()
            .copied()
            .find(|sp| sp.slug() == wanted || sp.label().to_lowercase() == wanted)
            .ok_or_else(|| format!("Unknown specialty: {}", s))
    }
}

/// A booking request as filled in on the appointment form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentRequest {
    /// Patient's name (required)
    pub patient_name: String,

    /// Patient's age as typed (required)
    pub patient_age: String,

    /// Contact phone (required)
    pub phone_number: String,

    /// Chosen specialty (required; `None` until one is picked)
    pub specialty: Option<Specialty>,

    /// Requested calendar date, no time of day
    pub date: NaiveDate,

    /// Free-text symptoms
    #[serde(default)]
    pub symptoms: String,
}

impl AppointmentRequest {
    /// Create an empty request for `date`, as the form starts out.
    pub fn blank(date: NaiveDate) -> Self {
        Self {
            patient_name: String::new(),
            patient_age: String::new(),
            phone_number: String::new(),
            specialty: None,
            date,
            symptoms: String::new(),
        }
    }
}

/// Acknowledgment returned for an accepted request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Confirmation {
    pub date: NaiveDate,
    pub specialty: Specialty,
    pub message: String,
}

impl Confirmation {
    pub fn for_request(date: NaiveDate, specialty: Specialty) -> Self {
        let message = format!(
            "Sua consulta foi agendada com sucesso para {}. Você receberá uma confirmação por SMS.",
            format_date_br(date)
        );
        Self {
            date,
            specialty,
            message,
        }
    }
}

/// Format a date the way Brazilian users read it (dd/mm/yyyy).
pub fn format_date_br(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_specialty_from_label_and_slug() {
        assert_eq!(
            "Clínico Geral".parse::<Specialty>().unwrap(),
            Specialty::ClinicoGeral
        );
        assert_eq!(
            "clinico-geral".parse::<Specialty>().unwrap(),
            Specialty::ClinicoGeral
        );
        assert_eq!(" CARDIOLOGIA ".parse::<Specialty>().unwrap(), Specialty::Cardiologia);
        assert!("Oftalmologia".parse::<Specialty>().is_err());
    }

    #[test]
    fn test_specialty_serializes_as_label() {
        let json = serde_json::to_string(&Specialty::ClinicoGeral).unwrap();
        assert_eq!(json, r#""Clínico Geral""#);
        assert_eq!(Specialty::all().len(), 8);
    }

    #[test]
    fn test_confirmation_message_uses_br_date() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 7).unwrap();
        let confirmation = Confirmation::for_request(date, Specialty::Pediatria);
        assert!(confirmation.message.contains("07/03/2026"));
        assert!(confirmation.message.contains("SMS"));
    }

    #[test]
    fn test_blank_request() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 7).unwrap();
        let request = AppointmentRequest::blank(date);
        assert!(request.specialty.is_none());
        assert_eq!(request.date, date);
    }
}
