//! Data models for consulta entities.
//!
//! This module defines the core data structures:
//! - `UserProfile` - The single persisted profile of the device owner
//! - `ProfileField` - Addressable fields of a profile, used by edit drafts
//! - `AppointmentRequest` - A transient booking request (see [`appointment`])
//! - `Doctor` - Entries of the fixed doctor catalogue (see [`catalog`])

pub mod appointment;
pub mod catalog;

pub use appointment::{AppointmentRequest, Confirmation, Specialty};
pub use catalog::{Doctor, doctors_for};

use serde::{Deserialize, Serialize};
use std::fmt;

/// The device owner's profile.
///
/// Exactly one of these is ever stored. Absent keys deserialize to empty
/// strings so records written by older builds still load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserProfile {
    /// Full name (required)
    pub name: String,

    /// E-mail address (required)
    pub email: String,

    /// Phone number (required)
    pub phone: String,

    /// CPF taxpayer number (required)
    pub cpf: String,

    /// Birth date as typed by the user, e.g. "DD/MM/AAAA"
    pub birth_date: String,

    /// Postal address
    pub address: String,

    /// Emergency contact name and phone
    pub emergency_contact: String,
}

impl UserProfile {
    /// Create a profile with the required fields set and optional ones empty.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
        cpf: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
            cpf: cpf.into(),
            ..Self::default()
        }
    }

    pub fn with_birth_date(mut self, birth_date: impl Into<String>) -> Self {
        self.birth_date = birth_date.into();
        self
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = address.into();
        self
    }

    pub fn with_emergency_contact(mut self, contact: impl Into<String>) -> Self {
        self.emergency_contact = contact.into();
        self
    }

    /// Read a single field.
    pub fn get(&self, field: ProfileField) -> &str {
        match field {
            ProfileField::Name => &self.name,
            ProfileField::Email => &self.email,
            ProfileField::Phone => &self.phone,
            ProfileField::Cpf => &self.cpf,
            ProfileField::BirthDate => &self.birth_date,
            ProfileField::Address => &self.address,
            ProfileField::EmergencyContact => &self.emergency_contact,
        }
    }

    /// Replace a single field.
    pub fn set(&mut self, field: ProfileField, value: impl Into<String>) {
        let slot = match field {
            ProfileField::Name => &mut self.name,
            ProfileField::Email => &mut self.email,
            ProfileField::Phone => &mut self.phone,
            ProfileField::Cpf => &mut self.cpf,
            ProfileField::BirthDate => &mut self.birth_date,
            ProfileField::Address => &mut self.address,
            ProfileField::EmergencyContact => &mut self.emergency_contact,
        };
        *slot = value.into();
    }

    /// Display name, falling back to a generic label for unnamed profiles.
    pub fn display_name(&self) -> &str {
        let trimmed = self.name.trim();
        if trimmed.is_empty() { "Usuário" } else { trimmed }
    }
}

/// A field of [`UserProfile`] that can be edited individually.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProfileField {
    Name,
    Email,
    Phone,
    Cpf,
    BirthDate,
    Address,
    EmergencyContact,
}

impl ProfileField {
    /// Every field, in storage order.
    pub const ALL: [ProfileField; 7] = [
        ProfileField::Name,
        ProfileField::Email,
        ProfileField::Phone,
        ProfileField::Cpf,
        ProfileField::BirthDate,
        ProfileField::Address,
        ProfileField::EmergencyContact,
    ];

    /// Fields that must be non-blank for a profile to be saved.
    pub const REQUIRED: [ProfileField; 4] = [
        ProfileField::Name,
        ProfileField::Email,
        ProfileField::Phone,
        ProfileField::Cpf,
    ];

    /// Key used in the stored JSON object.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileField::Name => "name",
            ProfileField::Email => "email",
            ProfileField::Phone => "phone",
            ProfileField::Cpf => "cpf",
            ProfileField::BirthDate => "birthDate",
            ProfileField::Address => "address",
            ProfileField::EmergencyContact => "emergencyContact",
        }
    }

    pub fn is_required(&self) -> bool {
        Self::REQUIRED.contains(self)
    }
}

impl fmt::Display for ProfileField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ProfileField {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "name" => Ok(ProfileField::Name),
            "email" => Ok(ProfileField::Email),
            "phone" => Ok(ProfileField::Phone),
            "cpf" => Ok(ProfileField::Cpf),
            "birthDate" | "birth_date" | "birth-date" => Ok(ProfileField::BirthDate),
            "address" => Ok(ProfileField::Address),
            "emergencyContact" | "emergency_contact" | "emergency-contact" => {
                Ok(ProfileField::EmergencyContact)
            }
            _ => Err(format!("Unknown profile field: {}", s)),
        }
    }
}
