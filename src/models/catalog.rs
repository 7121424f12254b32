//! Fixed catalogue of doctors available for booking.

use super::Specialty;
use serde::Serialize;

/// A doctor listed in the catalogue.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Doctor {
    pub id: &'static str,
    pub name: &'static str,
    pub specialty: Specialty,
    pub experience_years: u8,
    pub rating: f32,
    pub description: &'static str,
}

const DOCTORS: &[Doctor] = &[
    Doctor {
        id: "1",
        name: "Dr. João Silva",
        specialty: Specialty::ClinicoGeral,
        experience_years: 15,
        rating: 4.8,
        description: "Médico clínico geral com vasta experiência em atendimento primário.",
    },
    Doctor {
        id: "2",
        name: "Dra. Maria Santos",
        specialty: Specialty::Cardiologia,
        experience_years: 12,
        rating: 4.9,
        description: "Cardiologista especializada em prevenção e tratamento de doenças cardíacas.",
    },
    Doctor {
        id: "3",
        name: "Dr. Carlos Oliveira",
        specialty: Specialty::Dermatologia,
        experience_years: 18,
        rating: 4.7,
        description: "Dermatologista com expertise em cirurgia dermatológica e estética.",
    },
];

/// List doctors, optionally restricted to one specialty.
pub fn doctors_for(specialty: Option<Specialty>) -> Vec<&'static Doctor> {
    DOCTORS
        .iter()
        .filter(|d| specialty.is_none_or(|s| d.specialty == s))
        .collect()
}
