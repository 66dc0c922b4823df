//! Patient transport types.
//!
//! These mirror the JSON the API exchanges. The server owns every patient; the client only
//! keeps the copy a screen fetched.

use crate::constants::MISSING_VALUE;
use chrono::NaiveDate;
use pharm_types::Cpf;
use serde::{Deserialize, Serialize};

/// A medication the patient is currently taking.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Medication {
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dose: Option<String>,
}

impl Medication {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dose: None,
        }
    }
}

/// Full patient record as returned by `GET /patients/:id`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: String,
    pub name: String,
    /// Older records may predate the CPF column and come back as `null`.
    #[serde(default)]
    pub cpf: Option<String>,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    #[serde(default)]
    pub height_m: Option<f64>,
    #[serde(default)]
    pub weight_kg: Option<f64>,
    /// Body-mass index computed by the server.
    #[serde(default)]
    pub imc: Option<f64>,
    #[serde(default)]
    pub allergies: Vec<String>,
    #[serde(default, rename = "meds")]
    pub medications: Vec<Medication>,
}

impl Patient {
    pub fn medication_names(&self) -> Vec<&str> {
        self.medications.iter().map(|m| m.name.as_str()).collect()
    }
}

/// Row of `GET /patients`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PatientSummary {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub imc: Option<f64>,
    #[serde(default)]
    pub height_m: Option<f64>,
    #[serde(default)]
    pub weight_kg: Option<f64>,
}

/// Body of `POST /patients`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NewPatient {
    pub name: String,
    pub cpf: Cpf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<NaiveDate>,
    pub height_m: Option<f64>,
    pub weight_kg: Option<f64>,
    pub allergies: Vec<String>,
    #[serde(rename = "meds")]
    pub medications: Vec<Medication>,
}

/// Body of `PUT /patients/:id`. A full replacement of every editable field; CPF is immutable
/// and therefore never sent.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PatientUpdate {
    pub name: String,
    pub birth_date: Option<NaiveDate>,
    pub height_m: Option<f64>,
    pub weight_kg: Option<f64>,
    pub allergies: Vec<String>,
    #[serde(rename = "meds")]
    pub medications: Vec<Medication>,
}

/// Response of any create call that only reports the new identifier.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Created {
    pub id: String,
}

/// Patients whose name contains `query`, ignoring case and surrounding whitespace.
///
/// An empty query keeps every patient. Order is preserved.
pub fn filter_by_name<'a>(patients: &'a [PatientSummary], query: &str) -> Vec<&'a PatientSummary> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return patients.iter().collect();
    }
    patients
        .iter()
        .filter(|p| p.name.to_lowercase().contains(&needle))
        .collect()
}

/// Renders an optional number, using a dash when the server sent nothing.
pub fn display_optional(value: Option<f64>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => MISSING_VALUE.to_string(),
    }
}

/// Joins labels for display, using a dash for an empty list.
pub fn display_list<S: AsRef<str>>(items: &[S], separator: &str) -> String {
    if items.is_empty() {
        return MISSING_VALUE.to_string();
    }
    items
        .iter()
        .map(|s| s.as_ref())
        .collect::<Vec<_>>()
        .join(separator)
}
