//! # Pharm Assist Core
//!
//! Client-side domain logic for the Pharm Assist clinical assistant.
//!
//! This crate contains everything the screens need that does not touch the network:
//! - Transport models for patients, encounters, answers and suggestions
//! - Patient form validation
//! - The questionnaire wizard state machine
//! - The route table and runtime configuration
//!
//! **No HTTP concerns**: requests, sessions and response decoding belong in `api-client`.

pub mod answers;
pub mod auth;
pub mod config;
pub mod constants;
pub mod encounter;
pub mod error;
pub mod patient;
pub mod routes;
pub mod validation;
pub mod wizard;

pub use answers::{
    Adherence, AlarmSign, AlarmSigns, Answers, Comorbidities, Comorbidity, FlagSet, Habits,
    Symptom, SymptomGroup, Symptoms,
};
pub use config::ClientConfig;
pub use encounter::{
    Encounter, EncounterSummary, Feedback, FeedbackLabel, FeedbackRequest, Suggestions,
};
pub use error::{ConfigError, RouteError, ValidationError, WizardError};
pub use patient::{Medication, NewPatient, Patient, PatientSummary, PatientUpdate};
pub use pharm_types::{Cpf, PatientName};
pub use routes::Route;
pub use validation::{parse_pain_intensity, parse_temperature, PatientForm};
pub use wizard::{SaveSnapshot, Step, StepChange, Wizard};
