//! One module per screen, plus the shared top bar and patient form.

pub mod dashboard;
pub mod login;
pub mod navbar;
pub mod patient_detail;
pub mod patient_form;
pub mod patient_new;
pub mod questionnaire;
pub mod summary;
