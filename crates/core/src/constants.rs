//! Constants used throughout the Pharm Assist core crate.
//!
//! Defaults, environment variable names and download filenames live here so the
//! binaries and the screens agree on them.

/// Base URL used when `PHARM_ASSIST_API` is not set.
pub const DEFAULT_API_BASE: &str = "http://localhost:5000";

/// Environment variable overriding the API base URL.
pub const API_BASE_ENV: &str = "PHARM_ASSIST_API";

/// Environment variable overriding the session file location.
pub const SESSION_FILE_ENV: &str = "PHARM_ASSIST_SESSION_FILE";

/// Environment variable overriding where downloads are written.
pub const DOWNLOAD_DIR_ENV: &str = "PHARM_ASSIST_DOWNLOAD_DIR";

/// Directory (under the home directory) holding client state.
pub const STATE_DIR_NAME: &str = ".pharm-assist";

/// Filename of the persisted session.
pub const SESSION_FILENAME: &str = "session.json";

/// Filename used when saving the bulk patient export.
pub const PATIENTS_CSV_FILENAME: &str = "pacientes.csv";

/// Placeholder shown for values the server did not provide.
pub const MISSING_VALUE: &str = "—";

/// Filename used when saving a patient's record PDF.
pub fn patient_pdf_filename(patient_id: &str) -> String {
    format!("prontuario_{patient_id}.pdf")
}

/// Filename used when saving an encounter PDF.
pub fn encounter_pdf_filename(encounter_id: &str) -> String {
    format!("atendimento_{encounter_id}.pdf")
}
