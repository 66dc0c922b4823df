use pharm_types::{CpfError, MeasurementError, NameError};

/// Client-side validation failures. These block submission before any request is built.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("patient name is required")]
    MissingName,
    #[error("invalid CPF: {0}")]
    InvalidCpf(#[source] CpfError),
    #[error("invalid height: {0}")]
    InvalidHeight(#[source] MeasurementError),
    #[error("invalid weight: {0}")]
    InvalidWeight(#[source] MeasurementError),
    #[error("invalid birth date (expected YYYY-MM-DD): {0}")]
    InvalidBirthDate(String),
    #[error("pain intensity must be between 0 and 10, got {0}")]
    InvalidPainIntensity(String),
    #[error("invalid temperature: {0}")]
    InvalidTemperature(String),
}

impl From<NameError> for ValidationError {
    fn from(_: NameError) -> Self {
        ValidationError::MissingName
    }
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    #[error("no screen for path: {0}")]
    UnknownPath(String),
    #[error("missing identifier in path: {0}")]
    MissingId(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("API base URL must start with http:// or https://, got: {0}")]
    InvalidApiBase(String),
    #[error("API base URL cannot be empty")]
    EmptyApiBase,
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum WizardError {
    #[error("finalize is only available on the last step (currently on step {0})")]
    NotOnLastStep(usize),
}

pub type ValidationResult<T> = std::result::Result<T, ValidationError>;
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
