//! Validated value types shared by the Pharm Assist crates.
//!
//! These wrap the free text a clinician types into a form and guarantee the
//! shape the server expects once constructed.

use serde::Serialize;

/// The name field was left blank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("patient name is required")]
pub struct NameError;

/// Errors produced while normalising a CPF.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum CpfError {
    #[error("CPF must have 11 digits, found {0}")]
    WrongLength(usize),
}

/// Errors produced while parsing an optional physical measurement.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum MeasurementError {
    #[error("not a number: {0}")]
    NotANumber(String),
    #[error("must be greater than zero")]
    NotPositive,
}

/// A patient's display name: trimmed, never blank.
///
/// Inner whitespace is kept as typed so "Ana  Maria" round-trips to the server unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PatientName(String);

impl PatientName {
    pub fn parse(input: &str) -> Result<Self, NameError> {
        match input.trim() {
            "" => Err(NameError),
            name => Ok(Self(name.to_owned())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for PatientName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A Brazilian CPF reduced to its 11 digits.
///
/// Only the digit count is checked here. Check-digit validation belongs to the
/// server.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cpf(String);

impl Cpf {
    pub const DIGITS: usize = 11;

    /// Strips every non-digit character and requires exactly 11 digits to remain.
    pub fn parse(input: &str) -> Result<Self, CpfError> {
        let digits = only_digits(input);
        if digits.len() != Self::DIGITS {
            return Err(CpfError::WrongLength(digits.len()));
        }
        Ok(Self(digits))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Cpf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl serde::Serialize for Cpf {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for Cpf {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Cpf::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Keeps only the ASCII digits of `input`.
pub fn only_digits(input: &str) -> String {
    input.chars().filter(char::is_ascii_digit).collect()
}

/// Splits a comma-separated free-text field into trimmed, non-empty tokens.
pub fn parse_comma_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Parses an optional positive measurement such as height or weight.
///
/// Blank input means "not provided" and yields `Ok(None)`.
pub fn parse_positive_measurement(input: &str) -> Result<Option<f64>, MeasurementError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let value: f64 = trimmed
        .replace(',', ".")
        .parse()
        .map_err(|_| MeasurementError::NotANumber(trimmed.to_owned()))?;
    if !value.is_finite() {
        return Err(MeasurementError::NotANumber(trimmed.to_owned()));
    }
    if value <= 0.0 {
        return Err(MeasurementError::NotPositive);
    }
    Ok(Some(value))
}
