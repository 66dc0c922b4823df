//! Patient form validation.
//!
//! The form holds exactly what was typed. Validation runs before any request is built and stops
//! at the first failure, in this order: name, CPF, height, weight. A form that fails validation
//! is left untouched so the clinician can correct it.

use crate::answers::MAX_PAIN_INTENSITY;
use crate::error::{ValidationError, ValidationResult};
use crate::patient::{Medication, NewPatient, Patient, PatientUpdate};
use chrono::NaiveDate;
use pharm_types::{parse_comma_list, parse_positive_measurement, Cpf, PatientName};

/// Raw text of the patient create/edit form.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PatientForm {
    pub name: String,
    pub cpf: String,
    pub birth_date: String,
    pub height_m: String,
    pub weight_kg: String,
    /// Comma-separated allergy labels.
    pub allergies: String,
    /// Comma-separated medication names.
    pub medications: String,
    /// Medications of the record being edited. A typed name that matches one of these keeps
    /// its dose.
    pub known_medications: Vec<Medication>,
}

impl PatientForm {
    /// Populates an edit form from the last fetched snapshot.
    pub fn from_patient(patient: &Patient) -> Self {
        Self {
            name: patient.name.clone(),
            cpf: patient.cpf.clone().unwrap_or_default(),
            birth_date: patient
                .birth_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            height_m: patient.height_m.map(|v| v.to_string()).unwrap_or_default(),
            weight_kg: patient.weight_kg.map(|v| v.to_string()).unwrap_or_default(),
            allergies: patient.allergies.join(", "),
            medications: patient.medication_names().join(", "),
            known_medications: patient.medications.clone(),
        }
    }

    /// Validates the form for `POST /patients`.
    pub fn validate_new(&self) -> ValidationResult<NewPatient> {
        let name = self.validated_name()?;
        let cpf = Cpf::parse(&self.cpf).map_err(ValidationError::InvalidCpf)?;
        let (height_m, weight_kg) = self.validated_measurements()?;
        let birth_date = self.validated_birth_date()?;

        Ok(NewPatient {
            name: name.into_string(),
            cpf,
            birth_date,
            height_m,
            weight_kg,
            allergies: parse_comma_list(&self.allergies),
            medications: self.medication_list(),
        })
    }

    /// Validates the form for `PUT /patients/:id`. The CPF field is ignored.
    pub fn validate_update(&self) -> ValidationResult<PatientUpdate> {
        let name = self.validated_name()?;
        let (height_m, weight_kg) = self.validated_measurements()?;
        let birth_date = self.validated_birth_date()?;

        Ok(PatientUpdate {
            name: name.into_string(),
            birth_date,
            height_m,
            weight_kg,
            allergies: parse_comma_list(&self.allergies),
            medications: self.medication_list(),
        })
    }

    fn validated_name(&self) -> ValidationResult<PatientName> {
        Ok(PatientName::parse(&self.name)?)
    }

    fn validated_measurements(&self) -> ValidationResult<(Option<f64>, Option<f64>)> {
        let height = parse_positive_measurement(&self.height_m)
            .map_err(ValidationError::InvalidHeight)?;
        let weight = parse_positive_measurement(&self.weight_kg)
            .map_err(ValidationError::InvalidWeight)?;
        Ok((height, weight))
    }

    fn validated_birth_date(&self) -> ValidationResult<Option<NaiveDate>> {
        let raw = self.birth_date.trim();
        if raw.is_empty() {
            return Ok(None);
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| ValidationError::InvalidBirthDate(raw.to_string()))
    }

    fn medication_list(&self) -> Vec<Medication> {
        parse_comma_list(&self.medications)
            .into_iter()
            .map(|name| {
                self.known_medications
                    .iter()
                    .find(|known| known.name == name)
                    .cloned()
                    .unwrap_or_else(|| Medication::named(name))
            })
            .collect()
    }
}

/// Parses the pain intensity typed on the pain step. Blank means zero.
pub fn parse_pain_intensity(input: &str) -> ValidationResult<u8> {
    let raw = input.trim();
    if raw.is_empty() {
        return Ok(0);
    }
    match raw.parse::<u8>() {
        Ok(value) if value <= MAX_PAIN_INTENSITY => Ok(value),
        _ => Err(ValidationError::InvalidPainIntensity(raw.to_string())),
    }
}

/// Parses the peak temperature in degrees Celsius. Blank clears it.
pub fn parse_temperature(input: &str) -> ValidationResult<Option<f64>> {
    let raw = input.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    match raw.replace(',', ".").parse::<f64>() {
        Ok(value) if (30.0..=45.0).contains(&value) => Ok(Some(value)),
        _ => Err(ValidationError::InvalidTemperature(raw.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pharm_types::{CpfError, MeasurementError};

    fn ana() -> PatientForm {
        PatientForm {
            name: "Ana Silva".into(),
            cpf: "12345678901".into(),
            height_m: "1.65".into(),
            weight_kg: "60".into(),
            ..PatientForm::default()
        }
    }

    #[test]
    fn valid_form_builds_payload() {
        let form = PatientForm {
            allergies: "dipirona, , penicilina ".into(),
            medications: "losartana,,metformina".into(),
            ..ana()
        };
        let payload = form.validate_new().unwrap();
        assert_eq!(payload.name, "Ana Silva");
        assert_eq!(payload.cpf.as_str(), "12345678901");
        assert_eq!(payload.height_m, Some(1.65));
        assert_eq!(payload.weight_kg, Some(60.0));
        assert_eq!(payload.allergies, vec!["dipirona", "penicilina"]);
        assert_eq!(
            payload.medications,
            vec![Medication::named("losartana"), Medication::named("metformina")]
        );
    }

    #[test]
    fn blank_name_fails_first() {
        let form = PatientForm {
            name: "   ".into(),
            cpf: "1".into(),
            ..PatientForm::default()
        };
        assert_eq!(form.validate_new().unwrap_err(), ValidationError::MissingName);
    }

    #[test]
    fn short_cpf_is_rejected() {
        let form = PatientForm {
            cpf: "123.456.789-0".into(),
            ..ana()
        };
        assert_eq!(
            form.validate_new().unwrap_err(),
            ValidationError::InvalidCpf(CpfError::WrongLength(10))
        );
    }

    #[test]
    fn cpf_checked_before_measurements() {
        let form = PatientForm {
            cpf: "abc".into(),
            height_m: "-1".into(),
            ..ana()
        };
        assert!(matches!(
            form.validate_new().unwrap_err(),
            ValidationError::InvalidCpf(_)
        ));
    }

    #[test]
    fn non_positive_measurements_are_rejected() {
        let form = PatientForm {
            height_m: "0".into(),
            ..ana()
        };
        assert_eq!(
            form.validate_new().unwrap_err(),
            ValidationError::InvalidHeight(MeasurementError::NotPositive)
        );

        let form = PatientForm {
            weight_kg: "-3".into(),
            ..ana()
        };
        assert_eq!(
            form.validate_new().unwrap_err(),
            ValidationError::InvalidWeight(MeasurementError::NotPositive)
        );
    }

    #[test]
    fn missing_measurements_are_allowed() {
        let form = PatientForm {
            height_m: "".into(),
            weight_kg: " ".into(),
            ..ana()
        };
        let payload = form.validate_new().unwrap();
        assert_eq!(payload.height_m, None);
        assert_eq!(payload.weight_kg, None);
    }

    #[test]
    fn birth_date_must_be_iso() {
        let form = PatientForm {
            birth_date: "01/05/1990".into(),
            ..ana()
        };
        assert!(matches!(
            form.validate_new().unwrap_err(),
            ValidationError::InvalidBirthDate(_)
        ));
        let form = PatientForm {
            birth_date: "1990-05-01".into(),
            ..ana()
        };
        assert_eq!(
            form.validate_new().unwrap().birth_date,
            NaiveDate::from_ymd_opt(1990, 5, 1)
        );
    }

    #[test]
    fn update_ignores_cpf() {
        let form = PatientForm {
            cpf: "".into(),
            ..ana()
        };
        let update = form.validate_update().unwrap();
        assert_eq!(update.name, "Ana Silva");
    }

    #[test]
    fn edit_form_round_trips_snapshot() {
        let patient = Patient {
            id: "p1".into(),
            name: "Ana".into(),
            cpf: Some("12345678901".into()),
            birth_date: None,
            height_m: Some(1.65),
            weight_kg: None,
            imc: None,
            allergies: vec!["a".into(), "b".into()],
            medications: vec![Medication::named("m")],
        };
        let form = PatientForm::from_patient(&patient);
        assert_eq!(form.height_m, "1.65");
        assert_eq!(form.weight_kg, "");
        assert_eq!(form.allergies, "a, b");
        assert_eq!(form.medications, "m");
        let update = form.validate_update().unwrap();
        assert_eq!(update.allergies, patient.allergies);
        assert_eq!(update.height_m, Some(1.65));
    }

    #[test]
    fn edit_keeps_doses_of_unchanged_medications() {
        let patient = Patient {
            id: "p1".into(),
            name: "Ana".into(),
            cpf: None,
            birth_date: None,
            height_m: None,
            weight_kg: None,
            imc: None,
            allergies: vec![],
            medications: vec![
                Medication {
                    name: "losartana".into(),
                    dose: Some("50 mg".into()),
                },
                Medication {
                    name: "metformina".into(),
                    dose: Some("850 mg".into()),
                },
            ],
        };
        let mut form = PatientForm::from_patient(&patient);
        assert_eq!(
            form.validate_update().unwrap().medications,
            patient.medications
        );

        form.medications = "losartana, dipirona".into();
        let meds = form.validate_update().unwrap().medications;
        assert_eq!(meds[0].dose.as_deref(), Some("50 mg"));
        assert_eq!(meds[1], Medication::named("dipirona"));
    }

    #[test]
    fn pain_intensity_is_bounded() {
        assert_eq!(parse_pain_intensity(""), Ok(0));
        assert_eq!(parse_pain_intensity(" 7 "), Ok(7));
        assert_eq!(parse_pain_intensity("10"), Ok(10));
        assert!(matches!(
            parse_pain_intensity("11"),
            Err(ValidationError::InvalidPainIntensity(_))
        ));
        assert!(parse_pain_intensity("-1").is_err());
        assert!(parse_pain_intensity("a lot").is_err());
    }

    #[test]
    fn temperature_accepts_decimal_comma() {
        assert_eq!(parse_temperature(""), Ok(None));
        assert_eq!(parse_temperature("38,5"), Ok(Some(38.5)));
        assert_eq!(parse_temperature("39"), Ok(Some(39.0)));
        assert!(matches!(
            parse_temperature("hot"),
            Err(ValidationError::InvalidTemperature(_))
        ));
        assert!(parse_temperature("385").is_err());
    }
}
