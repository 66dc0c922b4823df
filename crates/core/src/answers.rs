//! Questionnaire answers.
//!
//! A typed record of everything the questionnaire collects. Wire keys follow the server's
//! Portuguese field names; the set-valued categories are small ordered sets so duplicates are
//! impossible and order never matters.
//!
//! The server stores the payload as a free-form object, so decoding is lenient: `null` reads as
//! the default, set members this client does not know are carried along untouched, and keys it
//! does not edit are sent back as they came.

use serde::de::DeserializeOwned;
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// Adherence to the medication the patient already takes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Adherence {
    #[default]
    #[serde(rename = "boa")]
    Good,
    #[serde(rename = "irregular")]
    Irregular,
    #[serde(rename = "ruim")]
    Poor,
}

impl Adherence {
    pub const ALL: [Adherence; 3] = [Adherence::Good, Adherence::Irregular, Adherence::Poor];

    pub fn label(self) -> &'static str {
        match self {
            Adherence::Good => "Good",
            Adherence::Irregular => "Irregular",
            Adherence::Poor => "Poor",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Comorbidity {
    #[serde(rename = "ulcera_gastrica")]
    GastricUlcer,
    #[serde(rename = "asma")]
    Asthma,
    #[serde(rename = "hipertensao")]
    Hypertension,
    #[serde(rename = "diabetes")]
    Diabetes,
}

impl Comorbidity {
    pub const ALL: [Comorbidity; 4] = [
        Comorbidity::GastricUlcer,
        Comorbidity::Asthma,
        Comorbidity::Hypertension,
        Comorbidity::Diabetes,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Comorbidity::GastricUlcer => "Gastric ulcer/gastritis",
            Comorbidity::Asthma => "Asthma",
            Comorbidity::Hypertension => "Hypertension",
            Comorbidity::Diabetes => "Diabetes",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AlarmSign {
    #[serde(rename = "dispneia")]
    Dyspnea,
    #[serde(rename = "dor_toracica")]
    ChestPain,
    #[serde(rename = "rigidez_nuca")]
    NeckStiffness,
    #[serde(rename = "confusao")]
    Confusion,
    #[serde(rename = "sangramento_gi")]
    GiBleeding,
    #[serde(rename = "vomitos_persistentes")]
    PersistentVomiting,
}

impl AlarmSign {
    pub const ALL: [AlarmSign; 6] = [
        AlarmSign::Dyspnea,
        AlarmSign::ChestPain,
        AlarmSign::NeckStiffness,
        AlarmSign::Confusion,
        AlarmSign::GiBleeding,
        AlarmSign::PersistentVomiting,
    ];

    pub fn label(self) -> &'static str {
        match self {
            AlarmSign::Dyspnea => "Severe dyspnea",
            AlarmSign::ChestPain => "Chest pain",
            AlarmSign::NeckStiffness => "Neck stiffness",
            AlarmSign::Confusion => "Confusion/altered consciousness",
            AlarmSign::GiBleeding => "Gastrointestinal bleeding",
            AlarmSign::PersistentVomiting => "Persistent vomiting",
        }
    }
}

/// A duplicate-free set of flags from one category.
///
/// Members sent by the server that are not variants of `T` are kept as text and written back
/// after the known flags.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlagSet<T: Ord> {
    flags: BTreeSet<T>,
    unrecognised: BTreeSet<String>,
}

impl<T: Ord> Default for FlagSet<T> {
    fn default() -> Self {
        Self {
            flags: BTreeSet::new(),
            unrecognised: BTreeSet::new(),
        }
    }
}

impl<T: Ord + Copy> FlagSet<T> {
    pub fn contains(&self, flag: T) -> bool {
        self.flags.contains(&flag)
    }

    /// Returns `true` if the flag was not already present.
    pub fn insert(&mut self, flag: T) -> bool {
        self.flags.insert(flag)
    }

    /// Returns `true` if the flag was present.
    pub fn remove(&mut self, flag: T) -> bool {
        self.flags.remove(&flag)
    }

    /// Sets membership explicitly, as a checkbox does.
    pub fn set(&mut self, flag: T, present: bool) {
        if present {
            self.flags.insert(flag);
        } else {
            self.flags.remove(&flag);
        }
    }

    /// Flips membership and returns the new state.
    pub fn toggle(&mut self, flag: T) -> bool {
        if self.flags.remove(&flag) {
            false
        } else {
            self.flags.insert(flag);
            true
        }
    }

    /// Known flags, in category order.
    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        self.flags.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    /// Members the server sent that this client has no variant for.
    pub fn unrecognised(&self) -> impl Iterator<Item = &str> + '_ {
        self.unrecognised.iter().map(String::as_str)
    }
}

impl<T: Ord> FromIterator<T> for FlagSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            flags: iter.into_iter().collect(),
            unrecognised: BTreeSet::new(),
        }
    }
}

impl<T: Ord + Serialize> Serialize for FlagSet<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(self.flags.len() + self.unrecognised.len()))?;
        for flag in &self.flags {
            seq.serialize_element(flag)?;
        }
        for other in &self.unrecognised {
            seq.serialize_element(other)?;
        }
        seq.end()
    }
}

impl<'de, T: Ord + DeserializeOwned> Deserialize<'de> for FlagSet<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let items = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
        let mut set = Self::default();
        for item in items {
            match serde_json::from_value::<T>(item.clone()) {
                Ok(flag) => {
                    set.flags.insert(flag);
                }
                Err(_) => match item {
                    Value::String(other) => {
                        tracing::debug!(member = %other, "keeping unrecognised set member");
                        set.unrecognised.insert(other);
                    }
                    other => tracing::warn!(%other, "dropping non-text set member"),
                },
            }
        }
        Ok(set)
    }
}

pub type Comorbidities = FlagSet<Comorbidity>;
pub type AlarmSigns = FlagSet<AlarmSign>;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Habits {
    #[serde(rename = "tabagismo")]
    pub smoking: bool,
    #[serde(rename = "sono_ruim")]
    pub poor_sleep: bool,
}

/// Symptom checkboxes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Symptom {
    Cough,
    RunnyNose,
    SoreThroat,
    NasalCongestion,
    Headache,
    Heartburn,
    Nausea,
    LowBackPain,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SymptomGroup {
    Respiratory,
    Other,
}

impl Symptom {
    pub const ALL: [Symptom; 8] = [
        Symptom::Cough,
        Symptom::RunnyNose,
        Symptom::SoreThroat,
        Symptom::NasalCongestion,
        Symptom::Headache,
        Symptom::Heartburn,
        Symptom::Nausea,
        Symptom::LowBackPain,
    ];

    pub fn group(self) -> SymptomGroup {
        match self {
            Symptom::Cough | Symptom::RunnyNose | Symptom::SoreThroat | Symptom::NasalCongestion => {
                SymptomGroup::Respiratory
            }
            _ => SymptomGroup::Other,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Symptom::Cough => "Cough",
            Symptom::RunnyNose => "Runny nose",
            Symptom::SoreThroat => "Sore throat",
            Symptom::NasalCongestion => "Nasal congestion",
            Symptom::Headache => "Headache",
            Symptom::Heartburn => "Heartburn/acidity",
            Symptom::Nausea => "Nausea",
            Symptom::LowBackPain => "Low-back pain",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Symptoms {
    #[serde(rename = "tosse")]
    pub cough: bool,
    #[serde(rename = "coriza")]
    pub runny_nose: bool,
    #[serde(rename = "dor_garganta")]
    pub sore_throat: bool,
    #[serde(rename = "congestao_nasal")]
    pub nasal_congestion: bool,
    #[serde(rename = "dor_cabeca")]
    pub headache: bool,
    #[serde(rename = "acidez")]
    pub heartburn: bool,
    #[serde(rename = "nausea")]
    pub nausea: bool,
    #[serde(rename = "dor_lombar")]
    pub low_back_pain: bool,
}

impl Symptoms {
    pub fn get(&self, symptom: Symptom) -> bool {
        match symptom {
            Symptom::Cough => self.cough,
            Symptom::RunnyNose => self.runny_nose,
            Symptom::SoreThroat => self.sore_throat,
            Symptom::NasalCongestion => self.nasal_congestion,
            Symptom::Headache => self.headache,
            Symptom::Heartburn => self.heartburn,
            Symptom::Nausea => self.nausea,
            Symptom::LowBackPain => self.low_back_pain,
        }
    }

    pub fn set(&mut self, symptom: Symptom, present: bool) {
        let slot = match symptom {
            Symptom::Cough => &mut self.cough,
            Symptom::RunnyNose => &mut self.runny_nose,
            Symptom::SoreThroat => &mut self.sore_throat,
            Symptom::NasalCongestion => &mut self.nasal_congestion,
            Symptom::Headache => &mut self.headache,
            Symptom::Heartburn => &mut self.heartburn,
            Symptom::Nausea => &mut self.nausea,
            Symptom::LowBackPain => &mut self.low_back_pain,
        };
        *slot = present;
    }
}

/// Everything the questionnaire collects for one encounter.
///
/// `pain_intensity` and `fever_peak_celsius` are only meaningful while their guarding flag is
/// set. Clearing the flag leaves the value in place.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Answers {
    #[serde(rename = "motivo", deserialize_with = "null_as_default")]
    pub reason: String,
    #[serde(rename = "duracao", deserialize_with = "null_as_default")]
    pub duration: String,
    #[serde(rename = "dor", deserialize_with = "null_as_default")]
    pub pain: bool,
    #[serde(rename = "dor_intensidade", deserialize_with = "lenient_intensity")]
    pub pain_intensity: u8,
    #[serde(rename = "febre", deserialize_with = "null_as_default")]
    pub fever: bool,
    #[serde(rename = "febre_temp_max", deserialize_with = "lenient_temperature")]
    pub fever_peak_celsius: Option<f64>,
    #[serde(rename = "adesao", deserialize_with = "lenient_adherence")]
    pub adherence: Adherence,
    #[serde(rename = "comorbidades")]
    pub comorbidities: Comorbidities,
    #[serde(rename = "habitos", deserialize_with = "null_as_default")]
    pub habits: Habits,
    #[serde(rename = "sintomas", deserialize_with = "null_as_default")]
    pub symptoms: Symptoms,
    #[serde(rename = "sinais_alarme")]
    pub alarm_signs: AlarmSigns,
    /// Keys this client does not edit, written back unchanged.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Answers {
    /// Pain intensity, only when pain was reported.
    pub fn effective_pain_intensity(&self) -> Option<u8> {
        self.pain.then_some(self.pain_intensity)
    }

    /// Peak temperature, only when fever was reported.
    pub fn effective_fever_peak(&self) -> Option<f64> {
        if self.fever {
            self.fever_peak_celsius
        } else {
            None
        }
    }
}

pub const MAX_PAIN_INTENSITY: u8 = 10;

/// Reads `null` as `T::default()`.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Unknown or missing adherence reads as the default.
fn lenient_adherence<'de, D>(deserializer: D) -> Result<Adherence, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?.unwrap_or(Value::Null);
    if value.is_null() {
        return Ok(Adherence::default());
    }
    Ok(serde_json::from_value(value.clone()).unwrap_or_else(|_| {
        tracing::warn!(%value, "unknown adherence, using default");
        Adherence::default()
    }))
}

/// Accepts a number or numeric string; anything else counts as zero.
fn lenient_intensity<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let number = value.as_ref().and_then(json_number).unwrap_or(0.0);
    Ok(number.clamp(0.0, f64::from(MAX_PAIN_INTENSITY)).round() as u8)
}

/// Accepts a number, numeric string or null. Earlier clients stored the raw input text.
fn lenient_temperature<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(json_number))
}

fn json_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', ".").parse().ok(),
        _ => None,
    }
}
