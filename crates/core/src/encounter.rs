//! Encounter and suggestion transport types.

use crate::answers::{null_as_default, Answers};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One clinical visit as returned by `GET /encounters/:id` and the finalize call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Encounter {
    pub id: String,
    pub patient_id: String,
    /// Stored answers, kept as sent. See [`Encounter::answers`].
    #[serde(default)]
    pub data: Value,
    /// The server sends `{}` or `null` before finalize; see [`Encounter::suggestions`].
    #[serde(default)]
    pub suggestions: Option<Suggestions>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Encounter {
    /// Suggestions, treating an empty object the same as none.
    pub fn suggestions(&self) -> Option<&Suggestions> {
        self.suggestions.as_ref().filter(|s| !s.is_empty())
    }

    pub fn has_suggestions(&self) -> bool {
        self.suggestions().is_some()
    }

    /// Decodes the stored answers. A missing or `null` payload is a fresh questionnaire.
    pub fn answers(&self) -> Result<Answers, serde_json::Error> {
        if self.data.is_null() {
            return Ok(Answers::default());
        }
        serde_json::from_value(self.data.clone())
    }
}

/// Row of `GET /patients/:id/encounters`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EncounterSummary {
    pub id: String,
    pub patient_id: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub has_suggestions: bool,
}

/// Server-computed recommendations. Lists are shown in the order received.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Suggestions {
    #[serde(rename = "nao_farmacologicas", deserialize_with = "null_as_default")]
    pub non_pharmacological: Vec<String>,
    #[serde(rename = "farmacologicas", deserialize_with = "null_as_default")]
    pub pharmacological: Vec<String>,
    #[serde(rename = "alertas", deserialize_with = "null_as_default")]
    pub alerts: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub rationale: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<Feedback>,
}

impl Suggestions {
    pub fn is_empty(&self) -> bool {
        self.non_pharmacological.is_empty()
            && self.pharmacological.is_empty()
            && self.alerts.is_empty()
            && self.rationale.is_empty()
            && self.feedback.is_none()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackLabel {
    Agree,
    Disagree,
}

impl FeedbackLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            FeedbackLabel::Agree => "agree",
            FeedbackLabel::Disagree => "disagree",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FeedbackLabel::Agree => "Agree",
            FeedbackLabel::Disagree => "Adjusted/Disagree",
        }
    }
}

impl std::str::FromStr for FeedbackLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "agree" => Ok(FeedbackLabel::Agree),
            "disagree" => Ok(FeedbackLabel::Disagree),
            other => Err(format!("feedback must be 'agree' or 'disagree', got '{other}'")),
        }
    }
}

/// Clinician feedback attached to suggestions by the server.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    pub label: FeedbackLabel,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub ts: Option<String>,
}

/// Body of `POST /encounters/:id/feedback`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FeedbackRequest {
    pub label: FeedbackLabel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Response of `POST /encounters/:id/feedback`.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct FeedbackResponse {
    #[serde(default)]
    pub suggestions: Suggestions,
}

/// Body of `PUT /encounters/:id`.
#[derive(Clone, Debug, Serialize)]
pub struct SaveAnswersRequest<'a> {
    pub data: &'a Answers,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_suggestions_object_means_absent() {
        let enc: Encounter = serde_json::from_value(json!({
            "id": "e1", "patient_id": "p1", "data": {}, "suggestions": {}
        }))
        .unwrap();
        assert!(!enc.has_suggestions());

        let enc: Encounter = serde_json::from_value(json!({
            "id": "e1", "patient_id": "p1", "suggestions": null
        }))
        .unwrap();
        assert!(enc.suggestions().is_none());
    }

    #[test]
    fn suggestions_keep_server_order() {
        let enc: Encounter = serde_json::from_value(json!({
            "id": "e1", "patient_id": "p1",
            "suggestions": {
                "nao_farmacologicas": ["b", "a"],
                "farmacologicas": [],
                "alertas": ["x"],
                "rationale": ["second", "first"]
            }
        }))
        .unwrap();
        let s = enc.suggestions().unwrap();
        assert_eq!(s.rationale, vec!["second", "first"]);
        assert_eq!(s.non_pharmacological, vec!["b", "a"]);
        assert!(s.feedback.is_none());
    }

    #[test]
    fn unusual_answer_payload_does_not_hide_suggestions() {
        let enc: Encounter = serde_json::from_value(json!({
            "id": "e1", "patient_id": "p1",
            "data": {"comorbidades": ["rinite"], "habitos": null, "adesao": null},
            "suggestions": {"rationale": ["why"], "alertas": null}
        }))
        .unwrap();
        assert_eq!(enc.suggestions().unwrap().rationale, vec!["why"]);
        let answers = enc.answers().unwrap();
        assert_eq!(answers.comorbidities.unrecognised().collect::<Vec<_>>(), vec!["rinite"]);

        let enc: Encounter = serde_json::from_value(json!({
            "id": "e1", "patient_id": "p1", "data": {"motivo": 42}, "suggestions": null
        }))
        .unwrap();
        assert!(enc.answers().is_err());
    }

    #[test]
    fn missing_answers_start_fresh() {
        let enc: Encounter =
            serde_json::from_value(json!({"id": "e1", "patient_id": "p1"})).unwrap();
        assert_eq!(enc.answers().unwrap(), Answers::default());
    }

    #[test]
    fn feedback_round_trips_labels() {
        let fb: Feedback = serde_json::from_value(json!({
            "label": "disagree", "note": null, "ts": "2024-01-01T00:00:00Z"
        }))
        .unwrap();
        assert_eq!(fb.label, FeedbackLabel::Disagree);
        assert_eq!("AGREE".parse::<FeedbackLabel>(), Ok(FeedbackLabel::Agree));
        assert!("maybe".parse::<FeedbackLabel>().is_err());
    }

    #[test]
    fn feedback_request_omits_missing_note() {
        let body = serde_json::to_value(FeedbackRequest {
            label: FeedbackLabel::Agree,
            note: None,
        })
        .unwrap();
        assert_eq!(body, json!({"label": "agree"}));
    }

    #[test]
    fn save_request_wraps_answers_in_data() {
        let answers = Answers::default();
        let body = serde_json::to_value(SaveAnswersRequest { data: &answers }).unwrap();
        assert_eq!(body["data"]["motivo"], "");
    }
}
