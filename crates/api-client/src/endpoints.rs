//! Typed calls, one per endpoint of the Pharm Assist API.

use crate::client::{Download, HttpClient};
use crate::error::ApiResult;
use crate::session::Session;
use pharm_core::auth::{LoginRequest, LoginResponse};
use pharm_core::encounter::{FeedbackResponse, SaveAnswersRequest};
use pharm_core::patient::Created;
use pharm_core::{
    Answers, ClientConfig, Encounter, EncounterSummary, FeedbackRequest, NewPatient, Patient,
    PatientSummary, PatientUpdate, Suggestions,
};
use reqwest::Method;

fn segment(id: &str) -> String {
    urlencoding::encode(id.trim()).into_owned()
}

/// The API as the screens see it.
#[derive(Clone, Debug)]
pub struct PharmApi {
    http: HttpClient,
}

impl PharmApi {
    pub fn new(config: &ClientConfig, session: Session) -> ApiResult<Self> {
        Ok(Self {
            http: HttpClient::new(config, session)?,
        })
    }

    pub fn from_client(http: HttpClient) -> Self {
        Self { http }
    }

    pub fn session(&self) -> &Session {
        self.http.session()
    }

    /// `POST /auth/login`. Does not touch the session; the caller decides what to keep.
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<LoginResponse> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        self.http
            .json(Method::POST, "/auth/login", Some(&body))
            .await
    }

    pub async fn list_patients(&self) -> ApiResult<Vec<PatientSummary>> {
        self.http.json::<_, ()>(Method::GET, "/patients", None).await
    }

    pub async fn create_patient(&self, patient: &NewPatient) -> ApiResult<Created> {
        self.http
            .json(Method::POST, "/patients", Some(patient))
            .await
    }

    pub async fn get_patient(&self, patient_id: &str) -> ApiResult<Patient> {
        let path = format!("/patients/{}", segment(patient_id));
        self.http.json::<_, ()>(Method::GET, &path, None).await
    }

    /// `PUT /patients/:id`, replacing every editable field.
    pub async fn update_patient(&self, patient_id: &str, update: &PatientUpdate) -> ApiResult<()> {
        let path = format!("/patients/{}", segment(patient_id));
        self.http.send(Method::PUT, &path, Some(update)).await
    }

    pub async fn delete_patient(&self, patient_id: &str) -> ApiResult<()> {
        let path = format!("/patients/{}", segment(patient_id));
        self.http.send::<()>(Method::DELETE, &path, None).await
    }

    pub async fn list_encounters(&self, patient_id: &str) -> ApiResult<Vec<EncounterSummary>> {
        let path = format!("/patients/{}/encounters", segment(patient_id));
        self.http.json::<_, ()>(Method::GET, &path, None).await
    }

    /// `POST /patients/:id/encounters`; returns the new encounter's id.
    pub async fn start_encounter(&self, patient_id: &str) -> ApiResult<Created> {
        let path = format!("/patients/{}/encounters", segment(patient_id));
        self.http.json::<_, ()>(Method::POST, &path, None).await
    }

    /// `PUT /encounters/:id`, the partial save of questionnaire answers.
    pub async fn save_answers(&self, encounter_id: &str, answers: &Answers) -> ApiResult<()> {
        let path = format!("/encounters/{}", segment(encounter_id));
        let body = SaveAnswersRequest { data: answers };
        self.http.send(Method::PUT, &path, Some(&body)).await
    }

    pub async fn finalize_encounter(&self, encounter_id: &str) -> ApiResult<Encounter> {
        let path = format!("/encounters/{}/finalize", segment(encounter_id));
        self.http.json::<_, ()>(Method::POST, &path, None).await
    }

    pub async fn get_encounter(&self, encounter_id: &str) -> ApiResult<Encounter> {
        let path = format!("/encounters/{}", segment(encounter_id));
        self.http.json::<_, ()>(Method::GET, &path, None).await
    }

    /// `POST /encounters/:id/feedback`; returns the suggestions as the server now has them.
    pub async fn submit_feedback(
        &self,
        encounter_id: &str,
        feedback: &FeedbackRequest,
    ) -> ApiResult<Suggestions> {
        let path = format!("/encounters/{}/feedback", segment(encounter_id));
        let response: FeedbackResponse = self.http.json(Method::POST, &path, Some(feedback)).await?;
        Ok(response.suggestions)
    }

    pub async fn export_patients_csv(&self) -> ApiResult<Download> {
        self.http.download("/export/patients.csv").await
    }

    pub async fn patient_pdf(&self, patient_id: &str) -> ApiResult<Download> {
        let path = format!("/pdf/patient/{}", segment(patient_id));
        self.http.download(&path).await
    }

    pub async fn encounter_pdf(&self, encounter_id: &str) -> ApiResult<Download> {
        let path = format!("/pdf/encounter/{}", segment(encounter_id));
        self.http.download(&path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{spawn, test_client};
    use axum::extract::Path;
    use axum::http::header;
    use axum::routing::{get, post, put};
    use axum::{Json, Router};
    use pharm_core::{Comorbidity, FeedbackLabel, PatientForm};
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};

    type Captured = Arc<Mutex<Vec<(String, Value)>>>;

    fn router(captured: Captured) -> Router {
        let put_captured = captured.clone();
        let post_captured = captured.clone();
        let fb_captured = captured;
        Router::new()
            .route(
                "/auth/login",
                post(|Json(body): Json<Value>| async move {
                    Json(json!({"token": "demo", "user": {"email": body["email"]}}))
                }),
            )
            .route(
                "/patients",
                get(|| async {
                    Json(json!([
                        {"id": "p1", "name": "Ana Silva", "imc": 22.04, "height_m": 1.65, "weight_kg": 60.0},
                        {"id": "p2", "name": "Bruno", "imc": null, "height_m": null, "weight_kg": null}
                    ]))
                })
                .post(move |Json(body): Json<Value>| {
                    let captured = post_captured.clone();
                    async move {
                        captured.lock().unwrap().push(("create".into(), body));
                        (axum::http::StatusCode::CREATED, Json(json!({"id": "new-id"})))
                    }
                }),
            )
            .route(
                "/encounters/:id",
                put(move |Path(id): Path<String>, Json(body): Json<Value>| {
                    let captured = put_captured.clone();
                    async move {
                        captured.lock().unwrap().push((id, body));
                        Json(json!({"ok": true}))
                    }
                }),
            )
            .route(
                "/encounters/:id/feedback",
                post(move |Path(id): Path<String>, Json(body): Json<Value>| {
                    let captured = fb_captured.clone();
                    async move {
                        captured.lock().unwrap().push((id, body.clone()));
                        Json(json!({"ok": true, "suggestions": {
                            "nao_farmacologicas": ["rest"], "farmacologicas": [],
                            "alertas": [], "rationale": ["why"],
                            "feedback": {"label": body["label"], "note": null, "ts": "2024-01-01T00:00:00Z"}
                        }}))
                    }
                }),
            )
            .route(
                "/pdf/patient/:id",
                get(|Path(id): Path<String>| async move {
                    ([(header::CONTENT_TYPE, "application/pdf")], format!("%PDF-{id}"))
                }),
            )
    }

    async fn api() -> (PharmApi, Captured) {
        let captured: Captured = Arc::default();
        let base = spawn(router(captured.clone())).await;
        (
            PharmApi::from_client(test_client(&base, Session::in_memory())),
            captured,
        )
    }

    #[tokio::test]
    async fn login_returns_token() {
        let (api, _) = api().await;
        let res = api.login("a@b.c", "pw").await.unwrap();
        assert_eq!(res.token, "demo");
        assert_eq!(res.user.unwrap().email, "a@b.c");
        assert!(!api.session().is_signed_in());
    }

    #[tokio::test]
    async fn list_patients_decodes_rows() {
        let (api, _) = api().await;
        let patients = api.list_patients().await.unwrap();
        assert_eq!(patients.len(), 2);
        assert_eq!(patients[0].imc, Some(22.04));
        assert_eq!(patients[1].height_m, None);
    }

    #[tokio::test]
    async fn create_patient_sends_validated_payload() {
        let (api, captured) = api().await;
        let form = PatientForm {
            name: " Ana Silva ".into(),
            cpf: "123.456.789-01".into(),
            height_m: "1.65".into(),
            weight_kg: "60".into(),
            medications: "losartana".into(),
            ..PatientForm::default()
        };
        let created = api
            .create_patient(&form.validate_new().unwrap())
            .await
            .unwrap();
        assert_eq!(created.id, "new-id");

        let captured = captured.lock().unwrap();
        let (_, body) = &captured[0];
        assert_eq!(body["name"], "Ana Silva");
        assert_eq!(body["cpf"], "12345678901");
        assert_eq!(body["meds"], json!([{"nome": "losartana"}]));
        assert_eq!(body["allergies"], json!([]));
    }

    #[tokio::test]
    async fn save_answers_wraps_in_data() {
        let (api, captured) = api().await;
        let mut answers = Answers {
            reason: "tosse".into(),
            ..Answers::default()
        };
        answers.comorbidities.insert(Comorbidity::Asthma);
        api.save_answers("e1", &answers).await.unwrap();

        let captured = captured.lock().unwrap();
        let (id, body) = &captured[0];
        assert_eq!(id, "e1");
        assert_eq!(body["data"]["motivo"], "tosse");
        assert_eq!(body["data"]["comorbidades"], json!(["asma"]));
    }

    #[tokio::test]
    async fn feedback_returns_updated_suggestions() {
        let (api, captured) = api().await;
        let suggestions = api
            .submit_feedback(
                "e1",
                &FeedbackRequest {
                    label: FeedbackLabel::Disagree,
                    note: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(suggestions.rationale, vec!["why"]);
        assert_eq!(
            suggestions.feedback.unwrap().label,
            FeedbackLabel::Disagree
        );
        assert_eq!(captured.lock().unwrap()[0].1, json!({"label": "disagree"}));
    }

    #[tokio::test]
    async fn pdf_download_is_binary() {
        let (api, _) = api().await;
        let pdf = api.patient_pdf("p1").await.unwrap();
        assert_eq!(pdf.bytes, b"%PDF-p1".to_vec());
    }

    #[tokio::test]
    async fn missing_endpoint_surfaces_status() {
        let (api, _) = api().await;
        let err = api.get_encounter("nope").await.unwrap_err();
        assert_eq!(err.status(), Some(405));
    }

    #[test]
    fn ids_are_escaped_as_one_segment() {
        assert_eq!(segment("a/b"), "a%2Fb");
        assert_eq!(segment(" abc "), "abc");
    }
}
