//! In-process fake Pharm Assist API and scripted shell for scenario tests.

#![allow(dead_code)]

use api_client::{HttpClient, PharmApi, Session};
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use pharm_cli::{Console, Downloads, Shell};
use pharm_core::ClientConfig;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::io::{self, Cursor, Write};
use std::path::Path as FsPath;
use std::sync::{Arc, Mutex};

pub const TOKEN: &str = "tok-1";
pub const PASSWORD: &str = "secret";

#[derive(Default)]
pub struct Backend {
    pub patients: BTreeMap<String, Value>,
    pub encounters: BTreeMap<String, Value>,
    /// Every body received by `PUT /encounters/:id`, in order.
    pub saves: Vec<Value>,
    pub feedback: Vec<Value>,
    pub finalize_calls: usize,
    pub fail_saves: bool,
    next_id: u32,
}

impl Backend {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}{}", self.next_id)
    }
}

type Shared = Arc<Mutex<Backend>>;

fn authorized(headers: &HeaderMap) -> bool {
    let expected = format!("Bearer {TOKEN}");
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        == Some(expected.as_str())
}

fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, "missing token").into_response()
}

async fn login(Json(body): Json<Value>) -> Response {
    if body["password"] == PASSWORD {
        Json(json!({"token": TOKEN, "user": {"email": body["email"]}})).into_response()
    } else {
        (StatusCode::UNAUTHORIZED, "invalid credentials").into_response()
    }
}

async fn list_patients(State(db): State<Shared>, headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let db = db.lock().unwrap();
    let rows: Vec<Value> = db
        .patients
        .values()
        .map(|p| {
            json!({
                "id": p["id"], "name": p["name"], "imc": p["imc"],
                "height_m": p["height_m"], "weight_kg": p["weight_kg"],
            })
        })
        .collect();
    Json(rows).into_response()
}

async fn create_patient(
    State(db): State<Shared>,
    headers: HeaderMap,
    Json(mut body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let mut db = db.lock().unwrap();
    let id = db.next_id("p");
    body["id"] = json!(id);
    body["imc"] = imc(&body);
    db.patients.insert(id.clone(), body);
    (StatusCode::CREATED, Json(json!({"id": id}))).into_response()
}

fn imc(patient: &Value) -> Value {
    match (patient["height_m"].as_f64(), patient["weight_kg"].as_f64()) {
        (Some(h), Some(w)) => json!(((w / (h * h)) * 100.0).round() / 100.0),
        _ => Value::Null,
    }
}

async fn get_patient(State(db): State<Shared>, Path(id): Path<String>) -> Response {
    match db.lock().unwrap().patients.get(&id) {
        Some(p) => Json(p.clone()).into_response(),
        None => (StatusCode::NOT_FOUND, "patient not found").into_response(),
    }
}

async fn update_patient(
    State(db): State<Shared>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let mut db = db.lock().unwrap();
    let Some(patient) = db.patients.get_mut(&id) else {
        return (StatusCode::NOT_FOUND, "patient not found").into_response();
    };
    let cpf = patient["cpf"].clone();
    *patient = body;
    patient["id"] = json!(id);
    patient["cpf"] = cpf;
    patient["imc"] = imc(patient);
    Json(json!({"ok": true})).into_response()
}

async fn delete_patient(State(db): State<Shared>, Path(id): Path<String>) -> Response {
    db.lock().unwrap().patients.remove(&id);
    Json(json!({"ok": true})).into_response()
}

async fn list_encounters(State(db): State<Shared>, Path(id): Path<String>) -> Response {
    let db = db.lock().unwrap();
    let rows: Vec<Value> = db
        .encounters
        .values()
        .filter(|e| e["patient_id"] == id)
        .map(|e| {
            json!({
                "id": e["id"], "patient_id": e["patient_id"], "created_at": e["created_at"],
                "has_suggestions": !e["suggestions"].is_null(),
            })
        })
        .collect();
    Json(rows).into_response()
}

async fn start_encounter(State(db): State<Shared>, Path(patient_id): Path<String>) -> Response {
    let mut db = db.lock().unwrap();
    let id = db.next_id("e");
    db.encounters.insert(
        id.clone(),
        json!({
            "id": id, "patient_id": patient_id, "data": {},
            "suggestions": null, "created_at": "2024-05-01T10:00:00",
        }),
    );
    Json(json!({"id": id})).into_response()
}

async fn get_encounter(State(db): State<Shared>, Path(id): Path<String>) -> Response {
    match db.lock().unwrap().encounters.get(&id) {
        Some(e) => Json(e.clone()).into_response(),
        None => (StatusCode::NOT_FOUND, "encounter not found").into_response(),
    }
}

async fn save_encounter(
    State(db): State<Shared>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let mut db = db.lock().unwrap();
    if db.fail_saves {
        return (StatusCode::INTERNAL_SERVER_ERROR, "database unavailable").into_response();
    }
    db.saves.push(body.clone());
    match db.encounters.get_mut(&id) {
        Some(e) => {
            e["data"] = body["data"].clone();
            Json(json!({"ok": true})).into_response()
        }
        None => (StatusCode::NOT_FOUND, "encounter not found").into_response(),
    }
}

async fn finalize(State(db): State<Shared>, Path(id): Path<String>) -> Response {
    let mut db = db.lock().unwrap();
    db.finalize_calls += 1;
    let Some(e) = db.encounters.get_mut(&id) else {
        return (StatusCode::NOT_FOUND, "encounter not found").into_response();
    };
    let cough = e["data"]["sintomas"]["tosse"] == true;
    e["suggestions"] = json!({
        "nao_farmacologicas": ["Hydration and rest"],
        "farmacologicas": if cough { json!(["Honey syrup"]) } else { json!([]) },
        "alertas": [],
        "rationale": ["Respiratory symptoms without alarm signs"],
    });
    Json(e.clone()).into_response()
}

async fn feedback(
    State(db): State<Shared>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let mut db = db.lock().unwrap();
    db.feedback.push(body.clone());
    let Some(e) = db.encounters.get_mut(&id) else {
        return (StatusCode::NOT_FOUND, "encounter not found").into_response();
    };
    e["suggestions"]["rationale"] = json!(["Reviewed after clinician disagreement"]);
    e["suggestions"]["feedback"] = json!({
        "label": body["label"], "note": body["note"], "ts": "2024-05-01T10:30:00",
    });
    Json(json!({"ok": true, "suggestions": e["suggestions"]})).into_response()
}

async fn export_csv() -> Response {
    ([(header::CONTENT_TYPE, "text/csv")], "id;name\np1;Ana Silva\n").into_response()
}

async fn encounter_pdf(Path(id): Path<String>) -> Response {
    ([(header::CONTENT_TYPE, "application/pdf")], format!("%PDF-{id}")).into_response()
}

pub struct FakeApi {
    pub base: String,
    pub db: Shared,
}

impl FakeApi {
    pub async fn start() -> Self {
        let db: Shared = Arc::default();
        let router = Router::new()
            .route("/auth/login", post(login))
            .route("/patients", get(list_patients).post(create_patient))
            .route(
                "/patients/:id",
                get(get_patient).put(update_patient).delete(delete_patient),
            )
            .route(
                "/patients/:id/encounters",
                get(list_encounters).post(start_encounter),
            )
            .route("/encounters/:id", get(get_encounter).put(save_encounter))
            .route("/encounters/:id/finalize", post(finalize))
            .route("/encounters/:id/feedback", post(feedback))
            .route("/export/patients.csv", get(export_csv))
            .route("/pdf/encounter/:id", get(encounter_pdf))
            .with_state(db.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fake api");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("fake api");
        });
        Self {
            base: format!("http://{addr}"),
            db,
        }
    }

    pub fn backend(&self) -> std::sync::MutexGuard<'_, Backend> {
        self.db.lock().unwrap()
    }

    pub fn api(&self, session: Session, download_dir: &FsPath) -> PharmApi {
        let config = ClientConfig::new(
            self.base.as_str(),
            download_dir.join("session.json"),
            download_dir.to_path_buf(),
        )
        .expect("valid config");
        PharmApi::from_client(HttpClient::new(&config, session).expect("client builds"))
    }

    /// Adds a patient directly, bypassing the API.
    pub fn seed_patient(&self, name: &str) -> String {
        let mut db = self.backend();
        let id = db.next_id("p");
        db.patients.insert(
            id.clone(),
            json!({
                "id": id, "name": name, "cpf": "12345678901",
                "height_m": 1.7, "weight_kg": 70.0, "imc": 24.22,
                "allergies": [], "meds": [],
            }),
        );
        id
    }

    /// Adds an encounter for `patient_id` directly, bypassing the API.
    pub fn seed_encounter(&self, patient_id: &str) -> String {
        let mut db = self.backend();
        let id = db.next_id("e");
        db.encounters.insert(
            id.clone(),
            json!({
                "id": id, "patient_id": patient_id, "data": {"sintomas": {"tosse": true}},
                "suggestions": {}, "created_at": "2024-05-01T10:00:00",
            }),
        );
        id
    }
}

/// Screen output captured for assertions.
#[derive(Clone, Default)]
pub struct Output(Arc<Mutex<Vec<u8>>>);

impl Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Output {
    pub fn text(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).expect("utf-8 output")
    }
}

/// A shell reading `script` as its input.
pub fn scripted_shell(api: PharmApi, script: &str, download_dir: &FsPath) -> (Shell, Output) {
    let output = Output::default();
    let console = Console::new(Cursor::new(script.to_string()), output.clone());
    (
        Shell::new(api, console, Downloads::new(download_dir)),
        output,
    )
}

pub fn signed_in() -> Session {
    let session = Session::in_memory();
    session
        .sign_in(TOKEN, Some("clinician@example.com".into()))
        .expect("in-memory sign in");
    session
}
