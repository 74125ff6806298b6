use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    extract::State,
    http::{Request, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::api;
use crate::core::{config::Settings, state::AppState};
use crate::services::course_data::CourseDataClient;
use crate::services::ratings::RatingsService;

pub(crate) struct TestContext {
    pub(crate) state: AppState,
    pub(crate) app: Router,
    pub(crate) upstream: MockUpstream,
    _guard: OwnedMutexGuard<()>,
}

pub(crate) async fn env_lock() -> OwnedMutexGuard<()> {
    static LOCK: OnceLock<Arc<AsyncMutex<()>>> = OnceLock::new();
    let lock = LOCK.get_or_init(|| Arc::new(AsyncMutex::new(()))).clone();
    lock.lock_owned().await
}

/// In-process stand-in for the external course-data (and ratings)
/// source. Responses are swappable mid-test; the grades hit counter lets
/// tests assert that validation failures never reach the network.
#[derive(Clone)]
pub(crate) struct MockUpstream {
    pub(crate) base_url: String,
    departments: Arc<Mutex<(u16, Value)>>,
    grades: Arc<Mutex<(u16, Value)>>,
    ratings: Arc<Mutex<(u16, Value)>>,
    grades_hits: Arc<AtomicUsize>,
}

impl MockUpstream {
    pub(crate) fn set_departments(&self, status: u16, body: Value) {
        *self.departments.lock().expect("departments lock") = (status, body);
    }

    pub(crate) fn set_grades(&self, status: u16, body: Value) {
        *self.grades.lock().expect("grades lock") = (status, body);
    }

    pub(crate) fn set_ratings(&self, status: u16, body: Value) {
        *self.ratings.lock().expect("ratings lock") = (status, body);
    }

    pub(crate) fn grades_hits(&self) -> usize {
        self.grades_hits.load(Ordering::SeqCst)
    }
}

async fn serve_departments(State(mock): State<MockUpstream>) -> impl IntoResponse {
    let (status, body) = mock.departments.lock().expect("departments lock").clone();
    (StatusCode::from_u16(status).expect("status"), Json(body))
}

async fn serve_grades(State(mock): State<MockUpstream>) -> impl IntoResponse {
    mock.grades_hits.fetch_add(1, Ordering::SeqCst);
    let (status, body) = mock.grades.lock().expect("grades lock").clone();
    (StatusCode::from_u16(status).expect("status"), Json(body))
}

async fn serve_ratings(State(mock): State<MockUpstream>) -> impl IntoResponse {
    let (status, body) = mock.ratings.lock().expect("ratings lock").clone();
    (StatusCode::from_u16(status).expect("status"), Json(body))
}

pub(crate) async fn spawn_upstream() -> MockUpstream {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind mock upstream");
    let addr = listener.local_addr().expect("mock upstream addr");

    let mock = MockUpstream {
        base_url: format!("http://{addr}"),
        departments: Arc::new(Mutex::new((200, default_departments_body()))),
        grades: Arc::new(Mutex::new((200, json!({ "data": [] })))),
        ratings: Arc::new(Mutex::new((404, json!({ "detail": "not found" })))),
        grades_hits: Arc::new(AtomicUsize::new(0)),
    };

    let router = Router::new()
        .route("/departments", get(serve_departments))
        .route("/grades", get(serve_grades))
        .route("/ratings", get(serve_ratings))
        .with_state(mock.clone());

    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("mock upstream server");
    });

    mock
}

pub(crate) fn set_test_env(base_url: &str) {
    dotenvy::dotenv().ok();

    std::env::set_var("PROFMATCH_ENV", "test");
    std::env::set_var("PROFMATCH_STRICT_CONFIG", "0");
    std::env::set_var("COURSE_DATA_BASE_URL", base_url);
    std::env::remove_var("COURSE_DATA_API_KEY");
    std::env::set_var("COURSE_DATA_TIMEOUT_SECONDS", "5");
    std::env::set_var("COURSE_DATA_CONNECT_TIMEOUT_SECONDS", "2");
    std::env::remove_var("RATINGS_BASE_URL");
    std::env::remove_var("RATINGS_API_KEY");
    std::env::set_var("PROMETHEUS_ENABLED", "0");
    std::env::remove_var("BACKEND_CORS_ORIGINS");
}

pub(crate) async fn setup_test_context() -> TestContext {
    setup(true, |_| {}).await
}

/// Variant that lets a test adjust env or mock responses after the
/// defaults are in place but before settings load.
pub(crate) async fn setup_test_context_with(configure: impl FnOnce(&MockUpstream)) -> TestContext {
    setup(true, configure).await
}

/// Starts with a failing department fetch, leaving the directory empty
/// the way a dead upstream at boot would.
pub(crate) async fn setup_test_context_with_failing_departments() -> TestContext {
    setup(false, |upstream| {
        upstream.set_departments(500, json!({ "detail": "upstream down" }));
    })
    .await
}

async fn setup(load_departments: bool, configure: impl FnOnce(&MockUpstream)) -> TestContext {
    let guard = env_lock().await;

    let upstream = spawn_upstream().await;
    set_test_env(&upstream.base_url);
    configure(&upstream);

    let settings = Settings::load().expect("settings");
    let course_data = CourseDataClient::from_settings(&settings).expect("course data client");
    let ratings = RatingsService::from_settings(&settings).expect("ratings service");
    let state = AppState::new(settings, course_data, ratings);

    if load_departments {
        let departments =
            state.course_data().fetch_departments().await.expect("departments fixture");
        state.replace_departments(departments).await;
    }

    let app = api::router::router(state.clone());

    TestContext { state, app, upstream, _guard: guard }
}

pub(crate) fn offline_course_data_client() -> CourseDataClient {
    CourseDataClient::new(
        "http://127.0.0.1:9",
        None,
        Duration::from_secs(1),
        Duration::from_secs(1),
    )
    .expect("offline client")
}

pub(crate) fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).expect("request")
}

pub(crate) async fn read_json(response: axum::response::Response<Body>) -> Value {
    let body = to_bytes(response.into_body(), usize::MAX).await.expect("response body");
    serde_json::from_slice(&body).unwrap_or_else(|err| {
        let body_text = String::from_utf8_lossy(&body);
        panic!("json parse: {err}; body: {body_text}");
    })
}

pub(crate) fn default_departments_body() -> Value {
    json!({
        "data": [
            { "deptCode": "COMPSCI", "deptName": "Computer Science" },
            { "deptCode": "MATH", "deptName": "Mathematics" }
        ]
    })
}

pub(crate) fn grade_record(
    instructor: &str,
    term: &str,
    counts: [u32; 5],
    p: u32,
    np: u32,
    gpa: Option<f64>,
) -> Value {
    json!({
        "instructor": instructor,
        "term": term,
        "gradeACount": counts[0],
        "gradeBCount": counts[1],
        "gradeCCount": counts[2],
        "gradeDCount": counts[3],
        "gradeFCount": counts[4],
        "gradePCount": p,
        "gradeNPCount": np,
        "averageGPA": gpa,
    })
}

pub(crate) fn raw_course_body(course_number: &str, records: Vec<Value>) -> Value {
    json!({
        "data": [
            { "courseNumber": course_number, "records": records }
        ]
    })
}

/// Two instructors, two terms each, for COMPSCI 161.
pub(crate) fn compsci_161_fixture() -> Value {
    raw_course_body(
        "161",
        vec![
            grade_record("PATTIS, R.", "Fall 2024", [40, 30, 20, 5, 5], 0, 0, Some(3.1)),
            grade_record("PATTIS, R.", "Fall 2025", [50, 25, 15, 5, 5], 0, 0, Some(3.3)),
            grade_record("SHINDLER, M.", "Winter 2025", [60, 20, 10, 5, 5], 0, 0, Some(3.5)),
            grade_record("SHINDLER, M.", "Spring 2025", [55, 25, 10, 5, 5], 0, 0, Some(3.4)),
        ],
    )
}
