use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use cohort_division::server::{AvailabilitySlot, Division, Roster, RosterMember, division_router};
use cohort_domain::config::{ApiConfig, EngineConfig};
use cohort_domain::division::{ConfirmResponse, DivisionJob, ErrorBody, Subgroup, UndoResponse};
use cohort_domain::registry::InitializedSlice;
use cohort_kernel::server::{ApiState, system_router};
use serde::de::DeserializeOwned;
use serde_json::json;
use tower::ServiceExt;

fn roster_member(id: u64, leader: bool) -> RosterMember {
    RosterMember {
        id,
        name: format!("Member {id}"),
        email: format!("m{id}@example.com"),
        categories: if leader { vec!["leader".into()] } else { Vec::new() },
        availability: vec![AvailabilitySlot { weekday: 0, hour: 9 }],
    }
}

/// Group 1 mixes leaders and other members; group 2 holds leaders only.
fn app() -> Router {
    let mixed = (1..=6).map(|id| roster_member(id, id % 2 == 0)).collect();
    let leaders = (7..=9).map(|id| roster_member(id, true)).collect();
    let division =
        Division::from_parts(Roster::from_groups([(1, mixed), (2, leaders)]), &EngineConfig::default());

    let state = ApiState::builder()
        .config(ApiConfig::default())
        .register_slice(InitializedSlice::new(division))
        .build()
        .unwrap();

    let (router, _) = division_router().merge(system_router()).with_state(state).split_for_parts();
    router
}

async fn call(app: &Router, method: Method, uri: &str, body: Option<serde_json::Value>) -> (StatusCode, Vec<u8>) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            request = request.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        },
        None => Body::empty(),
    };

    let response = app.clone().oneshot(request.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
}

fn parse<T: DeserializeOwned>(bytes: &[u8]) -> T {
    serde_json::from_slice(bytes).unwrap()
}

fn generate_body() -> serde_json::Value {
    json!({
        "num_groups": 2,
        "max_group_size": 3,
        "category_rules": [{ "conditions": [{ "categories": ["leader"], "operator": "all", "min": 1 }] }]
    })
}

#[tokio::test]
async fn generate_confirm_list_undo_round() {
    let app = app();

    let (status, body) = call(&app, Method::POST, "/groups/1/subgroups/generate", Some(generate_body())).await;
    assert_eq!(status, StatusCode::OK);
    let job: DivisionJob = parse(&body);
    assert_eq!(job.total_members_assigned, 6);
    assert!(job.groups.iter().all(|g| g.members.len() <= 3));

    let confirm = json!({ "job_id": job.job_id });
    let (status, body) = call(&app, Method::POST, "/groups/1/subgroups/confirm", Some(confirm.clone())).await;
    assert_eq!(status, StatusCode::OK);
    let confirmed: ConfirmResponse = parse(&body);
    assert_eq!(confirmed.redirect_url.as_deref(), Some("/groups/1"));
    assert_eq!(confirmed.subgroups.len(), job.groups.len());

    // retrying the confirm does not persist twice
    let (status, _) = call(&app, Method::POST, "/groups/1/subgroups/confirm", Some(confirm)).await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = call(&app, Method::GET, "/groups/1/subgroups", None).await;
    assert_eq!(parse::<Vec<Subgroup>>(&body).len(), job.groups.len());

    let (status, body) = call(&app, Method::POST, "/groups/1/subgroups/undo", None).await;
    assert_eq!(status, StatusCode::OK);
    let undone: UndoResponse = parse(&body);
    assert_eq!(undone.message, format!("Removed {} subgroups.", job.groups.len()));
    assert_eq!(undone.remaining_divisions, 0);

    let (status, body) = call(&app, Method::POST, "/groups/1/subgroups/undo", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(parse::<ErrorBody>(&body).error.contains("Nothing to undo"));
}

#[tokio::test]
async fn invalid_requests_carry_an_error_body() {
    let app = app();

    let (status, body) = call(&app, Method::POST, "/groups/1/subgroups/generate", Some(json!({ "num_groups": 1 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(parse::<ErrorBody>(&body).error.contains("num_groups must be at least 2"));

    let (status, body) = call(&app, Method::POST, "/groups/9/subgroups/generate", Some(generate_body())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(!parse::<ErrorBody>(&body).error.is_empty());

    let (status, body) = call(&app, Method::POST, "/groups/1/subgroups/generate", Some(json!("nope"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(parse::<ErrorBody>(&body).error.starts_with("Malformed request body"));

    let (status, _) =
        call(&app, Method::POST, "/groups/1/subgroups/confirm", Some(json!({ "job_id": "missing" }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn preview_without_groups_cannot_be_confirmed() {
    let app = app();
    let body = json!({
        "num_groups": 2,
        "require_all_members": false,
        "category_rules": [{ "conditions": [{ "categories": ["leader"], "operator": "all", "min": 0, "max": 0 }] }]
    });

    let (status, body) = call(&app, Method::POST, "/groups/2/subgroups/generate", Some(body)).await;
    assert_eq!(status, StatusCode::OK);
    let job: DivisionJob = parse(&body);
    assert!(job.groups.is_empty());
    assert_eq!(job.total_members_assigned, 0);

    let confirm = json!({ "job_id": job.job_id });
    let (status, body) = call(&app, Method::POST, "/groups/2/subgroups/confirm", Some(confirm)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(parse::<ErrorBody>(&body).error.starts_with("Empty division"));

    let (_, body) = call(&app, Method::GET, "/groups/2/subgroups", None).await;
    assert!(parse::<Vec<Subgroup>>(&body).is_empty());
    let (status, _) = call(&app, Method::POST, "/groups/2/subgroups/undo", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn export_serves_csv_attachments() {
    let app = app();

    let (status, _) = call(&app, Method::GET, "/groups/1/subgroups/export", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = call(&app, Method::POST, "/groups/1/subgroups/generate", Some(generate_body())).await;
    let job: DivisionJob = parse(&body);

    let uri = format!("/groups/1/subgroups/export?job_id={}", job.job_id);
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"subgroups_group_1.csv\""
    );
    assert!(response.headers()[header::CONTENT_TYPE].to_str().unwrap().starts_with("text/csv"));

    let csv = String::from_utf8(to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec()).unwrap();
    assert!(csv.starts_with("Subgroup ID,Subgroup Name,Member ID,Member Name,Member Email,Categories"));
    assert_eq!(csv.lines().count(), 1 + 6);
}

#[tokio::test]
async fn health_is_mounted_next_to_division_routes() {
    let (status, body) = call(&app(), Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse::<serde_json::Value>(&body)["status"], "up");
}
