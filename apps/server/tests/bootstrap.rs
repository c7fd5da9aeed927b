use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use cohort::domain::config::ApiConfig;
use cohort_server::Server;
use std::io::Write;
use tower::ServiceExt;

const ROSTER: &str = r#"{ "groups": { "1": [
    { "id": 1, "name": "Ana", "categories": ["leader"], "availability": [{ "weekday": 0, "hour": 9 }] },
    { "id": 2, "name": "Bo", "availability": [{ "weekday": 0, "hour": 9 }] }
] } }"#;

fn config_with_roster(file: &tempfile::NamedTempFile) -> ApiConfig {
    let mut cfg = ApiConfig::default();
    cfg.engine.roster_path = file.path().to_path_buf();
    cfg
}

fn roster_file() -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(ROSTER.as_bytes()).unwrap();
    file
}

#[test]
fn build_registers_the_division_slice() {
    let file = roster_file();
    let server = Server::builder().config(config_with_roster(&file)).build().unwrap();

    let names: Vec<_> = server.state().slice_names().collect();
    assert_eq!(names.len(), 1);
    assert!(names[0].ends_with("Division"));
}

#[test]
fn missing_roster_fails_bootstrap() {
    let mut cfg = ApiConfig::default();
    cfg.engine.roster_path = "does/not/exist.json".into();

    let err = Server::builder().config(cfg).build().unwrap_err();
    assert!(format!("{err:#}").contains("Roster error"));
}

#[tokio::test]
async fn app_serves_health_docs_and_division_routes() {
    let file = roster_file();
    let server = Server::builder().config(config_with_roster(&file)).build().unwrap();
    let app = cohort_server::app(server.state().clone());

    for uri in ["/health", "/api", "/groups/1/subgroups"] {
        let response =
            app.clone().oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap()).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK, "GET {uri}");
    }

    let response = app
        .oneshot(Request::builder().uri("/groups/1/subgroups").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(serde_json::from_slice::<serde_json::Value>(&body).unwrap(), serde_json::json!([]));
}
