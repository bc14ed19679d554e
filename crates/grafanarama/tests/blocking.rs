#![cfg(feature = "blocking")]

use grafanarama::{
    models::{Datasource, Spec},
    ClientBuilder, DashboardIdentifier,
};
use http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;
use tokio::runtime::Runtime;
use wiremock::{
    matchers::{header, method, path},
    Mock, MockServer, ResponseTemplate,
};

// The mock server runs on its own thread, so the blocking client can be used from the test
// thread as long as it isn't inside `block_on`.
fn start_server(rt: &Runtime) -> MockServer {
    rt.block_on(MockServer::start())
}

#[test]
fn send_and_fetch_dashboard() {
    let rt = Runtime::new().unwrap();
    let server = start_server(&rt);
    rt.block_on(async {
        Mock::given(method("POST"))
            .and(path("/api/dashboards/db"))
            .and(header("authorization", "Basic YWRtaW46YWRtaW4="))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 1,
                "uid": "abc",
                "status": "success",
                "version": 1
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/dashboards/uid/abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "dashboard": {"uid": "abc", "title": "D", "schemaVersion": 39, "panels": []}
            })))
            .mount(&server)
            .await;
    });

    let client = ClientBuilder::new()
        .base_url(server.uri())
        .basic_auth("admin", "admin")
        .build_blocking()
        .unwrap();
    let dashboard = Spec::builder().uid("abc").title("D").build().unwrap();
    let saved = client.send_dashboard(&dashboard.into(), true).unwrap();
    assert_eq!(saved.version, Some(1));

    let fetched = client.get_dashboard(DashboardIdentifier::uid("abc")).unwrap();
    assert_eq!(fetched.spec().panels, Some(vec![]));
}

#[test]
fn errors_are_returned() {
    let rt = Runtime::new().unwrap();
    let server = start_server(&rt);
    rt.block_on(
        Mock::given(method("GET"))
            .and(path("/api/datasources/name/prom"))
            .respond_with(
                ResponseTemplate::new(403).set_body_json(json!({"message": "Permission denied"})),
            )
            .mount(&server),
    );

    let client = ClientBuilder::new()
        .base_url(server.uri())
        .api_key("viewer-token")
        .build_blocking()
        .unwrap();
    let datasource = Datasource::builder()
        .name("prom")
        .datasource_type("prometheus")
        .build()
        .unwrap();
    let err = client.send_datasource(&datasource).unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::FORBIDDEN));
    assert_eq!(err.message().as_deref(), Some("Permission denied"));
}
