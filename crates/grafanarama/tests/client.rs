use grafanarama::{
    models::{DashboardObject, Datasource, GridPos, Panel, Spec},
    serializer, Client, ClientBuilder, DashboardIdentifier, Error, SaveOptions,
};
use http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use wiremock::{
    matchers::{body_partial_json, header, method, path},
    Mock, MockServer, ResponseTemplate,
};

fn client(server: &MockServer) -> ClientBuilder {
    ClientBuilder::new().base_url(server.uri())
}

fn text_dashboard() -> DashboardObject {
    let panel = Panel::builder()
        .panel_type("text")
        .id(1)
        .title("Hello")
        .grid_pos(GridPos::new(0, 0, 24, 8).unwrap())
        .options(json!({"mode": "markdown", "content": "# Hello"}))
        .build()
        .unwrap();
    Spec::builder()
        .title("D")
        .schema_version(39)
        .panel(panel)
        .build()
        .unwrap()
        .into()
}

fn saved() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "id": 1,
        "uid": "cIBgcSjkk",
        "url": "/d/cIBgcSjkk/d",
        "status": "success",
        "version": 1,
        "slug": "d"
    }))
}

async fn last_body(server: &MockServer) -> Value {
    let requests = server.received_requests().await.unwrap();
    requests.last().unwrap().body_json().unwrap()
}

#[tokio::test]
async fn basic_auth_header() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/dashboards/db"))
        .and(header("authorization", "Basic YWRtaW46YWRtaW4="))
        .respond_with(saved())
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server).basic_auth("admin", "admin").build().unwrap();
    let response = client.send_dashboard(&text_dashboard(), true).await.unwrap();
    assert_eq!(response.uid.as_deref(), Some("cIBgcSjkk"));
    assert_eq!(response.status.as_deref(), Some("success"));
}

#[tokio::test]
async fn api_key_takes_precedence() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/health"))
        .and(header("authorization", "Bearer glsa_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"database": "ok"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server)
        .api_key("glsa_token ")
        .basic_auth("admin", "admin")
        .build()
        .unwrap();
    assert_eq!(client.auth().scheme(), "bearer");
    assert!(client.health().await.unwrap().is_ok());

    let requests = server.received_requests().await.unwrap();
    let auth_headers: Vec<_> = requests[0].headers.get_all("authorization").iter().collect();
    assert_eq!(auth_headers, ["Bearer glsa_token"]);
}

#[tokio::test]
async fn sends_json_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/health"))
        .and(header("accept", "application/json"))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "commit": "abc123",
            "database": "ok",
            "version": "10.4.0"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let health = client(&server).build().unwrap().health().await.unwrap();
    assert_eq!(health.version.as_deref(), Some("10.4.0"));
}

#[tokio::test]
async fn unauthorized() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/dashboards/db"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"message": "Invalid username or password"})),
        )
        .mount(&server)
        .await;

    let client = client(&server).basic_auth("admin", "wrong").build().unwrap();
    let err = client
        .send_dashboard(&text_dashboard(), false)
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
    assert_eq!(err.message().as_deref(), Some("Invalid username or password"));
    assert!(err.to_string().contains("Invalid username or password"));
}

#[tokio::test]
async fn dashboard_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/dashboards/db"))
        .and(body_partial_json(json!({
            "overwrite": true,
            "message": "initial import",
            "folderUid": "ops",
            "dashboard": {"title": "D", "schemaVersion": 39, "tags": []}
        })))
        .respond_with(saved())
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server).build().unwrap();
    client
        .send_dashboard_with(
            &text_dashboard(),
            &SaveOptions::default()
                .overwrite(true)
                .message("initial import")
                .folder_uid("ops"),
        )
        .await
        .unwrap();

    let body = last_body(&server).await;
    let panels = body["dashboard"]["panels"].as_array().unwrap();
    assert_eq!(panels.len(), 1);
    assert_eq!(panels[0]["type"], json!("text"));
    assert_eq!(panels[0]["gridPos"], json!({"h": 8, "w": 24, "x": 0, "y": 0}));
    assert_eq!(panels[0]["targets"], json!([]));
}

#[tokio::test]
async fn empty_panels_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/dashboards/db"))
        .respond_with(saved())
        .mount(&server)
        .await;

    let client = client(&server).build().unwrap();
    let dashboard: DashboardObject = Spec::builder()
        .title("D")
        .uid("cIBgcSjkk")
        .panels(Vec::<Panel>::new())
        .build()
        .unwrap()
        .into();
    client.send_dashboard(&dashboard, true).await.unwrap();
    let sent = last_body(&server).await;
    assert_eq!(sent["dashboard"]["panels"], json!([]));

    Mock::given(method("GET"))
        .and(path("/api/dashboards/uid/cIBgcSjkk"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "dashboard": sent["dashboard"],
            "meta": {"slug": "d", "canSave": true}
        })))
        .mount(&server)
        .await;

    let fetched = client
        .get_dashboard(DashboardIdentifier::uid("cIBgcSjkk"))
        .await
        .unwrap();
    assert_eq!(fetched.spec().panels, Some(vec![]));
    assert_eq!(fetched.spec().title.as_deref(), Some("D"));

    let raw = client
        .get_dashboard_json(DashboardIdentifier::uid("cIBgcSjkk"))
        .await
        .unwrap();
    assert_eq!(raw["meta"]["slug"], json!("d"));
}

#[tokio::test]
async fn unknown_fields_survive_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/dashboards/db/legacy"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "dashboard": {
                "title": "Legacy",
                "schemaVersion": 16,
                "rows": [{"title": "old row"}],
                "panels": [{"type": "graph", "id": 2, "legend": {"show": true}}]
            }
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/dashboards/db"))
        .respond_with(saved())
        .mount(&server)
        .await;

    let client = client(&server).build().unwrap();
    let dashboard = client
        .get_dashboard(DashboardIdentifier::slug("legacy"))
        .await
        .unwrap();
    assert_eq!(dashboard.spec().schema_version, 16);
    client.send_dashboard(&dashboard, true).await.unwrap();

    let sent = last_body(&server).await;
    assert_eq!(sent["dashboard"]["rows"], json!([{"title": "old row"}]));
    assert_eq!(sent["dashboard"]["panels"][0]["legend"], json!({"show": true}));
}

#[tokio::test]
async fn missing_dashboard() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/dashboards/uid/nope"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"message": "Dashboard not found"})),
        )
        .mount(&server)
        .await;

    let err = client(&server)
        .build()
        .unwrap()
        .get_dashboard(DashboardIdentifier::uid("nope"))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
}

#[tokio::test]
async fn delete_dashboard() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/dashboards/uid/cIBgcSjkk"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "title": "D",
            "message": "Dashboard D deleted",
            "id": 1
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = client(&server)
        .build()
        .unwrap()
        .delete_dashboard("cIBgcSjkk")
        .await
        .unwrap();
    assert_eq!(response.message.as_deref(), Some("Dashboard D deleted"));
}

fn prometheus() -> Datasource {
    Datasource::builder()
        .name("prom")
        .datasource_type("prometheus")
        .url("http://prometheus:9090")
        .build()
        .unwrap()
}

#[tokio::test]
async fn datasource_upsert_updates_existing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/datasources/name/prom"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 7,
            "uid": "P1809F7CD0C75ACF3",
            "name": "prom",
            "type": "prometheus"
        })))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/datasources/7"))
        .and(body_partial_json(json!({"name": "prom", "url": "http://prometheus:9090"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 7,
            "message": "Datasource updated",
            "name": "prom"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/datasources"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let response = client(&server)
        .build()
        .unwrap()
        .send_datasource(&prometheus())
        .await
        .unwrap();
    assert_eq!(response.message.as_deref(), Some("Datasource updated"));
}

#[tokio::test]
async fn datasource_upsert_creates_missing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/datasources/name/prom"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"message": "Data source not found"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/datasources"))
        .and(body_partial_json(json!({"name": "prom", "type": "prometheus"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 8,
            "message": "Datasource added",
            "name": "prom",
            "datasource": {"id": 8, "name": "prom"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = client(&server)
        .build()
        .unwrap()
        .send_datasource(&prometheus())
        .await
        .unwrap();
    assert_eq!(response.id, Some(8));
    assert_eq!(response.datasource, Some(json!({"id": 8, "name": "prom"})));
}

#[tokio::test]
async fn datasource_lookup() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/datasources/name/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/datasources/name/broken"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .mount(&server)
        .await;

    let client: Client = client(&server).build().unwrap();
    assert_eq!(client.get_datasource_id_by_name("missing").await.unwrap(), None);

    let err = client.get_datasource_id_by_name("broken").await.unwrap_err();
    match err {
        Error::Http { status, body } => {
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(body, "internal error");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn connection_refused() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let client = ClientBuilder::new()
        .host("127.0.0.1")
        .port(port)
        .build()
        .unwrap();
    let err = client.health().await.unwrap_err();
    assert!(matches!(err, Error::Connection(_)), "{err:?}");
    assert_eq!(err.status(), None);
}

#[test]
fn request_body_matches_serializer() {
    let dashboard = text_dashboard();
    let body = serializer::to_request_body(&dashboard, &SaveOptions::default()).unwrap();
    assert_eq!(body["dashboard"], serializer::to_value(&dashboard).unwrap());
}
