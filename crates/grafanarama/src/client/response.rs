//! Response bodies returned by the Grafana HTTP API.
use serde::Deserialize;
use serde_json::{Map, Value};

/// The response to saving a dashboard.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
#[non_exhaustive]
pub struct SaveDashboardResponse {
    pub id: Option<i64>,
    pub uid: Option<String>,
    /// Path of the dashboard relative to the Grafana root URL.
    pub url: Option<String>,
    /// Usually `success`.
    pub status: Option<String>,
    pub version: Option<i64>,
    pub slug: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The response to creating, updating or deleting a datasource.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
#[non_exhaustive]
pub struct DatasourceResponse {
    pub id: Option<i64>,
    pub message: Option<String>,
    pub name: Option<String>,
    /// The stored datasource, as echoed back by newer Grafana versions.
    pub datasource: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The response to deleting a dashboard.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
#[non_exhaustive]
pub struct DeleteDashboardResponse {
    pub title: Option<String>,
    pub message: Option<String>,
    pub id: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The response of `GET /api/health`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
#[non_exhaustive]
pub struct HealthResponse {
    pub commit: Option<String>,
    /// `ok` when Grafana can reach its database.
    pub database: Option<String>,
    pub version: Option<String>,
}

impl HealthResponse {
    /// Whether Grafana reported its database as healthy.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.database.as_deref() == Some("ok")
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn save_dashboard() {
        let response: SaveDashboardResponse = serde_json::from_value(json!({
            "id": 1,
            "uid": "cIBgcSjkk",
            "url": "/d/cIBgcSjkk/production-overview",
            "status": "success",
            "version": 1,
            "slug": "production-overview",
            "folderUid": "ops"
        }))
        .unwrap();
        assert_eq!(response.uid.as_deref(), Some("cIBgcSjkk"));
        assert_eq!(response.version, Some(1));
        assert_eq!(response.extra.get("folderUid"), Some(&json!("ops")));
    }

    #[test]
    fn health() {
        let response: HealthResponse =
            serde_json::from_value(json!({"database": "ok", "version": "10.4.0"})).unwrap();
        assert!(response.is_ok());
        assert!(!HealthResponse::default().is_ok());
    }
}
