//! An HTTP client for Grafana's REST API.
//!
//! A [`Client`] is created with a [`ClientBuilder`], either configured explicitly or from the
//! `GRAFANA_*` environment variables:
//!
//! ```no_run
//! use grafanarama::{models::Spec, Client, ClientBuilder};
//!
//! # async fn run() -> grafanarama::Result<()> {
//! let client: Client = ClientBuilder::from_env()?.build()?;
//! let dashboard = Spec::builder().title("Production overview").build()?;
//! let saved = client.send_dashboard(&dashboard.into(), true).await?;
//! println!("saved {:?}", saved.url);
//! # Ok(())
//! # }
//! ```
//!
//! Every call makes exactly one HTTP request (or two, for the datasource upsert). Nothing is
//! retried: non-2xx responses are returned as [`Error::Http`] and transport failures as
//! [`Error::Connection`].
use std::fmt;

use http::{
    header::{self, HeaderMap, HeaderValue},
    Method, StatusCode,
};
use reqwest::{RequestBuilder, Url};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;

use crate::{
    error::{Error, Result},
    models::{DashboardObject, Datasource},
    serializer::{self, SaveOptions},
};

mod config;
mod response;

pub use config::ConfigError;
pub use response::{
    DatasourceResponse, DeleteDashboardResponse, HealthResponse, SaveDashboardResponse,
};

const DEFAULT_HOST: &str = "localhost";
const DEFAULT_PORT: u16 = 3000;

/// The credentials sent with every request.
///
/// At most one scheme is active per client. The `Debug` implementation never prints secrets.
#[derive(Clone, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum Auth {
    /// Requests are sent without credentials.
    #[default]
    None,
    /// A Grafana API key or service account token, sent as `Authorization: Bearer <key>`.
    ApiKey(String),
    /// HTTP Basic authentication.
    Basic { username: String, password: String },
}

impl Auth {
    /// A short name for the scheme, used in log messages.
    #[must_use]
    pub fn scheme(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::ApiKey(_) => "bearer",
            Self::Basic { .. } => "basic",
        }
    }

    fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        match self {
            Self::None => request,
            Self::ApiKey(key) => request.bearer_auth(key),
            Self::Basic { username, password } => request.basic_auth(username, Some(password)),
        }
    }

    /// Decide which scheme to use from the credentials supplied to a builder.
    fn resolve(
        api_key: Option<String>,
        username: Option<String>,
        password: Option<String>,
    ) -> Result<Self, ConfigError> {
        let api_key = api_key
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());
        let username = username.filter(|u| !u.is_empty());
        let password = password.filter(|p| !p.is_empty());
        match (api_key, username, password) {
            (Some(key), username, password) => {
                if username.is_some() || password.is_some() {
                    tracing::warn!(
                        "both an API key and basic auth credentials were supplied; using the API key"
                    );
                }
                Ok(Self::ApiKey(key))
            }
            (None, Some(username), Some(password)) => Ok(Self::Basic { username, password }),
            (None, Some(_), None) => Err(ConfigError::IncompleteBasicAuth { missing: "password" }),
            (None, None, Some(_)) => Err(ConfigError::IncompleteBasicAuth { missing: "username" }),
            (None, None, None) => Ok(Self::None),
        }
    }
}

impl fmt::Debug for Auth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::ApiKey(_) => f.debug_tuple("ApiKey").field(&"<redacted>").finish(),
            Self::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
        }
    }
}

/// Builder for [`Client`]s.
///
/// By default the client talks to `http://localhost:3000` without credentials.
#[derive(Clone)]
pub struct ClientBuilder {
    host: String,
    port: u16,
    use_https: bool,
    base_url: Option<String>,
    api_key: Option<String>,
    username: Option<String>,
    password: Option<String>,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            use_https: false,
            base_url: None,
            api_key: None,
            username: None,
            password: None,
        }
    }
}

impl fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("use_https", &self.use_https)
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl ClientBuilder {
    /// Create a builder with the default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the Grafana host name.
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set the Grafana port.
    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Use `https` instead of `http`.
    #[must_use]
    pub fn use_https(mut self, use_https: bool) -> Self {
        self.use_https = use_https;
        self
    }

    /// Use a full base URL, such as `https://example.com/grafana/`, instead of the host,
    /// port and scheme.
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Authenticate with an API key or service account token.
    ///
    /// If basic auth credentials are also supplied, the API key takes precedence.
    #[must_use]
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Authenticate with HTTP Basic auth.
    #[must_use]
    pub fn basic_auth(self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username(username).password(password)
    }

    /// Set the basic auth username. A password must also be supplied.
    #[must_use]
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Set the basic auth password. A username must also be supplied.
    #[must_use]
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    fn resolve_url(&self) -> Result<Url, ConfigError> {
        let raw = match &self.base_url {
            Some(url) => url.clone(),
            None => {
                let scheme = if self.use_https { "https" } else { "http" };
                format!("{scheme}://{}:{}/", self.host, self.port)
            }
        };
        let url = Url::parse(&raw).map_err(|e| ConfigError::InvalidUrl {
            url: raw.clone(),
            reason: e.to_string(),
        })?;
        if url.cannot_be_a_base() {
            return Err(ConfigError::InvalidUrl {
                url: raw,
                reason: "URL cannot be used as a base".to_string(),
            });
        }
        Ok(url)
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the URL is invalid or only half of the basic auth
    /// credentials were supplied, and [`Error::Connection`] if the HTTP client could not be
    /// initialised.
    pub fn build(self) -> Result<Client> {
        let base_url = self.resolve_url()?;
        let auth = Auth::resolve(self.api_key, self.username, self.password)?;

        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(Error::Connection)?;

        tracing::debug!(url = %base_url, auth = auth.scheme(), "created Grafana client");
        Ok(Client {
            http,
            base_url,
            auth,
        })
    }

    /// Build a [blocking client][crate::blocking::Client].
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`ClientBuilder::build`], and [`Error::Runtime`] if the
    /// runtime backing the client could not be started.
    #[cfg(feature = "blocking")]
    #[cfg_attr(docsrs, doc(cfg(feature = "blocking")))]
    pub fn build_blocking(self) -> Result<crate::blocking::Client> {
        crate::blocking::Client::new(self.build()?)
    }
}

/// How to find a dashboard.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DashboardIdentifier {
    /// The dashboard's UID, fetched from `/api/dashboards/uid/{uid}`.
    Uid(String),
    /// The dashboard's slug, fetched from the legacy `/api/dashboards/db/{slug}`.
    Slug(String),
}

impl DashboardIdentifier {
    /// Look a dashboard up by its UID (`/api/dashboards/uid/<uid>`).
    #[must_use]
    pub fn uid(uid: impl Into<String>) -> Self {
        Self::Uid(uid.into())
    }

    /// Look a dashboard up by its legacy slug (`/api/dashboards/db/<slug>`).
    #[must_use]
    pub fn slug(slug: impl Into<String>) -> Self {
        Self::Slug(slug.into())
    }

    fn segments(&self) -> [&str; 4] {
        match self {
            Self::Uid(uid) => ["api", "dashboards", "uid", uid],
            Self::Slug(slug) => ["api", "dashboards", "db", slug],
        }
    }
}

#[derive(Deserialize)]
struct GetDashboardResponse {
    dashboard: DashboardObject,
}

/// An asynchronous Grafana API client.
///
/// Cloning a client is cheap; clones share the same connection pool.
#[derive(Clone, Debug)]
pub struct Client {
    http: reqwest::Client,
    base_url: Url,
    auth: Auth,
}

impl Client {
    /// Create a builder.
    #[must_use]
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// The URL that API paths are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The credentials this client sends.
    #[must_use]
    pub fn auth(&self) -> &Auth {
        &self.auth
    }

    /// Save a dashboard, optionally overwriting an existing one with the same UID or title.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] if Grafana rejects the dashboard, for example with a 412 when
    /// `overwrite` is false and the dashboard already exists.
    pub async fn send_dashboard(
        &self,
        dashboard: &DashboardObject,
        overwrite: bool,
    ) -> Result<SaveDashboardResponse> {
        self.send_dashboard_with(dashboard, &SaveOptions::default().overwrite(overwrite))
            .await
    }

    /// Save a dashboard with a version message or into a folder.
    ///
    /// # Errors
    ///
    /// See [`Client::send_dashboard`].
    #[tracing::instrument(skip(self, dashboard), level = "debug")]
    pub async fn send_dashboard_with(
        &self,
        dashboard: &DashboardObject,
        options: &SaveOptions,
    ) -> Result<SaveDashboardResponse> {
        let body = serializer::to_request_body(dashboard, options)?;
        let url = self.endpoint(&["api", "dashboards", "db"]);
        self.json(Method::POST, url, Some(&body)).await
    }

    /// Fetch a dashboard.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] with a 404 status if the dashboard doesn't exist, and
    /// [`Error::Serialization`] if the response isn't a dashboard.
    pub async fn get_dashboard(&self, identifier: DashboardIdentifier) -> Result<DashboardObject> {
        let response = self.get_dashboard_json(identifier).await?;
        let GetDashboardResponse { dashboard } = serde_json::from_value(response)?;
        Ok(dashboard)
    }

    /// Fetch a dashboard as raw JSON.
    ///
    /// This is the full response body, containing `dashboard` and `meta` members.
    ///
    /// # Errors
    ///
    /// See [`Client::get_dashboard`].
    #[tracing::instrument(skip(self), level = "debug")]
    pub async fn get_dashboard_json(&self, identifier: DashboardIdentifier) -> Result<Value> {
        let url = self.endpoint(&identifier.segments());
        self.json(Method::GET, url, None).await
    }

    /// Delete the dashboard with the given UID.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] with a 404 status if the dashboard doesn't exist.
    #[tracing::instrument(skip(self), level = "debug")]
    pub async fn delete_dashboard(&self, uid: &str) -> Result<DeleteDashboardResponse> {
        let url = self.endpoint(&["api", "dashboards", "uid", uid]);
        self.json(Method::DELETE, url, None).await
    }

    /// Create a datasource, or update the existing datasource with the same name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] if either the lookup or the save is rejected.
    #[tracing::instrument(skip(self, datasource), fields(name = %datasource.name), level = "debug")]
    pub async fn send_datasource(&self, datasource: &Datasource) -> Result<DatasourceResponse> {
        let body = serializer::to_request_body(datasource, &SaveOptions::default())?;
        match self.get_datasource_id_by_name(&datasource.name).await? {
            Some(id) => {
                tracing::debug!(id, "updating existing datasource");
                let url = self.endpoint(&["api", "datasources", &id.to_string()]);
                self.json(Method::PUT, url, Some(&body)).await
            }
            None => {
                tracing::debug!("creating datasource");
                let url = self.endpoint(&["api", "datasources"]);
                self.json(Method::POST, url, Some(&body)).await
            }
        }
    }

    /// Fetch a datasource by name, returning `None` if there is no such datasource.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] for any non-2xx response other than a 404.
    #[tracing::instrument(skip(self), level = "debug")]
    pub async fn get_datasource_by_name(&self, name: &str) -> Result<Option<Datasource>> {
        let url = self.endpoint(&["api", "datasources", "name", name]);
        match self.json(Method::GET, url, None).await {
            Ok(datasource) => Ok(Some(datasource)),
            Err(e) if e.status() == Some(StatusCode::NOT_FOUND) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Look up the numeric ID of a datasource by name.
    ///
    /// # Errors
    ///
    /// See [`Client::get_datasource_by_name`].
    pub async fn get_datasource_id_by_name(&self, name: &str) -> Result<Option<i64>> {
        Ok(self
            .get_datasource_by_name(name)
            .await?
            .and_then(|datasource| datasource.id))
    }

    /// Check that Grafana is up. This endpoint doesn't require authentication.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Connection`] if Grafana can't be reached.
    #[tracing::instrument(skip(self), level = "debug")]
    pub async fn health(&self) -> Result<HealthResponse> {
        let url = self.endpoint(&["api", "health"]);
        self.json(Method::GET, url, None).await
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // The base URL was checked by the builder, so this always succeeds.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Send a request and check the response status.
    async fn call(
        &self,
        method: Method,
        url: Url,
        body: Option<&Value>,
    ) -> Result<reqwest::Response> {
        tracing::debug!(%method, %url, "sending request");
        let mut request = self.auth.apply(self.http.request(method.clone(), url.clone()));
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await.map_err(Error::Connection)?;
        let status = response.status();
        tracing::debug!(%method, %url, %status, "received response");
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.map_err(Error::Connection)?;
        if status == StatusCode::NOT_FOUND {
            tracing::debug!(%url, "not found");
        } else if status == StatusCode::UNAUTHORIZED {
            tracing::warn!(
                %method,
                %url,
                auth = self.auth.scheme(),
                "Grafana rejected the credentials"
            );
        } else {
            tracing::warn!(%method, %url, %status, body = %body, "request failed");
        }
        Err(Error::Http { status, body })
    }

    /// Send a request and parse the JSON response body.
    async fn json<T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: Option<&Value>,
    ) -> Result<T> {
        let response = self.call(method, url, body).await?;
        let text = response.text().await.map_err(Error::Connection)?;
        let text = if text.trim().is_empty() { "{}" } else { &text };
        Ok(serde_json::from_str(text)?)
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    fn resolve(
        api_key: Option<&str>,
        username: Option<&str>,
        password: Option<&str>,
    ) -> Result<Auth, ConfigError> {
        Auth::resolve(
            api_key.map(String::from),
            username.map(String::from),
            password.map(String::from),
        )
    }

    #[test]
    fn api_key_wins() {
        assert_eq!(
            resolve(Some(" glsa_token\n"), Some("admin"), Some("admin")),
            Ok(Auth::ApiKey("glsa_token".to_string()))
        );
        assert_eq!(
            resolve(Some("key"), Some("admin"), None),
            Ok(Auth::ApiKey("key".to_string()))
        );
    }

    #[test]
    fn basic_auth_needs_both_halves() {
        assert_eq!(
            resolve(None, Some("admin"), None),
            Err(ConfigError::IncompleteBasicAuth { missing: "password" })
        );
        assert_eq!(
            resolve(None, Some(""), Some("admin")),
            Err(ConfigError::IncompleteBasicAuth { missing: "username" })
        );
        assert_eq!(resolve(Some(""), None, None), Ok(Auth::None));
    }

    #[test]
    fn debug_hides_secrets() {
        let auth = resolve(None, Some("admin"), Some("hunter2")).unwrap();
        let debug = format!("{auth:?}");
        assert!(debug.contains("admin"));
        assert!(!debug.contains("hunter2"));

        let builder = ClientBuilder::new().api_key("glsa_secret");
        assert!(!format!("{builder:?}").contains("glsa_secret"));
    }

    #[test]
    fn endpoints() {
        let client = ClientBuilder::new().build().unwrap();
        assert_eq!(
            client.endpoint(&["api", "dashboards", "db"]).as_str(),
            "http://localhost:3000/api/dashboards/db"
        );

        let client = ClientBuilder::new()
            .base_url("https://example.com/grafana/")
            .build()
            .unwrap();
        assert_eq!(
            client
                .endpoint(&DashboardIdentifier::slug("my dash").segments())
                .as_str(),
            "https://example.com/grafana/api/dashboards/db/my%20dash"
        );
        assert_eq!(
            client.endpoint(&["api", "datasources", "name", "a/b"]).as_str(),
            "https://example.com/grafana/api/datasources/name/a%2Fb"
        );
    }

    #[test]
    fn invalid_urls() {
        assert!(matches!(
            ClientBuilder::new().base_url("not a url").build(),
            Err(Error::Config(ConfigError::InvalidUrl { .. }))
        ));
        assert!(matches!(
            ClientBuilder::new().base_url("mailto:admin@example.com").build(),
            Err(Error::Config(ConfigError::InvalidUrl { .. }))
        ));
    }
}
