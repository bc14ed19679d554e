//! A synchronous Grafana client.
//!
//! [`Client`] wraps the asynchronous [`crate::Client`] and drives it on its own current-thread
//! tokio runtime, so each call blocks until Grafana responds or the connection fails.
//!
//! The blocking client must not be used from within an async context, since it would block the
//! executor thread; use [`crate::Client`] there instead.
//!
//! ```no_run
//! use grafanarama::{models::Spec, ClientBuilder};
//!
//! # fn main() -> grafanarama::Result<()> {
//! let client = ClientBuilder::new()
//!     .basic_auth("admin", "admin")
//!     .build_blocking()?;
//! let dashboard = Spec::builder().title("D").build()?;
//! client.send_dashboard(&dashboard.into(), true)?;
//! # Ok(())
//! # }
//! ```
use serde_json::Value;
use tokio::runtime::{Builder, Runtime};

use crate::{
    client::{
        Auth, DashboardIdentifier, DatasourceResponse, DeleteDashboardResponse, HealthResponse,
        SaveDashboardResponse,
    },
    error::{Error, Result},
    models::{DashboardObject, Datasource},
    serializer::SaveOptions,
};

/// A blocking Grafana API client. See the [module docs][self].
#[derive(Debug)]
pub struct Client {
    inner: crate::Client,
    runtime: Runtime,
}

impl Client {
    /// Wrap an asynchronous client.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Runtime`] if the runtime could not be started.
    pub fn new(inner: crate::Client) -> Result<Self> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(Error::Runtime)?;
        Ok(Self { inner, runtime })
    }

    /// The asynchronous client used to make requests.
    #[must_use]
    pub fn inner(&self) -> &crate::Client {
        &self.inner
    }

    /// The credentials sent with each request.
    #[must_use]
    pub fn auth(&self) -> &Auth {
        self.inner.auth()
    }

    /// See [`crate::Client::send_dashboard`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] if Grafana rejects the dashboard.
    pub fn send_dashboard(
        &self,
        dashboard: &DashboardObject,
        overwrite: bool,
    ) -> Result<SaveDashboardResponse> {
        self.runtime.block_on(self.inner.send_dashboard(dashboard, overwrite))
    }

    /// See [`crate::Client::send_dashboard_with`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] if Grafana rejects the dashboard.
    pub fn send_dashboard_with(
        &self,
        dashboard: &DashboardObject,
        options: &SaveOptions,
    ) -> Result<SaveDashboardResponse> {
        self.runtime.block_on(self.inner.send_dashboard_with(dashboard, options))
    }

    /// See [`crate::Client::get_dashboard`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] with a 404 status if the dashboard doesn't exist.
    pub fn get_dashboard(&self, identifier: DashboardIdentifier) -> Result<DashboardObject> {
        self.runtime.block_on(self.inner.get_dashboard(identifier))
    }

    /// See [`crate::Client::get_dashboard_json`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] with a 404 status if the dashboard doesn't exist.
    pub fn get_dashboard_json(&self, identifier: DashboardIdentifier) -> Result<Value> {
        self.runtime.block_on(self.inner.get_dashboard_json(identifier))
    }

    /// See [`crate::Client::delete_dashboard`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] with a 404 status if the dashboard doesn't exist.
    pub fn delete_dashboard(&self, uid: &str) -> Result<DeleteDashboardResponse> {
        self.runtime.block_on(self.inner.delete_dashboard(uid))
    }

    /// See [`crate::Client::send_datasource`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] if either the lookup or the save is rejected.
    pub fn send_datasource(&self, datasource: &Datasource) -> Result<DatasourceResponse> {
        self.runtime.block_on(self.inner.send_datasource(datasource))
    }

    /// See [`crate::Client::get_datasource_by_name`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] for any non-2xx response other than a 404.
    pub fn get_datasource_by_name(&self, name: &str) -> Result<Option<Datasource>> {
        self.runtime.block_on(self.inner.get_datasource_by_name(name))
    }

    /// See [`crate::Client::get_datasource_id_by_name`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] for any non-2xx response other than a 404.
    pub fn get_datasource_id_by_name(&self, name: &str) -> Result<Option<i64>> {
        self.runtime.block_on(self.inner.get_datasource_id_by_name(name))
    }

    /// See [`crate::Client::health`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Connection`] if Grafana can't be reached.
    pub fn health(&self) -> Result<HealthResponse> {
        self.runtime.block_on(self.inner.health())
    }
}
