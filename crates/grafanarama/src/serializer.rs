//! Conversion of resource models into the JSON documents accepted by Grafana's API.
//!
//! Serialization always goes through [`schema::normalize`][crate::schema::normalize], so every
//! top-level field declared as an array is emitted as `[]` rather than `null`. The result is then
//! wrapped in whatever envelope the endpoint for that [`ResourceKind`] expects.
use std::fmt;

use serde::Serialize;
use serde_json::Value;
use serde_with::skip_serializing_none;

use crate::{
    error::Result,
    models::{DashboardObject, Datasource, Panel, Spec},
    schema::{self, Schema},
};

/// The kinds of resource this crate can send to Grafana.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ResourceKind {
    /// A dashboard, sent inside the save envelope.
    Dashboard,
    /// A single panel, sent bare.
    Panel,
    /// A datasource, sent bare.
    Datasource,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dashboard => f.write_str("dashboard"),
            Self::Panel => f.write_str("panel"),
            Self::Datasource => f.write_str("datasource"),
        }
    }
}

/// A model which can be serialized and sent to Grafana.
pub trait Resource: Schema + Serialize {
    /// The kind of resource, which determines the request envelope.
    const KIND: ResourceKind;
}

impl Resource for DashboardObject {
    const KIND: ResourceKind = ResourceKind::Dashboard;
}

impl Resource for Spec {
    const KIND: ResourceKind = ResourceKind::Dashboard;
}

impl Resource for Panel {
    const KIND: ResourceKind = ResourceKind::Panel;
}

impl Resource for Datasource {
    const KIND: ResourceKind = ResourceKind::Datasource;
}

/// Options used when saving a dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveOptions {
    /// Replace an existing dashboard with the same UID or title, regardless of version.
    pub overwrite: bool,
    /// Commit message stored in the dashboard's version history.
    pub message: String,
    /// UID of the folder to save the dashboard in.
    pub folder_uid: Option<String>,
}

impl SaveOptions {
    /// Set whether existing dashboards are overwritten.
    #[must_use]
    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Set the version history message.
    #[must_use]
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Set the destination folder.
    #[must_use]
    pub fn folder_uid(mut self, folder_uid: impl Into<String>) -> Self {
        self.folder_uid = Some(folder_uid.into());
        self
    }
}

#[skip_serializing_none]
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DashboardEnvelope<'a> {
    dashboard: Value,
    overwrite: bool,
    message: &'a str,
    folder_uid: Option<&'a str>,
}

/// Serialize a resource with its array defaults applied, without any envelope.
///
/// # Errors
///
/// Returns [`Error::Serialization`][crate::Error::Serialization] if the resource cannot be
/// represented as JSON.
pub fn to_value<R: Resource + ?Sized>(resource: &R) -> Result<Value> {
    Ok(schema::normalize(resource)?)
}

/// Serialize a resource into the request body for its endpoint.
///
/// Dashboards are wrapped as `{"dashboard": ..., "overwrite": ..., "message": ...}`, plus
/// `folderUid` when set. Panels and datasources are sent as they are; `options` only applies to
/// dashboards.
///
/// # Errors
///
/// Returns [`Error::Serialization`][crate::Error::Serialization] if the resource cannot be
/// represented as JSON.
pub fn to_request_body<R: Resource + ?Sized>(resource: &R, options: &SaveOptions) -> Result<Value> {
    let value = to_value(resource)?;
    Ok(match R::KIND {
        ResourceKind::Dashboard => serde_json::to_value(DashboardEnvelope {
            dashboard: value,
            overwrite: options.overwrite,
            message: &options.message,
            folder_uid: options.folder_uid.as_deref(),
        })?,
        ResourceKind::Panel | ResourceKind::Datasource => value,
    })
}

/// Render a resource as indented, normalized JSON, for printing or debugging.
///
/// # Errors
///
/// Returns [`Error::Serialization`][crate::Error::Serialization] if the resource cannot be
/// represented as JSON.
pub fn to_pretty_json<R: Resource + ?Sized>(resource: &R) -> Result<String> {
    Ok(serde_json::to_string_pretty(&to_value(resource)?)?)
}
