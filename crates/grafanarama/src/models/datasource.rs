use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use serde_with::skip_serializing_none;

use crate::{error::ValidationError, schema::Schema};

/// How Grafana reaches a datasource.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Access {
    /// Requests are proxied through the Grafana server.
    Proxy,
    /// The browser talks to the datasource directly.
    Direct,
}

/// Secret datasource settings, such as passwords or tokens.
///
/// Grafana never returns these; they are write-only. The values are hidden from
/// the `Debug` output.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SecureJsonData(pub BTreeMap<String, String>);

impl fmt::Debug for SecureJsonData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.0.keys()).finish()
    }
}

/// A datasource definition.
#[skip_serializing_none]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Schema)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct Datasource {
    /// Numeric ID assigned by the Grafana instance.
    pub id: Option<i64>,
    pub uid: Option<String>,
    pub org_id: Option<i64>,
    /// Name of the datasource, unique within an organization.
    pub name: String,
    /// The datasource plugin type, e.g. `prometheus`.
    #[serde(rename = "type")]
    pub datasource_type: String,
    #[schema(kind = "scalar")]
    pub access: Option<Access>,
    pub url: Option<String>,
    pub user: Option<String>,
    pub database: Option<String>,
    pub basic_auth: Option<bool>,
    pub basic_auth_user: Option<String>,
    pub with_credentials: Option<bool>,
    pub is_default: Option<bool>,
    /// Plugin-specific settings.
    pub json_data: Option<Value>,
    pub secure_json_data: Option<SecureJsonData>,
    pub read_only: Option<bool>,
    /// Properties not covered by this model.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Datasource {
    /// Start building a datasource.
    #[must_use]
    pub fn builder() -> DatasourceBuilder {
        DatasourceBuilder::default()
    }
}

/// Builder for [`Datasource`]s.
#[derive(Debug, Default)]
pub struct DatasourceBuilder {
    uid: Option<String>,
    name: Option<String>,
    datasource_type: Option<String>,
    access: Option<Access>,
    url: Option<String>,
    user: Option<String>,
    database: Option<String>,
    basic_auth: Option<bool>,
    basic_auth_user: Option<String>,
    with_credentials: Option<bool>,
    is_default: Option<bool>,
    json_data: Option<Value>,
    secure_json_data: Option<SecureJsonData>,
}

impl DatasourceBuilder {
    setters! {
        uid: String,
        /// Set the name. Required.
        name: String,
        /// Set the plugin type. Required.
        datasource_type: String,
        access: Access,
        url: String,
        user: String,
        database: String,
        basic_auth: bool,
        basic_auth_user: String,
        with_credentials: bool,
        is_default: bool,
        json_data: Value,
    }

    /// Add a secret setting.
    #[must_use]
    pub fn secure_json_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.secure_json_data
            .get_or_insert_with(SecureJsonData::default)
            .0
            .insert(key.into(), value.into());
        self
    }

    /// Build the datasource.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the name or type are missing or empty.
    pub fn build(self) -> Result<Datasource, ValidationError> {
        const MODEL: &str = "Datasource";
        let name = self
            .name
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| ValidationError::missing(MODEL, "name"))?;
        let datasource_type = self
            .datasource_type
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| ValidationError::missing(MODEL, "type"))?;
        Ok(Datasource {
            id: None,
            uid: self.uid,
            org_id: None,
            name,
            datasource_type,
            access: self.access,
            url: self.url,
            user: self.user,
            database: self.database,
            basic_auth: self.basic_auth,
            basic_auth_user: self.basic_auth_user,
            with_credentials: self.with_credentials,
            is_default: self.is_default,
            json_data: self.json_data,
            secure_json_data: self.secure_json_data,
            read_only: None,
            extra: Map::new(),
        })
    }
}
