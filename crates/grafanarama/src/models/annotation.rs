use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use serde_with::skip_serializing_none;

use crate::{error::ValidationError, models::{DataSourceField, DataSourceRef}, schema::Schema};

/// The annotations configured on a dashboard.
#[skip_serializing_none]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, Schema)]
pub struct AnnotationContainer {
    /// The annotation queries.
    pub list: Option<Vec<AnnotationQuery>>,
}

impl AnnotationContainer {
    /// Create a container holding the given annotation queries.
    #[must_use]
    pub fn new(list: Vec<AnnotationQuery>) -> Self {
        Self { list: Some(list) }
    }
}

/// Restricts an annotation query to a subset of panels.
#[skip_serializing_none]
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Schema)]
pub struct AnnotationPanelFilter {
    /// If true, show the annotation on every panel except the listed ones.
    pub exclude: Option<bool>,
    /// Panel IDs the filter applies to.
    pub ids: Vec<u32>,
}

impl AnnotationPanelFilter {
    /// Only show the annotation on the given panels.
    #[must_use]
    pub fn including(ids: Vec<u32>) -> Self {
        Self { exclude: None, ids }
    }

    /// Show the annotation on every panel except the given ones.
    #[must_use]
    pub fn excluding(ids: Vec<u32>) -> Self {
        Self {
            exclude: Some(true),
            ids,
        }
    }
}

/// A query producing annotations on a dashboard.
#[skip_serializing_none]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Schema)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct AnnotationQuery {
    /// Name of the annotation.
    pub name: String,
    /// Datasource to query annotations from.
    #[schema(kind = "any")]
    pub datasource: DataSourceField,
    /// Whether the annotation is enabled.
    pub enable: bool,
    /// Whether the annotation toggle is hidden from the dashboard controls.
    pub hide: Option<bool>,
    /// Color of the annotation markers, e.g. `rgba(0, 211, 255, 1)`.
    pub icon_color: String,
    pub filter: Option<AnnotationPanelFilter>,
    /// Datasource-specific query.
    pub target: Option<Value>,
    #[serde(rename = "type")]
    pub annotation_type: Option<String>,
    /// Set to 1 for Grafana's built-in annotation query.
    pub built_in: Option<f64>,
    /// Properties not covered by this model.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AnnotationQuery {
    /// Start building an annotation query.
    #[must_use]
    pub fn builder() -> AnnotationQueryBuilder {
        AnnotationQueryBuilder::default()
    }

    /// The "Annotations & Alerts" query Grafana adds to every new dashboard.
    #[must_use]
    pub fn grafana_builtin() -> Self {
        Self {
            name: "Annotations & Alerts".to_string(),
            datasource: DataSourceRef::grafana().into(),
            enable: true,
            hide: Some(true),
            icon_color: "rgba(0, 211, 255, 1)".to_string(),
            filter: None,
            target: None,
            annotation_type: Some("dashboard".to_string()),
            built_in: Some(1.0),
            extra: Map::new(),
        }
    }
}

/// Builder for [`AnnotationQuery`]s.
#[derive(Debug, Default)]
pub struct AnnotationQueryBuilder {
    name: Option<String>,
    datasource: Option<DataSourceField>,
    enable: Option<bool>,
    hide: Option<bool>,
    icon_color: Option<String>,
    filter: Option<AnnotationPanelFilter>,
    target: Option<Value>,
    annotation_type: Option<String>,
}

impl AnnotationQueryBuilder {
    setters! {
        /// Set the name. Required.
        name: String,
        /// Set the datasource. Required.
        datasource: DataSourceField,
        /// Enable or disable the query. Defaults to enabled.
        enable: bool,
        hide: bool,
        /// Set the marker color. Required.
        icon_color: String,
        filter: AnnotationPanelFilter,
        target: Value,
        annotation_type: String,
    }

    /// Build the annotation query.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the name, datasource or icon color are missing.
    pub fn build(self) -> Result<AnnotationQuery, ValidationError> {
        const MODEL: &str = "AnnotationQuery";
        Ok(AnnotationQuery {
            name: self
                .name
                .ok_or_else(|| ValidationError::missing(MODEL, "name"))?,
            datasource: self
                .datasource
                .ok_or_else(|| ValidationError::missing(MODEL, "datasource"))?,
            enable: self.enable.unwrap_or(true),
            hide: self.hide,
            icon_color: self
                .icon_color
                .ok_or_else(|| ValidationError::missing(MODEL, "iconColor"))?,
            filter: self.filter,
            target: self.target,
            annotation_type: self.annotation_type,
            built_in: None,
            extra: Map::new(),
        })
    }
}
