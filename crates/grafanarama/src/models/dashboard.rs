use std::collections::BTreeMap;

use chrono::prelude::*;
use serde::{
    de::{Error as _, Unexpected},
    Deserialize, Deserializer, Serialize, Serializer,
};
use serde_json::{Map, Value};
use serde_with::{serde_as, skip_serializing_none, DisplayFromStr, PickFirst};

use crate::{
    error::ValidationError,
    models::{AnnotationContainer, Panel},
    schema::{Schema, SchemaDescriptor},
};

/// The dashboard schema version emitted when none is given.
pub const DEFAULT_SCHEMA_VERSION: u16 = 39;

/// The time range shown by a dashboard.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Schema)]
pub struct TimeRange {
    /// Start of the range, e.g. `now-6h`.
    pub from: String,
    /// End of the range, e.g. `now`.
    pub to: String,
}

impl TimeRange {
    /// Create a new time range.
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

impl Default for TimeRange {
    fn default() -> Self {
        Self::new("now-6h", "now")
    }
}

/// Configuration of the dashboard's time picker.
#[skip_serializing_none]
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Schema)]
#[serde(rename_all = "camelCase")]
pub struct TimePicker {
    pub hidden: Option<bool>,
    /// Auto-refresh intervals offered to the user, e.g. `5s`, `1m`.
    pub refresh_intervals: Option<Vec<String>>,
    pub collapse: Option<bool>,
    pub enable: Option<bool>,
    pub time_options: Option<Vec<String>>,
}

/// The template variables of a dashboard.
#[skip_serializing_none]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, Schema)]
pub struct Templating {
    /// Variable definitions.
    pub list: Option<Vec<Value>>,
}

/// The kind of a [`DashboardLink`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DashboardLinkType {
    /// A link to an arbitrary URL.
    Link,
    /// A list of dashboards matching some tags.
    Dashboards,
}

/// A link shown in the dashboard controls.
#[skip_serializing_none]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Schema)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct DashboardLink {
    pub title: String,
    #[serde(rename = "type")]
    #[schema(kind = "scalar")]
    pub link_type: DashboardLinkType,
    pub icon: Option<String>,
    pub tooltip: Option<String>,
    pub url: Option<String>,
    /// Tags used to select dashboards for [`DashboardLinkType::Dashboards`] links.
    pub tags: Option<Vec<String>>,
    pub as_dropdown: Option<bool>,
    pub target_blank: Option<bool>,
    pub include_vars: Option<bool>,
    pub keep_time: Option<bool>,
}

impl DashboardLink {
    /// Create a link with the given title.
    pub fn new(title: impl Into<String>, link_type: DashboardLinkType) -> Self {
        Self {
            title: title.into(),
            link_type,
            icon: None,
            tooltip: None,
            url: None,
            tags: None,
            as_dropdown: None,
            target_blank: None,
            include_vars: None,
            keep_time: None,
        }
    }

    /// Set the URL of the link.
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Set the tags used to select dashboards.
    #[must_use]
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = Some(tags);
        self
    }

    /// Set the tooltip of the link.
    #[must_use]
    pub fn with_tooltip(mut self, tooltip: impl Into<String>) -> Self {
        self.tooltip = Some(tooltip.into());
        self
    }
}

/// The dashboard itself: everything shown in Grafana's "JSON Model" view.
///
/// Create one with [`Spec::builder`]. Any property not modelled here is kept in
/// [`extra`][Spec::extra] so that dashboards fetched from Grafana can be sent back unchanged.
#[serde_as]
#[skip_serializing_none]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Schema)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct Spec {
    /// Numeric ID assigned by the Grafana instance.
    pub id: Option<i64>,
    /// Unique identifier, stable across Grafana instances.
    pub uid: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub revision: Option<i64>,
    /// ID of the dashboard on grafana.com, if imported from there. Older exports store it as
    /// a string.
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub gnet_id: Option<i64>,
    pub tags: Option<Vec<String>>,
    /// `browser`, `utc` or an IANA zone name.
    pub timezone: Option<String>,
    pub editable: Option<bool>,
    /// 0: no shared crosshair or tooltip, 1: shared crosshair, 2: shared crosshair and tooltip.
    pub graph_tooltip: Option<u8>,
    pub time: Option<TimeRange>,
    pub timepicker: Option<TimePicker>,
    /// First month of the fiscal year, 0 being January.
    pub fiscal_year_start_month: Option<u8>,
    pub live_now: Option<bool>,
    pub week_start: Option<String>,
    /// Refresh interval, such as `5s`. Older dashboards use `false` to disable refreshing.
    pub refresh: Option<Value>,
    /// Version of the JSON schema the dashboard follows.
    pub schema_version: u16,
    /// Version of the dashboard, incremented on every save.
    pub version: Option<u32>,
    pub panels: Option<Vec<Panel>>,
    pub templating: Option<Templating>,
    pub annotations: Option<AnnotationContainer>,
    pub links: Option<Vec<DashboardLink>>,
    pub snapshot: Option<Value>,
    /// Properties not covered by this model.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Spec {
    /// Start building a dashboard spec.
    #[must_use]
    pub fn builder() -> SpecBuilder {
        SpecBuilder::default()
    }
}

/// Builder for dashboard [`Spec`]s.
///
/// The builder starts with the values Grafana gives a new dashboard: schema version
/// [`DEFAULT_SCHEMA_VERSION`], `browser` timezone, editable, no shared tooltip, and a
/// fiscal year starting in January.
#[derive(Debug)]
pub struct SpecBuilder {
    id: Option<i64>,
    uid: Option<String>,
    title: Option<String>,
    description: Option<String>,
    revision: Option<i64>,
    gnet_id: Option<i64>,
    tags: Option<Vec<String>>,
    timezone: Option<String>,
    editable: Option<bool>,
    graph_tooltip: Option<u8>,
    time: Option<TimeRange>,
    timepicker: Option<TimePicker>,
    fiscal_year_start_month: Option<u8>,
    live_now: Option<bool>,
    week_start: Option<String>,
    refresh: Option<Value>,
    schema_version: u16,
    version: Option<u32>,
    panels: Option<Vec<Panel>>,
    templating: Option<Templating>,
    annotations: Option<AnnotationContainer>,
    links: Option<Vec<DashboardLink>>,
    snapshot: Option<Value>,
    extra: Map<String, Value>,
}

impl Default for SpecBuilder {
    fn default() -> Self {
        Self {
            id: None,
            uid: None,
            title: None,
            description: None,
            revision: None,
            gnet_id: None,
            tags: None,
            timezone: Some("browser".to_string()),
            editable: Some(true),
            graph_tooltip: Some(0),
            time: None,
            timepicker: None,
            fiscal_year_start_month: Some(0),
            live_now: None,
            week_start: None,
            refresh: None,
            schema_version: DEFAULT_SCHEMA_VERSION,
            version: None,
            panels: None,
            templating: None,
            annotations: None,
            links: None,
            snapshot: None,
            extra: Map::new(),
        }
    }
}

impl SpecBuilder {
    setters! {
        uid: String,
        title: String,
        description: String,
        tags: Vec<String>,
        timezone: String,
        editable: bool,
        time: TimeRange,
        timepicker: TimePicker,
        live_now: bool,
        week_start: String,
        refresh: Value,
        panels: Vec<Panel>,
        templating: Templating,
        annotations: AnnotationContainer,
        links: Vec<DashboardLink>,
        snapshot: Value,
    }

    /// Set the numeric ID. Only needed when updating an existing dashboard by ID.
    #[must_use]
    pub fn id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    /// Set the grafana.com dashboard ID.
    #[must_use]
    pub fn gnet_id(mut self, gnet_id: i64) -> Self {
        self.gnet_id = Some(gnet_id);
        self
    }

    /// Set the revision.
    #[must_use]
    pub fn revision(mut self, revision: i64) -> Self {
        self.revision = Some(revision);
        self
    }

    /// Set the shared tooltip mode (0, 1 or 2).
    #[must_use]
    pub fn graph_tooltip(mut self, graph_tooltip: u8) -> Self {
        self.graph_tooltip = Some(graph_tooltip);
        self
    }

    /// Set the first month of the fiscal year (0 to 11).
    #[must_use]
    pub fn fiscal_year_start_month(mut self, month: u8) -> Self {
        self.fiscal_year_start_month = Some(month);
        self
    }

    /// Set the schema version.
    #[must_use]
    pub fn schema_version(mut self, schema_version: u16) -> Self {
        self.schema_version = schema_version;
        self
    }

    /// Set the dashboard version. Required by Grafana when updating without `overwrite`.
    #[must_use]
    pub fn version(mut self, version: u32) -> Self {
        self.version = Some(version);
        self
    }

    /// Append a panel.
    #[must_use]
    pub fn panel(mut self, panel: Panel) -> Self {
        self.panels.get_or_insert_with(Vec::new).push(panel);
        self
    }

    /// Set a property not covered by the model.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(name.into(), value.into());
        self
    }

    /// Build the spec.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if `graphTooltip` or `fiscalYearStartMonth` are out of range.
    pub fn build(self) -> Result<Spec, ValidationError> {
        const MODEL: &str = "Spec";
        if let Some(tooltip) = self.graph_tooltip.filter(|t| *t > 2) {
            return Err(ValidationError::out_of_range(
                MODEL,
                "graphTooltip",
                format!("must be 0, 1 or 2, got {tooltip}"),
            ));
        }
        if let Some(month) = self.fiscal_year_start_month.filter(|m| *m > 11) {
            return Err(ValidationError::out_of_range(
                MODEL,
                "fiscalYearStartMonth",
                format!("must be between 0 and 11, got {month}"),
            ));
        }
        Ok(Spec {
            id: self.id,
            uid: self.uid,
            title: self.title,
            description: self.description,
            revision: self.revision,
            gnet_id: self.gnet_id,
            tags: self.tags,
            timezone: self.timezone,
            editable: self.editable,
            graph_tooltip: self.graph_tooltip,
            time: self.time,
            timepicker: self.timepicker,
            fiscal_year_start_month: self.fiscal_year_start_month,
            live_now: self.live_now,
            week_start: self.week_start,
            refresh: self.refresh,
            schema_version: self.schema_version,
            version: self.version,
            panels: self.panels,
            templating: self.templating,
            annotations: self.annotations,
            links: self.links,
            snapshot: self.snapshot,
            extra: self.extra,
        })
    }
}

/// Kubernetes-style object metadata attached to a dashboard.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Schema)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub uid: String,
    pub creation_timestamp: DateTime<Utc>,
    pub deletion_timestamp: Option<DateTime<Utc>>,
    pub finalizers: Vec<String>,
    pub resource_version: String,
    pub labels: BTreeMap<String, String>,
    pub update_timestamp: DateTime<Utc>,
    pub created_by: String,
    pub updated_by: String,
    pub extra_fields: Map<String, Value>,
}

impl Metadata {
    /// Metadata for a resource created by `user` at `timestamp`.
    pub fn new(uid: impl Into<String>, user: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        let user = user.into();
        Self {
            uid: uid.into(),
            creation_timestamp: timestamp,
            deletion_timestamp: None,
            finalizers: vec![],
            resource_version: "1".to_string(),
            labels: BTreeMap::new(),
            update_timestamp: timestamp,
            created_by: user.clone(),
            updated_by: user,
            extra_fields: Map::new(),
        }
    }
}

/// Status reported by operators managing a dashboard.
#[skip_serializing_none]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, Schema)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    pub operator_states: Option<BTreeMap<String, Value>>,
    pub additional_fields: Option<Map<String, Value>>,
}

/// A complete dashboard resource: metadata, spec and status.
///
/// This serializes all three parts. Grafana's dashboard API only accepts the spec; use
/// [`DashboardObject`] to send dashboards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Schema)]
pub struct Dashboard {
    pub metadata: Metadata,
    pub spec: Spec,
    #[serde(default)]
    pub status: Status,
}

/// A dashboard as sent to and received from Grafana's dashboard API.
///
/// Optional metadata and status can be attached, but a `DashboardObject` always serializes as
/// its [`Spec`], which is the shape Grafana expects.
///
/// Deserializing accepts either a bare spec, as returned by Grafana's dashboard API, or an object
/// with `metadata`, `spec` and `status` keys. In the second form any other top-level keys are
/// merged into the spec and take precedence over the spec's own values. A missing
/// `schemaVersion` defaults to [`DEFAULT_SCHEMA_VERSION`].
#[derive(Clone, Debug, PartialEq)]
pub struct DashboardObject {
    metadata: Option<Metadata>,
    spec: Spec,
    status: Status,
}

impl DashboardObject {
    /// Wrap a spec.
    #[must_use]
    pub fn new(spec: Spec) -> Self {
        Self {
            metadata: None,
            spec,
            status: Status::default(),
        }
    }

    /// Attach metadata.
    #[must_use]
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Attach a status.
    #[must_use]
    pub fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    /// The dashboard spec.
    #[must_use]
    pub fn spec(&self) -> &Spec {
        &self.spec
    }

    /// The dashboard spec, for editing in place.
    pub fn spec_mut(&mut self) -> &mut Spec {
        &mut self.spec
    }

    /// The attached metadata, if any.
    #[must_use]
    pub fn metadata(&self) -> Option<&Metadata> {
        self.metadata.as_ref()
    }

    /// The attached status. Empty unless one was set or received.
    #[must_use]
    pub fn status(&self) -> &Status {
        &self.status
    }

    /// Discard the metadata and status, returning the spec.
    #[must_use]
    pub fn into_spec(self) -> Spec {
        self.spec
    }
}

impl From<Spec> for DashboardObject {
    fn from(spec: Spec) -> Self {
        Self::new(spec)
    }
}

impl From<Dashboard> for DashboardObject {
    fn from(dashboard: Dashboard) -> Self {
        Self {
            metadata: Some(dashboard.metadata),
            spec: dashboard.spec,
            status: dashboard.status,
        }
    }
}

impl Schema for DashboardObject {
    const SCHEMA: SchemaDescriptor = Spec::SCHEMA;
}

impl Serialize for DashboardObject {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.spec.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for DashboardObject {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let mut fields = Map::<String, Value>::deserialize(deserializer)?;
        let metadata = match fields.remove("metadata") {
            None | Some(Value::Null) => None,
            Some(Value::Object(m)) if m.is_empty() => None,
            Some(m) => Some(serde_json::from_value(m).map_err(D::Error::custom)?),
        };
        let status = match fields.remove("status") {
            None | Some(Value::Null) => Status::default(),
            Some(s) => serde_json::from_value(s).map_err(D::Error::custom)?,
        };
        let mut spec = match fields.remove("spec") {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(spec)) => spec,
            Some(other) => {
                return Err(D::Error::invalid_type(
                    unexpected(&other),
                    &"a dashboard spec object",
                ))
            }
        };
        spec.extend(fields);
        if spec.get("schemaVersion").map_or(true, Value::is_null) {
            spec.insert("schemaVersion".to_string(), DEFAULT_SCHEMA_VERSION.into());
        }
        let spec = serde_json::from_value(Value::Object(spec)).map_err(D::Error::custom)?;
        Ok(Self {
            metadata,
            spec,
            status,
        })
    }
}

fn unexpected(value: &Value) -> Unexpected<'_> {
    match value {
        Value::Null => Unexpected::Unit,
        Value::Bool(b) => Unexpected::Bool(*b),
        Value::Number(_) => Unexpected::Other("number"),
        Value::String(s) => Unexpected::Str(s),
        Value::Array(_) => Unexpected::Seq,
        Value::Object(_) => Unexpected::Map,
    }
}
