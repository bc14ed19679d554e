use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use serde_with::skip_serializing_none;

use crate::{error::ValidationError, schema::Schema};

/// The number of columns in Grafana's dashboard grid.
pub const GRID_COLUMN_COUNT: u32 = 24;

/// The position and size of a panel on the dashboard grid.
///
/// The grid is [`GRID_COLUMN_COUNT`] columns wide; rows are roughly 30 pixels high.
#[skip_serializing_none]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Schema)]
pub struct GridPos {
    /// Height in grid rows.
    pub h: u32,
    /// Width in grid columns.
    pub w: u32,
    /// Column of the left edge.
    pub x: u32,
    /// Row of the top edge.
    pub y: u32,
    /// Whether the panel is fixed in place.
    #[serde(rename = "static")]
    pub is_static: Option<bool>,
}

impl GridPos {
    /// Create a new grid position, checking it fits the grid.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::OutOfRange`] if `w` is zero or wider than the grid,
    /// if `h` is zero, or if `x` is past the last column.
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Result<Self, ValidationError> {
        if w == 0 || w > GRID_COLUMN_COUNT {
            return Err(ValidationError::out_of_range(
                "GridPos",
                "w",
                format!("must be between 1 and {GRID_COLUMN_COUNT}, got {w}"),
            ));
        }
        if h == 0 {
            return Err(ValidationError::out_of_range(
                "GridPos",
                "h",
                "must be at least 1",
            ));
        }
        if x >= GRID_COLUMN_COUNT {
            return Err(ValidationError::out_of_range(
                "GridPos",
                "x",
                format!("must be less than {GRID_COLUMN_COUNT}, got {x}"),
            ));
        }
        Ok(Self {
            h,
            w,
            x,
            y,
            is_static: None,
        })
    }
}

/// A reference to a datasource by type and UID.
#[skip_serializing_none]
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Schema)]
pub struct DataSourceRef {
    /// The datasource plugin type, e.g. `prometheus`.
    #[serde(rename = "type")]
    pub datasource_type: Option<String>,
    /// The UID of the datasource instance.
    pub uid: Option<String>,
}

impl DataSourceRef {
    /// Reference a datasource by plugin type and UID.
    pub fn new(datasource_type: impl Into<String>, uid: impl Into<String>) -> Self {
        Self {
            datasource_type: Some(datasource_type.into()),
            uid: Some(uid.into()),
        }
    }

    /// The built-in `-- Grafana --` datasource, used by dashboard annotations.
    #[must_use]
    pub fn grafana() -> Self {
        Self::new("grafana", "-- Grafana --")
    }
}

/// The datasource of a panel or annotation query.
///
/// Dashboards with a schema version below 33 name the datasource with a plain string;
/// newer ones use a [`DataSourceRef`]. Both forms are kept as received.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DataSourceField {
    /// A reference by plugin type and UID.
    Ref(DataSourceRef),
    /// A datasource name, or a template variable such as `${DS_PROMETHEUS}`.
    Name(String),
}

impl DataSourceField {
    /// The reference, if the datasource is not given by name.
    #[must_use]
    pub fn reference(&self) -> Option<&DataSourceRef> {
        match self {
            Self::Ref(r) => Some(r),
            Self::Name(_) => None,
        }
    }
}

impl From<DataSourceRef> for DataSourceField {
    fn from(r: DataSourceRef) -> Self {
        Self::Ref(r)
    }
}

impl From<String> for DataSourceField {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl From<&str> for DataSourceField {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

/// A dashboard panel.
///
/// Only the common panel properties are modelled; plugin-specific configuration lives in
/// [`options`][Panel::options] and [`field_config`][Panel::field_config], and any property
/// Grafana sends that isn't listed here is kept in [`extra`][Panel::extra].
#[skip_serializing_none]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Schema)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct Panel {
    /// The panel plugin type, e.g. `text` or `timeseries`.
    #[serde(rename = "type")]
    pub panel_type: String,
    /// Unique ID of the panel within the dashboard.
    pub id: Option<u32>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub grid_pos: Option<GridPos>,
    #[schema(kind = "any")]
    pub datasource: Option<DataSourceField>,
    /// Queries run by the panel.
    pub targets: Option<Vec<Value>>,
    /// Options of the panel plugin.
    pub options: Option<Value>,
    /// Field display configuration: defaults and overrides.
    pub field_config: Option<Value>,
    pub transparent: Option<bool>,
    pub plugin_version: Option<String>,
    pub links: Option<Vec<Value>>,
    /// Name of the template variable to repeat the panel for.
    pub repeat: Option<String>,
    /// `h` or `v`.
    pub repeat_direction: Option<String>,
    pub max_data_points: Option<f64>,
    pub interval: Option<String>,
    pub time_from: Option<String>,
    pub time_shift: Option<String>,
    pub transformations: Option<Vec<Value>>,
    /// Whether a row panel is collapsed.
    pub collapsed: Option<bool>,
    /// Panels nested inside a collapsed row.
    pub panels: Option<Vec<Panel>>,
    /// Properties not covered by this model.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Panel {
    /// Start building a panel.
    #[must_use]
    pub fn builder() -> PanelBuilder {
        PanelBuilder::default()
    }
}

/// Builder for [`Panel`]s.
#[derive(Debug, Default)]
pub struct PanelBuilder {
    panel_type: Option<String>,
    id: Option<u32>,
    title: Option<String>,
    description: Option<String>,
    grid_pos: Option<GridPos>,
    datasource: Option<DataSourceField>,
    targets: Option<Vec<Value>>,
    options: Option<Value>,
    field_config: Option<Value>,
    transparent: Option<bool>,
    plugin_version: Option<String>,
    links: Option<Vec<Value>>,
    repeat: Option<String>,
    repeat_direction: Option<String>,
    max_data_points: Option<f64>,
    interval: Option<String>,
    time_from: Option<String>,
    time_shift: Option<String>,
    transformations: Option<Vec<Value>>,
    collapsed: Option<bool>,
    panels: Option<Vec<Panel>>,
    extra: Map<String, Value>,
}

impl PanelBuilder {
    setters! {
        /// Set the panel plugin type. Required.
        panel_type: String,
        title: String,
        description: String,
        grid_pos: GridPos,
        datasource: DataSourceField,
        targets: Vec<Value>,
        options: Value,
        field_config: Value,
        transparent: bool,
        plugin_version: String,
        links: Vec<Value>,
        repeat: String,
        repeat_direction: String,
        interval: String,
        time_from: String,
        time_shift: String,
        transformations: Vec<Value>,
        collapsed: bool,
        panels: Vec<Panel>,
    }

    /// Set the panel ID.
    #[must_use]
    pub fn id(mut self, id: u32) -> Self {
        self.id = Some(id);
        self
    }

    /// Set the maximum number of data points requested by queries.
    #[must_use]
    pub fn max_data_points(mut self, max_data_points: f64) -> Self {
        self.max_data_points = Some(max_data_points);
        self
    }

    /// Set a property not covered by the model.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(name.into(), value.into());
        self
    }

    /// Build the panel.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the panel type was not set or is empty.
    pub fn build(self) -> Result<Panel, ValidationError> {
        let panel_type = self
            .panel_type
            .ok_or_else(|| ValidationError::missing("Panel", "type"))?;
        if panel_type.trim().is_empty() {
            return Err(ValidationError::out_of_range(
                "Panel",
                "type",
                "must not be empty",
            ));
        }
        Ok(Panel {
            panel_type,
            id: self.id,
            title: self.title,
            description: self.description,
            grid_pos: self.grid_pos,
            datasource: self.datasource,
            targets: self.targets,
            options: self.options,
            field_config: self.field_config,
            transparent: self.transparent,
            plugin_version: self.plugin_version,
            links: self.links,
            repeat: self.repeat,
            repeat_direction: self.repeat_direction,
            max_data_points: self.max_data_points,
            interval: self.interval,
            time_from: self.time_from,
            time_shift: self.time_shift,
            transformations: self.transformations,
            collapsed: self.collapsed,
            panels: self.panels,
            extra: self.extra,
        })
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::schema::FieldKind;

    #[test]
    fn grid_pos_bounds() {
        assert!(GridPos::new(0, 0, 24, 8).is_ok());
        assert!(matches!(
            GridPos::new(0, 0, 25, 8),
            Err(ValidationError::OutOfRange { field: "w", .. })
        ));
        assert!(matches!(
            GridPos::new(0, 0, 0, 8),
            Err(ValidationError::OutOfRange { field: "w", .. })
        ));
        assert!(matches!(
            GridPos::new(0, 0, 12, 0),
            Err(ValidationError::OutOfRange { field: "h", .. })
        ));
        assert!(matches!(
            GridPos::new(24, 0, 1, 1),
            Err(ValidationError::OutOfRange { field: "x", .. })
        ));
    }

    #[test]
    fn panel_requires_type() {
        assert_eq!(
            Panel::builder().title("no type").build(),
            Err(ValidationError::MissingField {
                model: "Panel",
                field: "type"
            })
        );
        assert!(Panel::builder().panel_type("  ").build().is_err());
    }

    #[test]
    fn text_panel_serializes() {
        let panel = Panel::builder()
            .panel_type("text")
            .id(1)
            .title("Hello")
            .grid_pos(GridPos::new(0, 0, 24, 8).unwrap())
            .options(json!({"mode": "markdown", "content": "hi"}))
            .build()
            .unwrap();
        assert_eq!(
            serde_json::to_value(&panel).unwrap(),
            json!({
                "type": "text",
                "id": 1,
                "title": "Hello",
                "gridPos": {"h": 8, "w": 24, "x": 0, "y": 0},
                "options": {"mode": "markdown", "content": "hi"},
            })
        );
    }

    #[test]
    fn unknown_properties_are_kept() {
        let raw = json!({
            "type": "timeseries",
            "id": 2,
            "fieldConfig": {"defaults": {}, "overrides": []},
            "hoverHighlight": true,
        });
        let panel: Panel = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(panel.extra.get("hoverHighlight"), Some(&json!(true)));
        assert_eq!(serde_json::to_value(&panel).unwrap(), raw);
    }

    #[test]
    fn datasource_by_reference_or_name() {
        let panel: Panel = serde_json::from_value(json!({
            "type": "graph",
            "datasource": "Prometheus"
        }))
        .unwrap();
        assert_eq!(
            panel.datasource,
            Some(DataSourceField::Name("Prometheus".to_string()))
        );
        assert_eq!(serde_json::to_value(&panel).unwrap()["datasource"], json!("Prometheus"));

        let panel: Panel = serde_json::from_value(json!({
            "type": "timeseries",
            "datasource": {"type": "prometheus", "uid": "P1809F7CD0C75ACF3"}
        }))
        .unwrap();
        let reference = panel.datasource.as_ref().and_then(DataSourceField::reference);
        assert_eq!(
            reference,
            Some(&DataSourceRef::new("prometheus", "P1809F7CD0C75ACF3"))
        );

        let built = Panel::builder()
            .panel_type("timeseries")
            .datasource(DataSourceRef::new("prometheus", "abc"))
            .build()
            .unwrap();
        assert_eq!(
            serde_json::to_value(&built).unwrap()["datasource"],
            json!({"type": "prometheus", "uid": "abc"})
        );
    }

    #[test]
    fn panel_schema() {
        let kind = |name| Panel::SCHEMA.field(name).map(|f| f.kind());
        assert_eq!(kind("targets"), Some(FieldKind::Array));
        assert_eq!(kind("panels"), Some(FieldKind::Array));
        assert_eq!(kind("gridPos"), Some(FieldKind::Object));
        assert_eq!(kind("options"), Some(FieldKind::Any));
        assert_eq!(kind("datasource"), Some(FieldKind::Any));
        assert!(Panel::SCHEMA.field("type").is_some_and(|f| f.required()));
        assert_eq!(
            GridPos::SCHEMA.field("static").map(|f| f.kind()),
            Some(FieldKind::Scalar)
        );
    }
}
