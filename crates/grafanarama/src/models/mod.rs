//! Typed Grafana resource models.
//!
//! Models with required fields are created through builders whose `build` method checks the
//! schema constraints and returns a [`ValidationError`][crate::ValidationError] if they are not
//! met. All models can also be deserialized from the JSON Grafana returns.
//!
//! Fields that are declared as arrays are modelled as `Option<Vec<_>>`; when left unset they are
//! emitted as `[]` by the [serializer][crate::serializer], never as `null`.
//!
//! ```
//! use grafanarama::models::{DashboardObject, GridPos, Panel, Spec};
//! use serde_json::json;
//!
//! # fn main() -> Result<(), grafanarama::ValidationError> {
//! let panel = Panel::builder()
//!     .panel_type("text")
//!     .id(1)
//!     .title("Hello")
//!     .grid_pos(GridPos::new(0, 0, 24, 8)?)
//!     .options(json!({"mode": "markdown", "content": "hi"}))
//!     .build()?;
//! let dashboard = DashboardObject::from(
//!     Spec::builder()
//!         .title("D")
//!         .schema_version(39)
//!         .panels(vec![panel])
//!         .build()?,
//! );
//! assert_eq!(dashboard.spec().panels.as_ref().map(Vec::len), Some(1));
//! # Ok(())
//! # }
//! ```

/// Generate `#[must_use]` setters for builder fields of type `Option<T>`.
macro_rules! setters {
    ($($(#[$doc:meta])* $name:ident: $ty:ty),* $(,)?) => {
        $(
            $(#[$doc])*
            #[must_use]
            pub fn $name(mut self, $name: impl Into<$ty>) -> Self {
                self.$name = Some($name.into());
                self
            }
        )*
    };
}

mod annotation;
mod dashboard;
mod datasource;
mod panel;

pub use annotation::{
    AnnotationContainer, AnnotationPanelFilter, AnnotationQuery, AnnotationQueryBuilder,
};
pub use dashboard::{
    Dashboard, DashboardLink, DashboardLinkType, DashboardObject, Metadata, Spec, SpecBuilder,
    Status, Templating, TimePicker, TimeRange, DEFAULT_SCHEMA_VERSION,
};
pub use datasource::{Access, Datasource, DatasourceBuilder, SecureJsonData};
pub use panel::{
    DataSourceField, DataSourceRef, GridPos, Panel, PanelBuilder, GRID_COLUMN_COUNT,
};
