//! Schema descriptors for resource models.
//!
//! Every model in [`crate::models`] implements [`Schema`], which exposes a [`SchemaDescriptor`]
//! listing the wire name and [`FieldKind`] of each of its fields. Descriptors are generated at
//! compile time by `#[derive(Schema)]` from the declared Rust types and serde attributes, so a new
//! array field added to a model is picked up without touching any other code.
//!
//! The [`introspect`] functions use these descriptors to normalize serialized models before they
//! are sent to Grafana.
//!
//! ```
//! use grafanarama::schema::{FieldKind, Schema};
//! use serde::Serialize;
//!
//! #[derive(Serialize, Schema)]
//! #[serde(rename_all = "camelCase")]
//! struct Folder {
//!     folder_uid: String,
//!     tags: Option<Vec<String>>,
//! }
//!
//! let fields = Folder::SCHEMA.fields();
//! assert_eq!(fields[0].name(), "folderUid");
//! assert_eq!(fields[1].kind(), FieldKind::Array);
//! ```
use std::fmt;

pub mod introspect;

pub use grafanarama_macros::Schema;
pub use introspect::{apply_array_defaults, array_fields, field_kinds, normalize};

/// The declared kind of a model field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum FieldKind {
    /// A string, number, boolean or timestamp.
    Scalar,
    /// An ordered sequence. These are always serialized as arrays, never `null`.
    Array,
    /// A nested object or map.
    Object,
    /// Arbitrary JSON whose shape is not described by the schema.
    Any,
}

impl FieldKind {
    /// Whether values of this kind must be emitted as JSON arrays.
    #[must_use]
    pub const fn is_array(self) -> bool {
        matches!(self, Self::Array)
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar => f.write_str("scalar"),
            Self::Array => f.write_str("array"),
            Self::Object => f.write_str("object"),
            Self::Any => f.write_str("any"),
        }
    }
}

/// Metadata about a single field of a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    name: &'static str,
    kind: FieldKind,
    required: bool,
}

impl FieldDescriptor {
    /// Create a new field descriptor.
    #[must_use]
    pub const fn new(name: &'static str, kind: FieldKind, required: bool) -> Self {
        Self {
            name,
            kind,
            required,
        }
    }

    /// The name of the field as it appears in JSON.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// The declared kind of the field.
    #[must_use]
    pub const fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Whether the field must always be present.
    #[must_use]
    pub const fn required(&self) -> bool {
        self.required
    }
}

/// The declared fields of a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaDescriptor {
    name: &'static str,
    fields: &'static [FieldDescriptor],
}

impl SchemaDescriptor {
    /// Create a new schema descriptor.
    #[must_use]
    pub const fn new(name: &'static str, fields: &'static [FieldDescriptor]) -> Self {
        Self { name, fields }
    }

    /// The name of the described model.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// All serialized fields of the model, in declaration order.
    #[must_use]
    pub const fn fields(&self) -> &'static [FieldDescriptor] {
        self.fields
    }

    /// Look up a field by its JSON name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&'static FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// A type whose fields are described by a [`SchemaDescriptor`].
///
/// This is normally implemented with `#[derive(Schema)]`. Types that serialize as another
/// type (such as [`DashboardObject`][crate::models::DashboardObject], which serializes as its
/// spec) implement it by hand and reuse the other type's descriptor.
pub trait Schema {
    /// The descriptor for this type.
    const SCHEMA: SchemaDescriptor;
}
