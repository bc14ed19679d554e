//! Schema-driven normalization of serialized models.
//!
//! Grafana rejects `null` for many array-typed fields (`tags`, `panels`, `links`, ...). The
//! functions here consult a model's [`SchemaDescriptor`] to find every field declared as an array
//! and make sure it is emitted as `[]` when the caller left it unset.
//!
//! Only the top-level fields of the value being normalized are considered; nested objects are
//! passed through as they are.
use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

use super::{FieldKind, Schema, SchemaDescriptor};

/// Map every declared field of `model` to its [`FieldKind`].
///
/// The model instance is only used to select the schema; its values are not inspected.
#[must_use]
pub fn field_kinds<T: Schema + ?Sized>(_model: &T) -> BTreeMap<&'static str, FieldKind> {
    T::SCHEMA
        .fields()
        .iter()
        .map(|f| (f.name(), f.kind()))
        .collect()
}

/// The JSON names of every field of `T` declared as an array.
pub fn array_fields<T: Schema + ?Sized>() -> impl Iterator<Item = &'static str> {
    T::SCHEMA
        .fields()
        .iter()
        .filter(|f| f.kind().is_array())
        .map(|f| f.name())
}

/// Replace absent or `null` array fields in `object` with empty arrays.
///
/// Keys that are not part of `schema` are left untouched, as are array fields which already
/// hold a value. Returns the names of the fields that were filled in.
pub fn apply_array_defaults(
    object: &mut Map<String, Value>,
    schema: &SchemaDescriptor,
) -> Vec<&'static str> {
    let mut filled = Vec::new();
    for field in schema.fields().iter().filter(|f| f.kind().is_array()) {
        match object.get_mut(field.name()) {
            Some(value) if value.is_null() => *value = Value::Array(vec![]),
            Some(_) => continue,
            None => {
                object.insert(field.name().to_string(), Value::Array(vec![]));
            }
        }
        filled.push(field.name());
    }
    filled
}

/// Serialize `model` to JSON and apply its array defaults.
///
/// If the model does not serialize to a JSON object it is returned unchanged.
pub fn normalize<T: Schema + Serialize + ?Sized>(model: &T) -> serde_json::Result<Value> {
    let mut value = serde_json::to_value(model)?;
    if let Value::Object(object) = &mut value {
        let filled = apply_array_defaults(object, &T::SCHEMA);
        if !filled.is_empty() {
            tracing::trace!(
                schema = T::SCHEMA.name(),
                fields = ?filled,
                "defaulted unset array fields"
            );
        }
    }
    Ok(value)
}
