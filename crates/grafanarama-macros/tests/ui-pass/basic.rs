use grafanarama::schema::{FieldKind, Schema};
use serde::Serialize;

#[derive(Serialize, Schema)]
#[serde(rename_all = "camelCase")]
struct Alert {
    title: String,
    for_duration: Option<String>,
    labels: Option<Vec<String>>,
    annotations: std::collections::BTreeMap<String, String>,
    model: serde_json::Value,
}

fn main() {
    let schema = Alert::SCHEMA;
    assert_eq!(schema.name(), "Alert");
    let names: Vec<_> = schema.fields().iter().map(|f| f.name()).collect();
    assert_eq!(names, ["title", "forDuration", "labels", "annotations", "model"]);

    let labels = schema.field("labels").unwrap();
    assert_eq!(labels.kind(), FieldKind::Array);
    assert!(!labels.required());
    assert!(schema.field("title").unwrap().required());
    assert_eq!(schema.field("annotations").unwrap().kind(), FieldKind::Object);
    assert_eq!(schema.field("model").unwrap().kind(), FieldKind::Any);
}
