use grafanarama::schema::{FieldKind, Schema};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Mode {
    Markdown,
    Html,
}

#[derive(Serialize, Deserialize, Schema)]
#[schema(name = "TextOptions")]
struct Options {
    #[schema(kind = "scalar")]
    mode: Mode,
    #[serde(rename = "content", default)]
    body: String,
    #[serde(skip)]
    cache: Vec<u8>,
    #[serde(flatten)]
    extra: serde_json::Map<String, serde_json::Value>,
}

fn main() {
    let schema = Options::SCHEMA;
    assert_eq!(schema.name(), "TextOptions");
    assert_eq!(schema.fields().len(), 2);
    assert_eq!(schema.field("mode").unwrap().kind(), FieldKind::Scalar);
    let content = schema.field("content").unwrap();
    assert_eq!(content.kind(), FieldKind::Scalar);
    assert!(!content.required());
    assert!(schema.field("cache").is_none());
}
