use chamba_core::ValidationIssue;
use serde_json::{json, Map, Value};

/// Shape a list of validation issues into the JSON body returned to clients:
/// `{"validation": {"<field>": {"code": "...", "message": "..."}}}`.
pub fn to_payload(issues: &[ValidationIssue]) -> Value {
    let mut fields = Map::new();
    for issue in issues {
        fields.insert(
            issue.field.to_string(),
            json!({ "code": issue.code, "message": issue.message }),
        );
    }
    json!({ "validation": Value::Object(fields) })
}
