use super::ids::{IdGenerator, IdKind};
use super::variables::normalize;
use crate::models::insomnia::{DocumentMeta, ENVIRONMENT_DOCUMENT_TYPE, EnvironmentDocument};
use crate::models::postman::Environment;
use indexmap::IndexMap;
use serde_json::Value;
use tracing::debug;

/// Convert a Postman environment export; disabled values are dropped
pub fn import_environment(environment: &Environment, timestamp: i64) -> EnvironmentDocument {
    let mut ids = IdGenerator::new();
    let data: IndexMap<String, Value> = environment
        .values
        .iter()
        .filter(|value| value.enabled && !value.key.is_empty())
        .map(|value| {
            let converted = match &value.value {
                Some(Value::String(s)) => Value::String(normalize(s)),
                Some(Value::Null) | None => Value::String(String::new()),
                Some(other) => other.clone(),
            };
            (value.key.clone(), converted)
        })
        .collect();

    debug!(
        name = %environment.name,
        total = environment.values.len(),
        kept = data.len(),
        "Importing environment"
    );

    let mut meta = DocumentMeta::new(ids.next_id(IdKind::Environment), timestamp);
    meta.is_private = Some(false);

    EnvironmentDocument {
        document_type: ENVIRONMENT_DOCUMENT_TYPE.to_string(),
        name: environment.name.clone(),
        meta,
        data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converters::ids::is_valid_id;
    use serde_json::json;

    #[test]
    fn test_environment_values() {
        let environment: Environment = serde_json::from_value(json!({
            "id": "abc",
            "name": "Staging",
            "values": [
                { "key": "host", "value": "https://staging", "enabled": true },
                { "key": "secret", "value": "x", "enabled": false },
                { "key": "request-id", "value": "{{$guid}}" },
                { "key": "retries", "value": 3 }
            ],
            "_postman_variable_scope": "environment"
        }))
        .unwrap();

        let document = import_environment(&environment, 1_700_000_000_000);
        assert_eq!(document.document_type, ENVIRONMENT_DOCUMENT_TYPE);
        assert_eq!(document.name, "Staging");
        assert!(document.meta.id.starts_with("env_"));
        assert!(is_valid_id(&document.meta.id));
        assert_eq!(document.meta.created, 1_700_000_000_000);
        assert_eq!(document.meta.is_private, Some(false));

        let keys: Vec<_> = document.data.keys().map(String::as_str).collect();
        assert_eq!(keys, ["host", "request-id", "retries"]);
        assert_eq!(document.data["request-id"], json!("{% uuid 'v4' %}"));
        assert_eq!(document.data["retries"], json!(3));
    }

    #[test]
    fn test_empty_environment() {
        let environment: Environment = serde_json::from_value(json!({ "name": "Empty", "values": [] })).unwrap();
        let document = import_environment(&environment, 0);
        assert!(document.data.is_empty());
    }
}
