use crate::error::{Pm2InsomniaError, Result};
use crate::models::postman::{Collection, Environment};
use serde_json::Value;
use std::fs;
use std::path::Path;

/// A parsed input file
#[derive(Debug, Clone)]
pub enum SourceDocument {
    Collection(Box<Collection>),
    Environment(Environment),
}

impl SourceDocument {
    pub fn kind(&self) -> &'static str {
        match self {
            SourceDocument::Collection(_) => "collection",
            SourceDocument::Environment(_) => "environment",
        }
    }
}

/// Read an input file into memory
pub fn load_source<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();
    fs::read_to_string(path).map_err(|e| {
        Pm2InsomniaError::LoadError(format!("Failed to read file {}: {}", path.display(), e))
    })
}

/// Parse text and decide whether it is a collection or an environment.
///
/// A collection has an `info` object, an environment a `values` array.
pub fn parse_source(text: &str) -> Result<SourceDocument> {
    let value: Value = serde_json::from_str(text)?;

    let Some(object) = value.as_object() else {
        return Err(Pm2InsomniaError::UnknownDocument(
            "top-level value is not an object".into(),
        ));
    };

    if object.get("info").is_some_and(Value::is_object) {
        let collection: Collection = serde_json::from_value(value)?;
        return Ok(SourceDocument::Collection(Box::new(collection)));
    }

    if object.get("values").is_some_and(Value::is_array) {
        let environment: Environment = serde_json::from_value(value)?;
        return Ok(SourceDocument::Environment(environment));
    }

    Err(Pm2InsomniaError::UnknownDocument(
        "expected a collection (`info`) or an environment (`values`)".into(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_detect_collection() {
        let document = parse_source(
            r#"{ "info": { "name": "c", "schema": "x" }, "item": [] }"#,
        )
        .unwrap();
        assert_eq!(document.kind(), "collection");
    }

    #[test]
    fn test_detect_environment() {
        let document = parse_source(r#"{ "name": "e", "values": [] }"#).unwrap();
        assert_eq!(document.kind(), "environment");
    }

    #[test]
    fn test_unknown_document() {
        let err = parse_source(r#"{ "hello": "world" }"#).unwrap_err();
        assert!(matches!(err, Pm2InsomniaError::UnknownDocument(_)));

        let err = parse_source("[1, 2]").unwrap_err();
        assert!(matches!(err, Pm2InsomniaError::UnknownDocument(_)));
    }

    #[test]
    fn test_malformed_json() {
        let err = parse_source("{ not json").unwrap_err();
        assert!(matches!(err, Pm2InsomniaError::JsonError(_)));
        assert_eq!(err.kind(), "parse");
    }

    #[test]
    fn test_load_source() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{}}").unwrap();
        assert_eq!(load_source(file.path()).unwrap(), "{}");
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_source("/nonexistent/collection.json").unwrap_err();
        assert!(matches!(err, Pm2InsomniaError::LoadError(_)));
        assert!(err.to_string().contains("/nonexistent/collection.json"));
    }
}
