//! Converters from Postman exports to Insomnia documents
//!
//! [`convert_source`] is the single entry point used by the CLI: it runs the
//! pre-process rules over the raw text, detects the document kind and hands
//! the parsed document to the matching [`Converter`].

pub mod auth;
pub mod body;
pub mod collection;
pub mod environment;
pub mod ids;
pub mod variables;

pub use collection::import_collection;
pub use environment::import_environment;

use crate::error::Result;
use crate::loader::{SourceDocument, parse_source};
use crate::models::insomnia::{
    COLLECTION_DOCUMENT_TYPE, CollectionDocument, CookieJar, DocumentMeta, EnvironmentDocument,
    EnvironmentSection,
};
use crate::models::postman::{Collection, Environment, description_text};
use crate::transform::TransformEngine;
use ids::{IdGenerator, IdKind};
use indexmap::IndexMap;
use tracing::debug;

/// Which transform phases run during a conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Apply pre-process rules to the raw source text
    pub preprocess: bool,
    /// Apply post-process rules to generated scripts
    pub postprocess: bool,
    /// Append the experimental rules to both phases
    pub experimental: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            preprocess: true,
            postprocess: true,
            experimental: false,
        }
    }
}

/// Converts one parsed source document into an output document
pub trait Converter {
    type Input;
    type Output;

    fn convert(&self, input: &Self::Input) -> Result<Self::Output>;
}

/// Collection -> `collection.insomnia.rest/5.0`
pub struct CollectionConverter<'a> {
    engine: Option<&'a TransformEngine>,
    experimental: bool,
}

impl<'a> CollectionConverter<'a> {
    /// `engine` is used for script post-processing; `None` skips it
    pub fn new(engine: Option<&'a TransformEngine>, experimental: bool) -> Self {
        Self {
            engine,
            experimental,
        }
    }
}

impl Converter for CollectionConverter<'_> {
    type Input = Collection;
    type Output = CollectionDocument;

    fn convert(&self, collection: &Collection) -> Result<CollectionDocument> {
        let records = import_collection(collection, self.engine, self.experimental)?;
        let timestamp = now_millis();
        let mut ids = IdGenerator::new();

        let mut meta = DocumentMeta::new(ids.next_id(IdKind::Workspace), timestamp);
        meta.description = Some(description_text(collection.info.description.as_ref()));

        Ok(CollectionDocument {
            document_type: COLLECTION_DOCUMENT_TYPE.to_string(),
            name: collection.info.name.clone(),
            meta,
            collection: records,
            cookie_jar: CookieJar {
                name: "Default Jar".to_string(),
                meta: DocumentMeta::new(ids.next_id(IdKind::CookieJar), timestamp),
                cookies: Vec::new(),
            },
            environments: EnvironmentSection {
                name: "Base Environment".to_string(),
                meta: DocumentMeta::new(ids.next_id(IdKind::Environment), timestamp),
                data: IndexMap::new(),
            },
        })
    }
}

/// Environment -> `environment.insomnia.rest/5.0`
pub struct EnvironmentConverter;

impl Converter for EnvironmentConverter {
    type Input = Environment;
    type Output = EnvironmentDocument;

    fn convert(&self, environment: &Environment) -> Result<EnvironmentDocument> {
        Ok(import_environment(environment, now_millis()))
    }
}

/// Result of converting one input file
#[derive(Debug, Clone)]
pub enum ConvertedDocument {
    Collection(CollectionDocument),
    Environment(EnvironmentDocument),
}

impl ConvertedDocument {
    pub fn name(&self) -> &str {
        match self {
            ConvertedDocument::Collection(document) => &document.name,
            ConvertedDocument::Environment(document) => &document.name,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ConvertedDocument::Collection(_) => "collection",
            ConvertedDocument::Environment(_) => "environment",
        }
    }

    /// Records for a collection, values for an environment
    pub fn record_count(&self) -> usize {
        match self {
            ConvertedDocument::Collection(document) => document.collection.len(),
            ConvertedDocument::Environment(document) => document.data.len(),
        }
    }

    pub fn to_yaml(&self) -> Result<String> {
        let yaml = match self {
            ConvertedDocument::Collection(document) => serde_yaml::to_string(document)?,
            ConvertedDocument::Environment(document) => serde_yaml::to_string(document)?,
        };
        Ok(yaml)
    }

    pub fn to_json(&self) -> Result<String> {
        let json = match self {
            ConvertedDocument::Collection(document) => serde_json::to_string_pretty(document)?,
            ConvertedDocument::Environment(document) => serde_json::to_string_pretty(document)?,
        };
        Ok(json)
    }
}

/// Convert raw source text into an output document
pub fn convert_source(
    text: &str,
    options: &ConvertOptions,
    engine: &TransformEngine,
) -> Result<ConvertedDocument> {
    let preprocessed;
    let text = if options.preprocess {
        preprocessed = engine.preprocess(text, options.experimental);
        preprocessed.as_str()
    } else {
        text
    };

    let document = parse_source(text)?;
    debug!(kind = document.kind(), "Detected document");

    match document {
        SourceDocument::Collection(collection) => {
            let engine = options.postprocess.then_some(engine);
            CollectionConverter::new(engine, options.experimental)
                .convert(&collection)
                .map(ConvertedDocument::Collection)
        }
        SourceDocument::Environment(environment) => EnvironmentConverter
            .convert(&environment)
            .map(ConvertedDocument::Environment),
    }
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Pm2InsomniaError;
    use crate::models::postman::SCHEMA_V2_1;
    use serde_json::{Value, json};

    fn collection_text(exec: &str) -> String {
        json!({
            "info": { "name": "Shop", "schema": SCHEMA_V2_1 },
            "item": [{
                "name": "Checkout",
                "request": { "method": "POST", "url": "https://shop/checkout" },
                "event": [{ "listen": "test", "script": { "exec": [exec] } }]
            }]
        })
        .to_string()
    }

    fn script_of(document: &ConvertedDocument) -> String {
        match document {
            ConvertedDocument::Collection(document) => {
                document.collection[1].meta().after_response_script.clone()
            }
            ConvertedDocument::Environment(_) => panic!("expected a collection"),
        }
    }

    #[test]
    fn test_collection_envelope() {
        let engine = TransformEngine::new();
        let document =
            convert_source(&collection_text(""), &ConvertOptions::default(), &engine).unwrap();
        let ConvertedDocument::Collection(collection) = &document else {
            panic!("expected a collection");
        };

        assert_eq!(collection.document_type, COLLECTION_DOCUMENT_TYPE);
        assert!(collection.meta.id.starts_with("wrk_"));
        assert!(collection.cookie_jar.meta.id.starts_with("jar_"));
        assert!(collection.environments.meta.id.starts_with("env_"));
        assert_eq!(collection.cookie_jar.name, "Default Jar");
        assert_eq!(collection.environments.name, "Base Environment");
        assert_eq!(document.record_count(), 2);
        assert_eq!(document.name(), "Shop");
    }

    #[test]
    fn test_phase_switches() {
        let engine = TransformEngine::new();
        let text = collection_text("pm.response.to.be.ok;");

        let all = convert_source(&text, &ConvertOptions::default(), &engine).unwrap();
        assert_eq!(
            script_of(&all),
            "insomnia.expect(insomnia.response.code).to.be.within(200, 299);"
        );

        let options = ConvertOptions {
            postprocess: false,
            ..Default::default()
        };
        let renamed_only = convert_source(&text, &options, &engine).unwrap();
        assert_eq!(script_of(&renamed_only), "insomnia.response.to.be.ok;");
    }

    #[test]
    fn test_preprocess_runs_on_raw_text() {
        let engine = TransformEngine::new();
        let text = collection_text("var data = JSON.parse(responseBody);");

        let converted = convert_source(&text, &ConvertOptions::default(), &engine).unwrap();
        assert_eq!(script_of(&converted), "var data = insomnia.response.json();");

        let options = ConvertOptions {
            preprocess: false,
            ..Default::default()
        };
        let untouched = convert_source(&text, &options, &engine).unwrap();
        assert_eq!(script_of(&untouched), "var data = JSON.parse(responseBody);");
    }

    #[test]
    fn test_experimental_legacy_tests_assignment() {
        let engine = TransformEngine::new();
        // serialized JSON escapes the double quotes of `tests["x"]`
        let text = collection_text(r#"tests["x"] = data.ok;"#);
        assert!(text.contains(r#"tests[\"x\"]"#));

        let options = ConvertOptions {
            experimental: true,
            ..Default::default()
        };
        let converted = convert_source(&text, &options, &engine).unwrap();
        assert_eq!(
            script_of(&converted),
            r#"insomnia.test("x", function () { insomnia.expect(data.ok).to.be.true; });"#
        );

        let standard = convert_source(&text, &ConvertOptions::default(), &engine).unwrap();
        assert_eq!(script_of(&standard), r#"tests["x"] = data.ok;"#);
    }

    #[test]
    fn test_environment_source() {
        let engine = TransformEngine::new();
        let text = r#"{ "name": "Local", "values": [{ "key": "host", "value": "localhost" }] }"#;
        let document = convert_source(text, &ConvertOptions::default(), &engine).unwrap();
        assert_eq!(document.kind(), "environment");
        assert_eq!(document.record_count(), 1);

        let yaml: Value = serde_yaml::from_str(&document.to_yaml().unwrap()).unwrap();
        assert_eq!(yaml["type"], "environment.insomnia.rest/5.0");
        assert_eq!(yaml["data"]["host"], "localhost");
    }

    #[test]
    fn test_serialized_output() {
        let engine = TransformEngine::new();
        let document =
            convert_source(&collection_text(""), &ConvertOptions::default(), &engine).unwrap();

        let json: Value = serde_json::from_str(&document.to_json().unwrap()).unwrap();
        assert_eq!(json["type"], COLLECTION_DOCUMENT_TYPE);
        assert_eq!(json["collection"][0]["_type"], "request_group");
        assert_eq!(json["collection"][1]["_type"], "request");
        assert_eq!(json["cookieJar"]["cookies"], json!([]));

        let yaml: Value = serde_yaml::from_str(&document.to_yaml().unwrap()).unwrap();
        assert_eq!(yaml["collection"][1]["method"], "POST");
    }

    #[test]
    fn test_malformed_source() {
        let engine = TransformEngine::new();
        let err = convert_source("{ broken", &ConvertOptions::default(), &engine).unwrap_err();
        assert!(matches!(err, Pm2InsomniaError::JsonError(_)));
    }
}
