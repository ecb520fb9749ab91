use super::variables::normalize;
use crate::models::insomnia::{Body, BodyParam};
use crate::models::postman::{self, FormParam, GraphQl};
use serde_json::{Value, json};

pub const MIME_MULTIPART: &str = "multipart/form-data";
pub const MIME_URLENCODED: &str = "application/x-www-form-urlencoded";
pub const MIME_JSON: &str = "application/json";
pub const MIME_XML: &str = "application/xml";
pub const MIME_TEXT: &str = "text/plain";
pub const MIME_GRAPHQL: &str = "application/graphql";
pub const MIME_OCTET_STREAM: &str = "application/octet-stream";

/// Body modes understood by the importer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyMode {
    FormData,
    UrlEncoded,
    Raw,
    GraphQl,
    File,
    Unknown,
}

impl From<&str> for BodyMode {
    fn from(mode: &str) -> Self {
        match mode {
            "formdata" => BodyMode::FormData,
            "urlencoded" => BodyMode::UrlEncoded,
            "raw" => BodyMode::Raw,
            "graphql" => BodyMode::GraphQl,
            "file" => BodyMode::File,
            _ => BodyMode::Unknown,
        }
    }
}

/// Convert a request body; anything unusable becomes an empty body
pub fn import_body(body: Option<&postman::Body>) -> Body {
    let Some(body) = body.filter(|b| !b.disabled) else {
        return Body::default();
    };

    let mode = body.mode.as_deref().map(BodyMode::from).unwrap_or(BodyMode::Unknown);

    match mode {
        BodyMode::FormData => Body {
            mime_type: Some(MIME_MULTIPART.to_string()),
            params: Some(body.formdata.iter().map(import_form_param).collect()),
            ..Default::default()
        },
        BodyMode::UrlEncoded => Body {
            mime_type: Some(MIME_URLENCODED.to_string()),
            params: Some(body.urlencoded.iter().map(import_form_param).collect()),
            ..Default::default()
        },
        BodyMode::Raw => Body {
            mime_type: Some(raw_mime_type(body).to_string()),
            text: Some(normalize(body.raw.as_deref().unwrap_or_default())),
            ..Default::default()
        },
        BodyMode::GraphQl => match &body.graphql {
            Some(graphql) => Body {
                mime_type: Some(MIME_GRAPHQL.to_string()),
                text: Some(graphql_text(graphql)),
                ..Default::default()
            },
            None => Body::default(),
        },
        BodyMode::File => match body.file.as_ref().and_then(|f| f.src.as_deref()) {
            Some(src) => Body {
                mime_type: Some(MIME_OCTET_STREAM.to_string()),
                file_name: Some(src.to_string()),
                ..Default::default()
            },
            None => Body::default(),
        },
        BodyMode::Unknown => Body::default(),
    }
}

fn raw_mime_type(body: &postman::Body) -> &'static str {
    let language = body
        .options
        .as_ref()
        .and_then(|o| o.raw.as_ref())
        .and_then(|raw| raw.language.as_deref());

    match language {
        Some("json") => MIME_JSON,
        Some("xml") => MIME_XML,
        _ => MIME_TEXT,
    }
}

fn import_form_param(param: &FormParam) -> BodyParam {
    let description = postman::description_text(param.description.as_ref());

    if param.kind.as_deref() == Some("file") {
        return BodyParam {
            name: normalize(&param.key),
            value: String::new(),
            disabled: param.disabled,
            kind: Some("file".to_string()),
            file_name: param
                .src
                .as_ref()
                .and_then(|src| src.first())
                .map(str::to_string),
            description,
        };
    }

    BodyParam {
        name: normalize(&param.key),
        value: normalize(param.value.as_deref().unwrap_or_default()),
        disabled: param.disabled,
        kind: None,
        file_name: None,
        description,
    }
}

/// GraphQL bodies are stored as a JSON `{ query, variables }` document
fn graphql_text(graphql: &GraphQl) -> String {
    let variables = match &graphql.variables {
        Some(Value::String(raw)) if !raw.trim().is_empty() => {
            serde_json::from_str(raw).unwrap_or_else(|_| json!({}))
        }
        Some(Value::Object(map)) => Value::Object(map.clone()),
        _ => json!({}),
    };

    json!({
        "query": graphql.query.as_deref().unwrap_or_default(),
        "variables": variables,
    })
    .to_string()
}
