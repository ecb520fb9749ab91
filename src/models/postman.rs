use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::borrow::Cow;
use std::collections::HashMap;

pub const SCHEMA_V2_0: &str = "https://schema.getpostman.com/json/collection/v2.0.0/collection.json";
pub const SCHEMA_V2_1: &str = "https://schema.getpostman.com/json/collection/v2.1.0/collection.json";

/// Supported collection schema versions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaVersion {
    V2_0,
    V2_1,
}

impl SchemaVersion {
    pub fn from_url(url: &str) -> Option<Self> {
        match url {
            SCHEMA_V2_0 => Some(SchemaVersion::V2_0),
            SCHEMA_V2_1 => Some(SchemaVersion::V2_1),
            _ => None,
        }
    }
}

impl std::fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemaVersion::V2_0 => write!(f, "v2.0.0"),
            SchemaVersion::V2_1 => write!(f, "v2.1.0"),
        }
    }
}

/// Treat an explicit `null` like a missing field
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Postman collection root object
#[derive(Debug, Clone, Deserialize)]
pub struct Collection {
    pub info: Info,

    #[serde(default, deserialize_with = "nullable")]
    pub item: Vec<Item>,

    #[serde(default)]
    pub auth: Option<Auth>,

    #[serde(default, deserialize_with = "nullable")]
    pub event: Vec<Event>,

    #[serde(default, deserialize_with = "nullable")]
    pub variable: Vec<Variable>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Info {
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,

    #[serde(default)]
    pub description: Option<Description>,

    /// Schema URL identifying the collection format
    #[serde(default, deserialize_with = "nullable")]
    pub schema: String,

    #[serde(default, rename = "_postman_id")]
    pub postman_id: Option<String>,
}

/// Descriptions are either plain text or `{ content, type }`
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Description {
    Text(String),
    Object {
        #[serde(default)]
        content: Option<String>,
    },
}

impl Description {
    pub fn text(&self) -> &str {
        match self {
            Description::Text(text) => text,
            Description::Object { content } => content.as_deref().unwrap_or_default(),
        }
    }
}

pub fn description_text(description: Option<&Description>) -> String {
    description.map(|d| d.text().to_string()).unwrap_or_default()
}

/// A request item (has `request`) or a folder (anything else)
#[derive(Debug, Clone, Deserialize)]
pub struct Item {
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,

    #[serde(default)]
    pub description: Option<Description>,

    #[serde(default)]
    pub request: Option<RequestSpec>,

    #[serde(default, deserialize_with = "nullable")]
    pub item: Vec<Item>,

    #[serde(default)]
    pub auth: Option<Auth>,

    #[serde(default, deserialize_with = "nullable")]
    pub event: Vec<Event>,

    #[serde(default, deserialize_with = "nullable")]
    pub variable: Vec<Variable>,
}

/// `request` may be a bare URL string
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RequestSpec {
    Url(String),
    Full(Box<Request>),
}

impl RequestSpec {
    pub fn as_request(&self) -> Cow<'_, Request> {
        match self {
            RequestSpec::Url(url) => Cow::Owned(Request {
                url: Some(Url::Raw(url.clone())),
                ..Default::default()
            }),
            RequestSpec::Full(request) => Cow::Borrowed(&**request),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Request {
    #[serde(default)]
    pub method: Option<String>,

    #[serde(default)]
    pub url: Option<Url>,

    #[serde(default)]
    pub header: Option<Headers>,

    #[serde(default)]
    pub body: Option<Body>,

    #[serde(default)]
    pub auth: Option<Auth>,

    #[serde(default)]
    pub description: Option<Description>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Url {
    Raw(String),
    Structured(UrlObject),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UrlObject {
    #[serde(default)]
    pub raw: Option<String>,

    #[serde(default)]
    pub protocol: Option<String>,

    #[serde(default)]
    pub host: Option<Segments>,

    #[serde(default)]
    pub port: Option<Value>,

    #[serde(default)]
    pub path: Option<Segments>,

    #[serde(default, deserialize_with = "nullable")]
    pub query: Vec<QueryParam>,

    #[serde(default, deserialize_with = "nullable")]
    pub variable: Vec<PathVariable>,
}

/// Host and path: a joined string or a list of segments
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Segments {
    Joined(String),
    Parts(Vec<Segment>),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Segment {
    Text(String),
    Object {
        #[serde(default)]
        value: Option<String>,
    },
}

impl Segments {
    pub fn join(&self, separator: &str) -> String {
        match self {
            Segments::Joined(joined) => joined.clone(),
            Segments::Parts(parts) => parts
                .iter()
                .map(|part| match part {
                    Segment::Text(text) => text.as_str(),
                    Segment::Object { value } => value.as_deref().unwrap_or_default(),
                })
                .collect::<Vec<_>>()
                .join(separator),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct QueryParam {
    #[serde(default)]
    pub key: Option<String>,

    #[serde(default)]
    pub value: Option<String>,

    #[serde(default, deserialize_with = "nullable")]
    pub disabled: bool,

    #[serde(default)]
    pub description: Option<Description>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PathVariable {
    #[serde(default)]
    pub key: Option<String>,

    #[serde(default)]
    pub value: Option<Value>,

    #[serde(default)]
    pub description: Option<Description>,
}

/// Header list, or the v2.0 raw `Name: value` block
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Headers {
    List(Vec<Header>),
    Raw(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Header {
    #[serde(default, deserialize_with = "nullable")]
    pub key: String,

    #[serde(default, deserialize_with = "nullable")]
    pub value: String,

    #[serde(default, deserialize_with = "nullable")]
    pub disabled: bool,

    #[serde(default)]
    pub description: Option<Description>,
}

impl Headers {
    pub fn to_list(&self) -> Vec<Header> {
        match self {
            Headers::List(list) => list.clone(),
            Headers::Raw(raw) => raw
                .lines()
                .filter_map(|line| line.split_once(':'))
                .map(|(key, value)| Header {
                    key: key.trim().to_string(),
                    value: value.trim().to_string(),
                    disabled: false,
                    description: None,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Body {
    #[serde(default)]
    pub mode: Option<String>,

    #[serde(default)]
    pub raw: Option<String>,

    #[serde(default, deserialize_with = "nullable")]
    pub urlencoded: Vec<FormParam>,

    #[serde(default, deserialize_with = "nullable")]
    pub formdata: Vec<FormParam>,

    #[serde(default)]
    pub file: Option<FileSource>,

    #[serde(default)]
    pub graphql: Option<GraphQl>,

    #[serde(default)]
    pub options: Option<BodyOptions>,

    #[serde(default, deserialize_with = "nullable")]
    pub disabled: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FormParam {
    #[serde(default, deserialize_with = "nullable")]
    pub key: String,

    #[serde(default)]
    pub value: Option<String>,

    /// `text` or `file`
    #[serde(default, rename = "type")]
    pub kind: Option<String>,

    #[serde(default)]
    pub src: Option<FileSrc>,

    #[serde(default, deserialize_with = "nullable")]
    pub disabled: bool,

    #[serde(default)]
    pub description: Option<Description>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FileSrc {
    One(String),
    Many(Vec<String>),
}

impl FileSrc {
    pub fn first(&self) -> Option<&str> {
        match self {
            FileSrc::One(src) => Some(src),
            FileSrc::Many(srcs) => srcs.first().map(String::as_str),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FileSource {
    #[serde(default)]
    pub src: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphQl {
    #[serde(default)]
    pub query: Option<String>,

    /// Usually a JSON document encoded as a string
    #[serde(default)]
    pub variables: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BodyOptions {
    #[serde(default)]
    pub raw: Option<RawOptions>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawOptions {
    #[serde(default)]
    pub language: Option<String>,
}

/// Lifecycle hook (`prerequest` or `test`)
#[derive(Debug, Clone, Deserialize)]
pub struct Event {
    #[serde(default, deserialize_with = "nullable")]
    pub listen: String,

    #[serde(default)]
    pub script: Option<Script>,

    #[serde(default, deserialize_with = "nullable")]
    pub disabled: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub exec: Option<Exec>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Exec {
    Source(String),
    Lines(Vec<String>),
}

impl Exec {
    pub fn source(&self) -> String {
        match self {
            Exec::Source(source) => source.clone(),
            Exec::Lines(lines) => lines.join("\n"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Variable {
    #[serde(default)]
    pub key: Option<String>,

    #[serde(default)]
    pub value: Option<Value>,

    #[serde(default, deserialize_with = "nullable")]
    pub disabled: bool,
}

/// Authentication declaration.
///
/// Parameters live under a key named after the type. Collections in the
/// v2.1 schema store them as `[{ "key": .., "value": .. }]`, v2.0 as a plain
/// object; [`Auth::param`] reads either.
#[derive(Debug, Clone, Deserialize)]
pub struct Auth {
    #[serde(rename = "type", default, deserialize_with = "nullable")]
    pub kind: String,

    #[serde(flatten)]
    pub attributes: HashMap<String, Value>,
}

impl Auth {
    pub fn param(&self, name: &str) -> Option<String> {
        let value = match self.attributes.get(&self.kind)? {
            Value::Array(entries) => entries
                .iter()
                .find(|entry| entry.get("key").and_then(Value::as_str) == Some(name))
                .and_then(|entry| entry.get("value")),
            Value::Object(map) => map.get(name),
            _ => None,
        }?;

        match value {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Parameter value or an empty string
    pub fn param_or_default(&self, name: &str) -> String {
        self.param(name).unwrap_or_default()
    }
}

/// Postman environment export
#[derive(Debug, Clone, Deserialize)]
pub struct Environment {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default, deserialize_with = "nullable")]
    pub name: String,

    #[serde(default, deserialize_with = "nullable")]
    pub values: Vec<EnvironmentValue>,

    #[serde(default, rename = "_postman_variable_scope")]
    pub scope: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EnvironmentValue {
    #[serde(default, deserialize_with = "nullable")]
    pub key: String,

    #[serde(default)]
    pub value: Option<Value>,

    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_schema_version_from_url() {
        assert_eq!(SchemaVersion::from_url(SCHEMA_V2_0), Some(SchemaVersion::V2_0));
        assert_eq!(SchemaVersion::from_url(SCHEMA_V2_1), Some(SchemaVersion::V2_1));
        assert_eq!(
            SchemaVersion::from_url("https://schema.getpostman.com/json/collection/v1.0.0/"),
            None
        );
    }

    #[test]
    fn test_auth_param_v21_array() {
        let auth: Auth = serde_json::from_value(json!({
            "type": "basic",
            "basic": [
                { "key": "password", "value": "secret", "type": "string" },
                { "key": "username", "value": "alice", "type": "string" }
            ]
        }))
        .unwrap();
        assert_eq!(auth.param("username").as_deref(), Some("alice"));
        assert_eq!(auth.param("password").as_deref(), Some("secret"));
        assert_eq!(auth.param("missing"), None);
    }

    #[test]
    fn test_auth_param_v20_object() {
        let auth: Auth = serde_json::from_value(json!({
            "type": "bearer",
            "bearer": { "token": "abc" }
        }))
        .unwrap();
        assert_eq!(auth.param("token").as_deref(), Some("abc"));
    }

    #[test]
    fn test_request_as_url_string() {
        let item: Item = serde_json::from_value(json!({
            "name": "ping",
            "request": "https://example.com/ping"
        }))
        .unwrap();
        let spec = item.request.unwrap();
        let request = spec.as_request();
        assert!(request.method.is_none());
        assert!(matches!(request.url, Some(Url::Raw(ref u)) if u == "https://example.com/ping"));
    }

    #[test]
    fn test_null_fields_default() {
        let item: Item = serde_json::from_value(json!({
            "name": null,
            "item": null,
            "event": null
        }))
        .unwrap();
        assert_eq!(item.name, "");
        assert!(item.item.is_empty());
        assert!(item.request.is_none());
    }

    #[test]
    fn test_raw_header_block() {
        let headers = Headers::Raw("Accept: application/json\nX-Trace: a:b\n".to_string());
        let list = headers.to_list();
        assert_eq!(list.len(), 2);
        assert_eq!(list[1].key, "X-Trace");
        assert_eq!(list[1].value, "a:b");
    }

    #[test]
    fn test_segments_join() {
        let path: Segments = serde_json::from_value(json!(["users", { "value": "42" }])).unwrap();
        assert_eq!(path.join("/"), "users/42");
    }
}
