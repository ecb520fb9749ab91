//! Insomnia-side document model
//!
//! The importer produces a flat list of [`Record`]s; the envelopes at the
//! bottom of this file are what gets written to disk.

use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;

/// Parent id of the root request group
pub const WORKSPACE_ROOT_ID: &str = "__WORKSPACE_ID__";

pub const COLLECTION_DOCUMENT_TYPE: &str = "collection.insomnia.rest/5.0";
pub const ENVIRONMENT_DOCUMENT_TYPE: &str = "environment.insomnia.rest/5.0";

/// A flattened request or folder
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "_type", rename_all = "snake_case")]
pub enum Record {
    Request(RequestRecord),
    RequestGroup(RequestGroupRecord),
}

impl Record {
    pub fn meta(&self) -> &RecordMeta {
        match self {
            Record::Request(request) => &request.meta,
            Record::RequestGroup(group) => &group.meta,
        }
    }

    pub fn id(&self) -> &str {
        &self.meta().id
    }

    pub fn parent_id(&self) -> &str {
        &self.meta().parent_id
    }

    pub fn name(&self) -> &str {
        &self.meta().name
    }

    pub fn sort_key(&self) -> i64 {
        self.meta().sort_key
    }

    pub fn as_request(&self) -> Option<&RequestRecord> {
        match self {
            Record::Request(request) => Some(request),
            Record::RequestGroup(_) => None,
        }
    }

    pub fn as_group(&self) -> Option<&RequestGroupRecord> {
        match self {
            Record::RequestGroup(group) => Some(group),
            Record::Request(_) => None,
        }
    }
}

/// Fields shared by requests and request groups
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordMeta {
    #[serde(rename = "_id")]
    pub id: String,
    pub parent_id: String,
    pub name: String,
    pub description: String,
    pub authentication: Authentication,
    pub pre_request_script: String,
    pub after_response_script: String,
    #[serde(rename = "metaSortKey")]
    pub sort_key: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestRecord {
    #[serde(flatten)]
    pub meta: RecordMeta,
    pub method: String,
    pub url: String,
    pub headers: Vec<Header>,
    pub parameters: Vec<Parameter>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub path_parameters: Vec<Parameter>,
    pub body: Body,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestGroupRecord {
    #[serde(flatten)]
    pub meta: RecordMeta,
    /// Collection or folder variables
    pub environment: IndexMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Header {
    pub name: String,
    pub value: String,
    pub disabled: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
}

impl Header {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            disabled: false,
            description: String::new(),
        }
    }
}

/// Query or path parameter
pub type Parameter = Header;

/// Request body; every field is optional so an absent body is `{}`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Body {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Vec<BodyParam>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
}

impl Body {
    pub fn is_empty(&self) -> bool {
        *self == Body::default()
    }
}

/// Form field of a multipart or url-encoded body
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyParam {
    pub name: String,
    pub value: String,
    pub disabled: bool,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
}

/// Authentication attached to a record; `None` serializes as `{}`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Authentication(pub Option<AuthScheme>);

impl Authentication {
    pub fn none() -> Self {
        Self(None)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    /// Destination type tag, e.g. `bearer` or `iam`
    pub fn kind(&self) -> Option<&'static str> {
        self.0.as_ref().map(AuthScheme::kind)
    }
}

impl From<AuthScheme> for Authentication {
    fn from(scheme: AuthScheme) -> Self {
        Self(Some(scheme))
    }
}

impl Serialize for Authentication {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match &self.0 {
            Some(scheme) => scheme.serialize(serializer),
            None => serializer.serialize_map(Some(0))?.end(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AuthScheme {
    Basic(BasicAuth),
    Bearer(BearerAuth),
    Digest(DigestAuth),
    #[serde(rename = "oauth1")]
    OAuth1(OAuth1Auth),
    #[serde(rename = "oauth2")]
    OAuth2(OAuth2Auth),
    #[serde(rename = "apikey")]
    ApiKey(ApiKeyAuth),
    #[serde(rename = "iam")]
    AwsIam(AwsIamAuth),
}

impl AuthScheme {
    pub fn kind(&self) -> &'static str {
        match self {
            AuthScheme::Basic(_) => "basic",
            AuthScheme::Bearer(_) => "bearer",
            AuthScheme::Digest(_) => "digest",
            AuthScheme::OAuth1(_) => "oauth1",
            AuthScheme::OAuth2(_) => "oauth2",
            AuthScheme::ApiKey(_) => "apikey",
            AuthScheme::AwsIam(_) => "iam",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BasicAuth {
    pub disabled: bool,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BearerAuth {
    pub disabled: bool,
    pub token: String,
    pub prefix: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DigestAuth {
    pub disabled: bool,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuth1Auth {
    pub disabled: bool,
    pub consumer_key: String,
    pub consumer_secret: String,
    pub token_key: String,
    pub token_secret: String,
    pub private_key: String,
    pub signature_method: String,
    pub version: String,
    pub nonce: String,
    pub timestamp: String,
    pub callback: String,
    pub realm: String,
    pub verifier: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuth2Auth {
    pub disabled: bool,
    pub grant_type: String,
    pub access_token_url: String,
    pub authorization_url: String,
    pub client_id: String,
    pub client_secret: String,
    pub scope: String,
    pub redirect_url: String,
    pub state: String,
    pub username: String,
    pub password: String,
    #[serde(rename = "usePkce")]
    pub use_pkce: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyAuth {
    pub disabled: bool,
    pub key: String,
    pub value: String,
    /// `header`, `queryParams` or `cookie`
    pub add_to: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AwsIamAuth {
    pub disabled: bool,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub region: String,
    pub service: String,
    pub session_token: String,
}

/// Id and timestamps of an output document
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMeta {
    pub id: String,
    /// Milliseconds since the Unix epoch
    pub created: i64,
    pub modified: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_private: Option<bool>,
}

impl DocumentMeta {
    pub fn new(id: String, timestamp: i64) -> Self {
        Self {
            id,
            created: timestamp,
            modified: timestamp,
            description: None,
            is_private: None,
        }
    }
}

/// Converted collection file
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionDocument {
    #[serde(rename = "type")]
    pub document_type: String,
    pub name: String,
    pub meta: DocumentMeta,
    pub collection: Vec<Record>,
    pub cookie_jar: CookieJar,
    pub environments: EnvironmentSection,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CookieJar {
    pub name: String,
    pub meta: DocumentMeta,
    pub cookies: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnvironmentSection {
    pub name: String,
    pub meta: DocumentMeta,
    pub data: IndexMap<String, Value>,
}

/// Converted environment file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnvironmentDocument {
    #[serde(rename = "type")]
    pub document_type: String,
    pub name: String,
    pub meta: DocumentMeta,
    pub data: IndexMap<String, Value>,
}
