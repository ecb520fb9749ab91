//! Collection importer
//!
//! Walks the item tree depth-first, pre-order, and emits one flat record per
//! folder and request. The root collection becomes a request group parented
//! to [`WORKSPACE_ROOT_ID`]. Every record gets a sort key lower than the one
//! before it, so source order survives the flattening.

use super::auth::resolve;
use super::body::import_body;
use super::ids::{IdGenerator, IdKind};
use super::variables::normalize;
use crate::error::{Pm2InsomniaError, Result};
use crate::models::insomnia::{
    Header, Parameter, Record, RecordMeta, RequestGroupRecord, RequestRecord,
    WORKSPACE_ROOT_ID,
};
use crate::models::postman::{
    self, Collection, Event, Item, QueryParam, Request, SchemaVersion, Url, UrlObject, Variable,
    description_text,
};
use crate::transform::{PrefixRewriter, TransformEngine};
use indexmap::IndexMap;
use serde_json::Value;
use tracing::debug;

const LISTEN_PRE_REQUEST: &str = "prerequest";
const LISTEN_TEST: &str = "test";

/// Import a collection into a flat record list
pub fn import_collection(
    collection: &Collection,
    engine: Option<&TransformEngine>,
    experimental: bool,
) -> Result<Vec<Record>> {
    let schema = SchemaVersion::from_url(&collection.info.schema)
        .ok_or_else(|| Pm2InsomniaError::UnrecognizedSchema(collection.info.schema.clone()))?;

    debug!(
        name = %collection.info.name,
        schema = %schema,
        items = collection.item.len(),
        "Importing collection"
    );

    let mut context = ImportContext::new(engine, experimental);
    context.import_root(collection);
    Ok(context.records)
}

/// Per-import state threaded through the tree walk
struct ImportContext<'a> {
    ids: IdGenerator,
    sort_sequence: i64,
    records: Vec<Record>,
    engine: Option<&'a TransformEngine>,
    experimental: bool,
    rewriter: PrefixRewriter,
}

impl<'a> ImportContext<'a> {
    fn new(engine: Option<&'a TransformEngine>, experimental: bool) -> Self {
        Self {
            ids: IdGenerator::new(),
            sort_sequence: 0,
            records: Vec::new(),
            engine,
            experimental,
            rewriter: PrefixRewriter::default(),
        }
    }

    fn next_sort_key(&mut self) -> i64 {
        self.sort_sequence += 1;
        -self.sort_sequence
    }

    fn import_root(&mut self, collection: &Collection) {
        let root_id = self.ids.next_id(IdKind::Folder);
        let meta = RecordMeta {
            id: root_id.clone(),
            parent_id: WORKSPACE_ROOT_ID.to_string(),
            name: collection.info.name.clone(),
            description: description_text(collection.info.description.as_ref()),
            authentication: resolve(collection.auth.as_ref(), Vec::new()).authentication,
            pre_request_script: self.script(&collection.event, LISTEN_PRE_REQUEST),
            after_response_script: self.script(&collection.event, LISTEN_TEST),
            sort_key: self.next_sort_key(),
        };

        self.records.push(Record::RequestGroup(RequestGroupRecord {
            meta,
            environment: import_variables(&collection.variable),
        }));

        for item in &collection.item {
            self.import_item(item, &root_id);
        }
    }

    fn import_item(&mut self, item: &Item, parent_id: &str) {
        match &item.request {
            Some(spec) => {
                let request = spec.as_request();
                self.import_request(item, &request, parent_id);
            }
            None => self.import_folder(item, parent_id),
        }
    }

    fn import_folder(&mut self, item: &Item, parent_id: &str) {
        let id = self.ids.next_id(IdKind::Folder);
        debug!(id = %id, name = %item.name, "Folder");

        let meta = RecordMeta {
            id: id.clone(),
            parent_id: parent_id.to_string(),
            name: item.name.clone(),
            description: description_text(item.description.as_ref()),
            // folders carry no headers, so only explicit auth applies
            authentication: resolve(item.auth.as_ref(), Vec::new()).authentication,
            pre_request_script: self.script(&item.event, LISTEN_PRE_REQUEST),
            after_response_script: self.script(&item.event, LISTEN_TEST),
            sort_key: self.next_sort_key(),
        };

        self.records.push(Record::RequestGroup(RequestGroupRecord {
            meta,
            environment: import_variables(&item.variable),
        }));

        for child in &item.item {
            self.import_item(child, &id);
        }
    }

    fn import_request(&mut self, item: &Item, request: &Request, parent_id: &str) {
        let id = self.ids.next_id(IdKind::Request);
        let method = request
            .method
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_uppercase)
            .unwrap_or_else(|| "GET".to_string());
        debug!(id = %id, name = %item.name, method = %method, "Request");

        let headers = request
            .header
            .as_ref()
            .map(|h| h.to_list())
            .unwrap_or_default()
            .iter()
            .map(import_header)
            .collect();
        let resolved = resolve(request.auth.as_ref(), headers);

        let description = match &item.description {
            Some(description) => description.text().to_string(),
            None => description_text(request.description.as_ref()),
        };

        let meta = RecordMeta {
            id,
            parent_id: parent_id.to_string(),
            name: item.name.clone(),
            description,
            authentication: resolved.authentication,
            pre_request_script: self.script(&item.event, LISTEN_PRE_REQUEST),
            after_response_script: self.script(&item.event, LISTEN_TEST),
            sort_key: self.next_sort_key(),
        };

        self.records.push(Record::Request(RequestRecord {
            meta,
            method,
            url: import_url(request.url.as_ref()),
            headers: resolved.headers,
            parameters: query_parameters(request.url.as_ref()),
            path_parameters: path_parameters(request.url.as_ref()),
            body: import_body(request.body.as_ref()),
        }));
    }

    /// Concatenate the scripts of every enabled event with this listener tag
    fn script(&self, events: &[Event], listen: &str) -> String {
        let source = events
            .iter()
            .filter(|event| event.listen == listen && !event.disabled)
            .filter_map(|event| event.script.as_ref()?.exec.as_ref())
            .map(postman::Exec::source)
            .collect::<Vec<_>>()
            .join("\n");

        if source.is_empty() {
            return source;
        }

        let renamed = self.rewriter.rewrite(&source);
        match self.engine {
            Some(engine) => engine.postprocess(&renamed, self.experimental),
            None => renamed,
        }
    }
}

fn import_header(header: &postman::Header) -> Header {
    Header {
        name: normalize(&header.key),
        value: normalize(&header.value),
        disabled: header.disabled,
        description: description_text(header.description.as_ref()),
    }
}

/// Prefer `raw`; drop its query string when the query is also listed
/// separately, so parameters are not sent twice
pub fn import_url(url: Option<&Url>) -> String {
    let url = match url {
        None => return String::new(),
        Some(Url::Raw(raw)) => return normalize(raw),
        Some(Url::Structured(url)) => url,
    };

    let full = match url.raw.as_deref().filter(|raw| !raw.is_empty()) {
        Some(raw) if !url.query.is_empty() => raw.split_once('?').map_or(raw, |(base, _)| base),
        Some(raw) => raw,
        None => return normalize(&rebuild_url(url)),
    };

    normalize(full)
}

fn rebuild_url(url: &UrlObject) -> String {
    let mut out = String::new();

    if let Some(protocol) = url.protocol.as_deref().filter(|p| !p.is_empty()) {
        out.push_str(protocol.trim_end_matches("://"));
        out.push_str("://");
    }
    if let Some(host) = &url.host {
        out.push_str(&host.join("."));
    }
    match &url.port {
        Some(Value::String(port)) if !port.is_empty() => {
            out.push(':');
            out.push_str(port);
        }
        Some(Value::Number(port)) => {
            out.push(':');
            out.push_str(&port.to_string());
        }
        _ => {}
    }
    if let Some(path) = &url.path {
        let path = path.join("/");
        if !path.is_empty() {
            if !path.starts_with('/') {
                out.push('/');
            }
            out.push_str(&path);
        }
    }

    out
}

fn query_parameters(url: Option<&Url>) -> Vec<Parameter> {
    match url {
        Some(Url::Structured(url)) => url.query.iter().filter_map(import_query_param).collect(),
        _ => Vec::new(),
    }
}

fn import_query_param(param: &QueryParam) -> Option<Parameter> {
    let name = param.key.as_deref()?;
    Some(Parameter {
        name: normalize(name),
        value: normalize(param.value.as_deref().unwrap_or_default()),
        disabled: param.disabled,
        description: description_text(param.description.as_ref()),
    })
}

fn path_parameters(url: Option<&Url>) -> Vec<Parameter> {
    let Some(Url::Structured(url)) = url else {
        return Vec::new();
    };

    url.variable
        .iter()
        .filter_map(|variable| {
            let name = variable.key.as_deref()?;
            Some(Parameter {
                name: name.to_string(),
                value: normalize(&value_text(variable.value.as_ref())),
                disabled: false,
                description: description_text(variable.description.as_ref()),
            })
        })
        .collect()
}

fn import_variables(variables: &[Variable]) -> IndexMap<String, Value> {
    variables
        .iter()
        .filter(|variable| !variable.disabled)
        .filter_map(|variable| {
            let key = variable.key.as_deref()?;
            let value = match &variable.value {
                Some(Value::String(s)) => Value::String(normalize(s)),
                Some(other) => other.clone(),
                None => Value::String(String::new()),
            };
            Some((key.to_string(), value))
        })
        .collect()
}

fn value_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
