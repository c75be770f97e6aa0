//! In-memory engine served over wiremock

#![allow(dead_code)]

use serde_json::{json, Map, Value};
use solr_template::client::{HttpSolrClientFactory, SolrClient};
use solr_template::SolrTemplate;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use wiremock::matchers::any;
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

pub const CORE: &str = "core";

/// Pending update operation, applied on commit
#[derive(Debug, Clone)]
enum Op {
    Add(Map<String, Value>),
    DeleteId(String),
    DeleteQuery(String),
}

/// Committed index plus the uncommitted update log
#[derive(Debug, Default)]
pub struct FakeCore {
    committed: BTreeMap<String, Map<String, Value>>,
    pending: Vec<Op>,
    pub selects: usize,
}

impl FakeCore {
    fn apply(index: &mut BTreeMap<String, Map<String, Value>>, op: &Op) {
        match op {
            Op::Add(doc) => {
                if let Some(id) = doc.get("id").and_then(value_string) {
                    index.insert(id, doc.clone());
                }
            }
            Op::DeleteId(id) => {
                index.remove(id);
            }
            Op::DeleteQuery(query) => index.retain(|_, doc| !matches(doc, query)),
        }
    }

    fn commit(&mut self) {
        for op in std::mem::take(&mut self.pending) {
            Self::apply(&mut self.committed, &op);
        }
    }

    /// Index as seen by real-time get
    fn latest(&self) -> BTreeMap<String, Map<String, Value>> {
        let mut index = self.committed.clone();
        for op in &self.pending {
            Self::apply(&mut index, op);
        }
        index
    }

    fn update(&mut self, body: &Value) {
        match body {
            Value::Array(docs) => self.pending.extend(
                docs.iter()
                    .filter_map(|d| d.as_object().cloned())
                    .map(Op::Add),
            ),
            Value::Object(commands) => {
                if let Some(delete) = commands.get("delete") {
                    match delete {
                        Value::Array(ids) => self
                            .pending
                            .extend(ids.iter().filter_map(value_string).map(Op::DeleteId)),
                        Value::Object(d) => {
                            if let Some(id) = d.get("id").and_then(value_string) {
                                self.pending.push(Op::DeleteId(id));
                            }
                            if let Some(query) = d.get("query").and_then(value_string) {
                                self.pending.push(Op::DeleteQuery(query));
                            }
                        }
                        _ => {}
                    }
                }
                if commands.contains_key("commit") {
                    self.commit();
                }
                if commands.contains_key("rollback") {
                    self.pending.clear();
                }
            }
            _ => {}
        }
    }

    fn select(&mut self, params: &[(String, String)]) -> Value {
        self.selects += 1;
        let q = param(params, "q").unwrap_or("*:*");
        let rows: usize = param(params, "rows").and_then(|r| r.parse().ok()).unwrap_or(10);
        let cursor_mark = param(params, "cursorMark");
        let start: usize = match cursor_mark {
            Some("*") => 0,
            Some(mark) => mark
                .strip_prefix("after:")
                .and_then(|n| n.parse().ok())
                .unwrap_or(0),
            None => param(params, "start").and_then(|s| s.parse().ok()).unwrap_or(0),
        };

        let hits: Vec<&Map<String, Value>> =
            self.committed.values().filter(|doc| matches(doc, q)).collect();
        let docs: Vec<Value> = hits
            .iter()
            .skip(start)
            .take(rows)
            .map(|doc| Value::Object((*doc).clone()))
            .collect();

        let mut body = json!({
            "responseHeader": {"status": 0, "QTime": 1},
            "response": {"numFound": hits.len(), "start": start, "docs": docs},
        });
        if let Some(mark) = cursor_mark {
            let next = if docs.is_empty() {
                mark.to_string()
            } else {
                format!("after:{}", start + docs.len())
            };
            body["nextCursorMark"] = Value::String(next);
        }
        body
    }

    fn realtime_get(&self, params: &[(String, String)]) -> Value {
        let latest = self.latest();
        // `ids` is comma separated, every `id` is taken as is
        let ids = params.iter().flat_map(|(k, v)| match k.as_str() {
            "ids" => v.split(',').collect::<Vec<_>>(),
            "id" => vec![v.as_str()],
            _ => Vec::new(),
        });
        let docs: Vec<Value> = ids
            .filter_map(|id| latest.get(id).cloned().map(Value::Object))
            .collect();
        json!({"response": {"numFound": docs.len(), "start": 0, "docs": docs}})
    }
}

/// Responder dispatching on the handler path
#[derive(Clone, Default)]
pub struct FakeSolr {
    pub core: Arc<Mutex<FakeCore>>,
}

impl FakeSolr {
    pub fn selects(&self) -> usize {
        self.core.lock().unwrap().selects
    }
}

impl Respond for FakeSolr {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let params: Vec<(String, String)> = request.url.query_pairs().into_owned().collect();
        let mut core = self.core.lock().unwrap();
        let path = request.url.path();
        let ok = json!({"responseHeader": {"status": 0, "QTime": 0}});

        if path.ends_with("/update") {
            let body: Value = serde_json::from_slice(&request.body).unwrap_or(Value::Null);
            core.update(&body);
            ResponseTemplate::new(200).set_body_json(ok)
        } else if path.ends_with("/select") {
            ResponseTemplate::new(200).set_body_json(core.select(&params))
        } else if path.ends_with("/get") {
            ResponseTemplate::new(200).set_body_json(core.realtime_get(&params))
        } else if path.ends_with("/admin/ping") {
            ResponseTemplate::new(200).set_body_json(json!({"responseHeader": {"status": 0}, "status": "OK"}))
        } else if path.ends_with("/schema/name") {
            ResponseTemplate::new(200).set_body_json(json!({"name": "example"}))
        } else {
            ResponseTemplate::new(404)
                .set_body_json(json!({"error": {"msg": format!("no handler for {}", path), "code": 404}}))
        }
    }
}

/// Start an engine and a template pointed at its core
pub async fn start() -> (MockServer, FakeSolr, SolrTemplate) {
    let server = MockServer::start().await;
    let fake = FakeSolr::default();
    Mock::given(any())
        .respond_with(fake.clone())
        .mount(&server)
        .await;
    let template = template_for(&server);
    (server, fake, template)
}

pub fn template_for(server: &MockServer) -> SolrTemplate {
    let client = SolrClient::new(&format!("{}/solr", server.uri()))
        .unwrap()
        .with_core(Some(CORE));
    SolrTemplate::builder(Arc::new(HttpSolrClientFactory::new(client))).build()
}

pub fn doc(id: &str, cat: &str) -> Map<String, Value> {
    let mut doc = Map::new();
    doc.insert("id".to_string(), json!(id));
    doc.insert("cat".to_string(), json!(cat));
    doc
}

fn param<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

fn value_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// `*:*` or a single `field:value` term
fn matches(doc: &Map<String, Value>, query: &str) -> bool {
    if query == "*:*" {
        return true;
    }
    match query.split_once(':') {
        Some((field, value)) => doc
            .get(field)
            .and_then(value_string)
            .map_or(false, |v| v == value.trim_matches('"')),
        None => false,
    }
}
