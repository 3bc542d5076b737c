//! Shared helpers for adapter integration tests.

use std::sync::{Arc, Mutex};

use qna_store::{KnowledgeBaseAdapter, QnaTransport, StoreError, StoreResult};
use reqwest::Method;
use serde_json::{Value, json};

pub const KB_ID: &str = "kb-1";
pub const KB_HOST: &str = "https://kb-1.azurewebsites.net";
pub const ENDPOINT_KEY: &str = "endpoint-key";

/// One request seen by the fake service.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
    /// Inference host and key, `None` for management calls.
    pub inference: Option<(String, String)>,
}

/// In-memory stand-in for the QnA Maker service.
///
/// Answers the handful of routes the adapter uses and records every call.
#[derive(Default)]
pub struct RecordingTransport {
    calls: Mutex<Vec<RecordedCall>>,
    knowledge_bases: Mutex<Vec<Value>>,
    documents: Mutex<Vec<Value>>,
    answers: Mutex<Vec<Value>>,
    create_registers_kb: bool,
    failing: Mutex<Option<(Method, String)>>,
}

#[allow(dead_code)]
impl RecordingTransport {
    /// A service whose account already holds the adapter's knowledge base.
    pub fn with_existing_kb() -> Arc<Self> {
        let transport = Self {
            create_registers_kb: true,
            ..Self::default()
        };
        *transport.knowledge_bases.lock().unwrap() = vec![
            json!({ "id": "kb-other", "name": "faq", "hostName": "https://other.azurewebsites.net" }),
            json!({ "id": KB_ID, "name": "botpress", "hostName": KB_HOST }),
        ];
        Arc::new(transport)
    }

    /// A service with an empty account. `create_registers_kb` controls
    /// whether a create call makes the knowledge base visible.
    pub fn empty(create_registers_kb: bool) -> Arc<Self> {
        Arc::new(Self {
            create_registers_kb,
            ..Self::default()
        })
    }

    pub fn set_documents(&self, documents: Vec<Value>) {
        *self.documents.lock().unwrap() = documents;
    }

    pub fn set_answers(&self, answers: Vec<Value>) {
        *self.answers.lock().unwrap() = answers;
    }

    /// Make every call to `method path` fail with a 500.
    pub fn fail_on(&self, method: Method, path: &str) {
        *self.failing.lock().unwrap() = Some((method, path.to_string()));
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn count(&self, method: Method, path: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.method == method && call.path == path)
            .count()
    }

    /// Bodies of all PATCH calls, in order.
    pub fn patches(&self) -> Vec<Value> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.method == Method::PATCH)
            .filter_map(|call| call.body.clone())
            .collect()
    }

    pub fn list_fetches(&self) -> usize {
        self.count(Method::GET, &format!("/knowledgebases/{KB_ID}/test/qna/"))
    }

    fn record(&self, call: RecordedCall) -> StoreResult<()> {
        let failing = self
            .failing
            .lock()
            .unwrap()
            .as_ref()
            .is_some_and(|(method, path)| *method == call.method && *path == call.path);
        self.calls.lock().unwrap().push(call);

        if failing {
            return Err(StoreError::Api {
                status: 500,
                message: "injected failure".to_string(),
            });
        }
        Ok(())
    }

    fn route(&self, method: &Method, path: &str, body: Option<&Value>) -> Value {
        let kb_path = format!("/knowledgebases/{KB_ID}");
        let list_path = format!("{kb_path}/test/qna/");

        match (method.as_str(), path) {
            ("GET", "/knowledgebases/") => {
                json!({ "knowledgebases": *self.knowledge_bases.lock().unwrap() })
            }
            ("POST", "/knowledgebases/create") => {
                if self.create_registers_kb {
                    let name = body
                        .and_then(|b| b.get("name"))
                        .cloned()
                        .unwrap_or(Value::Null);
                    self.knowledge_bases
                        .lock()
                        .unwrap()
                        .push(json!({ "id": KB_ID, "name": name, "hostName": KB_HOST }));
                }
                json!({ "operationState": "NotStarted", "operationId": "op-create" })
            }
            ("GET", "/endpointkeys") => json!({
                "primaryEndpointKey": ENDPOINT_KEY,
                "secondaryEndpointKey": "secondary-key",
                "installedVersion": "4.0.5"
            }),
            ("GET", p) if p == list_path => {
                json!({ "qnaDocuments": *self.documents.lock().unwrap() })
            }
            ("PATCH", p) if p == kb_path => {
                json!({ "operationState": "NotStarted", "operationId": "op-patch" })
            }
            ("POST", p) if p == kb_path => Value::Null,
            _ => panic!("unexpected request: {method} {path}"),
        }
    }
}

#[async_trait::async_trait]
impl QnaTransport for RecordingTransport {
    async fn management(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> StoreResult<Value> {
        self.record(RecordedCall {
            method: method.clone(),
            path: path.to_string(),
            body: body.cloned(),
            inference: None,
        })?;
        Ok(self.route(&method, path, body))
    }

    async fn inference(
        &self,
        host: &str,
        endpoint_key: &str,
        path: &str,
        body: &Value,
    ) -> StoreResult<Value> {
        self.record(RecordedCall {
            method: Method::POST,
            path: path.to_string(),
            body: Some(body.clone()),
            inference: Some((host.to_string(), endpoint_key.to_string())),
        })?;
        Ok(json!({ "answers": *self.answers.lock().unwrap() }))
    }
}

/// Five stored pairs with ids 10..=50, the second one a redirect.
#[allow(dead_code)]
pub fn sample_documents() -> Vec<Value> {
    vec![
        json!({ "id": 10, "answer": "Hello!", "questions": ["hi", "hello"], "source": "Editorial",
                "metadata": [{ "name": "enabled", "value": "true" }] }),
        json!({ "id": 20, "answer": "Redirecting", "questions": ["talk to sales"],
                "metadata": [
                    { "name": "enabled", "value": "true" },
                    { "name": "action", "value": "redirect" },
                    { "name": "redirectflow", "value": "mainsssooofssslow" },
                    { "name": "redirectnode", "value": "sssoooesssntry" }
                ] }),
        json!({ "id": 30, "answer": "Bye", "questions": ["bye"], "metadata": [] }),
        json!({ "id": 40, "answer": "Prices", "questions": ["how much?"],
                "metadata": [{ "name": "enabled", "value": "false" }] }),
        json!({ "id": 50, "answer": "Hours", "questions": ["when open?"],
                "metadata": [{ "name": "category", "value": "sssooohsssours" }] }),
    ]
}

/// Route adapter logs through the test writer; `RUST_LOG` overrides.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "qna_store=debug,warn".into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

/// An adapter initialized against `transport`, with the call log cleared.
#[allow(dead_code)]
pub async fn connected(transport: &Arc<RecordingTransport>) -> KnowledgeBaseAdapter {
    init_tracing();
    let adapter = KnowledgeBaseAdapter::new(transport.clone())
        .connect()
        .await
        .expect("initialize adapter");
    transport.clear_calls();
    adapter
}
