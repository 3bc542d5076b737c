//! Knowledge base adapter over the QnA Maker REST API.
//!
//! All state lives in the remote service. The adapter resolves its
//! knowledge base once, forwards mutations as staged patches followed by a
//! publish, and keeps the last fetched question list in a short-lived cache
//! that every mutation clears.

use std::ops::Range;
use std::sync::Arc;
use std::time::Duration;

use qna_core::Config;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::cache::TimedSlot;
use crate::codec::{CaseMarkerCodec, MetadataCodec};
use crate::errors::{StoreError, StoreResult};
use crate::models::{
    KnowledgeBase, ListOptions, MetadataPair, QnaEntry, QnaId, QnaItem, RemoteQnaRecord,
    ScoredAnswer,
};
use crate::transport::{HttpTransport, QnaTransport};

/// Name of the knowledge base this adapter owns in the account.
pub const KNOWLEDGE_BASE_NAME: &str = "botpress";

/// How long a fetched question list is served before refetching.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(10);

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateKnowledgeBaseRequest<'a> {
    name: &'a str,
    qna_list: Vec<NewQna<'a>>,
    urls: Vec<String>,
    files: Vec<String>,
}

#[derive(Debug, Serialize)]
enum KnowledgeBasePatch<'a> {
    #[serde(rename = "add")]
    Add {
        #[serde(rename = "qnaList")]
        qna_list: Vec<NewQna<'a>>,
    },
    #[serde(rename = "update")]
    Update {
        #[serde(rename = "qnaList")]
        qna_list: Vec<QnaUpdate<'a>>,
    },
    #[serde(rename = "delete")]
    Delete { ids: &'a [QnaId] },
}

#[derive(Debug, Serialize)]
struct NewQna<'a> {
    id: QnaId,
    answer: &'a str,
    questions: &'a [String],
    metadata: Vec<MetadataPair>,
}

#[derive(Debug, Serialize)]
struct QnaUpdate<'a> {
    id: QnaId,
    answer: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    questions: Option<ListDiff<'a, String>>,
    metadata: ListDiff<'a, MetadataPair>,
}

#[derive(Debug, Serialize)]
struct ListDiff<'a, T> {
    add: &'a [T],
    delete: &'a [T],
}

#[derive(Debug, Serialize)]
struct GenerateAnswerRequest<'a> {
    question: &'a str,
}

#[derive(Debug, Deserialize)]
struct KnowledgeBaseList {
    #[serde(default)]
    knowledgebases: Vec<KnowledgeBase>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EndpointKeys {
    primary_endpoint_key: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QnaDocuments {
    #[serde(default)]
    qna_documents: Vec<RemoteQnaRecord>,
}

#[derive(Debug, Deserialize)]
struct GenerateAnswerResponse {
    #[serde(default)]
    answers: Vec<AnswerCandidate>,
}

#[derive(Debug, Deserialize)]
struct AnswerCandidate {
    id: QnaId,
    #[serde(default)]
    score: f64,
    #[serde(default)]
    questions: Vec<String>,
    #[serde(default)]
    answer: String,
    #[serde(default)]
    metadata: Vec<MetadataPair>,
}

/// Resolved once by [`KnowledgeBaseAdapter::initialize`].
#[derive(Debug, Clone)]
struct Connection {
    knowledge_base: KnowledgeBase,
    endpoint_key: String,
}

/// Question/answer storage backed by a QnA Maker knowledge base.
pub struct KnowledgeBaseAdapter {
    transport: Arc<dyn QnaTransport>,
    codec: Arc<dyn MetadataCodec>,
    questions: TimedSlot<Arc<Vec<RemoteQnaRecord>>>,
    connection: Option<Connection>,
}

impl KnowledgeBaseAdapter {
    /// Create an adapter that is not yet bound to a knowledge base.
    ///
    /// Call [`initialize`](Self::initialize) before anything else, or use
    /// [`connect`](Self::connect).
    pub fn new(transport: Arc<dyn QnaTransport>) -> Self {
        Self {
            transport,
            codec: Arc::new(CaseMarkerCodec),
            questions: TimedSlot::new(Some(DEFAULT_CACHE_TTL)),
            connection: None,
        }
    }

    /// Build an HTTP-backed adapter from loaded configuration.
    pub fn from_config(config: &Config) -> StoreResult<Self> {
        let settings = config.qnamaker();
        let transport = HttpTransport::from_settings(config.qnamaker_api_key(), settings)?;
        Ok(Self::new(Arc::new(transport)).with_cache_ttl(settings.cache_ttl()))
    }

    /// Set how long the question list is cached. `None` keeps it until the
    /// next mutation.
    pub fn with_cache_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.questions = TimedSlot::new(ttl);
        self
    }

    /// Replace the metadata value encoding.
    pub fn with_codec(mut self, codec: Arc<dyn MetadataCodec>) -> Self {
        self.codec = codec;
        self
    }

    /// Initialize and return the adapter.
    pub async fn connect(mut self) -> StoreResult<Self> {
        self.initialize().await?;
        Ok(self)
    }

    /// Find or create the owned knowledge base and fetch its endpoint key.
    pub async fn initialize(&mut self) -> StoreResult<()> {
        let knowledge_base = match self.find_knowledge_base().await? {
            Some(existing) => {
                info!(kb_id = %existing.id, "Using existing knowledge base");
                existing
            }
            None => {
                info!(name = KNOWLEDGE_BASE_NAME, "Creating knowledge base");
                let request = CreateKnowledgeBaseRequest {
                    name: KNOWLEDGE_BASE_NAME,
                    qna_list: Vec::new(),
                    urls: Vec::new(),
                    files: Vec::new(),
                };
                let body = serde_json::to_value(&request)?;
                self.transport
                    .management(Method::POST, "/knowledgebases/create", Some(&body))
                    .await?;

                self.find_knowledge_base().await?.ok_or_else(|| {
                    StoreError::KnowledgeBaseNotFound(KNOWLEDGE_BASE_NAME.to_string())
                })?
            }
        };

        let keys: EndpointKeys = serde_json::from_value(
            self.transport
                .management(Method::GET, "/endpointkeys", None)
                .await?,
        )?;

        self.connection = Some(Connection {
            knowledge_base,
            endpoint_key: keys.primary_endpoint_key,
        });
        Ok(())
    }

    async fn find_knowledge_base(&self) -> StoreResult<Option<KnowledgeBase>> {
        let list: KnowledgeBaseList = serde_json::from_value(
            self.transport
                .management(Method::GET, "/knowledgebases/", None)
                .await?,
        )?;

        Ok(list
            .knowledgebases
            .into_iter()
            .find(|kb| kb.name == KNOWLEDGE_BASE_NAME))
    }

    fn connection(&self) -> StoreResult<&Connection> {
        self.connection.as_ref().ok_or(StoreError::NotInitialized)
    }

    /// The resolved knowledge base, once initialized.
    pub fn knowledge_base(&self) -> Option<&KnowledgeBase> {
        self.connection.as_ref().map(|c| &c.knowledge_base)
    }

    /// The inference endpoint key, once initialized.
    pub fn endpoint_key(&self) -> Option<&str> {
        self.connection.as_ref().map(|c| c.endpoint_key.as_str())
    }

    fn knowledge_base_path(&self) -> StoreResult<String> {
        Ok(format!(
            "/knowledgebases/{}",
            self.connection()?.knowledge_base.id
        ))
    }

    /// Promote staged edits to the index served by the inference endpoint.
    pub async fn publish(&self) -> StoreResult<()> {
        let path = self.knowledge_base_path()?;
        info!(%path, "Publishing knowledge base");
        self.transport.management(Method::POST, &path, None).await?;
        Ok(())
    }

    async fn patch(&self, patch: &KnowledgeBasePatch<'_>) -> StoreResult<()> {
        let path = self.knowledge_base_path()?;
        let body = serde_json::to_value(patch)?;
        self.transport
            .management(Method::PATCH, &path, Some(&body))
            .await?;
        Ok(())
    }

    /// Add items to the knowledge base and publish.
    ///
    /// The store assigns ids asynchronously; they are not returned.
    pub async fn insert(&self, items: &[QnaItem]) -> StoreResult<()> {
        let qna_list = items
            .iter()
            .map(|item| NewQna {
                id: QnaId::UNASSIGNED,
                answer: &item.answer,
                questions: &item.questions,
                metadata: self.codec.prepare_meta(item),
            })
            .collect();

        info!(count = items.len(), "Adding questions");
        self.patch(&KnowledgeBasePatch::Add { qna_list }).await?;
        self.invalidate_cache().await;
        self.publish().await
    }

    /// Convenience wrapper around [`insert`](Self::insert) for one item.
    pub async fn insert_one(&self, item: &QnaItem) -> StoreResult<()> {
        self.insert(std::slice::from_ref(item)).await
    }

    /// Replace the item stored under `id` and publish.
    ///
    /// Question phrasings are only diffed when they changed; metadata is
    /// always replaced wholesale.
    pub async fn update(&self, item: &QnaItem, id: QnaId) -> StoreResult<QnaId> {
        let previous = self
            .get_question(id)
            .await?
            .ok_or(StoreError::UnknownQuestion(id))?;

        let questions = (item.questions != previous.questions).then(|| ListDiff {
            add: item.questions.as_slice(),
            delete: previous.questions.as_slice(),
        });
        let metadata = self.codec.prepare_meta(item);

        let update = QnaUpdate {
            id,
            answer: &item.answer,
            questions,
            metadata: ListDiff {
                add: &metadata,
                delete: &previous.metadata,
            },
        };

        info!(%id, questions_changed = update.questions.is_some(), "Updating question");
        self.patch(&KnowledgeBasePatch::Update {
            qna_list: vec![update],
        })
        .await?;
        self.invalidate_cache().await;
        self.publish().await?;
        Ok(id)
    }

    /// Remove items by id and publish.
    pub async fn delete(&self, ids: &[QnaId]) -> StoreResult<()> {
        info!(count = ids.len(), "Deleting questions");
        self.patch(&KnowledgeBasePatch::Delete { ids }).await?;
        self.invalidate_cache().await;
        self.publish().await
    }

    /// Convenience wrapper around [`delete`](Self::delete) for one id.
    pub async fn delete_one(&self, id: QnaId) -> StoreResult<()> {
        self.delete(&[id]).await
    }

    /// Drop the cached question list so the next read refetches it.
    pub async fn invalidate_cache(&self) {
        debug!("Invalidating question cache");
        self.questions.clear().await;
    }

    async fn fetch_questions(&self) -> StoreResult<Arc<Vec<RemoteQnaRecord>>> {
        if let Some(questions) = self.questions.get().await {
            debug!(count = questions.len(), "Question cache hit");
            return Ok(questions);
        }

        let path = format!("{}/test/qna/", self.knowledge_base_path()?);
        let documents: QnaDocuments = serde_json::from_value(
            self.transport.management(Method::GET, &path, None).await?,
        )?;

        let questions = Arc::new(documents.qna_documents);
        debug!(count = questions.len(), "Fetched question list");
        self.questions.set(Arc::clone(&questions)).await;
        Ok(questions)
    }

    /// The stored record for `id`, if any.
    pub async fn get_question(&self, id: QnaId) -> StoreResult<Option<RemoteQnaRecord>> {
        let questions = self.fetch_questions().await?;
        Ok(questions.iter().find(|record| record.id == id).cloned())
    }

    pub async fn count(&self) -> StoreResult<usize> {
        Ok(self.fetch_questions().await?.len())
    }

    /// Decoded items, optionally restricted to a page window.
    pub async fn all(&self, options: ListOptions) -> StoreResult<Vec<QnaEntry>> {
        let questions = self.fetch_questions().await?;
        let window = page_window(questions.len(), options);

        Ok(questions[window]
            .iter()
            .map(|record| QnaEntry {
                id: record.id,
                data: self.codec.item_data(
                    record.questions.clone(),
                    record.answer.clone(),
                    &record.metadata,
                ),
            })
            .collect())
    }

    /// Ask the published knowledge base, best answer first.
    pub async fn answers_on(&self, question: &str) -> StoreResult<Vec<ScoredAnswer>> {
        let connection = self.connection()?;
        let kb = &connection.knowledge_base;
        let path = format!("/qnamaker/knowledgebases/{}/generateAnswer", kb.id);
        let body = serde_json::to_value(GenerateAnswerRequest { question })?;

        let response: GenerateAnswerResponse = serde_json::from_value(
            self.transport
                .inference(&kb.host_name, &connection.endpoint_key, &path, &body)
                .await?,
        )?;

        let answers = rank_answers(response.answers)
            .into_iter()
            .map(|candidate| ScoredAnswer {
                id: candidate.id,
                confidence: candidate.score,
                data: self.codec.item_data(
                    candidate.questions,
                    candidate.answer,
                    &candidate.metadata,
                ),
            })
            .collect::<Vec<_>>();

        debug!(count = answers.len(), "Received answers");
        Ok(answers)
    }
}

/// Index range selected by `options` within a list of `len` items.
fn page_window(len: usize, options: ListOptions) -> Range<usize> {
    match (options.limit, options.offset) {
        (Some(limit), Some(offset)) => {
            let start = offset.min(len);
            let end = offset.saturating_add(limit).min(len);
            start..end
        }
        _ => 0..len,
    }
}

/// Highest score first; ties keep the service's order.
fn rank_answers(mut answers: Vec<AnswerCandidate>) -> Vec<AnswerCandidate> {
    answers.sort_by(|a, b| b.score.total_cmp(&a.score));
    answers
}
