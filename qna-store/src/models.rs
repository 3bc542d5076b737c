//! Caller-facing and wire-level types for the QnA Maker store.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

/// Identifier of a question/answer pair in the remote store.
///
/// The service returns numeric ids, callers often hold them as text. Both
/// forms are normalized into this type at the boundary so comparisons never
/// depend on the representation a value arrived in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct QnaId(i64);

impl QnaId {
    /// Placeholder id sent with new pairs; the store assigns the real one.
    pub const UNASSIGNED: QnaId = QnaId(0);

    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    pub const fn get(self) -> i64 {
        self.0
    }
}

impl From<i64> for QnaId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl fmt::Display for QnaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid question id: {0:?}")]
pub struct ParseQnaIdError(String);

impl FromStr for QnaId {
    type Err = ParseQnaIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(QnaId)
            .map_err(|_| ParseQnaIdError(s.to_string()))
    }
}

impl<'de> Deserialize<'de> for QnaId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct QnaIdVisitor;

        impl Visitor<'_> for QnaIdVisitor {
            type Value = QnaId;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("an integer id or a string holding one")
            }

            fn visit_i64<E>(self, value: i64) -> Result<QnaId, E>
            where
                E: de::Error,
            {
                Ok(QnaId(value))
            }

            fn visit_u64<E>(self, value: u64) -> Result<QnaId, E>
            where
                E: de::Error,
            {
                i64::try_from(value)
                    .map(QnaId)
                    .map_err(|_| E::custom(format!("question id {value} out of range")))
            }

            fn visit_str<E>(self, value: &str) -> Result<QnaId, E>
            where
                E: de::Error,
            {
                value.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_any(QnaIdVisitor)
    }
}

/// A single `{name, value}` metadata entry as persisted by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataPair {
    pub name: String,
    pub value: String,
}

impl MetadataPair {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A question/answer pair exactly as the store returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteQnaRecord {
    pub id: QnaId,
    #[serde(default)]
    pub answer: String,
    #[serde(default)]
    pub questions: Vec<String>,
    #[serde(default)]
    pub metadata: Vec<MetadataPair>,
}

/// A question/answer pair as callers see it, with metadata decoded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QnaItem {
    #[serde(default)]
    pub questions: Vec<String>,
    #[serde(default)]
    pub answer: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_flow: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_node: Option<String>,
    /// Metadata names outside the recognized set, decoded but otherwise
    /// untouched. Never written back by the encoder.
    #[serde(flatten, default)]
    pub extra: BTreeMap<String, String>,
}

impl QnaItem {
    pub fn new<Q, S>(answer: impl Into<String>, questions: Q) -> Self
    where
        Q: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            questions: questions.into_iter().map(Into::into).collect(),
            answer: answer.into(),
            ..Self::default()
        }
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    /// Mark the item as a redirect to `flow` / `node`.
    pub fn with_redirect(mut self, flow: impl Into<String>, node: impl Into<String>) -> Self {
        self.action = Some("redirect".to_string());
        self.redirect_flow = Some(flow.into());
        self.redirect_node = Some(node.into());
        self
    }
}

/// A decoded item paired with its store identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QnaEntry {
    pub id: QnaId,
    pub data: QnaItem,
}

/// A candidate answer returned by the inference endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredAnswer {
    pub id: QnaId,
    pub confidence: f64,
    #[serde(flatten)]
    pub data: QnaItem,
}

/// Handle of the knowledge base owned by the adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeBase {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub host_name: String,
}

/// Paging window for [`crate::KnowledgeBaseAdapter::all`].
///
/// The window only applies when both bounds are set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListOptions {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl ListOptions {
    pub fn page(limit: usize, offset: usize) -> Self {
        Self {
            limit: Some(limit),
            offset: Some(offset),
        }
    }
}
