//! Question/answer storage backed by a Microsoft QnA Maker knowledge base.

pub mod adapter;
pub mod cache;
pub mod codec;
pub mod errors;
pub mod models;
pub mod transport;

pub use adapter::{DEFAULT_CACHE_TTL, KNOWLEDGE_BASE_NAME, KnowledgeBaseAdapter};
pub use codec::{CaseMarkerCodec, MetadataCodec};
pub use errors::{StoreError, StoreResult};
pub use models::{
    KnowledgeBase, ListOptions, MetadataPair, ParseQnaIdError, QnaEntry, QnaId, QnaItem,
    RemoteQnaRecord, ScoredAnswer,
};
pub use transport::{HttpTransport, QnaTransport};
