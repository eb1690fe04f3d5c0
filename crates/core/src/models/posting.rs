use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A fetched job posting. Immutable once constructed; the ingestion
/// collaborator owns fetching and any pre-truncation of oversized text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobPosting {
    pub id: Uuid,
    pub raw_text: String,
    pub source_url: Option<String>,
}

impl JobPosting {
    pub fn new(raw_text: impl Into<String>, source_url: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            raw_text: raw_text.into(),
            source_url,
        }
    }
}
