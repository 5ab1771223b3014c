//! History service
//!
//! Records document visits in the store and derives the recently-viewed
//! list from the raw entry log.

use crate::config::HISTORY_VIEW_LIMIT;
use crate::error::Result;
use crate::store::{AddHistoryRequest, DocumentStore, HistoryEntry};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Derive the recency view from raw history entries.
///
/// Keeps only the newest entry per document, orders newest first (ties
/// broken by document id) and caps the list at [`HISTORY_VIEW_LIMIT`].
/// Among same-document entries with equal timestamps the earliest in the
/// input wins.
pub fn compute_view(raw: &[HistoryEntry]) -> Vec<HistoryEntry> {
    let mut latest: HashMap<&str, &HistoryEntry> = HashMap::with_capacity(raw.len());

    for entry in raw {
        latest
            .entry(entry.id.as_str())
            .and_modify(|kept| {
                if entry.timestamp > kept.timestamp {
                    *kept = entry;
                }
            })
            .or_insert(entry);
    }

    let mut view: Vec<HistoryEntry> = latest.into_values().cloned().collect();
    view.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then_with(|| a.id.cmp(&b.id)));
    view.truncate(HISTORY_VIEW_LIMIT);
    view
}

/// Service tracking recently viewed documents
#[derive(Clone)]
pub struct HistoryTracker {
    store: Arc<dyn DocumentStore>,
    entries: Arc<RwLock<Vec<HistoryEntry>>>,
}

impl HistoryTracker {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            entries: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Append a visit to the store. The cached view is refreshed on the
    /// next [`reload`](Self::reload).
    pub async fn record_visit(&self, document_id: &str, title: &str) -> Result<()> {
        tracing::debug!("Recording visit of document {}", document_id);

        self.store
            .add_history(AddHistoryRequest {
                id: document_id.to_string(),
                title: title.to_string(),
            })
            .await?;

        Ok(())
    }

    /// Fetch the raw log from the store and return the derived view.
    ///
    /// On failure the previously loaded entries are kept.
    pub async fn reload(&self) -> Result<Vec<HistoryEntry>> {
        let raw = self.store.list_history().await.map_err(|e| {
            tracing::warn!("Failed to load history: {}", e);
            e
        })?;

        tracing::debug!("Loaded {} history entries", raw.len());

        let view = compute_view(&raw);
        *self.entries.write().await = raw;
        Ok(view)
    }

    /// View over the most recently loaded entries, without I/O
    pub async fn view(&self) -> Vec<HistoryEntry> {
        compute_view(&self.entries.read().await)
    }
}
