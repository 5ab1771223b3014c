//! In-memory document store
//!
//! Implements the full store contract inside the process. Besides backing
//! tests, it can delay or fail individual actions and counts how often each
//! action was called, which is how the ordering guarantees of the workspace
//! are exercised.

use super::models::*;
use super::{DocumentStore, StoreOp, StoreResult};
use crate::config::SEARCH_SNIPPET_CHARS;
use crate::error::StoreError;
use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use uuid::Uuid;

#[derive(Default)]
struct MemoryState {
    folders: Vec<Folder>,
    documents: Vec<Document>,
    history: Vec<HistoryEntry>,
    last_timestamp: Option<DateTime<Utc>>,
}

impl MemoryState {
    /// Millisecond-precision clock that never repeats a value
    fn next_timestamp(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let now = DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now);
        let next = match self.last_timestamp {
            Some(last) if now <= last => last + TimeDelta::milliseconds(1),
            _ => now,
        };
        self.last_timestamp = Some(next);
        next
    }
}

#[derive(Default)]
struct Faults {
    delays: HashMap<StoreOp, Duration>,
    failures: HashMap<StoreOp, StoreError>,
    calls: HashMap<StoreOp, usize>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn not_found(what: &str, id: &str) -> StoreError {
    StoreError::Rejected {
        status: 404,
        message: format!("{} not found: {}", what, id),
    }
}

/// Document store held entirely in memory
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
    faults: Arc<Mutex<Faults>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every subsequent call of `op` by `delay`.
    ///
    /// The delay is captured when a call starts, so changing it later does
    /// not affect calls already in flight.
    pub fn set_delay(&self, op: StoreOp, delay: Duration) {
        lock(&self.faults).delays.insert(op, delay);
    }

    pub fn clear_delay(&self, op: StoreOp) {
        lock(&self.faults).delays.remove(&op);
    }

    /// Make every subsequent call of `op` fail with `error`
    pub fn fail(&self, op: StoreOp, error: StoreError) {
        lock(&self.faults).failures.insert(op, error);
    }

    pub fn recover(&self, op: StoreOp) {
        lock(&self.faults).failures.remove(&op);
    }

    /// Number of calls of `op` received so far, failed ones included
    pub fn calls(&self, op: StoreOp) -> usize {
        lock(&self.faults).calls.get(&op).copied().unwrap_or(0)
    }

    /// Append a raw history entry with a caller-chosen timestamp
    pub fn push_history(&self, entry: HistoryEntry) {
        lock(&self.state).history.push(entry);
    }

    async fn enter(&self, op: StoreOp) -> StoreResult<()> {
        let (delay, failure) = {
            let mut faults = lock(&self.faults);
            *faults.calls.entry(op).or_insert(0) += 1;
            (faults.delays.get(&op).copied(), faults.failures.get(&op).cloned())
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        match failure {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn list_folders(&self) -> StoreResult<Vec<Folder>> {
        self.enter(StoreOp::ListFolders).await?;
        Ok(lock(&self.state).folders.clone())
    }

    async fn list_documents(&self, folder_id: &str) -> StoreResult<Vec<Document>> {
        self.enter(StoreOp::ListDocuments).await?;
        let state = lock(&self.state);

        if !state.folders.iter().any(|f| f.id == folder_id) {
            return Err(not_found("Folder", folder_id));
        }

        Ok(state
            .documents
            .iter()
            .filter(|d| d.folder_id == folder_id)
            .cloned()
            .collect())
    }

    async fn get_document(&self, id: &str) -> StoreResult<Document> {
        self.enter(StoreOp::GetDocument).await?;
        lock(&self.state)
            .documents
            .iter()
            .find(|d| d.id == id)
            .cloned()
            .ok_or_else(|| not_found("Document", id))
    }

    async fn create_folder(&self, req: CreateFolderRequest) -> StoreResult<Folder> {
        self.enter(StoreOp::CreateFolder).await?;
        let folder = Folder {
            id: Uuid::new_v4().to_string(),
            name: req.name,
            kind: NodeKind::Folder,
        };
        lock(&self.state).folders.push(folder.clone());
        Ok(folder)
    }

    async fn delete_folder(&self, id: &str) -> StoreResult<()> {
        self.enter(StoreOp::DeleteFolder).await?;
        let mut state = lock(&self.state);

        let before = state.folders.len();
        state.folders.retain(|f| f.id != id);
        if state.folders.len() == before {
            return Err(not_found("Folder", id));
        }

        state.documents.retain(|d| d.folder_id != id);
        Ok(())
    }

    async fn create_document(&self, req: CreateDocumentRequest) -> StoreResult<Document> {
        self.enter(StoreOp::CreateDocument).await?;
        let mut state = lock(&self.state);

        if !state.folders.iter().any(|f| f.id == req.folder_id) {
            return Err(not_found("Folder", &req.folder_id));
        }

        let now = state.next_timestamp();
        let document = Document {
            id: Uuid::new_v4().to_string(),
            title: req.title,
            content: req.content,
            folder_id: req.folder_id,
            created_at: now,
            updated_at: now,
        };
        state.documents.push(document.clone());
        Ok(document)
    }

    async fn update_document(
        &self,
        id: &str,
        req: UpdateDocumentRequest,
    ) -> StoreResult<Document> {
        self.enter(StoreOp::UpdateDocument).await?;
        let mut state = lock(&self.state);
        let now = state.next_timestamp();

        let document = state
            .documents
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| not_found("Document", id))?;

        document.content = req.content;
        document.updated_at = now;
        Ok(document.clone())
    }

    async fn delete_document(&self, id: &str) -> StoreResult<()> {
        self.enter(StoreOp::DeleteDocument).await?;
        let mut state = lock(&self.state);

        let before = state.documents.len();
        state.documents.retain(|d| d.id != id);
        if state.documents.len() == before {
            return Err(not_found("Document", id));
        }
        Ok(())
    }

    async fn search(&self, query: &str) -> StoreResult<Vec<SearchResult>> {
        self.enter(StoreOp::Search).await?;
        let state = lock(&self.state);
        let needle = query.to_lowercase();

        // Title hits rank ahead of content-only hits
        let (mut ranked, content_hits): (Vec<&Document>, Vec<&Document>) = state
            .documents
            .iter()
            .filter(|d| {
                d.title.to_lowercase().contains(&needle)
                    || d.content.to_lowercase().contains(&needle)
            })
            .partition(|d| d.title.to_lowercase().contains(&needle));
        ranked.extend(content_hits);

        Ok(ranked
            .into_iter()
            .map(|d| SearchResult {
                id: d.id.clone(),
                title: d.title.clone(),
                snippet: d.content.chars().take(SEARCH_SNIPPET_CHARS).collect(),
            })
            .collect())
    }

    async fn list_history(&self) -> StoreResult<Vec<HistoryEntry>> {
        self.enter(StoreOp::ListHistory).await?;
        Ok(lock(&self.state).history.clone())
    }

    async fn add_history(&self, req: AddHistoryRequest) -> StoreResult<()> {
        self.enter(StoreOp::AddHistory).await?;
        let mut state = lock(&self.state);
        let timestamp = state.next_timestamp();
        state.history.push(HistoryEntry {
            id: req.id,
            title: req.title,
            timestamp,
        });
        Ok(())
    }
}
