//! Remote store client
//!
//! This module provides everything needed to talk to the document store:
//! - Wire models
//! - The `DocumentStore` contract, one method per store action
//! - An HTTP adapter and an in-memory adapter

pub mod http;
pub mod memory;
pub mod models;

pub use http::HttpStore;
pub use memory::MemoryStore;
pub use models::*;

use crate::error::StoreError;
use async_trait::async_trait;
use std::fmt;

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Store actions, used for logging and for fault injection in tests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    ListFolders,
    ListDocuments,
    GetDocument,
    CreateFolder,
    DeleteFolder,
    CreateDocument,
    UpdateDocument,
    DeleteDocument,
    Search,
    ListHistory,
    AddHistory,
}

impl StoreOp {
    pub fn as_str(self) -> &'static str {
        match self {
            StoreOp::ListFolders => "list_folders",
            StoreOp::ListDocuments => "list_documents",
            StoreOp::GetDocument => "get_document",
            StoreOp::CreateFolder => "create_folder",
            StoreOp::DeleteFolder => "delete_folder",
            StoreOp::CreateDocument => "create_document",
            StoreOp::UpdateDocument => "update_document",
            StoreOp::DeleteDocument => "delete_document",
            StoreOp::Search => "search",
            StoreOp::ListHistory => "list_history",
            StoreOp::AddHistory => "add_history",
        }
    }
}

impl fmt::Display for StoreOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed request contract of the document store.
///
/// Implementations hold no UI state, never retry and never cache: every
/// call is one round trip whose failure is returned to the caller as-is.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// `GET /folders`
    async fn list_folders(&self) -> StoreResult<Vec<Folder>>;

    /// `GET /folders/{folder_id}`
    async fn list_documents(&self, folder_id: &str) -> StoreResult<Vec<Document>>;

    /// `GET /documents/{id}`
    async fn get_document(&self, id: &str) -> StoreResult<Document>;

    /// `POST /folders`
    async fn create_folder(&self, req: CreateFolderRequest) -> StoreResult<Folder>;

    /// `DELETE /folders/{id}`; the store cascades to the folder's documents.
    async fn delete_folder(&self, id: &str) -> StoreResult<()>;

    /// `POST /documents`
    async fn create_document(&self, req: CreateDocumentRequest) -> StoreResult<Document>;

    /// `PATCH /documents/{id}`
    async fn update_document(&self, id: &str, req: UpdateDocumentRequest)
        -> StoreResult<Document>;

    /// `DELETE /documents/{id}`
    async fn delete_document(&self, id: &str) -> StoreResult<()>;

    /// `GET /search?query=...`; result order is the store's relevance ranking.
    async fn search(&self, query: &str) -> StoreResult<Vec<SearchResult>>;

    /// `GET /history`; the raw, undeduplicated entry log.
    async fn list_history(&self) -> StoreResult<Vec<HistoryEntry>>;

    /// `POST /history`
    async fn add_history(&self, req: AddHistoryRequest) -> StoreResult<()>;
}
