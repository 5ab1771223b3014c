//! Store models
//!
//! Rust structs mirroring the JSON payloads of the document store.
//! Timestamps travel as epoch milliseconds and field names are camelCase
//! on the wire.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A document owned by exactly one folder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    pub title: String,
    /// Free-form markdown text
    pub content: String,
    pub folder_id: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
}

/// Tree-node tag carried by folders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    #[default]
    Folder,
}

/// A folder of documents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: NodeKind,
}

/// One recorded visit of a document.
///
/// The title is a snapshot taken at visit time and may be stale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Identifier of the visited document
    pub id: String,
    pub title: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

/// Projection of a document matching a search query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: String,
    pub title: String,
    pub snippet: String,
}

/// Create folder request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFolderRequest {
    pub name: String,
}

/// Create document request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDocumentRequest {
    pub title: String,
    pub content: String,
    pub folder_id: String,
}

/// Update document request (content only; titles are fixed at creation)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateDocumentRequest {
    pub content: String,
}

/// Append history entry request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddHistoryRequest {
    pub id: String,
    pub title: String,
}
