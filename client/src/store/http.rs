//! HTTP adapter for the document store
//!
//! Maps each store action onto the fixed method/path/body contract and
//! classifies every failure as network, rejection or malformed payload.

use super::models::*;
use super::{DocumentStore, StoreOp, StoreResult};
use crate::config::MAX_ERROR_BODY_CHARS;
use crate::error::{AppError, Result, StoreError};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::de::{DeserializeOwned, IgnoredAny};
use std::time::Duration;

/// Document store reached over HTTP with JSON bodies
#[derive(Clone)]
pub struct HttpStore {
    client: Client,
    base_url: Url,
}

impl HttpStore {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| AppError::Validation(format!("Invalid store URL '{}': {}", base_url, e)))?;

        if base_url.cannot_be_a_base() {
            return Err(AppError::Validation(format!(
                "Store URL cannot carry paths: {}",
                base_url
            )));
        }

        let client = Client::builder()
            .user_agent(concat!("docspace/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Generic(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!("Document store client targeting {}", base_url);

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Append path segments to the base URL, percent-encoding each one
    fn endpoint(&self, segments: &[&str]) -> StoreResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| StoreError::Network(format!("Unusable base URL: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(&self, op: StoreOp, request: RequestBuilder) -> StoreResult<Response> {
        let response = request.send().await.map_err(|e| {
            tracing::warn!("Store request {} failed to complete: {}", op, e);
            StoreError::Network(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message: String = body.trim().chars().take(MAX_ERROR_BODY_CHARS).collect();
            tracing::warn!("Store rejected {} with status {}", op, status);
            return Err(StoreError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response)
    }

    async fn fetch_json<T: DeserializeOwned>(
        &self,
        op: StoreOp,
        request: RequestBuilder,
    ) -> StoreResult<T> {
        let response = self.send(op, request).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;

        serde_json::from_slice(&bytes).map_err(|e| {
            tracing::warn!("Store returned an unexpected {} payload: {}", op, e);
            StoreError::Malformed(format!("{}: {}", op, e))
        })
    }

    /// Await a confirmation; any JSON value (or an empty body) is accepted.
    async fn confirm(&self, op: StoreOp, request: RequestBuilder) -> StoreResult<()> {
        let response = self.send(op, request).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(());
        }

        serde_json::from_slice::<IgnoredAny>(&bytes)
            .map(|_| ())
            .map_err(|e| StoreError::Malformed(format!("{}: {}", op, e)))
    }
}

#[async_trait]
impl DocumentStore for HttpStore {
    async fn list_folders(&self) -> StoreResult<Vec<Folder>> {
        let url = self.endpoint(&["folders"])?;
        self.fetch_json(StoreOp::ListFolders, self.client.get(url))
            .await
    }

    async fn list_documents(&self, folder_id: &str) -> StoreResult<Vec<Document>> {
        let url = self.endpoint(&["folders", folder_id])?;
        self.fetch_json(StoreOp::ListDocuments, self.client.get(url))
            .await
    }

    async fn get_document(&self, id: &str) -> StoreResult<Document> {
        let url = self.endpoint(&["documents", id])?;
        self.fetch_json(StoreOp::GetDocument, self.client.get(url))
            .await
    }

    async fn create_folder(&self, req: CreateFolderRequest) -> StoreResult<Folder> {
        let url = self.endpoint(&["folders"])?;
        self.fetch_json(StoreOp::CreateFolder, self.client.post(url).json(&req))
            .await
    }

    async fn delete_folder(&self, id: &str) -> StoreResult<()> {
        let url = self.endpoint(&["folders", id])?;
        self.confirm(StoreOp::DeleteFolder, self.client.delete(url))
            .await
    }

    async fn create_document(&self, req: CreateDocumentRequest) -> StoreResult<Document> {
        let url = self.endpoint(&["documents"])?;
        self.fetch_json(StoreOp::CreateDocument, self.client.post(url).json(&req))
            .await
    }

    async fn update_document(
        &self,
        id: &str,
        req: UpdateDocumentRequest,
    ) -> StoreResult<Document> {
        let url = self.endpoint(&["documents", id])?;
        self.fetch_json(StoreOp::UpdateDocument, self.client.patch(url).json(&req))
            .await
    }

    async fn delete_document(&self, id: &str) -> StoreResult<()> {
        let url = self.endpoint(&["documents", id])?;
        self.confirm(StoreOp::DeleteDocument, self.client.delete(url))
            .await
    }

    async fn search(&self, query: &str) -> StoreResult<Vec<SearchResult>> {
        let url = self.endpoint(&["search"])?;
        let request = self.client.get(url).query(&[("query", query)]);
        self.fetch_json(StoreOp::Search, request).await
    }

    async fn list_history(&self) -> StoreResult<Vec<HistoryEntry>> {
        let url = self.endpoint(&["history"])?;
        self.fetch_json(StoreOp::ListHistory, self.client.get(url))
            .await
    }

    async fn add_history(&self, req: AddHistoryRequest) -> StoreResult<()> {
        let url = self.endpoint(&["history"])?;
        self.confirm(StoreOp::AddHistory, self.client.post(url).json(&req))
            .await
    }
}
