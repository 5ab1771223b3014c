//! Folder browser service
//!
//! Holds the folder list and the document list of the selected folder.
//! Lists are replaced wholesale by store responses, never patched locally.
//! A document-list response is applied only if it belongs to the most recent
//! folder selection; a failed load leaves the current list in place.

use crate::error::{AppError, Result};
use crate::store::{CreateFolderRequest, Document, DocumentStore, Folder};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct DocumentList {
    folder_id: Option<String>,
    documents: Vec<Document>,
    generation: u64,
}

/// Service for browsing folders and their documents
pub struct FolderBrowser {
    store: Arc<dyn DocumentStore>,
    folders: RwLock<Vec<Folder>>,
    documents: RwLock<DocumentList>,
}

impl FolderBrowser {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            folders: RwLock::new(Vec::new()),
            documents: RwLock::new(DocumentList::default()),
        }
    }

    /// Reload the folder list from the store
    pub async fn load_folders(&self) -> Result<()> {
        let folders = self.store.list_folders().await.map_err(|e| {
            tracing::warn!("Failed to load folders: {}", e);
            e
        })?;

        tracing::debug!("Loaded {} folders", folders.len());
        *self.folders.write().await = folders;
        Ok(())
    }

    /// Show the documents of `folder_id`, or none.
    ///
    /// A response arriving after a newer call was made is dropped.
    pub async fn load_documents(&self, folder_id: Option<&str>) -> Result<()> {
        let generation = {
            let mut list = self.documents.write().await;
            list.generation += 1;
            list.folder_id = folder_id.map(str::to_string);
            if folder_id.is_none() {
                list.documents.clear();
            }
            list.generation
        };

        let Some(folder_id) = folder_id else {
            return Ok(());
        };

        let outcome = self.store.list_documents(folder_id).await;

        let mut list = self.documents.write().await;
        if list.generation != generation {
            tracing::debug!("Discarding stale document list for folder {}", folder_id);
            return Ok(());
        }

        match outcome {
            Ok(documents) => {
                tracing::debug!("Loaded {} documents for folder {}", documents.len(), folder_id);
                list.documents = documents;
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Failed to load documents for folder {}: {}", folder_id, e);
                Err(e.into())
            }
        }
    }

    /// Reload the documents of whichever folder is currently shown
    pub async fn refresh_documents(&self) -> Result<()> {
        let folder_id = self.documents.read().await.folder_id.clone();
        self.load_documents(folder_id.as_deref()).await
    }

    /// Create a folder and reload the folder list
    pub async fn create_folder(&self, name: &str) -> Result<Folder> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("Folder name cannot be empty".to_string()));
        }

        tracing::info!("Creating folder: {}", name);
        let folder = self
            .store
            .create_folder(CreateFolderRequest {
                name: name.to_string(),
            })
            .await?;
        tracing::info!("Folder created: {}", folder.id);

        if let Err(e) = self.load_folders().await {
            tracing::warn!("Folder list not refreshed after create: {}", e);
        }

        Ok(folder)
    }

    /// Delete a folder (and, store-side, its documents) and reload the list
    pub async fn delete_folder(&self, id: &str) -> Result<()> {
        tracing::info!("Deleting folder: {}", id);
        self.store.delete_folder(id).await?;
        tracing::info!("Folder deleted: {}", id);

        if let Err(e) = self.load_folders().await {
            tracing::warn!("Folder list not refreshed after delete: {}", e);
        }

        Ok(())
    }

    pub async fn folders(&self) -> Vec<Folder> {
        self.folders.read().await.clone()
    }

    pub async fn find_folder(&self, id: &str) -> Option<Folder> {
        self.folders.read().await.iter().find(|f| f.id == id).cloned()
    }

    pub async fn documents(&self) -> Vec<Document> {
        self.documents.read().await.documents.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::store::{CreateDocumentRequest, MemoryStore, StoreOp};
    use std::time::Duration;

    async fn add_doc(store: &MemoryStore, folder: &Folder, title: &str) -> Document {
        store
            .create_document(CreateDocumentRequest {
                title: title.to_string(),
                content: String::new(),
                folder_id: folder.id.clone(),
            })
            .await
            .unwrap()
    }

    fn browser(store: &MemoryStore) -> FolderBrowser {
        FolderBrowser::new(Arc::new(store.clone()))
    }

    #[tokio::test]
    async fn test_create_folder_trims_and_reloads() {
        let store = MemoryStore::new();
        let browser = browser(&store);

        let folder = browser.create_folder("  Notes  ").await.unwrap();

        assert_eq!(folder.name, "Notes");
        assert_eq!(browser.folders().await, vec![folder]);
        assert_eq!(store.calls(StoreOp::ListFolders), 1);
    }

    #[tokio::test]
    async fn test_blank_folder_name_rejected() {
        let store = MemoryStore::new();
        let browser = browser(&store);

        assert!(matches!(
            browser.create_folder(" \t ").await,
            Err(AppError::Validation(_))
        ));
        assert_eq!(store.calls(StoreOp::CreateFolder), 0);
    }

    #[tokio::test]
    async fn test_load_documents_and_clear() {
        let store = MemoryStore::new();
        let browser = browser(&store);
        let folder = browser.create_folder("Notes").await.unwrap();
        add_doc(&store, &folder, "Todo").await;

        browser.load_documents(Some(&folder.id)).await.unwrap();
        assert_eq!(browser.documents().await.len(), 1);

        browser.load_documents(None).await.unwrap();
        assert!(browser.documents().await.is_empty());
        assert_eq!(store.calls(StoreOp::ListDocuments), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_document_list_is_discarded() {
        let store = MemoryStore::new();
        let browser = browser(&store);
        let slow = browser.create_folder("Slow").await.unwrap();
        let fast = browser.create_folder("Fast").await.unwrap();
        add_doc(&store, &slow, "In slow").await;
        add_doc(&store, &fast, "In fast").await;

        store.set_delay(StoreOp::ListDocuments, Duration::from_millis(500));
        let (first, second) = tokio::join!(browser.load_documents(Some(&slow.id)), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            store.clear_delay(StoreOp::ListDocuments);
            browser.load_documents(Some(&fast.id)).await
        });

        first.unwrap();
        second.unwrap();
        let docs = browser.documents().await;
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].title, "In fast");
    }

    #[tokio::test]
    async fn test_failed_load_keeps_previous_lists() {
        let store = MemoryStore::new();
        let browser = browser(&store);
        let folder = browser.create_folder("Notes").await.unwrap();
        add_doc(&store, &folder, "Todo").await;
        browser.load_documents(Some(&folder.id)).await.unwrap();

        store.fail(StoreOp::ListFolders, StoreError::Network("offline".to_string()));
        store.fail(StoreOp::ListDocuments, StoreError::Network("offline".to_string()));

        assert!(browser.load_folders().await.is_err());
        assert!(browser.refresh_documents().await.is_err());

        assert_eq!(browser.folders().await.len(), 1);
        assert_eq!(browser.documents().await.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_folder_reloads() {
        let store = MemoryStore::new();
        let browser = browser(&store);
        let keep = browser.create_folder("Keep").await.unwrap();
        let gone = browser.create_folder("Gone").await.unwrap();

        browser.delete_folder(&gone.id).await.unwrap();

        assert_eq!(browser.folders().await, vec![keep]);
    }
}
