//! Workspace controller
//!
//! Owns the selected folder and document and wires the browser, editor,
//! search and history services together. Selection is only ever changed
//! through the methods here.

use crate::error::{AppError, Result};
use crate::services::{
    CancelOutcome, ClientSettings, DocumentEditor, EditorSnapshot, FolderBrowser, HistoryTracker,
    SaveOutcome, SearchCoordinator, SearchSnapshot,
};
use crate::store::{Document, DocumentStore, Folder, HistoryEntry};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Current selection; never persisted
#[derive(Debug, Clone, Default, Serialize)]
pub struct Selection {
    pub folder: Option<Folder>,
    pub document: Option<Document>,
    pub creating: bool,
    /// Bumped by every selection change so slower document fetches lose
    #[serde(skip)]
    request: u64,
}

/// Everything the UI shows, copied at one point in time
#[derive(Debug, Clone, Serialize)]
pub struct WorkspaceSnapshot {
    pub selection: Selection,
    pub folders: Vec<Folder>,
    pub documents: Vec<Document>,
    pub editor: EditorSnapshot,
    pub search: SearchSnapshot,
    pub history: Vec<HistoryEntry>,
}

/// Top-level composition of the document workspace
pub struct Workspace {
    store: Arc<dyn DocumentStore>,
    selection: RwLock<Selection>,
    browser: FolderBrowser,
    editor: DocumentEditor,
    search: SearchCoordinator,
    history: HistoryTracker,
}

impl Workspace {
    pub fn new(store: Arc<dyn DocumentStore>, settings: &ClientSettings) -> Self {
        Self {
            selection: RwLock::new(Selection::default()),
            browser: FolderBrowser::new(Arc::clone(&store)),
            editor: DocumentEditor::new(Arc::clone(&store)),
            search: SearchCoordinator::new(Arc::clone(&store), settings.search.debounce()),
            history: HistoryTracker::new(Arc::clone(&store)),
            store,
        }
    }

    pub fn browser(&self) -> &FolderBrowser {
        &self.browser
    }

    pub fn editor(&self) -> &DocumentEditor {
        &self.editor
    }

    pub fn search(&self) -> &SearchCoordinator {
        &self.search
    }

    pub fn history(&self) -> &HistoryTracker {
        &self.history
    }

    /// Initial loads: folder list and history. Failures are logged only.
    pub async fn mount(&self) {
        tracing::info!("Loading workspace");

        if let Err(e) = self.browser.load_folders().await {
            tracing::warn!("Workspace opened without folders: {}", e);
        }
        if let Err(e) = self.history.reload().await {
            tracing::warn!("Workspace opened without history: {}", e);
        }
    }

    pub async fn selection(&self) -> Selection {
        self.selection.read().await.clone()
    }

    /// Select a folder (or none). Switching to a different folder clears the
    /// document selection and any draft. Does not record history.
    pub async fn select_folder(&self, folder_id: Option<&str>) -> Result<()> {
        let folder = match folder_id {
            Some(id) => Some(
                self.browser
                    .find_folder(id)
                    .await
                    .ok_or_else(|| AppError::Validation(format!("Unknown folder: {}", id)))?,
            ),
            None => None,
        };

        let changed = {
            let mut selection = self.selection.write().await;
            let changed = selection.folder.as_ref().map(|f| &f.id) != folder.as_ref().map(|f| &f.id);
            if changed {
                selection.folder = folder;
                selection.document = None;
                selection.creating = false;
                // Outdates any document fetch still in flight
                selection.request += 1;
            }
            changed
        };

        if changed {
            tracing::debug!("Folder selection changed to {:?}", folder_id);
            self.editor.focus(None).await;
        }

        self.browser.load_documents(folder_id).await
    }

    /// Select a document by id from any source: browser list, search result
    /// or history entry.
    ///
    /// The document is fetched from the store, focused in the editor and
    /// recorded as a visit exactly once. Returns `None` when a later
    /// selection overtook this one while the fetch was in flight.
    pub async fn select_document(&self, id: &str) -> Result<Option<Document>> {
        let request = {
            let mut selection = self.selection.write().await;
            selection.request += 1;
            selection.request
        };

        let document = self.store.get_document(id).await.map_err(|e| {
            tracing::warn!("Failed to open document {}: {}", id, e);
            e
        })?;

        let reload_folder = {
            let mut selection = self.selection.write().await;
            if selection.request != request {
                tracing::debug!("Document selection {} superseded", id);
                return Ok(None);
            }

            let foreign = selection
                .folder
                .as_ref()
                .is_some_and(|f| f.id != document.folder_id);
            if foreign {
                selection.folder = self.browser.find_folder(&document.folder_id).await;
            }

            selection.document = Some(document.clone());
            selection.creating = false;
            foreign.then(|| selection.folder.as_ref().map(|f| f.id.clone()))
        };

        // Keep the document inside the selected folder
        if let Some(folder_id) = reload_folder {
            if let Err(e) = self.browser.load_documents(folder_id.as_deref()).await {
                tracing::warn!("Document list not refreshed after folder switch: {}", e);
            }
        }

        self.editor.focus(Some(document.clone())).await;

        if let Err(e) = self.history.record_visit(&document.id, &document.title).await {
            tracing::warn!("Visit of {} not recorded: {}", document.id, e);
        }

        Ok(Some(document))
    }

    /// Open a document picked from the search results
    pub async fn select_search_result(&self, id: &str) -> Result<Option<Document>> {
        let result = self
            .search
            .select(id)
            .await
            .ok_or_else(|| AppError::Validation(format!("Not among search results: {}", id)))?;
        self.select_document(&result.id).await
    }

    /// Open a document picked from the recently-viewed list
    pub async fn select_history_entry(&self, id: &str) -> Result<Option<Document>> {
        self.select_document(id).await
    }

    /// Start drafting a document in the selected folder
    pub async fn begin_create_document(&self) -> Result<()> {
        let folder_id = {
            let mut selection = self.selection.write().await;
            let folder_id = selection
                .folder
                .as_ref()
                .map(|f| f.id.clone())
                .ok_or(AppError::NoFolderSelected)?;
            selection.document = None;
            selection.creating = true;
            selection.request += 1;
            folder_id
        };

        self.editor.begin_create(&folder_id).await;
        Ok(())
    }

    /// Save the editor buffer and adopt the stored document
    pub async fn save_document(&self) -> Result<SaveOutcome> {
        let outcome = self.editor.save().await?;

        match &outcome {
            SaveOutcome::Created(document) => {
                {
                    let mut selection = self.selection.write().await;
                    selection.document = Some(document.clone());
                    selection.creating = false;
                }
                self.refresh_documents().await;
            }
            SaveOutcome::Updated(document) => {
                self.selection.write().await.document = Some(document.clone());
            }
            SaveOutcome::Detached(_) => self.refresh_documents().await,
        }

        Ok(outcome)
    }

    /// Discard unsaved edits; a discarded draft also leaves creation mode
    pub async fn cancel_edit(&self) -> Result<CancelOutcome> {
        let outcome = self.editor.cancel().await?;

        if outcome == CancelOutcome::DraftDiscarded {
            let mut selection = self.selection.write().await;
            selection.creating = false;
            selection.document = None;
        }

        Ok(outcome)
    }

    pub async fn request_delete_document(&self) -> Result<()> {
        self.editor.request_delete().await
    }

    pub async fn cancel_delete_document(&self) {
        self.editor.cancel_delete().await
    }

    /// Delete the open document once confirmed and clear the selection
    pub async fn confirm_delete_document(&self) -> Result<String> {
        let id = self.editor.confirm_delete().await?;

        {
            let mut selection = self.selection.write().await;
            if selection.document.as_ref().is_some_and(|d| d.id == id) {
                selection.document = None;
            }
        }
        self.refresh_documents().await;

        Ok(id)
    }

    pub async fn create_folder(&self, name: &str) -> Result<Folder> {
        self.browser.create_folder(name).await
    }

    /// Delete a folder; if it was selected, folder and document selection
    /// are cleared.
    pub async fn delete_folder(&self, id: &str) -> Result<()> {
        self.browser.delete_folder(id).await?;

        let (was_selected, held_document) = {
            let selection = self.selection.read().await;
            (
                selection.folder.as_ref().is_some_and(|f| f.id == id),
                selection.document.as_ref().is_some_and(|d| d.folder_id == id),
            )
        };

        if was_selected {
            self.select_folder(None).await?;
        } else if held_document {
            // Opened from search or history; its folder cascade removed it
            {
                let mut selection = self.selection.write().await;
                selection.document = None;
                selection.request += 1;
            }
            self.editor.focus(None).await;
        }

        Ok(())
    }

    /// Forward a keystroke in the search box
    pub async fn search_input(&self, query: &str) {
        self.search.on_input(query).await
    }

    /// Reload and return the recently-viewed list
    pub async fn refresh_history(&self) -> Result<Vec<HistoryEntry>> {
        self.history.reload().await
    }

    pub async fn snapshot(&self) -> WorkspaceSnapshot {
        WorkspaceSnapshot {
            selection: self.selection().await,
            folders: self.browser.folders().await,
            documents: self.browser.documents().await,
            editor: self.editor.snapshot().await,
            search: self.search.snapshot().await,
            history: self.history.view().await,
        }
    }

    async fn refresh_documents(&self) {
        if let Err(e) = self.browser.refresh_documents().await {
            tracing::warn!("Document list not refreshed: {}", e);
        }
    }
}
