//! Document editor service
//!
//! Owns the lifecycle of the focused document: viewing, editing, previewing,
//! creating, saving and deleting.
//!
//! At most one store mutation runs at a time. A save or delete requested
//! while another is outstanding is rejected before it reaches the store.
//! Every change of focus starts a new session; a mutation that completes
//! after its session ended reports its result but leaves the editor alone.

use crate::error::{AppError, Result};
use crate::render::render_markdown;
use crate::store::{CreateDocumentRequest, Document, DocumentStore, UpdateDocumentRequest};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;

/// What the editor is focused on
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum EditorMode {
    /// Nothing selected and not creating
    Empty,
    /// Drafting a new document for a fixed folder
    Creating { folder_id: String },
    /// An existing document, its content mirrored into the buffer
    Viewing { document: Document },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Busy {
    Saving,
    Deleting,
}

/// Result of a successful save
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Created(Document),
    Updated(Document),
    /// The store accepted the save after the editor moved on to another
    /// document; the editor state was left untouched.
    Detached(Document),
}

impl SaveOutcome {
    pub fn document(&self) -> &Document {
        match self {
            SaveOutcome::Created(doc) | SaveOutcome::Updated(doc) | SaveOutcome::Detached(doc) => {
                doc
            }
        }
    }
}

/// Result of cancelling the current edit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    /// The draft was discarded; the editor is empty
    DraftDiscarded,
    /// The buffer was reset to the stored document
    Reverted,
    Nothing,
}

/// Point-in-time copy of the editor state
#[derive(Debug, Clone, Serialize)]
pub struct EditorSnapshot {
    #[serde(flatten)]
    pub mode: EditorMode,
    pub title: String,
    pub content: String,
    pub preview: bool,
    pub busy: Option<Busy>,
    pub confirming_delete: bool,
    pub error: Option<String>,
}

enum PendingSave {
    Create(CreateDocumentRequest),
    Update(String, UpdateDocumentRequest),
}

struct EditorState {
    mode: EditorMode,
    title: String,
    content: String,
    preview: bool,
    busy: Option<Busy>,
    confirming_delete: bool,
    error: Option<String>,
    session: u64,
}

impl EditorState {
    fn reset(&mut self, mode: EditorMode) {
        self.session += 1;
        let (title, content) = match &mode {
            EditorMode::Viewing { document } => (document.title.clone(), document.content.clone()),
            _ => (String::new(), String::new()),
        };
        self.mode = mode;
        self.title = title;
        self.content = content;
        self.preview = false;
        self.confirming_delete = false;
        self.error = None;
    }

    fn ensure_idle(&self) -> Result<()> {
        match self.busy {
            Some(Busy::Saving) => Err(AppError::SaveInProgress),
            Some(Busy::Deleting) => Err(AppError::DeleteInProgress),
            None => Ok(()),
        }
    }
}

/// Service editing one focused document at a time
pub struct DocumentEditor {
    store: Arc<dyn DocumentStore>,
    state: Mutex<EditorState>,
}

impl DocumentEditor {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            state: Mutex::new(EditorState {
                mode: EditorMode::Empty,
                title: String::new(),
                content: String::new(),
                preview: false,
                busy: None,
                confirming_delete: false,
                error: None,
                session: 0,
            }),
        }
    }

    /// Focus a document, or nothing. Unsaved buffer changes are dropped.
    pub async fn focus(&self, document: Option<Document>) {
        let mode = match document {
            Some(document) => EditorMode::Viewing { document },
            None => EditorMode::Empty,
        };
        self.state.lock().await.reset(mode);
    }

    /// Start drafting a new document in `folder_id`
    pub async fn begin_create(&self, folder_id: &str) {
        tracing::debug!("Drafting new document in folder {}", folder_id);
        self.state.lock().await.reset(EditorMode::Creating {
            folder_id: folder_id.to_string(),
        });
    }

    /// Set the draft title; titles are fixed once a document exists.
    pub async fn set_title(&self, title: &str) -> Result<()> {
        let mut state = self.state.lock().await;
        if !matches!(state.mode, EditorMode::Creating { .. }) {
            return Err(AppError::Validation(
                "Title can only be set on a new document".to_string(),
            ));
        }
        state.title = title.to_string();
        Ok(())
    }

    pub async fn set_content(&self, content: &str) -> Result<()> {
        let mut state = self.state.lock().await;
        if state.mode == EditorMode::Empty {
            return Err(AppError::NoDocumentSelected);
        }
        state.content = content.to_string();
        Ok(())
    }

    /// Switch between the edit buffer and the rendered preview.
    /// Returns whether the preview is now shown.
    pub async fn toggle_preview(&self) -> Result<bool> {
        let mut state = self.state.lock().await;
        if state.mode == EditorMode::Empty {
            return Err(AppError::NoDocumentSelected);
        }
        state.preview = !state.preview;
        Ok(state.preview)
    }

    /// Rendered buffer, when the preview is shown
    pub async fn rendered_preview(&self) -> Option<String> {
        let state = self.state.lock().await;
        state.preview.then(|| render_markdown(&state.content))
    }

    /// Persist the buffer: create the draft or update the focused document.
    ///
    /// On success the editor adopts the document returned by the store. On
    /// failure the buffer is kept for a retry and the error is recorded.
    pub async fn save(&self) -> Result<SaveOutcome> {
        let (session, pending) = {
            let mut guard = self.state.lock().await;
            let state = &mut *guard;
            state.ensure_idle()?;

            let pending = match &state.mode {
                EditorMode::Empty => return Err(AppError::NoDocumentSelected),
                EditorMode::Creating { folder_id } => {
                    let title = state.title.trim();
                    if title.is_empty() {
                        let err = AppError::Validation("Document title cannot be empty".to_string());
                        state.error = Some(err.to_string());
                        return Err(err);
                    }
                    PendingSave::Create(CreateDocumentRequest {
                        title: title.to_string(),
                        content: state.content.clone(),
                        folder_id: folder_id.clone(),
                    })
                }
                EditorMode::Viewing { document } => PendingSave::Update(
                    document.id.clone(),
                    UpdateDocumentRequest {
                        content: state.content.clone(),
                    },
                ),
            };

            state.busy = Some(Busy::Saving);
            state.error = None;
            (state.session, pending)
        };

        let outcome = match pending {
            PendingSave::Create(req) => {
                tracing::info!("Creating document: {}", req.title);
                self.store.create_document(req).await.map(SaveOutcome::Created)
            }
            PendingSave::Update(id, req) => {
                tracing::info!("Saving document: {}", id);
                self.store.update_document(&id, req).await.map(SaveOutcome::Updated)
            }
        };

        let mut state = self.state.lock().await;
        state.busy = None;

        match outcome {
            Ok(outcome) if state.session != session => {
                tracing::info!("Save of {} finished after focus moved", outcome.document().id);
                Ok(SaveOutcome::Detached(outcome.document().clone()))
            }
            Ok(outcome) => {
                let document = outcome.document().clone();
                tracing::info!("Document saved successfully: {}", document.id);
                state.title = document.title.clone();
                state.content = document.content.clone();
                state.mode = EditorMode::Viewing { document };
                Ok(outcome)
            }
            Err(e) => {
                tracing::error!("Failed to save document: {}", e);
                if state.session == session {
                    state.error = Some(format!("Failed to save document: {}", e));
                }
                Err(e.into())
            }
        }
    }

    /// Ask for confirmation before deleting the focused document
    pub async fn request_delete(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        state.ensure_idle()?;
        if !matches!(state.mode, EditorMode::Viewing { .. }) {
            return Err(AppError::NoDocumentSelected);
        }
        state.confirming_delete = true;
        Ok(())
    }

    pub async fn cancel_delete(&self) {
        self.state.lock().await.confirming_delete = false;
    }

    /// Delete the focused document after [`request_delete`](Self::request_delete).
    ///
    /// Returns the deleted id. On failure the document stays focused and the
    /// confirmation stays open.
    pub async fn confirm_delete(&self) -> Result<String> {
        let (session, id) = {
            let mut state = self.state.lock().await;
            state.ensure_idle()?;
            if !state.confirming_delete {
                return Err(AppError::DeleteNotConfirmed);
            }
            let id = match &state.mode {
                EditorMode::Viewing { document } => document.id.clone(),
                _ => return Err(AppError::NoDocumentSelected),
            };
            state.busy = Some(Busy::Deleting);
            state.error = None;
            (state.session, id)
        };

        tracing::info!("Deleting document: {}", id);
        let outcome = self.store.delete_document(&id).await;

        let mut state = self.state.lock().await;
        state.busy = None;

        match outcome {
            Ok(()) => {
                tracing::info!("Document deleted successfully: {}", id);
                if state.session == session {
                    state.reset(EditorMode::Empty);
                }
                Ok(id)
            }
            Err(e) => {
                tracing::error!("Failed to delete document {}: {}", id, e);
                if state.session == session {
                    state.error = Some(format!("Failed to delete document: {}", e));
                }
                Err(e.into())
            }
        }
    }

    /// Discard local changes without touching the store
    pub async fn cancel(&self) -> Result<CancelOutcome> {
        let mut state = self.state.lock().await;
        state.ensure_idle()?;

        let mode = state.mode.clone();
        match mode {
            EditorMode::Empty => Ok(CancelOutcome::Nothing),
            EditorMode::Creating { .. } => {
                state.reset(EditorMode::Empty);
                Ok(CancelOutcome::DraftDiscarded)
            }
            EditorMode::Viewing { document } => {
                state.reset(EditorMode::Viewing { document });
                Ok(CancelOutcome::Reverted)
            }
        }
    }

    pub async fn snapshot(&self) -> EditorSnapshot {
        let state = self.state.lock().await;
        EditorSnapshot {
            mode: state.mode.clone(),
            title: state.title.clone(),
            content: state.content.clone(),
            preview: state.preview,
            busy: state.busy,
            confirming_delete: state.confirming_delete,
            error: state.error.clone(),
        }
    }
}
