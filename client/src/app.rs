//! Application state and initialization
//!
//! Settings are loaded, the store client is built from them and the
//! workspace is mounted. Everything the binary needs lives in `AppState`.

use crate::error::Result;
use crate::services::{ClientSettings, SettingsService};
use crate::store::{DocumentStore, HttpStore};
use crate::workspace::Workspace;
use std::path::PathBuf;
use std::sync::Arc;

/// Central application state
#[derive(Clone)]
pub struct AppState {
    pub settings: ClientSettings,
    pub workspace: Arc<Workspace>,
}

impl AppState {
    /// Mount a workspace over any store
    pub async fn new(store: Arc<dyn DocumentStore>, settings: ClientSettings) -> Self {
        let workspace = Arc::new(Workspace::new(store, &settings));
        workspace.mount().await;
        Self {
            settings,
            workspace,
        }
    }
}

/// Application setup - called once on startup
///
/// `api_url` overrides the persisted store URL for this run only.
pub async fn setup(settings_path: PathBuf, api_url: Option<String>) -> Result<AppState> {
    tracing::info!("Initializing application");

    let settings_service = SettingsService::new(settings_path);
    let mut settings = settings_service.load().await?;
    tracing::info!("Settings loaded from {:?}", settings_service.path());

    if let Some(url) = api_url {
        settings.api.base_url = url;
        settings.validate()?;
    }

    let store = HttpStore::new(&settings.api.base_url, settings.api.request_timeout())?;
    tracing::info!("Document store: {}", store.base_url());

    let state = AppState::new(Arc::new(store), settings).await;

    tracing::info!("Application initialized successfully");

    Ok(state)
}
