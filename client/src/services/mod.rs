//! Services module
//!
//! Stateful components that sit between the workspace and the store.

pub mod browser;
pub mod editor;
pub mod history;
pub mod search;
pub mod settings;

pub use browser::FolderBrowser;
pub use editor::{CancelOutcome, DocumentEditor, EditorMode, EditorSnapshot, SaveOutcome};
pub use history::{compute_view, HistoryTracker};
pub use search::{SearchCoordinator, SearchPhase, SearchSnapshot};
pub use settings::{ClientSettings, SettingsService};
