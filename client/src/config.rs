//! Client configuration constants
//!
//! Central location for defaults, resource limits, and validation
//! boundaries used throughout the client.

// ===== Store Connection =====

/// Base URL of the document store when no settings override it
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:4000/api";

/// Default per-request timeout in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Minimum request timeout in seconds
pub const MIN_REQUEST_TIMEOUT_SECS: u64 = 1;

/// Maximum request timeout in seconds (2 minutes)
pub const MAX_REQUEST_TIMEOUT_SECS: u64 = 120;

/// Longest rejection message kept from an error response body
pub const MAX_ERROR_BODY_CHARS: usize = 200;

// ===== Search =====

/// Quiet period after the last keystroke before a search is issued
pub const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 300;

/// Minimum debounce delay in milliseconds
pub const MIN_SEARCH_DEBOUNCE_MS: u64 = 50;

/// Maximum debounce delay in milliseconds
pub const MAX_SEARCH_DEBOUNCE_MS: u64 = 5_000;

/// Queries shorter than this many characters never reach the store
pub const MIN_SEARCH_QUERY_CHARS: usize = 3;

/// Snippet length produced by the in-memory store
pub const SEARCH_SNIPPET_CHARS: usize = 80;

// ===== History =====

/// Maximum number of entries in the recently-viewed list
pub const HISTORY_VIEW_LIMIT: usize = 10;

// ===== Settings =====

/// Settings file used when none is given on the command line
pub const DEFAULT_SETTINGS_FILE: &str = "docspace-settings.json";
