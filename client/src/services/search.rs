//! Search service
//!
//! Turns a stream of query edits into debounced store lookups.
//!
//! Every edit bumps a generation counter and restarts the quiet-period
//! timer. When the timer fires, the lookup runs detached from further edits;
//! its response is applied only if no newer edit happened in the meantime,
//! so the result list always belongs to the most recent query regardless of
//! the order responses arrive in.

use crate::config::MIN_SEARCH_QUERY_CHARS;
use crate::store::{DocumentStore, SearchResult};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::{AbortHandle, JoinHandle};

/// Where the coordinator is in the query → results cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchPhase {
    /// Query too short, cleared, or the last lookup failed
    Idle,
    /// Waiting for the quiet period to elapse
    Pending,
    /// Lookup sent to the store
    Fetching,
    /// Results available
    Open,
}

/// Point-in-time copy of the search state
#[derive(Debug, Clone, Serialize)]
pub struct SearchSnapshot {
    pub query: String,
    pub phase: SearchPhase,
    pub results: Vec<SearchResult>,
}

struct SearchState {
    query: String,
    phase: SearchPhase,
    results: Vec<SearchResult>,
    generation: u64,
    timer: Option<JoinHandle<()>>,
}

impl SearchState {
    /// Invalidate whatever is scheduled or in flight
    fn supersede(&mut self) -> u64 {
        self.generation += 1;
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
        self.generation
    }

    fn close(&mut self) {
        self.phase = SearchPhase::Idle;
        self.results.clear();
    }
}

/// Debounced search over the document store
pub struct SearchCoordinator {
    store: Arc<dyn DocumentStore>,
    debounce: Duration,
    state: Arc<Mutex<SearchState>>,
    /// Most recent lookup task, reachable at teardown without the state lock
    latest: std::sync::Mutex<Option<AbortHandle>>,
}

impl SearchCoordinator {
    pub fn new(store: Arc<dyn DocumentStore>, debounce: Duration) -> Self {
        Self {
            store,
            debounce,
            state: Arc::new(Mutex::new(SearchState {
                query: String::new(),
                phase: SearchPhase::Idle,
                results: Vec::new(),
                generation: 0,
                timer: None,
            })),
            latest: std::sync::Mutex::new(None),
        }
    }

    /// Handle a keystroke: the query box now reads `query`.
    pub async fn on_input(&self, query: &str) {
        let mut state = self.state.lock().await;
        let generation = state.supersede();
        state.query = query.to_string();
        state.close();

        if query.chars().count() < MIN_SEARCH_QUERY_CHARS {
            return;
        }

        state.phase = SearchPhase::Pending;
        tracing::debug!(
            "Search scheduled in {:?} (generation {})",
            self.debounce,
            generation
        );

        let store = Arc::clone(&self.store);
        let shared = Arc::clone(&self.state);
        let delay = self.debounce;
        let query = query.to_string();

        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            {
                let mut state = shared.lock().await;
                if state.generation != generation {
                    return;
                }
                state.phase = SearchPhase::Fetching;
                // Past the quiet period: later edits no longer abort this
                // lookup, they only outdate it.
                state.timer = None;
            }

            let outcome = store.search(&query).await;

            let mut state = shared.lock().await;
            if state.generation != generation {
                tracing::debug!("Discarding results of superseded search (generation {})", generation);
                return;
            }

            match outcome {
                Ok(results) => {
                    tracing::debug!("Search returned {} results", results.len());
                    state.results = results;
                    state.phase = SearchPhase::Open;
                }
                Err(e) => {
                    tracing::warn!("Search failed: {}", e);
                    state.close();
                }
            }
        });

        *self.latest.lock().unwrap_or_else(|e| e.into_inner()) = Some(task.abort_handle());
        state.timer = Some(task);
    }

    /// Pick a result from the open list.
    ///
    /// Returns the chosen result for the caller to act on and resets the
    /// coordinator to an empty, closed query. Unknown ids change nothing.
    pub async fn select(&self, document_id: &str) -> Option<SearchResult> {
        let mut state = self.state.lock().await;

        if state.phase != SearchPhase::Open {
            return None;
        }

        let chosen = state.results.iter().find(|r| r.id == document_id).cloned()?;

        state.supersede();
        state.query.clear();
        state.close();

        Some(chosen)
    }

    pub async fn snapshot(&self) -> SearchSnapshot {
        let state = self.state.lock().await;
        SearchSnapshot {
            query: state.query.clone(),
            phase: state.phase,
            results: state.results.clone(),
        }
    }

    pub async fn is_open(&self) -> bool {
        self.state.lock().await.phase == SearchPhase::Open
    }
}

impl Drop for SearchCoordinator {
    fn drop(&mut self) {
        let latest = match self.latest.get_mut() {
            Ok(latest) => latest.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(task) = latest {
            task.abort();
        }

        // Skipped when a task holds the lock
        if let Ok(mut state) = self.state.try_lock() {
            state.supersede();
        }
    }
}
