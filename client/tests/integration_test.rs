//! Integration tests for docspace
//!
//! These tests verify end-to-end functionality including:
//! - Workspace flows over the in-memory store
//! - Folder and document deletion rules
//! - The HTTP store contract against a local mock server

use axum::extract::State;
use axum::http::{Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use docspace::error::{AppError, StoreError};
use docspace::services::{ClientSettings, EditorMode, SaveOutcome};
use docspace::store::{
    AddHistoryRequest, CreateDocumentRequest, CreateFolderRequest, DocumentStore, HttpStore,
    MemoryStore, StoreOp, UpdateDocumentRequest,
};
use docspace::workspace::Workspace;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Helper to create a mounted workspace over a fresh in-memory store
async fn create_test_workspace() -> (MemoryStore, Workspace) {
    let store = MemoryStore::new();
    let workspace = Workspace::new(Arc::new(store.clone()), &ClientSettings::default());
    workspace.mount().await;
    (store, workspace)
}

#[tokio::test]
async fn test_create_then_reopen_document() {
    let (store, workspace) = create_test_workspace().await;

    let folder = workspace.create_folder("Notes").await.unwrap();
    workspace.select_folder(Some(&folder.id)).await.unwrap();

    workspace.begin_create_document().await.unwrap();
    workspace.editor().set_title("Todo").await.unwrap();
    workspace.editor().set_content("buy milk").await.unwrap();
    let created = match workspace.save_document().await.unwrap() {
        SaveOutcome::Created(document) => document,
        other => panic!("expected a created document, got {:?}", other),
    };

    // Creating does not count as a visit
    assert!(workspace.refresh_history().await.unwrap().is_empty());

    let listed = workspace.browser().documents().await;
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, created.id);

    // Reselect from the list
    workspace.select_folder(None).await.unwrap();
    workspace.select_folder(Some(&folder.id)).await.unwrap();
    workspace.select_document(&created.id).await.unwrap();

    let editor = workspace.editor().snapshot().await;
    assert_eq!(editor.content, "buy milk");
    assert_eq!(editor.title, "Todo");

    let history = workspace.refresh_history().await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].id, created.id);
    let first_visit = history[0].timestamp;

    // Selecting again keeps one entry, with a newer timestamp
    workspace.select_document(&created.id).await.unwrap();
    let history = workspace.refresh_history().await.unwrap();
    assert_eq!(history.len(), 1);
    assert!(history[0].timestamp > first_visit);
    assert_eq!(store.calls(StoreOp::AddHistory), 2);
}

#[tokio::test]
async fn test_edit_and_save_existing_document() {
    let (store, workspace) = create_test_workspace().await;
    let folder = workspace.create_folder("Notes").await.unwrap();
    let doc = store
        .create_document(CreateDocumentRequest {
            title: "Plan".to_string(),
            content: "draft".to_string(),
            folder_id: folder.id.clone(),
        })
        .await
        .unwrap();

    workspace.select_folder(Some(&folder.id)).await.unwrap();
    workspace.select_document(&doc.id).await.unwrap();
    workspace.editor().set_content("final").await.unwrap();
    workspace.save_document().await.unwrap();

    assert_eq!(store.get_document(&doc.id).await.unwrap().content, "final");
    let selected = workspace.selection().await.document.unwrap();
    assert_eq!(selected.content, "final");
}

#[tokio::test]
async fn test_deleting_open_document_clears_editor() {
    let (store, workspace) = create_test_workspace().await;
    let folder = workspace.create_folder("Notes").await.unwrap();
    let doc = store
        .create_document(CreateDocumentRequest {
            title: "Old".to_string(),
            content: String::new(),
            folder_id: folder.id.clone(),
        })
        .await
        .unwrap();
    workspace.select_folder(Some(&folder.id)).await.unwrap();
    workspace.select_document(&doc.id).await.unwrap();

    workspace.request_delete_document().await.unwrap();
    let deleted = workspace.confirm_delete_document().await.unwrap();

    assert_eq!(deleted, doc.id);
    assert!(workspace.selection().await.document.is_none());
    assert_eq!(workspace.editor().snapshot().await.mode, EditorMode::Empty);
    assert!(workspace.browser().documents().await.is_empty());
    assert!(store.get_document(&doc.id).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_failed_delete_keeps_document_open() {
    let (store, workspace) = create_test_workspace().await;
    let folder = workspace.create_folder("Notes").await.unwrap();
    let doc = store
        .create_document(CreateDocumentRequest {
            title: "Stubborn".to_string(),
            content: String::new(),
            folder_id: folder.id.clone(),
        })
        .await
        .unwrap();
    workspace.select_folder(Some(&folder.id)).await.unwrap();
    workspace.select_document(&doc.id).await.unwrap();

    store.fail(StoreOp::DeleteDocument, StoreError::Network("offline".to_string()));
    workspace.request_delete_document().await.unwrap();
    assert!(workspace.confirm_delete_document().await.is_err());

    let editor = workspace.editor().snapshot().await;
    assert!(editor.confirming_delete);
    assert!(editor.error.is_some());
    assert_eq!(workspace.selection().await.document.map(|d| d.id), Some(doc.id));
}

#[tokio::test]
async fn test_folder_deletion_rules() {
    let (store, workspace) = create_test_workspace().await;
    let selected = workspace.create_folder("Selected").await.unwrap();
    let other = workspace.create_folder("Other").await.unwrap();
    store
        .create_document(CreateDocumentRequest {
            title: "Doomed".to_string(),
            content: String::new(),
            folder_id: other.id.clone(),
        })
        .await
        .unwrap();
    workspace.select_folder(Some(&selected.id)).await.unwrap();

    // Deleting an unselected folder leaves the selection alone
    workspace.delete_folder(&other.id).await.unwrap();
    assert_eq!(workspace.selection().await.folder, Some(selected.clone()));
    assert_eq!(workspace.browser().folders().await, vec![selected.clone()]);
    assert!(store.search("doomed").await.unwrap().is_empty());

    // Deleting the selected one clears it
    workspace.delete_folder(&selected.id).await.unwrap();
    let selection = workspace.selection().await;
    assert!(selection.folder.is_none());
    assert!(selection.document.is_none());
}

#[tokio::test]
async fn test_history_entry_from_another_folder() {
    let (store, workspace) = create_test_workspace().await;
    let here = workspace.create_folder("Here").await.unwrap();
    let there = workspace.create_folder("There").await.unwrap();
    let doc = store
        .create_document(CreateDocumentRequest {
            title: "Far".to_string(),
            content: "away".to_string(),
            folder_id: there.id.clone(),
        })
        .await
        .unwrap();
    workspace.select_document(&doc.id).await.unwrap();
    workspace.select_folder(Some(&here.id)).await.unwrap();

    let view = workspace.refresh_history().await.unwrap();
    workspace.select_history_entry(&view[0].id).await.unwrap();

    let selection = workspace.selection().await;
    assert_eq!(selection.folder.map(|f| f.id), Some(there.id));
    assert_eq!(selection.document.map(|d| d.id), Some(doc.id));
}

#[tokio::test(start_paused = true)]
async fn test_search_then_open_result() {
    let (store, workspace) = create_test_workspace().await;
    let folder = workspace.create_folder("Notes").await.unwrap();
    let doc = store
        .create_document(CreateDocumentRequest {
            title: "Recipes".to_string(),
            content: "pancakes".to_string(),
            folder_id: folder.id.clone(),
        })
        .await
        .unwrap();

    for query in ["p", "pa", "pan", "panc"] {
        workspace.search_input(query).await;
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    tokio::time::sleep(Duration::from_millis(400)).await;

    assert_eq!(store.calls(StoreOp::Search), 1);
    assert!(workspace.search().is_open().await);

    let opened = workspace.select_search_result(&doc.id).await.unwrap();
    assert_eq!(opened.map(|d| d.id), Some(doc.id));
    assert!(!workspace.search().is_open().await);
    assert_eq!(workspace.search().snapshot().await.query, "");
    assert_eq!(store.calls(StoreOp::AddHistory), 1);
}

#[tokio::test]
async fn test_snapshot_serializes() {
    let (_store, workspace) = create_test_workspace().await;
    let folder = workspace.create_folder("Notes").await.unwrap();
    workspace.select_folder(Some(&folder.id)).await.unwrap();
    workspace.begin_create_document().await.unwrap();

    let value = serde_json::to_value(workspace.snapshot().await).unwrap();

    assert_eq!(value["editor"]["mode"], "creating");
    assert_eq!(value["editor"]["folder_id"], folder.id.as_str());
    assert_eq!(value["selection"]["creating"], true);
    assert_eq!(value["folders"][0]["type"], "folder");
}

// ===== HTTP contract =====

#[derive(Debug, Clone)]
struct Hit {
    method: Method,
    /// Path and query as received
    target: String,
    body: String,
}

#[derive(Clone, Default)]
struct Hits(Arc<Mutex<Vec<Hit>>>);

impl Hits {
    fn take(&self) -> Vec<Hit> {
        std::mem::take(&mut *self.0.lock().unwrap())
    }
}

fn document_json() -> Value {
    json!({
        "id": "d1",
        "title": "Todo",
        "content": "buy milk",
        "folderId": "f1",
        "createdAt": 1_700_000_000_000_i64,
        "updatedAt": 1_700_000_060_000_i64
    })
}

async fn contract(State(hits): State<Hits>, method: Method, uri: Uri, body: String) -> Response {
    hits.0.lock().unwrap().push(Hit {
        method: method.clone(),
        target: uri.to_string(),
        body,
    });

    let path = uri.path().trim_start_matches("/api/").to_string();
    let segments: Vec<&str> = path.split('/').collect();
    match (method.as_str(), segments.as_slice()) {
        ("GET", ["folders"]) => Json(json!([{ "id": "f1", "name": "Notes", "type": "folder" }])).into_response(),
        ("POST", ["folders"]) => Json(json!({ "id": "f2", "name": "Work", "type": "folder" })).into_response(),
        ("GET", ["folders", _]) => Json(json!([document_json()])).into_response(),
        ("DELETE", ["folders", _]) => StatusCode::NO_CONTENT.into_response(),
        ("GET", ["documents", _]) | ("POST", ["documents"]) | ("PATCH", ["documents", _]) => {
            Json(document_json()).into_response()
        }
        ("DELETE", ["documents", _]) => Json(json!({ "ok": true })).into_response(),
        ("GET", ["search"]) => {
            Json(json!([{ "id": "d1", "title": "Todo", "snippet": "buy milk" }])).into_response()
        }
        ("GET", ["history"]) => Json(json!([
            { "id": "d1", "title": "Todo", "timestamp": 1_700_000_000_000_i64 },
            { "id": "d1", "title": "Todo", "timestamp": 1_700_000_100_000_i64 }
        ]))
        .into_response(),
        ("POST", ["history"]) => StatusCode::OK.into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}/api/", addr)
}

async fn create_contract_store() -> (HttpStore, Hits) {
    let hits = Hits::default();
    let url = serve(Router::new().fallback(contract).with_state(hits.clone())).await;
    let store = HttpStore::new(&url, Duration::from_secs(5)).unwrap();
    (store, hits)
}

#[tokio::test]
async fn test_http_paths_and_methods() {
    let (store, hits) = create_contract_store().await;

    let folders = store.list_folders().await.unwrap();
    assert_eq!(folders[0].name, "Notes");
    store.list_documents("f1").await.unwrap();
    let doc = store.get_document("d1").await.unwrap();
    assert_eq!(doc.folder_id, "f1");
    assert_eq!(doc.created_at.timestamp_millis(), 1_700_000_000_000);
    store.delete_folder("f9").await.unwrap();
    store.delete_document("d1").await.unwrap();
    let history = store.list_history().await.unwrap();
    assert_eq!(history.len(), 2);

    let seen: Vec<(Method, String)> = hits.take().into_iter().map(|h| (h.method, h.target)).collect();
    assert_eq!(
        seen,
        vec![
            (Method::GET, "/api/folders".to_string()),
            (Method::GET, "/api/folders/f1".to_string()),
            (Method::GET, "/api/documents/d1".to_string()),
            (Method::DELETE, "/api/folders/f9".to_string()),
            (Method::DELETE, "/api/documents/d1".to_string()),
            (Method::GET, "/api/history".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_http_request_bodies_are_camel_case() {
    let (store, hits) = create_contract_store().await;

    store
        .create_folder(CreateFolderRequest {
            name: "Work".to_string(),
        })
        .await
        .unwrap();
    store
        .create_document(CreateDocumentRequest {
            title: "Todo".to_string(),
            content: "buy milk".to_string(),
            folder_id: "f1".to_string(),
        })
        .await
        .unwrap();
    store
        .update_document(
            "d1",
            UpdateDocumentRequest {
                content: "buy oat milk".to_string(),
            },
        )
        .await
        .unwrap();
    store
        .add_history(AddHistoryRequest {
            id: "d1".to_string(),
            title: "Todo".to_string(),
        })
        .await
        .unwrap();

    let hits = hits.take();
    let requests: Vec<(Method, &str, Value)> = hits
        .iter()
        .map(|h| (h.method.clone(), h.target.as_str(), serde_json::from_str(&h.body).unwrap()))
        .collect();
    assert_eq!(
        requests,
        vec![
            (Method::POST, "/api/folders", json!({ "name": "Work" })),
            (
                Method::POST,
                "/api/documents",
                json!({ "title": "Todo", "content": "buy milk", "folderId": "f1" })
            ),
            (Method::PATCH, "/api/documents/d1", json!({ "content": "buy oat milk" })),
            (Method::POST, "/api/history", json!({ "id": "d1", "title": "Todo" })),
        ]
    );
}

#[tokio::test]
async fn test_http_search_query_is_encoded() {
    let (store, hits) = create_contract_store().await;

    let results = store.search("milk & eggs").await.unwrap();
    assert_eq!(results[0].snippet, "buy milk");

    store.get_document("a/b").await.unwrap();

    let targets: Vec<String> = hits.take().into_iter().map(|h| h.target).collect();
    assert_eq!(targets, vec!["/api/search?query=milk+%26+eggs", "/api/documents/a%2Fb"]);
}

#[tokio::test]
async fn test_http_workspace_selection_records_one_visit() {
    let (store, hits) = create_contract_store().await;
    let workspace = Workspace::new(Arc::new(store), &ClientSettings::default());
    workspace.mount().await;
    hits.take();

    workspace.select_folder(Some("f1")).await.unwrap();
    workspace.select_document("d1").await.unwrap();

    // Duplicate raw entries collapse in the view
    assert_eq!(workspace.history().view().await.len(), 1);

    let posts: Vec<Hit> = hits
        .take()
        .into_iter()
        .filter(|h| h.method == Method::POST)
        .collect();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].target, "/api/history");
}

#[tokio::test]
async fn test_http_rejection_keeps_status_and_body() {
    let url = serve(Router::new().fallback(|| async {
        (StatusCode::INTERNAL_SERVER_ERROR, "  database unavailable \n")
    }))
    .await;
    let store = HttpStore::new(&url, Duration::from_secs(5)).unwrap();

    let err = store.list_folders().await.unwrap_err();
    assert_eq!(
        err,
        StoreError::Rejected {
            status: 500,
            message: "database unavailable".to_string()
        }
    );
}

#[tokio::test]
async fn test_http_missing_document_is_not_found() {
    let url = serve(Router::new().fallback(|| async { (StatusCode::NOT_FOUND, "no such document") })).await;
    let store = HttpStore::new(&url, Duration::from_secs(5)).unwrap();

    let err = store.get_document("gone").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_http_malformed_payload() {
    let url = serve(Router::new().fallback(|| async { "<html>not json</html>" })).await;
    let store = HttpStore::new(&url, Duration::from_secs(5)).unwrap();

    assert!(matches!(store.list_folders().await, Err(StoreError::Malformed(_))));
    assert!(matches!(store.delete_document("d1").await, Err(StoreError::Malformed(_))));
}

#[tokio::test]
async fn test_http_unreachable_store_is_network_failure() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let store = HttpStore::new(&format!("http://{}/api", addr), Duration::from_secs(2)).unwrap();

    assert!(matches!(store.list_folders().await, Err(StoreError::Network(_))));
}

#[tokio::test]
async fn test_http_store_rejects_bad_base_url() {
    assert!(matches!(
        HttpStore::new("not a url", Duration::from_secs(5)),
        Err(AppError::Validation(_))
    ));
}
