//! Docspace client library
//!
//! Client-side state for a document workspace backed by a remote document
//! store: folder browsing, editing, debounced search and view history.
//! The binary is a thin text front-end over [`workspace::Workspace`].

pub mod app;
pub mod commands;
pub mod config;
pub mod error;
pub mod render;
pub mod services;
pub mod store;
pub mod workspace;
