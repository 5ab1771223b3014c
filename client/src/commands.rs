//! Text commands driving the workspace
//!
//! Each input line parses into one `Command`; `execute` runs it against the
//! workspace and returns the text to print.

use crate::error::{AppError, Result};
use crate::services::{CancelOutcome, SaveOutcome, SearchPhase};
use crate::workspace::Workspace;
use std::str::FromStr;

const HELP: &str = "\
folders              list folders
folder new <name>    create a folder
folder rm <id>       delete a folder and its documents
folder <id>|none     select a folder
docs                 list documents of the selected folder
open <id>            open a document
new                  start a document in the selected folder
title <text>         set the title of a new document
write <text>         replace the editor buffer
append <text>        add a line to the editor buffer
preview              toggle the rendered preview
save                 save the editor buffer
cancel               discard unsaved changes
delete               ask to delete the open document
confirm              confirm the pending delete
keep                 keep the document after all
find <text>          type into the search box
results              show search results
pick <id>            open a search result
history              show recently viewed documents
recent <id>          open a recently viewed document
status               print the workspace state as JSON
help                 show this help
quit                 exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Folders,
    NewFolder(String),
    RemoveFolder(String),
    SelectFolder(Option<String>),
    Docs,
    Open(String),
    New,
    Title(String),
    Write(String),
    Append(String),
    Preview,
    Save,
    Cancel,
    Delete,
    Confirm,
    Keep,
    Find(String),
    Results,
    Pick(String),
    History,
    Recent(String),
    Status,
    Help,
    Quit,
}

fn required(name: &str, arg: &str) -> Result<String> {
    if arg.is_empty() {
        return Err(AppError::InvalidCommand(format!("{} needs an argument", name)));
    }
    Ok(arg.to_string())
}

fn bare(name: &str, arg: &str, command: Command) -> Result<Command> {
    if !arg.is_empty() {
        return Err(AppError::InvalidCommand(format!("{} takes no argument", name)));
    }
    Ok(command)
}

impl FromStr for Command {
    type Err = AppError;

    fn from_str(line: &str) -> Result<Self> {
        let line = line.trim();
        let (name, arg) = match line.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (line, ""),
        };

        match name {
            "folders" => bare(name, arg, Command::Folders),
            "folder" => match arg.split_once(char::is_whitespace) {
                Some(("new", folder_name)) => {
                    Ok(Command::NewFolder(required("folder new", folder_name.trim())?))
                }
                Some(("rm", id)) => Ok(Command::RemoveFolder(required("folder rm", id.trim())?)),
                Some(_) => Err(AppError::InvalidCommand(format!("Unknown folder command: {}", arg))),
                None if arg == "new" || arg == "rm" => Err(AppError::InvalidCommand(format!(
                    "folder {} needs an argument",
                    arg
                ))),
                None if arg == "none" => Ok(Command::SelectFolder(None)),
                None => Ok(Command::SelectFolder(Some(required(name, arg)?))),
            },
            "docs" => bare(name, arg, Command::Docs),
            "open" => Ok(Command::Open(required(name, arg)?)),
            "new" => bare(name, arg, Command::New),
            "title" => Ok(Command::Title(arg.to_string())),
            "write" => Ok(Command::Write(arg.to_string())),
            "append" => Ok(Command::Append(arg.to_string())),
            "preview" => bare(name, arg, Command::Preview),
            "save" => bare(name, arg, Command::Save),
            "cancel" => bare(name, arg, Command::Cancel),
            "delete" => bare(name, arg, Command::Delete),
            "confirm" => bare(name, arg, Command::Confirm),
            "keep" => bare(name, arg, Command::Keep),
            "find" => Ok(Command::Find(arg.to_string())),
            "results" => bare(name, arg, Command::Results),
            "pick" => Ok(Command::Pick(required(name, arg)?)),
            "history" => bare(name, arg, Command::History),
            "recent" => Ok(Command::Recent(required(name, arg)?)),
            "status" => bare(name, arg, Command::Status),
            "help" => bare(name, arg, Command::Help),
            "quit" | "exit" => bare(name, arg, Command::Quit),
            "" => Err(AppError::InvalidCommand("Empty command".to_string())),
            other => Err(AppError::InvalidCommand(format!("Unknown command: {}", other))),
        }
    }
}

fn opened(document: Option<crate::store::Document>) -> String {
    match document {
        Some(document) => format!("Opened {} ({})\n{}", document.title, document.id, document.content),
        None => "Selection superseded".to_string(),
    }
}

/// Run one command and return what to print
pub async fn execute(workspace: &Workspace, command: Command) -> Result<String> {
    match command {
        Command::Folders => {
            let folders = workspace.browser().folders().await;
            if folders.is_empty() {
                return Ok("No folders".to_string());
            }
            let selected = workspace.selection().await.folder.map(|f| f.id);
            let lines: Vec<String> = folders
                .iter()
                .map(|folder| {
                    let marker = if selected.as_deref() == Some(folder.id.as_str()) { '*' } else { ' ' };
                    format!("{} {}  {}", marker, folder.id, folder.name)
                })
                .collect();
            Ok(lines.join("\n"))
        }
        Command::NewFolder(name) => {
            let folder = workspace.create_folder(&name).await?;
            Ok(format!("Created folder {} ({})", folder.name, folder.id))
        }
        Command::RemoveFolder(id) => {
            workspace.delete_folder(&id).await?;
            Ok(format!("Deleted folder {}", id))
        }
        Command::SelectFolder(id) => {
            workspace.select_folder(id.as_deref()).await?;
            Ok(match id {
                Some(id) => format!("Selected folder {}", id),
                None => "No folder selected".to_string(),
            })
        }
        Command::Docs => {
            let selection = workspace.selection().await;
            if selection.folder.is_none() {
                return Err(AppError::NoFolderSelected);
            }
            let documents = workspace.browser().documents().await;
            if documents.is_empty() {
                return Ok("No documents".to_string());
            }
            let selected = selection.document.map(|d| d.id);
            let lines: Vec<String> = documents
                .iter()
                .map(|document| {
                    let marker = if selected.as_deref() == Some(document.id.as_str()) { '*' } else { ' ' };
                    format!("{} {}  {}", marker, document.id, document.title)
                })
                .collect();
            Ok(lines.join("\n"))
        }
        Command::Open(id) => Ok(opened(workspace.select_document(&id).await?)),
        Command::New => {
            workspace.begin_create_document().await?;
            Ok("Drafting a new document".to_string())
        }
        Command::Title(title) => {
            workspace.editor().set_title(&title).await?;
            Ok(format!("Title: {}", title))
        }
        Command::Write(text) => {
            workspace.editor().set_content(&text).await?;
            Ok("Buffer replaced".to_string())
        }
        Command::Append(text) => {
            let current = workspace.editor().snapshot().await.content;
            let content = if current.is_empty() {
                text
            } else {
                format!("{}\n{}", current, text)
            };
            workspace.editor().set_content(&content).await?;
            Ok("Line added".to_string())
        }
        Command::Preview => {
            if workspace.editor().toggle_preview().await? {
                Ok(workspace.editor().rendered_preview().await.unwrap_or_default())
            } else {
                Ok("Editing".to_string())
            }
        }
        Command::Save => Ok(match workspace.save_document().await? {
            SaveOutcome::Created(document) => format!("Created {} ({})", document.title, document.id),
            SaveOutcome::Updated(document) => format!("Saved {}", document.title),
            SaveOutcome::Detached(document) => {
                format!("Saved {} in the background", document.title)
            }
        }),
        Command::Cancel => Ok(match workspace.cancel_edit().await? {
            CancelOutcome::DraftDiscarded => "Draft discarded".to_string(),
            CancelOutcome::Reverted => "Changes reverted".to_string(),
            CancelOutcome::Nothing => "Nothing to cancel".to_string(),
        }),
        Command::Delete => {
            workspace.request_delete_document().await?;
            Ok("Type 'confirm' to delete or 'keep' to cancel".to_string())
        }
        Command::Confirm => {
            let id = workspace.confirm_delete_document().await?;
            Ok(format!("Deleted document {}", id))
        }
        Command::Keep => {
            workspace.cancel_delete_document().await;
            Ok("Delete cancelled".to_string())
        }
        Command::Find(query) => {
            workspace.search_input(&query).await;
            Ok(match workspace.search().snapshot().await.phase {
                SearchPhase::Idle if query.is_empty() => "Search cleared".to_string(),
                SearchPhase::Idle => "Keep typing to search".to_string(),
                _ => format!("Searching for '{}'", query),
            })
        }
        Command::Results => {
            let search = workspace.search().snapshot().await;
            match search.phase {
                SearchPhase::Open if search.results.is_empty() => Ok("No matches".to_string()),
                SearchPhase::Open => {
                    let lines: Vec<String> = search
                        .results
                        .iter()
                        .map(|r| format!("{}  {}  {}", r.id, r.title, r.snippet))
                        .collect();
                    Ok(lines.join("\n"))
                }
                SearchPhase::Pending | SearchPhase::Fetching => Ok("Searching...".to_string()),
                SearchPhase::Idle => Ok("No search open".to_string()),
            }
        }
        Command::Pick(id) => Ok(opened(workspace.select_search_result(&id).await?)),
        Command::History => {
            let entries = workspace.refresh_history().await?;
            if entries.is_empty() {
                return Ok("Nothing viewed yet".to_string());
            }
            let lines: Vec<String> = entries
                .iter()
                .map(|entry| {
                    format!(
                        "{}  {}  {}",
                        entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
                        entry.id,
                        entry.title
                    )
                })
                .collect();
            Ok(lines.join("\n"))
        }
        Command::Recent(id) => Ok(opened(workspace.select_history_entry(&id).await?)),
        Command::Status => {
            let snapshot = workspace.snapshot().await;
            Ok(serde_json::to_string_pretty(&snapshot)?)
        }
        Command::Help => Ok(HELP.to_string()),
        Command::Quit => Ok(String::new()),
    }
}
