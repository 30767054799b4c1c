//! Document store client interface.
//!
//! The agent's built-in operations are thin adapters over exactly this
//! trait. A production implementation wraps the Box API; [`InMemoryStore`]
//! provides a deterministic in-process double for tests and demos.

pub mod memory;

pub use memory::{InMemoryStore, StoredFile};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// The authenticated user of the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Identity {
    pub id: String,
    pub name: String,
    pub login: String,
}

/// A content search request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchQuery {
    pub query: String,
    /// Restrict matches to these file extensions (without the dot).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Vec<String>>,
    /// Restrict which fields are searched: `"name"`, `"file_content"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locations: Option<Vec<String>>,
    /// Restrict matches to descendants of these folders.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope_folder_ids: Option<Vec<String>>,
}

impl SearchQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }
}

/// A file matched by a search.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FileMatch {
    pub id: String,
    pub name: String,
}

/// Kind of a folder entry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Folder,
}

/// One entry of a folder listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FolderEntry {
    pub id: String,
    pub name: String,
    pub kind: EntryKind,
}

/// A folder matched by a name lookup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FolderMatch {
    pub id: String,
    pub name: String,
}

/// External document-storage collaborator.
///
/// All methods may block on I/O in a real implementation; errors propagate
/// to the operation layer, which turns them into conversation data.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Identity of the authenticated user; doubles as a connectivity check.
    async fn whoami(&self) -> Result<Identity>;

    /// Search files by content and name.
    async fn search(&self, query: &SearchQuery) -> Result<Vec<FileMatch>>;

    /// Read a file's textual content by id.
    async fn read_text(&self, file_id: &str) -> Result<String>;

    /// Ask the store's AI endpoint a free-form question about one file.
    async fn ai_ask(&self, file_id: &str, prompt: &str) -> Result<String>;

    /// Extract structured fields from one file via the store's AI endpoint.
    ///
    /// `fields` is a free-form description of what to pull out (for
    /// example `"tenant name, email, rent"`).
    async fn ai_extract(&self, file_id: &str, fields: &str) -> Result<serde_json::Value>;

    /// List a folder's entries, optionally descending into subfolders.
    async fn list_folder(&self, folder_id: &str, recursive: bool) -> Result<Vec<FolderEntry>>;

    /// Find folders whose name matches (case-insensitive).
    async fn find_folder_by_name(&self, name: &str) -> Result<Vec<FolderMatch>>;
}
