//! In-memory document store for tests and demos.

use async_trait::async_trait;

use crate::error::{BoxAgentError, Result};

use super::{
    DocumentStore, EntryKind, FileMatch, FolderEntry, FolderMatch, Identity, SearchQuery,
};

/// Root folder id, following the Box convention.
pub const ROOT_FOLDER_ID: &str = "0";

/// A file record in the in-memory store.
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub id: String,
    pub name: String,
    pub folder_id: String,
    pub content: String,
    /// Canned answer served by `ai_ask`.
    pub summary: Option<String>,
    /// Canned structured result served by `ai_extract`.
    pub fields: Option<serde_json::Value>,
}

impl StoredFile {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        folder_id: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            folder_id: folder_id.into(),
            content: content.into(),
            summary: None,
            fields: None,
        }
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn with_fields(mut self, fields: serde_json::Value) -> Self {
        self.fields = Some(fields);
        self
    }
}

#[derive(Debug, Clone)]
struct StoredFolder {
    id: String,
    name: String,
    parent_id: Option<String>,
}

/// Deterministic in-process [`DocumentStore`].
///
/// Construct empty via [`InMemoryStore::new`] and populate with
/// [`add_folder`](Self::add_folder) / [`add_file`](Self::add_file), or use
/// [`InMemoryStore::demo`] for the canned demo corpus.
#[derive(Debug, Clone)]
pub struct InMemoryStore {
    identity: Identity,
    folders: Vec<StoredFolder>,
    files: Vec<StoredFile>,
}

impl InMemoryStore {
    pub fn new(identity: Identity) -> Self {
        Self {
            identity,
            folders: vec![StoredFolder {
                id: ROOT_FOLDER_ID.to_string(),
                name: "All Files".to_string(),
                parent_id: None,
            }],
            files: Vec::new(),
        }
    }

    /// Add a folder under `parent_id`.
    pub fn add_folder(
        &mut self,
        id: impl Into<String>,
        name: impl Into<String>,
        parent_id: impl Into<String>,
    ) -> &mut Self {
        self.folders.push(StoredFolder {
            id: id.into(),
            name: name.into(),
            parent_id: Some(parent_id.into()),
        });
        self
    }

    pub fn add_file(&mut self, file: StoredFile) -> &mut Self {
        self.files.push(file);
        self
    }

    /// The demo corpus: a root listing, a readable text file, searchable
    /// PDFs, and a habitat lease with extractable tenant fields.
    pub fn demo() -> Self {
        let mut store = Self::new(Identity {
            id: "18622116055".into(),
            name: "RB Admin".into(),
            login: "rb.admin@example.com".into(),
        });

        store
            .add_folder("298939487240", "Habitat Leases", ROOT_FOLDER_ID)
            .add_folder("298939487241", "Templates", ROOT_FOLDER_ID)
            .add_folder("298939487243", "Movie Scripts", ROOT_FOLDER_ID)
            .add_folder("298939487242", "hab-01", "298939487240");

        store.add_file(StoredFile::new(
            "1584049890460",
            "Leases.csv",
            ROOT_FOLDER_ID,
            "unit,tenant,rent\nHAB-1,Gregor Mendel,1200\n",
        ));
        store.add_file(StoredFile::new(
            "1584049890461",
            "Leases.xlsx",
            ROOT_FOLDER_ID,
            "",
        ));
        store.add_file(StoredFile::new(
            "1584049890462",
            "Lease_Template.docx",
            ROOT_FOLDER_ID,
            "This Habitat Lease Agreement is made between ... (template)",
        ));
        store.add_file(StoredFile::new(
            "1584049890465",
            "sample.txt",
            ROOT_FOLDER_ID,
            "This is a sample text file for testing Box integration.\n\
             You can build AI applications that interact with Box files and folders.\n\
             This demo shows an agent that can search, read, and analyze Box files.",
        ));
        store.add_file(StoredFile::new(
            "1584049890463",
            "Sample PDF A.pdf",
            ROOT_FOLDER_ID,
            "Sample PDF A body text.",
        ));
        store.add_file(StoredFile::new(
            "1584052520457",
            "Sample PDF B.pdf",
            ROOT_FOLDER_ID,
            "Sample PDF B body text.",
        ));
        store.add_file(StoredFile::new(
            "1633681461006",
            "Open Foundation and Fine-Tuned Chat Models.pdf",
            ROOT_FOLDER_ID,
            "Llama 2: Open Foundation and Fine-Tuned Chat Models.",
        ));

        store.add_file(
            StoredFile::new(
                "1728675498613",
                "HAB-1-01.docx",
                "298939487242",
                "Habitat Lease Agreement for unit HAB-1.\n\
                 Tenant Name: Gregor Mendel\n\
                 Email: gregor.mendel@moonhabitat.space\n\
                 Contract Start Date: 2025-01-01\n\
                 Contract End Date: 2025-12-31\n\
                 Monthly Rent: $1,200",
            )
            .with_summary(
                "Lease for habitat unit HAB-1: tenant Gregor Mendel \
                 (gregor.mendel@moonhabitat.space), 2025-01-01 through \
                 2025-12-31, $1,200 per month.",
            )
            .with_fields(serde_json::json!({
                "tenant_name": "Gregor Mendel",
                "email": "gregor.mendel@moonhabitat.space",
                "contract_start_date": "2025-01-01",
                "contract_end_date": "2025-12-31",
                "monthly_rent": "$1,200",
            })),
        );

        store
    }

    fn file(&self, file_id: &str) -> Result<&StoredFile> {
        self.files
            .iter()
            .find(|f| f.id == file_id)
            .ok_or_else(|| BoxAgentError::NotFound(format!("file {file_id}")))
    }

    fn folder(&self, folder_id: &str) -> Result<&StoredFolder> {
        self.folders
            .iter()
            .find(|f| f.id == folder_id)
            .ok_or_else(|| BoxAgentError::NotFound(format!("folder {folder_id}")))
    }

    /// Whether `folder_id` is `ancestor_id` or lies beneath it.
    fn is_descendant(&self, folder_id: &str, ancestor_id: &str) -> bool {
        let mut current = Some(folder_id.to_string());
        while let Some(id) = current {
            if id == ancestor_id {
                return true;
            }
            current = self
                .folders
                .iter()
                .find(|f| f.id == id)
                .and_then(|f| f.parent_id.clone());
        }
        false
    }

    fn matches_query(&self, file: &StoredFile, query: &SearchQuery) -> bool {
        let needle = query.query.to_lowercase();

        let (search_name, search_content) = match &query.locations {
            Some(locations) => (
                locations.iter().any(|l| l == "name"),
                locations.iter().any(|l| l == "file_content"),
            ),
            None => (true, true),
        };
        let hit = (search_name && file.name.to_lowercase().contains(&needle))
            || (search_content && file.content.to_lowercase().contains(&needle));
        if !hit {
            return false;
        }

        if let Some(extensions) = &query.extensions {
            let matched = extensions.iter().any(|ext| {
                file.name
                    .to_lowercase()
                    .ends_with(&format!(".{}", ext.to_lowercase()))
            });
            if !matched {
                return false;
            }
        }

        if let Some(scopes) = &query.scope_folder_ids {
            if !scopes
                .iter()
                .any(|scope| self.is_descendant(&file.folder_id, scope))
            {
                return false;
            }
        }

        true
    }

    fn collect_entries(&self, folder_id: &str, recursive: bool, out: &mut Vec<FolderEntry>) {
        for folder in self.folders.iter().filter(|f| {
            f.parent_id.as_deref() == Some(folder_id)
        }) {
            out.push(FolderEntry {
                id: folder.id.clone(),
                name: folder.name.clone(),
                kind: EntryKind::Folder,
            });
            if recursive {
                self.collect_entries(&folder.id, true, out);
            }
        }
        for file in self.files.iter().filter(|f| f.folder_id == folder_id) {
            out.push(FolderEntry {
                id: file.id.clone(),
                name: file.name.clone(),
                kind: EntryKind::File,
            });
        }
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn whoami(&self) -> Result<Identity> {
        Ok(self.identity.clone())
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<FileMatch>> {
        Ok(self
            .files
            .iter()
            .filter(|file| self.matches_query(file, query))
            .map(|file| FileMatch {
                id: file.id.clone(),
                name: file.name.clone(),
            })
            .collect())
    }

    async fn read_text(&self, file_id: &str) -> Result<String> {
        Ok(self.file(file_id)?.content.clone())
    }

    async fn ai_ask(&self, file_id: &str, _prompt: &str) -> Result<String> {
        let file = self.file(file_id)?;
        Ok(file
            .summary
            .clone()
            .unwrap_or_else(|| file.content.chars().take(200).collect()))
    }

    async fn ai_extract(&self, file_id: &str, fields: &str) -> Result<serde_json::Value> {
        let file = self.file(file_id)?;
        file.fields.clone().ok_or_else(|| {
            BoxAgentError::NotFound(format!(
                "no structured data for '{fields}' in file {file_id}"
            ))
        })
    }

    async fn list_folder(&self, folder_id: &str, recursive: bool) -> Result<Vec<FolderEntry>> {
        self.folder(folder_id)?;
        let mut entries = Vec::new();
        self.collect_entries(folder_id, recursive, &mut entries);
        Ok(entries)
    }

    async fn find_folder_by_name(&self, name: &str) -> Result<Vec<FolderMatch>> {
        let needle = name.to_lowercase();
        Ok(self
            .folders
            .iter()
            .filter(|f| f.name.to_lowercase().contains(&needle))
            .map(|f| FolderMatch {
                id: f.id.clone(),
                name: f.name.clone(),
            })
            .collect())
    }
}
