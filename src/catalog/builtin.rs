//! Built-in document operations.
//!
//! The seven operations the agent exposes, each a thin adapter over one
//! [`DocumentStore`] call. All of them are read-only: nothing here creates,
//! moves, or deletes store content.
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use box_agent::catalog::builtin::catalog_for;
//! use box_agent::store::InMemoryStore;
//!
//! let catalog = catalog_for(Arc::new(InMemoryStore::demo()));
//! assert_eq!(catalog.len(), 7);
//! ```

use std::sync::Arc;

use serde_json::json;

use crate::store::{DocumentStore, SearchQuery};

use super::operation::{ClosureOperation, Operation, OperationCatalog};
use super::types::OperationParameters;

/// Create the `whoami` operation — identity of the authenticated user.
pub fn whoami_operation(store: Arc<dyn DocumentStore>) -> Arc<dyn Operation> {
    Arc::new(ClosureOperation::new(
        "whoami",
        "Retrieve the current user's identity. Also checks the connection to the document store.",
        OperationParameters::empty(),
        move |_args, _ctx| {
            let store = store.clone();
            async move {
                let identity = store.whoami().await?;
                Ok(json!(format!("Authenticated as: {}", identity.name)))
            }
        },
    ))
}

/// Create the `search` operation — content and name search with filters.
pub fn search_operation(store: Arc<dyn DocumentStore>) -> Arc<dyn Operation> {
    Arc::new(ClosureOperation::new(
        "search",
        "Search for files by name and content. Optional filters: file extensions, \
         search locations ('name', 'file_content'), and folder ids to scope the search to.",
        OperationParameters::object()
            .string("query", "Text to search for", true)
            .string_array("extensions", "File extensions to match, without the dot", false)
            .string_array("locations", "Fields to search: 'name' and/or 'file_content'", false)
            .string_array("scope_folder_ids", "Folder ids to restrict the search to", false)
            .build(),
        move |args, _ctx| {
            let store = store.clone();
            async move {
                let query = SearchQuery {
                    query: args.get_str("query")?.to_string(),
                    extensions: args.get_string_list_opt("extensions"),
                    locations: args.get_string_list_opt("locations"),
                    scope_folder_ids: args.get_string_list_opt("scope_folder_ids"),
                };
                let matches = store.search(&query).await?;
                Ok(json!(matches
                    .iter()
                    .map(|m| json!({ "id": m.id, "name": m.name }))
                    .collect::<Vec<_>>()))
            }
        },
    ))
}

/// Create the `read_text` operation — read a file's text content by id.
pub fn read_text_operation(store: Arc<dyn DocumentStore>) -> Arc<dyn Operation> {
    Arc::new(ClosureOperation::new(
        "read_text",
        "Read the textual content of a file by its id.",
        OperationParameters::object()
            .string("file_id", "Id of the file to read", true)
            .build(),
        move |args, _ctx| {
            let store = store.clone();
            async move {
                let text = store.read_text(args.get_str("file_id")?).await?;
                Ok(json!(text))
            }
        },
    ))
}

/// Create the `ai_ask` operation — ask the store's AI about one file.
pub fn ai_ask_operation(store: Arc<dyn DocumentStore>) -> Arc<dyn Operation> {
    Arc::new(ClosureOperation::new(
        "ai_ask",
        "Ask the document store's AI a free-form question about a single file.",
        OperationParameters::object()
            .string("file_id", "Id of the file to ask about", true)
            .string("prompt", "The question to ask", true)
            .build(),
        move |args, _ctx| {
            let store = store.clone();
            async move {
                let answer = store
                    .ai_ask(args.get_str("file_id")?, args.get_str("prompt")?)
                    .await?;
                Ok(json!(answer))
            }
        },
    ))
}

/// Create the `ai_extract` operation — structured extraction from one file.
pub fn ai_extract_operation(store: Arc<dyn DocumentStore>) -> Arc<dyn Operation> {
    Arc::new(ClosureOperation::new(
        "ai_extract",
        "Extract structured fields from a single file, e.g. 'tenant name, email, rent'.",
        OperationParameters::object()
            .string("file_id", "Id of the file to extract from", true)
            .string("fields", "Description of the fields to extract", true)
            .build(),
        move |args, _ctx| {
            let store = store.clone();
            async move {
                store
                    .ai_extract(args.get_str("file_id")?, args.get_str("fields")?)
                    .await
            }
        },
    ))
}

/// Create the `list_folder` operation — folder listing, optionally recursive.
pub fn list_folder_operation(store: Arc<dyn DocumentStore>) -> Arc<dyn Operation> {
    Arc::new(ClosureOperation::new(
        "list_folder",
        "List the files and subfolders of a folder by its id. Folder id '0' is the root.",
        OperationParameters::object()
            .string("folder_id", "Id of the folder to list", true)
            .boolean("recursive", "Also list entries of subfolders", false)
            .build(),
        move |args, _ctx| {
            let store = store.clone();
            async move {
                let recursive = args.get_bool_opt("recursive").unwrap_or(false);
                let entries = store
                    .list_folder(args.get_str("folder_id")?, recursive)
                    .await?;
                Ok(json!(entries
                    .iter()
                    .map(|e| json!({ "id": e.id, "name": e.name, "type": e.kind }))
                    .collect::<Vec<_>>()))
            }
        },
    ))
}

/// Create the `find_folder_by_name` operation — locate folders by name.
pub fn find_folder_by_name_operation(store: Arc<dyn DocumentStore>) -> Arc<dyn Operation> {
    Arc::new(ClosureOperation::new(
        "find_folder_by_name",
        "Find folders whose name matches the given name (case-insensitive).",
        OperationParameters::object()
            .string("name", "Folder name to look for", true)
            .build(),
        move |args, _ctx| {
            let store = store.clone();
            async move {
                let matches = store.find_folder_by_name(args.get_str("name")?).await?;
                Ok(json!(matches
                    .iter()
                    .map(|m| json!({ "id": m.id, "name": m.name }))
                    .collect::<Vec<_>>()))
            }
        },
    ))
}

/// All built-in operations over the given store.
pub fn all_operations(store: Arc<dyn DocumentStore>) -> Vec<Arc<dyn Operation>> {
    vec![
        whoami_operation(store.clone()),
        search_operation(store.clone()),
        read_text_operation(store.clone()),
        ai_ask_operation(store.clone()),
        ai_extract_operation(store.clone()),
        list_folder_operation(store.clone()),
        find_folder_by_name_operation(store),
    ]
}

/// A catalog with every built-in operation registered.
pub fn catalog_for(store: Arc<dyn DocumentStore>) -> OperationCatalog {
    let mut catalog = OperationCatalog::new();
    for operation in all_operations(store) {
        // Names are distinct by construction.
        catalog
            .register(operation)
            .expect("built-in operation names are unique");
    }
    catalog
}
