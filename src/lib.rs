//! box-agent — conversational tool-calling agent for Box document storage.
//!
//! Binds a chat model to a catalog of typed document operations (identity,
//! search, read, AI ask/extract, folder listing and lookup), maintains
//! keyed multi-turn conversation state, and streams user-visible events
//! back to the caller.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use box_agent::agent::BoxAgent;
//! use box_agent::catalog::builtin::catalog_for;
//! use box_agent::provider::openai::OpenAiProvider;
//! use box_agent::store::InMemoryStore;
//!
//! # async fn example() -> box_agent::error::Result<()> {
//! let store = Arc::new(InMemoryStore::demo());
//! let provider = Arc::new(OpenAiProvider::from_env()?);
//! let agent = BoxAgent::new(provider, Arc::new(catalog_for(store)));
//!
//! let reply = agent.invoke("who am i?", None).await?;
//! println!("{}", reply.text);
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod catalog;
pub mod config;
pub mod error;
pub mod prelude;
pub mod provider;
pub mod store;
pub mod types;
