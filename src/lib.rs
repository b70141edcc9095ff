//! # forum-swarm
//!
//! Multi-agent analysis orchestrator for scraped discussion-forum
//! threads. Given a natural-language question and a set of retrieved
//! documents, the orchestrator partitions the corpus chronologically
//! across bounded-context analysis agents, runs them concurrently
//! against a rate-limited inference service under a parallelism cap,
//! retries failures with exponential backoff, and synthesizes the
//! surviving partial analyses into one coherent answer.
//!
//! The vector index, embedding model, ingestion, and chat UI are
//! external collaborators: this crate consumes a [`DocumentStore`] and
//! an [`agent::LlmProvider`] and emits progress through an
//! [`agent::ProgressObserver`].
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use forum_swarm::agent::{NullObserver, Orchestrator, OrchestratorConfig};
//!
//! # async fn run(documents: Vec<forum_swarm::Document>) -> Result<(), forum_swarm::AgentError> {
//! let config = OrchestratorConfig::builder()
//!     .api_key("sk-...")
//!     .agent_count(3)
//!     .build()?;
//! let orchestrator = Orchestrator::from_config(config)?;
//! let answer = orchestrator
//!     .process(documents, "What build do people recommend?", Arc::new(NullObserver))
//!     .await;
//! # let _ = answer;
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod document;
pub mod error;
pub mod tokens;

pub use document::{Document, DocumentGroup, DocumentMeta, DocumentStore};
pub use error::AgentError;
pub use tokens::TokenCounter;
