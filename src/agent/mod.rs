//! Multi-agent analysis pipeline.
//!
//! Fans analysis of a retrieved document corpus out across concurrent
//! bounded-context agents and synthesizes their partial analyses into
//! one answer. Uses a pluggable provider abstraction backed by
//! `OpenAI`-compatible APIs.
//!
//! # Architecture
//!
//! ```text
//! query + documents → Orchestrator
//!   ├── partition: time-sorted contiguous groups, one per agent
//!   ├── Fan-out → N concurrent analysis agents (semaphore-capped)
//!   │   └── format group under token budget → one inference call
//!   │       (retry with exponential backoff, degrade to Failed)
//!   ├── Join: every agent settles before synthesis
//!   └── Synthesizer → final answer (fixed fallback text on failure)
//! ```

pub mod client;
pub mod config;
pub mod format;
pub mod message;
pub mod orchestrator;
pub mod partition;
pub mod progress;
pub mod prompt;
pub mod provider;
pub mod providers;
pub mod runner;
pub mod synthesizer;
pub mod traits;

// Re-export key types
pub use client::create_provider;
pub use config::OrchestratorConfig;
pub use format::format_group;
pub use message::{ChatMessage, ChatRequest, ChatResponse, Role, TokenUsage};
pub use orchestrator::{NO_VALID_ANALYSIS, NOTHING_TO_ANALYZE, Orchestrator};
pub use partition::partition_documents;
pub use progress::{FnObserver, NullObserver, ProgressEvent, ProgressObserver};
pub use provider::LlmProvider;
pub use runner::{AgentOutcome, run_agent};
pub use synthesizer::{AgentAnalysis, NOTHING_TO_SYNTHESIZE, SYNTHESIS_FAILED, synthesize};
pub use traits::{Agent, AgentResponse, execute_with_retry};
