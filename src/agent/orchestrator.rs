//! Orchestrator for the fan-out/join analysis pipeline.
//!
//! Drives the full flow: partition retrieved documents across agents,
//! run the agents concurrently under the parallelism cap, join all of
//! them, then synthesize the surviving analyses into one answer.
//! Nothing escapes [`Orchestrator::process`] as an error — every failure
//! mode degrades to user-visible text.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use tokio::sync::Semaphore;
use tracing::{debug, error};

use super::client::create_provider;
use super::config::OrchestratorConfig;
use super::message::TokenUsage;
use super::partition::partition_documents;
use super::progress::{ProgressEvent, ProgressObserver};
use super::provider::LlmProvider;
use super::runner::{AgentOutcome, run_agent};
use super::synthesizer::{AgentAnalysis, synthesize};
use crate::document::{Document, DocumentGroup, DocumentStore};
use crate::error::AgentError;
use crate::tokens::TokenCounter;

/// Fixed reply when retrieval produced no documents at all.
pub const NOTHING_TO_ANALYZE: &str =
    "No forum documents were retrieved for this question, so there is nothing to analyze.";

/// Fixed reply when every dispatched agent failed. Distinct from
/// [`NOTHING_TO_ANALYZE`] so callers can tell empty input from total
/// analysis failure.
pub const NO_VALID_ANALYSIS: &str = "Analysis ran but no agent produced a valid result. The \
     inference service may be unavailable; please try again.";

/// Orchestrates the multi-agent analysis workflow.
///
/// Holds the provider, validated configuration, and the token counter
/// shared by formatting and synthesis truncation.
pub struct Orchestrator {
    provider: Arc<dyn LlmProvider>,
    config: Arc<OrchestratorConfig>,
    counter: Arc<TokenCounter>,
}

impl Orchestrator {
    /// Creates an orchestrator with an explicit provider (used by tests
    /// and callers with custom transports).
    #[must_use]
    pub fn new(provider: Arc<dyn LlmProvider>, config: OrchestratorConfig) -> Self {
        Self {
            provider,
            config: Arc::new(config),
            counter: Arc::new(TokenCounter::new()),
        }
    }

    /// Creates an orchestrator, resolving the provider from the
    /// configured provider name.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::UnsupportedProvider`] for unknown provider
    /// names. This is the only point where the pipeline surfaces errors;
    /// once constructed, [`Orchestrator::process`] is infallible.
    pub fn from_config(config: OrchestratorConfig) -> Result<Self, AgentError> {
        let provider = create_provider(&config)?;
        Ok(Self::new(provider, config))
    }

    /// Retrieves documents for `query` from `store`, then analyzes them.
    ///
    /// Retrieval failure is reported as user-visible text, matching the
    /// pipeline's no-propagation policy.
    pub async fn answer(
        &self,
        store: &dyn DocumentStore,
        query: &str,
        observer: Arc<dyn ProgressObserver>,
    ) -> String {
        match store.retrieve(query).await {
            Ok(documents) => self.process(documents, query, observer).await,
            Err(e) => {
                error!(error = %e, "document retrieval failed");
                format!("Document retrieval failed: {e}")
            }
        }
    }

    /// Executes the full analysis pipeline and returns the final answer.
    ///
    /// # Steps
    ///
    /// 1. Empty input short-circuits to [`NOTHING_TO_ANALYZE`]
    /// 2. Partition documents into up to `agent_count` groups
    /// 3. Fan out agents under the `max_parallel_requests` semaphore
    /// 4. Join every agent (successes and failures both settle)
    /// 5. Synthesize surviving analyses, or [`NO_VALID_ANALYSIS`]
    ///
    /// Progress events are emitted in completion order; the synthesis
    /// input is assembled in agent-index order regardless. Never returns
    /// an error: unexpected failures are logged and converted to text.
    pub async fn process(
        &self,
        documents: Vec<Document>,
        query: &str,
        observer: Arc<dyn ProgressObserver>,
    ) -> String {
        match self.run_pipeline(documents, query, observer).await {
            Ok(answer) => answer,
            Err(e) => {
                error!(error = %e, "analysis pipeline failed unexpectedly");
                format!("The analysis pipeline failed unexpectedly: {e}")
            }
        }
    }

    async fn run_pipeline(
        &self,
        documents: Vec<Document>,
        query: &str,
        observer: Arc<dyn ProgressObserver>,
    ) -> Result<String, AgentError> {
        if documents.is_empty() {
            return Ok(NOTHING_TO_ANALYZE.to_string());
        }

        let start = Instant::now();
        let document_count = documents.len();

        // Partitioning guarantees non-empty groups; the filter enforces
        // the dispatch invariant even if that ever changes.
        let groups: Vec<DocumentGroup> = partition_documents(documents, self.config.agent_count)
            .into_iter()
            .filter(|g| !g.is_empty())
            .collect();
        let total = groups.len();

        observer.notify(ProgressEvent {
            completed: 0,
            total,
            message: Some(format!(
                "Partitioned {document_count} documents into {total} agent groups"
            )),
        });

        let outcomes = self.fan_out(groups, query, &observer).await;

        let mut usage = TokenUsage::default();
        for outcome in &outcomes {
            if let AgentOutcome::Analysis { usage: u, .. } = outcome {
                usage.absorb(*u);
            }
        }

        let failed = outcomes.iter().filter(|o| o.is_failed()).count();

        // Synthesis input keeps agent-index order: outcomes are joined in
        // dispatch order, so provenance labels stay traceable.
        let analyses: Vec<AgentAnalysis> = outcomes
            .into_iter()
            .filter_map(AgentOutcome::into_analysis)
            .collect();

        debug!(
            agents = total,
            failed,
            agent_tokens = usage.total_tokens,
            elapsed = ?start.elapsed(),
            "agents settled"
        );

        if analyses.is_empty() {
            observer.notify(ProgressEvent {
                completed: total,
                total,
                message: Some("All analysis agents failed".to_string()),
            });
            return Ok(NO_VALID_ANALYSIS.to_string());
        }

        let answer = synthesize(
            &*self.provider,
            &self.config,
            &self.counter,
            &analyses,
            query,
        )
        .await;

        observer.notify(ProgressEvent {
            completed: total,
            total,
            message: Some(if self.config.show_agent_details {
                format!(
                    "Synthesis complete ({} of {total} agents succeeded, {} analysis tokens)",
                    total - failed,
                    usage.total_tokens
                )
            } else {
                "Synthesis complete".to_string()
            }),
        });

        Ok(answer)
    }

    /// Fans out one agent per group under the parallelism cap.
    ///
    /// The semaphore admits up to `max_parallel_requests` in-flight
    /// agents; the rest queue for a slot rather than waiting on a wave.
    /// This is a strict join: results are collected for every dispatched
    /// agent, in dispatch order, after each reaches a terminal state.
    async fn fan_out(
        &self,
        groups: Vec<DocumentGroup>,
        query: &str,
        observer: &Arc<dyn ProgressObserver>,
    ) -> Vec<AgentOutcome> {
        let total = groups.len();
        let semaphore = Arc::new(Semaphore::new(self.config.max_parallel_requests));
        let completed = Arc::new(AtomicUsize::new(0));
        let query: Arc<str> = Arc::from(query);

        let mut handles = Vec::with_capacity(total);

        for (agent_id, group) in groups.into_iter().enumerate() {
            let sem = Arc::clone(&semaphore);
            let provider = Arc::clone(&self.provider);
            let config = Arc::clone(&self.config);
            let counter = Arc::clone(&self.counter);
            let observer = Arc::clone(observer);
            let completed = Arc::clone(&completed);
            let query = Arc::clone(&query);

            handles.push(tokio::spawn(async move {
                let outcome = match sem.acquire().await {
                    Ok(_permit) => {
                        run_agent(&*provider, &config, &counter, &group, agent_id, &query).await
                    }
                    Err(e) => {
                        // Closed semaphore means the runtime is tearing
                        // down; settle this agent as failed.
                        error!(agent_id, error = %e, "semaphore closed before dispatch");
                        AgentOutcome::Failed { agent_id }
                    }
                };

                let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                let message = if config.show_agent_details {
                    Some(match &outcome {
                        AgentOutcome::Analysis { text, .. } => {
                            format!("Agent #{agent_id} analysis:\n{text}")
                        }
                        AgentOutcome::Failed { .. } => {
                            format!("Agent #{agent_id} failed after retries")
                        }
                    })
                } else {
                    None
                };
                observer.notify(ProgressEvent {
                    completed: done,
                    total,
                    message,
                });

                outcome
            }));
        }

        let mut outcomes = Vec::with_capacity(total);
        for (agent_id, handle) in handles.into_iter().enumerate() {
            match handle.await {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => {
                    error!(agent_id, error = %e, "agent task aborted");
                    outcomes.push(AgentOutcome::Failed { agent_id });
                }
            }
        }

        debug_assert_eq!(outcomes.len(), total, "every dispatched agent must settle");
        outcomes
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("provider", &self.provider.name())
            .field("config", &self.config)
            .finish()
    }
}
