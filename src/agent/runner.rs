//! Analysis agent runner.
//!
//! Runs one bounded-context analysis agent over its document group:
//! formats the group under the per-request token ceiling, invokes the
//! inference service with retry and backoff, and degrades terminal
//! failure to a sentinel instead of an error. Failures here never abort
//! sibling agents or the orchestrator.

use async_trait::async_trait;
use tracing::{debug, error, warn};

use super::config::OrchestratorConfig;
use super::format::format_group;
use super::message::TokenUsage;
use super::prompt::analysis_system_prompt;
use super::provider::LlmProvider;
use super::synthesizer::AgentAnalysis;
use super::traits::{Agent, execute_with_retry};
use crate::document::DocumentGroup;
use crate::tokens::TokenCounter;

/// Terminal result of one analysis agent.
#[derive(Debug, Clone)]
pub enum AgentOutcome {
    /// The agent produced an analysis of its document group.
    Analysis {
        /// Index of the agent that produced this analysis.
        agent_id: usize,
        /// The analysis text.
        text: String,
        /// Token usage for the successful call.
        usage: TokenUsage,
    },
    /// The agent failed after exhausting its retries (or had nothing to
    /// analyze once formatting dropped everything).
    Failed {
        /// Index of the failed agent.
        agent_id: usize,
    },
}

impl AgentOutcome {
    /// Whether this outcome is a terminal failure.
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Converts a successful outcome into synthesis input; `None` for
    /// failures and blank analyses.
    #[must_use]
    pub fn into_analysis(self) -> Option<AgentAnalysis> {
        match self {
            Self::Analysis { agent_id, text, .. } if !text.trim().is_empty() => {
                Some(AgentAnalysis { agent_id, text })
            }
            _ => None,
        }
    }
}

/// Agent that analyzes one chronological slice of the corpus.
struct AnalysisAgent {
    model: String,
    max_tokens: u32,
    system_prompt: String,
}

impl AnalysisAgent {
    fn new(config: &OrchestratorConfig, agent_id: usize, query: &str) -> Self {
        Self {
            model: config.analyzer_model.clone(),
            max_tokens: config.analyzer_output_tokens,
            system_prompt: analysis_system_prompt(agent_id, query),
        }
    }
}

#[async_trait]
impl Agent for AnalysisAgent {
    fn name(&self) -> &'static str {
        "analysis"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    fn temperature(&self) -> f32 {
        0.1
    }

    fn max_tokens(&self) -> u32 {
        self.max_tokens
    }
}

/// Runs one analysis agent over its document group.
///
/// An empty formatted group returns [`AgentOutcome::Failed`] without any
/// inference call. Otherwise the call is retried per the shared backoff
/// policy with the analysis timeout (T1); exhausting the retry budget
/// logs the terminal failure and returns the failure sentinel.
pub async fn run_agent(
    provider: &dyn LlmProvider,
    config: &OrchestratorConfig,
    counter: &TokenCounter,
    group: &DocumentGroup,
    agent_id: usize,
    query: &str,
) -> AgentOutcome {
    let formatted = format_group(&group.documents, config.max_tokens_per_request, counter);
    if formatted.trim().is_empty() {
        warn!(
            agent_id,
            group_size = group.len(),
            "no document content fit the request budget, skipping inference"
        );
        return AgentOutcome::Failed { agent_id };
    }

    let agent = AnalysisAgent::new(config, agent_id, query);

    match execute_with_retry(
        &agent,
        provider,
        &formatted,
        config.analysis_timeout,
        config.max_retries,
    )
    .await
    {
        Ok(response) => {
            debug!(
                agent_id,
                tokens = response.usage.total_tokens,
                "analysis agent completed"
            );
            AgentOutcome::Analysis {
                agent_id,
                text: response.content,
                usage: response.usage,
            }
        }
        Err(e) => {
            error!(
                agent_id,
                max_retries = config.max_retries,
                error = %e,
                "analysis agent failed after exhausting retries"
            );
            AgentOutcome::Failed { agent_id }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_into_analysis() {
        let outcome = AgentOutcome::Analysis {
            agent_id: 1,
            text: "found things".to_string(),
            usage: TokenUsage::default(),
        };
        let analysis = outcome.into_analysis();
        assert!(analysis.is_some());
        let analysis = analysis.unwrap_or_else(|| unreachable!());
        assert_eq!(analysis.agent_id, 1);
        assert_eq!(analysis.text, "found things");
    }

    #[test]
    fn test_blank_analysis_filtered() {
        let outcome = AgentOutcome::Analysis {
            agent_id: 0,
            text: "   \n".to_string(),
            usage: TokenUsage::default(),
        };
        assert!(outcome.into_analysis().is_none());
    }

    #[test]
    fn test_failed_outcome() {
        let outcome = AgentOutcome::Failed { agent_id: 4 };
        assert!(outcome.is_failed());
        assert!(outcome.into_analysis().is_none());
    }

    #[test]
    fn test_analysis_agent_properties() {
        let config = OrchestratorConfig::builder()
            .api_key("test")
            .analyzer_model("gpt-4o")
            .analyzer_output_tokens(1024)
            .build()
            .unwrap_or_else(|_| unreachable!());
        let agent = AnalysisAgent::new(&config, 2, "what changed?");
        assert_eq!(agent.name(), "analysis");
        assert_eq!(agent.model(), "gpt-4o");
        assert_eq!(agent.max_tokens(), 1024);
        assert!(agent.system_prompt().contains("agent #2"));
        assert!(agent.system_prompt().contains("what changed?"));
        assert!((agent.temperature() - 0.1).abs() < f32::EPSILON);
    }
}
