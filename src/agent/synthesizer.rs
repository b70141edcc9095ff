//! Synthesizer agent for merging agent analyses.
//!
//! Takes the valid analyses produced by the analysis agents and merges
//! them into one final answer via a second inference call. Synthesis
//! failure is always user-visible text, never a propagated error.

use async_trait::async_trait;
use tracing::{debug, error};

use super::config::OrchestratorConfig;
use super::prompt::{SYNTHESIZER_SYSTEM_PROMPT, build_synthesis_input, synthesis_user_message};
use super::provider::LlmProvider;
use super::traits::{Agent, execute_with_retry};
use crate::tokens::TokenCounter;

/// Fixed reply when no valid analyses reached the synthesizer.
pub const NOTHING_TO_SYNTHESIZE: &str =
    "No agent analyses were available, so there is nothing to synthesize.";

/// Fixed reply when the synthesis call failed after exhausting retries.
pub const SYNTHESIS_FAILED: &str = "The agents produced analyses, but combining them into a \
     final answer failed repeatedly. Please try the question again.";

/// One valid analysis, tagged with the agent that produced it so the
/// synthesis transcript keeps provenance.
#[derive(Debug, Clone)]
pub struct AgentAnalysis {
    /// Index of the originating agent.
    pub agent_id: usize,
    /// The analysis text.
    pub text: String,
}

/// Agent that merges analyses into a final response.
struct SynthesizerAgent {
    model: String,
    max_tokens: u32,
}

impl SynthesizerAgent {
    fn new(config: &OrchestratorConfig) -> Self {
        Self {
            model: config.synthesizer_model.clone(),
            max_tokens: config.synthesizer_output_tokens,
        }
    }
}

#[async_trait]
impl Agent for SynthesizerAgent {
    fn name(&self) -> &'static str {
        "synthesizer"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn system_prompt(&self) -> &str {
        SYNTHESIZER_SYSTEM_PROMPT
    }

    fn temperature(&self) -> f32 {
        0.1
    }

    fn max_tokens(&self) -> u32 {
        self.max_tokens
    }
}

/// Merges `analyses` into one final answer.
///
/// Blank entries are filtered out; with nothing left the fixed
/// [`NOTHING_TO_SYNTHESIZE`] message is returned without any inference
/// call. The combined labeled block is truncated to the synthesis token
/// ceiling, and the call is retried per the shared backoff policy with
/// the synthesis timeout (T2). Exhausted retries degrade to the fixed
/// [`SYNTHESIS_FAILED`] message.
pub async fn synthesize(
    provider: &dyn LlmProvider,
    config: &OrchestratorConfig,
    counter: &TokenCounter,
    analyses: &[AgentAnalysis],
    query: &str,
) -> String {
    let valid: Vec<AgentAnalysis> = analyses
        .iter()
        .filter(|a| !a.text.trim().is_empty())
        .cloned()
        .collect();

    if valid.is_empty() {
        return NOTHING_TO_SYNTHESIZE.to_string();
    }

    let combined = build_synthesis_input(&valid);
    let combined = counter.truncate_to_limit(&combined, config.max_synthesis_tokens);
    let user_msg = synthesis_user_message(query, &combined);

    let agent = SynthesizerAgent::new(config);

    match execute_with_retry(
        &agent,
        provider,
        &user_msg,
        config.synthesis_timeout,
        config.max_retries,
    )
    .await
    {
        Ok(response) => {
            debug!(
                analyses = valid.len(),
                tokens = response.usage.total_tokens,
                "synthesis completed"
            );
            response.content
        }
        Err(e) => {
            error!(
                max_retries = config.max_retries,
                error = %e,
                "synthesis failed after exhausting retries"
            );
            SYNTHESIS_FAILED.to_string()
        }
    }
}
