//! Agent trait definition and the shared retry policy.
//!
//! Both agent roles (analysis, synthesizer) implement [`Agent`], which
//! provides a uniform interface for the orchestrator. Retry with
//! exponential backoff is a free function over the trait so both roles
//! share one tested policy.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::message::{ChatRequest, ChatResponse, system_message, user_message};
use super::provider::LlmProvider;
use crate::error::AgentError;

/// Response from an agent execution.
#[derive(Debug, Clone)]
pub struct AgentResponse {
    /// The agent's text output.
    pub content: String,
    /// Token usage for this call.
    pub usage: super::message::TokenUsage,
    /// Why the model stopped generating (e.g. `"stop"`, `"length"`).
    pub finish_reason: Option<String>,
}

/// Trait implemented by all agents in the system.
///
/// Agents encapsulate a specific role (analysis, synthesis) with a fixed
/// system prompt and model configuration. The orchestrator calls
/// [`Agent::execute`] to run the agent against a provider.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Agent name for logging and identification.
    fn name(&self) -> &'static str;

    /// Model identifier to use for this agent.
    fn model(&self) -> &str;

    /// System prompt that defines the agent's role and behavior.
    fn system_prompt(&self) -> &str;

    /// Sampling temperature (0.0 = deterministic, higher = more creative).
    fn temperature(&self) -> f32 {
        0.0
    }

    /// Maximum tokens for the response.
    fn max_tokens(&self) -> u32 {
        2048
    }

    /// Executes the agent with the given user message.
    ///
    /// Builds a [`ChatRequest`] from the agent's configuration and
    /// delegates to the provider.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] on API failures or response parsing errors.
    async fn execute(
        &self,
        provider: &dyn LlmProvider,
        user_msg: &str,
    ) -> Result<AgentResponse, AgentError> {
        let request = ChatRequest {
            model: self.model().to_string(),
            messages: vec![system_message(self.system_prompt()), user_message(user_msg)],
            temperature: Some(self.temperature()),
            max_tokens: Some(self.max_tokens()),
        };

        let response: ChatResponse = provider.chat(&request).await?;

        Ok(AgentResponse {
            content: response.content,
            usage: response.usage,
            finish_reason: response.finish_reason,
        })
    }
}

/// Backoff delay before retry number `attempt + 1`: `2^attempt` seconds
/// (1s, 2s, 4s, ...). The shift is capped so large retry budgets cannot
/// overflow.
#[must_use]
pub(crate) fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_secs(1_u64 << attempt.min(16))
}

/// Executes an agent with timeout and bounded retry.
///
/// Makes at most `max_retries` total call attempts. Each attempt is
/// wrapped in `request_timeout`; a timeout, transport failure, or empty
/// response counts as a failed attempt and is retried after a
/// [`backoff_delay`] sleep. Non-transient errors end the loop at once.
/// This is an explicit loop, not recursion, so the attempt count is a
/// visible invariant.
///
/// # Errors
///
/// Returns the last attempt's [`AgentError`] once the retry budget is
/// exhausted, or the first non-transient error. Callers degrade this to
/// their role's failure sentinel.
pub async fn execute_with_retry(
    agent: &dyn Agent,
    provider: &dyn LlmProvider,
    user_msg: &str,
    request_timeout: Duration,
    max_retries: u32,
) -> Result<AgentResponse, AgentError> {
    let mut attempt: u32 = 0;

    loop {
        let result = match tokio::time::timeout(request_timeout, agent.execute(provider, user_msg))
            .await
        {
            Err(_) => Err(AgentError::Timeout {
                seconds: request_timeout.as_secs(),
            }),
            Ok(Err(e)) => Err(e),
            Ok(Ok(response)) if response.content.trim().is_empty() => {
                Err(AgentError::EmptyResponse {
                    agent: agent.name().to_string(),
                })
            }
            Ok(Ok(response)) => Ok(response),
        };

        match result {
            Ok(response) => {
                if attempt > 0 {
                    debug!(agent = agent.name(), attempt, "call succeeded after retry");
                }
                return Ok(response);
            }
            Err(e) => {
                attempt += 1;
                if attempt >= max_retries || !e.is_transient() {
                    return Err(e);
                }
                let delay = backoff_delay(attempt - 1);
                warn!(
                    agent = agent.name(),
                    attempt,
                    delay_secs = delay.as_secs(),
                    error = %e,
                    "call failed, backing off before retry"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_schedule() {
        assert_eq!(backoff_delay(0), Duration::from_secs(1));
        assert_eq!(backoff_delay(1), Duration::from_secs(2));
        assert_eq!(backoff_delay(2), Duration::from_secs(4));
    }

    #[test]
    fn test_backoff_shift_is_capped() {
        assert_eq!(backoff_delay(64), Duration::from_secs(1 << 16));
    }
}
