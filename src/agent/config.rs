//! Orchestrator configuration with builder pattern and environment variable support.
//!
//! Configuration is resolved in order: explicit values → environment variables → defaults.
//! All limits are validated once at [`OrchestratorConfigBuilder::build`]; nothing in the
//! pipeline reads ambient process state after construction.

use std::time::Duration;

use crate::error::AgentError;

/// Default number of analysis agents.
const DEFAULT_AGENT_COUNT: usize = 3;
/// Default cap on simultaneously in-flight inference calls.
const DEFAULT_MAX_PARALLEL_REQUESTS: usize = 5;
/// Default token ceiling for one analysis request's formatted documents.
const DEFAULT_MAX_TOKENS_PER_REQUEST: usize = 14_000;
/// Default token ceiling for the combined analyses fed to the synthesizer.
const DEFAULT_MAX_SYNTHESIS_TOKENS: usize = 10_000;
/// Default total call attempts per agent before degrading to failure.
const DEFAULT_MAX_RETRIES: u32 = 3;
/// Default analyzer response cap.
const DEFAULT_ANALYZER_OUTPUT_TOKENS: u32 = 4096;
/// Default synthesizer response cap.
const DEFAULT_SYNTHESIZER_OUTPUT_TOKENS: u32 = 4096;
/// Default analysis request timeout (T1) in seconds.
const DEFAULT_ANALYSIS_TIMEOUT_SECS: u64 = 120;
/// Default synthesis request timeout (T2) in seconds. Shorter than T1:
/// the synthesis prompt is smaller and bounded by `max_synthesis_tokens`.
const DEFAULT_SYNTHESIS_TIMEOUT_SECS: u64 = 60;

/// Configuration for the analysis orchestrator.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// LLM provider name (e.g., "openai").
    pub provider: String,
    /// API key for the provider.
    pub api_key: String,
    /// Optional base URL override (for proxies or compatible APIs).
    pub base_url: Option<String>,
    /// Model for the analysis agents (larger context window).
    pub analyzer_model: String,
    /// Model for the synthesizer agent.
    pub synthesizer_model: String,
    /// Number of analysis agents to partition documents across.
    pub agent_count: usize,
    /// Maximum simultaneously in-flight inference calls.
    pub max_parallel_requests: usize,
    /// Token ceiling for one analysis request's formatted documents.
    pub max_tokens_per_request: usize,
    /// Token ceiling for the combined analyses fed to the synthesizer.
    pub max_synthesis_tokens: usize,
    /// Total call attempts per agent before degrading to failure.
    pub max_retries: u32,
    /// Maximum tokens an analysis agent may generate.
    pub analyzer_output_tokens: u32,
    /// Maximum tokens the synthesizer may generate.
    pub synthesizer_output_tokens: u32,
    /// Request timeout for analysis calls (T1).
    pub analysis_timeout: Duration,
    /// Request timeout for the synthesis call (T2, at most T1).
    pub synthesis_timeout: Duration,
    /// Emit each agent's full analysis text through the progress observer.
    pub show_agent_details: bool,
}

impl OrchestratorConfig {
    /// Creates a new builder for `OrchestratorConfig`.
    #[must_use]
    pub fn builder() -> OrchestratorConfigBuilder {
        OrchestratorConfigBuilder::default()
    }

    /// Creates configuration from environment variables with defaults.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::ApiKeyMissing`] if no API key is found.
    pub fn from_env() -> Result<Self, AgentError> {
        Self::builder().from_env().build()
    }
}

/// Builder for [`OrchestratorConfig`].
#[derive(Debug, Clone, Default)]
pub struct OrchestratorConfigBuilder {
    provider: Option<String>,
    api_key: Option<String>,
    base_url: Option<String>,
    analyzer_model: Option<String>,
    synthesizer_model: Option<String>,
    agent_count: Option<usize>,
    max_parallel_requests: Option<usize>,
    max_tokens_per_request: Option<usize>,
    max_synthesis_tokens: Option<usize>,
    max_retries: Option<u32>,
    analyzer_output_tokens: Option<u32>,
    synthesizer_output_tokens: Option<u32>,
    analysis_timeout: Option<Duration>,
    synthesis_timeout: Option<Duration>,
    show_agent_details: Option<bool>,
}

impl OrchestratorConfigBuilder {
    /// Populates unset fields from environment variables.
    #[must_use]
    pub fn from_env(mut self) -> Self {
        if self.provider.is_none() {
            self.provider = std::env::var("FORUM_PROVIDER").ok();
        }
        if self.api_key.is_none() {
            self.api_key = std::env::var("OPENAI_API_KEY")
                .or_else(|_| std::env::var("FORUM_API_KEY"))
                .ok();
        }
        if self.base_url.is_none() {
            self.base_url = std::env::var("OPENAI_BASE_URL")
                .or_else(|_| std::env::var("FORUM_BASE_URL"))
                .ok();
        }
        if self.analyzer_model.is_none() {
            self.analyzer_model = std::env::var("FORUM_ANALYZER_MODEL").ok();
        }
        if self.synthesizer_model.is_none() {
            self.synthesizer_model = std::env::var("FORUM_SYNTHESIZER_MODEL").ok();
        }
        if self.agent_count.is_none() {
            self.agent_count = std::env::var("FORUM_AGENT_COUNT")
                .ok()
                .and_then(|v| v.parse().ok());
        }
        if self.max_parallel_requests.is_none() {
            self.max_parallel_requests = std::env::var("FORUM_MAX_PARALLEL_REQUESTS")
                .ok()
                .and_then(|v| v.parse().ok());
        }
        if self.show_agent_details.is_none() {
            self.show_agent_details = std::env::var("FORUM_SHOW_AGENT_DETAILS")
                .ok()
                .and_then(|v| v.parse().ok());
        }
        self
    }

    /// Sets the LLM provider name.
    #[must_use]
    pub fn provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Sets the API key.
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the base URL override.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the analyzer model.
    #[must_use]
    pub fn analyzer_model(mut self, model: impl Into<String>) -> Self {
        self.analyzer_model = Some(model.into());
        self
    }

    /// Sets the synthesizer model.
    #[must_use]
    pub fn synthesizer_model(mut self, model: impl Into<String>) -> Self {
        self.synthesizer_model = Some(model.into());
        self
    }

    /// Sets the number of analysis agents.
    #[must_use]
    pub const fn agent_count(mut self, n: usize) -> Self {
        self.agent_count = Some(n);
        self
    }

    /// Sets the cap on simultaneously in-flight inference calls.
    #[must_use]
    pub const fn max_parallel_requests(mut self, n: usize) -> Self {
        self.max_parallel_requests = Some(n);
        self
    }

    /// Sets the token ceiling per analysis request.
    #[must_use]
    pub const fn max_tokens_per_request(mut self, n: usize) -> Self {
        self.max_tokens_per_request = Some(n);
        self
    }

    /// Sets the token ceiling for the synthesis input.
    #[must_use]
    pub const fn max_synthesis_tokens(mut self, n: usize) -> Self {
        self.max_synthesis_tokens = Some(n);
        self
    }

    /// Sets the total call attempts per agent.
    #[must_use]
    pub const fn max_retries(mut self, n: u32) -> Self {
        self.max_retries = Some(n);
        self
    }

    /// Sets the analyzer response cap.
    #[must_use]
    pub const fn analyzer_output_tokens(mut self, n: u32) -> Self {
        self.analyzer_output_tokens = Some(n);
        self
    }

    /// Sets the synthesizer response cap.
    #[must_use]
    pub const fn synthesizer_output_tokens(mut self, n: u32) -> Self {
        self.synthesizer_output_tokens = Some(n);
        self
    }

    /// Sets the analysis request timeout (T1).
    #[must_use]
    pub const fn analysis_timeout(mut self, duration: Duration) -> Self {
        self.analysis_timeout = Some(duration);
        self
    }

    /// Sets the synthesis request timeout (T2).
    #[must_use]
    pub const fn synthesis_timeout(mut self, duration: Duration) -> Self {
        self.synthesis_timeout = Some(duration);
        self
    }

    /// Toggles per-agent analysis text in progress events.
    #[must_use]
    pub const fn show_agent_details(mut self, enabled: bool) -> Self {
        self.show_agent_details = Some(enabled);
        self
    }

    /// Builds the [`OrchestratorConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::ApiKeyMissing`] if no API key was set, or
    /// [`AgentError::Configuration`] when a limit is zero or the synthesis
    /// timeout exceeds the analysis timeout.
    pub fn build(self) -> Result<OrchestratorConfig, AgentError> {
        let api_key = self.api_key.ok_or(AgentError::ApiKeyMissing)?;

        let config = OrchestratorConfig {
            provider: self.provider.unwrap_or_else(|| "openai".to_string()),
            api_key,
            base_url: self.base_url,
            analyzer_model: self.analyzer_model.unwrap_or_else(|| "gpt-4o".to_string()),
            synthesizer_model: self
                .synthesizer_model
                .unwrap_or_else(|| "gpt-4o-mini".to_string()),
            agent_count: self.agent_count.unwrap_or(DEFAULT_AGENT_COUNT),
            max_parallel_requests: self
                .max_parallel_requests
                .unwrap_or(DEFAULT_MAX_PARALLEL_REQUESTS),
            max_tokens_per_request: self
                .max_tokens_per_request
                .unwrap_or(DEFAULT_MAX_TOKENS_PER_REQUEST),
            max_synthesis_tokens: self
                .max_synthesis_tokens
                .unwrap_or(DEFAULT_MAX_SYNTHESIS_TOKENS),
            max_retries: self.max_retries.unwrap_or(DEFAULT_MAX_RETRIES),
            analyzer_output_tokens: self
                .analyzer_output_tokens
                .unwrap_or(DEFAULT_ANALYZER_OUTPUT_TOKENS),
            synthesizer_output_tokens: self
                .synthesizer_output_tokens
                .unwrap_or(DEFAULT_SYNTHESIZER_OUTPUT_TOKENS),
            analysis_timeout: self
                .analysis_timeout
                .unwrap_or(Duration::from_secs(DEFAULT_ANALYSIS_TIMEOUT_SECS)),
            synthesis_timeout: self
                .synthesis_timeout
                .unwrap_or(Duration::from_secs(DEFAULT_SYNTHESIS_TIMEOUT_SECS)),
            show_agent_details: self.show_agent_details.unwrap_or(false),
        };

        validate(&config)?;
        Ok(config)
    }
}

/// Rejects limits the pipeline cannot run with.
fn validate(config: &OrchestratorConfig) -> Result<(), AgentError> {
    fn nonzero(value: usize, name: &str) -> Result<(), AgentError> {
        if value == 0 {
            return Err(AgentError::Configuration {
                message: format!("{name} must be >= 1"),
            });
        }
        Ok(())
    }

    nonzero(config.agent_count, "agent_count")?;
    nonzero(config.max_parallel_requests, "max_parallel_requests")?;
    nonzero(config.max_tokens_per_request, "max_tokens_per_request")?;
    nonzero(config.max_synthesis_tokens, "max_synthesis_tokens")?;

    if config.max_retries == 0 {
        return Err(AgentError::Configuration {
            message: "max_retries must be >= 1".to_string(),
        });
    }

    if config.synthesis_timeout > config.analysis_timeout {
        return Err(AgentError::Configuration {
            message: format!(
                "synthesis_timeout ({:?}) must not exceed analysis_timeout ({:?})",
                config.synthesis_timeout, config.analysis_timeout
            ),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = OrchestratorConfig::builder()
            .api_key("test-key")
            .build()
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(config.provider, "openai");
        assert_eq!(config.api_key, "test-key");
        assert_eq!(config.agent_count, DEFAULT_AGENT_COUNT);
        assert_eq!(config.max_parallel_requests, DEFAULT_MAX_PARALLEL_REQUESTS);
        assert_eq!(config.max_tokens_per_request, 14_000);
        assert_eq!(config.max_synthesis_tokens, 10_000);
        assert_eq!(config.max_retries, 3);
        assert!(!config.show_agent_details);
        assert!(config.synthesis_timeout <= config.analysis_timeout);
    }

    #[test]
    fn test_builder_missing_api_key() {
        let result = OrchestratorConfig::builder().build();
        assert!(matches!(result, Err(AgentError::ApiKeyMissing)));
    }

    #[test]
    fn test_builder_custom_values() {
        let config = OrchestratorConfig::builder()
            .api_key("key")
            .provider("custom")
            .analyzer_model("gpt-4o-mini")
            .agent_count(7)
            .max_parallel_requests(2)
            .analysis_timeout(Duration::from_secs(30))
            .synthesis_timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(config.provider, "custom");
        assert_eq!(config.analyzer_model, "gpt-4o-mini");
        assert_eq!(config.agent_count, 7);
        assert_eq!(config.max_parallel_requests, 2);
        assert_eq!(config.analysis_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_zero_agent_count_rejected() {
        let result = OrchestratorConfig::builder()
            .api_key("key")
            .agent_count(0)
            .build();
        assert!(matches!(result, Err(AgentError::Configuration { .. })));
    }

    #[test]
    fn test_zero_retries_rejected() {
        let result = OrchestratorConfig::builder()
            .api_key("key")
            .max_retries(0)
            .build();
        assert!(matches!(result, Err(AgentError::Configuration { .. })));
    }

    #[test]
    fn test_synthesis_timeout_longer_than_analysis_rejected() {
        let result = OrchestratorConfig::builder()
            .api_key("key")
            .analysis_timeout(Duration::from_secs(10))
            .synthesis_timeout(Duration::from_secs(20))
            .build();
        assert!(matches!(result, Err(AgentError::Configuration { .. })));
    }
}
