//! Error types for the analysis pipeline.
//!
//! Per-agent call failures are transient by design: the runner retries
//! them with backoff and degrades to a failure sentinel rather than
//! propagating. Only construction-time and truly unexpected conditions
//! surface as errors past the orchestrator boundary.

use thiserror::Error;

/// Errors produced by the agent pipeline.
#[derive(Debug, Error)]
pub enum AgentError {
    /// No API key was provided or found in the environment.
    #[error("API key missing: set FORUM_API_KEY or pass one to the config builder")]
    ApiKeyMissing,

    /// The configured provider name is not recognized.
    #[error("Unsupported provider: {name}")]
    UnsupportedProvider {
        /// The unrecognized provider name.
        name: String,
    },

    /// Transport-level or API-level request failure.
    #[error("API request failed: {message}")]
    ApiRequest {
        /// Provider error description.
        message: String,
        /// HTTP status code when available.
        status: Option<u16>,
    },

    /// The inference call exceeded its request timeout.
    #[error("Inference call timed out after {seconds}s")]
    Timeout {
        /// Configured timeout in seconds.
        seconds: u64,
    },

    /// The provider returned a response with no usable content.
    #[error("Empty response from provider for agent '{agent}'")]
    EmptyResponse {
        /// Name of the agent that received the empty response.
        agent: String,
    },

    /// Document formatting failed.
    ///
    /// Unreachable in practice: rendering is infallible and documents
    /// that overflow the budget are dropped, not failed. Kept so the
    /// formatting stage stays represented in the error taxonomy alongside
    /// [`AgentError::Partition`].
    #[error("Formatting failed: {message}")]
    Formatting {
        /// What went wrong while rendering the document group.
        message: String,
    },

    /// Document partitioning failed on malformed metadata.
    ///
    /// Unreachable in practice: missing or unparseable timestamps default
    /// to the minimum representable instant instead of failing.
    #[error("Partitioning failed: {message}")]
    Partition {
        /// What went wrong while partitioning.
        message: String,
    },

    /// Invalid configuration detected at orchestrator construction.
    #[error("Invalid configuration: {message}")]
    Configuration {
        /// Which configuration constraint was violated.
        message: String,
    },

    /// Catch-all for unexpected pipeline failures.
    #[error("Orchestration error: {message}")]
    Orchestration {
        /// Description of the unexpected failure.
        message: String,
    },
}

impl AgentError {
    /// Whether this error should be retried with backoff.
    ///
    /// Timeouts, transport failures, and empty responses are transient;
    /// everything else is terminal for the current attempt.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::ApiRequest { .. } | Self::Timeout { .. } | Self::EmptyResponse { .. }
        )
    }
}
