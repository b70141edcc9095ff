//! Token accounting for prompt budgets.
//!
//! Counts tokens with the `cl100k_base` tokenizer and truncates text to a
//! budget, preferring sentence boundaries. Both operations are infallible:
//! tokenizer failures fall back to a 4-characters-per-token heuristic so
//! budget enforcement never aborts the pipeline.

use tiktoken_rs::{CoreBPE, cl100k_base};
use tracing::warn;

/// Fallback characters-per-token ratio when no tokenizer is available.
const CHARS_PER_TOKEN: usize = 4;

/// Fraction of the truncated text past which a trailing period is treated
/// as a sentence boundary worth cutting at. Below this, cutting would drop
/// too much content, so the dangling partial sentence is kept.
const SENTENCE_CUT_RATIO: f64 = 0.7;

/// Infallible token counter and truncator.
///
/// Holds the BPE tokenizer when it loaded successfully; otherwise every
/// operation uses the character-count heuristic.
pub struct TokenCounter {
    bpe: Option<CoreBPE>,
}

impl TokenCounter {
    /// Creates a counter, loading the `cl100k_base` tokenizer.
    ///
    /// Tokenizer load failure is logged and degrades to the heuristic;
    /// it never fails construction.
    #[must_use]
    pub fn new() -> Self {
        let bpe = match cl100k_base() {
            Ok(bpe) => Some(bpe),
            Err(e) => {
                warn!(error = %e, "tokenizer unavailable, using character heuristic");
                None
            }
        };
        Self { bpe }
    }

    /// Returns the estimated token count for `text`. Never fails.
    #[must_use]
    pub fn count_tokens(&self, text: &str) -> usize {
        self.bpe.as_ref().map_or_else(
            || text.len() / CHARS_PER_TOKEN,
            |bpe| bpe.encode_with_special_tokens(text).len(),
        )
    }

    /// Truncates `text` so its estimated token count is at most `max_tokens`.
    ///
    /// Text already within budget is returned unchanged. Otherwise the
    /// first `max_tokens` tokens are decoded back to text and, when the
    /// last period falls past 70% of that text, the dangling partial
    /// sentence after it is dropped. Without a tokenizer the result is a
    /// byte-bounded slice of at most `max_tokens * 4` bytes. Never fails.
    #[must_use]
    pub fn truncate_to_limit(&self, text: &str, max_tokens: usize) -> String {
        if self.count_tokens(text) <= max_tokens {
            return text.to_string();
        }

        self.decode_prefix(text, max_tokens)
            .map_or_else(|| char_slice(text, max_tokens), |t| cut_at_sentence(&t))
    }

    /// Decodes the first `max_tokens` tokens of `text`.
    ///
    /// A token prefix can end mid-character, in which case decoding the
    /// full prefix fails; trailing tokens are dropped until the remainder
    /// decodes cleanly, so the result never exceeds `max_tokens` tokens.
    /// `None` only when no tokenizer is available.
    fn decode_prefix(&self, text: &str, max_tokens: usize) -> Option<String> {
        let bpe = self.bpe.as_ref()?;
        let mut tokens = bpe.encode_with_special_tokens(text);
        tokens.truncate(max_tokens);
        while !tokens.is_empty() {
            if let Ok(decoded) = bpe.decode(tokens.clone()) {
                return Some(decoded);
            }
            tokens.pop();
        }
        Some(String::new())
    }
}

impl Default for TokenCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TokenCounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCounter")
            .field("tokenizer", &self.bpe.as_ref().map(|_| "cl100k_base"))
            .finish()
    }
}

/// Drops the partial sentence after the last period when that period sits
/// past [`SENTENCE_CUT_RATIO`] of the text; otherwise keeps the text as-is.
fn cut_at_sentence(truncated: &str) -> String {
    #[allow(clippy::cast_precision_loss)]
    match truncated.rfind('.') {
        Some(pos) if (pos as f64) > truncated.len() as f64 * SENTENCE_CUT_RATIO => {
            truncated[..=pos].to_string()
        }
        _ => truncated.to_string(),
    }
}

/// Byte-bounded fallback slice for when no tokenizer is available. Bounds
/// bytes rather than characters so the `len / 4` heuristic estimate of the
/// result stays within `max_tokens` even on multi-byte content.
fn char_slice(text: &str, max_tokens: usize) -> String {
    let max_bytes = max_tokens.saturating_mul(CHARS_PER_TOKEN);
    let mut out = String::new();
    for c in text.chars() {
        if out.len() + c.len_utf8() > max_bytes {
            break;
        }
        out.push(c);
    }
    out
}
