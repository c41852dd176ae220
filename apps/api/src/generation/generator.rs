//! Pair generation: turns a free-text category into a validated deck of word pairs.
//!
//! Flow: validate request → build instruction → one upstream call → parse lines →
//!       validate + dedup → truncate to count → apply count policy.
//!
//! The generator keeps no state between calls and never retries the upstream.

use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::PairSettings;
use crate::generation::error::GenerationError;
use crate::generation::pairs::{parse_pairs, PairCollection};
use crate::generation::prompts::build_pair_prompt;
use crate::llm_client::{LlmError, TextGenerator};

/// How strictly the requested pair count is enforced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PairCountPolicy {
    /// Any non-empty result of at most `count` pairs is a success.
    #[default]
    AtMost,
    /// Fewer than `count` usable pairs is an `InsufficientPairs` failure.
    Exact,
}

impl FromStr for PairCountPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "at_most" | "at-most" => Ok(PairCountPolicy::AtMost),
            "exact" => Ok(PairCountPolicy::Exact),
            other => Err(format!("unknown pair count policy '{other}' (expected at_most or exact)")),
        }
    }
}

/// Produces `PairCollection`s from an upstream `TextGenerator`.
#[derive(Clone)]
pub struct PairGenerator {
    upstream: Arc<dyn TextGenerator>,
    settings: PairSettings,
}

impl PairGenerator {
    pub fn new(upstream: Arc<dyn TextGenerator>, settings: PairSettings) -> Self {
        Self { upstream, settings }
    }

    pub fn default_count(&self) -> i64 {
        self.settings.default_count
    }

    /// Upper bound on pairs per deck, generated or client-supplied.
    pub fn max_count(&self) -> i64 {
        self.settings.max_count
    }

    /// Generates at most `count` distinct pairs for `category`.
    ///
    /// Errors:
    /// - `InvalidRequest`: blank category, `count` ≤ 0 or above the configured maximum
    /// - `UpstreamUnavailable`: transport failure or non-success status
    /// - `NoValidPairs`: the upstream answered but no line survived validation
    /// - `InsufficientPairs`: `Exact` policy only
    pub async fn generate(
        &self,
        category: &str,
        count: i64,
    ) -> Result<PairCollection, GenerationError> {
        let (category, count) = self.validate_request(category, count)?;

        let instruction = build_pair_prompt(category, count);
        let raw = match self.upstream.generate_text(&instruction).await {
            Ok(text) => text,
            // The upstream answered, just with nothing usable in it.
            Err(LlmError::EmptyContent) => String::new(),
            Err(e) => {
                warn!("Pair generation for {category:?} failed upstream: {e}");
                return Err(GenerationError::UpstreamUnavailable(e));
            }
        };

        let outcome = parse_pairs(&raw);
        let mut pairs = outcome.pairs;
        pairs.truncate(count);

        info!(
            "Generated {} of {} requested pairs for {:?} ({} lines, {} rejected, {} duplicates)",
            pairs.len(),
            count,
            category,
            outcome.lines_seen,
            outcome.lines_rejected,
            outcome.duplicates
        );

        if pairs.is_empty() {
            return Err(GenerationError::NoValidPairs);
        }

        if self.settings.policy == PairCountPolicy::Exact && pairs.len() < count {
            return Err(GenerationError::InsufficientPairs {
                requested: count,
                produced: pairs.len(),
            });
        }

        Ok(pairs)
    }

    fn validate_request<'a>(
        &self,
        category: &'a str,
        count: i64,
    ) -> Result<(&'a str, usize), GenerationError> {
        let category = category.trim();
        if category.is_empty() {
            return Err(GenerationError::InvalidRequest(
                "category cannot be empty".to_string(),
            ));
        }
        if count <= 0 {
            return Err(GenerationError::InvalidRequest(format!(
                "num_pairs must be positive, got {count}"
            )));
        }
        if count > self.settings.max_count {
            return Err(GenerationError::InvalidRequest(format!(
                "num_pairs must be at most {}, got {count}",
                self.settings.max_count
            )));
        }
        let count = usize::try_from(count)
            .map_err(|_| GenerationError::InvalidRequest(format!("num_pairs {count} is too large")))?;
        Ok((category, count))
    }
}
