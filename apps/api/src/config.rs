use std::num::NonZeroU32;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::generation::generator::PairCountPolicy;
use crate::layout::LayoutConfig;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub s3_bucket: String,
    pub s3_endpoint: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    pub upstream: UpstreamConfig,
    pub pairs: PairSettings,
    pub layout: LayoutConfig,
    pub port: u16,
    pub rust_log: String,
}

/// Connection settings for the upstream text generator.
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    pub api_key: String,
    pub api_base: String,
    pub model: String,
    pub timeout: Duration,
}

/// Request-shaping knobs for pair generation.
#[derive(Debug, Clone, Copy)]
pub struct PairSettings {
    pub default_count: i64,
    pub max_count: i64,
    pub policy: PairCountPolicy,
}

impl Default for PairSettings {
    fn default() -> Self {
        Self {
            default_count: 10,
            max_count: 50,
            policy: PairCountPolicy::AtMost,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup so it can be exercised without
    /// touching the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |key: &str| -> Result<String> {
            lookup(key)
                .with_context(|| format!("Required environment variable '{key}' is not set"))
        };

        let upstream = UpstreamConfig {
            api_key: require("GEMINI_API_KEY")?,
            api_base: lookup("GEMINI_API_BASE")
                .unwrap_or_else(|| crate::llm_client::DEFAULT_API_BASE.to_string()),
            model: lookup("GEMINI_MODEL")
                .unwrap_or_else(|| crate::llm_client::DEFAULT_MODEL.to_string()),
            timeout: Duration::from_secs(parse_or(&lookup, "UPSTREAM_TIMEOUT_SECS", 15u64)?),
        };

        let defaults = PairSettings::default();
        let pairs = PairSettings {
            default_count: parse_or(&lookup, "DEFAULT_PAIR_COUNT", defaults.default_count)?,
            max_count: parse_or(&lookup, "MAX_PAIR_COUNT", defaults.max_count)?,
            policy: parse_or(&lookup, "PAIR_COUNT_POLICY", defaults.policy)?,
        };
        if pairs.max_count < 1 || pairs.default_count < 1 || pairs.default_count > pairs.max_count
        {
            anyhow::bail!(
                "DEFAULT_PAIR_COUNT ({}) must be between 1 and MAX_PAIR_COUNT ({})",
                pairs.default_count,
                pairs.max_count
            );
        }

        let reference = LayoutConfig::default();
        let layout = LayoutConfig::new(
            parse_or(&lookup, "CARD_WIDTH_MM", reference.card_width_mm)?,
            parse_or(&lookup, "CARD_HEIGHT_MM", reference.card_height_mm)?,
            parse_or::<NonZeroU32, _>(&lookup, "CARDS_PER_ROW", reference.columns_per_page)?,
            parse_or::<NonZeroU32, _>(&lookup, "CARDS_PER_COLUMN", reference.rows_per_page)?,
            parse_or(&lookup, "PAGE_MARGIN_X_MM", reference.page_margin_x_mm)?,
            parse_or(&lookup, "PAGE_MARGIN_Y_MM", reference.page_margin_y_mm)?,
        )
        .context("Invalid card layout configuration")?;

        Ok(Config {
            database_url: require("DATABASE_URL")?,
            s3_bucket: require("S3_BUCKET")?,
            s3_endpoint: require("S3_ENDPOINT")?,
            aws_access_key_id: require("AWS_ACCESS_KEY_ID")?,
            aws_secret_access_key: require("AWS_SECRET_ACCESS_KEY")?,
            upstream,
            pairs,
            layout,
            port: parse_or(&lookup, "PORT", 8080u16).context("PORT must be a valid port number")?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("Environment variable '{key}' is invalid ({raw:?}): {e}")),
    }
}
