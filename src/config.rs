use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::engine::FinancingMultiple;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub api: ApiConfig,
    #[serde(default)]
    pub matching: MatchingConfig,
    #[serde(default)]
    pub financing: FinancingConfig,
    #[serde(default)]
    pub poll: PollConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

#[derive(Debug, Deserialize, Clone)]
pub struct MatchingConfig {
    /// Tolerance for pairing tiers by share count. Upstream tables
    /// disagree on decimals; whether this should scale with magnitude
    /// is unresolved, so it stays a knob.
    #[serde(default = "default_shares_epsilon")]
    pub shares_epsilon: f64,
}

fn default_shares_epsilon() -> f64 {
    0.01
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            shares_epsilon: default_shares_epsilon(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct FinancingConfig {
    #[serde(default = "default_annual_rate_pct")]
    pub annual_rate_pct: f64,
    #[serde(default = "default_holding_days")]
    pub holding_days: f64,
    /// Must be one of the multiples brokers offer: 5, 10, 15, 20.
    #[serde(default = "default_multiple")]
    pub default_multiple: u32,
}

fn default_annual_rate_pct() -> f64 {
    5.0
}

fn default_holding_days() -> f64 {
    7.0
}

fn default_multiple() -> u32 {
    10
}

impl Default for FinancingConfig {
    fn default() -> Self {
        Self {
            annual_rate_pct: default_annual_rate_pct(),
            holding_days: default_holding_days(),
            default_multiple: default_multiple(),
        }
    }
}

impl FinancingConfig {
    pub fn annual_rate(&self) -> f64 {
        self.annual_rate_pct / 100.0
    }

    pub fn multiple(&self) -> Result<FinancingMultiple> {
        FinancingMultiple::from_factor(self.default_multiple).with_context(|| {
            format!(
                "default_multiple must be one of 5, 10, 15, 20 (got {})",
                self.default_multiple
            )
        })
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct PollConfig {
    #[serde(default = "default_refresh_interval")]
    pub stock_refresh_interval_s: u64,
}

fn default_refresh_interval() -> u64 {
    30
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            stock_refresh_interval_s: default_refresh_interval(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config =
            toml::from_str(&content).with_context(|| "Failed to parse config TOML")?;
        Ok(config)
    }
}
