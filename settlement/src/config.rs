//! Configuration for the settlement engine

use serde::{Deserialize, Serialize};

/// Settlement engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Service name
    pub service_name: String,

    /// Service version
    pub service_version: String,

    /// Balance and netting configuration
    pub settlement: SettlementConfig,

    /// Payment link configuration
    pub links: LinkConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_name: "tab-settlement".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            settlement: SettlementConfig::default(),
            links: LinkConfig::default(),
        }
    }
}

/// What to do with an expense whose payer is not a participant
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownPayerPolicy {
    /// Fail with `Error::UnknownPayer`
    #[default]
    Reject,
    /// Credit an orphan balance entry that is never charged a share
    Admit,
}

impl std::str::FromStr for UnknownPayerPolicy {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(Self::Reject),
            "admit" => Ok(Self::Admit),
            other => Err(crate::Error::Config(format!(
                "unknown payer policy '{}' (expected reject or admit)",
                other
            ))),
        }
    }
}

/// Balance and netting configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettlementConfig {
    /// Unknown payer handling
    pub unknown_payer: UnknownPayerPolicy,

    /// Tolerance for "settled" checks.
    /// Netting itself always splits on strict < 0 / > 0.
    pub settled_epsilon: f64,
}

impl Default for SettlementConfig {
    fn default() -> Self {
        Self {
            unknown_payer: UnknownPayerPolicy::Reject,
            settled_epsilon: 1e-9,
        }
    }
}

/// Payment link configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// Prefix the creditor's handle is appended to
    pub base_url: String,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.paypal.com/paypalme/".to_string(),
        }
    }
}

impl Config {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> crate::Result<Self> {
        let mut config = Config::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Override fields from environment variables
    pub fn apply_env(&mut self) -> crate::Result<()> {
        if let Ok(policy) = std::env::var("TAB_UNKNOWN_PAYER") {
            self.settlement.unknown_payer = policy.parse()?;
        }

        if let Ok(epsilon) = std::env::var("TAB_SETTLED_EPSILON") {
            self.settlement.settled_epsilon = epsilon.trim().parse().map_err(|e| {
                crate::Error::Config(format!("Invalid TAB_SETTLED_EPSILON '{}': {}", epsilon, e))
            })?;
        }

        if let Ok(base) = std::env::var("TAB_PAYMENT_LINK_BASE") {
            self.links.base_url = base;
        }

        self.validate()
    }

    /// Validate configuration
    pub fn validate(&self) -> crate::Result<()> {
        if self.links.base_url.trim().is_empty() {
            return Err(crate::Error::Config("links.base_url must not be empty".to_string()));
        }

        let epsilon = self.settlement.settled_epsilon;
        if !epsilon.is_finite() || epsilon < 0.0 {
            return Err(crate::Error::Config(format!(
                "settlement.settled_epsilon must be a finite non-negative number, got {}",
                epsilon
            )));
        }

        Ok(())
    }
}
