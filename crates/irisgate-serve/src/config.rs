//! Server configuration with the defaults the service ships with.

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use thiserror::Error;

use crate::quota::{GLOBAL_SCOPE, INDEX_SCOPE, PREDICT_SCOPE, QuotaRule};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid rate limit {text:?}: {reason}")]
    InvalidRule { text: String, reason: String },

    #[error("exempt client identifier must not be empty")]
    EmptyExemption,
}

impl ConfigError {
    pub(crate) fn invalid_rule(rule: &QuotaRule, reason: &str) -> Self {
        Self::InvalidRule {
            text: rule.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Everything the server needs besides the model artifact.
#[derive(Debug, Clone)]
pub struct ServeConfig {
    pub bind: SocketAddr,
    /// Charged on every route, one bucket per client.
    pub global_limit: QuotaRule,
    pub index_limit: QuotaRule,
    pub predict_limit: QuotaRule,
    /// Client identifiers that bypass every quota.
    pub exempt: Vec<String>,
    /// How often expired quota buckets are swept.
    pub purge_interval: Duration,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from((Ipv4Addr::UNSPECIFIED, 5000)),
            global_limit: QuotaRule::fixed(GLOBAL_SCOPE, 100, Duration::from_secs(3_600)),
            index_limit: QuotaRule::fixed(INDEX_SCOPE, 30, Duration::from_secs(60)),
            predict_limit: QuotaRule::fixed(PREDICT_SCOPE, 20, Duration::from_secs(60)),
            exempt: vec![Ipv4Addr::LOCALHOST.to_string()],
            purge_interval: Duration::from_secs(300),
        }
    }
}

impl ServeConfig {
    /// Replace the three quota rules from their textual form.
    pub fn with_limits(mut self, global: &str, index: &str, predict: &str) -> Result<Self, ConfigError> {
        self.global_limit = QuotaRule::parse(GLOBAL_SCOPE, global)?;
        self.index_limit = QuotaRule::parse(INDEX_SCOPE, index)?;
        self.predict_limit = QuotaRule::parse(PREDICT_SCOPE, predict)?;
        Ok(self)
    }

    /// Replace the exemption list.
    pub fn with_exempt(mut self, exempt: Vec<String>) -> Result<Self, ConfigError> {
        if exempt.iter().any(|id| id.trim().is_empty()) {
            return Err(ConfigError::EmptyExemption);
        }
        self.exempt = exempt.into_iter().map(|id| id.trim().to_string()).collect();
        Ok(self)
    }

    /// Rules for `GET /`.
    pub fn index_rules(&self) -> Vec<QuotaRule> {
        vec![self.global_limit.clone(), self.index_limit.clone()]
    }

    /// Rules for `POST /predict`.
    pub fn predict_rules(&self) -> Vec<QuotaRule> {
        vec![self.global_limit.clone(), self.predict_limit.clone()]
    }
}

impl QuotaRule {
    /// Infallible constructor for the built-in defaults.
    fn fixed(scope: &str, limit: u32, window: Duration) -> Self {
        match Self::new(scope, limit, window) {
            Ok(rule) => rule,
            Err(e) => unreachable!("built-in quota rule is invalid: {e}"),
        }
    }
}
