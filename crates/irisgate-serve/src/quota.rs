//! Quota rules: "N requests per window", scoped to a bucket family.
//!
//! Rules are written the way operators usually write rate limits:
//!
//! - `20 per minute`, `100 per hour`, `1000 per day`
//! - `5 per 10 seconds`
//! - `20/minute` (short form)

use std::fmt;
use std::time::Duration;

use crate::config::ConfigError;

/// Scope of the rule shared by every route.
pub const GLOBAL_SCOPE: &str = "global";
/// Scope of the landing page rule.
pub const INDEX_SCOPE: &str = "/";
/// Scope of the prediction endpoint rule.
pub const PREDICT_SCOPE: &str = "/predict";

/// At most `limit` requests per client within each fixed `window`.
///
/// Rules with the same `scope` share buckets, so the global rule charges one
/// counter per client no matter which route is hit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotaRule {
    scope: String,
    limit: u32,
    window: Duration,
}

impl QuotaRule {
    pub fn new(scope: impl Into<String>, limit: u32, window: Duration) -> Result<Self, ConfigError> {
        let rule = Self {
            scope: scope.into(),
            limit,
            window,
        };
        if limit == 0 {
            return Err(ConfigError::invalid_rule(&rule, "limit must be at least 1"));
        }
        if window.is_zero() {
            return Err(ConfigError::invalid_rule(&rule, "window must be non-zero"));
        }
        Ok(rule)
    }

    /// Parse `"<limit> per [<n>] <unit>"` or `"<limit>/[<n>] <unit>"`.
    pub fn parse(scope: impl Into<String>, text: &str) -> Result<Self, ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidRule {
            text: text.to_string(),
            reason: reason.to_string(),
        };

        let normalized = text.trim().to_ascii_lowercase();
        let (count, period) = normalized
            .split_once(" per ")
            .or_else(|| normalized.split_once('/'))
            .ok_or_else(|| invalid("expected '<limit> per <period>'"))?;

        let limit: u32 = count
            .trim()
            .parse()
            .map_err(|_| invalid("limit is not a whole number"))?;

        let mut parts = period.split_whitespace();
        let (multiplier, unit) = match (parts.next(), parts.next(), parts.next()) {
            (Some(unit), None, None) => (1, unit),
            (Some(n), Some(unit), None) => {
                let n: u64 = n.parse().map_err(|_| invalid("period multiple is not a whole number"))?;
                (n, unit)
            }
            _ => return Err(invalid("expected a period such as 'minute' or '10 seconds'")),
        };

        let unit_secs = match unit.trim_end_matches('s') {
            "second" | "sec" => 1,
            "minute" | "min" => 60,
            "hour" => 3_600,
            "day" => 86_400,
            _ => return Err(invalid("unknown unit; use second, minute, hour or day")),
        };

        let window = Duration::from_secs(multiplier.saturating_mul(unit_secs));
        Self::new(scope, limit, window).map_err(|e| match e {
            ConfigError::InvalidRule { reason, .. } => invalid(&reason),
            other => other,
        })
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn window(&self) -> Duration {
        self.window
    }
}

impl fmt::Display for QuotaRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} per {} seconds ({})",
            self.limit,
            self.window.as_secs(),
            self.scope
        )
    }
}
