//! Quality metrics rendered as badges at the top of converted documents.

use std::{fmt, str::FromStr};

/// A quality metric published by the badge server.
///
/// `name` is what readers see (the badge alt text), `key` is the metric
/// identifier the badge server understands (`coverage`, `ncloc`, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metric {
    name: String,
    key: String,
}

impl Metric {
    /// Create a metric from its display name and server key.
    #[must_use]
    pub fn new<N: Into<String>, K: Into<String>>(name: N, key: K) -> Self {
        Self {
            name: name.into(),
            key: key.into(),
        }
    }

    /// Display name of the metric.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Key of the metric on the badge server.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The metrics badged when nothing else is configured: quality gate
    /// status, lines of code and coverage, in that order.
    #[must_use]
    pub fn defaults() -> Vec<Metric> {
        vec![
            Metric::new("Alerte", "alert_status"),
            Metric::new("Line of code", "ncloc"),
            Metric::new("Coverage", "coverage"),
        ]
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.key)
    }
}

/// Error returned when a `NAME=KEY` metric specification is malformed.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("invalid metric '{0}', expected NAME=KEY (e.g. \"Coverage=coverage\")")]
pub struct ParseMetricError(String);

impl FromStr for Metric {
    type Err = ParseMetricError;

    /// Parse `NAME=KEY`. The name may contain spaces, the key may not be empty.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.rsplit_once('=') {
            Some((name, key)) if !name.trim().is_empty() && !key.trim().is_empty() => {
                Ok(Metric::new(name.trim(), key.trim()))
            }
            _ => Err(ParseMetricError(s.to_string())),
        }
    }
}
