//! Component identities and signal kinds.
//!
//! A receiver and each of its scrapers are identified by a [`ComponentId`]
//! rendered as `kind` or `kind/name`. The identities label every span and
//! counter emitted for a scrape.

use std::fmt;
use std::str::FromStr;

const KIND_MAX_LEN: usize = 63;
const NAME_MAX_LEN: usize = 1024;

/// Errors from parsing a [`ComponentId`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ComponentIdError {
    #[error("component kind cannot be empty")]
    EmptyKind,

    #[error("invalid component kind {0:?}: must start with a letter and contain only letters, digits or underscores (max 63 characters)")]
    InvalidKind(String),

    #[error("component name cannot be empty when a '/' separator is present")]
    EmptyName,

    #[error("invalid component name {0:?}: must not contain whitespace or control characters (max 1024 characters)")]
    InvalidName(String),
}

/// Identity of a receiver or a scraper.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId {
    kind: String,
    name: Option<String>,
}

impl ComponentId {
    /// Create an identity with only a kind.
    pub fn new(kind: impl Into<String>) -> Result<Self, ComponentIdError> {
        let kind = kind.into();
        validate_kind(&kind)?;
        Ok(Self { kind, name: None })
    }

    /// Create an identity with a kind and an instance name.
    pub fn with_name(
        kind: impl Into<String>,
        name: impl Into<String>,
    ) -> Result<Self, ComponentIdError> {
        let kind = kind.into();
        let name = name.into();
        validate_kind(&kind)?;
        validate_name(&name)?;
        Ok(Self {
            kind,
            name: Some(name),
        })
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

fn validate_kind(kind: &str) -> Result<(), ComponentIdError> {
    let mut chars = kind.chars();
    let Some(first) = chars.next() else {
        return Err(ComponentIdError::EmptyKind);
    };
    let valid = first.is_ascii_alphabetic()
        && kind.len() <= KIND_MAX_LEN
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(ComponentIdError::InvalidKind(kind.to_string()))
    }
}

fn validate_name(name: &str) -> Result<(), ComponentIdError> {
    if name.is_empty() {
        return Err(ComponentIdError::EmptyName);
    }
    if name.chars().count() > NAME_MAX_LEN
        || name.chars().any(|c| c.is_whitespace() || c.is_control())
    {
        return Err(ComponentIdError::InvalidName(name.to_string()));
    }
    Ok(())
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{}/{}", self.kind, name),
            None => f.write_str(&self.kind),
        }
    }
}

impl FromStr for ComponentId {
    type Err = ComponentIdError;

    /// Parse `kind` or `kind/name`. Everything after the first `/` is the name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((kind, name)) => Self::with_name(kind.trim(), name.trim()),
            None => Self::new(s.trim()),
        }
    }
}

/// Telemetry signal a scraper produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum Signal {
    Logs,
    Metrics,
}

impl Signal {
    /// Suffix of the scrape span name, e.g. `ScrapeLogs`.
    pub fn span_operation(self) -> &'static str {
        match self {
            Signal::Logs => "ScrapeLogs",
            Signal::Metrics => "ScrapeMetrics",
        }
    }

    /// Span attribute key for the number of records collected.
    pub fn scraped_key(self) -> &'static str {
        match self {
            Signal::Logs => "scraped_log_records",
            Signal::Metrics => "scraped_metric_points",
        }
    }

    /// Span attribute key for the number of records lost.
    pub fn errored_key(self) -> &'static str {
        match self {
            Signal::Logs => "errored_log_records",
            Signal::Metrics => "errored_metric_points",
        }
    }

    /// Counter name for the number of records collected.
    pub fn scraped_metric_name(self) -> &'static str {
        match self {
            Signal::Logs => "scraper_scraped_log_records",
            Signal::Metrics => "scraper_scraped_metric_points",
        }
    }

    /// Counter name for the number of records lost.
    pub fn errored_metric_name(self) -> &'static str {
        match self {
            Signal::Logs => "scraper_errored_log_records",
            Signal::Metrics => "scraper_errored_metric_points",
        }
    }

    /// Unit used by both counters.
    pub fn unit(self) -> &'static str {
        match self {
            Signal::Logs => "{records}",
            Signal::Metrics => "{datapoints}",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Logs => f.write_str("logs"),
            Signal::Metrics => f.write_str("metrics"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kind_only() {
        let id: ComponentId = "hostmetrics".parse().unwrap();
        assert_eq!(id.kind(), "hostmetrics");
        assert_eq!(id.name(), None);
        assert_eq!(id.to_string(), "hostmetrics");
    }

    #[test]
    fn test_parse_kind_and_name() {
        let id: ComponentId = "filelog/app/errors".parse().unwrap();
        assert_eq!(id.kind(), "filelog");
        assert_eq!(id.name(), Some("app/errors"));
        assert_eq!(id.to_string(), "filelog/app/errors");
    }

    #[test]
    fn test_invalid_ids() {
        assert_eq!("".parse::<ComponentId>(), Err(ComponentIdError::EmptyKind));
        assert_eq!(
            "sample/".parse::<ComponentId>(),
            Err(ComponentIdError::EmptyName)
        );
        assert!(matches!(
            "1abc".parse::<ComponentId>(),
            Err(ComponentIdError::InvalidKind(_))
        ));
        assert!(matches!(
            "my-kind".parse::<ComponentId>(),
            Err(ComponentIdError::InvalidKind(_))
        ));
        assert!(matches!(
            ComponentId::with_name("sample", "has space"),
            Err(ComponentIdError::InvalidName(_))
        ));
        assert!(matches!(
            ComponentId::new("a".repeat(64)),
            Err(ComponentIdError::InvalidKind(_))
        ));
    }

    #[test]
    fn test_signal_names() {
        assert_eq!(Signal::Logs.span_operation(), "ScrapeLogs");
        assert_eq!(Signal::Metrics.scraped_key(), "scraped_metric_points");
        assert_eq!(
            Signal::Logs.errored_metric_name(),
            "scraper_errored_log_records"
        );
    }
}
