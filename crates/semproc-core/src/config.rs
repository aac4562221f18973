use backon::ExponentialBuilder;
use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Retry settings for [`crate::Resolver::resolve_with_retry`]
///
/// Plain resolution never retries. These settings only apply when a caller
/// explicitly asks to wait for a process, e.g. one that is still launching.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RetryConfig {
    /// Minimum delay between attempts (in milliseconds)
    #[serde(default = "default_min_delay_ms")]
    pub min_delay_ms: u64,

    /// Maximum delay between attempts (in milliseconds)
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Total number of attempts, including the first one
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Whether to use exponential backoff (true) or fixed delay (false)
    #[serde(default = "default_use_exponential_backoff")]
    pub use_exponential_backoff: bool,

    /// Randomize delays so concurrent waiters do not poll in lockstep
    #[serde(default)]
    pub jitter: bool,

    /// Whether to retry when no live process matches the lookup yet
    #[serde(default = "default_retry_on_no_match")]
    pub retry_on_no_match: bool,

    /// Whether to retry when the matched process vanished mid-capture
    #[serde(default = "default_retry_on_vanished")]
    pub retry_on_vanished: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            min_delay_ms: default_min_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            max_attempts: default_max_attempts(),
            use_exponential_backoff: default_use_exponential_backoff(),
            jitter: false,
            retry_on_no_match: default_retry_on_no_match(),
            retry_on_vanished: default_retry_on_vanished(),
        }
    }
}

impl RetryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Poll quickly and for longer, for processes expected to appear any moment
    pub fn aggressive() -> Self {
        Self {
            min_delay_ms: 50,
            max_delay_ms: 10_000,
            max_attempts: 5,
            use_exponential_backoff: true,
            jitter: true,
            retry_on_no_match: true,
            retry_on_vanished: true,
        }
    }

    /// One extra attempt, and only for processes that vanished mid-capture
    pub fn conservative() -> Self {
        Self {
            min_delay_ms: 500,
            max_delay_ms: 2_000,
            max_attempts: 2,
            use_exponential_backoff: false,
            jitter: false,
            retry_on_no_match: false,
            retry_on_vanished: true,
        }
    }

    /// A single attempt
    pub fn no_retry() -> Self {
        Self {
            min_delay_ms: 0,
            max_delay_ms: 0,
            max_attempts: 1,
            use_exponential_backoff: false,
            jitter: false,
            retry_on_no_match: false,
            retry_on_vanished: false,
        }
    }

    /// Validate the configuration and return errors if invalid
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.min_delay_ms > self.max_delay_ms {
            return Err(anyhow::anyhow!(
                "min_delay_ms cannot be greater than max_delay_ms"
            ));
        }

        if self.max_attempts == 0 {
            return Err(anyhow::anyhow!("max_attempts must be at least 1"));
        }

        if self.max_attempts > 10 {
            return Err(anyhow::anyhow!(
                "max_attempts should not exceed 10 to avoid excessive polling"
            ));
        }

        if self.max_delay_ms > 60_000 {
            return Err(anyhow::anyhow!("max_delay_ms should not exceed 60 seconds"));
        }

        Ok(())
    }

    pub fn min_delay(&self) -> Duration {
        Duration::from_millis(self.min_delay_ms)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }

    /// Check if retries are enabled (more than 1 attempt)
    pub fn retries_enabled(&self) -> bool {
        self.max_attempts > 1 && (self.retry_on_no_match || self.retry_on_vanished)
    }

    /// Backoff strategy for backon; a fixed delay is an exponential one capped at its minimum
    pub(crate) fn backoff(&self) -> ExponentialBuilder {
        let max_delay = if self.use_exponential_backoff {
            self.max_delay()
        } else {
            self.min_delay()
        };

        let builder = ExponentialBuilder::default()
            .with_min_delay(self.min_delay())
            .with_max_delay(max_delay)
            .with_max_times(self.max_attempts.saturating_sub(1) as usize);

        if self.jitter {
            builder.with_jitter()
        } else {
            builder
        }
    }
}

/// Whether a code-signing identifier is mandatory for capture
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BundleIdPolicy {
    /// Unsigned executables resolve with `bundle_id() == None`
    #[default]
    Optional,
    /// Capture fails for executables without a signing identifier
    Required,
}

/// Resolver configuration
#[derive(Default, Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
#[builder(setter(into))]
#[serde(rename_all = "camelCase")]
pub struct ResolverConfig {
    #[builder(default)]
    #[serde(default)]
    pub bundle_id_policy: BundleIdPolicy,
    #[builder(default)]
    #[serde(default)]
    pub retry_config: RetryConfig,
}

impl ResolverConfig {
    pub fn builder() -> ResolverConfigBuilder {
        ResolverConfigBuilder::default()
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        self.retry_config.validate()
    }
}

impl ResolverConfigBuilder {
    /// Shorthand for `bundle_id_policy(BundleIdPolicy::Required)`
    pub fn require_bundle_id(&mut self) -> &mut Self {
        self.bundle_id_policy = Some(BundleIdPolicy::Required);
        self
    }
}

// Default value functions for serde
fn default_min_delay_ms() -> u64 {
    100
}
fn default_max_delay_ms() -> u64 {
    5_000
}
fn default_max_attempts() -> u32 {
    3
}
fn default_use_exponential_backoff() -> bool {
    true
}
fn default_retry_on_no_match() -> bool {
    true
}
fn default_retry_on_vanished() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RetryConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.retries_enabled());
    }

    #[test]
    fn test_aggressive_config() {
        let config = RetryConfig::aggressive();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.max_delay_ms, 10_000);
    }

    #[test]
    fn test_conservative_config() {
        let config = RetryConfig::conservative();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_attempts, 2);
        assert!(!config.use_exponential_backoff);
        assert!(!config.retry_on_no_match);
    }

    #[test]
    fn test_no_retry_config() {
        let config = RetryConfig::no_retry();
        assert!(config.validate().is_ok());
        assert!(!config.retries_enabled());
    }

    #[test]
    fn test_invalid_config() {
        let mut config = RetryConfig {
            min_delay_ms: 1000,
            max_delay_ms: 500,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        config.max_delay_ms = 1000;
        config.max_attempts = 0;
        assert!(config.validate().is_err());

        config.max_attempts = 11;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let config: RetryConfig = serde_json::from_str(r#"{"maxAttempts": 7}"#).unwrap();
        assert_eq!(config.max_attempts, 7);
        assert_eq!(config.min_delay_ms, 100);
        assert!(config.retry_on_no_match);
        assert!(!config.jitter);
    }

    #[test]
    fn test_resolver_config_builder() {
        let config = ResolverConfig::builder().build().unwrap();
        assert_eq!(config, ResolverConfig::default());
        assert_eq!(config.bundle_id_policy, BundleIdPolicy::Optional);

        let config = ResolverConfig::builder()
            .require_bundle_id()
            .retry_config(RetryConfig::no_retry())
            .build()
            .unwrap();
        assert_eq!(config.bundle_id_policy, BundleIdPolicy::Required);
        assert_eq!(config.retry_config.max_attempts, 1);
    }

    #[test]
    fn test_resolver_config_from_json() {
        let config: ResolverConfig =
            serde_json::from_str(r#"{"bundleIdPolicy": "required"}"#).unwrap();
        assert_eq!(config.bundle_id_policy, BundleIdPolicy::Required);
        assert_eq!(config.retry_config, RetryConfig::default());
        assert!(config.validate().is_ok());
    }
}
