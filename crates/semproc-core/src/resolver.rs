use crate::config::ResolverConfig;
use crate::error::ResolveError;
use crate::identity::{Lookup, ProcessIdentity};
use crate::process::{ProcessId, ProcessQuery};
use crate::query;
use backon::BlockingRetryable;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, trace};

/// Resolves lookup keys into [`ProcessIdentity`] snapshots and re-verifies them
///
/// The resolver owns no process state. Every method performs a fresh query through
/// `Q`, so results are only as current as the moment of the call.
///
/// # Example
///
/// ```rust
/// use semproc_core::{InMemoryProcessTable, Lookup, Resolver, ResolverConfig};
/// use std::sync::Arc;
///
/// let table = Arc::new(InMemoryProcessTable::new());
/// table.spawn(501, "Safari", "/Applications/Safari", 1_700_000_000);
///
/// let resolver = Resolver::new(table.clone(), ResolverConfig::default()).unwrap();
/// let safari = resolver.by_name("Safari").unwrap();
/// assert!(resolver.is_still_valid(&safari));
///
/// // Safari quits and something else inherits its PID.
/// table.spawn(501, "Safari", "/Applications/Safari", 1_700_000_900);
/// assert!(!resolver.is_still_valid(&safari));
/// ```
#[derive(Debug)]
pub struct Resolver<Q> {
    query: Arc<Q>,
    config: ResolverConfig,
}

impl<Q> Clone for Resolver<Q> {
    fn clone(&self) -> Self {
        Self {
            query: self.query.clone(),
            config: self.config.clone(),
        }
    }
}

impl<Q: ProcessQuery> Resolver<Q> {
    /// Create a resolver, rejecting retry settings that fail [`ResolverConfig::validate`]
    pub fn new(query: Arc<Q>, config: ResolverConfig) -> anyhow::Result<Self> {
        config
            .validate()
            .map_err(|e| anyhow::anyhow!("Invalid resolver config: {e}"))?;

        Ok(Self { query, config })
    }

    /// Create a resolver with [`ResolverConfig::default`], which always validates
    pub fn with_default_config(query: Arc<Q>) -> Self {
        Self {
            query,
            config: ResolverConfig::default(),
        }
    }

    pub fn query(&self) -> &Q {
        &self.query
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Capture the first live process matching `lookup`
    pub fn resolve(&self, lookup: &Lookup) -> Option<ProcessIdentity> {
        self.try_resolve(lookup).ok()
    }

    pub fn by_pid(&self, pid: impl Into<ProcessId>) -> Option<ProcessIdentity> {
        self.resolve(&Lookup::Pid(pid.into()))
    }

    pub fn by_name(&self, name: &str) -> Option<ProcessIdentity> {
        self.resolve(&Lookup::name(name))
    }

    pub fn by_path(&self, path: impl AsRef<Path>) -> Option<ProcessIdentity> {
        self.resolve(&Lookup::path(path.as_ref()))
    }

    pub fn by_bundle_id(&self, bundle_id: &str) -> Option<ProcessIdentity> {
        self.resolve(&Lookup::bundle_id(bundle_id))
    }

    /// Like [`Resolver::resolve`], but explains a miss
    ///
    /// When several processes match, the first one in enumeration order wins.
    /// Callers that need a particular instance must resolve by PID.
    pub fn try_resolve(&self, lookup: &Lookup) -> Result<ProcessIdentity, ResolveError> {
        let Some(pid) = lookup.find(self.query.as_ref()) else {
            debug!(%lookup, "No running process matches lookup");
            return Err(match lookup {
                Lookup::Pid(pid) => ResolveError::NotRunning(*pid),
                _ => ResolveError::NoMatch(lookup.clone()),
            });
        };

        let captured = ProcessIdentity::capture(self.query.as_ref(), pid, self.config.bundle_id_policy)
            .and_then(|identity| {
                // PID was recycled between the match and the capture
                if lookup.matches(&identity) {
                    Ok(identity)
                } else {
                    Err(ResolveError::Vanished(pid))
                }
            });

        match captured {
            Ok(identity) => {
                debug!(%lookup, %identity, "Resolved process identity");
                Ok(identity)
            }
            // a key other than the PID matched, then the process exited
            Err(ResolveError::NotRunning(pid)) if !matches!(lookup, Lookup::Pid(_)) => {
                debug!(%lookup, %pid, "Matched process exited before capture");
                Err(ResolveError::Vanished(pid))
            }
            Err(e) => {
                debug!(%lookup, %pid, error = %e, "Failed to capture process identity");
                Err(e)
            }
        }
    }

    /// Resolve, polling according to the configured [`crate::RetryConfig`]
    ///
    /// Useful when waiting for a process that is about to launch. Sleeps on the
    /// calling thread between attempts; returns the last error once attempts run out.
    pub fn resolve_with_retry(&self, lookup: &Lookup) -> Result<ProcessIdentity, ResolveError> {
        let retry_config = &self.config.retry_config;

        if !retry_config.retries_enabled() {
            return self.try_resolve(lookup);
        }

        (|| self.try_resolve(lookup))
            .retry(retry_config.backoff())
            .sleep(std::thread::sleep)
            .when(|e: &ResolveError| {
                if e.is_vanished() {
                    retry_config.retry_on_vanished
                } else {
                    e.is_retryable() && retry_config.retry_on_no_match
                }
            })
            .notify(|e: &ResolveError, delay| {
                debug!(%lookup, error = %e, ?delay, "Retrying process resolution");
            })
            .call()
    }

    /// Is this snapshot still the same live process instance?
    ///
    /// True only if the PID is live and both its current name and launch time equal
    /// the captured ones. Path and bundle id are not re-checked.
    pub fn is_still_valid(&self, identity: &ProcessIdentity) -> bool {
        let valid = identity.matches_live(self.query.as_ref());
        if !valid {
            trace!(%identity, "Process identity is stale");
        }
        valid
    }

    /// Seconds since the snapshot's process launched, or `None` if it is stale
    pub fn uptime(&self, identity: &ProcessIdentity) -> Option<u64> {
        if !self.is_still_valid(identity) {
            return None;
        }

        Some(self.query.now().saturating_sub(identity.launch_time()))
    }

    pub fn list_pids(&self) -> Vec<ProcessId> {
        self.query.list_pids()
    }

    pub fn list_executables(&self) -> Vec<PathBuf> {
        query::list_executables(self.query.as_ref())
    }

    pub fn pid_exists(&self, pid: impl Into<ProcessId>) -> bool {
        query::pid_exists(self.query.as_ref(), pid.into())
    }

    pub fn name_running(&self, name: &str) -> bool {
        query::name_running(self.query.as_ref(), name)
    }

    pub fn executable_running(&self, path: impl AsRef<Path>) -> bool {
        query::executable_running(self.query.as_ref(), path.as_ref())
    }

    pub fn bundle_id_running(&self, bundle_id: &str) -> bool {
        query::bundle_id_running(self.query.as_ref(), bundle_id)
    }

    pub fn executable_pids(&self, path: impl AsRef<Path>) -> Vec<ProcessId> {
        query::executable_pids(self.query.as_ref(), path.as_ref())
    }
}
