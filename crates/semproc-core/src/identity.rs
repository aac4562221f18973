use crate::config::BundleIdPolicy;
use crate::error::{Attribute, ResolveError};
use crate::process::{ProcessId, ProcessQuery};
use crate::query;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Key used to find a live process
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Lookup {
    Pid(ProcessId),
    /// Exact, case-sensitive short name
    Name(String),
    /// Exact executable path, compared byte for byte
    Path(PathBuf),
    /// Exact code-signing identifier
    BundleId(String),
}

impl Lookup {
    pub fn name(name: impl Into<String>) -> Self {
        Lookup::Name(name.into())
    }

    pub fn path(path: impl Into<PathBuf>) -> Self {
        Lookup::Path(path.into())
    }

    pub fn bundle_id(bundle_id: impl Into<String>) -> Self {
        Lookup::BundleId(bundle_id.into())
    }

    /// First PID in enumeration order matching this key
    pub(crate) fn find<Q: ProcessQuery + ?Sized>(&self, query: &Q) -> Option<ProcessId> {
        match self {
            Lookup::Pid(pid) => query::pid_exists(query, *pid).then_some(*pid),
            Lookup::Name(name) => query
                .list_pids()
                .into_iter()
                .find(|pid| query.name(*pid).is_some_and(|current| current == *name)),
            Lookup::Path(path) => query.list_pids().into_iter().find(|pid| {
                query
                    .executable_path(*pid)
                    .is_some_and(|current| query::same_path(&current, path))
            }),
            Lookup::BundleId(bundle_id) => query
                .list_pids()
                .into_iter()
                .find(|pid| query.bundle_id(*pid).is_some_and(|current| current == *bundle_id)),
        }
    }

    /// Does a captured snapshot still carry the attribute this key matched on?
    pub(crate) fn matches(&self, identity: &ProcessIdentity) -> bool {
        match self {
            Lookup::Pid(pid) => identity.pid == *pid,
            Lookup::Name(name) => identity.name == *name,
            Lookup::Path(path) => query::same_path(&identity.executable_path, path),
            Lookup::BundleId(bundle_id) => identity.bundle_id() == Some(bundle_id.as_str()),
        }
    }
}

impl From<ProcessId> for Lookup {
    fn from(pid: ProcessId) -> Self {
        Lookup::Pid(pid)
    }
}

impl fmt::Display for Lookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lookup::Pid(pid) => write!(f, "pid {pid}"),
            Lookup::Name(name) => write!(f, "name {name:?}"),
            Lookup::Path(path) => write!(f, "path {:?}", path.display().to_string()),
            Lookup::BundleId(bundle_id) => write!(f, "bundle id {bundle_id:?}"),
        }
    }
}

/// Semantic handle on one process instance
///
/// The kernel reuses PIDs, so a PID alone cannot tell whether the process it names
/// today is the one it named earlier. A `ProcessIdentity` records the PID together
/// with the attributes that were true when it was captured. The launch time is the
/// part that makes it collision-resistant: a process that later inherits the PID
/// almost certainly started at a different second.
///
/// A snapshot is an observation, never an owner. It cannot signal or wait on the
/// process, and it goes stale silently; ask [`crate::Resolver::is_still_valid`]
/// whenever it matters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessIdentity {
    pid: ProcessId,
    name: String,
    executable_path: PathBuf,
    bundle_id: Option<String>,
    launch_time: u64,
}

impl ProcessIdentity {
    /// Capture every identity attribute of `pid` in one pass
    ///
    /// Fails without producing anything if the PID is not live or if any mandatory
    /// attribute cannot be read. Under [`BundleIdPolicy::Required`] the signing
    /// identifier is mandatory too.
    pub fn capture<Q: ProcessQuery + ?Sized>(
        query: &Q,
        pid: ProcessId,
        policy: BundleIdPolicy,
    ) -> Result<Self, ResolveError> {
        if !query::pid_exists(query, pid) {
            return Err(ResolveError::NotRunning(pid));
        }

        let unavailable = |attribute| ResolveError::AttributeUnavailable { pid, attribute };

        let name = query.name(pid).ok_or_else(|| unavailable(Attribute::Name))?;
        let executable_path = query
            .executable_path(pid)
            .ok_or_else(|| unavailable(Attribute::Path))?;
        let launch_time = query
            .launch_time(pid)
            .ok_or_else(|| unavailable(Attribute::LaunchTime))?;

        let bundle_id = query.signing_identifier(&executable_path);
        if bundle_id.is_none() && policy == BundleIdPolicy::Required {
            return Err(ResolveError::Unsigned(pid));
        }

        Ok(Self {
            pid,
            name,
            executable_path,
            bundle_id,
            launch_time,
        })
    }

    pub fn pid(&self) -> ProcessId {
        self.pid
    }

    /// Short executable name at capture time
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn executable_path(&self) -> &Path {
        &self.executable_path
    }

    /// Last component of the executable path
    pub fn file_name(&self) -> Option<&str> {
        self.executable_path.file_name().and_then(|n| n.to_str())
    }

    pub fn bundle_id(&self) -> Option<&str> {
        self.bundle_id.as_deref()
    }

    /// Launch time in epoch seconds
    pub fn launch_time(&self) -> u64 {
        self.launch_time
    }

    /// Do both snapshots describe the same process instance?
    ///
    /// Only the attributes used for re-verification take part, so two captures of
    /// one instance compare equal here even if taken at different moments.
    pub fn same_instance(&self, other: &ProcessIdentity) -> bool {
        self.pid == other.pid && self.name == other.name && self.launch_time == other.launch_time
    }

    /// Does the process table still show this instance under its PID?
    pub(crate) fn matches_live<Q: ProcessQuery + ?Sized>(&self, query: &Q) -> bool {
        query::pid_exists(query, self.pid)
            && query.name(self.pid).is_some_and(|name| name == self.name)
            && query.launch_time(self.pid) == Some(self.launch_time)
    }
}

impl fmt::Display for ProcessIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (pid {}, launched {})", self.name, self.pid, self.launch_time)
    }
}
