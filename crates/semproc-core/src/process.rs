use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Kernel-assigned process identifier
///
/// PIDs are recycled after a process exits, so a bare `ProcessId` says nothing
/// about *which* process it refers to. Use [`crate::ProcessIdentity`] to pin one down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ProcessId(pub u32);

impl ProcessId {
    /// PID of the calling process
    pub fn current() -> Self {
        Self(std::process::id())
    }

    pub fn as_u32(self) -> u32 {
        self.0
    }
}

impl From<u32> for ProcessId {
    fn from(pid: u32) -> Self {
        Self(pid)
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Read-only view of the kernel's live process table
///
/// This trait is the only boundary between identity resolution and the operating
/// system. Platform crates implement it on top of the native process-introspection
/// facility; tests substitute [`crate::InMemoryProcessTable`].
///
/// # Contract
///
/// - Every call reflects the process table at the instant it runs. Implementations
///   must not cache results between calls.
/// - Nothing here returns an error. A process can legitimately vanish between
///   enumeration and attribute lookup, so absence is reported as `None`.
/// - Calls are synchronous and bounded by the latency of the underlying OS query.
pub trait ProcessQuery: Send + Sync {
    /// Every PID currently known to the kernel
    ///
    /// Unique, in no particular order, never containing PID 0. An empty list is
    /// valid (sandboxed or degenerate environments).
    fn list_pids(&self) -> Vec<ProcessId>;

    /// Short executable name of whatever currently holds `pid`
    fn name(&self, pid: ProcessId) -> Option<String>;

    /// Absolute path of the executable currently running under `pid`
    fn executable_path(&self, pid: ProcessId) -> Option<PathBuf>;

    /// Start time of the process currently holding `pid`, in epoch seconds
    fn launch_time(&self, pid: ProcessId) -> Option<u64>;

    /// Code-signing identifier of the executable at `path`
    ///
    /// Returns `None` for unsigned executables, unreadable files, or on platforms
    /// without a code-signing facility.
    fn signing_identifier(&self, path: &Path) -> Option<String>;

    /// Code-signing identifier of the executable currently running under `pid`
    fn bundle_id(&self, pid: ProcessId) -> Option<String> {
        let path = self.executable_path(pid)?;
        self.signing_identifier(&path)
    }

    /// Current wall-clock time in epoch seconds
    fn now(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs())
            .unwrap_or_default()
    }
}

/// Factory trait for creating the platform-specific query layer
pub trait ProcessQueryFactory {
    /// The type of query layer this factory creates
    type Query: ProcessQuery;

    /// Create a query layer for the current platform
    fn create_process_query() -> Self::Query;

    /// Get the platform name for logging and debugging
    fn platform_name() -> &'static str;
}
