//! Point-in-time questions about the live process table.
//!
//! Each helper performs a fresh enumeration through the given [`ProcessQuery`];
//! nothing is remembered between calls.

use crate::process::{ProcessId, ProcessQuery};
use std::path::{Path, PathBuf};

/// Executable path of every live process whose path is readable
pub fn list_executables<Q: ProcessQuery + ?Sized>(query: &Q) -> Vec<PathBuf> {
    query
        .list_pids()
        .into_iter()
        .filter_map(|pid| query.executable_path(pid))
        .collect()
}

/// Does a process with the given PID exist?
pub fn pid_exists<Q: ProcessQuery + ?Sized>(query: &Q, pid: ProcessId) -> bool {
    query.list_pids().contains(&pid)
}

/// Does a process with exactly this short name exist?
pub fn name_running<Q: ProcessQuery + ?Sized>(query: &Q, name: &str) -> bool {
    query
        .list_pids()
        .into_iter()
        .any(|pid| query.name(pid).is_some_and(|current| current == name))
}

/// Is any live process running the executable at exactly this path?
pub fn executable_running<Q: ProcessQuery + ?Sized>(query: &Q, path: &Path) -> bool {
    list_executables(query)
        .iter()
        .any(|exe| same_path(exe, path))
}

/// Is any live process running an executable signed with this identifier?
pub fn bundle_id_running<Q: ProcessQuery + ?Sized>(query: &Q, bundle_id: &str) -> bool {
    query
        .list_pids()
        .into_iter()
        .any(|pid| query.bundle_id(pid).is_some_and(|current| current == bundle_id))
}

/// Every live PID hosting the executable at exactly this path
pub fn executable_pids<Q: ProcessQuery + ?Sized>(query: &Q, path: &Path) -> Vec<ProcessId> {
    query
        .list_pids()
        .into_iter()
        .filter(|pid| {
            query
                .executable_path(*pid)
                .is_some_and(|exe| same_path(&exe, path))
        })
        .collect()
}

/// Seconds since whatever currently holds `pid` was launched
///
/// This says nothing about *which* process that is; see
/// [`crate::Resolver::uptime`] for the identity-checked variant.
pub fn pid_uptime<Q: ProcessQuery + ?Sized>(query: &Q, pid: ProcessId) -> Option<u64> {
    let launch_time = query.launch_time(pid)?;
    Some(query.now().saturating_sub(launch_time))
}

/// Byte-wise path equality, without `Path`'s component normalisation
pub(crate) fn same_path(a: &Path, b: &Path) -> bool {
    a.as_os_str() == b.as_os_str()
}
