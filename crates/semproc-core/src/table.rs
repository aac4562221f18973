use crate::process::{ProcessId, ProcessQuery};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// One row of an [`InMemoryProcessTable`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableEntry {
    pub pid: ProcessId,
    pub name: Option<String>,
    pub executable_path: Option<PathBuf>,
    pub launch_time: Option<u64>,
}

#[derive(Debug, Default)]
struct TableState {
    entries: Vec<TableEntry>,
    signatures: HashMap<PathBuf, String>,
    now: u64,
}

/// Mutable in-memory process table
///
/// Stands in for the kernel when the live OS state is not wanted: unit tests,
/// simulations, or embedders that already have their own process snapshot.
/// Enumeration order is insertion order, so first-match behaviour is predictable.
#[derive(Debug, Default)]
pub struct InMemoryProcessTable {
    state: Mutex<TableState>,
}

impl InMemoryProcessTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, TableState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add a fully-populated process, replacing any existing row for `pid`
    pub fn spawn(
        &self,
        pid: impl Into<ProcessId>,
        name: impl Into<String>,
        executable_path: impl Into<PathBuf>,
        launch_time: u64,
    ) -> &Self {
        self.insert(TableEntry {
            pid: pid.into(),
            name: Some(name.into()),
            executable_path: Some(executable_path.into()),
            launch_time: Some(launch_time),
        })
    }

    /// Add a process whose executable carries `signing_id`
    pub fn spawn_signed(
        &self,
        pid: impl Into<ProcessId>,
        name: impl Into<String>,
        executable_path: impl Into<PathBuf>,
        launch_time: u64,
        signing_id: impl Into<String>,
    ) -> &Self {
        let executable_path = executable_path.into();
        self.sign(executable_path.clone(), signing_id);
        self.spawn(pid, name, executable_path, launch_time)
    }

    /// Add an arbitrary row, including ones with unreadable attributes
    pub fn insert(&self, entry: TableEntry) -> &Self {
        let mut state = self.state();
        match state.entries.iter().position(|e| e.pid == entry.pid) {
            Some(index) => state.entries[index] = entry,
            None => state.entries.push(entry),
        }
        drop(state);
        self
    }

    /// Record a code signature for an executable path
    pub fn sign(&self, executable_path: impl Into<PathBuf>, signing_id: impl Into<String>) -> &Self {
        self.state()
            .signatures
            .insert(executable_path.into(), signing_id.into());
        self
    }

    /// Remove `pid` from the table, as if the process exited
    pub fn exit(&self, pid: impl Into<ProcessId>) -> &Self {
        let pid = pid.into();
        self.state().entries.retain(|e| e.pid != pid);
        self
    }

    pub fn set_now(&self, now: u64) -> &Self {
        self.state().now = now;
        self
    }

    fn with_entry<T>(&self, pid: ProcessId, f: impl FnOnce(&TableEntry) -> Option<T>) -> Option<T> {
        self.state().entries.iter().find(|e| e.pid == pid).and_then(f)
    }
}

impl ProcessQuery for InMemoryProcessTable {
    fn list_pids(&self) -> Vec<ProcessId> {
        self.state()
            .entries
            .iter()
            .map(|e| e.pid)
            .filter(|pid| pid.0 != 0)
            .collect()
    }

    fn name(&self, pid: ProcessId) -> Option<String> {
        self.with_entry(pid, |e| e.name.clone())
    }

    fn executable_path(&self, pid: ProcessId) -> Option<PathBuf> {
        self.with_entry(pid, |e| e.executable_path.clone())
    }

    fn launch_time(&self, pid: ProcessId) -> Option<u64> {
        self.with_entry(pid, |e| e.launch_time)
    }

    fn signing_identifier(&self, path: &Path) -> Option<String> {
        self.state().signatures.get(path).cloned()
    }

    fn now(&self) -> u64 {
        self.state().now
    }
}
