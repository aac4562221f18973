use semproc_core::{ProcessId, ProcessQuery};
use std::path::{Path, PathBuf};
use sysinfo::{Pid, Process, ProcessRefreshKind, ProcessesToUpdate, System, UpdateKind};
use tracing::{debug, trace};

/// Windows process table backed by sysinfo
///
/// Like the Unix query, each call refreshes a fresh `System`. Authenticode
/// signatures carry no bundle-style identifier, so `signing_identifier` is always
/// `None` here.
#[derive(Debug, Default)]
pub struct WindowsProcessQuery;

impl WindowsProcessQuery {
    pub fn new() -> Self {
        debug!("Initializing Windows process query");
        Self
    }

    fn with_process<T>(
        pid: ProcessId,
        refresh_kind: ProcessRefreshKind,
        f: impl FnOnce(&Process) -> Option<T>,
    ) -> Option<T> {
        let target = Pid::from_u32(pid.as_u32());
        let mut system = System::new();
        system.refresh_processes_specifics(ProcessesToUpdate::Some(&[target]), true, refresh_kind);

        let result = system.process(target).and_then(f);
        if result.is_none() {
            trace!(pid = %pid, "Windows process attribute unavailable");
        }
        result
    }
}

impl ProcessQuery for WindowsProcessQuery {
    fn list_pids(&self) -> Vec<ProcessId> {
        let mut system = System::new();
        system.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::nothing(),
        );

        system
            .processes()
            .keys()
            .map(|pid| ProcessId(pid.as_u32()))
            // System Idle Process
            .filter(|pid| pid.as_u32() != 0)
            .collect()
    }

    fn name(&self, pid: ProcessId) -> Option<String> {
        Self::with_process(pid, ProcessRefreshKind::nothing(), |process| {
            let name = process.name().to_string_lossy().into_owned();
            (!name.is_empty()).then_some(name)
        })
    }

    fn executable_path(&self, pid: ProcessId) -> Option<PathBuf> {
        Self::with_process(
            pid,
            ProcessRefreshKind::nothing().with_exe(UpdateKind::Always),
            |process| {
                process
                    .exe()
                    .filter(|exe| !exe.as_os_str().is_empty())
                    .map(Path::to_path_buf)
            },
        )
    }

    fn launch_time(&self, pid: ProcessId) -> Option<u64> {
        Self::with_process(pid, ProcessRefreshKind::nothing(), |process| {
            Some(process.start_time()).filter(|start| *start > 0)
        })
    }

    fn signing_identifier(&self, _path: &Path) -> Option<String> {
        None
    }
}
