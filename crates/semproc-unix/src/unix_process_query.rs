use semproc_core::{ProcessId, ProcessQuery};
use std::path::{Path, PathBuf};
use sysinfo::{Pid, Process, ProcessRefreshKind, ProcessesToUpdate, System, UpdateKind};
use tracing::{debug, trace};

// Absolute paths for subprocess calls, so PATH cannot redirect them
#[cfg(target_os = "macos")]
mod paths {
    pub const CODESIGN: &str = "/usr/bin/codesign";
}

/// Unix process table backed by sysinfo
///
/// Holds no `System` between calls: every query builds a fresh one and refreshes
/// only what it needs, so a process that exec'd or exited since the last call is
/// never reported from stale data.
#[derive(Debug, Default)]
pub struct UnixProcessQuery;

impl UnixProcessQuery {
    pub fn new() -> Self {
        debug!("Initializing Unix process query");
        Self
    }

    /// Refresh a single PID and inspect it
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
            trace!(%pid, "Process attribute unavailable");
        }
        result
    }
}

impl ProcessQuery for UnixProcessQuery {
    fn list_pids(&self) -> Vec<ProcessId> {
        let mut system = System::new();
        system.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::nothing(),
        );

        system
            .processes()
            .iter()
            // Linux exposes threads as tasks; only real processes count
            .filter(|(_, process)| process.thread_kind().is_none())
            .map(|(pid, _)| ProcessId(pid.as_u32()))
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

    #[cfg(target_os = "macos")]
    fn signing_identifier(&self, path: &Path) -> Option<String> {
        codesign_identifier(path)
    }

    #[cfg(not(target_os = "macos"))]
    fn signing_identifier(&self, _path: &Path) -> Option<String> {
        None
    }
}

/// Ask `codesign` for the signing identifier of an executable
#[cfg(target_os = "macos")]
fn codesign_identifier(path: &Path) -> Option<String> {
    use std::process::Command;
    use tracing::warn;

    let output = match Command::new(paths::CODESIGN)
        .args(["-dvvv", "--"])
        .arg(path)
        .output()
    {
        Ok(output) => output,
        Err(e) => {
            warn!("Failed to run {}: {}", paths::CODESIGN, e);
            return None;
        }
    };

    if !output.status.success() {
        trace!(path = %path.display(), "Executable is not signed");
        return None;
    }

    // codesign outputs to stderr
    parse_codesign_identifier(&String::from_utf8_lossy(&output.stderr))
}

#[cfg_attr(not(target_os = "macos"), allow(dead_code))]
fn parse_codesign_identifier(info: &str) -> Option<String> {
    info.lines()
        .find_map(|line| line.strip_prefix("Identifier="))
        .map(str::trim)
        .filter(|identifier| !identifier.is_empty())
        .map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use semproc_core::query::pid_exists;

    #[test]
    fn test_lists_own_pid() {
        let query = UnixProcessQuery::new();
        assert!(query.list_pids().contains(&ProcessId::current()));
    }

    #[test]
    fn test_never_lists_pid_zero() {
        let query = UnixProcessQuery::new();
        assert!(!query.list_pids().contains(&ProcessId(0)));
    }

    #[test]
    fn test_own_attributes_are_readable() {
        let query = UnixProcessQuery::new();
        let pid = ProcessId::current();

        assert!(query.name(pid).is_some());
        assert!(query.launch_time(pid).is_some());

        let exe = query.executable_path(pid).unwrap();
        assert!(exe.is_absolute());
        assert_eq!(
            exe.file_name(),
            std::env::current_exe().unwrap().file_name()
        );
    }

    #[test]
    fn test_launch_time_is_stable() {
        let query = UnixProcessQuery::new();
        let pid = ProcessId::current();

        let first = query.launch_time(pid).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(50));
        assert_eq!(query.launch_time(pid), Some(first));
        assert!(query.now() >= first);
    }

    #[test]
    fn test_unknown_pid_has_no_attributes() {
        let query = UnixProcessQuery::new();
        // above the Linux pid_max ceiling and any realistic macOS PID
        let pid = ProcessId(u32::MAX - 1);

        assert_eq!(query.name(pid), None);
        assert_eq!(query.executable_path(pid), None);
        assert_eq!(query.launch_time(pid), None);
        assert_eq!(query.bundle_id(pid), None);
        assert!(!pid_exists(&query, pid));
    }

    #[test]
    fn test_parse_codesign_identifier() {
        let info = "Executable=/System/Applications/Calculator.app/Contents/MacOS/Calculator\n\
                    Identifier=com.apple.calculator\n\
                    Format=app bundle with Mach-O universal (x86_64 arm64e)\n\
                    TeamIdentifier=not set\n";
        assert_eq!(
            parse_codesign_identifier(info).as_deref(),
            Some("com.apple.calculator")
        );
        assert_eq!(parse_codesign_identifier("code object is not signed at all"), None);
        assert_eq!(parse_codesign_identifier("Identifier=\n"), None);
    }

    #[cfg(not(target_os = "macos"))]
    #[test]
    fn test_no_signing_identifiers_off_macos() {
        let query = UnixProcessQuery::new();
        assert_eq!(query.bundle_id(ProcessId::current()), None);
    }
}
