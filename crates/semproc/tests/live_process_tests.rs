use semproc::{Lookup, ProcessId, ProcessQuery, ResolverConfig, RetryConfig};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_file(true)
        .with_thread_ids(false)
        .with_target(false)
        .with_line_number(true)
        .with_test_writer()
        .try_init();
}

/// A PID far above anything the kernel hands out
const UNUSED_PID: u32 = u32::MAX - 1;

#[test]
fn test_own_pid_is_enumerated() {
    init_tracing();

    assert!(semproc::list_pids().contains(&ProcessId::current()));
    assert!(semproc::pid_exists(ProcessId::current()));
}

#[test]
fn test_resolve_own_pid() {
    init_tracing();
    let resolver = semproc::resolver();

    let me = resolver.by_pid(ProcessId::current()).expect("own process resolves");
    assert_eq!(me.pid(), ProcessId::current());
    assert!(!me.name().is_empty());
    assert!(me.executable_path().is_absolute());
    assert!(resolver.is_still_valid(&me));
    assert!(resolver.uptime(&me).is_some());
}

#[test]
fn test_repeated_validation_stays_true() {
    init_tracing();
    let resolver = semproc::resolver();
    let me = resolver.by_pid(ProcessId::current()).unwrap();

    for _ in 0..5 {
        assert!(resolver.is_still_valid(&me));
    }
}

#[test]
fn test_pid_zero_and_unused_pid_do_not_resolve() {
    init_tracing();
    let resolver = semproc::resolver();

    assert!(resolver.by_pid(0).is_none());
    assert!(resolver.by_pid(UNUSED_PID).is_none());
    assert!(semproc::identify(UNUSED_PID).is_none());
    assert_eq!(
        resolver.try_resolve(&Lookup::Pid(ProcessId(UNUSED_PID))),
        Err(semproc::ResolveError::NotRunning(ProcessId(UNUSED_PID)))
    );
}

#[test]
fn test_launch_time_does_not_drift_between_captures() {
    init_tracing();
    let resolver = semproc::resolver();

    let first = resolver.by_pid(ProcessId::current()).unwrap();
    std::thread::sleep(std::time::Duration::from_millis(100));
    let second = resolver.by_pid(ProcessId::current()).unwrap();

    assert_eq!(first.launch_time(), second.launch_time());
    assert!(first.same_instance(&second));
}

#[test]
fn test_missing_executable_is_not_running() {
    init_tracing();
    let missing = "/nonexistent/semproc/missing-binary";

    assert!(!semproc::executable_running(missing));
    assert!(semproc::executable_pids(missing).is_empty());
    assert!(semproc::resolver().by_path(missing).is_none());
}

#[test]
fn test_own_executable_is_listed_and_resolvable() {
    init_tracing();
    let resolver = semproc::resolver();
    let me = resolver.by_pid(ProcessId::current()).unwrap();

    assert!(
        semproc::list_executables()
            .iter()
            .any(|exe| exe == me.executable_path())
    );
    assert!(semproc::executable_pids(me.executable_path()).contains(&ProcessId::current()));

    let by_path = resolver.by_path(me.executable_path()).unwrap();
    assert_eq!(by_path.executable_path(), me.executable_path());
}

#[test]
fn test_own_name_is_resolvable() {
    init_tracing();
    let resolver = semproc::resolver();
    let me = resolver.by_pid(ProcessId::current()).unwrap();

    assert!(semproc::name_running(me.name()));
    // another process may share the name; any live match is acceptable
    let by_name = resolver.by_name(me.name()).unwrap();
    assert_eq!(by_name.name(), me.name());
    assert!(resolver.is_still_valid(&by_name));
}

#[cfg(not(target_os = "macos"))]
#[test]
fn test_required_bundle_id_rejects_unsigned_platforms() {
    init_tracing();
    let config = ResolverConfig::builder().require_bundle_id().build().unwrap();
    let resolver = semproc::resolver_with_config(config).unwrap();

    assert!(resolver.by_pid(ProcessId::current()).is_none());
    assert!(!semproc::bundle_id_running("com.apple.finder"));
}

#[cfg(unix)]
#[test]
fn test_exited_child_is_no_longer_valid() {
    use std::process::Command;

    init_tracing();
    let resolver = semproc::resolver();

    let mut child = Command::new("sleep").arg("30").spawn().unwrap();
    let pid = ProcessId(child.id());

    let sleeper = resolver.by_pid(pid).expect("child resolves");
    assert_eq!(sleeper.name(), "sleep");
    assert!(resolver.is_still_valid(&sleeper));
    assert_eq!(resolver.query().launch_time(pid), Some(sleeper.launch_time()));

    child.kill().unwrap();
    child.wait().unwrap();

    assert!(!resolver.is_still_valid(&sleeper));
    assert_eq!(resolver.uptime(&sleeper), None);
}

#[test]
fn test_invalid_retry_config_is_rejected() {
    init_tracing();
    let config = ResolverConfig::builder()
        .retry_config(RetryConfig {
            max_attempts: 0,
            ..RetryConfig::default()
        })
        .build()
        .unwrap();

    assert!(semproc::resolver_with_config(config).is_err());
}
