//! Track operating-system processes by semantic identity instead of bare PID.
//!
//! ```rust,no_run
//! let resolver = semproc::resolver();
//!
//! if let Some(finder) = resolver.by_name("Finder") {
//!     // ...later
//!     if resolver.is_still_valid(&finder) {
//!         println!("{finder} has been up for {:?}s", resolver.uptime(&finder));
//!     }
//! }
//! ```

mod factory;

pub use factory::{PlatformProcessQuery, PlatformProcessQueryFactory};
pub use semproc_core::*;

use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Resolver over the live process table of the current platform
pub type PlatformResolver = Resolver<PlatformProcessQuery>;

/// Create a resolver for the current platform with default settings
pub fn resolver() -> PlatformResolver {
    tracing::debug!(
        platform = PlatformProcessQueryFactory::platform_name(),
        "Creating process resolver"
    );
    Resolver::with_default_config(Arc::new(
        PlatformProcessQueryFactory::create_process_query(),
    ))
}

/// Create a resolver for the current platform, validating `config` first
pub fn resolver_with_config(config: ResolverConfig) -> anyhow::Result<PlatformResolver> {
    tracing::debug!(
        platform = PlatformProcessQueryFactory::platform_name(),
        ?config,
        "Creating process resolver"
    );
    Resolver::new(
        Arc::new(PlatformProcessQueryFactory::create_process_query()),
        config,
    )
}

/// Capture the identity of whatever process currently holds `pid`
pub fn identify(pid: impl Into<ProcessId>) -> Option<ProcessIdentity> {
    resolver().by_pid(pid)
}

/// Every live PID
pub fn list_pids() -> Vec<ProcessId> {
    PlatformProcessQueryFactory::create_process_query().list_pids()
}

/// Executable path of every live process whose path is readable
pub fn list_executables() -> Vec<PathBuf> {
    query::list_executables(&PlatformProcessQueryFactory::create_process_query())
}

pub fn pid_exists(pid: impl Into<ProcessId>) -> bool {
    query::pid_exists(
        &PlatformProcessQueryFactory::create_process_query(),
        pid.into(),
    )
}

pub fn name_running(name: &str) -> bool {
    query::name_running(&PlatformProcessQueryFactory::create_process_query(), name)
}

pub fn executable_running(path: impl AsRef<Path>) -> bool {
    query::executable_running(
        &PlatformProcessQueryFactory::create_process_query(),
        path.as_ref(),
    )
}

pub fn bundle_id_running(bundle_id: &str) -> bool {
    query::bundle_id_running(
        &PlatformProcessQueryFactory::create_process_query(),
        bundle_id,
    )
}

/// Every live PID hosting the executable at `path`
pub fn executable_pids(path: impl AsRef<Path>) -> Vec<ProcessId> {
    query::executable_pids(
        &PlatformProcessQueryFactory::create_process_query(),
        path.as_ref(),
    )
}
