use semproc_core::ProcessQueryFactory;

#[cfg(unix)]
pub type PlatformProcessQuery = semproc_unix::UnixProcessQuery;

#[cfg(windows)]
pub type PlatformProcessQuery = semproc_windows::WindowsProcessQuery;

/// Platform-independent factory that selects the appropriate implementation at compile time
pub struct PlatformProcessQueryFactory;

impl ProcessQueryFactory for PlatformProcessQueryFactory {
    type Query = PlatformProcessQuery;

    fn create_process_query() -> Self::Query {
        #[cfg(unix)]
        return semproc_unix::UnixProcessQueryFactory::create_process_query();

        #[cfg(windows)]
        return semproc_windows::WindowsProcessQueryFactory::create_process_query();
    }

    fn platform_name() -> &'static str {
        #[cfg(unix)]
        return semproc_unix::UnixProcessQueryFactory::platform_name();

        #[cfg(windows)]
        return semproc_windows::WindowsProcessQueryFactory::platform_name();
    }
}
