//! Windows-specific process query implementation

mod windows_process_query;

pub use windows_process_query::WindowsProcessQuery;

use semproc_core::ProcessQueryFactory;

/// Windows-specific process query factory
pub struct WindowsProcessQueryFactory;

impl ProcessQueryFactory for WindowsProcessQueryFactory {
    type Query = WindowsProcessQuery;

    fn create_process_query() -> WindowsProcessQuery {
        WindowsProcessQuery::new()
    }

    fn platform_name() -> &'static str {
        "Windows"
    }
}
