mod unix_process_query;

pub use unix_process_query::UnixProcessQuery;

use semproc_core::ProcessQueryFactory;

pub struct UnixProcessQueryFactory;

impl ProcessQueryFactory for UnixProcessQueryFactory {
    type Query = UnixProcessQuery;

    fn create_process_query() -> UnixProcessQuery {
        UnixProcessQuery::new()
    }

    fn platform_name() -> &'static str {
        "Unix"
    }
}
