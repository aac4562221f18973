//! semproc core - platform-independent process identity
//!
//! This crate provides the [`ProcessQuery`] capability trait implemented by the
//! platform crates, the [`ProcessIdentity`] snapshot, and the [`Resolver`] that
//! captures snapshots and detects PID reuse.

mod config;
mod error;
mod identity;
mod process;
pub mod query;
mod resolver;
mod table;

pub use config::*;
pub use error::*;
pub use identity::*;
pub use process::*;
pub use resolver::*;
pub use table::*;
