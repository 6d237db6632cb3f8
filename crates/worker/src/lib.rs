//! Export worker: turns pending export jobs into JSON artifacts.
//!
//! - [`export`] -- one export run: look up the user, collect their
//!   questions newest first, write the artifact, return the records.
//! - [`runner`] -- the polling loop that claims jobs from a
//!   [`askbox_db::JobQueue`] and records the outcome.
//! - [`config`] -- environment configuration.

pub mod config;
pub mod export;
pub mod runner;

pub use config::ExportConfig;
pub use export::{run_export, ExportError, ExportOutput};
pub use runner::ExportWorker;
