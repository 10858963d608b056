/// Running one compiler invocation
pub mod invoke;
/// Fixture lists and compiler configuration
pub mod manifest;
/// Sequential, fail-fast batch over a manifest
pub mod runner;

pub use invoke::{Invoke, Outcome, ProcessInvoker};
pub use manifest::{CompilerConfig, Fixture, Manifest};
pub use runner::{run_batch, BatchError, BatchReport};
