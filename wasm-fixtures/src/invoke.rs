use std::{
    io,
    path::Path,
    process::{Command, ExitStatus},
};

use crate::manifest::{CompilerConfig, Fixture};

/// Exit code used when a compiler is terminated without one of its own.
pub const TERMINATED_EXIT_CODE: i32 = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Success,
    /// Non-zero exit code of the compiler.
    Failed(i32),
}

/// Runs a single compiler invocation to completion.
pub trait Invoke {
    /// Returns an I/O error only when the compiler could not be started at all.
    fn invoke(
        &mut self,
        compiler: &CompilerConfig,
        fixture: &Fixture,
        dir: &Path,
    ) -> io::Result<Outcome>;
}

/// Spawns the compiler as a child process in `dir` and blocks until it exits.
/// The child inherits stdout and stderr.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProcessInvoker;

impl Invoke for ProcessInvoker {
    fn invoke(
        &mut self,
        compiler: &CompilerConfig,
        fixture: &Fixture,
        dir: &Path,
    ) -> io::Result<Outcome> {
        let status =
            Command::new(&compiler.program).args(compiler.args(fixture)).current_dir(dir).status()?;
        Ok(outcome(status))
    }
}

fn outcome(status: ExitStatus) -> Outcome {
    if status.success() {
        return Outcome::Success;
    }
    Outcome::Failed(status.code().unwrap_or_else(|| terminated_code(status)))
}

#[cfg(unix)]
fn terminated_code(status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    // shell convention for a child killed by a signal
    status.signal().map_or(TERMINATED_EXIT_CODE, |signal| 128 + signal)
}

#[cfg(not(unix))]
fn terminated_code(_status: ExitStatus) -> i32 {
    TERMINATED_EXIT_CODE
}
