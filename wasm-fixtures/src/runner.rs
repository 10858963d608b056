use std::{io, path::Path};

use log::{debug, error, info, warn};
use thiserror::Error;

use crate::{
    invoke::{Invoke, Outcome},
    manifest::{Fixture, Manifest},
};

/// Exit code used when the compiler cannot be started, as a shell reports a missing command.
pub const SPAWN_FAILURE_EXIT_CODE: i32 = 127;

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("could not start compiler for fixture #{index} ({}): {source}", .fixture.source.display())]
    Spawn {
        index: usize,
        fixture: Fixture,
        #[source]
        source: io::Error,
    },
}

impl BatchError {
    pub fn exit_code(&self) -> i32 {
        match self {
            BatchError::Spawn { .. } => SPAWN_FAILURE_EXIT_CODE,
        }
    }
}

/// The invocation that stopped the batch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Failure {
    /// Position of the fixture in the manifest.
    pub index: usize,
    pub fixture: Fixture,
    pub exit_code: i32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Fixtures compiled successfully, in order.
    pub completed: Vec<Fixture>,
    pub failure: Option<Failure>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }

    /// Zero if every invocation succeeded, otherwise the exit code of the one that failed.
    pub fn exit_code(&self) -> i32 {
        self.failure.as_ref().map_or(0, |failure| failure.exit_code)
    }
}

/// Compiles every fixture of `manifest` in order, inside `dir`.
///
/// The batch is fail-fast: the first invocation exiting non-zero ends it, and no later fixture
/// is attempted. There is no retry and no resume; a rerun starts from the first fixture.
pub fn run_batch(
    manifest: &Manifest,
    dir: &Path,
    invoker: &mut impl Invoke,
) -> Result<BatchReport, BatchError> {
    let total = manifest.fixtures.len();
    let mut report = BatchReport::default();
    for (index, fixture) in manifest.fixtures.iter().enumerate() {
        info!("[{}/{total}] {}", index + 1, manifest.compiler.command_line(fixture));
        let outcome = invoker.invoke(&manifest.compiler, fixture, dir).map_err(|source| {
            BatchError::Spawn { index, fixture: fixture.clone(), source }
        })?;
        match outcome {
            Outcome::Success => {
                if !dir.join(&fixture.output).exists() {
                    warn!("Compiler succeeded but {} does not exist", fixture.output.display());
                }
                report.completed.push(fixture.clone());
            }
            Outcome::Failed(exit_code) => {
                error!(
                    "Compiling {} failed with exit code {exit_code}, skipping {} remaining fixtures",
                    fixture.source.display(),
                    total - index - 1
                );
                report.failure = Some(Failure { index, fixture: fixture.clone(), exit_code });
                return Ok(report);
            }
        }
    }
    debug!("Compiled {total} fixtures");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use test_case::test_case;

    use super::*;
    use crate::manifest::CompilerConfig;

    /// Records every invocation and fails the one at `fail_at` with `code`.
    struct ScriptedInvoker {
        fail_at: Option<(usize, i32)>,
        invoked: Vec<PathBuf>,
    }

    impl ScriptedInvoker {
        fn new(fail_at: Option<(usize, i32)>) -> Self {
            Self { fail_at, invoked: vec![] }
        }
    }

    impl Invoke for ScriptedInvoker {
        fn invoke(
            &mut self,
            _compiler: &CompilerConfig,
            fixture: &Fixture,
            _dir: &Path,
        ) -> io::Result<Outcome> {
            let index = self.invoked.len();
            self.invoked.push(fixture.source.clone());
            Ok(match self.fail_at {
                Some((at, code)) if at == index => Outcome::Failed(code),
                _ => Outcome::Success,
            })
        }
    }

    struct UnstartableInvoker;

    impl Invoke for UnstartableInvoker {
        fn invoke(&mut self, _: &CompilerConfig, _: &Fixture, _: &Path) -> io::Result<Outcome> {
            Err(io::Error::new(io::ErrorKind::NotFound, "asc: command not found"))
        }
    }

    #[test]
    fn every_fixture_runs_when_all_succeed() {
        let manifest = Manifest::default();
        let mut invoker = ScriptedInvoker::new(None);
        let report = run_batch(&manifest, Path::new("."), &mut invoker).unwrap();
        assert!(report.is_success());
        assert_eq!(report.exit_code(), 0);
        assert_eq!(report.completed, manifest.fixtures);
        assert_eq!(invoker.invoked.len(), 18);
    }

    #[test_case(0, 1; "first fixture")]
    #[test_case(6, 2; "middle fixture")]
    #[test_case(17, 3; "last fixture")]
    fn failure_stops_the_batch(fail_at: usize, code: i32) {
        let manifest = Manifest::default();
        let mut invoker = ScriptedInvoker::new(Some((fail_at, code)));
        let report = run_batch(&manifest, Path::new("."), &mut invoker).unwrap();

        assert_eq!(invoker.invoked.len(), fail_at + 1);
        assert_eq!(report.completed.len(), fail_at);
        assert_eq!(report.exit_code(), code);
        let failure = report.failure.unwrap();
        assert_eq!(failure.index, fail_at);
        assert_eq!(failure.fixture, manifest.fixtures[fail_at]);
    }

    #[test]
    fn empty_manifest_succeeds() {
        let manifest = Manifest { fixtures: vec![], ..Default::default() };
        let report = run_batch(&manifest, Path::new("."), &mut ScriptedInvoker::new(None)).unwrap();
        assert_eq!(report, BatchReport::default());
    }

    #[test]
    fn unstartable_compiler_is_an_error() {
        let err = run_batch(&Manifest::default(), Path::new("."), &mut UnstartableInvoker)
            .unwrap_err();
        assert_eq!(err.exit_code(), SPAWN_FAILURE_EXIT_CODE);
        let BatchError::Spawn { index, .. } = err;
        assert_eq!(index, 0);
    }
}
