use crate::expectation::Expectation;
use crate::test_id::TestId;
use crate::utils::file;
use relative_path::RelativePathBuf;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Clone, Debug)]
pub struct TestCase {
    pub id: TestId,
    pub fixture: RelativePathBuf,
    pub expectation: Expectation,
    pub failure_message: String,
}

impl TestCase {
    pub fn new(fixture: &str, expectation: Expectation, failure_message: &str) -> TestCase {
        TestCase {
            id: TestId::from_fixture(fixture),
            fixture: RelativePathBuf::from(fixture),
            expectation,
            failure_message: failure_message.to_owned(),
        }
    }
}

/// Captured from one interpreter invocation
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunResult {
    pub stdout: String,
    /// `None` if the process was terminated by a signal
    pub exit_status: Option<i32>,
}

#[derive(Debug, Error)]
pub enum RunError {
    #[error("failed to start '{program}': {source}")]
    Spawn { program: String, source: io::Error },
    #[error("failed to read standard output: {0}")]
    ReadStdout(io::Error),
    #[error("failed to wait for interpreter: {0}")]
    Wait(io::Error),
}

/// Executable that fixtures are passed to
#[derive(Clone, Debug)]
pub struct Interpreter {
    program: PathBuf,
}

impl Interpreter {
    /// Resolve `name` to an absolute path, looking in `in_dir` before PATH.
    ///
    /// An unresolvable name is kept as-is; spawning it later fails per case.
    pub fn resolve<P>(name: &str, in_dir: P) -> Interpreter
    where
        P: AsRef<Path>,
    {
        match file::find_executable_path(name, in_dir) {
            Ok(program) => {
                debug!(name, program = %program.display(), "resolved interpreter");
                Interpreter { program }
            }
            Err(err) => {
                warn!(name, %err, "interpreter not found, every case will fail");
                Interpreter {
                    program: PathBuf::from(name),
                }
            }
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

/// Run the interpreter on the fixture of `test_case`, blocking until it exits.
///
/// The child and its stdout pipe are owned by this function and dropped on every return path.
pub fn run(
    test_case: &TestCase,
    interpreter: &Interpreter,
    fixtures_dir: &Path,
) -> Result<RunResult, RunError> {
    let mut cmd = Command::new(interpreter.program());
    cmd.current_dir(fixtures_dir);
    cmd.arg(test_case.fixture.as_str());
    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::inherit());

    debug!(case = %test_case.id, fixture = %test_case.fixture, "spawning interpreter");

    let mut child = cmd.spawn().map_err(|source| RunError::Spawn {
        program: interpreter.program().display().to_string(),
        source,
    })?;

    let stdout = match child.stdout.take() {
        Some(mut pipe) => read_pipe_to_string(&mut pipe),
        None => Ok(String::new()),
    };

    // Reap the child even when reading failed
    let exit_status = child.wait().map_err(RunError::Wait)?;
    let stdout = stdout?;

    debug!(case = %test_case.id, exit_status = ?exit_status.code(), "interpreter exited");

    Ok(RunResult {
        stdout,
        exit_status: exit_status.code(),
    })
}

fn read_pipe_to_string<T>(pipe: &mut T) -> Result<String, RunError>
where
    T: Read,
{
    let mut buf: Vec<u8> = vec![];
    pipe.read_to_end(&mut buf).map_err(RunError::ReadStdout)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
