use crate::test_case::{self, Interpreter, TestCase};
use crate::test_result::{CaseOutcome, RunSummary};
use colored::Colorize;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::{debug, info_span};

pub const SUCCESS_LINE: &str = "All tests completed successfully";
pub const FAILURE_LINE: &str = "Had at least one test failure! Exiting with status of 1";

pub struct RunConfig {
    pub interpreter: Interpreter,
    pub fixtures_dir: PathBuf,
    pub use_color: bool,
}

// RUN TEST CASES

/// Run every case in order, writing a block for each failure and a final summary line to `out`.
///
/// `summary` carries anything already known about the run, such as invalid cases.
pub fn run_test_cases<W>(
    out: &mut W,
    run_config: &RunConfig,
    test_cases: &[TestCase],
    mut summary: RunSummary,
) -> io::Result<RunSummary>
where
    W: Write,
{
    debug!(
        number_of_tests = test_cases.len(),
        fixtures_dir = %run_config.fixtures_dir.display(),
        "running test cases"
    );

    for test_case in test_cases {
        let outcome = run_case(out, run_config, test_case)?;
        summary.record(outcome);
    }

    report_summary(out, run_config, &summary)?;

    Ok(summary)
}

/// Run a single case. Silent on success.
pub fn run_case<W>(
    out: &mut W,
    run_config: &RunConfig,
    test_case: &TestCase,
) -> io::Result<CaseOutcome>
where
    W: Write,
{
    let _span = info_span!("case", id = %test_case.id).entered();

    let result = test_case::run(test_case, &run_config.interpreter, &run_config.fixtures_dir);

    let is_success = match &result {
        Ok(run_result) => test_case.expectation.is_met_by(run_result),
        Err(_) => false,
    };

    debug!(is_success, "evaluated expectation");

    if !is_success {
        report_failure(out, run_config, &test_case.failure_message)?;

        match &result {
            Ok(run_result) => write_dump(out, &run_result.stdout)?,
            Err(err) => writeln!(out, "Failed to run interpreter: {}", err)?,
        }
    }

    Ok(CaseOutcome {
        id: test_case.id.clone(),
        is_success,
    })
}

// REPORTING

fn report_failure<W>(out: &mut W, run_config: &RunConfig, message: &str) -> io::Result<()>
where
    W: Write,
{
    if run_config.use_color {
        writeln!(out, "{}", message.red().bold())
    } else {
        writeln!(out, "{}", message)
    }
}

/// Raw captured output, terminated by a newline
fn write_dump<W>(out: &mut W, stdout: &str) -> io::Result<()>
where
    W: Write,
{
    write!(out, "{}", stdout)?;
    if !stdout.ends_with('\n') {
        writeln!(out)?;
    }
    Ok(())
}

fn report_summary<W>(out: &mut W, run_config: &RunConfig, summary: &RunSummary) -> io::Result<()>
where
    W: Write,
{
    debug!(
        passed = summary.number_of_passed(),
        failed = summary.number_of_failed(),
        "finished"
    );

    let line = if summary.had_failure() {
        FAILURE_LINE
    } else {
        SUCCESS_LINE
    };

    if !run_config.use_color {
        writeln!(out, "{}", line)
    } else if summary.had_failure() {
        writeln!(out, "{}", line.red())
    } else {
        writeln!(out, "{}", line.green())
    }
}
