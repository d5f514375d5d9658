//! The built-in ZTest checks, grouped by the framework feature they exercise.

use crate::expectation::Expectation;
use crate::test_case::TestCase;

pub const DEFAULT_INTERPRETER: &str = "zeek";
pub const DEFAULT_FIXTURES_DIR: &str = "test_cases";

pub fn ztest_cases() -> Result<Vec<TestCase>, regex::Error> {
    let matches = Expectation::output_matches;

    Ok(vec![
        // Suppressing success output
        TestCase::new(
            "01_success_not_suppressed.zeek",
            matches("Total Assertions")?,
            "Didn't see success output when not suppressing it",
        ),
        TestCase::new(
            "01_success_suppressed_no_errors.zeek",
            Expectation::OutputEmpty,
            "Saw success output when not expecting to",
        ),
        TestCase::new(
            "01_success_suppressed_with_failures.zeek",
            matches("1 didn't equal 2")?,
            "Didn't see failure output when suppressing success output",
        ),
        // Suppressing all output
        TestCase::new(
            "02_all_output_suppressed.zeek",
            Expectation::OutputEmpty,
            "Saw some output when all output was supposed to be suppressed",
        ),
        // Hooking the interpreter exit
        TestCase::new(
            "03_hook_exit_success.zeek",
            Expectation::ExitCode(0),
            "Didn't observe an exit code of 0 when there were no failures",
        ),
        TestCase::new(
            "03_hook_exit_failure.zeek",
            Expectation::ExitCode(1),
            "Didn't observe an exit code of 1 when there was a failure and we were hooking the exit",
        ),
        // Assertions
        TestCase::new(
            "04_assert_pass_cases.zeek",
            matches("0 failed assertions")?,
            "Didn't see all assert_equal cases pass",
        ),
        TestCase::new(
            "04_assert_fail_cases.zeek",
            matches("59 failed assertions")?,
            "Didn't see all assert_equal cases fail",
        ),
        // Retrieving results
        TestCase::new(
            "05_retrieve_results.zeek",
            matches("Made it to the end without any invalid table key errors!")?,
            "Didn't Properly retrieve all results",
        ),
        // Manual exit
        TestCase::new(
            "06_manual_exit_with_success.zeek",
            Expectation::ExitCode(0),
            "Didn't observe an exit code of 0 when there were no failures on a manual exit",
        ),
        TestCase::new(
            "06_failure_with_no_exit_hook.zeek",
            Expectation::ExitCode(0),
            "Didn't observe an exit code of 0 when there were failures but no manual exit or hook",
        ),
        TestCase::new(
            "06_manual_exit_with_failure.zeek",
            Expectation::ExitCode(1),
            "Didn't observe an exit code of 1 when there were failures on a manual exit",
        ),
        // Tests run without an explicit run call
        TestCase::new(
            "07_no_run_called.zeek",
            matches("Total Assertions")?,
            "Didn't see success output when not calling ZTest::run_tests()",
        ),
        // Switching suites without an explicit run call
        TestCase::new(
            "08_switch_suites_without_running.zeek",
            Expectation::output_matches_across_lines("Suite 1.*Suite 2")?,
            "Didn't see success output when not calling ZTest::run_tests() in between test suites",
        ),
    ])
}
