use crate::test_case::RunResult;
use regex::{Regex, RegexBuilder};

/// What a test case requires of a finished interpreter run
#[derive(Clone, Debug)]
pub enum Expectation {
    OutputMatches(Regex),
    OutputEmpty,
    ExitCode(i32),
}

impl Expectation {
    /// Standard output must contain a match for `pattern`
    pub fn output_matches(pattern: &str) -> Result<Expectation, regex::Error> {
        Regex::new(pattern).map(Self::OutputMatches)
    }

    /// Like `output_matches`, but `.` also matches newlines so the pattern
    /// can assert the order of blocks printed on different lines.
    pub fn output_matches_across_lines(pattern: &str) -> Result<Expectation, regex::Error> {
        RegexBuilder::new(pattern)
            .dot_matches_new_line(true)
            .build()
            .map(Self::OutputMatches)
    }

    pub fn is_met_by(&self, run_result: &RunResult) -> bool {
        match self {
            Self::OutputMatches(pattern) => pattern.is_match(&run_result.stdout),
            Self::OutputEmpty => run_result.stdout.is_empty(),
            Self::ExitCode(code) => run_result.exit_status == Some(*code),
        }
    }
}
