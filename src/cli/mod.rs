pub mod report;

use clap::Parser;
use std::path::PathBuf;
use ztest_check::test_id::TestId;

pub fn parse() -> Args {
    Args::parse()
}

/// Check the ZTest framework by running an interpreter against fixture scripts
#[derive(Parser)]
#[clap(bin_name = "ztest-check")]
pub struct Args {
    /// Path to a TOML file with test cases. Runs the built-in suite if omitted
    pub config: Option<PathBuf>,

    /// Interpreter to run fixtures with [default: zeek]
    #[arg(long)]
    pub interpreter: Option<String>,

    /// Directory the fixture paths are relative to [default: test_cases]
    #[arg(long)]
    pub fixtures_dir: Option<PathBuf>,

    /// Only run the test case with this id (can be repeated)
    #[arg(long = "case", value_name = "ID", value_parser = parse_test_id)]
    pub cases: Vec<TestId>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Print debug logs to stderr
    #[arg(long)]
    pub verbose: bool,
}

fn parse_test_id(s: &str) -> Result<TestId, &'static str> {
    if s.is_empty() {
        Err("Test case id cannot be empty")
    } else {
        Ok(TestId::new(s))
    }
}
