mod cli;

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;
use ztest_check::suite::{self, DEFAULT_FIXTURES_DIR, DEFAULT_INTERPRETER};
use ztest_check::test_case::{Interpreter, TestCase};
use ztest_check::test_id::TestIdSelection;
use ztest_check::test_result::RunSummary;
use ztest_check::test_runner::{self, RunConfig};
use ztest_check::toml_config::{self, ValidTomlConfig};

fn main() -> ExitCode {
    let args = cli::parse();

    init_logging(args.verbose);

    if args.no_color {
        colored::control::set_override(false);
    }

    let (test_cases, config) = match load_test_cases(&args) {
        Some(loaded) => loaded,
        None => return ExitCode::FAILURE,
    };

    let selection = if args.cases.is_empty() {
        TestIdSelection::all()
    } else {
        TestIdSelection::only(args.cases.clone())
    };

    // Ids of invalid cases are still known ids
    let invalid_ids = config
        .iter()
        .flat_map(|config| config.validation_errors.iter().map(|(id, _)| id));
    let unknown = selection.unknown(test_cases.iter().map(|t| &t.id).chain(invalid_ids));
    if !unknown.is_empty() {
        cli::report::print_unknown_cases(&unknown);
        return ExitCode::FAILURE;
    }

    let mut summary = RunSummary::new();

    if let (Some(config), Some(path)) = (&config, &args.config) {
        if cli::report::any_issues_in_toml_config(config) {
            cli::report::print_config_details(path, config);
        }

        let invalid_cases = config
            .validation_errors
            .iter()
            .filter(|(id, _)| selection.includes(id))
            .count();
        summary.record_invalid_cases(invalid_cases);
    }

    let test_cases: Vec<TestCase> = test_cases
        .into_iter()
        .filter(|t| selection.includes(&t.id))
        .collect();

    let run_config = build_run_config(&args, config.as_ref());

    let result = test_runner::run_test_cases(
        &mut io::stdout().lock(),
        &run_config,
        &test_cases,
        summary,
    );

    match result {
        Ok(summary) => ExitCode::from(summary.exit_code()),
        Err(err) => {
            error!(%err, "failed to write report");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };

    // Logs go to stderr; stdout is reserved for the test report
    let _ = tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .try_init();
}

/// Built-in suite, or the cases of the config file given on the command line
fn load_test_cases(args: &cli::Args) -> Option<(Vec<TestCase>, Option<ValidTomlConfig>)> {
    match &args.config {
        None => match suite::ztest_cases() {
            Ok(test_cases) => Some((test_cases, None)),
            Err(err) => {
                error!(%err, "invalid pattern in built-in suite");
                None
            }
        },
        Some(path) => match toml_config::parse_toml_config(path) {
            Ok(mut config) => {
                debug!(
                    config = %path.display(),
                    valid = config.test_cases.len(),
                    invalid = config.validation_errors.len(),
                    "loaded config file"
                );
                let test_cases = std::mem::take(&mut config.test_cases);
                Some((test_cases, Some(config)))
            }
            Err(err) => {
                cli::report::print_toml_config_error(path, &err);
                None
            }
        },
    }
}

/// Command line flags win over the config file, which wins over the defaults
fn build_run_config(args: &cli::Args, config: Option<&ValidTomlConfig>) -> RunConfig {
    let current_dir = PathBuf::from(".");

    let interpreter = match (&args.interpreter, config) {
        (Some(name), _) => Interpreter::resolve(name, &current_dir),
        (None, Some(ValidTomlConfig {
            interpreter: Some(name),
            source_dir,
            ..
        })) => Interpreter::resolve(name, source_dir),
        _ => Interpreter::resolve(DEFAULT_INTERPRETER, &current_dir),
    };

    let fixtures_dir = match (&args.fixtures_dir, config) {
        (Some(dir), _) => dir.clone(),
        (None, Some(config)) => config
            .fixtures_dir
            .clone()
            .unwrap_or_else(|| config.source_dir.clone()),
        (None, None) => PathBuf::from(DEFAULT_FIXTURES_DIR),
    };

    RunConfig {
        interpreter,
        fixtures_dir,
        use_color: !args.no_color,
    }
}
