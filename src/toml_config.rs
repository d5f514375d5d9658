use crate::expectation::Expectation;
use crate::test_case::TestCase;
use crate::test_id::TestId;
use crate::utils::file;
use relative_path::RelativePathBuf;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

// READ CONFIG FILE

pub struct ValidTomlConfig {
    pub interpreter: Option<String>,
    /// Already resolved against the directory of the config file
    pub fixtures_dir: Option<PathBuf>,
    /// Directory the config file lives in; relative interpreter names are looked up here first
    pub source_dir: PathBuf,
    pub validation_errors: Vec<(TestId, BTreeSet<TestCaseValidationError>)>,
    pub test_cases: Vec<TestCase>,
}

#[derive(Debug, Error)]
pub enum TomlConfigError {
    #[error("Failed to read file: {0}")]
    FailedToReadFile(#[source] io::Error),
    #[error("Failed to parse config file: {0}")]
    FailedToParseTomlConfig(#[source] toml::de::Error),
    #[error("Invalid setting '{field}': {error}")]
    InvalidSetting {
        field: &'static str,
        error: TestCaseValidationError,
    },
}

pub fn parse_toml_config(source_file: &Path) -> Result<ValidTomlConfig, TomlConfigError> {
    let toml_content =
        fs::read_to_string(source_file).map_err(TomlConfigError::FailedToReadFile)?;

    let source_dir = match source_file.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let fallback_id = TestId::from_fixture(source_file);

    parse_toml_str(&toml_content, &source_dir, fallback_id)
}

/// Parse config content. `fallback_id` names a file-level case whose fixture could not be read.
pub fn parse_toml_str(
    toml_content: &str,
    source_dir: &Path,
    fallback_id: TestId,
) -> Result<ValidTomlConfig, TomlConfigError> {
    let mut toml_config = toml::from_str::<TomlConfig>(toml_content)
        .map_err(TomlConfigError::FailedToParseTomlConfig)?;

    let interpreter = read_setting("interpreter", toml_config.interpreter.take(), source_dir)?;
    let fixtures_dir = read_setting("fixtures_dir", toml_config.fixtures_dir.take(), source_dir)?
        .map(|dir| file::resolve_in(dir, source_dir));

    let mut test_cases = vec![];
    let mut validation_errors = vec![];

    for (name, toml_config) in split_toml_config(toml_config) {
        match build_test_case(toml_config, name, source_dir, &fallback_id) {
            Ok(test_case) => test_cases.push(test_case),
            Err(err) => validation_errors.push(err),
        }
    }

    Ok(ValidTomlConfig {
        interpreter,
        fixtures_dir,
        source_dir: source_dir.to_path_buf(),
        validation_errors,
        test_cases,
    })
}

fn read_setting(
    field: &'static str,
    config_value: Option<ConfigValue<String>>,
    source_dir: &Path,
) -> Result<Option<String>, TomlConfigError> {
    config_value
        .map(|value| value.read(source_dir))
        .transpose()
        .map_err(|error| TomlConfigError::InvalidSetting { field, error })
}

// TOML STRUCTURE

#[derive(Deserialize, Clone)]
#[serde(deny_unknown_fields)]
struct TomlConfig {
    interpreter: Option<ConfigValue<String>>,
    fixtures_dir: Option<ConfigValue<String>>,
    fixture: Option<ConfigValue<String>>,
    failure_message: Option<ConfigValue<String>>,
    expected_stdout_match: Option<ConfigValue<String>>,
    expected_stdout_empty: Option<ConfigValue<bool>>,
    expected_exit_code: Option<ConfigValue<i32>>,
    match_across_lines: Option<ConfigValue<bool>>,
    tests: Option<BTreeMap<String, TomlConfig>>,
}

#[derive(Deserialize, Clone)]
#[serde(untagged)]
enum ConfigValue<T> {
    Literal(T),
    WrappedLiteral { value: T },
    ReadFromFile { file: String },
    FetchFromEnv { env: String },
}

// CREATE TEST CASES

#[derive(Debug, Error, PartialEq, Eq, PartialOrd, Ord, Clone)]
pub enum TestCaseValidationError {
    #[error("Missing external file '{0}'")]
    MissingExternalFile(String),
    #[error("Missing environment variable '{0}'")]
    MissingEnvVar(String),
    #[error("Failed to parse string '{0}'")]
    FailedToParseString(String),
    #[error("The field 'fixture' is required")]
    FixtureRequired,
    #[error("One expectation is required: 'expected_stdout_match', 'expected_stdout_empty' or 'expected_exit_code'")]
    ExpectationRequired,
    #[error("Only one expectation is allowed, found {0}")]
    ConflictingExpectations(String),
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),
    #[error("The field '{0}' is only allowed at the top level")]
    TopLevelOnly(&'static str),
    #[error("The field 'match_across_lines' is only valid with 'expected_stdout_match'")]
    MatchAcrossLinesWithoutPattern,
}

fn build_test_case(
    toml_config: TomlConfig,
    name: Option<String>,
    source_dir: &Path,
    fallback_id: &TestId,
) -> Result<TestCase, (TestId, BTreeSet<TestCaseValidationError>)> {
    let mut validation_errors = BTreeSet::new();

    // Validate fields in config file

    if toml_config.interpreter.is_some() {
        validation_errors.insert(TestCaseValidationError::TopLevelOnly("interpreter"));
    }

    if toml_config.fixtures_dir.is_some() {
        validation_errors.insert(TestCaseValidationError::TopLevelOnly("fixtures_dir"));
    }

    if toml_config.fixture.is_none() {
        validation_errors.insert(TestCaseValidationError::FixtureRequired);
    }

    if toml_config.match_across_lines.is_some() && toml_config.expected_stdout_match.is_none() {
        validation_errors.insert(TestCaseValidationError::MatchAcrossLinesWithoutPattern);
    }

    // Read fields

    let fixture = read_from_config_value(&mut validation_errors, toml_config.fixture, source_dir);
    let failure_message =
        read_from_config_value(&mut validation_errors, toml_config.failure_message, source_dir);
    let expected_stdout_match = read_from_config_value(
        &mut validation_errors,
        toml_config.expected_stdout_match,
        source_dir,
    );
    let expected_stdout_empty = read_from_config_value(
        &mut validation_errors,
        toml_config.expected_stdout_empty,
        source_dir,
    )
    .unwrap_or(false);
    let expected_exit_code = read_from_config_value(
        &mut validation_errors,
        toml_config.expected_exit_code,
        source_dir,
    );
    let match_across_lines = read_from_config_value(
        &mut validation_errors,
        toml_config.match_across_lines,
        source_dir,
    )
    .unwrap_or(false);

    let id = match (name, &fixture) {
        (Some(name), _) => TestId::new(name),
        (None, Some(fixture)) => TestId::from_fixture(fixture),
        (None, None) => fallback_id.clone(),
    };

    // Validate fields

    let mut expectations = vec![];
    if let Some(pattern) = expected_stdout_match {
        let expectation = if match_across_lines {
            Expectation::output_matches_across_lines(&pattern)
        } else {
            Expectation::output_matches(&pattern)
        };

        match expectation {
            Ok(expectation) => expectations.push(("expected_stdout_match", expectation)),
            Err(err) => {
                validation_errors.insert(TestCaseValidationError::InvalidPattern(err.to_string()));
            }
        }
    }
    if expected_stdout_empty {
        expectations.push(("expected_stdout_empty", Expectation::OutputEmpty));
    }
    if let Some(code) = expected_exit_code {
        expectations.push(("expected_exit_code", Expectation::ExitCode(code)));
    }

    let has_invalid_pattern = validation_errors
        .iter()
        .any(|err| matches!(err, TestCaseValidationError::InvalidPattern(_)));

    if expectations.len() > 1 {
        let fields = expectations
            .iter()
            .map(|(field, _)| format!("'{}'", field))
            .collect::<Vec<_>>();
        validation_errors.insert(TestCaseValidationError::ConflictingExpectations(
            itertools::join(fields, ", "),
        ));
    } else if expectations.is_empty() && !has_invalid_pattern {
        validation_errors.insert(TestCaseValidationError::ExpectationRequired);
    }

    match (fixture, expectations.pop()) {
        (Some(fixture), Some((_, expectation))) if validation_errors.is_empty() => {
            let failure_message = failure_message
                .unwrap_or_else(|| format!("Expectation not met for '{}'", fixture));

            Ok(TestCase {
                id,
                fixture: RelativePathBuf::from(fixture),
                expectation,
                failure_message,
            })
        }
        _ => Err((id, validation_errors)),
    }
}

fn read_from_config_value<T>(
    validation_errors: &mut BTreeSet<TestCaseValidationError>,
    config_value: Option<ConfigValue<T>>,
    source_dir: &Path,
) -> Option<T>
where
    T: FromStr,
{
    match config_value?.read(source_dir) {
        Ok(value) => Some(value),
        Err(err) => {
            validation_errors.insert(err);
            None
        }
    }
}

// Currently only merges a single level
fn split_toml_config(base_config: TomlConfig) -> Vec<(Option<String>, TomlConfig)> {
    if let Some(tests) = base_config.tests.clone() {
        tests
            .into_iter()
            .map(|(name, sub_config)| {
                (Some(name), merge_toml_configs(base_config.clone(), sub_config))
            })
            .collect()
    } else {
        vec![(None, base_config)]
    }
}

fn merge_toml_configs(base_config: TomlConfig, prioritized_config: TomlConfig) -> TomlConfig {
    TomlConfig {
        // Top-level settings are taken out before splitting, so these only
        // hold values written inside a test table
        interpreter: prioritized_config.interpreter,
        fixtures_dir: prioritized_config.fixtures_dir,
        fixture: prioritized_config.fixture.or(base_config.fixture),
        failure_message: prioritized_config
            .failure_message
            .or(base_config.failure_message),
        expected_stdout_match: prioritized_config
            .expected_stdout_match
            .or(base_config.expected_stdout_match),
        expected_stdout_empty: prioritized_config
            .expected_stdout_empty
            .or(base_config.expected_stdout_empty),
        expected_exit_code: prioritized_config
            .expected_exit_code
            .or(base_config.expected_exit_code),
        match_across_lines: prioritized_config
            .match_across_lines
            .or(base_config.match_across_lines),
        tests: prioritized_config.tests, // Do not propagate tests from `base_config`
    }
}

impl<T> ConfigValue<T>
where
    T: FromStr,
{
    fn read(self, source_dir: &Path) -> Result<T, TestCaseValidationError> {
        match self {
            Self::Literal(value) => Ok(value),
            Self::WrappedLiteral { value } => Ok(value),
            Self::ReadFromFile { file: file_path } => {
                let content = fs::read_to_string(source_dir.join(&file_path))
                    .map_err(|_err| TestCaseValidationError::MissingExternalFile(file_path))?;
                // Editors add a final newline that is not part of the value
                let content = content.strip_suffix('\n').unwrap_or(&content);
                parse_string(content)
            }
            Self::FetchFromEnv { env: var_name } => {
                let value = env::var(&var_name)
                    .map_err(|_err| TestCaseValidationError::MissingEnvVar(var_name))?;
                parse_string(&value)
            }
        }
    }
}

fn parse_string<T>(str: &str) -> Result<T, TestCaseValidationError>
where
    T: FromStr,
{
    str.parse()
        .map_err(|_err| TestCaseValidationError::FailedToParseString(str.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    fn parse(content: &str) -> ValidTomlConfig {
        let source_dir = env::current_dir().unwrap().join("tests/fixtures");
        parse_toml_str(content, &source_dir, TestId::new("config")).unwrap()
    }

    fn errors_of(config: &ValidTomlConfig, id: &str) -> BTreeSet<TestCaseValidationError> {
        config
            .validation_errors
            .iter()
            .find(|(test_id, _)| test_id.as_str() == id)
            .map(|(_, errs)| errs.clone())
            .unwrap_or_default()
    }

    #[test]
    fn test_single_case_at_top_level() {
        let config = parse(indoc! {r#"
            fixture = "01_success_not_suppressed.zeek"
            expected_stdout_match = "Total Assertions"
            failure_message = "Didn't see success output"
        "#});

        assert!(config.validation_errors.is_empty());
        assert_eq!(config.test_cases.len(), 1);

        let test_case = &config.test_cases[0];
        assert_eq!(test_case.id, TestId::new("01_success_not_suppressed"));
        assert_eq!(test_case.failure_message, "Didn't see success output");
        assert!(matches!(test_case.expectation, Expectation::OutputMatches(_)));
    }

    #[test]
    fn test_tests_inherit_from_top_level() {
        let config = parse(indoc! {r#"
            interpreter = "sh"
            fixtures_dir = "."
            expected_exit_code = 0

            [tests.hook_exit_success]
            fixture = "03_hook_exit_success.zeek"

            [tests.hook_exit_failure]
            fixture = "03_hook_exit_failure.zeek"
            expected_exit_code = 1
            failure_message = "Didn't observe an exit code of 1"
        "#});

        assert!(config.validation_errors.is_empty());
        assert_eq!(config.interpreter.as_deref(), Some("sh"));
        assert_eq!(config.fixtures_dir, Some(config.source_dir.join(".")));

        let ids: Vec<_> = config.test_cases.iter().map(|t| t.id.to_string()).collect();
        assert_eq!(ids, vec!["hook_exit_failure", "hook_exit_success"]);

        assert!(matches!(
            config.test_cases[0].expectation,
            Expectation::ExitCode(1)
        ));
        assert!(matches!(
            config.test_cases[1].expectation,
            Expectation::ExitCode(0)
        ));
        assert_eq!(
            config.test_cases[1].failure_message,
            "Expectation not met for '03_hook_exit_success.zeek'"
        );
    }

    #[test]
    fn test_match_across_lines() {
        let config = parse(indoc! {r#"
            fixture = "08_switch_suites_without_running.zeek"
            expected_stdout_match = "Suite 1.*Suite 2"
            match_across_lines = true
        "#});

        let test_case = &config.test_cases[0];
        match &test_case.expectation {
            Expectation::OutputMatches(pattern) => {
                assert!(pattern.is_match("Suite 1\nSuite 2\n"));
            }
            _ => panic!("expected a pattern"),
        }
    }

    #[test]
    fn test_empty_output_expectation() {
        let config = parse(indoc! {r#"
            fixture = "02_all_output_suppressed.zeek"
            expected_stdout_empty = true
        "#});

        assert!(matches!(
            config.test_cases[0].expectation,
            Expectation::OutputEmpty
        ));
    }

    #[test]
    fn test_expectation_required() {
        let config = parse(indoc! {r#"
            [tests.no_expectation]
            fixture = "a.zeek"

            [tests.stdout_empty_false]
            fixture = "b.zeek"
            expected_stdout_empty = false
        "#});

        assert!(config.test_cases.is_empty());
        assert_eq!(
            errors_of(&config, "no_expectation"),
            BTreeSet::from([TestCaseValidationError::ExpectationRequired])
        );
        assert_eq!(
            errors_of(&config, "stdout_empty_false"),
            BTreeSet::from([TestCaseValidationError::ExpectationRequired])
        );
    }

    #[test]
    fn test_conflicting_expectations() {
        let config = parse(indoc! {r#"
            [tests.both]
            fixture = "a.zeek"
            expected_stdout_empty = true
            expected_exit_code = 0
        "#});

        assert_eq!(
            errors_of(&config, "both"),
            BTreeSet::from([TestCaseValidationError::ConflictingExpectations(
                String::from("'expected_stdout_empty', 'expected_exit_code'")
            )])
        );
    }

    #[test]
    fn test_fixture_required() {
        let config = parse(indoc! {r#"
            expected_exit_code = 0
        "#});

        assert_eq!(
            errors_of(&config, "config"),
            BTreeSet::from([TestCaseValidationError::FixtureRequired])
        );
    }

    #[test]
    fn test_invalid_pattern() {
        let config = parse(indoc! {r#"
            [tests.bad_pattern]
            fixture = "a.zeek"
            expected_stdout_match = "(unclosed"
        "#});

        let errors = errors_of(&config, "bad_pattern");
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            errors.iter().next(),
            Some(TestCaseValidationError::InvalidPattern(_))
        ));
    }

    #[test]
    fn test_valid_cases_survive_invalid_siblings() {
        let config = parse(indoc! {r#"
            [tests.good]
            fixture = "a.zeek"
            expected_exit_code = 0

            [tests.bad]
            expected_exit_code = 0
        "#});

        assert_eq!(config.test_cases.len(), 1);
        assert_eq!(config.validation_errors.len(), 1);
        assert_eq!(config.validation_errors[0].0, TestId::new("bad"));
    }

    #[test]
    fn test_match_across_lines_requires_pattern() {
        let config = parse(indoc! {r#"
            [tests.exit_code_across_lines]
            fixture = "a.zeek"
            expected_exit_code = 0
            match_across_lines = true
        "#});

        assert!(config.test_cases.is_empty());
        assert_eq!(
            errors_of(&config, "exit_code_across_lines"),
            BTreeSet::from([TestCaseValidationError::MatchAcrossLinesWithoutPattern])
        );
    }

    #[test]
    fn test_match_across_lines_inherited_with_pattern() {
        let config = parse(indoc! {r#"
            match_across_lines = true

            [tests.ordered]
            fixture = "a.zeek"
            expected_stdout_match = "Suite 1.*Suite 2"
        "#});

        assert!(config.validation_errors.is_empty());
        assert_eq!(config.test_cases.len(), 1);
    }

    #[test]
    fn test_interpreter_only_at_top_level() {
        let config = parse(indoc! {r#"
            [tests.nested]
            interpreter = "sh"
            fixture = "a.zeek"
            expected_exit_code = 0
        "#});

        assert_eq!(
            errors_of(&config, "nested"),
            BTreeSet::from([TestCaseValidationError::TopLevelOnly("interpreter")])
        );
    }

    #[test]
    fn test_value_from_file() {
        let config = parse(indoc! {r#"
            fixture = "a.zeek"
            expected_stdout_match = { file = "pattern.txt" }
        "#});

        match &config.test_cases[0].expectation {
            Expectation::OutputMatches(pattern) => {
                assert_eq!(pattern.as_str(), "Total Assertions");
            }
            _ => panic!("expected a pattern"),
        }
    }

    #[test]
    fn test_missing_external_file() {
        let config = parse(indoc! {r#"
            fixture = "a.zeek"
            expected_stdout_match = { file = "missing.txt" }
        "#});

        let errors = errors_of(&config, "a");
        assert!(errors.contains(&TestCaseValidationError::MissingExternalFile(String::from(
            "missing.txt"
        ))));
    }

    #[test]
    fn test_missing_env_var() {
        let config = parse(indoc! {r#"
            fixture = "a.zeek"
            expected_exit_code = { env = "ZTEST_CHECK_SURELY_UNSET_VARIABLE" }
        "#});

        assert_eq!(
            errors_of(&config, "a"),
            BTreeSet::from([
                TestCaseValidationError::ExpectationRequired,
                TestCaseValidationError::MissingEnvVar(String::from(
                    "ZTEST_CHECK_SURELY_UNSET_VARIABLE"
                )),
            ])
        );
    }

    #[test]
    fn test_wrapped_literal() {
        let config = parse(indoc! {r#"
            fixture = { value = "a.zeek" }
            expected_exit_code = { value = 1 }
        "#});

        assert!(matches!(
            config.test_cases[0].expectation,
            Expectation::ExitCode(1)
        ));
    }

    #[test]
    fn test_invalid_top_level_setting() {
        let source_dir = env::current_dir().unwrap();
        let result = parse_toml_str(
            r#"interpreter = { file = "missing-interpreter.txt" }"#,
            &source_dir,
            TestId::new("config"),
        );

        assert!(matches!(
            result,
            Err(TomlConfigError::InvalidSetting {
                field: "interpreter",
                ..
            })
        ));
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let source_dir = env::current_dir().unwrap();
        let result = parse_toml_str(
            r#"expected_stderr = "nope""#,
            &source_dir,
            TestId::new("config"),
        );

        assert!(matches!(
            result,
            Err(TomlConfigError::FailedToParseTomlConfig(_))
        ));
    }
}
