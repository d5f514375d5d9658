use itertools::Itertools;
use std::path::Path;
use ztest_check::formats::tree::{self, Node, Tree};
use ztest_check::test_id::TestId;
use ztest_check::toml_config::{TomlConfigError, ValidTomlConfig};

pub fn any_issues_in_toml_config(config: &ValidTomlConfig) -> bool {
    !config.validation_errors.is_empty()
}

pub fn print_config_details(source_file: &Path, config: &ValidTomlConfig) {
    let categories = vec![Node(
        String::from("Validation errors"),
        tree::tree_from_validation_errors(&config.validation_errors),
    )];

    print_tree(Node(config_heading(source_file), categories));
}

pub fn print_toml_config_error(source_file: &Path, error: &TomlConfigError) {
    let tree = Node(
        config_heading(source_file),
        vec![tree::str_to_tree(&format!("❌ {}", error))],
    );

    print_tree(tree);
}

pub fn print_unknown_cases(unknown: &[TestId]) {
    eprintln!(
        "Unknown test case: {}",
        unknown.iter().map(|id| format!("'{}'", id)).join(", ")
    );
}

fn print_tree(tree: Tree) {
    let content = tree::draw_tree(&tree).unwrap_or_else(|_| String::from("Failed to draw tree\n"));

    eprint!("{}", content); // Already contains newline
    eprintln!()
}

fn config_heading(source_file: &Path) -> String {
    format!("📋 {}", source_file.display())
}
