use crate::ascii_tree;
pub use crate::ascii_tree::Tree::{self, Leaf, Node};
use crate::test_id::TestId;
use crate::toml_config::TestCaseValidationError;
use std::collections::BTreeSet;
use std::fmt::Error;

pub fn draw_tree(tree: &Tree) -> Result<String, Error> {
    let mut output = String::new();
    ascii_tree::write_tree(&mut output, tree)?;
    Ok(output)
}

// ERROR FORMATTING

pub fn tree_from_validation_errors(
    validation_errors: &[(TestId, BTreeSet<TestCaseValidationError>)],
) -> Vec<Tree> {
    validation_errors
        .iter()
        .map(|(test_id, errs)| {
            Node(
                test_id.to_string(),
                errs.iter().map(|err| str_to_tree(&format!("❌ {}", err))).collect(),
            )
        })
        .collect()
}

pub fn str_to_tree(msg: &str) -> Tree {
    Leaf(vec![msg.to_owned()])
}

// TESTS
