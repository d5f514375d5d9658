//! Render nested headings as a box-drawing tree

use std::fmt::{self, Write};

const BRANCH: &str = "├─ ";
const LAST_BRANCH: &str = "└─ ";
const PIPE: &str = "│  ";
const SPACE: &str = "   ";

#[derive(Clone, Debug, PartialEq)]
pub enum Tree {
    /// Heading with children
    Node(String, Vec<Tree>),
    /// Text block; lines after the first are aligned with the first
    Leaf(Vec<String>),
}

pub fn write_tree(f: &mut dyn Write, tree: &Tree) -> fmt::Result {
    match tree {
        Tree::Node(title, children) => {
            writeln!(f, "{}", title)?;
            write_children(f, children, "")
        }
        Tree::Leaf(lines) => write_lines(f, lines, "", ""),
    }
}

fn write_children(f: &mut dyn Write, children: &[Tree], prefix: &str) -> fmt::Result {
    for (i, child) in children.iter().enumerate() {
        let is_last = i + 1 == children.len();
        let (connector, continuation) = if is_last {
            (LAST_BRANCH, SPACE)
        } else {
            (BRANCH, PIPE)
        };

        let first_prefix = format!("{}{}", prefix, connector);
        let rest_prefix = format!("{}{}", prefix, continuation);

        match child {
            Tree::Node(title, grandchildren) => {
                writeln!(f, "{}{}", first_prefix, title)?;
                write_children(f, grandchildren, &rest_prefix)?;
            }
            Tree::Leaf(lines) => write_lines(f, lines, &first_prefix, &rest_prefix)?,
        }
    }

    Ok(())
}

fn write_lines(f: &mut dyn Write, lines: &[String], first: &str, rest: &str) -> fmt::Result {
    for (i, line) in lines.iter().enumerate() {
        let prefix = if i == 0 { first } else { rest };
        writeln!(f, "{}{}", prefix, line)?;
    }

    Ok(())
}
