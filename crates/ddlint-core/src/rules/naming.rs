//! Identifier naming rules for tables and columns

use sqlparser::ast::Statement;

use crate::ast::{Node, Visit, Visitor};
use crate::error::LintError;
use crate::rules::{BaseLinter, Rule, RuleEntry};
use crate::schema::{extract_column, object_name};

/// MySQL identifier length limit
const MAX_IDENT_LEN: usize = 64;

/// Why an identifier fails the naming convention
fn naming_problem(name: &str) -> Option<&'static str> {
    if name.len() > MAX_IDENT_LEN {
        return Some("is longer than 64 characters");
    }
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() => {}
        _ => return Some("should start with a lowercase letter"),
    }
    if !chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_') {
        return Some("should be lower snake_case ASCII");
    }
    None
}

/// Column names are lower snake_case ASCII, start with a letter, and fit
/// the identifier length limit.
#[derive(Debug)]
pub struct ColumnNameLinter {
    base: BaseLinter,
}

impl ColumnNameLinter {
    pub const ID: &'static str = "column-name";
    pub const ENTRY: RuleEntry = RuleEntry {
        id: Self::ID,
        description: "column names are lower snake_case ASCII, at most 64 characters",
        constructor: Self::boxed,
    };

    pub fn new(base: BaseLinter) -> Self {
        Self { base }
    }

    fn boxed(base: BaseLinter) -> Box<dyn Rule> {
        Box::new(Self::new(base))
    }
}

impl Visitor for ColumnNameLinter {
    fn enter(&mut self, node: &Node<'_>) -> Visit {
        self.base.checkpoint(node);
        if self.base.is_settled() {
            return Visit::Skip;
        }
        let Some(column) = node.as_column() else {
            return Visit::Descend;
        };
        let Ok(spec) = extract_column(column) else {
            return Visit::Skip;
        };

        if let Some(problem) = naming_problem(&spec.name) {
            self.base.report_ident(
                format!("column name `{}` {}", spec.name, problem),
                Some(format!("e.g. {}", spec.name.to_ascii_lowercase())),
                &spec.name,
            );
        }
        Visit::Skip
    }

    fn leave(&mut self, _node: &Node<'_>) -> bool {
        !self.base.is_settled()
    }
}

impl Rule for ColumnNameLinter {
    fn errors(&self) -> &[LintError] {
        self.base.errors()
    }
}

/// Table names in CREATE TABLE follow the same convention as columns.
#[derive(Debug)]
pub struct TableNameLinter {
    base: BaseLinter,
}

impl TableNameLinter {
    pub const ID: &'static str = "table-name";
    pub const ENTRY: RuleEntry = RuleEntry {
        id: Self::ID,
        description: "table names are lower snake_case ASCII, at most 64 characters",
        constructor: Self::boxed,
    };

    pub fn new(base: BaseLinter) -> Self {
        Self { base }
    }

    fn boxed(base: BaseLinter) -> Box<dyn Rule> {
        Box::new(Self::new(base))
    }
}

impl Visitor for TableNameLinter {
    fn enter(&mut self, node: &Node<'_>) -> Visit {
        self.base.checkpoint(node);
        if let Some(Statement::CreateTable(create)) = node.as_statement() {
            let name = object_name(&create.name);
            if let Some(problem) = naming_problem(&name) {
                self.base.report_ident(
                    format!("table name `{}` {}", name, problem),
                    None,
                    &name,
                );
            }
        }
        // Only the statement itself is of interest
        Visit::Skip
    }

    fn leave(&mut self, _node: &Node<'_>) -> bool {
        !self.base.is_settled()
    }
}

impl Rule for TableNameLinter {
    fn errors(&self) -> &[LintError] {
        self.base.errors()
    }
}
