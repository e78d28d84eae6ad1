//! Nullability rule

use crate::ast::{Node, Visit, Visitor};
use crate::error::LintError;
use crate::rules::{BaseLinter, Rule, RuleEntry};
use crate::schema::extract_column;

/// Columns are declared `NOT NULL`; a column-level primary key counts.
#[derive(Debug)]
pub struct NotNullLinter {
    base: BaseLinter,
}

impl NotNullLinter {
    pub const ID: &'static str = "not-null";
    pub const ENTRY: RuleEntry = RuleEntry {
        id: Self::ID,
        description: "columns are declared NOT NULL",
        constructor: Self::boxed,
    };

    pub fn new(base: BaseLinter) -> Self {
        Self { base }
    }

    fn boxed(base: BaseLinter) -> Box<dyn Rule> {
        Box::new(Self::new(base))
    }
}

impl Visitor for NotNullLinter {
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

        if !spec.not_null {
            self.base.report_ident(
                format!("column `{}` should be NOT NULL", spec.name),
                Some("declare NOT NULL with a DEFAULT".to_string()),
                &spec.name,
            );
        }
        Visit::Skip
    }

    fn leave(&mut self, _node: &Node<'_>) -> bool {
        !self.base.is_settled()
    }
}

impl Rule for NotNullLinter {
    fn errors(&self) -> &[LintError] {
        self.base.errors()
    }
}
