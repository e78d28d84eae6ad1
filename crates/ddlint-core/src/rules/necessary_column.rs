//! Bookkeeping columns every table must carry

use sqlparser::ast::Statement;

use crate::ast::{Node, Visit, Visitor};
use crate::error::LintError;
use crate::rules::{BaseLinter, Rule, RuleEntry};
use crate::schema::extract_table;

pub const NECESSARY_COLUMNS: &[&str] = &["id", "created_at", "updated_at"];

#[derive(Debug)]
pub struct NecessaryColumnLinter {
    base: BaseLinter,
}

impl NecessaryColumnLinter {
    pub const ID: &'static str = "necessary-column";
    pub const ENTRY: RuleEntry = RuleEntry {
        id: Self::ID,
        description: "every table has id, created_at and updated_at columns",
        constructor: Self::boxed,
    };

    pub fn new(base: BaseLinter) -> Self {
        Self { base }
    }

    fn boxed(base: BaseLinter) -> Box<dyn Rule> {
        Box::new(Self::new(base))
    }
}

impl Visitor for NecessaryColumnLinter {
    fn enter(&mut self, node: &Node<'_>) -> Visit {
        self.base.checkpoint(node);
        if let Some(Statement::CreateTable(create)) = node.as_statement() {
            let table = extract_table(create);
            let missing: Vec<&str> = NECESSARY_COLUMNS
                .iter()
                .copied()
                .filter(|name| table.get_column(name).is_none())
                .collect();
            if !missing.is_empty() {
                self.base.report_ident(
                    format!(
                        "table `{}` is missing necessary column(s): {}",
                        table.name,
                        missing.join(", ")
                    ),
                    None,
                    &table.name,
                );
            }
        }
        Visit::Skip
    }

    fn leave(&mut self, _node: &Node<'_>) -> bool {
        !self.base.is_settled()
    }
}

impl Rule for NecessaryColumnLinter {
    fn errors(&self) -> &[LintError] {
        self.base.errors()
    }
}
