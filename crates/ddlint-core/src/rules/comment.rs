//! Comment presence rules

use sqlparser::ast::Statement;

use crate::ast::{Node, Visit, Visitor};
use crate::error::LintError;
use crate::rules::{BaseLinter, Rule, RuleEntry};
use crate::schema::{extract_column, extract_table};

/// Every column carries a non-empty `COMMENT`.
#[derive(Debug)]
pub struct ColumnCommentLinter {
    base: BaseLinter,
}

impl ColumnCommentLinter {
    pub const ID: &'static str = "column-comment";
    pub const ENTRY: RuleEntry = RuleEntry {
        id: Self::ID,
        description: "every column has a COMMENT",
        constructor: Self::boxed,
    };

    pub fn new(base: BaseLinter) -> Self {
        Self { base }
    }

    fn boxed(base: BaseLinter) -> Box<dyn Rule> {
        Box::new(Self::new(base))
    }
}

impl Visitor for ColumnCommentLinter {
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

        let commented = spec.comment.as_deref().is_some_and(|c| !c.trim().is_empty());
        if !commented {
            self.base.report_ident(
                format!("missing necessary column comment on `{}`", spec.name),
                Some("add COMMENT '...' to the column definition".to_string()),
                &spec.name,
            );
        }
        Visit::Skip
    }

    fn leave(&mut self, _node: &Node<'_>) -> bool {
        !self.base.is_settled()
    }
}

impl Rule for ColumnCommentLinter {
    fn errors(&self) -> &[LintError] {
        self.base.errors()
    }
}

/// CREATE TABLE carries a table-level `COMMENT`.
#[derive(Debug)]
pub struct TableCommentLinter {
    base: BaseLinter,
}

impl TableCommentLinter {
    pub const ID: &'static str = "table-comment";
    pub const ENTRY: RuleEntry = RuleEntry {
        id: Self::ID,
        description: "every table has a COMMENT",
        constructor: Self::boxed,
    };

    pub fn new(base: BaseLinter) -> Self {
        Self { base }
    }

    fn boxed(base: BaseLinter) -> Box<dyn Rule> {
        Box::new(Self::new(base))
    }
}

impl Visitor for TableCommentLinter {
    fn enter(&mut self, node: &Node<'_>) -> Visit {
        self.base.checkpoint(node);
        if let Some(Statement::CreateTable(create)) = node.as_statement() {
            let table = extract_table(create);
            if !table.has_comment {
                self.base.report_ident(
                    format!("missing necessary table comment on `{}`", table.name),
                    Some("add COMMENT '...' after the column list".to_string()),
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

impl Rule for TableCommentLinter {
    fn errors(&self) -> &[LintError] {
        self.base.errors()
    }
}
