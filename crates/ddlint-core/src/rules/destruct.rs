//! Destructive statements

use sqlparser::ast::{AlterTableOperation, ObjectType, Statement};

use crate::ast::{Node, Visit, Visitor};
use crate::error::LintError;
use crate::rules::{BaseLinter, Rule, RuleEntry};
use crate::script::mentions;

/// DROP TABLE, TRUNCATE and ALTER TABLE ... DROP COLUMN lose data and are
/// rejected.
#[derive(Debug)]
pub struct DestructLinter {
    base: BaseLinter,
}

impl DestructLinter {
    pub const ID: &'static str = "destruct";
    pub const ENTRY: RuleEntry = RuleEntry {
        id: Self::ID,
        description: "DROP TABLE, TRUNCATE and DROP COLUMN are not allowed",
        constructor: Self::boxed,
    };

    pub fn new(base: BaseLinter) -> Self {
        Self { base }
    }

    fn boxed(base: BaseLinter) -> Box<dyn Rule> {
        Box::new(Self::new(base))
    }
}

impl Visitor for DestructLinter {
    fn enter(&mut self, node: &Node<'_>) -> Visit {
        self.base.checkpoint(node);
        if self.base.is_settled() {
            return Visit::Skip;
        }

        match node {
            Node::Statement(Statement::Drop {
                object_type: ObjectType::Table,
                ..
            }) => {
                self.base
                    .report("dropping a table is not allowed", None, |line| {
                        mentions(line, "drop")
                    });
                Visit::Skip
            }
            Node::Statement(Statement::Truncate { .. }) => {
                self.base
                    .report("truncating a table is not allowed", None, |line| {
                        mentions(line, "truncate")
                    });
                Visit::Skip
            }
            Node::Statement(Statement::AlterTable { .. }) => Visit::Descend,
            Node::AlterOperation(AlterTableOperation::DropColumn { column_name, .. }) => {
                let name = column_name.value.as_str();
                self.base.report(
                    format!("dropping column `{}` is not allowed", name),
                    Some("stop writing the column instead of dropping it".to_string()),
                    |line| mentions(line, "drop") && mentions(line, name),
                );
                Visit::Skip
            }
            _ => Visit::Skip,
        }
    }

    fn leave(&mut self, _node: &Node<'_>) -> bool {
        !self.base.is_settled()
    }
}

impl Rule for DestructLinter {
    fn errors(&self) -> &[LintError] {
        self.base.errors()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::walk;
    use crate::rules::ReportMode;
    use crate::script::Script;
    use sqlparser::dialect::MySqlDialect;
    use sqlparser::parser::Parser;

    fn run(sql: &str) -> Option<LintError> {
        let script = Script::new("t.sql", sql);
        let stmt = Parser::parse_sql(&MySqlDialect {}, sql).unwrap().remove(0);
        let mut rule = DestructLinter::ENTRY.instantiate(
            script.clone(),
            script.cursor(),
            ReportMode::default(),
        );
        walk(&stmt, rule.as_mut());
        rule.error().cloned()
    }

    #[test]
    fn test_drop_table() {
        let err = run("DROP TABLE IF EXISTS t_user").unwrap();
        assert_eq!(err.line(), Some(1));
    }

    #[test]
    fn test_truncate() {
        assert!(run("TRUNCATE TABLE t_user").is_some());
    }

    #[test]
    fn test_drop_column() {
        let err = run("ALTER TABLE t_user\n  ADD COLUMN note text,\n  DROP COLUMN legacy").unwrap();
        assert_eq!(err.line(), Some(3));
        assert!(err.message.contains("legacy"));
    }

    #[test]
    fn test_create_is_fine() {
        assert!(run("CREATE TABLE t (id int)").is_none());
        assert!(run("ALTER TABLE t ADD COLUMN note text").is_none());
    }
}
