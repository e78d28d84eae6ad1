//! Boolean columns must be named with a linking verb, and vice versa

use crate::ast::{Node, Visit, Visitor};
use crate::error::LintError;
use crate::rules::{BaseLinter, Rule, RuleEntry};
use crate::schema::extract_column;

const LINKING_VERBS: &[&str] = &["is_", "has_"];

/// Checks both directions of the boolean naming convention: a boolean-ish
/// column (`bool`, `boolean`, `tinyint(1)`, `bit`) needs an `is_`/`has_`
/// prefix, and a prefixed column needs a boolean-ish type.
#[derive(Debug)]
pub struct BooleanFieldLinter {
    base: BaseLinter,
}

impl BooleanFieldLinter {
    pub const ID: &'static str = "boolean-field";
    pub const ENTRY: RuleEntry = RuleEntry {
        id: Self::ID,
        description: "boolean columns are prefixed with is_/has_ and prefixed columns are boolean",
        constructor: Self::boxed,
    };

    pub fn new(base: BaseLinter) -> Self {
        Self { base }
    }

    fn boxed(base: BaseLinter) -> Box<dyn Rule> {
        Box::new(Self::new(base))
    }
}

fn has_linking_verb(name: &str) -> bool {
    let name = name.to_ascii_lowercase();
    LINKING_VERBS.iter().any(|p| name.starts_with(p))
}

impl Visitor for BooleanFieldLinter {
    fn enter(&mut self, node: &Node<'_>) -> Visit {
        self.base.checkpoint(node);
        if self.base.is_settled() {
            return Visit::Skip;
        }

        let Some(column) = node.as_column() else {
            return Visit::Descend;
        };
        let spec = match extract_column(column) {
            Ok(spec) => spec,
            Err(e) => {
                tracing::debug!(rule = Self::ID, "skipping column: {e}");
                return Visit::Skip;
            }
        };

        let prefixed = has_linking_verb(&spec.name);
        if spec.is_boolean() && !prefixed {
            self.base.report_ident(
                "boolean field should start with linking-verb, e.g. is_deleted, has_child",
                Some(format!("rename to is_{}", spec.name)),
                &spec.name,
            );
        } else if prefixed && !spec.is_boolean() {
            self.base.report_ident(
                "boolean field type should be tinyint(1) or boolean",
                Some(format!("`{}` is declared as {}", spec.name, spec.data_type)),
                &spec.name,
            );
        }

        Visit::Skip
    }

    fn leave(&mut self, _node: &Node<'_>) -> bool {
        !self.base.is_settled()
    }
}

impl Rule for BooleanFieldLinter {
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
        let mut rule = BooleanFieldLinter::ENTRY.instantiate(
            script.clone(),
            script.cursor(),
            ReportMode::default(),
        );
        walk(&stmt, rule.as_mut());
        rule.error().cloned()
    }

    #[test]
    fn test_prefixed_boolean_ok() {
        assert!(run("CREATE TABLE t (id int, is_deleted tinyint(1), has_child bool)").is_none());
    }

    #[test]
    fn test_unprefixed_boolean() {
        let err = run("CREATE TABLE t (\n  id int,\n  enabled bit\n)").unwrap();
        assert!(err.message.contains("linking-verb"));
        assert_eq!(err.line(), Some(3));
        assert_eq!(err.rule, "boolean-field");
    }

    #[test]
    fn test_prefixed_non_boolean() {
        let err = run("CREATE TABLE t (\n  is_deleted int\n)").unwrap();
        assert!(err.message.contains("tinyint(1) or boolean"));
        assert_eq!(err.line(), Some(2));
    }

    #[test]
    fn test_uppercase_type_matches() {
        assert!(run("CREATE TABLE t (is_ok TINYINT(1), IS_NEW BOOLEAN)").is_none());
    }

    #[test]
    fn test_plain_tinyint_is_not_boolean() {
        assert!(run("CREATE TABLE t (level tinyint)").is_none());
        assert!(run("CREATE TABLE t (is_level tinyint)").is_some());
    }

    #[test]
    fn test_located_on_definition_not_earlier_comment() {
        let err = run("CREATE TABLE t (\n  id int COMMENT 'see enabled',\n  enabled bit\n);").unwrap();
        assert_eq!(err.line(), Some(3));
    }

    #[test]
    fn test_modify_column() {
        let err = run("ALTER TABLE t MODIFY COLUMN is_deleted int;").unwrap();
        assert!(err.message.contains("tinyint(1) or boolean"));
        assert_eq!(err.line(), Some(1));
        assert!(run("ALTER TABLE t MODIFY COLUMN is_deleted tinyint(1) NOT NULL;").is_none());
    }

    #[test]
    fn test_change_column_checks_new_name() {
        let err = run("ALTER TABLE t\n  CHANGE COLUMN old enabled bit;").unwrap();
        assert!(err.message.contains("linking-verb"));
        assert_eq!(err.line(), Some(2));
        assert!(run("ALTER TABLE t CHANGE COLUMN enabled is_enabled bit;").is_none());
    }

    #[test]
    fn test_first_violation_wins() {
        let err = run("CREATE TABLE t (\n  enabled bit,\n  is_ok int\n)").unwrap();
        assert_eq!(err.line(), Some(2));
        assert!(err.message.contains("linking-verb"));
    }
}
