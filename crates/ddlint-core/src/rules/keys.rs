//! Key and index rules

use sqlparser::ast::{Statement, TableConstraint};

use crate::ast::{Node, Visit, Visitor};
use crate::error::LintError;
use crate::rules::{BaseLinter, Rule, RuleEntry};
use crate::schema::{constraint_index, extract_column, extract_table, object_name, IndexSpec};
use crate::script::{mentions, opens};

/// Words that open an index definition inside a column list
const INDEX_KEYWORDS: [&str; 3] = ["key", "index", "unique"];

/// Foreign keys are not allowed, neither as a table constraint nor as a
/// column-level `REFERENCES`.
#[derive(Debug)]
pub struct ForeignKeyLinter {
    base: BaseLinter,
}

impl ForeignKeyLinter {
    pub const ID: &'static str = "foreign-key";
    pub const ENTRY: RuleEntry = RuleEntry {
        id: Self::ID,
        description: "foreign keys are not allowed",
        constructor: Self::boxed,
    };

    pub fn new(base: BaseLinter) -> Self {
        Self { base }
    }

    fn boxed(base: BaseLinter) -> Box<dyn Rule> {
        Box::new(Self::new(base))
    }
}

impl Visitor for ForeignKeyLinter {
    fn enter(&mut self, node: &Node<'_>) -> Visit {
        self.base.checkpoint(node);
        if self.base.is_settled() {
            return Visit::Skip;
        }

        match node {
            Node::Constraint(TableConstraint::ForeignKey { .. }) => {
                self.base.report(
                    "foreign key is not allowed",
                    Some("enforce the relation in application code".to_string()),
                    |line| mentions(line, "foreign"),
                );
                Visit::Skip
            }
            Node::Column(column) => {
                if let Ok(spec) = extract_column(*column) {
                    if spec.references {
                        self.base.report_ident(
                            format!("foreign key reference on `{}` is not allowed", spec.name),
                            Some("enforce the relation in application code".to_string()),
                            &spec.name,
                        );
                    }
                }
                Visit::Skip
            }
            _ => Visit::Descend,
        }
    }

    fn leave(&mut self, _node: &Node<'_>) -> bool {
        !self.base.is_settled()
    }
}

impl Rule for ForeignKeyLinter {
    fn errors(&self) -> &[LintError] {
        self.base.errors()
    }
}

/// CREATE TABLE declares a primary key.
#[derive(Debug)]
pub struct PrimaryKeyLinter {
    base: BaseLinter,
}

impl PrimaryKeyLinter {
    pub const ID: &'static str = "primary-key";
    pub const ENTRY: RuleEntry = RuleEntry {
        id: Self::ID,
        description: "every table declares a primary key",
        constructor: Self::boxed,
    };

    pub fn new(base: BaseLinter) -> Self {
        Self { base }
    }

    fn boxed(base: BaseLinter) -> Box<dyn Rule> {
        Box::new(Self::new(base))
    }
}

impl Visitor for PrimaryKeyLinter {
    fn enter(&mut self, node: &Node<'_>) -> Visit {
        self.base.checkpoint(node);
        if let Some(Statement::CreateTable(create)) = node.as_statement() {
            let table = extract_table(create);
            if !table.has_primary_key() {
                self.base.report_ident(
                    format!("table `{}` has no primary key", table.name),
                    Some("add `id bigint NOT NULL AUTO_INCREMENT PRIMARY KEY`".to_string()),
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

impl Rule for PrimaryKeyLinter {
    fn errors(&self) -> &[LintError] {
        self.base.errors()
    }
}

/// Indexes are explicitly named: `idx_` for plain indexes, `uk_` or `uniq_`
/// for unique ones. Covers table constraints, ALTER TABLE ADD and CREATE INDEX.
#[derive(Debug)]
pub struct IndexNameLinter {
    base: BaseLinter,
}

impl IndexNameLinter {
    pub const ID: &'static str = "index-name";
    pub const ENTRY: RuleEntry = RuleEntry {
        id: Self::ID,
        description: "indexes are named idx_*, unique indexes uk_* or uniq_*",
        constructor: Self::boxed,
    };

    pub fn new(base: BaseLinter) -> Self {
        Self { base }
    }

    fn boxed(base: BaseLinter) -> Box<dyn Rule> {
        Box::new(Self::new(base))
    }

    /// `opening` locates an unnamed index's definition line
    fn check<F>(&mut self, index: &IndexSpec, opening: F)
    where
        F: Fn(&str) -> bool,
    {
        let Some(name) = index.name.as_deref() else {
            self.base
                .report("index should be explicitly named", None, opening);
            return;
        };

        let lowered = name.to_ascii_lowercase();
        let (ok, expected) = if index.unique {
            (
                lowered.starts_with("uk_") || lowered.starts_with("uniq_"),
                "uk_ or uniq_",
            )
        } else {
            (lowered.starts_with("idx_"), "idx_")
        };
        if !ok {
            self.base.report_ident(
                format!("index name `{}` should start with {}", name, expected),
                None,
                name,
            );
        }
    }
}

impl Visitor for IndexNameLinter {
    fn enter(&mut self, node: &Node<'_>) -> Visit {
        self.base.checkpoint(node);
        if self.base.is_settled() {
            return Visit::Skip;
        }

        match node {
            Node::Statement(Statement::CreateIndex(create)) => {
                let index = IndexSpec {
                    name: create.name.as_ref().map(object_name),
                    unique: create.unique,
                };
                self.check(&index, |line| mentions(line, "index"));
                Visit::Skip
            }
            Node::Constraint(constraint) => {
                if let Some(index) = constraint_index(constraint) {
                    self.check(&index, |line| {
                        INDEX_KEYWORDS.iter().any(|kw| opens(line, kw))
                    });
                }
                Visit::Skip
            }
            // Column definitions hold no index names
            Node::Column(_) => Visit::Skip,
            _ => Visit::Descend,
        }
    }

    fn leave(&mut self, _node: &Node<'_>) -> bool {
        !self.base.is_settled()
    }
}

impl Rule for IndexNameLinter {
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

    fn run(sql: &str, entry: RuleEntry) -> Option<LintError> {
        let script = Script::new("t.sql", sql);
        let stmt = Parser::parse_sql(&MySqlDialect {}, sql).unwrap().remove(0);
        let mut rule = entry.instantiate(script.clone(), script.cursor(), ReportMode::default());
        walk(&stmt, rule.as_mut());
        rule.error().cloned()
    }

    #[test]
    fn test_foreign_key_constraint() {
        let entry = ForeignKeyLinter::ENTRY;
        let err = run(
            "CREATE TABLE t (\n  user_id bigint,\n  FOREIGN KEY (user_id) REFERENCES u (id)\n)",
            entry,
        )
        .unwrap();
        assert_eq!(err.line(), Some(3));
        assert!(run("CREATE TABLE t (user_id bigint)", entry).is_none());
    }

    #[test]
    fn test_foreign_key_column_reference() {
        let entry = ForeignKeyLinter::ENTRY;
        let err = run("CREATE TABLE t (\n  user_id bigint REFERENCES u (id)\n)", entry).unwrap();
        assert_eq!(err.line(), Some(2));
    }

    #[test]
    fn test_primary_key() {
        let entry = PrimaryKeyLinter::ENTRY;
        assert!(run("CREATE TABLE t (id bigint PRIMARY KEY)", entry).is_none());
        assert!(run("CREATE TABLE t (id bigint, PRIMARY KEY (id))", entry).is_none());

        let err = run("CREATE TABLE t_log (\n  msg text\n)", entry).unwrap();
        assert_eq!(err.line(), Some(1));
        assert!(err.message.contains("t_log"));
    }

    #[test]
    fn test_index_name_constraints() {
        let entry = IndexNameLinter::ENTRY;
        assert!(run(
            "CREATE TABLE t (a int, b int, KEY idx_a (a), UNIQUE KEY uk_b (b))",
            entry
        )
        .is_none());

        let err = run(
            "CREATE TABLE t (\n  a int,\n  b int,\n  KEY idx_a (a),\n  UNIQUE KEY b_unique (b)\n)",
            entry,
        )
        .unwrap();
        assert_eq!(err.line(), Some(5));
        assert!(err.message.contains("uk_ or uniq_"));
    }

    #[test]
    fn test_unnamed_index_after_primary_key() {
        let err = run(
            "CREATE TABLE t (\n  id bigint NOT NULL,\n  name varchar(8) NOT NULL,\n  PRIMARY KEY (id),\n  KEY (name)\n);",
            IndexNameLinter::ENTRY,
        )
        .unwrap();
        assert_eq!(err.message, "index should be explicitly named");
        assert_eq!(err.line(), Some(5));
    }

    #[test]
    fn test_index_named_like_its_column() {
        let err = run(
            "CREATE TABLE t (\n  id bigint NOT NULL,\n  user_id bigint NOT NULL,\n  PRIMARY KEY (id),\n  KEY user_id (user_id)\n);",
            IndexNameLinter::ENTRY,
        )
        .unwrap();
        assert!(err.message.contains("`user_id` should start with idx_"));
        assert_eq!(err.line(), Some(5));
    }

    #[test]
    fn test_unnamed_index_ignores_column_key_options() {
        let err = run(
            "CREATE TABLE t (\n  id bigint PRIMARY KEY,\n  code varchar(8) UNIQUE,\n  INDEX (code)\n);",
            IndexNameLinter::ENTRY,
        )
        .unwrap();
        assert_eq!(err.line(), Some(4));
    }

    #[test]
    fn test_unnamed_index_single_line() {
        let err = run("CREATE TABLE t (a int, KEY (a))", IndexNameLinter::ENTRY).unwrap();
        assert_eq!(err.line(), Some(1));
    }

    #[test]
    fn test_unnamed_index_added_by_alter() {
        let err = run(
            "ALTER TABLE t\n  ADD COLUMN uniq_code int,\n  ADD UNIQUE (a)",
            IndexNameLinter::ENTRY,
        )
        .unwrap();
        assert_eq!(err.line(), Some(3));
    }

    #[test]
    fn test_foreign_key_after_mentioning_column() {
        let err = run(
            "CREATE TABLE t (\n  user_id bigint COMMENT 'foreign owner',\n  KEY idx_user (user_id),\n  CONSTRAINT fk_user FOREIGN KEY (user_id) REFERENCES u (id)\n)",
            ForeignKeyLinter::ENTRY,
        )
        .unwrap();
        assert_eq!(err.line(), Some(4));
    }

    #[test]
    fn test_create_index_statement() {
        let entry = IndexNameLinter::ENTRY;
        assert!(run("CREATE INDEX idx_a ON t (a)", entry).is_none());
        assert!(run("CREATE UNIQUE INDEX uniq_a ON t (a)", entry).is_none());
        assert!(run("CREATE INDEX a_index ON t (a)", entry).is_some());
    }
}
