//! Node protocol for rule traversal
//!
//! Rules see the sqlparser AST through [`Node`], a borrowed view over the
//! node kinds that matter for DDL conventions. [`walk`] drives one rule over
//! one statement with an enter/leave protocol.

use std::fmt;

use sqlparser::ast::{
    AlterTableOperation, ColumnDef, ColumnOption, ColumnOptionDef, DataType, Ident, Statement,
    TableConstraint,
};

/// A borrowed AST node
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    Statement(&'a Statement),
    Column(Column<'a>),
    ColumnOption(&'a ColumnOption),
    Constraint(&'a TableConstraint),
    AlterOperation(&'a AlterTableOperation),
}

/// A column definition as written in CREATE TABLE or ADD COLUMN, or the new
/// definition given by MODIFY COLUMN / CHANGE COLUMN.
#[derive(Debug, Clone, Copy)]
pub struct Column<'a> {
    pub name: &'a Ident,
    pub data_type: &'a DataType,
    options: ColumnOptions<'a>,
}

#[derive(Debug, Clone, Copy)]
enum ColumnOptions<'a> {
    Named(&'a [ColumnOptionDef]),
    Bare(&'a [ColumnOption]),
}

impl<'a> Column<'a> {
    /// Column (re)defined by an ALTER TABLE operation
    pub fn altered(operation: &'a AlterTableOperation) -> Option<Self> {
        match operation {
            AlterTableOperation::AddColumn { column_def, .. } => Some(column_def.into()),
            AlterTableOperation::ModifyColumn {
                col_name,
                data_type,
                options,
                ..
            } => Some(Self {
                name: col_name,
                data_type,
                options: ColumnOptions::Bare(options),
            }),
            AlterTableOperation::ChangeColumn {
                new_name,
                data_type,
                options,
                ..
            } => Some(Self {
                name: new_name,
                data_type,
                options: ColumnOptions::Bare(options),
            }),
            _ => None,
        }
    }

    pub fn options(&self) -> Vec<&'a ColumnOption> {
        match self.options {
            ColumnOptions::Named(defs) => defs.iter().map(|d| &d.option).collect(),
            ColumnOptions::Bare(options) => options.iter().collect(),
        }
    }
}

impl<'a> From<&'a ColumnDef> for Column<'a> {
    fn from(column: &'a ColumnDef) -> Self {
        Self {
            name: &column.name,
            data_type: &column.data_type,
            options: ColumnOptions::Named(&column.options),
        }
    }
}

impl fmt::Display for Column<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.data_type)?;
        for option in self.options() {
            write!(f, " {option}")?;
        }
        Ok(())
    }
}

/// What the walker should do after entering a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    /// Visit the node's children
    Descend,
    /// Treat the node as a leaf for this rule
    Skip,
}

impl<'a> Node<'a> {
    /// Re-serialized text of the node
    pub fn text(&self) -> String {
        match self {
            Node::Statement(n) => n.to_string(),
            Node::Column(n) => n.to_string(),
            Node::ColumnOption(n) => n.to_string(),
            Node::Constraint(n) => n.to_string(),
            Node::AlterOperation(n) => n.to_string(),
        }
    }

    pub fn as_column(&self) -> Option<Column<'a>> {
        match *self {
            Node::Column(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_statement(&self) -> Option<&'a Statement> {
        match *self {
            Node::Statement(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_constraint(&self) -> Option<&'a TableConstraint> {
        match *self {
            Node::Constraint(c) => Some(c),
            _ => None,
        }
    }

    /// Identifier that pins the node to its own source line: the column
    /// name, the constraint or index name (else its first key column), or
    /// the column an ALTER operation targets.
    pub fn anchor(&self) -> Option<&'a str> {
        match *self {
            Node::Column(c) => Some(c.name.value.as_str()),
            Node::Constraint(constraint) => constraint_anchor(constraint),
            Node::AlterOperation(operation) => match operation {
                AlterTableOperation::AddConstraint(constraint) => constraint_anchor(constraint),
                AlterTableOperation::DropColumn { column_name, .. } => {
                    Some(column_name.value.as_str())
                }
                AlterTableOperation::ChangeColumn { old_name, .. } => Some(old_name.value.as_str()),
                other => Column::altered(other).map(|c| c.name.value.as_str()),
            },
            Node::Statement(_) | Node::ColumnOption(_) => None,
        }
    }

    /// Child nodes in source order
    pub fn children(&self) -> Vec<Node<'a>> {
        match *self {
            Node::Statement(Statement::CreateTable(create)) => create
                .columns
                .iter()
                .map(|c| Node::Column(c.into()))
                .chain(create.constraints.iter().map(Node::Constraint))
                .collect(),
            Node::Statement(Statement::AlterTable { operations, .. }) => {
                operations.iter().map(Node::AlterOperation).collect()
            }
            Node::Statement(_) => Vec::new(),
            Node::AlterOperation(AlterTableOperation::AddConstraint(constraint)) => {
                vec![Node::Constraint(constraint)]
            }
            Node::AlterOperation(operation) => {
                Column::altered(operation).map(Node::Column).into_iter().collect()
            }
            Node::Column(column) => column.options().into_iter().map(Node::ColumnOption).collect(),
            Node::ColumnOption(_) | Node::Constraint(_) => Vec::new(),
        }
    }
}

fn constraint_anchor(constraint: &TableConstraint) -> Option<&str> {
    let (name, columns) = match constraint {
        TableConstraint::Unique {
            name,
            index_name,
            columns,
            ..
        }
        | TableConstraint::PrimaryKey {
            name,
            index_name,
            columns,
            ..
        } => (name.as_ref().or(index_name.as_ref()), columns.as_slice()),
        TableConstraint::ForeignKey { name, columns, .. }
        | TableConstraint::Index { name, columns, .. } => (name.as_ref(), columns.as_slice()),
        TableConstraint::FulltextOrSpatial {
            opt_index_name,
            columns,
            ..
        } => (opt_index_name.as_ref(), columns.as_slice()),
        TableConstraint::Check { name, .. } => (name.as_ref(), &[][..]),
    };
    name.or(columns.first()).map(|i| i.value.as_str())
}

/// Enter/leave visitor over [`Node`]s
pub trait Visitor {
    fn enter(&mut self, node: &Node<'_>) -> Visit;

    /// Returns whether the statement is still valid for this visitor
    fn leave(&mut self, node: &Node<'_>) -> bool;
}

/// Walk a statement pre-order/post-order with one visitor.
///
/// Once a child's `leave` reports the statement invalid, its remaining
/// siblings are not visited. Returns the root's `leave` result.
pub fn walk<V: Visitor + ?Sized>(statement: &Statement, visitor: &mut V) -> bool {
    walk_node(Node::Statement(statement), visitor)
}

fn walk_node<V: Visitor + ?Sized>(node: Node<'_>, visitor: &mut V) -> bool {
    if visitor.enter(&node) == Visit::Descend {
        for child in node.children() {
            if !walk_node(child, visitor) {
                break;
            }
        }
    }
    visitor.leave(&node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlparser::dialect::MySqlDialect;
    use sqlparser::parser::Parser;

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
        fail_on: Option<&'static str>,
    }

    fn label(node: &Node<'_>) -> String {
        match node {
            Node::Statement(_) => "stmt".to_string(),
            Node::Column(c) => format!("col:{}", c.name.value),
            Node::ColumnOption(o) => format!("opt:{o}"),
            Node::Constraint(_) => "constraint".to_string(),
            Node::AlterOperation(_) => "alter-op".to_string(),
        }
    }

    impl Visitor for Recorder {
        fn enter(&mut self, node: &Node<'_>) -> Visit {
            self.events.push(format!("enter {}", label(node)));
            Visit::Descend
        }

        fn leave(&mut self, node: &Node<'_>) -> bool {
            let l = label(node);
            self.events.push(format!("leave {l}"));
            Some(l.as_str()) != self.fail_on
        }
    }

    fn parse(sql: &str) -> Statement {
        Parser::parse_sql(&MySqlDialect {}, sql).unwrap().remove(0)
    }

    #[test]
    fn test_walk_create_table_order() {
        let stmt = parse("CREATE TABLE t (a int NOT NULL, b int, PRIMARY KEY (a))");
        let mut recorder = Recorder::default();
        assert!(walk(&stmt, &mut recorder));
        assert_eq!(
            recorder.events,
            vec![
                "enter stmt",
                "enter col:a",
                "enter opt:NOT NULL",
                "leave opt:NOT NULL",
                "leave col:a",
                "enter col:b",
                "leave col:b",
                "enter constraint",
                "leave constraint",
                "leave stmt",
            ]
        );
    }

    #[test]
    fn test_walk_stops_siblings_after_invalid_leave() {
        let stmt = parse("CREATE TABLE t (a int, b int, c int)");
        let mut recorder = Recorder {
            fail_on: Some("col:a"),
            ..Default::default()
        };
        walk(&stmt, &mut recorder);
        assert!(!recorder.events.iter().any(|e| e.contains("col:b")));
        assert_eq!(recorder.events.last().map(String::as_str), Some("leave stmt"));
    }

    #[test]
    fn test_walk_alter_add_column() {
        let stmt = parse("ALTER TABLE t ADD COLUMN is_ok bit");
        let mut recorder = Recorder::default();
        walk(&stmt, &mut recorder);
        assert!(recorder.events.contains(&"enter col:is_ok".to_string()));
    }

    #[test]
    fn test_walk_alter_redefined_columns() {
        for sql in [
            "ALTER TABLE t MODIFY COLUMN is_ok bit NOT NULL",
            "ALTER TABLE t CHANGE COLUMN ok is_ok bit NOT NULL",
        ] {
            let mut recorder = Recorder::default();
            walk(&parse(sql), &mut recorder);
            assert_eq!(
                recorder.events,
                vec![
                    "enter stmt",
                    "enter alter-op",
                    "enter col:is_ok",
                    "enter opt:NOT NULL",
                    "leave opt:NOT NULL",
                    "leave col:is_ok",
                    "leave alter-op",
                    "leave stmt",
                ],
                "{sql}"
            );
        }
    }

    #[test]
    fn test_anchor() {
        let stmt = parse(
            "CREATE TABLE t (a int, KEY (a), UNIQUE KEY uk_a (a), CONSTRAINT fk FOREIGN KEY (a) REFERENCES u (id))",
        );
        let anchors: Vec<_> = Node::Statement(&stmt)
            .children()
            .iter()
            .map(|n| n.anchor().map(str::to_string))
            .collect();
        assert_eq!(
            anchors,
            vec![
                Some("a".to_string()),
                Some("a".to_string()),
                Some("uk_a".to_string()),
                Some("fk".to_string()),
            ]
        );

        let stmt = parse("ALTER TABLE t CHANGE COLUMN old_name new_name int");
        let op = Node::Statement(&stmt).children()[0];
        assert_eq!(op.anchor(), Some("old_name"));
        assert_eq!(op.children()[0].anchor(), Some("new_name"));
    }

    #[test]
    fn test_skip_does_not_descend() {
        struct SkipAll(usize);
        impl Visitor for SkipAll {
            fn enter(&mut self, _: &Node<'_>) -> Visit {
                self.0 += 1;
                Visit::Skip
            }
            fn leave(&mut self, _: &Node<'_>) -> bool {
                true
            }
        }

        let stmt = parse("CREATE TABLE t (a int, b int)");
        let mut v = SkipAll(0);
        walk(&stmt, &mut v);
        assert_eq!(v.0, 1);
    }
}
