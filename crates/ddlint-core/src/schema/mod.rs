//! Column and table descriptors extracted from DDL nodes
//!
//! Descriptors are recomputed on every node visit and never stored across
//! statements. They are the only place where knowledge of the concrete
//! sqlparser AST shape reaches rule logic.

mod extract;

use serde::Serialize;

use crate::types::TypeFamily;

pub use extract::{
    constraint_index, extract_column, extract_table, object_name, ExtractError,
};

/// Semantic attributes of one column definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnSpec {
    pub name: String,
    /// Normalized declared type, e.g. `tinyint(1)`, `varchar(255)`
    pub data_type: String,
    pub family: TypeFamily,
    /// Declared `NOT NULL`, or implied by a column-level primary key
    pub not_null: bool,
    pub primary_key: bool,
    /// Column-level `REFERENCES`
    pub references: bool,
    pub comment: Option<String>,
}

impl ColumnSpec {
    pub fn is_boolean(&self) -> bool {
        self.family == TypeFamily::Boolean
    }
}

/// An index declared by a table constraint or by CREATE INDEX
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexSpec {
    pub name: Option<String>,
    pub unique: bool,
}

/// Semantic attributes of a CREATE TABLE statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableSpec {
    pub name: String,
    pub columns: Vec<ColumnSpec>,
    /// Primary key columns from either column options or a table constraint
    pub primary_key: Vec<String>,
    pub has_comment: bool,
}

impl TableSpec {
    pub fn get_column(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    pub fn has_primary_key(&self) -> bool {
        !self.primary_key.is_empty()
    }
}
