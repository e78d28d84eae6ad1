//! Extraction of descriptors from sqlparser nodes

use sqlparser::ast::{ColumnOption, CreateTable, ObjectName, TableConstraint};

use crate::ast::Column;
use crate::schema::{ColumnSpec, IndexSpec, TableSpec};
use crate::types::{normalize_type, TypeFamily};

/// Failure to read a descriptor out of a node
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractError {
    #[error("column definition has an empty name")]
    EmptyColumnName,
}

/// Extract name, normalized type and option flags from a column definition
pub fn extract_column(column: Column<'_>) -> Result<ColumnSpec, ExtractError> {
    let name = column.name.value.clone();
    if name.trim().is_empty() {
        return Err(ExtractError::EmptyColumnName);
    }

    let data_type = normalize_type(column.data_type);
    let family = TypeFamily::of(&data_type);
    let mut spec = ColumnSpec {
        name,
        data_type,
        family,
        not_null: false,
        primary_key: false,
        references: false,
        comment: None,
    };

    for option in column.options() {
        match option {
            ColumnOption::Null => spec.not_null = false,
            ColumnOption::NotNull => spec.not_null = true,
            ColumnOption::Unique {
                is_primary: true, ..
            } => {
                spec.primary_key = true;
                spec.not_null = true;
            }
            ColumnOption::ForeignKey { .. } => spec.references = true,
            ColumnOption::Comment(text) => spec.comment = Some(text.clone()),
            _ => {}
        }
    }

    Ok(spec)
}

/// Extract a table descriptor from a CREATE TABLE statement.
///
/// Columns that fail extraction are left out rather than failing the table.
pub fn extract_table(create: &CreateTable) -> TableSpec {
    let mut columns = Vec::with_capacity(create.columns.len());
    for column in &create.columns {
        match extract_column(column.into()) {
            Ok(spec) => columns.push(spec),
            Err(e) => tracing::debug!(table = %create.name, "skipping column: {e}"),
        }
    }

    let mut primary_key: Vec<String> = columns
        .iter()
        .filter(|c| c.primary_key)
        .map(|c| c.name.clone())
        .collect();
    for constraint in &create.constraints {
        if let TableConstraint::PrimaryKey { columns: pk, .. } = constraint {
            primary_key.extend(pk.iter().map(|c| c.value.clone()));
        }
    }

    TableSpec {
        name: object_name(&create.name),
        columns,
        primary_key,
        has_comment: create.comment.is_some(),
    }
}

/// Index declared by a table constraint, if the constraint is an index
pub fn constraint_index(constraint: &TableConstraint) -> Option<IndexSpec> {
    match constraint {
        TableConstraint::Unique {
            name, index_name, ..
        } => Some(IndexSpec {
            name: index_name.as_ref().or(name.as_ref()).map(|i| i.value.clone()),
            unique: true,
        }),
        TableConstraint::Index { name, .. } => Some(IndexSpec {
            name: name.as_ref().map(|i| i.value.clone()),
            unique: false,
        }),
        _ => None,
    }
}

/// Unqualified, unquoted object name (`db.t_user` -> `t_user`)
pub fn object_name(name: &ObjectName) -> String {
    name.0.last().map(|i| i.value.clone()).unwrap_or_default()
}
