//! ddlint-core: rule-based linting of SQL DDL scripts
//!
//! This library parses DDL statements and runs pluggable convention rules
//! over each statement's AST, reporting violations located at a line in the
//! original source text.

pub mod ast;
pub mod dialect;
pub mod error;
pub mod linter;
pub mod rules;
pub mod schema;
pub mod script;
pub mod types;

pub use ast::{Column, Node, Visit, Visitor};
pub use dialect::SqlDialect;
pub use error::{DiagnosticKind, LintError, Severity, Span};
pub use linter::Linter;
pub use rules::{ReportMode, Rule, RuleEntry, RuleSet, RuleSetError};
pub use schema::{ColumnSpec, TableSpec};
pub use script::{Cursor, Script};
pub use types::TypeFamily;
