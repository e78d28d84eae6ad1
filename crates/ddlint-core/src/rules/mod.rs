//! Lint rules and the rule registry
//!
//! A rule is a [`Visitor`] that records at most one [`LintError`] per
//! statement, unless run under [`ReportMode::EveryNode`]. The engine builds
//! a fresh instance per statement from the rule's constructor, so nothing a
//! rule records on one statement can leak into the next.

mod base;
mod boolean_field;
mod column_type;
mod comment;
mod destruct;
mod keys;
mod naming;
mod necessary_column;
mod not_null;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::ast::Visitor;
use crate::error::LintError;
use crate::script::{Cursor, Script};

pub use base::BaseLinter;
pub use boolean_field::BooleanFieldLinter;
pub use column_type::{FloatDoubleLinter, VarcharLengthLinter};
pub use comment::{ColumnCommentLinter, TableCommentLinter};
pub use destruct::DestructLinter;
pub use keys::{ForeignKeyLinter, IndexNameLinter, PrimaryKeyLinter};
pub use naming::{ColumnNameLinter, TableNameLinter};
pub use necessary_column::NecessaryColumnLinter;
pub use not_null::NotNullLinter;

/// A convention check run over one statement
pub trait Rule: Visitor {
    /// Violations recorded during traversal, in the order found
    fn errors(&self) -> &[LintError];

    /// The first violation, if any
    fn error(&self) -> Option<&LintError> {
        self.errors().first()
    }
}

/// How many violations a rule records per statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportMode {
    /// Stop at the first violation; later siblings are not visited
    #[default]
    FirstPerStatement,
    /// Report every offending node, one violation per node
    EveryNode,
}

/// Wraps a prepared [`BaseLinter`] into a rule instance
pub type RuleConstructor = fn(BaseLinter) -> Box<dyn Rule>;

/// A registered rule
#[derive(Debug, Clone, Copy)]
pub struct RuleEntry {
    pub id: &'static str,
    pub description: &'static str,
    pub constructor: RuleConstructor,
}

impl RuleEntry {
    /// Build a fresh instance bound to `script`, starting at `cursor`
    pub fn instantiate(&self, script: Script, cursor: Cursor, mode: ReportMode) -> Box<dyn Rule> {
        (self.constructor)(BaseLinter::new(self.id, script, cursor).with_mode(mode))
    }
}

/// Errors from rule selection
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleSetError {
    #[error("unknown rule '{0}'")]
    UnknownRule(String),
}

/// Ordered collection of rules, keyed by id.
///
/// Iteration follows registration order, which is also the order of
/// diagnostics within a statement.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    entries: IndexMap<&'static str, RuleEntry>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every built-in rule
    pub fn all() -> Self {
        let mut set = Self::new();
        for entry in builtin() {
            set.register(entry);
        }
        set
    }

    /// Register a rule; a rule with the same id is replaced in place
    pub fn register(&mut self, entry: RuleEntry) {
        self.entries.insert(entry.id, entry);
    }

    /// Built-in rules restricted to `ids`, in registration order
    pub fn select<S: AsRef<str>>(ids: &[S]) -> Result<Self, RuleSetError> {
        let all = Self::all();
        for id in ids {
            all.check_known(id.as_ref())?;
        }
        let entries = all
            .entries
            .into_iter()
            .filter(|(id, _)| ids.iter().any(|s| s.as_ref() == *id))
            .collect();
        Ok(Self { entries })
    }

    /// This set without the rules named in `ids`
    pub fn without<S: AsRef<str>>(mut self, ids: &[S]) -> Result<Self, RuleSetError> {
        for id in ids {
            self.check_known(id.as_ref())?;
        }
        self.entries
            .retain(|id, _| !ids.iter().any(|s| s.as_ref() == *id));
        Ok(self)
    }

    fn check_known(&self, id: &str) -> Result<(), RuleSetError> {
        if self.entries.contains_key(id) {
            Ok(())
        } else {
            Err(RuleSetError::UnknownRule(id.to_string()))
        }
    }

    pub fn get(&self, id: &str) -> Option<&RuleEntry> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RuleEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn builtin() -> [RuleEntry; 13] {
    [
        BooleanFieldLinter::ENTRY,
        ColumnNameLinter::ENTRY,
        TableNameLinter::ENTRY,
        ColumnCommentLinter::ENTRY,
        TableCommentLinter::ENTRY,
        NotNullLinter::ENTRY,
        FloatDoubleLinter::ENTRY,
        VarcharLengthLinter::ENTRY,
        ForeignKeyLinter::ENTRY,
        PrimaryKeyLinter::ENTRY,
        IndexNameLinter::ENTRY,
        NecessaryColumnLinter::ENTRY,
        DestructLinter::ENTRY,
    ]
}
