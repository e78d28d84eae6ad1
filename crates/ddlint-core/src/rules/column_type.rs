//! Column type rules

use crate::ast::{Node, Visit, Visitor};
use crate::error::LintError;
use crate::rules::{BaseLinter, Rule, RuleEntry};
use crate::schema::extract_column;
use crate::types::TypeFamily;

/// Longest `varchar` accepted before `text` should be used instead
pub const MAX_VARCHAR_LENGTH: u64 = 5000;

/// Approximate numeric types (`float`, `double`, `real`) are rejected in
/// favour of `decimal`.
#[derive(Debug)]
pub struct FloatDoubleLinter {
    base: BaseLinter,
}

impl FloatDoubleLinter {
    pub const ID: &'static str = "float-double";
    pub const ENTRY: RuleEntry = RuleEntry {
        id: Self::ID,
        description: "float/double columns are not allowed, use decimal",
        constructor: Self::boxed,
    };

    pub fn new(base: BaseLinter) -> Self {
        Self { base }
    }

    fn boxed(base: BaseLinter) -> Box<dyn Rule> {
        Box::new(Self::new(base))
    }
}

impl Visitor for FloatDoubleLinter {
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

        if spec.family == TypeFamily::Float {
            self.base.report_ident(
                format!(
                    "column `{}` uses {}; float and double are not allowed",
                    spec.name, spec.data_type
                ),
                Some("use decimal(M,D) for exact values".to_string()),
                &spec.name,
            );
        }
        Visit::Skip
    }

    fn leave(&mut self, _node: &Node<'_>) -> bool {
        !self.base.is_settled()
    }
}

impl Rule for FloatDoubleLinter {
    fn errors(&self) -> &[LintError] {
        self.base.errors()
    }
}

/// `varchar` columns stay within [`MAX_VARCHAR_LENGTH`].
#[derive(Debug)]
pub struct VarcharLengthLinter {
    base: BaseLinter,
}

impl VarcharLengthLinter {
    pub const ID: &'static str = "varchar-length";
    pub const ENTRY: RuleEntry = RuleEntry {
        id: Self::ID,
        description: "varchar length is at most 5000",
        constructor: Self::boxed,
    };

    pub fn new(base: BaseLinter) -> Self {
        Self { base }
    }

    fn boxed(base: BaseLinter) -> Box<dyn Rule> {
        Box::new(Self::new(base))
    }
}

impl Visitor for VarcharLengthLinter {
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

        if let TypeFamily::Varchar {
            length: Some(length),
        } = spec.family
        {
            if length > MAX_VARCHAR_LENGTH {
                self.base.report_ident(
                    format!(
                        "varchar length of `{}` is {}, longer than {}",
                        spec.name, length, MAX_VARCHAR_LENGTH
                    ),
                    Some("use text for long values".to_string()),
                    &spec.name,
                );
            }
        }
        Visit::Skip
    }

    fn leave(&mut self, _node: &Node<'_>) -> bool {
        !self.base.is_settled()
    }
}

impl Rule for VarcharLengthLinter {
    fn errors(&self) -> &[LintError] {
        self.base.errors()
    }
}
