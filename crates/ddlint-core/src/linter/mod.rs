//! Linter engine - runs registered rules over every statement of a script

use sqlparser::ast::Statement;
use sqlparser::parser::Parser;

use crate::ast::walk;
use crate::dialect::SqlDialect;
use crate::error::LintError;
use crate::rules::{ReportMode, RuleSet};
use crate::script::{split_statements, Script, Segment};

/// Linter - checks DDL scripts against a set of convention rules
#[derive(Debug, Clone)]
pub struct Linter {
    rules: RuleSet,
    dialect: SqlDialect,
    mode: ReportMode,
}

impl Linter {
    pub fn new(rules: RuleSet) -> Self {
        Self::with_dialect(rules, SqlDialect::default())
    }

    pub fn with_dialect(rules: RuleSet, dialect: SqlDialect) -> Self {
        Self {
            rules,
            dialect,
            mode: ReportMode::default(),
        }
    }

    /// Switch how many violations each rule records per statement
    pub fn with_report_mode(mut self, mode: ReportMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn dialect(&self) -> SqlDialect {
        self.dialect
    }

    pub fn report_mode(&self) -> ReportMode {
        self.mode
    }

    /// Lint DDL text; `name` identifies the script in diagnostics
    pub fn lint(&self, name: &str, sql: &str) -> Result<(), Vec<LintError>> {
        self.lint_script(&Script::new(name, sql))
    }

    /// Lint a script.
    ///
    /// A parse failure is the only diagnostic for the script. Otherwise
    /// every rule runs on every statement with a fresh instance, and
    /// diagnostics come back in statement order, then rule registration
    /// order.
    pub fn lint_script(&self, script: &Script) -> Result<(), Vec<LintError>> {
        let statements = self.parse(script).map_err(|e| vec![e])?;
        tracing::debug!(
            script = script.name(),
            statements = statements.len(),
            rules = self.rules.len(),
            "linting script"
        );

        let mut errors = Vec::new();
        for (segment, statement) in &statements {
            for entry in self.rules.iter() {
                let cursor = script.cursor_for(segment.lines.clone());
                let mut rule = entry.instantiate(script.clone(), cursor, self.mode);
                walk(statement, rule.as_mut());

                for error in rule.errors() {
                    if !error.is_located() {
                        tracing::warn!(
                            script = script.name(),
                            rule = entry.id,
                            snippet = %error.snippet,
                            "offending text not found in source; reporting without a line"
                        );
                    } else {
                        tracing::debug!(
                            script = script.name(),
                            rule = entry.id,
                            line = error.line(),
                            "rule violation"
                        );
                    }
                    errors.push(error.clone());
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Parse every statement, keeping the source segment it came from
    fn parse(&self, script: &Script) -> Result<Vec<(Segment, Statement)>, LintError> {
        let dialect = self.dialect.parser_dialect();
        let mut statements = Vec::new();

        for segment in split_statements(script, self.dialect) {
            match Parser::parse_sql(dialect.as_ref(), segment.text(script)) {
                Ok(parsed) => {
                    statements.extend(parsed.into_iter().map(|stmt| (segment.clone(), stmt)));
                }
                Err(e) => {
                    let mut error =
                        LintError::parse_error(script.name(), format!("Parse error: {}", e))
                            .with_snippet(segment.text(script).trim());
                    if let Some(span) = script.line_span(segment.lines.start) {
                        error = error.with_span(span);
                    }
                    return Err(error);
                }
            }
        }

        Ok(statements)
    }
}

impl Default for Linter {
    fn default() -> Self {
        Self::new(RuleSet::all())
    }
}
