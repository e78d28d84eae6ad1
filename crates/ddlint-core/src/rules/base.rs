//! Location bookkeeping shared by all rules

use crate::ast::Node;
use crate::error::LintError;
use crate::rules::ReportMode;
use crate::script::{declares, mentions, opens, Cursor, Script};

/// State every rule embeds: its script view, cursor, text checkpoint and
/// the violations recorded for the current statement.
#[derive(Debug)]
pub struct BaseLinter {
    rule: &'static str,
    script: Script,
    cursor: Cursor,
    mode: ReportMode,
    text: String,
    errors: Vec<LintError>,
}

impl BaseLinter {
    pub fn new(rule: &'static str, script: Script, cursor: Cursor) -> Self {
        Self {
            rule,
            script,
            cursor,
            mode: ReportMode::default(),
            text: String::new(),
            errors: Vec::new(),
        }
    }

    pub fn with_mode(mut self, mode: ReportMode) -> Self {
        self.mode = mode;
        self
    }

    /// Text of the most recently entered node
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Record `node` as the current text window and move the cursor onto
    /// the line where the node itself starts.
    ///
    /// A column starts where its name is followed by its type, falling back
    /// to the first line naming it. A constraint starts where its leading
    /// keyword opens a definition on a line naming its anchor, and an ALTER
    /// operation on the first line with its keyword and anchor. Without a
    /// match the cursor stays put.
    pub fn checkpoint(&mut self, node: &Node<'_>) {
        let text = node.text();
        let keyword = leading_word(&text).to_string();
        if self.text.is_empty() || !text.is_empty() {
            self.text = text;
        }

        let anchored = |line: &str| node.anchor().map_or(true, |a| mentions(line, a));
        let sought = match node {
            Node::Column(column) => {
                let name = column.name.value.as_str();
                let type_word = column.data_type.to_string();
                let type_word = leading_word(&type_word);
                self.script
                    .seek(self.cursor, |line| declares(line, name, type_word))
                    .or_else(|| self.script.seek(self.cursor, |line| mentions(line, name)))
            }
            Node::Constraint(_) => self
                .script
                .seek(self.cursor, |line| opens(line, &keyword) && anchored(line)),
            Node::AlterOperation(_) => self
                .script
                .seek(self.cursor, |line| mentions(line, &keyword) && anchored(line)),
            Node::Statement(_) | Node::ColumnOption(_) => None,
        };
        if let Some(cursor) = sought {
            self.cursor = cursor;
        }
    }

    /// Record a violation located at the first line satisfying `predicate`.
    ///
    /// Under [`ReportMode::FirstPerStatement`] later violations are dropped
    /// once one has been recorded.
    pub fn report<F>(&mut self, message: impl Into<String>, help: Option<String>, predicate: F)
    where
        F: Fn(&str) -> bool,
    {
        if self.is_settled() {
            return;
        }

        let (span, cursor) = self.script.resolve(self.cursor, predicate);
        self.cursor = cursor;

        let mut error = LintError::violation(self.rule, self.script.name(), message)
            .with_snippet(self.text.clone());
        if let Some(span) = span {
            error = error.with_span(span);
        }
        if let Some(help) = help {
            error = error.with_help(help);
        }
        self.errors.push(error);
    }

    /// Record a violation located at the first line naming `ident`
    pub fn report_ident(&mut self, message: impl Into<String>, help: Option<String>, ident: &str) {
        self.report(message, help, |line| mentions(line, ident));
    }

    pub fn has_error(&self) -> bool {
        !self.errors.is_empty()
    }

    /// True once nothing more will be recorded for this statement; rules
    /// skip remaining nodes and return `!is_settled()` from `leave`.
    pub fn is_settled(&self) -> bool {
        self.mode == ReportMode::FirstPerStatement && self.has_error()
    }

    pub fn error(&self) -> Option<&LintError> {
        self.errors.first()
    }

    pub fn errors(&self) -> &[LintError] {
        &self.errors
    }
}

/// First SQL word of a node's text: `PRIMARY` for `PRIMARY KEY (id)`
fn leading_word(text: &str) -> &str {
    let text = text.trim_start();
    let end = text
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(text.len());
    &text[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlparser::ast::Statement;
    use sqlparser::dialect::MySqlDialect;
    use sqlparser::parser::Parser;

    const SQL: &str = "CREATE TABLE t (\n  enabled_at datetime,\n  enabled bit\n);";

    fn statement() -> Statement {
        Parser::parse_sql(&MySqlDialect {}, SQL).unwrap().remove(0)
    }

    #[test]
    fn test_checkpoint_tracks_latest_text() {
        let script = Script::new("t.sql", SQL);
        let stmt = statement();
        let mut base = BaseLinter::new("test", script.clone(), script.cursor());

        base.checkpoint(&Node::Statement(&stmt));
        assert!(base.text().starts_with("CREATE TABLE t"));

        let Statement::CreateTable(create) = &stmt else {
            unreachable!()
        };
        base.checkpoint(&Node::Column((&create.columns[1]).into()));
        assert!(base.text().starts_with("enabled "));
        assert_eq!(base.cursor().position(), 2);
    }

    #[test]
    fn test_checkpoint_skips_earlier_mentions() {
        let sql = "CREATE TABLE t (\n  id int COMMENT 'see enabled',\n  enabled bit,\n  KEY enabled (enabled)\n);";
        let script = Script::new("t.sql", sql);
        let stmt = Parser::parse_sql(&MySqlDialect {}, sql).unwrap().remove(0);
        let children = Node::Statement(&stmt).children();
        let mut base = BaseLinter::new("test", script.clone(), script.cursor());

        base.checkpoint(&children[1]);
        assert_eq!(base.cursor().position(), 2);
        base.checkpoint(&children[2]);
        assert_eq!(base.cursor().position(), 3);
    }

    #[test]
    fn test_checkpoint_without_match_keeps_cursor() {
        let script = Script::new("t.sql", SQL);
        let other = Parser::parse_sql(&MySqlDialect {}, "CREATE TABLE u (missing int)")
            .unwrap()
            .remove(0);
        let mut base = BaseLinter::new("test", script.clone(), script.cursor());

        base.checkpoint(&Node::Statement(&other).children()[0]);
        assert_eq!(base.cursor().position(), 0);
        assert!(base.text().starts_with("missing "));
    }

    #[test]
    fn test_leading_word() {
        assert_eq!(leading_word("PRIMARY KEY (id)"), "PRIMARY");
        assert_eq!(leading_word("TINYINT(1)"), "TINYINT");
        assert_eq!(leading_word("\"quoted\""), "");
    }

    #[test]
    fn test_report_keeps_first_error_only() {
        let script = Script::new("t.sql", SQL);
        let mut base = BaseLinter::new("test", script.clone(), script.cursor());

        base.report_ident("first", None, "enabled");
        base.report_ident("second", Some("ignored".to_string()), "enabled_at");

        let error = base.error().unwrap();
        assert_eq!(error.message, "first");
        assert_eq!(error.rule, "test");
        assert_eq!(error.line(), Some(3));
        assert!(base.has_error());
    }

    #[test]
    fn test_report_unresolved_location() {
        let script = Script::new("t.sql", SQL);
        let mut base = BaseLinter::new("test", script.clone(), script.cursor());

        base.report_ident("missing", None, "nowhere");
        let error = base.error().unwrap();
        assert!(!error.is_located());
        assert_eq!(error.message, "missing");
    }

    #[test]
    fn test_every_node_mode_keeps_all() {
        let script = Script::new("t.sql", SQL);
        let mut base = BaseLinter::new("test", script.clone(), script.cursor())
            .with_mode(ReportMode::EveryNode);

        base.report_ident("first", None, "enabled_at");
        assert!(!base.is_settled());
        base.report_ident("second", None, "enabled");

        let lines: Vec<_> = base.errors().iter().map(|e| e.line()).collect();
        assert_eq!(lines, vec![Some(2), Some(3)]);
        assert!(base.has_error());
    }
}
