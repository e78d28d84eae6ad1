//! Output formatting

use ddlint_core::{LintError, RuleSet, Severity};
use miette::{IntoDiagnostic, NamedSource, Result};
use serde::Serialize;

use crate::args::OutputFormat;

/// Lint outcome for one file
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub file: String,
    #[serde(skip)]
    pub source: String,
    pub diagnostics: Vec<LintError>,
}

/// Output formatter for diagnostics
pub struct OutputFormatter<'a> {
    format: OutputFormat,
    rules: &'a RuleSet,
}

impl<'a> OutputFormatter<'a> {
    pub fn new(format: OutputFormat, rules: &'a RuleSet) -> Self {
        Self { format, rules }
    }

    /// Print every report in the configured format
    pub fn print(&self, reports: &[FileReport]) -> Result<()> {
        match self.format {
            OutputFormat::Human => {
                for report in reports {
                    print_human(report);
                }
            }
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(&to_json(reports)).into_diagnostic()?;
                println!("{}", json);
            }
            OutputFormat::Sarif => {
                let sarif =
                    serde_json::to_string_pretty(&to_sarif(reports, self.rules)).into_diagnostic()?;
                println!("{}", sarif);
            }
        }
        Ok(())
    }
}

fn print_human(report: &FileReport) {
    for diag in &report.diagnostics {
        if !diag.is_located() {
            eprintln!(
                "warning: {}: location of the following diagnostic could not be resolved",
                report.file
            );
        }
        let rendered = miette::Report::new(diag.clone())
            .with_source_code(NamedSource::new(&report.file, report.source.clone()));
        eprintln!("{:?}", rendered);
    }
}

fn to_json(reports: &[FileReport]) -> serde_json::Value {
    let files: Vec<_> = reports
        .iter()
        .filter(|r| !r.diagnostics.is_empty())
        .collect();
    serde_json::json!({
        "files": files,
        "summary": {
            "files": reports.len(),
            "diagnostics": reports.iter().map(|r| r.diagnostics.len()).sum::<usize>(),
        }
    })
}

fn sarif_level(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "error",
        Severity::Warning => "warning",
        Severity::Info => "note",
    }
}

fn to_sarif(reports: &[FileReport], rules: &RuleSet) -> serde_json::Value {
    let results: Vec<serde_json::Value> = reports
        .iter()
        .flat_map(|report| report.diagnostics.iter().map(move |d| (report, d)))
        .map(|(report, d)| {
            let mut location = serde_json::json!({
                "physicalLocation": {
                    "artifactLocation": {
                        "uri": report.file
                    }
                }
            });
            if let Some(span) = d.span {
                location["physicalLocation"]["region"] = serde_json::json!({
                    "startLine": span.line,
                    "startColumn": span.column,
                    "snippet": { "text": d.snippet },
                });
            }
            serde_json::json!({
                "ruleId": d.code(),
                "level": sarif_level(d.severity),
                "message": {
                    "text": d.message
                },
                "locations": [location]
            })
        })
        .collect();

    let rule_meta: Vec<serde_json::Value> = rules
        .iter()
        .map(|entry| {
            serde_json::json!({
                "id": entry.id,
                "shortDescription": { "text": entry.description }
            })
        })
        .collect();

    serde_json::json!({
        "$schema": "https://raw.githubusercontent.com/oasis-tcs/sarif-spec/master/Schemata/sarif-schema-2.1.0.json",
        "version": "2.1.0",
        "runs": [{
            "tool": {
                "driver": {
                    "name": "ddlint",
                    "version": env!("CARGO_PKG_VERSION"),
                    "rules": rule_meta
                }
            },
            "results": results
        }]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ddlint_core::Linter;

    fn report(file: &str, sql: &str) -> FileReport {
        let diagnostics = Linter::new(RuleSet::select(&["boolean-field"]).unwrap())
            .lint(file, sql)
            .err()
            .unwrap_or_default();
        FileReport {
            file: file.to_string(),
            source: sql.to_string(),
            diagnostics,
        }
    }

    #[test]
    fn test_json_skips_clean_files() {
        let reports = vec![
            report("clean.sql", "CREATE TABLE t (is_ok bool);"),
            report("bad.sql", "CREATE TABLE t (\n  enabled bit\n);"),
        ];
        let json = to_json(&reports);

        assert_eq!(json["summary"]["files"], 2);
        assert_eq!(json["summary"]["diagnostics"], 1);
        let files = json["files"].as_array().unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0]["file"], "bad.sql");
        assert_eq!(files[0]["diagnostics"][0]["rule"], "boolean-field");
        assert_eq!(files[0]["diagnostics"][0]["span"]["line"], 2);
        assert!(files[0].get("source").is_none());
    }

    #[test]
    fn test_sarif_has_region() {
        let reports = vec![report("bad.sql", "CREATE TABLE t (\n  id int,\n  enabled bit\n);")];
        let rules = RuleSet::all();
        let sarif = to_sarif(&reports, &rules);

        assert_eq!(sarif["version"], "2.1.0");
        let run = &sarif["runs"][0];
        assert_eq!(run["tool"]["driver"]["name"], "ddlint");
        assert_eq!(
            run["tool"]["driver"]["rules"].as_array().map(|r| r.len()),
            Some(rules.len())
        );

        let result = &run["results"][0];
        assert_eq!(result["ruleId"], "boolean-field");
        assert_eq!(result["level"], "error");
        let location = &result["locations"][0]["physicalLocation"];
        assert_eq!(location["artifactLocation"]["uri"], "bad.sql");
        assert_eq!(location["region"]["startLine"], 3);
    }

    #[test]
    fn test_sarif_unlocated_has_no_region() {
        let reports = vec![FileReport {
            file: "x.sql".to_string(),
            source: String::new(),
            diagnostics: vec![LintError::violation("destruct", "x.sql", "lost")],
        }];
        let sarif = to_sarif(&reports, &RuleSet::new());
        let location = &sarif["runs"][0]["results"][0]["locations"][0]["physicalLocation"];
        assert!(location.get("region").is_none());
    }
}
