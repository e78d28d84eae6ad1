//! ddlint CLI - SQL DDL convention linter

mod args;
mod config;
mod output;

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use ddlint_core::script::split_statements;
use ddlint_core::{Linter, RuleSet, Script, SqlDialect};
use miette::{IntoDiagnostic, Result, WrapErr};
use tracing_subscriber::EnvFilter;

use crate::args::{Args, Command};
use crate::config::{Config, Overrides};
use crate::output::{FileReport, OutputFormatter};

fn main() -> ExitCode {
    let args = Args::parse();

    let level = match (args.quiet, args.verbose) {
        (true, _) => tracing::Level::ERROR,
        (false, 0) => tracing::Level::WARN,
        (false, 1) => tracing::Level::INFO,
        (false, _) => tracing::Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    match run(args) {
        Ok(has_errors) => {
            if has_errors {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            eprintln!("Error: {:?}", e);
            ExitCode::from(2)
        }
    }
}

fn run(args: Args) -> Result<bool> {
    let quiet = args.quiet;
    match args.command {
        Command::Check {
            files,
            dir,
            config: config_path,
            dialect,
            format,
            rules,
            disable,
            all_violations,
        } => {
            let config = match config_path {
                Some(path) => Config::from_file(&path)?,
                None => Config::find_and_load()?.unwrap_or_default(),
            };
            let config = config.merge_with_args(Overrides {
                files: &files,
                dir: dir.as_deref(),
                dialect: dialect.as_deref(),
                format,
                rules: &rules,
                disable: &disable,
                all_violations,
            });

            let dialect: SqlDialect = match &config.dialect {
                Some(name) => name.parse().map_err(|e: String| miette::miette!(e))?,
                None => SqlDialect::default(),
            };
            let rule_set = select_rules(&config)?;
            let linter = Linter::with_dialect(rule_set, dialect)
                .with_report_mode(config.report.unwrap_or_default());

            let script_files = collect_files(&config)?;
            if script_files.is_empty() {
                miette::bail!(
                    "No SQL files specified. Use positional arguments, --dir, or configure in ddlint.toml"
                );
            }
            tracing::info!(
                files = script_files.len(),
                rules = linter.rules().len(),
                %dialect,
                "checking"
            );

            let mut reports = Vec::with_capacity(script_files.len());
            for path in &script_files {
                let source = fs::read_to_string(path)
                    .into_diagnostic()
                    .wrap_err_with(|| format!("failed to read {}", path.display()))?;
                let file = path.display().to_string();
                let diagnostics = linter.lint(&file, &source).err().unwrap_or_default();
                reports.push(FileReport {
                    file,
                    source,
                    diagnostics,
                });
            }

            let formatter = OutputFormatter::new(config.format.unwrap_or_default(), linter.rules());
            formatter.print(&reports)?;

            let total: usize = reports.iter().map(|r| r.diagnostics.len()).sum();
            let failing = reports.iter().filter(|r| !r.diagnostics.is_empty()).count();
            if !quiet {
                if total > 0 {
                    eprintln!();
                    eprintln!(
                        "Found {} violation(s) in {} of {} file(s)",
                        total,
                        failing,
                        reports.len()
                    );
                } else {
                    eprintln!("All {} file(s) passed", reports.len());
                }
            }

            Ok(total > 0)
        }

        Command::Rules => {
            for entry in RuleSet::all().iter() {
                println!("{:<18} {}", entry.id, entry.description);
            }
            Ok(false)
        }

        Command::Parse { file, dialect } => {
            let dialect: SqlDialect = dialect.parse().map_err(|e: String| miette::miette!(e))?;
            let content = fs::read_to_string(&file).into_diagnostic()?;
            let script = Script::new(file.display().to_string(), content);

            use sqlparser::parser::Parser;

            let parser_dialect = dialect.parser_dialect();
            for (i, segment) in split_statements(&script, dialect).iter().enumerate() {
                match Parser::parse_sql(parser_dialect.as_ref(), segment.text(&script)) {
                    Ok(statements) => {
                        for stmt in &statements {
                            println!(
                                "Statement {} (lines {}-{}):",
                                i + 1,
                                segment.lines.start + 1,
                                segment.lines.end
                            );
                            println!("{:#?}", stmt);
                            println!();
                        }
                    }
                    Err(e) => {
                        eprintln!("Parse error at line {}: {}", segment.lines.start + 1, e);
                        return Ok(true);
                    }
                }
            }

            Ok(false)
        }
    }
}

/// Enabled rules from config: the `rules` list (or all), minus `disable`
fn select_rules(config: &Config) -> Result<RuleSet> {
    let selected = if config.rules.is_empty() {
        RuleSet::all()
    } else {
        RuleSet::select(&config.rules).into_diagnostic()?
    };
    selected.without(&config.disable).into_diagnostic()
}

/// Expand file patterns and the scan directory into a sorted, deduplicated list
fn collect_files(config: &Config) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();

    for pattern in &config.files {
        if pattern.contains(['*', '?', '[']) {
            for path in glob::glob(pattern).into_diagnostic()?.flatten() {
                paths.push(path);
            }
        } else {
            paths.push(PathBuf::from(pattern));
        }
    }

    if let Some(dir) = &config.dir {
        let pattern = format!("{}/**/*.sql", dir.trim_end_matches('/'));
        for path in glob::glob(&pattern).into_diagnostic()?.flatten() {
            paths.push(path);
        }
    }

    paths.sort();
    paths.dedup();
    Ok(paths)
}
