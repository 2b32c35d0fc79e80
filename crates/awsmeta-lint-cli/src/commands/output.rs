//! Shared output formatting for lint results.

use anyhow::Result;
use awsmeta_lint_core::{Issue, IssueDiagnostic, LintResult, Severity};
use miette::{NamedSource, Report};
use std::path::Path;

use crate::OutputFormat;

/// Print lint results in the specified format.
///
/// `root` is the analyzed directory; issue paths are relative to it.
pub fn print(result: &LintResult, format: OutputFormat, root: &Path) -> Result<()> {
    match format {
        OutputFormat::Text => print_text(result),
        OutputFormat::Json => return print_json(result),
        OutputFormat::Compact => print_compact(result),
        OutputFormat::Pretty => print_pretty(result, root),
    }
    Ok(())
}

fn print_text(result: &LintResult) {
    let (errors, warnings, infos) = result.count_by_severity();

    for issue in &result.issues {
        let severity_indicator = match issue.severity {
            Severity::Error => "\x1b[31merror\x1b[0m",
            Severity::Warning => "\x1b[33mwarning\x1b[0m",
            Severity::Info => "\x1b[34minfo\x1b[0m",
        };

        println!(
            "{} {} at {}:{}:{}",
            issue.code,
            issue.rule,
            issue.range.file.display(),
            issue.range.start.line,
            issue.range.start.column,
        );
        println!("  {}: {}", severity_indicator, issue.message);
        if let Some(suggestion) = &issue.suggestion {
            println!("  = help: {}", suggestion.message);
        }
        println!();
    }

    print_summary(errors, warnings, infos, result);
}

fn print_summary(errors: usize, warnings: usize, infos: usize, result: &LintResult) {
    let summary_color = if errors > 0 {
        "\x1b[31m"
    } else if warnings > 0 {
        "\x1b[33m"
    } else {
        "\x1b[32m"
    };

    println!(
        "{}Found {} error(s), {} warning(s), {} info(s) in {} file(s){}\x1b[0m",
        summary_color,
        errors,
        warnings,
        infos,
        result.files_checked,
        if result.truncated { " (truncated)" } else { "" }
    );
}

fn print_json(result: &LintResult) -> Result<()> {
    let json = serde_json::to_string_pretty(result)?;
    println!("{json}");
    Ok(())
}

fn print_compact(result: &LintResult) {
    for issue in &result.issues {
        println!("{}", compact_line(issue));
    }
}

fn compact_line(issue: &Issue) -> String {
    format!(
        "{}:{}:{}: {} [{}] {}",
        issue.range.file.display(),
        issue.range.start.line,
        issue.range.start.column,
        issue.severity,
        issue.code,
        issue.message,
    )
}

fn print_pretty(result: &LintResult, root: &Path) {
    for issue in &result.issues {
        let diagnostic = IssueDiagnostic::from(issue);
        let name = issue.range.file.display().to_string();
        let report = match std::fs::read_to_string(root.join(&issue.range.file)) {
            Ok(content) => {
                Report::new(diagnostic).with_source_code(NamedSource::new(name, content))
            }
            Err(e) => {
                tracing::debug!("Cannot read {name} for rendering: {e}");
                Report::new(diagnostic)
            }
        };
        eprintln!("{report:?}");
    }

    let (errors, warnings, infos) = result.count_by_severity();
    print_summary(errors, warnings, infos, result);
}
