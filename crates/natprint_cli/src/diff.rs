//! `natprint diff` — compares a stored fingerprint with another one or with
//! the current project tree.

use natprint_diagnostics::DiagnosticSink;
use natprint_fingerprint::{DiffEntry, Fingerprint};

use crate::pipeline::{project_builder, render_diagnostics, resolve_options, EXIT_ERROR};
use crate::{DiffArgs, GlobalArgs, ReportFormat};

/// Runs the diff and prints its entries.
///
/// Returns exit code 0 if nothing changed, 1 otherwise, and 2 when an error
/// diagnostic stopped the build.
pub fn run(args: &DiffArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let before = Fingerprint::load(&args.before)?;
    let entries = match &args.after {
        Some(after) => before.diff(&Fingerprint::load(after)?),
        None => {
            let sink = DiagnosticSink::new();
            let Some(options) =
                resolve_options(&args.project.root, &args.project.overrides, global, &sink)
            else {
                render_diagnostics(&sink, global, args.format);
                return Ok(EXIT_ERROR);
            };
            let builder = project_builder(options);
            let result = natprint_fingerprint::diff_fingerprint_changes(
                &before,
                &builder,
                &args.project.root,
                &sink,
            );
            if render_diagnostics(&sink, global, args.format) {
                return Ok(EXIT_ERROR);
            }
            result?
        }
    };

    match args.format {
        ReportFormat::Text => {
            for entry in &entries {
                println!("{}", describe(entry));
            }
            if !global.quiet {
                eprintln!("  {} change(s)", entries.len());
            }
        }
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&entries)?),
    }

    Ok(if entries.is_empty() { 0 } else { 1 })
}

/// Formats one entry as `<op> <kind>:<locator>`, with hashes for changes.
fn describe(entry: &DiffEntry) -> String {
    let line = format!("{:<8} {}", entry.op().as_str(), entry.key());
    let short = |source: Option<&natprint_fingerprint::HashSource>| {
        source
            .and_then(|s| s.hash)
            .map(|h| h.short(8))
            .unwrap_or_else(|| "-".to_string())
    };
    match entry {
        DiffEntry::Changed { .. } => {
            format!("{line} {} -> {}", short(entry.before()), short(entry.after()))
        }
        _ => line,
    }
}
