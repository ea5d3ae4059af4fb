//! Shared command plumbing: option resolution, builder setup, and diagnostic
//! rendering.

use natprint_config::{load_options, ConfigError, OptionOverrides, Options, Platform, SourceSkip};
use natprint_diagnostics::{
    Diagnostic, DiagnosticCode, DiagnosticRenderer, DiagnosticSink, JsonRenderer, Severity,
    TerminalRenderer,
};
use natprint_fingerprint::FingerprintBuilder;
use std::path::Path;
use tracing::debug;

use crate::{GlobalArgs, OverrideArgs, ReportFormat};

impl OverrideArgs {
    /// Converts the command-line flags into configuration overrides.
    pub fn to_overrides(&self) -> OptionOverrides {
        OptionOverrides {
            platforms: self.platform.clone(),
            skip: self.skip.clone(),
            ignore_paths: self.ignore_path.clone(),
            concurrent_io_limit: self.concurrency,
            debug: self.debug,
            fatal_discovery_errors: self.fatal_discovery,
        }
    }
}

/// Exit code of a run that stopped on an error.
pub const EXIT_ERROR: i32 = 2;

/// Resolves the effective options for `root`.
///
/// A configuration problem is reported to `sink` as a `C001` error and yields
/// `None`.
pub fn resolve_options(
    root: &Path,
    overrides: &OverrideArgs,
    global: &GlobalArgs,
    sink: &DiagnosticSink,
) -> Option<Options> {
    let loaded = load_options(
        root,
        global.config.as_deref().map(Path::new),
        &overrides.to_overrides(),
    );
    match loaded {
        Ok(options) => {
            debug!(
                root = %root.display(),
                platforms = ?options.platforms,
                workers = options.worker_count(),
                "resolved options"
            );
            Some(options)
        }
        Err(err) => {
            sink.emit(config_diagnostic(&err));
            None
        }
    }
}

fn config_diagnostic(err: &ConfigError) -> Diagnostic {
    let diag = Diagnostic::error(DiagnosticCode::CONFIG_INVALID, err.to_string());
    match err {
        ConfigError::UnknownFlag(_) => {
            let names: Vec<&str> = SourceSkip::ALL.iter().map(|s| s.as_str()).collect();
            diag.with_help(format!("valid skip flags: {}", names.join(", ")))
        }
        ConfigError::UnknownPlatform(_) => {
            let names: Vec<&str> = Platform::ALL.iter().map(|p| p.as_str()).collect();
            diag.with_help(format!("valid platforms: {}", names.join(", ")))
        }
        _ => diag,
    }
}

/// Creates a builder with every in-tree collaborator registered.
pub fn project_builder(options: Options) -> FingerprintBuilder {
    FingerprintBuilder::new(options).with_collaborators(natprint_sourcer::default_collaborators())
}

/// Returns `true` if a diagnostic of `severity` should be shown.
///
/// `--quiet` keeps errors only; notes need `--verbose`.
pub fn is_visible(severity: Severity, global: &GlobalArgs) -> bool {
    if global.quiet {
        severity.is_error()
    } else if global.verbose {
        true
    } else {
        severity >= Severity::Warning
    }
}

/// Drains `sink` and writes the visible diagnostics to stderr.
///
/// Returns `true` if any error was emitted.
pub fn render_diagnostics(
    sink: &DiagnosticSink,
    global: &GlobalArgs,
    format: ReportFormat,
) -> bool {
    let renderer: Box<dyn DiagnosticRenderer> = match format {
        ReportFormat::Text => Box::new(TerminalRenderer::new(global.color)),
        ReportFormat::Json => Box::new(JsonRenderer),
    };
    for diag in sink
        .take_all()
        .iter()
        .filter(|d| is_visible(d.severity, global))
    {
        eprintln!("{}", renderer.render(diag));
    }
    sink.has_errors()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn global(quiet: bool, verbose: bool) -> GlobalArgs {
        GlobalArgs {
            quiet,
            verbose,
            color: false,
            config: None,
        }
    }

    #[test]
    fn default_visibility_hides_notes() {
        let g = global(false, false);
        assert!(is_visible(Severity::Error, &g));
        assert!(is_visible(Severity::Warning, &g));
        assert!(!is_visible(Severity::Note, &g));
    }

    #[test]
    fn verbose_shows_everything() {
        assert!(is_visible(Severity::Note, &global(false, true)));
        assert!(is_visible(Severity::Warning, &global(false, true)));
    }

    #[test]
    fn quiet_shows_errors_only() {
        let g = global(true, false);
        assert!(is_visible(Severity::Error, &g));
        assert!(!is_visible(Severity::Warning, &g));
    }

    #[test]
    fn overrides_carry_every_flag() {
        let args = OverrideArgs {
            platform: vec!["ios".to_string()],
            skip: vec!["git-ignore".to_string()],
            ignore_path: vec!["docs".to_string()],
            concurrency: Some(3),
            debug: true,
            fatal_discovery: true,
        };
        let overrides = args.to_overrides();
        assert_eq!(overrides.platforms, vec!["ios"]);
        assert_eq!(overrides.skip, vec!["git-ignore"]);
        assert_eq!(overrides.ignore_paths, vec!["docs"]);
        assert_eq!(overrides.concurrent_io_limit, Some(3));
        assert!(overrides.debug);
        assert!(overrides.fatal_discovery_errors);
    }

    #[test]
    fn resolve_options_reads_explicit_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("custom.toml");
        std::fs::write(&config, "platforms = [\"android\"]\n").unwrap();
        let g = GlobalArgs {
            config: Some(config.display().to_string()),
            ..global(false, false)
        };
        let sink = DiagnosticSink::new();
        let options = resolve_options(dir.path(), &OverrideArgs::default(), &g, &sink).unwrap();
        assert!(options.has_platform(Platform::Android));
        assert!(!options.has_platform(Platform::Ios));
        assert!(sink.diagnostics().is_empty());
    }

    #[test]
    fn unknown_flag_reported_as_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DiagnosticSink::new();
        let overrides = OverrideArgs {
            skip: vec!["gitignore".to_string()],
            ..Default::default()
        };
        assert!(resolve_options(dir.path(), &overrides, &global(false, false), &sink).is_none());
        assert!(sink.has_errors());
        let diags = sink.take_all();
        assert_eq!(diags[0].code, DiagnosticCode::CONFIG_INVALID);
        assert_eq!(diags[0].severity, Severity::Error);
        assert!(diags[0].help[0].contains("git-ignore"));
    }

    #[test]
    fn unknown_platform_help_lists_platforms() {
        let diag = config_diagnostic(&ConfigError::UnknownPlatform("web".to_string()));
        assert_eq!(diag.help, vec!["valid platforms: android, ios".to_string()]);
        assert_eq!(diag.message, "unknown platform 'web'");
    }
}
