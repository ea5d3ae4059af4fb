//! `natprint fingerprint`, `natprint hash`, and `natprint sources`.

use natprint_diagnostics::DiagnosticSink;
use tracing::info;

use crate::pipeline::{project_builder, render_diagnostics, resolve_options, EXIT_ERROR};
use crate::{FingerprintArgs, GlobalArgs, ProjectArgs, ReportFormat};

/// Builds the fingerprint and prints it, or stores it with `--output`.
pub fn run(args: &FingerprintArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let root = &args.project.root;
    let sink = DiagnosticSink::new();
    let Some(options) = resolve_options(root, &args.project.overrides, global, &sink) else {
        render_diagnostics(&sink, global, ReportFormat::Text);
        return Ok(EXIT_ERROR);
    };
    let result = project_builder(options).build(root, &sink);
    if render_diagnostics(&sink, global, ReportFormat::Text) {
        return Ok(EXIT_ERROR);
    }
    let fingerprint = result?;

    match &args.output {
        Some(path) => {
            fingerprint.save(path)?;
            info!(path = %path.display(), hash = %fingerprint.hash(), "stored fingerprint");
            if !global.quiet {
                eprintln!(
                    "  Fingerprinted {} sources: {}",
                    fingerprint.len(),
                    fingerprint.hash()
                );
            }
        }
        None => println!("{}", fingerprint.to_json()?),
    }
    Ok(0)
}

/// Prints only the aggregate hash.
pub fn run_hash(args: &ProjectArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let sink = DiagnosticSink::new();
    let Some(options) = resolve_options(&args.root, &args.overrides, global, &sink) else {
        render_diagnostics(&sink, global, ReportFormat::Text);
        return Ok(EXIT_ERROR);
    };
    let builder = project_builder(options);
    let result = natprint_fingerprint::create_project_hash(&builder, &args.root, &sink);
    if render_diagnostics(&sink, global, ReportFormat::Text) {
        return Ok(EXIT_ERROR);
    }
    println!("{}", result?);
    Ok(0)
}

/// Prints the normalized sources without hashing them.
pub fn run_sources(
    args: &ProjectArgs,
    global: &GlobalArgs,
) -> Result<i32, Box<dyn std::error::Error>> {
    let sink = DiagnosticSink::new();
    let Some(options) = resolve_options(&args.root, &args.overrides, global, &sink) else {
        render_diagnostics(&sink, global, ReportFormat::Text);
        return Ok(EXIT_ERROR);
    };
    let result = project_builder(options).hash_sources(&args.root, &sink);
    if render_diagnostics(&sink, global, ReportFormat::Text) {
        return Ok(EXIT_ERROR);
    }
    println!("{}", serde_json::to_string_pretty(&result?)?);
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::OverrideArgs;
    use natprint_fingerprint::Fingerprint;
    use std::fs;
    use std::path::PathBuf;

    fn quiet() -> GlobalArgs {
        GlobalArgs {
            quiet: true,
            verbose: false,
            color: false,
            config: None,
        }
    }

    #[test]
    fn fingerprint_written_to_output_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("android/app")).unwrap();
        fs::write(dir.path().join("android/app/build.gradle"), "apply plugin").unwrap();
        let output = dir.path().join("out/fingerprint.json");

        let args = FingerprintArgs {
            project: ProjectArgs {
                root: dir.path().to_path_buf(),
                overrides: OverrideArgs::default(),
            },
            output: Some(output.clone()),
        };
        assert_eq!(run(&args, &quiet()).unwrap(), 0);

        let stored = Fingerprint::load(&output).unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored.sources()[0].locator(), "android");
    }

    #[test]
    fn unknown_skip_flag_exits_with_error_code() {
        let dir = tempfile::tempdir().unwrap();
        let args = ProjectArgs {
            root: dir.path().to_path_buf(),
            overrides: OverrideArgs {
                skip: vec!["not-a-flag".to_string()],
                ..Default::default()
            },
        };
        assert_eq!(run_hash(&args, &quiet()).unwrap(), EXIT_ERROR);
    }

    #[test]
    fn unhashable_declared_source_exits_with_error_code() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("natprint.toml"),
            "[[extra_sources]]\ntype = \"file\"\npath = \"missing.txt\"\n",
        )
        .unwrap();
        let args = FingerprintArgs {
            project: ProjectArgs {
                root: dir.path().to_path_buf(),
                overrides: OverrideArgs::default(),
            },
            output: None,
        };
        assert_eq!(run(&args, &quiet()).unwrap(), EXIT_ERROR);
    }

    #[test]
    fn missing_root_yields_empty_sources() {
        let args = ProjectArgs {
            root: PathBuf::from("/nonexistent/natprint-project"),
            overrides: OverrideArgs::default(),
        };
        assert_eq!(run_sources(&args, &quiet()).unwrap(), 0);
    }
}
