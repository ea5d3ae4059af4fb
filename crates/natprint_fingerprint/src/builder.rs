//! Orchestration of collaborators, normalization, and hashing into a [`Fingerprint`].

use crate::collaborator::{platform_enabled, Collaborator};
use crate::diff::{diff, DiffEntry};
use crate::error::{DiscoveryError, FingerprintError, HashError};
use crate::fingerprint::Fingerprint;
use crate::hasher::SourceHasher;
use crate::normalizer::normalize;
use crate::source::{HashSource, SourceKind};
use natprint_common::ContentHash;
use natprint_config::{IgnoreRules, Options};
use natprint_diagnostics::{Diagnostic, DiagnosticCode, DiagnosticSink};
use rayon::prelude::*;
use rayon::ThreadPool;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Builds fingerprints from a set of registered collaborators.
///
/// Each build runs on its own bounded worker pool of
/// [`Options::worker_count`] threads, shared by collaborator invocation and
/// per-file hashing. A build returns either a complete [`Fingerprint`] or an
/// error; cancellation through the token yields [`FingerprintError::Cancelled`].
pub struct FingerprintBuilder {
    options: Options,
    collaborators: Vec<Arc<dyn Collaborator>>,
    cancel: CancellationToken,
}

impl FingerprintBuilder {
    /// Creates a builder with no collaborators.
    pub fn new(options: Options) -> Self {
        Self {
            options,
            collaborators: Vec::new(),
            cancel: CancellationToken::new(),
        }
    }

    /// Registers a collaborator.
    pub fn with_collaborator(mut self, collaborator: Arc<dyn Collaborator>) -> Self {
        self.collaborators.push(collaborator);
        self
    }

    /// Registers several collaborators.
    pub fn with_collaborators(
        mut self,
        collaborators: impl IntoIterator<Item = Arc<dyn Collaborator>>,
    ) -> Self {
        self.collaborators.extend(collaborators);
        self
    }

    /// Uses `token` as the cancellation signal.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// The options consulted by this builder and its collaborators.
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// The cancellation signal; cancelling it aborts any build in flight.
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Discovers and normalizes sources without hashing them.
    ///
    /// Ignored file and directory sources are already removed.
    pub fn hash_sources(
        &self,
        project_root: &Path,
        sink: &DiagnosticSink,
    ) -> Result<Vec<HashSource>, FingerprintError> {
        let pool = self.worker_pool()?;
        let ignore = IgnoreRules::new(project_root, &self.options.ignore_paths)?;
        self.collect_sources(&pool, project_root, &ignore, sink)
    }

    /// Builds the fingerprint of `project_root`.
    pub fn build(
        &self,
        project_root: &Path,
        sink: &DiagnosticSink,
    ) -> Result<Fingerprint, FingerprintError> {
        let started = Instant::now();
        let pool = self.worker_pool()?;
        let ignore = IgnoreRules::new(project_root, &self.options.ignore_paths)?;
        let sources = self.collect_sources(&pool, project_root, &ignore, sink)?;

        let hasher = SourceHasher::new(project_root, &ignore, &self.options, &self.cancel);
        let results: Vec<(HashSource, Result<(), HashError>)> = pool.install(|| {
            sources
                .into_par_iter()
                .map(|mut source| {
                    let result = hasher.hash_source(&mut source);
                    (source, result)
                })
                .collect()
        });

        let mut hashed = Vec::with_capacity(results.len());
        let mut failures = Vec::new();
        let mut cancelled = false;
        for (source, result) in results {
            match result {
                Ok(()) => hashed.push(source),
                Err(HashError::Cancelled) => cancelled = true,
                Err(HashError::Failure(failure)) if source.optional => {
                    debug!(
                        source = %source.key(),
                        error = %failure,
                        "dropping unhashable optional source"
                    );
                    sink.emit(
                        Diagnostic::warning(
                            DiagnosticCode::OPTIONAL_SOURCE_UNHASHABLE,
                            "optional source could not be hashed and was dropped",
                        )
                        .with_subject(source.key().to_string())
                        .with_note(failure.to_string()),
                    );
                }
                Err(HashError::Failure(failure)) => failures.push((source.key(), failure)),
            }
        }

        if cancelled || self.cancel.is_cancelled() {
            return Err(FingerprintError::Cancelled);
        }
        if !failures.is_empty() {
            for (key, failure) in &failures {
                sink.emit(
                    Diagnostic::error(
                        DiagnosticCode::SOURCE_UNHASHABLE,
                        "source could not be hashed",
                    )
                    .with_subject(key.to_string())
                    .with_note(failure.to_string())
                    .with_help("mark the source optional or add its path to ignore_paths"),
                );
            }
            return Err(FingerprintError::BuildFailed {
                failures: failures.into_iter().map(|(_, failure)| failure).collect(),
            });
        }

        let fingerprint = Fingerprint::from_sources(hashed)?;
        info!(
            sources = fingerprint.len(),
            hash = %fingerprint.hash(),
            elapsed = ?started.elapsed(),
            "fingerprint built"
        );
        Ok(fingerprint)
    }

    fn worker_pool(&self) -> Result<ThreadPool, FingerprintError> {
        self.options.validate()?;
        rayon::ThreadPoolBuilder::new()
            .num_threads(self.options.worker_count())
            .thread_name(|i| format!("natprint-worker-{i}"))
            .build()
            .map_err(|e| FingerprintError::WorkerPool {
                reason: e.to_string(),
            })
    }

    fn collect_sources(
        &self,
        pool: &ThreadPool,
        project_root: &Path,
        ignore: &IgnoreRules,
        sink: &DiagnosticSink,
    ) -> Result<Vec<HashSource>, FingerprintError> {
        let raw = self.discover(pool, project_root, sink)?;
        let normalized = normalize(project_root, raw)?;
        Ok(drop_ignored(normalized, ignore, sink))
    }

    fn discover(
        &self,
        pool: &ThreadPool,
        project_root: &Path,
        sink: &DiagnosticSink,
    ) -> Result<Vec<HashSource>, FingerprintError> {
        let accumulator = Mutex::new(Vec::new());
        pool.install(|| {
            self.collaborators.par_iter().try_for_each(|collaborator| {
                self.run_collaborator(collaborator.as_ref(), project_root, sink, &accumulator)
            })
        })?;
        if self.cancel.is_cancelled() {
            return Err(FingerprintError::Cancelled);
        }
        Ok(accumulator
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner))
    }

    fn run_collaborator(
        &self,
        collaborator: &dyn Collaborator,
        project_root: &Path,
        sink: &DiagnosticSink,
        accumulator: &Mutex<Vec<HashSource>>,
    ) -> Result<(), FingerprintError> {
        if self.cancel.is_cancelled() {
            return Err(FingerprintError::Cancelled);
        }
        let name = collaborator.name();

        let skip_reason = if !platform_enabled(collaborator, &self.options) {
            Some("none of its platforms is enabled")
        } else if collaborator.is_skipped(&self.options) {
            Some("excluded by source skip flags")
        } else {
            None
        };
        if let Some(reason) = skip_reason {
            debug!(collaborator = name, reason, "collaborator skipped");
            sink.emit(
                Diagnostic::note(DiagnosticCode::COLLABORATOR_SKIPPED, "collaborator skipped")
                    .with_subject(name)
                    .with_note(reason),
            );
            return Ok(());
        }

        let started = Instant::now();
        let discovered = panic::catch_unwind(AssertUnwindSafe(|| {
            collaborator.discover(project_root, &self.options)
        }))
        .unwrap_or_else(|payload| {
            Err(DiscoveryError::new(
                name,
                format!("panicked: {}", panic_message(payload.as_ref())),
            ))
        });
        match discovered {
            Ok(sources) => {
                debug!(
                    collaborator = name,
                    sources = sources.len(),
                    elapsed = ?started.elapsed(),
                    "collaborator finished"
                );
                accumulator
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .extend(sources);
                Ok(())
            }
            Err(err) if self.options.fatal_discovery_errors => {
                sink.emit(
                    Diagnostic::error(DiagnosticCode::COLLABORATOR_FAILED, "collaborator failed")
                        .with_subject(name)
                        .with_note(err.message.clone()),
                );
                Err(err.into())
            }
            Err(err) => {
                debug!(
                    collaborator = name,
                    error = %err,
                    "collaborator failed, contributing no sources"
                );
                sink.emit(
                    Diagnostic::warning(DiagnosticCode::COLLABORATOR_FAILED, "collaborator failed")
                        .with_subject(name)
                        .with_note(err.message),
                );
                Ok(())
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "unknown panic payload"
    }
}

fn drop_ignored(
    sources: Vec<HashSource>,
    ignore: &IgnoreRules,
    sink: &DiagnosticSink,
) -> Vec<HashSource> {
    sources
        .into_iter()
        .filter(|source| {
            let is_dir = match source.kind() {
                SourceKind::Contents => return true,
                SourceKind::Dir => true,
                SourceKind::File => false,
            };
            if !ignore.is_ignored(source.locator(), is_dir) {
                return true;
            }
            debug!(source = %source.key(), "dropping ignored source");
            sink.emit(
                Diagnostic::note(DiagnosticCode::SOURCE_IGNORED, "source matches an ignore path")
                    .with_subject(source.key().to_string()),
            );
            false
        })
        .collect()
}

/// Builds the fingerprint and returns only its aggregate hash.
pub fn create_project_hash(
    builder: &FingerprintBuilder,
    project_root: &Path,
    sink: &DiagnosticSink,
) -> Result<ContentHash, FingerprintError> {
    builder.build(project_root, sink).map(|f| f.hash())
}

/// Builds the current fingerprint of `project_root` and diffs `before` against it.
pub fn diff_fingerprint_changes(
    before: &Fingerprint,
    builder: &FingerprintBuilder,
    project_root: &Path,
    sink: &DiagnosticSink,
) -> Result<Vec<DiffEntry>, FingerprintError> {
    let after = builder.build(project_root, sink)?;
    Ok(diff(before, &after))
}
