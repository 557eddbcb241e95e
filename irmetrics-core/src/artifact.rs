//! Artifact writer: one IR dump + metrics JSON pair per class.
//!
//! Layout: `<out>/<package/as/dirs>/<Class>.ir` and `<Class>.json`.
//!
//! The IR dump doubles as the "already generated" marker for incremental
//! runs, so it is always the last file put in place. Both payloads are
//! rendered in memory before anything touches the disk, and each file is
//! written through a temp file + rename. A failure between the two renames
//! leaves no IR dump behind and the class is regenerated next time.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;
use tracing::{debug, error, info};

use crate::classify::VariablePredicate;
use crate::error::{IoResultExt, IrMetricsError, IrMetricsResult};
use crate::metrics;
use crate::session::AnalysisSession;

pub const IR_EXTENSION: &str = "ir";
pub const METRICS_EXTENSION: &str = "json";

/// Output locations of one class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub ir: PathBuf,
    pub metrics: PathBuf,
}

impl ArtifactPaths {
    /// Maps `pkg.sub.App` to `<out>/pkg/sub/App.ir` and `.json`.
    pub fn for_class(output_root: &Path, class_name: &str) -> Self {
        let mut base = output_root.to_path_buf();
        for segment in class_name.split('.') {
            base.push(segment);
        }
        Self {
            ir: base.with_extension(IR_EXTENSION),
            metrics: base.with_extension(METRICS_EXTENSION),
        }
    }

    pub fn parent(&self) -> Option<&Path> {
        self.ir.parent()
    }
}

/// A class that could not be generated, and why.
#[derive(Debug)]
pub struct GenerationFailure {
    pub class_name: String,
    pub error: IrMetricsError,
}

/// Outcome of one generation run.
#[derive(Debug, Default)]
pub struct GenerationReport {
    pub generated: Vec<String>,
    pub skipped: Vec<String>,
    pub failures: Vec<GenerationFailure>,
}

impl GenerationReport {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    pub fn total(&self) -> usize {
        self.generated.len() + self.skipped.len() + self.failures.len()
    }

    /// Serializable view, errors flattened to messages.
    pub fn summary(&self) -> GenerationSummary {
        GenerationSummary {
            generated: self.generated.clone(),
            skipped: self.skipped.clone(),
            failures: self
                .failures
                .iter()
                .map(|f| FailureSummary {
                    class_name: f.class_name.clone(),
                    error: f.error.to_string(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationSummary {
    pub generated: Vec<String>,
    pub skipped: Vec<String>,
    pub failures: Vec<FailureSummary>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureSummary {
    pub class_name: String,
    pub error: String,
}

enum ClassOutcome {
    Generated,
    Skipped,
}

/// Generates artifacts for `classes` below `output_root`.
///
/// With `replace_existing`, the whole output tree is deleted first. Failing
/// to delete or create the output root is fatal and returned as `Err`;
/// recoverable per-class failures are collected in the report and the run
/// continues, any other error ends the run.
pub fn generate(
    session: &AnalysisSession,
    predicate: &dyn VariablePredicate,
    classes: &[String],
    output_root: &Path,
    replace_existing: bool,
) -> IrMetricsResult<GenerationReport> {
    if replace_existing {
        remove_output_root(output_root)?;
    }
    fs::create_dir_all(output_root).with_path(output_root)?;

    let mut report = GenerationReport::default();

    for class_name in classes {
        match generate_class(session, predicate, class_name, output_root, replace_existing) {
            Ok(ClassOutcome::Generated) => report.generated.push(class_name.clone()),
            Ok(ClassOutcome::Skipped) => report.skipped.push(class_name.clone()),
            Err(error) if !error.is_recoverable() => {
                error!(class = %class_name, error = %error, "artifact generation aborted");
                return Err(error);
            }
            Err(error) => {
                error!(class = %class_name, error = %error, "artifact generation failed");
                report.failures.push(GenerationFailure {
                    class_name: class_name.clone(),
                    error,
                });
            }
        }
    }

    info!(
        total = report.total(),
        generated = report.generated.len(),
        skipped = report.skipped.len(),
        failed = report.failures.len(),
        output = %output_root.display(),
        "artifact generation finished"
    );
    Ok(report)
}

fn generate_class(
    session: &AnalysisSession,
    predicate: &dyn VariablePredicate,
    class_name: &str,
    output_root: &Path,
    replace_existing: bool,
) -> IrMetricsResult<ClassOutcome> {
    let paths = ArtifactPaths::for_class(output_root, class_name);

    if !replace_existing && paths.ir.exists() {
        debug!(class = %class_name, "artifacts present, skipping");
        return Ok(ClassOutcome::Skipped);
    }

    if let Some(parent) = paths.parent() {
        fs::create_dir_all(parent).with_path(parent)?;
    }

    let class = session.resolve(class_name)?;

    let mut ir_text = Vec::with_capacity(4096);
    session
        .engine()
        .print_to(class, &mut ir_text)
        .with_path(&paths.ir)?;

    let record = metrics::assemble(class, predicate);
    let json = metrics::to_json(&record)?;

    write_pair(&paths, &ir_text, json.as_bytes())?;

    debug!(class = %class_name, ir = %paths.ir.display(), "artifacts written");
    Ok(ClassOutcome::Generated)
}

/// Writes metrics first and the IR dump last; the IR dump marks the pair as
/// complete. If the IR dump cannot be written the metrics file is removed.
fn write_pair(paths: &ArtifactPaths, ir_text: &[u8], metrics_json: &[u8]) -> IrMetricsResult<()> {
    write_atomic(&paths.metrics, metrics_json)?;
    if let Err(e) = write_atomic(&paths.ir, ir_text) {
        discard_orphan_metrics(&paths.metrics);
        return Err(e);
    }
    Ok(())
}

/// Removes a metrics file left without its IR dump. Returns false, after
/// logging, if it is still on disk.
fn discard_orphan_metrics(path: &Path) -> bool {
    match fs::remove_file(path) {
        Ok(()) => true,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => true,
        Err(e) => {
            error!(
                path = %path.display(),
                error = %e,
                "metrics file left without its IR dump"
            );
            false
        }
    }
}

/// Deletes the output root, whether it is a directory or a stray file.
fn remove_output_root(output_root: &Path) -> IrMetricsResult<()> {
    let metadata = match output_root.symlink_metadata() {
        Ok(m) => m,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(IrMetricsError::io(output_root, e)),
    };

    if metadata.is_dir() {
        fs::remove_dir_all(output_root).with_path(output_root)?;
    } else {
        fs::remove_file(output_root).with_path(output_root)?;
    }

    info!(output = %output_root.display(), "existing artifacts removed");
    Ok(())
}

/// Writes `bytes` to a temp file next to `path` and renames it into place.
fn write_atomic(path: &Path, bytes: &[u8]) -> IrMetricsResult<()> {
    let dir = path
        .parent()
        .ok_or_else(|| IrMetricsError::io_message(path, "artifact path has no parent"))?;
    let file_name = path
        .file_name()
        .ok_or_else(|| IrMetricsError::io_message(path, "artifact path has no file name"))?
        .to_string_lossy();

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let temp_path = dir.join(format!(".{}.{}.{}.tmp", file_name, std::process::id(), nanos));

    fs::write(&temp_path, bytes).with_path(&temp_path)?;

    if let Err(e) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(IrMetricsError::io(path, e));
    }
    Ok(())
}
