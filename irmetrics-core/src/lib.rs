//! irmetrics-core: intermediate-representation dumps and per-class metrics
//! for compiled Java classes.
//!
//! For every requested class the library writes two artifacts under an
//! output root mirroring the package path: a textual IR dump (`.ir`) and a
//! metrics record (`.json`) listing the superclass, interfaces, method
//! signatures and, per method, its local variables, stack variables and
//! call sites. It also answers queries over the same session: call sites of
//! one method, a reverse call index for a package subset, and the method
//! enclosing a source line.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use irmetrics_core::prelude::*;
//!
//! let provider = IrMetrics::new("/path/to/classpath")
//!     .with_pre_transform(true)
//!     .open()?;
//!
//! let report = provider.generate_all("/path/to/out", false)?;
//! for failure in &report.failures {
//!     eprintln!("{}: {}", failure.class_name, failure.error);
//! }
//! ```
//!
//! # Module Organization
//!
//! - [`ir`]: class model and the [`IrEngine`] seam
//! - [`snapshot`]: engine backed by `*.class.json` snapshots
//! - [`session`]: one open analysis over an engine
//! - [`pretransform`]: transforms applied when a session opens
//! - [`classify`]: local vs. stack variable partition
//! - [`invoke`]: call site extraction
//! - [`metrics`]: per-class metrics records
//! - [`artifact`]: artifact layout and incremental generation
//! - [`usage`]: reverse call index
//! - [`lines`]: source line to method resolution
//! - [`builder`]: fluent builder API
//! - [`error`]: typed error handling

pub mod artifact;
pub mod builder;
pub mod classify;
pub mod config;
pub mod error;
pub mod invoke;
pub mod ir;
pub mod lines;
pub mod logging;
pub mod metrics;
pub mod prelude;
pub mod pretransform;
pub mod printer;
pub mod report;
pub mod scan;
pub mod session;
pub mod snapshot;
pub mod usage;

// ============================================================================
// Explicit Re-exports
// ============================================================================

// Error types
pub use error::{IoResultExt, IrMetricsError, IrMetricsResult};

// Class model
pub use ir::{IrBody, IrClass, IrEngine, IrField, IrLocal, IrMethod, IrStatement};

// Builder API
pub use builder::{IrMetrics, Provider};

// Engines and sessions
pub use session::AnalysisSession;
pub use snapshot::SnapshotEngine;
pub use pretransform::{LineTagPropagation, NoopPreTransform, PreTransform};

// Analysis
pub use classify::{
    classify_locals, RegexPredicate, SyntheticNamePredicate, VariablePartition,
    VariablePredicate, DEFAULT_STACK_PATTERN,
};
pub use invoke::{extract, extract_by_identifier, normalize_signature, InvokeSite, UNKNOWN_LINE};
pub use metrics::{assemble, ClassRecord, MethodRecord};
pub use usage::{all_signatures, seen_signatures, UsageIndex};
pub use lines::{resolve_method_at_line, SourceLayout};

// Generation
pub use artifact::{
    generate, ArtifactPaths, FailureSummary, GenerationFailure, GenerationReport,
    GenerationSummary, IR_EXTENSION, METRICS_EXTENSION,
};
pub use printer::{class_to_string, print_class};

// Configuration
pub use config::{load_config, IrMetricsConfig, CONFIG_FILE};

// Logging
pub use logging::{init_structured_logging, log_error, log_info, log_warn};

// Reporting
pub use report::{print_json, print_plain};

// File scanning
pub use scan::{gather_class_files, gather_class_names, SNAPSHOT_SUFFIX};

#[cfg(test)]
mod testing;
