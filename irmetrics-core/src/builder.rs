//! Builder API and session-bound provider.
//!
//! ```rust,ignore
//! use irmetrics_core::prelude::*;
//!
//! let provider = IrMetrics::new("/path/to/classpath")
//!     .with_pre_transform(true)
//!     .open()?;
//!
//! let report = provider.generate_all("/path/to/out", false)?;
//! println!("generated {} classes", report.generated.len());
//! ```

use std::path::{Path, PathBuf};

use indexmap::IndexSet;

use crate::artifact::{self, GenerationReport};
use crate::classify::{SyntheticNamePredicate, VariablePredicate};
use crate::error::IrMetricsResult;
use crate::invoke::{extract_by_identifier, InvokeSite};
use crate::ir::IrEngine;
use crate::lines::{self, SourceLayout};
use crate::pretransform::{LineTagPropagation, NoopPreTransform, PreTransform};
use crate::session::AnalysisSession;
use crate::snapshot::SnapshotEngine;
use crate::usage::{self, UsageIndex};

/// Builder for an analysis over one classpath.
pub struct IrMetrics {
    /// Snapshot classpath, unless an engine is supplied directly.
    classpath: Option<PathBuf>,

    /// Engine supplied by the caller.
    engine: Option<Box<dyn IrEngine>>,

    /// Pre-transform applied when the session opens.
    pre_transform: Box<dyn PreTransform>,

    /// Stack variable naming convention.
    predicate: Box<dyn VariablePredicate>,

    /// Source layout for line resolution.
    layout: SourceLayout,
}

impl IrMetrics {
    /// Analysis over the snapshots below `classpath`.
    pub fn new(classpath: impl Into<PathBuf>) -> Self {
        Self {
            classpath: Some(classpath.into()),
            engine: None,
            pre_transform: Box::new(NoopPreTransform),
            predicate: Box::new(SyntheticNamePredicate),
            layout: SourceLayout::default(),
        }
    }

    /// Analysis over an engine the caller already built.
    pub fn with_engine(engine: Box<dyn IrEngine>) -> Self {
        Self {
            classpath: None,
            engine: Some(engine),
            pre_transform: Box::new(NoopPreTransform),
            predicate: Box::new(SyntheticNamePredicate),
            layout: SourceLayout::default(),
        }
    }

    /// Enable or disable line-tag propagation.
    pub fn with_pre_transform(mut self, enabled: bool) -> Self {
        self.pre_transform = if enabled {
            Box::new(LineTagPropagation)
        } else {
            Box::new(NoopPreTransform)
        };
        self
    }

    /// Use a custom pre-transform.
    pub fn pre_transform(mut self, pre_transform: Box<dyn PreTransform>) -> Self {
        self.pre_transform = pre_transform;
        self
    }

    /// Substitute the stack variable naming convention.
    pub fn predicate(mut self, predicate: Box<dyn VariablePredicate>) -> Self {
        self.predicate = predicate;
        self
    }

    /// Source layout used to map files to classes.
    pub fn source_layout(mut self, layout: SourceLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Loads the engine if needed and opens the session.
    pub fn open(self) -> IrMetricsResult<Provider> {
        let engine: Box<dyn IrEngine> = match (self.engine, &self.classpath) {
            (Some(engine), _) => engine,
            (None, Some(classpath)) => Box::new(SnapshotEngine::open(classpath)?),
            (None, None) => {
                return Err(crate::error::IrMetricsError::internal(
                    "neither a classpath nor an engine was configured",
                ))
            }
        };

        let session = AnalysisSession::open(engine, self.pre_transform.as_ref())?;
        Ok(Provider {
            session,
            predicate: self.predicate,
            layout: self.layout,
        })
    }
}

/// Operations over one open analysis session.
pub struct Provider {
    session: AnalysisSession,
    predicate: Box<dyn VariablePredicate>,
    layout: SourceLayout,
}

impl Provider {
    pub fn session(&self) -> &AnalysisSession {
        &self.session
    }

    /// Application classes on the classpath, in engine order.
    pub fn application_classes(&self) -> &[String] {
        self.session.application_classes()
    }

    /// Generates artifacts for `classes`.
    pub fn generate(
        &self,
        classes: &[String],
        output_root: impl AsRef<Path>,
        replace_existing: bool,
    ) -> IrMetricsResult<GenerationReport> {
        artifact::generate(
            &self.session,
            self.predicate.as_ref(),
            classes,
            output_root.as_ref(),
            replace_existing,
        )
    }

    /// Generates artifacts for every application class.
    pub fn generate_all(
        &self,
        output_root: impl AsRef<Path>,
        replace_existing: bool,
    ) -> IrMetricsResult<GenerationReport> {
        self.generate(
            self.session.application_classes(),
            output_root,
            replace_existing,
        )
    }

    /// Call sites of one method, by signature or sub-signature.
    pub fn invocations_of(
        &self,
        class_name: &str,
        method_id: &str,
    ) -> IrMetricsResult<Vec<InvokeSite>> {
        let class = self.session.resolve(class_name)?;
        Ok(extract_by_identifier(class, method_id))
    }

    /// Reverse call index over `classes` filtered by package prefix.
    pub fn usage_index(&self, classes: &[String], package_prefix: &str) -> UsageIndex {
        usage::build(&self.session, classes, package_prefix)
    }

    /// Callee signatures used from within `package_prefix`.
    pub fn seen_signatures(&self, package_prefix: &str) -> IndexSet<String> {
        usage::seen_signatures(&self.session, package_prefix)
    }

    /// Declared and invoked signatures of every application class.
    pub fn all_signatures(&self) -> (IndexSet<String>, Vec<String>) {
        usage::all_signatures(&self.session, self.session.application_classes())
    }

    /// Signature of the method enclosing `line` of `source_file`.
    pub fn resolve_method_at_line(
        &self,
        source_file: &str,
        line: u32,
    ) -> IrMetricsResult<Option<String>> {
        lines::resolve_method_at_line(&self.session, &self.layout, source_file, line)
    }

    /// Ends the session, resetting the engine.
    pub fn close(self) -> Box<dyn IrEngine> {
        self.session.close()
    }
}
