//! Owned analysis session.
//!
//! An engine keeps whole-program state that is not reentrant. The session
//! takes ownership of the engine for one pipeline run: it resets the engine
//! on open, applies the pre-transform, and resets it again when closed or
//! dropped. Components that need IR access borrow the session.

use tracing::{debug, info};

use crate::error::IrMetricsResult;
use crate::ir::{IrClass, IrEngine};
use crate::pretransform::PreTransform;

pub struct AnalysisSession {
    engine: Box<dyn IrEngine>,
    application_classes: Vec<String>,
    pre_transform: &'static str,
}

impl AnalysisSession {
    /// Resets `engine`, records its application classes and runs `pre_transform`.
    pub fn open(
        mut engine: Box<dyn IrEngine>,
        pre_transform: &dyn PreTransform,
    ) -> IrMetricsResult<Self> {
        engine.reset();
        let application_classes = engine.class_names();

        let mut session = Self {
            engine,
            application_classes,
            pre_transform: pre_transform.name(),
        };

        pre_transform.prepare(&mut session)?;

        info!(
            engine = %session.engine.name(),
            classes = session.application_classes.len(),
            pre_transform = %session.pre_transform,
            "analysis session opened"
        );
        Ok(session)
    }

    /// Application classes in engine order.
    pub fn application_classes(&self) -> &[String] {
        &self.application_classes
    }

    pub fn engine(&self) -> &dyn IrEngine {
        self.engine.as_ref()
    }

    pub fn resolve(&self, class_name: &str) -> IrMetricsResult<&IrClass> {
        self.engine.resolve(class_name)
    }

    pub fn resolve_mut(&mut self, class_name: &str) -> IrMetricsResult<&mut IrClass> {
        self.engine.resolve_mut(class_name)
    }

    /// Name of the pre-transform applied when the session opened.
    pub fn pre_transform(&self) -> &str {
        self.pre_transform
    }

    /// Tears the session down and hands the reset engine back.
    pub fn close(mut self) -> Box<dyn IrEngine> {
        self.engine.reset();
        debug!(engine = %self.engine.name(), "analysis session closed");
        // Swap in an inert engine so Drop does not reset the returned one again.
        std::mem::replace(&mut self.engine, Box::new(ClosedEngine))
    }
}

impl Drop for AnalysisSession {
    fn drop(&mut self) {
        self.engine.reset();
    }
}

impl std::fmt::Debug for AnalysisSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisSession")
            .field("engine", &self.engine.name())
            .field("application_classes", &self.application_classes.len())
            .field("pre_transform", &self.pre_transform)
            .finish()
    }
}

/// Placeholder left behind by [`AnalysisSession::close`].
struct ClosedEngine;

impl IrEngine for ClosedEngine {
    fn name(&self) -> &str {
        "closed"
    }

    fn class_names(&self) -> Vec<String> {
        Vec::new()
    }

    fn resolve(&self, class_name: &str) -> IrMetricsResult<&IrClass> {
        Err(crate::error::IrMetricsError::resolution(
            class_name,
            "session is closed",
        ))
    }

    fn resolve_mut(&mut self, class_name: &str) -> IrMetricsResult<&mut IrClass> {
        Err(crate::error::IrMetricsError::resolution(
            class_name,
            "session is closed",
        ))
    }

    fn reset(&mut self) {}
}
