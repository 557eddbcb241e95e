//! Optional preprocessing applied to a freshly opened session.
//!
//! A pre-transform may rewrite the engine's IR before any metrics are taken.
//! Its effects live only as long as the session: closing the session resets
//! the engine.

use tracing::debug;

use crate::error::IrMetricsResult;
use crate::ir::IrBody;
use crate::session::AnalysisSession;

pub trait PreTransform {
    /// Name used in logs and reports.
    fn name(&self) -> &'static str;

    fn prepare(&self, session: &mut AnalysisSession) -> IrMetricsResult<()>;
}

/// Leaves the IR untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopPreTransform;

impl PreTransform for NoopPreTransform {
    fn name(&self) -> &'static str {
        "none"
    }

    fn prepare(&self, _session: &mut AnalysisSession) -> IrMetricsResult<()> {
        Ok(())
    }
}

/// Gives untagged statements the line of the closest preceding tagged
/// statement in the same body.
///
/// Synthesized statements (temporaries, casts, split calls) frequently lose
/// their line tag; after this pass their call sites are attributed to the
/// source line they were lowered from.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineTagPropagation;

impl PreTransform for LineTagPropagation {
    fn name(&self) -> &'static str {
        "line-tag-propagation"
    }

    fn prepare(&self, session: &mut AnalysisSession) -> IrMetricsResult<()> {
        let classes = session.application_classes().to_vec();
        let mut retagged = 0usize;

        for class_name in &classes {
            let class = session.resolve_mut(class_name)?;
            for method in &mut class.methods {
                if let Some(body) = method.body.as_mut() {
                    retagged += propagate_lines(body);
                }
            }
        }

        debug!(statements = retagged, "line tags propagated");
        Ok(())
    }
}

/// Returns the number of statements that received a line tag.
fn propagate_lines(body: &mut IrBody) -> usize {
    let mut last = None;
    let mut count = 0;

    for stmt in &mut body.statements {
        match stmt.line {
            Some(line) => last = Some(line),
            None if last.is_some() => {
                stmt.line = last;
                count += 1;
            }
            None => {}
        }
    }

    count
}
