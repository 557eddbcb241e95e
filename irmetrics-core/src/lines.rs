//! Source line to method resolution.
//!
//! A method covers `[first, last]` where `first` is its declared start line
//! and `last` the largest line tag in its body. Resolution returns the first
//! method, in declaration order, whose range contains the line.

use tracing::warn;

use crate::error::{IrMetricsError, IrMetricsResult};
use crate::ir::IrMethod;
use crate::session::AnalysisSession;

/// Source roots stripped from file paths by default.
pub const DEFAULT_SOURCE_ROOTS: &[&str] = &["src/main/java/", "src\\main\\java\\"];

/// Source extensions stripped by default.
pub const DEFAULT_EXTENSIONS: &[&str] = &["java"];

/// How source paths map onto class names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLayout {
    pub source_roots: Vec<String>,
    pub extensions: Vec<String>,
}

impl Default for SourceLayout {
    fn default() -> Self {
        Self {
            source_roots: DEFAULT_SOURCE_ROOTS.iter().map(|s| s.to_string()).collect(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl SourceLayout {
    /// Derives `pkg.App` from e.g. `project/src/main/java/pkg/App.java`.
    pub fn class_name_for(&self, source_file: &str) -> String {
        let mut rest = source_file;

        // Everything up to and including the source root is not package.
        for root in &self.source_roots {
            if let Some(pos) = rest.find(root.as_str()) {
                rest = &rest[pos + root.len()..];
                break;
            }
        }

        for ext in &self.extensions {
            if let Some(stem) = rest.strip_suffix(&format!(".{}", ext)) {
                rest = stem;
                break;
            }
        }

        rest.trim_start_matches(['/', '\\'])
            .replace(['/', '\\'], ".")
    }
}

/// Line range covered by a method, if its body has any line tags.
pub fn line_range(method: &IrMethod) -> Option<(u32, u32)> {
    let body = method.body.as_ref()?;
    let last = body.max_line()?;
    let first = method.start_line.or_else(|| body.min_line())?;
    Some((first, last))
}

/// Signature of the method in `source_file` enclosing `line`.
///
/// Methods are visited in declaration order and the first whose range
/// contains `line` wins. Reaching a method without a body before any match
/// ends the search with `Ok(None)`. A class missing from the classpath is an
/// error.
pub fn resolve_method_at_line(
    session: &AnalysisSession,
    layout: &SourceLayout,
    source_file: &str,
    line: u32,
) -> IrMetricsResult<Option<String>> {
    let class_name = layout.class_name_for(source_file);
    let class = session.resolve(&class_name)?;

    for method in &class.methods {
        if !method.has_body() {
            let reason = IrMetricsError::body_unavailable(method.signature());
            warn!(
                class = %class_name,
                line,
                error = %reason,
                "line resolution stopped"
            );
            return Ok(None);
        }
        if line_range(method).is_some_and(|(first, last)| first <= line && line <= last) {
            return Ok(Some(method.signature()));
        }
    }

    Ok(None)
}
