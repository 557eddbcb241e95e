//! Usage index: who calls what, across a package subset.
//!
//! The reverse index maps a callee signature to every call site found in the
//! filtered classes. Append order is class order × method order × statement
//! order, so two builds over the same classpath produce identical indexes.

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use tracing::warn;

use crate::invoke::{extract, InvokeSite};
use crate::ir::IrClass;
use crate::session::AnalysisSession;

/// Reverse and forward call indexes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageIndex {
    /// Callee signature → call sites, in discovery order.
    pub usages: IndexMap<String, Vec<InvokeSite>>,
    /// Every callee signature seen.
    pub signatures: IndexSet<String>,
    /// Requested classes the engine could not resolve.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unresolved: Vec<String>,
}

impl UsageIndex {
    /// Call sites of `signature`, empty if never called.
    pub fn call_sites(&self, signature: &str) -> &[InvokeSite] {
        self.usages.get(signature).map_or(&[], Vec::as_slice)
    }

    /// Total number of call sites recorded.
    pub fn call_site_count(&self) -> usize {
        self.usages.values().map(Vec::len).sum()
    }

    fn record(&mut self, site: InvokeSite) {
        self.signatures.insert(site.invoked_method_signature.clone());
        self.usages
            .entry(site.invoked_method_signature.clone())
            .or_default()
            .push(site);
    }
}

/// Resolves `class_names`, logging and collecting the ones that fail.
fn resolve_all<'s>(
    session: &'s AnalysisSession,
    class_names: &[String],
    unresolved: &mut Vec<String>,
) -> Vec<&'s IrClass> {
    class_names
        .iter()
        .filter_map(|name| match session.resolve(name) {
            Ok(class) => Some(class),
            Err(e) => {
                warn!(class = %name, error = %e, "class skipped in usage index");
                unresolved.push(name.clone());
                None
            }
        })
        .collect()
}

/// Builds the index over classes of `class_names` whose package starts
/// with `package_prefix`. An empty prefix selects every class.
pub fn build(session: &AnalysisSession, class_names: &[String], package_prefix: &str) -> UsageIndex {
    let mut index = UsageIndex::default();
    let classes = resolve_all(session, class_names, &mut index.unresolved);

    for class in classes {
        if !class.package_name().starts_with(package_prefix) {
            continue;
        }
        for method in &class.methods {
            for site in extract(method) {
                index.record(site);
            }
        }
    }

    index
}

/// Callee signatures invoked from application classes under `package_prefix`.
pub fn seen_signatures(session: &AnalysisSession, package_prefix: &str) -> IndexSet<String> {
    build(session, session.application_classes(), package_prefix).signatures
}

/// Every declared signature plus every invoked signature over the
/// unfiltered `class_names`, with the classes that failed to resolve.
pub fn all_signatures(
    session: &AnalysisSession,
    class_names: &[String],
) -> (IndexSet<String>, Vec<String>) {
    let mut unresolved = Vec::new();
    let mut signatures = IndexSet::new();

    for class in resolve_all(session, class_names, &mut unresolved) {
        for method in &class.methods {
            signatures.insert(method.signature());
            signatures.extend(extract(method).into_iter().map(|s| s.invoked_method_signature));
        }
    }

    (signatures, unresolved)
}
