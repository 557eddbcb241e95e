//! Call-site extraction with line correlation.
//!
//! Walks a method body statement by statement and records every call with
//! its statically resolved target and the statement's source line.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::IrMetricsError;
use crate::ir::{IrClass, IrMethod};

/// Line number reported when the engine kept no line tag for a statement.
pub const UNKNOWN_LINE: i64 = -1;

/// One call instruction within a method body.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvokeSite {
    pub invoked_method_signature: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub invoked_in_method: Option<String>,
    /// Source line, or [`UNKNOWN_LINE`].
    pub line_number: i64,
}

impl InvokeSite {
    pub fn has_line(&self) -> bool {
        self.line_number != UNKNOWN_LINE
    }
}

/// Extracts call sites of `method` in statement order.
///
/// A method without a body yields no call sites; this is logged, not an error.
pub fn extract(method: &IrMethod) -> Vec<InvokeSite> {
    let Some(body) = &method.body else {
        let reason = IrMetricsError::body_unavailable(method.signature());
        warn!(error = %reason, "no call sites extracted");
        return Vec::new();
    };

    let caller = method.signature();

    body.statements
        .iter()
        .filter_map(|stmt| {
            stmt.invoke.as_ref().map(|target| InvokeSite {
                invoked_method_signature: target.clone(),
                invoked_in_method: Some(caller.clone()),
                line_number: stmt.line.map_or(UNKNOWN_LINE, i64::from),
            })
        })
        .collect()
}

/// Brings a method identifier into the bracketed `<...>` signature form.
pub fn normalize_signature(method_id: &str) -> String {
    let mut normalized = String::with_capacity(method_id.len() + 2);
    if !method_id.starts_with('<') {
        normalized.push('<');
    }
    normalized.push_str(method_id);
    if !method_id.ends_with('>') {
        normalized.push('>');
    }
    normalized
}

/// Finds the first declared method matching `method_id`, either by full
/// signature (brackets optional) or by sub-signature.
pub fn find_method<'a>(class: &'a IrClass, method_id: &str) -> Option<&'a IrMethod> {
    let signature = normalize_signature(method_id);
    class
        .methods
        .iter()
        .find(|m| m.signature() == signature || m.sub_signature() == method_id)
}

/// Call sites of the method identified by `method_id` in `class`.
///
/// An unknown method is not an error: the result is empty.
pub fn extract_by_identifier(class: &IrClass, method_id: &str) -> Vec<InvokeSite> {
    find_method(class, method_id).map(extract).unwrap_or_default()
}

/// Signature-only projection used by the metrics file.
pub fn invoked_signatures(method: &IrMethod) -> Vec<String> {
    extract(method)
        .into_iter()
        .map(|site| site.invoked_method_signature)
        .collect()
}
