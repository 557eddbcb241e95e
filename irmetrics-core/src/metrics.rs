//! Per-class metrics record and its JSON rendering.
//!
//! Field order of the JSON file is part of the artifact format. Structs are
//! serialized in declaration order and every map is an `IndexMap`, so
//! nothing is ever re-sorted by key.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use tracing::warn;

use crate::classify::{classify_locals, VariablePredicate};
use crate::error::{IrMetricsError, IrMetricsResult};
use crate::invoke::invoked_signatures;
use crate::ir::{IrClass, IrMethod};

/// Metrics of one class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassRecord {
    pub class_name: String,
    /// Empty for the hierarchy root.
    pub super_class: String,
    pub implemented_interface: Vec<String>,
    pub method_count: usize,
    pub methods_signature: Vec<String>,
    /// Keyed by sub-signature, in declaration order.
    pub methods_information: IndexMap<String, MethodRecord>,
}

/// Metrics of one method.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodRecord {
    pub local_variables: IndexMap<String, String>,
    pub stack_variables: IndexMap<String, String>,
    pub invoke_expressions: Vec<String>,
}

/// Builds the metrics record of a resolved class.
pub fn assemble(class: &IrClass, predicate: &dyn VariablePredicate) -> ClassRecord {
    let mut methods_signature = Vec::with_capacity(class.methods.len());
    let mut methods_information = IndexMap::with_capacity(class.methods.len());

    for method in &class.methods {
        methods_signature.push(method.signature());

        let sub_signature = method.sub_signature();
        let record = assemble_method(method, predicate);
        if methods_information.insert(sub_signature, record).is_some() {
            warn!(
                class = %class.name,
                method = %method.sub_signature(),
                "duplicate sub-signature, later declaration wins"
            );
        }
    }

    ClassRecord {
        class_name: class.name.clone(),
        super_class: class.superclass.clone().unwrap_or_default(),
        implemented_interface: class.interfaces.clone(),
        method_count: class.method_count(),
        methods_signature,
        methods_information,
    }
}

fn assemble_method(method: &IrMethod, predicate: &dyn VariablePredicate) -> MethodRecord {
    let Some(body) = &method.body else {
        let reason = IrMetricsError::body_unavailable(method.signature());
        warn!(error = %reason, "recording empty metrics");
        return MethodRecord::default();
    };

    let partition = classify_locals(&body.locals, predicate);
    MethodRecord {
        local_variables: partition.locals,
        stack_variables: partition.stack,
        invoke_expressions: invoked_signatures(method),
    }
}

/// Pretty JSON with 4-space indentation and a trailing newline.
pub fn to_json(record: &ClassRecord) -> IrMetricsResult<String> {
    let mut buf = Vec::with_capacity(1024);
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    record
        .serialize(&mut ser)
        .map_err(|e| IrMetricsError::serialize(&record.class_name, e.to_string()))?;
    buf.push(b'\n');

    String::from_utf8(buf).map_err(|e| IrMetricsError::serialize(&record.class_name, e.to_string()))
}
