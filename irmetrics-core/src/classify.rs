//! Variable classification: stack/temporary locals vs. named locals.
//!
//! The engine synthesizes temporaries with recognizable names (`$stack3`,
//! `$r1`, register-like `l0`). Which names count as synthesized depends on
//! the engine, so the test is a [`VariablePredicate`] that callers can swap.

use indexmap::IndexMap;
use regex::Regex;

use crate::error::{IrMetricsError, IrMetricsResult};
use crate::ir::IrLocal;

/// Default pattern: `$` prefix, or `l` followed by a digit.
pub const DEFAULT_STACK_PATTERN: &str = r"^(\$|l\d)";

/// Decides whether a local is a compiler-synthesized stack variable.
pub trait VariablePredicate: Send + Sync {
    fn is_stack_variable(&self, name: &str) -> bool;
}

/// Naming convention of the default engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyntheticNamePredicate;

impl VariablePredicate for SyntheticNamePredicate {
    fn is_stack_variable(&self, name: &str) -> bool {
        if name.starts_with('$') {
            return true;
        }
        let mut chars = name.chars();
        matches!(
            (chars.next(), chars.next()),
            (Some('l'), Some(d)) if d.is_ascii_digit()
        )
    }
}

/// Predicate driven by a regular expression, for other engines' conventions.
#[derive(Debug, Clone)]
pub struct RegexPredicate {
    pattern: Regex,
}

impl RegexPredicate {
    pub fn new(pattern: &str) -> IrMetricsResult<Self> {
        let pattern = Regex::new(pattern).map_err(|e| {
            IrMetricsError::config("classifier.stack_variable_pattern", e.to_string())
        })?;
        Ok(Self { pattern })
    }
}

impl VariablePredicate for RegexPredicate {
    fn is_stack_variable(&self, name: &str) -> bool {
        self.pattern.is_match(name)
    }
}

/// Locals of one method split into two ordered buckets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariablePartition {
    /// Named locals, name → type name.
    pub locals: IndexMap<String, String>,
    /// Stack/temporary variables, name → type name.
    pub stack: IndexMap<String, String>,
}

impl VariablePartition {
    pub fn len(&self) -> usize {
        self.locals.len() + self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locals.is_empty() && self.stack.is_empty()
    }
}

/// Splits `locals` by `predicate`, keeping the input order in both buckets.
pub fn classify_locals(locals: &[IrLocal], predicate: &dyn VariablePredicate) -> VariablePartition {
    let mut partition = VariablePartition::default();

    for local in locals {
        let bucket = if predicate.is_stack_variable(&local.name) {
            &mut partition.stack
        } else {
            &mut partition.locals
        };
        bucket.insert(local.name.clone(), local.type_name.clone());
    }

    partition
}
