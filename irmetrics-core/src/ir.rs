//! IR model exposed by an analysis engine, and the engine contract.
//!
//! The engine owns bytecode loading, resolution and call-graph construction.
//! This crate only consumes what it reports: classes, their declared methods in
//! declaration order, and per-method bodies (locals and statements).
//!
//! Signatures follow the bracketed form used throughout the artifacts:
//!
//! ```text
//! <pkg.App: void main(java.lang.String[])>     signature
//! void main(java.lang.String[])                sub-signature
//! ```

use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::error::IrMetricsResult;

/// A resolved class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IrClass {
    /// Fully qualified, dot separated name.
    pub name: String,
    /// `None` for the hierarchy root.
    #[serde(default)]
    pub superclass: Option<String>,
    /// Implemented interfaces, in the order the engine reports them.
    #[serde(default)]
    pub interfaces: Vec<String>,
    #[serde(default)]
    pub modifiers: Vec<String>,
    #[serde(default)]
    pub fields: Vec<IrField>,
    /// Declared methods, in declaration order.
    #[serde(default)]
    pub methods: Vec<IrMethod>,
}

/// A declared field, only used for the textual dump.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IrField {
    pub name: String,
    pub type_name: String,
    #[serde(default)]
    pub modifiers: Vec<String>,
}

/// A declared method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IrMethod {
    pub declaring_class: String,
    pub name: String,
    pub return_type: String,
    #[serde(default)]
    pub parameter_types: Vec<String>,
    #[serde(default)]
    pub modifiers: Vec<String>,
    /// First source line of the declaration, if the engine kept line numbers.
    #[serde(default)]
    pub start_line: Option<u32>,
    /// `None` for abstract/native methods or when the engine could not lower it.
    #[serde(default)]
    pub body: Option<IrBody>,
}

/// Statement-level body of a method.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IrBody {
    /// Locals in the order the engine declares them.
    #[serde(default)]
    pub locals: Vec<IrLocal>,
    #[serde(default)]
    pub statements: Vec<IrStatement>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IrLocal {
    pub name: String,
    pub type_name: String,
}

/// One IR statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IrStatement {
    /// Printed form of the statement.
    pub text: String,
    /// Source line tag.
    #[serde(default)]
    pub line: Option<u32>,
    /// Statically resolved target signature if the statement contains a call.
    #[serde(default)]
    pub invoke: Option<String>,
}

impl IrClass {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            superclass: None,
            interfaces: Vec::new(),
            modifiers: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn with_superclass(mut self, superclass: impl Into<String>) -> Self {
        self.superclass = Some(superclass.into());
        self
    }

    pub fn with_interface(mut self, interface: impl Into<String>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    pub fn with_modifiers(mut self, modifiers: &[&str]) -> Self {
        self.modifiers = modifiers.iter().map(|m| m.to_string()).collect();
        self
    }

    pub fn with_field(mut self, field: IrField) -> Self {
        self.fields.push(field);
        self
    }

    /// Adds a method, fixing its declaring class to this class.
    pub fn with_method(mut self, mut method: IrMethod) -> Self {
        method.declaring_class = self.name.clone();
        self.methods.push(method);
        self
    }

    /// Package part of the name (`""` for the default package).
    pub fn package_name(&self) -> &str {
        self.name.rsplit_once('.').map_or("", |(pkg, _)| pkg)
    }

    /// Simple name without the package.
    pub fn short_name(&self) -> &str {
        self.name.rsplit_once('.').map_or(self.name.as_str(), |(_, name)| name)
    }

    pub fn method_count(&self) -> usize {
        self.methods.len()
    }

    pub fn is_interface(&self) -> bool {
        self.modifiers.iter().any(|m| m == "interface")
    }
}

impl IrField {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            modifiers: Vec::new(),
        }
    }

    pub fn with_modifiers(mut self, modifiers: &[&str]) -> Self {
        self.modifiers = modifiers.iter().map(|m| m.to_string()).collect();
        self
    }
}

impl IrMethod {
    /// Creates a body-less method. The declaring class is filled in by
    /// [`IrClass::with_method`].
    pub fn new(name: impl Into<String>, return_type: impl Into<String>, params: &[&str]) -> Self {
        Self {
            declaring_class: String::new(),
            name: name.into(),
            return_type: return_type.into(),
            parameter_types: params.iter().map(|p| p.to_string()).collect(),
            modifiers: Vec::new(),
            start_line: None,
            body: None,
        }
    }

    pub fn with_modifiers(mut self, modifiers: &[&str]) -> Self {
        self.modifiers = modifiers.iter().map(|m| m.to_string()).collect();
        self
    }

    pub fn with_start_line(mut self, line: u32) -> Self {
        self.start_line = Some(line);
        self
    }

    pub fn with_body(mut self, body: IrBody) -> Self {
        self.body = Some(body);
        self
    }

    pub fn has_body(&self) -> bool {
        self.body.is_some()
    }

    /// `ret name(p1,p2)` without the declaring class.
    pub fn sub_signature(&self) -> String {
        format!(
            "{} {}({})",
            self.return_type,
            self.name,
            self.parameter_types.join(",")
        )
    }

    /// `<declaring.Class: ret name(p1,p2)>`
    pub fn signature(&self) -> String {
        format!("<{}: {}>", self.declaring_class, self.sub_signature())
    }
}

impl IrBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_local(mut self, name: impl Into<String>, type_name: impl Into<String>) -> Self {
        self.locals.push(IrLocal {
            name: name.into(),
            type_name: type_name.into(),
        });
        self
    }

    pub fn with_statement(mut self, statement: IrStatement) -> Self {
        self.statements.push(statement);
        self
    }

    /// Largest line tag in the body, if any statement carries one.
    pub fn max_line(&self) -> Option<u32> {
        self.statements.iter().filter_map(|s| s.line).max()
    }

    /// Smallest line tag in the body, if any statement carries one.
    pub fn min_line(&self) -> Option<u32> {
        self.statements.iter().filter_map(|s| s.line).min()
    }
}

impl IrStatement {
    /// A plain statement without a call.
    pub fn plain(text: impl Into<String>, line: Option<u32>) -> Self {
        Self {
            text: text.into(),
            line,
            invoke: None,
        }
    }

    /// A statement containing a call to `target`.
    pub fn call(text: impl Into<String>, target: impl Into<String>, line: Option<u32>) -> Self {
        Self {
            text: text.into(),
            line,
            invoke: Some(target.into()),
        }
    }

    pub fn contains_invoke(&self) -> bool {
        self.invoke.is_some()
    }
}

/// Contract of the whole-program analysis engine.
///
/// Engines hold non-reentrant state: one configuration is active at a time,
/// and [`IrEngine::reset`] must run before the engine is reused. An
/// [`AnalysisSession`](crate::session::AnalysisSession) owns the engine for
/// the duration of one pipeline run and takes care of both.
pub trait IrEngine {
    /// Human readable engine name, used in logs.
    fn name(&self) -> &str;

    /// Application classes available on the classpath, in engine order.
    fn class_names(&self) -> Vec<String>;

    /// Resolves a class, including method bodies.
    fn resolve(&self, class_name: &str) -> IrMetricsResult<&IrClass>;

    /// Mutable access for pre-transforms.
    fn resolve_mut(&mut self, class_name: &str) -> IrMetricsResult<&mut IrClass>;

    /// Writes the textual IR dump of a class.
    fn print_to(&self, class: &IrClass, sink: &mut dyn Write) -> std::io::Result<()> {
        crate::printer::print_class(class, sink)
    }

    /// Drops any state left by a previous configuration.
    fn reset(&mut self);
}
