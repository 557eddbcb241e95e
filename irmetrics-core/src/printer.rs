//! Default textual IR dump.
//!
//! Output is deterministic for a given class so that incremental runs
//! against an unchanged classpath reproduce the same bytes.

use std::io::{self, Write};

use crate::ir::{IrClass, IrMethod};

const INDENT: &str = "    ";

/// Writes `class` as brace-structured IR text.
pub fn print_class(class: &IrClass, sink: &mut dyn Write) -> io::Result<()> {
    let keyword = if class.is_interface() { "" } else { "class " };
    let modifiers = prefix_modifiers(&class.modifiers);
    write!(sink, "{}{}{}", modifiers, keyword, class.name)?;

    if let Some(superclass) = &class.superclass {
        write!(sink, " extends {}", superclass)?;
    }
    if !class.interfaces.is_empty() {
        write!(sink, " implements {}", class.interfaces.join(", "))?;
    }
    writeln!(sink)?;
    writeln!(sink, "{{")?;

    for field in &class.fields {
        writeln!(
            sink,
            "{}{}{} {};",
            INDENT,
            prefix_modifiers(&field.modifiers),
            field.type_name,
            field.name
        )?;
    }

    for (idx, method) in class.methods.iter().enumerate() {
        if idx > 0 || !class.fields.is_empty() {
            writeln!(sink)?;
        }
        print_method(method, sink)?;
    }

    writeln!(sink, "}}")
}

fn print_method(method: &IrMethod, sink: &mut dyn Write) -> io::Result<()> {
    write!(
        sink,
        "{}{}{} {}({})",
        INDENT,
        prefix_modifiers(&method.modifiers),
        method.return_type,
        method.name,
        method.parameter_types.join(", ")
    )?;

    let Some(body) = &method.body else {
        return writeln!(sink, ";");
    };

    writeln!(sink)?;
    writeln!(sink, "{}{{", INDENT)?;

    for local in &body.locals {
        writeln!(sink, "{0}{0}{1} {2};", INDENT, local.type_name, local.name)?;
    }
    if !body.locals.is_empty() && !body.statements.is_empty() {
        writeln!(sink)?;
    }
    for stmt in &body.statements {
        writeln!(sink, "{0}{0}{1};", INDENT, stmt.text)?;
    }

    writeln!(sink, "{}}}", INDENT)
}

fn prefix_modifiers(modifiers: &[String]) -> String {
    modifiers.iter().map(|m| format!("{} ", m)).collect()
}

/// Convenience wrapper returning the dump as a string.
pub fn class_to_string(class: &IrClass) -> String {
    let mut buf = Vec::new();
    // Writing into a Vec cannot fail.
    let _ = print_class(class, &mut buf);
    String::from_utf8_lossy(&buf).into_owned()
}
