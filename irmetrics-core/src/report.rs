//! Output formatting - plaintext and JSON.

use indexmap::IndexSet;
use serde::Serialize;
use serde_json::json;

use crate::artifact::GenerationReport;
use crate::invoke::InvokeSite;
use crate::usage::UsageIndex;

/// Renders a generation report as plain text.
pub fn render_generation(report: &GenerationReport) -> String {
    let mut out = format!(
        "GENERATED {} | SKIPPED {} | FAILED {}\n",
        report.generated.len(),
        report.skipped.len(),
        report.failures.len()
    );
    for failure in &report.failures {
        out.push_str(&format!("- {}: {}\n", failure.class_name, failure.error));
    }
    out
}

/// Renders call sites as plain text, one per line.
pub fn render_invocations(sites: &[InvokeSite]) -> String {
    if sites.is_empty() {
        return "No invocations found.\n".to_string();
    }
    let mut out = format!("INVOCATIONS ({}):\n", sites.len());
    for site in sites {
        out.push_str(&format!("- line {}: {}\n", site_line(site), site.invoked_method_signature));
    }
    out
}

fn site_line(site: &InvokeSite) -> String {
    if site.has_line() {
        site.line_number.to_string()
    } else {
        "?".to_string()
    }
}

/// Renders the reverse call index as plain text.
pub fn render_usage(index: &UsageIndex) -> String {
    let mut out = format!(
        "CALLEES ({}) | CALL SITES ({}):\n",
        index.usages.len(),
        index.call_site_count()
    );
    for (callee, sites) in &index.usages {
        out.push_str(&format!("{}\n", callee));
        for site in sites {
            let caller = site.invoked_in_method.as_deref().unwrap_or("?");
            out.push_str(&format!("    {} (line {})\n", caller, site_line(site)));
        }
    }
    for class in &index.unresolved {
        out.push_str(&format!("! unresolved: {}\n", class));
    }
    out
}

/// Renders a signature set as plain text.
pub fn render_signatures(signatures: &IndexSet<String>) -> String {
    let mut out = format!("SIGNATURES ({}):\n", signatures.len());
    for sig in signatures {
        out.push_str(&format!("- {}\n", sig));
    }
    out
}

/// Renders the outcome of a line lookup as plain text.
pub fn render_line_lookup(source_file: &str, line: u32, method: Option<&str>) -> String {
    match method {
        Some(sig) => format!("{}:{} -> {}\n", source_file, line, sig),
        None => format!("{}:{} -> no enclosing method\n", source_file, line),
    }
}

pub fn print_plain(text: &str) {
    print!("{}", text);
}

/// Prints any serializable result as pretty JSON.
///
/// Falls back to a debug rendering of the error if serialization fails.
pub fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("[WARN] JSON serialization failed: {}", e);
            println!("{}", json!({ "error": e.to_string() }));
        }
    }
}

/// JSON shape of a line lookup.
pub fn line_lookup_json(source_file: &str, line: u32, method: Option<&str>) -> serde_json::Value {
    json!({
        "sourceFile": source_file,
        "line": line,
        "method": method,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::GenerationFailure;
    use crate::error::IrMetricsError;

    fn site(callee: &str, caller: &str, line: i64) -> InvokeSite {
        InvokeSite {
            invoked_method_signature: callee.to_string(),
            invoked_in_method: Some(caller.to_string()),
            line_number: line,
        }
    }

    #[test]
    fn test_render_generation() {
        let report = GenerationReport {
            generated: vec!["a.A".into()],
            skipped: vec!["a.B".into()],
            failures: vec![GenerationFailure {
                class_name: "a.C".into(),
                error: IrMetricsError::resolution("a.C", "not on classpath"),
            }],
        };
        let text = render_generation(&report);
        assert!(text.starts_with("GENERATED 1 | SKIPPED 1 | FAILED 1\n"));
        assert!(text.contains("- a.C: "));
    }

    #[test]
    fn test_render_invocations() {
        assert_eq!(render_invocations(&[]), "No invocations found.\n");
        let text = render_invocations(&[site("<a.B: void f()>", "<a.A: void m()>", 7)]);
        assert_eq!(text, "INVOCATIONS (1):\n- line 7: <a.B: void f()>\n");

        let text = render_invocations(&[site("<a.B: void g()>", "<a.A: void m()>", -1)]);
        assert_eq!(text, "INVOCATIONS (1):\n- line ?: <a.B: void g()>\n");
    }

    #[test]
    fn test_render_usage() {
        let mut index = UsageIndex::default();
        index
            .usages
            .insert("<a.B: void f()>".into(), vec![site("<a.B: void f()>", "<a.A: void m()>", 3)]);
        index.unresolved.push("a.Gone".into());
        let text = render_usage(&index);
        assert!(text.contains("<a.B: void f()>\n    <a.A: void m()> (line 3)\n"));
        assert!(text.ends_with("! unresolved: a.Gone\n"));
    }

    #[test]
    fn test_line_lookup_json() {
        let value = line_lookup_json("App.java", 15, None);
        assert_eq!(value["line"], 15);
        assert!(value["method"].is_null());
        assert_eq!(
            render_line_lookup("App.java", 15, Some("<a.A: void m()>")),
            "App.java:15 -> <a.A: void m()>\n"
        );
    }
}
