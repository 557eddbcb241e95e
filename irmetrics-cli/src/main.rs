//! irmetrics CLI - IR dumps and per-class metrics for compiled Java classes.
//!
//! Modes:
//! - Artifact generation (default): one `.ir` dump and one `.json` metrics
//!   file per class under `--out-dir`, incremental unless `--replace-existing`
//! - `--invocations-of CLASS --method ID`: call sites of one method
//! - `--usage-index PREFIX`: reverse call index for a package subset
//! - `--all-signatures`: every declared and invoked signature
//! - `--resolve-line FILE:LINE`: method enclosing a source line
//!
//! Exit codes: 0 success, 1 when any class failed, 2 for configuration errors,
//! 3 for internal errors (panics).

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};

use irmetrics_core::report::{
    line_lookup_json, render_generation, render_invocations, render_line_lookup,
    render_signatures, render_usage,
};
use irmetrics_core::{
    init_structured_logging, load_config, log_error, log_info, log_warn, print_json, print_plain,
    IrMetrics, IrMetricsConfig, Provider, SourceLayout, VariablePredicate, CONFIG_FILE,
};

const EXIT_FAILURES: i32 = 1;
const EXIT_CONFIG: i32 = 2;
const EXIT_INTERNAL: i32 = 3;

#[derive(Parser, Debug)]
#[command(author, version, about = "IR dumps and per-class metrics for compiled Java classes")]
pub struct Cli {
    /// Classpath directory holding the class snapshots
    #[arg(long = "class-path", visible_alias = "scp", value_name = "DIR")]
    class_path: String,

    /// Output root for the generated artifacts
    #[arg(long = "out-dir", visible_alias = "od", value_name = "DIR")]
    out_dir: Option<String>,

    /// Colon-separated classes to process (default: every class on the classpath)
    #[arg(long = "class-list", visible_alias = "cl", value_name = "CLASSES")]
    class_list: Option<String>,

    /// Propagate line tags to untagged statements before analysis
    #[arg(long = "pre-transform", visible_alias = "bpt")]
    pre_transform: bool,

    /// Delete the output root and regenerate every class
    #[arg(long = "replace-existing", visible_alias = "rej")]
    replace_existing: bool,

    /// Configuration file (default: ./irmetrics.toml if present)
    #[arg(long, value_name = "FILE")]
    config: Option<String>,

    /// Output results in JSON format
    #[arg(long)]
    json: bool,

    /// List call sites of a method of this class
    #[arg(long, value_name = "CLASS", requires = "method")]
    invocations_of: Option<String>,

    /// Method signature or sub-signature for --invocations-of
    #[arg(long, value_name = "ID")]
    method: Option<String>,

    /// Build the reverse call index for classes under this package prefix
    #[arg(long, value_name = "PREFIX")]
    usage_index: Option<String>,

    /// List every declared and invoked method signature
    #[arg(long)]
    all_signatures: bool,

    /// Resolve the method enclosing a source line
    #[arg(long, value_name = "FILE:LINE")]
    resolve_line: Option<String>,
}

/// CLI flags merged over the configuration file.
struct Settings {
    class_path: PathBuf,
    out_dir: Option<PathBuf>,
    class_list: Option<Vec<String>>,
    pre_transform: bool,
    replace_existing: bool,
    json: bool,
    predicate: Box<dyn VariablePredicate>,
    layout: SourceLayout,
}

/// Splits a colon-separated class list, dropping empty entries.
fn parse_class_list(list: &str) -> Vec<String> {
    list.split(':')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(String::from)
        .collect()
}

/// Parses `FILE:LINE`. The last colon separates the line, so drive letters survive.
fn parse_line_spec(spec: &str) -> Result<(String, u32)> {
    let (file, line) = spec
        .rsplit_once(':')
        .ok_or_else(|| anyhow!("Expected FILE:LINE, got: {}", spec))?;
    if file.is_empty() {
        return Err(anyhow!("Missing source file in: {}", spec));
    }
    let line = line
        .trim()
        .parse::<u32>()
        .with_context(|| format!("Invalid line number in: {}", spec))?;
    Ok((file.to_string(), line))
}

fn validate_class_path(path: &str) -> Result<PathBuf> {
    if path.contains('\0') {
        return Err(anyhow!("Classpath contains null bytes"));
    }
    let p = PathBuf::from(path);
    if !p.is_dir() {
        return Err(anyhow!("Classpath is not a directory: {}", path));
    }
    Ok(p)
}

/// A stray file at the output root is only acceptable when it will be replaced.
fn validate_out_dir(path: &str, replace_existing: bool) -> Result<PathBuf> {
    if path.contains('\0') {
        return Err(anyhow!("Output path contains null bytes"));
    }
    let p = PathBuf::from(path);
    if p.exists() && !p.is_dir() && !replace_existing {
        return Err(anyhow!(
            "Output path exists and is not a directory: {} (use --replace-existing)",
            path
        ));
    }
    Ok(p)
}

/// Explicit `--config` must exist; the default file is optional.
fn load_settings_file(explicit: Option<&str>) -> Result<IrMetricsConfig> {
    match explicit {
        Some(path) => {
            let path = Path::new(path);
            load_config(path)?
                .ok_or_else(|| anyhow!("Config file not found: {}", path.display()))
        }
        None => Ok(load_config(Path::new(CONFIG_FILE))?.unwrap_or_default()),
    }
}

fn resolve_settings(cli: &Cli) -> Result<Settings> {
    let cfg = load_settings_file(cli.config.as_deref())?;

    let replace_existing = cli.replace_existing || cfg.replace_existing.unwrap_or(false);
    let class_path = validate_class_path(&cli.class_path)?;
    let out_dir = cli
        .out_dir
        .as_deref()
        .map(|d| validate_out_dir(d, replace_existing))
        .transpose()?;

    let class_list = match &cli.class_list {
        Some(list) => Some(parse_class_list(list)),
        None => cfg.class_list.clone(),
    };

    Ok(Settings {
        class_path,
        out_dir,
        class_list,
        pre_transform: cli.pre_transform || cfg.pre_transform.unwrap_or(false),
        replace_existing,
        json: cli.json || cfg.wants_json(),
        predicate: cfg.predicate()?,
        layout: cfg.source_layout(),
    })
}

fn exit_config_error(err: &anyhow::Error) -> ! {
    eprintln!("ERROR: {:#}", err);
    std::process::exit(EXIT_CONFIG);
}

/// Requested classes, warning about ones absent from the classpath.
fn requested_classes(provider: &Provider, class_list: Option<&[String]>) -> Vec<String> {
    let Some(list) = class_list else {
        return provider.application_classes().to_vec();
    };
    for class in list {
        if !provider.application_classes().contains(class) {
            log_warn(&format!("Requested class not on classpath: {}", class));
        }
    }
    list.to_vec()
}

/// Closes the session, then exits.
fn finish(provider: Provider, failed: bool) -> ! {
    provider.close();
    std::process::exit(if failed { EXIT_FAILURES } else { 0 });
}

fn main() -> Result<()> {
    std::panic::set_hook(Box::new(|info| {
        eprintln!("[PANIC] irmetrics internal error: {}", info);
        std::process::exit(EXIT_INTERNAL);
    }));

    // JSON to stderr, respects RUST_LOG
    init_structured_logging();

    let cli = Cli::parse();

    let settings = match resolve_settings(&cli) {
        Ok(s) => s,
        Err(e) => exit_config_error(&e),
    };

    let provider = match IrMetrics::new(&settings.class_path)
        .with_pre_transform(settings.pre_transform)
        .predicate(settings.predicate)
        .source_layout(settings.layout)
        .open()
    {
        Ok(p) => p,
        Err(e) => exit_config_error(&anyhow::Error::new(e)),
    };

    // Call sites of one method
    if let (Some(class), Some(method)) = (&cli.invocations_of, &cli.method) {
        match provider.invocations_of(class, method) {
            Ok(sites) => {
                if settings.json {
                    print_json(&sites);
                } else {
                    print_plain(&render_invocations(&sites));
                }
                finish(provider, false);
            }
            Err(e) => {
                log_error(&format!("Query failed: {}", e));
                finish(provider, true);
            }
        }
    }

    // Reverse call index
    if let Some(prefix) = &cli.usage_index {
        let classes = requested_classes(&provider, settings.class_list.as_deref());
        let index = provider.usage_index(&classes, prefix);
        if settings.json {
            print_json(&index);
        } else {
            print_plain(&render_usage(&index));
        }
        let failed = !index.unresolved.is_empty();
        finish(provider, failed);
    }

    // Signature inventory
    if cli.all_signatures {
        let (signatures, unresolved) = provider.all_signatures();
        if settings.json {
            print_json(&serde_json::json!({
                "signatures": signatures,
                "unresolved": unresolved,
            }));
        } else {
            print_plain(&render_signatures(&signatures));
        }
        finish(provider, !unresolved.is_empty());
    }

    // Line lookup
    if let Some(spec) = &cli.resolve_line {
        let (file, line) = match parse_line_spec(spec) {
            Ok(parsed) => parsed,
            Err(e) => {
                provider.close();
                exit_config_error(&e)
            }
        };
        match provider.resolve_method_at_line(&file, line) {
            Ok(method) => {
                if settings.json {
                    print_json(&line_lookup_json(&file, line, method.as_deref()));
                } else {
                    print_plain(&render_line_lookup(&file, line, method.as_deref()));
                }
                finish(provider, false);
            }
            Err(e) => {
                log_error(&format!("Query failed: {}", e));
                finish(provider, true);
            }
        }
    }

    // Artifact generation
    let Some(out_dir) = &settings.out_dir else {
        provider.close();
        exit_config_error(&anyhow!("--out-dir is required to generate artifacts"))
    };

    let classes = requested_classes(&provider, settings.class_list.as_deref());
    let report = provider
        .generate(&classes, out_dir, settings.replace_existing)
        .with_context(|| format!("Failed to prepare output root: {}", out_dir.display()))?;

    log_info(&format!(
        "Processed {} classes: {} generated, {} skipped, {} failed",
        report.total(),
        report.generated.len(),
        report.skipped.len(),
        report.failures.len()
    ));

    if settings.json {
        print_json(&report.summary());
    } else {
        print_plain(&render_generation(&report));
    }

    let failed = report.has_failures();
    finish(provider, failed);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::atomic::{AtomicU64, Ordering};

    static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

    fn create_temp_dir(name: &str) -> PathBuf {
        let id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        let temp_dir = std::env::temp_dir()
            .join("irmetrics_cli_test")
            .join(format!("{}_{}_{}", name, std::process::id(), id));
        if temp_dir.exists() {
            fs::remove_dir_all(&temp_dir).ok();
        }
        fs::create_dir_all(&temp_dir).unwrap();
        temp_dir
    }

    #[test]
    fn test_exit_codes_are_distinct() {
        let codes = [0, EXIT_FAILURES, EXIT_CONFIG, EXIT_INTERNAL];
        for (i, a) in codes.iter().enumerate() {
            assert!(codes[i + 1..].iter().all(|b| a != b));
        }
    }

    // --- parse_class_list TESTS ---

    #[test]
    fn test_parse_class_list() {
        assert_eq!(
            parse_class_list("pkg.App:pkg.Util"),
            vec!["pkg.App".to_string(), "pkg.Util".to_string()]
        );
        assert_eq!(parse_class_list(" pkg.App :: "), vec!["pkg.App".to_string()]);
        assert!(parse_class_list("").is_empty());
    }

    // --- parse_line_spec TESTS ---

    #[test]
    fn test_parse_line_spec() {
        assert_eq!(
            parse_line_spec("src/main/java/pkg/App.java:15").unwrap(),
            ("src/main/java/pkg/App.java".to_string(), 15)
        );
        assert_eq!(
            parse_line_spec("C:\\proj\\App.java:7").unwrap(),
            ("C:\\proj\\App.java".to_string(), 7)
        );
    }

    #[test]
    fn test_parse_line_spec_rejects_garbage() {
        assert!(parse_line_spec("App.java").is_err());
        assert!(parse_line_spec("App.java:x").is_err());
        assert!(parse_line_spec(":12").is_err());
        assert!(parse_line_spec("App.java:-3").is_err());
    }

    // --- path validation TESTS ---

    #[test]
    fn test_validate_class_path() {
        let dir = create_temp_dir("classpath");
        assert!(validate_class_path(dir.to_str().unwrap()).is_ok());
        assert!(validate_class_path(dir.join("missing").to_str().unwrap()).is_err());

        let file = dir.join("file.txt");
        fs::write(&file, "x").unwrap();
        assert!(validate_class_path(file.to_str().unwrap()).is_err());
        assert!(validate_class_path("bad\0path").is_err());
    }

    #[test]
    fn test_validate_out_dir() {
        let dir = create_temp_dir("outdir");
        assert!(validate_out_dir(dir.join("new").to_str().unwrap(), false).is_ok());
        assert!(validate_out_dir(dir.to_str().unwrap(), false).is_ok());

        let file = dir.join("taken");
        fs::write(&file, "x").unwrap();
        assert!(validate_out_dir(file.to_str().unwrap(), false).is_err());
        assert!(validate_out_dir(file.to_str().unwrap(), true).is_ok());
    }

    // --- settings TESTS ---

    #[test]
    fn test_cli_aliases_parse() {
        let cli = Cli::try_parse_from([
            "irmetrics", "--scp", "classes", "--od", "out", "--cl", "a.A:b.B", "--bpt", "--rej",
        ])
        .unwrap();
        assert_eq!(cli.class_path, "classes");
        assert_eq!(cli.out_dir.as_deref(), Some("out"));
        assert!(cli.pre_transform);
        assert!(cli.replace_existing);
    }

    #[test]
    fn test_invocations_of_requires_method() {
        assert!(Cli::try_parse_from(["irmetrics", "--class-path", "c", "--invocations-of", "a.A"])
            .is_err());
        assert!(Cli::try_parse_from(["irmetrics", "--out-dir", "o"]).is_err());
    }

    #[test]
    fn test_config_merges_under_flags() {
        let dir = create_temp_dir("settings");
        let classes = dir.join("classes");
        fs::create_dir_all(&classes).unwrap();
        let config = dir.join("irmetrics.toml");
        fs::write(
            &config,
            "class_list = [\"a.A\"]\npre_transform = true\n[output]\nformat = \"json\"\n",
        )
        .unwrap();

        let cli = Cli::try_parse_from([
            "irmetrics",
            "--class-path",
            classes.to_str().unwrap(),
            "--config",
            config.to_str().unwrap(),
            "--class-list",
            "b.B:c.C",
        ])
        .unwrap();
        let settings = resolve_settings(&cli).unwrap();

        assert_eq!(settings.class_list, Some(vec!["b.B".to_string(), "c.C".to_string()]));
        assert!(settings.pre_transform);
        assert!(settings.json);
        assert!(!settings.replace_existing);
        assert!(settings.out_dir.is_none());
    }

    #[test]
    fn test_missing_explicit_config_is_error() {
        let dir = create_temp_dir("noconfig");
        let cli = Cli::try_parse_from([
            "irmetrics",
            "--class-path",
            dir.to_str().unwrap(),
            "--config",
            dir.join("absent.toml").to_str().unwrap(),
        ])
        .unwrap();
        assert!(resolve_settings(&cli).is_err());
    }
}
