//! hiergraph CLI - inheritance graph explorer for C# projects.
//!
//! Features:
//! - tree-sitter based C# extraction, parallel over files
//! - Ancestor/descendant traversal with depth and exclusion controls
//! - Markdown, text tree, Mermaid, DOT, JSON and HTML output
//! - Optional `hiergraph.toml` defaults next to the sources

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use hiergraph_core::{
    init_logging, load_config, render_not_found, render_report, DiagramOptions, Direction,
    HierConfig, HierError, Hiergraph, LogFormat, OutputFormat, ReportContext,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Explore the inheritance graph around a C# type")]
pub struct Cli {
    /// Type to analyze: simple name, full name or a suffix of it
    target: String,

    /// Project directory or single .cs file
    #[arg(default_value = ".")]
    path: String,

    /// Traversal depth (1-20)
    #[arg(long)]
    depth: Option<usize>,

    /// Traversal direction: up, down or both
    #[arg(long, value_parser = parse_direction)]
    direction: Option<Direction>,

    /// Ignore interface implementations
    #[arg(long)]
    no_interfaces: bool,

    /// Extra type names to exclude
    #[arg(long, num_args = 1..)]
    exclude: Vec<String>,

    /// Do not exclude MonoBehaviour and the other framework roots
    #[arg(long)]
    keep_framework_types: bool,

    /// Output format: markdown, tree, mermaid, dot, json or html
    #[arg(long, value_parser = parse_format)]
    format: Option<OutputFormat>,

    /// Write the report to a file instead of stdout
    #[arg(long, value_name = "FILE")]
    output: Option<String>,

    /// Omit diagram styling directives
    #[arg(long)]
    no_style: bool,

    /// Read type records from a JSON file instead of scanning sources
    #[arg(long, value_name = "FILE")]
    types_json: Option<PathBuf>,

    /// Keep types from files with syntax errors
    #[arg(long)]
    lenient: bool,

    /// Emit JSON log lines on stderr
    #[arg(long)]
    log_json: bool,

    /// Number of parser threads (default: one per core)
    #[arg(long)]
    jobs: Option<usize>,
}

fn parse_direction(s: &str) -> std::result::Result<Direction, String> {
    s.parse().map_err(|e: HierError| e.to_string())
}

fn parse_format(s: &str) -> std::result::Result<OutputFormat, String> {
    s.parse().map_err(|e: HierError| e.to_string())
}

/// Security: Validates output file paths to prevent path traversal attacks.
///
/// Rejects:
/// - Absolute paths (must be relative to current directory)
/// - Paths containing `..` (parent directory traversal)
/// - Paths with null bytes (injection attacks)
fn validate_output_path(path: &str) -> Result<PathBuf> {
    if path.contains('\0') {
        return Err(anyhow!("Output path contains null bytes"));
    }

    let p = PathBuf::from(path);

    if p.is_absolute() {
        return Err(anyhow!("Output path must be relative, not absolute: {}", path));
    }

    if p
        .components()
        .any(|c| matches!(c, std::path::Component::ParentDir))
    {
        return Err(anyhow!("Path traversal (..) not allowed in output paths: {}", path));
    }

    let normalized = path.replace('\\', "/");
    if normalized.contains("/../") || normalized.starts_with("../") {
        return Err(anyhow!("Path traversal attempt detected: {}", path));
    }

    Ok(p)
}

/// Config from the scanned root; a broken file is reported and ignored.
fn read_config(path: &Path) -> Option<HierConfig> {
    match load_config(path) {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!(error = %e, "config load failed, using defaults");
            None
        }
    }
}

/// Builder with config defaults applied first and flags on top.
fn build_analyzer(cli: &Cli, cfg: Option<&HierConfig>) -> Hiergraph {
    let mut builder = match &cli.types_json {
        Some(json) => Hiergraph::from_types_json(json),
        None => Hiergraph::new(&cli.path),
    };

    if let Some(cfg) = cfg {
        builder = builder.with_config(cfg);
    }
    if let Some(depth) = cli.depth {
        builder = builder.max_depth(depth);
    }
    if let Some(direction) = cli.direction {
        builder = builder.direction(direction);
    }
    if cli.no_interfaces {
        builder = builder.include_interfaces(false);
    }
    if cli.keep_framework_types {
        builder = builder.keep_framework_types();
    }

    builder
        .exclude_types(cli.exclude.iter().cloned())
        .lenient(cli.lenient)
}

fn resolve_format(cli: &Cli, cfg: Option<&HierConfig>) -> Result<OutputFormat> {
    if let Some(format) = cli.format {
        return Ok(format);
    }
    match cfg.and_then(|c| c.output().format) {
        Some(name) => name
            .parse()
            .with_context(|| format!("Invalid output format in config: {}", name)),
        None => Ok(OutputFormat::default()),
    }
}

fn diagram_options(cli: &Cli, cfg: Option<&HierConfig>) -> DiagramOptions {
    let mut options = DiagramOptions::default();
    if let Some(cfg) = cfg {
        let output = cfg.output();
        if let Some(styled) = output.styled {
            options = options.styled(styled);
        }
        if let Some(bases) = output.framework_bases {
            options = options.framework_bases(bases);
        }
    }
    if cli.no_style {
        options = options.styled(false);
    }
    options
}

fn emit(document: &str, output: Option<&str>) -> Result<()> {
    match output {
        Some(file) => {
            let safe_path = validate_output_path(file)?;
            fs::write(&safe_path, document)
                .with_context(|| format!("Failed to write report to {}", safe_path.display()))?;
            eprintln!("Report saved to: {}", safe_path.display());
        }
        None => print!("{}", document),
    }
    Ok(())
}

/// Run one analysis and return the process exit code.
fn run(cli: &Cli) -> Result<i32> {
    if let Some(jobs) = cli.jobs {
        if let Err(e) = rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build_global()
        {
            warn!(error = %e, "thread pool already configured");
        }
    }

    let cfg = read_config(Path::new(&cli.path));
    let format = resolve_format(cli, cfg.as_ref())?;
    let ctx = ReportContext::new(diagram_options(cli, cfg.as_ref()));
    let builder = build_analyzer(cli, cfg.as_ref());

    let result = match builder.analyze(&cli.target) {
        Ok(result) => result,
        Err(HierError::TargetNotFound { target }) => {
            eprintln!("no such type: {}", target);
            emit(&render_not_found(&target, format)?, cli.output.as_deref())?;
            return Ok(1);
        }
        Err(e) => {
            return Err(anyhow::Error::new(e)
                .context(format!("Failed to analyze {}", builder.source_path().display())))
        }
    };

    info!(
        target = %result.target_type,
        types = result.types.len(),
        relationships = result.relationships.len(),
        format = %format,
        "analysis complete"
    );

    let document = render_report(&result, format, &ctx)?;
    emit(&document, cli.output.as_deref())?;
    Ok(0)
}

fn main() {
    std::panic::set_hook(Box::new(|info| {
        eprintln!("[PANIC] hiergraph internal error: {}", info);
        eprintln!("[PANIC] The process will exit with code 2.");
    }));

    let cli = Cli::parse();
    init_logging(if cli.log_json {
        LogFormat::Json
    } else {
        LogFormat::Text
    });

    let code = match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("[ERROR] {:#}", e);
            2
        }
    };
    std::process::exit(code);
}

#[cfg(test)]
mod tests {
    use super::*;
    use hiergraph_core::CONFIG_FILE;
    use std::io::Write;
    use std::sync::atomic::{AtomicU64, Ordering};

    static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

    fn create_file(path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::File::create(path)
            .unwrap()
            .write_all(content.as_bytes())
            .unwrap();
    }

    fn create_temp_dir(name: &str) -> PathBuf {
        let id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        let temp_dir = std::env::temp_dir()
            .join("hiergraph_cli_test")
            .join(format!("{}_{}_{}", name, std::process::id(), id));
        if temp_dir.exists() {
            fs::remove_dir_all(&temp_dir).ok();
        }
        fs::create_dir_all(&temp_dir).unwrap();
        temp_dir
    }

    fn create_sample(dir: &Path) {
        create_file(
            &dir.join("Scripts/Base.cs"),
            "namespace Game { public abstract class Base : MonoBehaviour { } }",
        );
        create_file(
            &dir.join("Scripts/Player.cs"),
            "namespace Game { public class Player : Base, IControllable { } }",
        );
        create_file(
            &dir.join("Scripts/IControllable.cs"),
            "namespace Game { public interface IControllable { } }",
        );
    }

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("hiergraph").chain(args.iter().copied())).unwrap()
    }

    // --- argument parsing ---

    #[test]
    fn test_parse_defaults() {
        let c = cli(&["Player"]);
        assert_eq!(c.target, "Player");
        assert_eq!(c.path, ".");
        assert!(c.depth.is_none());
        assert!(c.direction.is_none());
        assert!(c.format.is_none());
        assert!(!c.no_interfaces);
        assert!(!c.lenient);
    }

    #[test]
    fn test_parse_all_flags() {
        let c = cli(&[
            "Player",
            "Assets",
            "--depth",
            "3",
            "--direction",
            "up",
            "--no-interfaces",
            "--exclude",
            "Legacy",
            "Old",
            "--format",
            "mermaid",
            "--no-style",
            "--lenient",
        ]);
        assert_eq!(c.path, "Assets");
        assert_eq!(c.depth, Some(3));
        assert_eq!(c.direction, Some(Direction::Up));
        assert_eq!(c.exclude, vec!["Legacy", "Old"]);
        assert_eq!(c.format, Some(OutputFormat::Mermaid));
        assert!(c.no_interfaces && c.no_style && c.lenient);
    }

    #[test]
    fn test_parse_rejects_unknown_values() {
        let bad_direction = ["hiergraph", "Player", "--direction", "sideways"];
        assert!(Cli::try_parse_from(bad_direction).is_err());
        let bad_format = ["hiergraph", "Player", "--format", "pdf"];
        assert!(Cli::try_parse_from(bad_format).is_err());
        assert!(Cli::try_parse_from(["hiergraph"]).is_err());
    }

    // --- validate_output_path ---

    #[test]
    fn test_validate_output_path_relative_ok() {
        assert_eq!(
            validate_output_path("out/report.md").unwrap(),
            PathBuf::from("out/report.md")
        );
    }

    #[test]
    fn test_validate_output_path_rejects_traversal() {
        assert!(validate_output_path("../report.md").is_err());
        assert!(validate_output_path("out/../../report.md").is_err());
        assert!(validate_output_path("bad\0name").is_err());
    }

    #[test]
    fn test_validate_output_path_rejects_absolute() {
        let abs = std::env::temp_dir().join("report.md");
        assert!(validate_output_path(&abs.to_string_lossy()).is_err());
    }

    // --- precedence ---

    #[test]
    fn test_flags_override_config() {
        let cfg = hiergraph_core::parse_config(
            Path::new(CONFIG_FILE),
            "[traversal]\nmax_depth = 4\ndirection = \"down\"\n\n[output]\nformat = \"tree\"\nstyled = true\n",
        )
        .unwrap();

        let c = cli(&["Player", "--depth", "2", "--no-style"]);
        let opts = build_analyzer(&c, Some(&cfg)).traversal_options("Player");
        assert_eq!(opts.max_depth, 2);
        assert_eq!(opts.direction, Direction::Down);
        assert_eq!(resolve_format(&c, Some(&cfg)).unwrap(), OutputFormat::Tree);
        assert!(!diagram_options(&c, Some(&cfg)).styled);

        let c = cli(&["Player", "--format", "json"]);
        assert_eq!(resolve_format(&c, Some(&cfg)).unwrap(), OutputFormat::Json);
    }

    #[test]
    fn test_invalid_config_format_is_error() {
        let cfg = hiergraph_core::parse_config(
            Path::new(CONFIG_FILE),
            "[output]\nformat = \"pdf\"\n",
        )
        .unwrap();
        assert!(resolve_format(&cli(&["Player"]), Some(&cfg)).is_err());
    }

    #[test]
    fn test_exclusion_flags() {
        let c = cli(&["Player", "--keep-framework-types", "--exclude", "Legacy"]);
        let opts = build_analyzer(&c, None).traversal_options("Player");
        assert!(opts.is_excluded("Legacy"));
        assert!(!opts.is_excluded("MonoBehaviour"));
    }

    // --- run ---

    #[test]
    fn test_run_success_exit_code() {
        let dir = create_temp_dir("run_ok");
        create_sample(&dir);
        let path = dir.to_string_lossy().to_string();

        let code = run(&cli(&["Player", &path, "--format", "tree"])).unwrap();
        assert_eq!(code, 0);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_run_not_found_exit_code() {
        let dir = create_temp_dir("run_missing");
        create_sample(&dir);
        let path = dir.to_string_lossy().to_string();

        let code = run(&cli(&["Boss", &path])).unwrap();
        assert_eq!(code, 1);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_run_invalid_depth_is_error() {
        let dir = create_temp_dir("run_depth");
        create_sample(&dir);
        let path = dir.to_string_lossy().to_string();

        assert!(run(&cli(&["Player", &path, "--depth", "25"])).is_err());

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_run_missing_path_is_error() {
        let dir = create_temp_dir("run_nopath");
        let missing = dir.join("nope").to_string_lossy().to_string();
        assert!(run(&cli(&["Player", &missing])).is_err());
        fs::remove_dir_all(&dir).ok();
    }
}
