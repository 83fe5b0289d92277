use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use refactorer::config::{load_from_path, EngineConfig, RepositoryKind};
use refactorer::diff::unified;
use refactorer::tree::kind::extensions;
use refactorer::tree::{language_from_name, NodeKind, SupportLang, SyntaxTree};
use refactorer::{Cause, Engine, Location, NodeId, Parameters, Source, TreeSitterParser, UnitKind};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "refactorer")]
#[command(about = "Selection-aware refactoring with a per-file commit timeline", long_about = None)]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find declarations by name and kind
    Locate {
        file: PathBuf,

        /// Declared name to look for
        #[arg(short, long)]
        name: String,

        /// method, field, parameter or inner-class
        #[arg(short, long)]
        kind: UnitKind,

        /// Source language (defaults to the file extension, then java)
        #[arg(short, long)]
        lang: Option<String>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Resolve a byte range to the node or statements it denotes
    Select {
        file: PathBuf,

        /// First selected byte
        #[arg(short, long)]
        start: usize,

        /// One past the last selected byte
        #[arg(short, long)]
        end: usize,

        /// Resolve to a run of statements instead of a single node
        #[arg(long)]
        statements: bool,

        #[arg(short, long)]
        lang: Option<String>,

        #[arg(long)]
        json: bool,
    },

    /// Report issues raised by the configured rules
    Scan {
        /// File or directory to scan
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Engine configuration (TOML)
        #[arg(short, long)]
        config: PathBuf,

        #[arg(long)]
        json: bool,
    },

    /// Apply every configured rewrite to a file and commit the result
    Apply {
        file: PathBuf,

        #[arg(short, long)]
        config: PathBuf,

        /// Show what would change without writing the file
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Show a line diff of the changes
        #[arg(short, long)]
        diff: bool,
    },

    /// Colored line diff of two files
    Diff { original: PathBuf, revised: PathBuf },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Locate {
            file,
            name,
            kind,
            lang,
            json,
        } => cmd_locate(&file, &name, kind, lang.as_deref(), json),

        Commands::Select {
            file,
            start,
            end,
            statements,
            lang,
            json,
        } => cmd_select(&file, start, end, statements, lang.as_deref(), json),

        Commands::Scan { path, config, json } => cmd_scan(&path, &config, json),

        Commands::Apply {
            file,
            config,
            dry_run,
            diff,
        } => cmd_apply(&file, &config, dry_run, diff),

        Commands::Diff { original, revised } => cmd_diff(&original, &revised),
    }
}

/// `RUST_LOG` wins; otherwise warnings, raised by `-v`.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Explicit `--lang`, else the file extension, else Java.
fn resolve_lang(file: &Path, lang: Option<&str>) -> Result<SupportLang> {
    if let Some(name) = lang {
        return language_from_name(name).with_context(|| format!("unknown language '{name}'"));
    }
    let ext = file.extension().and_then(|ext| ext.to_str()).unwrap_or("");
    Ok(language_from_name(ext).unwrap_or(SupportLang::Java))
}

fn read_source(file: &Path) -> Result<Source> {
    let contents =
        fs::read_to_string(file).with_context(|| format!("failed to read {}", file.display()))?;
    Ok(Source::new(file.display().to_string(), contents))
}

fn engine_for(lang: SupportLang) -> Result<Engine> {
    Ok(Engine::builder().parser(TreeSitterParser::new(lang)?).build()?)
}

fn report_wiring_errors(engine: &Engine) {
    for error in engine.wiring_errors() {
        eprintln!("{} {}", "warning:".yellow(), error);
    }
}

#[derive(Serialize)]
struct NodeReport {
    kind: NodeKind,
    grammar_kind: &'static str,
    location: Location,
    text: String,
}

impl NodeReport {
    fn new(tree: &SyntaxTree, id: NodeId) -> Self {
        let node = tree.node(id);
        Self {
            kind: node.kind,
            grammar_kind: node.grammar_kind,
            location: node.location.clone(),
            text: tree.text(id).to_string(),
        }
    }

    fn print(&self, label: &str) {
        println!(
            "  {:<9} {} {} {}",
            label,
            self.grammar_kind.cyan(),
            self.location.to_string().dimmed(),
            first_line(&self.text)
        );
    }
}

fn first_line(text: &str) -> String {
    match text.split_once('\n') {
        Some((line, _)) => format!("{line} ..."),
        None => text.to_string(),
    }
}

fn cmd_locate(file: &Path, name: &str, kind: UnitKind, lang: Option<&str>, json: bool) -> Result<()> {
    let source = read_source(file)?;
    let mut engine = engine_for(resolve_lang(file, lang)?)?;
    let locations = engine.locate_units(&source, name, kind)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&locations)?);
        return Ok(());
    }

    if locations.is_empty() {
        println!("{}", format!("No {kind} named '{name}'").yellow());
        return Ok(());
    }
    for location in &locations {
        println!("{} {}", "✓".green(), location);
    }
    Ok(())
}

#[derive(Serialize)]
struct StatementReport {
    valid: bool,
    rejection: Option<String>,
    nodes: Vec<NodeReport>,
}

fn cmd_select(
    file: &Path,
    start: usize,
    end: usize,
    statements: bool,
    lang: Option<&str>,
    json: bool,
) -> Result<()> {
    let source = read_source(file)?;
    let len = source.contents().len();
    if start >= end || end > len {
        anyhow::bail!("invalid selection {start}..{end} for a {len}-byte file");
    }
    let selection = source.location(start..end);
    let mut engine = engine_for(resolve_lang(file, lang)?)?;

    if statements {
        let resolved = engine.select_statements(&source, &selection)?;
        let tree = engine.tree(&source)?;
        let report = StatementReport {
            valid: resolved.covers_valid_statements(),
            rejection: resolved.rejection.map(|rejection| rejection.to_string()),
            nodes: resolved
                .nodes
                .iter()
                .map(|id| NodeReport::new(tree, *id))
                .collect(),
        };

        if json {
            println!("{}", serde_json::to_string_pretty(&report)?);
            return Ok(());
        }
        match &report.rejection {
            None => println!("{} {} statement(s)", "✓".green(), report.nodes.len()),
            Some(reason) => println!("{} {}", "✗".red(), reason),
        }
        for node in &report.nodes {
            node.print("node");
        }
        return Ok(());
    }

    let resolved = engine.select_node(&source, &selection)?;
    let tree = engine.tree(&source)?;
    let matched = resolved.matched.map(|id| NodeReport::new(tree, id));
    if json {
        println!("{}", serde_json::to_string_pretty(&matched)?);
        return Ok(());
    }
    match resolved.matched {
        Some(id) => NodeReport::new(tree, id).print("matched"),
        None => println!("{}", "No node matches the selection".yellow()),
    }
    if let Some(id) = resolved.covering {
        NodeReport::new(tree, id).print("covering");
    }
    if let Some(id) = resolved.covered {
        NodeReport::new(tree, id).print("covered");
    }
    Ok(())
}

#[derive(Serialize)]
struct IssueReport {
    file: String,
    rule: String,
    location: Option<Location>,
    description: String,
    text: String,
}

fn source_files(root: &Path, lang: SupportLang) -> Result<Vec<PathBuf>> {
    if root.is_file() {
        return Ok(vec![root.to_path_buf()]);
    }
    let wanted = extensions(lang);
    let mut files = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry?;
        if entry.file_type().is_file()
            && entry
                .path()
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| wanted.contains(&ext))
        {
            files.push(entry.path().to_path_buf());
        }
    }
    files.sort();
    Ok(files)
}

fn cmd_scan(path: &Path, config_path: &Path, json: bool) -> Result<()> {
    let config = load_from_path(config_path)?;
    let memory = EngineConfig {
        repository: Default::default(),
        ..config
    };
    let mut engine = memory.build()?;
    report_wiring_errors(&engine);

    let mut reports = Vec::new();
    for file in source_files(path, memory.lang())? {
        let source = read_source(&file)?;
        let causes = engine.detect(&source)?.to_vec();
        let tree = engine.tree(&source)?;
        for cause in causes {
            let first = cause.affected().first().copied();
            reports.push(IssueReport {
                file: file.display().to_string(),
                rule: cause.detector().unwrap_or("edit").to_string(),
                location: first.map(|id| tree.location(id).clone()),
                description: cause.description().to_string(),
                text: first.map(|id| tree.text(id).to_string()).unwrap_or_default(),
            });
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(());
    }
    for report in &reports {
        let at = report
            .location
            .as_ref()
            .map(|location| location.start.to_string())
            .unwrap_or_default();
        println!(
            "{}:{} {} {}",
            report.file,
            at,
            format!("[{}]", report.rule).yellow(),
            report.description
        );
        println!("    {}", first_line(&report.text).dimmed());
    }
    println!();
    println!("{} issue(s) found", report_count(reports.len()));
    Ok(())
}

fn report_count(count: usize) -> colored::ColoredString {
    if count == 0 {
        count.to_string().green()
    } else {
        count.to_string().yellow()
    }
}

fn cmd_apply(file: &Path, config_path: &Path, dry_run: bool, show_diff: bool) -> Result<()> {
    let mut config = load_from_path(config_path)?;
    let file = file
        .canonicalize()
        .with_context(|| format!("failed to resolve {}", file.display()))?;
    let dir = file
        .parent()
        .context("file has no parent directory")?
        .to_path_buf();
    let name = file
        .file_name()
        .and_then(|name| name.to_str())
        .context("file name is not valid UTF-8")?
        .to_string();

    // The file's directory is the repository; a dry run commits to memory.
    if dry_run {
        config.repository.kind = RepositoryKind::Memory;
        config.repository.root = None;
    } else {
        config.repository.kind = RepositoryKind::Local;
        config.repository.root = Some(dir.display().to_string());
    }
    let mut engine = config.build()?;
    report_wiring_errors(&engine);

    let contents =
        fs::read_to_string(&file).with_context(|| format!("failed to read {}", file.display()))?;
    let original = Source::new(name, contents);
    engine.register(&original)?;

    if dry_run {
        println!("{}", "  [DRY RUN - showing what would be applied]".cyan());
    }

    let mut current = original.clone();
    let mut applied = 0;
    // Skips and failures repeat on every pass; each is reported once.
    let mut reported: BTreeSet<String> = BTreeSet::new();
    let mut failed = 0;
    // Every applied rewrite re-runs detection; a rule whose result matches
    // itself again must not loop forever.
    let budget = engine.detect(&original)?.len();
    while applied < budget {
        let causes: Vec<Cause> = engine.detect(&current)?.to_vec();
        let mut next = None;
        for cause in causes {
            let label = cause.to_string();
            let mut change = match engine.create_change(cause, Parameters::new()) {
                Ok(change) => change,
                Err(err) => {
                    if reported.insert(format!("{label}: {err}")) {
                        println!("{} {}: Skipped ({})", "⊘".cyan(), label, err);
                    }
                    continue;
                }
            };
            if !change.is_valid() {
                let reason = change.errors().join("; ");
                if reported.insert(format!("{label}: {reason}")) {
                    eprintln!("{} {}: Rejected - {}", "✗".red(), label, reason);
                    failed += 1;
                }
                continue;
            }
            match engine.apply(&mut change) {
                Some(revision) => {
                    println!("{} {}: Applied", "✓".green(), label);
                    next = Some(revision);
                    break;
                }
                None if change.errors().is_empty() => {
                    if reported.insert(format!("{label}: no changes")) {
                        println!("{} {}: Already applied", "✓".green(), label);
                    }
                }
                None => {
                    let reason = change.errors().join("; ");
                    if reported.insert(format!("{label}: {reason}")) {
                        eprintln!("{} {}: Failed - {}", "✗".red(), label, reason);
                        failed += 1;
                    }
                }
            }
        }
        match next {
            Some(revision) => {
                current = revision;
                applied += 1;
            }
            None => break,
        }
    }

    if show_diff && current != original {
        display_diff(&file, original.contents(), current.contents());
    }

    println!();
    println!("{}", "Summary:".bold());
    println!("  {} applied", applied.to_string().green());
    println!("  {} failed", failed.to_string().red());
    if let Some(history) = engine.history(&original) {
        println!("  {} commit(s) in history", history.len());
    }

    if failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}

fn cmd_diff(original: &Path, revised: &Path) -> Result<()> {
    let before = fs::read_to_string(original)
        .with_context(|| format!("failed to read {}", original.display()))?;
    let after = fs::read_to_string(revised)
        .with_context(|| format!("failed to read {}", revised.display()))?;
    if before == after {
        println!("{}", "Files are identical".dimmed());
        return Ok(());
    }
    display_diff(original, &before, &after);
    Ok(())
}

/// Show a colored line diff between original and modified content
fn display_diff(file: &Path, original: &str, modified: &str) {
    let rendered = unified(original, modified, &file.display().to_string());
    println!();
    for line in rendered.lines() {
        let line = if line.starts_with("---") || line.starts_with("+++") {
            line.dimmed()
        } else if line.starts_with("@@") {
            line.cyan()
        } else if line.starts_with('-') {
            line.red()
        } else if line.starts_with('+') {
            line.green()
        } else {
            line.normal()
        };
        println!("{line}");
    }
}
