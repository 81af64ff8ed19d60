//! Command-line interface for flatcat.
//!
//! Flattens a source tree into one text document, written to stdout or to a
//! file. Diagnostics always go to stderr.

use clap::{ArgAction, Parser, ValueEnum};
use flatcat::output::{self, OutputFormat as DocumentFormat};
use flatcat::{
    BinaryDetection, Classifier, FlatcatError, IncludedFiles, RuleSet, RuleSetBuilder, collect,
    render_tree, resolve_root,
};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::exit;
use tracing_subscriber::EnvFilter;

/// flatcat — flatten a source tree into one text file
#[derive(Parser)]
#[command(name = "flatcat", version, about, long_about = None)]
struct Cli {
    /// Root folder to process
    #[arg(default_value = ".")]
    root: PathBuf,

    /// Output file ('-' for stdout)
    #[arg(short, long, value_name = "FILE", default_value = "-")]
    output: String,

    /// TOML file with rule overrides; missing keys keep their defaults
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory name to skip wherever it appears (can be repeated)
    #[arg(long = "skip-dir", value_name = "NAME")]
    skip_dirs: Vec<String>,

    /// Root-relative directory path to skip (can be repeated)
    #[arg(long = "skip-path", value_name = "PATH")]
    skip_paths: Vec<String>,

    /// Glob pattern to skip, matched against the root-relative path (can be repeated)
    #[arg(short = 'I', long = "skip", value_name = "PATTERN")]
    skip_patterns: Vec<String>,

    /// Extension (".ext", or "ext" if lower-case) or exact file name to include as text (can be repeated)
    #[arg(long = "include", value_name = "EXT_OR_NAME")]
    include: Vec<String>,

    /// Extension never read as text (can be repeated)
    #[arg(long = "binary-ext", value_name = "EXT")]
    binary_exts: Vec<String>,

    /// Maximum size in bytes of a file whose content is dumped
    #[arg(long)]
    max_file_size: Option<u64>,

    /// Binary detection strategy
    #[arg(long, value_parser = parse_binary_detection)]
    binary_detection: Option<BinaryDetection>,

    /// Also skip whatever the root .gitignore ignores
    #[arg(long)]
    gitignore: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Pretty JSON output
    #[arg(short, long)]
    pretty: bool,

    /// Operation mode
    #[arg(long, value_enum, default_value_t = Mode::Normal)]
    mode: Mode,

    /// Print the effective rules as JSON and exit
    #[arg(long)]
    print_rules: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Mode {
    Normal,
    TreeOnly,
    PathsOnly,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Parse string into BinaryDetection enum.
fn parse_binary_detection(s: &str) -> Result<BinaryDetection, String> {
    match s {
        "simple" => Ok(BinaryDetection::Simple),
        "accurate" => Ok(BinaryDetection::Accurate),
        "none" => Ok(BinaryDetection::None),
        _ => Err(format!("invalid binary detection method: {}", s)),
    }
}

impl Cli {
    fn rules(&self) -> Result<RuleSet, FlatcatError> {
        let base = match &self.config {
            Some(path) => RuleSet::load(path)?,
            None => RuleSet::default(),
        };
        let mut builder = RuleSetBuilder::from_rules(base);
        for name in &self.skip_dirs {
            builder = builder.skip_dir_name(name.as_str());
        }
        for path in &self.skip_paths {
            builder = builder.skip_dir_path(path.as_str());
        }
        for pattern in &self.skip_patterns {
            builder = builder.skip_pattern(pattern.as_str());
        }
        for ext in &self.include {
            builder = builder.text_extension(ext.as_str());
        }
        for ext in &self.binary_exts {
            builder = builder.binary_extension(ext.as_str());
        }
        if let Some(limit) = self.max_file_size {
            builder = builder.max_file_size(limit);
        }
        if let Some(method) = self.binary_detection {
            builder = builder.binary_detection(method);
        }
        if self.gitignore {
            builder = builder.respect_gitignore(true);
        }
        Ok(builder.build())
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn fail(err: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", err);
    exit(1);
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let rules = cli.rules().unwrap_or_else(|e| fail(e));
    if cli.print_rules {
        match serde_json::to_string_pretty(&rules) {
            Ok(json) => println!("{}", json),
            Err(e) => fail(e),
        }
        return;
    }

    let root = resolve_root(&cli.root).unwrap_or_else(|e| fail(e));
    let classifier = Classifier::new(root, &rules).unwrap_or_else(|e| fail(e));
    tracing::info!("flattening {}", classifier.root().display());

    if cli.output == "-" {
        let stdout = io::stdout();
        let mut out = BufWriter::new(stdout.lock());
        if let Err(e) = run(&cli, &classifier, &mut out) {
            fail(e);
        }
        return;
    }

    let target = PathBuf::from(shellexpand::tilde(&cli.output).as_ref());
    let result = output::open_output(&target).and_then(|mut out| run(&cli, &classifier, &mut out));
    match result {
        Ok(()) => {
            let shown = target.canonicalize().unwrap_or(target);
            println!("Wrote repository contents to {}", shown.display());
        }
        Err(e) => {
            eprintln!(
                "Error writing to output file '{}': {}",
                target.display(),
                e
            );
            exit(1);
        }
    }
}

fn run(cli: &Cli, classifier: &Classifier, out: &mut dyn Write) -> Result<(), FlatcatError> {
    match (cli.mode, cli.format) {
        (Mode::Normal, OutputFormat::Text) => {
            let summary = output::write_document(classifier, out)?;
            tracing::info!(
                "{} files written, {} directories skipped",
                summary.records,
                summary.skipped_dirs
            );
        }
        (Mode::Normal, OutputFormat::Json) => {
            let snapshot = collect(classifier);
            let json = output::format_snapshot(&snapshot, DocumentFormat::Json, cli.pretty)?;
            writeln!(out, "{}", json).map_err(FlatcatError::Write)?;
        }
        (Mode::TreeOnly, OutputFormat::Text) => {
            output::write_tree(out, &render_tree(classifier))?;
        }
        (Mode::TreeOnly, OutputFormat::Json) => {
            let lines: Vec<String> = render_tree(classifier)
                .iter()
                .map(ToString::to_string)
                .collect();
            write_json(out, &lines, cli.pretty)?;
        }
        (Mode::PathsOnly, format) => {
            let mut paths = Vec::new();
            for item in IncludedFiles::new(classifier) {
                match item.and_then(|entry| classifier.relative_path(&entry.path)) {
                    Ok(rel) => paths.push(format!("/{}", rel)),
                    Err(e) => tracing::warn!("{}", e),
                }
            }
            if format == OutputFormat::Json {
                write_json(out, &paths, cli.pretty)?;
            } else {
                for path in paths {
                    writeln!(out, "{}", path).map_err(FlatcatError::Write)?;
                }
            }
        }
    }
    out.flush().map_err(FlatcatError::Write)
}

fn write_json(out: &mut dyn Write, items: &[String], pretty: bool) -> Result<(), FlatcatError> {
    let json = if pretty {
        serde_json::to_string_pretty(items)?
    } else {
        serde_json::to_string(items)?
    };
    writeln!(out, "{}", json).map_err(FlatcatError::Write)
}
