//! Polylint CLI - heuristic linter for source snippets in many languages

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use glob::glob;
use polylint::config::{ColorMode, Config, OutputFormat};
use polylint::output::{
    CompactFormatter, JsonFormatter, OutputFormatter, PlainFormatter, TextFormatter,
};
use polylint::{FileReport, Language, LintResult, Linter, ParserRegistry, Rule, Severity};
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

#[derive(Parser)]
#[command(
    name = "polylint",
    version,
    about = "Heuristic multi-language linter",
    long_about = "Detects the language of a snippet from textual signatures and runs \
                  pattern rules for JavaScript, TypeScript, Python, C++, Java, C#, Go, PHP and HTML."
)]
struct Cli {
    /// Source text to lint (reads stdin when no source or file is given)
    source: Option<String>,

    /// Files or glob patterns to lint
    #[arg(short, long = "file", num_args = 1..)]
    files: Vec<String>,

    /// Skip detection and lint as this language
    #[arg(short, long)]
    language: Option<Language>,

    /// Output format
    #[arg(long, value_enum)]
    format: Option<Format>,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Disable specific rules (comma-separated, `rule` or `language/rule`)
    #[arg(long, value_delimiter = ',')]
    disable: Option<Vec<String>>,

    /// Number of parallel jobs (0 = auto)
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// List available rules and exit
    #[arg(long)]
    list_rules: bool,

    /// Only print the detected language
    #[arg(long)]
    detect: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
    Compact,
    Plain,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Text => OutputFormat::Text,
            Format::Json => OutputFormat::Json,
            Format::Compact => OutputFormat::Compact,
            Format::Plain => OutputFormat::Plain,
        }
    }
}

/// Input being linted
enum Input {
    Text { label: PathBuf, text: String },
    Files(Vec<PathBuf>),
}

fn print_rule(language: Language, rule: &Rule) {
    let severity = match rule.severity {
        Severity::Error => "error".red(),
        Severity::Warning => "warning".yellow(),
        Severity::Info => "info".blue(),
    };

    println!(
        "    {} [{}] ({})",
        format!("{}/{}", language, rule.id).cyan(),
        severity,
        rule.category
    );
    println!("      {}", rule.description);
}

fn list_rules(registry: &ParserRegistry) {
    for language in registry.languages() {
        let Some(parser) = registry.resolve(language) else {
            continue;
        };
        println!(
            "{} ({} rules)",
            language.display_name().bold(),
            parser.rules().len()
        );
        for rule in parser.rules() {
            print_rule(language, rule);
        }
        println!();
    }
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => Config::load_default().context("Failed to load config")?,
    };

    if cli.language == Some(Language::Unknown) {
        bail!("--language cannot be 'unknown'");
    }

    config.merge_cli(
        cli.format.map(OutputFormat::from),
        cli.no_color.then_some(ColorMode::Never),
        cli.jobs,
        cli.disable.clone(),
        cli.language,
    );
    Ok(config)
}

fn collect_input(cli: &Cli, config: &Config) -> Result<Input> {
    if let Some(text) = &cli.source {
        return Ok(Input::Text {
            label: PathBuf::from("<input>"),
            text: text.clone(),
        });
    }

    if cli.files.is_empty() {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read stdin")?;
        return Ok(Input::Text {
            label: PathBuf::from("<stdin>"),
            text,
        });
    }

    let excludes = config.exclude_set();
    let mut files: Vec<PathBuf> = Vec::new();
    for pattern in &cli.files {
        let paths = glob(pattern).with_context(|| format!("Invalid pattern '{}'", pattern))?;
        for entry in paths.flatten() {
            if entry.is_file() && !excludes.is_match(&entry) {
                files.push(entry);
            }
        }
    }

    if files.is_empty() {
        bail!("No files found to lint");
    }
    Ok(Input::Files(files))
}

/// Formatter for the configured output format. `show_paths` labels plain
/// output lines with their file.
fn formatter(config: &Config, show_paths: bool) -> Box<dyn OutputFormatter> {
    match config.output.format {
        OutputFormat::Text => {
            let mut text = TextFormatter::new();
            if config.output.color == ColorMode::Never {
                text = text.without_color();
            }
            if !config.output.statistics {
                text = text.without_stats();
            }
            Box::new(text)
        }
        OutputFormat::Json => Box::new(JsonFormatter::new().pretty()),
        OutputFormat::Compact => Box::new(CompactFormatter::new()),
        OutputFormat::Plain if show_paths => Box::new(PlainFormatter::new().with_path()),
        OutputFormat::Plain => Box::new(PlainFormatter::new()),
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;

    match config.output.color {
        ColorMode::Always => colored::control::set_override(true),
        ColorMode::Never => colored::control::set_override(false),
        ColorMode::Auto => {}
    }

    let registry = Arc::new(ParserRegistry::builtin());
    if cli.list_rules {
        list_rules(&registry);
        return Ok(());
    }

    let input = collect_input(&cli, &config)?;

    if cli.detect {
        match &input {
            Input::Text { text, .. } => {
                let detection = code_detector::detect_with_reason(text);
                println!("{} ({})", detection.language, detection.reason);
            }
            Input::Files(files) => {
                for path in files {
                    let content = std::fs::read_to_string(path)
                        .with_context(|| format!("Failed to read {}", path.display()))?;
                    let detection = code_detector::detect_with_path(path, &content);
                    println!("{}: {} ({})", path.display(), detection.language, detection.reason);
                }
            }
        }
        return Ok(());
    }

    let formatter = formatter(&config, matches!(input, Input::Files(_)));
    let linter = Linter::new(registry, config);

    let result = match input {
        Input::Text { label, text } => {
            let start = Instant::now();
            let report = FileReport {
                path: label,
                report: linter.lint(&text),
            };
            LintResult::from_reports(vec![report], start.elapsed())
        }
        Input::Files(files) => linter.lint_files(&files, None),
    };

    log::debug!(
        "Linted {} input(s): {} finding(s)",
        result.files_processed,
        result.finding_count()
    );

    let output = formatter.format(&result);
    print!("{}", output);
    if !output.ends_with('\n') {
        println!();
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    if let Err(e) = run(cli) {
        eprintln!("{}: {:#}", "error".red().bold(), e);
        std::process::exit(1);
    }
}
