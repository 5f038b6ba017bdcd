use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use dialoguer::{Input, Select};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::debug;

use crate::{
    cmd::tui::TuiApp,
    config::Config,
    report,
    scan::{scan_blocking, ScanOptions, ScanSummary},
    source::{collect_archive, Source},
    types::{FileType, KeywordSet, ReportFormat},
    utils::{is_archive, parse_filetype, parse_keywords, read_keywords_from_file},
};

#[derive(Parser)]
#[command(name = "resumatch")]
#[command(about = "Screen PDF and DOCX resumes against a keyword list")]
#[command(version)]
#[command(propagate_version = true)]
pub struct EnhancedCli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Zip archive, folder, or single .pdf/.docx resume
    #[arg(short, long)]
    source: Option<PathBuf>,

    /// Comma-separated keywords (e.g. "java,python,rust")
    #[arg(short, long)]
    keywords: Option<String>,

    /// Enable interactive mode
    #[arg(short, long)]
    interactive: bool,

    /// Enable TUI mode
    #[arg(short, long)]
    tui: bool,

    /// Quiet mode (report only, no banner or progress)
    #[arg(short, long)]
    quiet: bool,

    /// Output format
    #[arg(short, long, value_enum)]
    format: Option<ReportFormat>,
}

#[derive(Args, Clone, Debug, Default)]
struct SearchArgs {
    /// Comma-separated keywords (e.g. "java,python,rust")
    #[arg(short, long)]
    keywords: Option<String>,

    /// File with comma-separated keywords, one or more per line
    #[arg(long, conflicts_with = "keywords")]
    keywords_file: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum)]
    format: Option<ReportFormat>,

    /// Also scan nested folders
    #[arg(short, long)]
    recursive: bool,

    /// Only scan documents whose name matches this glob (e.g. "*.pdf")
    #[arg(short, long)]
    pattern: Option<String>,

    /// Maximum number of documents extracted at once
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Quiet mode (report only, no banner or progress)
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive search mode
    Interactive,

    /// TUI mode
    Tui {
        /// Zip archive, folder, or single resume to preload
        source: Option<PathBuf>,
    },

    /// Scan resumes for keywords and print the report
    Search {
        /// Zip archive, folder, or single .pdf/.docx resume
        source: PathBuf,

        #[command(flatten)]
        args: SearchArgs,
    },

    /// List the documents a search would scan without extracting them
    Validate {
        /// Zip archive, folder, or single .pdf/.docx resume
        source: PathBuf,

        /// Keywords to validate
        #[arg(short, long)]
        keywords: Option<String>,

        /// Also scan nested folders
        #[arg(short, long)]
        recursive: bool,

        /// Only list documents whose name matches this glob
        #[arg(short, long)]
        pattern: Option<String>,
    },

    /// Show file information
    Info {
        /// Path to a resume or zip archive
        file: PathBuf,
    },
}

pub struct CliApp {
    cli: EnhancedCli,
}

impl CliApp {
    pub fn new() -> Self {
        Self {
            cli: EnhancedCli::parse(),
        }
    }

    pub fn run() -> Result<()> {
        let app = Self::new();
        let config = Config::load()?;

        let tui_mode = matches!(app.cli.command, Some(Commands::Tui { .. }))
            || (app.cli.command.is_none() && app.cli.tui);
        init_logging(tui_mode);
        debug!(?config, "loaded configuration");

        match app.cli.command {
            Some(Commands::Interactive) => Self::run_interactive(&config),
            Some(Commands::Tui { source }) => Self::run_tui(source, &config),
            Some(Commands::Search { source, args }) => Self::run_search(&source, &args, &config),
            Some(Commands::Validate {
                source,
                keywords,
                recursive,
                pattern,
            }) => Self::run_validate(&source, keywords.as_deref(), recursive || config.recursive, pattern.as_deref()),
            Some(Commands::Info { file }) => Self::run_info(&file),
            None => {
                if app.cli.tui {
                    Self::run_tui(app.cli.source, &config)
                } else if app.cli.interactive {
                    Self::run_interactive(&config)
                } else if let Some(source) = &app.cli.source {
                    let args = SearchArgs {
                        keywords: app.cli.keywords.clone(),
                        format: app.cli.format,
                        quiet: app.cli.quiet,
                        ..SearchArgs::default()
                    };
                    Self::run_search(source, &args, &config)
                } else {
                    Self::show_help();
                    Ok(())
                }
            }
        }
    }

    fn run_interactive(config: &Config) -> Result<()> {
        Self::show_startup_logo();

        println!("{}", "Interactive Mode".bold().blue());
        println!("{}", "=================".blue());

        let source = Self::get_source_interactive(config)?;
        let keywords = Self::get_keywords_interactive()?;
        let format = Self::get_format_interactive(config)?;

        let options = ScanOptions {
            jobs: config.jobs,
            show_progress: true,
            pattern: None,
        };

        println!("\n{}", format!("Scanning {}...", source.describe()).green());
        Self::execute(&source, keywords, &options, format, false)
    }

    fn run_tui(source: Option<PathBuf>, config: &Config) -> Result<()> {
        let mut tui_app = TuiApp::new(source, config.clone());
        tui_app.run()
    }

    fn run_search(source: &Path, args: &SearchArgs, config: &Config) -> Result<()> {
        let keywords = Self::resolve_keywords(args)?;
        let source = Source::detect(source, args.recursive || config.recursive)?;
        let pattern = compile_pattern(args.pattern.as_deref())?;
        let format = args.format.unwrap_or(config.format);

        if !args.quiet && format == ReportFormat::Text {
            println!("{}", "Search Mode".bold().blue());
            println!("{}", "=============".blue());
            println!(
                "Searching {} for {} keywords: {}",
                source.describe(),
                keywords.len(),
                keywords.as_slice().join(", ").cyan()
            );
            println!();
        }

        let options = ScanOptions {
            jobs: args.jobs.unwrap_or(config.jobs).max(1),
            show_progress: !args.quiet,
            pattern,
        };

        Self::execute(&source, keywords, &options, format, args.quiet)
    }

    fn execute(
        source: &Source,
        keywords: KeywordSet,
        options: &ScanOptions,
        format: ReportFormat,
        quiet: bool,
    ) -> Result<()> {
        let start = Instant::now();
        let summary = scan_blocking(source, keywords, options)?;
        Self::display_results(&summary, format, start.elapsed(), quiet)
    }

    fn resolve_keywords(args: &SearchArgs) -> Result<KeywordSet> {
        match (&args.keywords, &args.keywords_file) {
            (Some(keywords), _) => parse_keywords(keywords),
            (None, Some(path)) => read_keywords_from_file(path),
            (None, None) => bail!("Please enter at least one keyword (use --keywords or --keywords-file)."),
        }
    }

    fn run_validate(
        source: &Path,
        keywords: Option<&str>,
        recursive: bool,
        pattern: Option<&str>,
    ) -> Result<()> {
        println!("{}", "Validation Mode".bold().blue());
        println!("{}", "=================".blue());

        if let Some(keywords) = keywords {
            match parse_keywords(keywords) {
                Ok(set) => println!(
                    "Keywords: {} ({})",
                    "✓ Valid".green(),
                    set.as_slice().join(", ")
                ),
                Err(e) => println!("Keywords: {} ({})", "✗ Invalid".red(), e),
            }
        }

        let source = match Source::detect(source, recursive) {
            Ok(source) => source,
            Err(e) => {
                println!("Source: {} ({})", "✗ Invalid".red(), e);
                return Ok(());
            }
        };

        let pattern = compile_pattern(pattern)?;
        match source.collect(pattern.as_ref()) {
            Ok(collected) => {
                println!(
                    "Source: {} ({}, {} documents)",
                    "✓ Valid".green(),
                    source.describe(),
                    collected.documents.len()
                );
                for doc in &collected.documents {
                    println!("  [{}] {}", doc.file_type.label().blue(), doc.name);
                }
                for skipped in &collected.skipped {
                    println!("  {} {} ({})", "unreadable".yellow(), skipped.name, skipped.reason);
                }
            }
            Err(e) => println!("Source: {} ({})", "✗ Invalid".red(), e),
        }

        Ok(())
    }

    fn run_info(file: &Path) -> Result<()> {
        println!("{}", "File Information".bold().blue());
        println!("{}", "==================".blue());

        if !file.exists() {
            eprintln!("{}", format!("File not found: {}", file.display()).red());
            return Ok(());
        }

        let name = file.to_string_lossy();
        if is_archive(&name) {
            println!("File: {}", file.display());
            println!("Type: {}", "Zip Archive".yellow());
            println!("Size: {} bytes", file.metadata()?.len());

            let archive = File::open(file)
                .with_context(|| format!("Failed to open archive: {}", file.display()))?;
            let collected = collect_archive(archive)?;
            println!("Resumes: {}", collected.documents.len());
        } else if let Ok(file_type) = parse_filetype(&name) {
            println!("File: {}", file.display());
            println!("Type: {}", match file_type {
                FileType::Docx => "DOCX Document".blue(),
                FileType::Pdf => "PDF Document".red(),
            });
            println!("Size: {} bytes", file.metadata()?.len());
        } else {
            eprintln!("{}", "Unsupported file type".red());
        }

        Ok(())
    }

    fn get_source_interactive(config: &Config) -> Result<Source> {
        let options = &[
            "Zip archive of resumes",
            "Folder of resumes",
            "Single resume",
        ];

        let choice = Select::new()
            .with_prompt("Where are the resumes?")
            .default(0)
            .items(options)
            .interact()?;

        let prompt = match choice {
            0 => "Enter path to zip archive",
            1 => "Enter folder path",
            2 => "Enter path to .pdf or .docx file",
            _ => unreachable!(),
        };

        let path: String = Input::new().with_prompt(prompt).interact_text()?;
        let source = Source::detect(Path::new(path.trim()), config.recursive)?;

        let matches_choice = matches!(
            (&source, choice),
            (Source::Archive(_), 0) | (Source::Folder { .. }, 1) | (Source::Document(_), 2)
        );
        if !matches_choice {
            bail!("'{}' is not a {}", path.trim(), options[choice].to_lowercase());
        }

        Ok(source)
    }

    fn get_keywords_interactive() -> Result<KeywordSet> {
        let input: String = Input::new()
            .with_prompt("Enter keywords (separated by commas, e.g. java,python,rust)")
            .validate_with(|input: &String| -> Result<(), String> {
                parse_keywords(input).map(|_| ()).map_err(|e| e.to_string())
            })
            .interact_text()?;

        parse_keywords(&input)
    }

    fn get_format_interactive(config: &Config) -> Result<ReportFormat> {
        let formats = [
            ReportFormat::Text,
            ReportFormat::Json,
            ReportFormat::Csv,
            ReportFormat::Html,
        ];
        let labels = &["text", "json", "csv", "html"];
        let default = formats.iter().position(|f| *f == config.format).unwrap_or(0);

        let choice = Select::new()
            .with_prompt("Output format")
            .default(default)
            .items(labels)
            .interact()?;

        Ok(formats[choice])
    }

    fn display_results(
        summary: &ScanSummary,
        format: ReportFormat,
        duration: Duration,
        quiet: bool,
    ) -> Result<()> {
        let view = summary.report();

        if format != ReportFormat::Text {
            print!("{}", report::render(&view, format, false)?);
            return Ok(());
        }

        if !quiet {
            println!("{}", "=".repeat(50).blue());
            println!("{}", "SEARCH RESULTS".blue().bold());
            println!("{}", "=".repeat(50).blue());
        }

        print!("{}", report::render_text(&view, !quiet));

        if !quiet {
            if !view.skipped.is_empty() {
                println!();
                println!("{}", "Skipped documents:".yellow().bold());
                for skipped in &view.skipped {
                    println!("  {} ({})", skipped.name.yellow(), skipped.reason);
                }
            }

            println!("{}", "=".repeat(50).blue());
            println!(
                "{}",
                format!("Scanned {} documents in {} ms", view.documents_scanned, duration.as_millis())
                    .italic()
            );
            println!(
                "{}",
                format!("{} documents matched at least one keyword", view.ranking.len())
                    .green()
                    .bold()
            );
        }

        Ok(())
    }

    fn show_help() {
        println!("{}", "resumatch - Resume Keyword Screening".blue().bold());
        println!();
        println!("Usage:");
        println!("  resumatch --source <zip|folder|file> --keywords <list>");
        println!("  resumatch --interactive");
        println!("  resumatch --tui");
        println!("  resumatch search <source> --keywords <list>");
        println!("  resumatch validate <source>");
        println!("  resumatch info <file>");
        println!();
        println!("Examples:");
        println!("  resumatch -s resumes.zip -k java,python,rust");
        println!("  resumatch search ./resumes --keywords-file skills.txt --format json");
        println!("  resumatch search ./resumes -k sql,docker --recursive --pattern '*.pdf'");
        println!("  resumatch validate resumes.zip -k java,python");
        println!("  resumatch info resume.docx");
        println!();
        println!("For more help, run: resumatch --help");
    }

    fn show_startup_logo() {
        let logo = r#"
 ____                                _       _
|  _ \ ___  ___ _   _ _ __ ___   __ _| |_ ___| |__
| |_) / _ \/ __| | | | '_ ` _ \ / _` | __/ __| '_ \
|  _ <  __/\__ \ |_| | | | | | | (_| | || (__| | | |
|_| \_\___||___/\__,_|_| |_| |_|\__,_|\__\___|_| |_|
"#;
        println!("{}", logo);
        println!();
    }
}

fn compile_pattern(pattern: Option<&str>) -> Result<Option<glob::Pattern>> {
    pattern
        .map(|p| glob::Pattern::new(p).with_context(|| format!("Invalid file pattern: {}", p)))
        .transpose()
}

/// Structured logs go to stderr, filtered by `RUST_LOG` (default
/// `resumatch=warn`). The TUI owns the terminal, so its logs are discarded.
fn init_logging(tui_mode: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("resumatch=warn"));

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);
    let result = if tui_mode {
        builder.with_writer(std::io::sink).try_init()
    } else {
        builder.with_writer(std::io::stderr).try_init()
    };

    if let Err(e) = result {
        eprintln!("Failed to initialise logging: {}", e);
    }
}
