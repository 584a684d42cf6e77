//! pdfoutline CLI - PDF title and heading outline extraction

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use pdfoutline::batch::{discover_pdfs, run_batch_with_progress};
use pdfoutline::{
    clean_title, render, BatchOptions, Error, FixedLanguage, JsonFormat, OutlineConfig,
    OutlineExtractor,
};

const CONTAINER_INPUT: &str = "/app/input";
const CONTAINER_OUTPUT: &str = "/app/output";
const LOCAL_INPUT: &str = "../input";
const LOCAL_OUTPUT: &str = "../output";

#[derive(Parser)]
#[command(name = "pdfoutline")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Extract a title and H1-H3 outline from PDF files as JSON", long_about = None)]
struct Cli {
    /// Directory containing PDF files
    #[arg(value_name = "INPUT_DIR", env = "PDFOUTLINE_INPUT")]
    input: Option<PathBuf>,

    /// Directory for JSON results
    #[arg(value_name = "OUTPUT_DIR", env = "PDFOUTLINE_OUTPUT")]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Process every PDF in a directory
    Batch {
        /// Directory containing PDF files
        #[arg(short, long, value_name = "DIR", env = "PDFOUTLINE_INPUT")]
        input: Option<PathBuf>,

        /// Directory for JSON results
        #[arg(short, long, value_name = "DIR", env = "PDFOUTLINE_OUTPUT")]
        output: Option<PathBuf>,

        /// Process documents in parallel
        #[arg(long)]
        parallel: bool,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        /// Skip unreadable pages instead of failing the document
        #[arg(long)]
        lenient: bool,

        #[command(flatten)]
        flags: OutlineFlags,
    },

    /// Extract the outline of a single PDF
    Extract {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        #[command(flatten)]
        flags: OutlineFlags,
    },

    /// Show version information
    Version,
}

#[derive(Args, Default)]
struct OutlineFlags {
    /// Remove numbering prefixes ("1.2 ", "IV. ") from outline entries
    #[arg(long)]
    strip_numbers: bool,

    /// Add Korean, Arabic and Russian heading keywords
    #[arg(long)]
    extended_keywords: bool,

    /// Skip language detection and use this code (e.g., "en", "ja")
    #[arg(long, value_name = "CODE")]
    language: Option<String>,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Batch {
            input,
            output,
            parallel,
            compact,
            lenient,
            flags,
        }) => cmd_batch(input, output, parallel, compact, lenient, &flags),
        Some(Commands::Extract {
            input,
            output,
            compact,
            flags,
        }) => cmd_extract(&input, output.as_deref(), compact, &flags),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => cmd_batch(
            cli.input,
            cli.output,
            false,
            false,
            false,
            &OutlineFlags::default(),
        ),
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

/// Explicit directory, else the container path if it exists, else the local one.
fn resolve_dir(explicit: Option<PathBuf>, container: &str, local: &str) -> PathBuf {
    explicit.unwrap_or_else(|| {
        let container = PathBuf::from(container);
        if container.exists() {
            container
        } else {
            PathBuf::from(local)
        }
    })
}

fn build_config(flags: &OutlineFlags, lenient: bool) -> OutlineConfig {
    let mut config = OutlineConfig::new().with_strip_heading_numbers(flags.strip_numbers);
    if flags.extended_keywords {
        config = config.extended_keywords();
    }
    if lenient {
        config = config.lenient();
    }
    config
}

fn build_extractor(flags: &OutlineFlags, lenient: bool) -> OutlineExtractor {
    let config = build_config(flags, lenient);
    match &flags.language {
        Some(code) => OutlineExtractor::with_detector(config, FixedLanguage::new(code.clone())),
        None => OutlineExtractor::new(config),
    }
}

fn json_format(compact: bool) -> JsonFormat {
    if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    }
}

fn cmd_batch(
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    parallel: bool,
    compact: bool,
    lenient: bool,
    flags: &OutlineFlags,
) -> Result<(), Box<dyn std::error::Error>> {
    let input_dir = resolve_dir(input, CONTAINER_INPUT, LOCAL_INPUT);
    let output_dir = resolve_dir(output, CONTAINER_OUTPUT, LOCAL_OUTPUT);

    let total = match discover_pdfs(&input_dir) {
        Ok(files) => files.len(),
        Err(Error::NoInput(dir)) => {
            println!("{} {}", "No PDF files found in".yellow(), dir.display());
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let extractor = build_extractor(flags, lenient);
    let options = BatchOptions::new(&input_dir, &output_dir)
        .with_parallel(parallel)
        .with_format(json_format(compact));

    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );

    let report = run_batch_with_progress(&extractor, &options, |file| {
        let name = file
            .input
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        pb.set_message(name);
        pb.inc(1);
    })?;

    pb.finish_with_message("Done!");

    println!();
    for file in &report.files {
        let name = file.input.file_name().unwrap_or_default().to_string_lossy();
        match &file.error {
            None => println!(
                "  {} {} ({} headings)",
                "✓".green(),
                name,
                file.headings
            ),
            Some(e) => println!("  {} {}: {}", "✗".red(), name, e.as_str().dimmed()),
        }
    }

    println!(
        "\n{} {} PDF files -> {}",
        "Processed".green().bold(),
        report.processed(),
        output_dir.display()
    );
    if report.failed() > 0 {
        let message = format!("{} files written with the fallback result", report.failed());
        println!("{}", message.as_str().red());
    }

    Ok(())
}

fn cmd_extract(
    input: &Path,
    output: Option<&Path>,
    compact: bool,
    flags: &OutlineFlags,
) -> Result<(), Box<dyn std::error::Error>> {
    let extractor = build_extractor(flags, false);
    let result = extractor.try_extract_file(input)?;
    let json = render::to_json(&result, json_format(compact))?;

    if let Some(path) = output {
        fs::write(path, &json)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", json);
    }

    let title = clean_title(&result.title, extractor.config().max_title_chars);
    eprintln!(
        "{}: {} ({} headings)",
        "Title".bold(),
        title,
        result.outline.len()
    );

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "pdfoutline".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("PDF title and outline extraction tool");
    println!();
    println!("License: MIT");
}
