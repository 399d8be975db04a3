//! pdfoutline CLI - PDF heading outline inference tool

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use pdfoutline::batch::{collect_inputs, confine_path, shared_root};
use pdfoutline::{
    run_batch_with_progress, BatchOptions, FileStatus, JsonFormat, LinguaModel, OutlineOptions,
    PageSource, PdfOutline, PdfSource,
};

#[derive(Parser)]
#[command(name = "pdfoutline")]
#[command(version)]
#[command(about = "Infer title and H1-H3 heading outlines from PDF layout", long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(flatten)]
    batch: BatchArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Process every PDF in a directory (default)
    Batch(BatchArgs),

    /// Infer the outline of a single PDF
    Outline {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        #[command(flatten)]
        model: ModelArgs,
    },

    /// Show document and layout diagnostics
    Info {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        #[command(flatten)]
        model: ModelArgs,
    },

    /// Show version information
    Version,
}

#[derive(Args, Clone)]
struct BatchArgs {
    /// Directory containing PDF files
    #[arg(short, long, value_name = "DIR", env = "PDFOUTLINE_INPUT", default_value = "/app/input")]
    input: PathBuf,

    /// Directory for JSON output
    #[arg(short, long, value_name = "DIR", env = "PDFOUTLINE_OUTPUT", default_value = "/app/output")]
    output: PathBuf,

    /// Reject any input or output path outside this directory (defaults to
    /// the shared parent of input and output)
    #[arg(long, value_name = "DIR", env = "PDFOUTLINE_ROOT")]
    root: Option<PathBuf>,

    /// Allow input and output paths anywhere
    #[arg(long, conflicts_with = "root")]
    no_confine: bool,

    /// Worker threads (0 = one per CPU)
    #[arg(short, long, env = "PDFOUTLINE_JOBS", default_value_t = 0)]
    jobs: usize,

    #[command(flatten)]
    model: ModelArgs,
}

#[derive(Args, Clone)]
struct ModelArgs {
    /// Restrict language detection to these ISO 639-1 codes
    #[arg(long, value_name = "CODES", value_delimiter = ',')]
    languages: Vec<String>,

    /// Maximum number of pages per document
    #[arg(long, default_value_t = 50)]
    max_pages: usize,

    /// Compact JSON output
    #[arg(long)]
    compact: bool,
}

impl BatchArgs {
    fn confinement_root(&self) -> pdfoutline::Result<Option<PathBuf>> {
        if self.no_confine {
            return Ok(None);
        }
        match self.root {
            Some(ref root) => Ok(Some(root.clone())),
            None => shared_root(&self.input, &self.output).map(Some),
        }
    }
}

impl ModelArgs {
    fn load_model(&self) -> pdfoutline::Result<LinguaModel> {
        if self.languages.is_empty() {
            LinguaModel::load()
        } else {
            LinguaModel::with_languages(self.languages.as_slice())
        }
    }

    fn options(&self) -> OutlineOptions {
        OutlineOptions::new().with_max_pages(self.max_pages)
    }

    fn json_format(&self) -> JsonFormat {
        if self.compact {
            JsonFormat::Compact
        } else {
            JsonFormat::Pretty
        }
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Batch(args)) => cmd_batch(&args),
        Some(Commands::Outline {
            input,
            output,
            model,
        }) => cmd_outline(&input, output.as_deref(), &model).map(|_| 0),
        Some(Commands::Info { input, model }) => cmd_info(&input, &model).map(|_| 0),
        Some(Commands::Version) => {
            cmd_version();
            Ok(0)
        }
        None => cmd_batch(&cli.batch),
    };

    match result {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("{}: {}", "Error".red().bold(), e);
            std::process::exit(1);
        }
    }
}

fn cmd_batch(args: &BatchArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let model = args.model.load_model()?;

    let mut options = BatchOptions::new(&args.input, &args.output)
        .with_jobs(args.jobs)
        .with_json_format(args.model.json_format())
        .with_outline_options(args.model.options());
    if let Some(root) = args.confinement_root()? {
        confine_path(&root, &args.input)?;
        options = options.with_root(root);
    }

    let total = collect_inputs(&args.input)?.len();
    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let report = run_batch_with_progress(&options, &model, |file| {
        let name = file
            .input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if let FileStatus::Failed(ref reason) = file.status {
            pb.println(format!("{} {}: {}", "Failed".red(), name, reason));
        }
        pb.set_message(name);
        pb.inc(1);
    })?;
    pb.finish_and_clear();

    for file in &report.files {
        if let FileStatus::Succeeded { headings, warnings } = file.status {
            let note = if warnings > 0 {
                format!(" ({} page warnings)", warnings).yellow().to_string()
            } else {
                String::new()
            };
            println!(
                "  {} {} {} headings{}",
                "├─".dimmed(),
                file.output.display(),
                headings,
                note
            );
        }
    }

    let summary = format!("Processed {} PDF files", report.processed());
    if report.processed() > 0 {
        println!("{}", summary.green().bold());
    } else {
        println!("{}", summary.red().bold());
    }

    Ok(report.exit_code())
}

fn cmd_outline(
    input: &Path,
    output: Option<&Path>,
    model_args: &ModelArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let model = model_args.load_model()?;
    let outcome = PdfOutline::new()
        .with_options(model_args.options())
        .process(input, &model)?;

    for warning in &outcome.warnings {
        eprintln!("{}: {}", "Warning".yellow().bold(), warning);
    }

    let json = outcome.to_json(model_args.json_format())?;
    if let Some(output_path) = output {
        fs::write(output_path, &json)?;
        println!(
            "{} {} ({} headings)",
            "Written to".green(),
            output_path.display(),
            outcome.result.heading_count()
        );
    } else {
        println!("{}", json);
    }

    Ok(())
}

fn cmd_info(input: &Path, model_args: &ModelArgs) -> Result<(), Box<dyn std::error::Error>> {
    let model = model_args.load_model()?;
    let source = PdfSource::open(input)?;

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: PDF {}", "Format".bold(), source.version());
    println!("{}: {}", "Pages".bold(), source.page_count());
    if let Some(title) = source.title() {
        println!("{}: {}", "Metadata title".bold(), title);
    }

    let outcome = PdfOutline::new()
        .with_options(model_args.options())
        .process_source(&source, &model)?;
    let result = &outcome.result;
    let metadata = &result.metadata;

    println!();
    println!("{}", "Layout".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "Title".bold(), result.title);
    println!("{}: {}", "Language".bold(), metadata.detected_language);
    println!("{}: {}pt", "Body font".bold(), metadata.body_font_size);
    println!("{}: {}", "Headings".bold(), result.heading_count());

    println!("{}:", "Font sizes".bold());
    for (size, count) in metadata.font_distribution.iter() {
        println!("  {} {:>6.1}pt  {}", "├─".dimmed(), size, count);
    }

    if !outcome.warnings.is_empty() {
        println!();
        println!("{}", "Skipped pages".yellow().bold());
        for warning in &outcome.warnings {
            println!("  {} {}", "├─".dimmed(), warning);
        }
    }

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "pdfoutline".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("PDF heading outline inference tool");
    println!();
    println!("License: MIT");
}
