//! Directory batch processing.
//!
//! Every `*.pdf` in the input directory becomes `<stem>.json` in the output
//! directory. Documents run in parallel on a bounded rayon pool; each
//! document is processed sequentially. A failing document is logged and
//! counted, never propagated.

use std::fs;
use std::path::{Component, Path, PathBuf};

use rayon::prelude::*;

use crate::analysis::LanguageModel;
use crate::error::{Error, Result};
use crate::options::OutlineOptions;
use crate::pipeline::{DocumentOutcome, OutlinePipeline};
use crate::render::{to_json, JsonFormat};
use crate::source::PdfSource;

/// Options for a batch run.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOptions {
    /// Directory scanned for `*.pdf` files
    pub input_dir: PathBuf,

    /// Directory receiving `<stem>.json` files
    pub output_dir: PathBuf,

    /// Every input and output path must stay inside this directory
    pub root: Option<PathBuf>,

    /// Worker threads (0 = one per CPU)
    pub jobs: usize,

    /// JSON layout of the output files
    pub json_format: JsonFormat,

    /// Options forwarded to every document run
    pub outline: OutlineOptions,
}

impl BatchOptions {
    /// Create options for the given input and output directories.
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            root: None,
            jobs: 0,
            json_format: JsonFormat::Pretty,
            outline: OutlineOptions::default(),
        }
    }

    /// Confine all paths to `root`.
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// Set the number of worker threads.
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs;
        self
    }

    /// Set the JSON layout.
    pub fn with_json_format(mut self, format: JsonFormat) -> Self {
        self.json_format = format;
        self
    }

    /// Set the per-document outline options.
    pub fn with_outline_options(mut self, options: OutlineOptions) -> Self {
        self.outline = options;
        self
    }
}

/// How a single file fared.
#[derive(Debug, Clone, PartialEq)]
pub enum FileStatus {
    /// JSON was written
    Succeeded {
        /// Number of outline entries
        headings: usize,
        /// Number of skipped page stages
        warnings: usize,
    },
    /// Nothing was written
    Failed(String),
}

/// Report entry for one input file.
#[derive(Debug, Clone, PartialEq)]
pub struct FileReport {
    /// Input PDF
    pub input: PathBuf,
    /// Target JSON path
    pub output: PathBuf,
    /// Result of processing
    pub status: FileStatus,
}

impl FileReport {
    /// Check if the file was processed.
    pub fn is_success(&self) -> bool {
        matches!(self.status, FileStatus::Succeeded { .. })
    }
}

/// Summary of a batch run, in input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    /// One entry per input file
    pub files: Vec<FileReport>,
}

impl BatchReport {
    /// Number of documents that produced output.
    pub fn processed(&self) -> usize {
        self.files.iter().filter(|f| f.is_success()).count()
    }

    /// Number of documents that failed.
    pub fn failed(&self) -> usize {
        self.files.len() - self.processed()
    }

    /// Process exit code: success iff at least one document was processed.
    pub fn exit_code(&self) -> i32 {
        if self.processed() > 0 {
            0
        } else {
            1
        }
    }
}

/// Resolve `path` against the working directory and drop `.` and `..`
/// components without touching the filesystem.
fn normalize(path: &Path) -> Result<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };

    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    Ok(normalized)
}

/// Canonical form of a path whose final component may not exist yet.
fn canonical(path: &Path) -> Option<PathBuf> {
    if let Ok(real) = path.canonicalize() {
        return Some(real);
    }
    let parent = path.parent()?.canonicalize().ok()?;
    Some(parent.join(path.file_name()?))
}

/// Check that `path` stays inside `root` and return its absolute form.
///
/// The check runs lexically first, then again on resolved symlinks for
/// whatever part of the path already exists.
pub fn confine_path(root: &Path, path: &Path) -> Result<PathBuf> {
    let root = normalize(root)?;
    let target = normalize(path)?;
    if !target.starts_with(&root) {
        return Err(Error::PathOutsideRoot(path.to_path_buf()));
    }

    if let (Ok(real_root), Some(real_target)) = (root.canonicalize(), canonical(&target)) {
        if !real_target.starts_with(&real_root) {
            return Err(Error::PathOutsideRoot(path.to_path_buf()));
        }
    }
    Ok(target)
}

/// Deepest directory containing both `a` and `b`, compared lexically.
pub fn shared_root(a: &Path, b: &Path) -> Result<PathBuf> {
    let a = normalize(a)?;
    let b = normalize(b)?;
    Ok(a.components()
        .zip(b.components())
        .take_while(|(x, y)| x == y)
        .map(|(x, _)| x)
        .collect())
}

/// List `*.pdf` files (case-insensitive) in `dir`, sorted by file name.
pub fn collect_inputs(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut inputs = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_pdf = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("pdf"))
            .unwrap_or(false);
        if is_pdf && path.is_file() {
            inputs.push(path);
        }
    }
    inputs.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(inputs)
}

/// Output path for an input file.
pub fn output_path(input: &Path, output_dir: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default();
    let mut name = stem.to_os_string();
    name.push(".json");
    output_dir.join(name)
}

/// Write `contents` to `path` through a temporary sibling file, so readers
/// never observe a partially written document.
fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let mut tmp_name = std::ffi::OsString::from(".");
    tmp_name.push(path.file_name().unwrap_or_default());
    tmp_name.push(".tmp");
    let tmp = path.with_file_name(tmp_name);

    fs::write(&tmp, contents)?;
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }
    Ok(())
}

/// Process one PDF into one JSON file.
pub fn process_file(
    pipeline: &OutlinePipeline<'_>,
    input: &Path,
    output: &Path,
    root: Option<&Path>,
    format: JsonFormat,
) -> Result<DocumentOutcome> {
    let (input, output) = match root {
        Some(root) => (confine_path(root, input)?, confine_path(root, output)?),
        None => (input.to_path_buf(), output.to_path_buf()),
    };

    let source = PdfSource::open(&input)?;
    let outcome = pipeline.process(&source)?;
    let json = to_json(&outcome.result, format)?;
    write_atomic(&output, &json)?;
    Ok(outcome)
}

/// Process every PDF in the input directory.
pub fn run_batch(options: &BatchOptions, model: &dyn LanguageModel) -> Result<BatchReport> {
    run_batch_with_progress(options, model, |_| {})
}

/// Process every PDF in the input directory, calling `on_file` as each
/// document finishes.
///
/// Only setup problems (bad options, unreadable input directory, output
/// directory that cannot be created) are returned as errors.
pub fn run_batch_with_progress<F>(
    options: &BatchOptions,
    model: &dyn LanguageModel,
    on_file: F,
) -> Result<BatchReport>
where
    F: Fn(&FileReport) + Sync,
{
    options.outline.validate()?;

    let root = options.root.as_deref();
    let (input_dir, output_dir) = match root {
        Some(root) => (
            confine_path(root, &options.input_dir)?,
            confine_path(root, &options.output_dir)?,
        ),
        None => (options.input_dir.clone(), options.output_dir.clone()),
    };

    fs::create_dir_all(&output_dir)?;
    let inputs = collect_inputs(&input_dir)?;
    log::info!(
        "Found {} PDF files in {}",
        inputs.len(),
        input_dir.display()
    );

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(options.jobs)
        .build()
        .map_err(|e| Error::Other(format!("failed to start worker pool: {}", e)))?;

    let pipeline = OutlinePipeline::with_options(model, options.outline.clone());
    let files: Vec<FileReport> = pool.install(|| {
        inputs
            .par_iter()
            .map(|input| {
                let output = output_path(input, &output_dir);
                let status =
                    match process_file(&pipeline, input, &output, root, options.json_format) {
                        Ok(outcome) => {
                            log::info!(
                                "Processed {} ({} headings)",
                                input.display(),
                                outcome.result.heading_count()
                            );
                            FileStatus::Succeeded {
                                headings: outcome.result.heading_count(),
                                warnings: outcome.warnings.len(),
                            }
                        }
                        Err(e) => {
                            log::error!("Failed to process {}: {}", input.display(), e);
                            FileStatus::Failed(e.to_string())
                        }
                    };
                let report = FileReport {
                    input: input.clone(),
                    output,
                    status,
                };
                on_file(&report);
                report
            })
            .collect()
    });

    let report = BatchReport { files };
    log::info!(
        "Processed {} PDF files ({} failed)",
        report.processed(),
        report.failed()
    );
    Ok(report)
}
