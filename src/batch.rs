//! Directory batch processing.
//!
//! Every `*.pdf` directly inside the input directory becomes one
//! `<stem>.json` in the output directory. A document that cannot be read
//! still gets a file, holding the fallback result, and the batch moves on.

use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::model::ExtractionResult;
use crate::outline::OutlineExtractor;
use crate::render::{write_json, JsonFormat};

/// Where to read PDFs from and where to write results.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Process documents on the rayon thread pool
    pub parallel: bool,
    pub format: JsonFormat,
}

impl BatchOptions {
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            parallel: false,
            format: JsonFormat::Pretty,
        }
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_format(mut self, format: JsonFormat) -> Self {
        self.format = format;
        self
    }
}

/// Outcome for one input file.
#[derive(Debug, Clone)]
pub struct FileReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub title: String,
    pub headings: usize,
    /// Set when the document fell back or its JSON could not be written
    pub error: Option<String>,
}

impl FileReport {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Outcome of a batch run, in input order.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub files: Vec<FileReport>,
}

impl BatchReport {
    pub fn processed(&self) -> usize {
        self.files.len()
    }

    pub fn failed(&self) -> usize {
        self.files.iter().filter(|f| !f.is_ok()).count()
    }
}

/// PDF files directly inside `dir`, sorted by name.
///
/// The extension match is case-insensitive. An empty result is an
/// [`Error::NoInput`].
pub fn discover_pdfs<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && has_pdf_extension(path))
        .collect();

    if files.is_empty() {
        return Err(Error::NoInput(dir.to_path_buf()));
    }
    files.sort();
    Ok(files)
}

fn has_pdf_extension(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case("pdf"))
}

/// Path of the JSON written for `input`.
pub fn output_path_for(input: &Path, output_dir: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    output_dir.join(format!("{}.json", stem))
}

/// Process every PDF in `options.input_dir`.
pub fn run_batch(extractor: &OutlineExtractor, options: &BatchOptions) -> Result<BatchReport> {
    run_batch_with_progress(extractor, options, |_| {})
}

/// Like [`run_batch`], calling `on_file` as each document finishes.
///
/// With `parallel` set, `on_file` runs on worker threads in completion
/// order; the returned report is always in input order.
pub fn run_batch_with_progress<F>(
    extractor: &OutlineExtractor,
    options: &BatchOptions,
    on_file: F,
) -> Result<BatchReport>
where
    F: Fn(&FileReport) + Sync,
{
    let inputs = discover_pdfs(&options.input_dir)?;
    fs::create_dir_all(&options.output_dir)?;

    log::info!(
        "Processing {} PDF files from {}",
        inputs.len(),
        options.input_dir.display()
    );

    let process = |input: &PathBuf| {
        let report = process_file(extractor, input, options);
        on_file(&report);
        report
    };

    let files: Vec<FileReport> = if options.parallel {
        inputs.par_iter().map(process).collect()
    } else {
        inputs.iter().map(process).collect()
    };

    let report = BatchReport { files };
    log::info!(
        "Processed {} PDF files ({} failed)",
        report.processed(),
        report.failed()
    );
    Ok(report)
}

fn process_file(extractor: &OutlineExtractor, input: &Path, options: &BatchOptions) -> FileReport {
    let output = output_path_for(input, &options.output_dir);

    let (result, mut error) = match extractor.try_extract_file(input) {
        Ok(result) => (result, None),
        Err(e) => {
            log::error!("Error processing {}: {}", input.display(), e);
            (ExtractionResult::fallback(), Some(e.to_string()))
        }
    };

    if let Err(e) = write_json(&result, &output, options.format) {
        log::error!("Failed to write {}: {}", output.display(), e);
        error.get_or_insert(e.to_string());
    } else {
        log::info!("Processed: {} -> {}", input.display(), output.display());
    }

    FileReport {
        input: input.to_path_buf(),
        output,
        title: result.title,
        headings: result.outline.len(),
        error,
    }
}
