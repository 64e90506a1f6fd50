use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{debug, info, warn};

use super::ImportSettings;
use super::backend::{PageSpan, PdfBackend, PopplerBackend};
use super::ocr::extract_toc_with_ocr;
use super::toc::TocLineParser;
use crate::cli::ImportArgs;
use crate::layout::{ResourceLayout, pdf_stem};
use crate::model::{
    ImportCounts, ImportOptionsSnapshot, ImportReport, ImportRunManifest, ImportStatus,
    PdfImportOutcome, TocEntry, TocSource,
};
use crate::naming::{sanitize_title, text_filename_for};
use crate::util::{
    directory_is_populated, ensure_directory, now_utc_string, sha256_file, utc_compact_string,
    write_json_pretty,
};

pub fn run(args: ImportArgs) -> Result<()> {
    let layout = ResourceLayout::new(&args.res_root);
    let settings = ImportSettings::from(&args.options);

    if args.dry_run {
        return plan_import(&layout);
    }

    import_and_record(&layout, settings, args.report_path.clone(), render_import_command(&args))?;
    Ok(())
}

pub fn import_and_record(
    layout: &ResourceLayout,
    settings: ImportSettings,
    report_path: Option<PathBuf>,
    command: String,
) -> Result<ImportReport> {
    let started_ts = Utc::now();
    let started_at = now_utc_string();
    let run_id = format!("import-{}", utc_compact_string(started_ts));
    let report_path = report_path.unwrap_or_else(|| {
        layout
            .manifests_dir()
            .join(format!("import_run_{}.json", utc_compact_string(started_ts)))
    });

    info!(res_root = %layout.root().display(), run_id = %run_id, "starting manual import");

    let backend = PopplerBackend;
    let tool_versions = backend.tool_versions();
    let options = ImportOptionsSnapshot {
        res_root: layout.root().display().to_string(),
        images_root: layout.images_root().display().to_string(),
        toc_scan_pages: settings.toc_scan_pages,
        dpi: settings.dpi,
        ocr_lang: settings.ocr_lang.clone(),
    };

    let importer = Importer::new(&backend, layout, settings)?;
    let report = importer.import_all()?;
    log_summary(&report);

    let manifest = ImportRunManifest {
        manifest_version: 1,
        run_id,
        started_at,
        finished_at: now_utc_string(),
        command,
        tool_versions,
        options,
        counts: count_outcomes(&report),
        outcomes: report.outcomes.clone(),
        warnings: report.warnings.clone(),
    };
    write_json_pretty(&report_path, &manifest)?;
    info!(path = %report_path.display(), "wrote import run manifest");

    Ok(report)
}

pub struct Importer<'a, B: PdfBackend> {
    backend: &'a B,
    layout: &'a ResourceLayout,
    settings: ImportSettings,
    parser: TocLineParser,
}

impl<'a, B: PdfBackend> Importer<'a, B> {
    pub fn new(backend: &'a B, layout: &'a ResourceLayout, settings: ImportSettings) -> Result<Self> {
        Ok(Self {
            backend,
            layout,
            settings,
            parser: TocLineParser::new()?,
        })
    }

    pub fn import_all(&self) -> Result<ImportReport> {
        let pdfs = self.layout.list_available_pdfs()?;
        let mut report = ImportReport::default();

        if pdfs.is_empty() {
            warn!(res_root = %self.layout.root().display(), "no PDF files found");
            return Ok(report);
        }

        for filename in pdfs {
            let output_dir = self.layout.output_dir_for(&pdf_stem(&filename));

            if directory_is_populated(&output_dir) {
                info!(pdf = %filename, "skipping already processed PDF");
                report.outcomes.push(PdfImportOutcome {
                    filename,
                    status: ImportStatus::Skipped,
                    toc_source: TocSource::None,
                    toc_entries: 0,
                    entries_written: 0,
                    entries_out_of_range: 0,
                    total_pages: 0,
                    sha256: None,
                });
                continue;
            }

            info!(pdf = %filename, "converting PDF");
            let outcome = self.import_pdf(&filename, &output_dir, &mut report.warnings);
            report.outcomes.push(outcome);
        }

        Ok(report)
    }

    fn import_pdf(
        &self,
        filename: &str,
        output_dir: &Path,
        warnings: &mut Vec<String>,
    ) -> PdfImportOutcome {
        let pdf_path = self.layout.root().join(filename);
        let mut outcome = PdfImportOutcome {
            filename: filename.to_string(),
            status: ImportStatus::Failed,
            toc_source: TocSource::None,
            toc_entries: 0,
            entries_written: 0,
            entries_out_of_range: 0,
            total_pages: 0,
            sha256: sha256_file(&pdf_path).ok(),
        };

        let scratch = match tempfile::tempdir() {
            Ok(dir) => dir,
            Err(err) => {
                record_warning(warnings, format!("failed to create scratch directory for {filename}: {err}"));
                return outcome;
            }
        };

        let pages = match self.backend.rasterize(
            &pdf_path,
            PageSpan::all(),
            self.settings.dpi,
            scratch.path(),
        ) {
            Ok(pages) => pages,
            Err(err) => {
                record_warning(warnings, format!("PDF conversion failed for {filename}: {err:#}"));
                return outcome;
            }
        };
        outcome.total_pages = pages.len();

        let (entries, toc_source) = self.locate_toc(&pdf_path, pages.len());
        outcome.toc_source = toc_source;
        outcome.toc_entries = entries.len();

        if entries.is_empty() {
            record_warning(warnings, format!("no TOC titles found for {filename}; skipping"));
            return outcome;
        }

        if let Err(err) = ensure_directory(output_dir) {
            record_warning(warnings, format!("{err:#}"));
            return outcome;
        }

        for entry in &entries {
            let Some(page_index) = entry.page_index().filter(|index| *index < pages.len()) else {
                debug!(
                    title = %entry.title,
                    page = entry.page_number,
                    total_pages = pages.len(),
                    "toc page outside document"
                );
                outcome.entries_out_of_range += 1;
                continue;
            };

            let image_filename = sanitize_title(&entry.title);
            let image_path = output_dir.join(&image_filename);

            if let Err(err) = fs::copy(&pages[page_index], &image_path) {
                record_warning(
                    warnings,
                    format!("failed to save image '{image_filename}': {err}"),
                );
                continue;
            }
            info!(path = %image_path.display(), title = %entry.title, "inserted entry");
            outcome.entries_written += 1;

            let text_path = output_dir.join(text_filename_for(&image_filename));
            self.write_page_text(&pdf_path, page_index + 1, &text_path);
        }

        outcome.status = ImportStatus::Processed;
        outcome
    }

    fn locate_toc(&self, pdf_path: &Path, total_pages: usize) -> (Vec<TocEntry>, TocSource) {
        let lines = self.text_layer_lines(pdf_path, total_pages);
        let entries = self.parser.parse_lines(lines).collect::<Vec<_>>();
        if !entries.is_empty() {
            return (entries, TocSource::TextLayer);
        }

        info!(pdf = %pdf_path.display(), "no TOC titles in text layer, using OCR fallback");
        let entries = extract_toc_with_ocr(self.backend, &self.parser, pdf_path, &self.settings);
        if entries.is_empty() {
            (entries, TocSource::None)
        } else {
            (entries, TocSource::Ocr)
        }
    }

    fn text_layer_lines(&self, pdf_path: &Path, total_pages: usize) -> Vec<String> {
        let mut lines = Vec::new();
        for page_number in 1..=self.settings.toc_scan_pages.min(total_pages) {
            match self.backend.page_text(pdf_path, page_number) {
                Ok(text) => lines.extend(text.lines().map(str::to_string)),
                Err(err) => {
                    debug!(page = page_number, error = %err, "text layer unavailable for page");
                }
            }
        }
        lines
    }

    fn write_page_text(&self, pdf_path: &Path, page_number: usize, text_path: &Path) {
        let text = match self.backend.page_text(pdf_path, page_number) {
            Ok(text) => text,
            Err(err) => {
                debug!(page = page_number, error = %err, "page text extraction failed");
                return;
            }
        };

        let text = text.trim();
        if text.is_empty() {
            return;
        }

        if let Err(err) = fs::write(text_path, text) {
            debug!(path = %text_path.display(), error = %err, "failed to write page text");
        }
    }
}

fn record_warning(warnings: &mut Vec<String>, message: String) {
    warn!(warning = %message, "import warning");
    warnings.push(message);
}

fn plan_import(layout: &ResourceLayout) -> Result<()> {
    let pdfs = layout
        .list_available_pdfs()
        .with_context(|| format!("failed to plan import in {}", layout.root().display()))?;

    for filename in &pdfs {
        let output_dir = layout.output_dir_for(&pdf_stem(filename));
        if directory_is_populated(&output_dir) {
            info!(pdf = %filename, "would skip (already processed)");
        } else {
            info!(pdf = %filename, output = %output_dir.display(), "would import");
        }
    }

    info!(pdf_count = pdfs.len(), "import dry-run complete");
    Ok(())
}

fn log_summary(report: &ImportReport) {
    let processed = report.filenames_with(ImportStatus::Processed);
    let skipped = report.filenames_with(ImportStatus::Skipped);
    let failed = report.filenames_with(ImportStatus::Failed);

    info!(
        processed = processed.len(),
        skipped = skipped.len(),
        failed = failed.len(),
        "all processing complete"
    );
    for filename in processed {
        info!(pdf = %filename, "processed");
    }
    for filename in skipped {
        info!(pdf = %filename, "skipped (already converted)");
    }
    for filename in failed {
        warn!(pdf = %filename, "not imported");
    }
}

fn count_outcomes(report: &ImportReport) -> ImportCounts {
    let count = |status| {
        report
            .outcomes
            .iter()
            .filter(|outcome| outcome.status == status)
            .count()
    };

    ImportCounts {
        pdf_count: report.outcomes.len(),
        processed_pdf_count: count(ImportStatus::Processed),
        skipped_pdf_count: count(ImportStatus::Skipped),
        failed_pdf_count: count(ImportStatus::Failed),
        ocr_fallback_count: report
            .outcomes
            .iter()
            .filter(|outcome| outcome.toc_source == TocSource::Ocr)
            .count(),
        entries_written: report
            .outcomes
            .iter()
            .map(|outcome| outcome.entries_written)
            .sum(),
    }
}

fn render_import_command(args: &ImportArgs) -> String {
    let mut command = vec![
        "manualhelp".to_string(),
        "import".to_string(),
        "--res-root".to_string(),
        args.res_root.display().to_string(),
        "--toc-scan-pages".to_string(),
        args.options.toc_scan_pages.to_string(),
        "--dpi".to_string(),
        args.options.dpi.to_string(),
        "--ocr-lang".to_string(),
        args.options.ocr_lang.clone(),
    ];

    if let Some(path) = &args.report_path {
        command.push("--report-path".to_string());
        command.push(path.display().to_string());
    }

    command.join(" ")
}
