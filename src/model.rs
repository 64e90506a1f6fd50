use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocEntry {
    pub title: String,
    pub page_number: u32,
}

impl TocEntry {
    pub fn page_index(&self) -> Option<usize> {
        (self.page_number as usize).checked_sub(1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelpEntry {
    pub title: String,
    pub description: String,
    pub image_path: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TocSource {
    TextLayer,
    Ocr,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportStatus {
    Processed,
    Skipped,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PdfImportOutcome {
    pub filename: String,
    pub status: ImportStatus,
    pub toc_source: TocSource,
    pub toc_entries: usize,
    pub entries_written: usize,
    pub entries_out_of_range: usize,
    pub total_pages: usize,
    pub sha256: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportReport {
    pub outcomes: Vec<PdfImportOutcome>,
    pub warnings: Vec<String>,
}

impl ImportReport {
    pub fn filenames_with(&self, status: ImportStatus) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.status == status)
            .map(|outcome| outcome.filename.as_str())
            .collect()
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ToolVersions {
    pub pdftoppm: Option<String>,
    pub pdftotext: Option<String>,
    pub tesseract: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportOptionsSnapshot {
    pub res_root: String,
    pub images_root: String,
    pub toc_scan_pages: usize,
    pub dpi: u32,
    pub ocr_lang: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportCounts {
    pub pdf_count: usize,
    pub processed_pdf_count: usize,
    pub skipped_pdf_count: usize,
    pub failed_pdf_count: usize,
    pub ocr_fallback_count: usize,
    pub entries_written: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportRunManifest {
    pub manifest_version: u32,
    pub run_id: String,
    pub started_at: String,
    pub finished_at: String,
    pub command: String,
    pub tool_versions: ToolVersions,
    pub options: ImportOptionsSnapshot,
    pub counts: ImportCounts,
    pub outcomes: Vec<PdfImportOutcome>,
    pub warnings: Vec<String>,
}
