mod backend;
mod ocr;
mod run;
mod toc;

pub use run::{import_and_record, run};

use crate::cli::ImportOptions;

#[derive(Debug, Clone)]
pub struct ImportSettings {
    pub toc_scan_pages: usize,
    pub dpi: u32,
    pub ocr_lang: String,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            toc_scan_pages: 8,
            dpi: 200,
            ocr_lang: "eng".to_string(),
        }
    }
}

impl From<&ImportOptions> for ImportSettings {
    fn from(options: &ImportOptions) -> Self {
        Self {
            toc_scan_pages: options.toc_scan_pages,
            dpi: options.dpi,
            ocr_lang: options.ocr_lang.clone(),
        }
    }
}
