use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

const IMAGES_DIR: &str = "images";
const MANIFESTS_DIR: &str = "manifests";

#[derive(Debug, Clone)]
pub struct ResourceLayout {
    root: PathBuf,
}

impl ResourceLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn images_root(&self) -> PathBuf {
        self.root.join(IMAGES_DIR)
    }

    pub fn manifests_dir(&self) -> PathBuf {
        self.root.join(MANIFESTS_DIR)
    }

    pub fn output_dir_for(&self, pdf_stem: &str) -> PathBuf {
        self.images_root().join(pdf_stem)
    }

    pub fn relative_image_path(&self, pdf_stem: &str, image_filename: &str) -> PathBuf {
        Path::new(IMAGES_DIR).join(pdf_stem).join(image_filename)
    }

    pub fn resolve(&self, relative: &Path) -> PathBuf {
        self.root.join(relative)
    }

    pub fn list_available_pdfs(&self) -> Result<Vec<String>> {
        let entries = fs::read_dir(&self.root)
            .with_context(|| format!("failed to read {}", self.root.display()))?;

        let mut pdfs = Vec::new();
        for entry in entries {
            let entry =
                entry.with_context(|| format!("failed to read entry in {}", self.root.display()))?;
            let path = entry.path();

            if !entry
                .file_type()
                .with_context(|| format!("failed to inspect file type: {}", path.display()))?
                .is_file()
            {
                continue;
            }

            let is_pdf = path
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ext.eq_ignore_ascii_case("pdf"))
                .unwrap_or(false);
            if !is_pdf {
                continue;
            }

            if let Some(name) = path.file_name().and_then(|name| name.to_str()) {
                pdfs.push(name.to_string());
            }
        }

        pdfs.sort();
        Ok(pdfs)
    }
}

pub fn pdf_stem(filename: &str) -> String {
    Path::new(filename)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(filename)
        .to_string()
}
