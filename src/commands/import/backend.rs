use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result, bail};

use crate::model::ToolVersions;

const PAGE_PREFIX: &str = "page";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSpan {
    pub first: usize,
    pub last: Option<usize>,
}

impl PageSpan {
    pub fn all() -> Self {
        Self {
            first: 1,
            last: None,
        }
    }

    pub fn leading(count: usize) -> Self {
        Self {
            first: 1,
            last: Some(count),
        }
    }
}

pub trait PdfBackend {
    fn rasterize(&self, pdf: &Path, pages: PageSpan, dpi: u32, out_dir: &Path)
    -> Result<Vec<PathBuf>>;

    fn page_text(&self, pdf: &Path, page_number: usize) -> Result<String>;

    fn recognize_text(&self, image: &Path, lang: &str) -> Result<String>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PopplerBackend;

impl PdfBackend for PopplerBackend {
    fn rasterize(
        &self,
        pdf: &Path,
        pages: PageSpan,
        dpi: u32,
        out_dir: &Path,
    ) -> Result<Vec<PathBuf>> {
        let mut command = Command::new("pdftoppm");
        command
            .arg("-r")
            .arg(dpi.to_string())
            .arg("-png")
            .arg("-f")
            .arg(pages.first.to_string());
        if let Some(last) = pages.last {
            command.arg("-l").arg(last.to_string());
        }
        command.arg(pdf).arg(out_dir.join(PAGE_PREFIX));

        let output = command
            .output()
            .with_context(|| format!("failed to execute pdftoppm for {}", pdf.display()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "pdftoppm returned non-zero exit status for {}: {}",
                pdf.display(),
                stderr.trim()
            );
        }

        let images = collect_rendered_pages(out_dir)?;
        if images.is_empty() {
            bail!("pdftoppm produced no page images for {}", pdf.display());
        }

        Ok(images)
    }

    fn page_text(&self, pdf: &Path, page_number: usize) -> Result<String> {
        let output = Command::new("pdftotext")
            .arg("-layout")
            .arg("-enc")
            .arg("UTF-8")
            .arg("-f")
            .arg(page_number.to_string())
            .arg("-l")
            .arg(page_number.to_string())
            .arg(pdf)
            .arg("-")
            .output()
            .with_context(|| format!("failed to execute pdftotext for {}", pdf.display()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "pdftotext returned non-zero exit status for {} page {}: {}",
                pdf.display(),
                page_number,
                stderr.trim()
            );
        }

        Ok(String::from_utf8_lossy(&output.stdout)
            .replace(['\u{000C}', '\u{0000}'], ""))
    }

    fn recognize_text(&self, image: &Path, lang: &str) -> Result<String> {
        let output = Command::new("tesseract")
            .arg(image)
            .arg("stdout")
            .arg("-l")
            .arg(lang)
            .output()
            .with_context(|| format!("failed to execute tesseract for {}", image.display()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "tesseract returned non-zero exit status for {}: {}",
                image.display(),
                stderr.trim()
            );
        }

        Ok(String::from_utf8_lossy(&output.stdout).replace('\u{0000}', ""))
    }
}

impl PopplerBackend {
    pub fn tool_versions(&self) -> ToolVersions {
        ToolVersions {
            pdftoppm: command_version_optional("pdftoppm", &["-v"]),
            pdftotext: command_version_optional("pdftotext", &["-v"]),
            tesseract: command_version_optional("tesseract", &["--version"]),
        }
    }
}

fn collect_rendered_pages(out_dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(out_dir)
        .with_context(|| format!("failed to read {}", out_dir.display()))?;

    let mut numbered = Vec::new();
    for entry in entries {
        let entry =
            entry.with_context(|| format!("failed to read entry in {}", out_dir.display()))?;
        let path = entry.path();
        if let Some(page) = rendered_page_number(&path) {
            numbered.push((page, path));
        }
    }

    numbered.sort_by_key(|(page, _)| *page);
    Ok(numbered.into_iter().map(|(_, path)| path).collect())
}

fn rendered_page_number(path: &Path) -> Option<usize> {
    let is_png = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("png"))
        .unwrap_or(false);
    if !is_png {
        return None;
    }

    let stem = path.file_stem()?.to_str()?;
    let (prefix, number) = stem.rsplit_once('-')?;
    if prefix != PAGE_PREFIX {
        return None;
    }
    number.parse::<usize>().ok()
}

fn command_version_optional(program: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(program).args(args).output().ok()?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    let source = if stdout.trim().is_empty() {
        stderr.trim()
    } else {
        stdout.trim()
    };

    source
        .lines()
        .next()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| line.to_string())
}
