use std::path::Path;

use anyhow::{Context, Result};
use image::{GrayImage, Luma, RgbImage};
use tracing::{debug, info, warn};

use super::ImportSettings;
use super::backend::{PageSpan, PdfBackend};
use super::toc::TocLineParser;
use crate::model::TocEntry;

pub fn extract_toc_with_ocr<B: PdfBackend>(
    backend: &B,
    parser: &TocLineParser,
    pdf_path: &Path,
    settings: &ImportSettings,
) -> Vec<TocEntry> {
    info!(
        pdf = %pdf_path.display(),
        pages = settings.toc_scan_pages,
        "using OCR to extract toc from leading pages"
    );

    match ocr_leading_lines(backend, pdf_path, settings) {
        Ok(lines) => parser.parse_lines(lines).collect(),
        Err(err) => {
            warn!(pdf = %pdf_path.display(), error = %err, "OCR extraction failed");
            Vec::new()
        }
    }
}

fn ocr_leading_lines<B: PdfBackend>(
    backend: &B,
    pdf_path: &Path,
    settings: &ImportSettings,
) -> Result<Vec<String>> {
    let scratch = tempfile::tempdir().context("failed to create OCR scratch directory")?;
    let pages = backend.rasterize(
        pdf_path,
        PageSpan::leading(settings.toc_scan_pages),
        settings.dpi,
        scratch.path(),
    )?;

    let mut lines = Vec::new();
    for (index, page_image) in pages.iter().enumerate() {
        let prepared = scratch.path().join(format!("ocr-{:04}.png", index + 1));
        prepare_for_ocr(page_image, &prepared)?;

        let text = backend
            .recognize_text(&prepared, &settings.ocr_lang)
            .with_context(|| format!("OCR failed for page {}", index + 1))?;
        debug!(page = index + 1, chars = text.len(), "recognized page text");
        lines.extend(text.lines().map(str::to_string));
    }

    Ok(lines)
}

pub fn prepare_for_ocr(source: &Path, target: &Path) -> Result<()> {
    let gray = image::open(source)
        .with_context(|| format!("failed to decode page image {}", source.display()))?
        .to_rgb8();

    autocontrast(grayscale(&gray))
        .save(target)
        .with_context(|| format!("failed to write OCR image {}", target.display()))
}

// ITU-R 601-2 luma (299/587/114) in 16-bit fixed point, rounded.
pub fn grayscale(image: &RgbImage) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        let [red, green, blue] = image.get_pixel(x, y).0;
        let level = (u32::from(red) * 19595
            + u32::from(green) * 38470
            + u32::from(blue) * 7471
            + 0x8000)
            >> 16;
        Luma([level as u8])
    })
}

pub fn autocontrast(mut image: GrayImage) -> GrayImage {
    let mut low = u8::MAX;
    let mut high = u8::MIN;
    for pixel in image.pixels() {
        low = low.min(pixel.0[0]);
        high = high.max(pixel.0[0]);
    }

    if high <= low {
        return image;
    }

    let span = u32::from(high - low);
    let mut lut = [0_u8; 256];
    for (level, slot) in lut.iter_mut().enumerate() {
        let shifted = (level as u32).saturating_sub(u32::from(low));
        *slot = (shifted * 255 / span).min(255) as u8;
    }

    for pixel in image.pixels_mut() {
        pixel.0[0] = lut[pixel.0[0] as usize];
    }
    image
}
