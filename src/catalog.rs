use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::layout::ResourceLayout;
use crate::model::HelpEntry;
use crate::naming::{IMAGE_EXTENSION, text_filename_for};

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<HelpEntry>,
}

impl Catalog {
    pub fn new(entries: Vec<HelpEntry>) -> Self {
        Self { entries }
    }

    pub fn load(layout: &ResourceLayout, pdf_stem: &str) -> Self {
        let folder = layout.output_dir_for(pdf_stem);
        let Ok(read_dir) = fs::read_dir(&folder) else {
            debug!(folder = %folder.display(), "manual folder missing");
            return Self::default();
        };

        let suffix = format!(".{IMAGE_EXTENSION}");
        let mut image_filenames = read_dir
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| entry.file_name().to_str().map(ToOwned::to_owned))
            .filter(|name| name.ends_with(&suffix))
            .collect::<Vec<_>>();
        image_filenames.sort();

        let entries = image_filenames
            .into_iter()
            .map(|filename| {
                let stem = filename.strip_suffix(&suffix).unwrap_or(&filename);
                HelpEntry {
                    title: title_from_stem(stem),
                    description: read_description(&folder.join(text_filename_for(&filename))),
                    image_path: layout.relative_image_path(pdf_stem, &filename),
                }
            })
            .collect::<Vec<_>>();

        info!(manual = %pdf_stem, entries = entries.len(), "loaded help entries");
        Self::new(entries)
    }

    pub fn entries(&self) -> &[HelpEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub fn title_from_stem(stem: &str) -> String {
    stem.replace('_', " ").to_uppercase()
}

fn read_description(text_path: &Path) -> String {
    fs::read_to_string(text_path)
        .map(|content| content.trim().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::naming::sanitize_title;

    fn write_entry(folder: &Path, title: &str, description: Option<&str>) {
        let image = sanitize_title(title);
        fs::write(folder.join(&image), b"png").expect("image should be written");
        if let Some(description) = description {
            fs::write(folder.join(text_filename_for(&image)), description)
                .expect("text should be written");
        }
    }

    #[test]
    fn round_trips_title_and_description() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let layout = ResourceLayout::new(dir.path());
        let folder = layout.output_dir_for("pos_manual");
        fs::create_dir_all(&folder).expect("folder should be created");
        write_entry(&folder, "Low Stock Alerts", Some("Go to Settings > Inventory"));

        let catalog = Catalog::load(&layout, "pos_manual");
        assert_eq!(catalog.len(), 1);
        let entry = &catalog.entries()[0];
        assert_eq!(entry.title, "LOW STOCK ALERTS");
        assert_eq!(entry.description, "Go to Settings > Inventory");
        assert_eq!(
            entry.image_path,
            PathBuf::from("images/pos_manual/low_stock_alerts.png")
        );
    }

    #[test]
    fn missing_text_file_gives_empty_description_and_other_files_are_ignored() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let layout = ResourceLayout::new(dir.path());
        let folder = layout.output_dir_for("manual");
        fs::create_dir_all(&folder).expect("folder should be created");
        write_entry(&folder, "Refunds", None);
        write_entry(&folder, "Daily Report", Some("\n  Print the Z report.\n\n"));
        fs::write(folder.join("notes.md"), "ignored").expect("stray file should be written");

        let catalog = Catalog::load(&layout, "manual");
        let titles = catalog
            .entries()
            .iter()
            .map(|entry| (entry.title.as_str(), entry.description.as_str()))
            .collect::<Vec<_>>();
        assert_eq!(
            titles,
            vec![("DAILY REPORT", "Print the Z report."), ("REFUNDS", "")]
        );
    }

    #[test]
    fn titles_differing_only_in_case_are_kept() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let layout = ResourceLayout::new(dir.path());
        let folder = layout.output_dir_for("manual");
        fs::create_dir_all(&folder).expect("folder should be created");
        fs::write(folder.join("setup.png"), b"a").expect("image should be written");
        fs::write(folder.join("Setup.png"), b"b").expect("image should be written");

        let catalog = Catalog::load(&layout, "manual");
        assert_eq!(catalog.len(), 2);
        assert!(catalog.entries().iter().all(|entry| entry.title == "SETUP"));
    }

    #[test]
    fn missing_folder_is_an_empty_catalog() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let layout = ResourceLayout::new(dir.path());
        assert!(Catalog::load(&layout, "nothing_here").is_empty());
    }
}
