use std::io::{self, Write};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::catalog::Catalog;
use crate::cli::ListArgs;
use crate::layout::{ResourceLayout, pdf_stem};
use crate::util::directory_is_populated;

#[derive(Debug, Clone, Serialize)]
pub struct ManualSummary {
    pub filename: String,
    pub imported: bool,
    pub entry_count: usize,
}

pub fn run(args: ListArgs) -> Result<()> {
    let layout = ResourceLayout::new(&args.res_root);
    let manuals = summarize_manuals(&layout)?;
    info!(res_root = %layout.root().display(), pdf_count = manuals.len(), "listed manuals");

    let mut output = io::BufWriter::new(io::stdout().lock());
    if args.json {
        serde_json::to_writer_pretty(&mut output, &manuals)
            .context("failed to serialize manual list")?;
        writeln!(output)?;
    } else {
        write_manual_lines(&mut output, &manuals)?;
    }
    output.flush()?;
    Ok(())
}

pub fn summarize_manuals(layout: &ResourceLayout) -> Result<Vec<ManualSummary>> {
    Ok(layout
        .list_available_pdfs()?
        .into_iter()
        .map(|filename| {
            let stem = pdf_stem(&filename);
            ManualSummary {
                imported: directory_is_populated(&layout.output_dir_for(&stem)),
                entry_count: Catalog::load(layout, &stem).len(),
                filename,
            }
        })
        .collect())
}

pub fn write_manual_lines<W: Write>(output: &mut W, manuals: &[ManualSummary]) -> Result<()> {
    if manuals.is_empty() {
        writeln!(output, "No PDF files found.")?;
        return Ok(());
    }

    for manual in manuals {
        if manual.imported {
            writeln!(output, "{}\t{} entries", manual.filename, manual.entry_count)?;
        } else {
            writeln!(output, "{}\tnot imported", manual.filename)?;
        }
    }
    Ok(())
}
