use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "manualhelp",
    version,
    about = "Turn instruction-manual PDFs into a searchable help catalog"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Import(ImportArgs),
    List(ListArgs),
    Ask(AskArgs),
    Chat(ChatArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ImportOptions {
    #[arg(long, default_value_t = 8)]
    pub toc_scan_pages: usize,

    #[arg(long, default_value_t = 200)]
    pub dpi: u32,

    #[arg(long, default_value = "eng")]
    pub ocr_lang: String,
}

#[derive(Args, Debug, Clone)]
pub struct ImportArgs {
    #[arg(long, default_value = "res")]
    pub res_root: PathBuf,

    #[command(flatten)]
    pub options: ImportOptions,

    #[arg(long)]
    pub report_path: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    #[arg(long, default_value = "res")]
    pub res_root: PathBuf,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct AskArgs {
    #[arg(long, default_value = "res")]
    pub res_root: PathBuf,

    #[arg(long)]
    pub pdf: String,

    #[arg(long)]
    pub query: String,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ChatArgs {
    #[arg(long, default_value = "res")]
    pub res_root: PathBuf,

    #[arg(long)]
    pub pdf: Option<String>,

    #[command(flatten)]
    pub options: ImportOptions,

    #[arg(long, default_value_t = false)]
    pub skip_import: bool,
}
