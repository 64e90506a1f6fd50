use std::io::{self, Write};

use anyhow::{Context, Result, bail};
use serde::Serialize;
use tracing::{info, warn};

use crate::cli::AskArgs;
use crate::format::render_blocks;
use crate::layout::ResourceLayout;
use crate::session::{EMPTY_QUERY_WARNING, Reply, Session};

#[derive(Debug, Serialize)]
struct AskResponse<'a> {
    pdf: &'a str,
    query: &'a str,
    catalog_entries: usize,
    reply: &'a Reply,
}

pub fn run(args: AskArgs) -> Result<()> {
    if args.query.trim().is_empty() {
        bail!(EMPTY_QUERY_WARNING);
    }

    let mut session = Session::new(ResourceLayout::new(&args.res_root));
    session.select_pdf(&args.pdf);
    if session.catalog().is_empty() {
        warn!(pdf = %args.pdf, "manual has no imported entries");
    }

    let reply = session.respond(&args.query);
    info!(
        pdf = %args.pdf,
        found = matches!(reply, Reply::Found { .. }),
        "answered query"
    );

    let mut output = io::BufWriter::new(io::stdout().lock());
    if args.json {
        let response = AskResponse {
            pdf: &args.pdf,
            query: &args.query,
            catalog_entries: session.catalog().len(),
            reply: &reply,
        };
        serde_json::to_writer_pretty(&mut output, &response)
            .context("failed to serialize ask json output")?;
        writeln!(output)?;
    } else {
        write_reply(&mut output, &reply)?;
    }
    output.flush()?;
    Ok(())
}

pub fn write_reply<W: Write>(output: &mut W, reply: &Reply) -> Result<()> {
    match reply {
        Reply::Found {
            title,
            score,
            blocks,
            image,
        } => {
            writeln!(output, "{title}\t(score {score:.3})")?;
            let body = render_blocks(blocks);
            if !body.is_empty() {
                write!(output, "{}", body.trim_end())?;
                writeln!(output)?;
            }
            if let Some(image) = image {
                writeln!(output, "Image: {}", image.display())?;
            }
        }
        Reply::NotFound { message } => writeln!(output, "{message}")?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::format::Block;

    fn rendered(reply: &Reply) -> String {
        let mut buffer = Vec::new();
        write_reply(&mut buffer, reply).expect("reply should render");
        String::from_utf8(buffer).expect("output should be utf-8")
    }

    #[test]
    fn found_reply_lists_title_body_and_image() {
        let reply = Reply::Found {
            title: "REFUNDS".to_string(),
            score: 0.8,
            blocks: vec![
                Block::Paragraph("Open Orders".to_string()),
                Block::Bullet("Select the sale".to_string()),
            ],
            image: Some(PathBuf::from("res/images/pos/refunds.png")),
        };

        assert_eq!(
            rendered(&reply),
            "REFUNDS\t(score 0.800)\nOpen Orders\n\n• Select the sale\nImage: res/images/pos/refunds.png\n"
        );
    }

    #[test]
    fn found_reply_without_description_or_image_is_one_line() {
        let reply = Reply::Found {
            title: "REFUNDS".to_string(),
            score: 1.0,
            blocks: Vec::new(),
            image: None,
        };
        assert_eq!(rendered(&reply), "REFUNDS\t(score 1.000)\n");
    }

    #[test]
    fn not_found_prints_the_message() {
        let reply = Reply::NotFound {
            message: "No match found for 'fly'.".to_string(),
        };
        assert_eq!(rendered(&reply), "No match found for 'fly'.\n");
    }
}
