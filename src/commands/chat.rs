use std::io::{self, BufRead, Write};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{info, warn};

use super::ask::write_reply;
use super::import::{ImportSettings, import_and_record};
use super::list::{summarize_manuals, write_manual_lines};
use crate::cli::ChatArgs;
use crate::layout::ResourceLayout;
use crate::session::{Session, SessionEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ShellCommand<'a> {
    List,
    Select(&'a str),
    History,
    Again(&'a str),
    Quit,
    Query(&'a str),
}

fn parse_command(line: &str) -> ShellCommand<'_> {
    let trimmed = line.trim();
    match trimmed {
        ":list" => ShellCommand::List,
        ":history" => ShellCommand::History,
        ":quit" | ":q" => ShellCommand::Quit,
        _ => {
            if let Some(name) = command_argument(trimmed, ":pdf ") {
                ShellCommand::Select(name)
            } else if let Some(index) = command_argument(trimmed, ":again ") {
                ShellCommand::Again(index)
            } else {
                ShellCommand::Query(line)
            }
        }
    }
}

fn command_argument<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    line.strip_prefix(prefix)
        .map(str::trim)
        .filter(|argument| !argument.is_empty())
}

pub fn run(args: ChatArgs) -> Result<()> {
    let layout = ResourceLayout::new(&args.res_root);

    if args.skip_import {
        info!("skipping import");
    } else {
        import_and_record(
            &layout,
            ImportSettings::from(&args.options),
            None,
            render_chat_command(&args),
        )?;
    }

    let mut session = Session::new(layout);
    let stdin = io::stdin();
    let mut output = io::stdout().lock();
    run_shell(
        &mut session,
        args.pdf.as_deref(),
        stdin.lock(),
        &mut output,
        thread::sleep,
    )
}

fn run_shell<R, W, S>(
    session: &mut Session,
    initial_pdf: Option<&str>,
    input: R,
    output: &mut W,
    mut sleep: S,
) -> Result<()>
where
    R: BufRead,
    W: Write,
    S: FnMut(Duration),
{
    write_manual_lines(output, &summarize_manuals(session.layout())?)?;
    if let Some(pdf) = initial_pdf {
        writeln!(output, "{}", session.select_pdf(pdf))?;
    }
    output.flush()?;

    for line in input.lines() {
        let line = line.context("failed to read from stdin")?;
        match parse_command(&line) {
            ShellCommand::Quit => break,
            ShellCommand::List => {
                write_manual_lines(output, &summarize_manuals(session.layout())?)?
            }
            ShellCommand::Select(pdf) => writeln!(output, "{}", session.select_pdf(pdf))?,
            ShellCommand::History => {
                for (index, item) in session.history().items().iter().enumerate() {
                    writeln!(output, "{}. {item}", index + 1)?;
                }
            }
            ShellCommand::Again(index) => match recall_history(session, index) {
                Some(query) => submit_query(session, &query, output, &mut sleep)?,
                None => {
                    warn!(index = %index, "history item not found");
                    writeln!(output, "No history item {index}.")?;
                }
            },
            ShellCommand::Query(query) => submit_query(session, query, output, &mut sleep)?,
        }
        output.flush()?;
    }

    Ok(())
}

fn recall_history(session: &Session, index: &str) -> Option<String> {
    let position = index.parse::<usize>().ok()?.checked_sub(1)?;
    session.history().items().get(position).cloned()
}

fn submit_query<W, S>(session: &mut Session, query: &str, output: &mut W, sleep: &mut S) -> Result<()>
where
    W: Write,
    S: FnMut(Duration),
{
    if session.selected().is_none() {
        warn!("no manual selected; use :pdf <name>");
    }

    match session.submit(query) {
        Ok(event) => {
            write_event(output, &event)?;
            drain_timeline(session, output, sleep)
        }
        Err(err) => {
            warn!(error = %err, "query rejected");
            writeln!(output, "{err}")?;
            Ok(())
        }
    }
}

fn drain_timeline<W, S>(session: &mut Session, output: &mut W, sleep: &mut S) -> Result<()>
where
    W: Write,
    S: FnMut(Duration),
{
    while !session.is_idle() {
        let now_ms = session.now_ms();
        let wait_ms = session.next_due_ms().unwrap_or(now_ms).saturating_sub(now_ms);
        sleep(Duration::from_millis(wait_ms));
        for event in session.advance(wait_ms) {
            write_event(output, &event)?;
        }
        output.flush()?;
    }
    Ok(())
}

fn write_event<W: Write>(output: &mut W, event: &SessionEvent) -> Result<()> {
    match event {
        SessionEvent::Typing { text, .. } => writeln!(output, "{text}")?,
        SessionEvent::Reply { reply, .. } => write_reply(output, reply)?,
    }
    Ok(())
}

fn render_chat_command(args: &ChatArgs) -> String {
    [
        "manualhelp".to_string(),
        "chat".to_string(),
        "--res-root".to_string(),
        args.res_root.display().to_string(),
        "--toc-scan-pages".to_string(),
        args.options.toc_scan_pages.to_string(),
        "--dpi".to_string(),
        args.options.dpi.to_string(),
        "--ocr-lang".to_string(),
        args.options.ocr_lang.clone(),
    ]
    .join(" ")
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn seeded_session(dir: &std::path::Path) -> Session {
        fs::write(dir.join("pos.pdf"), b"%PDF").expect("pdf should be written");
        let layout = ResourceLayout::new(dir);
        let folder = layout.output_dir_for("pos");
        fs::create_dir_all(&folder).expect("folder should be created");
        fs::write(folder.join("refunds.png"), b"png").expect("image should be written");
        fs::write(folder.join("refunds.txt"), "- Open Orders").expect("text should be written");
        Session::new(layout)
    }

    fn transcript(session: &mut Session, initial_pdf: Option<&str>, input: &str) -> (String, Vec<Duration>) {
        let mut output = Vec::new();
        let mut waits = Vec::new();
        run_shell(session, initial_pdf, input.as_bytes(), &mut output, |wait| {
            waits.push(wait)
        })
        .expect("shell should run");
        (String::from_utf8(output).expect("output should be utf-8"), waits)
    }

    #[test]
    fn shell_commands_are_recognized() {
        assert_eq!(parse_command(" :list "), ShellCommand::List);
        assert_eq!(parse_command(":pdf pos.pdf"), ShellCommand::Select("pos.pdf"));
        assert_eq!(parse_command(":history"), ShellCommand::History);
        assert_eq!(parse_command(":quit"), ShellCommand::Quit);
        assert_eq!(parse_command(":again 2 "), ShellCommand::Again("2"));
        assert_eq!(parse_command(":again"), ShellCommand::Query(":again"));
        assert_eq!(parse_command(":pdf "), ShellCommand::Query(":pdf "));
        assert_eq!(parse_command("refunds"), ShellCommand::Query("refunds"));
    }

    #[test]
    fn query_prints_indicator_frames_then_reply() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let mut session = seeded_session(dir.path());

        let (output, waits) = transcript(&mut session, Some("pos.pdf"), "how to refunds\n:quit\nrefunds\n");

        let image = dir.path().join("images/pos/refunds.png");
        assert_eq!(
            output,
            format!(
                "pos.pdf\t1 entries\nSelected PDF: pos.pdf\nTyping\nTyping.\nTyping..\nREFUNDS\t(score 1.000)\n• Open Orders\nImage: {}\n",
                image.display()
            )
        );
        assert_eq!(waits, vec![Duration::from_millis(500); 3]);
        assert!(session.is_idle());
    }

    #[test]
    fn blank_query_warns_and_schedules_nothing() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let mut session = seeded_session(dir.path());

        let (output, waits) = transcript(&mut session, None, "   \n");

        assert!(output.ends_with("Please enter a help topic.\n"));
        assert!(waits.is_empty());
    }

    #[test]
    fn selection_and_history_commands() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let mut session = seeded_session(dir.path());

        let (output, _) = transcript(&mut session, None, ":pdf pos\nlow stock\n:history\n");

        assert!(output.contains("Selected PDF: pos\n"));
        assert!(output.contains("No match found for 'low stock'.\n"));
        assert!(output.ends_with("1. Refunds\n2. low stock\n"));
    }

    #[test]
    fn recalled_history_item_is_asked_again() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let mut session = seeded_session(dir.path());

        let (output, waits) = transcript(&mut session, Some("pos"), ":again 1\n:again 7\n");

        let image = dir.path().join("images/pos/refunds.png");
        assert_eq!(
            output,
            format!(
                "pos.pdf\t1 entries\nSelected PDF: pos\nTyping\nTyping.\nTyping..\nREFUNDS\t(score 1.000)\n• Open Orders\nImage: {}\nNo history item 7.\n",
                image.display()
            )
        );
        assert_eq!(waits.len(), 3);
        assert_eq!(session.history().items(), ["Refunds"]);
    }
}
