use anyhow::{Context, Result};
use regex::Regex;

use crate::model::TocEntry;

#[derive(Debug)]
pub struct TocLineParser {
    candidate: Regex,
    trailing_page: Regex,
}

impl TocLineParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            candidate: Regex::new(r"^(.*?)\.{2,}|^(.*?)\s{2,}([0-9]{1,3})$")
                .context("failed to compile toc candidate regex")?,
            // Not anchored to the leader: `Intro....1234` reads as page 234.
            trailing_page: Regex::new(r"([0-9]{1,3})$")
                .context("failed to compile toc page-number regex")?,
        })
    }

    pub fn parse_line(&self, line: &str) -> Option<TocEntry> {
        let cleaned = line.trim();

        let captures = self.candidate.captures(cleaned)?;
        let title = captures
            .get(1)
            .or_else(|| captures.get(2))
            .map(|m| m.as_str().trim())
            .unwrap_or("");

        let page_number = self
            .trailing_page
            .captures(cleaned)?
            .get(1)?
            .as_str()
            .parse::<u32>()
            .ok()?;

        Some(TocEntry {
            title: title.to_string(),
            page_number,
        })
    }

    pub fn parse_lines<'a, I, S>(&'a self, lines: I) -> impl Iterator<Item = TocEntry> + 'a
    where
        I: IntoIterator<Item = S>,
        I::IntoIter: 'a,
        S: AsRef<str> + 'a,
    {
        lines
            .into_iter()
            .filter_map(move |line| self.parse_line(line.as_ref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> TocLineParser {
        TocLineParser::new().expect("toc regexes should compile")
    }

    #[test]
    fn dot_leader_line_yields_title_and_page() {
        let entry = parser().parse_line("Title....123").expect("line should parse");
        assert_eq!(entry.title, "Title");
        assert_eq!(entry.page_number, 123);
    }

    #[test]
    fn spaced_line_yields_title_and_page() {
        let entry = parser().parse_line("Title  123").expect("line should parse");
        assert_eq!(entry.title, "Title");
        assert_eq!(entry.page_number, 123);
    }

    #[test]
    fn leader_with_spaces_and_surrounding_whitespace() {
        let entry = parser()
            .parse_line("   Low Stock Alerts ........ 12  ")
            .expect("line should parse");
        assert_eq!(entry.title, "Low Stock Alerts");
        assert_eq!(entry.page_number, 12);
    }

    #[test]
    fn leader_without_trailing_number_is_dropped() {
        assert!(parser().parse_line("Safety notes........").is_none());
        assert!(parser().parse_line("Chapter 3 .... page x").is_none());
    }

    #[test]
    fn trailing_digits_are_found_independently_of_the_leader() {
        let entry = parser()
            .parse_line("Appendix....1234")
            .expect("line should parse");
        assert_eq!(entry.title, "Appendix");
        assert_eq!(entry.page_number, 234);

        let entry = parser()
            .parse_line("v2.. firmware notes 7")
            .expect("line should parse");
        assert_eq!(entry.title, "v2");
        assert_eq!(entry.page_number, 7);
    }

    #[test]
    fn page_numbers_are_ascii_digits_only() {
        assert!(parser().parse_line("Intro....\u{0661}\u{0662}").is_none());
        assert!(parser().parse_line("Title  \u{0661}\u{0662}\u{0663}").is_none());

        let entry = parser()
            .parse_line("Intro....\u{0663}7")
            .expect("ascii tail should parse");
        assert_eq!(entry.page_number, 7);
    }

    #[test]
    fn plain_prose_is_not_a_candidate() {
        assert!(parser().parse_line("Press the power button 3").is_none());
        assert!(parser().parse_line("").is_none());
    }

    #[test]
    fn parse_lines_preserves_input_order() {
        let lines = vec![
            "Contents",
            "Getting Started .......... 3",
            "Printing Receipts ........ 5",
            "not a toc line",
            "Low Stock Alerts  9",
        ];

        let entries = parser().parse_lines(lines).collect::<Vec<_>>();
        let titles = entries
            .iter()
            .map(|entry| (entry.title.as_str(), entry.page_number))
            .collect::<Vec<_>>();
        assert_eq!(
            titles,
            vec![
                ("Getting Started", 3),
                ("Printing Receipts", 5),
                ("Low Stock Alerts", 9)
            ]
        );
    }
}
