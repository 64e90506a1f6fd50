use std::cmp::Ordering;

use serde::Serialize;

use crate::catalog::Catalog;
use crate::model::HelpEntry;
use crate::similarity;

pub const MATCH_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Match<'a> {
    pub score: f64,
    pub entry: &'a HelpEntry,
}

pub fn normalize_query(query: &str) -> String {
    query
        .to_lowercase()
        .replacen("how to", "", 1)
        .replacen("how", "", 1)
        .trim()
        .to_string()
}

pub fn normalize_title(title: &str) -> String {
    title
        .to_lowercase()
        .replace(['_', '-'], " ")
        .trim()
        .to_string()
}

pub fn ranked_matches<'a>(query: &str, catalog: &'a Catalog) -> Vec<Match<'a>> {
    let query = normalize_query(query);

    let mut candidates = catalog
        .entries()
        .iter()
        .filter_map(|entry| {
            let title = normalize_title(&entry.title);
            let score = similarity::ratio(&query, &title);
            if title.contains(query.as_str()) || score > MATCH_THRESHOLD {
                Some(Match { score, entry })
            } else {
                None
            }
        })
        .collect::<Vec<_>>();

    candidates.sort_by(compare_descending);
    candidates
}

pub fn best_match<'a>(query: &str, catalog: &'a Catalog) -> Option<Match<'a>> {
    ranked_matches(query, catalog).into_iter().next()
}

fn compare_descending(left: &Match<'_>, right: &Match<'_>) -> Ordering {
    right
        .score
        .partial_cmp(&left.score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| right.entry.title.cmp(&left.entry.title))
        .then_with(|| right.entry.description.cmp(&left.entry.description))
        .then_with(|| right.entry.image_path.cmp(&left.entry.image_path))
}
