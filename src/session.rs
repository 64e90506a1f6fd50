use std::collections::HashSet;
use std::path::PathBuf;

use anyhow::{Result, bail};
use serde::Serialize;
use tracing::{debug, info};

use crate::catalog::Catalog;
use crate::format::{Block, format_description, not_found_message, title_case};
use crate::layout::{ResourceLayout, pdf_stem};
use crate::matcher::best_match;
use crate::timeline::{Effect, QueryId, Timeline};

pub const EMPTY_QUERY_WARNING: &str = "Please enter a help topic.";

#[derive(Debug, Default)]
pub struct History {
    seen: HashSet<String>,
    items: Vec<String>,
}

impl History {
    pub fn items(&self) -> &[String] {
        &self.items
    }

    fn add(&mut self, display: &str) -> bool {
        let key = display.trim().to_lowercase();
        if key.is_empty() || !self.seen.insert(key) {
            return false;
        }
        self.items.push(display.to_string());
        true
    }

    fn clear(&mut self) {
        self.seen.clear();
        self.items.clear();
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Reply {
    Found {
        title: String,
        score: f64,
        blocks: Vec<Block>,
        image: Option<PathBuf>,
    },
    NotFound {
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Typing { query_id: QueryId, text: String },
    Reply { query_id: QueryId, query: String, reply: Reply },
}

#[derive(Debug)]
pub struct Session {
    layout: ResourceLayout,
    selected: Option<String>,
    catalog: Catalog,
    history: History,
    timeline: Timeline,
}

impl Session {
    pub fn new(layout: ResourceLayout) -> Self {
        Self {
            layout,
            selected: None,
            catalog: Catalog::default(),
            history: History::default(),
            timeline: Timeline::new(),
        }
    }

    pub fn layout(&self) -> &ResourceLayout {
        &self.layout
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn is_idle(&self) -> bool {
        self.timeline.is_idle()
    }

    pub fn select_pdf(&mut self, pdf: &str) -> String {
        let stem = pdf_stem(pdf);
        self.catalog = Catalog::load(&self.layout, &stem);
        self.history.clear();
        for entry in self.catalog.entries() {
            self.history.add(&title_case(&entry.title));
        }
        self.selected = Some(stem);

        info!(pdf = %pdf, entries = self.catalog.len(), "selected manual");
        format!("Selected PDF: {pdf}")
    }

    pub fn submit(&mut self, raw_query: &str) -> Result<SessionEvent> {
        let query = raw_query.trim();
        if query.is_empty() {
            bail!(EMPTY_QUERY_WARNING);
        }

        self.history.add(query);
        let query_id = self.timeline.schedule_query(query);
        debug!(query_id, query = %query, "query scheduled");

        Ok(SessionEvent::Typing {
            query_id,
            text: typing_text(0),
        })
    }

    pub fn next_due_ms(&self) -> Option<u64> {
        self.timeline.next_due_ms()
    }

    pub fn now_ms(&self) -> u64 {
        self.timeline.now_ms()
    }

    pub fn advance(&mut self, elapsed_ms: u64) -> Vec<SessionEvent> {
        self.timeline
            .advance(elapsed_ms)
            .into_iter()
            .map(|effect| match effect {
                Effect::Typing { query_id, dots } => SessionEvent::Typing {
                    query_id,
                    text: typing_text(dots),
                },
                Effect::Respond { query_id, query } => {
                    let reply = self.respond(&query);
                    SessionEvent::Reply {
                        query_id,
                        query,
                        reply,
                    }
                }
            })
            .collect()
    }

    pub fn respond(&self, query: &str) -> Reply {
        let Some(found) = best_match(query, &self.catalog) else {
            return Reply::NotFound {
                message: not_found_message(query),
            };
        };

        let image = Some(self.layout.resolve(&found.entry.image_path)).filter(|path| path.exists());
        Reply::Found {
            title: found.entry.title.clone(),
            score: found.score,
            blocks: format_description(&found.entry.description),
            image,
        }
    }

    #[cfg(test)]
    fn replace_catalog(&mut self, catalog: Catalog) {
        self.catalog = catalog;
    }
}

fn typing_text(dots: usize) -> String {
    format!("Typing{}", ".".repeat(dots))
}
