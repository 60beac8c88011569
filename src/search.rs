//! Search: embed a query, ask the store for neighbours, present the hits.

use serde::Serialize;
use serde_json::Value;
use store::{Metadata, QueryMatch, TopK};
use tracing::{debug, info};

use crate::{Pipeline, PipelineError};

/// Candidates fetched before the character filter is applied.
pub const CHARACTER_CANDIDATES: u32 = 10;

/// Characters shown in a text preview before it is cut.
pub const PREVIEW_CHARS: usize = 150;

/// Presentation view of one query result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub id: String,
    /// `1 - distance`; assumes the index metric keeps distances in `[0, 1]`.
    pub score: f32,
    pub distance: f32,
    /// Stored `text` metadata, or empty when the document was stored
    /// without it.
    pub text: String,
    pub metadata: Metadata,
}

impl From<QueryMatch> for SearchHit {
    fn from(m: QueryMatch) -> Self {
        let text = m
            .metadata
            .get("text")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        Self {
            id: m.key.clone(),
            score: m.similarity(),
            distance: m.distance,
            text,
            metadata: m.metadata,
        }
    }
}

impl SearchHit {
    /// A string metadata field, if present.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.metadata.get(name).and_then(Value::as_str)
    }

    pub fn title(&self) -> Option<&str> {
        self.field("title")
    }

    pub fn character(&self) -> Option<&str> {
        self.field("character")
    }

    pub fn movie(&self) -> Option<&str> {
        self.field("movie")
    }

    pub fn category(&self) -> Option<&str> {
        self.field("category")
    }

    pub fn preview(&self) -> String {
        preview(&self.text, PREVIEW_CHARS)
    }
}

/// Result of [`Pipeline::search_by_character`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CharacterSearch {
    pub hits: Vec<SearchHit>,
    /// False when no candidate matched and the unfiltered ranking was
    /// returned instead.
    pub filter_applied: bool,
}

impl Pipeline {
    pub async fn search(&self, query: &str, top_k: TopK) -> Result<Vec<SearchHit>, PipelineError> {
        if query.is_empty() {
            return Err(PipelineError::MissingQuery);
        }
        let embedding = self.embedder.embed(query).await?;
        let matches = self.store.query(embedding.as_slice(), top_k).await?;

        info!(
            query_len = query.len(),
            top_k = top_k.get(),
            returned = matches.len(),
            "search_success"
        );
        Ok(matches.into_iter().map(SearchHit::from).collect())
    }

    /// Semantic search for a character profile, narrowed to hits whose
    /// `character` field contains `name` (case-insensitive).
    pub async fn search_by_character(
        &self,
        name: &str,
        k: usize,
    ) -> Result<CharacterSearch, PipelineError> {
        let query = format!("{name} character profile personality");
        let candidates = TopK::clamped(i64::from(CHARACTER_CANDIDATES));
        let hits = self.search(&query, candidates).await?;
        let result = filter_by_character(hits, name, k);
        debug!(
            character = name,
            returned = result.hits.len(),
            filter_applied = result.filter_applied,
            "character_search"
        );
        Ok(result)
    }
}

/// Keeps hits whose `character` contains `name`; falls back to the
/// unfiltered ranking when none do. Both are truncated to `k`.
pub fn filter_by_character(hits: Vec<SearchHit>, name: &str, k: usize) -> CharacterSearch {
    let needle = name.to_lowercase();
    let matching: Vec<SearchHit> = hits
        .iter()
        .filter(|hit| {
            hit.character()
                .is_some_and(|c| c.to_lowercase().contains(&needle))
        })
        .take(k)
        .cloned()
        .collect();

    if matching.is_empty() {
        CharacterSearch {
            hits: hits.into_iter().take(k).collect(),
            filter_applied: false,
        }
    } else {
        CharacterSearch {
            hits: matching,
            filter_applied: true,
        }
    }
}

/// First `max_chars` characters of `text`, with `...` appended when cut.
pub fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
