//! Rendering reranked matches into the context text handed to the model.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::document::{
    CONTEXTUAL_SUMMARY_KEY, DOCUMENT_ID_KEY, ORIGINAL_TEXT_KEY, RerankedMatch, SOURCE_FILE_KEY,
};

/// Marker appended to a body cut at the character budget.
pub const ELLIPSIS: &str = "...";

/// Separator placed between rendered match blocks.
pub const BLOCK_SEPARATOR: &str = "\n\n";

/// Rendered context for one retrieval: one block per reranked match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattedContext {
    blocks: Vec<String>,
}

impl FormattedContext {
    /// Render `matches` in the order given.
    pub fn render(matches: &[RerankedMatch], body_char_budget: usize) -> Self {
        let blocks = matches
            .iter()
            .enumerate()
            .map(|(i, m)| render_block(i + 1, m, body_char_budget))
            .collect();
        Self { blocks }
    }

    /// The rendered blocks, in presentation order.
    pub fn blocks(&self) -> &[String] {
        &self.blocks
    }

    /// Number of rendered matches.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Whether no match was rendered.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

impl fmt::Display for FormattedContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.blocks.join(BLOCK_SEPARATOR))
    }
}

/// Cut `body` to at most `budget` characters, appending [`ELLIPSIS`] when cut.
///
/// Counts `char`s, so multi-byte text is never split inside a code point.
pub fn truncate_body(body: &str, budget: usize) -> String {
    match body.char_indices().nth(budget) {
        Some((byte_idx, _)) => format!("{}{ELLIPSIS}", &body[..byte_idx]),
        None => body.to_string(),
    }
}

fn render_block(sequence: usize, m: &RerankedMatch, body_char_budget: usize) -> String {
    let hit = &m.original_match;
    let source = hit.field(SOURCE_FILE_KEY).unwrap_or("unknown");
    let document_id = hit.field(DOCUMENT_ID_KEY).unwrap_or("unknown");
    let body = truncate_body(hit.field(ORIGINAL_TEXT_KEY).unwrap_or(""), body_char_budget);

    let mut block =
        format!("{sequence}\n\nID: {}\nDocument: {source} (ID: {document_id})\n", hit.id);
    if let Some(summary) = hit.field(CONTEXTUAL_SUMMARY_KEY) {
        block.push_str(&format!("Contextual summary: {summary}\n"));
    }
    block.push_str(&format!("Content: {body}"));
    block
}
