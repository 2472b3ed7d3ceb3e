//! Autocomplete matching over a static suggestion list.

use crate::tags::validate::same_tag;

/// Candidates containing `query` (case-insensitively) that aren't already tags.
///
/// Source order is preserved and the result is cut at `limit`. An empty query
/// yields nothing.
pub fn match_suggestions(
    query: &str,
    existing: &[String],
    candidates: &[String],
    limit: usize,
    case_sensitive: bool,
) -> Vec<String> {
    if query.is_empty() || candidates.is_empty() {
        return Vec::new();
    }

    let needle = query.to_lowercase();
    candidates
        .iter()
        .filter(|candidate| candidate.to_lowercase().contains(&needle))
        .filter(|candidate| {
            !existing
                .iter()
                .any(|tag| same_tag(tag, candidate, case_sensitive))
        })
        .take(limit)
        .cloned()
        .collect()
}

/// Split of a candidate around the first case-insensitive occurrence of the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Highlight<'a> {
    pub before: &'a str,
    pub matched: &'a str,
    pub after: &'a str,
}

/// Locates the highlighted span; byte offsets always fall on `candidate`'s own
/// char boundaries even when lowercasing changes lengths.
pub fn highlight<'a>(candidate: &'a str, query: &str) -> Option<Highlight<'a>> {
    let needle: Vec<char> = query.chars().flat_map(char::to_lowercase).collect();
    if needle.is_empty() {
        return None;
    }

    for (start, _) in candidate.char_indices() {
        let mut folded: Vec<char> = Vec::with_capacity(needle.len());
        let mut end = start;
        for (offset, ch) in candidate[start..].char_indices() {
            if folded.len() >= needle.len() {
                break;
            }
            folded.extend(ch.to_lowercase());
            end = start + offset + ch.len_utf8();
        }
        if folded == needle {
            return Some(Highlight {
                before: &candidate[..start],
                matched: &candidate[start..end],
                after: &candidate[end..],
            });
        }
    }
    None
}

/// Currently visible suggestions and the keyboard highlight.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuggestionView {
    items: Vec<String>,
    active: Option<usize>,
}

impl SuggestionView {
    pub fn new(items: Vec<String>) -> Self {
        Self { items, active: None }
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn is_visible(&self) -> bool {
        !self.items.is_empty()
    }

    pub fn active(&self) -> Option<usize> {
        self.active
    }

    pub fn active_item(&self) -> Option<&str> {
        self.active
            .and_then(|index| self.items.get(index))
            .map(String::as_str)
    }

    /// Moves the highlight by `delta`, saturating at "none" and at the last item.
    pub fn move_active(&mut self, delta: isize) {
        if self.items.is_empty() {
            return;
        }
        let current = self.active.map_or(-1, |index| index as isize);
        let last = self.items.len() as isize - 1;
        let next = (current + delta).clamp(-1, last);
        self.active = usize::try_from(next).ok();
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.active = None;
    }
}
