use serde::{Deserialize, Serialize};

/// Lightweight scan-phase record: enough to show a selection list without
/// fetching any post in full. Held in memory only, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostPreview {
    /// Position in the feed at scan time (newest first), used for CLI
    /// selection.
    pub index: usize,
    /// Opaque identifier (a `data-urn` value) stable within one page load,
    /// used to re-locate the post for full scraping.
    pub element_id: String,
    pub author: String,
    /// Truncated text for display only.
    pub snippet: String,
    /// Raw relative date text as shown by the site (e.g. "2h", "3d").
    pub relative_date_text: String,
}

impl PostPreview {
    pub fn display_snippet(&self) -> &str {
        if self.snippet.is_empty() {
            "(no text content)"
        } else {
            &self.snippet
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_snippet_placeholder() {
        let preview = PostPreview {
            index: 0,
            element_id: "urn:li:activity:1".into(),
            author: String::new(),
            snippet: String::new(),
            relative_date_text: "2d".into(),
        };
        assert_eq!(preview.display_snippet(), "(no text content)");
    }
}
