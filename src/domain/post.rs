use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Media attached to a post, classified from structural markers in the
/// markup. When several markers are present the first match in
/// `MediaType::PRIORITY` wins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaType {
    Image,
    Video,
    Document,
    Poll,
    Article,
    #[default]
    None,
}

impl MediaType {
    /// Classification order when a post carries more than one marker type.
    pub const PRIORITY: [MediaType; 5] = [
        MediaType::Poll,
        MediaType::Document,
        MediaType::Video,
        MediaType::Image,
        MediaType::Article,
    ];
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            MediaType::Image => "Image",
            MediaType::Video => "Video",
            MediaType::Document => "Document",
            MediaType::Poll => "Poll",
            MediaType::Article => "Article",
            MediaType::None => "None",
        };
        f.write_str(s)
    }
}

/// A fully scraped post, ready to be written to disk.
///
/// `source_url` is the identity of the post: the store never keeps two
/// files with the same source. Everything else is best-effort extraction
/// with a default when the markup lacks the element.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub author: String,
    /// Resolved absolute date, computed from the raw relative text and the
    /// capture time.
    pub date: NaiveDate,
    /// The date text as the site displayed it (e.g. "2w").
    pub date_raw: String,
    pub content: String,
    pub source_url: String,
    pub media_type: MediaType,
    pub media_link: String,
    pub reactions: u64,
    pub comments: u64,
    pub reposts: u64,
    pub element_id: String,
}

impl Post {
    pub fn has_content(&self) -> bool {
        !self.content.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_type_display() {
        assert_eq!(MediaType::Image.to_string(), "Image");
        assert_eq!(MediaType::Poll.to_string(), "Poll");
        assert_eq!(MediaType::None.to_string(), "None");
    }

    #[test]
    fn test_media_type_priority_excludes_none() {
        assert!(!MediaType::PRIORITY.contains(&MediaType::None));
        assert_eq!(MediaType::PRIORITY[0], MediaType::Poll);
    }
}
