//! Markdown rendering and front-matter reading for stored posts.
//!
//! The file format is a compatibility surface: front matter delimited by
//! `---` lines with `author`, `date`, `source`, `media_type` (plus
//! `reactions`/`comments` when nonzero), a blank line, the post body, a
//! trailing `---`, and a one-line engagement summary.

use crate::domain::Post;

/// Render a post to its on-disk markdown representation.
pub fn render(post: &Post) -> String {
    let mut lines: Vec<String> = vec![
        "---".to_string(),
        format!("author: {}", post.author),
        format!("date: {}", post.date.format("%Y-%m-%d")),
        format!("source: {}", post.source_url),
        format!("media_type: {}", post.media_type),
    ];

    if !post.media_link.is_empty() {
        lines.push(format!("media_link: {}", post.media_link));
    }
    if post.reactions > 0 {
        lines.push(format!("reactions: {}", post.reactions));
    }
    if post.comments > 0 {
        lines.push(format!("comments: {}", post.comments));
    }

    lines.push("---".to_string());
    lines.push(String::new());

    if post.content.is_empty() {
        lines.push("*(No text content)*".to_string());
    } else {
        lines.push(post.content.clone());
    }

    lines.push(String::new());
    lines.push("---".to_string());
    lines.push(format!(
        "*Reactions: {} | Comments: {} | Reposts: {}*",
        post.reactions, post.comments, post.reposts
    ));
    lines.push(String::new());

    lines.join("\n")
}

/// Read the `source:` value out of a stored file's front matter.
///
/// Returns `None` for files without a front-matter block or without a
/// source line; such files are left alone but never counted as duplicates.
pub fn front_matter_source(contents: &str) -> Option<String> {
    let rest = contents.strip_prefix("---\n")?;
    let block = match rest.find("\n---") {
        Some(end) => &rest[..end],
        None => return None,
    };
    for line in block.lines() {
        if let Some(value) = line.strip_prefix("source: ") {
            let value = value.trim();
            if !value.is_empty() {
                return Some(value.to_string());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MediaType;
    use chrono::NaiveDate;

    fn sample_post() -> Post {
        Post {
            author: "Test Author".into(),
            date: NaiveDate::from_ymd_opt(2024, 2, 10).unwrap(),
            date_raw: "2d".into(),
            content: "Test content".into(),
            source_url: "https://www.linkedin.com/feed/update/urn:li:activity:123/".into(),
            media_type: MediaType::None,
            media_link: String::new(),
            reactions: 42,
            comments: 7,
            reposts: 3,
            element_id: "urn:li:activity:123".into(),
        }
    }

    #[test]
    fn test_render_full_format() {
        let text = render(&sample_post());
        let expected = "---\n\
            author: Test Author\n\
            date: 2024-02-10\n\
            source: https://www.linkedin.com/feed/update/urn:li:activity:123/\n\
            media_type: None\n\
            reactions: 42\n\
            comments: 7\n\
            ---\n\
            \n\
            Test content\n\
            \n\
            ---\n\
            *Reactions: 42 | Comments: 7 | Reposts: 3*\n";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_zero_counts_omitted_from_front_matter() {
        let mut post = sample_post();
        post.reactions = 0;
        post.comments = 0;
        post.reposts = 0;
        let text = render(&post);
        assert!(!text.contains("reactions:"));
        assert!(!text.contains("comments:"));
        // The summary line still carries all three counts.
        assert!(text.contains("*Reactions: 0 | Comments: 0 | Reposts: 0*"));
    }

    #[test]
    fn test_media_link_written_when_present() {
        let mut post = sample_post();
        post.media_type = MediaType::Image;
        post.media_link = "https://example.com/i.jpg".into();
        let text = render(&post);
        assert!(text.contains("media_type: Image\n"));
        assert!(text.contains("media_link: https://example.com/i.jpg\n"));
    }

    #[test]
    fn test_empty_content_placeholder() {
        let mut post = sample_post();
        post.content = String::new();
        assert!(render(&post).contains("*(No text content)*"));
    }

    #[test]
    fn test_front_matter_source_round_trip() {
        let text = render(&sample_post());
        assert_eq!(
            front_matter_source(&text).as_deref(),
            Some("https://www.linkedin.com/feed/update/urn:li:activity:123/")
        );
    }

    #[test]
    fn test_front_matter_source_missing() {
        assert_eq!(front_matter_source("no front matter here"), None);
        assert_eq!(front_matter_source("---\nauthor: x\n---\nbody"), None);
    }

    #[test]
    fn test_front_matter_empty_source_ignored() {
        let text = "---\nauthor: x\nsource: \n---\nbody";
        assert_eq!(front_matter_source(text), None);
    }
}
