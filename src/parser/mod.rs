//! Lenient extraction of structured post records from raw feed markup.
//!
//! The source site's markup is unstable, so every field is extracted
//! independently and falls back to a default when its selector is missing.
//! One absent element must never fail the whole record; a completely empty
//! result is the caller's cue to save a debug snapshot.

mod date;

pub use date::resolve_relative_date;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};

use crate::domain::{MediaType, Post};

fn sel(css: &str) -> Selector {
    Selector::parse(css).expect("selector")
}

static SEL_AUTHOR: Lazy<Selector> =
    Lazy::new(|| sel(r#"span[class*="update-components-actor__name"]"#));
static SEL_SUB_DESCRIPTION: Lazy<Selector> =
    Lazy::new(|| sel(r#"span[class*="update-components-actor__sub-description"]"#));
static SEL_HIDDEN: Lazy<Selector> = Lazy::new(|| sel("span.visually-hidden"));
static SEL_BUTTONS: Lazy<Selector> = Lazy::new(|| sel("button[aria-label]"));
static SEL_LINK: Lazy<Selector> = Lazy::new(|| sel("a[href]"));

/// Content selectors in fallback order: description block, then the
/// commentary block, then any text component.
static SEL_CONTENT: Lazy<Vec<Selector>> = Lazy::new(|| {
    vec![
        sel(r#"div[class*="feed-shared-update-v2__description"]"#),
        sel(r#"div[class*="feed-shared-update-v2__commentary"]"#),
        sel(r#"span[class*="update-components-text"]"#),
    ]
});

/// Structural markers for media classification, checked in
/// [`MediaType::PRIORITY`] order. First match wins.
static MEDIA_MARKERS: Lazy<Vec<(MediaType, Selector)>> = Lazy::new(|| {
    vec![
        (MediaType::Poll, sel(r#"div[class*="feed-shared-poll"]"#)),
        (MediaType::Poll, sel(r#"div[class*="update-components-poll"]"#)),
        (
            MediaType::Document,
            sel(r#"div[class*="update-components-document"]"#),
        ),
        (
            MediaType::Video,
            sel(r#"div[class*="update-components-video"]"#),
        ),
        (
            MediaType::Video,
            sel(r#"div[class*="update-components-linkedin-video"]"#),
        ),
        (
            MediaType::Video,
            sel(r#"div[class*="feed-shared-external-video"]"#),
        ),
        (
            MediaType::Image,
            sel(r#"div[class*="update-components-image"]"#),
        ),
        (
            MediaType::Article,
            sel(r#"[class*="update-components-article"]"#),
        ),
    ]
});

static RE_ACTIVITY_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"activity:(\d+)").expect("regex"));

/// Parse one post's raw markup into a [`Post`].
///
/// Pure: no I/O, no clock; the capture time comes in as an argument so
/// date resolution is reproducible. `relative_date_text` is the date string
/// captured during the scan phase; when empty, the markup's own timestamp
/// element is used instead.
pub fn parse_post(
    raw_markup: &str,
    relative_date_text: &str,
    captured_at: DateTime<Utc>,
    element_id: &str,
) -> Post {
    let fragment = Html::parse_fragment(raw_markup);

    let author = fragment
        .select(&SEL_AUTHOR)
        .next()
        .map(|el| prefer_hidden_text(el))
        .unwrap_or_default();

    let date_raw = if relative_date_text.is_empty() {
        fragment
            .select(&SEL_SUB_DESCRIPTION)
            .next()
            .map(|el| prefer_hidden_text(el))
            .unwrap_or_default()
    } else {
        relative_date_text.to_string()
    };
    let date = resolve_relative_date(&date_raw, captured_at);

    let content = SEL_CONTENT
        .iter()
        .filter_map(|s| fragment.select(s).next())
        .map(|el| normalize_whitespace(&text_with_breaks(el)))
        .find(|text| !text.is_empty())
        .unwrap_or_default();

    let (media_type, media_link) = classify_media(&fragment);

    Post {
        author,
        date,
        date_raw,
        content,
        source_url: permalink_from_urn(element_id),
        media_type,
        media_link,
        reactions: engagement_count(&fragment, "reaction"),
        comments: engagement_count(&fragment, "comment"),
        reposts: engagement_count(&fragment, "repost"),
        element_id: element_id.to_string(),
    }
}

/// Canonical permalink for a feed URN like `urn:li:activity:123456`.
/// Empty when the URN carries no activity id; such posts cannot be
/// deduplicated and are saved unconditionally.
pub fn permalink_from_urn(element_id: &str) -> String {
    match RE_ACTIVITY_ID.captures(element_id) {
        Some(caps) => format!(
            "https://www.linkedin.com/feed/update/urn:li:activity:{}/",
            &caps[1]
        ),
        None => String::new(),
    }
}

/// The site renders clean text in a visually-hidden inner span; prefer it
/// over the styled duplicate.
fn prefer_hidden_text(el: ElementRef) -> String {
    let target = el.select(&SEL_HIDDEN).next().unwrap_or(el);
    target.text().collect::<String>().trim().to_string()
}

/// Collect text the way a reader sees it: `<br>` becomes a newline, and
/// the markup's own indentation whitespace collapses to single spaces.
fn text_with_breaks(el: ElementRef) -> String {
    let mut out = String::new();
    collect_text(el, &mut out);
    out
}

fn collect_text(el: ElementRef, out: &mut String) {
    for node in el.children() {
        match node.value() {
            Node::Text(text) => push_collapsed(text, out),
            Node::Element(element) if element.name() == "br" => out.push('\n'),
            Node::Element(_) => {
                if let Some(child) = ElementRef::wrap(node) {
                    collect_text(child, out);
                }
            }
            _ => {}
        }
    }
}

fn push_collapsed(text: &str, out: &mut String) {
    let needs_space = |out: &String| !out.is_empty() && !out.ends_with([' ', '\n']);
    if text.starts_with(char::is_whitespace) && needs_space(out) {
        out.push(' ');
    }
    for word in text.split_whitespace() {
        if needs_space(out) {
            out.push(' ');
        }
        out.push_str(word);
    }
    if text.ends_with(char::is_whitespace) && needs_space(out) {
        out.push(' ');
    }
}

fn normalize_whitespace(text: &str) -> String {
    let mut lines: Vec<&str> = text.lines().map(str::trim).collect();
    // Drop leading/trailing blanks and collapse runs of blank lines.
    while lines.first().is_some_and(|l| l.is_empty()) {
        lines.remove(0);
    }
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    let mut out = Vec::with_capacity(lines.len());
    let mut blank = false;
    for line in lines {
        if line.is_empty() {
            if !blank {
                out.push(line);
            }
            blank = true;
        } else {
            out.push(line);
            blank = false;
        }
    }
    out.join("\n")
}

fn classify_media(fragment: &Html) -> (MediaType, String) {
    for wanted in MediaType::PRIORITY {
        for (media_type, selector) in MEDIA_MARKERS.iter() {
            if *media_type != wanted {
                continue;
            }
            if let Some(el) = fragment.select(selector).next() {
                let link = el
                    .select(&SEL_LINK)
                    .next()
                    .and_then(|a| a.value().attr("href"))
                    .unwrap_or_default()
                    .to_string();
                return (wanted, link);
            }
        }
    }
    (MediaType::None, String::new())
}

/// Pull one engagement count out of the aria-labelled action buttons.
/// Duplicate buttons are common; the last one with visible text wins.
fn engagement_count(fragment: &Html, keyword: &str) -> u64 {
    let mut count = 0;
    for button in fragment.select(&SEL_BUTTONS) {
        let label = button.value().attr("aria-label").unwrap_or_default();
        if !label.to_lowercase().contains(keyword) {
            continue;
        }
        let text = button.text().collect::<String>().trim().to_string();
        if !text.is_empty() {
            count = parse_count(&text);
        }
    }
    count
}

/// Convert abbreviated counters like "1.2K" or "2,345" to integers.
/// Unparseable input counts as zero.
pub(crate) fn parse_count(text: &str) -> u64 {
    let cleaned = text.trim().replace(',', "");
    if cleaned.is_empty() {
        return 0;
    }
    let upper = cleaned.to_uppercase();
    if let Some(prefix) = upper.strip_suffix('K') {
        return prefix
            .trim()
            .parse::<f64>()
            .map(|n| (n * 1_000.0) as u64)
            .unwrap_or(0);
    }
    if let Some(prefix) = upper.strip_suffix('M') {
        return prefix
            .trim()
            .parse::<f64>()
            .map(|n| (n * 1_000_000.0) as u64)
            .unwrap_or(0);
    }
    let digits: String = cleaned.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn capture_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    const SAMPLE_POST: &str = r#"
        <div class="feed-shared-update-v2">
            <div class="update-components-actor">
                <span class="update-components-actor__name">
                    <span class="visually-hidden">John Doe</span>
                </span>
                <span class="update-components-actor__sub-description">
                    <span class="visually-hidden">2d</span>
                </span>
            </div>
            <div class="feed-shared-update-v2__description">
                This is a test post about feed scraping.
                <br>
                It has multiple lines.
            </div>
            <div class="update-components-image">
                <a href="https://example.com/image.jpg">Image</a>
            </div>
            <button aria-label="React Reaction">42</button>
            <button aria-label="Comment on post">7</button>
            <button aria-label="Repost this">3</button>
        </div>
    "#;

    #[test]
    fn test_extracts_author() {
        let post = parse_post(SAMPLE_POST, "", capture_time(), "");
        assert_eq!(post.author, "John Doe");
    }

    #[test]
    fn test_extracts_content_with_line_breaks() {
        let post = parse_post(SAMPLE_POST, "", capture_time(), "");
        assert_eq!(
            post.content,
            "This is a test post about feed scraping.\nIt has multiple lines."
        );
    }

    #[test]
    fn test_extracts_date_from_markup() {
        let post = parse_post(SAMPLE_POST, "", capture_time(), "");
        assert_eq!(post.date_raw, "2d");
        assert_eq!(post.date.to_string(), "2024-06-13");
    }

    #[test]
    fn test_explicit_date_text_wins_over_markup() {
        let post = parse_post(SAMPLE_POST, "1w", capture_time(), "");
        assert_eq!(post.date_raw, "1w");
        assert_eq!(post.date.to_string(), "2024-06-08");
    }

    #[test]
    fn test_extracts_engagement() {
        let post = parse_post(SAMPLE_POST, "", capture_time(), "");
        assert_eq!(post.reactions, 42);
        assert_eq!(post.comments, 7);
        assert_eq!(post.reposts, 3);
    }

    #[test]
    fn test_detects_image_media() {
        let post = parse_post(SAMPLE_POST, "", capture_time(), "");
        assert_eq!(post.media_type, MediaType::Image);
        assert_eq!(post.media_link, "https://example.com/image.jpg");
    }

    #[test]
    fn test_missing_fields_default() {
        let post = parse_post(
            r#"<div class="feed-shared-update-v2"></div>"#,
            "",
            capture_time(),
            "",
        );
        assert_eq!(post.author, "");
        assert_eq!(post.content, "");
        assert_eq!(post.reactions, 0);
        assert_eq!(post.comments, 0);
        assert_eq!(post.reposts, 0);
        assert_eq!(post.media_type, MediaType::None);
        assert_eq!(post.source_url, "");
        // Unparseable date falls back to the capture date.
        assert_eq!(post.date, capture_time().date_naive());
    }

    #[test]
    fn test_permalink_from_urn() {
        let post = parse_post("<div></div>", "", capture_time(), "urn:li:activity:1234567890");
        assert_eq!(
            post.source_url,
            "https://www.linkedin.com/feed/update/urn:li:activity:1234567890/"
        );
        assert_eq!(post.element_id, "urn:li:activity:1234567890");
    }

    #[test]
    fn test_urn_without_activity_id_has_no_permalink() {
        assert_eq!(permalink_from_urn("urn:li:share:oops"), "");
    }

    #[test]
    fn test_poll_beats_image() {
        let html = r#"
            <div>
                <div class="update-components-image"><a href="https://example.com/i.jpg">i</a></div>
                <div class="feed-shared-poll update-components-poll"><a href="https://example.com/poll">p</a></div>
            </div>
        "#;
        let post = parse_post(html, "", capture_time(), "");
        assert_eq!(post.media_type, MediaType::Poll);
        assert_eq!(post.media_link, "https://example.com/poll");
    }

    #[test]
    fn test_document_beats_video() {
        let html = r#"
            <div>
                <div class="update-components-video"></div>
                <div class="update-components-document__container"></div>
            </div>
        "#;
        let post = parse_post(html, "", capture_time(), "");
        assert_eq!(post.media_type, MediaType::Document);
    }

    #[test]
    fn test_article_detected() {
        let html = r#"<article class="update-components-article"></article>"#;
        let post = parse_post(html, "", capture_time(), "");
        assert_eq!(post.media_type, MediaType::Article);
    }

    #[test]
    fn test_commentary_fallback_for_content() {
        let html = r#"
            <div class="feed-shared-update-v2">
                <div class="feed-shared-update-v2__commentary">Commentary only.</div>
            </div>
        "#;
        let post = parse_post(html, "", capture_time(), "");
        assert_eq!(post.content, "Commentary only.");
    }

    #[test]
    fn test_last_duplicate_engagement_button_wins() {
        let html = r#"
            <div>
                <button aria-label="reactions">0</button>
                <button aria-label="reactions">1.2K</button>
            </div>
        "#;
        let post = parse_post(html, "", capture_time(), "");
        assert_eq!(post.reactions, 1200);
    }

    #[test]
    fn test_parse_count_plain() {
        assert_eq!(parse_count("42"), 42);
        assert_eq!(parse_count("1,234"), 1234);
    }

    #[test]
    fn test_parse_count_abbreviated() {
        assert_eq!(parse_count("1.2K"), 1200);
        assert_eq!(parse_count("5K"), 5000);
        assert_eq!(parse_count("2.5M"), 2_500_000);
        assert_eq!(parse_count("1m"), 1_000_000);
    }

    #[test]
    fn test_parse_count_garbage_is_zero() {
        assert_eq!(parse_count(""), 0);
        assert_eq!(parse_count("   "), 0);
        assert_eq!(parse_count("likes"), 0);
    }
}
