const MAX_SLUG_LEN: usize = 50;

/// Derive a filename-safe slug from free text: first line only, truncated,
/// ASCII-lowercased, everything else hyphenated. Empty input becomes "post"
/// so a filename can always be formed.
pub fn slugify(text: &str) -> String {
    let first_line = text.lines().next().unwrap_or_default().trim();
    let truncated: String = first_line.chars().take(MAX_SLUG_LEN).collect();

    let mut slug = String::with_capacity(truncated.len());
    let mut pending_hyphen = false;
    for c in truncated.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            slug.push(c.to_ascii_lowercase());
            pending_hyphen = false;
        } else {
            pending_hyphen = true;
        }
    }

    if slug.is_empty() {
        "post".to_string()
    } else {
        slug
    }
}
