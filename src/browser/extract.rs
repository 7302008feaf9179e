//! JavaScript run inside the page to pull post data out of the DOM.
//!
//! Selectors mirror the site's current feed markup; when they rot, the
//! debug snapshots under `debug/` are the raw material for repairing them.

/// Collect a preview record for every post element in the DOM.
pub const PREVIEW_SCRIPT: &str = r#"
(() => {
    const posts = document.querySelectorAll('div.feed-shared-update-v2[data-urn*="activity"]');
    const results = [];
    posts.forEach((post) => {
        const urn = post.getAttribute('data-urn') || '';

        const timeEl = post.querySelector('.update-components-actor__sub-description span.visually-hidden');
        const dateText = timeEl ? timeEl.textContent.trim() : '';

        const authorEl = post.querySelector('.update-components-actor__name span.visually-hidden')
            || post.querySelector('.update-components-actor__name');
        const author = authorEl ? authorEl.textContent.trim() : '';

        let snippet = '';
        const candidates = [
            '.feed-shared-update-v2__description .update-components-text',
            '.feed-shared-update-v2__commentary',
            '.update-components-text',
        ];
        for (const sel of candidates) {
            const el = post.querySelector(sel);
            if (el && el.textContent.trim()) {
                snippet = el.textContent.trim().substring(0, 120);
                break;
            }
        }

        results.push({ elementId: urn, author: author, dateText: dateText, snippet: snippet });
    });
    return results;
})()
"#;

/// Scroll to the bottom of the page, returning the new document height.
pub const SCROLL_SCRIPT: &str = r#"
(() => {
    window.scrollTo(0, document.body.scrollHeight);
    return document.body.scrollHeight;
})()
"#;

/// Fetch one post's outer markup by its `data-urn` value.
pub fn post_markup_script(element_id: &str) -> String {
    let escaped = element_id.replace('\\', "\\\\").replace('"', "\\\"");
    format!(
        r#"
(() => {{
    const el = document.querySelector('div.feed-shared-update-v2[data-urn="{escaped}"]');
    if (!el) {{
        return null;
    }}
    const timeEl = el.querySelector('.update-components-actor__sub-description span.visually-hidden');
    return {{
        html: el.outerHTML,
        dateText: timeEl ? timeEl.textContent.trim() : ''
    }};
}})()
"#
    )
}
