//! The browser black box.
//!
//! Everything the rest of the crate needs from a live feed page fits in the
//! [`FeedPage`] trait: where am I, scroll, hand me the previews, hand me one
//! post's markup, snapshot the page. [`ChromiumPage`] implements it over a
//! chromiumoxide page; tests substitute a scripted fake.

pub mod chromium;
mod extract;

pub use chromium::ChromiumPage;

use async_trait::async_trait;
use serde::Deserialize;

use crate::app::Result;

/// Preview fields as collected by the in-page extraction script.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPreview {
    pub element_id: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub date_text: String,
    #[serde(default)]
    pub snippet: String,
}

/// One post's full outer markup plus the date text shown next to it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPostMarkup {
    pub html: String,
    #[serde(default)]
    pub date_text: String,
}

/// A live, authenticated feed page. DOM navigation state is not reentrant,
/// so a page must only ever be driven from one worker at a time.
#[async_trait]
pub trait FeedPage: Send + Sync {
    /// The page's current URL, read for login-wall checks.
    async fn current_url(&self) -> Result<String>;

    /// Scroll to the bottom so the feed loads another batch.
    async fn scroll_to_bottom(&self) -> Result<()>;

    /// Extract previews for every post element currently in the DOM, in
    /// page order (newest first).
    async fn collect_previews(&self) -> Result<Vec<RawPreview>>;

    /// Re-locate one post by its element id and return its full markup.
    /// `None` when the element is no longer in the DOM.
    async fn post_markup(&self, element_id: &str) -> Result<Option<RawPostMarkup>>;

    /// Whole-page HTML, for debug snapshots.
    async fn snapshot(&self) -> Result<String>;
}
