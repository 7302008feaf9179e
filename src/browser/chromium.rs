use async_trait::async_trait;
use chromiumoxide::Page;
use tracing::trace;

use crate::app::{MagpieError, Result};
use crate::browser::extract;
use crate::browser::{FeedPage, RawPostMarkup, RawPreview};

/// [`FeedPage`] over a chromiumoxide page. Created by the session manager
/// once navigation to the feed has succeeded.
pub struct ChromiumPage {
    page: Page,
}

impl ChromiumPage {
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    pub async fn close(self) {
        let _ = self.page.close().await;
    }
}

#[async_trait]
impl FeedPage for ChromiumPage {
    async fn current_url(&self) -> Result<String> {
        let url = self
            .page
            .url()
            .await
            .map_err(|e| MagpieError::Browser(format!("Failed to read page URL: {e}")))?;
        Ok(url.unwrap_or_default())
    }

    async fn scroll_to_bottom(&self) -> Result<()> {
        let height: serde_json::Value = self
            .page
            .evaluate(extract::SCROLL_SCRIPT)
            .await
            .map_err(|e| MagpieError::Browser(format!("Scroll failed: {e}")))?
            .into_value()
            .map_err(|e| MagpieError::Browser(format!("Scroll failed: {e:?}")))?;
        trace!("scrolled to document height {height}");
        Ok(())
    }

    async fn collect_previews(&self) -> Result<Vec<RawPreview>> {
        self.page
            .evaluate(extract::PREVIEW_SCRIPT)
            .await
            .map_err(|e| MagpieError::Browser(format!("Preview extraction failed: {e}")))?
            .into_value()
            .map_err(|e| MagpieError::Browser(format!("Unexpected preview data: {e:?}")))
    }

    async fn post_markup(&self, element_id: &str) -> Result<Option<RawPostMarkup>> {
        self.page
            .evaluate(extract::post_markup_script(element_id))
            .await
            .map_err(|e| MagpieError::Browser(format!("Post extraction failed: {e}")))?
            .into_value()
            .map_err(|e| MagpieError::Browser(format!("Unexpected post data: {e:?}")))
    }

    async fn snapshot(&self) -> Result<String> {
        self.page
            .content()
            .await
            .map_err(|e| MagpieError::Browser(format!("Failed to read page content: {e}")))
    }
}
