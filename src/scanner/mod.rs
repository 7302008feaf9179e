//! Scan phase: progressively scroll a profile's feed and collect
//! lightweight previews, without fetching any post in full.

use std::collections::HashSet;
use std::time::Duration;

use rand::Rng;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::app::{MagpieError, Result};
use crate::browser::{FeedPage, RawPostMarkup};
use crate::domain::PostPreview;
use crate::session::is_login_wall;

/// Scrolls a feed page until enough posts are revealed.
///
/// Each scan starts fresh from wherever the page currently is (the session
/// hands out newly navigated pages, i.e. the top of the feed) and produces
/// a finite preview list in page order, newest first.
pub struct FeedScanner {
    scroll_delay: (u64, u64),
    max_empty_scrolls: u32,
}

impl FeedScanner {
    pub fn new(scroll_delay_min_ms: u64, scroll_delay_max_ms: u64, max_empty_scrolls: u32) -> Self {
        Self {
            scroll_delay: (scroll_delay_min_ms, scroll_delay_max_ms),
            max_empty_scrolls,
        }
    }

    /// Collect up to `max_posts` previews. Stops early when
    /// `max_empty_scrolls` consecutive scrolls reveal nothing new (the feed
    /// is exhausted). Fails with [`MagpieError::AuthenticationLost`] when
    /// the page redirects to a login wall mid-scan.
    pub async fn scan<P: FeedPage>(&self, page: &P, max_posts: usize) -> Result<Vec<PostPreview>> {
        let mut previews: Vec<PostPreview> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut empty_rounds = 0;

        loop {
            if is_login_wall(&page.current_url().await?) {
                return Err(MagpieError::AuthenticationLost);
            }

            let mut new_count = 0usize;
            for raw in page.collect_previews().await? {
                // Posts without an element id cannot be re-located for the
                // scrape phase; skip them outright.
                if raw.element_id.is_empty() || !seen.insert(raw.element_id.clone()) {
                    continue;
                }
                previews.push(PostPreview {
                    index: previews.len(),
                    element_id: raw.element_id,
                    author: raw.author,
                    snippet: raw.snippet,
                    relative_date_text: raw.date_text,
                });
                new_count += 1;
            }
            debug!("scroll round revealed {} new posts", new_count);

            if previews.len() >= max_posts {
                previews.truncate(max_posts);
                info!("scan stopped at max_posts cap ({max_posts})");
                break;
            }

            if new_count == 0 {
                empty_rounds += 1;
                if empty_rounds >= self.max_empty_scrolls {
                    info!("feed exhausted after {} previews", previews.len());
                    break;
                }
            } else {
                empty_rounds = 0;
            }

            page.scroll_to_bottom().await?;
            self.human_delay().await;
        }

        Ok(previews)
    }

    /// Scroll until every requested element id has been located in the
    /// DOM, or the feed stops loading more. Returns (id, markup) pairs in
    /// discovery order; ids that never appear are simply absent.
    pub async fn locate<P: FeedPage>(
        &self,
        page: &P,
        element_ids: &[String],
    ) -> Result<Vec<(String, RawPostMarkup)>> {
        let mut found: Vec<(String, RawPostMarkup)> = Vec::new();
        let mut remaining: Vec<String> = element_ids.to_vec();
        let mut empty_rounds = 0;

        while !remaining.is_empty() {
            if is_login_wall(&page.current_url().await?) {
                return Err(MagpieError::AuthenticationLost);
            }

            let mut progressed = false;
            let mut still_missing = Vec::new();
            for id in remaining {
                match page.post_markup(&id).await? {
                    Some(markup) => {
                        found.push((id, markup));
                        progressed = true;
                    }
                    None => still_missing.push(id),
                }
            }
            remaining = still_missing;
            if remaining.is_empty() {
                break;
            }

            if progressed {
                empty_rounds = 0;
            } else {
                empty_rounds += 1;
                if empty_rounds >= self.max_empty_scrolls {
                    warn!("{} posts never appeared in the feed", remaining.len());
                    break;
                }
            }

            page.scroll_to_bottom().await?;
            self.human_delay().await;
        }

        Ok(found)
    }

    /// Randomized pause between scrolls, drawn uniformly from the
    /// configured range.
    async fn human_delay(&self) {
        let (min, max) = self.scroll_delay;
        let ms = if max > min {
            rand::thread_rng().gen_range(min..=max)
        } else {
            min
        };
        sleep(Duration::from_millis(ms)).await;
    }
}
