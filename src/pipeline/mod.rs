//! Two-phase orchestration: scan (cheap, read-only) and scrape (fetch,
//! parse, save).
//!
//! The split is deliberate: a human filters the preview list before the
//! expensive, rate-limit-sensitive full-detail fetch runs. Both phases
//! drive the single browser surface, so a busy flag rejects any attempt to
//! start a second operation while one is in flight. Progress is reported
//! over an mpsc channel consumed by the caller's own loop; workers never
//! mutate caller state directly.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use sha2::{Digest, Sha256};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::app::{MagpieError, Result};
use crate::browser::{FeedPage, RawPostMarkup};
use crate::config::Config;
use crate::domain::{Post, PostPreview};
use crate::parser;
use crate::scanner::FeedScanner;
use crate::session::{activity_url, profile_handle, Session};
use crate::store::{PostStore, SaveReport};

/// Progress messages emitted during long operations.
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    Status(String),
    /// Batch-save progress: items done out of total.
    Progress { done: usize, total: usize },
}

pub type EventSender = mpsc::UnboundedSender<PipelineEvent>;

pub struct Pipeline<S: Session, St: PostStore> {
    session: S,
    store: Arc<St>,
    config: Config,
    events: EventSender,
    busy: Arc<AtomicBool>,
}

/// Clears the busy flag when an operation finishes, ordinarily or not.
struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl<S: Session, St: PostStore> Pipeline<S, St> {
    pub fn new(session: S, store: Arc<St>, config: Config, events: EventSender) -> Self {
        Self {
            session,
            store,
            config,
            events,
            busy: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Phase 1: collect previews from the profile's feed. Never writes to
    /// the output root; saves a debug snapshot when the page yields nothing.
    pub async fn scan(&mut self, profile: &str) -> Result<Vec<PostPreview>> {
        let _busy = self.acquire()?;
        let url = activity_url(profile)?;

        self.status(format!("Navigating to {url}"));
        let page = self.session.authenticated_page(&url).await?;

        self.status("Scrolling to load posts...".to_string());
        let scanner = self.scanner();
        let result = scanner.scan(&page, self.config.max_posts).await;

        if matches!(&result, Ok(previews) if previews.is_empty()) {
            // Nothing parsed out of a loaded page usually means the
            // selectors rotted; keep the evidence.
            if let Ok(html) = page.snapshot().await {
                self.write_debug_snapshot("feed-page.html", &html);
            }
            self.status("No posts found — saved page snapshot under debug/".to_string());
        }

        self.session.close().await;
        let previews = result?;
        self.status(format!("Found {} posts", previews.len()));
        Ok(previews)
    }

    /// Phase 2: fetch, parse, and save the selected previews. Posts whose
    /// permalink is already stored are skipped before anything is fetched.
    pub async fn scrape(&mut self, profile: &str, selected: &[PostPreview]) -> Result<SaveReport> {
        let _busy = self.acquire()?;
        let url = activity_url(profile)?;
        let handle = profile_handle(profile);
        let profile_arg = Some(handle.as_str());

        let existing = self.store.existing_urls(profile_arg)?;

        let mut report = SaveReport::default();
        let mut to_fetch: Vec<&PostPreview> = Vec::new();
        for preview in selected {
            let permalink = parser::permalink_from_urn(&preview.element_id);
            if !permalink.is_empty() && existing.contains(&permalink) {
                report.skipped.push(permalink);
            } else {
                to_fetch.push(preview);
            }
        }
        self.status(format!(
            "{} already saved, {} to fetch",
            report.skipped.len(),
            to_fetch.len()
        ));

        if to_fetch.is_empty() {
            return Ok(report);
        }

        let page = self.session.authenticated_page(&url).await?;
        let ids: Vec<String> = to_fetch.iter().map(|p| p.element_id.clone()).collect();
        let scanner = self.scanner();
        let located = scanner.locate(&page, &ids).await;
        self.session.close().await;

        let markup_by_id: HashMap<String, RawPostMarkup> = located?.into_iter().collect();
        let captured_at = Utc::now();
        let mut posts: Vec<Post> = Vec::new();
        for preview in &to_fetch {
            let Some(raw) = markup_by_id.get(&preview.element_id) else {
                warn!("post {} not found in feed", preview.element_id);
                report.failed.push((
                    parser::permalink_from_urn(&preview.element_id),
                    "post not found in feed".to_string(),
                ));
                continue;
            };
            // Prefer the date text seen alongside the full markup; fall
            // back to what the scan phase captured.
            let date_text = if raw.date_text.is_empty() {
                &preview.relative_date_text
            } else {
                &raw.date_text
            };
            let post = parser::parse_post(&raw.html, date_text, captured_at, &preview.element_id);
            if !post.has_content() {
                warn!(
                    "parse produced empty content for {}, saving markup snapshot",
                    preview.element_id
                );
                self.write_debug_snapshot(&snapshot_name(&preview.element_id), &raw.html);
            }
            posts.push(post);
        }

        self.status(format!("Saving {} posts...", posts.len()));
        let events = self.events.clone();
        let mut on_progress = |done: usize, total: usize, _path: Option<&Path>| {
            let _ = events.send(PipelineEvent::Progress { done, total });
        };
        let saved = self.store.save_many(&posts, profile_arg, &mut on_progress)?;

        report.written.extend(saved.written);
        report.skipped.extend(saved.skipped);
        report.failed.extend(saved.failed);

        self.status(format!(
            "Done: {} written, {} skipped, {} failed",
            report.written.len(),
            report.skipped.len(),
            report.failed.len()
        ));
        Ok(report)
    }

    fn scanner(&self) -> FeedScanner {
        FeedScanner::new(
            self.config.scroll_delay_min_ms,
            self.config.scroll_delay_max_ms,
            self.config.max_empty_scrolls,
        )
    }

    fn acquire(&self) -> Result<BusyGuard> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(MagpieError::Busy);
        }
        Ok(BusyGuard(self.busy.clone()))
    }

    fn status(&self, message: String) {
        info!("{message}");
        let _ = self.events.send(PipelineEvent::Status(message));
    }

    fn write_debug_snapshot(&self, name: &str, html: &str) {
        let dir = self.config.debug_root();
        let write = fs::create_dir_all(&dir).and_then(|_| fs::write(dir.join(name), html));
        match write {
            Ok(()) => info!("saved debug snapshot {}", dir.join(name).display()),
            Err(e) => warn!("could not write debug snapshot {name}: {e}"),
        }
    }
}

/// Stable snapshot filename for a post's element id.
fn snapshot_name(element_id: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(element_id.as_bytes());
    let digest = hex::encode(hasher.finalize());
    format!("post-{}.html", &digest[..16])
}
