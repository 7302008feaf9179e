//! Persistent browser session management.
//!
//! Login happens once, interactively, in a visible browser window; the
//! browser profile under `browser_state_dir` keeps the cookies so every
//! later run can open the feed headlessly. Concurrent processes sharing
//! one state directory are not supported.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use futures::StreamExt;
use once_cell::sync::Lazy;
use regex::Regex;
use tokio::time::{sleep, Instant};
use tracing::{debug, info};
use url::Url;

use crate::app::{MagpieError, Result};
use crate::browser::{ChromiumPage, FeedPage};

const LOGIN_URL: &str = "https://www.linkedin.com/login";
const FEED_URL: &str = "https://www.linkedin.com/feed/";

/// Settle time after navigation before trusting the URL; the site redirects
/// client-side.
const NAV_SETTLE: Duration = Duration::from_secs(3);
const LOGIN_POLL: Duration = Duration::from_secs(2);

static RE_PROFILE_BASE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(https://www\.linkedin\.com/in/[^/?#]+)").expect("regex"));
static RE_PROFILE_HANDLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/in/([^/?#]+)").expect("regex"));

/// Hands out authenticated pages. The seam exists so the pipeline can be
/// driven by a scripted session in tests.
#[async_trait]
pub trait Session: Send {
    type Page: FeedPage;

    /// Navigate to `url` with the persisted login state. Fails with
    /// [`MagpieError::NotAuthenticated`] when the site bounces to a login
    /// wall instead.
    async fn authenticated_page(&mut self, url: &str) -> Result<Self::Page>;

    async fn close(&mut self);
}

/// Chromium-backed session with state persisted in a user-data directory.
pub struct BrowserSession {
    state_dir: PathBuf,
    headless: bool,
    browser: Option<Browser>,
}

impl BrowserSession {
    pub fn new(state_dir: impl Into<PathBuf>, headless: bool) -> Self {
        Self {
            state_dir: state_dir.into(),
            headless,
            browser: None,
        }
    }

    async fn launch(&mut self, headless: bool) -> Result<()> {
        if self.browser.is_some() {
            return Ok(());
        }
        std::fs::create_dir_all(&self.state_dir)?;

        let mut builder = BrowserConfig::builder()
            .user_data_dir(&self.state_dir)
            .window_size(1280, 900)
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage");
        if !headless {
            builder = builder.with_head();
        }
        let config = builder
            .build()
            .map_err(|e| MagpieError::Browser(format!("Failed to build browser config: {e}")))?;

        let (browser, mut handler) = Browser::launch(config).await.map_err(|e| {
            MagpieError::Browser(format!(
                "Failed to launch browser: {e}. Is Chrome or Chromium installed and in PATH?"
            ))
        })?;

        tokio::spawn(async move { while handler.next().await.is_some() {} });

        self.browser = Some(browser);
        Ok(())
    }

    async fn open(&self, url: &str) -> Result<ChromiumPage> {
        let browser = self
            .browser
            .as_ref()
            .ok_or_else(|| MagpieError::Browser("Browser is not running".into()))?;
        let page = browser
            .new_page(url)
            .await
            .map_err(|e| MagpieError::Browser(format!("Failed to open page: {e}")))?;
        page.wait_for_navigation()
            .await
            .map_err(|e| MagpieError::Browser(format!("Navigation to {url} failed: {e}")))?;
        Ok(ChromiumPage::new(page))
    }

    /// Probe the feed with the persisted state. Any browser failure counts
    /// as not logged in.
    pub async fn is_authenticated(&mut self) -> bool {
        let result = self.probe_feed().await;
        self.close_browser().await;
        result.unwrap_or(false)
    }

    async fn probe_feed(&mut self) -> Result<bool> {
        self.launch(true).await?;
        let page = self.open(FEED_URL).await?;
        sleep(NAV_SETTLE).await;
        let url = page.current_url().await?;
        page.close().await;
        Ok(url.contains("/feed") && !is_login_wall(&url))
    }

    /// Open a visible browser at the login page and wait for the user to
    /// finish. Returns whether login was observed before the timeout; the
    /// session state lands in `state_dir` either way.
    pub async fn begin_login(&mut self, timeout: Duration) -> Result<bool> {
        self.launch(false).await?;
        let page = self.open(LOGIN_URL).await?;
        info!("waiting for interactive login (timeout {:?})", timeout);

        let deadline = Instant::now() + timeout;
        let logged_in = loop {
            sleep(LOGIN_POLL).await;
            // The user may close the window; treat that as giving up.
            let Ok(url) = page.current_url().await else {
                break false;
            };
            if url.contains("/feed") || url.contains("/mynetwork") {
                break true;
            }
            if Instant::now() >= deadline {
                break false;
            }
        };

        page.close().await;
        self.close_browser().await;
        if logged_in {
            info!("login detected, session state saved");
        } else {
            debug!("login not observed before timeout");
        }
        Ok(logged_in)
    }

    async fn close_browser(&mut self) {
        if let Some(mut browser) = self.browser.take() {
            let _ = browser.close().await;
            let _ = browser.wait().await;
        }
    }
}

#[async_trait]
impl Session for BrowserSession {
    type Page = ChromiumPage;

    async fn authenticated_page(&mut self, url: &str) -> Result<ChromiumPage> {
        self.launch(self.headless).await?;
        let page = self.open(url).await?;
        sleep(NAV_SETTLE).await;

        let current = page.current_url().await?;
        if is_login_wall(&current) {
            page.close().await;
            self.close_browser().await;
            return Err(MagpieError::NotAuthenticated);
        }
        Ok(page)
    }

    async fn close(&mut self) {
        self.close_browser().await;
    }
}

/// The site's characteristic login-wall redirects.
pub fn is_login_wall(url: &str) -> bool {
    url.contains("login") || url.contains("authwall") || url.contains("checkpoint")
}

/// Canonical activity-feed URL for a profile given as a bare handle, a
/// profile URL, or an already-complete activity URL.
pub fn activity_url(input: &str) -> Result<String> {
    let trimmed = input.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(MagpieError::InvalidProfile(input.to_string()));
    }

    if !trimmed.contains("://") {
        if trimmed.contains('/') || trimmed.contains(char::is_whitespace) {
            return Err(MagpieError::InvalidProfile(input.to_string()));
        }
        return Ok(format!(
            "https://www.linkedin.com/in/{trimmed}/recent-activity/all/"
        ));
    }

    Url::parse(trimmed)?;

    if trimmed.contains("/recent-activity/") {
        return Ok(format!("{trimmed}/"));
    }
    if let Some(caps) = RE_PROFILE_BASE.captures(trimmed) {
        return Ok(format!("{}/recent-activity/all/", &caps[1]));
    }
    Ok(format!("{trimmed}/recent-activity/all/"))
}

/// Short profile name used for the per-profile output subfolder.
pub fn profile_handle(input: &str) -> String {
    let trimmed = input.trim().trim_end_matches('/');
    if !trimmed.contains("://") {
        return trimmed.to_string();
    }
    if let Some(caps) = RE_PROFILE_HANDLE.captures(trimmed) {
        return caps[1].to_string();
    }
    trimmed
        .rsplit('/')
        .find(|seg| !seg.is_empty() && *seg != "recent-activity" && *seg != "all")
        .unwrap_or("profile")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activity_url_from_handle() {
        assert_eq!(
            activity_url("testuser").unwrap(),
            "https://www.linkedin.com/in/testuser/recent-activity/all/"
        );
    }

    #[test]
    fn test_activity_url_from_profile_url() {
        assert_eq!(
            activity_url("https://www.linkedin.com/in/testuser/").unwrap(),
            "https://www.linkedin.com/in/testuser/recent-activity/all/"
        );
    }

    #[test]
    fn test_activity_url_ignores_trailing_segments() {
        assert_eq!(
            activity_url("https://www.linkedin.com/in/testuser/details/experience").unwrap(),
            "https://www.linkedin.com/in/testuser/recent-activity/all/"
        );
    }

    #[test]
    fn test_activity_url_preserves_existing() {
        assert_eq!(
            activity_url("https://www.linkedin.com/in/testuser/recent-activity/all/").unwrap(),
            "https://www.linkedin.com/in/testuser/recent-activity/all/"
        );
    }

    #[test]
    fn test_activity_url_rejects_junk() {
        assert!(activity_url("").is_err());
        assert!(activity_url("not a handle").is_err());
        assert!(activity_url("https://[bad").is_err());
    }

    #[test]
    fn test_profile_handle() {
        assert_eq!(profile_handle("testuser"), "testuser");
        assert_eq!(
            profile_handle("https://www.linkedin.com/in/jane-smith/recent-activity/all/"),
            "jane-smith"
        );
        assert_eq!(
            profile_handle("https://www.linkedin.com/in/jane-smith"),
            "jane-smith"
        );
    }

    #[test]
    fn test_login_wall_detection() {
        assert!(is_login_wall("https://www.linkedin.com/login"));
        assert!(is_login_wall(
            "https://www.linkedin.com/authwall?trk=something"
        ));
        assert!(!is_login_wall(
            "https://www.linkedin.com/in/testuser/recent-activity/all/"
        ));
    }
}
