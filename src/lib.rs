//! # Magpie
//!
//! A desktop tool that drives a real browser over a person's public
//! activity feed, lets the user pick posts, and archives the picks as
//! markdown files with front matter.
//!
//! ## Architecture
//!
//! ```text
//! Session → Scanner → selection → Parser → Store
//! ```
//!
//! Two explicit phases keep the expensive work behind a human decision:
//!
//! - **scan**: scroll the feed, collect lightweight previews, write nothing
//! - **scrape**: re-locate the selected posts, parse them, save the new ones
//!
//! Saved posts are deduplicated by their permalink, recorded in each file's
//! front matter, so repeated scrapes of the same profile are incremental.
//!
//! ## Quick start
//!
//! ```bash
//! # One-time interactive login (session persists on disk)
//! magpie login
//!
//! # Phase 1: list what's in the feed
//! magpie scan some-handle
//!
//! # Phase 2: save a selection (or everything)
//! magpie scrape some-handle --select 1,2,5
//!
//! # Browse the archive
//! magpie list
//! ```
//!
//! ## Modules
//!
//! - [`app`]: application context and error types
//! - [`cli`]: command-line interface definitions
//! - [`config`]: TOML configuration
//! - [`domain`]: core domain models (Post, PostPreview, MediaType)
//! - [`browser`]: the browser black box and its chromiumoxide implementation
//! - [`session`]: persistent login session management
//! - [`scanner`]: feed scrolling and preview collection
//! - [`parser`]: markup → structured record extraction
//! - [`store`]: incremental markdown persistence
//! - [`pipeline`]: two-phase orchestration with progress events

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires together configuration
/// and store; sessions and pipelines are created from it per operation.
pub mod app;

/// The browser black box.
///
/// - [`FeedPage`](browser::FeedPage): everything the pipeline needs from a
///   live page
/// - [`ChromiumPage`](browser::ChromiumPage): chromiumoxide implementation
pub mod browser;

/// Command-line interface using clap.
///
/// Subcommands: `login`, `status`, `scan`, `scrape`, `list`, `open`.
pub mod cli;

/// Configuration management.
///
/// Loads from `~/.config/magpie/config.toml`; recognized keys include
/// `output_folder`, `browser_state_dir`, and `max_posts`.
pub mod config;

/// Core domain models.
///
/// - [`Post`](domain::Post): the durable record, keyed by source URL
/// - [`PostPreview`](domain::PostPreview): scan-phase record for selection
/// - [`MediaType`](domain::MediaType): best-effort media classification
pub mod domain;

/// Pure markup parsing.
///
/// [`parse_post`](parser::parse_post) tolerates any missing sub-element:
/// each field has a default instead of an error. Includes relative-date
/// resolution ("2h", "3d", "1w" → absolute dates).
pub mod parser;

/// Two-phase pipeline orchestration.
///
/// - [`Pipeline::scan`](pipeline::Pipeline::scan): previews, no writes
/// - [`Pipeline::scrape`](pipeline::Pipeline::scrape): fetch, parse, save
/// - [`PipelineEvent`](pipeline::PipelineEvent): progress stream for the UI
pub mod pipeline;

/// Feed scrolling and preview collection.
///
/// [`FeedScanner`](scanner::FeedScanner) scrolls with randomized delays,
/// dedupes by element id, and stops at the cap or when the feed runs dry.
pub mod scanner;

/// Persistent browser session management.
///
/// - [`BrowserSession`](session::BrowserSession): login flow + persisted
///   state directory
/// - [`Session`](session::Session): the seam the pipeline is generic over
pub mod session;

/// Incremental markdown persistence.
///
/// - [`PostStore`](store::PostStore): storage trait
/// - [`MarkdownStore`](store::MarkdownStore): flat markdown files with
///   front-matter dedupe by source URL
pub mod store;
