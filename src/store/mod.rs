pub mod markdown;
pub mod slug;

pub use slug::slugify;

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::app::Result;
use crate::domain::Post;

/// Callback invoked after each item in a batch save: (done, total, path of
/// the file just written, if any).
pub type ProgressFn<'a> = &'a mut dyn FnMut(usize, usize, Option<&Path>);

/// Outcome of a batch save. Every input post lands in exactly one bucket,
/// so `written + skipped + failed` always equals the input length.
#[derive(Debug, Default)]
pub struct SaveReport {
    /// Paths of files written, in input order.
    pub written: Vec<PathBuf>,
    /// Source URLs that were already present and therefore not rewritten.
    pub skipped: Vec<String>,
    /// Per-item write failures: (source URL, error text). A failed item
    /// never aborts the rest of the batch.
    pub failed: Vec<(String, String)>,
}

impl SaveReport {
    pub fn total(&self) -> usize {
        self.written.len() + self.skipped.len() + self.failed.len()
    }
}

/// Storage seam for scraped posts. The one invariant every implementation
/// must keep: no two stored posts for the same profile share a source URL.
pub trait PostStore: Send + Sync {
    /// Source URLs already present under the profile's folder, read from
    /// the stored files' front matter. Used to pre-filter before any
    /// expensive full-detail fetch.
    fn existing_urls(&self, profile: Option<&str>) -> Result<HashSet<String>>;

    /// Write one post. Returns `None` without touching disk when the
    /// post's source URL is already stored.
    fn save(&self, post: &Post, profile: Option<&str>) -> Result<Option<PathBuf>>;

    /// Write a batch in input order, reporting per-item progress. Only a
    /// missing/uncreatable output root is fatal; individual write errors
    /// are captured in the report.
    fn save_many(
        &self,
        posts: &[Post],
        profile: Option<&str>,
        on_progress: ProgressFn,
    ) -> Result<SaveReport>;

    /// All stored markdown files under the output root, sorted by path.
    fn list_files(&self) -> Result<Vec<PathBuf>>;

    fn root(&self) -> &Path;
}

/// Flat-file store: one markdown file per post, named
/// `YYYY-MM-DD_<slug>.md`, optionally grouped into per-profile subfolders.
/// The filename is derived, never authoritative; identity lives in the
/// front matter's `source` line.
pub struct MarkdownStore {
    root: PathBuf,
    per_profile: bool,
}

impl MarkdownStore {
    pub fn new(root: impl Into<PathBuf>, per_profile: bool) -> Self {
        Self {
            root: root.into(),
            per_profile,
        }
    }

    fn profile_dir(&self, profile: Option<&str>) -> PathBuf {
        match profile {
            Some(name) if self.per_profile => self.root.join(slugify(name)),
            _ => self.root.clone(),
        }
    }

    /// Save against an already-collected set of existing URLs, updating the
    /// set on success so one batch never writes the same source twice.
    fn save_into(
        &self,
        dir: &Path,
        post: &Post,
        existing: &mut HashSet<String>,
    ) -> Result<Option<PathBuf>> {
        if !post.source_url.is_empty() && existing.contains(&post.source_url) {
            info!("skipping already-saved post {}", post.source_url);
            return Ok(None);
        }

        let stem = format!(
            "{}_{}",
            post.date.format("%Y-%m-%d"),
            slugify(&post.content)
        );
        let mut path = dir.join(format!("{stem}.md"));
        // A file that exists here belongs to a different source URL (same
        // sources were filtered above); suffix instead of overwriting.
        let mut counter = 2;
        while path.exists() {
            path = dir.join(format!("{stem}-{counter}.md"));
            counter += 1;
        }

        fs::write(&path, markdown::render(post))?;
        if !post.source_url.is_empty() {
            existing.insert(post.source_url.clone());
        }
        info!("saved post to {}", path.display());
        Ok(Some(path))
    }

    fn collect_md_files(dir: &Path, out: &mut Vec<PathBuf>) {
        let Ok(entries) = fs::read_dir(dir) else {
            return;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                Self::collect_md_files(&path, out);
            } else if path.extension().is_some_and(|ext| ext == "md") {
                out.push(path);
            }
        }
    }
}

impl PostStore for MarkdownStore {
    fn existing_urls(&self, profile: Option<&str>) -> Result<HashSet<String>> {
        let dir = self.profile_dir(profile);
        let mut urls = HashSet::new();
        if !dir.is_dir() {
            return Ok(urls);
        }

        let mut files = Vec::new();
        Self::collect_md_files(&dir, &mut files);
        for path in files {
            match fs::read_to_string(&path) {
                Ok(contents) => {
                    if let Some(source) = markdown::front_matter_source(&contents) {
                        urls.insert(source);
                    }
                }
                Err(e) => warn!("could not read {}: {}", path.display(), e),
            }
        }
        Ok(urls)
    }

    fn save(&self, post: &Post, profile: Option<&str>) -> Result<Option<PathBuf>> {
        let dir = self.profile_dir(profile);
        fs::create_dir_all(&dir)?;
        let mut existing = self.existing_urls(profile)?;
        self.save_into(&dir, post, &mut existing)
    }

    fn save_many(
        &self,
        posts: &[Post],
        profile: Option<&str>,
        on_progress: ProgressFn,
    ) -> Result<SaveReport> {
        let dir = self.profile_dir(profile);
        fs::create_dir_all(&dir)?;
        let mut existing = self.existing_urls(profile)?;

        let mut report = SaveReport::default();
        let total = posts.len();
        for (i, post) in posts.iter().enumerate() {
            let mut written_path = None;
            match self.save_into(&dir, post, &mut existing) {
                Ok(Some(path)) => {
                    report.written.push(path.clone());
                    written_path = Some(path);
                }
                Ok(None) => report.skipped.push(post.source_url.clone()),
                Err(e) => {
                    warn!("failed to save {}: {}", post.source_url, e);
                    report.failed.push((post.source_url.clone(), e.to_string()));
                }
            }
            on_progress(i + 1, total, written_path.as_deref());
        }
        Ok(report)
    }

    fn list_files(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        if self.root.is_dir() {
            Self::collect_md_files(&self.root, &mut files);
        }
        files.sort();
        Ok(files)
    }

    fn root(&self) -> &Path {
        &self.root
    }
}
