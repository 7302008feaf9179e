use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::app::{AppContext, Result};
use crate::domain::PostPreview;
use crate::pipeline::{EventSender, PipelineEvent};
use crate::store::PostStore;

pub async fn login(ctx: &AppContext) -> Result<()> {
    println!("A browser window will open. Log in there and keep it open until your feed appears.");

    let mut session = ctx.session();
    let logged_in = session.begin_login(ctx.config.login_timeout()).await?;

    if logged_in {
        println!("Login successful — session saved.");
    } else {
        println!("Login not detected. Run `magpie status` to check, or try again.");
    }
    Ok(())
}

pub async fn status(ctx: &AppContext) -> Result<()> {
    let mut session = ctx.session();
    if session.is_authenticated().await {
        println!("Logged in — session is valid.");
    } else {
        println!("Not logged in — run `magpie login` first.");
    }
    Ok(())
}

pub async fn scan(ctx: &AppContext, profile: &str) -> Result<()> {
    let (events, printer) = spawn_event_printer();
    let mut pipeline = ctx.pipeline(events);

    let result = pipeline.scan(profile).await;
    drop(pipeline);
    let _ = printer.await;
    let previews = result?;

    if previews.is_empty() {
        println!("No posts found.");
        return Ok(());
    }
    for preview in &previews {
        println!(
            "{:>3}. [{:>4}] {} — {}",
            preview.index + 1,
            preview.relative_date_text,
            preview.author,
            preview.display_snippet()
        );
    }
    println!(
        "\n{} posts. Save them with `magpie scrape {} --select 1,2,...`",
        previews.len(),
        profile
    );
    Ok(())
}

pub async fn scrape(ctx: &AppContext, profile: &str, select: &[usize]) -> Result<()> {
    let (events, printer) = spawn_event_printer();
    let mut pipeline = ctx.pipeline(events);

    // Element ids only survive one page load, so the scrape starts with a
    // fresh scan and applies the selection to it.
    let result = async {
        let previews = pipeline.scan(profile).await?;
        let selected: Vec<PostPreview> = if select.is_empty() {
            previews
        } else {
            previews
                .into_iter()
                .filter(|p| select.contains(&(p.index + 1)))
                .collect()
        };
        pipeline.scrape(profile, &selected).await
    }
    .await;
    drop(pipeline);
    let _ = printer.await;
    let report = result?;

    println!("\nWritten: {}", report.written.len());
    for path in &report.written {
        println!("  {}", path.display());
    }
    println!("Skipped (already saved): {}", report.skipped.len());
    if !report.failed.is_empty() {
        println!("Failed: {}", report.failed.len());
        for (url, err) in &report.failed {
            println!("  {url}: {err}");
        }
    }
    Ok(())
}

pub fn list(ctx: &AppContext) -> Result<()> {
    let files = ctx.store.list_files()?;
    if files.is_empty() {
        println!("No posts saved yet. Use `magpie scrape` to get started.");
        return Ok(());
    }

    let root = ctx.store.root();
    for path in &files {
        let rel = path.strip_prefix(root).unwrap_or(path);
        println!("{}", rel.display());
    }
    println!("\n{} files under {}", files.len(), root.display());
    Ok(())
}

pub fn open_output(ctx: &AppContext) -> Result<()> {
    let root = ctx.store.root().to_path_buf();
    std::fs::create_dir_all(&root)?;
    open::that(&root)?;
    println!("Opened {}", root.display());
    Ok(())
}

/// Drain pipeline events to stdout while an operation runs. The task ends
/// when the pipeline (and with it the sender) is dropped.
fn spawn_event_printer() -> (EventSender, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let handle = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match event {
                PipelineEvent::Status(message) => println!("{message}"),
                PipelineEvent::Progress { done, total } => println!("  saving {done}/{total}"),
            }
        }
    });
    (tx, handle)
}
