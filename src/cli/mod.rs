pub mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "magpie")]
#[command(about = "Scrape a profile's public activity feed into markdown files", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Open a browser window to log in; the session is saved for later runs
    Login,
    /// Check whether the saved login session is still valid
    Status,
    /// Scan a profile's feed and list post previews
    Scan {
        /// Profile handle or URL
        profile: String,
        /// Override the configured scan cap
        #[arg(long)]
        max_posts: Option<usize>,
    },
    /// Scan a profile's feed, then fetch and save posts
    Scrape {
        /// Profile handle or URL
        profile: String,
        /// 1-based preview numbers to save, as printed by scan
        /// (e.g. --select 1,3,7). Default: every post found.
        #[arg(long, value_delimiter = ',')]
        select: Vec<usize>,
        /// Override the configured scan cap
        #[arg(long)]
        max_posts: Option<usize>,
    },
    /// List saved posts under the output folder
    List,
    /// Open the output folder in the system file manager
    Open,
}
