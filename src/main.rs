use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use magpie::app::AppContext;
use magpie::cli::{commands, Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let mut ctx = AppContext::new()?;

    match cli.command {
        Commands::Login => {
            commands::login(&ctx).await?;
        }
        Commands::Status => {
            commands::status(&ctx).await?;
        }
        Commands::Scan { profile, max_posts } => {
            if let Some(n) = max_posts {
                ctx.config.max_posts = n;
            }
            commands::scan(&ctx, &profile).await?;
        }
        Commands::Scrape {
            profile,
            select,
            max_posts,
        } => {
            if let Some(n) = max_posts {
                ctx.config.max_posts = n;
            }
            commands::scrape(&ctx, &profile, &select).await?;
        }
        Commands::List => {
            commands::list(&ctx)?;
        }
        Commands::Open => {
            commands::open_output(&ctx)?;
        }
    }

    Ok(())
}
