use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use storyline::app::AppContext;
use storyline::cli::{commands, Cli, Commands};
use storyline::config::Config;
use storyline::view::ViewSync;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(matches!(cli.command, Commands::Tui))?;

    let config = Config::load()?;
    let ctx = if cli.demo {
        AppContext::demo()
    } else {
        AppContext::new(
            &cli.api_config(&config.api),
            cli.credentials(&config.credentials),
        )?
    };

    match cli.command {
        Commands::List => {
            commands::list_stories(&ctx).await?;
        }
        Commands::Mine => {
            commands::list_own_stories(&ctx).await?;
        }
        Commands::Favorites => {
            commands::list_favorites(&ctx).await?;
        }
        Commands::Submit { author, title, url } => {
            commands::submit_story(&ctx, &author, &title, &url).await?;
        }
        Commands::Delete { story_id } => {
            commands::delete_story(&ctx, &story_id).await?;
        }
        Commands::Favorite { story_id } => {
            commands::set_favorite(&ctx, &story_id, true).await?;
        }
        Commands::Unfavorite { story_id } => {
            commands::set_favorite(&ctx, &story_id, false).await?;
        }
        Commands::Login { password } => {
            commands::login(&ctx, cli.username.as_deref(), &password).await?;
        }
        Commands::Signup { password, name } => {
            commands::signup(&ctx, cli.username.as_deref(), &password, &name).await?;
        }
        Commands::Tui => {
            let state = ctx.load_state().await?;
            let sync = ViewSync::new(ctx.api.clone(), state);
            storyline::tui::run(sync, Arc::new(config)).await?;
        }
    }

    Ok(())
}

/// Log to stderr, or to a file while the TUI owns the terminal.
fn init_tracing(tui: bool) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let registry = tracing_subscriber::registry().with(filter);

    if tui {
        let path = log_path()?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("opening log file {}", path.display()))?;
        registry
            .with(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    Ok(())
}

fn log_path() -> anyhow::Result<PathBuf> {
    let dir = dirs::data_local_dir()
        .context("could not determine data directory")?
        .join("storyline");
    fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;
    Ok(dir.join("storyline.log"))
}
