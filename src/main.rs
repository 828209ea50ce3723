use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

use slide::app::{App, AppEvent};
use slide::config::Config;
use slide::reachability::{FixedProbe, TcpProbe};
use slide::reddit::RedditClient;
use slide::screen::ports::{Reachability, ReachabilityProbe};
use slide::ui;
use slide::util::normalize_name;

/// Get the config directory path (~/.config/slide/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("slide"))
}

#[derive(Parser, Debug)]
#[command(name = "slide", about = "Terminal Reddit front page")]
struct Args {
    /// Config file (defaults to ~/.config/slide/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Start in offline mode without probing the network
    #[arg(long)]
    offline: bool,

    /// Subreddit to open on start
    #[arg(long, value_name = "NAME")]
    subreddit: Option<String>,
}

/// Log to a file under the config directory; stdout belongs to the TUI.
fn init_tracing(config_dir: &std::path::Path) -> Result<()> {
    let log_path = config_dir.join("slide.log");
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file '{}'", log_path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_dir = get_config_dir()?;
    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir).context("Failed to create config directory")?;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Err(e) =
            std::fs::set_permissions(&config_dir, std::fs::Permissions::from_mode(0o700))
        {
            eprintln!(
                "Warning: failed to restrict {} to 0700: {}",
                config_dir.display(),
                e
            );
        }
    }

    init_tracing(&config_dir)?;

    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| config_dir.join("config.toml"));
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config '{}'", config_path.display()))?;
    tracing::info!(path = %config_path.display(), "Config loaded");

    let client = RedditClient::new(&config.user_agent).context("Failed to build HTTP client")?;

    let probe: Box<dyn ReachabilityProbe> = if args.offline {
        Box::new(FixedProbe(Reachability::Offline))
    } else {
        Box::new(TcpProbe::new(config.reachability_host.clone()))
    };

    let (event_tx, event_rx) = mpsc::channel::<AppEvent>(64);
    let mut app = App::new(&config, Arc::new(client), event_tx, probe);

    if let Some(name) = args.subreddit.as_deref().map(normalize_name) {
        if !name.is_empty() {
            app.go_to_subreddit(&name);
        }
    }

    ui::run(&mut app, event_rx).await?;

    println!("Goodbye!");
    Ok(())
}
