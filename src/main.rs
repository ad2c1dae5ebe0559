mod app;
mod config;
mod error;
mod input;
mod lyrics;
mod output;
mod spotify;
mod storage;
mod sync;
mod tui;

use anyhow::Context;
use app::AppContext;
use clap::{Parser, Subcommand};
use spotify::Credentials;
use std::fs::{self, OpenOptions};
use std::sync::Mutex;
use sync::SnapshotSource;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Parser)]
#[command(name = "lyricterm", version, about = "Synced lyrics for whatever Spotify is playing")]
struct Cli {
    /// Override config file path.
    #[arg(long)]
    config: Option<std::path::PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Follow playback and display lyrics (default: interactive view).
    Lyric {
        #[command(subcommand)]
        mode: Option<LyricCommand>,
    },
    /// Print the currently playing track.
    Current,
    /// Manage Spotify credentials.
    Auth {
        #[command(subcommand)]
        cmd: AuthCommand,
    },
}

#[derive(Debug, Subcommand)]
enum LyricCommand {
    /// Plain text on one rewritten terminal line.
    Pipe,
    /// Interactive lyric view.
    Show,
}

#[derive(Debug, Subcommand)]
enum AuthCommand {
    /// Store app credentials and a refresh token.
    Set {
        #[arg(long)]
        client_id: String,
        #[arg(long)]
        client_secret: String,
        #[arg(long)]
        refresh_token: String,
    },
    /// Show stored credentials and token expiry.
    Status,
    /// Refresh the access token now.
    Refresh,
    /// Forget stored credentials.
    Clear,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load(cli.config.as_deref()).context("load config")?;
    init_logging(&cfg).context("init logging")?;

    let ctx = AppContext::new(cfg).context("init app")?;

    match cli.command.unwrap_or(Command::Lyric { mode: None }) {
        Command::Lyric { mode } => {
            let cancel = CancellationToken::new();
            spawn_ctrl_c(cancel.clone());
            match mode.unwrap_or(LyricCommand::Show) {
                LyricCommand::Pipe => app::pipe::run(&ctx, cancel).await?,
                LyricCommand::Show => app::show::run(&ctx, cancel).await?,
            }
        }
        Command::Current => {
            match ctx.player().current_playback().await? {
                Some(s) => println!(
                    "{} - {} ({})  {} {} / {}",
                    s.artist,
                    s.title,
                    s.album,
                    if s.is_playing { "playing" } else { "paused" },
                    fmt_ms(s.progress_ms),
                    fmt_ms(s.duration_ms),
                ),
                None => println!("Nothing is playing."),
            }
        }
        Command::Auth { cmd } => match cmd {
            AuthCommand::Set {
                client_id,
                client_secret,
                refresh_token,
            } => {
                // expires_at = 0 forces a refresh on first use.
                ctx.tokens
                    .store(Credentials {
                        client_id,
                        client_secret,
                        refresh_token,
                        ..Default::default()
                    })
                    .await?;
                println!("Saved credentials to {}.", ctx.cfg.paths.credentials_file().display());
            }
            AuthCommand::Status => match ctx.tokens.current().await {
                Some(c) => {
                    println!("client id:     {}", c.client_id);
                    println!("refresh token: {}", if c.refresh_token.is_empty() { "missing" } else { "present" });
                    println!("expires at:    {}", fmt_unix(c.expires_at));
                    println!("expired:       {}", c.is_expired());
                }
                None => println!("Not authenticated. Run `lyricterm auth set`."),
            },
            AuthCommand::Refresh => {
                let c = ctx.tokens.force_refresh().await?;
                println!("Access token refreshed; expires at {}.", fmt_unix(c.expires_at));
            }
            AuthCommand::Clear => {
                ctx.tokens.clear().await?;
                println!("Cleared stored credentials.");
            }
        },
    }

    Ok(())
}

/// Log to a file; stdout belongs to the lyric output.
fn init_logging(cfg: &config::Config) -> anyhow::Result<()> {
    let path = cfg.log_file();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("create dir {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("open log file {}", path.display()))?;
    let level = cfg
        .log
        .level
        .parse::<tracing::Level>()
        .with_context(|| format!("invalid log level {:?}", cfg.log.level))?;

    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_ansi(false)
        .with_max_level(level)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

fn spawn_ctrl_c(cancel: CancellationToken) {
    tokio::spawn(async move {
        tokio::select! {
            _ = cancel.cancelled() => {}
            res = tokio::signal::ctrl_c() => {
                if let Err(e) = res {
                    tracing::warn!(error = %e, "ctrl-c handler unavailable");
                    return;
                }
                tracing::info!("interrupt received, stopping");
                cancel.cancel();
            }
        }
    });
}

fn fmt_ms(ms: u64) -> String {
    let secs = ms / 1000;
    format!("{}:{:02}", secs / 60, secs % 60)
}

fn fmt_unix(ts: i64) -> String {
    if ts == 0 {
        return "never".to_string();
    }
    time::OffsetDateTime::from_unix_timestamp(ts)
        .ok()
        .and_then(|t| t.format(&time::format_description::well_known::Rfc3339).ok())
        .unwrap_or_else(|| ts.to_string())
}
