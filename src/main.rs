use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, reload, EnvFilter};
use video_digest::config::LoggingConfig;
use video_digest::display::{render_session, render_summary, render_turn};
use video_digest::{
    extract_video_id, Config, Conversation, HttpVideoService, SessionController, SessionUpdate,
    SubmitRejected, SummaryFormatter, VideoReference, VideoService,
};

#[derive(Parser)]
#[command(name = "video-digest")]
#[command(version, about = "Summaries and question answering for YouTube videos")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (defaults to ./video-digest.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the service base URL
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the summary of a video
    Summarize {
        /// YouTube video URL
        url: String,
    },
    /// Ask a single question about a video
    Ask {
        /// YouTube video URL
        url: String,
        /// Question about the video
        question: String,
    },
    /// Interactive session: summarize videos and chat about them
    Chat {
        /// Video to start with
        url: Option<String>,
    },
}

/// A line typed in the interactive session
#[derive(Debug, PartialEq, Eq)]
enum ChatCommand<'a> {
    Video(&'a str),
    Show,
    Quit,
    Message(&'a str),
}

fn parse_chat_line(line: &str) -> ChatCommand<'_> {
    let line = line.trim();
    match line {
        "/quit" | "/exit" => ChatCommand::Quit,
        "/show" => ChatCommand::Show,
        "/video" => ChatCommand::Video(""),
        _ => {
            if let Some(url) = line.strip_prefix("/video ") {
                ChatCommand::Video(url.trim())
            } else if extract_video_id(line).is_some() && !line.contains(' ') {
                ChatCommand::Video(line)
            } else {
                ChatCommand::Message(line)
            }
        }
    }
}

/// Tracing filter directives: `--verbose` first, then `RUST_LOG`, then the configured level
fn log_directives(verbose: bool, rust_log: Option<&str>, configured: &str) -> String {
    if verbose {
        return "video_digest=debug,info".to_string();
    }
    match rust_log.map(str::trim) {
        Some(directives) if !directives.is_empty() => directives.to_string(),
        _ => configured.to_string(),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging before the config is read so its messages are shown,
    // then switch to the configured level once it is known
    let rust_log = std::env::var("RUST_LOG").ok();
    let bootstrap = log_directives(cli.verbose, rust_log.as_deref(), &LoggingConfig::default().level);
    let (filter, filter_handle) = reload::Layer::new(EnvFilter::new(&bootstrap));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?.with_env_overrides()?,
        None => Config::load()?,
    };
    if let Some(base_url) = &cli.base_url {
        config.service.base_url = base_url.clone();
    }

    let directives = log_directives(cli.verbose, rust_log.as_deref(), &config.logging.level);
    if directives != bootstrap {
        filter_handle.reload(EnvFilter::new(&directives))?;
    }

    config.validate()?;
    tracing::debug!("{}", config.summary());

    let service = Arc::new(HttpVideoService::new(&config.service)?);
    let formatter = SummaryFormatter::new(&config.summary);

    match cli.command {
        Commands::Summarize { url } => run_summarize(service, formatter, &url).await,
        Commands::Ask { url, question } => run_ask(service.as_ref(), &url, &question).await,
        Commands::Chat { url } => run_chat(service, formatter, url.as_deref()).await,
    }
}

async fn run_summarize(
    service: Arc<HttpVideoService>,
    formatter: SummaryFormatter,
    url: &str,
) -> Result<()> {
    let (mut session, mut events) = SessionController::new(service, formatter);
    session.submit_url(url)?;

    while session.is_loading() {
        let event = events
            .recv()
            .await
            .ok_or_else(|| anyhow!("Summary request was dropped"))?;
        session.handle_event(event);
    }

    if let Some(summary) = session.summary() {
        println!("{}", render_summary(summary));
    }
    Ok(())
}

async fn run_ask(service: &dyn VideoService, url: &str, question: &str) -> Result<()> {
    let mut conversation = Conversation::for_video(VideoReference::parse(url)?);
    let request = conversation.submit(question)?;

    match service.ask(&request.video_url, &request.question).await {
        Ok(answer) => conversation.on_response(request.request_id, answer),
        Err(e) => conversation.on_failure(request.request_id, &e.to_string()),
    };

    for turn in conversation.turns() {
        println!("{}", render_turn(turn));
    }
    Ok(())
}

async fn run_chat(
    service: Arc<HttpVideoService>,
    formatter: SummaryFormatter,
    initial_url: Option<&str>,
) -> Result<()> {
    let (mut session, mut events) = SessionController::new(service, formatter);

    if let Some(url) = initial_url {
        start_video(&mut session, url);
    }

    println!("Paste a YouTube URL (or /video <url>) to summarize it, type a question to chat.");
    println!("/show prints the session, /quit exits.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_chat_line(&line) {
                    ChatCommand::Quit => break,
                    ChatCommand::Show => println!("{}", render_session(&session)),
                    ChatCommand::Video(url) => start_video(&mut session, url),
                    ChatCommand::Message(message) => match session.submit_chat(message) {
                        Ok(()) => {
                            if let Some(turn) = session.conversation().turns().last() {
                                println!("{}", render_turn(turn));
                            }
                        }
                        Err(SubmitRejected::EmptyMessage) => {}
                        Err(e) => println!("Not sent: {}", e),
                    },
                }
            }
            Some(event) = events.recv() => {
                match session.handle_event(event) {
                    SessionUpdate::SummaryPublished => {
                        if let Some(summary) = session.summary() {
                            println!("{}", render_summary(summary));
                        }
                    }
                    SessionUpdate::ConversationAdvanced => {
                        if let Some(turn) = session.conversation().turns().last() {
                            println!("{}", render_turn(turn));
                        }
                    }
                    SessionUpdate::Discarded => {}
                }
            }
        }
    }

    info!("👋 Session closed");
    Ok(())
}

fn start_video(session: &mut SessionController, url: &str) {
    match session.submit_url(url) {
        Ok(reference) => {
            if let Some(id) = &reference.canonical_id {
                println!("Video: {} ({})", id, id.embed_url());
            }
            println!("Summarizing...");
        }
        Err(e) => {
            warn!("{}", e);
            println!("{}", e);
        }
    }
}
