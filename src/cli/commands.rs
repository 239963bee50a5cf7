use std::io::{self, BufRead, IsTerminal};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use dialoguer::{Password, theme::ColorfulTheme};
use serde_json::json;

use super::logging;
use super::output::{
    format_import_stats, format_message_detail, format_search_results, format_stats,
};
use crate::classify::classify;
use crate::config::{AppConfig, Environment};
use crate::credentials::{CredentialStore, FileKeyValueStore, KeySource};
use crate::filters::filter;
use crate::loader::{LoadReport, TimelineLoader, TimelineSource, probe_thumbnail};
use crate::models::{Message, Timeline, TimelineDay};
use crate::parsers::{parse_chat_export_file, write_timeline_file};
use crate::state::ArchiveState;
use crate::summarize::{ChatCompletionClient, request_summary};
use crate::tui::{self, StatusKind};
use crate::utils::format_path_with_tilde;

const THUMBNAIL_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Parser)]
#[command(name = "chat-archive-explorer")]
#[command(version)]
#[command(about = "Browse, search and summarize an archived group chat", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Read the timeline from a local JSON file
    #[arg(long, global = true, value_name = "PATH")]
    pub timeline: Option<PathBuf>,

    /// Fetch the timeline from a URL (a --timeline file becomes the fallback)
    #[arg(long, global = true, value_name = "URL")]
    pub url: Option<String>,

    /// Deployment environment: production or development
    #[arg(long, global = true, value_name = "ENV", value_parser = Environment::parse)]
    pub env: Option<Environment>,
}

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// Browse the archive interactively (default)
    Browse,
    /// Print messages whose sender or content contains a term
    Search {
        /// Case-insensitive literal search term
        term: String,
        /// Only search this day (MM/DD/YYYY, as shown in the archive)
        #[arg(long)]
        date: Option<String>,
        /// Print the filtered timeline as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show statistics about the archive
    Stats,
    /// Show one message with its classification
    Show {
        date: String,
        /// 1-based position of the message within the day
        index: usize,
        #[arg(long)]
        json: bool,
        /// Check which thumbnail URL actually loads
        #[arg(long)]
        check_thumbnail: bool,
    },
    /// Summarize a long message or transcript
    Summarize {
        date: String,
        /// 1-based position of the message within the day
        index: usize,
    },
    /// Convert a chat export (_chat.txt) into a timeline document
    Import {
        input: PathBuf,
        #[arg(short, long, default_value = "timeline.json")]
        output: PathBuf,
    },
    /// Manage the stored summarization API key
    Key {
        #[command(subcommand)]
        action: KeyAction,
    },
}

#[derive(Subcommand, Clone)]
pub enum KeyAction {
    /// Store a key (prompted for when omitted)
    Set { key: Option<String> },
    /// Remove the stored key
    Clear,
    /// Report whether a key is available
    Status,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command.clone().unwrap_or(Commands::Browse);

    if matches!(command, Commands::Browse) {
        logging::init_tui();
    } else {
        logging::init_stderr();
    }

    let config = load_config(&cli)?;

    match command {
        Commands::Browse => browse(config),
        Commands::Search { term, date, json } => search(&config, &term, date.as_deref(), json),
        Commands::Stats => show_stats(&config),
        Commands::Show { date, index, json, check_thumbnail } => {
            show_message(&config, &date, index, json, check_thumbnail)
        }
        Commands::Summarize { date, index } => summarize(&config, &date, index),
        Commands::Import { input, output } => import(&input, &output),
        Commands::Key { action } => manage_key(action),
    }
}

/// Config file, then environment, then command-line flags
fn load_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = AppConfig::load()?;
    if let Some(env) = cli.env {
        config.environment = env;
    }
    match (&cli.url, &cli.timeline) {
        (Some(url), file) => {
            config.timeline_override = Some(TimelineSource::Http { url: url.clone() });
            if let Some(path) = file {
                config.timeline_file = path.clone();
            }
        }
        (None, Some(path)) => {
            config.timeline_override = Some(TimelineSource::File { path: path.clone() });
        }
        (None, None) => {}
    }
    Ok(config)
}

fn load_report(config: &AppConfig) -> LoadReport {
    TimelineLoader::new(config.http_timeout()).load_with_report(&config.timeline_sources())
}

/// Load the timeline or fail listing every source that was tried
fn load_strict(config: &AppConfig) -> Result<(Timeline, TimelineSource)> {
    let report = load_report(config);
    match report.source {
        Some(source) => Ok((report.timeline, source)),
        None => bail!("Could not load the timeline:\n  {}", report.failures.join("\n  ")),
    }
}

fn browse(config: AppConfig) -> Result<()> {
    let report = load_report(&config);
    let status = match &report.source {
        Some(source) if report.used_fallback() => {
            Some((format!("Primary source unavailable, loaded {}", source), StatusKind::Info))
        }
        Some(_) => None,
        None => Some((
            "✗ Could not load the timeline, showing an empty archive".to_string(),
            StatusKind::Error,
        )),
    };

    let state = ArchiveState::new(report.timeline, CredentialStore::open_default()?);
    let summarizer = Arc::new(ChatCompletionClient::new(&config.summary));
    tui::run_interactive(state, config, summarizer, status)
}

fn search(config: &AppConfig, term: &str, date: Option<&str>, json: bool) -> Result<()> {
    let timeline = load_report(config).timeline;

    if json {
        let filtered = filter(&timeline, term, date);
        println!("{}", serde_json::to_string_pretty(&filtered)?);
        return Ok(());
    }

    let color = io::stdout().is_terminal();
    let (out, count) = format_search_results(&timeline, term, date, color);
    if count == 0 {
        match date {
            Some(date) => println!("No messages match on {}", date),
            None => println!("No messages match your search"),
        }
    } else {
        print!("{}", out);
        println!();
        println!("{} matching messages", count);
    }
    Ok(())
}

fn show_stats(config: &AppConfig) -> Result<()> {
    let (timeline, source) = load_strict(config)?;
    print!("{}", format_stats(&timeline, &source.to_string()));
    Ok(())
}

/// Day with `date` and its message at 1-based `index`
fn find_message<'a>(
    timeline: &'a [TimelineDay],
    date: &str,
    index: usize,
) -> Result<(&'a TimelineDay, &'a Message)> {
    let day = timeline
        .iter()
        .find(|day| day.date == date)
        .with_context(|| format!("No messages on {}", date))?;
    let message = index
        .checked_sub(1)
        .and_then(|idx| day.messages.get(idx))
        .with_context(|| {
            format!("{} has {} messages; pick an index from 1", date, day.messages.len())
        })?;
    Ok((day, message))
}

fn show_message(
    config: &AppConfig,
    date: &str,
    index: usize,
    json: bool,
    check_thumbnail: bool,
) -> Result<()> {
    let (timeline, _) = load_strict(config)?;
    let (day, message) = find_message(&timeline, date, index)?;
    let classification = classify(message);

    let probed = if check_thumbnail {
        classification
            .thumbnail
            .as_ref()
            .map(|thumb| probe_thumbnail(thumb, THUMBNAIL_PROBE_TIMEOUT))
    } else {
        None
    };

    if json {
        let value = json!({
            "date": day.date,
            "index": index,
            "message": message,
            "classification": classification,
            "thumbnail": probed.clone().flatten(),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    let thumbnail = match &probed {
        Some(Some(url)) => Some(url.as_str()),
        Some(None) => Some("(unavailable)"),
        None => None,
    };
    print!("{}", format_message_detail(day, index - 1, message, config, thumbnail));
    Ok(())
}

fn summarize(config: &AppConfig, date: &str, index: usize) -> Result<()> {
    let (timeline, _) = load_strict(config)?;
    let (_, message) = find_message(&timeline, date, index)?;

    if !classify(message).offers_summary {
        bail!("Message is too short to summarize");
    }

    let credentials = CredentialStore::open_default()?;
    let client = ChatCompletionClient::new(&config.summary);
    match request_summary(&client, credentials.api_key().as_deref(), &message.content) {
        Ok(summary) => {
            println!("{}", summary);
            Ok(())
        }
        Err(e) if e.is_credential_related() => {
            bail!("{}\nStore a key with `chat-archive-explorer key set`", e)
        }
        Err(e) => Err(e.into()),
    }
}

fn import(input: &Path, output: &Path) -> Result<()> {
    let imported = parse_chat_export_file(input)?;
    write_timeline_file(output, &imported.timeline)?;

    println!("Imported {}", format_path_with_tilde(input));
    print!("{}", format_import_stats(&imported.stats));
    println!("Wrote {}", format_path_with_tilde(output));
    Ok(())
}

fn manage_key(action: KeyAction) -> Result<()> {
    let mut credentials = CredentialStore::open_default()?;

    match action {
        KeyAction::Set { key } => {
            let key = match key {
                Some(key) => key,
                None => read_key()?,
            };
            credentials.set_api_key(&key)?;
            println!("API key saved");
        }
        KeyAction::Clear => {
            credentials.clear_api_key()?;
            println!("API key removed");
        }
        KeyAction::Status => {
            let store = FileKeyValueStore::open_default()?;
            match credentials.api_key_with_source() {
                Some((_, KeySource::Stored)) => {
                    println!("API key stored in {}", format_path_with_tilde(store.path()))
                }
                Some((_, KeySource::Environment)) => {
                    println!("API key taken from the GROQ_API_KEY environment variable")
                }
                None => println!("No API key configured"),
            }
        }
    }
    Ok(())
}

/// Prompt without echo on a terminal, otherwise read one line from stdin
fn read_key() -> Result<String> {
    if io::stdin().is_terminal() {
        return Password::with_theme(&ColorfulTheme::default())
            .with_prompt("API key")
            .interact()
            .context("Failed to read API key");
    }

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line).context("Failed to read API key from stdin")?;
    Ok(line.trim().to_string())
}
