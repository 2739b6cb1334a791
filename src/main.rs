use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use dictate::config::{DictationConfig, GroupingMode};
use dictate::playback::{SegmentPlaybackController, SimulatedMedia};
use dictate::scoring::{score, ScoreResult, WordStatus};
use dictate::session::{CheckOutcome, DictationSession, EventOutcome, InputEvent};
use dictate::store::{JsonFileStore, SavedTextRegistry};
use dictate::timing::{sentences_from_text, sentences_from_transcript, TranscriptEntry};
use dictate::typing::progress_label;

#[derive(Parser, Debug)]
#[command(name = "dictate")]
#[command(about = "Sentence-by-sentence dictation practice with word-level scoring")]
#[command(version)]
struct Args {
    /// JSON config file; command-line flags override its values
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Split a text file into sentences with estimated timings
    Segment {
        file: PathBuf,
    },
    /// Score one submission and print the result as JSON
    Score {
        #[arg(long)]
        expected: String,
        #[arg(long)]
        submitted: String,
    },
    /// Interactive dictation on stdin
    Practice {
        /// Plain text, or a JSON transcript with --transcript
        #[arg(required_unless_present = "saved")]
        file: Option<PathBuf>,

        /// Treat FILE as a JSON array of {text, start, duration?, end?} entries
        #[arg(long)]
        transcript: bool,

        /// Practice a saved text by id instead of FILE
        #[arg(long, conflicts_with = "file")]
        saved: Option<String>,

        #[arg(long, default_value = ".dictate_texts.json")]
        store: PathBuf,

        /// Grouping mode: 1 sentence or 2 sentences per unit
        #[arg(long)]
        mode: Option<u8>,

        /// Total plays per play request
        #[arg(long)]
        repeat: Option<u32>,
    },
    /// Manage saved practice texts
    Texts {
        #[arg(long, default_value = ".dictate_texts.json")]
        store: PathBuf,

        #[command(subcommand)]
        action: TextsAction,
    },
}

#[derive(Subcommand, Debug)]
enum TextsAction {
    /// Save a text file; updates the entry when --id names an existing one
    Save {
        file: PathBuf,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        id: Option<String>,
    },
    List,
    Show {
        id: String,
    },
    Delete {
        id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // WHY: JSON logs on stderr keep stdout clean for command output
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .json()
        .init();

    let args = Args::parse();
    info!(?args, "Parsed CLI arguments");

    let config = match &args.config {
        Some(path) => DictationConfig::load(path)?,
        None => DictationConfig::default(),
    };

    match args.command {
        Command::Segment { file } => run_segment(&file).await,
        Command::Score { expected, submitted } => {
            let result = score(&expected, &submitted);
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
        Command::Practice { file, transcript, saved, store, mode, repeat } => {
            let mut config = config;
            if let Some(mode) = mode {
                config.grouping_mode = GroupingMode::try_from(mode)?;
            }
            if let Some(repeat) = repeat {
                config.repeat_count = repeat;
            }
            let source = match (file, saved) {
                (Some(file), _) => PracticeSource::File { path: file, transcript },
                (None, Some(id)) => PracticeSource::Saved { id, store },
                (None, None) => anyhow::bail!("Either FILE or --saved is required"),
            };
            run_practice(config, source).await
        }
        Command::Texts { store, action } => run_texts(&store, action).await,
    }
}

async fn read_file(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))
}

async fn run_segment(file: &Path) -> Result<()> {
    let text = read_file(file).await?;
    let sentences = sentences_from_text(&text);
    info!(sentences = sentences.len(), "Segmented text");
    for (i, sentence) in sentences.iter().enumerate() {
        println!("{}\t{}\t{}", i + 1, sentence.timestamp(), sentence.text);
    }
    Ok(())
}

async fn run_texts(store_path: &Path, action: TextsAction) -> Result<()> {
    let mut registry = SavedTextRegistry::new(JsonFileStore::new(store_path));
    match action {
        TextsAction::Save { file, title, id } => {
            let text = read_file(&file).await?;
            let saved = registry.save(&text, title.as_deref(), id.as_deref())?;
            println!("{}\t{}", saved.id, saved.title);
        }
        TextsAction::List => {
            for saved in registry.list()? {
                println!(
                    "{}\t{}\t{}",
                    saved.id,
                    saved.last_modified.format("%Y-%m-%d %H:%M"),
                    saved.title
                );
            }
        }
        TextsAction::Show { id } => match registry.load(&id)? {
            Some(saved) => println!("{}", saved.text),
            None => anyhow::bail!("No saved text with id {id}"),
        },
        TextsAction::Delete { id } => {
            if !registry.delete(&id)? {
                anyhow::bail!("No saved text with id {id}");
            }
            println!("Deleted {id}");
        }
    }
    Ok(())
}

enum PracticeSource {
    File { path: PathBuf, transcript: bool },
    Saved { id: String, store: PathBuf },
}

async fn run_practice(config: DictationConfig, source: PracticeSource) -> Result<()> {
    let sentences = match source {
        PracticeSource::File { path, transcript: true } => {
            let raw = read_file(&path).await?;
            let entries: Vec<TranscriptEntry> = serde_json::from_str(&raw)
                .with_context(|| format!("Failed to parse transcript {}", path.display()))?;
            sentences_from_transcript(&entries)
        }
        PracticeSource::File { path, transcript: false } => {
            sentences_from_text(&read_file(&path).await?)
        }
        PracticeSource::Saved { id, store } => {
            let registry = SavedTextRegistry::new(JsonFileStore::new(store));
            let saved = registry
                .load(&id)?
                .with_context(|| format!("No saved text with id {id}"))?;
            sentences_from_text(&saved.text)
        }
    };
    if sentences.is_empty() {
        anyhow::bail!("Nothing to practice: no sentences found");
    }

    let total_length = sentences.last().map(|s| s.end + 1.0);
    let media = Arc::new(SimulatedMedia::new(total_length));
    let (controller, mut playback_events) =
        SegmentPlaybackController::new(Arc::clone(&media), config.poll_interval());
    let mut session = DictationSession::new(config, controller)?;
    session.load(sentences);

    println!("Type what you hear and press Enter. Commands: :next :prev :play :replay :mode 1|2 :repeat N :goto N :quit");
    announce(&session);
    let started = session.play_current();
    report_playback(&session, started);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read stdin")? else {
                    break;
                };
                if !handle_line(&mut session, line.trim()) {
                    break;
                }
            }
            Some(event) = playback_events.recv() => {
                if !session.on_playback_event(event) {
                    info!("Playback finished");
                }
            }
        }
    }

    let (attempted, total) = session.progress();
    println!("Attempted {attempted} of {total} sentences");
    Ok(())
}

/// Returns false when the user asked to quit
fn handle_line(session: &mut DictationSession<SimulatedMedia>, line: &str) -> bool {
    let mut parts = line.split_whitespace();
    let outcome = match (parts.next(), parts.next()) {
        (Some(":quit"), _) | (Some(":q"), _) => return false,
        (Some(":next"), _) => session.handle_event(InputEvent::Next),
        (Some(":prev"), _) => session.handle_event(InputEvent::Previous),
        (Some(":play"), _) => session.handle_event(InputEvent::PlayRequested),
        (Some(":replay"), _) => session.handle_event(InputEvent::ReplayRequested),
        (Some(":goto"), Some(n)) => match n.parse::<usize>() {
            Ok(n) if n >= 1 => session.handle_event(InputEvent::JumpTo(n - 1)),
            _ => {
                println!("Usage: :goto N (1-based)");
                return true;
            }
        },
        (Some(":mode"), Some(n)) => {
            match n.parse::<u8>().map_err(anyhow::Error::from).and_then(|n| {
                GroupingMode::try_from(n).map_err(anyhow::Error::from)
            }) {
                Ok(mode) => {
                    session.set_grouping_mode(mode);
                    announce(session);
                }
                Err(e) => println!("{e}"),
            }
            return true;
        }
        (Some(":repeat"), Some(n)) => {
            match n.parse::<u32>() {
                Ok(n) => session.set_repeat_count(n),
                Err(e) => println!("{e}"),
            }
            return true;
        }
        (Some(cmd), _) if cmd.starts_with(':') => {
            println!("Unknown command {cmd}");
            return true;
        }
        // An empty line submits the draft, which confirms a solved sentence
        (None, _) => session.handle_event(InputEvent::Submit),
        _ => {
            session.handle_event(InputEvent::Typed(line.to_string()));
            session.handle_event(InputEvent::Submit)
        }
    };

    match outcome {
        EventOutcome::Navigated(true) => announce(session),
        EventOutcome::Navigated(false) => println!("No more sentences in that direction"),
        EventOutcome::Played(result) => report_playback(session, result),
        EventOutcome::Checked(CheckOutcome::Scored(result)) => {
            println!("{}", render_feedback(&result));
            if result.is_correct() {
                println!("Press Enter to continue");
            }
        }
        EventOutcome::Checked(CheckOutcome::Advanced { moved: true }) => {
            announce(session);
            let started = session.play_current();
            report_playback(session, started);
        }
        EventOutcome::Checked(CheckOutcome::Advanced { moved: false }) => {
            println!("That was the last sentence");
        }
        EventOutcome::Checked(CheckOutcome::Empty) => println!("Type what you hear first"),
        EventOutcome::InputUpdated | EventOutcome::Delivered(_) => {}
    }
    true
}

fn announce(session: &DictationSession<SimulatedMedia>) {
    let (_, total) = session.progress();
    let timestamp = session
        .active_sentence()
        .map(|s| s.timestamp())
        .unwrap_or_default();
    println!("Sentence {} at {timestamp}", progress_label(session.current_index(), total));
}

fn report_playback(
    session: &DictationSession<SimulatedMedia>,
    result: Result<Option<u64>, dictate::PlaybackError>,
) {
    match result {
        Ok(Some(_)) => info!(
            index = session.current_index(),
            repeats = session.playback_state().remaining_repeats,
            "Playing sentence"
        ),
        Ok(None) => println!("Nothing to play"),
        Err(e) => {
            warn!(error = %e, "Playback failed");
            println!("Playback failed: {e}");
        }
    }
}

/// Correct words in clear, everything else masked
fn render_feedback(result: &ScoreResult) -> String {
    let mut words: Vec<String> = result
        .breakdown
        .iter()
        .map(|entry| match entry.status {
            WordStatus::Correct => entry.expected.clone(),
            WordStatus::Incorrect | WordStatus::Missing => entry.masked_expected.clone(),
        })
        .collect();
    words.extend(result.extra_words.iter().map(|extra| format!("+{}", extra.masked)));
    format!(
        "{} ({}%)\n{}",
        result.message(),
        result.accuracy_percent,
        words.join(" ")
    )
}
