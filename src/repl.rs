use anyhow::{Context, Result};
use colored::Colorize;
use reqwest::Client;
use rustyline::Editor;
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::history::DefaultHistory;
use std::borrow::Cow;
use std::future::Future;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::api::{self, ChatOptions};
use crate::config::Config;
use crate::message::Message;
use crate::render;

const HISTORY_FILE: &str = ".groqsh_history";
const PROMPT: &str = "groqsh> ";
const INTERRUPT_NOTICE: &str =
    "\nKeyboard interrupt detected. Type 'exit' or press Ctrl+D to quit.";

fn history_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(HISTORY_FILE)
}

fn is_exit_command(input: &str) -> bool {
    input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit")
}

/// Paints the prompt blue. rustyline needs the plain string for width
/// accounting, so the color goes through the highlighter hook rather
/// than being baked into the prompt itself.
struct ReplHelper;

impl rustyline::completion::Completer for ReplHelper {
    type Candidate = String;
}

impl rustyline::hint::Hinter for ReplHelper {
    type Hint = String;
}

impl rustyline::validate::Validator for ReplHelper {}

impl Highlighter for ReplHelper {
    fn highlight_prompt<'b, 's: 'b, 'p: 'b>(
        &'s self,
        prompt: &'p str,
        default: bool,
    ) -> Cow<'b, str> {
        if default {
            Cow::Owned(prompt.blue().to_string())
        } else {
            Cow::Borrowed(prompt)
        }
    }
}

impl rustyline::Helper for ReplHelper {}

/// One turn's outcome: either the completion finished (successfully or
/// not), or the user interrupted the wait.
enum TurnOutcome {
    Reply(Result<String>),
    Interrupted,
}

/// Race the pending completion against an interrupt. Dropping the
/// losing future cancels the in-flight request.
async fn reply_or_interrupt<R, I>(reply: R, interrupt: I) -> TurnOutcome
where
    R: Future<Output = Result<String>>,
    I: Future<Output = ()>,
{
    tokio::select! {
        reply = reply => TurnOutcome::Reply(reply),
        _ = interrupt => TurnOutcome::Interrupted,
    }
}

async fn ctrl_c() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for interrupt signal");
        std::future::pending::<()>().await;
    }
}

/// Interactive chat loop. The transcript grows turn by turn and lives
/// only for the duration of the session; command history is the one
/// thing persisted, to `~/.groqsh_history`. Ctrl-C never ends the
/// session: at the prompt it discards the current line, and during a
/// pending completion it abandons the wait, both returning to the
/// prompt with the transcript intact.
pub async fn run(client: &Client, cfg: &Config, model: &str) -> Result<()> {
    let editor_config = rustyline::Config::builder()
        .max_history_size(cfg.history_max_entries)
        .context("Invalid history size")?
        .build();
    let mut editor: Editor<ReplHelper, DefaultHistory> =
        Editor::with_config(editor_config).context("Failed to initialize line editor")?;
    editor.set_helper(Some(ReplHelper));

    let history_path = history_path();
    if let Err(err) = editor.load_history(&history_path) {
        debug!(path = %history_path.display(), error = %err, "no command history loaded");
    }

    println!(
        "{}",
        format!("Entering interactive mode with {model}. Type 'exit' or press Ctrl+D to quit.")
            .as_str()
            .green()
    );
    info!(model = %model, "interactive session started");

    let mut transcript: Vec<Message> = Vec::new();
    let options = ChatOptions {
        json_mode: false,
        max_tokens: Some(cfg.max_tokens),
    };

    loop {
        match editor.readline(PROMPT) {
            Ok(line) => {
                let input = line.trim();
                if input.is_empty() {
                    continue;
                }
                if let Err(err) = editor.add_history_entry(line.as_str()) {
                    warn!(error = %err, "failed to record history entry");
                }
                if is_exit_command(input) {
                    println!("\nExiting...");
                    break;
                }

                transcript.push(Message::user(input));
                let chat = api::chat(client, cfg, model, &transcript, &options);
                match reply_or_interrupt(chat, ctrl_c()).await {
                    TurnOutcome::Reply(Ok(reply)) => {
                        println!("{}", render::render_markdown(&reply));
                        transcript.push(Message::assistant(reply));
                    }
                    TurnOutcome::Reply(Err(err)) => {
                        eprintln!("{}", format!("Error: {err:#}").as_str().red());
                    }
                    TurnOutcome::Interrupted => {
                        debug!("completion wait interrupted");
                        println!("{INTERRUPT_NOTICE}");
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{INTERRUPT_NOTICE}");
            }
            Err(ReadlineError::Eof) => {
                println!("\nExiting...");
                break;
            }
            Err(err) => return Err(err).context("Failed to read input"),
        }
    }

    if let Err(err) = editor.save_history(&history_path) {
        warn!(path = %history_path.display(), error = %err, "failed to save command history");
    }
    Ok(())
}
