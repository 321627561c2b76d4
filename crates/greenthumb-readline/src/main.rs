mod command;
mod render;

use std::borrow::Cow::{self, Borrowed, Owned};
use std::sync::Arc;

use anyhow::{Context as _, Result};
use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use greenthumb_application::{
    AnalysisOutcome, ChatService, ConversationStore, PlantAnalyzerService, SendOutcome,
    SessionGateway,
};
use greenthumb_core::conversation::Conversation;
use greenthumb_infrastructure::{
    ConfigService, EnvSecretService, FileConversationRepository, GreenThumbPaths, ImageNormalizer,
};
use greenthumb_interaction::GeminiApiClient;

use crate::command::{Command, SLASH_COMMANDS};
use crate::render::{render_markdown, render_turn};

const DEFAULT_LOG_FILTER: &str = "greenthumb=info";

/// CLI helper for rustyline that provides completion, highlighting, and hints.
#[derive(Clone)]
struct CliHelper {
    commands: Vec<String>,
}

impl CliHelper {
    fn new() -> Self {
        Self {
            commands: SLASH_COMMANDS.iter().map(|cmd| cmd.to_string()).collect(),
        }
    }
}

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];

        if line.starts_with('/') && !line.contains(' ') {
            let candidates: Vec<Pair> = self
                .commands
                .iter()
                .filter(|cmd| cmd.starts_with(line))
                .map(|cmd| Pair {
                    display: cmd.clone(),
                    replacement: cmd.clone(),
                })
                .collect();
            Ok((0, candidates))
        } else {
            Ok((0, vec![]))
        }
    }
}

impl Highlighter for CliHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];

        if line.starts_with('/') && !line.contains(' ') {
            self.commands
                .iter()
                .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
                .map(|cmd| cmd[line.len()..].to_string())
        } else {
            None
        }
    }
}

impl Validator for CliHelper {}

/// Sends logs to a daily file under the config directory so they never
/// interleave with the REPL. Returns the guard that flushes on drop.
fn init_logging(paths: &GreenThumbPaths) -> Option<WorkerGuard> {
    let logs_dir = paths.logs_dir().ok()?;
    std::fs::create_dir_all(&logs_dir).ok()?;

    let file_appender = tracing_appender::rolling::daily(&logs_dir, "greenthumb.log");
    let (writer, guard) = tracing_appender::non_blocking(file_appender);
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();

    Some(guard)
}

fn print_help() {
    println!("{}", "Ask any gardening question, or:".bright_black());
    println!("{}", "  /analyze <path>  identify a plant from a photo".bright_black());
    println!("{}", "  /clear           start a new conversation".bright_black());
    println!("{}", "  /history         show the conversation".bright_black());
    println!("{}", "  quit             leave".bright_black());
}

fn print_conversation(conversation: &Conversation) {
    for turn in conversation.turns() {
        println!("{}", render_turn(turn));
        println!();
    }
}

/// The main entry point for the GreenThumb REPL.
///
/// Wires the layers together, restores the previous conversation and then
/// reads lines until `quit`, `exit` or end of input.
#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let paths = GreenThumbPaths::from_env();
    let _log_guard = init_logging(&paths);
    tracing::info!("GreenThumb starting");

    // ===== Backend Initialization =====
    let config = ConfigService::new(&paths)?
        .load()
        .context("Failed to load config.toml")?;
    let secrets = Arc::new(EnvSecretService::default());
    let client = Arc::new(GeminiApiClient::new(config.gemini, secrets)?);
    let gateway = Arc::new(SessionGateway::new(client));

    let repository = Arc::new(FileConversationRepository::new(&paths)?);
    let chat = ChatService::start(ConversationStore::new(repository), gateway.clone()).await;
    let analyzer = PlantAnalyzerService::new(gateway, ImageNormalizer::new());

    // ===== REPL Setup =====
    let mut rl = Editor::new()?;
    rl.set_helper(Some(CliHelper::new()));

    println!("{}", "=== GreenThumb ===".bright_green().bold());
    println!(
        "{}",
        "Type a question, '/analyze <path>' for a plant photo, '/help' for commands, or 'quit' to exit."
            .bright_black()
    );
    println!();
    print_conversation(&chat.conversation().await);

    // ===== Main REPL Loop =====
    loop {
        let readline = rl.readline(">> ");

        match readline {
            Ok(line) => {
                let Some(command) = Command::parse(&line) else {
                    continue;
                };
                let _ = rl.add_history_entry(line.trim());

                match command {
                    Command::Quit => {
                        println!("{}", "Happy gardening!".bright_green());
                        break;
                    }
                    Command::Chat(text) => {
                        println!("{}", "Thinking...".bright_black());
                        match chat.send(&text).await {
                            SendOutcome::Replied(turn) | SendOutcome::Failed(turn) => {
                                println!("{}", render_turn(&turn));
                                println!();
                            }
                            SendOutcome::Suppressed => {
                                println!("{}", "Still waiting for the last reply.".yellow());
                            }
                            SendOutcome::Empty => {}
                        }
                    }
                    Command::Analyze(path) => {
                        println!("{}", "Analyzing leaf patterns...".bright_black());
                        match analyzer.analyze_file(path).await {
                            AnalysisOutcome::Identified(markdown) => {
                                println!("{}", render_markdown(&markdown));
                                println!();
                            }
                            AnalysisOutcome::Failed(message) => println!("{}", message.red()),
                            AnalysisOutcome::Suppressed => {
                                println!("{}", "An analysis is already running.".yellow());
                            }
                        }
                    }
                    Command::MissingPath => {
                        println!("{}", "Usage: /analyze <path-to-photo>".yellow());
                    }
                    Command::Clear => {
                        let conversation = chat.reset().await;
                        println!("{}", "Conversation cleared.".bright_black());
                        print_conversation(&conversation);
                    }
                    Command::History => print_conversation(&chat.conversation().await),
                    Command::Help => print_help(),
                    Command::Unknown(name) => {
                        println!("{}", format!("Unknown command: {}", name).bright_black());
                    }
                }
            }
            Err(rustyline::error::ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type 'quit' to exit.".yellow());
            }
            Err(rustyline::error::ReadlineError::Eof) => {
                println!("{}", "CTRL-D detected. Exiting...".bright_green());
                break;
            }
            Err(err) => {
                eprintln!("{}", format!("Error: {:?}", err).red());
                break;
            }
        }
    }

    tracing::info!("GreenThumb exiting");
    Ok(())
}
