use std::path::PathBuf;

/// Slash commands offered for completion.
pub const SLASH_COMMANDS: [&str; 4] = ["/analyze", "/clear", "/history", "/help"];

/// One parsed REPL line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Chat(String),
    Analyze(PathBuf),
    Clear,
    History,
    Help,
    Quit,
    Unknown(String),
    /// `/analyze` without a path.
    MissingPath,
}

impl Command {
    /// Parses one line. Chat text is passed through exactly as typed;
    /// trimming only decides whether the line is blank or a command.
    pub fn parse(line: &str) -> Option<Self> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return None;
        }

        if trimmed == "quit" || trimmed == "exit" {
            return Some(Command::Quit);
        }

        if !trimmed.starts_with('/') {
            return Some(Command::Chat(line.to_string()));
        }

        let (name, rest) = trimmed
            .split_once(char::is_whitespace)
            .map(|(name, rest)| (name, rest.trim()))
            .unwrap_or((trimmed, ""));

        let command = match name {
            "/analyze" => match unquote(rest) {
                "" => Command::MissingPath,
                path => Command::Analyze(expand_home(path)),
            },
            "/clear" => Command::Clear,
            "/history" => Command::History,
            "/help" => Command::Help,
            other => Command::Unknown(other.to_string()),
        };
        Some(command)
    }
}

/// Strips one pair of matching quotes, as left by drag-and-drop into a terminal.
fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}

fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), std::env::var_os("HOME")) {
        (Some(rest), Some(home)) => PathBuf::from(home).join(rest),
        _ => PathBuf::from(path),
    }
}
