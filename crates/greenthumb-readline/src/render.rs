use colored::Colorize;

use greenthumb_core::conversation::{Role, Turn};
use greenthumb_core::markdown::{self, Block, Span};

/// Renders model markdown as colored terminal lines.
pub fn render_markdown(text: &str) -> String {
    markdown::render(text)
        .iter()
        .map(render_block)
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_block(block: &Block) -> String {
    let line: String = block
        .spans
        .iter()
        .map(|span| match span {
            Span::Plain(text) => text.clone(),
            Span::Emphasis(text) => text.bold().to_string(),
            Span::Bullet(text) => format!("  • {}", text),
        })
        .collect();

    if block.is_heading() {
        line.bright_green().bold().to_string()
    } else {
        line
    }
}

/// Renders one conversation turn.
pub fn render_turn(turn: &Turn) -> String {
    match turn.role {
        Role::User => format!("> {}", turn.text).green().to_string(),
        Role::Model if turn.is_error => turn.text.red().to_string(),
        Role::Model => render_markdown(&turn.text),
    }
}
