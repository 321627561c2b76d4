//! Minimal markdown tokenizer for model replies.
//!
//! Supported subset, one block per input line:
//!
//! - a line starting with `#` is a heading (the marker stays in the text)
//! - `**...**` runs become emphasis, delimiters stripped (shortest match)
//! - a fragment whose trimmed text starts with `* ` or `- ` becomes a bullet
//! - everything else is plain text, whitespace preserved
//!
//! Nothing spans lines: no grouped lists, italics, links or code blocks.
//! A fragment that follows a bold run and starts with a bullet marker is
//! also treated as a bullet, matching how replies have always been shown.

const BOLD_DELIMITER: &str = "**";
const BULLET_MARKERS: [&str; 2] = ["* ", "- "];

/// Kind of a rendered line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Heading,
    Paragraph,
}

/// A fragment of a rendered line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Span {
    Plain(String),
    Emphasis(String),
    Bullet(String),
}

impl Span {
    pub fn text(&self) -> &str {
        match self {
            Span::Plain(text) | Span::Emphasis(text) | Span::Bullet(text) => text,
        }
    }
}

/// One rendered line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub kind: BlockKind,
    pub spans: Vec<Span>,
}

impl Block {
    pub fn is_heading(&self) -> bool {
        self.kind == BlockKind::Heading
    }

    pub fn is_bulleted(&self) -> bool {
        self.spans.iter().any(|span| matches!(span, Span::Bullet(_)))
    }

    /// Concatenated span text without any markers.
    pub fn plain_text(&self) -> String {
        self.spans.iter().map(Span::text).collect()
    }
}

/// Tokenizes `text` into one block per `\n`-separated line.
pub fn render(text: &str) -> Vec<Block> {
    text.split('\n').map(render_line).collect()
}

fn render_line(line: &str) -> Block {
    let kind = if line.starts_with('#') {
        BlockKind::Heading
    } else {
        BlockKind::Paragraph
    };

    let spans = split_bold(line)
        .into_iter()
        .filter_map(classify_fragment)
        .collect();

    Block { kind, spans }
}

/// Splits a line around `**...**` runs, keeping the runs with their delimiters.
///
/// Mirrors a lazy `(\*\*.*?\*\*)` split: gaps between runs are kept even
/// when empty so classification sees exactly the same fragments.
fn split_bold(line: &str) -> Vec<&str> {
    let mut fragments = Vec::new();
    let mut cursor = 0;

    while let Some(open_rel) = line[cursor..].find(BOLD_DELIMITER) {
        let open = cursor + open_rel;
        let search_from = open + BOLD_DELIMITER.len();
        let Some(close_rel) = line[search_from..].find(BOLD_DELIMITER) else {
            // No later opener can close either, so the rest is plain.
            break;
        };
        let end = search_from + close_rel + BOLD_DELIMITER.len();

        fragments.push(&line[cursor..open]);
        fragments.push(&line[open..end]);
        cursor = end;
    }

    fragments.push(&line[cursor..]);
    fragments
}

fn classify_fragment(fragment: &str) -> Option<Span> {
    if fragment.starts_with(BOLD_DELIMITER) && fragment.ends_with(BOLD_DELIMITER) {
        let inner = fragment
            .get(BOLD_DELIMITER.len()..fragment.len().saturating_sub(BOLD_DELIMITER.len()))
            .unwrap_or_default();
        return Some(Span::Emphasis(inner.to_string()));
    }

    let trimmed = fragment.trim();
    if BULLET_MARKERS.iter().any(|marker| trimmed.starts_with(marker)) {
        return Some(Span::Bullet(trimmed[2..].to_string()));
    }

    if fragment.is_empty() {
        None
    } else {
        Some(Span::Plain(fragment.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bold_then_bullet_lines() {
        let blocks = render("**Water** daily\n- check soil");
        assert_eq!(blocks.len(), 2);

        assert!(!blocks[0].is_heading());
        assert_eq!(
            blocks[0].spans,
            vec![
                Span::Emphasis("Water".to_string()),
                Span::Plain(" daily".to_string())
            ]
        );

        assert!(blocks[1].is_bulleted());
        assert_eq!(blocks[1].spans, vec![Span::Bullet("check soil".to_string())]);
    }

    #[test]
    fn test_heading_keeps_marker() {
        let blocks = render("## Care Guide");
        assert_eq!(blocks.len(), 1);
        assert!(blocks[0].is_heading());
        assert_eq!(blocks[0].plain_text(), "## Care Guide");
    }

    #[test]
    fn test_heading_with_bold() {
        let blocks = render("# **Monstera** deliciosa");
        assert!(blocks[0].is_heading());
        assert_eq!(
            blocks[0].spans,
            vec![
                Span::Plain("# ".to_string()),
                Span::Emphasis("Monstera".to_string()),
                Span::Plain(" deliciosa".to_string())
            ]
        );
    }

    #[test]
    fn test_star_bullet_and_indentation() {
        let blocks = render("   * bright, indirect light");
        assert_eq!(
            blocks[0].spans,
            vec![Span::Bullet("bright, indirect light".to_string())]
        );
    }

    #[test]
    fn test_multiple_bold_runs_use_shortest_match() {
        let blocks = render("**Light:** bright **Water:** weekly");
        assert_eq!(
            blocks[0].spans,
            vec![
                Span::Emphasis("Light:".to_string()),
                Span::Plain(" bright ".to_string()),
                Span::Emphasis("Water:".to_string()),
                Span::Plain(" weekly".to_string())
            ]
        );
    }

    #[test]
    fn test_unclosed_bold_is_plain() {
        let blocks = render("a **dangling marker");
        assert_eq!(
            blocks[0].spans,
            vec![Span::Plain("a **dangling marker".to_string())]
        );
    }

    #[test]
    fn test_bullet_after_bold_span() {
        let blocks = render("**Note** - keep moist");
        assert_eq!(
            blocks[0].spans,
            vec![
                Span::Emphasis("Note".to_string()),
                Span::Bullet("keep moist".to_string())
            ]
        );
    }

    #[test]
    fn test_empty_lines_are_kept_as_empty_blocks() {
        let blocks = render("first\n\nsecond");
        assert_eq!(blocks.len(), 3);
        assert!(blocks[1].spans.is_empty());
        assert_eq!(blocks[2].plain_text(), "second");
    }

    #[test]
    fn test_plain_whitespace_preserved() {
        let blocks = render("  two  spaces  ");
        assert_eq!(
            blocks[0].spans,
            vec![Span::Plain("  two  spaces  ".to_string())]
        );
    }

    #[test]
    fn test_three_stars_is_empty_emphasis() {
        let blocks = render("***");
        assert_eq!(blocks[0].spans, vec![Span::Emphasis(String::new())]);
    }

    #[test]
    fn test_unicode_text_around_bold() {
        let blocks = render("🌱 **Pothos** – easy");
        assert_eq!(
            blocks[0].spans,
            vec![
                Span::Plain("🌱 ".to_string()),
                Span::Emphasis("Pothos".to_string()),
                Span::Plain(" – easy".to_string())
            ]
        );
    }
}
