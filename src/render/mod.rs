mod highlight;
mod markdown;

pub use highlight::highlight;

use regex::{Captures, Regex};
use std::sync::LazyLock;

static FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?ms)^```([^\n`]*)\n(.*?)^```[ \t]*$").expect("fence pattern is valid")
});

// Placeholder delimiter for withheld code regions. NUL cannot be
// produced by any rewrite pass, so reinsertion is unambiguous.
const SLOT: char = '\u{0}';

/// Render a completion for the terminal.
///
/// Fenced code blocks are extracted first and handed to the
/// highlighter; the inline passes then run on the remaining text only,
/// so markers inside code are never mis-rendered. The highlighted
/// blocks are reinserted in their original positions. This is a pure
/// function: no state survives between calls, and text containing no
/// Markdown at all comes back unchanged.
pub fn render_markdown(text: &str) -> String {
    let mut blocks: Vec<String> = Vec::new();
    let withheld = FENCE.replace_all(text, |caps: &Captures| {
        let tag = caps[1].trim();
        let tag = (!tag.is_empty()).then_some(tag);
        blocks.push(highlight::highlight(&caps[2], tag));
        format!("{SLOT}{}{SLOT}", blocks.len() - 1)
    });

    let mut rendered = markdown::render(&withheld);
    for (index, block) in blocks.iter().enumerate() {
        rendered = rendered.replace(&format!("{SLOT}{index}{SLOT}"), block);
    }
    rendered
}
