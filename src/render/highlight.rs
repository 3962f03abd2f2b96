use std::sync::LazyLock;
use syntect::easy::HighlightLines;
use syntect::highlighting::ThemeSet;
use syntect::parsing::SyntaxSet;
use syntect::util::{LinesWithEndings, as_24_bit_terminal_escaped};
use tracing::debug;

static SYNTAX_SET: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);
static THEME_SET: LazyLock<ThemeSet> = LazyLock::new(ThemeSet::load_defaults);

const THEME: &str = "base16-ocean.dark";

/// Colorize a fenced code block for the terminal.
///
/// A recognized language tag selects the matching syntect grammar; a
/// missing or unknown tag passes the text through uncolored. Either
/// way the block is wrapped in a leading and trailing newline so it
/// separates visually from surrounding prose. This never fails: a line
/// the highlighter chokes on is emitted raw.
pub fn highlight(code: &str, language_tag: Option<&str>) -> String {
    let syntax = language_tag
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .and_then(|tag| SYNTAX_SET.find_syntax_by_token(tag));

    let Some(syntax) = syntax else {
        if let Some(tag) = language_tag {
            debug!(tag = %tag, "no syntax definition for language tag");
        }
        return format!("\n{code}\n");
    };

    let theme = &THEME_SET.themes[THEME];
    let mut highlighter = HighlightLines::new(syntax, theme);

    let mut out = String::from("\n");
    for line in LinesWithEndings::from(code) {
        match highlighter.highlight_line(line, &SYNTAX_SET) {
            Ok(ranges) => out.push_str(&as_24_bit_terminal_escaped(&ranges, false)),
            Err(_) => out.push_str(line),
        }
    }
    // Styling must not leak past the block.
    out.push_str("\x1b[0m");
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::highlight;

    #[test]
    fn unknown_tag_passes_text_through_uncolored() {
        let out = highlight("plain text body", Some("no-such-language"));
        assert_eq!(out, "\nplain text body\n");
    }

    #[test]
    fn missing_tag_passes_text_through_uncolored() {
        let out = highlight("SELECT 1;", None);
        assert_eq!(out, "\nSELECT 1;\n");
    }

    #[test]
    fn recognized_tag_emits_ansi_colors_and_keeps_code_text() {
        let out = highlight("print(1)\n", Some("python"));
        assert!(out.contains("\x1b["), "expected ANSI escapes: {out:?}");
        assert!(out.contains("print"), "code text should survive: {out:?}");
        assert!(out.starts_with('\n') && out.ends_with('\n'));
    }

    #[test]
    fn output_ends_with_a_reset_before_the_trailing_newline() {
        let out = highlight("fn main() {}\n", Some("rust"));
        assert!(out.ends_with("\x1b[0m\n"), "unexpected tail: {out:?}");
    }
}
