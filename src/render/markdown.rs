use colored::Colorize;
use regex::{Captures, Regex};
use std::sync::LazyLock;

const RULE_WIDTH: usize = 40;

// Line-level constructs match one physical line at a time; span
// constructs never cross a newline. Pass order is load-bearing: code
// spans before emphasis, bold before italic, rules before list
// markers. A line with more than six leading '#' is not a header.
static HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^(#{1,6}) (.*)$").expect("header pattern is valid"));
static CODE_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`([^`\n]+)`").expect("code span pattern is valid"));
static BOLD_STARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*([^\n]+?)\*\*").expect("bold pattern is valid"));
static BOLD_UNDERSCORES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"__([^\n]+?)__").expect("bold pattern is valid"));
static ITALIC_STAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*([^*\n]+?)\*").expect("italic pattern is valid"));
static ITALIC_UNDERSCORE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_([^_\n]+?)_").expect("italic pattern is valid"));
static STRIKETHROUGH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"~~([^~\n]+?)~~").expect("strikethrough pattern is valid"));
static BLOCKQUOTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^> (.*)$").expect("blockquote pattern is valid"));
static HORIZONTAL_RULE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^(-{3,}|\*{3,}|_{3,})[ \t]*$").expect("rule pattern is valid")
});
static UNORDERED_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^([ \t]*)[-*+] (.*)$").expect("list pattern is valid"));
static ORDERED_ITEM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^([ \t]*)(\d+)\. (.*)$").expect("list pattern is valid")
});
static LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]\n]+)\]\(([^)\n]+)\)").expect("link pattern is valid"));

/// Apply the ordered sequence of inline and line-level rewrite passes.
///
/// Callers must withhold fenced code regions before invoking this;
/// everything here assumes code fences were already extracted. Text
/// with no recognized construct comes back unchanged. Malformed markup
/// (an unclosed `**`, a dangling `[`) simply never matches.
pub fn render(text: &str) -> String {
    let text = HEADER.replace_all(text, |caps: &Captures| {
        format!("\n{}", caps[2].bold().blue())
    });
    let text = CODE_SPAN.replace_all(&text, |caps: &Captures| caps[1].cyan().to_string());
    let text = BOLD_STARS.replace_all(&text, |caps: &Captures| caps[1].bold().to_string());
    let text = BOLD_UNDERSCORES.replace_all(&text, |caps: &Captures| caps[1].bold().to_string());
    let text = ITALIC_STAR.replace_all(&text, |caps: &Captures| caps[1].yellow().to_string());
    let text =
        ITALIC_UNDERSCORE.replace_all(&text, |caps: &Captures| caps[1].yellow().to_string());
    let text = STRIKETHROUGH.replace_all(&text, |caps: &Captures| caps[1].dimmed().to_string());
    let text = BLOCKQUOTE.replace_all(&text, |caps: &Captures| {
        caps[1].bright_black().to_string()
    });
    let text = HORIZONTAL_RULE.replace_all(&text, |_: &Captures| {
        format!("\n{}\n", "-".repeat(RULE_WIDTH).as_str().bright_black())
    });
    let text = UNORDERED_ITEM.replace_all(&text, |caps: &Captures| {
        format!("{}{} {}", &caps[1], "•".green(), &caps[2])
    });
    let text = ORDERED_ITEM.replace_all(&text, |caps: &Captures| {
        format!(
            "{}{} {}",
            &caps[1],
            format!("{}.", &caps[2]).as_str().green(),
            &caps[3]
        )
    });
    let text = LINK.replace_all(&text, |caps: &Captures| {
        format!("{} {}", caps[1].blue(), format!("({})", &caps[2]).as_str().cyan())
    });
    text.into_owned()
}
