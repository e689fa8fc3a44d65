//! Markdown escaping for text that came out of inline-markup.
//!
//! Escaping is contextual: a handful of characters are escaped wherever they
//! appear in text, a few more only when they would open a block at the start
//! of a line, and `|` only inside table cells. Code spans are never escaped;
//! their fence is widened instead.

use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;

/// Characters escaped wherever they appear in text.
const ALWAYS: &[char] = &['\\', '`', '*', '_', '[', ']', '<'];

static ENTITY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^&(?:#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[A-Za-z][A-Za-z0-9]{1,31});")
        .expect("entity pattern is valid")
});

static ORDERED_MARKER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]{1,9})([.)])").expect("ordered marker pattern is valid"));

/// Where escaped text is going to land.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextContext {
    /// Paragraphs, list items, quotes.
    Block,
    /// A single-line ATX heading.
    Heading,
    /// Inside a pipe table cell.
    TableCell,
}

impl TextContext {
    fn single_line(self) -> bool {
        self != TextContext::Block
    }
}

/// Keep `text` from breaking the line structure of its context, escaping
/// nothing else.
pub fn protect_structure(text: &str, context: TextContext) -> Cow<'_, str> {
    let needs_work = (context.single_line() && text.contains('\n'))
        || (context == TextContext::TableCell && text.contains('|'));
    if !needs_work {
        return Cow::Borrowed(text);
    }
    let mut out = text.replace('\n', " ");
    if context == TextContext::TableCell {
        out = out.replace('|', "\\|");
    }
    Cow::Owned(out)
}

/// Escape the characters in `text` that would otherwise be read as inline syntax.
pub fn escape_inline(text: &str, context: TextContext) -> Cow<'_, str> {
    let needs_work = text.chars().any(|c| {
        ALWAYS.contains(&c)
            || c == '&'
            || c == '!'
            || (context == TextContext::TableCell && c == '|')
            || (context.single_line() && c == '\n')
    });
    if !needs_work {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len() + 8);
    for (i, c) in text.char_indices() {
        match c {
            c if ALWAYS.contains(&c) => {
                out.push('\\');
                out.push(c);
            }
            '&' if ENTITY_RE.is_match(&text[i..]) => out.push_str("\\&"),
            '!' if text[i + 1..].starts_with('[') => out.push_str("\\!"),
            '|' if context == TextContext::TableCell => out.push_str("\\|"),
            '\n' if context.single_line() => out.push(' '),
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Escape a block-opening marker at the start of every line of `text`.
///
/// Covers ATX headings, quotes, bullets, setext underlines, tilde fences and
/// ordered-list markers. Leading whitespace is kept by writing its first
/// character as a numeric entity, so indentation can neither open a code block
/// nor hide a marker. Leading inline syntax produced by the writer itself
/// (`*`, `` ` ``, `[`) never needs this.
pub fn escape_line_starts(text: &str) -> String {
    text.split('\n')
        .map(escape_line_start)
        .collect::<Vec<_>>()
        .join("\n")
}

fn escape_line_start(line: &str) -> Cow<'_, str> {
    match line.chars().next() {
        Some(' ') if !line.trim().is_empty() => Cow::Owned(format!("&#32;{}", &line[1..])),
        Some('\t') if !line.trim().is_empty() => Cow::Owned(format!("&#9;{}", &line[1..])),
        Some('#' | '>' | '+' | '-' | '=') => Cow::Owned(format!("\\{line}")),
        Some('~') if line.starts_with("~~~") => Cow::Owned(format!("\\{line}")),
        Some(c) if c.is_ascii_digit() => match ORDERED_MARKER_RE.captures(line) {
            Some(caps) => {
                let digits = caps.get(1).map_or("", |m| m.as_str());
                let rest = &line[digits.len()..];
                Cow::Owned(format!("{digits}\\{rest}"))
            }
            None => Cow::Borrowed(line),
        },
        _ => Cow::Borrowed(line),
    }
}

/// Render `code` as an inline code span, widening the fence past any backtick
/// run inside it.
pub fn code_span(code: &str, context: TextContext) -> String {
    if code.is_empty() {
        return String::new();
    }
    let mut code = code.replace('\n', " ");
    if context == TextContext::TableCell {
        code = code.replace('|', "\\|");
    }

    let fence = "`".repeat(longest_run(&code, '`') + 1);
    let pad = code.starts_with('`')
        || code.ends_with('`')
        || (code.starts_with(' ') && code.ends_with(' ') && code.trim() != "");
    if pad {
        format!("{fence} {code} {fence}")
    } else {
        format!("{fence}{code}{fence}")
    }
}

/// The opening/closing fence for a fenced code block holding `code`.
pub fn code_fence(code: &str) -> String {
    let longest = code
        .lines()
        .map(|line| {
            let trimmed = line.trim_start();
            trimmed.len() - trimmed.trim_start_matches('`').len()
        })
        .max()
        .unwrap_or(0);
    "`".repeat(longest.max(2) + 1)
}

/// A link or image destination, wrapped in `<>` when bare form would not parse.
pub fn link_destination(url: &str) -> Cow<'_, str> {
    let needs_brackets = url.is_empty()
        || url
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '(' | ')' | '<' | '>'));
    if !needs_brackets {
        return Cow::Borrowed(url);
    }
    let inner = url.replace('<', "\\<").replace('>', "\\>");
    Cow::Owned(format!("<{inner}>"))
}

fn longest_run(text: &str, needle: char) -> usize {
    let mut longest = 0;
    let mut current = 0;
    for c in text.chars() {
        if c == needle {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}
