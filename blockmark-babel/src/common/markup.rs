//! Inline-markup → inline AST.
//!
//! The reverse of [`super::inline`], used on the way out to markdown. Block
//! text is read back into [`Inline`] nodes so the markdown writer can place
//! emphasis markers and escapes on a tree instead of on raw tag soup.
//!
//! Recognised tags: `b`/`strong`, `i`/`em`, `code`, `a href`, `br`. Every other
//! tag is dropped while its content is kept. Unbalanced tags are tolerated:
//! stray closers are ignored and unclosed elements close at the end of input.

use super::inline::plain_text;
use crate::ir::Inline;
use html_escape::decode_html_entities;
use once_cell::sync::Lazy;
use regex::Regex;

static TAG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<\s*(/)?\s*([A-Za-z][A-Za-z0-9]*)((?:\s[^<>]*?)?)\s*(/)?\s*>")
        .expect("tag pattern is valid")
});

static HREF_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\bhref\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#)
        .expect("href pattern is valid")
});

#[derive(Debug, Clone, PartialEq)]
enum FrameKind {
    Root,
    Strong,
    Emphasis,
    Code,
    Link(String),
    /// A tag we do not model; its children are spliced into the parent.
    Transparent(String),
}

impl FrameKind {
    fn from_tag(name: &str, attrs: &str) -> Self {
        match name {
            "b" | "strong" => FrameKind::Strong,
            "i" | "em" => FrameKind::Emphasis,
            "code" => FrameKind::Code,
            "a" => FrameKind::Link(href(attrs).unwrap_or_default()),
            other => FrameKind::Transparent(other.to_string()),
        }
    }

    fn closes(&self, name: &str) -> bool {
        match self {
            FrameKind::Root => false,
            FrameKind::Strong => matches!(name, "b" | "strong"),
            FrameKind::Emphasis => matches!(name, "i" | "em"),
            FrameKind::Code => name == "code",
            FrameKind::Link(_) => name == "a",
            FrameKind::Transparent(tag) => tag == name,
        }
    }
}

struct Frame {
    kind: FrameKind,
    children: Vec<Inline>,
}

impl Frame {
    fn new(kind: FrameKind) -> Self {
        Frame {
            kind,
            children: Vec::new(),
        }
    }

    fn finish(self) -> Vec<Inline> {
        match self.kind {
            FrameKind::Root | FrameKind::Transparent(_) => self.children,
            FrameKind::Strong => vec![Inline::strong(self.children)],
            FrameKind::Emphasis => vec![Inline::emphasis(self.children)],
            FrameKind::Code => vec![Inline::code(plain_text(&self.children))],
            FrameKind::Link(url) => vec![Inline::link(url, self.children)],
        }
    }
}

fn href(attrs: &str) -> Option<String> {
    let caps = HREF_RE.captures(attrs)?;
    let raw = caps
        .get(1)
        .or_else(|| caps.get(2))
        .or_else(|| caps.get(3))?
        .as_str();
    Some(decode_html_entities(raw).into_owned())
}

fn push_text(children: &mut Vec<Inline>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(Inline::Text { value }) = children.last_mut() {
        value.push_str(text);
    } else {
        children.push(Inline::text(text));
    }
}

fn push_all(children: &mut Vec<Inline>, nodes: Vec<Inline>) {
    for node in nodes {
        match node {
            Inline::Text { value } => push_text(children, &value),
            other => children.push(other),
        }
    }
}

/// Parse an inline-markup string into inline nodes.
pub fn parse_markup(markup: &str) -> Vec<Inline> {
    let mut stack = vec![Frame::new(FrameKind::Root)];
    let mut last = 0;

    for caps in TAG_RE.captures_iter(markup) {
        let Some(whole) = caps.get(0) else { continue };
        let top = stack.len() - 1;
        push_text(
            &mut stack[top].children,
            &decode_html_entities(&markup[last..whole.start()]),
        );
        last = whole.end();

        let name = caps
            .get(2)
            .map(|m| m.as_str().to_ascii_lowercase())
            .unwrap_or_default();
        let closing = caps.get(1).is_some();
        let self_closing = caps.get(4).is_some();

        if name == "br" {
            stack[top].children.push(Inline::Break);
            continue;
        }

        if closing {
            close_until(&mut stack, &name);
        } else if !self_closing {
            let attrs = caps.get(3).map(|m| m.as_str()).unwrap_or("");
            stack.push(Frame::new(FrameKind::from_tag(&name, attrs)));
        }
    }

    let top = stack.len() - 1;
    push_text(
        &mut stack[top].children,
        &decode_html_entities(&markup[last..]),
    );

    while stack.len() > 1 {
        pop_into_parent(&mut stack);
    }
    stack.pop().map(Frame::finish).unwrap_or_default()
}

/// Close the nearest open element matching `name`, and anything opened after it.
fn close_until(stack: &mut Vec<Frame>, name: &str) {
    let Some(pos) = stack.iter().rposition(|frame| frame.kind.closes(name)) else {
        return;
    };
    while stack.len() > pos {
        pop_into_parent(stack);
    }
}

fn pop_into_parent(stack: &mut Vec<Frame>) {
    if stack.len() < 2 {
        return;
    }
    if let Some(frame) = stack.pop() {
        let finished = frame.finish();
        if let Some(parent) = stack.last_mut() {
            push_all(&mut parent.children, finished);
        }
    }
}
