//! Line-based markdown parsing with no AST library.
//!
//! Blocks are recognised by pattern matching on whole lines: ATX headings,
//! fenced code, thematic breaks, `>` quotes (parsed recursively), bullet and
//! ordered list items with indentation-derived depth and `[ ]`/`[x]` task
//! markers, pipe tables, lone images and HTML comments. Anything else is a
//! paragraph, with adjacent non-blank lines merged.
//!
//! Inline text goes through a small scanner that understands backslash
//! escapes, entities, code spans, `*`/`_` emphasis, links, autolinks and
//! inline tags. It is deliberately narrower than CommonMark's delimiter
//! algorithm.

use super::MarkdownParser;
use crate::error::FormatError;
use crate::ir::{Inline, MdList, MdListItem, MdNode, MdTable, MdTableCell, MdTableRow};
use html_escape::decode_html_entities;
use once_cell::sync::Lazy;
use regex::Regex;

static HEADING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^ {0,3}(#{1,6})(?:[ \t]+(.*?))?(?:[ \t]+#+)?[ \t]*$")
        .expect("heading pattern is valid")
});

static LIST_ITEM_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([ \t]*)([-*+]|[0-9]{1,9}[.)])(?:[ \t]+(.*))?$").expect("list pattern is valid")
});

static TASK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[([ xX])\](?:[ \t]+(.*))?$").expect("task pattern is valid"));

static QUOTE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^ {0,3}>[ ]?(.*)$").expect("quote pattern is valid"));

static FENCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^ {0,3}(`{3,}|~{3,})(.*)$").expect("fence pattern is valid"));

static IMAGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^!\[((?:\\.|[^\]\\])*)\]\(\s*(<[^>]*>|[^\s)]*)(?:\s+"([^"]*)")?\s*\)$"#)
        .expect("image pattern is valid")
});

static SEPARATOR_CELL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^:?-+:?$").expect("separator pattern is valid"));

static ENTITY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^&(?:#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[A-Za-z][A-Za-z0-9]{1,31});")
        .expect("entity pattern is valid")
});

static AUTOLINK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^<([A-Za-z][A-Za-z0-9+.-]{1,31}:[^\s<>]*)>$").expect("autolink pattern is valid")
});

static INLINE_TAG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^</?[A-Za-z][A-Za-z0-9-]*(?:\s[^<>]*)?/?>$").expect("tag pattern is valid")
});

/// Pure-text markdown parser.
#[derive(Debug, Clone)]
pub struct LineParser {
    max_depth: usize,
}

impl LineParser {
    pub fn new(max_depth: usize) -> Self {
        LineParser {
            max_depth: max_depth.max(1),
        }
    }
}

impl Default for LineParser {
    fn default() -> Self {
        LineParser::new(super::DEFAULT_MAX_NESTING_DEPTH)
    }
}

impl MarkdownParser for LineParser {
    fn name(&self) -> &str {
        "lines"
    }

    fn parse(&self, source: &str) -> Result<Vec<MdNode>, FormatError> {
        self.blocks(source, 1)
    }
}

/// One list line, before nesting is rebuilt.
#[derive(Debug)]
struct ListEntry {
    depth: usize,
    /// Bullet character, or the delimiter of an ordered marker.
    marker: char,
    checked: Option<bool>,
    text: String,
}

impl LineParser {
    fn blocks(&self, source: &str, depth: usize) -> Result<Vec<MdNode>, FormatError> {
        if depth > self.max_depth {
            return Err(FormatError::ParseError(format!(
                "markdown nests deeper than {} levels",
                self.max_depth
            )));
        }

        let lines: Vec<&str> = source.lines().collect();
        let mut nodes = Vec::new();
        let mut paragraph: Vec<&str> = Vec::new();
        let mut i = 0;

        while i < lines.len() {
            let line = lines[i];

            if line.trim().is_empty() {
                self.flush_paragraph(&mut paragraph, &mut nodes);
                i += 1;
                continue;
            }

            if starts_block(line) || is_table_start(&lines, i) || IMAGE_RE.is_match(line.trim()) {
                self.flush_paragraph(&mut paragraph, &mut nodes);
                i = self.block_at(&lines, i, depth, &mut nodes)?;
                continue;
            }

            paragraph.push(line.trim());
            i += 1;
        }
        self.flush_paragraph(&mut paragraph, &mut nodes);
        Ok(nodes)
    }

    /// Parse the block starting at `lines[start]`, returning the index after it.
    fn block_at(
        &self,
        lines: &[&str],
        start: usize,
        depth: usize,
        nodes: &mut Vec<MdNode>,
    ) -> Result<usize, FormatError> {
        let line = lines[start];

        if let Some(caps) = FENCE_RE.captures(line) {
            let fence = caps.get(1).map_or("```", |m| m.as_str());
            let info = caps.get(2).map_or("", |m| m.as_str());
            return Ok(self.code_block(lines, start, fence, info, nodes));
        }

        if let Some(caps) = HEADING_RE.captures(line) {
            let level = caps.get(1).map_or(1, |m| m.as_str().len());
            let text = caps.get(2).map_or("", |m| m.as_str());
            if !text.trim().is_empty() {
                nodes.push(MdNode::Heading {
                    depth: level as u8,
                    children: self.inlines(text),
                });
            }
            return Ok(start + 1);
        }

        if is_thematic_break(line) {
            nodes.push(MdNode::ThematicBreak);
            return Ok(start + 1);
        }

        if QUOTE_RE.is_match(line) {
            let mut inner = Vec::new();
            let mut i = start;
            while let Some(caps) = lines.get(i).and_then(|l| QUOTE_RE.captures(l)) {
                inner.push(caps.get(1).map_or("", |m| m.as_str()));
                i += 1;
            }
            let children = self.blocks(&inner.join("\n"), depth + 1)?;
            nodes.push(MdNode::Blockquote { children });
            return Ok(i);
        }

        if LIST_ITEM_RE.is_match(line) {
            return Ok(self.list(lines, start, nodes));
        }

        if line.trim_start().starts_with('<') {
            return Ok(html_block(lines, start, nodes));
        }

        if is_table_start(lines, start) {
            return Ok(self.table(lines, start, nodes));
        }

        if let Some(caps) = IMAGE_RE.captures(line.trim()) {
            let alt = caps.get(1).map_or("", |m| m.as_str());
            let url = caps.get(2).map_or("", |m| m.as_str());
            let url = url
                .strip_prefix('<')
                .and_then(|u| u.strip_suffix('>'))
                .unwrap_or(url);
            nodes.push(MdNode::Image {
                url: unescape(url),
                alt: plain(&self.inlines(alt)),
                title: caps.get(3).map(|m| m.as_str().to_string()),
            });
            return Ok(start + 1);
        }

        nodes.push(MdNode::paragraph(self.inlines(line.trim())));
        Ok(start + 1)
    }

    fn flush_paragraph(&self, paragraph: &mut Vec<&str>, nodes: &mut Vec<MdNode>) {
        if paragraph.is_empty() {
            return;
        }
        let text = paragraph.join("\n");
        paragraph.clear();
        nodes.push(MdNode::paragraph(self.inlines(&text)));
    }

    fn code_block(
        &self,
        lines: &[&str],
        start: usize,
        fence: &str,
        info: &str,
        nodes: &mut Vec<MdNode>,
    ) -> usize {
        let fence_char = fence.chars().next().unwrap_or('`');
        let mut body = Vec::new();
        let mut i = start + 1;
        while i < lines.len() {
            let trimmed = lines[i].trim_start();
            let run = trimmed.len() - trimmed.trim_start_matches(fence_char).len();
            if run >= fence.len() && trimmed[run..].trim().is_empty() {
                i += 1;
                break;
            }
            body.push(lines[i]);
            i += 1;
        }

        let mut value = body.join("\n");
        if !body.is_empty() {
            value.push('\n');
        }
        nodes.push(MdNode::Code {
            lang: info.split_whitespace().next().map(str::to_string),
            value,
        });
        i
    }

    fn list(&self, lines: &[&str], start: usize, nodes: &mut Vec<MdNode>) -> usize {
        let mut entries: Vec<ListEntry> = Vec::new();
        let mut indents: Vec<usize> = Vec::new();
        let mut i = start;
        let mut after_blank = false;

        while i < lines.len() {
            let line = lines[i];

            if line.trim().is_empty() {
                let continues = lines[i + 1..]
                    .iter()
                    .find(|l| !l.trim().is_empty())
                    .is_some_and(|l| LIST_ITEM_RE.is_match(l) || indent_columns(l) >= 2);
                if !continues {
                    break;
                }
                after_blank = true;
                i += 1;
                continue;
            }

            if let Some(caps) = LIST_ITEM_RE.captures(line).filter(|_| !is_thematic_break(line)) {
                let columns = indent_columns(caps.get(1).map_or("", |m| m.as_str()));
                while indents.last().is_some_and(|&top| columns < top) {
                    indents.pop();
                }
                if indents.last().map_or(true, |&top| columns > top) && indents.len() < self.max_depth
                {
                    indents.push(columns);
                }

                let marker = caps.get(2).map_or("-", |m| m.as_str());
                let mut text = caps.get(3).map_or("", |m| m.as_str()).trim().to_string();
                let mut checked = None;
                if let Some(task) = TASK_RE.captures(&text) {
                    checked = Some(task.get(1).is_some_and(|m| m.as_str() != " "));
                    text = task.get(2).map_or("", |m| m.as_str()).trim().to_string();
                }

                entries.push(ListEntry {
                    depth: indents.len().saturating_sub(1),
                    marker: marker.chars().last().unwrap_or('-'),
                    checked,
                    text,
                });
                after_blank = false;
                i += 1;
                continue;
            }

            // Continuation text: indented lines, or lazy lines right after an item.
            let continuation = indent_columns(line) >= 2 || (!after_blank && !starts_block(line));
            match entries.last_mut() {
                Some(entry) if continuation => {
                    if !entry.text.is_empty() {
                        entry.text.push('\n');
                    }
                    entry.text.push_str(line.trim());
                    i += 1;
                }
                _ => break,
            }
        }

        let mut pos = 0;
        while pos < entries.len() {
            let depth = entries[pos].depth;
            let list = self.build_list(&entries, &mut pos, depth);
            nodes.push(MdNode::List(list));
        }
        i
    }

    fn build_list(&self, entries: &[ListEntry], pos: &mut usize, depth: usize) -> MdList {
        // A different bullet or delimiter starts a new list.
        let marker = entries[*pos].marker;
        let mut list = MdList {
            ordered: matches!(marker, '.' | ')'),
            items: Vec::new(),
        };

        while let Some(entry) = entries.get(*pos) {
            if entry.depth < depth || (entry.depth == depth && entry.marker != marker) {
                break;
            }
            if entry.depth > depth {
                let nested = self.build_list(entries, pos, entry.depth);
                match list.items.last_mut() {
                    Some(item) => item.children.push(MdNode::List(nested)),
                    None => list.items.push(MdListItem {
                        checked: None,
                        children: vec![MdNode::List(nested)],
                    }),
                }
                continue;
            }

            let mut children = Vec::new();
            if !entry.text.is_empty() {
                children.push(MdNode::paragraph(self.inlines(&entry.text)));
            }
            list.items.push(MdListItem {
                checked: entry.checked,
                children,
            });
            *pos += 1;
        }
        list
    }

    fn table(&self, lines: &[&str], start: usize, nodes: &mut Vec<MdNode>) -> usize {
        let mut rows = vec![self.table_row(lines[start])];
        let mut i = start + 2;
        while let Some(line) = lines.get(i) {
            if line.trim().is_empty() || starts_block(line) {
                break;
            }
            rows.push(self.table_row(line));
            i += 1;
        }
        nodes.push(MdNode::Table(MdTable { rows }));
        i
    }

    fn table_row(&self, line: &str) -> MdTableRow {
        MdTableRow {
            cells: split_cells(line)
                .into_iter()
                .map(|cell| MdTableCell {
                    children: self.inlines(cell.trim()),
                })
                .collect(),
        }
    }

    fn inlines(&self, text: &str) -> Vec<Inline> {
        let chars: Vec<char> = text.chars().collect();
        InlineScanner {
            max_depth: self.max_depth,
        }
        .scan(&chars, 0)
    }
}

/// Lines that open a block and so end a running paragraph.
fn starts_block(line: &str) -> bool {
    FENCE_RE.is_match(line)
        || HEADING_RE.is_match(line)
        || is_thematic_break(line)
        || QUOTE_RE.is_match(line)
        || LIST_ITEM_RE.is_match(line)
        || line.trim_start().starts_with("<!--")
}

fn is_thematic_break(line: &str) -> bool {
    let trimmed = line.trim();
    let mut marks = trimmed.chars().filter(|c| !c.is_whitespace());
    let Some(first) = marks.next() else {
        return false;
    };
    matches!(first, '-' | '*' | '_')
        && indent_columns(line) < 4
        && trimmed.chars().filter(|c| !c.is_whitespace()).count() >= 3
        && marks.all(|c| c == first)
}

fn is_table_start(lines: &[&str], i: usize) -> bool {
    lines[i].trim_start().starts_with('|')
        && lines.get(i + 1).is_some_and(|next| is_table_separator(next))
}

fn is_table_separator(line: &str) -> bool {
    let trimmed = line.trim();
    if !trimmed.contains('-') || !trimmed.contains('|') {
        return false;
    }
    let cells = split_cells(trimmed);
    !cells.is_empty() && cells.iter().all(|cell| SEPARATOR_CELL_RE.is_match(cell.trim()))
}

/// Split a pipe-table row on unescaped `|`, dropping the outer pipes.
fn split_cells(line: &str) -> Vec<String> {
    let trimmed = line.trim();
    let trimmed = trimmed.strip_prefix('|').unwrap_or(trimmed);
    let trimmed = if trimmed.ends_with('|') && !trimmed.ends_with("\\|") {
        &trimmed[..trimmed.len() - 1]
    } else {
        trimmed
    };

    let mut cells = Vec::new();
    let mut current = String::new();
    let mut chars = trimmed.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                current.push(c);
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            }
            '|' => cells.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    cells.push(current);
    cells
}

fn html_block(lines: &[&str], start: usize, nodes: &mut Vec<MdNode>) -> usize {
    let comment = lines[start].trim_start().starts_with("<!--");
    let mut collected = Vec::new();
    let mut i = start;
    while let Some(line) = lines.get(i) {
        if !comment && line.trim().is_empty() {
            break;
        }
        collected.push(*line);
        i += 1;
        if comment && line.contains("-->") {
            break;
        }
    }
    let mut value = collected.join("\n");
    value.push('\n');
    nodes.push(MdNode::Html { value });
    i
}

fn indent_columns(line: &str) -> usize {
    line.chars()
        .take_while(|c| *c == ' ' || *c == '\t')
        .map(|c| if c == '\t' { 2 } else { 1 })
        .sum()
}

fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(&next) = chars.peek() {
                if next.is_ascii_punctuation() {
                    out.push(next);
                    chars.next();
                    continue;
                }
            }
        }
        out.push(c);
    }
    out
}

fn plain(nodes: &[Inline]) -> String {
    crate::common::inline::plain_text(nodes)
}

struct InlineScanner {
    max_depth: usize,
}

impl InlineScanner {
    fn scan(&self, chars: &[char], depth: usize) -> Vec<Inline> {
        let mut out = Vec::new();
        let mut text = String::new();
        let mut i = 0;

        while i < chars.len() {
            let c = chars[i];
            match c {
                '\\' => match chars.get(i + 1) {
                    Some('\n') => {
                        flush_text(&mut text, &mut out);
                        out.push(Inline::Break);
                        i += 2;
                    }
                    Some(&next) if next.is_ascii_punctuation() => {
                        text.push(next);
                        i += 2;
                    }
                    _ => {
                        text.push('\\');
                        i += 1;
                    }
                },

                '`' => {
                    let run = run_length(chars, i, '`');
                    match find_code_close(chars, i + run, run) {
                        Some(close) => {
                            flush_text(&mut text, &mut out);
                            let code: String = chars[i + run..close].iter().collect();
                            out.push(Inline::code(normalize_code(&code)));
                            i = close + run;
                        }
                        None => {
                            text.extend(&chars[i..i + run]);
                            i += run;
                        }
                    }
                }

                '*' | '_' if depth < self.max_depth => {
                    let run = run_length(chars, i, c);
                    match self.delimited(chars, i, c, run, depth) {
                        Some((node, end)) => {
                            flush_text(&mut text, &mut out);
                            out.push(node);
                            i = end;
                        }
                        None => {
                            text.extend(&chars[i..i + run]);
                            i += run;
                        }
                    }
                }

                '!' if chars.get(i + 1) == Some(&'[') && depth < self.max_depth => {
                    match link_at(chars, i + 1) {
                        Some(link) => {
                            flush_text(&mut text, &mut out);
                            out.push(Inline::Other {
                                kind: "image".to_string(),
                                children: self.scan(&chars[i + 2..link.label_end], depth + 1),
                            });
                            i = link.end;
                        }
                        None => {
                            text.push('!');
                            i += 1;
                        }
                    }
                }

                '[' if depth < self.max_depth => match link_at(chars, i) {
                    Some(link) => {
                        flush_text(&mut text, &mut out);
                        out.push(Inline::link(
                            link.url,
                            self.scan(&chars[i + 1..link.label_end], depth + 1),
                        ));
                        i = link.end;
                    }
                    None => {
                        text.push('[');
                        i += 1;
                    }
                },

                '<' => match angle_at(chars, i) {
                    Some((node, end)) => {
                        flush_text(&mut text, &mut out);
                        out.push(node);
                        i = end;
                    }
                    None => {
                        text.push('<');
                        i += 1;
                    }
                },

                '&' => {
                    let rest: String = chars[i..chars.len().min(i + 40)].iter().collect();
                    match ENTITY_RE.find(&rest) {
                        Some(entity) => {
                            text.push_str(&decode_html_entities(entity.as_str()));
                            i += entity.as_str().chars().count();
                        }
                        None => {
                            text.push('&');
                            i += 1;
                        }
                    }
                }

                _ => {
                    text.push(c);
                    i += 1;
                }
            }
        }

        flush_text(&mut text, &mut out);
        out
    }

    /// Emphasis or strong emphasis opening at `chars[start]`.
    fn delimited(
        &self,
        chars: &[char],
        start: usize,
        marker: char,
        run: usize,
        depth: usize,
    ) -> Option<(Inline, usize)> {
        if marker == '_' && start > 0 && chars[start - 1].is_alphanumeric() {
            return None;
        }
        for width in [2, 1] {
            if run < width {
                continue;
            }
            let open_end = start + width;
            if chars.get(open_end).map_or(true, |c| c.is_whitespace()) {
                continue;
            }
            if let Some(close) = find_closer(chars, open_end, marker, width) {
                let children = self.scan(&chars[open_end..close], depth + 1);
                let node = if width == 2 {
                    Inline::strong(children)
                } else {
                    Inline::emphasis(children)
                };
                return Some((node, close + width));
            }
        }
        None
    }
}

fn flush_text(text: &mut String, out: &mut Vec<Inline>) {
    if !text.is_empty() {
        out.push(Inline::text(std::mem::take(text)));
    }
}

fn run_length(chars: &[char], start: usize, c: char) -> usize {
    chars[start..].iter().take_while(|&&x| x == c).count()
}

fn find_code_close(chars: &[char], from: usize, run: usize) -> Option<usize> {
    let mut p = from;
    while p < chars.len() {
        if chars[p] == '`' {
            let len = run_length(chars, p, '`');
            if len == run {
                return Some(p);
            }
            p += len;
        } else {
            p += 1;
        }
    }
    None
}

fn normalize_code(code: &str) -> String {
    let code = code.replace('\n', " ");
    if code.len() >= 2 && code.starts_with(' ') && code.ends_with(' ') && !code.trim().is_empty() {
        code[1..code.len() - 1].to_string()
    } else {
        code
    }
}

/// Position of the closing delimiter for an opener of `width` markers.
///
/// A closing run must follow a non-space character. Runs of exactly the other
/// width belong to a different emphasis and are skipped.
fn find_closer(chars: &[char], from: usize, marker: char, width: usize) -> Option<usize> {
    let mut p = from;
    while p < chars.len() {
        match chars[p] {
            '\\' => p += 2,
            '`' => {
                let run = run_length(chars, p, '`');
                p = find_code_close(chars, p + run, run).map_or(p + run, |close| close + run);
            }
            c if c == marker => {
                let run = run_length(chars, p, marker);
                let follows_text = p > from && !chars[p - 1].is_whitespace();
                let intraword_underscore =
                    marker == '_' && chars.get(p + run).is_some_and(|c| c.is_alphanumeric());
                if follows_text && !intraword_underscore && (run == width || run >= 3) {
                    return Some(p + run - width);
                }
                p += run;
            }
            _ => p += 1,
        }
    }
    None
}

struct LinkSpan {
    label_end: usize,
    url: String,
    end: usize,
}

/// A `[label](destination "title")` link starting at `chars[open]`.
fn link_at(chars: &[char], open: usize) -> Option<LinkSpan> {
    let mut depth = 0usize;
    let mut p = open;
    let label_end = loop {
        match chars.get(p)? {
            '\\' => p += 1,
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    break p;
                }
            }
            _ => {}
        }
        p += 1;
    };

    if chars.get(label_end + 1) != Some(&'(') {
        return None;
    }
    let mut p = label_end + 2;
    while chars.get(p).is_some_and(|c| c.is_whitespace()) {
        p += 1;
    }

    let mut url = String::new();
    if chars.get(p) == Some(&'<') {
        p += 1;
        loop {
            match chars.get(p)? {
                '>' => {
                    p += 1;
                    break;
                }
                '\\' => {
                    url.push(*chars.get(p + 1)?);
                    p += 2;
                }
                c => {
                    url.push(*c);
                    p += 1;
                }
            }
        }
    } else {
        let mut parens = 0usize;
        while let Some(&c) = chars.get(p) {
            match c {
                '\\' if chars.get(p + 1).is_some_and(|n| n.is_ascii_punctuation()) => {
                    url.push(chars[p + 1]);
                    p += 2;
                    continue;
                }
                '(' => parens += 1,
                ')' if parens == 0 => break,
                ')' => parens -= 1,
                c if c.is_whitespace() => break,
                _ => {}
            }
            url.push(c);
            p += 1;
        }
    }

    while chars.get(p).is_some_and(|c| c.is_whitespace()) {
        p += 1;
    }
    if let Some(&quote @ ('"' | '\'')) = chars.get(p) {
        p += 1;
        while chars.get(p)? != &quote {
            p += 1;
        }
        p += 1;
        while chars.get(p).is_some_and(|c| c.is_whitespace()) {
            p += 1;
        }
    }

    if chars.get(p) != Some(&')') {
        return None;
    }
    Some(LinkSpan {
        label_end,
        url,
        end: p + 1,
    })
}

/// An autolink or inline tag starting at `chars[start]`.
fn angle_at(chars: &[char], start: usize) -> Option<(Inline, usize)> {
    let close = chars[start..].iter().position(|&c| c == '>')? + start;
    let candidate: String = chars[start..=close].iter().collect();

    if let Some(caps) = AUTOLINK_RE.captures(&candidate) {
        let url = caps.get(1)?.as_str().to_string();
        return Some((Inline::link(url.clone(), vec![Inline::text(url)]), close + 1));
    }
    if INLINE_TAG_RE.is_match(&candidate) {
        return Some((Inline::Html { value: candidate }, close + 1));
    }
    None
}
