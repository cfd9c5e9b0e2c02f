//! Parser trait definition and the shared Cursor tokenizer.
//!
//! The flowchart parser is line-oriented: each meaningful line gets its own
//! [`Cursor`], which recognizes node references, edge connectors and labels.

use crate::syntax::types::{EDGE_TOKENS, EdgeStyle, NodeShape, SHAPE_DELIMITERS};

use super::ParseResult;

// ─── Parser trait ────────────────────────────────────────────────────────────

/// Trait for diagram parsers.
///
/// Parsing never fails: anything a parser cannot model is returned as raw
/// blocks with warnings.
pub trait Parser {
    fn parse(&self, src: &str) -> ParseResult;
}

// ─── Text-on-link connectors ─────────────────────────────────────────────────

/// `-- text -->` style connectors: opener, then the closers that end the text.
pub const TEXT_LINK_PATTERNS: &[(&str, &[(&str, EdgeStyle)])] = &[
    ("--", &[("-->", EdgeStyle::Arrow), ("---", EdgeStyle::Line)]),
    ("-.", &[(".->", EdgeStyle::DottedArrow), (".-", EdgeStyle::DottedLine)]),
    ("==", &[("==>", EdgeStyle::ThickArrow), ("===", EdgeStyle::ThickLine)]),
];

/// Characters that close a shape bracket.
const CLOSERS: &[char] = &[']', ')', '}'];

/// True when every closing bracket in `text` matches an earlier opener.
pub fn brackets_balanced(text: &str) -> bool {
    let mut stack = Vec::new();
    for ch in text.chars() {
        match ch {
            '(' => stack.push(')'),
            '[' => stack.push(']'),
            '{' => stack.push('}'),
            ')' | ']' | '}' => {
                if stack.pop() != Some(ch) {
                    return false;
                }
            }
            _ => {}
        }
    }
    stack.is_empty()
}

// ─── Scan results ────────────────────────────────────────────────────────────

/// Outcome of scanning a shape bracket after a node id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShapeScan {
    /// No opener follows the id.
    Absent,
    /// A well-formed bracket pair.
    Shaped(NodeShape, String),
    /// Opened and closed, but by the wrong delimiter.
    Degraded(String),
    /// Opened and never closed on this line.
    Unclosed,
}

/// A node reference as written in a statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeRef {
    pub id: String,
    /// `(shape, label)` when the reference carries a bracket.
    pub shape: Option<(NodeShape, String)>,
    /// The bracket was closed by the wrong delimiter.
    pub degraded: bool,
}

impl NodeRef {
    pub fn is_explicit(&self) -> bool {
        self.shape.is_some()
    }
}

/// One `connector [label] target` step of an edge chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeSegment {
    pub id: Option<String>,
    pub style: EdgeStyle,
    pub label: Option<String>,
    pub target: NodeRef,
}

// ─── Cursor (stateful tokenizer) ─────────────────────────────────────────────

/// Stateful cursor over one source line.
pub struct Cursor {
    pub src: Vec<char>,
    pub pos: usize,
    /// Set when a shape bracket was opened but never closed.
    pub unbalanced: bool,
}

impl Cursor {
    pub fn new(src: &str) -> Self {
        Self {
            src: src.chars().collect(),
            pos: 0,
            unbalanced: false,
        }
    }

    pub fn eof(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn current(&self) -> Option<char> {
        self.src.get(self.pos).copied()
    }

    /// Peek whether the next chars match the given string.
    pub fn peek(&self, s: &str) -> bool {
        let mut i = self.pos;
        for ch in s.chars() {
            if self.src.get(i) != Some(&ch) {
                return false;
            }
            i += 1;
        }
        true
    }

    /// Consume `s` if it matches; returns true if consumed.
    pub fn consume(&mut self, s: &str) -> bool {
        if self.peek(s) {
            self.pos += s.chars().count();
            true
        } else {
            false
        }
    }

    /// Skip horizontal whitespace.
    pub fn skip_ws(&mut self) {
        while matches!(self.current(), Some(' ') | Some('\t')) {
            self.pos += 1;
        }
    }

    /// Remaining text from the cursor to the end of the line.
    pub fn rest(&self) -> String {
        self.src[self.pos.min(self.src.len())..].iter().collect()
    }

    /// True when only whitespace and an optional trailing `;` remain.
    pub fn at_statement_end(&mut self) -> bool {
        self.skip_ws();
        if self.consume(";") {
            self.skip_ws();
        }
        self.eof()
    }

    /// Char offset of the next occurrence of `needle` at or after the cursor.
    fn find(&self, needle: &str) -> Option<usize> {
        let n: Vec<char> = needle.chars().collect();
        if n.is_empty() || self.src.len() < n.len() {
            return None;
        }
        (self.pos..=self.src.len() - n.len()).find(|&i| self.src[i..i + n.len()] == n[..])
    }

    fn is_id_char(ch: char) -> bool {
        ch.is_ascii_alphanumeric() || ch == '_'
    }

    /// Match a node identifier: runs of `[A-Za-z0-9_]` joined by single `-`.
    ///
    /// A `-` is only part of the id when an id character follows it, so
    /// `A-->B` lexes as `A`, `-->`, `B`.
    pub fn match_node_id(&mut self) -> Option<String> {
        let start = self.pos;
        while let Some(ch) = self.current() {
            if Self::is_id_char(ch) {
                self.pos += 1;
            } else if ch == '-'
                && self.pos > start
                && self.src.get(self.pos + 1).is_some_and(|&c| Self::is_id_char(c))
            {
                self.pos += 1;
            } else {
                break;
            }
        }
        if self.pos == start {
            None
        } else {
            Some(self.src[start..self.pos].iter().collect())
        }
    }

    /// Match a bare word (letters, digits, `_`, `-`); used for keywords.
    pub fn match_word(&mut self) -> Option<String> {
        let start = self.pos;
        while self
            .current()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            self.pos += 1;
        }
        (self.pos > start).then(|| self.src[start..self.pos].iter().collect())
    }

    /// Parse a double-quoted string, handling `\n`, `\"`, `\\` escapes.
    ///
    /// Returns None (cursor restored) when the closing quote is missing.
    pub fn parse_quoted_string(&mut self) -> Option<String> {
        let saved = self.pos;
        if !self.consume("\"") {
            return None;
        }
        let mut buf = String::new();
        while let Some(ch) = self.current() {
            if ch == '"' {
                self.pos += 1;
                return Some(buf);
            }
            if ch == '\\' && self.pos + 1 < self.src.len() {
                match self.src[self.pos + 1] {
                    'n' => buf.push('\n'),
                    other => buf.push(other),
                }
                self.pos += 2;
            } else {
                buf.push(ch);
                self.pos += 1;
            }
        }
        self.pos = saved;
        None
    }

    /// Try one opener with its possible closers. Restores the cursor on failure.
    fn try_shape_group(&mut self, open: &str, closers: &[(&str, NodeShape)]) -> Option<(NodeShape, String)> {
        let saved = self.pos;
        if !self.consume(open) {
            return None;
        }
        let inner_start = self.pos;
        self.skip_ws();
        if self.current() == Some('"') {
            if let Some(label) = self.parse_quoted_string() {
                self.skip_ws();
                for (close, shape) in closers {
                    if self.consume(close) {
                        return Some((*shape, label));
                    }
                }
            }
            self.pos = inner_start;
        }
        // Bare label: the earliest closer wins, and the label's own brackets
        // must balance.
        let best = closers
            .iter()
            .filter_map(|(close, shape)| self.find(close).map(|at| (at, *close, *shape)))
            .min_by_key(|(at, close, _)| (*at, usize::MAX - close.len()));
        if let Some((at, close, shape)) = best {
            let label: String = self.src[inner_start..at].iter().collect();
            if brackets_balanced(&label) {
                self.pos = at + close.chars().count();
                return Some((shape, label.trim().to_string()));
            }
        }
        self.pos = saved;
        None
    }

    /// Scan a node shape bracket directly after a node id.
    pub fn parse_node_shape(&mut self) -> ShapeScan {
        let mut opened = false;
        let mut i = 0;
        while i < SHAPE_DELIMITERS.len() {
            let open = SHAPE_DELIMITERS[i].0;
            let group: Vec<(&str, NodeShape)> = SHAPE_DELIMITERS[i..]
                .iter()
                .take_while(|(o, _, _)| *o == open)
                .map(|(_, close, shape)| (*close, *shape))
                .collect();
            i += group.len();
            if !self.peek(open) {
                continue;
            }
            opened = true;
            if let Some((shape, label)) = self.try_shape_group(open, &group) {
                return ShapeScan::Shaped(shape, label);
            }
        }
        if !opened {
            return ShapeScan::Absent;
        }
        // Degrade: take the text up to the first closing bracket of any kind.
        let start = self.pos + 1;
        let found = (start..self.src.len()).find(|&i| CLOSERS.contains(&self.src[i]));
        match found {
            Some(at) => {
                let label: String = self.src[start..at].iter().collect();
                self.pos = at;
                while self.current().is_some_and(|c| CLOSERS.contains(&c)) {
                    self.pos += 1;
                }
                let label = label.trim().trim_matches('"').to_string();
                ShapeScan::Degraded(label)
            }
            None => ShapeScan::Unclosed,
        }
    }

    /// Parse a node reference (id + optional shape bracket).
    pub fn parse_node_ref(&mut self) -> Option<NodeRef> {
        self.skip_ws();
        let saved = self.pos;
        let id = self.match_node_id()?;
        match self.parse_node_shape() {
            ShapeScan::Absent => Some(NodeRef {
                id,
                shape: None,
                degraded: false,
            }),
            ShapeScan::Shaped(shape, label) => Some(NodeRef {
                id,
                shape: Some((shape, label)),
                degraded: false,
            }),
            ShapeScan::Degraded(label) => Some(NodeRef {
                id,
                shape: Some((NodeShape::Rectangle, label)),
                degraded: true,
            }),
            ShapeScan::Unclosed => {
                self.unbalanced = true;
                self.pos = saved;
                None
            }
        }
    }

    /// Try to parse an edge connector token, plain or text-on-link.
    /// Returns the style and the inline text of a `-- text -->` connector.
    pub fn parse_edge_connector(&mut self) -> Option<(EdgeStyle, Option<String>)> {
        self.skip_ws();
        for (token, style) in EDGE_TOKENS {
            if self.consume(token) {
                return Some((*style, None));
            }
        }
        for (open, closers) in TEXT_LINK_PATTERNS {
            let saved = self.pos;
            if !self.consume(open) || !matches!(self.current(), Some(' ') | Some('\t')) {
                self.pos = saved;
                continue;
            }
            let best = closers
                .iter()
                .filter_map(|(close, style)| self.find(close).map(|at| (at, *close, *style)))
                .min_by_key(|(at, close, _)| (*at, usize::MAX - close.len()));
            if let Some((at, close, style)) = best {
                let text: String = self.src[self.pos..at].iter().collect();
                let text = text.trim().to_string();
                if !text.is_empty() {
                    self.pos = at + close.chars().count();
                    return Some((style, Some(text)));
                }
            }
            self.pos = saved;
        }
        None
    }

    /// Try to parse an edge label `|text|` or `|"text"|`.
    pub fn try_parse_edge_label(&mut self) -> Option<String> {
        let saved = self.pos;
        self.skip_ws();
        if !self.consume("|") {
            self.pos = saved;
            return None;
        }
        self.skip_ws();
        if self.current() == Some('"') {
            let quoted_at = self.pos;
            if let Some(text) = self.parse_quoted_string() {
                self.skip_ws();
                if self.consume("|") {
                    return Some(text);
                }
            }
            self.pos = quoted_at;
        }
        let start = self.pos;
        while self.current().is_some_and(|c| c != '|') {
            self.pos += 1;
        }
        if self.eof() {
            self.pos = saved;
            return None;
        }
        let text: String = self.src[start..self.pos].iter().collect();
        self.pos += 1;
        Some(text.trim().to_string())
    }

    /// Try to parse an `id@` prefix in front of a connector.
    pub fn try_parse_edge_id(&mut self) -> Option<String> {
        let saved = self.pos;
        self.skip_ws();
        if let Some(id) = self.match_node_id() {
            if self.consume("@") {
                let after = self.pos;
                if self.parse_edge_connector().is_some() {
                    self.pos = after;
                    return Some(id);
                }
            }
        }
        self.pos = saved;
        None
    }

    /// Parse an edge chain: `[id@]connector [label] target ...`.
    pub fn parse_edge_chain(&mut self) -> Vec<EdgeSegment> {
        let mut segments = Vec::new();
        loop {
            let saved = self.pos;
            let id = self.try_parse_edge_id();
            let Some((style, link_text)) = self.parse_edge_connector() else {
                self.pos = saved;
                break;
            };
            let label = self.try_parse_edge_label().or(link_text);
            let Some(target) = self.parse_node_ref() else {
                self.pos = saved;
                break;
            };
            segments.push(EdgeSegment {
                id,
                style,
                label,
                target,
            });
        }
        segments
    }

    /// Parse a bracketed title `[Title]` or `["Title"]` (subgraph headers).
    pub fn parse_bracket_title(&mut self) -> Option<String> {
        let saved = self.pos;
        self.skip_ws();
        if !self.consume("[") {
            self.pos = saved;
            return None;
        }
        self.skip_ws();
        if self.current() == Some('"') {
            if let Some(title) = self.parse_quoted_string() {
                self.skip_ws();
                if self.consume("]") {
                    return Some(title);
                }
            }
            self.pos = saved;
            return None;
        }
        match self.find("]") {
            Some(at) => {
                let title: String = self.src[self.pos..at].iter().collect();
                self.pos = at + 1;
                Some(title.trim().to_string())
            }
            None => {
                self.pos = saved;
                None
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/rust/test_parsers_base.rs"]
mod tests;
