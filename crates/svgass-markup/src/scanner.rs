//! Markup scanner.
//!
//! Single forward pass over the input. Positions only ever advance, and
//! every slice boundary sits on an ASCII delimiter, so multi-byte UTF-8
//! sequences pass through untouched.

use std::borrow::Cow;
use std::iter::FusedIterator;
use thiserror::Error;
use tracing::{trace, warn};

/// Kind of markup a [`Node`] was scanned from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Nothing recognizable; also used for the document begin/end sentinels.
    Empty,
    /// Character data between tags.
    Content,
    /// Start tag expecting a matching end tag (`<g>`).
    Parent,
    /// Self-closing tag (`<rect/>`).
    SelfClosing,
    /// End tag (`</g>`).
    End,
    /// `<!-- ... -->`
    Comment,
    /// `<![CDATA[ ... ]]>`
    CData,
    /// `<? ... ?>`
    ProcessingInstruction,
    /// `<!DOCTYPE ... >`
    Doctype,
}

impl NodeKind {
    /// Tag kinds that carry an element name.
    pub fn is_element(self) -> bool {
        matches!(self, NodeKind::Parent | NodeKind::SelfClosing | NodeKind::End)
    }
}

/// Kind of event delivered to a sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Start of the document. Always the first event.
    Begin,
    /// End of the document. Always the last event.
    End,
    /// Non-empty text content.
    Text,
    /// A tag (or special section) was opened.
    Open,
    /// A tag (or special section) was closed.
    Close,
}

/// Recovered scanning problem.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScanAnomaly {
    #[error("tag is not terminated by '>'")]
    UnterminatedTag,

    #[error("attribute value is missing its closing quote")]
    UnterminatedQuote,

    #[error("unparsable attribute text skipped")]
    MalformedAttributes,

    #[error("special section is missing its terminator")]
    UnterminatedSection,

    #[error("unrecognized markup skipped")]
    UnrecognizedMarkup,

    #[error("end tag without matching start tag")]
    ExcessEndTag,

    #[error("end tag </{found}> closes <{expected}>")]
    MismatchedEndTag { expected: String, found: String },

    #[error("{0} element(s) left open at end of document")]
    UnclosedElements(usize),
}

/// One `name="value"` pair, quotes stripped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attribute<'a> {
    pub name: &'a str,
    pub value: &'a str,
}

/// View of one scanned construct.
#[derive(Debug, Clone, PartialEq)]
pub struct Node<'a> {
    pub kind: NodeKind,
    /// Tag name for elements, body for text and special sections.
    pub name: Cow<'a, str>,
    /// Attributes in source order. Always empty on `Close` events.
    pub attrs: Vec<Attribute<'a>>,
    /// Problem recovered while scanning this node.
    pub anomaly: Option<ScanAnomaly>,
    /// Byte offset of the construct in the input.
    pub offset: usize,
}

impl<'a> Node<'a> {
    fn sentinel(offset: usize) -> Self {
        Self {
            kind: NodeKind::Empty,
            name: Cow::Borrowed(""),
            attrs: Vec::new(),
            anomaly: None,
            offset,
        }
    }

    /// First attribute matching `name`, ASCII case-insensitively.
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.attrs
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(name))
            .map(|a| a.value)
    }

    /// Tag name comparison, ASCII case-insensitively.
    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

/// A scanner event with the node it refers to.
#[derive(Debug, Clone, PartialEq)]
pub struct Event<'a> {
    pub kind: EventKind,
    pub node: Node<'a>,
}

/// Counters collected over one scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub events: usize,
    pub anomalies: usize,
    pub max_depth: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Begin,
    Content,
    Markup,
    End,
    Stop,
}

/// Special sections: opening marker, terminator, node kind.
const SPECIAL: &[(&str, &str, NodeKind)] = &[
    ("!--", "-->", NodeKind::Comment),
    ("![CDATA[", "]]>", NodeKind::CData),
    ("?", "?>", NodeKind::ProcessingInstruction),
    ("!DOCTYPE", ">", NodeKind::Doctype),
];

fn is_space(b: u8) -> bool {
    b.is_ascii_whitespace()
}

fn is_namestart(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b == b':'
}

fn is_namechar(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'.' | b'-' | b'_' | b':')
}

fn starts_with_ignore_case(haystack: &[u8], needle: &str) -> bool {
    haystack.len() >= needle.len() && haystack[..needle.len()].eq_ignore_ascii_case(needle.as_bytes())
}

/// Trim `text` and collapse every whitespace run to a single space.
///
/// Borrows when the input needs no collapsing.
pub fn collapse_whitespace(text: &str) -> Cow<'_, str> {
    let trimmed = text.trim_matches(|c: char| c.is_ascii_whitespace());
    let bytes = trimmed.as_bytes();
    let clean = bytes.iter().all(|&b| !is_space(b) || b == b' ')
        && !bytes.windows(2).any(|w| w[0] == b' ' && w[1] == b' ');
    if clean {
        return Cow::Borrowed(trimmed);
    }

    let mut out = String::with_capacity(trimmed.len());
    let mut in_space = false;
    for ch in trimmed.chars() {
        if ch.is_ascii_whitespace() {
            if !in_space {
                out.push(' ');
                in_space = true;
            }
        } else {
            in_space = false;
            out.push(ch);
        }
    }
    Cow::Owned(out)
}

/// Streaming markup scanner.
///
/// Yields a finite event sequence, `Begin` first and `End` last. The
/// sequence can be consumed once; scanning again means building a new
/// scanner over the buffer.
pub struct Scanner<'a> {
    input: &'a str,
    pos: usize,
    state: State,
    /// Close event owed for a self-closing tag or special section.
    pending: Option<Event<'a>>,
    /// Names of currently open parent tags.
    open: Vec<&'a str>,
    stats: ScanStats,
}

impl<'a> Scanner<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            state: State::Begin,
            pending: None,
            open: Vec::new(),
            stats: ScanStats::default(),
        }
    }

    /// Counters so far. Complete once the iterator is exhausted.
    pub fn stats(&self) -> ScanStats {
        self.stats
    }

    /// Current nesting depth of parent tags.
    pub fn depth(&self) -> usize {
        self.open.len()
    }

    fn bytes(&self) -> &'a [u8] {
        self.input.as_bytes()
    }

    fn note(&mut self, anomaly: &ScanAnomaly, offset: usize) {
        self.stats.anomalies += 1;
        warn!(offset, "markup: {}", anomaly);
    }

    fn deliver(&mut self, event: Event<'a>) -> Option<Event<'a>> {
        self.stats.events += 1;
        trace!(kind = ?event.kind, node = ?event.node.kind, name = %event.node.name, "markup event");
        Some(event)
    }

    fn find_from(&self, from: usize, needle: &str) -> Option<usize> {
        self.input.get(from..)?.find(needle).map(|i| from + i)
    }

    fn skip_bytes(&self, mut at: usize, pred: impl Fn(u8) -> bool) -> usize {
        let bytes = self.bytes();
        while at < bytes.len() && pred(bytes[at]) {
            at += 1;
        }
        at
    }

    /// Text up to the next `<`.
    fn content(&mut self) -> Option<Event<'a>> {
        let start = self.pos;
        let lt = self.find_from(start, "<");
        let end = lt.unwrap_or(self.input.len());
        let text = collapse_whitespace(&self.input[start..end]);

        match lt {
            Some(lt) => {
                self.pos = lt + 1;
                self.state = State::Markup;
            }
            None => {
                self.pos = self.input.len();
                self.state = State::End;
            }
        }

        if text.is_empty() {
            return None;
        }
        Some(Event {
            kind: EventKind::Text,
            node: Node {
                kind: NodeKind::Content,
                name: text,
                attrs: Vec::new(),
                anomaly: None,
                offset: start,
            },
        })
    }

    /// Attribute list starting at `at`. Returns the attributes, the position
    /// where parsing stopped, and whether a quote was left open.
    fn attributes(&self, mut at: usize) -> (Vec<Attribute<'a>>, usize, bool) {
        let bytes = self.bytes();
        let mut attrs = Vec::new();

        loop {
            at = self.skip_bytes(at, is_space);
            if at >= bytes.len() || !is_namestart(bytes[at]) {
                break;
            }
            let name_start = at;
            at = self.skip_bytes(at, is_namechar);
            let name_end = at;
            at = self.skip_bytes(at, is_space);
            if at >= bytes.len() || bytes[at] != b'=' {
                break;
            }
            at = self.skip_bytes(at + 1, is_space);
            if at >= bytes.len() || !matches!(bytes[at], b'"' | b'\'') {
                break;
            }
            let quote = bytes[at];
            let value_start = at + 1;
            let Some(value_len) = bytes[value_start..].iter().position(|&b| b == quote) else {
                return (attrs, value_start, true);
            };
            let value_end = value_start + value_len;
            attrs.push(Attribute {
                name: &self.input[name_start..name_end],
                value: &self.input[value_start..value_end],
            });
            at = value_end + 1;
        }

        (attrs, at, false)
    }

    /// Start or self-closing tag; `self.pos` sits on the name.
    fn start_tag(&mut self) -> Node<'a> {
        let offset = self.pos - 1;
        let name_start = self.pos;
        let name_end = self.skip_bytes(name_start, is_namechar);
        let (attrs, stop, open_quote) = self.attributes(name_end);

        let mut anomaly = open_quote.then_some(ScanAnomaly::UnterminatedQuote);
        let mut kind = NodeKind::Parent;

        match self.find_from(stop, ">") {
            Some(gt) => {
                let rest = self.input[stop..gt].trim_end_matches('/');
                if anomaly.is_none() && !rest.trim().is_empty() {
                    anomaly = Some(ScanAnomaly::MalformedAttributes);
                }
                if gt > name_end && self.bytes()[gt - 1] == b'/' {
                    kind = NodeKind::SelfClosing;
                }
                self.pos = gt + 1;
            }
            None => {
                anomaly = Some(ScanAnomaly::UnterminatedTag);
                self.pos = self.input.len();
            }
        }

        Node {
            kind,
            name: Cow::Borrowed(&self.input[name_start..name_end]),
            attrs,
            anomaly,
            offset,
        }
    }

    /// End tag; `self.pos` sits on the `/`.
    fn end_tag(&mut self) -> Node<'a> {
        let offset = self.pos - 1;
        let name_start = self.pos + 1;
        let name_end = self.skip_bytes(name_start, is_namechar);
        let kind = if name_end > name_start {
            NodeKind::End
        } else {
            NodeKind::Empty
        };

        let mut anomaly = None;
        match self.find_from(name_end, ">") {
            Some(gt) => self.pos = gt + 1,
            None => {
                anomaly = Some(ScanAnomaly::UnterminatedTag);
                self.pos = self.input.len();
            }
        }

        Node {
            kind,
            name: Cow::Borrowed(&self.input[name_start..name_end]),
            attrs: Vec::new(),
            anomaly,
            offset,
        }
    }

    /// Comment, CDATA, processing instruction, doctype or junk.
    fn special(&mut self) -> Node<'a> {
        let offset = self.pos - 1;
        let rest = &self.bytes()[self.pos..];

        for &(marker, terminator, kind) in SPECIAL {
            if !starts_with_ignore_case(rest, marker) {
                continue;
            }
            let body_start = self.pos + marker.len();
            return match self.find_from(body_start, terminator) {
                Some(body_end) => {
                    self.pos = body_end + terminator.len();
                    Node {
                        kind,
                        name: Cow::Borrowed(&self.input[body_start..body_end]),
                        attrs: Vec::new(),
                        anomaly: None,
                        offset,
                    }
                }
                None => {
                    self.resync(body_start);
                    Node {
                        anomaly: Some(ScanAnomaly::UnterminatedSection),
                        ..Node::sentinel(offset)
                    }
                }
            };
        }

        self.resync(self.pos);
        Node {
            anomaly: Some(ScanAnomaly::UnrecognizedMarkup),
            ..Node::sentinel(offset)
        }
    }

    /// Skip past the next `>` (or to the end of input).
    fn resync(&mut self, from: usize) {
        self.pos = self
            .find_from(from, ">")
            .map(|gt| gt + 1)
            .unwrap_or(self.input.len());
    }

    /// One `<...>` construct; `self.pos` sits just past the `<`.
    fn markup(&mut self) -> Option<Event<'a>> {
        self.state = State::Content;

        let mut node = match self.bytes().get(self.pos) {
            Some(&b) if is_namestart(b) => self.start_tag(),
            Some(b'/') => self.end_tag(),
            Some(_) => self.special(),
            None => {
                self.pos = self.input.len();
                Node {
                    anomaly: Some(ScanAnomaly::UnterminatedTag),
                    ..Node::sentinel(self.input.len() - 1)
                }
            }
        };

        if let Some(anomaly) = node.anomaly.clone() {
            self.note(&anomaly, node.offset);
        }

        match node.kind {
            NodeKind::Empty => None,
            NodeKind::End => {
                let expected = self.open.pop();
                match expected {
                    None => {
                        let anomaly = ScanAnomaly::ExcessEndTag;
                        self.note(&anomaly, node.offset);
                        node.anomaly.get_or_insert(anomaly);
                    }
                    Some(open) if !open.eq_ignore_ascii_case(&node.name) => {
                        let anomaly = ScanAnomaly::MismatchedEndTag {
                            expected: open.to_string(),
                            found: node.name.to_string(),
                        };
                        self.note(&anomaly, node.offset);
                        node.anomaly.get_or_insert(anomaly);
                    }
                    Some(_) => {}
                }
                Some(Event {
                    kind: EventKind::Close,
                    node,
                })
            }
            NodeKind::Parent => {
                if let Cow::Borrowed(name) = node.name {
                    self.open.push(name);
                }
                self.stats.max_depth = self.stats.max_depth.max(self.open.len());
                Some(Event {
                    kind: EventKind::Open,
                    node,
                })
            }
            _ => {
                self.pending = Some(Event {
                    kind: EventKind::Close,
                    node: Node {
                        kind: node.kind,
                        name: node.name.clone(),
                        attrs: Vec::new(),
                        anomaly: None,
                        offset: node.offset,
                    },
                });
                Some(Event {
                    kind: EventKind::Open,
                    node,
                })
            }
        }
    }

    fn finish(&mut self) -> Event<'a> {
        self.state = State::Stop;
        let mut node = Node::sentinel(self.input.len());
        if !self.open.is_empty() {
            let anomaly = ScanAnomaly::UnclosedElements(self.open.len());
            self.note(&anomaly, self.input.len());
            node.anomaly = Some(anomaly);
        }
        Event {
            kind: EventKind::End,
            node,
        }
    }
}

impl<'a> Iterator for Scanner<'a> {
    type Item = Event<'a>;

    fn next(&mut self) -> Option<Event<'a>> {
        if let Some(event) = self.pending.take() {
            return self.deliver(event);
        }

        loop {
            let produced = match self.state {
                State::Begin => {
                    self.state = State::Content;
                    Some(Event {
                        kind: EventKind::Begin,
                        node: Node::sentinel(0),
                    })
                }
                State::Content => self.content(),
                State::Markup => self.markup(),
                State::End => Some(self.finish()),
                State::Stop => return None,
            };
            if let Some(event) = produced {
                return self.deliver(event);
            }
        }
    }
}

impl FusedIterator for Scanner<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<(EventKind, NodeKind, String)> {
        Scanner::new(input)
            .map(|e| (e.kind, e.node.kind, e.node.name.into_owned()))
            .collect()
    }

    #[test]
    fn test_begin_and_end_bracket_everything() {
        let events = kinds("");
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].0, EventKind::Begin);
        assert_eq!(events[1].0, EventKind::End);
    }

    #[test]
    fn test_parent_and_end_tag() {
        let events = kinds("<g></g>");
        assert_eq!(
            events[1..3],
            [
                (EventKind::Open, NodeKind::Parent, "g".to_string()),
                (EventKind::Close, NodeKind::End, "g".to_string()),
            ]
        );
    }

    #[test]
    fn test_self_closing_gets_open_and_close() {
        let events: Vec<_> = Scanner::new(r#"<rect x="1"/>"#).collect();
        assert_eq!(events[1].kind, EventKind::Open);
        assert_eq!(events[1].node.kind, NodeKind::SelfClosing);
        assert_eq!(events[1].node.attr("x"), Some("1"));
        assert_eq!(events[2].kind, EventKind::Close);
        assert!(events[2].node.attrs.is_empty());
    }

    #[test]
    fn test_self_closing_without_attributes() {
        let events = kinds("<br/>");
        assert_eq!(events[1].1, NodeKind::SelfClosing);
        assert_eq!(events[1].2, "br");
    }

    #[test]
    fn test_attributes_keep_order_and_quotes_are_stripped() {
        let events: Vec<_> = Scanner::new(r#"<path d='M0 0' fill="red" d="x">"#).collect();
        let attrs = &events[1].node.attrs;
        assert_eq!(attrs.len(), 3);
        assert_eq!(attrs[0], Attribute { name: "d", value: "M0 0" });
        assert_eq!(attrs[1], Attribute { name: "fill", value: "red" });
        // first match wins
        assert_eq!(events[1].node.attr("D"), Some("M0 0"));
    }

    #[test]
    fn test_quoted_gt_does_not_end_tag() {
        let events: Vec<_> = Scanner::new(r#"<a title="x > y"/>"#).collect();
        assert_eq!(events[1].node.attr("title"), Some("x > y"));
        assert_eq!(events[1].node.kind, NodeKind::SelfClosing);
    }

    #[test]
    fn test_text_is_collapsed() {
        let events: Vec<_> = Scanner::new("<t>  hello \n\t world  </t>").collect();
        assert_eq!(events[2].kind, EventKind::Text);
        assert_eq!(events[2].node.name, "hello world");
    }

    #[test]
    fn test_whitespace_only_text_is_dropped() {
        let events = kinds("<a>\n   \n</a>");
        assert!(events.iter().all(|e| e.0 != EventKind::Text));
    }

    #[test]
    fn test_special_sections() {
        let events = kinds("<?xml version=\"1.0\"?><!DOCTYPE svg><!-- c --><![CDATA[x<y]]>");
        let opens: Vec<_> = events
            .iter()
            .filter(|e| e.0 == EventKind::Open)
            .map(|e| (e.1, e.2.as_str()))
            .collect();
        assert_eq!(
            opens,
            [
                (NodeKind::ProcessingInstruction, "xml version=\"1.0\""),
                (NodeKind::Doctype, " svg"),
                (NodeKind::Comment, " c "),
                (NodeKind::CData, "x<y"),
            ]
        );
    }

    #[test]
    fn test_doctype_is_case_insensitive() {
        let events = kinds("<!doctype html>");
        assert_eq!(events[1].1, NodeKind::Doctype);
    }

    #[test]
    fn test_unterminated_quote_resyncs_to_next_gt() {
        let events: Vec<_> = Scanner::new("<rect x=\"5 /><g>").collect();
        let rect = &events[1].node;
        assert_eq!(rect.name, "rect");
        assert_eq!(rect.anomaly, Some(ScanAnomaly::UnterminatedQuote));
        assert!(rect.attrs.is_empty());
        assert!(events.iter().any(|e| e.node.name == "g"));
    }

    #[test]
    fn test_unquoted_value_is_flagged() {
        let events: Vec<_> = Scanner::new("<rect x=5 y=\"2\"/>").collect();
        let rect = &events[1].node;
        assert_eq!(rect.anomaly, Some(ScanAnomaly::MalformedAttributes));
        assert_eq!(rect.kind, NodeKind::SelfClosing);
    }

    #[test]
    fn test_unterminated_tag_at_eof() {
        let mut scanner = Scanner::new("<svg><rect width=\"3\"");
        let events: Vec<_> = scanner.by_ref().collect();
        assert_eq!(events[2].node.anomaly, Some(ScanAnomaly::UnterminatedTag));
        assert_eq!(events.last().map(|e| e.kind), Some(EventKind::End));
        assert!(scanner.stats().anomalies >= 2);
    }

    #[test]
    fn test_excess_end_tag_is_reported_not_fatal() {
        let events: Vec<_> = Scanner::new("</g><a/>").collect();
        assert_eq!(events[1].kind, EventKind::Close);
        assert_eq!(events[1].node.anomaly, Some(ScanAnomaly::ExcessEndTag));
        assert_eq!(events[2].node.name, "a");
    }

    #[test]
    fn test_unclosed_elements_reported_on_end() {
        let events: Vec<_> = Scanner::new("<svg><g>").collect();
        let end = events.last().unwrap();
        assert_eq!(end.kind, EventKind::End);
        assert_eq!(end.node.anomaly, Some(ScanAnomaly::UnclosedElements(2)));
    }

    #[test]
    fn test_deep_nesting_has_no_ceiling() {
        let depth = 5000;
        let doc = "<g>".repeat(depth) + &"</g>".repeat(depth);
        let mut scanner = Scanner::new(&doc);
        let count = scanner.by_ref().count();
        assert_eq!(count, depth * 2 + 2);
        assert_eq!(scanner.stats().max_depth, depth);
        assert_eq!(scanner.stats().anomalies, 0);
    }

    #[test]
    fn test_utf8_passes_through() {
        let events: Vec<_> = Scanner::new("<t a=\"ünï\">grüße</t>").collect();
        assert_eq!(events[1].node.attr("a"), Some("ünï"));
        assert_eq!(events[2].node.name, "grüße");
    }

    #[test]
    fn test_collapse_borrows_when_clean() {
        assert!(matches!(collapse_whitespace("  a b "), Cow::Borrowed("a b")));
        assert!(matches!(collapse_whitespace("a\nb"), Cow::Owned(_)));
        assert_eq!(collapse_whitespace("a \t b"), "a b");
    }

    #[test]
    fn test_iterator_is_fused() {
        let mut scanner = Scanner::new("<a/>");
        while scanner.next().is_some() {}
        assert!(scanner.next().is_none());
    }
}
