//! Serializers turning a [`Stream`] into output text.
//!
//! Four output kinds are supported, selected by [`SerializerKind`]:
//!
//! | Kind | Empty element | Notes |
//! |------|---------------|-------|
//! | `xml` | `<a/>` | declarations, comments and PIs kept |
//! | `xhtml` | `<br />` for void elements, `<p></p>` otherwise | |
//! | `html` | `<br>` for void elements | boolean attributes minimized, `xmlns` dropped |
//! | `text` | – | text only, no escaping |
//!
//! The markup serializers run a whitespace pass over text: trailing blanks
//! before a newline are removed and blank lines collapse, except inside
//! `pre`, `textarea`, `script`, `style` or `xml:space="preserve"` elements.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::doctype::DocType;
use crate::error::MarkupError;
use crate::event::{Attrs, Event, Stream};

/// Output kind of a serializer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SerializerKind {
    Html,
    Xhtml,
    Xml,
    Text,
}

impl SerializerKind {
    pub fn name(&self) -> &'static str {
        match self {
            SerializerKind::Html => "html",
            SerializerKind::Xhtml => "xhtml",
            SerializerKind::Xml => "xml",
            SerializerKind::Text => "text",
        }
    }

    fn is_markup(&self) -> bool {
        !matches!(self, SerializerKind::Text)
    }
}

impl fmt::Display for SerializerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SerializerKind {
    type Err = MarkupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "html" => Ok(SerializerKind::Html),
            "xhtml" => Ok(SerializerKind::Xhtml),
            "xml" => Ok(SerializerKind::Xml),
            "text" => Ok(SerializerKind::Text),
            _ => Err(MarkupError::UnknownSerializer(s.to_string())),
        }
    }
}

/// HTML elements that never have content.
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "basefont", "br", "col", "embed", "frame", "hr", "img", "input", "isindex",
    "link", "meta", "param", "source", "track", "wbr",
];

/// HTML attributes written without a value by the HTML serializer.
pub const BOOLEAN_ATTRIBUTES: &[&str] = &[
    "async", "autofocus", "checked", "compact", "declare", "defer", "disabled", "hidden", "ismap",
    "multiple", "nohref", "noresize", "noshade", "nowrap", "readonly", "required", "selected",
];

const PRESERVE_ELEMENTS: &[&str] = &["pre", "textarea", "script", "style"];
const NOESCAPE_ELEMENTS: &[&str] = &["script", "style"];

static TRAILING_SPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[ \t]+\n").expect("valid trailing space pattern"));
static BLANK_LINES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n{2,}").expect("valid blank line pattern"));

/// Removes trailing blanks before newlines and collapses runs of newlines.
pub fn collapse_whitespace(text: &str) -> String {
    let trimmed = TRAILING_SPACE.replace_all(text, "\n");
    BLANK_LINES.replace_all(&trimmed, "\n").into_owned()
}

/// Escapes character data.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escapes an attribute value for use inside double quotes.
pub fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&#34;"),
            _ => out.push(c),
        }
    }
    out
}

/// Serializes `stream` as `kind`, emitting `doctype` before the content.
pub fn serialize(stream: &Stream, kind: SerializerKind, doctype: Option<&DocType>) -> String {
    if kind == SerializerKind::Text {
        return stream.text();
    }

    let mut writer = MarkupWriter::new(kind);
    let events = stream.events();

    // The XML declaration, when kept, must precede the doctype.
    let mut start = 0;
    if let Some(Event::XmlDecl(decl)) = events.first() {
        if kind != SerializerKind::Html {
            writer.out.push_str("<?");
            writer.out.push_str(decl);
            writer.out.push_str("?>\n");
        }
        start = 1;
    }
    if let Some(doctype) = doctype {
        writer.doctype(&doctype.to_string());
    }

    let mut i = start;
    while i < events.len() {
        match &events[i] {
            Event::Start { name, attrs } => {
                let closes_immediately =
                    matches!(events.get(i + 1), Some(Event::End { name: end }) if end == name);
                if writer.start(name, attrs, closes_immediately) {
                    i += 1;
                }
            }
            Event::End { name } => writer.end(name),
            Event::Text(text) => writer.text(text),
            Event::Comment(text) => {
                writer.flush_text();
                writer.out.push_str("<!--");
                writer.out.push_str(text);
                writer.out.push_str("-->");
            }
            Event::Pi(text) => {
                writer.flush_text();
                writer.out.push_str("<?");
                writer.out.push_str(text);
                writer.out.push_str("?>");
            }
            Event::Doctype(text) => {
                writer.flush_text();
                writer.doctype(&format!("<!DOCTYPE {}>", text));
            }
            Event::XmlDecl(_) => {}
        }
        i += 1;
    }
    writer.flush_text();
    writer.out
}

struct MarkupWriter {
    kind: SerializerKind,
    out: String,
    pending: String,
    /// Per open element: (preserve whitespace, suppress escaping).
    open: Vec<(bool, bool)>,
    have_doctype: bool,
}

impl MarkupWriter {
    fn new(kind: SerializerKind) -> Self {
        debug_assert!(kind.is_markup());
        Self {
            kind,
            out: String::new(),
            pending: String::new(),
            open: Vec::new(),
            have_doctype: false,
        }
    }

    fn preserving(&self) -> bool {
        self.open.last().is_some_and(|(preserve, _)| *preserve)
    }

    fn raw_text(&self) -> bool {
        self.open.last().is_some_and(|(_, raw)| *raw)
    }

    fn doctype(&mut self, decl: &str) {
        if self.have_doctype {
            return;
        }
        self.have_doctype = true;
        self.out.push_str(decl);
        self.out.push('\n');
    }

    fn text(&mut self, text: &str) {
        self.pending.push_str(text);
    }

    fn flush_text(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let text = std::mem::take(&mut self.pending);
        let text = if self.preserving() {
            text
        } else {
            collapse_whitespace(&text)
        };
        if self.raw_text() {
            self.out.push_str(&text);
        } else {
            self.out.push_str(&escape_text(&text));
        }
    }

    /// Writes a start tag. Returns true when the matching end event was
    /// consumed as part of an empty element.
    fn start(&mut self, name: &str, attrs: &Attrs, closes_immediately: bool) -> bool {
        self.flush_text();
        let html_like = matches!(self.kind, SerializerKind::Html | SerializerKind::Xhtml);
        let local = name.rsplit(':').next().unwrap_or(name).to_ascii_lowercase();

        self.out.push('<');
        self.out.push_str(name);
        for (key, value) in attrs.iter() {
            if self.kind == SerializerKind::Html {
                if key == "xmlns" || key.starts_with("xmlns:") {
                    continue;
                }
                if BOOLEAN_ATTRIBUTES.contains(&key) {
                    if !value.is_empty() {
                        self.out.push(' ');
                        self.out.push_str(key);
                    }
                    continue;
                }
            }
            self.out.push(' ');
            self.out.push_str(key);
            self.out.push_str("=\"");
            self.out.push_str(&escape_attr(value));
            self.out.push('"');
        }

        let is_void = html_like && VOID_ELEMENTS.contains(&local.as_str());
        match self.kind {
            SerializerKind::Xml if closes_immediately => {
                self.out.push_str("/>");
                return true;
            }
            SerializerKind::Xhtml if closes_immediately && is_void => {
                self.out.push_str(" />");
                return true;
            }
            SerializerKind::Html if is_void => {
                self.out.push('>');
                return closes_immediately;
            }
            _ => self.out.push('>'),
        }

        let parent_preserve = self.preserving();
        let preserve = parent_preserve
            || attrs.get("xml:space") == Some("preserve")
            || (html_like && PRESERVE_ELEMENTS.contains(&local.as_str()));
        let raw = self.kind == SerializerKind::Html && NOESCAPE_ELEMENTS.contains(&local.as_str());
        self.open.push((preserve, raw));
        false
    }

    fn end(&mut self, name: &str) {
        self.flush_text();
        if self.kind == SerializerKind::Html {
            let local = name.rsplit(':').next().unwrap_or(name).to_ascii_lowercase();
            if VOID_ELEMENTS.contains(&local.as_str()) {
                return;
            }
        }
        self.open.pop();
        self.out.push_str("</");
        self.out.push_str(name);
        self.out.push('>');
    }
}
