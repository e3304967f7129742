//! Message translation, over template source or over text events.
//!
//! Templates are best translated before values are filled in: the
//! messages are then exactly what the author wrote, and data supplied at
//! render time is never looked up in a catalogue. [`Translator::translate_source`]
//! does that on source already split into author text and engine syntax.

use std::fmt;
use std::sync::Arc;

use crate::event::{Event, Stream};

/// Elements whose text is code, never a message.
const IGNORE_ELEMENTS: &[&str] = &["script", "style"];

/// A slice of template source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourcePiece<'a> {
    /// Text written by the template author.
    Literal(&'a str),
    /// Template syntax (expressions, statements, comments), kept verbatim.
    Code(&'a str),
}

/// Translates the text of a stream through a lookup function.
///
/// Every text event with non-blank content is passed (trimmed) to the
/// translation function; the surrounding whitespace is kept as is. Text
/// inside `script` and `style` elements is not translated.
///
/// ```rust
/// use quire_markup::{parse_markup, Translator, SerializerKind};
///
/// let translator = Translator::new(|msg| msg.to_uppercase());
/// let stream = translator.apply(parse_markup("<p>\n  Hello!\n</p>").unwrap());
/// assert_eq!(stream.render(SerializerKind::Xml, None), "<p>\n  HELLO!\n</p>");
/// ```
#[derive(Clone)]
pub struct Translator {
    translate: Arc<dyn Fn(&str) -> String + Send + Sync>,
}

impl Translator {
    pub fn new<F>(translate: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        Self {
            translate: Arc::new(translate),
        }
    }

    /// Translates a single message, keeping its surrounding whitespace.
    pub fn translate(&self, text: &str) -> String {
        let message = text.trim();
        if message.is_empty() {
            return text.to_string();
        }
        let start = text.len() - text.trim_start().len();
        let end = start + message.len();
        format!("{}{}{}", &text[..start], (self.translate)(message), &text[end..])
    }

    /// Translates the author's text in template source.
    ///
    /// With `markup` set, only text between tags is translated; tags,
    /// comments and the bodies of `script` and `style` are copied as they
    /// are. Otherwise every literal run is a message. A code piece ends the
    /// current message, so `Hi {{ name }}` looks up `Hi`.
    ///
    /// ```rust
    /// use quire_markup::{SourcePiece, Translator};
    ///
    /// let translator = Translator::new(|msg| msg.to_uppercase());
    /// let source = translator.translate_source(
    ///     [
    ///         SourcePiece::Literal("<b title=\"x\">Hi "),
    ///         SourcePiece::Code("{{ name }}"),
    ///         SourcePiece::Literal("</b>"),
    ///     ],
    ///     true,
    /// );
    /// assert_eq!(source, "<b title=\"x\">HI {{ name }}</b>");
    /// ```
    pub fn translate_source<'a>(
        &self,
        pieces: impl IntoIterator<Item = SourcePiece<'a>>,
        markup: bool,
    ) -> String {
        let mut scanner = SourceScanner::new(self);
        for piece in pieces {
            match piece {
                SourcePiece::Code(code) => scanner.code(code),
                SourcePiece::Literal(literal) if markup => scanner.scan(literal),
                SourcePiece::Literal(literal) => scanner.text.push_str(literal),
            }
        }
        scanner.finish()
    }

    /// Runs the translation over `stream`.
    pub fn apply(&self, stream: Stream) -> Stream {
        let mut ignored_depth = 0usize;
        stream
            .into_iter()
            .map(|event| match event {
                Event::Start { ref name, .. } => {
                    if ignored_depth > 0 || IGNORE_ELEMENTS.contains(&name.as_str()) {
                        ignored_depth += 1;
                    }
                    event
                }
                Event::End { .. } => {
                    ignored_depth = ignored_depth.saturating_sub(1);
                    event
                }
                Event::Text(text) if ignored_depth == 0 => Event::Text(self.translate(&text)),
                other => other,
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Text,
    Tag { quote: Option<char> },
    Comment,
}

struct SourceScanner<'t> {
    translator: &'t Translator,
    state: ScanState,
    out: String,
    text: String,
    tag: String,
    ignored: Option<String>,
}

impl<'t> SourceScanner<'t> {
    fn new(translator: &'t Translator) -> Self {
        Self {
            translator,
            state: ScanState::Text,
            out: String::new(),
            text: String::new(),
            tag: String::new(),
            ignored: None,
        }
    }

    fn code(&mut self, code: &str) {
        self.flush_text();
        self.out.push_str(code);
    }

    fn scan(&mut self, literal: &str) {
        let mut rest = literal;
        while let Some(c) = rest.chars().next() {
            match self.state {
                ScanState::Text if c == '<' && (self.ignored.is_none() || rest.starts_with("</")) => {
                    self.flush_text();
                    if rest.starts_with("<!--") {
                        self.out.push_str("<!--");
                        self.state = ScanState::Comment;
                        rest = &rest[4..];
                        continue;
                    }
                    self.out.push(c);
                    self.tag.clear();
                    self.state = ScanState::Tag { quote: None };
                }
                ScanState::Text => self.text.push(c),
                ScanState::Tag { quote } => {
                    self.out.push(c);
                    match (quote, c) {
                        (None, '"' | '\'') => self.state = ScanState::Tag { quote: Some(c) },
                        (Some(q), _) if q == c => self.state = ScanState::Tag { quote: None },
                        (None, '>') => {
                            self.end_tag();
                            self.state = ScanState::Text;
                        }
                        _ => self.tag.push(c),
                    }
                }
                ScanState::Comment if rest.starts_with("-->") => {
                    self.out.push_str("-->");
                    self.state = ScanState::Text;
                    rest = &rest[3..];
                    continue;
                }
                ScanState::Comment => self.out.push(c),
            }
            rest = &rest[c.len_utf8()..];
        }
    }

    fn end_tag(&mut self) {
        let tag = self.tag.trim();
        if let Some(closing) = tag.strip_prefix('/') {
            let name = tag_name(closing);
            if self.ignored.as_deref().is_some_and(|open| open.eq_ignore_ascii_case(name)) {
                self.ignored = None;
            }
        } else if self.ignored.is_none() && !tag.ends_with('/') {
            let name = tag_name(tag);
            if IGNORE_ELEMENTS.iter().any(|e| e.eq_ignore_ascii_case(name)) {
                self.ignored = Some(name.to_string());
            }
        }
    }

    fn flush_text(&mut self) {
        if self.text.is_empty() {
            return;
        }
        let text = std::mem::take(&mut self.text);
        if self.ignored.is_some() {
            self.out.push_str(&text);
        } else {
            self.out.push_str(&self.translator.translate(&text));
        }
    }

    fn finish(mut self) -> String {
        self.flush_text();
        self.out
    }
}

fn tag_name(tag: &str) -> &str {
    tag.split(|c: char| c.is_whitespace() || c == '/')
        .next()
        .unwrap_or_default()
}

impl fmt::Debug for Translator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Translator").finish_non_exhaustive()
    }
}
