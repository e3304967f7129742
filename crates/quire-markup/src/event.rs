//! Markup events and the [`Stream`] that carries them.
//!
//! A stream is the in-memory form of a generated template: the sequence of
//! start tags, end tags, text and the odd comment or declaration, in document
//! order. Filters receive a stream by value and hand back a (possibly
//! different) stream; serializers turn the final stream into text.

use crate::doctype::DocType;
use crate::error::MarkupError;
use crate::serialize::{serialize, SerializerKind};

/// Ordered attribute list of a start tag.
///
/// Attribute order is preserved exactly as parsed so serializers can
/// reproduce the source ordering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attrs {
    items: Vec<(String, String)>,
}

impl Attrs {
    /// Creates an empty attribute list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value of the named attribute.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.items
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Sets an attribute, replacing the existing value in place or
    /// appending it at the end.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.items.iter_mut().find(|(key, _)| *key == name) {
            Some(slot) => slot.1 = value,
            None => self.items.push((name, value)),
        }
    }

    /// Removes an attribute, returning its previous value.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        let idx = self.items.iter().position(|(key, _)| key == name)?;
        Some(self.items.remove(idx).1)
    }

    /// Iterates over `(name, value)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.items.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attrs {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attrs = Attrs::new();
        for (k, v) in iter {
            attrs.set(k, v);
        }
        attrs
    }
}

/// A single markup event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// An element start tag.
    Start { name: String, attrs: Attrs },
    /// An element end tag. Empty elements produce a start/end pair.
    End { name: String },
    /// Character data, already unescaped.
    Text(String),
    /// A comment, without the `<!--`/`-->` delimiters.
    Comment(String),
    /// A processing instruction, without the `<?`/`?>` delimiters.
    Pi(String),
    /// A doctype declaration found in the source, without `<!DOCTYPE`/`>`.
    Doctype(String),
    /// The XML declaration, without `<?`/`?>`.
    XmlDecl(String),
}

impl Event {
    /// Convenience constructor for a start tag without attributes.
    pub fn start(name: impl Into<String>) -> Self {
        Event::Start {
            name: name.into(),
            attrs: Attrs::new(),
        }
    }

    pub fn end(name: impl Into<String>) -> Self {
        Event::End { name: name.into() }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Event::Text(text.into())
    }
}

/// An owned sequence of markup events.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stream {
    events: Vec<Event>,
}

impl Stream {
    /// Creates an empty stream.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a stream holding a single text event.
    ///
    /// This is the stream shape of text-class templates, whose output is
    /// never parsed as markup.
    pub fn from_text(text: impl Into<String>) -> Self {
        let text = text.into();
        if text.is_empty() {
            return Self::new();
        }
        Self {
            events: vec![Event::Text(text)],
        }
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn into_events(self) -> Vec<Event> {
        self.events
    }

    pub fn push(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Feeds the stream through `f`, the `stream | filter` idiom.
    pub fn pipe<F>(self, f: F) -> Stream
    where
        F: FnOnce(Stream) -> Stream,
    {
        f(self)
    }

    /// Concatenates all text events, ignoring markup.
    pub fn text(&self) -> String {
        self.events
            .iter()
            .filter_map(|event| match event {
                Event::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Serializes the stream with the given serializer and optional doctype.
    pub fn render(&self, kind: SerializerKind, doctype: Option<&DocType>) -> String {
        serialize(self, kind, doctype)
    }

    /// Like [`render`](Self::render), resolving the serializer and doctype
    /// from their names.
    pub fn render_named(&self, serializer: &str, doctype: Option<&str>) -> Result<String, MarkupError> {
        let kind: SerializerKind = serializer.parse()?;
        let doctype = doctype.map(DocType::get).transpose()?;
        Ok(self.render(kind, doctype.as_ref()))
    }
}

impl From<Vec<Event>> for Stream {
    fn from(events: Vec<Event>) -> Self {
        Self { events }
    }
}

impl FromIterator<Event> for Stream {
    fn from_iter<I: IntoIterator<Item = Event>>(iter: I) -> Self {
        Self {
            events: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Stream {
    type Item = Event;
    type IntoIter = std::vec::IntoIter<Event>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attrs_set_replaces_in_place() {
        let mut attrs: Attrs = [("a", "1"), ("b", "2")].into_iter().collect();
        attrs.set("a", "3");
        let pairs: Vec<_> = attrs.iter().collect();
        assert_eq!(pairs, vec![("a", "3"), ("b", "2")]);
    }

    #[test]
    fn attrs_remove() {
        let mut attrs: Attrs = [("a", "1"), ("b", "2")].into_iter().collect();
        assert_eq!(attrs.remove("a"), Some("1".to_string()));
        assert_eq!(attrs.remove("missing"), None);
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs.get("b"), Some("2"));
    }

    #[test]
    fn from_text_empty_is_empty_stream() {
        assert!(Stream::from_text("").is_empty());
        assert_eq!(Stream::from_text("hi").len(), 1);
    }

    #[test]
    fn text_ignores_markup() {
        let stream: Stream = vec![
            Event::start("p"),
            Event::text("Hello "),
            Event::start("b"),
            Event::text("world"),
            Event::end("b"),
            Event::end("p"),
        ]
        .into();
        assert_eq!(stream.text(), "Hello world");
    }

    #[test]
    fn pipe_applies_function() {
        let stream = Stream::from_text("a").pipe(|mut s| {
            s.push(Event::text("b"));
            s
        });
        assert_eq!(stream.text(), "ab");
    }
}
