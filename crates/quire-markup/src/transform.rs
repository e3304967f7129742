//! Path-selected stream transformations.
//!
//! A [`Transformer`] selects elements by a slash-separated path of element
//! names and applies one or more actions to every selection:
//!
//! ```rust
//! use quire_markup::{parse_markup, SerializerKind, Transformer};
//!
//! let stream = parse_markup("<html><head><title>Hi!</title></head></html>").unwrap();
//! let stream = Transformer::select("head/title").prepend("Site - ").apply(stream);
//! assert_eq!(
//!     stream.render(SerializerKind::Xml, None),
//!     "<html><head><title>Site - Hi!</title></head></html>"
//! );
//! ```
//!
//! Paths are matched against the chain of open elements, ending at the
//! candidate: `head/title` selects any `title` whose parent is `head`, at
//! any depth. `*` matches a single element of any name.

use crate::event::{Event, Stream};

/// Content inserted by a transformation: plain text or a run of events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    Text(String),
    Events(Vec<Event>),
}

impl Content {
    fn emit(&self, out: &mut Vec<Event>) {
        match self {
            Content::Text(text) => out.push(Event::Text(text.clone())),
            Content::Events(events) => out.extend(events.iter().cloned()),
        }
    }
}

impl From<&str> for Content {
    fn from(text: &str) -> Self {
        Content::Text(text.to_string())
    }
}

impl From<String> for Content {
    fn from(text: String) -> Self {
        Content::Text(text)
    }
}

impl From<Stream> for Content {
    fn from(stream: Stream) -> Self {
        Content::Events(stream.into_events())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Action {
    Before(Content),
    After(Content),
    Prepend(Content),
    Append(Content),
    Replace(Content),
    Remove,
    SetAttr(String, String),
    RemoveAttr(String),
}

/// Applies actions to the elements selected by a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transformer {
    path: Vec<String>,
    actions: Vec<Action>,
}

impl Transformer {
    /// Creates a transformer selecting elements by `path`.
    pub fn select(path: &str) -> Self {
        let path = path
            .split('/')
            .map(str::trim)
            .filter(|segment| !segment.is_empty() && *segment != ".")
            .map(str::to_string)
            .collect();
        Self {
            path,
            actions: Vec::new(),
        }
    }

    /// Inserts content before each selected element.
    pub fn before(mut self, content: impl Into<Content>) -> Self {
        self.actions.push(Action::Before(content.into()));
        self
    }

    /// Inserts content after each selected element.
    pub fn after(mut self, content: impl Into<Content>) -> Self {
        self.actions.push(Action::After(content.into()));
        self
    }

    /// Inserts content as the first child of each selected element.
    pub fn prepend(mut self, content: impl Into<Content>) -> Self {
        self.actions.push(Action::Prepend(content.into()));
        self
    }

    /// Inserts content as the last child of each selected element.
    pub fn append(mut self, content: impl Into<Content>) -> Self {
        self.actions.push(Action::Append(content.into()));
        self
    }

    /// Replaces each selected element, tags included.
    pub fn replace(mut self, content: impl Into<Content>) -> Self {
        self.actions.push(Action::Replace(content.into()));
        self
    }

    /// Removes each selected element with its content.
    pub fn remove(mut self) -> Self {
        self.actions.push(Action::Remove);
        self
    }

    /// Sets an attribute on each selected element.
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.actions.push(Action::SetAttr(name.into(), value.into()));
        self
    }

    /// Removes an attribute from each selected element.
    pub fn remove_attr(mut self, name: impl Into<String>) -> Self {
        self.actions.push(Action::RemoveAttr(name.into()));
        self
    }

    fn matches(&self, open: &[String]) -> bool {
        if self.path.is_empty() || open.len() < self.path.len() {
            return false;
        }
        let tail = &open[open.len() - self.path.len()..];
        self.path
            .iter()
            .zip(tail)
            .all(|(segment, name)| segment == "*" || segment == name)
    }

    fn replacement(&self) -> Option<Option<&Content>> {
        self.actions.iter().find_map(|action| match action {
            Action::Replace(content) => Some(Some(content)),
            Action::Remove => Some(None),
            _ => None,
        })
    }

    /// Runs the transformation over `stream`.
    pub fn apply(&self, stream: Stream) -> Stream {
        let mut out = Vec::with_capacity(stream.len());
        let mut open: Vec<String> = Vec::new();
        let mut selected: Vec<bool> = Vec::new();
        // Depth at which a replaced or removed element started.
        let mut dropping: Option<usize> = None;

        for event in stream {
            match event {
                Event::Start { name, mut attrs } => {
                    open.push(name.clone());
                    if dropping.is_some() {
                        selected.push(false);
                        continue;
                    }
                    let hit = self.matches(&open);
                    selected.push(hit);
                    if !hit {
                        out.push(Event::Start { name, attrs });
                        continue;
                    }
                    for action in &self.actions {
                        if let Action::Before(content) = action {
                            content.emit(&mut out);
                        }
                    }
                    if let Some(replacement) = self.replacement() {
                        if let Some(content) = replacement {
                            content.emit(&mut out);
                        }
                        dropping = Some(open.len());
                        continue;
                    }
                    for action in &self.actions {
                        match action {
                            Action::SetAttr(key, value) => attrs.set(key.clone(), value.clone()),
                            Action::RemoveAttr(key) => {
                                attrs.remove(key);
                            }
                            _ => {}
                        }
                    }
                    out.push(Event::Start { name, attrs });
                    for action in &self.actions {
                        if let Action::Prepend(content) = action {
                            content.emit(&mut out);
                        }
                    }
                }
                Event::End { name } => {
                    let depth = open.len();
                    open.pop();
                    let hit = selected.pop().unwrap_or(false);
                    match dropping {
                        Some(start) if start == depth => {
                            dropping = None;
                            self.emit_after(&mut out);
                        }
                        Some(_) => {}
                        None => {
                            if hit {
                                for action in &self.actions {
                                    if let Action::Append(content) = action {
                                        content.emit(&mut out);
                                    }
                                }
                            }
                            out.push(Event::End { name });
                            if hit {
                                self.emit_after(&mut out);
                            }
                        }
                    }
                }
                other => {
                    if dropping.is_none() {
                        out.push(other);
                    }
                }
            }
        }

        Stream::from(out)
    }

    fn emit_after(&self, out: &mut Vec<Event>) {
        for action in &self.actions {
            if let Action::After(content) = action {
                content.emit(out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_markup;
    use crate::serialize::SerializerKind;

    fn run(transformer: Transformer, source: &str) -> String {
        transformer
            .apply(parse_markup(source).unwrap())
            .render(SerializerKind::Xml, None)
    }

    const PAGE: &str = "<html><head><title>Hi!</title></head><body><p>a</p><p>b</p></body></html>";

    #[test]
    fn prepend_and_append() {
        let out = run(
            Transformer::select("head/title").prepend("X - ").append(" - Y"),
            PAGE,
        );
        assert!(out.contains("<title>X - Hi! - Y</title>"));
    }

    #[test]
    fn path_requires_parent() {
        let out = run(Transformer::select("body/title").prepend("X"), PAGE);
        assert!(out.contains("<title>Hi!</title>"));
    }

    #[test]
    fn wildcard_segment() {
        let out = run(Transformer::select("*/p").append("!"), PAGE);
        assert!(out.contains("<p>a!</p><p>b!</p>"));
    }

    #[test]
    fn before_and_after() {
        let out = run(Transformer::select("title").before("[").after("]"), PAGE);
        assert!(out.contains("<head>[<title>Hi!</title>]</head>"));
    }

    #[test]
    fn replace_element() {
        let out = run(Transformer::select("body/p").replace("x"), PAGE);
        assert!(out.contains("<body>xx</body>"));
    }

    #[test]
    fn remove_element_with_children() {
        let out = run(Transformer::select("head").remove(), PAGE);
        assert_eq!(out, "<html><body><p>a</p><p>b</p></body></html>");
    }

    #[test]
    fn set_and_remove_attributes() {
        let out = run(
            Transformer::select("p").attr("class", "odd").remove_attr("id"),
            r#"<div><p id="1">a</p></div>"#,
        );
        assert_eq!(out, r#"<div><p class="odd">a</p></div>"#);
    }

    #[test]
    fn insert_markup_content() {
        let bold = parse_markup("<b>new</b>").unwrap();
        let out = run(Transformer::select("body").prepend(bold), PAGE);
        assert!(out.contains("<body><b>new</b><p>a</p>"));
    }

    #[test]
    fn empty_path_selects_nothing() {
        let out = run(Transformer::select("/").remove(), PAGE);
        assert_eq!(out, run(Transformer::select("nothing"), PAGE));
    }
}
