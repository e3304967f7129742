//! Parsing generated markup into a [`Stream`].
//!
//! Markup templates are rendered to text first; this module turns that text
//! into events so filters can work on structure instead of strings. The input
//! must be well formed XML: every element closed and attributes quoted.
//! Named entities are resolved against the HTML table, so `&nbsp;` and
//! `&copy;` work as they do in HTML; an unknown name is a syntax error.

use std::borrow::Cow;

use quick_xml::escape::resolve_html5_entity;
use quick_xml::events::Event as XmlEvent;
use quick_xml::Reader;

use crate::error::MarkupError;
use crate::event::{Attrs, Event, Stream};

/// Parses well-formed markup into an event stream.
///
/// Empty elements (`<br/>`) become a start/end pair. Whitespace-only text
/// outside the root element is dropped, so a trailing newline in a template
/// file does not leak into the serialized output.
///
/// # Example
///
/// ```rust
/// use quire_markup::{parse_markup, Event};
///
/// let stream = parse_markup("<p class=\"x\">a &amp; b<br/></p>").unwrap();
/// assert_eq!(stream.len(), 5);
/// assert_eq!(stream.events()[1], Event::text("a & b"));
/// ```
pub fn parse_markup(source: &str) -> Result<Stream, MarkupError> {
    let mut reader = Reader::from_str(source);
    let config = reader.config_mut();
    config.trim_text(false);
    config.expand_empty_elements = true;
    config.check_end_names = true;

    let mut stream = Stream::new();
    let mut depth: usize = 0;

    loop {
        let position = reader.buffer_position() as u64;
        let event = reader
            .read_event()
            .map_err(|e| MarkupError::syntax(position, e.to_string()))?;

        match event {
            XmlEvent::Start(start) => {
                let name = lossy(start.name().as_ref());
                let mut attrs = Attrs::new();
                for attr in start.attributes() {
                    let attr = attr.map_err(|e| MarkupError::syntax(position, e.to_string()))?;
                    let value = attr
                        .unescape_value_with(resolve_html5_entity)
                        .map_err(|e| MarkupError::syntax(position, e.to_string()))?;
                    attrs.set(lossy(attr.key.as_ref()), value.into_owned());
                }
                depth += 1;
                stream.push(Event::Start { name, attrs });
            }
            XmlEvent::End(end) => {
                depth = depth.saturating_sub(1);
                stream.push(Event::End {
                    name: lossy(end.name().as_ref()),
                });
            }
            XmlEvent::Empty(empty) => {
                // Only reachable if empty-element expansion is switched off.
                let name = lossy(empty.name().as_ref());
                stream.push(Event::start(name.clone()));
                stream.push(Event::End { name });
            }
            XmlEvent::Text(text) => {
                let text = text
                    .unescape_with(resolve_html5_entity)
                    .map_err(|e| MarkupError::syntax(position, e.to_string()))?;
                push_text(&mut stream, depth, text);
            }
            XmlEvent::CData(cdata) => {
                let text = lossy(&cdata.into_inner());
                push_text(&mut stream, depth, Cow::Owned(text));
            }
            XmlEvent::Comment(comment) => stream.push(Event::Comment(lossy(&comment))),
            XmlEvent::PI(pi) => stream.push(Event::Pi(lossy(&pi))),
            XmlEvent::Decl(decl) => stream.push(Event::XmlDecl(lossy(&decl))),
            XmlEvent::DocType(doctype) => {
                stream.push(Event::Doctype(lossy(&doctype).trim().to_string()))
            }
            XmlEvent::Eof => break,
        }
    }

    if depth != 0 {
        return Err(MarkupError::syntax(
            reader.buffer_position() as u64,
            "unexpected end of input: unclosed element",
        ));
    }

    Ok(stream)
}

fn push_text(stream: &mut Stream, depth: usize, text: Cow<'_, str>) {
    if text.is_empty() || (depth == 0 && text.trim().is_empty()) {
        return;
    }
    stream.push(Event::Text(text.into_owned()));
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_elements() {
        let stream = parse_markup("<html><head><title>Hi!</title></head></html>").unwrap();
        assert_eq!(
            stream.into_events(),
            vec![
                Event::start("html"),
                Event::start("head"),
                Event::start("title"),
                Event::text("Hi!"),
                Event::end("title"),
                Event::end("head"),
                Event::end("html"),
            ]
        );
    }

    #[test]
    fn expands_empty_elements() {
        let stream = parse_markup("<p><br/></p>").unwrap();
        assert_eq!(
            stream.into_events(),
            vec![
                Event::start("p"),
                Event::start("br"),
                Event::end("br"),
                Event::end("p"),
            ]
        );
    }

    #[test]
    fn keeps_attribute_order_and_unescapes_values() {
        let stream = parse_markup(r#"<text x="250" y="150" title="a &amp; b"/>"#).unwrap();
        match &stream.events()[0] {
            Event::Start { name, attrs } => {
                assert_eq!(name, "text");
                let pairs: Vec<_> = attrs.iter().collect();
                assert_eq!(pairs, vec![("x", "250"), ("y", "150"), ("title", "a & b")]);
            }
            other => panic!("expected start, got {:?}", other),
        }
    }

    #[test]
    fn resolves_character_references() {
        let stream = parse_markup("<p>&#39;quoted&#x27; &lt;tag&gt;</p>").unwrap();
        assert_eq!(stream.text(), "'quoted' <tag>");
    }

    #[test]
    fn drops_whitespace_outside_root() {
        let stream = parse_markup("\n<body>Hi</body>\n\n").unwrap();
        assert_eq!(stream.len(), 3);
    }

    #[test]
    fn keeps_whitespace_inside_root() {
        let stream = parse_markup("<svg>\n<text/>\n</svg>").unwrap();
        assert_eq!(stream.events()[1], Event::text("\n"));
    }

    #[test]
    fn cdata_becomes_text() {
        let stream = parse_markup("<script><![CDATA[a < b]]></script>").unwrap();
        assert_eq!(stream.text(), "a < b");
    }

    #[test]
    fn comments_and_declarations() {
        let stream = parse_markup("<?xml version=\"1.0\"?><!-- note --><a/>").unwrap();
        assert!(matches!(stream.events()[0], Event::XmlDecl(_)));
        assert_eq!(stream.events()[1], Event::Comment(" note ".into()));
    }

    #[test]
    fn mismatched_end_tag_is_error() {
        let err = parse_markup("<p><b></p>").unwrap_err();
        assert!(matches!(err, MarkupError::Syntax { .. }));
    }

    #[test]
    fn unclosed_element_is_error() {
        let err = parse_markup("<p>open").unwrap_err();
        assert!(matches!(err, MarkupError::Syntax { .. }));
    }

    #[test]
    fn resolves_html_entities() {
        let stream = parse_markup("<p title=\"&copy;&nbsp;q\">&copy; 2024&nbsp;x</p>").unwrap();
        assert_eq!(stream.text(), "\u{a9} 2024\u{a0}x");
        match &stream.events()[0] {
            Event::Start { attrs, .. } => assert_eq!(attrs.get("title"), Some("\u{a9}\u{a0}q")),
            other => panic!("expected start, got {:?}", other),
        }
    }

    #[test]
    fn unknown_entity_is_error() {
        assert!(parse_markup("<p>&nosuchentity;</p>").is_err());
    }
}
