//! # quire-markup - markup event streams
//!
//! This crate is the stream layer of `quire`. Template output is parsed into
//! a [`Stream`] of [`Event`]s, transformed by filters, then written back out
//! by a serializer chosen per rendering method.
//!
//! ## Pipeline
//!
//! ```text
//! rendered text ── parse_markup ──▶ Stream ── filters ──▶ Stream ── serialize ──▶ String
//! ```
//!
//! Text-class output skips the parser and travels as a single text event
//! ([`Stream::from_text`]).
//!
//! ## Example
//!
//! ```rust
//! use quire_markup::{parse_markup, DocType, SerializerKind, Transformer};
//!
//! let stream = parse_markup("<html><head><title>Hi!</title></head></html>").unwrap();
//! let stream = Transformer::select("head/title").append(" - Docs").apply(stream);
//!
//! let doctype = DocType::get("html5").unwrap();
//! let html = stream.render(SerializerKind::Html, Some(&doctype));
//! assert_eq!(html, "<!DOCTYPE html>\n<html><head><title>Hi! - Docs</title></head></html>");
//! ```
//!
//! ## Modules
//!
//! - [`event`]: [`Event`], [`Attrs`] and [`Stream`]
//! - [`parse`]: well-formed markup to stream
//! - [`serialize`]: HTML, XHTML, XML and text serializers
//! - [`doctype`]: named doctype table
//! - [`transform`]: path-selected [`Transformer`]
//! - [`i18n`]: text [`Translator`]

pub mod doctype;
mod error;
pub mod event;
pub mod i18n;
pub mod parse;
pub mod serialize;
pub mod transform;

pub use doctype::{DocType, DOCTYPE_NAMES};
pub use error::MarkupError;
pub use event::{Attrs, Event, Stream};
pub use i18n::{SourcePiece, Translator};
pub use parse::parse_markup;
pub use serialize::{
    collapse_whitespace, escape_attr, escape_text, serialize, SerializerKind, BOOLEAN_ATTRIBUTES,
    VOID_ELEMENTS,
};
pub use transform::{Content, Transformer};
