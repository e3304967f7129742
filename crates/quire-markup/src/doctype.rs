//! Document type declarations known by name.
//!
//! Method tables refer to doctypes by short names such as `html` or `svg`.
//! [`DocType::get`] resolves those names to the full declaration.

use std::fmt;

use crate::error::MarkupError;

/// A document type declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocType {
    /// Root element name.
    pub root: String,
    /// Public identifier, absent for HTML5.
    pub public_id: Option<String>,
    /// System identifier, absent for HTML5.
    pub system_id: Option<String>,
}

const HTML_STRICT: (&str, &str, &str) = (
    "html",
    "-//W3C//DTD HTML 4.01//EN",
    "http://www.w3.org/TR/html4/strict.dtd",
);
const HTML_TRANSITIONAL: (&str, &str, &str) = (
    "html",
    "-//W3C//DTD HTML 4.01 Transitional//EN",
    "http://www.w3.org/TR/html4/loose.dtd",
);
const HTML_FRAMESET: (&str, &str, &str) = (
    "html",
    "-//W3C//DTD HTML 4.01 Frameset//EN",
    "http://www.w3.org/TR/html4/frameset.dtd",
);
const XHTML_STRICT: (&str, &str, &str) = (
    "html",
    "-//W3C//DTD XHTML 1.0 Strict//EN",
    "http://www.w3.org/TR/xhtml1/DTD/xhtml1-strict.dtd",
);
const XHTML_TRANSITIONAL: (&str, &str, &str) = (
    "html",
    "-//W3C//DTD XHTML 1.0 Transitional//EN",
    "http://www.w3.org/TR/xhtml1/DTD/xhtml1-transitional.dtd",
);
const XHTML_FRAMESET: (&str, &str, &str) = (
    "html",
    "-//W3C//DTD XHTML 1.0 Frameset//EN",
    "http://www.w3.org/TR/xhtml1/DTD/xhtml1-frameset.dtd",
);
const XHTML11: (&str, &str, &str) = (
    "html",
    "-//W3C//DTD XHTML 1.1//EN",
    "http://www.w3.org/TR/xhtml11/DTD/xhtml11.dtd",
);
const SVG_FULL: (&str, &str, &str) = (
    "svg",
    "-//W3C//DTD SVG 1.1//EN",
    "http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd",
);
const SVG_BASIC: (&str, &str, &str) = (
    "svg:svg",
    "-//W3C//DTD SVG Basic 1.1//EN",
    "http://www.w3.org/Graphics/SVG/1.1/DTD/svg11-basic.dtd",
);
const SVG_TINY: (&str, &str, &str) = (
    "svg:svg",
    "-//W3C//DTD SVG Tiny 1.1//EN",
    "http://www.w3.org/Graphics/SVG/1.1/DTD/svg11-tiny.dtd",
);

/// Names accepted by [`DocType::get`].
pub const DOCTYPE_NAMES: &[&str] = &[
    "html",
    "html-strict",
    "html-transitional",
    "html-frameset",
    "html5",
    "xhtml",
    "xhtml-strict",
    "xhtml-transitional",
    "xhtml-frameset",
    "xhtml11",
    "svg",
    "svg-full",
    "svg-basic",
    "svg-tiny",
];

impl DocType {
    /// Creates a doctype from its three parts.
    pub fn new(
        root: impl Into<String>,
        public_id: Option<String>,
        system_id: Option<String>,
    ) -> Self {
        Self {
            root: root.into(),
            public_id,
            system_id,
        }
    }

    fn from_parts((root, public_id, system_id): (&str, &str, &str)) -> Self {
        Self::new(root, Some(public_id.into()), Some(system_id.into()))
    }

    /// The HTML5 doctype, `<!DOCTYPE html>`.
    pub fn html5() -> Self {
        Self::new("html", None, None)
    }

    /// Looks a doctype up by name (case-insensitive).
    pub fn get(name: &str) -> Result<Self, MarkupError> {
        let parts = match name.to_ascii_lowercase().as_str() {
            "html" | "html-strict" => HTML_STRICT,
            "html-transitional" => HTML_TRANSITIONAL,
            "html-frameset" => HTML_FRAMESET,
            "html5" => return Ok(Self::html5()),
            "xhtml" | "xhtml-strict" => XHTML_STRICT,
            "xhtml-transitional" => XHTML_TRANSITIONAL,
            "xhtml-frameset" => XHTML_FRAMESET,
            "xhtml11" => XHTML11,
            "svg" | "svg-full" => SVG_FULL,
            "svg-basic" => SVG_BASIC,
            "svg-tiny" => SVG_TINY,
            _ => return Err(MarkupError::UnknownDoctype(name.to_string())),
        };
        Ok(Self::from_parts(parts))
    }
}

impl fmt::Display for DocType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<!DOCTYPE {}", self.root)?;
        match (&self.public_id, &self.system_id) {
            (Some(public_id), Some(system_id)) => {
                write!(f, " PUBLIC \"{}\" \"{}\"", public_id, system_id)?
            }
            (Some(public_id), None) => write!(f, " PUBLIC \"{}\"", public_id)?,
            (None, Some(system_id)) => write!(f, " SYSTEM \"{}\"", system_id)?,
            (None, None) => {}
        }
        f.write_str(">")
    }
}
