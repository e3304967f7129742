//! Rendering methods and the tables that select them.
//!
//! Two tables drive every render:
//!
//! - the extension map, from a template file suffix to a method name
//! - the method map, from a method name to a [`MethodSpec`]
//!
//! | Method | Serializer | Doctype | Mimetype | Kind |
//! |--------|------------|---------|----------|------|
//! | `html` | html | `html` | `text/html` | markup |
//! | `html5` | html | `html5` | `text/html` | markup |
//! | `xhtml` | xhtml | `xhtml` | `application/xhtml+xml` | markup |
//! | `xml` | xml | – | `application/xml` | markup |
//! | `text` | text | – | `text/plain` | text |
//! | `js` | text | – | `application/javascript` | text |
//! | `css` | text | – | `text/css` | text |
//! | `svg` | xml | `svg` | `image/svg+xml` | markup |

use std::collections::HashMap;
use std::path::Path;

use quire_markup::{DocType, SerializerKind};
use serde::{Deserialize, Serialize};

use crate::error::QuireError;

/// Mimetype used when a method does not define one.
pub const DEFAULT_MIMETYPE: &str = "text/html";

/// Default extension to method pairs.
pub const DEFAULT_EXTENSIONS: &[(&str, &str)] = &[
    ("html", "html"),
    ("xml", "xml"),
    ("txt", "text"),
    ("js", "js"),
    ("css", "css"),
    ("svg", "svg"),
];

/// Template class: how template output becomes a stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateKind {
    /// Output is parsed as markup; interpolated values are escaped.
    #[default]
    Markup,
    /// Output is a single text event; nothing is escaped.
    Text,
}

/// Serializer, doctype, mimetype and template kind of a method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSpec {
    pub serializer: SerializerKind,
    /// Doctype name, resolved with [`DocType::get`] at render time.
    pub doctype: Option<String>,
    pub mimetype: Option<String>,
    pub kind: TemplateKind,
}

impl MethodSpec {
    pub fn new(serializer: SerializerKind) -> Self {
        Self {
            serializer,
            doctype: None,
            mimetype: None,
            kind: TemplateKind::Markup,
        }
    }

    pub fn doctype(mut self, name: impl Into<String>) -> Self {
        self.doctype = Some(name.into());
        self
    }

    pub fn mimetype(mut self, mimetype: impl Into<String>) -> Self {
        self.mimetype = Some(mimetype.into());
        self
    }

    pub fn kind(mut self, kind: TemplateKind) -> Self {
        self.kind = kind;
        self
    }

    /// The response mimetype, falling back to [`DEFAULT_MIMETYPE`].
    pub fn mimetype_or_default(&self) -> &str {
        self.mimetype.as_deref().unwrap_or(DEFAULT_MIMETYPE)
    }

    /// Resolves the doctype name.
    pub fn resolve_doctype(&self) -> Result<Option<DocType>, QuireError> {
        Ok(self.doctype.as_deref().map(DocType::get).transpose()?)
    }
}

/// Extension map and method map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodTable {
    extensions: HashMap<String, String>,
    methods: HashMap<String, MethodSpec>,
}

impl Default for MethodTable {
    fn default() -> Self {
        let extensions = DEFAULT_EXTENSIONS
            .iter()
            .map(|(ext, method)| (ext.to_string(), method.to_string()))
            .collect();

        let text = || MethodSpec::new(SerializerKind::Text).kind(TemplateKind::Text);
        let methods = [
            ("html", MethodSpec::new(SerializerKind::Html).doctype("html")),
            ("html5", MethodSpec::new(SerializerKind::Html).doctype("html5")),
            (
                "xhtml",
                MethodSpec::new(SerializerKind::Xhtml)
                    .doctype("xhtml")
                    .mimetype("application/xhtml+xml"),
            ),
            ("xml", MethodSpec::new(SerializerKind::Xml).mimetype("application/xml")),
            ("text", text().mimetype("text/plain")),
            ("js", text().mimetype("application/javascript")),
            ("css", text().mimetype("text/css")),
            (
                "svg",
                MethodSpec::new(SerializerKind::Xml)
                    .doctype("svg")
                    .mimetype("image/svg+xml"),
            ),
        ]
        .into_iter()
        .map(|(name, spec)| (name.to_string(), spec))
        .collect();

        Self {
            extensions,
            methods,
        }
    }
}

impl MethodTable {
    /// Creates the default tables.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extensions(&self) -> &HashMap<String, String> {
        &self.extensions
    }

    pub fn methods(&self) -> &HashMap<String, MethodSpec> {
        &self.methods
    }

    /// Maps a file extension (without the dot) to a method.
    pub fn set_extension(&mut self, extension: impl Into<String>, method: impl Into<String>) {
        self.extensions.insert(extension.into(), method.into());
    }

    /// Adds or replaces a method.
    pub fn set_method(&mut self, name: impl Into<String>, spec: MethodSpec) {
        self.methods.insert(name.into(), spec);
    }

    /// Looks a method up by name.
    pub fn get(&self, method: &str) -> Result<&MethodSpec, QuireError> {
        self.methods
            .get(method)
            .ok_or_else(|| QuireError::UnknownMethod(method.to_string()))
    }

    /// Selects the method for a render.
    ///
    /// An explicit `method` always wins. Otherwise the extension of the
    /// template's last path component is looked up in the extension map.
    pub fn method_for(
        &self,
        template: Option<&str>,
        method: Option<&str>,
    ) -> Result<String, QuireError> {
        if let Some(method) = method {
            return Ok(method.to_string());
        }
        let template = template.ok_or(QuireError::MethodRequired)?;
        let extension = extension_of(template);
        self.extensions
            .get(extension)
            .cloned()
            .ok_or_else(|| QuireError::UnknownExtension {
                template: template.to_string(),
                extension: extension.to_string(),
            })
    }
}

/// Extension of the last path component, without the dot.
///
/// Leading dots do not start an extension (`.hidden` has none).
pub fn extension_of(template: &str) -> &str {
    Path::new(template)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_extensions() {
        let table = MethodTable::new();
        assert_eq!(table.method_for(Some("test.html"), None).unwrap(), "html");
        assert_eq!(table.method_for(Some("test.txt"), None).unwrap(), "text");
        assert_eq!(table.method_for(Some("a/b/test.svg"), None).unwrap(), "svg");
        assert_eq!(table.method_for(Some("test.js"), None).unwrap(), "js");
    }

    #[test]
    fn explicit_method_wins() {
        let table = MethodTable::new();
        assert_eq!(
            table.method_for(Some("test.html"), Some("xhtml")).unwrap(),
            "xhtml"
        );
        assert_eq!(table.method_for(None, Some("text")).unwrap(), "text");
    }

    #[test]
    fn unknown_extension_is_lookup_failure() {
        let table = MethodTable::new();
        let err = table.method_for(Some("test.jinja"), None).unwrap_err();
        assert!(matches!(
            err,
            QuireError::UnknownExtension { ref extension, .. } if extension == "jinja"
        ));
        assert!(table.method_for(Some("README"), None).is_err());
    }

    #[test]
    fn no_template_and_no_method() {
        let table = MethodTable::new();
        assert!(matches!(
            table.method_for(None, None),
            Err(QuireError::MethodRequired)
        ));
    }

    #[test]
    fn extension_of_last_component() {
        assert_eq!(extension_of("dir.d/file"), "");
        assert_eq!(extension_of("dir/file.tar.gz"), "gz");
        assert_eq!(extension_of(".hidden"), "");
    }

    #[test]
    fn default_method_specs() {
        let table = MethodTable::new();
        let html = table.get("html").unwrap();
        assert_eq!(html.serializer, SerializerKind::Html);
        assert_eq!(html.mimetype_or_default(), "text/html");
        assert_eq!(html.kind, TemplateKind::Markup);

        let css = table.get("css").unwrap();
        assert_eq!(css.kind, TemplateKind::Text);
        assert_eq!(css.mimetype_or_default(), "text/css");

        let svg = table.get("svg").unwrap();
        assert_eq!(svg.serializer, SerializerKind::Xml);
        assert_eq!(svg.resolve_doctype().unwrap().unwrap().root, "svg");
    }

    #[test]
    fn unknown_method() {
        let table = MethodTable::new();
        assert!(matches!(
            table.get("json"),
            Err(QuireError::UnknownMethod(ref m)) if m == "json"
        ));
    }

    #[test]
    fn custom_extension_and_method() {
        let mut table = MethodTable::new();
        table.set_method(
            "atom",
            MethodSpec::new(SerializerKind::Xml).mimetype("application/atom+xml"),
        );
        table.set_extension("atom", "atom");
        assert_eq!(table.method_for(Some("feed.atom"), None).unwrap(), "atom");
        assert_eq!(
            table.get("atom").unwrap().mimetype_or_default(),
            "application/atom+xml"
        );
    }
}
