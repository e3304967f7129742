//! Error types for template rendering.
//!
//! [`QuireError`] classifies every failure of the render pipeline. Errors
//! from the template engine, the markup parser and user filters are carried
//! through unchanged inside their variant.

use std::path::PathBuf;

use quire_markup::MarkupError;
use thiserror::Error;

/// Error returned by stream filters.
pub type FilterError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error type for all quire operations.
#[derive(Debug, Error)]
pub enum QuireError {
    /// No method was given and the template's extension is not mapped.
    #[error("no rendering method for extension {extension:?} (template {template:?})")]
    UnknownExtension { template: String, extension: String },

    /// The method is not present in the method table.
    #[error("unknown rendering method: {0}")]
    UnknownMethod(String),

    /// An inline string was given without an explicit method.
    #[error("a rendering method is required to render an inline string")]
    MethodRequired,

    /// Neither a template name nor an inline string was given.
    #[error("need a template or string")]
    MissingTemplate,

    /// No directory on the search path holds the template.
    #[error("template not found: {name}")]
    TemplateNotFound { name: String, searched: Vec<PathBuf> },

    /// Template syntax or evaluation error.
    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),

    /// The generated markup could not be parsed, or a table names an
    /// unknown serializer or doctype.
    #[error(transparent)]
    Markup(#[from] MarkupError),

    /// A stream filter failed.
    #[error("stream filter for method {method:?} failed: {source}")]
    Filter {
        method: String,
        #[source]
        source: FilterError,
    },

    /// The render context could not be built from the caller's data.
    #[error("context error: {0}")]
    Context(String),

    /// The application has no quire extension registered.
    #[error("quire is not registered on this application (call Quire::init_app)")]
    NotInitialized,

    /// Invalid configuration document.
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_yaml::Error> for QuireError {
    fn from(err: serde_yaml::Error) -> Self {
        QuireError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for QuireError {
    fn from(err: serde_json::Error) -> Self {
        QuireError::Context(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_template_display() {
        assert_eq!(QuireError::MissingTemplate.to_string(), "need a template or string");
    }

    #[test]
    fn filter_error_keeps_source() {
        use std::error::Error as _;

        let err = QuireError::Filter {
            method: "html".into(),
            source: "boom".into(),
        };
        assert!(err.to_string().contains("boom"));
        assert!(err.source().is_some());
    }

    #[test]
    fn from_minijinja_error() {
        let mj = minijinja::Error::new(minijinja::ErrorKind::SyntaxError, "unexpected end");
        let err: QuireError = mj.into();
        assert!(matches!(err, QuireError::Template(_)));
    }

    #[test]
    fn from_yaml_error() {
        let yaml_err = serde_yaml::from_str::<Vec<u8>>("{").unwrap_err();
        let err: QuireError = yaml_err.into();
        assert!(matches!(err, QuireError::Config(_)));
    }
}
