//! # quire - markup templating for web applications
//!
//! `quire` renders templates for an application and hands back responses
//! with the right content type. It picks a rendering method from the
//! template's extension, finds the template next to the application's code
//! (including blueprint folders), fills in the application's global
//! template variables, and runs user filters over the generated markup
//! before serializing it.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use quire::{render_template, App, Quire, RenderRequest, TemplateContext};
//! use quire_markup::Transformer;
//!
//! let mut app = App::new("/srv/site");
//! let quire = Quire::new().init_app(&mut app);
//! quire.filter(["html"], Transformer::select("head/title").prepend("Site - "));
//!
//! // templates/index.html: <html><head><title>{{ title }}</title></head></html>
//! let page = render_template(
//!     &app,
//!     RenderRequest::template("index.html")
//!         .context(TemplateContext::new().with("title", "Home")),
//! )?;
//! # Ok::<(), quire::QuireError>(())
//! ```
//!
//! ## Methods
//!
//! | Extension | Method | Output |
//! |-----------|--------|--------|
//! | `.html` | `html` | HTML 4.01 strict doctype, `text/html` |
//! | `.xml` | `xml` | `application/xml` |
//! | `.txt` | `text` | `text/plain`, not escaped |
//! | `.js` | `js` | `application/javascript`, not escaped |
//! | `.css` | `css` | `text/css`, not escaped |
//! | `.svg` | `svg` | SVG 1.1 doctype, `image/svg+xml` |
//!
//! `html5` and `xhtml` are available as explicit methods. Tables can be
//! extended in code ([`Quire::table_mut`]) or from YAML ([`QuireConfig`]).
//!
//! ## Template lookup
//!
//! The application's template folder is searched first. A name of the
//! form `"<blueprint>/<path>"` then falls back to `<path>` inside that
//! blueprint's template folder. See [`loader`].
//!
//! ## Filters
//!
//! Filters run on the event stream in this order: template-level filters
//! attached from the [`Quire::template_parsed`] callback, method filters
//! registered with [`Quire::filter`], then the filter given to the
//! individual [`RenderRequest`]. Filters that need the render context are
//! built with [`StreamFilter::with_context`].

mod app;
pub mod config;
mod context;
mod error;
mod extension;
pub mod filter;
pub mod loader;
pub mod method;
mod namespace;
mod render;
mod response;
pub mod signal;

pub use app::{App, Blueprint, ContextProcessor, DEFAULT_TEMPLATE_FOLDER};
pub use config::{MethodConfig, QuireConfig};
pub use context::TemplateContext;
pub use error::{FilterError, QuireError};
pub use extension::Quire;
pub use filter::{FilterRegistry, StreamFilter};
pub use loader::{LoadedTemplate, ParsedCallback, SearchPath, TemplateLoader};
pub use method::{MethodSpec, MethodTable, TemplateKind, DEFAULT_MIMETYPE};
pub use namespace::{truncate, TemplateNamespace, TRUNCATE_LEEWAY};
pub use render::{generate_template, render, render_response, render_template, RenderRequest};
pub use response::Response;
pub use signal::{Signal, TemplateGenerated};

// Re-exported so filters can be written against the same version.
pub use quire_markup;
