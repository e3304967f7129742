//! Render entry points.
//!
//! Every render goes through the same steps:
//!
//! 1. select the method from the explicit method or the template extension
//! 2. assemble the context (see [`App::template_context`])
//! 3. load the template, or compile the inline string
//! 4. render it and turn the output into a [`Stream`]: markup templates are
//!    parsed, text templates become a single text event
//! 5. apply template-level filters, send `template_generated`, apply the
//!    method's filters and finally the per-render filter
//! 6. serialize with the method's serializer and doctype
//!
//! [`generate_template`] stops after step 5, [`render_template`] after
//! step 6, and [`render_response`] wraps the result in a [`Response`].

use std::sync::Arc;

use quire_markup::{parse_markup, Stream};
use serde::Serialize;

use crate::app::App;
use crate::context::TemplateContext;
use crate::error::QuireError;
use crate::extension::Quire;
use crate::filter::{apply_chain, StreamFilter};
use crate::method::{MethodSpec, TemplateKind};
use crate::response::Response;
use crate::signal::TemplateGenerated;

/// What to render and how.
#[derive(Debug, Clone, Default)]
pub struct RenderRequest {
    template: Option<String>,
    string: Option<String>,
    context: TemplateContext,
    method: Option<String>,
    filter: Option<StreamFilter>,
}

impl RenderRequest {
    /// A request with neither template nor string; rendering it fails with
    /// [`QuireError::MissingTemplate`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Renders the named template from the search path.
    pub fn template(name: impl Into<String>) -> Self {
        Self {
            template: Some(name.into()),
            ..Self::default()
        }
    }

    /// Renders an inline template string. Requires [`method`](Self::method).
    pub fn string(source: impl Into<String>) -> Self {
        Self {
            string: Some(source.into()),
            ..Self::default()
        }
    }

    pub fn context(mut self, context: TemplateContext) -> Self {
        self.context = context;
        self
    }

    /// Forces a rendering method instead of the template's extension.
    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    /// A filter applied to this render only, after the method filters.
    pub fn filter(mut self, filter: impl Into<StreamFilter>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn template_name(&self) -> Option<&str> {
        self.template.as_deref()
    }
}

struct Resolved {
    quire: Arc<Quire>,
    method: String,
    spec: MethodSpec,
}

fn resolve(app: &App, request: &RenderRequest) -> Result<Resolved, QuireError> {
    if request.template.is_none() && request.string.is_none() {
        return Err(QuireError::MissingTemplate);
    }
    let quire = app.quire()?;
    let method = quire.method_for(request.template.as_deref(), request.method.as_deref())?;
    let spec = quire.method(&method)?.clone();
    Ok(Resolved {
        quire,
        method,
        spec,
    })
}

fn generate(app: &App, resolved: &Resolved, request: RenderRequest) -> Result<Stream, QuireError> {
    let Resolved {
        quire,
        method,
        spec,
    } = resolved;
    let context = app.template_context(request.context);
    let loader = quire.template_loader(app);

    let (template, output) = match (request.template, request.string) {
        (Some(name), _) => {
            let callback = quire.callback();
            let template = loader.load(&name, spec.kind, callback.as_ref())?;
            let output = loader.render(&template, &context)?;
            (Some(template), output)
        }
        (None, Some(source)) => (None, loader.render_str(spec.kind, &source, &context)?),
        (None, None) => return Err(QuireError::MissingTemplate),
    };

    let mut stream = match spec.kind {
        TemplateKind::Markup => parse_markup(&output)?,
        TemplateKind::Text => Stream::from_text(output),
    };
    if let Some(template) = &template {
        stream = apply_chain(method, template.filters(), stream, &context)?;
    }

    let signal = app.template_generated();
    if signal.has_receivers() {
        signal.send(&TemplateGenerated {
            template,
            method: method.clone(),
            context: context.clone(),
        });
    }

    stream = apply_chain(method, &quire.filters_for(method), stream, &context)?;
    if let Some(filter) = &request.filter {
        stream = apply_chain(method, [filter], stream, &context)?;
    }
    Ok(stream)
}

/// Generates the filtered event stream of a template or string.
///
/// # Errors
///
/// [`QuireError::MissingTemplate`] when the request has neither a template
/// nor a string; otherwise whatever method selection, loading, rendering,
/// parsing or a filter reports.
pub fn generate_template(app: &App, request: RenderRequest) -> Result<Stream, QuireError> {
    let resolved = resolve(app, &request)?;
    generate(app, &resolved, request)
}

/// Generates and serializes a template or string.
pub fn render_template(app: &App, request: RenderRequest) -> Result<String, QuireError> {
    let resolved = resolve(app, &request)?;
    let doctype = resolved.spec.resolve_doctype()?;
    let stream = generate(app, &resolved, request)?;
    let rendered = stream.render(resolved.spec.serializer, doctype.as_ref());
    tracing::trace!(method = %resolved.method, bytes = rendered.len(), "rendered template");
    Ok(rendered)
}

/// Renders a template or string into a response carrying the method's
/// mimetype.
pub fn render_response(app: &App, request: RenderRequest) -> Result<Response, QuireError> {
    let resolved = resolve(app, &request)?;
    let mimetype = resolved.spec.mimetype_or_default().to_string();
    let data = render_template(app, request)?;
    Ok(app.make_response(data, mimetype))
}

/// Renders `template` with `context` into a response.
///
/// ```rust,no_run
/// use quire::{render, App, Quire};
/// use serde_json::json;
///
/// let mut app = App::new("/srv/site");
/// Quire::new().init_app(&mut app);
/// let response = render(&app, "index.html", json!({ "name": "Rudolf" }))?;
/// assert_eq!(response.mimetype, "text/html");
/// # Ok::<(), quire::QuireError>(())
/// ```
pub fn render<T: Serialize>(app: &App, template: &str, context: T) -> Result<Response, QuireError> {
    let context = TemplateContext::from_serialize(&context)?;
    render_response(app, RenderRequest::template(template).context(context))
}
