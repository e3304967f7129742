//! Stream filters and the per-method filter registry.
//!
//! A filter receives the generated [`Stream`] and returns a new one. Filters
//! come in two shapes, chosen when the filter is built:
//!
//! - [`StreamFilter::plain`]: sees only the stream
//! - [`StreamFilter::with_context`]: also sees the render context
//!
//! Transformers from `quire-markup` convert directly into plain filters:
//!
//! ```rust
//! use quire::StreamFilter;
//! use quire_markup::Transformer;
//!
//! let filter: StreamFilter = Transformer::select("head/title").prepend("Site - ").into();
//! assert!(!filter.takes_context());
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use quire_markup::{Stream, Transformer};

use crate::context::TemplateContext;
use crate::error::{FilterError, QuireError};

type PlainFn = dyn Fn(Stream) -> Result<Stream, FilterError> + Send + Sync;
type ContextFn = dyn Fn(Stream, &TemplateContext) -> Result<Stream, FilterError> + Send + Sync;

/// A function applied to a generated stream before serialization.
#[derive(Clone)]
pub enum StreamFilter {
    Plain(Arc<PlainFn>),
    WithContext(Arc<ContextFn>),
}

impl StreamFilter {
    /// A filter that sees only the stream.
    pub fn plain<F>(f: F) -> Self
    where
        F: Fn(Stream) -> Result<Stream, FilterError> + Send + Sync + 'static,
    {
        StreamFilter::Plain(Arc::new(f))
    }

    /// A filter that also receives the render context.
    pub fn with_context<F>(f: F) -> Self
    where
        F: Fn(Stream, &TemplateContext) -> Result<Stream, FilterError> + Send + Sync + 'static,
    {
        StreamFilter::WithContext(Arc::new(f))
    }

    /// A plain filter that cannot fail.
    pub fn map<F>(f: F) -> Self
    where
        F: Fn(Stream) -> Stream + Send + Sync + 'static,
    {
        Self::plain(move |stream| Ok(f(stream)))
    }

    pub fn takes_context(&self) -> bool {
        matches!(self, StreamFilter::WithContext(_))
    }

    /// Runs the filter.
    pub fn apply(&self, stream: Stream, context: &TemplateContext) -> Result<Stream, FilterError> {
        match self {
            StreamFilter::Plain(f) => f(stream),
            StreamFilter::WithContext(f) => f(stream, context),
        }
    }
}

impl fmt::Debug for StreamFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shape = if self.takes_context() {
            "WithContext"
        } else {
            "Plain"
        };
        write!(f, "StreamFilter::{}", shape)
    }
}

impl From<Transformer> for StreamFilter {
    fn from(transformer: Transformer) -> Self {
        StreamFilter::map(move |stream| transformer.apply(stream))
    }
}

/// Runs `filters` in order, wrapping failures as [`QuireError::Filter`].
pub(crate) fn apply_chain<'a>(
    method: &str,
    filters: impl IntoIterator<Item = &'a StreamFilter>,
    mut stream: Stream,
    context: &TemplateContext,
) -> Result<Stream, QuireError> {
    for (index, filter) in filters.into_iter().enumerate() {
        tracing::trace!(method, index, with_context = filter.takes_context(), "applying stream filter");
        stream = filter
            .apply(stream, context)
            .map_err(|source| QuireError::Filter {
                method: method.to_string(),
                source,
            })?;
    }
    Ok(stream)
}

/// Method name to ordered filter list.
#[derive(Debug, Clone, Default)]
pub struct FilterRegistry {
    filters: HashMap<String, Vec<StreamFilter>>,
}

impl FilterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `filter` to the list of every method in `methods`.
    pub fn register<I, S>(&mut self, methods: I, filter: StreamFilter)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for method in methods {
            self.filters
                .entry(method.into())
                .or_default()
                .push(filter.clone());
        }
    }

    /// Filters registered for `method`, in registration order.
    pub fn get(&self, method: &str) -> &[StreamFilter] {
        self.filters.get(method).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.filters.values().all(Vec::is_empty)
    }
}
