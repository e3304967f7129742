//! The host application model.
//!
//! [`App`] stands in for the web framework: it knows where its templates
//! live, which blueprints it has, what every template sees in its context,
//! and how to build a response. Extensions such as [`Quire`] register
//! themselves in its typed extension storage.
//!
//! ```rust
//! use quire::{App, Blueprint, TemplateContext};
//!
//! let mut app = App::new("/srv/site")
//!     .debug(true)
//!     .blueprint(Blueprint::new("admin", "/srv/site/admin"));
//! app.context_processor(|| TemplateContext::new().with("site", "Example"));
//!
//! assert_eq!(app.template_dir(), std::path::Path::new("/srv/site/templates"));
//! ```

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::context::TemplateContext;
use crate::error::QuireError;
use crate::extension::Quire;
use crate::namespace::TemplateNamespace;
use crate::response::Response;
use crate::signal::{Signal, TemplateGenerated};

/// Default template folder, relative to an application or blueprint root.
pub const DEFAULT_TEMPLATE_FOLDER: &str = "templates";

/// Hook contributing variables to every render context.
pub type ContextProcessor = Arc<dyn Fn() -> TemplateContext + Send + Sync>;

/// A named group of templates living under its own root.
///
/// A blueprint's templates are addressed as `"<name>/<template>"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blueprint {
    name: String,
    root_path: PathBuf,
    template_folder: PathBuf,
}

impl Blueprint {
    pub fn new(name: impl Into<String>, root_path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            root_path: root_path.into(),
            template_folder: PathBuf::from(DEFAULT_TEMPLATE_FOLDER),
        }
    }

    /// Sets the template folder, relative to the blueprint root.
    pub fn template_folder(mut self, folder: impl Into<PathBuf>) -> Self {
        self.template_folder = folder.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    pub fn template_dir(&self) -> PathBuf {
        self.root_path.join(&self.template_folder)
    }
}

/// The application that templates are rendered for.
pub struct App {
    root_path: PathBuf,
    template_folder: PathBuf,
    debug: bool,
    blueprints: Vec<Blueprint>,
    namespace: TemplateNamespace,
    context_processors: Vec<ContextProcessor>,
    template_generated: Signal<TemplateGenerated>,
    extensions: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl App {
    /// Creates an application rooted at `root_path` with the builtin
    /// template namespace.
    pub fn new(root_path: impl Into<PathBuf>) -> Self {
        Self {
            root_path: root_path.into(),
            template_folder: PathBuf::from(DEFAULT_TEMPLATE_FOLDER),
            debug: false,
            blueprints: Vec::new(),
            namespace: TemplateNamespace::with_builtins(),
            context_processors: Vec::new(),
            template_generated: Signal::new(),
            extensions: HashMap::new(),
        }
    }

    /// Sets the template folder, relative to the application root.
    pub fn template_folder(mut self, folder: impl Into<PathBuf>) -> Self {
        self.template_folder = folder.into();
        self
    }

    /// Debug mode turns on template auto-reload unless configured otherwise.
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Registers a blueprint.
    ///
    /// A blueprint with the same name as an existing one replaces it.
    pub fn blueprint(mut self, blueprint: Blueprint) -> Self {
        self.register_blueprint(blueprint);
        self
    }

    pub fn register_blueprint(&mut self, blueprint: Blueprint) {
        match self.blueprints.iter_mut().find(|b| b.name == blueprint.name) {
            Some(existing) => *existing = blueprint,
            None => self.blueprints.push(blueprint),
        }
    }

    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    pub fn template_dir(&self) -> PathBuf {
        self.root_path.join(&self.template_folder)
    }

    pub fn is_debug(&self) -> bool {
        self.debug
    }

    pub fn blueprints(&self) -> &[Blueprint] {
        &self.blueprints
    }

    pub fn namespace(&self) -> &TemplateNamespace {
        &self.namespace
    }

    pub fn namespace_mut(&mut self) -> &mut TemplateNamespace {
        &mut self.namespace
    }

    /// Adds a context processor. Processors run on every render, in
    /// registration order.
    pub fn context_processor<F>(&mut self, processor: F) -> &mut Self
    where
        F: Fn() -> TemplateContext + Send + Sync + 'static,
    {
        self.add_context_processor(Arc::new(processor))
    }

    pub fn add_context_processor(&mut self, processor: ContextProcessor) -> &mut Self {
        self.context_processors.push(processor);
        self
    }

    /// Signal sent after a template has been generated and before the
    /// method filters run.
    pub fn template_generated(&self) -> &Signal<TemplateGenerated> {
        &self.template_generated
    }

    /// Stores an extension, replacing one of the same type.
    pub fn insert_extension<T: Any + Send + Sync>(&mut self, extension: Arc<T>) {
        self.extensions.insert(TypeId::of::<T>(), extension);
    }

    pub fn extension<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.extensions
            .get(&TypeId::of::<T>())
            .cloned()
            .and_then(|ext| ext.downcast::<T>().ok())
    }

    /// The registered [`Quire`] extension.
    pub fn quire(&self) -> Result<Arc<Quire>, QuireError> {
        self.extension::<Quire>().ok_or(QuireError::NotInitialized)
    }

    /// Builds the context for a render.
    ///
    /// Caller values win. Globals, the `filters` and `tests` maps and then
    /// context-processor output only fill keys that are still missing;
    /// among processors a later one overrides an earlier one.
    pub fn template_context(&self, caller: TemplateContext) -> TemplateContext {
        let mut context = caller;
        for (key, value) in &self.namespace.globals {
            context.set_default(key.clone(), value.clone());
        }
        context.set_default("filters", self.namespace.filters_value());
        context.set_default("tests", self.namespace.tests_value());

        let mut processed = TemplateContext::new();
        for processor in &self.context_processors {
            processed.extend(processor());
        }
        context.merge_absent(processed);
        context
    }

    pub fn make_response(&self, data: impl Into<String>, mimetype: impl Into<String>) -> Response {
        Response::new(data, mimetype)
    }
}

impl fmt::Debug for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field("root_path", &self.root_path)
            .field("template_folder", &self.template_folder)
            .field("debug", &self.debug)
            .field("blueprints", &self.blueprints)
            .field("context_processors", &self.context_processors.len())
            .field("extensions", &self.extensions.len())
            .finish()
    }
}
