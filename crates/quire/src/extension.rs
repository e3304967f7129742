//! The [`Quire`] extension object.
//!
//! `Quire` owns the method tables, the per-method filter registry, the
//! parsed-template callback and, once it is first needed, the template
//! loader of the application it was registered with.
//!
//! ```rust
//! use quire::{App, Quire};
//! use quire_markup::Transformer;
//!
//! let mut app = App::new("/srv/site");
//! let quire = Quire::new();
//! quire.filter(["html"], Transformer::select("head/title").prepend("Site - "));
//! let quire = quire.init_app(&mut app);
//!
//! assert_eq!(quire.filters_for("html").len(), 1);
//! assert!(app.quire().is_ok());
//! ```

use std::fmt;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use crate::app::App;
use crate::config::QuireConfig;
use crate::error::QuireError;
use crate::filter::{FilterRegistry, StreamFilter};
use crate::loader::{LoadedTemplate, ParsedCallback, SearchPath, TemplateLoader};
use crate::method::{MethodSpec, MethodTable};

/// Markup templating for an [`App`].
pub struct Quire {
    table: MethodTable,
    filters: RwLock<FilterRegistry>,
    callback: RwLock<Option<ParsedCallback>>,
    auto_reload: Option<bool>,
    loader: OnceLock<TemplateLoader>,
}

impl Default for Quire {
    fn default() -> Self {
        Self {
            table: MethodTable::new(),
            filters: RwLock::new(FilterRegistry::new()),
            callback: RwLock::new(None),
            auto_reload: None,
            loader: OnceLock::new(),
        }
    }
}

impl Quire {
    /// Creates the extension with the default method tables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the extension with `config` applied over the defaults.
    pub fn with_config(config: &QuireConfig) -> Result<Self, QuireError> {
        let mut quire = Self::new();
        config.apply(&mut quire.table)?;
        quire.auto_reload = config.auto_reload;
        Ok(quire)
    }

    pub fn table(&self) -> &MethodTable {
        &self.table
    }

    /// Mutable access to the method tables, before registration.
    pub fn table_mut(&mut self) -> &mut MethodTable {
        &mut self.table
    }

    /// Overrides the auto-reload setting derived from the app's debug flag.
    pub fn set_auto_reload(&mut self, auto_reload: bool) {
        self.auto_reload = Some(auto_reload);
    }

    /// Registers the extension on `app` and returns the shared handle.
    ///
    /// The tables are read-only from here on.
    pub fn init_app(self, app: &mut App) -> Arc<Self> {
        let quire = Arc::new(self);
        app.insert_extension(quire.clone());
        tracing::debug!(
            root = %app.root_path().display(),
            methods = quire.table.methods().len(),
            "quire registered"
        );
        quire
    }

    /// Appends `filter` to the filter list of every method in `methods`.
    ///
    /// Filters run in registration order.
    pub fn filter<I, S>(&self, methods: I, filter: impl Into<StreamFilter>) -> &Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filters
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .register(methods, filter.into());
        self
    }

    /// Filters registered for `method`, in registration order.
    pub fn filters_for(&self, method: &str) -> Vec<StreamFilter> {
        self.filters
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(method)
            .to_vec()
    }

    /// Sets the callback invoked for every freshly parsed template.
    ///
    /// This is where a translator ([`LoadedTemplate::translate_with`]) and
    /// other per-template filters are attached. Setting a new callback
    /// replaces the old one.
    pub fn template_parsed<F>(&self, callback: F) -> &Self
    where
        F: Fn(&mut LoadedTemplate) + Send + Sync + 'static,
    {
        *self.callback.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(callback));
        self
    }

    pub fn callback(&self) -> Option<ParsedCallback> {
        self.callback
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Selects the method name for a render. See [`MethodTable::method_for`].
    pub fn method_for(&self, template: Option<&str>, method: Option<&str>) -> Result<String, QuireError> {
        let method = self.table.method_for(template, method)?;
        tracing::debug!(template, method = %method, "selected rendering method");
        Ok(method)
    }

    pub fn method(&self, name: &str) -> Result<&MethodSpec, QuireError> {
        self.table.get(name)
    }

    /// The template loader for `app`, built on first use.
    ///
    /// The search path is captured from the app at that moment; blueprints
    /// registered later are not seen.
    pub fn template_loader(&self, app: &App) -> &TemplateLoader {
        self.loader.get_or_init(|| {
            let auto_reload = self.auto_reload.unwrap_or(app.is_debug());
            let search = SearchPath::for_app(app);
            tracing::debug!(
                directories = search.entries().len(),
                auto_reload,
                "building template loader"
            );
            TemplateLoader::new(search, auto_reload)
        })
    }
}

impl fmt::Debug for Quire {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Quire")
            .field("table", &self.table)
            .field("auto_reload", &self.auto_reload)
            .field("loader", &self.loader.get())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quire_markup::{SerializerKind, Transformer};

    #[test]
    fn with_config_applies_tables() {
        let config = QuireConfig::from_yaml(
            "auto_reload: false\nextensions:\n  atom: atom\nmethods:\n  atom:\n    serializer: xml\n",
        )
        .unwrap();
        let quire = Quire::with_config(&config).unwrap();
        assert_eq!(quire.method_for(Some("feed.atom"), None).unwrap(), "atom");
        assert_eq!(quire.method("atom").unwrap().serializer, SerializerKind::Xml);
    }

    #[test]
    fn filters_per_method() {
        let quire = Quire::new();
        quire
            .filter(["html", "xhtml"], Transformer::select("title").append("!"))
            .filter(["html"], StreamFilter::map(|s| s));
        assert_eq!(quire.filters_for("html").len(), 2);
        assert_eq!(quire.filters_for("xhtml").len(), 1);
        assert!(quire.filters_for("xml").is_empty());
    }

    #[test]
    fn init_app_registers() {
        let mut app = App::new("/nowhere");
        let quire = Quire::new().init_app(&mut app);
        assert!(Arc::ptr_eq(&quire, &app.quire().unwrap()));
    }

    #[test]
    fn loader_follows_debug_flag() {
        let app = App::new("/nowhere").debug(true);
        let quire = Quire::new();
        assert!(quire.template_loader(&app).auto_reload());

        let mut quire = Quire::new();
        quire.set_auto_reload(false);
        assert!(!quire.template_loader(&app).auto_reload());
    }

    #[test]
    fn callback_is_replaced() {
        let quire = Quire::new();
        assert!(quire.callback().is_none());
        quire.template_parsed(|_| {});
        assert!(quire.callback().is_some());
    }
}
