//! Template loading that mirrors the application's folder layout.
//!
//! The search path holds the application's template folder, then one
//! prefixed entry per blueprint whose template folder exists. A name like
//! `admin/index.html` is looked up as `index.html` inside the `admin`
//! blueprint's folder, but only after the application folder had no
//! `admin/index.html` of its own. Application templates therefore override
//! blueprint templates.
//!
//! Loaded templates are cached per template kind and name. With
//! auto-reload enabled, a changed modification time evicts the cached
//! template and it is parsed again; the parsed callback only ever sees
//! such fresh parses. Without auto-reload a cached template is served
//! without touching the file system.
//!
//! Names in `include` and `extends` are first tried relative to the
//! directory of the template that uses them, so a blueprint template can
//! include its siblings by their bare name.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::SystemTime;

use minijinja::{AutoEscape, Environment, ErrorKind};
use quire_markup::{SourcePiece, Translator};

use crate::app::App;
use crate::context::TemplateContext;
use crate::error::QuireError;
use crate::filter::StreamFilter;
use crate::method::TemplateKind;

/// Callback invoked once for every freshly parsed template.
pub type ParsedCallback = Arc<dyn Fn(&mut LoadedTemplate) + Send + Sync>;

/// Name used for inline string templates in error messages.
pub const STRING_TEMPLATE_NAME: &str = "<string>";

/// One directory of the search path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchEntry {
    /// Name prefix this directory answers to; `None` for the application.
    pub prefix: Option<String>,
    pub dir: PathBuf,
}

/// Ordered template directories.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPath {
    entries: Vec<SearchEntry>,
}

impl SearchPath {
    pub fn new() -> Self {
        Self::default()
    }

    /// The search path of `app`: its template folder, then every blueprint
    /// template folder that exists on disk.
    pub fn for_app(app: &App) -> Self {
        let mut path = Self::new();
        path.push(None, app.template_dir());
        for blueprint in app.blueprints() {
            let dir = blueprint.template_dir();
            if dir.is_dir() {
                path.push(Some(blueprint.name().to_string()), dir);
            } else {
                tracing::debug!(
                    blueprint = blueprint.name(),
                    dir = %dir.display(),
                    "blueprint has no template folder"
                );
            }
        }
        path
    }

    pub fn push(&mut self, prefix: Option<String>, dir: impl Into<PathBuf>) {
        self.entries.push(SearchEntry {
            prefix,
            dir: dir.into(),
        });
    }

    pub fn entries(&self) -> &[SearchEntry] {
        &self.entries
    }

    /// Every directory, in search order.
    pub fn directories(&self) -> Vec<PathBuf> {
        self.entries.iter().map(|e| e.dir.clone()).collect()
    }

    /// Finds the file for a template name.
    ///
    /// Absolute names and names with `..` components never resolve.
    pub fn resolve(&self, name: &str) -> Option<PathBuf> {
        if !is_safe_name(name) {
            return None;
        }
        self.entries.iter().find_map(|entry| {
            let relative = match &entry.prefix {
                None => name,
                Some(prefix) => name.strip_prefix(prefix.as_str())?.strip_prefix('/')?,
            };
            let candidate = entry.dir.join(relative);
            candidate.is_file().then_some(candidate)
        })
    }
}

fn is_safe_name(name: &str) -> bool {
    !name.is_empty()
        && Path::new(name)
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

/// A template found on the search path and compiled.
#[derive(Debug, Clone)]
pub struct LoadedTemplate {
    name: String,
    path: PathBuf,
    kind: TemplateKind,
    mtime: Option<SystemTime>,
    filters: Vec<StreamFilter>,
    translator: Option<Translator>,
    translated: Option<Arc<str>>,
}

impl LoadedTemplate {
    /// The name the template was requested by.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The file it was read from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> TemplateKind {
        self.kind
    }

    /// Template-level filters, applied before any method filter.
    pub fn filters(&self) -> &[StreamFilter] {
        &self.filters
    }

    /// Attaches a filter to this template only.
    pub fn add_filter(&mut self, filter: impl Into<StreamFilter>) {
        self.filters.push(filter.into());
    }

    /// Translates the template's own text before it is compiled.
    ///
    /// Only literal text is looked up; expressions, statements and the
    /// values they produce are left untouched.
    pub fn translate_with(&mut self, translator: Translator) {
        self.translator = Some(translator);
    }

    pub fn translator(&self) -> Option<&Translator> {
        self.translator.as_ref()
    }
}

/// Splits MiniJinja source into author text and template syntax.
///
/// `{% raw %}` blocks count as syntax up to their `endraw`.
fn source_pieces(source: &str) -> Vec<SourcePiece<'_>> {
    let mut pieces = Vec::new();
    let mut rest = source;
    while let Some(start) = block_start(rest) {
        if start > 0 {
            pieces.push(SourcePiece::Literal(&rest[..start]));
        }
        let closer = match rest.as_bytes()[start + 1] {
            b'{' => "}}",
            b'%' => "%}",
            _ => "#}",
        };
        let mut end = rest[start + 2..]
            .find(closer)
            .map_or(rest.len(), |offset| start + 4 + offset);
        if closer == "%}" && block_keyword(&rest[start..end]) == "raw" {
            end = rest[end..]
                .find("endraw")
                .and_then(|at| rest[end + at..].find("%}").map(|close| end + at + close + 2))
                .unwrap_or(rest.len());
        }
        pieces.push(SourcePiece::Code(&rest[start..end]));
        rest = &rest[end..];
    }
    if !rest.is_empty() {
        pieces.push(SourcePiece::Literal(rest));
    }
    pieces
}

fn block_start(source: &str) -> Option<usize> {
    source
        .match_indices('{')
        .map(|(at, _)| at)
        .find(|&at| matches!(source.as_bytes().get(at + 1), Some(b'{' | b'%' | b'#')))
}

fn block_keyword(block: &str) -> &str {
    block
        .trim_start_matches("{%")
        .trim_end_matches("%}")
        .trim_matches(|c: char| c == '-' || c == '+' || c.is_whitespace())
        .split_whitespace()
        .next()
        .unwrap_or_default()
}

struct Engines {
    markup: Environment<'static>,
    text: Environment<'static>,
}

impl Engines {
    fn new(search: &SearchPath) -> Self {
        let mut markup = Environment::new();
        markup.set_auto_escape_callback(|_| AutoEscape::Html);
        markup.set_loader(search_loader(search.clone()));
        let relative = search.clone();
        markup.set_path_join_callback(move |name, parent| join_relative(&relative, name, parent));

        let mut text = Environment::new();
        text.set_auto_escape_callback(|_| AutoEscape::None);
        text.set_keep_trailing_newline(true);
        text.set_loader(search_loader(search.clone()));
        let relative = search.clone();
        text.set_path_join_callback(move |name, parent| join_relative(&relative, name, parent));

        Self { markup, text }
    }

    fn get(&self, kind: TemplateKind) -> &Environment<'static> {
        match kind {
            TemplateKind::Markup => &self.markup,
            TemplateKind::Text => &self.text,
        }
    }

    fn get_mut(&mut self, kind: TemplateKind) -> &mut Environment<'static> {
        match kind {
            TemplateKind::Markup => &mut self.markup,
            TemplateKind::Text => &mut self.text,
        }
    }
}

fn search_loader(
    search: SearchPath,
) -> impl Fn(&str) -> Result<Option<String>, minijinja::Error> + Send + Sync + 'static {
    move |name| match search.resolve(name) {
        Some(path) => fs::read_to_string(&path).map(Some).map_err(|err| {
            minijinja::Error::new(
                ErrorKind::InvalidOperation,
                format!("could not read template {}", path.display()),
            )
            .with_source(err)
        }),
        None => Ok(None),
    }
}

/// Joins `name` to the directory of `parent` when that names an existing
/// template; otherwise `name` is used as given.
fn join_relative<'s>(search: &SearchPath, name: &'s str, parent: &'s str) -> Cow<'s, str> {
    if let Some((dir, _)) = parent.rsplit_once('/') {
        let joined = format!("{dir}/{name}");
        if search.resolve(&joined).is_some() {
            return Cow::Owned(joined);
        }
    }
    Cow::Borrowed(name)
}

/// Loads, caches and renders templates for one application.
pub struct TemplateLoader {
    search: SearchPath,
    auto_reload: bool,
    engines: RwLock<Engines>,
    cache: RwLock<HashMap<(TemplateKind, String), Arc<LoadedTemplate>>>,
}

impl TemplateLoader {
    pub fn new(search: SearchPath, auto_reload: bool) -> Self {
        let engines = Engines::new(&search);
        Self {
            search,
            auto_reload,
            engines: RwLock::new(engines),
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn search_path(&self) -> &SearchPath {
        &self.search
    }

    pub fn auto_reload(&self) -> bool {
        self.auto_reload
    }

    /// Loads a template, parsing it unless a current copy is cached.
    pub fn load(
        &self,
        name: &str,
        kind: TemplateKind,
        callback: Option<&ParsedCallback>,
    ) -> Result<Arc<LoadedTemplate>, QuireError> {
        let key = (kind, name.to_string());
        let cached = self
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned();
        if let (Some(cached), false) = (&cached, self.auto_reload) {
            return Ok(cached.clone());
        }

        let path = self
            .search
            .resolve(name)
            .ok_or_else(|| QuireError::TemplateNotFound {
                name: name.to_string(),
                searched: self.search.directories(),
            })?;
        let mtime = fs::metadata(&path)?.modified().ok();
        if let Some(cached) = cached {
            if cached.path == path && cached.mtime == mtime {
                return Ok(cached);
            }
            tracing::debug!(template = name, path = %path.display(), "template changed, reloading");
        }

        {
            let mut engines = self.engines.write().unwrap_or_else(PoisonError::into_inner);
            let env = engines.get_mut(kind);
            if self.auto_reload {
                // Includes and parents may have changed too.
                env.clear_templates();
                self.restore_translated(env, kind, name)?;
            } else {
                env.remove_template(name);
            }
            env.get_template(name)?;
        }

        let mut loaded = LoadedTemplate {
            name: name.to_string(),
            path,
            kind,
            mtime,
            filters: Vec::new(),
            translator: None,
            translated: None,
        };
        if let Some(callback) = callback {
            callback(&mut loaded);
        }
        if let Some(translator) = &loaded.translator {
            let source = fs::read_to_string(&loaded.path)?;
            let translated: Arc<str> = translator
                .translate_source(source_pieces(&source), kind == TemplateKind::Markup)
                .into();
            let mut engines = self.engines.write().unwrap_or_else(PoisonError::into_inner);
            engines
                .get_mut(kind)
                .add_template_owned(name.to_string(), translated.to_string())?;
            loaded.translated = Some(translated);
        }
        tracing::debug!(
            template = name,
            kind = ?kind,
            path = %loaded.path.display(),
            filters = loaded.filters.len(),
            translated = loaded.translated.is_some(),
            "parsed template"
        );

        let loaded = Arc::new(loaded);
        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, loaded.clone());
        Ok(loaded)
    }

    /// Puts the translated sources of other cached templates back after the
    /// environment was cleared.
    fn restore_translated(
        &self,
        env: &mut Environment<'static>,
        kind: TemplateKind,
        reloading: &str,
    ) -> Result<(), QuireError> {
        let cache = self.cache.read().unwrap_or_else(PoisonError::into_inner);
        for template in cache.values() {
            if template.kind != kind || template.name == reloading {
                continue;
            }
            if let Some(source) = &template.translated {
                env.add_template_owned(template.name.clone(), source.to_string())?;
            }
        }
        Ok(())
    }

    /// Renders a loaded template.
    pub fn render(&self, template: &LoadedTemplate, context: &TemplateContext) -> Result<String, QuireError> {
        let engines = self.engines.read().unwrap_or_else(PoisonError::into_inner);
        let compiled = engines.get(template.kind).get_template(&template.name)?;
        Ok(compiled.render(context.as_map())?)
    }

    /// Compiles and renders an inline template string.
    ///
    /// Includes inside the string resolve through the search path.
    pub fn render_str(
        &self,
        kind: TemplateKind,
        source: &str,
        context: &TemplateContext,
    ) -> Result<String, QuireError> {
        let engines = self.engines.read().unwrap_or_else(PoisonError::into_inner);
        Ok(engines
            .get(kind)
            .render_named_str(STRING_TEMPLATE_NAME, source, context.as_map())?)
    }

    /// Number of cached templates.
    pub fn cached(&self) -> usize {
        self.cache.read().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl std::fmt::Debug for TemplateLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateLoader")
            .field("search", &self.search)
            .field("auto_reload", &self.auto_reload)
            .field("cached", &self.cached())
            .finish()
    }
}
