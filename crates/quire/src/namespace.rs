//! The application's global template namespace.
//!
//! Every render context receives the namespace globals as top-level
//! variables, plus two maps: `filters` and `tests`. Those hold callables so
//! templates can apply the application's helpers explicitly:
//!
//! ```jinja
//! {% set truncate = filters.truncate %}
//! <p class="{{ 'odd' if tests.odd(3) else 'even' }}">{{ truncate(title, 8) }}</p>
//! ```

use std::collections::HashMap;

use minijinja::{Error, ErrorKind, Value};

/// Globals, filters and tests shared by every template of an application.
#[derive(Debug, Clone, Default)]
pub struct TemplateNamespace {
    pub globals: HashMap<String, Value>,
    pub filters: HashMap<String, Value>,
    pub tests: HashMap<String, Value>,
}

impl TemplateNamespace {
    /// Creates an empty namespace.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a namespace holding the builtin filters and tests.
    ///
    /// Filters: `upper`, `lower`, `title`, `trim`, `length`, `truncate`.
    /// Tests: `odd`, `even`, `divisibleby`, `defined`, `none`.
    pub fn with_builtins() -> Self {
        let mut ns = Self::new();
        register_builtins(&mut ns);
        ns
    }

    pub fn add_global(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.globals.insert(name.into(), value.into());
        self
    }

    /// Adds a filter; `filter` should be callable, e.g. from
    /// [`Value::from_function`].
    pub fn add_filter(&mut self, name: impl Into<String>, filter: Value) -> &mut Self {
        self.filters.insert(name.into(), filter);
        self
    }

    pub fn add_test(&mut self, name: impl Into<String>, test: Value) -> &mut Self {
        self.tests.insert(name.into(), test);
        self
    }

    /// The `filters` map as a template value.
    pub fn filters_value(&self) -> Value {
        Value::from(self.filters.clone())
    }

    /// The `tests` map as a template value.
    pub fn tests_value(&self) -> Value {
        Value::from(self.tests.clone())
    }
}

fn register_builtins(ns: &mut TemplateNamespace) {
    ns.add_filter("upper", Value::from_function(|s: String| s.to_uppercase()));
    ns.add_filter("lower", Value::from_function(|s: String| s.to_lowercase()));
    ns.add_filter("title", Value::from_function(|s: String| title_case(&s)));
    ns.add_filter("trim", Value::from_function(|s: String| s.trim().to_string()));
    ns.add_filter(
        "length",
        Value::from_function(|v: Value| -> Result<usize, Error> {
            v.len().ok_or_else(|| {
                Error::new(ErrorKind::InvalidOperation, "value has no length")
            })
        }),
    );
    ns.add_filter(
        "truncate",
        Value::from_function(
            |s: String,
             length: Option<usize>,
             killwords: Option<bool>,
             end: Option<String>,
             leeway: Option<usize>| {
                truncate(
                    &s,
                    length.unwrap_or(255),
                    killwords.unwrap_or(false),
                    end.as_deref().unwrap_or("..."),
                    leeway.unwrap_or(TRUNCATE_LEEWAY),
                )
            },
        ),
    );

    ns.add_test("odd", Value::from_function(|n: i64| n % 2 != 0));
    ns.add_test("even", Value::from_function(|n: i64| n % 2 == 0));
    ns.add_test(
        "divisibleby",
        Value::from_function(|n: i64, by: i64| by != 0 && n % by == 0),
    );
    ns.add_test("defined", Value::from_function(|v: Value| !v.is_undefined()));
    ns.add_test("none", Value::from_function(|v: Value| v.is_none()));
}

fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        if c.is_alphanumeric() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}

/// Characters a string may exceed `length` by and still be left alone.
pub const TRUNCATE_LEEWAY: usize = 5;

/// Shortens `s` to at most `length` characters, `end` included.
///
/// Strings no longer than `length + leeway` are returned unchanged. The
/// cut lands on the last word boundary unless `killwords` is set. The
/// template filter takes the same arguments in the same order, with
/// defaults of 255, `false`, `"..."` and [`TRUNCATE_LEEWAY`].
pub fn truncate(s: &str, length: usize, killwords: bool, end: &str, leeway: usize) -> String {
    if s.chars().count() <= length + leeway {
        return s.to_string();
    }
    let keep = length.saturating_sub(end.chars().count());
    let head: String = s.chars().take(keep).collect();
    if killwords {
        return format!("{}{}", head, end);
    }
    let head = match head.rsplit_once(' ') {
        Some((before, _)) => before.to_string(),
        None => head,
    };
    format!("{}{}", head, end)
}
