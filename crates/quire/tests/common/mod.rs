#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use quire::{App, Blueprint, Quire, TemplateContext};

pub const HTML_DOCTYPE: &str =
    "<!DOCTYPE html PUBLIC \"-//W3C//DTD HTML 4.01//EN\" \"http://www.w3.org/TR/html4/strict.dtd\">\n";

pub fn fixture_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/testapp")
}

/// The fixture application, without quire registered.
pub fn fixture_app() -> App {
    let root = fixture_root();
    App::new(&root)
        .blueprint(Blueprint::new("package_mod", root.join("package_mod")))
        .blueprint(Blueprint::new("admin", root.join("admin")).template_folder("views"))
        .blueprint(Blueprint::new("empty", root.join("empty")))
}

/// The fixture application with a default quire registered.
pub fn quire_app() -> (App, Arc<Quire>) {
    let mut app = fixture_app();
    let quire = Quire::new().init_app(&mut app);
    (app, quire)
}

pub fn rudolf() -> TemplateContext {
    TemplateContext::new().with("name", "Rudolf")
}
