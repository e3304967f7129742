mod common;

use common::{quire_app, rudolf};
use quire::{render_response, render_template, QuireError, RenderRequest};

#[test]
fn renders_strings() {
    let (app, _) = quire_app();
    let response = render_response(
        &app,
        RenderRequest::string("The name is {{ name }}")
            .method("text")
            .context(rudolf()),
    )
    .unwrap();
    assert_eq!(response.data, "The name is Rudolf");
    assert_eq!(response.mimetype, "text/plain");
}

#[test]
fn renders_markup_strings() {
    let (app, _) = quire_app();
    let rendered = render_template(
        &app,
        RenderRequest::string("<greeting who=\"{{ name }}\"/>")
            .method("xml")
            .context(rudolf()),
    )
    .unwrap();
    assert_eq!(rendered, "<greeting who=\"Rudolf\"/>");
}

#[test]
fn markup_strings_resolve_html_entities() {
    let (app, _) = quire_app();
    let rendered = render_template(
        &app,
        RenderRequest::string("<p>&copy; 2024&nbsp;{{ name }}</p>")
            .method("xml")
            .context(rudolf()),
    )
    .unwrap();
    assert_eq!(rendered, "<p>\u{a9} 2024\u{a0}Rudolf</p>");
}

#[test]
fn strings_can_include_templates() {
    let (app, _) = quire_app();
    let rendered = render_template(
        &app,
        RenderRequest::string("[{% include 'test.txt' %}]")
            .method("text")
            .context(rudolf()),
    )
    .unwrap();
    assert_eq!(rendered, "[Hi Rudolf\n]");
}

#[test]
fn fails_without_template_or_string() {
    let (app, _) = quire_app();
    let err = render_response(&app, RenderRequest::new().method("text").context(rudolf()))
        .unwrap_err();
    assert!(matches!(err, QuireError::MissingTemplate));
    assert_eq!(err.to_string(), "need a template or string");
}

#[test]
fn strings_need_a_method() {
    let (app, _) = quire_app();
    let err = render_template(&app, RenderRequest::string("x")).unwrap_err();
    assert!(matches!(err, QuireError::MethodRequired));
}

#[test]
fn template_syntax_errors_propagate() {
    let (app, _) = quire_app();
    let err =
        render_template(&app, RenderRequest::string("{% for %}").method("text")).unwrap_err();
    assert!(matches!(err, QuireError::Template(_)));
}
