mod common;

use common::{quire_app, rudolf, HTML_DOCTYPE};
use quire::quire_markup::Event;
use quire::{
    generate_template, render, render_response, render_template, QuireError, RenderRequest,
    TemplateContext,
};
use serde_json::json;

fn respond(template: &str) -> quire::Response {
    let (app, _) = quire_app();
    render_response(&app, RenderRequest::template(template).context(rudolf())).unwrap()
}

#[test]
fn renders_html() {
    let response = respond("test.html");
    assert_eq!(response.mimetype, "text/html");
    assert_eq!(response.data, format!("{HTML_DOCTYPE}<body>Hi Rudolf</body>"));
    assert_eq!(response.content_type(), "text/html; charset=utf-8");
}

#[test]
fn renders_text() {
    let response = respond("test.txt");
    assert_eq!(response.mimetype, "text/plain");
    assert_eq!(response.data, "Hi Rudolf\n");
}

#[test]
fn renders_xml() {
    let response = respond("test.xml");
    assert_eq!(response.mimetype, "application/xml");
    assert_eq!(response.data, "<name>Rudolf</name>");
}

#[test]
fn renders_js() {
    let response = respond("test.js");
    assert_eq!(response.mimetype, "application/javascript");
    assert_eq!(response.data, "alert(\"Rudolf\");\n");
}

#[test]
fn renders_css() {
    let response = respond("test.css");
    assert_eq!(response.mimetype, "text/css");
    assert_eq!(response.data, "h1:after { content: \" Rudolf\"; }\n");
}

#[test]
fn renders_svg() {
    let response = respond("test.svg");
    assert_eq!(response.mimetype, "image/svg+xml");
    assert_eq!(
        response.data,
        "<!DOCTYPE svg PUBLIC \"-//W3C//DTD SVG 1.1//EN\" \
         \"http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd\">\n\
         <svg viewBox=\"0 0 1000 300\">\n\
         <text x=\"250\" y=\"150\" font-size=\"55\">Hi Rudolf</text>\n\
         </svg>"
    );
}

#[test]
fn explicit_method_overrides_extension() {
    let (app, _) = quire_app();
    let response = render_response(
        &app,
        RenderRequest::template("test.html")
            .method("xhtml")
            .context(rudolf()),
    )
    .unwrap();
    assert_eq!(response.mimetype, "application/xhtml+xml");
    assert!(response
        .data
        .starts_with("<!DOCTYPE html PUBLIC \"-//W3C//DTD XHTML 1.0 Strict//EN\""));
    assert!(response.data.ends_with("<body>Hi Rudolf</body>"));
}

#[test]
fn markup_values_are_escaped() {
    let (app, _) = quire_app();
    let context = TemplateContext::new().with("name", "<script>&");
    let rendered =
        render_template(&app, RenderRequest::template("test.xml").context(context)).unwrap();
    assert_eq!(rendered, "<name>&lt;script&gt;&amp;</name>");
}

#[test]
fn text_values_are_not_escaped() {
    let (app, _) = quire_app();
    let context = TemplateContext::new().with("name", "<b>&");
    let rendered =
        render_template(&app, RenderRequest::template("test.txt").context(context)).unwrap();
    assert_eq!(rendered, "Hi <b>&\n");
}

#[test]
fn generate_returns_stream() {
    let (app, _) = quire_app();
    let stream =
        generate_template(&app, RenderRequest::template("test.xml").context(rudolf())).unwrap();
    assert_eq!(
        stream.events(),
        &[Event::start("name"), Event::text("Rudolf"), Event::end("name")]
    );

    let text = generate_template(&app, RenderRequest::template("test.txt").context(rudolf()))
        .unwrap();
    assert_eq!(text.events(), &[Event::text("Hi Rudolf\n")]);
}

#[test]
fn extends_and_includes() {
    let (app, _) = quire_app();
    let rendered =
        render_template(&app, RenderRequest::template("child.html").context(rudolf())).unwrap();
    assert_eq!(
        rendered,
        format!(
            "{HTML_DOCTYPE}<html><head><title>Child of Rudolf</title></head>\
             <body>Hello modular Rudolf</body></html>"
        )
    );
}

#[test]
fn render_shorthand() {
    let (app, _) = quire_app();
    let response = render(&app, "test.txt", json!({ "name": "Rudolf" })).unwrap();
    assert_eq!(response.data, "Hi Rudolf\n");
    assert_eq!(response.status, 200);
}

#[test]
fn unknown_extension_fails() {
    let (app, _) = quire_app();
    let err = render_template(&app, RenderRequest::template("test.jinja")).unwrap_err();
    assert!(matches!(
        err,
        QuireError::UnknownExtension { ref extension, .. } if extension == "jinja"
    ));
}

#[test]
fn missing_file_fails() {
    let (app, _) = quire_app();
    let err = render_template(&app, RenderRequest::template("missing.html")).unwrap_err();
    match err {
        QuireError::TemplateNotFound { name, searched } => {
            assert_eq!(name, "missing.html");
            // App folder plus the two blueprints with template folders.
            assert_eq!(searched.len(), 3);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}
