mod common;

use common::{quire_app, rudolf, HTML_DOCTYPE};
use quire::quire_markup::{Event, Transformer, Translator};
use quire::{render_template, QuireError, RenderRequest, StreamFilter, TemplateContext};

#[test]
fn applies_method_filters() {
    let (app, quire) = quire_app();
    quire.filter(["html"], Transformer::select("head/title").prepend("Quire - "));

    let rendered = render_template(&app, RenderRequest::template("filter.html")).unwrap();
    assert_eq!(
        rendered,
        format!("{HTML_DOCTYPE}<html><head><title>Quire - Hi!</title></head></html>")
    );
}

#[test]
fn method_filters_only_apply_to_their_method() {
    let (app, quire) = quire_app();
    quire.filter(["xml"], Transformer::select("title").remove());

    let rendered = render_template(&app, RenderRequest::template("filter.html")).unwrap();
    assert!(rendered.contains("<title>Hi!</title>"));
}

#[test]
fn filters_per_render() {
    let (app, _) = quire_app();
    let request = RenderRequest::template("filter.html")
        .filter(Transformer::select("head/title").append(" - Quire"));

    let rendered = render_template(&app, request).unwrap();
    assert_eq!(
        rendered,
        format!("{HTML_DOCTYPE}<html><head><title>Hi! - Quire</title></head></html>")
    );
}

fn tag_text(tag: &'static str) -> StreamFilter {
    StreamFilter::map(move |stream| {
        stream
            .into_iter()
            .map(|event| match event {
                Event::Text(text) => Event::Text(format!("{text}+{tag}")),
                other => other,
            })
            .collect()
    })
}

#[test]
fn method_filters_run_before_per_render_filter() {
    let (app, quire) = quire_app();
    quire.filter(["html"], tag_text("a")).filter(["html"], tag_text("b"));
    let request = RenderRequest::template("filter.html").filter(tag_text("c"));

    let rendered = render_template(&app, request).unwrap();
    assert!(rendered.contains("<title>Hi!+a+b+c</title>"), "{rendered}");
}

#[test]
fn filters_can_take_the_context() {
    let (app, quire) = quire_app();
    quire.filter(
        ["html"],
        StreamFilter::with_context(|stream, context| {
            let username = context
                .get("username")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string();
            Ok(Transformer::select("input")
                .attr("value", username)
                .apply(stream))
        }),
    );

    let context = TemplateContext::new().with("username", "dag");
    let rendered =
        render_template(&app, RenderRequest::template("form.html").context(context)).unwrap();
    assert_eq!(
        rendered,
        format!("{HTML_DOCTYPE}<input type=\"text\" name=\"username\" value=\"dag\">")
    );
}

#[test]
fn filter_errors_propagate() {
    let (app, quire) = quire_app();
    quire.filter(["text"], StreamFilter::plain(|_| Err("broken filter".into())));

    let err = render_template(&app, RenderRequest::template("test.txt").context(rudolf()))
        .unwrap_err();
    match err {
        QuireError::Filter { method, source } => {
            assert_eq!(method, "text");
            assert_eq!(source.to_string(), "broken filter");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn does_translations() {
    let (app, quire) = quire_app();
    quire.template_parsed(|template| {
        template.translate_with(Translator::new(|s| s.to_uppercase()));
    });

    let rendered = render_template(&app, RenderRequest::template("i18n.html")).unwrap();
    assert_eq!(rendered, format!("{HTML_DOCTYPE}<p>HELLO!</p>"));

    // Cached: the callback does not run again, but the translation stays.
    let again = render_template(&app, RenderRequest::template("i18n.html")).unwrap();
    assert_eq!(again, rendered);
}

#[test]
fn translations_leave_context_values_alone() {
    let (app, quire) = quire_app();
    quire.template_parsed(|template| {
        template.translate_with(Translator::new(|s| s.to_uppercase()));
    });

    let rendered =
        render_template(&app, RenderRequest::template("test.html").context(rudolf())).unwrap();
    assert_eq!(rendered, format!("{HTML_DOCTYPE}<body>HI Rudolf</body>"));
}

#[test]
fn translations_look_up_template_text() {
    let (app, quire) = quire_app();
    quire.template_parsed(|template| {
        template.translate_with(Translator::new(|msg| match msg {
            "Hi" => "Hallo".to_string(),
            other => other.to_string(),
        }));
    });

    let rendered =
        render_template(&app, RenderRequest::template("test.txt").context(rudolf())).unwrap();
    assert_eq!(rendered, "Hallo Rudolf\n");
}

#[test]
fn template_callbacks_do_not_apply_to_strings() {
    let (app, quire) = quire_app();
    quire.template_parsed(|template| {
        template.translate_with(Translator::new(|s| s.to_uppercase()));
        template.add_filter(Transformer::select("p").remove());
    });

    let rendered =
        render_template(&app, RenderRequest::string("<p>Hello!</p>").method("xml")).unwrap();
    assert_eq!(rendered, "<p>Hello!</p>");
}
