use pretty_assertions::assert_eq;

use super::dom::{Document, Element, Namespace, Node};
use super::parse::parse_html;
use super::*;
use crate::config::{SanitizerConfig, TAILWIND_CDN};
use crate::llm::fallback::fallback_document;
use crate::types::CompiledPrompt;

const FRAMEWORK_TAG: &str = r#"<script src="https://cdn.tailwindcss.com"></script>"#;

fn clean(html: &str) -> (String, SanitizeReport) {
    let (artifact, report) = Sanitizer::default()
        .try_sanitize(html)
        .expect("document within depth limit");
    (artifact.into_string(), report)
}

fn head_of(html: &str) -> Element {
    let doc = parse_html(html, 512).unwrap();
    doc.find_first(|e| e.is("head")).cloned().unwrap()
}

fn squash(html: &str) -> String {
    html.chars().filter(|c| !c.is_whitespace()).collect()
}

fn framework_count(html: &str) -> usize {
    html.matches(FRAMEWORK_TAG).count()
}

#[test]
fn inline_script_removed_and_skeleton_completed() {
    let (html, report) = clean("<html><head><script>alert(1)</script></head><body><p>Hi</p></body></html>");

    assert!(!html.contains("alert(1)"));
    assert!(html.starts_with("<!DOCTYPE html>\n"));
    assert_eq!(framework_count(&html), 1);
    assert!(html.contains(r#"<meta charset="UTF-8">"#));
    assert!(html.contains(
        r#"<meta name="viewport" content="width=device-width, initial-scale=1.0">"#
    ));
    assert!(html.contains("<body><p>Hi</p></body>"));
    assert_eq!(report.scripts_removed, 1);
    assert_eq!(report.framework, FrameworkAction::Injected);
    assert!(report.charset_injected);
    assert!(report.viewport_injected);
}

#[test]
fn fragment_with_inline_script() {
    let (html, _) = clean("<p>Hello</p><script>alert(1)</script>");
    assert!(!html.contains("alert(1)"));
    assert_eq!(html.matches(TAILWIND_CDN).count(), 1);
    assert!(html.contains("<p>Hello</p>"));
}

#[test]
fn off_list_script_removed() {
    let (html, report) = clean(
        r#"<html><head><script src="https://tracker.example.com/t.js"></script></head><body></body></html>"#,
    );
    assert!(!html.contains("tracker.example.com"));
    assert_eq!(report.scripts_removed, 1);
}

#[test]
fn allow_list_matches_by_substring() {
    let (html, _) = clean(
        r#"<body><script src="https://mirror.example.org/cdn.jsdelivr.net/lib.js"></script></body>"#,
    );
    assert!(html.contains("mirror.example.org/cdn.jsdelivr.net/lib.js"));
}

#[test]
fn trusted_script_loses_inline_body() {
    let (html, report) = clean(
        r#"<body><script src="https://cdn.jsdelivr.net/npm/alpinejs.js">alert(2)</script></body>"#,
    );
    assert!(html.contains(r#"<script src="https://cdn.jsdelivr.net/npm/alpinejs.js"></script>"#));
    assert!(!html.contains("alert(2)"));
    assert_eq!(report.scripts_removed, 0);
}

#[test]
fn framework_injected_when_absent() {
    let (html, report) = clean("<p>No head at all</p>");
    assert_eq!(framework_count(&html), 1);
    assert_eq!(report.framework, FrameworkAction::Injected);
    assert!(head_of(&html).child_position(|e| e.is("script")).is_some());
}

#[test]
fn framework_kept_when_present_once_in_head() {
    let input = format!("<html><head>{}</head><body></body></html>", FRAMEWORK_TAG);
    let (html, report) = clean(&input);
    assert_eq!(framework_count(&html), 1);
    assert_eq!(report.framework, FrameworkAction::Kept);
    assert_eq!(report.framework_duplicates_removed, 0);
}

#[test]
fn duplicated_framework_collapsed_to_one() {
    let input = format!(
        "<html><head>{0}</head><body>{0}<p>x</p>{0}</body></html>",
        FRAMEWORK_TAG
    );
    let (html, report) = clean(&input);
    assert_eq!(framework_count(&html), 1);
    assert_eq!(report.framework, FrameworkAction::Kept);
    assert_eq!(report.framework_duplicates_removed, 2);
}

#[test]
fn framework_in_body_relocated_to_head() {
    let input = format!(
        "<html><head><title>t</title></head><body><p>x</p>{0}{0}</body></html>",
        FRAMEWORK_TAG
    );
    let (html, report) = clean(&input);

    assert_eq!(framework_count(&html), 1);
    assert_eq!(report.framework, FrameworkAction::Relocated);
    assert_eq!(report.framework_duplicates_removed, 1);
    let head = head_of(&html);
    assert!(head.child_position(|e| e.is("script")).is_some());
    assert!(html.contains("<body><p>x</p></body>"));
}

#[test]
fn framework_with_trailing_slash_counts_as_present() {
    let (html, report) = clean(
        r#"<html><head><script src="https://cdn.tailwindcss.com/"></script></head><body></body></html>"#,
    );
    assert_eq!(report.framework, FrameworkAction::Kept);
    assert_eq!(html.matches("<script").count(), 1);
}

#[test]
fn framework_with_query_counts_as_present() {
    let (html, report) = clean(
        r#"<html><head><script src="https://cdn.tailwindcss.com?plugins=forms"></script></head><body></body></html>"#,
    );
    assert_eq!(report.framework, FrameworkAction::Kept);
    assert_eq!(html.matches("cdn.tailwindcss.com").count(), 1);
    assert!(html.contains("https://cdn.tailwindcss.com?plugins=forms"));

    let input = format!(
        r#"<html><head><script src="https://cdn.tailwindcss.com?plugins=forms,typography"></script></head><body>{}</body></html>"#,
        FRAMEWORK_TAG
    );
    let (html, report) = clean(&input);
    assert_eq!(html.matches("cdn.tailwindcss.com").count(), 1);
    assert!(html.contains("plugins=forms,typography"));
    assert_eq!(report.framework, FrameworkAction::Kept);
    assert_eq!(report.framework_duplicates_removed, 1);
}

#[test]
fn configured_framework_outside_allow_list_is_kept() {
    let config = SanitizerConfig {
        framework_url: "https://static.example.com/ui.js".to_string(),
        ..SanitizerConfig::default()
    };
    let sanitizer = Sanitizer::from_config(&config);
    let raw = fallback_document(&CompiledPrompt::new("Menu".to_string()), &config.framework_url);

    let (html, report) = sanitizer.try_sanitize(raw.as_str()).unwrap();
    let html = html.as_str();
    assert_eq!(report.scripts_removed, 0);
    assert_eq!(report.framework, FrameworkAction::Kept);
    assert_eq!(html.matches("https://static.example.com/ui.js").count(), 1);
    assert!(!html.contains(TAILWIND_CDN));
}

#[test]
fn charset_first_and_viewport_second_in_head() {
    let (html, _) = clean(
        r#"<html><head>
            <title>Party</title>
            <meta name="viewport" content="width=500">
            <meta charset="latin1">
        </head><body></body></html>"#,
    );
    let head = head_of(&html);

    let first = head.children[0].as_element().unwrap();
    let second = head.children[1].as_element().unwrap();
    assert!(first.is("meta"));
    assert_eq!(first.attr("charset"), Some("latin1"));
    assert!(second.is("meta"));
    assert_eq!(second.attr("content"), Some("width=500"));
    assert_eq!(html.matches("<meta charset").count(), 1);
    assert_eq!(html.matches(r#"name="viewport""#).count(), 1);
}

#[test]
fn style_blocks_and_handlers_removed() {
    let (html, report) = clean(
        r#"<html><head><style>body { color: red }</style></head>
        <body><div onclick="steal()" onMouseOver="x()" class="p-4">Hello</div></body></html>"#,
    );
    assert!(!html.contains("<style"));
    assert!(!html.contains("steal()"));
    assert!(!html.to_lowercase().contains("onmouseover"));
    assert!(html.contains(r#"<div class="p-4">Hello</div>"#));
    assert_eq!(report.styles_removed, 1);
    assert_eq!(report.handlers_removed, 2);
}

#[test]
fn script_scheme_urls_removed() {
    let (html, report) = clean(
        r#"<body><a href=" JavaScript:alert(1)">bad</a><a href="https://example.com">good</a><form action="vbscript:x"></form></body>"#,
    );
    assert!(!html.to_lowercase().contains("javascript:"));
    assert!(!html.contains("vbscript:"));
    assert!(html.contains(r#"<a href="https://example.com">good</a>"#));
    assert!(html.contains("<a>bad</a>"));
    assert_eq!(report.script_urls_removed, 2);
}

#[test]
fn refresh_and_animation_script_urls_removed() {
    let (html, report) = clean(
        r#"<html><head><meta http-equiv="refresh" content="0; url=javascript:alert(1)"></head>
        <body><svg><animate attributeName="href" values="https://ok.example;javascript:alert(2)"/></svg></body></html>"#,
    );
    assert!(!html.to_lowercase().contains("javascript:"));
    assert!(!html.contains("http-equiv"));
    assert!(html.contains("<animate"));
    assert_eq!(report.script_urls_removed, 2);
}

#[test]
fn srcdoc_and_untrusted_embeds_removed() {
    let (html, report) = clean(
        r#"<body><iframe srcdoc="<script>alert(document.cookie)</script>" title="t"></iframe><object data="https://evil.example/x.swf"></object><embed src="https://evil.example/y.swf"><embed src="https://cdn.jsdelivr.net/npm/chart.svg"><p>after</p></body>"#,
    );
    assert!(!html.contains("srcdoc"));
    assert!(!html.contains("document.cookie"));
    assert!(!html.contains("evil.example"));
    assert!(html.contains(r#"<iframe title="t"></iframe>"#));
    assert!(html.contains(r#"<embed src="https://cdn.jsdelivr.net/npm/chart.svg">"#));
    assert!(html.contains("<p>after</p>"));
    assert_eq!(report.embeds_removed, 3);
    assert_eq!(report.scripts_removed, 0);
}

#[test]
fn foreign_raw_text_names_stay_escaped() {
    let inputs = [
        "<svg><noembed>&lt;img src=x onerror=alert(1)&gt;</noembed></svg>",
        "<math><xmp>&lt;img src=x onerror=alert(1)&gt;</xmp></math>",
        "<svg><noframes>&lt;/noframes&gt;&lt;img src=x onerror=alert(1)&gt;</noframes></svg>",
    ];
    for input in inputs {
        let (html, _) = clean(input);
        assert!(html.contains("&lt;img src=x onerror=alert(1)&gt;"), "output: {}", html);

        let reparsed = parse_html(&html, 512).unwrap();
        assert_eq!(reparsed.count(|e| e.is("img")), 0, "output: {}", html);
        assert_eq!(
            reparsed.count(|e| e
                .attrs
                .iter()
                .any(|a| a.name.to_ascii_lowercase().starts_with("on"))),
            0,
            "output: {}",
            html
        );
    }
}

#[test]
fn parsed_elements_record_their_namespace() {
    let doc = parse_html("<p>x</p><svg><noembed>y</noembed></svg><math><xmp>z</xmp></math>", 512).unwrap();
    assert_eq!(doc.find_first(|e| e.is("p")).unwrap().namespace, Namespace::Html);
    assert_eq!(doc.find_first(|e| e.is("noembed")).unwrap().namespace, Namespace::Svg);
    assert_eq!(doc.find_first(|e| e.is("xmp")).unwrap().namespace, Namespace::MathMl);
}

#[test]
fn text_content_is_not_rewritten() {
    let (html, _) = clean("<body><p>5 &lt; 6 &amp; fish are \"fine\"</p></body>");
    assert!(html.contains("<p>5 &lt; 6 &amp; fish are \"fine\"</p>"));
}

#[test]
fn doctype_normalized_to_single_canonical_form() {
    let (html, _) = clean("<!doctype HTML><html><head></head><body>x</body></html>");
    assert!(html.starts_with("<!DOCTYPE html>\n"));
    assert_eq!(html.to_lowercase().matches("<!doctype").count(), 1);

    let (bare, _) = clean("<p>x</p>");
    assert!(bare.starts_with("<!DOCTYPE html>\n"));
    assert_eq!(bare.to_lowercase().matches("<!doctype").count(), 1);
}

#[test]
fn comment_before_doctype_yields_one_doctype() {
    let (html, _) =
        clean("<!-- generated --><!DOCTYPE html><html><head></head><body>x</body></html>");
    assert!(html.starts_with("<!DOCTYPE html>\n<!-- generated -->"));
    assert_eq!(html.to_lowercase().matches("<!doctype").count(), 1);

    let (again, _) = clean(&html);
    assert_eq!(again.to_lowercase().matches("<!doctype").count(), 1);
}

#[test]
fn sanitizing_twice_changes_nothing_but_whitespace() {
    let inputs = [
        "<script>alert(1)</script><p>Hi</p>",
        "<!DOCTYPE html><html><head><title>A</title></head>\n<body>\n<main class=\"p-4\">x</main>\n</body></html>",
        "<div onclick=\"x()\"><style>p{}</style><noscript>Enable JS & stuff</noscript></div>",
        r#"<html><head></head><body><script src="https://cdn.tailwindcss.com"></script><script src="https://cdn.tailwindcss.com"></script></body></html>"#,
    ];
    for input in inputs {
        let (once, _) = clean(input);
        let (twice, _) = clean(&once);
        assert_eq!(squash(&twice), squash(&once), "input: {}", input);
    }
}

#[test]
fn fallback_document_is_stable_under_sanitization() {
    let raw = fallback_document(
        &CompiledPrompt::new("Menu for <Joe's> café".to_string()),
        TAILWIND_CDN,
    );
    let sanitizer = Sanitizer::default();

    let once = sanitizer.sanitize(&raw);
    assert!(!once.is_degraded());
    let html = once.artifact().as_str();
    assert_eq!(html.matches(TAILWIND_CDN).count(), 1);
    assert!(html.contains("Menu for &lt;Joe's&gt; café"));

    let (twice, report) = sanitizer.try_sanitize(html).unwrap();
    assert_eq!(squash(twice.as_str()), squash(html));
    assert_eq!(report, SanitizeReport::default());
}

#[test]
fn excessive_nesting_degrades_with_escaped_markup() {
    let config = SanitizerConfig {
        max_depth: 16,
        ..SanitizerConfig::default()
    };
    let sanitizer = Sanitizer::from_config(&config);
    let raw = RawArtifact::new(format!("{}deep{}", "<div>".repeat(40), "</div>".repeat(40)));

    let outcome = sanitizer.sanitize(&raw);
    assert!(outcome.is_degraded());
    match &outcome {
        Sanitization::Degraded { error, .. } => {
            assert_eq!(*error, SanitizeError::TooDeep { max_depth: 16 })
        }
        other => panic!("expected degraded, got {:?}", other),
    }

    let html = outcome.artifact().as_str();
    assert!(html.starts_with("<!DOCTYPE html>\n"));
    assert!(html.contains(DEGRADED_MARKER));
    assert!(html.contains("&lt;div&gt;&lt;div&gt;"));
    assert!(!html.contains("<div>"));
    assert_eq!(framework_count(html), 1);
}

#[test]
fn missing_root_is_synthesised_on_hand_built_tree() {
    let mut doc = Document::new(vec![
        Node::Doctype("html".to_string()),
        Node::Element(Element::new("p").with_child(Node::Text("hi".to_string()))),
    ]);
    let report = Sanitizer::default().apply_rules(&mut doc);

    assert!(report.root_created);
    assert!(report.head_created);
    assert!(report.body_created);
    assert_eq!(doc.children[0], Node::Doctype("html".to_string()));

    let root = doc.root().unwrap();
    assert!(root.children[0].as_element().unwrap().is("head"));
    let body = root.children[1].as_element().unwrap();
    assert!(body.is("body"));
    assert_eq!(
        body.children,
        vec![Node::Element(Element::new("p").with_child(Node::Text("hi".to_string())))]
    );
}

#[test]
fn extra_heads_and_bodies_are_merged() {
    let root = Element::new("html")
        .with_child(Node::Element(
            Element::new("head").with_child(Node::Element(Element::new("title"))),
        ))
        .with_child(Node::Element(
            Element::new("body").with_child(Node::Text("one".to_string())),
        ))
        .with_child(Node::Element(
            Element::new("head").with_child(Node::Element(Element::new("link"))),
        ))
        .with_child(Node::Element(
            Element::new("body").with_child(Node::Text("two".to_string())),
        ));
    let mut doc = Document::new(vec![Node::Element(root)]);

    let report = Sanitizer::default().apply_rules(&mut doc);
    assert!(!report.head_created);
    assert!(!report.body_created);

    assert_eq!(doc.count(|e| e.is("head")), 1);
    assert_eq!(doc.count(|e| e.is("body")), 1);
    let head = doc.find_first(|e| e.is("head")).unwrap();
    assert!(head.child_position(|e| e.is("title")).is_some());
    assert!(head.child_position(|e| e.is("link")).is_some());
    let body = doc.find_first(|e| e.is("body")).unwrap();
    assert_eq!(
        body.children,
        vec![Node::Text("one".to_string()), Node::Text("two".to_string())]
    );
}

#[test]
fn take_where_detaches_in_document_order() {
    let mut nodes = vec![
        Node::Element(
            Element::new("div")
                .with_child(Node::Element(Element::new("span").with_attr("id", "a")))
                .with_child(Node::Element(Element::new("span").with_attr("id", "b"))),
        ),
        Node::Element(Element::new("span").with_attr("id", "c")),
    ];
    let taken = dom::take_where(&mut nodes, &|e: &Element| e.is("span"));

    let ids: Vec<_> = taken.iter().filter_map(|e| e.attr("id")).collect();
    assert_eq!(ids, vec!["a", "b", "c"]);
    assert_eq!(nodes.len(), 1);
    assert!(nodes[0].as_element().unwrap().children.is_empty());
}

#[test]
fn head_created_ahead_of_existing_body() {
    let mut doc = Document::new(vec![Node::Element(Element::new("html").with_child(
        Node::Element(Element::new("body").with_child(Node::Text("x".to_string()))),
    ))]);
    let report = Sanitizer::default().apply_rules(&mut doc);

    assert!(report.head_created);
    assert!(!report.body_created);
    let root = doc.root().unwrap();
    assert_eq!(root.children.len(), 2);
    assert!(root.children[0].as_element().unwrap().is("head"));
    assert!(root.children[1].as_element().unwrap().is("body"));
}

#[test]
fn ensure_child_reuses_existing() {
    let mut el = Element::new("head").with_child(Node::Element(Element::new("title")));
    assert_eq!(el.ensure_child("title", 5, || Element::new("title")), 0);
    assert_eq!(el.ensure_child("base", 0, || Element::new("base")), 0);
    assert_eq!(el.children.len(), 2);
    assert!(el.children[0].as_element().unwrap().is("base"));
}

#[test]
fn escape_text_only_touches_markup_characters() {
    assert_eq!(escape_text("a < b & c > d \"q\""), "a &lt; b &amp; c &gt; d \"q\"");
}
