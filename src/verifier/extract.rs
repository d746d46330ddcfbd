use indexmap::IndexSet;
use url::Url;

use crate::sanitizer::dom::Element;
use crate::sanitizer::parse::parse_html;

/// Absolute `http`/`https` references of every `script[src]` and
/// `link[href]`, de-duplicated, in document order.
///
/// A document that cannot be parsed has no references.
pub fn external_references(html: &str, max_depth: usize) -> Vec<String> {
    let Ok(document) = parse_html(html, max_depth) else {
        return Vec::new();
    };

    let mut seen = IndexSet::new();
    for element in document.find_all(|e| e.is("script") || e.is("link")) {
        if let Some(reference) = reference_of(element).and_then(absolute_http) {
            seen.insert(reference);
        }
    }
    seen.into_iter().collect()
}

fn reference_of(element: &Element) -> Option<&str> {
    if element.is("script") {
        element.attr("src")
    } else {
        element.attr("href")
    }
}

fn absolute_http(reference: &str) -> Option<String> {
    let reference = reference.trim();
    let parsed = Url::parse(reference).ok()?;
    match parsed.scheme() {
        "http" | "https" if parsed.host_str().is_some() => Some(reference.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_scripts_and_links_in_order() {
        let html = r#"<html><head>
            <link rel="stylesheet" href="https://fonts.example.com/a.css">
            <script src="https://cdn.tailwindcss.com"></script>
        </head><body>
            <script src="https://cdn.tailwindcss.com"></script>
            <link rel="icon" href="http://static.example.com/icon.png">
        </body></html>"#;

        assert_eq!(
            external_references(html, 512),
            vec![
                "https://fonts.example.com/a.css",
                "https://cdn.tailwindcss.com",
                "http://static.example.com/icon.png",
            ]
        );
    }

    #[test]
    fn skips_relative_and_non_http_references() {
        let html = r#"<head>
            <link href="/local.css">
            <link href="//cdn.example.com/x.css">
            <link href="data:text/css,body{}">
            <script src="ftp://files.example.com/a.js"></script>
            <script>inline()</script>
        </head>"#;
        assert!(external_references(html, 512).is_empty());
    }

    #[test]
    fn ignores_anchors_and_images() {
        let html = r#"<body><a href="https://example.com">x</a><img src="https://example.com/i.png"></body>"#;
        assert!(external_references(html, 512).is_empty());
    }

    #[test]
    fn unparseable_document_has_no_references() {
        let html = format!(
            "{}<script src=\"https://example.com/a.js\"></script>{}",
            "<div>".repeat(20),
            "</div>".repeat(20)
        );
        assert!(external_references(&html, 4).is_empty());
    }
}
