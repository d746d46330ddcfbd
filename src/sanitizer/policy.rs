use url::Url;

use crate::config::SanitizerConfig;

use super::dom::Element;

pub const CHARSET: &str = "UTF-8";
pub const VIEWPORT: &str = "width=device-width, initial-scale=1.0";

/// Which external scripts survive and which one is the styling framework.
#[derive(Debug, Clone)]
pub struct SanitizerPolicy {
    pub framework_url: String,
    /// Substrings; a script whose `src` contains any of them is kept.
    pub allowed_script_hosts: Vec<String>,
    pub max_depth: usize,
}

impl Default for SanitizerPolicy {
    fn default() -> Self {
        Self::from_config(&SanitizerConfig::default())
    }
}

impl SanitizerPolicy {
    pub fn from_config(config: &SanitizerConfig) -> Self {
        Self {
            framework_url: config.framework_url.clone(),
            allowed_script_hosts: config
                .allowed_script_hosts
                .iter()
                .map(|h| h.to_lowercase())
                .filter(|h| !h.is_empty())
                .collect(),
            max_depth: config.max_depth,
        }
    }

    /// The approved framework, or an external script whose source contains an
    /// allow-listed substring. Inline scripts are never trusted.
    pub fn is_trusted_script(&self, element: &Element) -> bool {
        self.is_framework(element) || self.is_trusted_source(element.attr("src"))
    }

    /// `<object data>` / `<embed src>` pulled from an allow-listed host.
    /// Sourceless ones are not trusted.
    pub fn is_trusted_embed(&self, element: &Element) -> bool {
        let source = if element.is("object") {
            element.attr("data")
        } else {
            element.attr("src")
        };
        self.is_trusted_source(source)
    }

    fn is_trusted_source(&self, source: Option<&str>) -> bool {
        match source.map(str::trim) {
            Some(src) if !src.is_empty() => {
                let src = src.to_lowercase();
                self.allowed_script_hosts
                    .iter()
                    .any(|host| src.contains(host.as_str()))
            }
            _ => false,
        }
    }

    /// Script element that includes the approved framework. Query and
    /// fragment are ignored, so `?plugins=forms` variants count.
    pub fn is_framework(&self, element: &Element) -> bool {
        element.is("script")
            && element
                .attr("src")
                .map_or(false, |src| resource_key(src) == resource_key(&self.framework_url))
    }

    pub fn framework_element(&self) -> Element {
        Element::new("script").with_attr("src", &self.framework_url)
    }
}

/// Scheme, host, port and path of `url`, lower-cased, without a trailing
/// slash. Unparseable input falls back to the trimmed text.
fn resource_key(url: &str) -> String {
    let url = url.trim();
    match Url::parse(url) {
        Ok(parsed) => format!(
            "{}://{}{}{}",
            parsed.scheme(),
            parsed.host_str().unwrap_or_default(),
            parsed.port().map(|p| format!(":{}", p)).unwrap_or_default(),
            parsed.path().trim_end_matches('/'),
        )
        .to_lowercase(),
        Err(_) => url
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .trim_end_matches('/')
            .to_lowercase(),
    }
}

pub fn is_charset_meta(element: &Element) -> bool {
    element.is("meta") && element.has_attr("charset")
}

pub fn is_viewport_meta(element: &Element) -> bool {
    element.is("meta")
        && element
            .attr("name")
            .map_or(false, |name| name.trim().eq_ignore_ascii_case("viewport"))
}

pub fn charset_element() -> Element {
    Element::new("meta").with_attr("charset", CHARSET)
}

pub fn viewport_element() -> Element {
    Element::new("meta")
        .with_attr("name", "viewport")
        .with_attr("content", VIEWPORT)
}
