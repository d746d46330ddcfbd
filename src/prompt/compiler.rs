use crate::config::PipelineConfig;
use crate::types::{CompiledPrompt, GenerationRequest};

use super::fields::{humanize_key, title_case, StructuredFieldSet};
use super::guard::{CompileError, PromptGuard};

const PERSONA: &str = "You are a professional web designer and frontend developer.";

/// Turns a request into the instruction text sent to the generator.
///
/// Pure: the same request always compiles to the same bytes.
#[derive(Debug, Clone)]
pub struct PromptCompiler {
    guard: PromptGuard,
}

impl PromptCompiler {
    pub fn new(guard: PromptGuard) -> Self {
        Self { guard }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(PromptGuard::from_config(config))
    }

    pub fn compile(&self, request: &GenerationRequest) -> Result<CompiledPrompt, CompileError> {
        let text = match (&request.fields, &request.prompt) {
            (Some(fields), _) => {
                for value in fields.all_values() {
                    self.guard.check_content(&value)?;
                }
                if fields.title().map_or(true, |t| t.trim().is_empty()) {
                    return Err(CompileError::MissingField("title".to_string()));
                }
                build_structured_prompt(fields, &request.category, &request.style)
            }
            (None, Some(prompt)) if !prompt.trim().is_empty() => {
                self.guard.check_content(prompt)?;
                self.guard.check_min_length(prompt)?;
                prompt.clone()
            }
            _ => return Err(CompileError::MissingField("prompt".to_string())),
        };

        self.guard.check_length(&text)?;
        Ok(CompiledPrompt::new(text))
    }
}

const EVENT_WORDS: &[&str] = &[
    "birthday", "wedding", "anniversary", "party", "shower", "graduation", "event",
    "invitation", "engagement", "reunion",
];
const LANDING_WORDS: &[&str] = &["landing", "product", "business", "launch"];
const PORTFOLIO_WORDS: &[&str] = &["portfolio", "resume"];
const ANNOUNCEMENT_WORDS: &[&str] = &["announcement", "news"];

/// Section order per occasion family. `birthday_party` matches on any word.
fn section_order(occasion_key: &str) -> &'static [&'static str] {
    let has_word = |words: &[&str]| occasion_key.split('_').any(|w| words.contains(&w));

    if has_word(EVENT_WORDS) {
        &[
            "Hero section (title, short message)",
            "Event details (date, time, venue)",
            "Additional information / special message",
            "Contact or RSVP section",
        ]
    } else if has_word(LANDING_WORDS) {
        &[
            "Hero section (headline, value proposition, primary call to action)",
            "Features or benefits grid",
            "Social proof (testimonials, numbers, logos)",
            "Closing call to action and footer",
        ]
    } else if has_word(PORTFOLIO_WORDS) {
        &[
            "Hero section (name, role, one-line introduction)",
            "About section",
            "Selected work or projects grid",
            "Contact section",
        ]
    } else if has_word(ANNOUNCEMENT_WORDS) {
        &[
            "Headline section (announcement title, date)",
            "Announcement details",
            "What happens next",
            "Contact section",
        ]
    } else {
        &[
            "Hero section (title, short message)",
            "Main content sections",
            "Additional information",
            "Contact or footer section",
        ]
    }
}

fn build_structured_prompt(fields: &StructuredFieldSet, category: &str, style: &str) -> String {
    let occasion_raw = fields
        .occasion()
        .filter(|o| !o.trim().is_empty())
        .or_else(|| Some(category.to_string()).filter(|c| !c.trim().is_empty()))
        .unwrap_or_else(|| "generic".to_string());
    let occasion_key = occasion_raw.trim().to_lowercase().replace(' ', "_");
    let occasion = humanize_key(occasion_raw.trim());

    let theme = fields
        .theme()
        .filter(|t| !t.trim().is_empty())
        .or_else(|| Some(style.to_string()).filter(|s| !s.trim().is_empty()))
        .unwrap_or_else(|| "modern".to_string());
    let title = fields.title().unwrap_or_default();

    let mut header = format!("Create a visually attractive, single-page {} website", occasion);
    if let Some(sub_type) = fields.sub_type().filter(|s| !s.trim().is_empty()) {
        header.push_str(&format!(" ({})", humanize_key(&sub_type)));
    }
    header.push('.');

    let mut parts: Vec<String> = vec![
        PERSONA.to_string(),
        header,
        String::new(),
        format!("Page Title: {}", title),
        format!("Design Theme: {}", title_case(&theme)),
        String::new(),
        "### Content Details".to_string(),
    ];

    for (key, value) in fields.content_entries() {
        parts.push(format!("- {}: {}", humanize_key(key), value));
    }

    let specific: Vec<(&str, String)> = fields.specific_entries().collect();
    if !specific.is_empty() {
        parts.push(String::new());
        parts.push("### Occasion-Specific Details".to_string());
        for (key, value) in specific {
            parts.push(format!("- {}: {}", humanize_key(key), value));
        }
    }

    parts.push(String::new());
    parts.push("### Design & Layout Instructions".to_string());
    parts.push(format!(
        "- Use a {} visual style suitable for a {}.",
        theme.to_lowercase(),
        occasion
    ));
    parts.push("- Follow this section order:".to_string());
    for (index, section) in section_order(&occasion_key).iter().enumerate() {
        parts.push(format!("  {}. {}", index + 1, section));
    }
    parts.push("- Use clean spacing, clear typography, and balanced layout.".to_string());
    parts.push("- Add subtle decorative elements relevant to the occasion.".to_string());

    parts.push(String::new());
    parts.push("### Technical Requirements".to_string());
    for line in [
        "- Output ONLY a complete HTML5 document.",
        "- Use semantic HTML5 elements.",
        "- Style exclusively with Tailwind CSS utility classes; do not write style blocks.",
        "- Do NOT include custom JavaScript or inline event handlers.",
        "- Do NOT include explanations, markdown, or comments.",
        "- Do NOT reference external images; use icons, gradients and typography instead.",
        "- The page must be fully responsive.",
    ] {
        parts.push(line.to_string());
    }

    parts.join("\n")
}
