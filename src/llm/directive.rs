//! System directive sent ahead of every generation request.

use crate::types::CompiledPrompt;

pub const BUILD_INSTRUCTION: &str = "Build the page now as per the requirements.";

/// Persona plus the hard output constraints the sanitizer relies on.
pub fn system_directive(prompt: &CompiledPrompt, category: &str, style: &str) -> String {
    format!(
        "You are an expert web developer specializing in modern, responsive designs.

Generate a complete, single-file HTML5 page based on the following instructions.

Instructions:
1. Return ONLY the raw HTML content. Do not include markdown code blocks or additional text.
2. Use Tailwind CSS via the official CDN (https://cdn.tailwindcss.com) and no other styling framework.
3. No custom JavaScript is allowed, including inline event handlers.
4. Do not write <style> blocks; style exclusively with Tailwind utility classes.
5. Use semantic HTML elements (header, footer, main, section, etc.).
6. Ensure a polished, professional UI.
7. Design Theme: {style}
8. Page Category: {category}

User Request:
\"{prompt}\"
",
        style = style,
        category = category,
        prompt = prompt.as_str(),
    )
}
