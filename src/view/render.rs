//! Terminal rendering of the loading, ready and error views.

use std::fmt::Write as _;

use termimad::MadSkin;

use super::{LoadStatus, ViewState};
use crate::feedback::CopyState;
use crate::prompt::PromptKind;

/// Presentation options for [`render_view`].
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Wrap width for the markdown body.
    pub width: usize,
    /// Target of the back link.
    pub catalog_url: String,
    /// Print the document as-is instead of rendering markdown.
    pub raw: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: 80,
            catalog_url: crate::settings::DEFAULT_CATALOG_URL.to_string(),
            raw: false,
        }
    }
}

/// Render markdown for the terminal.
pub fn render_markdown(markdown: &str, width: usize) -> String {
    let skin = MadSkin::default();
    skin.text(markdown, Some(width)).to_string()
}

/// Render whichever view the state calls for.
pub fn render_view(view: &ViewState, copy: CopyState, opts: &RenderOptions) -> String {
    match view.status() {
        LoadStatus::Loading => format!("Loading skill '{}'...\n", view.identifier()),
        LoadStatus::Ready => render_ready(view, copy, opts),
        LoadStatus::Error => render_error(view, opts),
    }
}

fn back_link(opts: &RenderOptions) -> String {
    format!("← Back to skills: {}", opts.catalog_url)
}

fn render_error(view: &ViewState, opts: &RenderOptions) -> String {
    let message = view
        .error()
        .map(|e| e.to_string())
        .unwrap_or_else(|| "Unknown error".to_string());

    let mut out = String::new();
    let _ = writeln!(out, "⚠  Skill not available");
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", message);
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", back_link(opts));
    out
}

fn copy_label(copy: CopyState, kind: PromptKind) -> &'static str {
    if copy.is_copied(kind) {
        "✓ Copied!"
    } else {
        "Copy"
    }
}

fn render_ready(view: &ViewState, copy: CopyState, opts: &RenderOptions) -> String {
    let Some(skill) = view.skill() else {
        return String::new();
    };
    let record = &skill.record;
    let rule = "─".repeat(opts.width.clamp(10, 120));

    let mut out = String::new();
    let _ = writeln!(out, "{}", back_link(opts));
    let _ = writeln!(out);
    if record.category.is_empty() {
        let _ = writeln!(out, "{}", record.name);
    } else {
        let _ = writeln!(out, "{}  [{}]", record.name, record.category);
    }
    if let Some(source) = &record.source {
        let _ = writeln!(out, "Source: {}", source);
    }
    if !record.description.is_empty() {
        let _ = writeln!(out, "{}", record.description);
    }

    let frontmatter = skill.content.frontmatter();
    let extra: Vec<(&String, &String)> = frontmatter
        .iter()
        .filter(|(k, _)| k.as_str() != "name" && k.as_str() != "description")
        .collect();
    if !extra.is_empty() {
        let _ = writeln!(out);
        for (key, value) in extra {
            let _ = writeln!(out, "{}: {}", key, value.replace('\n', " "));
        }
    }

    let _ = writeln!(out, "{}", rule);
    if opts.raw {
        let _ = writeln!(out, "{}", skill.content.as_str());
    } else {
        out.push_str(&render_markdown(skill.content.body(), opts.width));
    }
    let _ = writeln!(out, "{}", rule);

    let reference = view.prompt(PromptKind::Reference).unwrap_or_default();
    let full_len = view
        .prompt(PromptKind::Full)
        .map(|p| p.chars().count())
        .unwrap_or(0);
    let _ = writeln!(
        out,
        "[ref]  Reference prompt   {:<10} {}",
        copy_label(copy, PromptKind::Reference),
        reference.lines().next().unwrap_or_default()
    );
    let _ = writeln!(
        out,
        "[full] Full content       {:<10} {} chars",
        copy_label(copy, PromptKind::Full),
        full_len
    );
    let context = view.context().trim();
    if context.is_empty() {
        let _ = writeln!(out, "Context: (none)");
    } else {
        let _ = writeln!(out, "Context: {}", context);
    }
    out
}
