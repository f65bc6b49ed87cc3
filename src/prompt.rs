//! Prompt composition.
//!
//! Two prompts can be copied from a skill page: a short reference that
//! mentions the skill by name, and the full SKILL.md text. Both take the
//! same optional user context, appended after a blank line under a
//! `Context:` label.

use crate::catalog::CatalogRecord;
use crate::document::DocumentContent;

/// Label line that introduces appended user context.
pub const CONTEXT_LABEL: &str = "Context:";

/// Which prompt a copy action produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptKind {
    /// `Use @<name>`, plus context.
    Reference,
    /// The whole document, plus context.
    Full,
}

impl PromptKind {
    pub const ALL: [PromptKind; 2] = [PromptKind::Reference, PromptKind::Full];

    pub fn label(self) -> &'static str {
        match self {
            PromptKind::Reference => "reference",
            PromptKind::Full => "full",
        }
    }
}

impl std::fmt::Display for PromptKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for PromptKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "reference" | "ref" => Ok(Self::Reference),
            "full" | "content" => Ok(Self::Full),
            _ => Err(format!(
                "invalid prompt kind '{}', expected: reference, full",
                s
            )),
        }
    }
}

/// Append user context to a base text.
///
/// Context that is empty after trimming is ignored, so the result is the
/// base text unchanged.
pub fn with_context(base: &str, context: Option<&str>) -> String {
    match context.map(str::trim).filter(|c| !c.is_empty()) {
        Some(ctx) => format!("{}\n\n{}\n{}", base, CONTEXT_LABEL, ctx),
        None => base.to_string(),
    }
}

/// Short prompt that mentions the skill by name.
pub fn reference_prompt(record: &CatalogRecord, context: Option<&str>) -> String {
    with_context(&format!("Use @{}", record.name), context)
}

/// Prompt carrying the entire document.
pub fn full_prompt(content: &DocumentContent, context: Option<&str>) -> String {
    with_context(content.as_str(), context)
}

/// Compose either prompt.
pub fn compose(
    kind: PromptKind,
    record: &CatalogRecord,
    content: &DocumentContent,
    context: Option<&str>,
) -> String {
    match kind {
        PromptKind::Reference => reference_prompt(record, context),
        PromptKind::Full => full_prompt(content, context),
    }
}
