//! SKILL.md frontmatter handling.
//!
//! Frontmatter is a YAML-ish block delimited by `---` lines at the top of
//! the document. The detail view shows its fields above the rendered body;
//! the full-content prompt always uses the untouched document.

use std::collections::BTreeMap;

/// Frontmatter key-value pairs, ordered by key.
pub type SkillFrontmatter = BTreeMap<String, String>;

/// Split a document into its frontmatter block and the remaining body.
///
/// Returns `None` when the document has no closed frontmatter block.
fn split(content: &str) -> Option<(&str, &str)> {
    let trimmed = content.trim_start();
    let after_open = trimmed.strip_prefix("---")?;
    let rest = after_open.trim_start_matches(['\r', '\n']);

    let closing = rest.find("\n---")?;
    let yaml = &rest[..closing];

    // Skip the closing delimiter line itself.
    let after_close = &rest[closing + 4..];
    let body = match after_close.find('\n') {
        Some(pos) => &after_close[pos + 1..],
        None => "",
    };
    Some((yaml, body))
}

/// Parse frontmatter into key-value pairs.
///
/// Returns an empty map if the document has no frontmatter:
///
/// ```text
/// ---
/// name: writer
/// description: Drafts and edits prose
/// ---
/// # Writer
/// ...instructions...
/// ```
pub fn parse_frontmatter(content: &str) -> SkillFrontmatter {
    match split(content) {
        Some((yaml, _)) => parse_yaml_block(yaml),
        None => SkillFrontmatter::new(),
    }
}

/// The document with any leading frontmatter block removed.
pub fn strip_frontmatter(content: &str) -> &str {
    match split(content) {
        Some((_, body)) => body,
        None => content,
    }
}

/// Parse a flat YAML block. Indented lines continue the previous key.
fn parse_yaml_block(yaml: &str) -> SkillFrontmatter {
    let mut map = SkillFrontmatter::new();
    let mut current_key: Option<String> = None;
    let mut current_value = String::new();

    for line in yaml.lines() {
        if !line.starts_with(' ') && !line.starts_with('\t') {
            flush(&current_key, &current_value, &mut map);

            if let Some(colon_pos) = line.find(':') {
                current_key = Some(line[..colon_pos].trim().to_string());
                current_value = line[colon_pos + 1..].trim().to_string();
            } else {
                current_key = None;
                current_value.clear();
            }
        } else if current_key.is_some() {
            current_value.push('\n');
            current_value.push_str(line.trim());
        }
    }
    flush(&current_key, &current_value, &mut map);

    map
}

fn flush(key: &Option<String>, value: &str, map: &mut SkillFrontmatter) {
    if let Some(key) = key {
        let val = value.trim();
        if !val.is_empty() {
            map.insert(key.clone(), strip_yaml_quotes(val));
        }
    }
}

fn strip_yaml_quotes(s: &str) -> String {
    let trimmed = s.trim();
    if trimmed.len() >= 2
        && ((trimmed.starts_with('"') && trimmed.ends_with('"'))
            || (trimmed.starts_with('\'') && trimmed.ends_with('\'')))
    {
        trimmed[1..trimmed.len() - 1].to_string()
    } else {
        trimmed.to_string()
    }
}
