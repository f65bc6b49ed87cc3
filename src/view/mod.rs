//! Skill page view state.
//!
//! A page instance moves through `loading → ready` or `loading → error`
//! exactly once. Navigating to another identifier starts a new instance with
//! an empty user context; see [`SkillPage`].

mod page;
mod render;

pub use page::{LoadedSkill, SkillPage, Sources, load_skill};
pub use render::{RenderOptions, render_markdown, render_view};

use crate::error::LoadError;
use crate::prompt::{self, PromptKind};

/// Which view is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    Loading,
    Ready,
    Error,
}

impl std::fmt::Display for LoadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadStatus::Loading => write!(f, "loading"),
            LoadStatus::Ready => write!(f, "ready"),
            LoadStatus::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone)]
enum Phase {
    Loading,
    Ready(LoadedSkill),
    Error(LoadError),
}

/// Everything a skill page shows, owned in one place.
#[derive(Debug, Clone)]
pub struct ViewState {
    identifier: String,
    phase: Phase,
    context: String,
}

impl ViewState {
    /// Fresh page instance for `identifier`, waiting on its loads.
    pub fn loading(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            phase: Phase::Loading,
            context: String::new(),
        }
    }

    /// Move to ready. Ignored (returns false) unless still loading.
    pub fn set_ready(&mut self, skill: LoadedSkill) -> bool {
        if !matches!(self.phase, Phase::Loading) {
            return false;
        }
        self.phase = Phase::Ready(skill);
        true
    }

    /// Move to error. Ignored (returns false) unless still loading.
    pub fn set_error(&mut self, error: LoadError) -> bool {
        if !matches!(self.phase, Phase::Loading) {
            return false;
        }
        self.phase = Phase::Error(error);
        true
    }

    /// Replace the user context. Accepted in any state; only used when ready.
    pub fn set_context(&mut self, context: impl Into<String>) {
        self.context = context.into();
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn status(&self) -> LoadStatus {
        match self.phase {
            Phase::Loading => LoadStatus::Loading,
            Phase::Ready(_) => LoadStatus::Ready,
            Phase::Error(_) => LoadStatus::Error,
        }
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn skill(&self) -> Option<&LoadedSkill> {
        match &self.phase {
            Phase::Ready(skill) => Some(skill),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&LoadError> {
        match &self.phase {
            Phase::Error(error) => Some(error),
            _ => None,
        }
    }

    /// Compose a prompt with the current context. `None` unless ready.
    pub fn prompt(&self, kind: PromptKind) -> Option<String> {
        let skill = self.skill()?;
        Some(prompt::compose(
            kind,
            &skill.record,
            &skill.content,
            Some(&self.context),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogRecord;
    use crate::document::DocumentContent;

    fn writer() -> LoadedSkill {
        LoadedSkill {
            record: CatalogRecord {
                id: "writer".to_string(),
                name: "writer".to_string(),
                category: "tools".to_string(),
                description: "Drafts prose.".to_string(),
                path: "skills/tools/writer".to_string(),
                source: None,
            },
            content: DocumentContent::new("# Writer\nDoes X."),
        }
    }

    #[test]
    fn test_starts_loading_with_empty_context() {
        let view = ViewState::loading("writer");
        assert_eq!(view.status(), LoadStatus::Loading);
        assert_eq!(view.identifier(), "writer");
        assert_eq!(view.context(), "");
        assert!(view.prompt(PromptKind::Reference).is_none());
    }

    #[test]
    fn test_ready_is_terminal() {
        let mut view = ViewState::loading("writer");
        assert!(view.set_ready(writer()));
        assert!(!view.set_error(LoadError::NotFound("writer".to_string())));
        assert!(!view.set_ready(writer()));
        assert_eq!(view.status(), LoadStatus::Ready);
    }

    #[test]
    fn test_error_is_terminal() {
        let mut view = ViewState::loading("ghost");
        assert!(view.set_error(LoadError::NotFound("ghost".to_string())));
        assert!(!view.set_ready(writer()));
        assert_eq!(view.status(), LoadStatus::Error);
        assert!(view.skill().is_none());
        assert!(view.prompt(PromptKind::Full).is_none());
    }

    #[test]
    fn test_prompts_use_current_context() {
        let mut view = ViewState::loading("writer");
        view.set_ready(writer());

        assert_eq!(view.prompt(PromptKind::Reference).unwrap(), "Use @writer");

        view.set_context("be concise");
        assert_eq!(
            view.prompt(PromptKind::Full).unwrap(),
            "# Writer\nDoes X.\n\nContext:\nbe concise"
        );

        view.set_context("   ");
        assert_eq!(view.prompt(PromptKind::Full).unwrap(), "# Writer\nDoes X.");
    }
}
