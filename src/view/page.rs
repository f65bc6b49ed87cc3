//! Page orchestration: the two-stage load, stale-result guarding and copy
//! actions for one skill page.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::{LoadStatus, ViewState};
use crate::catalog::{CatalogRecord, IndexSource, resolve_record};
use crate::clipboard::Clipboard;
use crate::document::{DocumentContent, DocumentSource};
use crate::error::LoadError;
use crate::feedback::{CopyFeedback, CopyState};
use crate::prompt::PromptKind;

/// A resolved record together with its document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedSkill {
    pub record: CatalogRecord,
    pub content: DocumentContent,
}

/// The index and document collaborators a page reads from.
#[derive(Clone)]
pub struct Sources {
    pub index: Arc<dyn IndexSource>,
    pub documents: Arc<dyn DocumentSource>,
}

/// Resolve `identifier` and fetch its document.
///
/// The document is only requested after the index produced a matching
/// record. Neither step is retried.
pub async fn load_skill(
    index: &dyn IndexSource,
    documents: &dyn DocumentSource,
    identifier: &str,
) -> Result<LoadedSkill, LoadError> {
    let records = index.fetch_index().await?;
    let record = resolve_record(identifier, &records)?.clone();

    let path = record.resolved_path();
    debug!(
        "Resolved '{}' to {} (document {})",
        identifier,
        path,
        documents.target(&path)
    );
    let content = documents.fetch_document(&path).await?;

    Ok(LoadedSkill { record, content })
}

/// Result of one load task, tagged with the navigation it belongs to.
#[derive(Debug)]
pub(crate) struct Completion {
    generation: u64,
    identifier: String,
    result: Result<LoadedSkill, LoadError>,
}

/// One skill page, re-targetable by navigation.
///
/// Every [`navigate`](SkillPage::navigate) starts a fresh page instance:
/// the previous load task is aborted, the view returns to loading with an
/// empty context, and the copy indicators (with any pending resets) are
/// replaced. Completions from earlier navigations are discarded.
pub struct SkillPage {
    sources: Sources,
    clipboard: Arc<dyn Clipboard>,
    generation: u64,
    view: ViewState,
    feedback: CopyFeedback,
    task: Option<JoinHandle<()>>,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions_rx: mpsc::UnboundedReceiver<Completion>,
}

impl SkillPage {
    /// Open a page for `identifier` and start loading it.
    pub fn open(sources: Sources, clipboard: Arc<dyn Clipboard>, identifier: &str) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        let mut page = Self {
            sources,
            clipboard,
            generation: 0,
            view: ViewState::loading(identifier),
            feedback: CopyFeedback::new(),
            task: None,
            completions_tx,
            completions_rx,
        };
        page.navigate(identifier);
        page
    }

    /// Switch to another identifier, starting over from loading.
    pub fn navigate(&mut self, identifier: &str) {
        if let Some(task) = self.task.take() {
            task.abort();
        }

        self.generation += 1;
        self.view = ViewState::loading(identifier);
        self.feedback = CopyFeedback::new();
        info!("Opening skill '{}'", identifier);

        let generation = self.generation;
        let identifier = identifier.to_string();
        let sources = self.sources.clone();
        let tx = self.completions_tx.clone();
        self.task = Some(tokio::spawn(async move {
            let result = load_skill(
                sources.index.as_ref(),
                sources.documents.as_ref(),
                &identifier,
            )
            .await;
            // The receiver lives as long as the page.
            let _ = tx.send(Completion {
                generation,
                identifier,
                result,
            });
        }));
    }

    /// Apply a load completion. Returns false if it was stale or the page
    /// already left the loading state.
    pub(crate) fn apply(&mut self, completion: Completion) -> bool {
        if completion.generation != self.generation {
            debug!(
                "Discarding stale load for '{}' (generation {}, current {})",
                completion.identifier, completion.generation, self.generation
            );
            return false;
        }

        match completion.result {
            Ok(skill) => {
                info!("Skill '{}' ready", skill.record.id);
                self.view.set_ready(skill)
            }
            Err(error) => {
                warn!(
                    "Skill '{}' failed to load ({}): {}",
                    completion.identifier,
                    error.kind(),
                    error
                );
                self.view.set_error(error)
            }
        }
    }

    /// Wait until the current navigation reaches ready or error.
    pub async fn settle(&mut self) -> &ViewState {
        while self.view.status() == LoadStatus::Loading {
            match self.completions_rx.recv().await {
                Some(completion) => {
                    self.apply(completion);
                }
                None => break,
            }
        }
        &self.view
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn status(&self) -> LoadStatus {
        self.view.status()
    }

    /// Replace the user context for the current page instance.
    pub fn set_context(&mut self, context: impl Into<String>) {
        self.view.set_context(context);
    }

    /// Compose, copy and flag a prompt.
    ///
    /// Returns the copied text, or `None` when the page is not ready (copy
    /// controls are only offered on the ready view).
    pub fn copy(&mut self, kind: PromptKind) -> Option<String> {
        let text = self.view.prompt(kind)?;
        self.feedback.copy(kind, &text, self.clipboard.as_ref());
        Some(text)
    }

    pub fn copy_state(&self) -> CopyState {
        self.feedback.state()
    }

    /// Watch the copy indicators of the current page instance.
    ///
    /// The receiver goes quiet after the next navigation.
    pub fn subscribe_copy_state(&self) -> watch::Receiver<CopyState> {
        self.feedback.subscribe()
    }
}

impl Drop for SkillPage {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
