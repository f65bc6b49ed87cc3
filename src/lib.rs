//! Skill detail pages for a skills catalog.
//!
//! A page resolves one skill identifier against the catalog index, loads the
//! skill's `SKILL.md`, and offers two prompts to copy: a short `Use @name`
//! reference and the full document, each optionally followed by user
//! context.
//!
//! # Flow
//!
//! ```text
//! identifier ──► IndexSource ──► resolve_record ──► ResolvedPath
//!                                                       │
//!                 ViewState ◄── DocumentSource ◄────────┘
//!                     │
//!                     ├─► compose (reference | full) ─► Clipboard
//!                     └─► CopyFeedback (2 s indicator per action)
//! ```

pub mod browse;
pub mod catalog;
pub mod clipboard;
pub mod document;
pub mod error;
pub mod feedback;
pub mod location;
pub mod prompt;
pub mod settings;
pub mod view;

pub use catalog::{CatalogRecord, IndexSource, ResolvedPath, resolve_record};
pub use clipboard::{Clipboard, MemoryClipboard, SystemClipboard};
pub use document::{DocumentContent, DocumentSource, SKILL_FILE_NAME};
pub use error::LoadError;
pub use feedback::{COPY_FEEDBACK_WINDOW, CopyFeedback, CopyState};
pub use location::Location;
pub use prompt::PromptKind;
pub use settings::Settings;
pub use view::{LoadStatus, LoadedSkill, SkillPage, Sources, ViewState};
