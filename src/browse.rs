//! Interactive skill page session.
//!
//! Reads commands with rustyline and drives a [`SkillPage`]. Copy
//! indicators are reported as they change: a copy is confirmed when it
//! happens, and the reset after the feedback window is printed above the
//! prompt while the editor waits for input.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, ExternalPrinter};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::feedback::CopyState;
use crate::prompt::PromptKind;
use crate::view::{LoadStatus, RenderOptions, SkillPage, render_view};

pub const HELP: &str = "\
Commands:
  context <text>   set the context appended to copied prompts
  clear            remove the context
  ref              copy the reference prompt (Use @name)
  full             copy the full SKILL.md content
  open <id>        open another skill
  show             render the page again
  status           show load status and copy indicators
  help             this text
  quit             leave";

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseCommand {
    Context(String),
    ClearContext,
    Copy(PromptKind),
    Open(String),
    Show,
    Status,
    Help,
    Quit,
    Empty,
    Unknown(String),
}

/// Parse a line of input. The context text is kept verbatim after the
/// command word.
pub fn parse_command(line: &str) -> BrowseCommand {
    let trimmed = line.trim_start();
    let (word, rest) = trimmed
        .split_once(char::is_whitespace)
        .unwrap_or((trimmed, ""));

    match word.to_lowercase().as_str() {
        "" => BrowseCommand::Empty,
        "context" | "ctx" => BrowseCommand::Context(rest.to_string()),
        "clear" => BrowseCommand::ClearContext,
        "ref" | "reference" => BrowseCommand::Copy(PromptKind::Reference),
        "full" => BrowseCommand::Copy(PromptKind::Full),
        "open" | "cd" => match rest.trim() {
            "" => BrowseCommand::Unknown(trimmed.to_string()),
            id => BrowseCommand::Open(id.to_string()),
        },
        "show" => BrowseCommand::Show,
        "status" => BrowseCommand::Status,
        "help" | "?" => BrowseCommand::Help,
        "quit" | "exit" | "q" => BrowseCommand::Quit,
        _ => BrowseCommand::Unknown(trimmed.to_string()),
    }
}

/// Prompt line for the current page, e.g. `writer > ` or `ghost [error] > `.
pub fn prompt_line(page: &SkillPage) -> String {
    let view = page.view();
    if view.status() == LoadStatus::Error {
        format!("{} [error] > ", view.identifier())
    } else {
        format!("{} > ", view.identifier())
    }
}

/// Receives lines printed while the editor is waiting for input.
pub type Notify = Arc<dyn Fn(String) + Send + Sync>;

/// Indicators that were lit in `before` and are off in `after`.
pub fn indicator_resets(before: CopyState, after: CopyState) -> Vec<PromptKind> {
    PromptKind::ALL
        .into_iter()
        .filter(|kind| before.is_copied(*kind) && !after.is_copied(*kind))
        .collect()
}

/// Report indicator resets of one page instance until it goes away.
pub fn watch_indicators(mut rx: watch::Receiver<CopyState>, notify: Notify) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut before = *rx.borrow_and_update();
        while rx.changed().await.is_ok() {
            let after = *rx.borrow_and_update();
            for kind in indicator_resets(before, after) {
                notify(format!("[{}] Copy", kind.label()));
            }
            before = after;
        }
    })
}

fn history_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".skillview").join("history"))
}

/// Apply one command. Returns false when the session should end.
pub async fn handle_command(
    page: &mut SkillPage,
    command: BrowseCommand,
    opts: &RenderOptions,
) -> bool {
    match command {
        BrowseCommand::Empty => {}
        BrowseCommand::Quit => return false,
        BrowseCommand::Help => println!("{}", HELP),
        BrowseCommand::Context(text) => {
            page.set_context(text);
            println!("Context set.");
        }
        BrowseCommand::ClearContext => {
            page.set_context(String::new());
            println!("Context cleared.");
        }
        BrowseCommand::Copy(kind) => match page.copy(kind) {
            Some(text) => println!("Copied {} prompt ({} chars).", kind, text.chars().count()),
            None => println!("Nothing to copy: the skill is not loaded."),
        },
        BrowseCommand::Open(id) => {
            page.navigate(&id);
            page.settle().await;
            print!("{}", render_view(page.view(), page.copy_state(), opts));
        }
        BrowseCommand::Show => {
            print!("{}", render_view(page.view(), page.copy_state(), opts));
        }
        BrowseCommand::Status => {
            let copy = page.copy_state();
            println!(
                "{}: {} (reference copied: {}, full copied: {})",
                page.view().identifier(),
                page.status(),
                copy.is_copied(PromptKind::Reference),
                copy.is_copied(PromptKind::Full)
            );
        }
        BrowseCommand::Unknown(input) => {
            println!("Unknown command '{}'. Type 'help' for commands.", input);
        }
    }
    true
}

fn rewatch(
    previous: Option<JoinHandle<()>>,
    page: &SkillPage,
    notify: Option<&Notify>,
) -> Option<JoinHandle<()>> {
    if let Some(previous) = previous {
        previous.abort();
    }
    notify.map(|notify| watch_indicators(page.subscribe_copy_state(), notify.clone()))
}

/// Run the interactive loop until quit or end of input.
///
/// Needs the multi-threaded runtime: line editing blocks the current worker
/// while copy indicator timers keep running on the others.
pub async fn run(mut page: SkillPage, opts: RenderOptions) -> anyhow::Result<()> {
    page.settle().await;
    print!("{}", render_view(page.view(), page.copy_state(), &opts));
    println!("Type 'help' for commands.");

    let mut editor = DefaultEditor::new()?;
    let history = history_path();
    if let Some(path) = &history {
        let _ = editor.load_history(path);
    }

    let notify: Option<Notify> = match editor.create_external_printer() {
        Ok(printer) => {
            let printer = Mutex::new(printer);
            Some(Arc::new(move |line: String| {
                if let Ok(mut printer) = printer.lock() {
                    let _ = printer.print(line);
                }
            }))
        }
        Err(e) => {
            debug!("No external printer, indicator resets stay silent: {}", e);
            None
        }
    };
    let mut watcher = rewatch(None, &page, notify.as_ref());

    let result = loop {
        let prompt = prompt_line(&page);
        let line = tokio::task::block_in_place(|| editor.readline(&prompt));
        match line {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = editor.add_history_entry(line.as_str());
                }
                let command = parse_command(&line);
                let reopened = matches!(command, BrowseCommand::Open(_));
                if !handle_command(&mut page, command, &opts).await {
                    break Ok(());
                }
                // Navigation replaced the indicators being watched.
                if reopened {
                    watcher = rewatch(watcher, &page, notify.as_ref());
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break Ok(()),
            Err(e) => break Err(e),
        }
    };
    if let Some(watcher) = watcher {
        watcher.abort();
    }
    result?;

    if let Some(path) = &history {
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        if let Err(e) = editor.save_history(path) {
            warn!("Failed to save history to {}: {}", path.display(), e);
        }
    }
    Ok(())
}
