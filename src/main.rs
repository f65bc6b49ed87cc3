//! skillview command-line entry point.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use skillview::browse;
use skillview::catalog::index_source;
use skillview::document::document_source;
use skillview::view::{RenderOptions, render_view};
use skillview::{
    Clipboard, LoadStatus, Location, MemoryClipboard, PromptKind, Settings, SkillPage, Sources,
    SystemClipboard,
};

#[derive(Parser, Debug)]
#[command(name = "skillview", version, about = "View a skill and copy its prompts")]
struct Cli {
    /// Catalog index: URL or path to skills_index.json.
    #[arg(long, global = true)]
    index: Option<String>,

    /// Document root the skill paths are resolved against: URL or directory.
    #[arg(long = "docs", global = true)]
    document_root: Option<String>,

    /// Back-link target shown on every page.
    #[arg(long, global = true)]
    catalog_url: Option<String>,

    /// Settings file to use instead of ~/.skillview/settings.json.
    #[arg(long, global = true, env = "SKILLVIEW_SETTINGS")]
    settings: Option<PathBuf>,

    /// Keep copies in memory instead of touching the system clipboard.
    #[arg(long, global = true)]
    no_clipboard: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render one skill page and optionally copy a prompt.
    Show {
        /// Skill identifier from the index.
        id: String,

        /// Copy a prompt: reference or full.
        #[arg(long)]
        copy: Option<PromptKind>,

        /// Context appended to the copied prompt.
        #[arg(long, requires = "copy")]
        context: Option<String>,

        /// Print the copied prompt to stdout as well.
        #[arg(long, requires = "copy")]
        print: bool,

        /// Print the document as-is instead of rendering markdown.
        #[arg(long)]
        raw: bool,
    },

    /// Open a skill page in an interactive session.
    Browse {
        /// Skill identifier from the index.
        id: String,

        /// Print the document as-is instead of rendering markdown.
        #[arg(long)]
        raw: bool,
    },

    /// Inspect or change saved settings.
    Config {
        #[command(subcommand)]
        action: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Print the settings file location.
    Path,
    /// List every setting.
    List,
    /// Print one setting by dotted path.
    Get { key: String },
    /// Change one setting by dotted path and save.
    Set { key: String, value: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("skillview=warn")),
        )
        .init();

    let cli = Cli::parse();
    let settings_path = cli.settings.clone().unwrap_or_else(Settings::default_path);
    let mut settings = Settings::load_effective(&settings_path);
    if let Some(index) = &cli.index {
        settings.sources.index = index.clone();
    }
    if let Some(root) = &cli.document_root {
        settings.sources.document_root = root.clone();
    }
    if let Some(url) = &cli.catalog_url {
        settings.display.catalog_url = url.clone();
    }

    match cli.command {
        Command::Config { action } => run_config(action, &settings_path),
        Command::Show {
            id,
            copy,
            context,
            print,
            raw,
        } => {
            let system = system_clipboard(cli.no_clipboard);
            let mut page = open_page(&settings, clipboard_for(&system), &id)?;
            page.settle().await;

            let mut copied = false;
            if let Some(kind) = copy {
                if let Some(context) = context {
                    page.set_context(context);
                }
                match page.copy(kind) {
                    Some(text) => {
                        copied = true;
                        if print {
                            println!("{}", text);
                        }
                    }
                    None => tracing::debug!("Skipping copy: page is not ready"),
                }
            }

            print!(
                "{}",
                render_view(page.view(), page.copy_state(), &render_options(&settings, raw))
            );
            let code = match page.status() {
                LoadStatus::Ready => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            };
            drop(page);

            if copied && let Some(system) = &system {
                if cfg!(target_os = "linux") {
                    eprintln!(
                        "Keeping the prompt on the clipboard until something else is copied (Ctrl-C to stop)."
                    );
                }
                tokio::task::block_in_place(|| system.persist());
            }
            Ok(code)
        }
        Command::Browse { id, raw } => {
            let system = system_clipboard(cli.no_clipboard);
            let page = open_page(&settings, clipboard_for(&system), &id)?;
            browse::run(page, render_options(&settings, raw)).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// The desktop clipboard, unless disabled or unavailable.
fn system_clipboard(no_clipboard: bool) -> Option<Arc<SystemClipboard>> {
    if no_clipboard {
        return None;
    }
    match SystemClipboard::spawn() {
        Ok(clipboard) => Some(Arc::new(clipboard)),
        Err(e) => {
            warn!("Falling back to an in-memory clipboard: {}", e);
            None
        }
    }
}

fn clipboard_for(system: &Option<Arc<SystemClipboard>>) -> Arc<dyn Clipboard> {
    match system {
        Some(clipboard) => Arc::clone(clipboard) as Arc<dyn Clipboard>,
        None => Arc::new(MemoryClipboard::new()),
    }
}

fn open_page(
    settings: &Settings,
    clipboard: Arc<dyn Clipboard>,
    id: &str,
) -> anyhow::Result<SkillPage> {
    let client = reqwest::Client::builder()
        .timeout(settings.request_timeout())
        .user_agent(concat!("skillview/", env!("CARGO_PKG_VERSION")))
        .build()?;

    let sources = Sources {
        index: index_source(&Location::parse(&settings.sources.index), client.clone()),
        documents: document_source(&Location::parse(&settings.sources.document_root), client),
    };
    Ok(SkillPage::open(sources, clipboard, id))
}

fn render_options(settings: &Settings, raw: bool) -> RenderOptions {
    let width = match settings.display.width {
        0 => crossterm::terminal::size()
            .map(|(cols, _)| cols as usize)
            .unwrap_or(80),
        w => w,
    };
    RenderOptions {
        width,
        catalog_url: settings.display.catalog_url.clone(),
        raw,
    }
}

fn run_config(action: ConfigCommand, path: &std::path::Path) -> anyhow::Result<ExitCode> {
    match action {
        ConfigCommand::Path => println!("{}", path.display()),
        ConfigCommand::List => {
            for (key, value) in Settings::load_from(path).list() {
                println!("{} = {}", key, value);
            }
        }
        ConfigCommand::Get { key } => match Settings::load_from(path).get(&key) {
            Some(value) => println!("{}", value),
            None => {
                eprintln!("Unknown setting: {}", key);
                return Ok(ExitCode::FAILURE);
            }
        },
        ConfigCommand::Set { key, value } => {
            let mut stored = Settings::load_from(path);
            stored.set(&key, &value)?;
            stored.save_to(path)?;
            println!("{} = {}", key, value);
        }
    }
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_show_context_requires_copy() {
        assert!(Cli::try_parse_from(["skillview", "show", "writer", "--context", "be concise"]).is_err());

        let cli = Cli::try_parse_from([
            "skillview", "show", "writer", "--copy", "full", "--context", "be concise",
        ])
        .unwrap();
        match cli.command {
            Command::Show { copy, context, .. } => {
                assert_eq!(copy, Some(PromptKind::Full));
                assert_eq!(context.as_deref(), Some("be concise"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
