//! Presentation port and its implementations.
//!
//! The session only ever talks to a [`Prompter`]. Which implementation backs it is decided
//! once at startup by [`select_prompter`]: a rich in-terminal UI, a `whiptail`/`dialog`
//! front end, plain line prompts, or the non-interactive batch answerer.

mod batch;
mod plain;
mod rich;
#[cfg(test)]
pub mod testing;
mod whiptail;

pub use batch::BatchPrompter;
pub use plain::PlainPrompter;
pub use rich::RichPrompter;
pub use whiptail::WhiptailPrompter;

use anyhow::Result;
use console::style;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::io::IsTerminal;

use crate::platform::has_executable;

/// One row of a checklist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecklistItem {
    pub label: String,
    pub description: String,
    pub checked: bool,
}

impl ChecklistItem {
    pub fn new(label: impl Into<String>, description: impl Into<String>, checked: bool) -> Self {
        Self {
            label: label.into(),
            description: description.into(),
            checked,
        }
    }
}

/// Everything the session needs from a user interface.
///
/// `None` / `false` results mean the user cancelled or declined; they are never errors.
pub trait Prompter {
    /// Pick one of `options`; returns its index.
    fn choose(&mut self, prompt: &str, options: &[&str], default: usize) -> Result<Option<usize>>;

    /// Pick any subset of `items`; returns the selected indices in list order.
    fn checklist(&mut self, prompt: &str, items: &[ChecklistItem]) -> Result<Option<Vec<usize>>>;

    fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool>;

    fn prompt_text(&mut self, prompt: &str, default: Option<&str>) -> Result<Option<String>>;

    fn show_message(&mut self, title: &str, body: &str) -> Result<()>;
}

/// Requested user interface, from `--ui` or the settings file.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum UiKind {
    #[default]
    Auto,
    Rich,
    Whiptail,
    Plain,
}

/// Turns every confirmation default into "yes" while staying interactive.
pub struct DefaultYes<P>(pub P);

impl<P: Prompter> Prompter for DefaultYes<P> {
    fn choose(&mut self, prompt: &str, options: &[&str], default: usize) -> Result<Option<usize>> {
        self.0.choose(prompt, options, default)
    }

    fn checklist(&mut self, prompt: &str, items: &[ChecklistItem]) -> Result<Option<Vec<usize>>> {
        self.0.checklist(prompt, items)
    }

    fn confirm(&mut self, prompt: &str, _default: bool) -> Result<bool> {
        self.0.confirm(prompt, true)
    }

    fn prompt_text(&mut self, prompt: &str, default: Option<&str>) -> Result<Option<String>> {
        self.0.prompt_text(prompt, default)
    }

    fn show_message(&mut self, title: &str, body: &str) -> Result<()> {
        self.0.show_message(title, body)
    }
}

fn stdin_is_term() -> bool {
    std::io::stdin().is_terminal()
}

fn rich_available() -> bool {
    let dumb = std::env::var("TERM").map(|t| t == "dumb").unwrap_or(false);
    stdin_is_term() && console::user_attended_stderr() && !dumb
}

fn whiptail_program() -> Option<&'static str> {
    if !stdin_is_term() {
        return None;
    }
    ["whiptail", "dialog"]
        .into_iter()
        .find(|program| has_executable(program))
}

/// Resolve the requested kind to one that works here, falling back rich → whiptail → plain.
pub fn resolve_ui(requested: UiKind) -> UiKind {
    let fallback = || {
        if rich_available() {
            UiKind::Rich
        } else if whiptail_program().is_some() {
            UiKind::Whiptail
        } else {
            UiKind::Plain
        }
    };

    match requested {
        UiKind::Auto => fallback(),
        UiKind::Rich if rich_available() => UiKind::Rich,
        UiKind::Whiptail if whiptail_program().is_some() => UiKind::Whiptail,
        UiKind::Plain => UiKind::Plain,
        other => {
            let resolved = fallback();
            warn!(
                "Requested {:?} interface is not available here, using {:?}",
                other, resolved
            );
            resolved
        }
    }
}

/// Build the prompter for this run.
pub fn select_prompter(requested: UiKind, batch: bool, assume_yes: bool) -> Box<dyn Prompter> {
    if batch {
        debug!("Using batch prompter");
        return Box::new(BatchPrompter::new());
    }

    let resolved = resolve_ui(requested);
    debug!("Using {:?} prompter", resolved);
    match (resolved, assume_yes) {
        (UiKind::Rich, false) => Box::new(RichPrompter::new()),
        (UiKind::Rich, true) => Box::new(DefaultYes(RichPrompter::new())),
        (UiKind::Whiptail, yes) => match whiptail_program() {
            Some(program) if yes => Box::new(DefaultYes(WhiptailPrompter::new(program))),
            Some(program) => Box::new(WhiptailPrompter::new(program)),
            None => plain_prompter(yes),
        },
        (_, yes) => plain_prompter(yes),
    }
}

fn plain_prompter(assume_yes: bool) -> Box<dyn Prompter> {
    let prompter = PlainPrompter::new(std::io::BufReader::new(std::io::stdin()));
    if assume_yes {
        Box::new(DefaultYes(prompter))
    } else {
        Box::new(prompter)
    }
}

/// Animated status line on stderr (hides cursor, overwrites with \r).
pub struct Spinner {
    term: console::Term,
    tick: usize,
    enabled: bool,
}

impl Spinner {
    pub fn new() -> Self {
        let term = console::Term::stderr();
        let enabled = term.is_term();
        if enabled {
            let _ = term.hide_cursor();
        }
        Self {
            term,
            tick: 0,
            enabled,
        }
    }

    pub fn tick(&mut self, label: &str) {
        if !self.enabled {
            return;
        }
        let frames = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
        let frame = frames[self.tick % frames.len()];
        let msg = format!("  {} {}", style(frame).cyan(), label);
        let _ = self.term.write_str(&format!("\r{:<70}", msg));
        self.tick += 1;
    }

    pub fn finish(self) {
        if self.enabled {
            let _ = self.term.show_cursor();
            let _ = self.term.write_str(&format!("\r{:<70}\r", ""));
        }
    }
}
