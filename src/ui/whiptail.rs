use anyhow::{Context, Result};
use log::debug;
use std::process::{Command, Stdio};

use super::{ChecklistItem, Prompter};

const TITLE: &str = "sfm setup";
const HEIGHT: &str = "20";
const WIDTH: &str = "76";
const LIST_HEIGHT: &str = "10";

/// Dialogs drawn by an external `whiptail` or `dialog` binary.
///
/// Both programs draw on the terminal and report the answer on stderr; exit status 0 is
/// OK/Yes, 1 is Cancel/No and 255 is Esc.
pub struct WhiptailPrompter {
    program: &'static str,
}

struct DialogResult {
    accepted: bool,
    answer: String,
}

impl WhiptailPrompter {
    pub fn new(program: &'static str) -> Self {
        Self { program }
    }

    fn run(&self, args: &[String]) -> Result<DialogResult> {
        debug!("{} {}", self.program, args.join(" "));
        let output = Command::new(self.program)
            .arg("--title")
            .arg(TITLE)
            .args(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::piped())
            .output()
            .with_context(|| format!("Failed to run {}", self.program))?;

        Ok(DialogResult {
            accepted: output.status.success(),
            answer: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

fn owned(args: &[&str]) -> Vec<String> {
    args.iter().map(|a| a.to_string()).collect()
}

/// Parse checklist output: one tag per line with `--separate-output`, or a space
/// separated list of quoted tags without it.
fn parse_checklist_output(answer: &str, items: &[ChecklistItem]) -> Vec<usize> {
    let tags: Vec<&str> = if answer.contains('\n') {
        answer.lines().collect()
    } else {
        answer.split_whitespace().collect()
    };

    let mut selected: Vec<usize> = tags
        .into_iter()
        .map(|t| t.trim().trim_matches('"'))
        .filter_map(|tag| items.iter().position(|item| item.label == tag))
        .collect();
    selected.sort_unstable();
    selected.dedup();
    selected
}

impl Prompter for WhiptailPrompter {
    fn choose(&mut self, prompt: &str, options: &[&str], default: usize) -> Result<Option<usize>> {
        let default_tag = (default + 1).to_string();
        let mut args = owned(&["--default-item", &default_tag, "--menu", prompt, HEIGHT, WIDTH, LIST_HEIGHT]);
        for (i, option) in options.iter().enumerate() {
            args.push((i + 1).to_string());
            args.push(option.to_string());
        }

        let result = self.run(&args)?;
        if !result.accepted {
            return Ok(None);
        }
        Ok(result
            .answer
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .filter(|&i| i < options.len()))
    }

    fn checklist(&mut self, prompt: &str, items: &[ChecklistItem]) -> Result<Option<Vec<usize>>> {
        let mut args = owned(&["--separate-output", "--checklist", prompt, HEIGHT, WIDTH, LIST_HEIGHT]);
        for item in items {
            args.push(item.label.clone());
            args.push(item.description.clone());
            args.push(if item.checked { "ON" } else { "OFF" }.to_string());
        }

        let result = self.run(&args)?;
        if !result.accepted {
            return Ok(None);
        }
        Ok(Some(parse_checklist_output(&result.answer, items)))
    }

    fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool> {
        let mut args = Vec::new();
        if !default {
            args.push("--defaultno".to_string());
        }
        args.extend(owned(&["--yesno", prompt, HEIGHT, WIDTH]));
        Ok(self.run(&args)?.accepted)
    }

    fn prompt_text(&mut self, prompt: &str, default: Option<&str>) -> Result<Option<String>> {
        let args = owned(&["--inputbox", prompt, HEIGHT, WIDTH, default.unwrap_or("")]);
        let result = self.run(&args)?;
        Ok(result.accepted.then_some(result.answer))
    }

    fn show_message(&mut self, title: &str, body: &str) -> Result<()> {
        let text = format!("{}\n\n{}", title, body);
        self.run(&owned(&["--msgbox", &text, HEIGHT, WIDTH]))?;
        Ok(())
    }
}
