use anyhow::Result;
use console::style;
use std::io::{BufRead, Write};

use super::{ChecklistItem, Prompter};

/// Numbered line prompts for terminals without cursor control.
///
/// End of input counts as cancel.
pub struct PlainPrompter<R: BufRead> {
    input: R,
}

impl<R: BufRead> PlainPrompter<R> {
    pub fn new(input: R) -> Self {
        Self { input }
    }

    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        eprint!("{} ", prompt);
        std::io::stderr().flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            eprintln!();
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}

/// Parse a 1-based menu answer. Empty keeps the default.
fn parse_choice(answer: &str, len: usize, default: usize) -> Option<usize> {
    let answer = answer.trim();
    if answer.is_empty() {
        return (default < len).then_some(default);
    }
    answer
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .filter(|&i| i < len)
}

/// Parse a checklist answer: numbers separated by commas or spaces, `all`, `none`,
/// or empty to keep the pre-checked items. `None` means the answer is malformed.
fn parse_selection(answer: &str, items: &[ChecklistItem]) -> Option<Vec<usize>> {
    let answer = answer.trim();
    match answer.to_lowercase().as_str() {
        "" => {
            return Some(
                items
                    .iter()
                    .enumerate()
                    .filter(|(_, item)| item.checked)
                    .map(|(i, _)| i)
                    .collect(),
            );
        }
        "all" => return Some((0..items.len()).collect()),
        "none" => return Some(Vec::new()),
        _ => {}
    }

    let mut selected = Vec::new();
    for token in answer.split([',', ' ']).filter(|t| !t.is_empty()) {
        let index = token.parse::<usize>().ok()?.checked_sub(1)?;
        if index >= items.len() {
            return None;
        }
        selected.push(index);
    }
    selected.sort_unstable();
    selected.dedup();
    Some(selected)
}

fn parse_yes_no(answer: &str, default: bool) -> Option<bool> {
    match answer.trim().to_lowercase().as_str() {
        "" => Some(default),
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}

impl<R: BufRead> Prompter for PlainPrompter<R> {
    fn choose(&mut self, prompt: &str, options: &[&str], default: usize) -> Result<Option<usize>> {
        eprintln!("{}", style(prompt).bold());
        for (i, option) in options.iter().enumerate() {
            let marker = if i == default { "*" } else { " " };
            eprintln!("  {}{}) {}", marker, i + 1, option);
        }
        loop {
            let Some(answer) = self.read_line(&format!("Choice [{}]:", default + 1))? else {
                return Ok(None);
            };
            match parse_choice(&answer, options.len(), default) {
                Some(choice) => return Ok(Some(choice)),
                None => eprintln!("  Enter a number between 1 and {}", options.len()),
            }
        }
    }

    fn checklist(&mut self, prompt: &str, items: &[ChecklistItem]) -> Result<Option<Vec<usize>>> {
        eprintln!("{}", style(prompt).bold());
        let width = items.iter().map(|i| i.label.len()).max().unwrap_or(0);
        for (i, item) in items.iter().enumerate() {
            let mark = if item.checked { "x" } else { " " };
            eprintln!(
                "  [{}] {:>2}) {:<width$}  {}",
                mark,
                i + 1,
                item.label,
                style(&item.description).dim(),
            );
        }
        loop {
            let Some(answer) = self.read_line("Numbers (e.g. 1,3), all, none, Enter keeps [x]:")?
            else {
                return Ok(None);
            };
            match parse_selection(&answer, items) {
                Some(selected) => return Ok(Some(selected)),
                None => eprintln!("  Unrecognized selection: {}", answer),
            }
        }
    }

    fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool> {
        let hint = if default { "[Y/n]" } else { "[y/N]" };
        loop {
            let Some(answer) = self.read_line(&format!("{} {}", prompt, hint))? else {
                return Ok(false);
            };
            match parse_yes_no(&answer, default) {
                Some(yes) => return Ok(yes),
                None => eprintln!("  Please answer y or n"),
            }
        }
    }

    fn prompt_text(&mut self, prompt: &str, default: Option<&str>) -> Result<Option<String>> {
        let label = match default {
            Some(default) => format!("{} [{}]:", prompt, default),
            None => format!("{}:", prompt),
        };
        let Some(answer) = self.read_line(&label)? else {
            return Ok(None);
        };
        if answer.is_empty() {
            return Ok(Some(default.unwrap_or("").to_string()));
        }
        Ok(Some(answer))
    }

    fn show_message(&mut self, title: &str, body: &str) -> Result<()> {
        println!();
        println!("{}", style(title).bold());
        println!("{}", body);
        Ok(())
    }
}
