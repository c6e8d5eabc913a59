use anyhow::Result;
use console::style;
use log::info;

use super::{ChecklistItem, Prompter};

/// Non-interactive answers for `--batch`: yes to every question, defaults everywhere else.
pub struct BatchPrompter;

impl BatchPrompter {
    pub fn new() -> Self {
        Self
    }
}

impl Prompter for BatchPrompter {
    fn choose(&mut self, prompt: &str, options: &[&str], default: usize) -> Result<Option<usize>> {
        let choice = default.min(options.len().saturating_sub(1));
        info!("[batch] {} -> {}", prompt, options.get(choice).unwrap_or(&"-"));
        Ok((!options.is_empty()).then_some(choice))
    }

    fn checklist(&mut self, prompt: &str, items: &[ChecklistItem]) -> Result<Option<Vec<usize>>> {
        let selected: Vec<usize> = items
            .iter()
            .enumerate()
            .filter(|(_, item)| item.checked)
            .map(|(i, _)| i)
            .collect();
        let labels: Vec<&str> = selected.iter().map(|&i| items[i].label.as_str()).collect();
        info!("[batch] {} -> {}", prompt, labels.join(", "));
        Ok(Some(selected))
    }

    fn confirm(&mut self, prompt: &str, _default: bool) -> Result<bool> {
        info!("[batch] {} -> yes", prompt);
        Ok(true)
    }

    fn prompt_text(&mut self, prompt: &str, default: Option<&str>) -> Result<Option<String>> {
        info!("[batch] {} -> {}", prompt, default.unwrap_or("<none>"));
        Ok(default.map(str::to_string))
    }

    fn show_message(&mut self, title: &str, body: &str) -> Result<()> {
        println!();
        println!("  {}", style(title).bold());
        for line in body.lines() {
            println!("  {}", line);
        }
        Ok(())
    }
}
