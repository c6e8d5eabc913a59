use anyhow::Result;
use console::style;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, MultiSelect, Select};

use super::{ChecklistItem, Prompter};

/// In-terminal menus and checklists.
pub struct RichPrompter {
    theme: ColorfulTheme,
}

impl RichPrompter {
    pub fn new() -> Self {
        let theme = ColorfulTheme {
            checked_item_prefix: style("● ".to_string()).green(),
            unchecked_item_prefix: style("◦ ".to_string()).dim(),
            success_prefix: style("● ".to_string()).green(),
            ..ColorfulTheme::default()
        };
        Self { theme }
    }

    fn max_rows() -> usize {
        console::Term::stderr()
            .size_checked()
            .map(|(rows, _)| (rows as usize).saturating_sub(6))
            .unwrap_or(0)
            .max(8)
    }
}

impl Prompter for RichPrompter {
    fn choose(&mut self, prompt: &str, options: &[&str], default: usize) -> Result<Option<usize>> {
        let choice = Select::with_theme(&self.theme)
            .with_prompt(prompt)
            .items(options)
            .default(default)
            .interact_opt()?;
        Ok(choice)
    }

    fn checklist(&mut self, prompt: &str, items: &[ChecklistItem]) -> Result<Option<Vec<usize>>> {
        let width = items.iter().map(|i| i.label.len()).max().unwrap_or(0);
        let labels: Vec<String> = items
            .iter()
            .map(|item| {
                format!(
                    "{}  {}",
                    style(format!("{:<width$}", item.label)).bold().force_styling(true),
                    style(&item.description).dim().force_styling(true),
                )
            })
            .collect();
        let defaults: Vec<bool> = items.iter().map(|i| i.checked).collect();

        eprintln!(
            "  {}",
            style("↑/↓ navigate, Space toggle, a all, Enter confirm, Esc cancel").dim()
        );

        let selections = MultiSelect::with_theme(&self.theme)
            .with_prompt(prompt)
            .items(&labels)
            .defaults(&defaults)
            .max_length(Self::max_rows())
            .interact_opt()?;
        Ok(selections)
    }

    fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool> {
        let answer = Confirm::with_theme(&self.theme)
            .with_prompt(prompt)
            .default(default)
            .interact_opt()?;
        Ok(answer.unwrap_or(false))
    }

    fn prompt_text(&mut self, prompt: &str, default: Option<&str>) -> Result<Option<String>> {
        let mut input = Input::<String>::with_theme(&self.theme)
            .with_prompt(prompt)
            .allow_empty(true);
        if let Some(default) = default {
            input = input.default(default.to_string());
        }
        let value = input.interact_text()?;
        Ok(text_answer(value, default))
    }

    fn show_message(&mut self, title: &str, body: &str) -> Result<()> {
        println!();
        println!("  {}", style(title).bold());
        for line in body.lines() {
            println!("  {}", line);
        }
        println!();
        Ok(())
    }
}

/// dialoguer's line input has no cancel key, so an empty answer to a question without a
/// default cancels it.
fn text_answer(value: String, default: Option<&str>) -> Option<String> {
    if default.is_none() && value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}
