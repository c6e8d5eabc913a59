//! Scripted prompter for unit tests.

use anyhow::Result;
use std::collections::VecDeque;

use super::{ChecklistItem, Prompter};

#[derive(Debug)]
enum Answer {
    Confirm(Option<bool>),
    Choose(Option<usize>),
    Checklist(Option<Vec<usize>>),
    Text(Option<String>),
}

/// Replays queued answers in order and records what was asked.
///
/// Panics when the session asks a question the script did not expect.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<Answer>,
    pub prompts: Vec<String>,
    pub messages: Vec<(String, String)>,
}

impl ScriptedPrompter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn confirm(mut self, yes: bool) -> Self {
        self.answers.push_back(Answer::Confirm(Some(yes)));
        self
    }

    /// Accept whatever default the question offers.
    pub fn confirm_default(mut self) -> Self {
        self.answers.push_back(Answer::Confirm(None));
        self
    }

    pub fn choose(mut self, choice: Option<usize>) -> Self {
        self.answers.push_back(Answer::Choose(choice));
        self
    }

    pub fn checklist(mut self, selected: Option<Vec<usize>>) -> Self {
        self.answers.push_back(Answer::Checklist(selected));
        self
    }

    pub fn text(mut self, value: Option<&str>) -> Self {
        self.answers.push_back(Answer::Text(value.map(str::to_string)));
        self
    }

    pub fn is_exhausted(&self) -> bool {
        self.answers.is_empty()
    }

    fn next(&mut self, prompt: &str) -> Answer {
        self.prompts.push(prompt.to_string());
        match self.answers.pop_front() {
            Some(answer) => answer,
            None => panic!("unexpected prompt: {}", prompt),
        }
    }
}

impl Prompter for ScriptedPrompter {
    fn choose(&mut self, prompt: &str, _options: &[&str], _default: usize) -> Result<Option<usize>> {
        match self.next(prompt) {
            Answer::Choose(choice) => Ok(choice),
            other => panic!("expected choose for {:?}, scripted {:?}", prompt, other),
        }
    }

    fn checklist(&mut self, prompt: &str, _items: &[ChecklistItem]) -> Result<Option<Vec<usize>>> {
        match self.next(prompt) {
            Answer::Checklist(selected) => Ok(selected),
            other => panic!("expected checklist for {:?}, scripted {:?}", prompt, other),
        }
    }

    fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool> {
        match self.next(prompt) {
            Answer::Confirm(answer) => Ok(answer.unwrap_or(default)),
            other => panic!("expected confirm for {:?}, scripted {:?}", prompt, other),
        }
    }

    fn prompt_text(&mut self, prompt: &str, _default: Option<&str>) -> Result<Option<String>> {
        match self.next(prompt) {
            Answer::Text(value) => Ok(value),
            other => panic!("expected text for {:?}, scripted {:?}", prompt, other),
        }
    }

    fn show_message(&mut self, title: &str, body: &str) -> Result<()> {
        self.messages.push((title.to_string(), body.to_string()));
        Ok(())
    }
}
