//! Multiple-choice selection for comprehension questions.

use crate::model::ComprehensionQuestion;

/// Options the respondent has ticked, in the order they were ticked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChoiceSelection {
    options: Vec<String>,
    selected: Vec<String>,
}

impl ChoiceSelection {
    pub fn new(question: &ComprehensionQuestion) -> Self {
        Self {
            options: question.options.clone(),
            selected: Vec::new(),
        }
    }

    /// Tick or untick `option`. Unknown options are ignored; returns whether
    /// the selection changed.
    pub fn toggle(&mut self, option: &str) -> bool {
        if !self.options.iter().any(|o| o == option) {
            tracing::debug!(option, "ignoring toggle of unknown option");
            return false;
        }
        if let Some(pos) = self.selected.iter().position(|o| o == option) {
            self.selected.remove(pos);
        } else {
            self.selected.push(option.to_string());
        }
        true
    }

    /// Clear the selection if the option list changed.
    pub fn sync_definition(&mut self, question: &ComprehensionQuestion) -> bool {
        if question.options == self.options {
            return false;
        }
        *self = Self::new(question);
        true
    }

    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    pub fn is_selected(&self, option: &str) -> bool {
        self.selected.iter().any(|o| o == option)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question() -> ComprehensionQuestion {
        ComprehensionQuestion {
            passage_title: "Cats".into(),
            passage: "Cats sleep a lot.".into(),
            question_text: "What do cats do?".into(),
            question_image: None,
            options: vec!["sleep".into(), "fly".into(), "purr".into()],
        }
    }

    #[test]
    fn toggle_selects_and_deselects() {
        let mut choice = ChoiceSelection::new(&question());
        assert!(choice.toggle("purr"));
        assert!(choice.toggle("sleep"));
        assert_eq!(choice.selected(), &["purr".to_string(), "sleep".to_string()]);

        assert!(choice.toggle("purr"));
        assert!(!choice.is_selected("purr"));
        assert_eq!(choice.selected(), &["sleep".to_string()]);
    }

    #[test]
    fn option_change_clears_selection() {
        let mut q = question();
        let mut choice = ChoiceSelection::new(&q);
        choice.toggle("sleep");
        assert!(!choice.sync_definition(&q));
        assert!(choice.is_selected("sleep"));

        q.options.push("hunt".into());
        assert!(choice.sync_definition(&q));
        assert!(choice.selected().is_empty());
    }

    #[test]
    fn unknown_option_is_ignored() {
        let mut choice = ChoiceSelection::new(&question());
        assert!(!choice.toggle("swim"));
        assert!(choice.selected().is_empty());
    }
}
