//! Per-question answers and the submitted form response, with JSON
//! persistence.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::bucket::UNASSIGNED_POOL;
use crate::cloze::{Token, OPTIONS_POOL};
use crate::normalize::OptionId;
use crate::placement::PlacementSnapshot;

/// The current answer of one question, as pushed to the parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Answer {
    /// Full bucket placement, `"unassigned"` included.
    Buckets(PlacementSnapshot<OptionId>),
    /// Full blank placement, the `"options"` pool included.
    Blanks(PlacementSnapshot<Token>),
    /// Ticked comprehension options.
    Choices(Vec<String>),
}

impl Answer {
    /// Whether this answer is acceptable for submission.
    ///
    /// Every blank must hold a token and at least one choice must be ticked.
    /// Bucket placements are always acceptable once recorded.
    pub fn is_complete(&self) -> bool {
        match self {
            Answer::Buckets(_) => true,
            Answer::Blanks(snapshot) => snapshot
                .iter()
                .filter(|(key, _)| *key != OPTIONS_POOL)
                .all(|(_, items)| items.len() == 1),
            Answer::Choices(selected) => !selected.is_empty(),
        }
    }

    /// One-line human summary.
    pub fn summary(&self) -> String {
        match self {
            Answer::Buckets(snapshot) => snapshot
                .iter()
                .filter(|(key, _)| *key != UNASSIGNED_POOL)
                .map(|(key, items)| format!("{key}: {}", join(items)))
                .collect::<Vec<_>>()
                .join("; "),
            Answer::Blanks(snapshot) => snapshot
                .iter()
                .filter(|(key, _)| *key != OPTIONS_POOL)
                .map(|(key, items)| match items.first() {
                    Some(token) => format!("{key} <- {}", token.word),
                    None => format!("{key} <- _"),
                })
                .collect::<Vec<_>>()
                .join("; "),
            Answer::Choices(selected) => selected.join(", "),
        }
    }
}

fn join<T: std::fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// A bundle of per-question answers ready to be sent to the form API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormResponse {
    /// Unique response identifier.
    pub id: Uuid,
    /// The form this responds to.
    pub form_id: String,
    /// Answers keyed by question position.
    pub answers: BTreeMap<usize, Answer>,
    /// When the response was bundled.
    pub submitted_at: DateTime<Utc>,
}

impl FormResponse {
    pub fn new(form_id: impl Into<String>, answers: BTreeMap<usize, Answer>) -> Self {
        Self {
            id: Uuid::new_v4(),
            form_id: form_id.into(),
            answers,
            submitted_at: Utc::now(),
        }
    }

    /// Save the response as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize response")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write response to {}", path.display()))?;
        Ok(())
    }

    /// Load a response from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read response from {}", path.display()))?;
        let response: FormResponse =
            serde_json::from_str(&content).context("failed to parse response JSON")?;
        Ok(response)
    }

    /// Format the answers as a markdown table.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();
        md.push_str(&format!("**Form:** {}\n\n", self.form_id));
        md.push_str("| # | Type | Answer |\n");
        md.push_str("|---|------|--------|\n");
        for (question, answer) in &self.answers {
            let kind = match answer {
                Answer::Buckets(_) => "categorize",
                Answer::Blanks(_) => "cloze",
                Answer::Choices(_) => "comprehension",
            };
            md.push_str(&format!(
                "| {} | {} | {} |\n",
                question + 1,
                kind,
                answer.summary()
            ));
        }
        md
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blanks(entries: Vec<(&str, Vec<Token>)>) -> Answer {
        Answer::Blanks(PlacementSnapshot(
            entries
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        ))
    }

    fn buckets() -> Answer {
        Answer::Buckets(PlacementSnapshot(vec![
            ("unassigned".into(), vec![OptionId::from("b")]),
            ("fruits".into(), vec![OptionId::from("a")]),
        ]))
    }

    #[test]
    fn blank_completeness() {
        let filled = blanks(vec![
            ("options", vec![]),
            ("cat@1", vec![Token::new("cat", 1)]),
        ]);
        assert!(filled.is_complete());

        let partial = blanks(vec![
            ("options", vec![Token::new("cat", 1)]),
            ("cat@1", vec![]),
        ]);
        assert!(!partial.is_complete());
    }

    #[test]
    fn choice_completeness() {
        assert!(Answer::Choices(vec!["a".into()]).is_complete());
        assert!(!Answer::Choices(vec![]).is_complete());
        assert!(buckets().is_complete());
    }

    #[test]
    fn summaries() {
        assert_eq!(buckets().summary(), "fruits: a");
        let b = blanks(vec![
            ("options", vec![]),
            ("the@0", vec![Token::new("cat", 1)]),
            ("cat@1", vec![]),
        ]);
        assert_eq!(b.summary(), "the@0 <- cat; cat@1 <- _");
    }

    #[test]
    fn answer_json_shape() {
        let json = serde_json::to_value(buckets()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "buckets",
                "value": {"unassigned": ["b"], "fruits": ["a"]}
            })
        );
    }

    #[test]
    fn json_roundtrip() {
        let mut answers = BTreeMap::new();
        answers.insert(0, buckets());
        answers.insert(2, Answer::Choices(vec!["sleep".into()]));
        let response = FormResponse::new("form-1", answers);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("response.json");
        response.save_json(&path).unwrap();
        let loaded = FormResponse::load_json(&path).unwrap();

        assert_eq!(loaded, response);
    }

    #[test]
    fn markdown_output() {
        let mut answers = BTreeMap::new();
        answers.insert(0, buckets());
        let md = FormResponse::new("form-1", answers).to_markdown();
        assert!(md.contains("form-1"));
        assert!(md.contains("| 1 | categorize | fruits: a |"));
    }
}
