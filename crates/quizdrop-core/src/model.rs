//! Core data model types for quizdrop.
//!
//! A [`Form`] is a titled list of questions. Three question types exist:
//! bucket categorization, cloze, and reading comprehension with multiple
//! choice.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::cloze::{sentence_words, token_universe, Token};
use crate::error::FormError;
use crate::normalize::RawOption;

/// A quiz form as authored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Form {
    /// Server-assigned identifier, absent until the form is saved.
    #[serde(default, alias = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Human-readable title.
    pub title: String,
    /// Optional banner image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header_image: Option<String>,
    /// Questions in display order.
    #[serde(default)]
    pub questions: Vec<Question>,
}

impl Form {
    /// Trim the title and drop questions without text, as the builder does
    /// before saving.
    pub fn prepare_for_save(&self) -> Result<Form, FormError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(FormError::EmptyTitle);
        }

        let questions: Vec<Question> = self
            .questions
            .iter()
            .filter(|q| !q.question_text().trim().is_empty())
            .cloned()
            .collect();
        if questions.is_empty() {
            return Err(FormError::NoQuestions);
        }

        Ok(Form {
            id: self.id.clone(),
            title: title.to_string(),
            header_image: self
                .header_image
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            questions,
        })
    }
}

/// One question of a form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Question {
    Categorize(CategorizeQuestion),
    Cloze(ClozeQuestion),
    Comprehension(ComprehensionQuestion),
}

impl Question {
    pub fn kind(&self) -> QuestionKind {
        match self {
            Question::Categorize(_) => QuestionKind::Categorize,
            Question::Cloze(_) => QuestionKind::Cloze,
            Question::Comprehension(_) => QuestionKind::Comprehension,
        }
    }

    pub fn question_text(&self) -> &str {
        match self {
            Question::Categorize(q) => &q.question_text,
            Question::Cloze(q) => &q.question_text,
            Question::Comprehension(q) => &q.question_text,
        }
    }
}

/// Drag option images into category buckets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorizeQuestion {
    #[serde(default)]
    pub question_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_image: Option<String>,
    /// Option payloads, bare or already identified.
    #[serde(default)]
    pub options: Vec<RawOption>,
    /// Bucket names.
    #[serde(default)]
    pub categories: Vec<String>,
}

/// Drag underlined words back into the sentence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClozeQuestion {
    /// The full sentence.
    #[serde(default)]
    pub question_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_image: Option<String>,
    /// Underlined occurrences, keyed `word@index`.
    #[serde(default)]
    pub underlined: Vec<Token>,
}

impl ClozeQuestion {
    pub fn words(&self) -> Vec<&str> {
        sentence_words(&self.question_text)
    }

    /// The token universe: valid underlined tokens in sentence order.
    pub fn tokens(&self) -> Vec<Token> {
        token_universe(&self.question_text, &self.underlined)
    }

    /// Check that every underlined token names the word at its position.
    pub fn check_tokens(&self) -> Result<(), FormError> {
        let words = self.words();
        for token in &self.underlined {
            match words.get(token.index) {
                None => return Err(FormError::TokenOutOfRange(token.to_string())),
                Some(word) if *word != token.word => {
                    return Err(FormError::TokenMismatch {
                        token: token.to_string(),
                        found: word.to_string(),
                    })
                }
                Some(_) => {}
            }
        }
        Ok(())
    }
}

/// Read a passage, then pick one or more options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComprehensionQuestion {
    #[serde(default)]
    pub passage_title: String,
    #[serde(default)]
    pub passage: String,
    #[serde(default)]
    pub question_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_image: Option<String>,
    #[serde(default)]
    pub options: Vec<String>,
}

/// Supported question types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionKind {
    Categorize,
    Cloze,
    Comprehension,
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionKind::Categorize => write!(f, "categorize"),
            QuestionKind::Cloze => write!(f, "cloze"),
            QuestionKind::Comprehension => write!(f, "comprehension"),
        }
    }
}

impl FromStr for QuestionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "categorize" | "categorise" => Ok(QuestionKind::Categorize),
            "cloze" | "fill-in" => Ok(QuestionKind::Cloze),
            "comprehension" => Ok(QuestionKind::Comprehension),
            other => Err(format!("unknown question type: {other}")),
        }
    }
}
