//! TOML form parser.
//!
//! Loads form definitions and gesture scripts from TOML files and
//! directories, and validates forms for authoring mistakes.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::bucket::UNASSIGNED_POOL;
use crate::cloze::Token;
use crate::model::{
    CategorizeQuestion, ClozeQuestion, ComprehensionQuestion, Form, Question, QuestionKind,
};
use crate::normalize::RawOption;
use crate::session::Gesture;

/// Intermediate TOML structure for parsing form files.
#[derive(Debug, Deserialize)]
struct TomlFormFile {
    form: TomlFormHeader,
    #[serde(default)]
    questions: Vec<TomlQuestion>,
}

#[derive(Debug, Deserialize)]
struct TomlFormHeader {
    #[serde(default)]
    id: Option<String>,
    title: String,
    #[serde(default)]
    header_image: Option<String>,
}

/// Union of every question type's fields; `type` picks which ones apply.
#[derive(Debug, Deserialize)]
struct TomlQuestion {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    question_text: String,
    #[serde(default)]
    question_image: Option<String>,
    #[serde(default)]
    options: Vec<RawOption>,
    #[serde(default)]
    categories: Vec<String>,
    #[serde(default)]
    underlined: Vec<String>,
    #[serde(default)]
    passage_title: String,
    #[serde(default)]
    passage: String,
}

#[derive(Debug, Deserialize)]
struct TomlGestureFile {
    #[serde(default)]
    gestures: Vec<Gesture>,
}

/// Parse a single TOML file into a `Form`.
pub fn parse_form(path: &Path) -> Result<Form> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read form file: {}", path.display()))?;

    parse_form_str(&content, path)
}

/// Parse a TOML string into a `Form` (useful for testing).
pub fn parse_form_str(content: &str, source_path: &Path) -> Result<Form> {
    let parsed: TomlFormFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let questions = parsed
        .questions
        .into_iter()
        .enumerate()
        .map(|(position, q)| {
            convert_question(q).with_context(|| format!("question {}", position + 1))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Form {
        id: parsed.form.id,
        title: parsed.form.title,
        header_image: parsed.form.header_image,
        questions,
    })
}

fn convert_question(q: TomlQuestion) -> Result<Question> {
    let kind: QuestionKind = q.kind.parse().map_err(|e: String| anyhow::anyhow!("{}", e))?;

    let question = match kind {
        QuestionKind::Categorize => Question::Categorize(CategorizeQuestion {
            question_text: q.question_text,
            question_image: q.question_image,
            options: q.options,
            categories: q.categories,
        }),
        QuestionKind::Cloze => {
            let underlined = q
                .underlined
                .iter()
                .map(|key| key.parse::<Token>())
                .collect::<Result<Vec<_>, _>>()?;
            let cloze = ClozeQuestion {
                question_text: q.question_text,
                question_image: q.question_image,
                underlined,
            };
            cloze.check_tokens()?;
            Question::Cloze(cloze)
        }
        QuestionKind::Comprehension => {
            let options = q
                .options
                .into_iter()
                .map(|opt| match opt {
                    RawOption::Bare(text) => Ok(text),
                    RawOption::Identified(item) => anyhow::bail!(
                        "comprehension options must be plain strings, found id '{}'",
                        item.id
                    ),
                })
                .collect::<Result<Vec<_>>>()?;
            Question::Comprehension(ComprehensionQuestion {
                passage_title: q.passage_title,
                passage: q.passage,
                question_text: q.question_text,
                question_image: q.question_image,
                options,
            })
        }
    };
    Ok(question)
}

/// Recursively load all `.toml` form files from a directory.
pub fn load_form_directory(dir: &Path) -> Result<Vec<Form>> {
    let mut forms = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            forms.extend(load_form_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_form(&path) {
                Ok(form) => forms.push(form),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(forms)
}

/// Load a gesture script (`[[gestures]]` entries) from a TOML file.
pub fn load_gestures(path: &Path) -> Result<Vec<Gesture>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read gesture file: {}", path.display()))?;

    parse_gestures_str(&content, path)
}

pub fn parse_gestures_str(content: &str, source_path: &Path) -> Result<Vec<Gesture>> {
    let parsed: TomlGestureFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;
    Ok(parsed.gestures)
}

/// A warning from form validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// Zero-based question position (if applicable).
    pub question: Option<usize>,
    /// Warning message.
    pub message: String,
}

impl ValidationWarning {
    fn form(message: impl Into<String>) -> Self {
        Self {
            question: None,
            message: message.into(),
        }
    }

    fn question(position: usize, message: impl Into<String>) -> Self {
        Self {
            question: Some(position),
            message: message.into(),
        }
    }
}

/// Validate a form for common authoring issues.
pub fn validate_form(form: &Form) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if form.title.trim().is_empty() {
        warnings.push(ValidationWarning::form("title is empty"));
    }
    if form.questions.is_empty() {
        warnings.push(ValidationWarning::form("form has no questions"));
    }

    for (pos, question) in form.questions.iter().enumerate() {
        if question.question_text().trim().is_empty() {
            warnings.push(ValidationWarning::question(
                pos,
                "question text is empty and will be dropped on save",
            ));
        }

        match question {
            Question::Categorize(q) => validate_categorize(pos, q, &mut warnings),
            Question::Cloze(q) => {
                if q.underlined.is_empty() {
                    warnings.push(ValidationWarning::question(pos, "no words are underlined"));
                }
                let mut seen = HashSet::new();
                for token in &q.underlined {
                    if !seen.insert(token.index) {
                        warnings.push(ValidationWarning::question(
                            pos,
                            format!("word at position {} underlined twice", token.index),
                        ));
                    }
                }
            }
            Question::Comprehension(q) => {
                if q.options.len() < 2 {
                    warnings.push(ValidationWarning::question(
                        pos,
                        format!("only {} option(s), expected at least 2", q.options.len()),
                    ));
                }
                if q.passage.trim().is_empty() {
                    warnings.push(ValidationWarning::question(pos, "passage is empty"));
                }
            }
        }
    }

    warnings
}

fn validate_categorize(pos: usize, q: &CategorizeQuestion, warnings: &mut Vec<ValidationWarning>) {
    if q.options.is_empty() {
        warnings.push(ValidationWarning::question(pos, "no options to categorize"));
    }
    if q.categories.iter().all(|c| c.trim().is_empty()) {
        warnings.push(ValidationWarning::question(pos, "no categories"));
    }

    let mut seen = HashSet::new();
    for category in &q.categories {
        let name = category.trim();
        if name.is_empty() {
            continue;
        }
        if name == UNASSIGNED_POOL {
            warnings.push(ValidationWarning::question(
                pos,
                format!("category name '{UNASSIGNED_POOL}' is reserved and will be ignored"),
            ));
        } else if !seen.insert(name) {
            warnings.push(ValidationWarning::question(
                pos,
                format!("duplicate category: {name}"),
            ));
        }
    }

    let mut ids = HashSet::new();
    for opt in &q.options {
        if let RawOption::Identified(item) = opt {
            if !ids.insert(item.id.as_str()) {
                warnings.push(ValidationWarning::question(
                    pos,
                    format!("duplicate option id: {}", item.id),
                ));
            }
        }
    }
}
