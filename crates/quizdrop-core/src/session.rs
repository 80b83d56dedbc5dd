//! Answering session: one placement state per question, driven by gestures.
//!
//! The session owns every question's state and pushes the full current
//! answer to an [`AnswerSink`] after each successful mutation. It never
//! reads answers back from the sink.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::bucket::BucketReconciler;
use crate::choice::ChoiceSelection;
use crate::cloze::BlankReconciler;
use crate::error::SessionError;
use crate::model::{Form, Question, QuestionKind};
use crate::normalize::IdSource;
use crate::placement::{DragEnd, DragLocation};
use crate::response::{Answer, FormResponse};

/// A discrete user action delivered to a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Gesture {
    /// A drag ended on a categorize or cloze question.
    Drag {
        question: usize,
        source: DragLocation,
        #[serde(default)]
        destination: Option<DragLocation>,
    },
    /// A comprehension option was ticked or unticked.
    Toggle { question: usize, option: String },
}

impl Gesture {
    pub fn question(&self) -> usize {
        match self {
            Gesture::Drag { question, .. } | Gesture::Toggle { question, .. } => *question,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Gesture::Drag { .. } => "drag",
            Gesture::Toggle { .. } => "toggle",
        }
    }
}

/// Receives every answer the session produces.
pub trait AnswerSink {
    fn on_answer(&self, question: usize, answer: &Answer);
}

/// Sink that discards answers.
pub struct NoopSink;

impl AnswerSink for NoopSink {
    fn on_answer(&self, _: usize, _: &Answer) {}
}

/// Live state of one question.
#[derive(Debug, Clone)]
pub enum QuestionState {
    Buckets(BucketReconciler),
    Blanks(BlankReconciler),
    Choices(ChoiceSelection),
}

impl QuestionState {
    pub fn for_question(question: &Question, ids: &mut dyn IdSource) -> Self {
        match question {
            Question::Categorize(q) => QuestionState::Buckets(BucketReconciler::for_question(q, ids)),
            Question::Cloze(q) => QuestionState::Blanks(BlankReconciler::new(q)),
            Question::Comprehension(q) => QuestionState::Choices(ChoiceSelection::new(q)),
        }
    }

    pub fn kind(&self) -> QuestionKind {
        match self {
            QuestionState::Buckets(_) => QuestionKind::Categorize,
            QuestionState::Blanks(_) => QuestionKind::Cloze,
            QuestionState::Choices(_) => QuestionKind::Comprehension,
        }
    }

    pub fn answer(&self) -> Answer {
        match self {
            QuestionState::Buckets(b) => Answer::Buckets(b.snapshot()),
            QuestionState::Blanks(b) => Answer::Blanks(b.snapshot()),
            QuestionState::Choices(c) => Answer::Choices(c.selected().to_vec()),
        }
    }

    /// Bring the state in line with a (possibly edited) question. Returns
    /// whether the state was reset.
    fn sync(&mut self, question: &Question, ids: &mut dyn IdSource) -> bool {
        match (self, question) {
            (QuestionState::Buckets(b), Question::Categorize(q)) => b.sync_question(q, ids),
            (QuestionState::Blanks(b), Question::Cloze(q)) => b.sync_definition(q),
            (QuestionState::Choices(c), Question::Comprehension(q)) => c.sync_definition(q),
            (state, question) => {
                *state = QuestionState::for_question(question, ids);
                true
            }
        }
    }
}

/// Answers a whole form, one gesture at a time.
pub struct FormSession {
    form: Form,
    states: Vec<QuestionState>,
    answers: BTreeMap<usize, Answer>,
}

impl FormSession {
    pub fn new(form: Form, ids: &mut dyn IdSource) -> Self {
        let states = form
            .questions
            .iter()
            .map(|q| QuestionState::for_question(q, ids))
            .collect();
        Self {
            form,
            states,
            answers: BTreeMap::new(),
        }
    }

    pub fn form(&self) -> &Form {
        &self.form
    }

    pub fn state(&self, question: usize) -> Option<&QuestionState> {
        self.states.get(question)
    }

    pub fn answers(&self) -> &BTreeMap<usize, Answer> {
        &self.answers
    }

    /// Apply one gesture. Returns whether the question's answer changed;
    /// when it did, the new answer has been pushed to `sink`.
    pub fn apply(&mut self, gesture: &Gesture, sink: &dyn AnswerSink) -> Result<bool, SessionError> {
        let question = gesture.question();
        let state = self
            .states
            .get_mut(question)
            .ok_or(SessionError::UnknownQuestion(question))?;

        let changed = match (&mut *state, gesture) {
            (
                QuestionState::Buckets(buckets),
                Gesture::Drag {
                    source,
                    destination,
                    ..
                },
            ) => buckets.apply(&drag_end(source, destination)),
            (
                QuestionState::Blanks(blanks),
                Gesture::Drag {
                    source,
                    destination,
                    ..
                },
            ) => blanks.apply(&drag_end(source, destination)),
            (QuestionState::Choices(choices), Gesture::Toggle { option, .. }) => {
                choices.toggle(option)
            }
            (state, gesture) => {
                return Err(SessionError::GestureMismatch {
                    question,
                    kind: state.kind().to_string(),
                    gesture: gesture.name(),
                })
            }
        };

        if changed {
            let answer = state.answer();
            tracing::debug!(question, answer = %answer.summary(), "answer updated");
            sink.on_answer(question, &answer);
            self.answers.insert(question, answer);
        }
        Ok(changed)
    }

    /// Replace the form definition. Questions whose definition changed are
    /// reset and lose their recorded answer; untouched questions keep theirs.
    pub fn update_form(&mut self, form: Form, ids: &mut dyn IdSource) {
        self.states.truncate(form.questions.len());
        self.answers.retain(|q, _| *q < form.questions.len());
        for (idx, question) in form.questions.iter().enumerate() {
            match self.states.get_mut(idx) {
                Some(state) => {
                    if state.sync(question, ids) {
                        self.answers.remove(&idx);
                    }
                }
                None => self.states.push(QuestionState::for_question(question, ids)),
            }
        }
        self.form = form;
    }

    /// Positions of questions without an acceptable answer.
    pub fn unanswered(&self) -> Vec<usize> {
        (0..self.states.len())
            .filter(|q| !self.answers.get(q).is_some_and(Answer::is_complete))
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.unanswered().is_empty()
    }

    /// Bundle the answers for submission.
    pub fn to_response(&self) -> Result<FormResponse, SessionError> {
        let form_id = self.form.id.clone().ok_or(SessionError::MissingFormId)?;
        let unanswered = self.unanswered();
        if !unanswered.is_empty() {
            return Err(SessionError::Incomplete { unanswered });
        }
        Ok(FormResponse::new(form_id, self.answers.clone()))
    }

    /// Start over with every question pristine.
    pub fn reset(&mut self, ids: &mut dyn IdSource) {
        self.states = self
            .form
            .questions
            .iter()
            .map(|q| QuestionState::for_question(q, ids))
            .collect();
        self.answers.clear();
    }
}

fn drag_end(source: &DragLocation, destination: &Option<DragLocation>) -> DragEnd {
    DragEnd {
        source: source.clone(),
        destination: destination.clone(),
    }
}
