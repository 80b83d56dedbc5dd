//! Cloze (fill-in-the-blank) tokens, the blank reconciler, and authoring.
//!
//! Every underlined word of the sentence becomes a [`Token`] keyed by the
//! word *and* its position, so the same word underlined twice yields two
//! independently draggable tokens. Each underlined position is also a blank
//! with capacity one; the `"options"` pool holds the tokens not yet placed.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FormError;
use crate::model::ClozeQuestion;
use crate::placement::{Capacity, DragEnd, PlacementSnapshot, PlacementStore};

/// Container key of the pool of unplaced tokens.
pub const OPTIONS_POOL: &str = "options";

/// One underlined occurrence of a word: `(word, position in the sentence)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Token {
    pub word: String,
    pub index: usize,
}

impl Token {
    pub fn new(word: impl Into<String>, index: usize) -> Self {
        Self {
            word: word.into(),
            index,
        }
    }

    /// Key of the blank this token was cut out of.
    pub fn blank_key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.word, self.index)
    }
}

impl FromStr for Token {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (word, index) = s
            .rsplit_once('@')
            .ok_or_else(|| FormError::InvalidToken(s.to_string()))?;
        let index = index
            .parse()
            .map_err(|_| FormError::InvalidToken(s.to_string()))?;
        if word.is_empty() {
            return Err(FormError::InvalidToken(s.to_string()));
        }
        Ok(Token::new(word, index))
    }
}

impl TryFrom<String> for Token {
    type Error = FormError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Token> for String {
    fn from(token: Token) -> Self {
        token.to_string()
    }
}

// Sentence order first; the word only breaks ties between malformed tokens.
impl Ord for Token {
    fn cmp(&self, other: &Self) -> Ordering {
        self.index
            .cmp(&other.index)
            .then_with(|| self.word.cmp(&other.word))
    }
}

impl PartialOrd for Token {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Split a sentence into the words that can be underlined.
pub fn sentence_words(text: &str) -> Vec<&str> {
    text.split_whitespace().collect()
}

/// Build the token universe: underlined tokens that match the sentence,
/// deduplicated, in sentence order.
pub fn token_universe(text: &str, underlined: &[Token]) -> Vec<Token> {
    let words = sentence_words(text);
    let mut seen = HashSet::new();
    let mut tokens: Vec<Token> = underlined
        .iter()
        .filter(|t| words.get(t.index).is_some_and(|w| *w == t.word))
        .filter(|t| seen.insert(t.index))
        .cloned()
        .collect();
    tokens.sort();
    tokens
}

/// Assigns cloze tokens to single-capacity blanks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlankReconciler {
    tokens: Vec<Token>,
    store: PlacementStore<Token>,
}

impl BlankReconciler {
    pub fn new(question: &ClozeQuestion) -> Self {
        Self::from_tokens(question.tokens())
    }

    /// Pristine state for an explicit universe: every token in the pool.
    pub fn from_tokens(mut tokens: Vec<Token>) -> Self {
        let mut seen = HashSet::new();
        tokens.retain(|t| seen.insert(t.clone()));
        let blanks: Vec<String> = tokens.iter().map(Token::blank_key).collect();
        let store = PlacementStore::new(OPTIONS_POOL, tokens.clone(), blanks, Capacity::Single);
        Self { tokens, store }
    }

    /// Reset if the question's token universe changed. Returns whether a
    /// reset happened.
    pub fn sync_definition(&mut self, question: &ClozeQuestion) -> bool {
        let tokens = question.tokens();
        if tokens == self.tokens {
            return false;
        }
        tracing::debug!(tokens = tokens.len(), "cloze definition changed, clearing blanks");
        *self = Self::from_tokens(tokens);
        true
    }

    /// Apply a gesture-end event. Returns whether the placement changed.
    pub fn apply(&mut self, mv: &DragEnd) -> bool {
        let next = self.store.reconcile(mv);
        if next == self.store {
            return false;
        }
        self.store = next;
        true
    }

    pub fn store(&self) -> &PlacementStore<Token> {
        &self.store
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn snapshot(&self) -> PlacementSnapshot<Token> {
        self.store.snapshot()
    }

    /// The token occupying blank `key`, if any.
    pub fn blank(&self, key: &str) -> Option<&Token> {
        if key == OPTIONS_POOL {
            return None;
        }
        self.store.container(key).and_then(|items| items.first())
    }

    /// Every blank with its occupant, in sentence order.
    pub fn assignments(&self) -> Vec<(&str, Option<&Token>)> {
        self.store
            .containers()
            .iter()
            .filter(|c| c.key() != OPTIONS_POOL)
            .map(|c| (c.key(), c.items().first()))
            .collect()
    }

    /// Tokens not currently sitting in any blank, in sentence order.
    ///
    /// Derived from the blanks on every call.
    pub fn available_options(&self) -> Vec<&Token> {
        let placed: HashSet<&Token> = self
            .assignments()
            .into_iter()
            .filter_map(|(_, token)| token)
            .collect();
        self.tokens.iter().filter(|t| !placed.contains(t)).collect()
    }

    pub fn all_blanks_filled(&self) -> bool {
        self.assignments().iter().all(|(_, token)| token.is_some())
    }
}

/// Authoring state for a cloze question with a live answering preview.
///
/// Changing which words are underlined changes token identities, so every
/// edit rebuilds the preview from scratch.
#[derive(Debug, Clone)]
pub struct ClozeEditor {
    question: ClozeQuestion,
    preview: BlankReconciler,
}

impl ClozeEditor {
    pub fn new(question: ClozeQuestion) -> Self {
        let preview = BlankReconciler::new(&question);
        Self { question, preview }
    }

    pub fn question(&self) -> &ClozeQuestion {
        &self.question
    }

    pub fn preview(&self) -> &BlankReconciler {
        &self.preview
    }

    /// Drag inside the preview.
    pub fn apply_preview(&mut self, mv: &DragEnd) -> bool {
        self.preview.apply(mv)
    }

    /// Whether the word at `word_index` is currently a blank.
    pub fn is_underlined(&self, word_index: usize) -> bool {
        self.question
            .underlined
            .iter()
            .any(|t| t.index == word_index)
    }

    /// Underline the word at `word_index`, or remove its underline.
    ///
    /// Returns `false` when the index is outside the sentence.
    pub fn toggle_underline(&mut self, word_index: usize) -> bool {
        let token = match sentence_words(&self.question.question_text).get(word_index) {
            Some(word) => Token::new(*word, word_index),
            None => return false,
        };

        if self.is_underlined(word_index) {
            self.question.underlined.retain(|t| t.index != word_index);
        } else {
            self.question.underlined.push(token);
            self.question.underlined.sort();
        }
        self.preview = BlankReconciler::new(&self.question);
        true
    }

    /// Replace the sentence; all underlines and placements are cleared.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.question.question_text = text.into();
        self.question.underlined.clear();
        self.preview = BlankReconciler::new(&self.question);
    }

    pub fn into_question(self) -> ClozeQuestion {
        self.question
    }
}
