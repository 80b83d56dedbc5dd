//! Option normalization and stable id assignment.
//!
//! Authored options may arrive as bare payloads (legacy data) or as
//! `{ id, url }` pairs. Normalization gives every bare payload a fresh id
//! exactly once and leaves identified options untouched, so normalizing an
//! already-normalized list is a no-op.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of a categorize option.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OptionId(pub String);

impl OptionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OptionId {
    fn from(s: &str) -> Self {
        OptionId(s.to_string())
    }
}

/// A categorize option with its stable id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionItem {
    pub id: OptionId,
    /// Image URL (or any opaque payload).
    pub url: String,
}

/// An option as authored: either a bare payload or already identified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawOption {
    Identified(OptionItem),
    Bare(String),
}

impl From<OptionItem> for RawOption {
    fn from(item: OptionItem) -> Self {
        RawOption::Identified(item)
    }
}

impl From<&str> for RawOption {
    fn from(url: &str) -> Self {
        RawOption::Bare(url.to_string())
    }
}

/// Source of fresh option ids.
pub trait IdSource {
    /// Produce an id for the bare option at `position`. `attempt` grows when
    /// an earlier candidate collided with an existing id.
    fn generate(&mut self, position: usize, attempt: u32) -> OptionId;
}

/// Deterministic `opt-{position}` ids, as used when previewing a form.
#[derive(Debug, Default, Clone, Copy)]
pub struct IndexedIds;

impl IdSource for IndexedIds {
    fn generate(&mut self, position: usize, attempt: u32) -> OptionId {
        if attempt == 0 {
            OptionId(format!("opt-{position}"))
        } else {
            OptionId(format!("opt-{position}-{attempt}"))
        }
    }
}

/// Random UUID v4 ids, as used when authoring.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomIds;

impl IdSource for RandomIds {
    fn generate(&mut self, _position: usize, _attempt: u32) -> OptionId {
        OptionId(Uuid::new_v4().to_string())
    }
}

/// Assign ids to bare options; keep identified ones as they are.
///
/// An identified option whose id was already used earlier in the list is
/// given a fresh id so that the resulting universe has no duplicates.
pub fn normalize_options(raw: &[RawOption], ids: &mut dyn IdSource) -> Vec<OptionItem> {
    let mut taken: HashSet<OptionId> = HashSet::new();
    let mut first_owner = HashSet::new();
    for (position, option) in raw.iter().enumerate() {
        if let RawOption::Identified(item) = option {
            if taken.insert(item.id.clone()) {
                first_owner.insert(position);
            }
        }
    }

    raw.iter()
        .enumerate()
        .map(|(position, option)| match option {
            RawOption::Identified(item) if first_owner.contains(&position) => item.clone(),
            RawOption::Identified(item) => {
                tracing::warn!(id = %item.id, position, "duplicate option id, reassigning");
                OptionItem {
                    id: fresh_id(ids, position, &mut taken),
                    url: item.url.clone(),
                }
            }
            RawOption::Bare(url) => OptionItem {
                id: fresh_id(ids, position, &mut taken),
                url: url.clone(),
            },
        })
        .collect()
}

/// Give every option a distinct id, reassigning later duplicates.
pub fn dedupe_option_ids(items: Vec<OptionItem>) -> Vec<OptionItem> {
    let raw: Vec<RawOption> = items.into_iter().map(RawOption::Identified).collect();
    normalize_options(&raw, &mut IndexedIds)
}

fn fresh_id(ids: &mut dyn IdSource, position: usize, taken: &mut HashSet<OptionId>) -> OptionId {
    let mut attempt = 0;
    loop {
        let id = ids.generate(position, attempt);
        if taken.insert(id.clone()) {
            return id;
        }
        attempt += 1;
    }
}

/// Trim category names and drop empty or repeated ones, keeping first-seen
/// order.
pub fn normalize_categories<S: AsRef<str>>(raw: &[S]) -> Vec<String> {
    let mut seen = HashSet::new();
    raw.iter()
        .map(|c| c.as_ref().trim())
        .filter(|c| !c.is_empty())
        .filter(|c| seen.insert(c.to_string()))
        .map(str::to_string)
        .collect()
}

/// Parse the comma-separated category input of the builder.
pub fn parse_category_list(input: &str) -> Vec<String> {
    let parts: Vec<&str> = input.split(',').collect();
    normalize_categories(&parts)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identified(id: &str, url: &str) -> RawOption {
        RawOption::Identified(OptionItem {
            id: id.into(),
            url: url.into(),
        })
    }

    #[test]
    fn bare_options_get_indexed_ids() {
        let raw = vec![RawOption::from("a.png"), RawOption::from("b.png")];
        let items = normalize_options(&raw, &mut IndexedIds);
        assert_eq!(items[0].id.as_str(), "opt-0");
        assert_eq!(items[1].id.as_str(), "opt-1");
        assert_eq!(items[1].url, "b.png");
    }

    #[test]
    fn identified_options_keep_their_ids() {
        let raw = vec![identified("x", "a.png"), RawOption::from("b.png")];
        let items = normalize_options(&raw, &mut RandomIds);
        assert_eq!(items[0].id.as_str(), "x");
        assert_ne!(items[1].id.as_str(), "x");
    }

    #[test]
    fn renormalizing_is_idempotent() {
        let raw = vec![RawOption::from("a.png"), RawOption::from("b.png")];
        let first = normalize_options(&raw, &mut RandomIds);
        let again: Vec<RawOption> = first.iter().cloned().map(RawOption::from).collect();
        let second = normalize_options(&again, &mut RandomIds);
        assert_eq!(first, second);
    }

    #[test]
    fn generated_ids_avoid_existing_ones() {
        let raw = vec![RawOption::from("a.png"), identified("opt-0", "b.png")];
        let items = normalize_options(&raw, &mut IndexedIds);
        assert_eq!(items[0].id.as_str(), "opt-0-1");
        assert_eq!(items[1].id.as_str(), "opt-0");
    }

    #[test]
    fn duplicate_identified_ids_are_reassigned() {
        let raw = vec![identified("same", "a.png"), identified("same", "b.png")];
        let items = normalize_options(&raw, &mut IndexedIds);
        assert_eq!(items[0].id.as_str(), "same");
        assert_eq!(items[1].id.as_str(), "opt-1");
        assert_eq!(items[1].url, "b.png");
    }

    #[test]
    fn raw_option_deserializes_both_shapes() {
        let raw: Vec<RawOption> =
            serde_json::from_str(r#"["a.png", {"id": "k", "url": "b.png"}]"#).unwrap();
        assert_eq!(raw[0], RawOption::Bare("a.png".into()));
        assert_eq!(raw[1], identified("k", "b.png"));
    }

    #[test]
    fn category_list_parsing() {
        assert_eq!(
            parse_category_list(" Fruits, Animals,,Fruits , "),
            vec!["Fruits", "Animals"]
        );
        assert!(parse_category_list("").is_empty());
    }
}
