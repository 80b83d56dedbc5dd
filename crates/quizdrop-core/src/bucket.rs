//! Bucket reconciler for categorize questions.

use crate::model::CategorizeQuestion;
use crate::normalize::{
    dedupe_option_ids, normalize_categories, normalize_options, IdSource, OptionId, OptionItem,
    RawOption,
};
use crate::placement::{Capacity, DragEnd, PlacementSnapshot, PlacementStore};

/// Container key of the pool of unassigned options.
pub const UNASSIGNED_POOL: &str = "unassigned";

/// Partitions a fixed set of options across the unassigned pool and the
/// category buckets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketReconciler {
    options: Vec<OptionItem>,
    categories: Vec<String>,
    store: PlacementStore<OptionId>,
    /// Options and categories as authored, when built from a question.
    authored: Option<(Vec<RawOption>, Vec<String>)>,
}

impl BucketReconciler {
    /// Every option starts unassigned and every bucket empty.
    ///
    /// Blank and repeated category names are dropped, and so is a category
    /// named like the unassigned pool. Options sharing an id get fresh ids.
    pub fn new(options: Vec<OptionItem>, categories: &[String]) -> Self {
        let options = dedupe_option_ids(options);
        let categories: Vec<String> = normalize_categories(categories)
            .into_iter()
            .filter(|c| {
                if c == UNASSIGNED_POOL {
                    tracing::warn!("category '{c}' clashes with the unassigned pool, skipping");
                    return false;
                }
                true
            })
            .collect();
        let ids = options.iter().map(|o| o.id.clone()).collect();
        let store = PlacementStore::new(
            UNASSIGNED_POOL,
            ids,
            categories.clone(),
            Capacity::Unbounded,
        );
        Self {
            options,
            categories,
            store,
            authored: None,
        }
    }

    /// Build from an authored question, assigning ids to bare options.
    pub fn for_question(question: &CategorizeQuestion, ids: &mut dyn IdSource) -> Self {
        let mut buckets = Self::new(
            normalize_options(&question.options, ids),
            &question.categories,
        );
        buckets.authored = Some((question.options.clone(), question.categories.clone()));
        buckets
    }

    /// Follow an edited question. Options are only normalized again when the
    /// authored options or categories differ, so ids drawn at random are not
    /// redrawn for an unchanged question. Returns whether a reset happened.
    pub fn sync_question(&mut self, question: &CategorizeQuestion, ids: &mut dyn IdSource) -> bool {
        let unchanged = self.authored.as_ref().is_some_and(|(options, categories)| {
            *options == question.options && *categories == question.categories
        });
        if unchanged {
            return false;
        }
        let reset = self.sync_definition(
            normalize_options(&question.options, ids),
            &question.categories,
        );
        self.authored = Some((question.options.clone(), question.categories.clone()));
        reset
    }

    /// Reset everything if the option list or category list changed.
    /// Returns whether a reset happened.
    pub fn sync_definition(&mut self, options: Vec<OptionItem>, categories: &[String]) -> bool {
        let next = Self::new(options, categories);
        if next.options == self.options && next.categories == self.categories {
            return false;
        }
        tracing::debug!(
            options = next.options.len(),
            categories = next.categories.len(),
            "categorize definition changed, resetting buckets"
        );
        *self = next;
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

    pub fn store(&self) -> &PlacementStore<OptionId> {
        &self.store
    }

    pub fn snapshot(&self) -> PlacementSnapshot<OptionId> {
        self.store.snapshot()
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn options(&self) -> &[OptionItem] {
        &self.options
    }

    /// Ids in container `key`, if it exists.
    pub fn container(&self, key: &str) -> Option<&[OptionId]> {
        self.store.container(key)
    }

    /// Resolved options in container `key`, in display order.
    pub fn items_in(&self, key: &str) -> Vec<&OptionItem> {
        self.container(key)
            .unwrap_or_default()
            .iter()
            .filter_map(|id| self.options.iter().find(|o| &o.id == id))
            .collect()
    }
}
