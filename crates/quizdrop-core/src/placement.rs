//! The placement store and its move/swap reconciliation.
//!
//! A [`PlacementStore`] maps container keys to ordered lists of item ids.
//! Every item of the universe sits in exactly one container, no container
//! holds an item outside the universe, and single-capacity containers hold
//! at most one item. [`PlacementStore::reconcile`] is the only mutation: a
//! pure transform from one valid store to the next in response to a single
//! gesture-end event.

use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{InvariantViolation, MoveError, ReconcileError};

/// Bound for anything that can be placed in a container.
pub trait ItemId: Clone + Eq + Hash + fmt::Debug + fmt::Display {}

impl<T> ItemId for T where T: Clone + Eq + Hash + fmt::Debug + fmt::Display {}

/// How many items a container may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capacity {
    /// Pools and category buckets.
    Unbounded,
    /// Cloze blanks.
    Single,
}

/// A named, ordered sequence of item ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container<I> {
    key: String,
    capacity: Capacity,
    items: Vec<I>,
}

impl<I> Container<I> {
    pub fn new(key: impl Into<String>, capacity: Capacity, items: Vec<I>) -> Self {
        Self {
            key: key.into(),
            capacity,
            items,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn capacity(&self) -> Capacity {
        self.capacity
    }

    pub fn items(&self) -> &[I] {
        &self.items
    }
}

/// One end of a drag gesture: a container and a position inside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DragLocation {
    pub container: String,
    pub index: usize,
}

impl DragLocation {
    pub fn new(container: impl Into<String>, index: usize) -> Self {
        Self {
            container: container.into(),
            index,
        }
    }
}

/// The record produced when a drag gesture ends.
///
/// `destination` is `None` when the pointer was released outside every
/// droppable target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DragEnd {
    pub source: DragLocation,
    #[serde(default)]
    pub destination: Option<DragLocation>,
}

impl DragEnd {
    /// A drag from `source` dropped onto `destination`.
    pub fn new(source: DragLocation, destination: DragLocation) -> Self {
        Self {
            source,
            destination: Some(destination),
        }
    }

    /// A drag released outside any droppable.
    pub fn cancelled(source: DragLocation) -> Self {
        Self {
            source,
            destination: None,
        }
    }

    /// Shorthand used heavily in tests and gesture scripts.
    pub fn between(from: &str, from_index: usize, to: &str, to_index: usize) -> Self {
        Self::new(DragLocation::new(from, from_index), DragLocation::new(to, to_index))
    }
}

/// Every container of one question instance, plus the item universe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacementStore<I> {
    containers: Vec<Container<I>>,
    universe: Vec<I>,
}

impl<I: ItemId> PlacementStore<I> {
    /// Build the pristine store: every item in `pool`, every destination
    /// empty.
    ///
    /// Repeated items and destination keys are dropped, as is a destination
    /// named like the pool, so the result always satisfies the placement
    /// invariants.
    pub fn new<K>(pool: &str, items: Vec<I>, destinations: K, capacity: Capacity) -> Self
    where
        K: IntoIterator<Item = String>,
    {
        let mut seen = HashSet::new();
        let universe: Vec<I> = items
            .into_iter()
            .filter(|item| {
                let fresh = seen.insert(item.clone());
                if !fresh {
                    tracing::warn!(%item, "duplicate item, keeping the first occurrence");
                }
                fresh
            })
            .collect();

        let mut keys = HashSet::from([pool.to_string()]);
        let mut containers = vec![Container::new(pool, Capacity::Unbounded, universe.clone())];
        for key in destinations {
            if keys.insert(key.clone()) {
                containers.push(Container::new(key, capacity, Vec::new()));
            } else {
                tracing::warn!(container = %key, "duplicate container key, skipping");
            }
        }
        Self {
            containers,
            universe,
        }
    }

    pub fn containers(&self) -> &[Container<I>] {
        &self.containers
    }

    pub fn universe(&self) -> &[I] {
        &self.universe
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.containers.iter().map(|c| c.key.as_str())
    }

    /// Items in the container named `key`, if it exists.
    pub fn container(&self, key: &str) -> Option<&[I]> {
        self.position(key).map(|i| self.containers[i].items.as_slice())
    }

    pub fn snapshot(&self) -> PlacementSnapshot<I> {
        PlacementSnapshot(
            self.containers
                .iter()
                .map(|c| (c.key.clone(), c.items.clone()))
                .collect(),
        )
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.containers.iter().position(|c| c.key == key)
    }

    /// Apply one gesture-end event, ignoring moves that cannot be resolved.
    ///
    /// Returns the input unchanged when the move is malformed. An invariant
    /// violation aborts in debug builds; release builds log it and keep the
    /// previous store.
    pub fn reconcile(&self, mv: &DragEnd) -> Self {
        match self.try_reconcile(mv) {
            Ok(next) => next,
            Err(ReconcileError::MalformedMove(err)) => {
                tracing::debug!(error = %err, "ignoring unresolvable drop");
                self.clone()
            }
            Err(ReconcileError::InvariantViolation(violation)) => {
                if cfg!(debug_assertions) {
                    panic!("reconciliation broke the store: {violation}");
                }
                tracing::error!(
                    %violation,
                    ?mv,
                    "reconciliation rejected, keeping previous placement"
                );
                self.clone()
            }
        }
    }

    /// Apply one gesture-end event, reporting why it could not be applied.
    pub fn try_reconcile(&self, mv: &DragEnd) -> Result<Self, ReconcileError> {
        let destination = mv.destination.as_ref().ok_or(MoveError::NoDestination)?;
        let src = self
            .position(&mv.source.container)
            .ok_or_else(|| MoveError::UnknownSource(mv.source.container.clone()))?;
        let len = self.containers[src].items.len();
        if mv.source.index >= len {
            return Err(MoveError::SourceOutOfRange {
                container: mv.source.container.clone(),
                index: mv.source.index,
                len,
            }
            .into());
        }
        let dst = self
            .position(&destination.container)
            .ok_or_else(|| MoveError::UnknownDestination(destination.container.clone()))?;

        if src == dst
            && (mv.source.index == destination.index
                || self.containers[src].capacity == Capacity::Single)
        {
            return Ok(self.clone());
        }

        let mut next = self.clone();
        match (next.containers[src].capacity, next.containers[dst].capacity) {
            (_, Capacity::Unbounded) => next.append(src, mv.source.index, dst, destination.index),
            (Capacity::Unbounded, Capacity::Single) => next.place(src, mv.source.index, dst),
            (Capacity::Single, Capacity::Single) => next.swap(src, dst),
        }
        next.check_invariants()?;
        Ok(next)
    }

    /// Remove from `src` and insert into `dst`, clamping the insert index.
    fn append(&mut self, src: usize, src_index: usize, dst: usize, dst_index: usize) {
        let item = self.containers[src].items.remove(src_index);
        let items = &mut self.containers[dst].items;
        let at = dst_index.min(items.len());
        items.insert(at, item);
    }

    /// Move into a single slot; any occupant takes the vacated position.
    fn place(&mut self, src: usize, src_index: usize, dst: usize) {
        let item = self.containers[src].items.remove(src_index);
        let displaced = std::mem::replace(&mut self.containers[dst].items, vec![item]);
        let pool = &mut self.containers[src].items;
        for (offset, occupant) in displaced.into_iter().enumerate() {
            let at = (src_index + offset).min(pool.len());
            pool.insert(at, occupant);
        }
    }

    fn swap(&mut self, src: usize, dst: usize) {
        let from = std::mem::take(&mut self.containers[src].items);
        let to = std::mem::replace(&mut self.containers[dst].items, from);
        self.containers[src].items = to;
    }

    /// Verify completeness, no ghosts, no duplicates, and capacity.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let mut keys = HashSet::new();
        for container in &self.containers {
            if !keys.insert(container.key.as_str()) {
                return Err(InvariantViolation::DuplicateContainer(
                    container.key.clone(),
                ));
            }
        }

        let universe: HashSet<&I> = self.universe.iter().collect();
        let mut seen = HashSet::new();
        for container in &self.containers {
            if container.capacity == Capacity::Single && container.items.len() > 1 {
                return Err(InvariantViolation::OverCapacity {
                    container: container.key.clone(),
                    len: container.items.len(),
                });
            }
            for item in &container.items {
                if !universe.contains(item) {
                    return Err(InvariantViolation::Ghost {
                        item: item.to_string(),
                        container: container.key.clone(),
                    });
                }
                if !seen.insert(item) {
                    return Err(InvariantViolation::Duplicate {
                        item: item.to_string(),
                    });
                }
            }
        }

        if let Some(missing) = self.universe.iter().find(|item| !seen.contains(item)) {
            return Err(InvariantViolation::Missing {
                item: missing.to_string(),
            });
        }
        Ok(())
    }
}

impl<I: Serialize> Serialize for PlacementStore<I> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.containers.len()))?;
        for container in &self.containers {
            map.serialize_entry(&container.key, &container.items)?;
        }
        map.end()
    }
}

/// A read-only copy of a store's contents, in container order.
///
/// Serialized as a map from container key to item list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacementSnapshot<I>(pub Vec<(String, Vec<I>)>);

impl<I> PlacementSnapshot<I> {
    pub fn get(&self, key: &str) -> Option<&[I]> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, items)| items.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[I])> {
        self.0.iter().map(|(k, items)| (k.as_str(), items.as_slice()))
    }
}

impl<I: Serialize> Serialize for PlacementSnapshot<I> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, items) in &self.0 {
            map.serialize_entry(key, items)?;
        }
        map.end()
    }
}

impl<'de, I: Deserialize<'de>> Deserialize<'de> for PlacementSnapshot<I> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SnapshotVisitor<I>(PhantomData<I>);

        impl<'de, I: Deserialize<'de>> Visitor<'de> for SnapshotVisitor<I> {
            type Value = PlacementSnapshot<I>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of container keys to item lists")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut containers = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, items)) = map.next_entry::<String, Vec<I>>()? {
                    containers.push((key, items));
                }
                Ok(PlacementSnapshot(containers))
            }
        }

        deserializer.deserialize_map(SnapshotVisitor(PhantomData))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bucket_store() -> PlacementStore<String> {
        PlacementStore::new(
            "unassigned",
            vec!["a".into(), "b".into(), "c".into()],
            vec!["fruits".to_string(), "animals".to_string()],
            Capacity::Unbounded,
        )
    }

    fn blank_store() -> PlacementStore<String> {
        PlacementStore::new(
            "options",
            vec!["the@0".into(), "cat@1".into()],
            vec!["blank_1".to_string(), "blank_2".to_string()],
            Capacity::Single,
        )
    }

    fn from_containers(
        containers: Vec<Container<String>>,
        universe: Vec<String>,
    ) -> Result<PlacementStore<String>, InvariantViolation> {
        let store = PlacementStore {
            containers,
            universe,
        };
        store.check_invariants()?;
        Ok(store)
    }

    fn items(store: &PlacementStore<String>, key: &str) -> Vec<String> {
        store.container(key).unwrap().to_vec()
    }

    #[test]
    fn append_from_pool_to_bucket() {
        let store = bucket_store();
        let next = store.reconcile(&DragEnd::between("unassigned", 0, "fruits", 0));
        assert_eq!(items(&next, "unassigned"), vec!["b", "c"]);
        assert_eq!(items(&next, "fruits"), vec!["a"]);
        assert!(items(&next, "animals").is_empty());
    }

    #[test]
    fn reorder_within_bucket() {
        let store = bucket_store()
            .reconcile(&DragEnd::between("unassigned", 0, "fruits", 0))
            .reconcile(&DragEnd::between("unassigned", 0, "fruits", 1));
        assert_eq!(items(&store, "fruits"), vec!["a", "b"]);

        let next = store.reconcile(&DragEnd::between("fruits", 0, "fruits", 1));
        assert_eq!(items(&next, "fruits"), vec!["b", "a"]);
    }

    #[test]
    fn destination_index_is_clamped() {
        let next = bucket_store().reconcile(&DragEnd::between("unassigned", 2, "fruits", 40));
        assert_eq!(items(&next, "fruits"), vec!["c"]);

        let next = next.reconcile(&DragEnd::between("unassigned", 0, "unassigned", 99));
        assert_eq!(items(&next, "unassigned"), vec!["b", "a"]);
    }

    #[test]
    fn identity_move_is_noop() {
        let store = bucket_store();
        let next = store.reconcile(&DragEnd::between("unassigned", 1, "unassigned", 1));
        assert_eq!(next, store);
    }

    #[test]
    fn malformed_moves_are_noops() {
        let store = bucket_store();

        let cancelled = DragEnd::cancelled(DragLocation::new("unassigned", 0));
        assert_eq!(
            store.try_reconcile(&cancelled).unwrap_err(),
            MoveError::NoDestination.into()
        );
        assert_eq!(store.reconcile(&cancelled), store);

        let unknown_dest = DragEnd::between("unassigned", 0, "vegetables", 0);
        assert!(matches!(
            store.try_reconcile(&unknown_dest),
            Err(ReconcileError::MalformedMove(MoveError::UnknownDestination(_)))
        ));
        assert_eq!(store.reconcile(&unknown_dest), store);

        let unknown_src = DragEnd::between("nowhere", 0, "fruits", 0);
        assert_eq!(store.reconcile(&unknown_src), store);

        let stale = DragEnd::between("fruits", 0, "animals", 0);
        assert_eq!(
            store.try_reconcile(&stale).unwrap_err(),
            MoveError::SourceOutOfRange {
                container: "fruits".into(),
                index: 0,
                len: 0
            }
            .into()
        );
        assert_eq!(store.reconcile(&stale), store);
    }

    #[test]
    fn pool_to_blank() {
        let next = blank_store().reconcile(&DragEnd::between("options", 1, "blank_2", 0));
        assert_eq!(items(&next, "options"), vec!["the@0"]);
        assert!(items(&next, "blank_1").is_empty());
        assert_eq!(items(&next, "blank_2"), vec!["cat@1"]);
    }

    #[test]
    fn pool_to_occupied_blank_returns_occupant() {
        let next = blank_store()
            .reconcile(&DragEnd::between("options", 0, "blank_1", 0))
            .reconcile(&DragEnd::between("options", 0, "blank_1", 0));
        assert_eq!(items(&next, "blank_1"), vec!["cat@1"]);
        assert_eq!(items(&next, "options"), vec!["the@0"]);
        next.check_invariants().unwrap();
    }

    #[test]
    fn blank_swap_and_symmetry() {
        let placed = blank_store()
            .reconcile(&DragEnd::between("options", 0, "blank_1", 0))
            .reconcile(&DragEnd::between("options", 0, "blank_2", 0));
        assert_eq!(items(&placed, "blank_1"), vec!["the@0"]);
        assert_eq!(items(&placed, "blank_2"), vec!["cat@1"]);

        let swapped = placed.reconcile(&DragEnd::between("blank_1", 0, "blank_2", 0));
        assert_eq!(items(&swapped, "blank_1"), vec!["cat@1"]);
        assert_eq!(items(&swapped, "blank_2"), vec!["the@0"]);

        let back = swapped.reconcile(&DragEnd::between("blank_2", 0, "blank_1", 0));
        assert_eq!(back, placed);
    }

    #[test]
    fn blank_to_empty_blank_moves() {
        let next = blank_store()
            .reconcile(&DragEnd::between("options", 0, "blank_1", 0))
            .reconcile(&DragEnd::between("blank_1", 0, "blank_2", 0));
        assert!(items(&next, "blank_1").is_empty());
        assert_eq!(items(&next, "blank_2"), vec!["the@0"]);
    }

    #[test]
    fn blank_to_same_blank_other_index_is_noop() {
        let placed = blank_store().reconcile(&DragEnd::between("options", 0, "blank_1", 0));
        let next = placed.reconcile(&DragEnd::between("blank_1", 0, "blank_1", 1));
        assert_eq!(next, placed);
    }

    #[test]
    fn return_to_pool() {
        let placed = blank_store().reconcile(&DragEnd::between("options", 0, "blank_1", 0));
        let next = placed.reconcile(&DragEnd::between("blank_1", 0, "options", 5));
        assert!(items(&next, "blank_1").is_empty());
        assert_eq!(items(&next, "options"), vec!["cat@1", "the@0"]);
    }

    #[test]
    fn construction_drops_repeated_items_and_keys() {
        let store = PlacementStore::new(
            "pool",
            vec!["x".to_string(), "x".into(), "y".into()],
            vec!["a".to_string(), "a".into(), "pool".into()],
            Capacity::Unbounded,
        );
        store.check_invariants().unwrap();
        assert_eq!(store.universe(), &["x".to_string(), "y".to_string()]);
        assert_eq!(store.keys().collect::<Vec<_>>(), vec!["pool", "a"]);

        let next = store.reconcile(&DragEnd::between("pool", 0, "a", 0));
        assert_eq!(items(&next, "a"), vec!["x"]);
        assert_eq!(items(&next, "pool"), vec!["y"]);
    }

    #[test]
    fn invariant_checks_reject_bad_layouts() {
        let universe: Vec<String> = vec!["a".into(), "b".into()];

        let dup = from_containers(
            vec![
                Container::new("pool", Capacity::Unbounded, vec!["a".to_string()]),
                Container::new("x", Capacity::Unbounded, vec!["a".into(), "b".into()]),
            ],
            universe.clone(),
        );
        assert!(matches!(dup, Err(InvariantViolation::Duplicate { .. })));

        let ghost = from_containers(
            vec![Container::new(
                "pool",
                Capacity::Unbounded,
                vec!["a".to_string(), "b".into(), "z".into()],
            )],
            universe.clone(),
        );
        assert!(matches!(ghost, Err(InvariantViolation::Ghost { .. })));

        let missing = from_containers(
            vec![Container::new("pool", Capacity::Unbounded, vec!["a".to_string()])],
            universe.clone(),
        );
        assert_eq!(
            missing.unwrap_err(),
            InvariantViolation::Missing { item: "b".into() }
        );

        let over = from_containers(
            vec![
                Container::new("pool", Capacity::Unbounded, vec![]),
                Container::new("blank", Capacity::Single, vec!["a".to_string(), "b".into()]),
            ],
            universe.clone(),
        );
        assert!(matches!(over, Err(InvariantViolation::OverCapacity { len: 2, .. })));

        let twice = from_containers(
            vec![
                Container::new("pool", Capacity::Unbounded, universe.clone()),
                Container::new("pool", Capacity::Unbounded, vec![]),
            ],
            universe,
        );
        assert!(matches!(twice, Err(InvariantViolation::DuplicateContainer(_))));
    }

    #[test]
    fn serializes_in_container_order() {
        let store = bucket_store().reconcile(&DragEnd::between("unassigned", 0, "animals", 0));
        let json = serde_json::to_string(&store).unwrap();
        assert_eq!(
            json,
            r#"{"unassigned":["b","c"],"fruits":[],"animals":["a"]}"#
        );

        let snapshot: PlacementSnapshot<String> = serde_json::from_str(&json).unwrap();
        assert_eq!(snapshot, store.snapshot());
        assert_eq!(snapshot.get("animals"), Some(&["a".to_string()][..]));
    }
}
