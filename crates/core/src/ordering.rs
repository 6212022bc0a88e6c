//! Ordered collections with a persisted 1-based `position` column.
//!
//! Products and feature cards share one lifecycle: they are created at the end
//! of the list, deleted by id, and reordered by dragging one item to a new
//! slot. This module holds the pure list arithmetic for that lifecycle. The
//! I/O side lives in the admin crate's collection editor.

use core::fmt;
use core::hash::Hash;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::types::Position;
use crate::validation::ValidationError;

/// Errors from list reordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum OrderingError {
    /// A drag index does not address an item in the list.
    #[error("index {index} is out of range for a list of {len} items")]
    IndexOutOfBounds {
        /// The rejected index.
        index: usize,
        /// Length of the list.
        len: usize,
    },

    /// The collection already holds a row at the largest position.
    #[error("no position left after {0}")]
    PositionOverflow(Position),
}

/// An entity kept in a position-ordered collection.
pub trait OrderedEntity: Clone + fmt::Debug + Send + Sync + 'static {
    /// Primary key type.
    type Id: Copy + Eq + Hash + fmt::Display + fmt::Debug + Send + Sync + 'static;
    /// Field values for a new row (everything except id, position, timestamps).
    type New: Clone + fmt::Debug + Send + Sync + 'static;
    /// Partial update; `None` fields are left unchanged.
    type Patch: Clone + fmt::Debug + Send + Sync + 'static;
    /// Edit form backing the admin editor.
    type Form: EditForm<Self>;

    /// Singular noun used in logs and error messages.
    const KIND: &'static str;

    fn id(&self) -> Self::Id;

    fn title(&self) -> &str;

    fn position(&self) -> Position;

    fn set_position(&mut self, position: Position);

    /// Build a row from create values.
    fn from_new(id: Self::Id, new: Self::New, position: Position, now: DateTime<Utc>) -> Self;

    /// Apply a partial update in place.
    fn apply_patch(&mut self, patch: &Self::Patch, now: DateTime<Utc>);

    /// Validate and normalize a patch received from a client.
    ///
    /// # Errors
    ///
    /// Returns an error if a present field is invalid.
    fn validate_patch(patch: Self::Patch) -> Result<Self::Patch, ValidationError>;
}

/// Form state for editing one entity.
///
/// `Default` is the empty form shown when nothing is selected.
pub trait EditForm<E: OrderedEntity>: Default + Clone + fmt::Debug + Send + Sync {
    /// Populate the form from an existing row.
    fn from_entity(entity: &E) -> Self;

    /// Convert to create values.
    ///
    /// # Errors
    ///
    /// Returns an error if a required field is missing or invalid.
    fn to_new(&self) -> Result<E::New, ValidationError>;

    /// Convert to a full-replacement patch.
    ///
    /// # Errors
    ///
    /// Returns an error if a required field is missing or invalid.
    fn to_patch(&self) -> Result<E::Patch, ValidationError>;
}

/// Position for a row appended after `max`, or [`Position::FIRST`] if the
/// collection is empty.
///
/// # Errors
///
/// Returns [`OrderingError::PositionOverflow`] if `max` is already `i32::MAX`.
pub fn position_after(max: Option<Position>) -> Result<Position, OrderingError> {
    match max {
        None => Ok(Position::FIRST),
        Some(max) => max.next().ok_or(OrderingError::PositionOverflow(max)),
    }
}

/// Position for a row appended to `items`.
///
/// # Errors
///
/// Returns [`OrderingError::PositionOverflow`] if the last slot is taken.
pub fn next_position<E: OrderedEntity>(items: &[E]) -> Result<Position, OrderingError> {
    position_after(items.iter().map(OrderedEntity::position).max())
}

/// Stable sort by position, the order the backend returns rows in.
pub fn sort_by_position<E: OrderedEntity>(items: &mut [E]) {
    items.sort_by_key(OrderedEntity::position);
}

/// Move the item at `from` so that it ends up at index `to`.
///
/// Returns `Ok(false)` without touching the list when `from == to`.
///
/// # Errors
///
/// Returns [`OrderingError::IndexOutOfBounds`] if either index is outside the
/// list. The list is unchanged in that case.
pub fn move_item<T>(items: &mut Vec<T>, from: usize, to: usize) -> Result<bool, OrderingError> {
    let len = items.len();
    for index in [from, to] {
        if index >= len {
            return Err(OrderingError::IndexOutOfBounds { index, len });
        }
    }
    if from == to {
        return Ok(false);
    }
    let item = items.remove(from);
    items.insert(to, item);
    Ok(true)
}

/// Rewrite positions to the dense sequence `1..=N` in list order.
pub fn assign_dense_positions<E: OrderedEntity>(items: &mut [E]) {
    for (index, item) in items.iter_mut().enumerate() {
        item.set_position(Position::from_index(index));
    }
}

/// Whether positions, in list order, are exactly `1..=N`.
#[must_use]
pub fn is_dense<E: OrderedEntity>(items: &[E]) -> bool {
    items
        .iter()
        .enumerate()
        .all(|(index, item)| item.position() == Position::from_index(index))
}

/// Ids in list order.
#[must_use]
pub fn ordered_ids<E: OrderedEntity>(items: &[E]) -> Vec<E::Id> {
    items.iter().map(OrderedEntity::id).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::types::{Feature, FeatureIcon, NewFeature};
    use crate::FeatureId;

    fn feature(title: &str, position: i32) -> Feature {
        Feature::from_new(
            FeatureId::generate(),
            NewFeature {
                title: title.to_owned(),
                description: String::new(),
                icon: FeatureIcon::Users,
            },
            Position::new(position),
            Utc::now(),
        )
    }

    fn titles(items: &[Feature]) -> Vec<&str> {
        items.iter().map(|f| f.title.as_str()).collect()
    }

    #[test]
    fn test_next_position_empty_is_first() {
        assert_eq!(next_position::<Feature>(&[]), Ok(Position::FIRST));
    }

    #[test]
    fn test_next_position_uses_max_not_len() {
        let items = vec![feature("A", 2), feature("B", 5)];
        assert_eq!(next_position(&items), Ok(Position::new(6)));
    }

    #[test]
    fn test_position_after_max_overflows() {
        let last = Position::new(i32::MAX);
        assert_eq!(
            position_after(Some(last)),
            Err(OrderingError::PositionOverflow(last))
        );
        assert!(next_position(&[feature("A", i32::MAX)]).is_err());
    }

    #[test]
    fn test_move_last_to_front() {
        let mut items = vec![feature("A", 1), feature("B", 2), feature("C", 3)];
        assert!(move_item(&mut items, 2, 0).unwrap());
        assign_dense_positions(&mut items);

        assert_eq!(titles(&items), ["C", "A", "B"]);
        assert!(is_dense(&items));
        assert_eq!(items[0].position, Position::new(1));
    }

    #[test]
    fn test_move_front_to_back() {
        let mut items = vec![feature("A", 1), feature("B", 2), feature("C", 3)];
        assert!(move_item(&mut items, 0, 2).unwrap());
        assert_eq!(titles(&items), ["B", "C", "A"]);
    }

    #[test]
    fn test_move_same_slot_is_noop() {
        let mut items = vec![feature("A", 1), feature("B", 2)];
        assert!(!move_item(&mut items, 1, 1).unwrap());
        assert_eq!(titles(&items), ["A", "B"]);
    }

    #[test]
    fn test_move_out_of_bounds() {
        let mut items = vec![feature("A", 1)];
        assert_eq!(
            move_item(&mut items, 0, 3),
            Err(OrderingError::IndexOutOfBounds { index: 3, len: 1 })
        );
        assert_eq!(titles(&items), ["A"]);
    }

    #[test]
    fn test_every_move_yields_dense_permutation() {
        let n = 5;
        for from in 0..n {
            for to in 0..n {
                let mut items: Vec<Feature> = (0..n)
                    .map(|i| feature(&i.to_string(), i32::try_from(i).unwrap() * 10))
                    .collect();
                let moved_id = items[from].id;
                move_item(&mut items, from, to).unwrap();
                assign_dense_positions(&mut items);

                assert!(is_dense(&items));
                assert_eq!(items[to].id, moved_id);
                assert_eq!(items.len(), n);
            }
        }
    }

    #[test]
    fn test_is_dense_detects_gaps() {
        let items = vec![feature("A", 1), feature("B", 3)];
        assert!(!is_dense(&items));
    }

    #[test]
    fn test_sort_by_position_is_stable() {
        let mut items = vec![feature("B", 2), feature("A", 1), feature("A2", 1)];
        sort_by_position(&mut items);
        assert_eq!(titles(&items), ["A", "A2", "B"]);
    }
}
