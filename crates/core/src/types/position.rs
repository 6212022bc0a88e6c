//! Display position within an ordered collection.

use core::fmt;

use serde::{Deserialize, Serialize};

/// 1-based display position of a row within its collection.
///
/// After a successful reorder the positions of a collection form the dense
/// sequence `1..=N`. Deletes may leave gaps until the next reorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Position(i32);

impl Position {
    /// The first slot of a collection.
    pub const FIRST: Self = Self(1);

    /// Wrap a raw position value.
    #[must_use]
    pub const fn new(value: i32) -> Self {
        Self(value)
    }

    /// Position for the item at a zero-based list index.
    #[must_use]
    pub fn from_index(index: usize) -> Self {
        Self(i32::try_from(index).map_or(i32::MAX, |i| i.saturating_add(1)))
    }

    /// The slot after this one, or `None` at `i32::MAX`.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self.0.checked_add(1) {
            Some(value) => Some(Self(value)),
            None => None,
        }
    }

    /// Get the raw value.
    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for Position {
    fn from(value: i32) -> Self {
        Self(value)
    }
}

impl From<Position> for i32 {
    fn from(position: Position) -> Self {
        position.0
    }
}
