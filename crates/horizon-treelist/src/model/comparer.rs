//! Sibling ordering for hierarchical sorts.
//!
//! Hosts describe ordering with a flat [`ModelComparer`] that compares two
//! models by a column. [`BranchComparer`] combines it with a primary and an
//! optional secondary [`SortKey`]; the tree then applies it to every sibling
//! group independently so hierarchical grouping is preserved.

use std::cmp::Ordering;

/// Direction of a sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortOrder {
    /// No ordering; siblings keep the order they were fetched in.
    #[default]
    None,
    /// Smallest first.
    Ascending,
    /// Largest first.
    Descending,
}

impl SortOrder {
    /// Applies this direction to an ascending comparison result.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortOrder::None => Ordering::Equal,
            SortOrder::Ascending => ordering,
            SortOrder::Descending => ordering.reverse(),
        }
    }
}

/// A column and the direction to sort it in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SortKey {
    /// Column passed to the [`ModelComparer`].
    pub column: usize,
    /// Direction of the comparison.
    pub order: SortOrder,
}

impl SortKey {
    /// Creates a sort key.
    pub fn new(column: usize, order: SortOrder) -> Self {
        Self { column, order }
    }

    /// Creates an ascending sort key.
    pub fn ascending(column: usize) -> Self {
        Self::new(column, SortOrder::Ascending)
    }

    /// Creates a descending sort key.
    pub fn descending(column: usize) -> Self {
        Self::new(column, SortOrder::Descending)
    }
}

/// Compares two models by a column, in ascending order.
///
/// Implemented for any `Fn(&M, &M, usize) -> Ordering`.
pub trait ModelComparer<M> {
    /// Compares `a` to `b` by `column`.
    fn compare(&self, a: &M, b: &M, column: usize) -> Ordering;
}

impl<M, F> ModelComparer<M> for F
where
    F: Fn(&M, &M, usize) -> Ordering,
{
    fn compare(&self, a: &M, b: &M, column: usize) -> Ordering {
        self(a, b, column)
    }
}

/// Two-level comparator applied to sibling branches.
///
/// The secondary key is consulted only when the primary key ties, and is
/// ignored when it names the same column as the primary key.
pub struct BranchComparer<'a, M> {
    comparer: &'a dyn ModelComparer<M>,
    primary: SortKey,
    secondary: Option<SortKey>,
}

impl<'a, M> BranchComparer<'a, M> {
    /// Creates a comparer sorting by `primary`, breaking ties with `secondary`.
    pub fn new(
        comparer: &'a dyn ModelComparer<M>,
        primary: SortKey,
        secondary: Option<SortKey>,
    ) -> Self {
        let secondary = secondary.filter(|key| key.column != primary.column);
        Self {
            comparer,
            primary,
            secondary,
        }
    }

    /// The primary sort key.
    pub fn primary(&self) -> SortKey {
        self.primary
    }

    /// Compares two sibling models.
    pub fn compare(&self, a: &M, b: &M) -> Ordering {
        let primary = self
            .primary
            .order
            .apply(self.comparer.compare(a, b, self.primary.column));
        match (primary, self.secondary) {
            (Ordering::Equal, Some(key)) => key.order.apply(self.comparer.compare(a, b, key.column)),
            (ordering, _) => ordering,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // (name, size)
    type Row = (&'static str, u32);

    fn by_column(a: &Row, b: &Row, column: usize) -> Ordering {
        match column {
            0 => a.0.cmp(b.0),
            _ => a.1.cmp(&b.1),
        }
    }

    #[test]
    fn test_sort_order_apply() {
        assert_eq!(SortOrder::Ascending.apply(Ordering::Less), Ordering::Less);
        assert_eq!(SortOrder::Descending.apply(Ordering::Less), Ordering::Greater);
        assert_eq!(SortOrder::None.apply(Ordering::Less), Ordering::Equal);
    }

    #[test]
    fn test_primary_only() {
        let comparer = BranchComparer::<Row>::new(&by_column, SortKey::descending(1), None);
        assert_eq!(comparer.compare(&("a", 1), &("b", 2)), Ordering::Greater);
    }

    #[test]
    fn test_secondary_breaks_ties() {
        let comparer = BranchComparer::<Row>::new(
            &by_column,
            SortKey::ascending(1),
            Some(SortKey::descending(0)),
        );
        let mut rows: Vec<Row> = vec![("a", 2), ("c", 1), ("b", 2), ("d", 1)];
        rows.sort_by(|a, b| comparer.compare(a, b));
        assert_eq!(rows, vec![("d", 1), ("c", 1), ("b", 2), ("a", 2)]);
    }

    #[test]
    fn test_secondary_on_same_column_is_ignored() {
        let comparer = BranchComparer::<Row>::new(
            &by_column,
            SortKey::ascending(0),
            Some(SortKey::descending(0)),
        );
        assert_eq!(comparer.compare(&("a", 1), &("a", 2)), Ordering::Equal);
    }
}
