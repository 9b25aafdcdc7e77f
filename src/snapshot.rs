//! Ordered row snapshots and the change sets between them.
//!
//! A [`Snapshot`] is the full ordered cell sequence for a table's single
//! section. A [`ChangeSet`] is the minimal set of row operations that
//! transforms one snapshot's row set into another's, keyed by [`CellId`].

use ahash::AHashMap;

use crate::cell::{Cell, CellId, CellList};

/// The full ordered row set for a table's single section.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    cells: Vec<Cell>,
}

impl Snapshot {
    /// Returns a snapshot of `cells`, in iteration order.
    ///
    /// Cell identities must be unique; duplicates make diff results ambiguous
    /// and are only checked in debug builds.
    pub fn new(cells: impl IntoIterator<Item = Cell>) -> Self {
        let cells = cells.into_iter().collect::<Vec<_>>();
        debug_assert_eq!(
            cells
                .iter()
                .map(Cell::id)
                .cloned()
                .collect::<ahash::AHashSet<_>>()
                .len(),
            cells.len(),
            "cell identities must be unique within a snapshot"
        );
        Self { cells }
    }

    /// Returns the number of rows in this snapshot.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns true if this snapshot contains no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Returns the cell at `index`, or `None` if `index` is out of bounds.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Cell> {
        self.cells.get(index)
    }

    /// Returns an iterator over the rows in display order.
    pub fn iter(&self) -> std::slice::Iter<'_, Cell> {
        self.cells.iter()
    }
}

impl From<CellList> for Snapshot {
    fn from(cells: CellList) -> Self {
        Self::new(cells.iter().cloned())
    }
}

impl From<&CellList> for Snapshot {
    fn from(cells: &CellList) -> Self {
        Self::new(cells.iter().cloned())
    }
}

impl<'a> IntoIterator for &'a Snapshot {
    type IntoIter = std::slice::Iter<'a, Cell>;
    type Item = &'a Cell;

    fn into_iter(self) -> Self::IntoIter {
        self.cells.iter()
    }
}

/// A row that must move to transform one snapshot into another.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct RowMove {
    /// The row's index in the previous snapshot.
    pub from: usize,
    /// The row's index in the current snapshot.
    pub to: usize,
}

/// The minimal row operations transforming one [`Snapshot`] into another.
///
/// Rows whose id, content instance, and inset are unchanged — and whose
/// relative order is preserved — appear in none of the lists.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct ChangeSet {
    /// Indices into the previous snapshot whose ids are no longer present.
    pub removed: Vec<usize>,
    /// Indices into the current snapshot whose ids were not present before.
    pub inserted: Vec<usize>,
    /// Surviving rows whose relative order changed, kept to the minimal set
    /// by longest-increasing-subsequence.
    pub moved: Vec<RowMove>,
    /// Indices into the current snapshot whose payload (content instance or
    /// inset) changed under an unchanged id.
    pub updated: Vec<usize>,
}

impl ChangeSet {
    /// Computes the minimal operations transforming `previous` into
    /// `current`, keyed by cell identity.
    #[must_use]
    pub fn between(previous: &Snapshot, current: &Snapshot) -> Self {
        let previous_ids = index_by_id(previous);
        let current_ids = index_by_id(current);

        let mut changes = Self::default();
        // Old indices of the surviving rows, in current order, paired with
        // their current indices.
        let mut survivors = Vec::new();
        for (index, cell) in current.iter().enumerate() {
            if let Some(&previous_index) = previous_ids.get(cell.id()) {
                survivors.push((previous_index, index));
                let previous_cell = &previous.cells[previous_index];
                if previous_cell.content().id() != cell.content().id()
                    || previous_cell.inset() != cell.inset()
                {
                    changes.updated.push(index);
                }
            } else {
                changes.inserted.push(index);
            }
        }
        for (index, cell) in previous.iter().enumerate() {
            if !current_ids.contains_key(cell.id()) {
                changes.removed.push(index);
            }
        }

        let ordered: Vec<usize> = survivors.iter().map(|&(from, _)| from).collect();
        let keep = longest_increasing_run(&ordered);
        for (position, &(from, to)) in survivors.iter().enumerate() {
            if !keep[position] {
                changes.moved.push(RowMove { from, to });
            }
        }

        changes
    }

    /// Returns true if no operations are required.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty()
            && self.inserted.is_empty()
            && self.moved.is_empty()
            && self.updated.is_empty()
    }

    /// Returns the total number of row operations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.removed.len() + self.inserted.len() + self.moved.len() + self.updated.len()
    }
}

fn index_by_id(snapshot: &Snapshot) -> AHashMap<CellId, usize> {
    let mut ids = AHashMap::with_capacity(snapshot.len());
    for (index, cell) in snapshot.iter().enumerate() {
        let replaced = ids.insert(cell.id().clone(), index);
        debug_assert!(
            replaced.is_none(),
            "cell identities must be unique within a snapshot"
        );
    }
    ids
}

/// Marks the elements of `sequence` that form a longest strictly-increasing
/// subsequence. Every unmarked element must move; marked elements stay put.
fn longest_increasing_run(sequence: &[usize]) -> Vec<bool> {
    // Patience sorting: `tails[length]` is the index of the smallest tail of
    // any increasing subsequence of `length + 1`.
    let mut tails: Vec<usize> = Vec::new();
    let mut predecessors: Vec<Option<usize>> = vec![None; sequence.len()];
    for (index, &value) in sequence.iter().enumerate() {
        let insert_at = tails.partition_point(|&tail| sequence[tail] < value);
        if insert_at > 0 {
            predecessors[index] = Some(tails[insert_at - 1]);
        }
        if insert_at == tails.len() {
            tails.push(index);
        } else {
            tails[insert_at] = index;
        }
    }

    let mut keep = vec![false; sequence.len()];
    let mut current = tails.last().copied();
    while let Some(index) = current {
        keep[index] = true;
        current = predecessors[index];
    }
    keep
}

#[cfg(test)]
mod tests {
    use super::{ChangeSet, RowMove, Snapshot};
    use crate::cell::Cell;
    use crate::widget::MakeWidget;
    use crate::widgets::Space;

    fn snapshot(ids: &[&'static str]) -> Snapshot {
        Snapshot::new(ids.iter().map(|&id| Cell::new(id, Space::clear())))
    }

    #[test]
    fn identical_snapshots_are_a_no_op() {
        let shared: Vec<_> = ["a", "b", "c"]
            .into_iter()
            .map(|id| Cell::new(id, Space::clear()))
            .collect();
        let previous = Snapshot::new(shared.iter().cloned());
        let current = Snapshot::new(shared.iter().cloned());
        let changes = ChangeSet::between(&previous, &current);
        assert!(changes.is_empty());
        assert_eq!(changes.len(), 0);
    }

    #[test]
    fn membership_changes_count_as_symmetric_difference() {
        let a = Cell::new("a", Space::clear());
        let c = Cell::new("c", Space::clear());
        let previous = Snapshot::new([a.clone(), Cell::new("b", Space::clear()), c.clone()]);
        let current = Snapshot::new([a, c, Cell::new("d", Space::clear())]);
        let changes = ChangeSet::between(&previous, &current);
        assert_eq!(changes.removed, vec![1]);
        assert_eq!(changes.inserted, vec![2]);
        assert!(changes.moved.is_empty());
        assert!(changes.updated.is_empty());
        assert_eq!(changes.len(), 2);
    }

    #[test]
    fn first_apply_inserts_every_row() {
        let changes = ChangeSet::between(&Snapshot::default(), &snapshot(&["a", "b", "c"]));
        assert_eq!(changes.inserted, vec![0, 1, 2]);
        assert_eq!(changes.len(), 3);
    }

    #[test]
    fn rotation_moves_a_single_row() {
        let cells: Vec<_> = ["a", "b", "c"]
            .into_iter()
            .map(|id| Cell::new(id, Space::clear()))
            .collect();
        let previous = Snapshot::new(cells.iter().cloned());
        let current = Snapshot::new([cells[1].clone(), cells[2].clone(), cells[0].clone()]);
        let changes = ChangeSet::between(&previous, &current);
        assert_eq!(changes.moved, vec![RowMove { from: 0, to: 2 }]);
        assert_eq!(changes.len(), 1);
    }

    #[test]
    fn swapping_content_updates_in_place() {
        let previous = Snapshot::new([Cell::new("a", Space::clear())]);
        let current = Snapshot::new([Cell::new("a", Space::clear())]);
        let changes = ChangeSet::between(&previous, &current);
        assert!(changes.removed.is_empty() && changes.inserted.is_empty());
        assert_eq!(changes.updated, vec![0]);
    }

    #[test]
    fn inset_changes_update_in_place() {
        let shared = Space::clear().make_widget();
        let previous = Snapshot::new([Cell::new("a", shared.clone())]);
        let current =
            Snapshot::new([Cell::new("a", shared).with_leading_inset(figures::units::Px::new(8))]);
        let changes = ChangeSet::between(&previous, &current);
        assert_eq!(changes.updated, vec![0]);
        assert_eq!(changes.len(), 1);
    }

    #[test]
    fn surviving_rows_keep_current_order() {
        let cells: Vec<_> = ["a", "b", "c", "d"]
            .into_iter()
            .map(|id| Cell::new(id, Space::clear()))
            .collect();
        let previous = Snapshot::new(cells.iter().cloned());
        let current = Snapshot::new([cells[1].clone(), cells[3].clone(), cells[0].clone()]);
        let changes = ChangeSet::between(&previous, &current);
        assert_eq!(changes.removed, vec![2]);
        // "b" and "d" form the longest increasing run; only "a" moves.
        assert_eq!(changes.moved, vec![RowMove { from: 0, to: 2 }]);
        assert_eq!(changes.len(), 2);
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "unique")]
    fn duplicate_ids_are_rejected_in_debug() {
        let _snapshot = snapshot(&["a", "a"]);
    }
}
