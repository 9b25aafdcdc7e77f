//! Identifiable cells and ordered cell collections.
//!
//! A [`Cell`] pairs a stable identity with a widget to display. A [`CellList`]
//! is an ordered, heterogeneous collection of cells built in declaration
//! order, ready to be turned into a [`Snapshot`](crate::snapshot::Snapshot).

use std::any::{Any, TypeId};
use std::fmt::{self, Debug};
use std::hash::{Hash, Hasher};
use std::ops::{Index, IndexMut};
use std::sync::Arc;

use alot::OrderedLots;

use crate::styles::Dimension;
use crate::widget::{MakeWidget, WidgetId, WidgetInstance};

/// The identity of a [`Cell`], erased over any hashable key type.
///
/// Two ids are equal only when their keys have the same type and compare
/// equal: `CellId::from(1_usize)` and `CellId::from("1")` are distinct.
#[derive(Clone)]
pub struct CellId(Arc<dyn AnyKey>);

impl CellId {
    /// Returns an id wrapping `key`.
    pub fn new<T>(key: T) -> Self
    where
        T: Debug + Hash + Eq + Send + Sync + 'static,
    {
        Self(Arc::new(key))
    }
}

impl Debug for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Debug::fmt(&self.0, f)
    }
}

impl Eq for CellId {}

impl PartialEq for CellId {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_key(other.0.as_ref())
    }
}

impl Hash for CellId {
    fn hash<H>(&self, state: &mut H)
    where
        H: Hasher,
    {
        self.0.hash_key(state);
    }
}

impl From<&'static str> for CellId {
    fn from(key: &'static str) -> Self {
        Self::new(key)
    }
}

impl From<String> for CellId {
    fn from(key: String) -> Self {
        Self::new(key)
    }
}

impl From<usize> for CellId {
    fn from(key: usize) -> Self {
        Self::new(key)
    }
}

impl From<u64> for CellId {
    fn from(key: u64) -> Self {
        Self::new(key)
    }
}

impl From<i32> for CellId {
    fn from(key: i32) -> Self {
        Self::new(key)
    }
}

impl From<WidgetId> for CellId {
    fn from(key: WidgetId) -> Self {
        Self::new(key)
    }
}

trait AnyKey: Debug + Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn eq_key(&self, other: &dyn AnyKey) -> bool;
    fn hash_key(&self, state: &mut dyn Hasher);
}

impl<T> AnyKey for T
where
    T: Debug + Hash + Eq + Send + Sync + 'static,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn eq_key(&self, other: &dyn AnyKey) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .map_or(false, |other| self == other)
    }

    fn hash_key(&self, mut state: &mut dyn Hasher) {
        TypeId::of::<T>().hash(&mut state);
        self.hash(&mut state);
    }
}

/// One row's identity and content.
///
/// Equality and hashing consider only the [`CellId`]: a cell whose content
/// changed under the same id is the "same" cell to the diffing layer, updated
/// in place rather than removed and reinserted.
///
/// Identities must be unique within the cell sequence displayed at any one
/// time. Duplicates make diff results ambiguous; this is the caller's
/// responsibility and is only checked in debug builds.
#[derive(Clone, Debug)]
pub struct Cell {
    id: CellId,
    inset: Dimension,
    content: WidgetInstance,
}

impl Cell {
    /// Returns a cell identified by `id` displaying `content`.
    pub fn new(id: impl Into<CellId>, content: impl MakeWidget) -> Self {
        Self {
            id: id.into(),
            inset: Dimension::ZERO,
            content: content.make_widget(),
        }
    }

    /// Returns this cell with `inset` of leading space before its content.
    #[must_use]
    pub fn with_leading_inset(mut self, inset: impl Into<Dimension>) -> Self {
        self.inset = inset.into();
        self
    }

    /// Returns the identity of this cell.
    #[must_use]
    pub fn id(&self) -> &CellId {
        &self.id
    }

    /// Returns the leading space reserved before this cell's content.
    #[must_use]
    pub fn inset(&self) -> Dimension {
        self.inset
    }

    /// Returns the widget this cell displays.
    #[must_use]
    pub fn content(&self) -> &WidgetInstance {
        &self.content
    }
}

impl Eq for Cell {}

impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Hash for Cell {
    fn hash<H>(&self, state: &mut H)
    where
        H: Hasher,
    {
        self.id.hash(state);
    }
}

/// A type that can create a [`Cell`].
pub trait MakeCell: Sized {
    /// Returns a new cell.
    fn make_cell(self) -> Cell;

    /// Returns a collection of cells using `self` and `other`.
    fn and(self, other: impl MakeCell) -> CellList {
        let mut cells = CellList::new();
        cells.push(self);
        cells.push(other);
        cells
    }
}

impl MakeCell for Cell {
    fn make_cell(self) -> Cell {
        self
    }
}

impl<T> MakeCell for T
where
    T: MakeWidget,
{
    /// A widget declared without an explicit identity is identified by its
    /// instance's [`WidgetId`], which is stable for the life of the instance.
    fn make_cell(self) -> Cell {
        let content = self.make_widget();
        Cell {
            id: CellId::from(content.id()),
            inset: Dimension::ZERO,
            content,
        }
    }
}

/// An ordered collection of [`Cell`]s, in declaration order.
#[derive(Debug, Default)]
#[must_use]
pub struct CellList {
    ordered: OrderedLots<Cell>,
}

impl CellList {
    /// Returns an empty collection.
    pub const fn new() -> Self {
        Self {
            ordered: OrderedLots::new(),
        }
    }

    /// Adds `cell` to the end of the collection.
    pub fn push(&mut self, cell: impl MakeCell) {
        self.ordered.push(cell.make_cell());
    }

    /// Adds `cell` to the end of the collection and returns self.
    pub fn and(mut self, cell: impl MakeCell) -> Self {
        self.push(cell);
        self
    }

    /// Returns the number of cells in this collection.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    /// Returns true if there are no cells in this collection.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    /// Returns the cell at `index`, or `None` if `index` is out of bounds.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Cell> {
        self.ordered.get_by_index(index)
    }

    /// Returns an iterator over the cells in declaration order.
    pub fn iter(&self) -> alot::ordered::Iter<'_, Cell> {
        self.into_iter()
    }

    /// Applies `spacing` of leading space to every cell except the first.
    ///
    /// The first cell is left unmodified. `spacing` must be non-negative;
    /// negative spacing produces unspecified layout and is only checked in
    /// debug builds.
    pub fn spaced(mut self, spacing: impl Into<Dimension>) -> Self {
        let spacing = spacing.into();
        debug_assert!(
            !spacing.is_negative(),
            "spacing must be non-negative"
        );
        for index in 1..self.ordered.len() {
            self.ordered[index].inset = spacing;
        }
        self
    }
}

impl Clone for CellList {
    fn clone(&self) -> Self {
        let mut ordered = OrderedLots::new();
        for cell in &self.ordered {
            ordered.push(cell.clone());
        }
        Self { ordered }
    }
}

impl PartialEq for CellList {
    /// Unlike [`Cell`] equality, two collections are only equal when every
    /// pair of cells also shares its content instance and inset, so that
    /// storing a collection in a
    /// [`Dynamic`](crate::value::Dynamic) does not treat a content-only
    /// change as a no-op.
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self.iter().zip(other.iter()).all(|(a, b)| {
                a.id == b.id && a.inset == b.inset && a.content == b.content
            })
    }
}

impl Index<usize> for CellList {
    type Output = Cell;

    fn index(&self, index: usize) -> &Self::Output {
        &self.ordered[index]
    }
}

impl IndexMut<usize> for CellList {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.ordered[index]
    }
}

impl<'a> IntoIterator for &'a CellList {
    type IntoIter = alot::ordered::Iter<'a, Cell>;
    type Item = &'a Cell;

    fn into_iter(self) -> Self::IntoIter {
        self.ordered.iter()
    }
}

impl<C> FromIterator<C> for CellList
where
    C: MakeCell,
{
    fn from_iter<T>(iter: T) -> Self
    where
        T: IntoIterator<Item = C>,
    {
        let mut cells = Self::new();
        for cell in iter {
            cells.push(cell);
        }
        cells
    }
}

impl<C> Extend<C> for CellList
where
    C: MakeCell,
{
    fn extend<T>(&mut self, iter: T)
    where
        T: IntoIterator<Item = C>,
    {
        for cell in iter {
            self.push(cell);
        }
    }
}
