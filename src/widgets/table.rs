//! A retained row control that stays in sync with applied snapshots.
//!
//! [`TableView`] owns the displayed row set and mutates it exclusively
//! through [`apply`](TableView::apply), which computes the minimal
//! [`ChangeSet`] against the previously applied [`Snapshot`] and applies it
//! as one atomic visual update. Row content is pulled lazily: a row's widget
//! is only requested from the provider once the row enters the viewport, and
//! rows that scroll out return their container to a reuse pool.

use ahash::AHashMap;
use figures::units::{Lp, Px, UPx};
use figures::{Fraction, IntoSigned, Point, Rect, Size, Zero};
use intentional::Assert;
use palette::Srgba;

use crate::cell::{Cell, CellId};
use crate::context::{GraphicsContext, LayoutContext};
use crate::snapshot::{ChangeSet, Snapshot};
use crate::styles::Dimension;
use crate::widget::{Callback, Widget, WidgetInstance};
use crate::ConstraintLimit;

/// How separators between consecutive rows are drawn.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Default)]
pub enum SeparatorStyle {
    /// A single line between each pair of consecutive rows.
    #[default]
    SingleLine,
    /// No separators.
    None,
}

/// How row heights are determined.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum RowHeight {
    /// Each row is sized to its content.
    #[default]
    Automatic,
    /// Every row has the same fixed height.
    Fixed(Dimension),
}

/// List-wide presentation options.
///
/// Options are applied idempotently: re-applying the current options never
/// resets scroll position or discards rows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableOptions {
    /// How separators between consecutive rows are drawn.
    pub separator_style: SeparatorStyle,
    /// Whether rows can be selected.
    pub allows_selection: bool,
    /// How row heights are determined.
    pub row_height: RowHeight,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            separator_style: SeparatorStyle::SingleLine,
            allows_selection: true,
            row_height: RowHeight::Automatic,
        }
    }
}

/// A scrollable list control that displays one row per [`Cell`] of its
/// applied [`Snapshot`].
#[derive(Debug)]
pub struct TableView {
    options: TableOptions,
    rows: Vec<Row>,
    applied: Snapshot,
    archetype: Archetype,
    scroll: UPx,
    viewport: Size<UPx>,
    content_height: UPx,
    selected: Option<CellId>,
    last_changes: ChangeSet,
    operations: usize,
}

impl Default for TableView {
    fn default() -> Self {
        Self::new()
    }
}

impl TableView {
    /// Returns an empty table whose rows display their cell's content
    /// directly.
    #[must_use]
    pub fn new() -> Self {
        Self::with_provider(Callback::new(|cell: Cell| cell.content().clone()))
    }

    /// Returns an empty table that requests row content from `provider`.
    ///
    /// The provider is invoked once per binding: when a row first becomes
    /// visible, and again if the row's payload changes while bound.
    #[must_use]
    pub fn with_provider(provider: Callback<Cell, WidgetInstance>) -> Self {
        Self {
            options: TableOptions::default(),
            rows: Vec::new(),
            applied: Snapshot::default(),
            archetype: Archetype {
                provider,
                pool: Vec::new(),
                allocated: 0,
                queries: 0,
            },
            scroll: UPx::ZERO,
            viewport: Size::new(UPx::ZERO, UPx::ZERO),
            content_height: UPx::ZERO,
            selected: None,
            last_changes: ChangeSet::default(),
            operations: 0,
        }
    }

    /// Returns the current presentation options.
    #[must_use]
    pub fn options(&self) -> &TableOptions {
        &self.options
    }

    /// Returns exclusive access to the presentation options.
    pub fn options_mut(&mut self) -> &mut TableOptions {
        &mut self.options
    }

    /// Replaces the presentation options.
    pub fn apply_options(&mut self, options: TableOptions) {
        self.options = options;
    }

    /// Transforms the displayed row set into `snapshot`'s rows, applying the
    /// minimal set of removals, insertions, moves, and in-place updates.
    ///
    /// Applying a snapshot identical to the current one (by id and payload)
    /// is a no-op. Surviving rows keep their bound content and measured
    /// heights; removed rows return their containers to the reuse pool.
    pub fn apply(&mut self, snapshot: Snapshot) -> &ChangeSet {
        let changes = ChangeSet::between(&self.applied, &snapshot);
        if !changes.is_empty() {
            let mut surviving: AHashMap<CellId, Row> = std::mem::take(&mut self.rows)
                .into_iter()
                .map(|row| (row.cell.id().clone(), row))
                .collect();
            let mut rows = Vec::with_capacity(snapshot.len());
            for cell in &snapshot {
                if let Some(mut row) = surviving.remove(cell.id()) {
                    if row.cell.content().id() != cell.content().id() {
                        if let Some(slot) = &mut row.slot {
                            slot.content.unmounted();
                            slot.content = self.archetype.query(cell);
                            slot.content.mounted();
                        }
                        row.height = None;
                    }
                    row.cell = cell.clone();
                    rows.push(row);
                } else {
                    rows.push(Row {
                        cell: cell.clone(),
                        slot: None,
                        height: None,
                        offset: UPx::ZERO,
                    });
                }
            }
            for (id, row) in surviving.drain() {
                if let Some(slot) = row.slot {
                    self.archetype.retire(slot);
                }
                if self.selected.as_ref() == Some(&id) {
                    self.selected = None;
                }
            }
            self.rows = rows;
            tracing::trace!(
                removed = changes.removed.len(),
                inserted = changes.inserted.len(),
                moved = changes.moved.len(),
                updated = changes.updated.len(),
                "applied snapshot"
            );
        }
        self.applied = snapshot;
        self.operations += changes.len();
        self.last_changes = changes;
        &self.last_changes
    }

    /// Returns the number of displayed rows.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Returns the row at `index` in display order.
    #[must_use]
    pub fn row(&self, index: usize) -> Option<TableRow<'_>> {
        self.rows.get(index).map(|row| TableRow { row })
    }

    /// Returns an iterator over the rows in display order.
    pub fn rows(&self) -> impl Iterator<Item = TableRow<'_>> {
        self.rows.iter().map(|row| TableRow { row })
    }

    /// Returns the current vertical scroll offset.
    #[must_use]
    pub fn scroll(&self) -> UPx {
        self.scroll
    }

    /// Scrolls the rows so that `offset` is at the top of the viewport. The
    /// offset is clamped to the content height during the next layout.
    pub fn scroll_to(&mut self, offset: UPx) {
        self.scroll = offset;
    }

    /// Returns the total height of all rows, including insets, as of the most
    /// recent layout.
    #[must_use]
    pub fn content_height(&self) -> UPx {
        self.content_height
    }

    /// Selects the row identified by `id`, or clears the selection for
    /// `None`.
    ///
    /// Ignored when the current options disallow selection or when `id` is
    /// not present in the applied snapshot.
    pub fn select(&mut self, id: Option<CellId>) {
        if !self.options.allows_selection {
            tracing::debug!("selection is disabled; ignoring select");
            return;
        }
        match id {
            Some(id) if self.rows.iter().any(|row| row.cell.id() == &id) => {
                self.selected = Some(id);
            }
            Some(_) => {}
            None => self.selected = None,
        }
    }

    /// Returns the id of the selected row, if any.
    #[must_use]
    pub fn selection(&self) -> Option<&CellId> {
        self.selected.as_ref()
    }

    /// Returns the changes applied by the most recent
    /// [`apply`](Self::apply).
    #[must_use]
    pub fn last_changes(&self) -> &ChangeSet {
        &self.last_changes
    }

    /// Returns the total number of row operations applied over this table's
    /// lifetime.
    #[must_use]
    pub fn operations(&self) -> usize {
        self.operations
    }

    /// Returns the number of times row content has been requested from the
    /// provider.
    #[must_use]
    pub fn content_queries(&self) -> usize {
        self.archetype.queries
    }

    /// Returns the number of row containers ever created. Removed and
    /// scrolled-out rows return their containers for reuse, keeping this
    /// bounded by the most rows simultaneously visible.
    #[must_use]
    pub fn containers_allocated(&self) -> usize {
        self.archetype.allocated
    }

    fn layout_rows(
        &mut self,
        available_space: Size<ConstraintLimit>,
        context: &mut LayoutContext,
    ) -> Size<UPx> {
        if !self.options.allows_selection {
            self.selected = None;
        }
        let scale = context.scale();
        let width = available_space.width.max();
        let viewport_height = available_space.height.max();
        self.viewport = Size::new(width, viewport_height);
        let viewport_top = self.scroll;
        let viewport_bottom = self.scroll + viewport_height;
        let fixed_height = match self.options.row_height {
            RowHeight::Fixed(dimension) => Some(dimension.into_upx(scale)),
            RowHeight::Automatic => None,
        };

        let mut y = UPx::ZERO;
        let Self {
            rows, archetype, ..
        } = self;
        for row in rows.iter_mut() {
            y += row.cell.inset().into_upx(scale);
            let estimated = fixed_height
                .or(row.height)
                .unwrap_or_else(|| default_row_height(scale));
            let visible = y < viewport_bottom && y + estimated > viewport_top;
            let height = if visible {
                if row.slot.is_none() {
                    let slot = archetype.dequeue(&row.cell);
                    tracing::trace!(container = slot.container, "bound row content");
                    row.slot = Some(slot);
                }
                let slot = row.slot.as_ref().assert("row was just bound");
                let height = if let Some(fixed) = fixed_height {
                    let constraints = Size::new(
                        ConstraintLimit::Known(width),
                        ConstraintLimit::Known(fixed),
                    );
                    slot.content.layout(constraints, context);
                    fixed
                } else {
                    let constraints = Size::new(
                        ConstraintLimit::Known(width),
                        ConstraintLimit::ClippedAfter(viewport_height),
                    );
                    slot.content.layout(constraints, context).height
                };
                row.height = Some(height);
                height
            } else {
                if let Some(slot) = row.slot.take() {
                    archetype.retire(slot);
                }
                estimated
            };
            row.offset = y;
            y += height;
        }
        self.content_height = y;
        let max_scroll = self.content_height.saturating_sub(viewport_height);
        if self.scroll > max_scroll {
            self.scroll = max_scroll;
        }

        Size::new(
            width,
            match available_space.height {
                ConstraintLimit::Known(height) => height,
                ConstraintLimit::ClippedAfter(limit) => limit.min(self.content_height),
            },
        )
    }

    fn redraw_rows(&mut self, context: &mut GraphicsContext<'_>) {
        let scroll = self.scroll.into_signed();
        let width = self.viewport.width.into_signed();
        let row_count = self.rows.len();
        for (index, row) in self.rows.iter().enumerate() {
            let Some(slot) = &row.slot else {
                continue;
            };
            let height = row.height.unwrap_or(UPx::ZERO).into_signed();
            let top = row.offset.into_signed() - scroll;
            let region = Rect::new(Point::new(Px::ZERO, top), Size::new(width, height));
            if self.options.allows_selection && self.selected.as_ref() == Some(row.cell.id()) {
                context.gfx.fill_rect(region, selection_color());
            }
            slot.content
                .redraw(&mut context.for_child(slot.content.id(), region));
            if self.options.separator_style == SeparatorStyle::SingleLine && index + 1 < row_count
            {
                context.gfx.fill_rect(
                    Rect::new(
                        Point::new(Px::ZERO, top + height - Px::new(1)),
                        Size::new(width, Px::new(1)),
                    ),
                    separator_color(),
                );
            }
        }
    }
}

impl Widget for TableView {
    fn redraw(&mut self, context: &mut GraphicsContext<'_>) {
        self.redraw_rows(context);
    }

    fn layout(
        &mut self,
        available_space: Size<ConstraintLimit>,
        context: &mut LayoutContext,
    ) -> Size<UPx> {
        self.layout_rows(available_space, context)
    }
}

fn default_row_height(scale: Fraction) -> UPx {
    Dimension::Lp(Lp::points(24)).into_upx(scale)
}

fn separator_color() -> Srgba<u8> {
    Srgba::new(205, 205, 205, 255)
}

fn selection_color() -> Srgba<u8> {
    Srgba::new(213, 226, 239, 255)
}

/// A read-only view of one displayed row.
#[derive(Debug, Clone, Copy)]
pub struct TableRow<'a> {
    row: &'a Row,
}

impl TableRow<'_> {
    /// Returns the identity of this row's cell.
    #[must_use]
    pub fn id(&self) -> &CellId {
        self.row.cell.id()
    }

    /// Returns the leading space reserved before this row's content.
    #[must_use]
    pub fn inset(&self) -> Dimension {
        self.row.cell.inset()
    }

    /// Returns true if this row's content is currently bound.
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.row.slot.is_some()
    }

    /// Returns the identity of the container displaying this row, if bound.
    #[must_use]
    pub fn container(&self) -> Option<usize> {
        self.row.slot.as_ref().map(|slot| slot.container)
    }

    /// Returns the bound content widget, if bound.
    #[must_use]
    pub fn content(&self) -> Option<&WidgetInstance> {
        self.row.slot.as_ref().map(|slot| &slot.content)
    }

    /// Returns the offset of this row's content from the top of the content
    /// area, after its leading inset.
    #[must_use]
    pub fn offset(&self) -> UPx {
        self.row.offset
    }

    /// Returns this row's height as of the most recent measurement, or
    /// `None` if the row has never been measured.
    #[must_use]
    pub fn height(&self) -> Option<UPx> {
        self.row.height
    }
}

#[derive(Debug)]
struct Row {
    cell: Cell,
    slot: Option<RowSlot>,
    height: Option<UPx>,
    offset: UPx,
}

#[derive(Debug)]
struct RowSlot {
    container: usize,
    content: WidgetInstance,
}

#[derive(Debug)]
struct Archetype {
    provider: Callback<Cell, WidgetInstance>,
    pool: Vec<usize>,
    allocated: usize,
    queries: usize,
}

impl Archetype {
    fn query(&mut self, cell: &Cell) -> WidgetInstance {
        self.queries += 1;
        self.provider.invoke(cell.clone())
    }

    fn dequeue(&mut self, cell: &Cell) -> RowSlot {
        let container = self.pool.pop().unwrap_or_else(|| {
            let container = self.allocated;
            self.allocated += 1;
            container
        });
        let content = self.query(cell);
        content.mounted();
        RowSlot { container, content }
    }

    fn retire(&mut self, slot: RowSlot) {
        slot.content.unmounted();
        self.pool.push(slot.container);
    }
}

#[cfg(test)]
mod tests {
    use figures::units::{Px, UPx};
    use figures::{Fraction, Size};

    use super::{RowHeight, SeparatorStyle, TableOptions, TableView};
    use crate::cell::{Cell, CellId, MakeCell};
    use crate::context::LayoutContext;
    use crate::snapshot::Snapshot;
    use crate::styles::Dimension;
    use crate::widget::Widget;
    use crate::widgets::Space;
    use crate::ConstraintLimit;

    fn fixed_rows(table: &mut TableView, height: i32) {
        table.options_mut().row_height = RowHeight::Fixed(Dimension::from(Px::new(height)));
    }

    fn run_layout(table: &mut TableView, width: u32, height: u32) {
        let mut context = LayoutContext::for_measurement(Fraction::ONE);
        table.layout(
            Size::new(
                ConstraintLimit::Known(UPx::new(width)),
                ConstraintLimit::Known(UPx::new(height)),
            ),
            &mut context,
        );
    }

    fn snapshot(ids: &[&'static str]) -> Snapshot {
        Snapshot::new(ids.iter().map(|&id| Cell::new(id, Space::clear())))
    }

    #[test]
    fn identical_snapshots_apply_no_operations() {
        let mut table = TableView::new();
        let cells: Vec<_> = ["a", "b", "c"]
            .into_iter()
            .map(|id| Cell::new(id, Space::clear()))
            .collect();
        table.apply(Snapshot::new(cells.iter().cloned()));
        assert_eq!(table.operations(), 3);
        let changes = table.apply(Snapshot::new(cells.iter().cloned()));
        assert!(changes.is_empty());
        assert_eq!(table.operations(), 3);
    }

    #[test]
    fn rows_match_snapshot_order() {
        let mut table = TableView::new();
        table.apply(snapshot(&["a", "b", "c"]));
        let ids: Vec<_> = table.rows().map(|row| row.id().clone()).collect();
        assert_eq!(
            ids,
            vec![CellId::from("a"), CellId::from("b"), CellId::from("c")]
        );
    }

    #[test]
    fn content_is_bound_lazily() {
        let mut table = TableView::new();
        fixed_rows(&mut table, 20);
        table.apply(snapshot(&["a", "b", "c", "d", "e", "f", "g", "h"]));
        assert_eq!(table.content_queries(), 0);

        // A 50px viewport fits rows "a" through "c" (two whole, one partial).
        run_layout(&mut table, 100, 50);
        assert_eq!(table.content_queries(), 3);
        assert!(table.row(0).expect("row").is_bound());
        assert!(!table.row(5).expect("row").is_bound());
        assert_eq!(table.containers_allocated(), 3);
    }

    #[test]
    fn scrolled_out_rows_recycle_their_containers() {
        let mut table = TableView::new();
        fixed_rows(&mut table, 20);
        table.apply(snapshot(&["a", "b", "c", "d", "e", "f", "g", "h"]));
        run_layout(&mut table, 100, 40);
        assert_eq!(table.containers_allocated(), 2);

        table.scroll_to(UPx::new(80));
        run_layout(&mut table, 100, 40);
        let bound: Vec<_> = table
            .rows()
            .filter(|row| row.is_bound())
            .map(|row| row.id().clone())
            .collect();
        assert_eq!(bound, vec![CellId::from("e"), CellId::from("f")]);
        // The containers that displayed "a" and "b" were reused.
        assert_eq!(table.containers_allocated(), 2);
    }

    #[test]
    fn removed_rows_return_containers_for_reuse() {
        let mut table = TableView::new();
        fixed_rows(&mut table, 10);
        let a = Cell::new("a", Space::clear());
        let b = Cell::new("b", Space::clear());
        let c = Cell::new("c", Space::clear());
        table.apply(Snapshot::new([a.clone(), b.clone(), c.clone()]));
        run_layout(&mut table, 100, 100);
        let b_container = table.row(1).expect("row").container();
        assert_eq!(table.containers_allocated(), 3);

        table.apply(Snapshot::new([a.clone(), c.clone()]));
        table.apply(Snapshot::new([a, c, Cell::new("d", Space::clear())]));
        run_layout(&mut table, 100, 100);
        assert_eq!(table.containers_allocated(), 3);
        assert_eq!(table.row(2).expect("row").container(), b_container);
    }

    #[test]
    fn insets_offset_rows() {
        let mut table = TableView::new();
        fixed_rows(&mut table, 20);
        let cells = Cell::new("a", Space::clear())
            .and(Cell::new("b", Space::clear()))
            .and(Cell::new("c", Space::clear()))
            .spaced(Px::new(8));
        table.apply(Snapshot::from(cells));
        run_layout(&mut table, 100, 200);
        let offsets: Vec<_> = table.rows().map(|row| row.offset()).collect();
        assert_eq!(offsets, vec![UPx::new(0), UPx::new(28), UPx::new(56)]);
        assert_eq!(table.content_height(), UPx::new(76));
    }

    #[test]
    fn applying_options_preserves_scroll_and_rows() {
        let mut table = TableView::new();
        fixed_rows(&mut table, 20);
        table.apply(snapshot(&["a", "b", "c", "d", "e", "f"]));
        run_layout(&mut table, 100, 40);
        table.scroll_to(UPx::new(30));
        run_layout(&mut table, 100, 40);
        assert_eq!(table.scroll(), UPx::new(30));

        let mut options = *table.options();
        options.separator_style = SeparatorStyle::None;
        table.apply_options(options);
        table.apply_options(options);
        assert_eq!(table.scroll(), UPx::new(30));
        assert_eq!(table.row_count(), 6);
    }

    #[test]
    fn scroll_clamps_to_content() {
        let mut table = TableView::new();
        fixed_rows(&mut table, 20);
        table.apply(snapshot(&["a", "b", "c"]));
        table.scroll_to(UPx::new(1000));
        run_layout(&mut table, 100, 40);
        assert_eq!(table.scroll(), UPx::new(20));
    }

    #[test]
    fn selection_honors_options() {
        let mut table = TableView::new();
        table.apply(snapshot(&["a", "b"]));
        table.select(Some(CellId::from("a")));
        assert_eq!(table.selection(), Some(&CellId::from("a")));

        table.apply(snapshot(&["b"]));
        assert_eq!(table.selection(), None);

        table.options_mut().allows_selection = false;
        table.select(Some(CellId::from("b")));
        assert_eq!(table.selection(), None);
    }

    #[test]
    fn default_options_match_a_plain_table() {
        let options = TableOptions::default();
        assert_eq!(options.separator_style, SeparatorStyle::SingleLine);
        assert!(options.allows_selection);
        assert_eq!(options.row_height, RowHeight::Automatic);
    }
}
