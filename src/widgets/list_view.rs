//! A declarative list over a diff-applied [`TableView`].

use std::fmt::{self, Debug};

use figures::units::UPx;
use figures::Size;

use crate::cell::CellList;
use crate::context::{GraphicsContext, LayoutContext};
use crate::snapshot::Snapshot;
use crate::styles::Dimension;
use crate::value::{Generation, IntoValue, Value};
use crate::widget::Widget;
use crate::widgets::table::TableView;
use crate::ConstraintLimit;

/// A widget that displays a list of cells in a [`TableView`], keeping the
/// table's rows in sync with the declared cells through minimal diffs.
///
/// Each render pass re-applies the configure callback, then flattens the
/// declared cells — spacing applied — and reloads the table, in that order.
/// Flattening only happens when the content or spacing actually changed, so a
/// render pass without changes applies zero row operations.
pub struct ListView {
    content: Value<CellList>,
    spacing: Value<Dimension>,
    configure: Option<Box<dyn FnMut(&mut TableView) + Send>>,
    coordinator: Option<Coordinator>,
}

impl ListView {
    /// Returns a list displaying `content`'s cells.
    pub fn new(content: impl IntoValue<CellList>) -> Self {
        Self {
            content: content.into_value(),
            spacing: Value::default(),
            configure: None,
            coordinator: None,
        }
    }

    /// Sets the space between consecutive rows and returns self.
    ///
    /// Spacing becomes a leading inset on every cell except the first and
    /// must be non-negative.
    #[must_use]
    pub fn spacing(mut self, spacing: impl IntoValue<Dimension>) -> Self {
        self.spacing = spacing.into_value();
        self
    }

    /// Sets a callback that can configure the underlying [`TableView`] and
    /// returns self.
    ///
    /// The callback is invoked on every render pass, before rows are
    /// reloaded or measured, so the options it sets are in effect for the
    /// whole pass. It must be idempotent.
    #[must_use]
    pub fn configure<F>(mut self, configure: F) -> Self
    where
        F: FnMut(&mut TableView) + Send + 'static,
    {
        self.configure = Some(Box::new(configure));
        self
    }

    /// Returns the underlying table, or `None` before the first render pass
    /// constructs it.
    #[must_use]
    pub fn table(&self) -> Option<&TableView> {
        self.coordinator.as_ref().map(|coordinator| &coordinator.table)
    }
}

impl Widget for ListView {
    fn redraw(&mut self, context: &mut GraphicsContext<'_>) {
        if let Some(coordinator) = &mut self.coordinator {
            coordinator.table.redraw(context);
        }
    }

    fn layout(
        &mut self,
        available_space: Size<ConstraintLimit>,
        context: &mut LayoutContext,
    ) -> Size<UPx> {
        let coordinator = self.coordinator.get_or_insert_with(Coordinator::new);

        if let Some(configure) = &mut self.configure {
            configure(&mut coordinator.table);
        }

        self.content.invalidate_when_changed(context);
        self.spacing.invalidate_when_changed(context);
        let declared = (self.content.generation(), self.spacing.generation());
        if coordinator.flattened != Some(declared) {
            let spacing = self.spacing.get();
            let cells = self.content.map(CellList::clone).spaced(spacing);
            coordinator.table.apply(Snapshot::from(cells));
            coordinator.flattened = Some(declared);
        }

        coordinator.table.layout(available_space, context)
    }
}

impl Debug for ListView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListView")
            .field("content", &self.content)
            .field("spacing", &self.spacing)
            .finish_non_exhaustive()
    }
}

/// Owns the table for the life of the mounted [`ListView`] and remembers
/// which declaration the table last saw.
struct Coordinator {
    table: TableView,
    flattened: Option<(Option<Generation>, Option<Generation>)>,
}

impl Coordinator {
    fn new() -> Self {
        tracing::debug!("constructing table view");
        Self {
            table: TableView::new(),
            flattened: None,
        }
    }
}
