//! Renders a 1000-row list headlessly and prints what the table actually did.

use trestle::cell::{Cell, CellList};
use trestle::figures::units::UPx;
use trestle::figures::Size;
use trestle::widgets::{ListView, SeparatorStyle};
use trestle::window::VirtualWindow;
use trestle::RecordingSurface;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("trestle=debug")),
        )
        .init();

    let rows: CellList = (0..1000)
        .map(|id: usize| Cell::new(id, id.to_string()))
        .collect();

    let list = ListView::new(rows).configure(|table| {
        let options = table.options_mut();
        options.separator_style = SeparatorStyle::None;
        options.allows_selection = false;
    });

    let mut window = VirtualWindow::new(list, Size::new(UPx::new(390), UPx::new(844)));
    let mut surface = RecordingSurface::default();
    window.render(&mut surface);

    let guard = window.root().lock();
    let list = guard
        .downcast_ref::<ListView>()
        .expect("root is the list view");
    let table = list.table().expect("table is constructed");
    println!(
        "first render: {} row operations, {} of {} rows bound, {} draw operations",
        table.operations(),
        table.content_queries(),
        table.row_count(),
        surface.operations().len(),
    );
    drop(guard);

    // Nothing changed, so a second render applies zero row operations.
    surface.clear();
    window.render(&mut surface);
    let guard = window.root().lock();
    let list = guard
        .downcast_ref::<ListView>()
        .expect("root is the list view");
    let table = list.table().expect("table is constructed");
    println!(
        "second render: {} total row operations, last change set empty: {}",
        table.operations(),
        table.last_changes().is_empty(),
    );
}
