//! Mutates a reactive cell list and prints the minimal diffs the table
//! applies on each render.

use trestle::cell::{Cell, CellList, MakeCell};
use trestle::figures::units::{Px, UPx};
use trestle::figures::Size;
use trestle::value::Dynamic;
use trestle::widgets::ListView;
use trestle::window::VirtualWindow;
use trestle::RecordingSurface;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("trestle=trace"))
        .init();

    let fruit = Dynamic::new(
        Cell::new("apple", "Apple")
            .and(Cell::new("banana", "Banana"))
            .and(Cell::new("cherry", "Cherry")),
    );

    let list = ListView::new(&fruit).spacing(Px::new(8));
    let mut window = VirtualWindow::new(list, Size::new(UPx::new(320), UPx::new(480)));
    let mut surface = RecordingSurface::default();

    window.render(&mut surface);
    report(&window, "initial render");

    fruit.map_mut(|cells| {
        *cells = CellList::new()
            .and(Cell::new("apple", "Apple"))
            .and(Cell::new("cherry", "Cherry"))
            .and(Cell::new("durian", "Durian"));
    });
    assert!(window.needs_render());
    surface.clear();
    window.render(&mut surface);
    report(&window, "after replacing banana with durian");
}

fn report(window: &VirtualWindow, label: &str) {
    let guard = window.root().lock();
    let list = guard
        .downcast_ref::<ListView>()
        .expect("root is the list view");
    let table = list.table().expect("table is constructed");
    let changes = table.last_changes();
    println!(
        "{label}: -{} +{} ~{} moved {}",
        changes.removed.len(),
        changes.inserted.len(),
        changes.updated.len(),
        changes.moved.len(),
    );
}
