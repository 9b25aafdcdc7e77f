//! Built-in [`Widget`](crate::widget::Widget) implementations.

mod label;
pub mod list_view;
mod space;
pub mod table;

pub use label::Label;
pub use list_view::ListView;
pub use space::Space;
pub use table::{RowHeight, SeparatorStyle, TableOptions, TableRow, TableView};
