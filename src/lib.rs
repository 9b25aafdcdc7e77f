#![doc = include_str!("../.crate-docs.md")]
#![warn(clippy::pedantic, missing_docs)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]

pub mod cell;
pub mod context;
mod graphics;
pub mod snapshot;
pub mod styles;
pub mod value;
pub mod widget;
pub mod widgets;
pub mod window;

use figures::units::UPx;
use figures::Zero;

pub use figures;
pub use palette;

pub use self::graphics::{DrawOperation, Graphics, RecordingSurface, Surface};

/// A limit used when measuring a widget.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ConstraintLimit {
    /// The widget is expected to occupy a known size.
    Known(UPx),
    /// The widget is expected to resize itself to fit within the size
    /// provided.
    ClippedAfter(UPx),
}

impl ConstraintLimit {
    /// Returns the maximum measurement that will fit the constraint.
    #[must_use]
    pub fn max(self) -> UPx {
        match self {
            ConstraintLimit::Known(size) | ConstraintLimit::ClippedAfter(size) => size,
        }
    }

    /// Returns the minimum measurement that satisfies the constraint.
    #[must_use]
    pub fn min(self) -> UPx {
        match self {
            ConstraintLimit::Known(size) => size,
            ConstraintLimit::ClippedAfter(_) => UPx::ZERO,
        }
    }
}
