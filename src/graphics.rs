//! A 2d drawing seam.
//!
//! This crate is headless: widgets describe their drawing through a
//! [`Surface`], and an embedding shell decides how those operations reach a
//! screen, a terminal, or a test buffer.

use figures::units::Px;
use figures::{Point, Rect, Size, Zero};
use palette::Srgba;

/// A render target for widget drawing operations.
pub trait Surface {
    /// Fills `rect` with `color`.
    fn fill_rect(&mut self, rect: Rect<Px>, color: Srgba<u8>);

    /// Draws `text` with its top-left corner at `origin`.
    fn draw_text(&mut self, text: &str, origin: Point<Px>, color: Srgba<u8>);
}

/// A 2d graphics context scoped to a widget's region.
///
/// Drawing operations are interpreted relative to the region's origin.
pub struct Graphics<'gfx> {
    surface: &'gfx mut dyn Surface,
    origin: Point<Px>,
    region: Size<Px>,
}

impl<'gfx> Graphics<'gfx> {
    /// Returns a new graphics context drawing to `surface`.
    pub fn new(surface: &'gfx mut dyn Surface, region: Size<Px>) -> Self {
        Self {
            surface,
            origin: Point::new(Px::ZERO, Px::ZERO),
            region,
        }
    }

    /// Returns the size of the region being drawn.
    #[must_use]
    pub fn size(&self) -> Size<Px> {
        self.region
    }

    /// Fills `rect` with `color`, relative to this context's origin.
    pub fn fill_rect(&mut self, rect: Rect<Px>, color: Srgba<u8>) {
        self.surface
            .fill_rect(Rect::new(rect.origin + self.origin, rect.size), color);
    }

    /// Draws `text` with its top-left corner at `origin`, relative to this
    /// context's origin.
    pub fn draw_text(&mut self, text: &str, origin: Point<Px>, color: Srgba<u8>) {
        self.surface.draw_text(text, origin + self.origin, color);
    }

    /// Returns a context whose drawing operations are relative to the origin
    /// of `region`.
    pub fn for_region(&mut self, region: Rect<Px>) -> Graphics<'_> {
        Graphics {
            surface: &mut *self.surface,
            origin: self.origin + region.origin,
            region: region.size,
        }
    }
}

/// A [`Surface`] that records its drawing operations.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    operations: Vec<DrawOperation>,
}

impl RecordingSurface {
    /// Returns the operations drawn since the last [`clear`](Self::clear).
    #[must_use]
    pub fn operations(&self) -> &[DrawOperation] {
        &self.operations
    }

    /// Forgets all recorded operations.
    pub fn clear(&mut self) {
        self.operations.clear();
    }
}

impl Surface for RecordingSurface {
    fn fill_rect(&mut self, rect: Rect<Px>, color: Srgba<u8>) {
        self.operations.push(DrawOperation::FillRect { rect, color });
    }

    fn draw_text(&mut self, text: &str, origin: Point<Px>, color: Srgba<u8>) {
        self.operations.push(DrawOperation::Text {
            text: text.to_string(),
            origin,
            color,
        });
    }
}

/// One recorded [`Surface`] operation.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOperation {
    /// A filled rectangle.
    FillRect {
        /// The filled region.
        rect: Rect<Px>,
        /// The fill color.
        color: Srgba<u8>,
    },
    /// A run of text.
    Text {
        /// The drawn text.
        text: String,
        /// The top-left corner of the text.
        origin: Point<Px>,
        /// The text color.
        color: Srgba<u8>,
    },
}

#[cfg(test)]
mod tests {
    use figures::units::Px;
    use figures::{Point, Rect, Size};
    use palette::Srgba;

    use super::{DrawOperation, Graphics, RecordingSurface, Surface};

    #[test]
    fn regions_translate_operations() {
        let mut surface = RecordingSurface::default();
        let mut graphics = Graphics::new(&mut surface, Size::new(Px::new(100), Px::new(100)));
        let region = Rect::new(
            Point::new(Px::new(10), Px::new(20)),
            Size::new(Px::new(50), Px::new(30)),
        );
        let mut scoped = graphics.for_region(region);
        assert_eq!(scoped.size(), region.size);
        scoped.draw_text("hi", Point::new(Px::new(1), Px::new(2)), black());
        drop(scoped);
        graphics.fill_rect(
            Rect::new(Point::new(Px::new(0), Px::new(0)), Size::new(Px::new(1), Px::new(1))),
            black(),
        );
        assert_eq!(
            surface.operations(),
            &[
                DrawOperation::Text {
                    text: "hi".to_string(),
                    origin: Point::new(Px::new(11), Px::new(22)),
                    color: black(),
                },
                DrawOperation::FillRect {
                    rect: Rect::new(
                        Point::new(Px::new(0), Px::new(0)),
                        Size::new(Px::new(1), Px::new(1))
                    ),
                    color: black(),
                },
            ]
        );
    }

    fn black() -> Srgba<u8> {
        Srgba::new(0, 0, 0, 255)
    }
}
