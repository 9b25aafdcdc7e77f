//! A widget that occupies space, optionally filling it with a color.

use figures::units::Px;
use figures::{Point, Rect, Zero};
use palette::Srgba;

use crate::context::GraphicsContext;
use crate::value::{IntoValue, Value};
use crate::widget::Widget;

/// A widget that occupies space, optionally filling it with a color.
#[derive(Debug, Clone)]
pub struct Space {
    color: Value<Option<Srgba<u8>>>,
}

impl Space {
    /// Returns a widget that draws nothing.
    #[must_use]
    pub const fn clear() -> Self {
        Self {
            color: Value::Constant(None),
        }
    }

    /// Returns a widget that fills its space with `color`.
    pub fn colored(color: impl IntoValue<Srgba<u8>>) -> Self {
        Self {
            color: color.into_value().map_each(|color| Some(*color)),
        }
    }
}

impl Default for Space {
    fn default() -> Self {
        Self::clear()
    }
}

impl Widget for Space {
    fn redraw(&mut self, context: &mut GraphicsContext<'_>) {
        if let Some(color) = self.color.get_tracking_redraw(context) {
            let region = Rect::new(Point::new(Px::ZERO, Px::ZERO), context.gfx.size());
            context.gfx.fill_rect(region, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use figures::units::UPx;
    use figures::{Fraction, Size, Zero};

    use super::Space;
    use crate::context::LayoutContext;
    use crate::widget::Widget;
    use crate::ConstraintLimit;

    #[test]
    fn space_measures_to_the_known_constraint() {
        let mut space = Space::clear();
        let mut context = LayoutContext::for_measurement(Fraction::ONE);
        let known = space.layout(
            Size::new(
                ConstraintLimit::Known(UPx::new(10)),
                ConstraintLimit::Known(UPx::new(20)),
            ),
            &mut context,
        );
        assert_eq!(known, Size::new(UPx::new(10), UPx::new(20)));
        let clipped = space.layout(
            Size::new(
                ConstraintLimit::ClippedAfter(UPx::new(10)),
                ConstraintLimit::ClippedAfter(UPx::new(20)),
            ),
            &mut context,
        );
        assert_eq!(clipped, Size::new(UPx::ZERO, UPx::ZERO));
    }
}
