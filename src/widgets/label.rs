//! A read-only text widget.

use figures::units::{Lp, Px, UPx};
use figures::{IntoUnsigned, Point, ScreenScale, Size, Zero};
use intentional::Cast;
use palette::Srgba;
use unicode_width::UnicodeWidthStr;

use crate::context::{GraphicsContext, LayoutContext};
use crate::value::{IntoValue, Value};
use crate::widget::{MakeWidget, Widget, WidgetInstance};
use crate::ConstraintLimit;

/// A widget that displays a single line of text.
///
/// This crate is headless, so the label estimates its measurements from the
/// text's display width rather than from font metrics; the embedding shell's
/// [`Surface`](crate::Surface) decides how the text is actually rasterized.
#[derive(Debug)]
pub struct Label {
    text: Value<String>,
    color: Value<Srgba<u8>>,
}

impl Label {
    /// Returns a label displaying `text`.
    pub fn new(text: impl IntoValue<String>) -> Self {
        Self {
            text: text.into_value(),
            color: Value::Constant(Srgba::new(0, 0, 0, 255)),
        }
    }

    /// Sets the color to draw the text with and returns self.
    #[must_use]
    pub fn color(mut self, color: impl IntoValue<Srgba<u8>>) -> Self {
        self.color = color.into_value();
        self
    }
}

fn line_height() -> Lp {
    Lp::points(16)
}

fn advance_width() -> Lp {
    Lp::points(8)
}

impl Widget for Label {
    fn redraw(&mut self, context: &mut GraphicsContext<'_>) {
        let text = self.text.get_tracking_redraw(context);
        let color = self.color.get_tracking_redraw(context);
        context
            .gfx
            .draw_text(&text, Point::new(Px::ZERO, Px::ZERO), color);
    }

    fn layout(
        &mut self,
        _available_space: Size<ConstraintLimit>,
        context: &mut LayoutContext,
    ) -> Size<UPx> {
        let text = self.text.get_tracking_invalidate(context);
        let advance = advance_width().into_px(context.scale()).into_unsigned();
        let width = UPx::new(advance.get() * text.as_str().width().cast::<u32>());
        let height = line_height().into_px(context.scale()).into_unsigned();
        Size::new(width, height)
    }
}

impl MakeWidget for &str {
    fn make_widget(self) -> WidgetInstance {
        Label::new(self).make_widget()
    }
}

impl MakeWidget for String {
    fn make_widget(self) -> WidgetInstance {
        Label::new(Value::Constant(self)).make_widget()
    }
}

#[cfg(test)]
mod tests {
    use figures::units::UPx;
    use figures::{Fraction, Size, Zero};

    use super::Label;
    use crate::context::LayoutContext;
    use crate::widget::{MakeWidget, Widget};
    use crate::ConstraintLimit;

    #[test]
    fn wider_text_measures_wider() {
        let mut narrow = Label::new("hi");
        let mut wide = Label::new("hello there");
        let available = Size::new(
            ConstraintLimit::ClippedAfter(UPx::new(1000)),
            ConstraintLimit::ClippedAfter(UPx::new(1000)),
        );
        let mut context = LayoutContext::for_measurement(Fraction::ONE);
        let narrow_size = narrow.layout(available, &mut context);
        let wide_size = wide.layout(available, &mut context);
        assert!(narrow_size.width > UPx::ZERO);
        assert!(wide_size.width > narrow_size.width);
        assert_eq!(wide_size.height, narrow_size.height);
    }

    #[test]
    fn strings_make_labels() {
        let widget = "hello".make_widget();
        assert!(widget.lock().downcast_ref::<Label>().is_some());
    }
}
