//! Types that provide access to the host during layout and render passes.

use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use figures::units::Px;
use figures::{Fraction, Rect};

use crate::graphics::Graphics;
use crate::widget::{WidgetId, WidgetTag};
use crate::window::{Host, HostHandle};

/// State shared by every context kind: the host being rendered for, the
/// widget currently being visited, and the display scale.
#[derive(Clone, Debug)]
pub struct WidgetContext {
    host: HostHandle,
    widget: WidgetId,
    scale: Fraction,
}

impl WidgetContext {
    pub(crate) fn new(host: HostHandle, widget: WidgetId, scale: Fraction) -> Self {
        Self {
            host,
            widget,
            scale,
        }
    }

    /// Returns the display scale used to convert logical pixels.
    #[must_use]
    pub fn scale(&self) -> Fraction {
        self.scale
    }

    /// Returns the id of the widget this context is scoped to.
    #[must_use]
    pub fn widget(&self) -> WidgetId {
        self.widget
    }

    pub(crate) fn host(&self) -> &HostHandle {
        &self.host
    }

    fn for_child(&self, child: WidgetId) -> Self {
        Self {
            host: self.host.clone(),
            widget: child,
            scale: self.scale,
        }
    }
}

/// The context of a layout pass.
#[derive(Clone, Debug)]
pub struct LayoutContext {
    widget: WidgetContext,
}

impl LayoutContext {
    pub(crate) fn new(widget: WidgetContext) -> Self {
        Self { widget }
    }

    /// Returns a context that is not attached to any host, suitable for
    /// measuring widgets outside of a
    /// [`VirtualWindow`](crate::window::VirtualWindow).
    #[must_use]
    pub fn for_measurement(scale: Fraction) -> Self {
        struct NullHost;

        impl Host for NullHost {
            fn set_needs_redraw(&self) {}

            fn invalidate(&self, _widget: WidgetId) {}
        }

        let (_, widget) = WidgetTag::new();
        Self::new(WidgetContext::new(
            HostHandle::new(Arc::new(NullHost)),
            widget,
            scale,
        ))
    }

    /// Returns a context scoped to `child`.
    #[must_use]
    pub fn for_child(&self, child: WidgetId) -> LayoutContext {
        Self {
            widget: self.widget.for_child(child),
        }
    }
}

impl Deref for LayoutContext {
    type Target = WidgetContext;

    fn deref(&self) -> &Self::Target {
        &self.widget
    }
}

/// The context of a render pass.
pub struct GraphicsContext<'gfx> {
    widget: WidgetContext,
    /// The graphics context scoped to the current widget's region.
    pub gfx: Graphics<'gfx>,
}

impl<'gfx> GraphicsContext<'gfx> {
    pub(crate) fn new(widget: WidgetContext, gfx: Graphics<'gfx>) -> Self {
        Self { widget, gfx }
    }

    /// Returns a context scoped to `child`, occupying `region` of this
    /// context.
    pub fn for_child(&mut self, child: WidgetId, region: Rect<Px>) -> GraphicsContext<'_> {
        GraphicsContext {
            widget: self.widget.for_child(child),
            gfx: self.gfx.for_region(region),
        }
    }
}

impl Deref for GraphicsContext<'_> {
    type Target = WidgetContext;

    fn deref(&self) -> &Self::Target {
        &self.widget
    }
}

impl DerefMut for GraphicsContext<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.widget
    }
}
