//! Hosting for driving widgets through layout and render passes.
//!
//! This crate does not open windows. A [`VirtualWindow`] owns a root widget
//! and replays the render cycle a windowing shell would: reactive values mark
//! the window dirty through its [`HostHandle`], and each
//! [`render`](VirtualWindow::render) call runs one layout pass followed by
//! one redraw pass against a caller-provided [`Surface`].

use std::fmt::{self, Debug};
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use ahash::AHashSet;
use figures::units::UPx;
use figures::{Fraction, IntoSigned, Size};
use parking_lot::Mutex;

use crate::context::{GraphicsContext, LayoutContext, WidgetContext};
use crate::graphics::{Graphics, Surface};
use crate::widget::{MakeWidget, WidgetId, WidgetInstance};
use crate::ConstraintLimit;

/// A type that reacts to widgets becoming out of date.
pub trait Host: Send + Sync {
    /// The host's contents need to be redrawn.
    fn set_needs_redraw(&self);

    /// `widget`'s layout is out of date.
    fn invalidate(&self, widget: WidgetId);
}

/// A shared reference to a [`Host`].
///
/// Handles compare and hash by the host they point to, allowing reactive
/// values to deduplicate wake-up registrations.
#[derive(Clone)]
pub struct HostHandle(Arc<dyn Host>);

impl HostHandle {
    /// Returns a handle pointing at `host`.
    #[must_use]
    pub fn new(host: Arc<dyn Host>) -> Self {
        Self(host)
    }

    /// Marks the host's contents as needing a redraw.
    pub fn set_needs_redraw(&self) {
        self.0.set_needs_redraw();
    }

    /// Marks `widget`'s layout as out of date.
    pub fn invalidate(&self, widget: WidgetId) {
        self.0.invalidate(widget);
    }

    fn as_ptr(&self) -> *const () {
        Arc::as_ptr(&self.0).cast()
    }
}

impl Debug for HostHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("HostHandle").field(&self.as_ptr()).finish()
    }
}

impl Eq for HostHandle {}

impl PartialEq for HostHandle {
    fn eq(&self, other: &Self) -> bool {
        self.as_ptr() == other.as_ptr()
    }
}

impl Hash for HostHandle {
    fn hash<H>(&self, state: &mut H)
    where
        H: Hasher,
    {
        self.as_ptr().hash(state);
    }
}

/// A window that hosts a root widget without any windowing system.
pub struct VirtualWindow {
    root: WidgetInstance,
    handle: HostHandle,
    invalidation: Arc<WindowInvalidation>,
    scale: Fraction,
    size: Size<UPx>,
}

impl VirtualWindow {
    /// Returns a window of `size` hosting `root`. The window starts out
    /// needing its first render.
    pub fn new(root: impl MakeWidget, size: Size<UPx>) -> Self {
        let invalidation = Arc::new(WindowInvalidation {
            redraw: AtomicBool::new(true),
            invalidated: Mutex::default(),
        });
        let handle = HostHandle::new(invalidation.clone());
        Self {
            root: root.make_widget(),
            handle,
            invalidation,
            scale: Fraction::ONE,
            size,
        }
    }

    /// Returns the root widget of this window.
    #[must_use]
    pub fn root(&self) -> &WidgetInstance {
        &self.root
    }

    /// Returns the size of this window.
    #[must_use]
    pub fn size(&self) -> Size<UPx> {
        self.size
    }

    /// Resizes this window, causing a new render to be needed.
    pub fn resize(&mut self, size: Size<UPx>) {
        if self.size != size {
            self.size = size;
            self.handle.set_needs_redraw();
        }
    }

    /// Returns the display scale used to convert logical pixels.
    #[must_use]
    pub fn scale(&self) -> Fraction {
        self.scale
    }

    /// Sets the display scale, causing a new render to be needed.
    pub fn set_scale(&mut self, scale: Fraction) {
        if self.scale != scale {
            self.scale = scale;
            self.handle.set_needs_redraw();
        }
    }

    /// Returns true if the contents have changed since the last call to
    /// [`layout`](Self::layout) or [`render`](Self::render).
    #[must_use]
    pub fn needs_render(&self) -> bool {
        self.invalidation.redraw.load(Ordering::Acquire)
            || !self.invalidation.invalidated.lock().is_empty()
    }

    /// Runs one layout pass over the root widget, returning its laid-out
    /// size.
    ///
    /// Values read during the pass re-register their wake-ups, so a change
    /// made after this call marks the window as needing another render.
    pub fn layout(&mut self) -> Size<UPx> {
        self.invalidation.clear();
        let mut context = LayoutContext::new(WidgetContext::new(
            self.handle.clone(),
            self.root.id(),
            self.scale,
        ));
        self.root
            .layout(self.size.map(ConstraintLimit::Known), &mut context)
    }

    /// Runs one layout pass followed by one redraw pass against `surface`,
    /// returning the root widget's laid-out size.
    pub fn render(&mut self, surface: &mut dyn Surface) -> Size<UPx> {
        let laid_out = self.layout();
        let graphics = Graphics::new(surface, laid_out.into_signed());
        let mut context = GraphicsContext::new(
            WidgetContext::new(self.handle.clone(), self.root.id(), self.scale),
            graphics,
        );
        self.root.redraw(&mut context);
        laid_out
    }
}

impl Debug for VirtualWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VirtualWindow")
            .field("root", &self.root.id())
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
struct WindowInvalidation {
    redraw: AtomicBool,
    invalidated: Mutex<AHashSet<WidgetId>>,
}

impl WindowInvalidation {
    fn clear(&self) {
        self.redraw.store(false, Ordering::Release);
        self.invalidated.lock().clear();
    }
}

impl Host for WindowInvalidation {
    fn set_needs_redraw(&self) {
        self.redraw.store(true, Ordering::Release);
    }

    fn invalidate(&self, widget: WidgetId) {
        self.invalidated.lock().insert(widget);
    }
}
