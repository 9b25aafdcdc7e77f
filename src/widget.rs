//! Types for creating reusable widgets (aka components or views).

use std::any::Any;
use std::fmt::Debug;
use std::sync::atomic::{self, AtomicU64};
use std::sync::Arc;

use figures::units::UPx;
use figures::Size;
use parking_lot::{Mutex, MutexGuard};

use crate::context::{GraphicsContext, LayoutContext};
use crate::ConstraintLimit;

/// A type that makes up a graphical user interface.
///
/// This type can go by many names in other UI frameworks: View, Component,
/// Control.
pub trait Widget: Send + Debug + 'static {
    /// Redraw the contents of this widget.
    fn redraw(&mut self, context: &mut GraphicsContext<'_>);

    /// Layout this widget and returns the ideal size based on its contents and
    /// the `available_space`.
    #[allow(unused_variables)]
    fn layout(
        &mut self,
        available_space: Size<ConstraintLimit>,
        context: &mut LayoutContext,
    ) -> Size<UPx> {
        available_space.map(ConstraintLimit::min)
    }

    /// The widget has been bound into a live hierarchy.
    fn mounted(&mut self) {}

    /// The widget has been removed from its hierarchy.
    fn unmounted(&mut self) {}
}

pub(crate) trait AnyWidget: Widget {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T> AnyWidget for T
where
    T: Widget,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// An instance of a [`Widget`].
#[derive(Clone, Debug)]
pub struct WidgetInstance {
    data: Arc<WidgetInstanceData>,
}

#[derive(Debug)]
struct WidgetInstanceData {
    id: WidgetId,
    widget: Mutex<Box<dyn AnyWidget>>,
}

impl WidgetInstance {
    /// Returns a new instance containing `widget` that is assigned the unique
    /// `id` provided.
    pub fn with_tag<W>(widget: W, tag: WidgetTag) -> Self
    where
        W: Widget,
    {
        Self {
            data: Arc::new(WidgetInstanceData {
                id: tag.into(),
                widget: Mutex::new(Box::new(widget)),
            }),
        }
    }

    /// Returns a new instance containing `widget`.
    pub fn new<W>(widget: W) -> Self
    where
        W: Widget,
    {
        Self::with_tag(widget, WidgetTag::unique())
    }

    /// Returns the unique id of this widget instance.
    #[must_use]
    pub fn id(&self) -> WidgetId {
        self.data.id
    }

    /// Locks the widget for exclusive access. Locking widgets should only be
    /// done for brief moments of time when you are certain no deadlocks can
    /// occur due to other widget locks being held.
    #[must_use]
    pub fn lock(&self) -> WidgetGuard<'_> {
        WidgetGuard(self.data.widget.lock())
    }

    /// Lays out the contained widget, scoping `context` to it.
    pub fn layout(
        &self,
        available_space: Size<ConstraintLimit>,
        context: &mut LayoutContext,
    ) -> Size<UPx> {
        let mut widget = self.data.widget.lock();
        let mut context = context.for_child(self.id());
        widget.layout(available_space, &mut context)
    }

    /// Redraws the contained widget. `context` must already be scoped to this
    /// widget's region.
    pub fn redraw(&self, context: &mut GraphicsContext<'_>) {
        self.data.widget.lock().redraw(context);
    }

    pub(crate) fn mounted(&self) {
        self.data.widget.lock().mounted();
    }

    pub(crate) fn unmounted(&self) {
        self.data.widget.lock().unmounted();
    }
}

impl AsRef<WidgetId> for WidgetInstance {
    fn as_ref(&self) -> &WidgetId {
        &self.data.id
    }
}

impl Eq for WidgetInstance {}

impl PartialEq for WidgetInstance {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }
}

/// Exclusive access to a [`WidgetInstance`]'s widget.
pub struct WidgetGuard<'a>(MutexGuard<'a, Box<dyn AnyWidget>>);

impl WidgetGuard<'_> {
    /// Returns a reference to the widget as `T`, or `None` if the widget is
    /// not of type `T`.
    #[must_use]
    pub fn downcast_ref<T>(&self) -> Option<&T>
    where
        T: Widget,
    {
        self.0.as_any().downcast_ref()
    }

    /// Returns an exclusive reference to the widget as `T`, or `None` if the
    /// widget is not of type `T`.
    #[must_use]
    pub fn downcast_mut<T>(&mut self) -> Option<&mut T>
    where
        T: Widget,
    {
        self.0.as_any_mut().downcast_mut()
    }
}

/// A type that can create a [`WidgetInstance`].
pub trait MakeWidget: Sized {
    /// Returns a new widget.
    fn make_widget(self) -> WidgetInstance;
}

impl<T> MakeWidget for T
where
    T: Widget,
{
    fn make_widget(self) -> WidgetInstance {
        WidgetInstance::new(self)
    }
}

impl MakeWidget for WidgetInstance {
    fn make_widget(self) -> WidgetInstance {
        self
    }
}

/// A function that can be invoked with a parameter (`T`) and returns `R`.
///
/// This type is used by widgets to signal various events.
pub struct Callback<T = (), R = ()>(Box<dyn CallbackFunction<T, R>>);

impl<T, R> Debug for Callback<T, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Callback")
            .field(&(std::ptr::from_ref(self)))
            .finish()
    }
}

impl<T, R> Callback<T, R> {
    /// Returns a new instance that calls `function` each time the callback is
    /// invoked.
    pub fn new<F>(function: F) -> Self
    where
        F: FnMut(T) -> R + Send + 'static,
    {
        Self(Box::new(function))
    }

    /// Invokes the wrapped function and returns the produced value.
    pub fn invoke(&mut self, value: T) -> R {
        self.0.invoke(value)
    }
}

trait CallbackFunction<T, R>: Send {
    fn invoke(&mut self, value: T) -> R;
}

impl<T, R, F> CallbackFunction<T, R> for F
where
    F: FnMut(T) -> R + Send,
{
    fn invoke(&mut self, value: T) -> R {
        self(value)
    }
}

/// The unique id of a [`WidgetInstance`].
///
/// Each [`WidgetInstance`] is guaranteed to have a unique [`WidgetId`] across
/// the lifetime of an application.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash, Ord, PartialOrd)]
pub struct WidgetId(u64);

impl WidgetId {
    fn unique() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, atomic::Ordering::Acquire))
    }
}

/// A [`WidgetId`] that has not been assigned to a [`WidgetInstance`].
///
/// This type cannot be cloned or copied to ensure only a single widget can be
/// assigned a given [`WidgetId`].
#[derive(Eq, PartialEq, Debug)]
pub struct WidgetTag(WidgetId);

impl WidgetTag {
    /// Returns a unique tag and its contained id.
    #[must_use]
    pub fn new() -> (Self, WidgetId) {
        let tag = Self::unique();
        let id = tag.0;
        (tag, id)
    }

    /// Returns a newly allocated [`WidgetId`] that is guaranteed to be unique
    /// for the lifetime of the application.
    #[must_use]
    pub fn unique() -> Self {
        Self(WidgetId::unique())
    }

    /// Returns the contained widget id.
    #[must_use]
    pub const fn id(&self) -> WidgetId {
        self.0
    }
}

impl From<WidgetTag> for WidgetId {
    fn from(value: WidgetTag) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::{Callback, MakeWidget, WidgetTag};
    use crate::widgets::Space;

    #[test]
    fn instance_ids_are_unique() {
        let a = Space::clear().make_widget();
        let b = Space::clear().make_widget();
        assert_ne!(a.id(), b.id());
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }

    #[test]
    fn tags_preallocate_ids() {
        let (tag, id) = WidgetTag::new();
        let widget = crate::widget::WidgetInstance::with_tag(Space::clear(), tag);
        assert_eq!(widget.id(), id);
    }

    #[test]
    fn downcasting() {
        let widget = Space::clear().make_widget();
        assert!(widget.lock().downcast_ref::<Space>().is_some());
    }

    #[test]
    fn callbacks_invoke() {
        let mut callback = Callback::new(|value: u32| value + 1);
        assert_eq!(callback.invoke(1), 2);
    }
}
