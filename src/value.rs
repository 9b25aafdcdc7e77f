//! Types for storing and reacting to values changing.
//!
//! A [`Dynamic`] is a reference-counted, threadsafe location that tracks a
//! [`Generation`] for its contents and wakes its observers when the contents
//! change. A [`Value`] is either a constant or a dynamic, allowing widgets to
//! accept either without generic parameters.
//!
//! Change callbacks are invoked while the value's internal state is borrowed.
//! A callback must not read or update the dynamic that invoked it, or the
//! calling thread will deadlock.

use std::fmt::{self, Debug};
use std::sync::{Arc, Weak};

use ahash::AHashSet;
use alot::{LotId, Lots};
use figures::units::{Lp, Px};
use parking_lot::Mutex;

use crate::context::WidgetContext;
use crate::styles::Dimension;
use crate::widget::WidgetId;
use crate::window::HostHandle;

/// A value that may be updated, tracking a [`Generation`] and notifying
/// observers on each change.
pub struct Dynamic<T>(Arc<DynamicData<T>>);

impl<T> Dynamic<T> {
    /// Creates a new instance wrapping `value`.
    pub fn new(value: T) -> Self {
        Self(Arc::new(DynamicData {
            state: Mutex::new(State {
                value,
                generation: Generation::default(),
                invalidation: InvalidationState::default(),
            }),
            callbacks: Mutex::new(Lots::new()),
        }))
    }

    /// Returns a weak reference to this dynamic.
    #[must_use]
    pub fn downgrade(&self) -> WeakDynamic<T> {
        WeakDynamic(Arc::downgrade(&self.0))
    }

    /// Returns the current generation of the stored value.
    #[must_use]
    pub fn generation(&self) -> Generation {
        self.0.state.lock().generation
    }

    /// Maps the contents of this dynamic with `map` and returns the result.
    pub fn map_ref<R>(&self, map: impl FnOnce(&T) -> R) -> R {
        let state = self.0.state.lock();
        map(&state.value)
    }

    /// Maps the contents of this dynamic with exclusive access and returns the
    /// result. All observers are notified after `map` returns, regardless of
    /// whether the contents were actually modified.
    pub fn map_mut<R>(&self, map: impl FnOnce(&mut T) -> R) -> R {
        let mut state = self.0.state.lock();
        let result = map(&mut state.value);
        let invalidation = state.note_changed();
        drop(state);
        invalidation.wake();
        self.0.invoke_callbacks();
        result
    }

    /// Returns a clone of the currently stored value.
    #[must_use]
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.map_ref(T::clone)
    }

    /// Returns a clone of the currently stored value, redrawing the context's
    /// host when this value changes.
    #[must_use]
    pub fn get_tracking_redraw(&self, context: &WidgetContext) -> T
    where
        T: Clone,
    {
        self.redraw_when_changed(context);
        self.get()
    }

    /// Returns a clone of the currently stored value, invalidating the
    /// context's widget when this value changes.
    #[must_use]
    pub fn get_tracking_invalidate(&self, context: &WidgetContext) -> T
    where
        T: Clone,
    {
        self.invalidate_when_changed(context);
        self.get()
    }

    /// Marks the context's host for redraw when this value changes.
    pub fn redraw_when_changed(&self, context: &WidgetContext) {
        let mut state = self.0.state.lock();
        state.invalidation.redraw.insert(context.host().clone());
    }

    /// Invalidates the context's widget when this value changes.
    pub fn invalidate_when_changed(&self, context: &WidgetContext) {
        let mut state = self.0.state.lock();
        state
            .invalidation
            .invalidate
            .insert((context.host().clone(), context.widget()));
    }

    /// Stores `new_value`, notifying observers. If the value is equal to the
    /// currently stored value, this is a no-op.
    pub fn set(&self, new_value: T)
    where
        T: PartialEq,
    {
        let _old = self.replace(new_value);
    }

    /// Replaces the contents with `new_value`, returning the previous value if
    /// it was not equal to `new_value`.
    pub fn replace(&self, new_value: T) -> Option<T>
    where
        T: PartialEq,
    {
        let mut state = self.0.state.lock();
        if state.value == new_value {
            return None;
        }
        let old = std::mem::replace(&mut state.value, new_value);
        let invalidation = state.note_changed();
        drop(state);
        invalidation.wake();
        self.0.invoke_callbacks();
        Some(old)
    }
}

impl<T> Dynamic<T>
where
    T: Send + 'static,
{
    /// Invokes `for_each` each time this value changes. The callback may
    /// disconnect itself by returning [`CallbackDisconnected`].
    ///
    /// The returned handle unregisters the callback when dropped unless
    /// [`persist()`](CallbackHandle::persist) is called.
    pub fn for_each_try<F>(&self, for_each: F) -> CallbackHandle
    where
        F: FnMut(&T) -> Result<(), CallbackDisconnected> + Send + 'static,
    {
        let id = self.0.callbacks.lock().push(Box::new(for_each));
        let registry: Arc<dyn CallbackRegistry> = self.0.clone();
        CallbackHandle {
            registered: Some((id, Arc::downgrade(&registry))),
        }
    }

    /// Invokes `for_each` each time this value changes.
    ///
    /// The returned handle unregisters the callback when dropped unless
    /// [`persist()`](CallbackHandle::persist) is called.
    pub fn for_each<F>(&self, mut for_each: F) -> CallbackHandle
    where
        F: FnMut(&T) + Send + 'static,
    {
        self.for_each_try(move |value| {
            for_each(value);
            Ok(())
        })
    }

    /// Returns a new dynamic updated with `map`'s result each time this value
    /// changes.
    pub fn map_each<R, F>(&self, mut map: F) -> Dynamic<R>
    where
        F: FnMut(&T) -> R + Send + 'static,
        R: PartialEq + Send + 'static,
    {
        let mapped = Dynamic::new(self.map_ref(&mut map));
        let weak = mapped.downgrade();
        self.for_each_try(move |value| {
            let mapped = weak.upgrade().ok_or(CallbackDisconnected)?;
            mapped.set(map(value));
            Ok(())
        })
        .persist();
        mapped
    }
}

impl<T> Clone for Dynamic<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T> Debug for Dynamic<T>
where
    T: Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.0.state.lock();
        f.debug_struct("Dynamic")
            .field("value", &state.value)
            .field("generation", &state.generation.0)
            .finish()
    }
}

impl<T> Default for Dynamic<T>
where
    T: Default,
{
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> PartialEq for Dynamic<T> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

struct DynamicData<T> {
    state: Mutex<State<T>>,
    callbacks: Mutex<Lots<Box<dyn ValueCallback<T>>>>,
}

impl<T> DynamicData<T> {
    fn invoke_callbacks(&self) {
        let mut callbacks = self.callbacks.lock();
        callbacks.drain_filter(|callback| {
            let state = self.state.lock();
            let result = callback.changed(&state.value);
            drop(state);
            result.is_err()
        });
    }
}

trait CallbackRegistry: Send + Sync {
    fn remove(&self, id: LotId);
}

impl<T> CallbackRegistry for DynamicData<T>
where
    T: Send + 'static,
{
    fn remove(&self, id: LotId) {
        self.callbacks.lock().remove(id);
    }
}

struct State<T> {
    value: T,
    generation: Generation,
    invalidation: InvalidationState,
}

impl<T> State<T> {
    fn note_changed(&mut self) -> InvalidationState {
        self.generation = self.generation.next();
        std::mem::take(&mut self.invalidation)
    }
}

#[derive(Default)]
struct InvalidationState {
    redraw: AHashSet<HostHandle>,
    invalidate: AHashSet<(HostHandle, WidgetId)>,
}

impl InvalidationState {
    fn wake(mut self) {
        for (host, widget) in self.invalidate.drain() {
            host.invalidate(widget);
        }
        for host in self.redraw.drain() {
            host.set_needs_redraw();
        }
    }
}

trait ValueCallback<T>: Send {
    fn changed(&mut self, value: &T) -> Result<(), CallbackDisconnected>;
}

impl<T, F> ValueCallback<T> for F
where
    F: FnMut(&T) -> Result<(), CallbackDisconnected> + Send,
{
    fn changed(&mut self, value: &T) -> Result<(), CallbackDisconnected> {
        self(value)
    }
}

/// A value callback has been disconnected and should be removed.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct CallbackDisconnected;

/// A registered change callback. Dropping this handle unregisters the
/// callback unless [`persist()`](Self::persist) is called.
#[must_use]
pub struct CallbackHandle {
    registered: Option<(LotId, Weak<dyn CallbackRegistry>)>,
}

impl CallbackHandle {
    /// Keeps the callback registered for as long as its dynamic exists.
    pub fn persist(mut self) {
        self.registered = None;
    }
}

impl Drop for CallbackHandle {
    fn drop(&mut self) {
        if let Some((id, registry)) = self.registered.take() {
            if let Some(registry) = registry.upgrade() {
                registry.remove(id);
            }
        }
    }
}

impl Debug for CallbackHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CallbackHandle")
            .field(&self.registered.as_ref().map(|(id, _)| id))
            .finish()
    }
}

/// A weak reference to a [`Dynamic`].
pub struct WeakDynamic<T>(Weak<DynamicData<T>>);

impl<T> WeakDynamic<T> {
    /// Returns the [`Dynamic`] if it still exists.
    #[must_use]
    pub fn upgrade(&self) -> Option<Dynamic<T>> {
        self.0.upgrade().map(Dynamic)
    }
}

impl<T> Clone for WeakDynamic<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

/// A tag that represents an individual revision of a [`Dynamic`] value.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Default, Hash)]
pub struct Generation(usize);

impl Generation {
    /// Returns the next tag.
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// A value that may be constant or dynamic.
#[derive(Clone)]
pub enum Value<T> {
    /// A value that will not ever change externally.
    Constant(T),
    /// A value that may be updated externally.
    Dynamic(Dynamic<T>),
}

impl<T> Value<T> {
    /// Returns a [`Value::Dynamic`] containing `value`.
    pub fn dynamic(value: T) -> Self {
        Self::Dynamic(Dynamic::new(value))
    }

    /// Maps the current contents to `map` and returns the result.
    pub fn map<R>(&self, map: impl FnOnce(&T) -> R) -> R {
        match self {
            Value::Constant(value) => map(value),
            Value::Dynamic(dynamic) => dynamic.map_ref(map),
        }
    }

    /// Returns a clone of the currently stored value.
    #[must_use]
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.map(T::clone)
    }

    /// Returns a clone of the currently stored value, redrawing the context's
    /// host when the value changes.
    #[must_use]
    pub fn get_tracking_redraw(&self, context: &WidgetContext) -> T
    where
        T: Clone,
    {
        match self {
            Value::Constant(value) => value.clone(),
            Value::Dynamic(dynamic) => dynamic.get_tracking_redraw(context),
        }
    }

    /// Returns a clone of the currently stored value, invalidating the
    /// context's widget when the value changes.
    #[must_use]
    pub fn get_tracking_invalidate(&self, context: &WidgetContext) -> T
    where
        T: Clone,
    {
        match self {
            Value::Constant(value) => value.clone(),
            Value::Dynamic(dynamic) => dynamic.get_tracking_invalidate(context),
        }
    }

    /// Marks the context's host for redraw when this value changes. Constant
    /// values never change, making this a no-op for them.
    pub fn redraw_when_changed(&self, context: &WidgetContext) {
        if let Value::Dynamic(dynamic) = self {
            dynamic.redraw_when_changed(context);
        }
    }

    /// Invalidates the context's widget when this value changes. Constant
    /// values never change, making this a no-op for them.
    pub fn invalidate_when_changed(&self, context: &WidgetContext) {
        if let Value::Dynamic(dynamic) = self {
            dynamic.invalidate_when_changed(context);
        }
    }

    /// Returns the current generation of the stored value, or `None` if the
    /// value is constant.
    #[must_use]
    pub fn generation(&self) -> Option<Generation> {
        match self {
            Value::Constant(_) => None,
            Value::Dynamic(dynamic) => Some(dynamic.generation()),
        }
    }

    /// Returns a new value that is updated with `map`'s result each time this
    /// value is updated.
    #[must_use]
    pub fn map_each<R, F>(&self, mut map: F) -> Value<R>
    where
        T: Send + 'static,
        F: FnMut(&T) -> R + Send + 'static,
        R: PartialEq + Send + 'static,
    {
        match self {
            Value::Constant(value) => Value::Constant(map(value)),
            Value::Dynamic(dynamic) => Value::Dynamic(dynamic.map_each(map)),
        }
    }
}

impl<T> Default for Value<T>
where
    T: Default,
{
    fn default() -> Self {
        Self::Constant(T::default())
    }
}

impl<T> Debug for Value<T>
where
    T: Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Constant(value) => f.debug_tuple("Constant").field(value).finish(),
            Value::Dynamic(dynamic) => Debug::fmt(dynamic, f),
        }
    }
}

impl<T> From<Dynamic<T>> for Value<T> {
    fn from(value: Dynamic<T>) -> Self {
        Self::Dynamic(value)
    }
}

/// A type that can be converted into a [`Value`].
pub trait IntoValue<T> {
    /// Returns this type as a [`Value`].
    fn into_value(self) -> Value<T>;
}

impl<T> IntoValue<T> for T {
    fn into_value(self) -> Value<T> {
        Value::Constant(self)
    }
}

impl<T> IntoValue<T> for Value<T> {
    fn into_value(self) -> Value<T> {
        self
    }
}

impl<T> IntoValue<T> for Dynamic<T> {
    fn into_value(self) -> Value<T> {
        Value::Dynamic(self)
    }
}

impl<T> IntoValue<T> for &Dynamic<T> {
    fn into_value(self) -> Value<T> {
        Value::Dynamic(self.clone())
    }
}

impl IntoValue<Dimension> for Px {
    fn into_value(self) -> Value<Dimension> {
        Value::Constant(Dimension::from(self))
    }
}

impl IntoValue<Dimension> for Lp {
    fn into_value(self) -> Value<Dimension> {
        Value::Constant(Dimension::from(self))
    }
}

impl IntoValue<String> for &str {
    fn into_value(self) -> Value<String> {
        Value::Constant(self.to_string())
    }
}

/// A type that can be converted into a [`Dynamic`].
pub trait IntoDynamic<T> {
    /// Returns this type as a [`Dynamic`].
    fn into_dynamic(self) -> Dynamic<T>;
}

impl<T> IntoDynamic<T> for Dynamic<T> {
    fn into_dynamic(self) -> Dynamic<T> {
        self
    }
}

impl<T> IntoDynamic<T> for Value<T> {
    fn into_dynamic(self) -> Dynamic<T> {
        match self {
            Value::Constant(value) => Dynamic::new(value),
            Value::Dynamic(dynamic) => dynamic,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::{CallbackDisconnected, Dynamic, Value};

    #[test]
    fn set_skips_equal_values() {
        let value = Dynamic::new(1);
        let generation = value.generation();
        value.set(1);
        assert_eq!(value.generation(), generation);
        value.set(2);
        assert_ne!(value.generation(), generation);
        assert_eq!(value.get(), 2);
    }

    #[test]
    fn for_each_notifies_on_change() {
        let value = Dynamic::new(0);
        let invocations = Arc::new(AtomicUsize::new(0));
        let counter = invocations.clone();
        let handle = value.for_each(move |_| {
            counter.fetch_add(1, Ordering::Relaxed);
        });
        value.set(1);
        value.set(1);
        value.set(2);
        assert_eq!(invocations.load(Ordering::Relaxed), 2);
        drop(handle);
        value.set(3);
        assert_eq!(invocations.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn callbacks_can_disconnect() {
        let value = Dynamic::new(0);
        value
            .for_each_try(|contents| {
                if *contents < 2 {
                    Ok(())
                } else {
                    Err(CallbackDisconnected)
                }
            })
            .persist();
        value.set(1);
        value.set(2);
        value.set(3);
    }

    #[test]
    fn map_each_follows_source() {
        let source = Dynamic::new(2);
        let doubled = source.map_each(|value| value * 2);
        assert_eq!(doubled.get(), 4);
        source.set(5);
        assert_eq!(doubled.get(), 10);
    }

    #[test]
    fn replace_returns_previous() {
        let value = Dynamic::new("a".to_string());
        assert_eq!(value.replace("a".to_string()), None);
        assert_eq!(value.replace("b".to_string()).as_deref(), Some("a"));
    }

    #[test]
    fn constant_values_have_no_generation() {
        let value = Value::Constant(1);
        assert!(value.generation().is_none());
        assert_eq!(value.get(), 1);
        let dynamic = Value::dynamic(1);
        assert!(dynamic.generation().is_some());
    }
}
