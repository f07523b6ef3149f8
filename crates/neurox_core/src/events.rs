//! Gesture event dispatch
//!
//! Raw pointer input is reduced elsewhere (see [`crate::gesture`]) to a small
//! vocabulary of named gestures. This module defines that vocabulary and a
//! dispatcher that routes gestures to handlers registered per target.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// Identifier of the element a gesture is routed to
pub type TargetId = u64;

/// A 2D point or vector in pixels
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn midpoint(&self, other: Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    pub fn distance_to(&self, other: Point) -> f32 {
        Point::new(other.x - self.x, other.y - self.y).length()
    }

    /// Angle of the vector from `self` to `other`, in radians
    pub fn angle_to(&self, other: Point) -> f32 {
        (other.y - self.y).atan2(other.x - self.x)
    }
}

/// Dominant direction of a pointer movement
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    /// Classify a total displacement: horizontal wins only when strictly larger
    pub fn from_delta(dx: f32, dy: f32) -> Self {
        if dx.abs() > dy.abs() {
            if dx > 0.0 {
                Direction::Right
            } else {
                Direction::Left
            }
        } else if dy > 0.0 {
            Direction::Down
        } else {
            Direction::Up
        }
    }
}

/// Discriminant of a [`GestureEvent`], used as the listener key
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GestureKind {
    Drag,
    Swipe,
    Tap,
    Pinch,
}

/// A reduced gesture with its payload
#[derive(Clone, Debug, PartialEq)]
pub enum GestureEvent {
    /// Emitted on every pointer move while tracking
    Drag {
        /// Movement since the previous sample
        delta: Point,
        /// Last per-sample movement
        velocity: Point,
        /// Straight-line distance from the press position
        distance: f32,
        direction: Direction,
    },
    /// Fast, long movement detected on release
    Swipe {
        direction: Direction,
        distance: f32,
        velocity: Point,
    },
    /// Short, nearly stationary press
    Tap { position: Point },
    /// Two-touch scale/rotate update
    Pinch {
        scale: f32,
        /// Rotation in radians relative to the initial touch angle
        rotation: f32,
        center: Point,
    },
}

impl GestureEvent {
    pub fn kind(&self) -> GestureKind {
        match self {
            GestureEvent::Drag { .. } => GestureKind::Drag,
            GestureEvent::Swipe { .. } => GestureKind::Swipe,
            GestureEvent::Tap { .. } => GestureKind::Tap,
            GestureEvent::Pinch { .. } => GestureKind::Pinch,
        }
    }
}

/// Gesture handler. `C` is the context handed to the handler, typically the
/// engine that owns the dispatcher so handlers can start animations.
pub type GestureHandler<C> = Box<dyn FnMut(&GestureEvent, &mut C)>;

/// Handlers registered under one target and gesture kind, in registration order
pub type GestureHandlers<C> = SmallVec<[GestureHandler<C>; 1]>;

/// Routes gestures to handlers registered for a target and gesture kind
pub struct GestureDispatcher<C> {
    handlers: FxHashMap<(TargetId, GestureKind), GestureHandlers<C>>,
}

impl<C> GestureDispatcher<C> {
    pub fn new() -> Self {
        Self {
            handlers: FxHashMap::default(),
        }
    }

    /// Register a handler for a target and gesture kind
    pub fn register<F>(&mut self, target: TargetId, kind: GestureKind, handler: F)
    where
        F: FnMut(&GestureEvent, &mut C) + 'static,
    {
        self.handlers
            .entry((target, kind))
            .or_default()
            .push(Box::new(handler));
    }

    /// Remove every handler for a target and gesture kind
    ///
    /// Returns `true` if anything was registered.
    pub fn remove(&mut self, target: TargetId, kind: GestureKind) -> bool {
        self.handlers.remove(&(target, kind)).is_some()
    }

    /// Remove every handler registered for a target
    pub fn remove_target(&mut self, target: TargetId) {
        self.handlers.retain(|(id, _), _| *id != target);
    }

    /// Dispatch a gesture to the handlers of `target`, returning how many ran
    pub fn dispatch(&mut self, target: TargetId, event: &GestureEvent, ctx: &mut C) -> usize {
        let Some(handlers) = self.handlers.get_mut(&(target, event.kind())) else {
            return 0;
        };
        for handler in handlers.iter_mut() {
            handler(event, ctx);
        }
        tracing::trace!(
            target_id = target,
            kind = ?event.kind(),
            count = handlers.len(),
            "gesture dispatched"
        );
        handlers.len()
    }

    /// Detach the handlers for a target and gesture kind
    ///
    /// Lets a caller run them with a context that owns this dispatcher. Hand
    /// them back with [`GestureDispatcher::restore`].
    pub fn take(&mut self, target: TargetId, kind: GestureKind) -> Option<GestureHandlers<C>> {
        self.handlers.remove(&(target, kind))
    }

    /// Put back handlers detached by [`GestureDispatcher::take`]
    ///
    /// They go ahead of anything registered under the same key meanwhile.
    pub fn restore(
        &mut self,
        target: TargetId,
        kind: GestureKind,
        mut handlers: GestureHandlers<C>,
    ) {
        let entry = self.handlers.entry((target, kind)).or_default();
        handlers.extend(entry.drain(..));
        *entry = handlers;
    }

    /// Move every handler from `other` into this dispatcher
    pub fn merge(&mut self, other: GestureDispatcher<C>) {
        for (key, handlers) in other.handlers {
            self.handlers.entry(key).or_default().extend(handlers);
        }
    }

    pub fn has_listener(&self, target: TargetId, kind: GestureKind) -> bool {
        self.handlers.contains_key(&(target, kind))
    }

    /// Number of registered handlers across all targets
    pub fn len(&self) -> usize {
        self.handlers.values().map(|h| h.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn clear(&mut self) {
        self.handlers.clear();
    }
}

impl<C> Default for GestureDispatcher<C> {
    fn default() -> Self {
        Self::new()
    }
}
