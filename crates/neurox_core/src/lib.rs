//! Neurox Core
//!
//! Input primitives shared by the Neurox front end:
//!
//! - **Gesture Vocabulary**: drag, swipe, tap and pinch events with payloads
//! - **Gesture Recognition**: pointer/touch samples reduced to gestures
//! - **Gesture Dispatch**: per-target listeners with a caller-chosen context
//!
//! # Example
//!
//! ```rust
//! use neurox_core::{GestureDispatcher, GestureKind, GestureRecognizer, Point};
//!
//! let mut recognizer = GestureRecognizer::default();
//! let mut dispatcher: GestureDispatcher<u32> = GestureDispatcher::new();
//! dispatcher.register(1, GestureKind::Tap, |_, taps| *taps += 1);
//!
//! recognizer.pointer_down(Point::new(10.0, 10.0), 0.0);
//! let mut taps = 0;
//! for event in recognizer.pointer_up(50.0) {
//!     dispatcher.dispatch(1, &event, &mut taps);
//! }
//! assert_eq!(taps, 1);
//! ```

pub mod events;
pub mod gesture;

pub use events::{
    Direction, GestureDispatcher, GestureEvent, GestureHandler, GestureHandlers,
    GestureKind, Point, TargetId,
};
pub use gesture::{GestureRecognizer, GestureThresholds};
