//! Gesture recognition
//!
//! Reduces pointer and two-touch samples to [`GestureEvent`]s. The recognizer
//! is platform-agnostic: callers feed it positions and timestamps from
//! whatever input layer they have.

use crate::events::{Direction, GestureEvent, Point};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Distance/duration limits used to classify a release
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct GestureThresholds {
    /// A swipe must travel strictly more than this (px)
    pub swipe_min_distance: f32,
    /// ...within strictly less than this (ms)
    pub swipe_max_duration_ms: f64,
    /// A tap must travel strictly less than this (px)
    pub tap_max_distance: f32,
    pub tap_max_duration_ms: f64,
}

impl Default for GestureThresholds {
    fn default() -> Self {
        Self {
            swipe_min_distance: 50.0,
            swipe_max_duration_ms: 300.0,
            tap_max_distance: 10.0,
            tap_max_duration_ms: 200.0,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct PinchStart {
    distance: f32,
    angle: f32,
}

/// Single-pointer tracker with optional two-touch pinch state
#[derive(Clone, Debug)]
pub struct GestureRecognizer {
    thresholds: GestureThresholds,
    start: Point,
    current: Point,
    start_time_ms: f64,
    tracking: bool,
    velocity: Point,
    distance: f32,
    direction: Direction,
    pinch: Option<PinchStart>,
}

impl GestureRecognizer {
    pub fn new(thresholds: GestureThresholds) -> Self {
        Self {
            thresholds,
            start: Point::ZERO,
            current: Point::ZERO,
            start_time_ms: 0.0,
            tracking: false,
            velocity: Point::ZERO,
            distance: 0.0,
            direction: Direction::Up,
            pinch: None,
        }
    }

    pub fn thresholds(&self) -> &GestureThresholds {
        &self.thresholds
    }

    pub fn is_tracking(&self) -> bool {
        self.tracking
    }

    /// Begin tracking at `position`
    pub fn pointer_down(&mut self, position: Point, timestamp_ms: f64) {
        self.start = position;
        self.current = position;
        self.start_time_ms = timestamp_ms;
        self.tracking = true;
        self.velocity = Point::ZERO;
        self.distance = 0.0;
    }

    /// Feed a move sample; yields a drag while tracking
    pub fn pointer_move(&mut self, position: Point) -> Option<GestureEvent> {
        if !self.tracking {
            return None;
        }

        let delta = Point::new(position.x - self.current.x, position.y - self.current.y);
        self.velocity = delta;
        self.current = position;

        let total_dx = position.x - self.start.x;
        let total_dy = position.y - self.start.y;
        self.distance = Point::new(total_dx, total_dy).length();
        self.direction = Direction::from_delta(total_dx, total_dy);

        Some(GestureEvent::Drag {
            delta,
            velocity: self.velocity,
            distance: self.distance,
            direction: self.direction,
        })
    }

    /// Finish tracking, classifying the press as a swipe and/or a tap
    pub fn pointer_up(&mut self, timestamp_ms: f64) -> SmallVec<[GestureEvent; 2]> {
        let mut events = SmallVec::new();
        if !self.tracking {
            return events;
        }

        let duration = timestamp_ms - self.start_time_ms;
        let t = &self.thresholds;

        if self.distance > t.swipe_min_distance && duration < t.swipe_max_duration_ms {
            events.push(GestureEvent::Swipe {
                direction: self.direction,
                distance: self.distance,
                velocity: self.velocity,
            });
        }

        if self.distance < t.tap_max_distance && duration < t.tap_max_duration_ms {
            events.push(GestureEvent::Tap {
                position: self.current,
            });
        }

        self.tracking = false;
        self.pinch = None;
        events
    }

    /// Record the initial geometry of a two-touch gesture
    pub fn touches_start(&mut self, a: Point, b: Point) {
        self.pinch = Some(PinchStart {
            distance: a.distance_to(b),
            angle: a.angle_to(b),
        });
    }

    /// Feed a two-touch sample; yields a pinch once a start was recorded
    pub fn touches_move(&mut self, a: Point, b: Point) -> Option<GestureEvent> {
        let start = self.pinch?;

        // A zero initial spread has no meaningful ratio
        let scale = if start.distance > 0.0 {
            a.distance_to(b) / start.distance
        } else {
            1.0
        };

        Some(GestureEvent::Pinch {
            scale,
            rotation: a.angle_to(b) - start.angle,
            center: a.midpoint(b),
        })
    }
}

impl Default for GestureRecognizer {
    fn default() -> Self {
        Self::new(GestureThresholds::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drag_reports_step_delta_and_total_distance() {
        let mut recognizer = GestureRecognizer::default();
        recognizer.pointer_down(Point::new(0.0, 0.0), 0.0);
        recognizer.pointer_move(Point::new(3.0, 0.0));

        match recognizer.pointer_move(Point::new(3.0, 4.0)) {
            Some(GestureEvent::Drag {
                delta,
                distance,
                direction,
                ..
            }) => {
                assert_eq!(delta, Point::new(0.0, 4.0));
                assert!((distance - 5.0).abs() < 1e-6);
                assert_eq!(direction, Direction::Down);
            }
            other => panic!("expected drag, got {:?}", other),
        }
    }

    #[test]
    fn test_move_without_press_is_ignored() {
        let mut recognizer = GestureRecognizer::default();
        assert!(recognizer.pointer_move(Point::new(10.0, 10.0)).is_none());
        assert!(recognizer.pointer_up(100.0).is_empty());
    }

    #[test]
    fn test_fast_long_release_is_swipe() {
        let mut recognizer = GestureRecognizer::default();
        recognizer.pointer_down(Point::new(0.0, 0.0), 1_000.0);
        recognizer.pointer_move(Point::new(-80.0, 5.0));

        let events = recognizer.pointer_up(1_150.0);
        assert_eq!(events.len(), 1);
        assert!(matches!(
            events[0],
            GestureEvent::Swipe {
                direction: Direction::Left,
                ..
            }
        ));
        assert!(!recognizer.is_tracking());
    }

    #[test]
    fn test_slow_release_is_not_swipe() {
        let mut recognizer = GestureRecognizer::default();
        recognizer.pointer_down(Point::new(0.0, 0.0), 0.0);
        recognizer.pointer_move(Point::new(120.0, 0.0));
        assert!(recognizer.pointer_up(300.0).is_empty());
    }

    #[test]
    fn test_short_press_is_tap() {
        let mut recognizer = GestureRecognizer::default();
        recognizer.pointer_down(Point::new(40.0, 40.0), 0.0);
        recognizer.pointer_move(Point::new(42.0, 41.0));

        let events = recognizer.pointer_up(120.0);
        assert_eq!(
            events.as_slice(),
            &[GestureEvent::Tap {
                position: Point::new(42.0, 41.0)
            }]
        );
    }

    #[test]
    fn test_pinch_scale_and_rotation() {
        let mut recognizer = GestureRecognizer::default();
        recognizer.touches_start(Point::new(0.0, 0.0), Point::new(10.0, 0.0));

        match recognizer.touches_move(Point::new(0.0, 0.0), Point::new(0.0, 20.0)) {
            Some(GestureEvent::Pinch {
                scale,
                rotation,
                center,
            }) => {
                assert!((scale - 2.0).abs() < 1e-6);
                assert!((rotation - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
                assert_eq!(center, Point::new(0.0, 10.0));
            }
            other => panic!("expected pinch, got {:?}", other),
        }
    }

    #[test]
    fn test_pinch_requires_start() {
        let mut recognizer = GestureRecognizer::default();
        assert!(recognizer
            .touches_move(Point::new(0.0, 0.0), Point::new(1.0, 1.0))
            .is_none());
    }
}
