//! Integration tests for recognizer + dispatcher
//!
//! Raw pointer samples go in one end, per-target handlers run at the other.

use neurox_core::{
    Direction, GestureDispatcher, GestureEvent, GestureKind, GestureRecognizer,
    GestureThresholds, Point,
};

#[derive(Default)]
struct Log {
    drags: usize,
    swipes: Vec<Direction>,
    taps: usize,
    last_scale: Option<f32>,
}

fn dispatcher() -> GestureDispatcher<Log> {
    let mut dispatcher = GestureDispatcher::new();
    dispatcher.register(1, GestureKind::Drag, |_, log: &mut Log| log.drags += 1);
    dispatcher.register(1, GestureKind::Swipe, |event, log: &mut Log| {
        if let GestureEvent::Swipe { direction, .. } = event {
            log.swipes.push(*direction);
        }
    });
    dispatcher.register(1, GestureKind::Tap, |_, log: &mut Log| log.taps += 1);
    dispatcher.register(1, GestureKind::Pinch, |event, log: &mut Log| {
        if let GestureEvent::Pinch { scale, .. } = event {
            log.last_scale = Some(*scale);
        }
    });
    dispatcher
}

#[test]
fn test_fast_flick_becomes_swipe() {
    let mut recognizer = GestureRecognizer::default();
    let mut dispatcher = dispatcher();
    let mut log = Log::default();

    recognizer.pointer_down(Point::new(0.0, 100.0), 0.0);
    for x in [20.0, 45.0, 80.0] {
        if let Some(drag) = recognizer.pointer_move(Point::new(x, 104.0)) {
            dispatcher.dispatch(1, &drag, &mut log);
        }
    }
    for event in recognizer.pointer_up(150.0) {
        dispatcher.dispatch(1, &event, &mut log);
    }

    assert_eq!(log.drags, 3);
    assert_eq!(log.swipes, vec![Direction::Right]);
    assert_eq!(log.taps, 0);
}

#[test]
fn test_slow_drag_is_neither_swipe_nor_tap() {
    let mut recognizer = GestureRecognizer::default();
    let mut dispatcher = dispatcher();
    let mut log = Log::default();

    recognizer.pointer_down(Point::ZERO, 0.0);
    if let Some(drag) = recognizer.pointer_move(Point::new(0.0, -120.0)) {
        dispatcher.dispatch(1, &drag, &mut log);
    }
    for event in recognizer.pointer_up(900.0) {
        dispatcher.dispatch(1, &event, &mut log);
    }

    assert_eq!(log.drags, 1);
    assert!(log.swipes.is_empty());
    assert_eq!(log.taps, 0);
}

#[test]
fn test_pinch_reaches_only_its_target() {
    let mut recognizer = GestureRecognizer::default();
    let mut dispatcher = dispatcher();
    let mut log = Log::default();

    recognizer.touches_start(Point::new(0.0, 0.0), Point::new(100.0, 0.0));
    let pinch = recognizer
        .touches_move(Point::new(0.0, 0.0), Point::new(150.0, 0.0))
        .unwrap();

    assert_eq!(dispatcher.dispatch(2, &pinch, &mut log), 0);
    assert_eq!(log.last_scale, None);
    assert_eq!(dispatcher.dispatch(1, &pinch, &mut log), 1);
    assert_eq!(log.last_scale, Some(1.5));
}

#[test]
fn test_custom_thresholds_change_classification() {
    let thresholds = GestureThresholds {
        tap_max_distance: 30.0,
        ..GestureThresholds::default()
    };
    let mut recognizer = GestureRecognizer::new(thresholds);
    let mut dispatcher = dispatcher();
    let mut log = Log::default();

    recognizer.pointer_down(Point::ZERO, 0.0);
    recognizer.pointer_move(Point::new(20.0, 0.0));
    for event in recognizer.pointer_up(100.0) {
        dispatcher.dispatch(1, &event, &mut log);
    }
    assert_eq!(log.taps, 1);
}
