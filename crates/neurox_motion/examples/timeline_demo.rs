//! Timeline Demo
//!
//! Drives the motion engine headlessly from a 60fps loop:
//! - A card revealed with a from-step, held, then sprung into place
//! - A swipe gesture routed to a listener that nudges the card
//! - A looping loading pulse stopped after a few cycles
//!
//! Run with: RUST_LOG=neurox_motion=debug cargo run -p neurox_motion --example timeline_demo

use anyhow::Result;
use neurox_core::{GestureEvent, GestureKind, GestureRecognizer, Point};
use neurox_motion::{
    MicroInteraction, MotionConfig, MotionEngine, Properties, Property, SpringConfig,
    StyleTarget, SystemClock, TargetRef, Timeline, TweenOptions,
};
use std::thread;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const CARD: u64 = 1;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => MotionConfig::load(path)?,
        None => MotionConfig::default(),
    };
    let frame = Duration::from_secs_f64(config.frame.frame_interval_ms() / 1000.0);
    let gestures = GestureRecognizer::new(config.gesture);
    let mut engine = MotionEngine::new()
        .with_clock(SystemClock::new())
        .with_config(config);

    let card = StyleTarget::new().shared();
    let spinner = StyleTarget::new().shared();

    let intro = engine.add_timeline(
        Timeline::new()
            .from(
                &card,
                Properties::new()
                    .with(Property::Opacity, 0.0)
                    .with(Property::TranslateY, 40.0),
                TweenOptions::new().duration(600.0),
            )
            .wait(300.0)
            .spring(
                &card,
                Properties::new().with(Property::Scale, 1.05),
                SpringConfig::wobbly(),
            ),
    );
    let pulse = engine.add_timeline(MicroInteraction::loading_pulse(&spinner));

    let card_ref = TargetRef::from(&card);
    engine.add_gesture_listener(CARD, GestureKind::Swipe, move |event, engine| {
        if let GestureEvent::Swipe { distance, .. } = event {
            tracing::info!(distance, "card swiped");
            engine.animate(
                card_ref.clone(),
                Properties::new().with(Property::TranslateX, distance.min(120.0)),
                TweenOptions::new().duration(250.0),
            );
        }
    });

    engine.play_timeline(intro);
    engine.play_timeline(pulse);
    let intro_done = engine.timeline_finished(intro);

    simulate_swipe(&mut engine, gestures);

    let mut frames = 0u32;
    while engine.tick() {
        frames += 1;
        if frames % 30 == 0 {
            let card = card.lock().map_err(|_| anyhow::anyhow!("card lock poisoned"))?;
            tracing::info!(
                transform = %card.transform_string(),
                opacity = ?card.number(&Property::Opacity),
                "card"
            );
        }
        if frames == 240 {
            engine.stop_timeline(pulse);
        }
        thread::sleep(frame);
    }

    let outcome = pollster::block_on(intro_done);
    tracing::info!(?outcome, frames, "intro finished");
    engine.teardown();
    Ok(())
}

/// Feed a fast rightward flick through the recognizer
fn simulate_swipe(engine: &mut MotionEngine, mut recognizer: GestureRecognizer) {
    recognizer.pointer_down(Point::new(0.0, 0.0), 0.0);
    for x in [30.0, 60.0, 90.0] {
        if let Some(drag) = recognizer.pointer_move(Point::new(x, 2.0)) {
            engine.dispatch_gesture(CARD, &drag);
        }
    }
    for event in recognizer.pointer_up(120.0) {
        engine.dispatch_gesture(CARD, &event);
    }
}
