//! Micro-interaction presets
//!
//! The canned tweens wired to buttons, cards, inputs, reveal-on-scroll and
//! loading indicators.

use crate::easing::Easing;
use crate::engine::{MotionEngine, TweenHandle};
use crate::property::{Properties, Property};
use crate::target::TargetRef;
use crate::timeline::Timeline;
use crate::tween::TweenOptions;

/// Resting card shadow
pub const CARD_SHADOW: &str = "0 4px 20px rgba(0,0,0,0.1)";
/// Raised card shadow
pub const CARD_SHADOW_RAISED: &str = "0 20px 40px rgba(0,0,0,0.2)";
/// Focused input border
pub const FOCUS_BORDER: &str = "#00D9FF";
/// Unfocused input border
pub const BLUR_BORDER: &str = "rgba(255,255,255,0.1)";

/// A property set paired with its timing
#[derive(Clone, Debug, PartialEq)]
pub struct MotionPreset {
    pub properties: Properties,
    pub options: TweenOptions,
}

impl MotionPreset {
    pub fn new(properties: Properties, duration_ms: f64, easing: Easing) -> Self {
        Self {
            properties,
            options: TweenOptions::new().duration(duration_ms).easing(easing),
        }
    }

    /// Start this preset as a tween on `target`
    pub fn play(
        self,
        engine: &mut MotionEngine,
        target: impl Into<TargetRef>,
    ) -> Option<TweenHandle> {
        engine.animate(target, self.properties, self.options)
    }
}

/// Pre-built micro-interactions
pub struct MicroInteraction;

impl MicroInteraction {
    // ========================================================================
    // Buttons
    // ========================================================================

    pub fn button_hover() -> MotionPreset {
        MotionPreset::new(
            Properties::new()
                .with(Property::Scale, 1.05)
                .with(Property::Brightness, 1.1),
            200.0,
            Easing::EaseOut,
        )
    }

    pub fn button_leave() -> MotionPreset {
        MotionPreset::new(
            Properties::new()
                .with(Property::Scale, 1.0)
                .with(Property::Brightness, 1.0),
            200.0,
            Easing::EaseOut,
        )
    }

    pub fn button_press() -> MotionPreset {
        MotionPreset::new(
            Properties::new().with(Property::Scale, 0.95),
            100.0,
            Easing::EaseOut,
        )
    }

    /// Springs back past the hover scale
    pub fn button_release() -> MotionPreset {
        MotionPreset::new(
            Properties::new().with(Property::Scale, 1.05),
            150.0,
            Easing::EaseOutBack,
        )
    }

    // ========================================================================
    // Cards and inputs
    // ========================================================================

    pub fn card_hover() -> MotionPreset {
        MotionPreset::new(
            Properties::new()
                .with(Property::TranslateY, -8.0)
                .with(Property::Scale, 1.02)
                .with(Property::BoxShadow, CARD_SHADOW_RAISED),
            300.0,
            Easing::EaseOut,
        )
    }

    pub fn card_leave() -> MotionPreset {
        MotionPreset::new(
            Properties::new()
                .with(Property::TranslateY, 0.0)
                .with(Property::Scale, 1.0)
                .with(Property::BoxShadow, CARD_SHADOW),
            300.0,
            Easing::EaseOut,
        )
    }

    pub fn input_focus() -> MotionPreset {
        MotionPreset::new(
            Properties::new()
                .with(Property::Scale, 1.02)
                .with(Property::BorderColor, FOCUS_BORDER),
            200.0,
            Easing::EaseOut,
        )
    }

    pub fn input_blur() -> MotionPreset {
        MotionPreset::new(
            Properties::new()
                .with(Property::Scale, 1.0)
                .with(Property::BorderColor, BLUR_BORDER),
            200.0,
            Easing::EaseOut,
        )
    }

    // ========================================================================
    // Entry and loading
    // ========================================================================

    /// Fade and slide an element into its resting place
    pub fn reveal() -> MotionPreset {
        MotionPreset::new(
            Properties::new()
                .with(Property::Opacity, 1.0)
                .with(Property::TranslateY, 0.0),
            600.0,
            Easing::EaseOut,
        )
    }

    /// Endless grow-and-dim pulse for loading indicators
    pub fn loading_pulse(target: impl Into<TargetRef>) -> Timeline {
        let target = target.into();
        let options = TweenOptions::new()
            .duration(1000.0)
            .easing(Easing::EaseInOut);
        Timeline::new()
            .to(
                target.clone(),
                Properties::new()
                    .with(Property::Scale, 1.1)
                    .with(Property::Opacity, 0.8),
                options,
            )
            .to(
                target,
                Properties::new()
                    .with(Property::Scale, 1.0)
                    .with(Property::Opacity, 1.0),
                options,
            )
            .looping(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::target::StyleTarget;

    fn engine() -> (MotionEngine, ManualClock) {
        let clock = ManualClock::new(0.0);
        (MotionEngine::new().with_clock(clock.clone()), clock)
    }

    #[test]
    fn test_button_hover_reaches_goal() {
        let (mut engine, clock) = engine();
        let button = StyleTarget::new().shared();
        MicroInteraction::button_hover()
            .play(&mut engine, &button)
            .unwrap();

        clock.set(200.0);
        engine.tick();
        let button = button.lock().unwrap();
        assert_eq!(button.number(&Property::Scale), Some(1.05));
        assert_eq!(button.filter_string(), "brightness(1.1)");
    }

    #[test]
    fn test_button_release_overshoots() {
        let (mut engine, clock) = engine();
        let button = StyleTarget::new()
            .with(Property::Scale, 0.95)
            .shared();
        MicroInteraction::button_release()
            .play(&mut engine, &button)
            .unwrap();

        clock.set(90.0);
        engine.tick();
        let scale = button.lock().unwrap().number(&Property::Scale).unwrap();
        assert!(scale > 1.05, "Should overshoot before settling");
    }

    #[test]
    fn test_card_hover_composes_transform() {
        let (mut engine, clock) = engine();
        let card = StyleTarget::new().shared();
        MicroInteraction::card_hover().play(&mut engine, &card).unwrap();

        clock.set(300.0);
        engine.tick();
        assert_eq!(
            card.lock().unwrap().transform_string(),
            "translateY(-8px) scale(1.02)"
        );
    }

    #[test]
    fn test_input_focus_then_blur() {
        let (mut engine, clock) = engine();
        let input = StyleTarget::new().shared();
        MicroInteraction::input_focus().play(&mut engine, &input).unwrap();
        clock.set(200.0);
        engine.tick();

        MicroInteraction::input_blur().play(&mut engine, &input).unwrap();
        clock.set(400.0);
        engine.tick();

        let input = input.lock().unwrap();
        assert_eq!(input.number(&Property::Scale), Some(1.0));
        assert_eq!(
            crate::target::Target::read(&*input, &Property::BorderColor),
            Some(BLUR_BORDER.into())
        );
    }

    #[test]
    fn test_loading_pulse_loops() {
        let (mut engine, clock) = engine();
        let spinner = StyleTarget::new().shared();
        let id = engine.add_timeline(MicroInteraction::loading_pulse(&spinner));
        engine.play_timeline(id);

        for step in 1..=5 {
            clock.set(step as f64 * 1000.0);
            engine.tick();
        }
        assert!(engine.is_timeline_playing(id));
        assert_eq!(
            spinner.lock().unwrap().number(&Property::Scale),
            Some(1.1)
        );
    }
}
