//! Neurox Motion
//!
//! Per-element animation scheduling: tweens, spring physics, and timeline
//! sequencing, all driven from one explicit frame tick.
//!
//! # Features
//!
//! - **Easing Library**: the classic cubic, elastic, back and bounce curves
//! - **Tweens**: time-based interpolation of a property set on a target
//! - **Spring Physics**: fixed-step semi-implicit Euler springs with joint settling
//! - **Timelines**: strictly sequential to/from/spring/wait steps
//! - **Micro-interactions**: hover, press, focus, reveal and pulse presets
//!
//! # Example
//!
//! ```rust
//! use neurox_motion::{
//!     Easing, ManualClock, MotionEngine, Properties, Property, StyleTarget, TweenOptions,
//! };
//!
//! let clock = ManualClock::new(0.0);
//! let mut engine = MotionEngine::new().with_clock(clock.clone());
//! let card = StyleTarget::new().shared();
//!
//! engine.animate(
//!     &card,
//!     Properties::new().with(Property::TranslateX, 100.0),
//!     TweenOptions::new().duration(1000.0).easing(Easing::EaseOut),
//! );
//!
//! clock.set(1000.0);
//! engine.tick();
//! assert_eq!(card.lock().unwrap().number(&Property::TranslateX), Some(100.0));
//! ```

pub mod clock;
pub mod completion;
pub mod config;
pub mod easing;
pub mod engine;
pub mod error;
pub mod parallax;
pub mod presets;
pub mod property;
pub mod spring;
pub mod target;
pub mod timeline;
pub mod tween;

pub use clock::{Clock, FrameClock, ManualClock, SystemClock};
pub use completion::{Completion, MotionEvent, Outcome};
pub use config::{FrameConfig, MotionConfig, ParallaxDefaults, TweenDefaults};
pub use easing::Easing;
pub use engine::{
    MotionEngine, ParallaxId, SpringHandle, SpringId, TimelineId, TimerId, TweenHandle, TweenId,
};
pub use error::{ConfigError, MotionError, TargetError};
pub use parallax::{Bounds, ParallaxAxis, ParallaxLayer};
pub use presets::{MicroInteraction, MotionPreset};
pub use property::{Properties, Property, Value};
pub use spring::{SpringAxis, SpringConfig, SpringSet};
pub use target::{StyleTarget, Target, TargetHandle, TargetRef};
pub use timeline::{Timeline, TimelineStep};
pub use tween::{ResolvedTween, TweenOptions};
