//! Time-based property tweens
//!
//! A tween moves a set of properties from the values a target holds when the
//! tween becomes active to a set of goals, over a fixed duration with one
//! easing. Progress is derived from the frame clock, never accumulated.

use crate::completion::Notifier;
use crate::config::TweenDefaults;
use crate::easing::Easing;
use crate::engine::TimelineId;
use crate::property::{interpolate, Properties, Property};
use crate::target::TargetRef;

/// Shortest duration a tween may have
pub const MIN_DURATION_MS: f64 = 1.0;

/// Per-tween overrides; unset fields take the engine's [`TweenDefaults`]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TweenOptions {
    pub duration_ms: Option<f64>,
    pub easing: Option<Easing>,
    pub delay_ms: Option<f64>,
}

impl TweenOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn duration(mut self, ms: f64) -> Self {
        self.duration_ms = Some(ms);
        self
    }

    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = Some(easing);
        self
    }

    /// Set the easing by its camelCase name; unknown names use `easeOut`
    pub fn easing_name(self, name: &str) -> Self {
        self.easing(Easing::from_name(name))
    }

    pub fn delay(mut self, ms: f64) -> Self {
        self.delay_ms = Some(ms);
        self
    }

    /// Fill unset fields from `defaults` and clamp to valid ranges
    pub fn resolve(&self, defaults: &TweenDefaults) -> ResolvedTween {
        let duration_ms = self.duration_ms.unwrap_or(defaults.duration_ms);
        let delay_ms = self.delay_ms.unwrap_or(defaults.delay_ms);
        ResolvedTween {
            duration_ms: if duration_ms.is_finite() {
                duration_ms.max(MIN_DURATION_MS)
            } else {
                MIN_DURATION_MS
            },
            easing: self.easing.unwrap_or(defaults.easing),
            delay_ms: if delay_ms.is_finite() {
                delay_ms.max(0.0)
            } else {
                0.0
            },
        }
    }
}

/// Tween timing with every field decided
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResolvedTween {
    pub duration_ms: f64,
    pub easing: Easing,
    pub delay_ms: f64,
}

enum Phase {
    /// Waiting for its start time; nothing has been read yet
    Pending,
    /// Active with the values captured at activation
    Running { initial: Properties },
}

/// Result of driving a tween for one frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum TweenFrame {
    Waiting,
    Running { eased: f32 },
    Finished { eased: f32 },
}

pub(crate) struct Tween {
    target: TargetRef,
    goals: Properties,
    easing: Easing,
    start_ms: f64,
    duration_ms: f64,
    phase: Phase,
    pub(crate) notifier: Notifier,
    pub(crate) owner: Option<TimelineId>,
}

impl Tween {
    pub(crate) fn new(
        target: TargetRef,
        goals: Properties,
        timing: ResolvedTween,
        now_ms: f64,
        notifier: Notifier,
    ) -> Self {
        Self {
            target,
            goals,
            easing: timing.easing,
            start_ms: now_ms + timing.delay_ms,
            duration_ms: timing.duration_ms,
            phase: Phase::Pending,
            notifier,
            owner: None,
        }
    }

    pub(crate) fn is_pending(&self) -> bool {
        matches!(self.phase, Phase::Pending)
    }

    /// Apply the frame for `now_ms`, activating the tween if it is due
    pub(crate) fn frame(&mut self, now_ms: f64) -> TweenFrame {
        if self.is_pending() {
            if now_ms < self.start_ms {
                return TweenFrame::Waiting;
            }
            self.activate();
        }

        let Phase::Running { initial } = &self.phase else {
            return TweenFrame::Waiting;
        };

        let progress = ((now_ms - self.start_ms) / self.duration_ms).clamp(0.0, 1.0) as f32;
        let eased = self.easing.apply(progress);

        let values: Properties = self
            .goals
            .iter()
            .map(|(property, goal)| {
                let from = initial
                    .get(property)
                    .cloned()
                    .unwrap_or_else(|| property.identity());
                (property.clone(), interpolate(&from, goal, eased))
            })
            .collect();

        if let Err(err) = self.target.write_all(values.iter().map(|(p, v)| (p, v))) {
            tracing::debug!(error = %err, "tween write skipped");
        }

        if progress >= 1.0 {
            TweenFrame::Finished { eased }
        } else {
            TweenFrame::Running { eased }
        }
    }

    /// Capture the start values from the target's current state
    fn activate(&mut self) {
        let initial = match self.target.snapshot(self.goals.properties()) {
            Ok(initial) => initial,
            Err(err) => {
                tracing::debug!(error = %err, "tween target unavailable at start");
                self.goals
                    .properties()
                    .map(|p: &Property| (p.clone(), p.identity()))
                    .collect()
            }
        };
        self.phase = Phase::Running { initial };
    }
}
