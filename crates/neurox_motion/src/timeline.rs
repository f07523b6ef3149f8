//! Timeline orchestration for multiple animations
//!
//! A timeline is an ordered list of steps run strictly one after another.
//! The engine owns registered timelines and starts step N+1 only once it has
//! observed step N's completion.

use crate::completion::Notifier;
use crate::engine::{SpringId, TimerId, TweenId};
use crate::property::Properties;
use crate::spring::SpringConfig;
use crate::target::TargetRef;
use crate::tween::TweenOptions;

/// One step of a timeline
#[derive(Clone, Debug)]
pub enum TimelineStep {
    /// Tween from the current values to `properties`
    To {
        target: TargetRef,
        properties: Properties,
        options: TweenOptions,
    },
    /// Jump to `properties`, then tween back to the values held before the jump
    From {
        target: TargetRef,
        properties: Properties,
        options: TweenOptions,
    },
    /// Spring from the current values to `properties`
    Spring {
        target: TargetRef,
        properties: Properties,
        config: SpringConfig,
    },
    /// Do nothing for `ms` milliseconds
    Wait { ms: f64 },
}

impl TimelineStep {
    pub fn target(&self) -> Option<&TargetRef> {
        match self {
            TimelineStep::To { target, .. }
            | TimelineStep::From { target, .. }
            | TimelineStep::Spring { target, .. } => Some(target),
            TimelineStep::Wait { .. } => None,
        }
    }
}

/// The engine task currently running a step
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ActiveStep {
    Tween(TweenId),
    Spring(SpringId),
    Wait(TimerId),
}

/// An ordered sequence of steps
///
/// ```rust
/// use neurox_motion::{Properties, Property, StyleTarget, Timeline, TweenOptions};
///
/// let card = StyleTarget::new().shared();
/// let timeline = Timeline::new()
///     .to(&card, Properties::new().with(Property::Opacity, 1.0), TweenOptions::new())
///     .wait(500.0)
///     .to(&card, Properties::new().with(Property::Scale, 1.1), TweenOptions::new());
/// assert_eq!(timeline.len(), 3);
/// ```
#[derive(Debug, Default)]
pub struct Timeline {
    steps: Vec<TimelineStep>,
    looping: bool,
    pub(crate) cursor: usize,
    pub(crate) running: bool,
    pub(crate) active: Option<ActiveStep>,
    pub(crate) waiters: Vec<Notifier>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn to(
        self,
        target: impl Into<TargetRef>,
        properties: Properties,
        options: TweenOptions,
    ) -> Self {
        self.step(TimelineStep::To {
            target: target.into(),
            properties,
            options,
        })
    }

    pub fn from(
        self,
        target: impl Into<TargetRef>,
        properties: Properties,
        options: TweenOptions,
    ) -> Self {
        self.step(TimelineStep::From {
            target: target.into(),
            properties,
            options,
        })
    }

    pub fn spring(
        self,
        target: impl Into<TargetRef>,
        properties: Properties,
        config: SpringConfig,
    ) -> Self {
        self.step(TimelineStep::Spring {
            target: target.into(),
            properties,
            config,
        })
    }

    pub fn wait(self, ms: f64) -> Self {
        self.step(TimelineStep::Wait { ms })
    }

    /// Append an already-built step
    pub fn step(mut self, step: TimelineStep) -> Self {
        self.steps.push(step);
        self
    }

    /// Builder: restart from the first step after the last one completes
    pub fn looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    pub fn is_playing(&self) -> bool {
        self.running
    }

    pub fn steps(&self) -> &[TimelineStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Index of the step that will be dispatched next
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Take the next step to dispatch, wrapping around when looping
    ///
    /// Returns `None` when the run is over.
    pub(crate) fn next_step(&mut self) -> Option<TimelineStep> {
        if self.cursor >= self.steps.len() {
            if !self.looping || self.steps.is_empty() {
                return None;
            }
            self.cursor = 0;
        }
        let step = self.steps.get(self.cursor).cloned();
        self.cursor += 1;
        step
    }

    pub(crate) fn restart(&mut self) {
        self.cursor = 0;
        self.running = true;
        self.active = None;
    }

    /// Clear the run state and resolve anyone waiting on the run
    pub(crate) fn end_run(&mut self, outcome: crate::completion::Outcome) {
        self.running = false;
        self.active = None;
        for mut waiter in self.waiters.drain(..) {
            waiter.resolve(outcome);
        }
    }
}
