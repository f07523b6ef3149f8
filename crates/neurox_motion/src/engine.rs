//! Motion engine
//!
//! Owns every running tween, spring, wait timer, timeline and parallax layer,
//! and advances them from one explicit [`MotionEngine::tick`]. The engine is
//! constructed by the application and passed around by `&mut`; there is no
//! global instance.

use crate::clock::{Clock, FrameClock, SystemClock};
use crate::completion::{Completion, MotionEvent, Notifier, Outcome};
use crate::config::MotionConfig;
use crate::error::{MotionError, Result, TargetError};
use crate::parallax::{ParallaxAxis, ParallaxLayer};
use crate::property::{Properties, Property, Value};
use crate::spring::{SpringAxis, SpringConfig, SpringSet};
use crate::target::TargetRef;
use crate::timeline::{ActiveStep, Timeline, TimelineStep};
use crate::tween::{Tween, TweenFrame, TweenOptions};
use neurox_core::{GestureDispatcher, GestureEvent, GestureKind, TargetId};
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use std::mem;
use tokio::sync::mpsc;

new_key_type! {
    /// Handle to a running tween
    pub struct TweenId;
    /// Handle to a running spring
    pub struct SpringId;
    /// Handle to a registered timeline
    pub struct TimelineId;
    /// Handle to a timeline wait step
    pub struct TimerId;
    /// Handle to a parallax layer
    pub struct ParallaxId;
}

/// A scheduled tween
#[derive(Debug)]
pub struct TweenHandle {
    pub id: TweenId,
    pub completion: Completion,
}

/// A scheduled spring
#[derive(Debug)]
pub struct SpringHandle {
    pub id: SpringId,
    pub completion: Completion,
}

/// Registration-order key across tweens and springs
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TaskKey {
    Tween(TweenId),
    Spring(SpringId),
}

struct SpringTask {
    target: TargetRef,
    set: SpringSet,
    notifier: Notifier,
    owner: Option<TimelineId>,
}

struct Timer {
    fire_at_ms: f64,
    /// Start order, breaks ties between timers due at the same instant
    seq: u64,
    owner: TimelineId,
}

struct Subscriber {
    tx: mpsc::UnboundedSender<MotionEvent>,
    progress: bool,
}

/// Timeline steps that finished during a tick
type StepsDone = SmallVec<[(TimelineId, ActiveStep); 4]>;

/// The motion engine that ticks all active animations
pub struct MotionEngine {
    clock: Box<dyn Clock>,
    config: MotionConfig,
    frame_clock: FrameClock,
    tweens: SlotMap<TweenId, Tween>,
    springs: SlotMap<SpringId, SpringTask>,
    order: Vec<TaskKey>,
    timers: SlotMap<TimerId, Timer>,
    next_timer_seq: u64,
    timelines: SlotMap<TimelineId, Timeline>,
    parallax: SlotMap<ParallaxId, ParallaxLayer>,
    gestures: GestureDispatcher<MotionEngine>,
    /// Bumped by teardown so an in-flight dispatch does not restore listeners
    gesture_epoch: u64,
    /// Listener keys whose handlers are running, innermost last
    in_flight: SmallVec<[(TargetId, GestureKind); 2]>,
    /// In-flight keys removed by their own handlers
    removed_in_flight: SmallVec<[(TargetId, GestureKind); 2]>,
    subscribers: Vec<Subscriber>,
}

impl MotionEngine {
    pub fn new() -> Self {
        Self {
            clock: Box::new(SystemClock::new()),
            config: MotionConfig::default(),
            frame_clock: FrameClock::default(),
            tweens: SlotMap::with_key(),
            springs: SlotMap::with_key(),
            order: Vec::new(),
            timers: SlotMap::with_key(),
            next_timer_seq: 0,
            timelines: SlotMap::with_key(),
            parallax: SlotMap::with_key(),
            gestures: GestureDispatcher::new(),
            gesture_epoch: 0,
            in_flight: SmallVec::new(),
            removed_in_flight: SmallVec::new(),
            subscribers: Vec::new(),
        }
    }

    /// Builder: read time from `clock`
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Builder: use `config` for defaults
    pub fn with_config(mut self, config: MotionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &MotionConfig {
        &self.config
    }

    pub fn now_ms(&self) -> f64 {
        self.clock.now_ms()
    }

    /// Receive every event posted from now on
    ///
    /// Running tweens post a `Progress` event every frame and the channel is
    /// unbounded, so drain the receiver each frame or drop it. Use
    /// [`MotionEngine::subscribe_outcomes`] to skip frame events.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<MotionEvent> {
        self.add_subscriber(true)
    }

    /// Receive completion, settle and timeline events but no `Progress`
    pub fn subscribe_outcomes(&mut self) -> mpsc::UnboundedReceiver<MotionEvent> {
        self.add_subscriber(false)
    }

    fn add_subscriber(&mut self, progress: bool) -> mpsc::UnboundedReceiver<MotionEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(Subscriber { tx, progress });
        rx
    }

    // ========================================================================
    // Tweens
    // ========================================================================

    /// Tween `properties` on `target` toward the given goals
    ///
    /// With no delay the start values are captured and the first frame is
    /// written before this returns. Returns `None` if the target is gone.
    pub fn animate(
        &mut self,
        target: impl Into<TargetRef>,
        properties: Properties,
        options: TweenOptions,
    ) -> Option<TweenHandle> {
        let now = self.clock.now_ms();
        match self.schedule_tween(target.into(), properties, options, None, now) {
            Ok((id, completion)) => Some(TweenHandle { id, completion }),
            Err(err) => {
                tracing::debug!(error = %err, "tween not scheduled");
                None
            }
        }
    }

    /// Stop a tween where it is
    ///
    /// A tween started by a timeline counts as a finished step and the
    /// timeline moves on.
    pub fn cancel_tween(&mut self, id: TweenId) -> bool {
        let Some(mut tween) = self.tweens.remove(id) else {
            return false;
        };
        tween.notifier.resolve(Outcome::Cancelled);
        tracing::debug!(?id, "tween cancelled");
        if let Some(owner) = tween.owner {
            self.step_cancelled(owner, ActiveStep::Tween(id));
        }
        true
    }

    pub fn is_tween_active(&self, id: TweenId) -> bool {
        self.tweens.contains_key(id)
    }

    pub fn tween_count(&self) -> usize {
        self.tweens.len()
    }

    fn schedule_tween(
        &mut self,
        target: TargetRef,
        goals: Properties,
        options: TweenOptions,
        owner: Option<TimelineId>,
        now: f64,
    ) -> Result<(TweenId, Completion)> {
        if !target.is_alive() {
            return Err(MotionError::InvalidTarget(TargetError::Detached));
        }

        let timing = options.resolve(&self.config.tween);
        let (notifier, completion) = Completion::channel();
        let mut tween = Tween::new(target, goals, timing, now, notifier);
        tween.owner = owner;

        let id = self.tweens.insert(tween);
        self.order.push(TaskKey::Tween(id));
        self.start_frame_clock();
        tracing::debug!(
            ?id,
            duration_ms = timing.duration_ms,
            delay_ms = timing.delay_ms,
            easing = %timing.easing,
            "tween scheduled"
        );

        if timing.delay_ms <= 0.0 {
            // The first frame is written now; the next tick continues it
            let mut done = StepsDone::new();
            self.step_tween(id, now, &mut done);
        }
        Ok((id, completion))
    }

    /// Drive one tween; returns whether it stays registered
    fn step_tween(&mut self, id: TweenId, now: f64, done: &mut StepsDone) -> bool {
        let frame = match self.tweens.get_mut(id) {
            Some(tween) => tween.frame(now),
            None => return false,
        };

        match frame {
            TweenFrame::Waiting => true,
            TweenFrame::Running { eased } => {
                tracing::trace!(?id, eased, "tween frame");
                self.post(MotionEvent::Progress { id, eased });
                true
            }
            TweenFrame::Finished { eased } => {
                self.post(MotionEvent::Progress { id, eased });
                if let Some(mut tween) = self.tweens.remove(id) {
                    tween.notifier.resolve(Outcome::Finished);
                    self.post(MotionEvent::Completed { id });
                    tracing::debug!(?id, "tween completed");
                    if let Some(owner) = tween.owner {
                        done.push((owner, ActiveStep::Tween(id)));
                    }
                }
                false
            }
        }
    }

    // ========================================================================
    // Springs
    // ========================================================================

    /// Spring the numeric `properties` of `target` toward their goals
    ///
    /// Start values are read now with zero velocity; integration starts on
    /// the next tick. Text goals are skipped. Returns `None` if the target is
    /// gone.
    pub fn spring(
        &mut self,
        target: impl Into<TargetRef>,
        properties: Properties,
        config: SpringConfig,
    ) -> Option<SpringHandle> {
        match self.schedule_spring(target.into(), properties, config, None) {
            Ok((id, completion)) => Some(SpringHandle { id, completion }),
            Err(err) => {
                tracing::debug!(error = %err, "spring not scheduled");
                None
            }
        }
    }

    /// Stop a spring where it is
    ///
    /// A spring started by a timeline counts as a finished step.
    pub fn cancel_spring(&mut self, id: SpringId) -> bool {
        let Some(mut task) = self.springs.remove(id) else {
            return false;
        };
        task.notifier.resolve(Outcome::Cancelled);
        tracing::debug!(?id, "spring cancelled");
        if let Some(owner) = task.owner {
            self.step_cancelled(owner, ActiveStep::Spring(id));
        }
        true
    }

    /// Point one axis of a running spring at a new goal, keeping its velocity
    pub fn retarget_spring(
        &mut self,
        id: SpringId,
        property: &Property,
        goal: f32,
    ) -> bool {
        self.springs
            .get_mut(id)
            .is_some_and(|task| task.set.retarget(property, goal))
    }

    /// Current simulation state of a running spring
    pub fn spring_state(&self, id: SpringId) -> Option<&SpringSet> {
        self.springs.get(id).map(|task| &task.set)
    }

    pub fn is_spring_active(&self, id: SpringId) -> bool {
        self.springs.contains_key(id)
    }

    pub fn spring_count(&self) -> usize {
        self.springs.len()
    }

    fn schedule_spring(
        &mut self,
        target: TargetRef,
        goals: Properties,
        config: SpringConfig,
        owner: Option<TimelineId>,
    ) -> Result<(SpringId, Completion)> {
        let start = target.snapshot(goals.properties())?;

        let mut set = SpringSet::new(config);
        for (property, goal) in goals.iter() {
            let Some(goal) = goal.as_number() else {
                tracing::debug!(%property, "text goal is not springable");
                continue;
            };
            let current = start
                .get(property)
                .and_then(Value::as_number)
                .unwrap_or(0.0);
            set.push(property.clone(), SpringAxis::new(current, goal));
        }

        let (notifier, completion) = Completion::channel();
        let id = self.springs.insert(SpringTask {
            target,
            set,
            notifier,
            owner,
        });
        self.order.push(TaskKey::Spring(id));
        self.start_frame_clock();
        tracing::debug!(
            ?id,
            stiffness = config.stiffness,
            damping = config.damping,
            mass = config.mass,
            "spring scheduled"
        );
        Ok((id, completion))
    }

    /// Advance one spring by a fixed step; returns whether it stays registered
    fn step_spring(&mut self, id: SpringId, done: &mut StepsDone) -> bool {
        let Some(task) = self.springs.get_mut(id) else {
            return false;
        };

        let settled = task.set.step();
        let values: Properties = task
            .set
            .axes()
            .map(|(property, axis)| (property.clone(), Value::Number(axis.current)))
            .collect();
        if let Err(err) = task.target.write_all(values.iter().map(|(p, v)| (p, v))) {
            tracing::trace!(?id, error = %err, "spring write skipped");
        }

        if !settled {
            return true;
        }

        if let Some(mut task) = self.springs.remove(id) {
            task.notifier.resolve(Outcome::Finished);
            self.post(MotionEvent::Settled { id });
            tracing::debug!(?id, steps = task.set.steps(), "spring settled");
            if let Some(owner) = task.owner {
                done.push((owner, ActiveStep::Spring(id)));
            }
        }
        false
    }

    // ========================================================================
    // Timelines
    // ========================================================================

    pub fn add_timeline(&mut self, timeline: Timeline) -> TimelineId {
        let steps = timeline.len();
        let id = self.timelines.insert(timeline);
        tracing::debug!(?id, steps, "timeline added");
        id
    }

    /// Start a timeline from its first step
    ///
    /// Does nothing and returns `false` while the timeline is already
    /// playing or if it is unknown.
    pub fn play_timeline(&mut self, id: TimelineId) -> bool {
        match self.timelines.get_mut(id) {
            Some(timeline) if !timeline.running => timeline.restart(),
            _ => return false,
        }
        tracing::debug!(?id, "timeline playing");
        self.start_frame_clock();
        let now = self.clock.now_ms();
        self.dispatch_next(id, now);
        true
    }

    /// Stop a running timeline and cancel its current step
    pub fn stop_timeline(&mut self, id: TimelineId) -> bool {
        let active = match self.timelines.get_mut(id) {
            Some(timeline) if timeline.running => timeline.active.take(),
            _ => return false,
        };
        if let Some(step) = active {
            self.cancel_step_task(step);
        }
        if let Some(timeline) = self.timelines.get_mut(id) {
            timeline.end_run(Outcome::Cancelled);
        }
        tracing::debug!(?id, "timeline stopped");
        true
    }

    /// Stop and unregister a timeline, handing it back
    pub fn remove_timeline(&mut self, id: TimelineId) -> Option<Timeline> {
        self.stop_timeline(id);
        let mut timeline = self.timelines.remove(id)?;
        timeline.end_run(Outcome::Cancelled);
        Some(timeline)
    }

    pub fn is_timeline_playing(&self, id: TimelineId) -> bool {
        self.timelines.get(id).is_some_and(|t| t.running)
    }

    /// Resolves when the current run ends, or the next one if not playing
    ///
    /// Resolves as cancelled right away for an unknown timeline.
    pub fn timeline_finished(&mut self, id: TimelineId) -> Completion {
        let (notifier, completion) = Completion::channel();
        if let Some(timeline) = self.timelines.get_mut(id) {
            timeline.waiters.push(notifier);
        }
        completion
    }

    pub fn timeline(&self, id: TimelineId) -> Option<&Timeline> {
        self.timelines.get(id)
    }

    pub fn timeline_count(&self) -> usize {
        self.timelines.len()
    }

    /// Dispatch steps until one is running or the run ends
    fn dispatch_next(&mut self, id: TimelineId, now: f64) {
        let mut skipped = 0;
        loop {
            let Some(timeline) = self.timelines.get_mut(id) else {
                return;
            };
            if !timeline.running {
                return;
            }

            // A looping timeline whose every step is skipped would never yield
            let step = if skipped > timeline.len() {
                tracing::debug!(?id, "every step skipped, ending run");
                None
            } else {
                timeline.next_step()
            };

            let Some(step) = step else {
                timeline.end_run(Outcome::Finished);
                tracing::debug!(?id, "timeline finished");
                self.post(MotionEvent::TimelineFinished { id });
                return;
            };

            match self.start_step(step, id, now) {
                Some(active) => {
                    if let Some(timeline) = self.timelines.get_mut(id) {
                        timeline.active = Some(active);
                    }
                    return;
                }
                None => skipped += 1,
            }
        }
    }

    /// Start the engine task for one step; `None` means the step was skipped
    fn start_step(&mut self, step: TimelineStep, owner: TimelineId, now: f64) -> Option<ActiveStep> {
        let scheduled = match step {
            TimelineStep::To {
                target,
                properties,
                options,
            } => self
                .schedule_tween(target, properties, options, Some(owner), now)
                .map(|(id, _)| ActiveStep::Tween(id)),
            TimelineStep::From {
                target,
                properties,
                options,
            } => self.start_from_step(target, properties, options, owner, now),
            TimelineStep::Spring {
                target,
                properties,
                config,
            } => self
                .schedule_spring(target, properties, config, Some(owner))
                .map(|(id, _)| ActiveStep::Spring(id)),
            TimelineStep::Wait { ms } if ms > 0.0 => {
                let seq = self.next_timer_seq;
                self.next_timer_seq += 1;
                let timer = self.timers.insert(Timer {
                    fire_at_ms: now + ms,
                    seq,
                    owner,
                });
                tracing::trace!(?owner, ms, "wait started");
                return Some(ActiveStep::Wait(timer));
            }
            TimelineStep::Wait { .. } => return None,
        };

        match scheduled {
            Ok(active) => Some(active),
            Err(err) => {
                tracing::debug!(?owner, error = %err, "timeline step skipped");
                None
            }
        }
    }

    /// Jump to the `from` values, then tween back to what the target held
    fn start_from_step(
        &mut self,
        target: TargetRef,
        from: Properties,
        options: TweenOptions,
        owner: TimelineId,
        now: f64,
    ) -> Result<ActiveStep> {
        let original = target.snapshot(from.properties())?;
        if let Err(err) = target.write_all(from.iter().map(|(p, v)| (p, v))) {
            tracing::debug!(?owner, error = %err, "from values not applied");
        }
        let (id, _) = self.schedule_tween(target, original, options, Some(owner), now)?;
        Ok(ActiveStep::Tween(id))
    }

    /// A step task was cancelled from outside its timeline; move on
    fn step_cancelled(&mut self, owner: TimelineId, step: ActiveStep) {
        let is_current = self
            .timelines
            .get(owner)
            .is_some_and(|t| t.running && t.active == Some(step));
        if is_current {
            let now = self.clock.now_ms();
            self.dispatch_next(owner, now);
        }
    }

    /// Remove a step's task without notifying its timeline
    fn cancel_step_task(&mut self, step: ActiveStep) {
        match step {
            ActiveStep::Tween(id) => {
                if let Some(mut tween) = self.tweens.remove(id) {
                    tween.notifier.resolve(Outcome::Cancelled);
                }
            }
            ActiveStep::Spring(id) => {
                if let Some(mut task) = self.springs.remove(id) {
                    task.notifier.resolve(Outcome::Cancelled);
                }
            }
            ActiveStep::Wait(id) => {
                self.timers.remove(id);
            }
        }
    }

    // ========================================================================
    // Parallax
    // ========================================================================

    /// Offset `target` by `speed` times the scroll position
    ///
    /// `None` uses the configured default speed. Returns `None` if the target
    /// is gone.
    pub fn add_parallax(
        &mut self,
        target: impl Into<TargetRef>,
        speed: Option<f32>,
        axis: ParallaxAxis,
    ) -> Option<ParallaxId> {
        let target = target.into();
        if !target.is_alive() {
            return None;
        }
        let speed = speed.unwrap_or(self.config.parallax.speed);
        let id = self.parallax.insert(ParallaxLayer::new(target, speed, axis));
        tracing::debug!(?id, speed, ?axis, "parallax layer added");
        Some(id)
    }

    pub fn remove_parallax(&mut self, id: ParallaxId) -> bool {
        self.parallax.remove(id).is_some()
    }

    /// Apply a scroll position to every on-screen layer
    ///
    /// Layers whose target is gone are dropped. Returns how many were written.
    pub fn update_parallax(&mut self, scroll_y: f32, viewport_height: f32) -> usize {
        self.parallax.retain(|_, layer| layer.is_alive());
        self.parallax
            .values()
            .filter(|layer| layer.apply(scroll_y, viewport_height))
            .count()
    }

    pub fn parallax_count(&self) -> usize {
        self.parallax.len()
    }

    // ========================================================================
    // Gestures
    // ========================================================================

    /// Call `handler` for every `kind` gesture dispatched to `target`
    pub fn add_gesture_listener<F>(&mut self, target: TargetId, kind: GestureKind, handler: F)
    where
        F: FnMut(&GestureEvent, &mut MotionEngine) + 'static,
    {
        self.gestures.register(target, kind, handler);
    }

    pub fn remove_gesture_listener(&mut self, target: TargetId, kind: GestureKind) -> bool {
        let removed = self.gestures.remove(target, kind);
        let running = self.is_in_flight(target, kind);
        if running {
            self.removed_in_flight.push((target, kind));
        }
        removed || running
    }

    pub fn has_gesture_listener(&self, target: TargetId, kind: GestureKind) -> bool {
        self.gestures.has_listener(target, kind) || self.is_in_flight(target, kind)
    }

    /// Run the listeners registered for this gesture on `target`
    ///
    /// Handlers get the engine so they can start animations, forward gestures
    /// to other targets, or remove listeners. A handler that dispatches to its
    /// own target and kind reaches nothing. Returns how many handlers ran.
    pub fn dispatch_gesture(&mut self, target: TargetId, event: &GestureEvent) -> usize {
        let kind = event.kind();
        let Some(mut handlers) = self.gestures.take(target, kind) else {
            return 0;
        };
        let epoch = self.gesture_epoch;

        self.in_flight.push((target, kind));
        for handler in handlers.iter_mut() {
            handler(event, self);
        }
        let count = handlers.len();
        tracing::trace!(target_id = target, ?kind, count, "gesture dispatched");

        if self.gesture_epoch != epoch {
            // Torn down by a handler
            return count;
        }
        self.in_flight.pop();
        if let Some(pos) = self
            .removed_in_flight
            .iter()
            .position(|key| *key == (target, kind))
        {
            self.removed_in_flight.swap_remove(pos);
        } else {
            self.gestures.restore(target, kind, handlers);
        }
        count
    }

    /// Whether the handlers for this key are running and not yet removed
    fn is_in_flight(&self, target: TargetId, kind: GestureKind) -> bool {
        let key = (target, kind);
        self.in_flight.contains(&key) && !self.removed_in_flight.contains(&key)
    }

    // ========================================================================
    // Frame loop
    // ========================================================================

    /// Advance every running animation to the clock's current time
    ///
    /// Tweens and springs step in registration order, then due wait timers
    /// fire, then timelines whose step finished move on. Returns whether
    /// another frame is needed.
    pub fn tick(&mut self) -> bool {
        if !self.frame_clock.is_running() {
            return false;
        }

        let now = self.clock.now_ms();
        let frame = self.frame_clock.advance(now);
        let mut done = StepsDone::new();

        let order = mem::take(&mut self.order);
        let mut live = Vec::with_capacity(order.len());
        for key in order {
            let keep = match key {
                TaskKey::Tween(id) => self.step_tween(id, now, &mut done),
                TaskKey::Spring(id) => self.step_spring(id, &mut done),
            };
            if keep {
                live.push(key);
            }
        }

        let mut due: SmallVec<[(f64, u64, TimerId); 4]> = self
            .timers
            .iter()
            .filter(|(_, timer)| now >= timer.fire_at_ms)
            .map(|(id, timer)| (timer.fire_at_ms, timer.seq, id))
            .collect();
        due.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        for (_, _, id) in due {
            if let Some(timer) = self.timers.remove(id) {
                done.push((timer.owner, ActiveStep::Wait(id)));
            }
        }

        // Steps dispatched here register after every surviving task
        for (owner, step) in done {
            let is_current = self
                .timelines
                .get(owner)
                .is_some_and(|t| t.running && t.active == Some(step));
            if is_current {
                self.dispatch_next(owner, now);
            }
        }
        live.append(&mut self.order);
        self.order = live;

        let active = self.is_active();
        if !active {
            self.frame_clock.stop();
            tracing::trace!(frame, "frame clock idle");
        }
        active
    }

    /// Check if anything still needs frames
    pub fn is_active(&self) -> bool {
        !self.tweens.is_empty()
            || !self.springs.is_empty()
            || !self.timers.is_empty()
            || self.timelines.values().any(|t| t.running)
    }

    pub fn is_frame_clock_running(&self) -> bool {
        self.frame_clock.is_running()
    }

    /// Frames ticked since the engine was created
    pub fn frame(&self) -> u64 {
        self.frame_clock.frame()
    }

    /// Stop the frame clock and drop everything the engine owns
    ///
    /// Pending completions resolve as cancelled. Nothing is written to any
    /// target afterwards until new work is scheduled.
    pub fn teardown(&mut self) {
        self.frame_clock.stop();
        for (_, mut tween) in self.tweens.drain() {
            tween.notifier.resolve(Outcome::Cancelled);
        }
        for (_, mut task) in self.springs.drain() {
            task.notifier.resolve(Outcome::Cancelled);
        }
        for (_, mut timeline) in self.timelines.drain() {
            timeline.end_run(Outcome::Cancelled);
        }
        self.order.clear();
        self.timers.clear();
        self.parallax.clear();
        self.gestures.clear();
        self.in_flight.clear();
        self.removed_in_flight.clear();
        self.gesture_epoch += 1;
        tracing::debug!("motion engine torn down");
    }

    fn start_frame_clock(&mut self) {
        if self.frame_clock.ensure_running() {
            tracing::trace!("frame clock started");
        }
    }

    fn post(&mut self, event: MotionEvent) {
        let is_progress = matches!(event, MotionEvent::Progress { .. });
        self.subscribers.retain(|sub| {
            if is_progress && !sub.progress {
                return !sub.tx.is_closed();
            }
            sub.tx.send(event.clone()).is_ok()
        });
    }
}

impl Default for MotionEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::easing::Easing;
    use crate::target::StyleTarget;

    fn engine() -> (MotionEngine, ManualClock) {
        let clock = ManualClock::new(0.0);
        (MotionEngine::new().with_clock(clock.clone()), clock)
    }

    #[test]
    fn test_first_frame_written_on_animate() {
        let (mut engine, _clock) = engine();
        let el = StyleTarget::new().with(Property::Opacity, 0.5).shared();

        let handle = engine.animate(
            &el,
            Properties::new().with(Property::Opacity, 1.0),
            TweenOptions::new().duration(100.0),
        );

        assert!(handle.is_some());
        assert_eq!(el.lock().unwrap().write_count(), 1);
        assert!(engine.is_frame_clock_running());
    }

    #[test]
    fn test_delayed_tween_waits_for_start() {
        let (mut engine, clock) = engine();
        let el = StyleTarget::new().shared();
        engine.animate(
            &el,
            Properties::new().with(Property::Scale, 2.0),
            TweenOptions::new().duration(100.0).delay(50.0),
        );
        assert_eq!(el.lock().unwrap().write_count(), 0);

        clock.set(49.0);
        engine.tick();
        assert_eq!(el.lock().unwrap().write_count(), 0);

        clock.set(50.0);
        engine.tick();
        assert_eq!(el.lock().unwrap().number(&Property::Scale), Some(1.0));
    }

    #[test]
    fn test_dead_target_is_not_scheduled() {
        let (mut engine, _clock) = engine();
        let el = StyleTarget::new().shared();
        let target = TargetRef::from(&el);
        drop(el);

        assert!(engine
            .animate(target.clone(), Properties::new().with(Property::Opacity, 0.0), TweenOptions::new())
            .is_none());
        assert!(engine
            .spring(target, Properties::new().with(Property::Scale, 1.2), SpringConfig::default())
            .is_none());
        assert!(!engine.is_active());
    }

    #[test]
    fn test_cancel_keeps_last_value() {
        let (mut engine, clock) = engine();
        let el = StyleTarget::new().shared();
        let mut handle = engine
            .animate(
                &el,
                Properties::new().with(Property::TranslateX, 100.0),
                TweenOptions::new().duration(100.0).easing(Easing::EaseIn),
            )
            .unwrap();

        clock.set(50.0);
        engine.tick();
        assert!(engine.cancel_tween(handle.id));
        assert!(!engine.cancel_tween(handle.id));
        assert_eq!(handle.completion.try_outcome(), Some(Outcome::Cancelled));

        clock.set(100.0);
        engine.tick();
        assert_eq!(el.lock().unwrap().number(&Property::TranslateX), Some(12.5));
    }

    #[test]
    fn test_outcome_subscriber_skips_progress() {
        let (mut engine, clock) = engine();
        let mut outcomes = engine.subscribe_outcomes();
        let el = StyleTarget::new().shared();
        let handle = engine
            .animate(
                &el,
                Properties::new().with(Property::Opacity, 0.0),
                TweenOptions::new().duration(100.0),
            )
            .unwrap();

        for t in [25.0, 50.0, 75.0] {
            clock.set(t);
            engine.tick();
            assert!(outcomes.try_recv().is_err());
        }
        clock.set(100.0);
        engine.tick();
        assert_eq!(
            outcomes.try_recv().ok(),
            Some(MotionEvent::Completed { id: handle.id })
        );
        assert!(outcomes.try_recv().is_err());
    }

    #[test]
    fn test_events_follow_completion_order() {
        let (mut engine, clock) = engine();
        let mut events = engine.subscribe();
        let el = StyleTarget::new().shared();
        let handle = engine
            .animate(
                &el,
                Properties::new().with(Property::Opacity, 0.0),
                TweenOptions::new().duration(10.0),
            )
            .unwrap();

        clock.set(10.0);
        assert!(!engine.tick());

        let mut seen = Vec::new();
        while let Ok(event) = events.try_recv() {
            seen.push(event);
        }
        assert_eq!(
            seen,
            vec![
                MotionEvent::Progress { id: handle.id, eased: 0.0 },
                MotionEvent::Progress { id: handle.id, eased: 1.0 },
                MotionEvent::Completed { id: handle.id },
            ]
        );
    }

    #[test]
    fn test_text_goal_is_not_sprung() {
        let (mut engine, _clock) = engine();
        let el = StyleTarget::new().shared();
        let handle = engine
            .spring(
                &el,
                Properties::new()
                    .with(Property::Scale, 1.2)
                    .with(Property::BoxShadow, "0 0 4px teal"),
                SpringConfig::stiff(),
            )
            .unwrap();

        let state = engine.spring_state(handle.id).unwrap();
        assert!(state.axis(&Property::Scale).is_some());
        assert!(state.axis(&Property::BoxShadow).is_none());
    }

    #[test]
    fn test_retarget_running_spring() {
        let (mut engine, _clock) = engine();
        let el = StyleTarget::new().shared();
        let handle = engine
            .spring(
                &el,
                Properties::new().with(Property::TranslateY, -20.0),
                SpringConfig::wobbly(),
            )
            .unwrap();
        engine.tick();

        assert!(engine.retarget_spring(handle.id, &Property::TranslateY, 0.0));
        assert!(!engine.retarget_spring(handle.id, &Property::Opacity, 0.0));
        let axis = engine
            .spring_state(handle.id)
            .and_then(|s| s.axis(&Property::TranslateY))
            .copied()
            .unwrap();
        assert_eq!(axis.target, 0.0);
        assert!(axis.velocity < 0.0);
    }

    #[test]
    fn test_play_while_running_is_noop() {
        let (mut engine, clock) = engine();
        let el = StyleTarget::new().shared();
        let id = engine.add_timeline(
            Timeline::new().to(
                &el,
                Properties::new().with(Property::Opacity, 0.0),
                TweenOptions::new().duration(100.0),
            ),
        );

        assert!(engine.play_timeline(id));
        clock.set(60.0);
        engine.tick();
        assert!(!engine.play_timeline(id));
        assert_eq!(engine.tween_count(), 1);
        assert_eq!(engine.timeline(id).unwrap().cursor(), 1);
    }

    #[test]
    fn test_stop_timeline_cancels_step() {
        let (mut engine, _clock) = engine();
        let el = StyleTarget::new().shared();
        let id = engine.add_timeline(
            Timeline::new()
                .wait(100.0)
                .to(&el, Properties::new().with(Property::Scale, 2.0), TweenOptions::new()),
        );
        let mut finished = engine.timeline_finished(id);

        engine.play_timeline(id);
        assert!(engine.is_timeline_playing(id));
        assert!(engine.stop_timeline(id));
        assert!(!engine.is_timeline_playing(id));
        assert!(!engine.is_active());
        assert_eq!(finished.try_outcome(), Some(Outcome::Cancelled));
    }

    #[test]
    fn test_simultaneous_waits_resume_in_start_order() {
        let (mut engine, clock) = engine();
        let el = StyleTarget::new().shared();
        let wait_then = |x: f64| {
            Timeline::new().wait(100.0).to(
                &el,
                Properties::new().with(Property::TranslateX, x),
                TweenOptions::new().duration(100.0),
            )
        };

        let scratch = engine.add_timeline(wait_then(0.0));
        let first = engine.add_timeline(wait_then(10.0));
        let second = engine.add_timeline(wait_then(20.0));
        engine.play_timeline(scratch);
        engine.play_timeline(first);
        // Frees the lowest timer slot so the next wait reuses it
        engine.stop_timeline(scratch);
        engine.play_timeline(second);

        clock.set(100.0);
        engine.tick();
        clock.set(200.0);
        engine.tick();
        assert_eq!(el.lock().unwrap().number(&Property::TranslateX), Some(20.0));
    }

    #[test]
    fn test_cancelling_owned_step_advances_timeline() {
        let (mut engine, _clock) = engine();
        let el = StyleTarget::new().shared();
        let id = engine.add_timeline(
            Timeline::new()
                .to(&el, Properties::new().with(Property::Opacity, 0.0), TweenOptions::new())
                .to(&el, Properties::new().with(Property::Scale, 2.0), TweenOptions::new()),
        );
        engine.play_timeline(id);

        let Some(ActiveStep::Tween(first)) = engine.timeline(id).unwrap().active else {
            panic!("first step should be a tween");
        };
        engine.cancel_tween(first);
        assert_eq!(engine.timeline(id).unwrap().cursor(), 2);
        assert_eq!(engine.tween_count(), 1);
    }

    #[test]
    fn test_unknown_timeline_completion_is_cancelled() {
        let (mut engine, _clock) = engine();
        let id = engine.add_timeline(Timeline::new());
        engine.remove_timeline(id);
        let mut finished = engine.timeline_finished(id);
        assert_eq!(finished.try_outcome(), Some(Outcome::Cancelled));
    }

    #[test]
    fn test_empty_timeline_finishes_on_play() {
        let (mut engine, _clock) = engine();
        let mut events = engine.subscribe();
        let id = engine.add_timeline(Timeline::new());
        let mut finished = engine.timeline_finished(id);

        engine.play_timeline(id);
        assert!(!engine.is_timeline_playing(id));
        assert_eq!(finished.try_outcome(), Some(Outcome::Finished));
        assert_eq!(events.try_recv().ok(), Some(MotionEvent::TimelineFinished { id }));
    }

    #[test]
    fn test_parallax_uses_default_speed() {
        let (mut engine, _clock) = engine();
        let el = StyleTarget::new().shared();
        engine.add_parallax(&el, None, ParallaxAxis::Vertical).unwrap();

        assert_eq!(engine.update_parallax(300.0, 800.0), 1);
        assert_eq!(el.lock().unwrap().number(&Property::TranslateY), Some(150.0));

        drop(el);
        assert_eq!(engine.update_parallax(400.0, 800.0), 0);
        assert_eq!(engine.parallax_count(), 0);
    }

    #[test]
    fn test_gesture_handler_can_animate() {
        let (mut engine, _clock) = engine();
        let el = StyleTarget::new().shared();
        let handler_target = TargetRef::from(&el);
        engine.add_gesture_listener(7, GestureKind::Tap, move |_, engine| {
            engine.animate(
                handler_target.clone(),
                Properties::new().with(Property::Scale, 0.95),
                TweenOptions::new().duration(100.0),
            );
        });

        let tap = GestureEvent::Tap {
            position: neurox_core::Point::new(1.0, 1.0),
        };
        assert_eq!(engine.dispatch_gesture(7, &tap), 1);
        assert_eq!(engine.dispatch_gesture(8, &tap), 0);
        assert_eq!(engine.tween_count(), 1);
        assert!(engine.has_gesture_listener(7, GestureKind::Tap));
    }

    #[test]
    fn test_handler_can_remove_itself() {
        let (mut engine, _clock) = engine();
        engine.add_gesture_listener(1, GestureKind::Tap, |_, engine| {
            engine.remove_gesture_listener(1, GestureKind::Tap);
        });
        let tap = GestureEvent::Tap {
            position: neurox_core::Point::ZERO,
        };
        assert_eq!(engine.dispatch_gesture(1, &tap), 1);
        assert!(!engine.has_gesture_listener(1, GestureKind::Tap));
    }

    #[test]
    fn test_handler_forwards_then_removes_itself() {
        use std::cell::Cell;
        use std::rc::Rc;

        let (mut engine, _clock) = engine();
        let forwarded = Rc::new(Cell::new(0));
        let inner_count = Rc::new(Cell::new(usize::MAX));

        let hits = forwarded.clone();
        engine.add_gesture_listener(2, GestureKind::Tap, move |_, _| hits.set(hits.get() + 1));
        let ran = inner_count.clone();
        engine.add_gesture_listener(1, GestureKind::Tap, move |event, engine| {
            ran.set(engine.dispatch_gesture(2, event));
            assert_eq!(engine.dispatch_gesture(1, event), 0);
            assert!(engine.has_gesture_listener(1, GestureKind::Tap));
            assert!(engine.remove_gesture_listener(1, GestureKind::Tap));
            assert!(!engine.remove_gesture_listener(1, GestureKind::Tap));
        });

        let tap = GestureEvent::Tap {
            position: neurox_core::Point::ZERO,
        };
        assert_eq!(engine.dispatch_gesture(1, &tap), 1);
        assert_eq!(inner_count.get(), 1);
        assert_eq!(forwarded.get(), 1);
        assert!(!engine.has_gesture_listener(1, GestureKind::Tap));
        assert!(engine.has_gesture_listener(2, GestureKind::Tap));

        assert_eq!(engine.dispatch_gesture(1, &tap), 0);
        assert!(!engine.remove_gesture_listener(1, GestureKind::Tap));
    }

    #[test]
    fn test_listener_added_during_dispatch_survives() {
        let (mut engine, _clock) = engine();
        engine.add_gesture_listener(1, GestureKind::Tap, |_, engine| {
            engine.remove_gesture_listener(1, GestureKind::Tap);
            engine.add_gesture_listener(1, GestureKind::Tap, |_, _| {});
        });
        let tap = GestureEvent::Tap {
            position: neurox_core::Point::ZERO,
        };
        assert_eq!(engine.dispatch_gesture(1, &tap), 1);
        assert!(engine.has_gesture_listener(1, GestureKind::Tap));
        assert_eq!(engine.dispatch_gesture(1, &tap), 1);
    }

    #[test]
    fn test_teardown_inside_handler_sticks() {
        let (mut engine, _clock) = engine();
        engine.add_gesture_listener(1, GestureKind::Tap, |_, engine| engine.teardown());
        engine.add_gesture_listener(2, GestureKind::Tap, |_, _| {});
        let tap = GestureEvent::Tap {
            position: neurox_core::Point::ZERO,
        };
        engine.dispatch_gesture(1, &tap);
        assert!(!engine.has_gesture_listener(2, GestureKind::Tap));
    }
}
