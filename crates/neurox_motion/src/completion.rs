//! Task completion signalling
//!
//! Each tween, spring and timeline run resolves a [`Completion`] exactly once.
//! Subscribers additionally receive every [`MotionEvent`] the engine posts.

use crate::engine::{SpringId, TimelineId, TweenId};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::oneshot;

/// How a task ended
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Reached its goal (tween completed, spring settled, timeline ended)
    Finished,
    /// Cancelled, stopped, or torn down first
    Cancelled,
}

/// Lifecycle events posted by the engine during `tick`
#[derive(Clone, Debug, PartialEq)]
pub enum MotionEvent {
    /// A tween frame was written at this eased progress
    Progress { id: TweenId, eased: f32 },
    Completed { id: TweenId },
    Settled { id: SpringId },
    TimelineFinished { id: TimelineId },
}

/// Resolves once when its task ends
///
/// Await it from async code, or poll it with [`Completion::try_outcome`]
/// from a frame loop.
#[derive(Debug)]
pub struct Completion {
    rx: oneshot::Receiver<Outcome>,
    outcome: Option<Outcome>,
}

impl Completion {
    pub(crate) fn channel() -> (Notifier, Completion) {
        let (tx, rx) = oneshot::channel();
        (
            Notifier { tx: Some(tx) },
            Completion { rx, outcome: None },
        )
    }

    /// The outcome if the task has ended, without blocking
    pub fn try_outcome(&mut self) -> Option<Outcome> {
        if self.outcome.is_none() {
            self.outcome = match self.rx.try_recv() {
                Ok(outcome) => Some(outcome),
                Err(oneshot::error::TryRecvError::Empty) => None,
                Err(oneshot::error::TryRecvError::Closed) => Some(Outcome::Cancelled),
            };
        }
        self.outcome
    }

    pub fn is_done(&mut self) -> bool {
        self.try_outcome().is_some()
    }
}

impl Future for Completion {
    type Output = Outcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Outcome> {
        if let Some(outcome) = self.outcome {
            return Poll::Ready(outcome);
        }
        let outcome = match Pin::new(&mut self.rx).poll(cx) {
            Poll::Ready(result) => result.unwrap_or(Outcome::Cancelled),
            Poll::Pending => return Poll::Pending,
        };
        self.outcome = Some(outcome);
        Poll::Ready(outcome)
    }
}

/// Sending half of a [`Completion`]
///
/// Resolves at most once; dropping an unresolved notifier reports
/// [`Outcome::Cancelled`].
#[derive(Debug)]
pub(crate) struct Notifier {
    tx: Option<oneshot::Sender<Outcome>>,
}

impl Notifier {
    pub(crate) fn resolve(&mut self, outcome: Outcome) {
        if let Some(tx) = self.tx.take() {
            // The receiver may already be gone
            let _ = tx.send(outcome);
        }
    }
}

impl Drop for Notifier {
    fn drop(&mut self) {
        self.resolve(Outcome::Cancelled);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolves_once() {
        let (mut notifier, mut completion) = Completion::channel();
        assert_eq!(completion.try_outcome(), None);

        notifier.resolve(Outcome::Finished);
        notifier.resolve(Outcome::Cancelled);
        assert_eq!(completion.try_outcome(), Some(Outcome::Finished));
        assert_eq!(completion.try_outcome(), Some(Outcome::Finished));
    }

    #[test]
    fn test_dropped_notifier_cancels() {
        let (notifier, completion) = Completion::channel();
        drop(notifier);
        assert_eq!(pollster::block_on(completion), Outcome::Cancelled);
    }

    #[test]
    fn test_await_after_resolution() {
        let (mut notifier, mut completion) = Completion::channel();
        notifier.resolve(Outcome::Finished);
        assert!(completion.is_done());
        assert_eq!(pollster::block_on(completion), Outcome::Finished);
    }
}
