//! Spring physics animation
//!
//! Fixed-step semi-implicit Euler springs. Every step advances the
//! simulation by exactly [`FIXED_STEP`] seconds no matter how much wall-clock
//! time passed, so a spring's trajectory depends only on how many ticks it
//! has seen.

use crate::property::Property;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Simulated seconds per tick
pub const FIXED_STEP: f32 = 1.0 / 60.0;

/// Configuration for a spring animation
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SpringConfig {
    pub stiffness: f32,
    pub damping: f32,
    pub mass: f32,
    /// Settling tolerance for both displacement and velocity
    pub precision: f32,
}

impl SpringConfig {
    /// Create a new spring configuration with the default precision
    pub fn new(stiffness: f32, damping: f32, mass: f32) -> Self {
        Self {
            stiffness,
            damping,
            mass,
            ..Self::default()
        }
    }

    /// Builder: set the settling precision
    pub fn with_precision(mut self, precision: f32) -> Self {
        self.precision = precision;
        self
    }

    /// A gentle, slow spring (good for page transitions)
    pub fn gentle() -> Self {
        Self::new(120.0, 14.0, 1.0)
    }

    /// A wobbly spring with overshoot (good for playful UI)
    pub fn wobbly() -> Self {
        Self::new(180.0, 12.0, 1.0)
    }

    /// A stiff, snappy spring (good for buttons)
    pub fn stiff() -> Self {
        Self::new(400.0, 30.0, 1.0)
    }

    /// A very stiff spring with minimal oscillation
    pub fn snappy() -> Self {
        Self::new(600.0, 40.0, 1.0)
    }

    /// A slow spring with no overshoot (critically damped)
    pub fn molasses() -> Self {
        Self::new(100.0, 20.0, 1.0)
    }

    /// Calculate critical damping for this spring's stiffness and mass
    pub fn critical_damping(&self) -> f32 {
        2.0 * (self.stiffness * self.mass).sqrt()
    }

    /// Check if the spring is underdamped (will oscillate)
    pub fn is_underdamped(&self) -> bool {
        self.damping < self.critical_damping()
    }

    /// Check if the spring is overdamped (slow settling, no oscillation)
    pub fn is_overdamped(&self) -> bool {
        self.damping > self.critical_damping()
    }

    /// Replace non-positive or non-finite mass with 1 so acceleration stays finite
    fn effective_mass(&self) -> f32 {
        if self.mass.is_finite() && self.mass > 0.0 {
            self.mass
        } else {
            1.0
        }
    }
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self {
            stiffness: 100.0,
            damping: 10.0,
            mass: 1.0,
            precision: 0.01,
        }
    }
}

/// One spring-driven property
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpringAxis {
    pub current: f32,
    pub target: f32,
    pub velocity: f32,
}

impl SpringAxis {
    pub fn new(current: f32, target: f32) -> Self {
        Self {
            current,
            target,
            velocity: 0.0,
        }
    }

    /// Advance by one fixed step; returns whether this axis is within precision
    ///
    /// Displacement is measured before the step and velocity after it.
    pub fn step(&mut self, config: &SpringConfig) -> bool {
        let displacement = self.current - self.target;
        let force = -config.stiffness * displacement - config.damping * self.velocity;
        let acceleration = force / config.effective_mass();

        self.velocity += acceleration * FIXED_STEP;
        self.current += self.velocity * FIXED_STEP;

        displacement.abs() <= config.precision && self.velocity.abs() <= config.precision
    }
}

/// The axes of one spring task, settled only when all settle on the same step
#[derive(Clone, Debug)]
pub struct SpringSet {
    config: SpringConfig,
    axes: SmallVec<[(Property, SpringAxis); 4]>,
    steps: u32,
}

impl SpringSet {
    pub fn new(config: SpringConfig) -> Self {
        Self {
            config,
            axes: SmallVec::new(),
            steps: 0,
        }
    }

    pub fn push(&mut self, property: Property, axis: SpringAxis) {
        self.axes.push((property, axis));
    }

    /// Advance every axis one step; returns `true` when all are settled
    pub fn step(&mut self) -> bool {
        self.steps += 1;
        let config = self.config;
        // Every axis must step even after one reports unsettled
        self.axes
            .iter_mut()
            .fold(true, |settled, (_, axis)| axis.step(&config) & settled)
    }

    /// Point one axis at a new goal; velocity is kept
    pub fn retarget(&mut self, property: &Property, target: f32) -> bool {
        match self.axes.iter_mut().find(|(p, _)| p == property) {
            Some((_, axis)) => {
                axis.target = target;
                true
            }
            None => false,
        }
    }

    pub fn axis(&self, property: &Property) -> Option<&SpringAxis> {
        self.axes
            .iter()
            .find(|(p, _)| p == property)
            .map(|(_, a)| a)
    }

    pub fn axes(&self) -> impl Iterator<Item = &(Property, SpringAxis)> {
        self.axes.iter()
    }

    pub fn config(&self) -> &SpringConfig {
        &self.config
    }

    /// Steps taken so far
    pub fn steps(&self) -> u32 {
        self.steps
    }

    pub fn is_empty(&self) -> bool {
        self.axes.is_empty()
    }
}
