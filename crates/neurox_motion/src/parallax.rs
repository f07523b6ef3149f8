//! Scroll-driven parallax layers

use crate::property::{Property, Value};
use crate::target::TargetRef;

/// Which translate a layer drives
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ParallaxAxis {
    #[default]
    Vertical,
    Horizontal,
}

impl ParallaxAxis {
    pub fn property(&self) -> Property {
        match self {
            ParallaxAxis::Vertical => Property::TranslateY,
            ParallaxAxis::Horizontal => Property::TranslateX,
        }
    }
}

/// Vertical extent of a target in viewport coordinates
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub top: f32,
    pub bottom: f32,
}

impl Bounds {
    pub fn new(top: f32, bottom: f32) -> Self {
        Self { top, bottom }
    }

    /// Whether any part lies within `[0, viewport_height]`
    pub fn intersects_viewport(&self, viewport_height: f32) -> bool {
        self.bottom >= 0.0 && self.top <= viewport_height
    }
}

/// A target offset by a fraction of the scroll position
#[derive(Clone, Debug)]
pub struct ParallaxLayer {
    target: TargetRef,
    speed: f32,
    axis: ParallaxAxis,
}

impl ParallaxLayer {
    pub fn new(target: TargetRef, speed: f32, axis: ParallaxAxis) -> Self {
        Self {
            target,
            speed,
            axis,
        }
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn axis(&self) -> ParallaxAxis {
        self.axis
    }

    pub fn offset(&self, scroll_y: f32) -> f32 {
        scroll_y * self.speed
    }

    pub fn is_alive(&self) -> bool {
        self.target.is_alive()
    }

    /// Write this layer's offset if the target is on screen
    ///
    /// Targets that report no bounds are treated as always visible.
    pub(crate) fn apply(&self, scroll_y: f32, viewport_height: f32) -> bool {
        let visible = match self.target.bounds() {
            Ok(Some(bounds)) => bounds.intersects_viewport(viewport_height),
            Ok(None) => true,
            Err(_) => return false,
        };
        if !visible {
            return false;
        }

        let value = Value::Number(self.offset(scroll_y));
        match self.target.write(&self.axis.property(), &value) {
            Ok(()) => true,
            Err(err) => {
                tracing::debug!(error = %err, "parallax write skipped");
                false
            }
        }
    }
}
