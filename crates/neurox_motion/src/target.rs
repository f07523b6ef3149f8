//! Animation targets
//!
//! A target is any application-owned object exposing named properties. The
//! engine holds only weak references and checks liveness before every read
//! and write, so dropping or detaching a target mid-animation is harmless.

use crate::error::TargetError;
use crate::parallax::Bounds;
use crate::property::{Properties, Property, Value};
use smallvec::SmallVec;
use std::sync::{Arc, Mutex, Weak};

/// An object whose properties the engine animates
pub trait Target: Send {
    /// Current value of a property, if the target has one
    fn read(&self, property: &Property) -> Option<Value>;

    /// Apply a value to a property
    fn write(&mut self, property: &Property, value: &Value) -> Result<(), TargetError>;

    /// Whether the target is still part of its host (e.g. mounted)
    fn is_attached(&self) -> bool {
        true
    }

    /// On-screen extent, for targets that know their layout
    fn bounds(&self) -> Option<Bounds> {
        None
    }
}

/// Shared, application-owned target
pub type TargetHandle = Arc<Mutex<dyn Target>>;

/// Weak reference to a target, as stored by the engine
#[derive(Clone)]
pub struct TargetRef {
    inner: Weak<Mutex<dyn Target>>,
}

impl TargetRef {
    pub fn is_alive(&self) -> bool {
        self.with(|t| t.is_attached()).unwrap_or(false)
    }

    /// Read and resolve the named properties, applying identity defaults
    pub fn snapshot<'a, I>(&self, properties: I) -> Result<Properties, TargetError>
    where
        I: IntoIterator<Item = &'a Property>,
    {
        self.with(|t| {
            properties
                .into_iter()
                .map(|p| (p.clone(), p.resolve(t.read(p))))
                .collect()
        })
    }

    pub fn write(&self, property: &Property, value: &Value) -> Result<(), TargetError> {
        self.with(|t| t.write(property, value))?
    }

    pub fn bounds(&self) -> Result<Option<Bounds>, TargetError> {
        self.with(|t| t.bounds())
    }

    /// Write several values under one lock
    ///
    /// Every write is attempted; the first failure is returned.
    pub fn write_all<'a, I>(&self, values: I) -> Result<(), TargetError>
    where
        I: IntoIterator<Item = (&'a Property, &'a Value)>,
    {
        self.with(|t| {
            let mut first_err = None;
            for (property, value) in values {
                if let Err(err) = t.write(property, value) {
                    first_err.get_or_insert(err);
                }
            }
            first_err.map_or(Ok(()), Err)
        })?
    }

    /// Run `f` against the live target
    fn with<R>(&self, f: impl FnOnce(&mut dyn Target) -> R) -> Result<R, TargetError> {
        let target = self.inner.upgrade().ok_or(TargetError::Detached)?;
        let mut guard = target.lock().map_err(|_| TargetError::Poisoned)?;
        if !guard.is_attached() {
            return Err(TargetError::Detached);
        }
        Ok(f(&mut *guard))
    }
}

impl<T: Target + 'static> From<&Arc<Mutex<T>>> for TargetRef {
    fn from(target: &Arc<Mutex<T>>) -> Self {
        let inner: Weak<Mutex<T>> = Arc::downgrade(target);
        Self { inner }
    }
}

impl From<&TargetHandle> for TargetRef {
    fn from(target: &TargetHandle) -> Self {
        Self {
            inner: Arc::downgrade(target),
        }
    }
}

impl std::fmt::Debug for TargetRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TargetRef")
            .field("dropped", &(self.inner.strong_count() == 0))
            .finish()
    }
}

// ============================================================================
// Style target
// ============================================================================

/// In-memory styled element
///
/// Transform kinds compose into one transform in first-write order, the
/// brightness filter is kept separately, and text kinds are stored verbatim.
/// Useful headless and as a reference for host integrations.
#[derive(Clone, Debug)]
pub struct StyleTarget {
    transforms: SmallVec<[(Property, f32); 5]>,
    opacity: Option<f32>,
    brightness: Option<f32>,
    box_shadow: Option<String>,
    border_color: Option<String>,
    custom: Vec<(String, Value)>,
    bounds: Option<Bounds>,
    attached: bool,
    writes: usize,
}

impl StyleTarget {
    pub fn new() -> Self {
        Self {
            transforms: SmallVec::new(),
            opacity: None,
            brightness: None,
            box_shadow: None,
            border_color: None,
            custom: Vec::new(),
            bounds: None,
            attached: true,
            writes: 0,
        }
    }

    /// Wrap in a shared handle
    pub fn shared(self) -> Arc<Mutex<StyleTarget>> {
        Arc::new(Mutex::new(self))
    }

    /// Builder: seed a property without counting it as a write
    ///
    /// Panics in debug builds if the value does not fit the property; use
    /// [`StyleTarget::try_with`] for values that are not known up front.
    pub fn with(mut self, property: Property, value: impl Into<Value>) -> Self {
        if let Err(err) = self.seed(&property, &value.into()) {
            debug_assert!(false, "seeding style target failed: {err}");
        }
        self
    }

    /// Builder: seed a property, reporting values the property rejects
    pub fn try_with(
        mut self,
        property: Property,
        value: impl Into<Value>,
    ) -> Result<Self, TargetError> {
        self.seed(&property, &value.into())?;
        Ok(self)
    }

    fn seed(&mut self, property: &Property, value: &Value) -> Result<(), TargetError> {
        let writes = self.writes;
        let result = self.write(property, value);
        self.writes = writes;
        result
    }

    /// Builder: report a layout extent
    pub fn with_bounds(mut self, bounds: Bounds) -> Self {
        self.bounds = Some(bounds);
        self
    }

    pub fn set_bounds(&mut self, bounds: Bounds) {
        self.bounds = Some(bounds);
    }

    /// Simulate removal from the host
    pub fn detach(&mut self) {
        self.attached = false;
    }

    /// Number of successful writes so far
    pub fn write_count(&self) -> usize {
        self.writes
    }

    pub fn number(&self, property: &Property) -> Option<f32> {
        self.read(property).and_then(|v| v.as_number())
    }

    /// Compose the transform, e.g. `translateY(-8px) scale(1.02)`
    pub fn transform_string(&self) -> String {
        self.transforms
            .iter()
            .map(|(property, value)| match property {
                Property::Scale => format!("scale({value})"),
                Property::Rotate => format!("rotate({value}deg)"),
                other => format!("{}({value}px)", other.name()),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Compose the filter, e.g. `brightness(1.1)`
    pub fn filter_string(&self) -> String {
        self.brightness
            .map(|b| format!("brightness({b})"))
            .unwrap_or_default()
    }

    fn set_transform(&mut self, property: &Property, value: f32) {
        match self.transforms.iter_mut().find(|(p, _)| p == property) {
            Some(entry) => entry.1 = value,
            None => self.transforms.push((property.clone(), value)),
        }
    }
}

impl Default for StyleTarget {
    fn default() -> Self {
        Self::new()
    }
}

fn expect_number(property: &Property, value: &Value) -> Result<f32, TargetError> {
    value.as_number().ok_or_else(|| TargetError::Malformed {
        property: property.clone(),
        value: value.to_string(),
    })
}

impl Target for StyleTarget {
    fn read(&self, property: &Property) -> Option<Value> {
        match property {
            p if p.is_transform() => self
                .transforms
                .iter()
                .find(|(t, _)| t == p)
                .map(|(_, v)| Value::Number(*v)),
            Property::Opacity => self.opacity.map(Value::Number),
            Property::Brightness => self.brightness.map(Value::Number),
            Property::BoxShadow => self.box_shadow.clone().map(Value::Text),
            Property::BorderColor => self.border_color.clone().map(Value::Text),
            Property::Custom(name) => self
                .custom
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.clone()),
            _ => None,
        }
    }

    fn write(&mut self, property: &Property, value: &Value) -> Result<(), TargetError> {
        if !self.attached {
            return Err(TargetError::Detached);
        }

        match property {
            p if p.is_transform() => {
                let n = expect_number(p, value)?;
                self.set_transform(p, n);
            }
            Property::Opacity => self.opacity = Some(expect_number(property, value)?),
            Property::Brightness => self.brightness = Some(expect_number(property, value)?),
            Property::BoxShadow => self.box_shadow = Some(value.to_string()),
            Property::BorderColor => self.border_color = Some(value.to_string()),
            Property::Custom(name) => {
                match self.custom.iter_mut().find(|(n, _)| n == name) {
                    Some(entry) => entry.1 = value.clone(),
                    None => self.custom.push((name.clone(), value.clone())),
                }
            }
            _ => return Err(TargetError::Unsupported(property.clone())),
        }

        self.writes += 1;
        Ok(())
    }

    fn is_attached(&self) -> bool {
        self.attached
    }

    fn bounds(&self) -> Option<Bounds> {
        self.bounds
    }
}
