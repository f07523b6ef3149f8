//! Animatable properties and values
//!
//! Property kinds form a closed set. Each kind knows its identity value (what
//! a missing or unreadable source value resolves to) and whether it is
//! numeric. Collaborator parameters such as an audio gain or a shader uniform
//! use [`Property::Custom`].

use crate::error::{MotionError, Result};
use smallvec::SmallVec;
use std::fmt;

/// A property the engine can read from and write to a target
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Property {
    /// Horizontal offset in pixels
    TranslateX,
    /// Vertical offset in pixels
    TranslateY,
    /// Depth offset in pixels
    TranslateZ,
    /// Uniform scale factor
    Scale,
    /// Rotation in degrees
    Rotate,
    Opacity,
    /// Brightness filter multiplier
    Brightness,
    /// Shadow description (text)
    BoxShadow,
    /// Border color (text)
    BorderColor,
    /// Any other named parameter
    Custom(String),
}

impl Property {
    /// Map a camelCase property name to its kind; unknown names become `Custom`
    pub fn from_name(name: &str) -> Property {
        match name {
            "translateX" => Property::TranslateX,
            "translateY" => Property::TranslateY,
            "translateZ" => Property::TranslateZ,
            "scale" => Property::Scale,
            "rotate" => Property::Rotate,
            "opacity" => Property::Opacity,
            "brightness" => Property::Brightness,
            "boxShadow" => Property::BoxShadow,
            "borderColor" => Property::BorderColor,
            other => Property::Custom(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Property::TranslateX => "translateX",
            Property::TranslateY => "translateY",
            Property::TranslateZ => "translateZ",
            Property::Scale => "scale",
            Property::Rotate => "rotate",
            Property::Opacity => "opacity",
            Property::Brightness => "brightness",
            Property::BoxShadow => "boxShadow",
            Property::BorderColor => "borderColor",
            Property::Custom(name) => name,
        }
    }

    /// Text-valued kinds never interpolate; they snap at the midpoint
    pub fn is_text(&self) -> bool {
        matches!(self, Property::BoxShadow | Property::BorderColor)
    }

    /// Kinds that compose into a single transform
    pub fn is_transform(&self) -> bool {
        matches!(
            self,
            Property::TranslateX
                | Property::TranslateY
                | Property::TranslateZ
                | Property::Scale
                | Property::Rotate
        )
    }

    /// Value used when the source value is missing or unreadable
    pub fn identity(&self) -> Value {
        match self {
            Property::Scale | Property::Opacity | Property::Brightness => Value::Number(1.0),
            Property::TranslateX
            | Property::TranslateY
            | Property::TranslateZ
            | Property::Rotate
            | Property::Custom(_) => Value::Number(0.0),
            Property::BoxShadow | Property::BorderColor => Value::Text(String::new()),
        }
    }

    /// Resolve a raw value read from a target into a usable start value
    ///
    /// Numeric kinds accept numbers and leading-number text (`"12px"`), and
    /// fall back to [`Property::identity`] otherwise. Custom properties keep
    /// text that does not parse, so string parameters still snap.
    pub fn resolve(&self, raw: Option<Value>) -> Value {
        let Some(raw) = raw else {
            return self.identity();
        };

        if self.is_text() {
            return raw;
        }

        match raw {
            Value::Number(n) if n.is_finite() => Value::Number(n),
            Value::Number(n) => {
                tracing::debug!(property = %self, value = n, "non-finite source value, using identity");
                self.identity()
            }
            Value::Text(text) => match self.parse(&text) {
                Ok(value) => value,
                Err(_) if matches!(self, Property::Custom(_)) => Value::Text(text),
                Err(err) => {
                    tracing::debug!(error = %err, "using identity");
                    self.identity()
                }
            },
        }
    }

    /// Parse raw text as a value of this kind
    ///
    /// Text kinds accept anything. Numeric kinds need a leading number.
    pub fn parse(&self, raw: &str) -> Result<Value> {
        if self.is_text() {
            return Ok(Value::Text(raw.to_string()));
        }
        parse_leading_number(raw)
            .map(Value::Number)
            .ok_or_else(|| MotionError::MalformedValue {
                property: self.clone(),
                raw: raw.to_string(),
            })
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A property value
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Number(f32),
    Text(String),
}

impl Value {
    pub fn as_number(&self) -> Option<f32> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            Value::Number(_) => None,
        }
    }
}

impl From<f32> for Value {
    fn from(n: f32) -> Self {
        Value::Number(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n as f32)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{n}"),
            Value::Text(s) => f.write_str(s),
        }
    }
}

/// Interpolate between two values at eased progress `t`
///
/// Numbers interpolate linearly. Any pair involving text jumps from `from`
/// to `to` once `t` reaches 0.5.
pub fn interpolate(from: &Value, to: &Value, t: f32) -> Value {
    match (from, to) {
        (Value::Number(a), Value::Number(b)) => Value::Number(a + (b - a) * t),
        _ if t < 0.5 => from.clone(),
        _ => to.clone(),
    }
}

/// Parse the longest numeric prefix of `s`, ignoring leading whitespace
///
/// `"12px"` → 12, `"-0.5deg"` → -0.5, `".25"` → 0.25, `"px"` → None.
pub fn parse_leading_number(s: &str) -> Option<f32> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }

    let int_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    let mut digits = end - int_start;

    if bytes.get(end) == Some(&b'.') {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while bytes.get(frac_end).is_some_and(u8::is_ascii_digit) {
            frac_end += 1;
        }
        if frac_end > frac_start {
            digits += frac_end - frac_start;
            end = frac_end;
        }
    }

    if digits == 0 {
        return None;
    }

    // Exponent only counts when followed by at least one digit
    if matches!(bytes.get(end), Some(b'e') | Some(b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+') | Some(b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while bytes.get(exp_end).is_some_and(u8::is_ascii_digit) {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse::<f32>().ok().filter(|n| n.is_finite())
}

/// An ordered set of property goals
///
/// Insertion order is write order. Setting a property twice replaces the
/// earlier value in place.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Properties {
    entries: SmallVec<[(Property, Value); 4]>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set a property
    pub fn with(mut self, property: Property, value: impl Into<Value>) -> Self {
        self.set(property, value);
        self
    }

    /// Builder: set a property by camelCase name
    pub fn with_named(self, name: &str, value: impl Into<Value>) -> Self {
        self.with(Property::from_name(name), value)
    }

    pub fn set(&mut self, property: Property, value: impl Into<Value>) {
        let value = value.into();
        match self.entries.iter_mut().find(|(p, _)| *p == property) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((property, value)),
        }
    }

    pub fn get(&self, property: &Property) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(p, _)| p == property)
            .map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Property, Value)> {
        self.entries.iter()
    }

    pub fn properties(&self) -> impl Iterator<Item = &Property> {
        self.entries.iter().map(|(p, _)| p)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(Property, Value)> for Properties {
    fn from_iter<I: IntoIterator<Item = (Property, Value)>>(iter: I) -> Self {
        let mut properties = Properties::new();
        for (property, value) in iter {
            properties.set(property, value);
        }
        properties
    }
}

impl IntoIterator for Properties {
    type Item = (Property, Value);
    type IntoIter = smallvec::IntoIter<[(Property, Value); 4]>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
