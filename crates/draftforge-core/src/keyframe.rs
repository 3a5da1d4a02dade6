//! Keyframe timelines for animatable segment properties.
//!
//! A timeline is a sparse list of (time, value) samples for one property,
//! kept strictly increasing in time. Evaluation is clamped-linear: the
//! first value before the first sample, the last value after the last,
//! and exact linear interpolation in between. The consuming editor
//! re-derives intermediate frames from the same rule, so it must not
//! change.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{DraftError, Result};
use crate::time::Ticks;

/// A segment property that can carry keyframes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyframeProperty {
    PositionX,
    PositionY,
    Rotation,
    ScaleX,
    ScaleY,
    UniformScale,
    Alpha,
    Saturation,
    Contrast,
    Brightness,
    Volume,
}

impl KeyframeProperty {
    /// Property name as the serialized document spells it.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PositionX => "KFTypePositionX",
            Self::PositionY => "KFTypePositionY",
            Self::Rotation => "KFTypeRotation",
            Self::ScaleX => "KFTypeScaleX",
            Self::ScaleY => "KFTypeScaleY",
            Self::UniformScale => "UNIFORM_SCALE",
            Self::Alpha => "KFTypeAlpha",
            Self::Saturation => "KFTypeSaturation",
            Self::Contrast => "KFTypeContrast",
            Self::Brightness => "KFTypeBrightness",
            Self::Volume => "KFTypeVolume",
        }
    }

    /// Inverse of [`as_str`](Self::as_str), used when loading a template.
    pub fn from_str_opt(name: &str) -> Option<Self> {
        Some(match name {
            "KFTypePositionX" => Self::PositionX,
            "KFTypePositionY" => Self::PositionY,
            "KFTypeRotation" => Self::Rotation,
            "KFTypeScaleX" => Self::ScaleX,
            "KFTypeScaleY" => Self::ScaleY,
            "UNIFORM_SCALE" => Self::UniformScale,
            "KFTypeAlpha" => Self::Alpha,
            "KFTypeSaturation" => Self::Saturation,
            "KFTypeContrast" => Self::Contrast,
            "KFTypeBrightness" => Self::Brightness,
            "KFTypeVolume" => Self::Volume,
            _ => return None,
        })
    }
}

impl fmt::Display for KeyframeProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single (time, value) sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    /// Time relative to the segment's target start.
    pub time: Ticks,
    /// Property value at this time.
    pub value: f64,
}

/// Sparse samples for one animated property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyframeTimeline {
    /// The animated property.
    pub property: KeyframeProperty,
    samples: Vec<Keyframe>,
}

impl KeyframeTimeline {
    /// Create a timeline with its first sample.
    ///
    /// A timeline never exists without at least one sample.
    pub fn new(property: KeyframeProperty, time: Ticks, value: f64) -> Self {
        Self {
            property,
            samples: vec![Keyframe { time, value }],
        }
    }

    /// Insert a sample, keeping times strictly increasing.
    pub fn add_sample(&mut self, time: Ticks, value: f64) -> Result<()> {
        match self.samples.binary_search_by(|kf| kf.time.cmp(&time)) {
            Ok(_) => Err(DraftError::DuplicateKeyframeTime(time.as_micros())),
            Err(pos) => {
                self.samples.insert(pos, Keyframe { time, value });
                Ok(())
            }
        }
    }

    /// Evaluate the property at a time.
    pub fn value_at(&self, time: Ticks) -> f64 {
        let first = self.samples[0];
        if time <= first.time {
            return first.value;
        }
        let last = self.samples[self.samples.len() - 1];
        if time >= last.time {
            return last.value;
        }
        let idx = self
            .samples
            .partition_point(|kf| kf.time <= time)
            .saturating_sub(1);
        let a = self.samples[idx];
        let b = self.samples[idx + 1];
        let span = (b.time - a.time).as_secs_f64();
        let t = (time - a.time).as_secs_f64() / span;
        a.value + (b.value - a.value) * t
    }

    /// All samples, in time order.
    pub fn samples(&self) -> &[Keyframe] {
        &self.samples
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always false: construction requires an initial sample.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
