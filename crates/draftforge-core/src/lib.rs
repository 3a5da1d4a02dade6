//! DraftForge Core - Foundation types for draft authoring
//!
//! This crate provides the fundamental types used throughout DraftForge:
//! - Microsecond-tick time model (Ticks, Timerange, duration parsing)
//! - Keyframe timelines with clamped-linear evaluation
//! - The shared error taxonomy

pub mod error;
pub mod keyframe;
pub mod time;

pub use error::{DraftError, Result};
pub use keyframe::{Keyframe, KeyframeProperty, KeyframeTimeline};
pub use time::{format_duration, parse_duration, trange, Ticks, Timerange, MILLI, SEC};
