//! Segments: time-bounded placements of content on a track.

use std::collections::BTreeMap;

use smallvec::SmallVec;
use uuid::Uuid;

use draftforge_catalog::{Catalog, CatalogCategory, CatalogEntry};
use draftforge_core::{
    DraftError, KeyframeProperty, KeyframeTimeline, Result, Ticks, Timerange, SEC,
};

use crate::material::{Material, MaterialId};
use crate::track::TrackKind;

/// Visual placement of a segment on the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipSettings {
    pub alpha: f64,
    pub flip_horizontal: bool,
    pub flip_vertical: bool,
    /// Degrees, clockwise.
    pub rotation: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    /// Canvas-relative offset, -1.0..1.0.
    pub transform_x: f64,
    pub transform_y: f64,
}

impl Default for ClipSettings {
    /// Identity placement.
    fn default() -> Self {
        Self {
            alpha: 1.0,
            flip_horizontal: false,
            flip_vertical: false,
            rotation: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            transform_x: 0.0,
            transform_y: 0.0,
        }
    }
}

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

/// Text rendering style. Colors are 0.0-1.0 floats throughout.
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub size: f64,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub color: [f64; 3],
    pub alpha: f64,
    pub align: TextAlign,
    pub vertical: bool,
    pub letter_spacing: f64,
    pub line_spacing: f64,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            size: 8.0,
            bold: false,
            italic: false,
            underline: false,
            color: [1.0, 1.0, 1.0],
            alpha: 1.0,
            align: TextAlign::default(),
            vertical: false,
            letter_spacing: 0.0,
            line_spacing: 0.0,
        }
    }
}

/// Text outline.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBorder {
    pub alpha: f64,
    pub color: [f64; 3],
    pub width: f64,
}

impl Default for TextBorder {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            color: [0.0, 0.0, 0.0],
            width: 40.0,
        }
    }
}

/// Text background card.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBackground {
    pub color: [f64; 3],
    pub alpha: f64,
}

/// A font resolved through the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontRef {
    pub key: String,
    pub resource_id: String,
}

/// Inline text content and styling.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSettings {
    pub content: String,
    pub font: Option<FontRef>,
    pub style: TextStyle,
    pub border: Option<TextBorder>,
    pub background: Option<TextBackground>,
    pub clip: ClipSettings,
}

/// Kind-specific segment payload.
#[derive(Debug, Clone, PartialEq)]
pub enum SegmentSettings {
    Video {
        clip: ClipSettings,
        volume: f64,
    },
    Audio {
        volume: f64,
        fade_in: Ticks,
        fade_out: Ticks,
    },
    Text(TextSettings),
    Sticker {
        resource_id: String,
        clip: ClipSettings,
    },
    /// Track-level effect placement; the effect itself rides in
    /// `applied_effects`.
    Effect,
    Filter {
        /// 0-100 slider value.
        intensity: f64,
    },
}

impl SegmentSettings {
    /// The track kind this payload belongs on.
    pub fn kind(&self) -> TrackKind {
        match self {
            Self::Video { .. } => TrackKind::Video,
            Self::Audio { .. } => TrackKind::Audio,
            Self::Text(_) => TrackKind::Text,
            Self::Sticker { .. } => TrackKind::Sticker,
            Self::Effect => TrackKind::Effect,
            Self::Filter { .. } => TrackKind::Filter,
        }
    }
}

/// A timed effect attached to a segment, resolved at attach time.
#[derive(Debug, Clone)]
pub struct EffectApplication {
    /// Symbolic key the effect was attached by.
    pub key: String,
    /// Resolved descriptor.
    pub entry: CatalogEntry,
    /// Applied duration, for categories that have one.
    pub duration: Option<Ticks>,
    /// Full parameter values, defaults overlaid with caller overrides.
    pub params: BTreeMap<String, f64>,
}

impl EffectApplication {
    pub fn category(&self) -> CatalogCategory {
        self.entry.category
    }
}

// Equality is descriptor identity plus applied values; parameter shapes
// (min/max bounds) are catalog detail that a loaded template no longer
// carries.
impl PartialEq for EffectApplication {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
            && self.entry.effect_id == other.entry.effect_id
            && self.entry.resource_id == other.entry.resource_id
            && self.entry.category == other.entry.category
            && self.duration == other.duration
            && self.params == other.params
    }
}

/// A time-bounded placement of content on a track.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub id: Uuid,
    /// Referenced material, if the content is a registered asset.
    pub material: Option<MaterialId>,
    /// Placement on the track timeline.
    pub target: Timerange,
    /// Trim window into the material, if any.
    pub source: Option<Timerange>,
    /// Playback speed, source duration over target duration.
    pub speed: f64,
    pub settings: SegmentSettings,
    pub effects: SmallVec<[EffectApplication; 2]>,
    pub keyframes: Vec<KeyframeTimeline>,
}

impl Segment {
    fn base(
        material: Option<MaterialId>,
        target: Timerange,
        source: Option<Timerange>,
        settings: SegmentSettings,
    ) -> Result<Self> {
        let target = Timerange::checked(target.start, target.duration)?;
        let speed = match source {
            Some(src) => src.duration.as_micros() as f64 / target.duration.as_micros() as f64,
            None => 1.0,
        };
        Ok(Self {
            id: Uuid::new_v4(),
            material,
            target,
            source,
            speed,
            settings,
            effects: SmallVec::new(),
            keyframes: Vec::new(),
        })
    }

    fn material_source(material: &Material, target: Timerange, source: Option<Timerange>) -> Result<Timerange> {
        let source = match source {
            Some(src) => Timerange::checked(src.start, src.duration)?,
            None => Timerange::new(Ticks::ZERO, target.duration),
        };
        if source.duration > material.duration {
            return Err(DraftError::InvalidRange(format!(
                "source duration {} exceeds material duration {}",
                source.duration.as_micros(),
                material.duration.as_micros()
            )));
        }
        Ok(source)
    }

    /// Place a video or photo material.
    ///
    /// Without an explicit source range the segment plays the material
    /// from its head for the target duration.
    pub fn video(material: &Material, target: Timerange) -> Result<Self> {
        Self::video_trimmed(material, target, None)
    }

    /// Place a video or photo material with an explicit trim window.
    pub fn video_trimmed(
        material: &Material,
        target: Timerange,
        source: Option<Timerange>,
    ) -> Result<Self> {
        if !material.kind.is_visual() {
            return Err(DraftError::KindMismatch {
                segment: material.kind.as_str().to_string(),
                track: TrackKind::Video.as_str().to_string(),
            });
        }
        let source = Self::material_source(material, target, source)?;
        Self::base(
            Some(material.id),
            target,
            Some(source),
            SegmentSettings::Video {
                clip: ClipSettings::default(),
                volume: 1.0,
            },
        )
    }

    /// Place an audio material.
    pub fn audio(material: &Material, target: Timerange, volume: f64) -> Result<Self> {
        Self::audio_trimmed(material, target, None, volume)
    }

    /// Place an audio material with an explicit trim window.
    pub fn audio_trimmed(
        material: &Material,
        target: Timerange,
        source: Option<Timerange>,
        volume: f64,
    ) -> Result<Self> {
        if material.kind.is_visual() {
            return Err(DraftError::KindMismatch {
                segment: material.kind.as_str().to_string(),
                track: TrackKind::Audio.as_str().to_string(),
            });
        }
        let source = Self::material_source(material, target, source)?;
        Self::base(
            Some(material.id),
            target,
            Some(source),
            SegmentSettings::Audio {
                volume,
                fade_in: Ticks::ZERO,
                fade_out: Ticks::ZERO,
            },
        )
    }

    /// Place inline text.
    pub fn text(content: impl Into<String>, target: Timerange) -> Result<Self> {
        Self::styled_text(content, target, TextStyle::default())
    }

    /// Place inline text with explicit styling.
    pub fn styled_text(
        content: impl Into<String>,
        target: Timerange,
        style: TextStyle,
    ) -> Result<Self> {
        Self::base(
            None,
            target,
            None,
            SegmentSettings::Text(TextSettings {
                content: content.into(),
                font: None,
                style,
                border: None,
                background: None,
                clip: ClipSettings::default(),
            }),
        )
    }

    /// Place a sticker resource.
    pub fn sticker(resource_id: impl Into<String>, target: Timerange) -> Result<Self> {
        Self::base(
            None,
            target,
            None,
            SegmentSettings::Sticker {
                resource_id: resource_id.into(),
                clip: ClipSettings::default(),
            },
        )
    }

    /// Place an effect-track segment carrying one resolved effect.
    pub fn effect(catalog: &Catalog, key: &str, target: Timerange) -> Result<Self> {
        let mut segment = Self::base(None, target, None, SegmentSettings::Effect)?;
        segment.attach_effect(catalog, key)?;
        Ok(segment)
    }

    /// Place a filter-track segment with an intensity slider value.
    pub fn filter(catalog: &Catalog, key: &str, target: Timerange, intensity: f64) -> Result<Self> {
        let mut segment = Self::base(
            None,
            target,
            None,
            SegmentSettings::Filter {
                intensity: intensity.clamp(0.0, 100.0),
            },
        )?;
        segment.attach_effect(catalog, key)?;
        Ok(segment)
    }

    /// The track kind this segment belongs on.
    pub fn kind(&self) -> TrackKind {
        self.settings.kind()
    }

    /// Attach an effect by symbolic key with catalog-default parameters.
    pub fn attach_effect(&mut self, catalog: &Catalog, key: &str) -> Result<()> {
        self.attach_effect_with(catalog, key, None, &[])
    }

    /// Attach an effect with an explicit duration and parameter overrides.
    ///
    /// The key is resolved immediately so an unknown key fails at attach
    /// time, not at serialize time. A second effect of the same category
    /// is rejected; remove the first one before replacing it.
    pub fn attach_effect_with(
        &mut self,
        catalog: &Catalog,
        key: &str,
        duration: Option<Ticks>,
        overrides: &[(&str, f64)],
    ) -> Result<()> {
        let entry = catalog.resolve(key)?;
        if let Some(existing) = self.effects.iter().find(|e| e.category() == entry.category) {
            return Err(DraftError::ConflictingEffect(format!(
                "{} ({} already attached)",
                entry.category.as_str(),
                existing.key
            )));
        }

        let mut params: BTreeMap<String, f64> = entry
            .params
            .iter()
            .map(|p| (p.name.clone(), p.default))
            .collect();
        for &(name, value) in overrides {
            let shape = entry
                .param(name)
                .ok_or_else(|| DraftError::UnknownCatalogKey(format!("{key}::{name}")))?;
            params.insert(name.to_string(), shape.clamp(value));
        }

        // Animations cannot outlast their segment; the clamp happens
        // here so the stored value is exactly what serialization emits.
        let duration = if entry.category.is_animation() {
            let requested = duration
                .or(entry.default_duration)
                .unwrap_or(Ticks(SEC / 2));
            Some(requested.min(self.target.duration))
        } else {
            duration.or(entry.default_duration)
        };

        // Kept sorted by category; order carries no meaning and a stable
        // order survives serialization round trips.
        let pos = self
            .effects
            .partition_point(|e| e.category() < entry.category);
        self.effects.insert(
            pos,
            EffectApplication {
                key: key.to_string(),
                entry: entry.clone(),
                duration,
                params,
            },
        );
        Ok(())
    }

    /// Remove the attached effect of a category, if any.
    pub fn detach_effect(&mut self, category: CatalogCategory) -> Option<EffectApplication> {
        let pos = self.effects.iter().position(|e| e.category() == category)?;
        Some(self.effects.remove(pos))
    }

    /// The attached effect of a category, if any.
    pub fn effect_of(&self, category: CatalogCategory) -> Option<&EffectApplication> {
        self.effects.iter().find(|e| e.category() == category)
    }

    /// Set the font on a text segment, resolved through the catalog.
    pub fn set_font(&mut self, catalog: &Catalog, key: &str) -> Result<()> {
        let entry = catalog.resolve(key)?;
        if entry.category != CatalogCategory::Font {
            return Err(DraftError::UnknownCatalogKey(format!(
                "{key} is a {} entry, not a font",
                entry.category.as_str()
            )));
        }
        match &mut self.settings {
            SegmentSettings::Text(text) => {
                text.font = Some(FontRef {
                    key: entry.key.clone(),
                    resource_id: entry.resource_id.clone(),
                });
                Ok(())
            }
            other => Err(DraftError::KindMismatch {
                segment: TrackKind::Text.as_str().to_string(),
                track: other.kind().as_str().to_string(),
            }),
        }
    }

    /// Set fade-in/out on an audio segment.
    pub fn set_fade(&mut self, fade_in: Ticks, fade_out: Ticks) -> Result<()> {
        match &mut self.settings {
            SegmentSettings::Audio {
                fade_in: fi,
                fade_out: fo,
                ..
            } => {
                *fi = fade_in;
                *fo = fade_out;
                Ok(())
            }
            other => Err(DraftError::KindMismatch {
                segment: TrackKind::Audio.as_str().to_string(),
                track: other.kind().as_str().to_string(),
            }),
        }
    }

    /// Replace the visual placement settings where the kind has them.
    pub fn set_clip(&mut self, clip: ClipSettings) -> Result<()> {
        match &mut self.settings {
            SegmentSettings::Video { clip: c, .. }
            | SegmentSettings::Text(TextSettings { clip: c, .. })
            | SegmentSettings::Sticker { clip: c, .. } => {
                *c = clip;
                Ok(())
            }
            other => Err(DraftError::KindMismatch {
                segment: TrackKind::Video.as_str().to_string(),
                track: other.kind().as_str().to_string(),
            }),
        }
    }

    /// Add a keyframe sample for a property, creating the timeline on
    /// first use. Times are relative to the segment's target start.
    pub fn add_keyframe(&mut self, property: KeyframeProperty, time: Ticks, value: f64) -> Result<()> {
        match self.keyframes.iter_mut().find(|tl| tl.property == property) {
            Some(timeline) => timeline.add_sample(time, value),
            None => {
                self.keyframes.push(KeyframeTimeline::new(property, time, value));
                Ok(())
            }
        }
    }

    /// Evaluate an animated property, if it has a timeline.
    pub fn keyframe_value(&self, property: KeyframeProperty, time: Ticks) -> Option<f64> {
        self.keyframes
            .iter()
            .find(|tl| tl.property == property)
            .map(|tl| tl.value_at(time))
    }
}
