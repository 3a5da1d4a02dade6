//! Emitting and loading the serialized draft document.
//!
//! Serialization is one explicit pass from the model graph into the
//! typed [`schema`](crate::schema) structs; deserialization rebuilds
//! the graph, re-deriving every cross-reference and failing with
//! [`DraftError::MalformedDocument`] on anything dangling or foreign.

use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, info};
use uuid::Uuid;

use draftforge_catalog::{CatalogCategory, CatalogEntry, ParamShape};
use draftforge_core::{
    DraftError, KeyframeProperty, KeyframeTimeline, Result, Ticks, Timerange, SEC,
};

use crate::document::Document;
use crate::material::{CropSettings, Material, MaterialId, MaterialKind, MaterialRegistry};
use crate::schema::{self, RawDocument, SCHEMA_VERSION};
use crate::segment::{
    ClipSettings, EffectApplication, FontRef, Segment, SegmentSettings, TextAlign, TextBackground,
    TextBorder, TextSettings, TextStyle,
};
use crate::track::{Track, TrackKind};

fn fmt_id(id: Uuid) -> String {
    id.to_string().to_uppercase()
}

fn fresh_id() -> String {
    fmt_id(Uuid::new_v4())
}

fn bad(msg: impl Into<String>) -> DraftError {
    DraftError::MalformedDocument(msg.into())
}

fn parse_id(text: &str, what: &str) -> Result<Uuid> {
    Uuid::parse_str(text).map_err(|_| bad(format!("{what} id {text:?} is not a UUID")))
}

// ── Emission ────────────────────────────────────────────────────

impl Document {
    /// Emit the document as the typed serialized tree.
    pub fn serialize(&self) -> RawDocument {
        let mut materials = schema::RawMaterials::default();

        for material in self.materials.iter() {
            match material.kind {
                MaterialKind::Video | MaterialKind::Photo => {
                    materials.videos.push(emit_video_material(material));
                }
                MaterialKind::Audio => {
                    materials.audios.push(emit_audio_material(material));
                }
            }
        }

        let mut tracks = Vec::with_capacity(self.tracks().len());
        for track in self.tracks() {
            let kind_position = self
                .tracks()
                .iter()
                .take_while(|t| t.id != track.id)
                .filter(|t| t.kind == track.kind)
                .count();
            let render_index = track.kind.render_index_base() + kind_position as i32;
            tracks.push(emit_track(track, render_index, &mut materials));
        }

        RawDocument {
            canvas_config: schema::RawCanvasConfig {
                height: self.height,
                ratio: "original".to_string(),
                width: self.width,
            },
            color_space: 0,
            create_time: self.create_time,
            duration: self.duration().as_micros(),
            fps: self.fps as f64,
            free_render_index_mode_on: false,
            id: fmt_id(self.id),
            materials,
            new_version: schema::APP_VERSION.to_string(),
            platform: schema::RawPlatform::default(),
            tracks,
            update_time: self.update_time,
            version: SCHEMA_VERSION,
        }
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.serialize())
            .map_err(|e| DraftError::Serialization(format!("failed to serialize draft: {e}")))
    }

    /// Write the serialized document to a file.
    pub fn dump(&self, path: &Path) -> Result<()> {
        let json = self.to_json()?;
        std::fs::write(path, json)?;
        info!(path = %path.display(), tracks = self.tracks().len(), "Draft written");
        Ok(())
    }
}

fn emit_video_material(material: &Material) -> schema::RawVideoMaterial {
    let crop = material.crop.unwrap_or_default();
    schema::RawVideoMaterial {
        crop: emit_crop(crop),
        crop_ratio: "free".to_string(),
        crop_scale: 1.0,
        duration: material.duration.as_micros(),
        height: material.height,
        id: fmt_id(material.id.as_uuid()),
        material_name: material.name.clone(),
        path: material.path.clone(),
        kind: material.kind.as_str().to_string(),
        width: material.width,
    }
}

fn emit_audio_material(material: &Material) -> schema::RawAudioMaterial {
    schema::RawAudioMaterial {
        duration: material.duration.as_micros(),
        id: fmt_id(material.id.as_uuid()),
        name: material.name.clone(),
        path: material.path.clone(),
        kind: material.kind.as_str().to_string(),
    }
}

fn emit_crop(crop: CropSettings) -> schema::RawCrop {
    schema::RawCrop {
        lower_left_x: crop.lower_left_x,
        lower_left_y: crop.lower_left_y,
        lower_right_x: crop.lower_right_x,
        lower_right_y: crop.lower_right_y,
        upper_left_x: crop.upper_left_x,
        upper_left_y: crop.upper_left_y,
        upper_right_x: crop.upper_right_x,
        upper_right_y: crop.upper_right_y,
    }
}

fn emit_track(
    track: &Track,
    render_index: i32,
    materials: &mut schema::RawMaterials,
) -> schema::RawTrack {
    schema::RawTrack {
        attribute: i32::from(track.muted),
        flag: 0,
        id: fmt_id(track.id),
        name: track.name.clone(),
        segments: track
            .segments()
            .iter()
            .map(|s| emit_segment(s, render_index, materials))
            .collect(),
        kind: track.kind.as_str().to_string(),
    }
}

fn emit_segment(
    segment: &Segment,
    render_index: i32,
    materials: &mut schema::RawMaterials,
) -> schema::RawSegment {
    let mut refs: Vec<String> = Vec::new();

    // Primary material reference plus inline-content materials.
    let material_id = match (&segment.settings, segment.material) {
        (_, Some(id)) => fmt_id(id.as_uuid()),
        (SegmentSettings::Text(text), None) => {
            let id = fresh_id();
            materials.texts.push(emit_text_material(&id, text));
            id
        }
        (SegmentSettings::Sticker { resource_id, .. }, None) => {
            let id = fresh_id();
            materials.stickers.push(schema::RawSticker {
                id: id.clone(),
                resource_id: resource_id.clone(),
                kind: "sticker".to_string(),
            });
            id
        }
        _ => String::new(),
    };

    // Material-backed segments always carry a speed entry.
    if segment.material.is_some() {
        let id = fresh_id();
        materials.speeds.push(schema::RawSpeed {
            id: id.clone(),
            mode: 0,
            speed: segment.speed,
            kind: "speed".to_string(),
        });
        refs.push(id);
    }

    let volume = match &segment.settings {
        SegmentSettings::Video { volume, .. } | SegmentSettings::Audio { volume, .. } => *volume,
        _ => 1.0,
    };

    if let SegmentSettings::Audio {
        fade_in, fade_out, ..
    } = segment.settings
    {
        if !fade_in.is_zero() || !fade_out.is_zero() {
            let id = fresh_id();
            materials.audio_fades.push(schema::RawAudioFade {
                fade_in_duration: fade_in.as_micros(),
                fade_out_duration: fade_out.as_micros(),
                id: id.clone(),
                kind: "audio_fade".to_string(),
            });
            refs.push(id);
        }
    }

    emit_effects(segment, materials, &mut refs);

    let clip = match &segment.settings {
        SegmentSettings::Video { clip, .. }
        | SegmentSettings::Sticker { clip, .. }
        | SegmentSettings::Text(TextSettings { clip, .. }) => Some(emit_clip(clip)),
        _ => None,
    };

    schema::RawSegment {
        clip,
        common_keyframes: segment.keyframes.iter().map(emit_keyframes).collect(),
        extra_material_refs: refs,
        id: fmt_id(segment.id),
        material_id,
        render_index,
        source_timerange: segment.source.map(emit_timerange),
        speed: segment.speed,
        target_timerange: emit_timerange(segment.target),
        visible: true,
        volume,
    }
}

fn emit_effects(segment: &Segment, materials: &mut schema::RawMaterials, refs: &mut Vec<String>) {
    let animations: Vec<&EffectApplication> = segment
        .effects
        .iter()
        .filter(|e| e.category().is_animation())
        .collect();
    if !animations.is_empty() {
        let id = fresh_id();
        materials.material_animations.push(schema::RawAnimationGroup {
            animations: animations
                .iter()
                .map(|app| emit_animation(app, segment.target.duration))
                .collect(),
            id: id.clone(),
            kind: "sticker_animation".to_string(),
        });
        refs.push(id);
    }

    for app in &segment.effects {
        match app.category() {
            c if c.is_animation() => {}
            CatalogCategory::Transition => {
                let id = fresh_id();
                materials.transitions.push(schema::RawTransition {
                    duration: app.duration.unwrap_or(Ticks(SEC)).as_micros(),
                    effect_id: app.entry.effect_id.clone(),
                    id: id.clone(),
                    is_overlap: true,
                    name: app.key.clone(),
                    resource_id: app.entry.resource_id.clone(),
                    kind: "transition".to_string(),
                });
                refs.push(id);
            }
            CatalogCategory::Font => {}
            category => {
                let value = match segment.settings {
                    // The filter track's own effect carries the slider value.
                    SegmentSettings::Filter { intensity } if category == CatalogCategory::Filter => {
                        intensity / 100.0
                    }
                    _ => 1.0,
                };
                let id = fresh_id();
                materials.effects.push(schema::RawEffect {
                    adjust_params: app
                        .params
                        .iter()
                        .map(|(name, &value)| schema::RawAdjustParam {
                            default_value: app
                                .entry
                                .param(name)
                                .map(|p| p.default)
                                .unwrap_or(value),
                            name: name.clone(),
                            value,
                        })
                        .collect(),
                    apply_target_type: 0,
                    effect_id: app.entry.effect_id.clone(),
                    id: id.clone(),
                    name: app.key.clone(),
                    resource_id: app.entry.resource_id.clone(),
                    kind: category.as_str().to_string(),
                    value,
                });
                refs.push(id);
            }
        }
    }
}

// Attach time already clamped the duration to the segment, so this is
// a pure projection of the stored values.
fn emit_animation(app: &EffectApplication, segment_duration: Ticks) -> schema::RawAnimation {
    let duration = app.duration.unwrap_or(Ticks(SEC / 2)).as_micros();
    let start = match app.category() {
        // Outros run up against the segment end.
        CatalogCategory::Outro | CatalogCategory::TextOutro => {
            (segment_duration.as_micros() - duration).max(0)
        }
        _ => 0,
    };
    schema::RawAnimation {
        duration,
        id: app.entry.effect_id.clone(),
        name: app.key.clone(),
        resource_id: app.entry.resource_id.clone(),
        start,
        kind: app.category().as_str().to_string(),
    }
}

fn emit_text_material(id: &str, text: &TextSettings) -> schema::RawTextMaterial {
    let border = text.border.as_ref();
    let background = text.background.as_ref();
    schema::RawTextMaterial {
        alignment: match text.style.align {
            TextAlign::Left => 0,
            TextAlign::Center => 1,
            TextAlign::Right => 2,
        },
        background_alpha: background.map(|b| b.alpha).unwrap_or(1.0),
        background_color: background.map(|b| b.color).unwrap_or([0.0, 0.0, 0.0]),
        bold: text.style.bold,
        border_alpha: border.map(|b| b.alpha).unwrap_or(1.0),
        border_color: border.map(|b| b.color).unwrap_or([0.0, 0.0, 0.0]),
        border_width: border.map(|b| b.width).unwrap_or(0.0),
        content: text.content.clone(),
        font_resource_id: text
            .font
            .as_ref()
            .map(|f| f.resource_id.clone())
            .unwrap_or_default(),
        font_title: text
            .font
            .as_ref()
            .map(|f| f.key.clone())
            .unwrap_or_else(|| "none".to_string()),
        has_background: background.is_some(),
        has_border: border.is_some(),
        id: id.to_string(),
        italic: text.style.italic,
        letter_spacing: text.style.letter_spacing,
        line_spacing: text.style.line_spacing,
        text_alpha: text.style.alpha,
        text_color: text.style.color,
        text_size: text.style.size,
        kind: "text".to_string(),
        underline: text.style.underline,
        vertical: text.style.vertical,
    }
}

fn emit_clip(clip: &ClipSettings) -> schema::RawClip {
    schema::RawClip {
        alpha: clip.alpha,
        flip: schema::RawFlip {
            horizontal: clip.flip_horizontal,
            vertical: clip.flip_vertical,
        },
        rotation: clip.rotation,
        scale: schema::RawXY {
            x: clip.scale_x,
            y: clip.scale_y,
        },
        transform: schema::RawXY {
            x: clip.transform_x,
            y: clip.transform_y,
        },
    }
}

fn emit_timerange(range: Timerange) -> schema::RawTimerange {
    schema::RawTimerange {
        duration: range.duration.as_micros(),
        start: range.start.as_micros(),
    }
}

fn emit_keyframes(timeline: &KeyframeTimeline) -> schema::RawKeyframeList {
    schema::RawKeyframeList {
        id: fresh_id(),
        keyframe_list: timeline
            .samples()
            .iter()
            .map(|kf| schema::RawKeyframe {
                id: fresh_id(),
                time_offset: kf.time.as_micros(),
                values: vec![kf.value],
            })
            .collect(),
        kind: timeline.property.as_str().to_string(),
    }
}

// ── Loading ─────────────────────────────────────────────────────

/// Lookup maps over the raw materials section, keyed by entry id.
struct MaterialIndex<'a> {
    texts: HashMap<&'a str, &'a schema::RawTextMaterial>,
    stickers: HashMap<&'a str, &'a schema::RawSticker>,
    effects: HashMap<&'a str, &'a schema::RawEffect>,
    transitions: HashMap<&'a str, &'a schema::RawTransition>,
    animations: HashMap<&'a str, &'a schema::RawAnimationGroup>,
    fades: HashMap<&'a str, &'a schema::RawAudioFade>,
    speeds: HashMap<&'a str, &'a schema::RawSpeed>,
}

impl<'a> MaterialIndex<'a> {
    fn new(materials: &'a schema::RawMaterials) -> Self {
        Self {
            texts: materials.texts.iter().map(|m| (m.id.as_str(), m)).collect(),
            stickers: materials.stickers.iter().map(|m| (m.id.as_str(), m)).collect(),
            effects: materials.effects.iter().map(|m| (m.id.as_str(), m)).collect(),
            transitions: materials.transitions.iter().map(|m| (m.id.as_str(), m)).collect(),
            animations: materials
                .material_animations
                .iter()
                .map(|m| (m.id.as_str(), m))
                .collect(),
            fades: materials.audio_fades.iter().map(|m| (m.id.as_str(), m)).collect(),
            speeds: materials.speeds.iter().map(|m| (m.id.as_str(), m)).collect(),
        }
    }
}

impl Document {
    /// Rebuild a document from its serialized tree.
    pub fn deserialize(raw: &RawDocument) -> Result<Self> {
        if raw.version != SCHEMA_VERSION {
            return Err(bad(format!(
                "unsupported schema version {} (expected {})",
                raw.version, SCHEMA_VERSION
            )));
        }

        let mut registry = MaterialRegistry::new();
        for video in &raw.materials.videos {
            registry.insert_loaded(load_video_material(video)?)?;
        }
        for audio in &raw.materials.audios {
            registry.insert_loaded(load_audio_material(audio)?)?;
        }

        let index = MaterialIndex::new(&raw.materials);
        let mut tracks = Vec::with_capacity(raw.tracks.len());
        for raw_track in &raw.tracks {
            tracks.push(load_track(raw_track, &registry, &index)?);
        }

        debug!(
            tracks = tracks.len(),
            materials = registry.len(),
            "Draft graph rebuilt"
        );
        Ok(Self {
            id: parse_id(&raw.id, "document")?,
            width: raw.canvas_config.width,
            height: raw.canvas_config.height,
            fps: raw.fps as u32,
            create_time: raw.create_time,
            update_time: raw.update_time,
            tracks,
            materials: registry,
        })
    }

    /// Parse a serialized document from JSON text.
    ///
    /// The version field is checked before the full parse so a foreign
    /// schema fails with a version error rather than a field error.
    pub fn from_json(data: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(data)
            .map_err(|e| bad(format!("invalid JSON: {e}")))?;
        let version = value
            .get("version")
            .and_then(|v| v.as_u64())
            .ok_or_else(|| bad("missing version field"))?;
        if version != u64::from(SCHEMA_VERSION) {
            return Err(bad(format!(
                "unsupported schema version {version} (expected {SCHEMA_VERSION})"
            )));
        }
        let raw: RawDocument = serde_json::from_value(value)
            .map_err(|e| bad(format!("schema mismatch: {e}")))?;
        Self::deserialize(&raw)
    }

    /// Load a serialized document from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let doc = Self::from_json(&data)?;
        info!(path = %path.display(), tracks = doc.tracks().len(), "Draft loaded");
        Ok(doc)
    }
}

fn load_video_material(raw: &schema::RawVideoMaterial) -> Result<Material> {
    let kind = match raw.kind.as_str() {
        "video" => MaterialKind::Video,
        "photo" => MaterialKind::Photo,
        other => return Err(bad(format!("unknown video material type {other:?}"))),
    };
    let crop = load_crop(&raw.crop);
    Ok(Material {
        id: MaterialId::from_uuid(parse_id(&raw.id, "material")?),
        kind,
        name: raw.material_name.clone(),
        path: raw.path.clone(),
        duration: Ticks(raw.duration),
        width: raw.width,
        height: raw.height,
        crop: (crop != CropSettings::default()).then_some(crop),
    })
}

fn load_audio_material(raw: &schema::RawAudioMaterial) -> Result<Material> {
    Ok(Material {
        id: MaterialId::from_uuid(parse_id(&raw.id, "material")?),
        kind: MaterialKind::Audio,
        name: raw.name.clone(),
        path: raw.path.clone(),
        duration: Ticks(raw.duration),
        width: 0,
        height: 0,
        crop: None,
    })
}

fn load_crop(raw: &schema::RawCrop) -> CropSettings {
    CropSettings {
        upper_left_x: raw.upper_left_x,
        upper_left_y: raw.upper_left_y,
        upper_right_x: raw.upper_right_x,
        upper_right_y: raw.upper_right_y,
        lower_left_x: raw.lower_left_x,
        lower_left_y: raw.lower_left_y,
        lower_right_x: raw.lower_right_x,
        lower_right_y: raw.lower_right_y,
    }
}

fn load_track(
    raw: &schema::RawTrack,
    registry: &MaterialRegistry,
    index: &MaterialIndex<'_>,
) -> Result<Track> {
    let kind = TrackKind::from_str_opt(&raw.kind)
        .ok_or_else(|| bad(format!("unknown track type {:?}", raw.kind)))?;
    let mut track = Track {
        id: parse_id(&raw.id, "track")?,
        name: raw.name.clone(),
        kind,
        muted: raw.attribute == 1,
        segments: Vec::new(),
    };
    for raw_segment in &raw.segments {
        let segment = load_segment(raw_segment, kind, registry, index)?;
        // Re-enforces ordering and the no-overlap invariant on load.
        track
            .add_segment(segment)
            .map_err(|e| bad(format!("track {}: {e}", raw.name)))?;
    }
    Ok(track)
}

fn load_segment(
    raw: &schema::RawSegment,
    track_kind: TrackKind,
    registry: &MaterialRegistry,
    index: &MaterialIndex<'_>,
) -> Result<Segment> {
    let target = load_timerange(raw.target_timerange)?;
    let source = raw.source_timerange.map(load_timerange).transpose()?;

    let clip = || -> Result<ClipSettings> {
        raw.clip
            .as_ref()
            .map(load_clip)
            .ok_or_else(|| bad(format!("segment {} has no clip settings", raw.id)))
    };

    let mut material = None;
    let settings = match track_kind {
        TrackKind::Video | TrackKind::Audio => {
            let id = MaterialId::from_uuid(parse_id(&raw.material_id, "segment material")?);
            let entry = registry
                .get(id)
                .map_err(|_| bad(format!("dangling material reference {}", raw.material_id)))?;
            if entry.kind.is_visual() != (track_kind == TrackKind::Video) {
                return Err(bad(format!(
                    "segment {}: {} material {} on a {} track",
                    raw.id,
                    entry.kind.as_str(),
                    raw.material_id,
                    track_kind.as_str()
                )));
            }
            if let Some(source) = source {
                if source.duration > entry.duration {
                    return Err(bad(format!(
                        "segment {}: source duration {} exceeds material duration {}",
                        raw.id,
                        source.duration.as_micros(),
                        entry.duration.as_micros()
                    )));
                }
            }
            material = Some(id);
            if track_kind == TrackKind::Video {
                SegmentSettings::Video {
                    clip: clip()?,
                    volume: raw.volume,
                }
            } else {
                let fade = raw
                    .extra_material_refs
                    .iter()
                    .find_map(|r| index.fades.get(r.as_str()));
                SegmentSettings::Audio {
                    volume: raw.volume,
                    fade_in: fade.map(|f| Ticks(f.fade_in_duration)).unwrap_or(Ticks::ZERO),
                    fade_out: fade.map(|f| Ticks(f.fade_out_duration)).unwrap_or(Ticks::ZERO),
                }
            }
        }
        TrackKind::Text => {
            let text = index
                .texts
                .get(raw.material_id.as_str())
                .copied()
                .ok_or_else(|| bad(format!("dangling text reference {}", raw.material_id)))?;
            SegmentSettings::Text(load_text_settings(text, clip()?))
        }
        TrackKind::Sticker => {
            let sticker = index
                .stickers
                .get(raw.material_id.as_str())
                .ok_or_else(|| bad(format!("dangling sticker reference {}", raw.material_id)))?;
            SegmentSettings::Sticker {
                resource_id: sticker.resource_id.clone(),
                clip: clip()?,
            }
        }
        TrackKind::Effect => SegmentSettings::Effect,
        TrackKind::Filter => {
            let intensity = raw
                .extra_material_refs
                .iter()
                .find_map(|r| index.effects.get(r.as_str()))
                .filter(|e| e.kind == CatalogCategory::Filter.as_str())
                .map(|e| e.value * 100.0)
                .unwrap_or(100.0);
            SegmentSettings::Filter { intensity }
        }
    };

    let mut effects = smallvec::SmallVec::new();
    for reference in &raw.extra_material_refs {
        let reference = reference.as_str();
        if index.speeds.contains_key(reference) || index.fades.contains_key(reference) {
            continue;
        }
        if let Some(transition) = index.transitions.get(reference).copied() {
            effects.push(load_transition(transition));
        } else if let Some(effect) = index.effects.get(reference).copied() {
            effects.push(load_effect(effect)?);
        } else if let Some(group) = index.animations.get(reference).copied() {
            for animation in &group.animations {
                effects.push(load_animation(animation)?);
            }
        } else {
            return Err(bad(format!("dangling extra material reference {reference}")));
        }
    }
    effects.sort_by_key(|e: &EffectApplication| e.category());

    let mut keyframes = Vec::with_capacity(raw.common_keyframes.len());
    for list in &raw.common_keyframes {
        keyframes.push(load_keyframes(list)?);
    }

    Ok(Segment {
        id: parse_id(&raw.id, "segment")?,
        material,
        target,
        source,
        speed: raw.speed,
        settings,
        effects,
        keyframes,
    })
}

fn load_text_settings(raw: &schema::RawTextMaterial, clip: ClipSettings) -> TextSettings {
    TextSettings {
        content: raw.content.clone(),
        font: (raw.font_title != "none" && !raw.font_title.is_empty()).then(|| FontRef {
            key: raw.font_title.clone(),
            resource_id: raw.font_resource_id.clone(),
        }),
        style: TextStyle {
            size: raw.text_size,
            bold: raw.bold,
            italic: raw.italic,
            underline: raw.underline,
            color: raw.text_color,
            alpha: raw.text_alpha,
            align: match raw.alignment {
                0 => TextAlign::Left,
                2 => TextAlign::Right,
                _ => TextAlign::Center,
            },
            vertical: raw.vertical,
            letter_spacing: raw.letter_spacing,
            line_spacing: raw.line_spacing,
        },
        border: raw.has_border.then(|| TextBorder {
            alpha: raw.border_alpha,
            color: raw.border_color,
            width: raw.border_width,
        }),
        background: raw.has_background.then(|| TextBackground {
            color: raw.background_color,
            alpha: raw.background_alpha,
        }),
        clip,
    }
}

fn load_transition(raw: &schema::RawTransition) -> EffectApplication {
    EffectApplication {
        key: raw.name.clone(),
        entry: CatalogEntry {
            key: raw.name.clone(),
            effect_id: raw.effect_id.clone(),
            resource_id: raw.resource_id.clone(),
            category: CatalogCategory::Transition,
            default_duration: None,
            params: vec![],
        },
        duration: Some(Ticks(raw.duration)),
        params: Default::default(),
    }
}

fn load_effect(raw: &schema::RawEffect) -> Result<EffectApplication> {
    let category = CatalogCategory::from_str_opt(&raw.kind)
        .ok_or_else(|| bad(format!("unknown effect category {:?}", raw.kind)))?;
    Ok(EffectApplication {
        key: raw.name.clone(),
        entry: CatalogEntry {
            key: raw.name.clone(),
            effect_id: raw.effect_id.clone(),
            resource_id: raw.resource_id.clone(),
            category,
            default_duration: None,
            params: raw
                .adjust_params
                .iter()
                .map(|p| ParamShape::new(p.name.clone(), p.default_value, 0.0, 100.0))
                .collect(),
        },
        duration: None,
        params: raw
            .adjust_params
            .iter()
            .map(|p| (p.name.clone(), p.value))
            .collect(),
    })
}

fn load_animation(raw: &schema::RawAnimation) -> Result<EffectApplication> {
    let category = CatalogCategory::from_str_opt(&raw.kind)
        .ok_or_else(|| bad(format!("unknown animation category {:?}", raw.kind)))?;
    Ok(EffectApplication {
        key: raw.name.clone(),
        entry: CatalogEntry {
            key: raw.name.clone(),
            effect_id: raw.id.clone(),
            resource_id: raw.resource_id.clone(),
            category,
            default_duration: None,
            params: vec![],
        },
        duration: Some(Ticks(raw.duration)),
        params: Default::default(),
    })
}

fn load_clip(raw: &schema::RawClip) -> ClipSettings {
    ClipSettings {
        alpha: raw.alpha,
        flip_horizontal: raw.flip.horizontal,
        flip_vertical: raw.flip.vertical,
        rotation: raw.rotation,
        scale_x: raw.scale.x,
        scale_y: raw.scale.y,
        transform_x: raw.transform.x,
        transform_y: raw.transform.y,
    }
}

fn load_timerange(raw: schema::RawTimerange) -> Result<Timerange> {
    Timerange::checked(Ticks(raw.start), Ticks(raw.duration))
        .map_err(|e| bad(format!("bad timerange: {e}")))
}

fn load_keyframes(raw: &schema::RawKeyframeList) -> Result<KeyframeTimeline> {
    let property = KeyframeProperty::from_str_opt(&raw.kind)
        .ok_or_else(|| bad(format!("unknown keyframe property {:?}", raw.kind)))?;
    let mut samples = raw.keyframe_list.iter();
    let first = samples
        .next()
        .ok_or_else(|| bad("keyframe timeline without samples"))?;
    let value = |kf: &schema::RawKeyframe| -> Result<f64> {
        kf.values
            .first()
            .copied()
            .ok_or_else(|| bad("keyframe without a value"))
    };
    let mut timeline = KeyframeTimeline::new(property, Ticks(first.time_offset), value(first)?);
    for sample in samples {
        timeline
            .add_sample(Ticks(sample.time_offset), value(sample)?)
            .map_err(|e| bad(format!("bad keyframe list: {e}")))?;
    }
    Ok(timeline)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::MaterialMeta;
    use crate::segment::TextStyle;
    use draftforge_catalog::Catalog;
    use draftforge_core::trange;

    fn sample_document() -> Document {
        let catalog = Catalog::builtin();
        let mut doc = Document::new(1920, 1080, 30);
        doc.add_track(TrackKind::Video)
            .add_track(TrackKind::Audio)
            .add_track(TrackKind::Text);

        let video_id = doc.register_material(
            "assets/clip.mp4",
            MaterialKind::Video,
            MaterialMeta::new(Ticks(10 * SEC), 1920, 1080),
            None,
        );
        let audio_id = doc.register_material(
            "assets/song.mp3",
            MaterialKind::Audio,
            MaterialMeta::audio(Ticks(30 * SEC)),
            None,
        );

        let video = doc.materials.get(video_id).unwrap().clone();
        let mut video_segment = Segment::video(&video, trange("0s", "4.2s").unwrap()).unwrap();
        video_segment.attach_effect(&catalog, "fade_in").unwrap();
        video_segment.attach_effect(&catalog, "dissolve").unwrap();
        video_segment
            .attach_effect_with(&catalog, "glitch", None, &[("speed", 80.0)])
            .unwrap();
        video_segment
            .add_keyframe(KeyframeProperty::Alpha, Ticks::ZERO, 0.0)
            .unwrap();
        video_segment
            .add_keyframe(KeyframeProperty::Alpha, Ticks(2 * SEC), 1.0)
            .unwrap();
        doc.add_segment(video_segment).unwrap();

        let audio = doc.materials.get(audio_id).unwrap().clone();
        let mut audio_segment = Segment::audio(&audio, trange("0s", "5s").unwrap(), 0.6).unwrap();
        audio_segment.set_fade(Ticks(SEC), Ticks::ZERO).unwrap();
        doc.add_segment(audio_segment).unwrap();

        let mut text_segment = Segment::styled_text(
            "Hello",
            trange("1s", "3s").unwrap(),
            TextStyle {
                color: [1.0, 1.0, 0.0],
                ..TextStyle::default()
            },
        )
        .unwrap();
        text_segment.set_font(&catalog, "sans_bold").unwrap();
        text_segment.attach_effect(&catalog, "typewriter").unwrap();
        doc.add_segment(text_segment).unwrap();

        doc
    }

    #[test]
    fn emits_expected_shape() {
        let doc = sample_document();
        let raw = doc.serialize();

        assert_eq!(raw.version, SCHEMA_VERSION);
        assert_eq!(raw.canvas_config.width, 1920);
        assert_eq!(raw.fps, 30.0);
        assert_eq!(raw.tracks.len(), 3);
        assert_eq!(raw.materials.videos.len(), 1);
        assert_eq!(raw.materials.audios.len(), 1);
        assert_eq!(raw.materials.texts.len(), 1);
        assert_eq!(raw.materials.transitions.len(), 1);
        assert_eq!(raw.materials.audio_fades.len(), 1);
        // fade_in on video + typewriter on text
        assert_eq!(raw.materials.material_animations.len(), 2);

        let video_segment = &raw.tracks[0].segments[0];
        assert_eq!(video_segment.target_timerange.duration, 4_200_000);
        assert_eq!(video_segment.source_timerange.unwrap().duration, 4_200_000);
        assert!(!video_segment.material_id.is_empty());
        assert_eq!(video_segment.common_keyframes.len(), 1);
        assert_eq!(video_segment.common_keyframes[0].keyframe_list.len(), 2);
    }

    #[test]
    fn every_reference_resolves() {
        let doc = sample_document();
        let raw = doc.serialize();
        let index = MaterialIndex::new(&raw.materials);
        let video_ids: Vec<&str> = raw.materials.videos.iter().map(|m| m.id.as_str()).collect();
        let audio_ids: Vec<&str> = raw.materials.audios.iter().map(|m| m.id.as_str()).collect();

        for track in &raw.tracks {
            for segment in &track.segments {
                if !segment.material_id.is_empty() {
                    let id = segment.material_id.as_str();
                    assert!(
                        video_ids.contains(&id)
                            || audio_ids.contains(&id)
                            || index.texts.contains_key(id)
                            || index.stickers.contains_key(id),
                        "unresolved material_id {id}"
                    );
                }
                for reference in &segment.extra_material_refs {
                    let r = reference.as_str();
                    assert!(
                        index.speeds.contains_key(r)
                            || index.fades.contains_key(r)
                            || index.transitions.contains_key(r)
                            || index.effects.contains_key(r)
                            || index.animations.contains_key(r),
                        "unresolved extra ref {r}"
                    );
                }
            }
        }
    }

    #[test]
    fn json_roundtrip_reproduces_graph() {
        let doc = sample_document();
        let json = doc.to_json().unwrap();
        let loaded = Document::from_json(&json).unwrap();
        assert_eq!(loaded, doc);
    }

    #[test]
    fn audio_registered_before_video_roundtrips() {
        let mut doc = Document::new(1920, 1080, 30);
        doc.add_track(TrackKind::Video).add_track(TrackKind::Audio);
        let audio_id = doc.register_material(
            "assets/song.mp3",
            MaterialKind::Audio,
            MaterialMeta::audio(Ticks(30 * SEC)),
            None,
        );
        let video_id = doc.register_material(
            "assets/clip.mp4",
            MaterialKind::Video,
            MaterialMeta::new(Ticks(10 * SEC), 1920, 1080),
            None,
        );
        let audio = doc.materials.get(audio_id).unwrap().clone();
        let video = doc.materials.get(video_id).unwrap().clone();
        doc.add_segment(Segment::video(&video, trange("0s", "4s").unwrap()).unwrap())
            .unwrap();
        doc.add_segment(Segment::audio(&audio, trange("0s", "5s").unwrap(), 1.0).unwrap())
            .unwrap();

        // The serialized form groups materials by kind; the loaded
        // registry still compares equal to the original.
        let loaded = Document::from_json(&doc.to_json().unwrap()).unwrap();
        assert_eq!(loaded, doc);
    }

    #[test]
    fn animation_on_short_segment_roundtrips() {
        let catalog = Catalog::builtin();
        let mut doc = Document::new(1920, 1080, 30);
        doc.add_track(TrackKind::Text);
        let mut caption = Segment::text("blink", trange("0s", "0.3s").unwrap()).unwrap();
        caption.attach_effect(&catalog, "typewriter").unwrap();
        doc.add_segment(caption).unwrap();

        let loaded = Document::from_json(&doc.to_json().unwrap()).unwrap();
        assert_eq!(loaded, doc);
        let app = &loaded.tracks()[0].segments()[0].effects[0];
        assert_eq!(app.duration, Some(Ticks(300_000)));
    }

    #[test]
    fn roundtrip_with_effect_and_filter_tracks() {
        let catalog = Catalog::builtin();
        let mut doc = Document::new(1080, 1920, 60);
        doc.add_track(TrackKind::Effect).add_track(TrackKind::Filter);
        doc.add_segment(Segment::effect(&catalog, "glitch", trange("0s", "2s").unwrap()).unwrap())
            .unwrap();
        doc.add_segment(
            Segment::filter(&catalog, "retro", trange("0s", "2s").unwrap(), 80.0).unwrap(),
        )
        .unwrap();

        let loaded = Document::from_json(&doc.to_json().unwrap()).unwrap();
        assert_eq!(loaded, doc);
        match loaded.tracks()[1].segments()[0].settings {
            SegmentSettings::Filter { intensity } => assert!((intensity - 80.0).abs() < 1e-9),
            _ => unreachable!(),
        }
    }

    #[test]
    fn foreign_version_rejected() {
        let doc = sample_document();
        let mut value: serde_json::Value =
            serde_json::from_str(&doc.to_json().unwrap()).unwrap();
        value["version"] = serde_json::json!(999_999);
        let err = Document::from_json(&value.to_string()).unwrap_err();
        assert!(matches!(err, DraftError::MalformedDocument(msg) if msg.contains("version")));
    }

    #[test]
    fn dangling_material_rejected() {
        let doc = sample_document();
        let mut value: serde_json::Value =
            serde_json::from_str(&doc.to_json().unwrap()).unwrap();
        value["materials"]["videos"] = serde_json::json!([]);
        let err = Document::from_json(&value.to_string()).unwrap_err();
        assert!(matches!(err, DraftError::MalformedDocument(_)));
    }

    #[test]
    fn material_on_wrong_track_kind_rejected() {
        let doc = sample_document();
        let mut value: serde_json::Value =
            serde_json::from_str(&doc.to_json().unwrap()).unwrap();
        // Point the video-track segment at the audio material.
        let audio_id = value["materials"]["audios"][0]["id"].clone();
        value["tracks"][0]["segments"][0]["material_id"] = audio_id;
        let err = Document::from_json(&value.to_string()).unwrap_err();
        assert!(matches!(err, DraftError::MalformedDocument(msg) if msg.contains("track")));
    }

    #[test]
    fn dangling_extra_ref_rejected() {
        let doc = sample_document();
        let mut value: serde_json::Value =
            serde_json::from_str(&doc.to_json().unwrap()).unwrap();
        value["materials"]["transitions"] = serde_json::json!([]);
        let err = Document::from_json(&value.to_string()).unwrap_err();
        assert!(matches!(err, DraftError::MalformedDocument(_)));
    }

    #[test]
    fn overlapping_segments_in_file_rejected() {
        let doc = sample_document();
        let mut value: serde_json::Value =
            serde_json::from_str(&doc.to_json().unwrap()).unwrap();
        // Clone the text segment onto the same track at the same spot.
        let segment = value["tracks"][2]["segments"][0].clone();
        value["tracks"][2]["segments"]
            .as_array_mut()
            .unwrap()
            .push(segment);
        let err = Document::from_json(&value.to_string()).unwrap_err();
        assert!(matches!(err, DraftError::MalformedDocument(_)));
    }

    #[test]
    fn end_to_end_text_segment_timerange() {
        let mut doc = Document::new(1920, 1080, 30);
        doc.add_track(TrackKind::Text);
        doc.add_segment(Segment::text("Hello", trange("0s", "3s").unwrap()).unwrap())
            .unwrap();
        let raw = doc.serialize();
        assert_eq!(raw.tracks[0].segments[0].target_timerange.start, 0);
        assert_eq!(raw.tracks[0].segments[0].target_timerange.duration, 3_000_000);
    }
}
