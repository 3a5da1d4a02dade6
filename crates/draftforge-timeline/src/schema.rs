//! Typed schema for the serialized draft document.
//!
//! One struct per schema node, so every field the consuming editor
//! requires is present by construction; nothing is emitted ad hoc. The
//! numeric conventions are part of the contract: all timing fields are
//! integer microseconds, colors are 0.0-1.0 floats, flags are booleans.

use serde::{Deserialize, Serialize};

/// Schema version this crate writes and accepts.
pub const SCHEMA_VERSION: u32 = 360_000;

/// Editor version string stamped into new documents.
pub const APP_VERSION: &str = "110.0.0";

/// Root of the serialized document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawDocument {
    pub canvas_config: RawCanvasConfig,
    /// 0 = SDR working space.
    pub color_space: i32,
    pub create_time: i64,
    pub duration: i64,
    pub fps: f64,
    pub free_render_index_mode_on: bool,
    /// Uppercase hyphenated UUID.
    pub id: String,
    pub materials: RawMaterials,
    pub new_version: String,
    pub platform: RawPlatform,
    pub tracks: Vec<RawTrack>,
    pub update_time: i64,
    pub version: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawCanvasConfig {
    pub height: u32,
    /// Aspect preset name; "original" = free canvas.
    pub ratio: String,
    pub width: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawPlatform {
    pub app_id: i64,
    pub app_source: String,
    pub app_version: String,
    pub os: String,
}

impl Default for RawPlatform {
    fn default() -> Self {
        Self {
            app_id: 3704,
            app_source: "cc".to_string(),
            app_version: APP_VERSION.to_string(),
            os: "windows".to_string(),
        }
    }
}

/// Materials section, partitioned by kind. Every id referenced from any
/// track resolves to exactly one entry here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawMaterials {
    pub audio_fades: Vec<RawAudioFade>,
    pub audios: Vec<RawAudioMaterial>,
    pub effects: Vec<RawEffect>,
    pub material_animations: Vec<RawAnimationGroup>,
    pub speeds: Vec<RawSpeed>,
    pub stickers: Vec<RawSticker>,
    pub texts: Vec<RawTextMaterial>,
    pub transitions: Vec<RawTransition>,
    pub videos: Vec<RawVideoMaterial>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawVideoMaterial {
    pub crop: RawCrop,
    /// "free" since the crop corners are explicit.
    pub crop_ratio: String,
    pub crop_scale: f64,
    pub duration: i64,
    pub height: u32,
    pub id: String,
    pub material_name: String,
    pub path: String,
    /// "video" or "photo".
    #[serde(rename = "type")]
    pub kind: String,
    pub width: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawCrop {
    pub lower_left_x: f64,
    pub lower_left_y: f64,
    pub lower_right_x: f64,
    pub lower_right_y: f64,
    pub upper_left_x: f64,
    pub upper_left_y: f64,
    pub upper_right_x: f64,
    pub upper_right_y: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawAudioMaterial {
    pub duration: i64,
    pub id: String,
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawTextMaterial {
    pub alignment: i32,
    pub background_alpha: f64,
    pub background_color: [f64; 3],
    pub bold: bool,
    pub border_alpha: f64,
    pub border_color: [f64; 3],
    pub border_width: f64,
    pub content: String,
    pub font_resource_id: String,
    pub font_title: String,
    pub has_background: bool,
    pub has_border: bool,
    pub id: String,
    pub italic: bool,
    pub letter_spacing: f64,
    pub line_spacing: f64,
    pub text_alpha: f64,
    pub text_color: [f64; 3],
    pub text_size: f64,
    #[serde(rename = "type")]
    pub kind: String,
    pub underline: bool,
    pub vertical: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSticker {
    pub id: String,
    pub resource_id: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawEffect {
    pub adjust_params: Vec<RawAdjustParam>,
    pub apply_target_type: i32,
    pub effect_id: String,
    pub id: String,
    pub name: String,
    pub resource_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    /// Filter intensity on the editor's 0.0-1.0 scale; 1.0 elsewhere.
    pub value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawAdjustParam {
    pub default_value: f64,
    pub name: String,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawAnimationGroup {
    pub animations: Vec<RawAnimation>,
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawAnimation {
    pub duration: i64,
    /// Engine-side animation effect id.
    pub id: String,
    pub name: String,
    pub resource_id: String,
    pub start: i64,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSpeed {
    pub id: String,
    /// 0 = constant speed.
    pub mode: i32,
    pub speed: f64,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawAudioFade {
    pub fade_in_duration: i64,
    pub fade_out_duration: i64,
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawTransition {
    pub duration: i64,
    pub effect_id: String,
    pub id: String,
    pub is_overlap: bool,
    pub name: String,
    pub resource_id: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawTrack {
    /// 1 = muted.
    pub attribute: i32,
    pub flag: i32,
    pub id: String,
    pub name: String,
    pub segments: Vec<RawSegment>,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSegment {
    pub clip: Option<RawClip>,
    pub common_keyframes: Vec<RawKeyframeList>,
    pub extra_material_refs: Vec<String>,
    pub id: String,
    /// Empty string when the segment carries no primary material.
    pub material_id: String,
    pub render_index: i32,
    pub source_timerange: Option<RawTimerange>,
    pub speed: f64,
    pub target_timerange: RawTimerange,
    pub visible: bool,
    pub volume: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RawTimerange {
    pub duration: i64,
    pub start: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawClip {
    pub alpha: f64,
    pub flip: RawFlip,
    pub rotation: f64,
    pub scale: RawXY,
    pub transform: RawXY,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RawFlip {
    pub horizontal: bool,
    pub vertical: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RawXY {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawKeyframeList {
    pub id: String,
    pub keyframe_list: Vec<RawKeyframe>,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawKeyframe {
    pub id: String,
    pub time_offset: i64,
    pub values: Vec<f64>,
}
