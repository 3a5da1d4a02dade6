//! Source-asset materials and the deduplicating registry.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use draftforge_core::{DraftError, Result, Ticks};

/// Stable identifier for a registered material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MaterialId(Uuid);

impl MaterialId {
    pub(crate) fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(self) -> Uuid {
        self.0
    }

    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for MaterialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Kind of source asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MaterialKind {
    Video,
    Photo,
    Audio,
}

impl MaterialKind {
    /// Kind name as the serialized document spells it.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Photo => "photo",
            Self::Audio => "extract_music",
        }
    }

    /// Whether this material renders on a video track.
    pub fn is_visual(self) -> bool {
        matches!(self, Self::Video | Self::Photo)
    }
}

/// Crop region as four corner coordinate pairs in 0.0-1.0 UV space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropSettings {
    pub upper_left_x: f64,
    pub upper_left_y: f64,
    pub upper_right_x: f64,
    pub upper_right_y: f64,
    pub lower_left_x: f64,
    pub lower_left_y: f64,
    pub lower_right_x: f64,
    pub lower_right_y: f64,
}

impl Default for CropSettings {
    /// Full frame.
    fn default() -> Self {
        Self {
            upper_left_x: 0.0,
            upper_left_y: 0.0,
            upper_right_x: 1.0,
            upper_right_y: 0.0,
            lower_left_x: 0.0,
            lower_left_y: 1.0,
            lower_right_x: 1.0,
            lower_right_y: 1.0,
        }
    }
}

/// Caller-supplied asset metadata.
///
/// The registry never probes files itself; whoever registered the asset
/// already knows its duration and dimensions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialMeta {
    pub duration: Ticks,
    pub width: u32,
    pub height: u32,
}

impl MaterialMeta {
    pub fn new(duration: Ticks, width: u32, height: u32) -> Self {
        Self {
            duration,
            width,
            height,
        }
    }

    /// Audio assets have no dimensions.
    pub fn audio(duration: Ticks) -> Self {
        Self {
            duration,
            width: 0,
            height: 0,
        }
    }
}

/// An immutable descriptor of a source asset.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub id: MaterialId,
    pub kind: MaterialKind,
    pub path: String,
    /// Display name, derived from the file stem.
    pub name: String,
    pub duration: Ticks,
    pub width: u32,
    pub height: u32,
    pub crop: Option<CropSettings>,
}

/// Registry of materials with path-based deduplication.
///
/// Registering the same normalized path twice returns the existing id
/// instead of creating a duplicate entry, so a reused asset serializes
/// once no matter how many segments reference it.
#[derive(Debug, Clone, Default)]
pub struct MaterialRegistry {
    materials: Vec<Material>,
    by_path: HashMap<String, MaterialId>,
    by_id: HashMap<MaterialId, usize>,
}

// Equality is id-keyed content. Registration order carries no meaning
// in the document, and a reloaded draft groups materials by kind.
impl PartialEq for MaterialRegistry {
    fn eq(&self, other: &Self) -> bool {
        self.materials.len() == other.materials.len()
            && self
                .materials
                .iter()
                .all(|m| other.get(m.id).map_or(false, |o| o == m))
    }
}

impl MaterialRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an asset, or return the id it already has.
    ///
    /// On a dedup hit the previously supplied metadata wins; materials
    /// are immutable once created.
    pub fn register(
        &mut self,
        path: &str,
        kind: MaterialKind,
        meta: MaterialMeta,
        crop: Option<CropSettings>,
    ) -> MaterialId {
        let normalized = normalize_path(path);
        if let Some(&id) = self.by_path.get(&normalized) {
            return id;
        }
        let id = MaterialId::generate();
        let material = Material {
            id,
            kind,
            name: file_stem(&normalized),
            path: normalized.clone(),
            duration: meta.duration,
            width: meta.width,
            height: meta.height,
            crop,
        };
        self.by_path.insert(normalized, id);
        self.by_id.insert(id, self.materials.len());
        self.materials.push(material);
        id
    }

    /// Look up a material by id.
    pub fn get(&self, id: MaterialId) -> Result<&Material> {
        self.by_id
            .get(&id)
            .map(|&idx| &self.materials[idx])
            .ok_or_else(|| DraftError::UnknownMaterial(id.to_string()))
    }

    pub fn contains(&self, id: MaterialId) -> bool {
        self.by_id.contains_key(&id)
    }

    /// All materials, in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Material> {
        self.materials.iter()
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    /// Insert a material loaded from an existing document, keeping its id.
    ///
    /// Fails on a colliding id, which a well-formed document never has.
    pub(crate) fn insert_loaded(&mut self, material: Material) -> Result<()> {
        if self.by_id.contains_key(&material.id) {
            return Err(DraftError::MalformedDocument(format!(
                "duplicate material id {}",
                material.id
            )));
        }
        self.by_path.insert(material.path.clone(), material.id);
        self.by_id.insert(material.id, self.materials.len());
        self.materials.push(material);
        Ok(())
    }
}

/// Normalize a path for deduplication: forward slashes, no `.` segments,
/// no doubled separators. `..` is left alone since the registry never
/// touches the filesystem.
fn normalize_path(path: &str) -> String {
    let forward = path.trim().replace('\\', "/");
    let mut parts: Vec<&str> = Vec::new();
    for (i, part) in forward.split('/').enumerate() {
        if part == "." || (part.is_empty() && i > 0) {
            continue;
        }
        parts.push(part);
    }
    parts.join("/")
}

fn file_stem(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
