//! The draft document: canvas, tracks, materials, metadata.

use std::time::{SystemTime, UNIX_EPOCH};

use uuid::Uuid;

use draftforge_core::{DraftError, Result, Ticks};

use crate::material::{CropSettings, MaterialId, MaterialKind, MaterialMeta, MaterialRegistry};
use crate::segment::Segment;
use crate::track::{Track, TrackKind};

fn now_micros() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_micros() as i64)
        .unwrap_or(0)
}

/// An in-memory draft document.
///
/// Built incrementally by a single session: construct, add tracks,
/// register materials, build segments, serialize. Or the template path:
/// load an existing document, mutate, re-serialize.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: Uuid,
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    /// Unix microseconds.
    pub create_time: i64,
    /// Unix microseconds, bumped on every mutation.
    pub update_time: i64,
    pub(crate) tracks: Vec<Track>,
    pub materials: MaterialRegistry,
}

impl Document {
    /// Create an empty document with the given canvas and frame rate.
    pub fn new(width: u32, height: u32, fps: u32) -> Self {
        let now = now_micros();
        Self {
            id: Uuid::new_v4(),
            width,
            height,
            fps,
            create_time: now,
            update_time: now,
            tracks: Vec::new(),
            materials: MaterialRegistry::new(),
        }
    }

    fn touch(&mut self) {
        self.update_time = now_micros();
    }

    /// Append a track, auto-named `<kind>_<n>`.
    ///
    /// Returns `&mut Self` so construction chains:
    /// `doc.add_track(TrackKind::Video).add_track(TrackKind::Text)`.
    pub fn add_track(&mut self, kind: TrackKind) -> &mut Self {
        let n = self.tracks.iter().filter(|t| t.kind == kind).count() + 1;
        let name = format!("{}_{}", kind.as_str(), n);
        self.add_named_track(kind, name)
    }

    /// Append a track with an explicit name.
    pub fn add_named_track(&mut self, kind: TrackKind, name: impl Into<String>) -> &mut Self {
        self.tracks.push(Track::new(kind, name));
        self.touch();
        self
    }

    /// Tracks in stacking order.
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Find a track by id.
    pub fn track(&self, id: Uuid) -> Option<&Track> {
        self.tracks.iter().find(|t| t.id == id)
    }

    /// The most recently added track of a kind.
    pub fn last_track_of(&self, kind: TrackKind) -> Option<&Track> {
        self.tracks.iter().rev().find(|t| t.kind == kind)
    }

    /// Add a segment to the most recently added track of its kind.
    pub fn add_segment(&mut self, segment: Segment) -> Result<&mut Self> {
        let kind = segment.kind();
        let track = self
            .tracks
            .iter_mut()
            .rev()
            .find(|t| t.kind == kind)
            .ok_or_else(|| DraftError::KindMismatch {
                segment: kind.as_str().to_string(),
                track: "(no track of that kind)".to_string(),
            })?;
        track.add_segment(segment)?;
        self.touch();
        Ok(self)
    }

    /// Add a segment to an explicit track.
    pub fn add_segment_to(&mut self, track_id: Uuid, segment: Segment) -> Result<&mut Self> {
        let track = self
            .tracks
            .iter_mut()
            .find(|t| t.id == track_id)
            .ok_or_else(|| DraftError::MalformedDocument(format!("no track {track_id}")))?;
        track.add_segment(segment)?;
        self.touch();
        Ok(self)
    }

    /// Register a material, deduplicating on the normalized path.
    pub fn register_material(
        &mut self,
        path: &str,
        kind: MaterialKind,
        meta: MaterialMeta,
        crop: Option<CropSettings>,
    ) -> MaterialId {
        let id = self.materials.register(path, kind, meta, crop);
        self.touch();
        id
    }

    /// Total duration: the latest segment end across all tracks.
    pub fn duration(&self) -> Ticks {
        self.tracks
            .iter()
            .map(|t| t.end_time())
            .max()
            .unwrap_or(Ticks::ZERO)
    }

    /// Find the track holding a segment. Returns (track, index).
    pub fn locate_segment(&self, segment_id: Uuid) -> Option<(&Track, usize)> {
        self.tracks.iter().find_map(|t| {
            t.find_segment(segment_id)
                .map(|(idx, _)| (t, idx))
        })
    }

    pub(crate) fn locate_segment_mut(&mut self, segment_id: Uuid) -> Option<(&mut Track, usize)> {
        self.tracks.iter_mut().find_map(|t| {
            let idx = t.segments.iter().position(|s| s.id == segment_id)?;
            Some((t, idx))
        })
    }
}
