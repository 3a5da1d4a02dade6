//! Tracks: ordered, kind-homogeneous, non-overlapping segment sequences.

use uuid::Uuid;

use draftforge_core::{DraftError, Result, Ticks};

use crate::segment::Segment;

/// Kind of track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackKind {
    Video,
    Audio,
    Text,
    Sticker,
    Effect,
    Filter,
}

impl TrackKind {
    /// Kind name as the serialized document spells it.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Text => "text",
            Self::Sticker => "sticker",
            Self::Effect => "effect",
            Self::Filter => "filter",
        }
    }

    /// Inverse of [`as_str`](Self::as_str), used when loading a template.
    pub fn from_str_opt(name: &str) -> Option<Self> {
        Some(match name {
            "video" => Self::Video,
            "audio" => Self::Audio,
            "text" => Self::Text,
            "sticker" => Self::Sticker,
            "effect" => Self::Effect,
            "filter" => Self::Filter,
            _ => return None,
        })
    }

    /// Base render index for segments on tracks of this kind. The
    /// consuming editor stacks overlays above video by fixed bands.
    pub(crate) fn render_index_base(self) -> i32 {
        match self {
            Self::Video => 0,
            Self::Audio => 0,
            Self::Sticker => 14000,
            Self::Text => 15000,
            Self::Effect => 10000,
            Self::Filter => 11000,
        }
    }
}

/// A track holding segments of one kind, sorted by target start with no
/// overlaps.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub id: Uuid,
    pub name: String,
    pub kind: TrackKind,
    pub muted: bool,
    pub(crate) segments: Vec<Segment>,
}

impl Track {
    /// Create an empty track.
    pub fn new(kind: TrackKind, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            kind,
            muted: false,
            segments: Vec::new(),
        }
    }

    /// Insert a segment, keeping the start-order and no-overlap
    /// invariants.
    ///
    /// The insertion point is located by binary search on the target
    /// start tick; only the two adjacent segments need an overlap check.
    pub fn add_segment(&mut self, segment: Segment) -> Result<()> {
        if segment.kind() != self.kind {
            return Err(DraftError::KindMismatch {
                segment: segment.kind().as_str().to_string(),
                track: self.kind.as_str().to_string(),
            });
        }

        let pos = self
            .segments
            .partition_point(|s| s.target.start < segment.target.start);
        let fits_left = pos == 0 || self.segments[pos - 1].target.end() <= segment.target.start;
        let fits_right =
            pos == self.segments.len() || segment.target.end() <= self.segments[pos].target.start;
        if !fits_left || !fits_right {
            return Err(DraftError::OverlappingSegment {
                start: segment.target.start.as_micros(),
                end: segment.target.end().as_micros(),
            });
        }

        self.segments.insert(pos, segment);
        Ok(())
    }

    /// Segments in start order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// End tick of the last segment, or zero for an empty track.
    pub fn end_time(&self) -> Ticks {
        self.segments
            .last()
            .map(|s| s.target.end())
            .unwrap_or(Ticks::ZERO)
    }

    /// Find a segment by id. Returns (index, segment).
    pub fn find_segment(&self, id: Uuid) -> Option<(usize, &Segment)> {
        self.segments
            .iter()
            .enumerate()
            .find(|(_, s)| s.id == id)
    }

    /// The segment covering a tick, if any.
    pub fn segment_at(&self, time: Ticks) -> Option<&Segment> {
        let idx = self
            .segments
            .partition_point(|s| s.target.start <= time)
            .checked_sub(1)?;
        let segment = &self.segments[idx];
        segment.target.contains(time).then_some(segment)
    }
}
