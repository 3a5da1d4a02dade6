//! Template-mode timing edits.
//!
//! Retiming one segment on a loaded document recomputes sibling timing
//! on the same track so the "no gap, no overlap" invariant survives the
//! edit. Nothing propagates across tracks; cross-track sync is the
//! caller's business.

use uuid::Uuid;

use draftforge_core::{DraftError, Result, Ticks};

use crate::document::Document;
use crate::segment::Segment;

/// How sibling segments react to a duration change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetimePolicy {
    /// The immediate right neighbor absorbs the change: its start moves
    /// with the edited segment's end, its own end stays fixed.
    Shrink,
    /// Every following segment shifts by the change, durations intact.
    Extend,
}

impl Document {
    /// Change one segment's duration under a policy.
    ///
    /// Validates the whole edit before mutating anything; on error the
    /// document is untouched.
    pub fn retime_segment(
        &mut self,
        segment_id: Uuid,
        new_duration: Ticks,
        policy: RetimePolicy,
    ) -> Result<()> {
        if new_duration.as_micros() <= 0 {
            return Err(DraftError::InvalidTemplateEdit(format!(
                "non-positive duration {}",
                new_duration.as_micros()
            )));
        }
        let (track, idx) = self.locate_segment_mut(segment_id).ok_or_else(|| {
            DraftError::InvalidTemplateEdit(format!("no segment {segment_id} in document"))
        })?;
        let delta = new_duration.checked_sub(track.segments[idx].target.duration)?;
        if delta.is_zero() {
            return Ok(());
        }

        match policy {
            RetimePolicy::Shrink => {
                if idx + 1 >= track.segments.len() {
                    return Err(DraftError::NoNeighborToAbsorb);
                }
                let neighbor = &track.segments[idx + 1];
                let nb_start = neighbor.target.start.checked_add(delta)?;
                let nb_duration = neighbor.target.duration.checked_sub(delta)?;
                if nb_duration.as_micros() <= 0 || nb_start.is_negative() {
                    return Err(DraftError::InvalidTemplateEdit(format!(
                        "neighbor would get start {} and duration {}",
                        nb_start.as_micros(),
                        nb_duration.as_micros()
                    )));
                }

                track.segments[idx].target.duration = new_duration;
                refresh_speed(&mut track.segments[idx]);
                let neighbor = &mut track.segments[idx + 1];
                neighbor.target.start = nb_start;
                neighbor.target.duration = nb_duration;
                refresh_speed(neighbor);
            }
            RetimePolicy::Extend => {
                // Dry run over the tail first.
                track.segments[idx].target.start.checked_add(new_duration)?;
                for follower in &track.segments[idx + 1..] {
                    let start = follower.target.start.checked_add(delta)?;
                    if start.is_negative() {
                        return Err(DraftError::InvalidTemplateEdit(format!(
                            "segment {} would start at {}",
                            follower.id,
                            start.as_micros()
                        )));
                    }
                    start.checked_add(follower.target.duration)?;
                }

                track.segments[idx].target.duration = new_duration;
                refresh_speed(&mut track.segments[idx]);
                for follower in &mut track.segments[idx + 1..] {
                    follower.target.start = follower.target.start + delta;
                }
            }
        }

        self.update_time = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_micros() as i64)
            .unwrap_or(self.update_time);
        Ok(())
    }
}

/// Keep `speed` consistent when a material-backed segment's target
/// duration changes; the source window stays fixed.
fn refresh_speed(segment: &mut Segment) {
    if segment.material.is_some() {
        if let Some(source) = segment.source {
            segment.speed =
                source.duration.as_micros() as f64 / segment.target.duration.as_micros() as f64;
        }
    }
}
