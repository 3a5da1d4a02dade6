//! Integration tests for draft assembly.
//!
//! Exercises cross-crate interactions between draftforge-core,
//! draftforge-catalog, and draftforge-timeline.

use draftforge_catalog::{Catalog, CatalogCategory};
use draftforge_core::{trange, DraftError, KeyframeProperty, Ticks, SEC};
use draftforge_timeline::{
    Document, MaterialKind, MaterialMeta, Segment, TrackKind,
};

// ── Helpers ────────────────────────────────────────────────────

fn video_document() -> Document {
    let mut doc = Document::new(1920, 1080, 30);
    doc.add_track(TrackKind::Video)
        .add_track(TrackKind::Audio)
        .add_track(TrackKind::Text);
    doc
}

// ── Assembly & timing ──────────────────────────────────────────

#[test]
fn hello_text_draft_serializes_expected_timerange() {
    let mut doc = Document::new(1920, 1080, 30);
    doc.add_track(TrackKind::Text);
    doc.add_segment(Segment::text("Hello", trange("0s", "3s").unwrap()).unwrap())
        .unwrap();

    let raw = doc.serialize();
    assert_eq!(raw.canvas_config.width, 1920);
    assert_eq!(raw.canvas_config.height, 1080);
    assert_eq!(raw.fps, 30.0);
    let range = raw.tracks[0].segments[0].target_timerange;
    assert_eq!(range.start, 0);
    assert_eq!(range.duration, 3_000_000);
}

#[test]
fn document_duration_is_max_across_tracks() {
    let mut doc = video_document();
    let material_id = doc.register_material(
        "media/clip.mp4",
        MaterialKind::Video,
        MaterialMeta::new(Ticks(60 * SEC), 1920, 1080),
        None,
    );
    let material = doc.materials.get(material_id).unwrap().clone();
    doc.add_segment(Segment::video(&material, trange("0s", "10s").unwrap()).unwrap())
        .unwrap();
    doc.add_segment(Segment::text("caption", trange("8s", "6s").unwrap()).unwrap())
        .unwrap();

    assert_eq!(doc.duration(), Ticks(14 * SEC));
}

#[test]
fn reused_asset_registers_once() {
    let mut doc = video_document();
    let meta = MaterialMeta::new(Ticks(60 * SEC), 1920, 1080);
    let a = doc.register_material("media/clip.mp4", MaterialKind::Video, meta, None);
    let b = doc.register_material("media\\clip.mp4", MaterialKind::Video, meta, None);
    assert_eq!(a, b);
    assert_eq!(doc.materials.len(), 1);

    let material = doc.materials.get(a).unwrap().clone();
    doc.add_segment(Segment::video(&material, trange("0s", "5s").unwrap()).unwrap())
        .unwrap();
    doc.add_segment(Segment::video(&material, trange("5s", "5s").unwrap()).unwrap())
        .unwrap();
    assert_eq!(doc.serialize().materials.videos.len(), 1);
}

#[test]
fn same_range_on_two_tracks_coexists() {
    let mut doc = Document::new(1080, 1920, 30);
    doc.add_track(TrackKind::Text);
    let first = Segment::text("a", trange("0s", "3s").unwrap()).unwrap();
    let second = Segment::text("b", trange("1s", "3s").unwrap()).unwrap();
    doc.add_segment(first).unwrap();
    let err = doc.add_segment(second.clone()).unwrap_err();
    assert!(matches!(err, DraftError::OverlappingSegment { .. }));

    doc.add_track(TrackKind::Text);
    doc.add_segment(second).unwrap();
    assert_eq!(doc.tracks()[0].len(), 1);
    assert_eq!(doc.tracks()[1].len(), 1);
}

// ── Effects through the catalog ────────────────────────────────

#[test]
fn catalog_resolution_happens_at_attach_time() {
    let catalog = Catalog::builtin();
    let mut segment = Segment::text("styled", trange("0s", "4s").unwrap()).unwrap();
    segment.attach_effect(&catalog, "typewriter").unwrap();

    let err = segment.attach_effect(&catalog, "not_in_catalog").unwrap_err();
    assert!(matches!(err, DraftError::UnknownCatalogKey(k) if k == "not_in_catalog"));
    // The failed attach left the segment untouched.
    assert_eq!(segment.effects.len(), 1);
    assert_eq!(
        segment.effect_of(CatalogCategory::TextIntro).unwrap().key,
        "typewriter"
    );
}

#[test]
fn effect_track_segment_carries_resolved_effect() {
    let catalog = Catalog::builtin();
    let mut doc = Document::new(1920, 1080, 30);
    doc.add_track(TrackKind::Effect);
    doc.add_segment(
        Segment::effect(&catalog, "old_film", trange("2s", "3s").unwrap()).unwrap(),
    )
    .unwrap();

    let raw = doc.serialize();
    assert_eq!(raw.materials.effects.len(), 1);
    assert_eq!(raw.materials.effects[0].name, "old_film");
    assert_eq!(raw.materials.effects[0].kind, "video_effect");
}

// ── Keyframes ──────────────────────────────────────────────────

#[test]
fn keyframe_interpolation_is_clamped_linear() {
    let mut segment = Segment::text("fading", trange("0s", "4s").unwrap()).unwrap();
    segment
        .add_keyframe(KeyframeProperty::Alpha, Ticks(SEC), 0.0)
        .unwrap();
    segment
        .add_keyframe(KeyframeProperty::Alpha, Ticks(3 * SEC), 1.0)
        .unwrap();

    // Before the first sample: clamped to it.
    assert_eq!(segment.keyframe_value(KeyframeProperty::Alpha, Ticks::ZERO), Some(0.0));
    // Midpoint: linear.
    let mid = segment
        .keyframe_value(KeyframeProperty::Alpha, Ticks(2 * SEC))
        .unwrap();
    assert!((mid - 0.5).abs() < 1e-9);
    // After the last sample: clamped to it.
    assert_eq!(
        segment.keyframe_value(KeyframeProperty::Alpha, Ticks(10 * SEC)),
        Some(1.0)
    );
}
