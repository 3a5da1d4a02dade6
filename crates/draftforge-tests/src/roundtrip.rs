//! Integration tests for serialization and the draft folder.

use draftforge_catalog::Catalog;
use draftforge_core::{format_duration, parse_duration, trange, Ticks, SEC};
use draftforge_export::{DraftFolder, DRAFT_CONTENT_FILE};
use draftforge_timeline::{
    Document, MaterialKind, MaterialMeta, Segment, TextStyle, TrackKind,
};

fn full_document() -> Document {
    let catalog = Catalog::builtin();
    let mut doc = Document::new(1920, 1080, 30);
    doc.add_track(TrackKind::Video)
        .add_track(TrackKind::Audio)
        .add_track(TrackKind::Text)
        .add_track(TrackKind::Sticker);

    let video_id = doc.register_material(
        "media/clip.mp4",
        MaterialKind::Video,
        MaterialMeta::new(Ticks(60 * SEC), 3840, 2160),
        None,
    );
    let audio_id = doc.register_material(
        "media/song.mp3",
        MaterialKind::Audio,
        MaterialMeta::audio(Ticks(120 * SEC)),
        None,
    );

    let video = doc.materials.get(video_id).unwrap().clone();
    let mut clip = Segment::video_trimmed(
        &video,
        trange("0s", "5s").unwrap(),
        Some(trange("10s", "10s").unwrap()),
    )
    .unwrap();
    clip.attach_effect(&catalog, "zoom_in").unwrap();
    clip.attach_effect(&catalog, "wipe_left").unwrap();
    doc.add_segment(clip).unwrap();

    let audio = doc.materials.get(audio_id).unwrap().clone();
    let mut music = Segment::audio(&audio, trange("0s", "8s").unwrap(), 0.4).unwrap();
    music.set_fade(Ticks(SEC), Ticks(2 * SEC)).unwrap();
    doc.add_segment(music).unwrap();

    let mut title = Segment::styled_text(
        "Episode One",
        trange("0.5s", "2.5s").unwrap(),
        TextStyle {
            size: 12.0,
            bold: true,
            color: [1.0, 0.8, 0.0],
            ..TextStyle::default()
        },
    )
    .unwrap();
    title.set_font(&catalog, "handwriting").unwrap();
    doc.add_segment(title).unwrap();

    doc.add_segment(Segment::sticker("7112233445566778899", trange("1s", "2s").unwrap()).unwrap())
        .unwrap();
    doc
}

// ── Duration text ──────────────────────────────────────────────

#[test]
fn duration_parse_format_pairs() {
    for (text, micros) in [
        ("4.2s", 4_200_000),
        ("0.5s", 500_000),
        ("1m30s", 90_000_000),
        ("1h", 3_600_000_000),
    ] {
        assert_eq!(parse_duration(text).unwrap(), Ticks(micros), "{text}");
    }
    assert_eq!(format_duration(Ticks(4_200_000)), "4.2s");
    assert_eq!(
        parse_duration(&format_duration(Ticks(1_234_567))).unwrap(),
        Ticks(1_234_567)
    );
}

// ── JSON shape ─────────────────────────────────────────────────

#[test]
fn emitted_json_matches_consumer_conventions() {
    let doc = full_document();
    let value: serde_json::Value = serde_json::from_str(&doc.to_json().unwrap()).unwrap();

    assert_eq!(value["version"], 360_000);
    assert_eq!(value["new_version"], "110.0.0");
    assert_eq!(value["fps"], 30.0);
    assert_eq!(value["canvas_config"]["ratio"], "original");

    // Ids are uppercase hyphenated UUIDs.
    let id = value["id"].as_str().unwrap();
    assert_eq!(id.len(), 36);
    assert!(id.chars().all(|c| !c.is_ascii_lowercase()));
    assert!(uuid::Uuid::parse_str(id).is_ok());

    // Timing fields are integer microseconds.
    let segment = &value["tracks"][0]["segments"][0];
    assert_eq!(segment["target_timerange"]["duration"], 5_000_000);
    assert_eq!(segment["source_timerange"]["start"], 10_000_000);
    assert_eq!(segment["speed"], 2.0);

    // Kind discriminators serialize as "type".
    assert_eq!(value["tracks"][0]["type"], "video");
    assert_eq!(value["materials"]["videos"][0]["type"], "video");
    assert_eq!(value["materials"]["audios"][0]["type"], "extract_music");

    // Colors are 0.0-1.0 floats.
    let text = &value["materials"]["texts"][0];
    assert_eq!(text["text_color"][1], 0.8);
}

#[test]
fn every_segment_reference_resolves_in_emitted_json() {
    let doc = full_document();
    let value: serde_json::Value = serde_json::from_str(&doc.to_json().unwrap()).unwrap();

    let mut known_ids = Vec::new();
    for (_, section) in value["materials"].as_object().unwrap() {
        for entry in section.as_array().unwrap() {
            known_ids.push(entry["id"].as_str().unwrap().to_string());
        }
    }

    for track in value["tracks"].as_array().unwrap() {
        for segment in track["segments"].as_array().unwrap() {
            let material_id = segment["material_id"].as_str().unwrap();
            if !material_id.is_empty() {
                assert!(known_ids.iter().any(|k| k == material_id));
            }
            for reference in segment["extra_material_refs"].as_array().unwrap() {
                let reference = reference.as_str().unwrap();
                assert!(known_ids.iter().any(|k| k == reference), "dangling {reference}");
            }
        }
    }
}

// ── Round trips ────────────────────────────────────────────────

#[test]
fn json_roundtrip_is_lossless() {
    let doc = full_document();
    let loaded = Document::from_json(&doc.to_json().unwrap()).unwrap();
    assert_eq!(loaded, doc);

    // And a second pass over the loaded document stays stable.
    let again = Document::from_json(&loaded.to_json().unwrap()).unwrap();
    assert_eq!(again, loaded);
}

#[test]
fn draft_folder_roundtrip() {
    crate::init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let folder = DraftFolder::new(dir.path());
    let doc = full_document();

    folder.save(&doc, "episode_1").unwrap();
    assert!(dir.path().join("episode_1").join(DRAFT_CONTENT_FILE).is_file());
    assert_eq!(folder.load("episode_1").unwrap(), doc);
}
