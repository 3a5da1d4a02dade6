//! Built-in resource table.
//!
//! A representative slice of the editor's resource library, enough to
//! resolve every category end to end. The full tables ship with the
//! editor itself and can be loaded into a custom [`Catalog`] by callers
//! that mirror them.

use draftforge_core::{Ticks, SEC};

use crate::{Catalog, CatalogCategory, CatalogEntry, ParamShape};

fn entry(
    key: &str,
    effect_id: &str,
    resource_id: &str,
    category: CatalogCategory,
    default_duration: Option<Ticks>,
    params: Vec<ParamShape>,
) -> CatalogEntry {
    CatalogEntry {
        key: key.into(),
        effect_id: effect_id.into(),
        resource_id: resource_id.into(),
        category,
        default_duration,
        params,
    }
}

/// Build the built-in catalog.
pub fn builtin_catalog() -> Catalog {
    use CatalogCategory::*;
    let half_sec = Some(Ticks(SEC / 2));
    let one_sec = Some(Ticks(SEC));

    Catalog::builder()
        // Intro / outro animations
        .insert(entry("fade_in", "624705", "6724239388189921806", Intro, half_sec, vec![]))
        .insert(entry("zoom_in", "624709", "6724239388189921810", Intro, half_sec, vec![]))
        .insert(entry("slide_up", "624713", "6724239388189921814", Intro, half_sec, vec![]))
        .insert(entry("fade_out", "624706", "6724239388189921807", Outro, half_sec, vec![]))
        .insert(entry("zoom_out", "624710", "6724239388189921811", Outro, half_sec, vec![]))
        .insert(entry("spin", "624801", "6724239388189921900", GroupAnimation, one_sec, vec![]))
        // Transitions
        .insert(entry("dissolve", "321493", "6724175631093878285", Transition, one_sec, vec![]))
        .insert(entry("wipe_left", "321502", "6724175631093878294", Transition, one_sec, vec![]))
        .insert(entry("blur_cross", "321511", "6724175631093878303", Transition, one_sec, vec![]))
        // Filters
        .insert(entry(
            "vivid",
            "443195",
            "6838634573234808930",
            Filter,
            None,
            vec![ParamShape::new("intensity", 100.0, 0.0, 100.0)],
        ))
        .insert(entry(
            "retro",
            "443203",
            "6838634573234808938",
            Filter,
            None,
            vec![ParamShape::new("intensity", 80.0, 0.0, 100.0)],
        ))
        // Video effects
        .insert(entry(
            "glitch",
            "1109849",
            "7012933361959030286",
            VideoEffect,
            None,
            vec![
                ParamShape::new("speed", 50.0, 0.0, 100.0),
                ParamShape::new("strength", 65.0, 0.0, 100.0),
            ],
        ))
        .insert(entry(
            "old_film",
            "1109861",
            "7012933361959030298",
            VideoEffect,
            None,
            vec![ParamShape::new("grain", 40.0, 0.0, 100.0)],
        ))
        // Audio effects
        .insert(entry("echo", "7982", "6747312919194731022", AudioEffect, None, vec![]))
        .insert(entry("low_voice", "7987", "6747312919194731027", AudioEffect, None, vec![]))
        // Text animations
        .insert(entry("typewriter", "934215", "7022191462783094302", TextIntro, one_sec, vec![]))
        .insert(entry("text_fade_out", "934301", "7022191462783094388", TextOutro, half_sec, vec![]))
        .insert(entry("text_wave", "934420", "7022191462783094507", TextLoop, one_sec, vec![]))
        // Fonts
        .insert(entry("sans_bold", "0", "7244518590332112440", Font, None, vec![]))
        .insert(entry("handwriting", "0", "7244518590332112501", Font, None, vec![]))
        // Masks
        .insert(entry(
            "circle_mask",
            "1206",
            "6829361858082456072",
            Mask,
            None,
            vec![
                ParamShape::new("feather", 0.0, 0.0, 100.0),
                ParamShape::new("roundness", 0.0, 0.0, 100.0),
            ],
        ))
        .build()
}
