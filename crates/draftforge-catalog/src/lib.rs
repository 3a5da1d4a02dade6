//! DraftForge Catalog - Resource catalog resolver
//!
//! Maps symbolic names (animation, transition, filter, effect, font
//! names) to the engine descriptors the consuming editor expects. The
//! table is built once and immutable afterwards; resolution is strict:
//! an unknown key is a hard error, never a silent default.

pub mod builtin;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use draftforge_core::{DraftError, Result, Ticks};

/// Category of a catalog resource.
///
/// One segment may carry at most one applied effect per category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CatalogCategory {
    /// Video intro animation.
    Intro,
    /// Video outro animation.
    Outro,
    /// Looping group animation.
    GroupAnimation,
    /// Text entrance animation.
    TextIntro,
    /// Text exit animation.
    TextOutro,
    /// Text loop animation.
    TextLoop,
    /// Transition between adjacent segments.
    Transition,
    /// Color filter.
    Filter,
    /// Scene/character video effect.
    VideoEffect,
    /// Audio scene effect.
    AudioEffect,
    /// Shape mask.
    Mask,
    /// Text font.
    Font,
}

impl CatalogCategory {
    /// Category name as the serialized document spells it.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Intro => "in",
            Self::Outro => "out",
            Self::GroupAnimation => "group",
            Self::TextIntro => "text_in",
            Self::TextOutro => "text_out",
            Self::TextLoop => "text_loop",
            Self::Transition => "transition",
            Self::Filter => "filter",
            Self::VideoEffect => "video_effect",
            Self::AudioEffect => "audio_effect",
            Self::Mask => "mask",
            Self::Font => "font",
        }
    }

    /// Whether this category is a segment animation. Animations are
    /// timed relative to their segment and serialize grouped.
    pub fn is_animation(self) -> bool {
        matches!(
            self,
            Self::Intro
                | Self::Outro
                | Self::GroupAnimation
                | Self::TextIntro
                | Self::TextOutro
                | Self::TextLoop
        )
    }

    /// Inverse of [`as_str`](Self::as_str), used when loading a template.
    pub fn from_str_opt(name: &str) -> Option<Self> {
        Some(match name {
            "in" => Self::Intro,
            "out" => Self::Outro,
            "group" => Self::GroupAnimation,
            "text_in" => Self::TextIntro,
            "text_out" => Self::TextOutro,
            "text_loop" => Self::TextLoop,
            "transition" => Self::Transition,
            "filter" => Self::Filter,
            "video_effect" => Self::VideoEffect,
            "audio_effect" => Self::AudioEffect,
            "mask" => Self::Mask,
            "font" => Self::Font,
            _ => return None,
        })
    }
}

/// Descriptor for one numeric effect parameter.
///
/// Values are on the 0-100 scale the consuming editor uses for effect
/// sliders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamShape {
    pub name: String,
    pub default: f64,
    pub min: f64,
    pub max: f64,
}

impl ParamShape {
    pub fn new(name: impl Into<String>, default: f64, min: f64, max: f64) -> Self {
        Self {
            name: name.into(),
            default,
            min,
            max,
        }
    }

    /// Clamp a requested value into this parameter's range.
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }
}

/// A resolved catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Symbolic key the caller resolves by.
    pub key: String,
    /// Engine-side effect id.
    pub effect_id: String,
    /// Resource id used in the serialized materials section.
    pub resource_id: String,
    /// Category this entry belongs to.
    pub category: CatalogCategory,
    /// Default applied duration, where the category has one.
    pub default_duration: Option<Ticks>,
    /// Parameter shapes, in engine order.
    pub params: Vec<ParamShape>,
}

impl CatalogEntry {
    /// Look up a parameter shape by name.
    pub fn param(&self, name: &str) -> Option<&ParamShape> {
        self.params.iter().find(|p| p.name == name)
    }
}

/// Immutable symbolic-key to descriptor table.
///
/// Built once via [`CatalogBuilder`] (or [`Catalog::builtin`]) and only
/// read afterwards.
#[derive(Debug, Clone)]
pub struct Catalog {
    entries: HashMap<String, CatalogEntry>,
}

impl Catalog {
    /// Start building a catalog.
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder {
            entries: HashMap::new(),
        }
    }

    /// The built-in resource table.
    pub fn builtin() -> Self {
        builtin::builtin_catalog()
    }

    /// Resolve a symbolic key to its descriptor.
    ///
    /// Strict policy: an unknown key fails with
    /// [`DraftError::UnknownCatalogKey`].
    pub fn resolve(&self, key: &str) -> Result<&CatalogEntry> {
        self.entries
            .get(key)
            .ok_or_else(|| DraftError::UnknownCatalogKey(key.to_string()))
    }

    /// Whether a key is present.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries of one category.
    pub fn entries_of(&self, category: CatalogCategory) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.values().filter(move |e| e.category == category)
    }
}

/// Builder consumed into an immutable [`Catalog`].
pub struct CatalogBuilder {
    entries: HashMap<String, CatalogEntry>,
}

impl CatalogBuilder {
    /// Add an entry, keyed by its `key` field. Last insert wins.
    pub fn insert(mut self, entry: CatalogEntry) -> Self {
        self.entries.insert(entry.key.clone(), entry);
        self
    }

    /// Finish building.
    pub fn build(self) -> Catalog {
        Catalog {
            entries: self.entries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_known_key() {
        let catalog = Catalog::builtin();
        let entry = catalog.resolve("fade_in").unwrap();
        assert_eq!(entry.category, CatalogCategory::Intro);
        assert!(entry.default_duration.is_some());
    }

    #[test]
    fn resolve_unknown_key_is_strict() {
        let catalog = Catalog::builtin();
        let err = catalog.resolve("no_such_animation").unwrap_err();
        assert!(matches!(err, DraftError::UnknownCatalogKey(k) if k == "no_such_animation"));
    }

    #[test]
    fn builder_last_insert_wins() {
        let mk = |effect_id: &str| CatalogEntry {
            key: "dup".into(),
            effect_id: effect_id.into(),
            resource_id: "r".into(),
            category: CatalogCategory::Filter,
            default_duration: None,
            params: vec![],
        };
        let catalog = Catalog::builder().insert(mk("a")).insert(mk("b")).build();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.resolve("dup").unwrap().effect_id, "b");
    }

    #[test]
    fn param_clamp() {
        let shape = ParamShape::new("intensity", 80.0, 0.0, 100.0);
        assert_eq!(shape.clamp(150.0), 100.0);
        assert_eq!(shape.clamp(-5.0), 0.0);
        assert_eq!(shape.clamp(42.0), 42.0);
    }

    #[test]
    fn animation_categories() {
        assert!(CatalogCategory::Intro.is_animation());
        assert!(CatalogCategory::TextLoop.is_animation());
        assert!(!CatalogCategory::Transition.is_animation());
        assert!(!CatalogCategory::Font.is_animation());
    }

    #[test]
    fn builtin_covers_every_category() {
        let catalog = Catalog::builtin();
        for category in [
            CatalogCategory::Intro,
            CatalogCategory::Outro,
            CatalogCategory::Transition,
            CatalogCategory::Filter,
            CatalogCategory::VideoEffect,
            CatalogCategory::AudioEffect,
            CatalogCategory::TextIntro,
            CatalogCategory::Font,
            CatalogCategory::Mask,
        ] {
            assert!(
                catalog.entries_of(category).next().is_some(),
                "no builtin entry for {category:?}"
            );
        }
    }
}
