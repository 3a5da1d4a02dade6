//! DraftForge Timeline - Document model and serialization
//!
//! The draft document graph: materials, tracks, segments, applied
//! effects and keyframes, plus the serializer that turns the graph into
//! the editor-compatible draft file and the loader that rebuilds it.
//!
//! The usual construction path:
//!
//! ```
//! use draftforge_core::trange;
//! use draftforge_timeline::{Document, Segment, TrackKind};
//!
//! let mut doc = Document::new(1920, 1080, 30);
//! doc.add_track(TrackKind::Text);
//! doc.add_segment(Segment::text("Hello", trange("0s", "3s")?)?)?;
//! let json = doc.to_json()?;
//! # Ok::<(), draftforge_core::DraftError>(())
//! ```

pub mod document;
pub mod material;
pub mod schema;
pub mod segment;
pub mod serialize;
pub mod template;
pub mod track;

pub use document::Document;
pub use material::{
    CropSettings, Material, MaterialId, MaterialKind, MaterialMeta, MaterialRegistry,
};
pub use segment::{
    ClipSettings, EffectApplication, FontRef, Segment, SegmentSettings, TextAlign, TextBackground,
    TextBorder, TextSettings, TextStyle,
};
pub use template::RetimePolicy;
pub use track::{Track, TrackKind};
