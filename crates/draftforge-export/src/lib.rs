//! DraftForge Export - Export capability and draft folder management
//!
//! Two concerns live here: the injected [`Exporter`] interface a desktop
//! automation layer implements to render a finished draft, and
//! [`DraftFolder`], the on-disk layout the consuming editor scans for
//! drafts (one directory per draft, holding `draft_content.json`).

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use draftforge_core::{DraftError, Result};
use draftforge_timeline::Document;

// ── Export settings ─────────────────────────────────────────────

/// Output resolution preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportResolution {
    R480p,
    R720p,
    R1080p,
    R2k,
    R4k,
    R8k,
}

impl ExportResolution {
    /// Landscape pixel dimensions of the preset.
    pub fn dimensions(self) -> (u32, u32) {
        match self {
            Self::R480p => (854, 480),
            Self::R720p => (1280, 720),
            Self::R1080p => (1920, 1080),
            Self::R2k => (2560, 1440),
            Self::R4k => (3840, 2160),
            Self::R8k => (7680, 4320),
        }
    }
}

/// Output frame rate preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportFramerate {
    Fps24,
    Fps25,
    Fps30,
    Fps50,
    Fps60,
}

impl ExportFramerate {
    pub fn as_fps(self) -> u32 {
        match self {
            Self::Fps24 => 24,
            Self::Fps25 => 25,
            Self::Fps30 => 30,
            Self::Fps50 => 50,
            Self::Fps60 => 60,
        }
    }
}

/// An export request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportSettings {
    pub resolution: ExportResolution,
    pub framerate: ExportFramerate,
    pub output_path: PathBuf,
}

impl ExportSettings {
    pub fn new(
        resolution: ExportResolution,
        framerate: ExportFramerate,
        output_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            resolution,
            framerate,
            output_path: output_path.into(),
        }
    }
}

/// Renders a finished draft to a video file.
///
/// The document model never drives the editor itself; automation layers
/// implement this and get handed the document plus settings.
pub trait Exporter {
    fn export(&mut self, document: &Document, settings: &ExportSettings) -> Result<()>;
}

/// Exporter that records requests and renders nothing. For tests and
/// dry runs.
#[derive(Debug, Default)]
pub struct NullExporter {
    pub requests: Vec<ExportSettings>,
}

impl Exporter for NullExporter {
    fn export(&mut self, document: &Document, settings: &ExportSettings) -> Result<()> {
        info!(
            draft = %document.id,
            output = %settings.output_path.display(),
            "Export requested (null exporter)"
        );
        self.requests.push(settings.clone());
        Ok(())
    }
}

// ── Draft folder ────────────────────────────────────────────────

/// File name the consuming editor expects inside each draft directory.
pub const DRAFT_CONTENT_FILE: &str = "draft_content.json";

/// A directory of drafts, one subdirectory per draft.
#[derive(Debug, Clone)]
pub struct DraftFolder {
    root: PathBuf,
}

impl DraftFolder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn draft_file(&self, name: &str) -> PathBuf {
        self.root.join(name).join(DRAFT_CONTENT_FILE)
    }

    /// Names of the drafts currently in the folder, sorted.
    ///
    /// A subdirectory without a `draft_content.json` is not a draft and
    /// is skipped.
    pub fn list_drafts(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            if entry.path().join(DRAFT_CONTENT_FILE).is_file() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Save a document under a draft name, creating the directory.
    pub fn save(&self, document: &Document, name: &str) -> Result<()> {
        let dir = self.root.join(name);
        fs::create_dir_all(&dir)?;
        document.dump(&self.draft_file(name))?;
        info!(draft = name, root = %self.root.display(), "Draft saved");
        Ok(())
    }

    /// Load a draft by name.
    pub fn load(&self, name: &str) -> Result<Document> {
        let path = self.draft_file(name);
        if !path.is_file() {
            return Err(DraftError::MalformedDocument(format!(
                "no draft named {name:?} under {}",
                self.root.display()
            )));
        }
        Document::load(&path)
    }

    /// Copy a draft under a new name with a fresh document id.
    ///
    /// The template path: duplicate, then mutate the copy.
    pub fn duplicate_as_template(&self, template: &str, new_name: &str) -> Result<Document> {
        let mut document = self.load(template)?;
        document.id = Uuid::new_v4();
        self.save(&document, new_name)?;
        info!(template, copy = new_name, "Draft duplicated");
        Ok(document)
    }
}
