//! Export orchestration: snapshot in, saved file out.
//!
//! [`Exporter`] is the single entry point the host calls. It guards against
//! empty decks, derives the output filename from the deck title, runs the
//! serializer and hands the finished package to a [`SaveTarget`].

use crate::config::ExportConfig;
use crate::error::{AssetError, ExportError, Result};
use crate::slide::Slide;
use crate::writer::PptxWriter;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// MIME type of a presentation package
pub const PPTX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation";

/// File extension of a presentation package
pub const PPTX_EXTENSION: &str = "pptx";

/// Filename used when the title is blank
const FALLBACK_STEM: &str = "presentation";

/// Build the output filename from a deck title.
///
/// Each run of whitespace, leading and trailing runs included, becomes a
/// single `_`. No other characters are altered. A title with no visible
/// characters gives `presentation.pptx`.
pub fn derive_filename(title: &str) -> String {
    if title.trim().is_empty() {
        return format!("{}.{}", FALLBACK_STEM, PPTX_EXTENSION);
    }

    let mut stem = String::with_capacity(title.len());
    let mut in_run = false;
    for c in title.chars() {
        if c.is_whitespace() {
            if !in_run {
                stem.push('_');
            }
            in_run = true;
        } else {
            stem.push(c);
            in_run = false;
        }
    }

    format!("{}.{}", stem, PPTX_EXTENSION)
}

/// Destination for a finished package.
///
/// Implementations must not expose partially written files.
pub trait SaveTarget {
    /// Persist `bytes` under `filename`
    fn save(&mut self, filename: &str, content_type: &str, bytes: &[u8]) -> Result<()>;
}

/// Saves into a directory on the local filesystem
#[derive(Debug, Clone)]
pub struct DirectoryTarget {
    dir: PathBuf,
}

impl DirectoryTarget {
    /// Target writing into `dir` (created on first save)
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Output directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Final path for `filename`
    pub fn path_for(&self, filename: &str) -> PathBuf {
        self.dir.join(filename)
    }
}

impl SaveTarget for DirectoryTarget {
    fn save(&mut self, filename: &str, _content_type: &str, bytes: &[u8]) -> Result<()> {
        if filename.is_empty() || filename == "." || filename == ".." {
            return Err(ExportError::invalid_filename(filename, "name is empty"));
        }
        if filename.contains(['/', '\\']) {
            return Err(ExportError::invalid_filename(
                filename,
                "name contains a path separator",
            ));
        }

        fs::create_dir_all(&self.dir)?;

        let final_path = self.path_for(filename);
        let temp_path = self.dir.join(format!(".{}.part", filename));

        let written =
            fs::write(&temp_path, bytes).and_then(|()| fs::rename(&temp_path, &final_path));
        if let Err(err) = written {
            let _ = fs::remove_file(&temp_path);
            return Err(err.into());
        }

        debug!(path = %final_path.display(), bytes = bytes.len(), "Package saved");
        Ok(())
    }
}

/// A file handed to [`MemoryTarget`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedFile {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Keeps saved files in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryTarget {
    /// Files in save order
    pub files: Vec<SavedFile>,
}

impl MemoryTarget {
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recently saved file
    pub fn last(&self) -> Option<&SavedFile> {
        self.files.last()
    }
}

impl SaveTarget for MemoryTarget {
    fn save(&mut self, filename: &str, content_type: &str, bytes: &[u8]) -> Result<()> {
        self.files.push(SavedFile {
            filename: filename.to_string(),
            content_type: content_type.to_string(),
            bytes: bytes.to_vec(),
        });
        Ok(())
    }
}

/// Outcome of a completed export
#[derive(Debug, Clone)]
pub struct ExportReport {
    /// Name the package was saved under
    pub filename: String,

    /// Package size in bytes
    pub size: usize,

    /// Number of slides written
    pub slide_count: usize,

    /// Images that were left out
    pub asset_errors: Vec<AssetError>,
}

impl ExportReport {
    /// Whether every image made it into the package
    pub fn is_complete(&self) -> bool {
        self.asset_errors.is_empty()
    }
}

/// Export entry point
#[derive(Debug, Clone, Default)]
pub struct Exporter {
    writer: PptxWriter,
}

impl Exporter {
    /// Create an exporter with the given configuration
    pub fn new(config: ExportConfig) -> Self {
        Self {
            writer: PptxWriter::new(config),
        }
    }

    /// Serialize and save a deck snapshot.
    ///
    /// Returns `Ok(None)` without touching `target` when `slides` is empty.
    /// On a fatal error nothing is saved.
    pub fn export(
        &self,
        slides: &[Slide],
        theme_id: &str,
        title: &str,
        target: &mut dyn SaveTarget,
    ) -> Result<Option<ExportReport>> {
        if slides.is_empty() {
            debug!("Nothing to export: deck has no slides");
            return Ok(None);
        }

        let filename = derive_filename(title);
        let deck = self.writer.write(slides, theme_id, title)?;

        target.save(&filename, PPTX_CONTENT_TYPE, &deck.bytes)?;

        info!(
            filename = %filename,
            size = deck.bytes.len(),
            slides = deck.slide_count,
            "Presentation exported"
        );

        Ok(Some(ExportReport {
            filename,
            size: deck.bytes.len(),
            slide_count: deck.slide_count,
            asset_errors: deck.asset_errors,
        }))
    }
}

/// Export with the default configuration
pub fn export_presentation(
    slides: &[Slide],
    theme_id: &str,
    title: &str,
    target: &mut dyn SaveTarget,
) -> Result<Option<ExportReport>> {
    Exporter::default().export(slides, theme_id, title, target)
}
