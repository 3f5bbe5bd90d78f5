use anyhow::{Context, Result, anyhow};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::language_utils::validate_language_code;
use crate::translation::SourceDocument;

// @module: Document discovery and output files

/// Extension of source and translated documents
pub const DOCUMENT_EXTENSION: &str = "md";

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)?;
        }
        Ok(())
    }

    // @generates: Source path for a document id
    pub fn document_path<P: AsRef<Path>>(documents_dir: P, document_id: &str) -> PathBuf {
        documents_dir
            .as_ref()
            .join(format!("{}.{}", document_id, DOCUMENT_EXTENSION))
    }

    // @generates: Output path for a translated document
    // @params: output_dir, document_id, target_language
    pub fn generate_output_path<P: AsRef<Path>>(output_dir: P, document_id: &str, target_language: &str) -> PathBuf {
        output_dir.as_ref().join(format!(
            "{}.{}.{}",
            document_id, target_language, DOCUMENT_EXTENSION
        ))
    }

    /// Find document ids: `*.md` files directly inside `dir`, sorted
    ///
    /// Files named like translation outputs (`menu.fr.md`) are skipped so an
    /// output directory inside the documents directory is never re-read.
    pub fn find_documents<P: AsRef<Path>>(dir: P) -> Result<Vec<String>> {
        let dir = dir.as_ref();
        if !Self::dir_exists(dir) {
            return Err(anyhow!("Documents directory does not exist: {:?}", dir));
        }

        let mut ids = Vec::new();
        for entry in WalkDir::new(dir).min_depth(1).max_depth(1).follow_links(true) {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let is_markdown = path
                .extension()
                .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case(DOCUMENT_EXTENSION));
            if !is_markdown {
                continue;
            }

            let Some(stem) = path.file_stem().map(|s| s.to_string_lossy().to_string()) else {
                continue;
            };
            if Self::is_translation_output(&stem) {
                continue;
            }
            ids.push(stem);
        }

        ids.sort();
        Ok(ids)
    }

    /// Whether a file stem looks like `{id}.{language}`
    fn is_translation_output(stem: &str) -> bool {
        stem.rsplit_once('.')
            .is_some_and(|(id, language)| !id.is_empty() && validate_language_code(language).is_ok())
    }

    /// Load a document by id from the documents directory
    pub fn read_document<P: AsRef<Path>>(documents_dir: P, document_id: &str) -> Result<SourceDocument> {
        let path = Self::document_path(documents_dir, document_id);
        let bytes = fs::read(&path).with_context(|| format!("Failed to read file: {:?}", path))?;
        Ok(SourceDocument::from_bytes(document_id, bytes)?)
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path).with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Write a string to a file
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        // Ensure the parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        fs::write(&path, content).with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;

        Ok(())
    }
}
