//! Sources of raw documents: a directory of `.zip` / `.xml` files or an
//! in-memory map used by tests and embedders.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use crate::error::{FlattenError, Result};

/// Extensions recognized as documents, compared case-insensitively.
const DOCUMENT_EXTENSIONS: [&str; 2] = ["zip", "xml"];

/// Lists document identifiers and yields each document's XML text.
///
/// Implementations are shared across worker threads.
pub trait ArchiveReader: Sync {
    /// Document identifiers in processing order.
    fn list(&self) -> Result<Vec<String>>;

    /// XML text of one listed document.
    fn read(&self, document_id: &str) -> Result<String>;
}

/// Documents stored as files in one directory.
///
/// The document identifier is the file name. Compressed containers yield
/// their first entry; plain `.xml` files are read as is.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    /// Open a directory of documents.
    ///
    /// # Arguments
    /// * `root` - Directory holding `.zip` and `.xml` files
    ///
    /// # Returns
    /// An error if `root` is not a readable directory
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(FlattenError::InvalidConfig(format!(
                "input directory does not exist: {}",
                root.display()
            )));
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ArchiveReader for DirectorySource {
    fn list(&self) -> Result<Vec<String>> {
        let mut ids = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let path = entry?.path();
            if !path.is_file() || !is_document(&path) {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                ids.push(name.to_string());
            }
        }
        ids.sort();
        tracing::debug!(dir = %self.root.display(), count = ids.len(), "Listed documents");
        Ok(ids)
    }

    fn read(&self, document_id: &str) -> Result<String> {
        read_document_file(&self.root.join(document_id))
    }
}

fn is_document(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            DOCUMENT_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

/// Read the XML text of a document file.
///
/// A `.zip` file yields the text of its first entry; anything else is read
/// as UTF-8 text.
pub fn read_document_file(path: &Path) -> Result<String> {
    let is_zip = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"));

    if !is_zip {
        return Ok(std::fs::read_to_string(path)?);
    }

    let mut archive = zip::ZipArchive::new(BufReader::new(File::open(path)?))?;
    if archive.is_empty() {
        return Err(FlattenError::EmptyArchive(path.to_path_buf()));
    }

    // The buffer grows with the data actually read; the size recorded in the
    // entry header is untrusted.
    let mut entry = archive.by_index(0)?;
    let mut text = String::new();
    entry.read_to_string(&mut text)?;
    Ok(text)
}

/// Documents held in memory, listed in identifier order.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    documents: BTreeMap<String, String>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, document_id: impl Into<String>, xml: impl Into<String>) -> Self {
        self.documents.insert(document_id.into(), xml.into());
        self
    }
}

impl ArchiveReader for InMemorySource {
    fn list(&self) -> Result<Vec<String>> {
        Ok(self.documents.keys().cloned().collect())
    }

    fn read(&self, document_id: &str) -> Result<String> {
        self.documents.get(document_id).cloned().ok_or_else(|| {
            FlattenError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no document '{document_id}'"),
            ))
        })
    }
}
