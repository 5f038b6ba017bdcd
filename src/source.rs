//! Enumeration of the documents to scan: a zip archive, a folder, or a
//! single document.

use anyhow::{anyhow, bail, Context, Result};
use std::{
    fs::File,
    io::{Read, Seek},
    path::{Path, PathBuf},
};
use tracing::{debug, warn};
use walkdir::WalkDir;
use zip::ZipArchive;

use crate::types::{FileType, Payload, PendingDocument, SkippedDocument};
use crate::utils::{is_archive, parse_filetype};

pub const ARCHIVE_ERROR: &str = "Error reading zip file. Please ensure it's a valid zip file.";

// Upper bound on the buffer reserved up front from an entry's declared size.
const MAX_ENTRY_RESERVE: u64 = 64 << 20;

/// Where resumes are read from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Source {
    Archive(PathBuf),
    Folder { path: PathBuf, recursive: bool },
    Document(PathBuf),
}

/// Documents found in a source, plus entries that could not be read.
#[derive(Debug, Default)]
pub struct Collected {
    pub documents: Vec<PendingDocument>,
    pub skipped: Vec<SkippedDocument>,
}

impl Source {
    /// Pick the source kind from what `path` points at.
    pub fn detect(path: &Path, recursive: bool) -> Result<Self> {
        if !path.exists() {
            bail!("Source not found: {}", path.display());
        }

        if path.is_dir() {
            return Ok(Source::Folder {
                path: path.to_path_buf(),
                recursive,
            });
        }

        let name = path.to_string_lossy();
        if is_archive(&name) {
            Ok(Source::Archive(path.to_path_buf()))
        } else if parse_filetype(&name).is_ok() {
            Ok(Source::Document(path.to_path_buf()))
        } else {
            bail!(
                "Unsupported source: {}. Expected a .zip archive, a folder, or a .pdf/.docx file",
                path.display()
            )
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Source::Archive(path) => format!("archive {}", path.display()),
            Source::Folder { path, recursive } => format!(
                "folder {}{}",
                path.display(),
                if *recursive { " (recursive)" } else { "" }
            ),
            Source::Document(path) => format!("document {}", path.display()),
        }
    }

    /// List every eligible document. Failing to open an archive or folder is
    /// an error; unreadable individual entries are reported as skipped.
    pub fn collect(&self, pattern: Option<&glob::Pattern>) -> Result<Collected> {
        let mut collected = match self {
            Source::Archive(path) => {
                let file = File::open(path)
                    .with_context(|| format!("Failed to open archive: {}", path.display()))?;
                collect_archive(file)?
            }
            Source::Folder { path, recursive } => collect_folder(path, *recursive)?,
            Source::Document(path) => {
                let name = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.to_string_lossy().into_owned());
                let file_type = parse_filetype(&name)?;
                Collected {
                    documents: vec![PendingDocument {
                        name,
                        file_type,
                        payload: Payload::Path(path.clone()),
                    }],
                    skipped: Vec::new(),
                }
            }
        };

        if let Some(pattern) = pattern {
            collected.documents.retain(|doc| pattern.matches(&doc.name));
        }

        debug!(
            documents = collected.documents.len(),
            skipped = collected.skipped.len(),
            source = %self.describe(),
            "collected documents"
        );
        Ok(collected)
    }
}

/// Read the eligible entries of a zip archive into memory.
pub fn collect_archive<R>(reader: R) -> Result<Collected>
where
    R: Read,
    R: Seek,
{
    let mut archive = ZipArchive::new(reader).map_err(|e| anyhow!("{} ({})", ARCHIVE_ERROR, e))?;
    let mut collected = Collected::default();

    for index in 0..archive.len() {
        let mut entry = match archive.by_index(index) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(index, error = %e, "failed to open archive entry");
                collected.skipped.push(SkippedDocument {
                    name: format!("entry #{}", index),
                    reason: e.to_string(),
                });
                continue;
            }
        };

        if entry.is_dir() {
            continue;
        }

        let name = entry.name().to_string();
        let file_type = match parse_filetype(&name) {
            Ok(file_type) => file_type,
            Err(_) => continue,
        };

        let mut bytes = Vec::with_capacity(entry.size().min(MAX_ENTRY_RESERVE) as usize);
        if let Err(e) = entry.read_to_end(&mut bytes) {
            warn!(file = %name, error = %e, "failed to read archive entry");
            collected.skipped.push(SkippedDocument {
                name,
                reason: e.to_string(),
            });
            continue;
        }

        collected.documents.push(PendingDocument {
            name,
            file_type,
            payload: Payload::Bytes(bytes),
        });
    }

    Ok(collected)
}

/// List `.pdf`/`.docx` files in a folder, sorted by name. Nested folders are
/// only visited when `recursive` is set; their documents are named by their
/// path relative to `root`.
pub fn collect_folder(root: &Path, recursive: bool) -> Result<Collected> {
    if !root.is_dir() {
        bail!("Directory not found: {}", root.display());
    }

    let mut walker = WalkDir::new(root)
        .min_depth(1)
        .sort_by(|a, b| a.file_name().cmp(b.file_name()));
    if !recursive {
        walker = walker.max_depth(1);
    }

    let mut collected = Collected::default();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "failed to read directory entry");
                collected.skipped.push(SkippedDocument {
                    name: e
                        .path()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| root.display().to_string()),
                    reason: e.to_string(),
                });
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        let file_type: FileType = match parse_filetype(&name) {
            Ok(file_type) => file_type,
            Err(_) => continue,
        };

        collected.documents.push(PendingDocument {
            name,
            file_type,
            payload: Payload::Path(entry.into_path()),
        });
    }

    Ok(collected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use zip::write::FileOptions;
    use zip::ZipWriter;

    fn archive(entries: &[&str]) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        for name in entries {
            if name.ends_with('/') {
                zip.add_directory(*name, FileOptions::default()).unwrap();
            } else {
                zip.start_file(*name, FileOptions::default()).unwrap();
                zip.write_all(b"payload").unwrap();
            }
        }
        zip.finish().unwrap().into_inner()
    }

    #[test]
    fn test_collect_archive_filters_by_extension() {
        let bytes = archive(&["resumes/", "resumes/a.pdf", "notes.txt", "b.DOCX", "c.docx"]);
        let collected = collect_archive(Cursor::new(bytes)).unwrap();

        let names: Vec<&str> = collected.documents.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["resumes/a.pdf", "b.DOCX", "c.docx"]);
        assert_eq!(collected.documents[0].file_type, FileType::Pdf);
        assert_eq!(collected.documents[1].file_type, FileType::Docx);
        assert!(collected.skipped.is_empty());
    }

    #[test]
    fn test_collect_archive_reads_entries_larger_than_reserve() {
        let payload = vec![b'x'; (MAX_ENTRY_RESERVE + 1024) as usize];
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default().compression_method(zip::CompressionMethod::Deflated);
        zip.start_file("big.pdf", options).unwrap();
        zip.write_all(&payload).unwrap();
        let bytes = zip.finish().unwrap().into_inner();

        let collected = collect_archive(Cursor::new(bytes)).unwrap();
        match &collected.documents[0].payload {
            Payload::Bytes(read) => assert_eq!(read.len(), payload.len()),
            Payload::Path(_) => panic!("archive entries are read into memory"),
        }
    }

    #[test]
    fn test_collect_archive_rejects_corrupt_archive() {
        let err = collect_archive(Cursor::new(b"definitely not a zip".to_vec())).unwrap_err();
        assert!(err.to_string().starts_with(ARCHIVE_ERROR));
    }

    #[test]
    fn test_detect_source_kinds() {
        let dir = tempfile::tempdir().unwrap();
        let zip_path = dir.path().join("batch.zip");
        let pdf_path = dir.path().join("cv.pdf");
        let txt_path = dir.path().join("notes.txt");
        for path in [&zip_path, &pdf_path, &txt_path] {
            std::fs::write(path, b"x").unwrap();
        }

        assert_eq!(
            Source::detect(dir.path(), false).unwrap(),
            Source::Folder {
                path: dir.path().to_path_buf(),
                recursive: false
            }
        );
        assert_eq!(Source::detect(&zip_path, false).unwrap(), Source::Archive(zip_path.clone()));
        assert_eq!(Source::detect(&pdf_path, false).unwrap(), Source::Document(pdf_path.clone()));
        assert!(Source::detect(&txt_path, false).is_err());
        assert!(Source::detect(&dir.path().join("missing.zip"), false).is_err());
    }

    #[test]
    fn test_collect_folder_recursion() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        for name in ["b.pdf", "a.docx", "skip.txt", "nested/c.pdf"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }

        let flat = collect_folder(dir.path(), false).unwrap();
        let names: Vec<&str> = flat.documents.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["a.docx", "b.pdf"]);

        let deep = collect_folder(dir.path(), true).unwrap();
        let names: Vec<&str> = deep.documents.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["a.docx", "b.pdf", "nested/c.pdf"]);
    }

    #[test]
    fn test_collect_applies_pattern() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["alice.pdf", "bob.docx", "carol.pdf"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }

        let source = Source::Folder {
            path: dir.path().to_path_buf(),
            recursive: false,
        };
        let pattern = glob::Pattern::new("*.pdf").unwrap();
        let collected = source.collect(Some(&pattern)).unwrap();
        let names: Vec<&str> = collected.documents.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["alice.pdf", "carol.pdf"]);
    }
}
