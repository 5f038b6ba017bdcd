use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::ValueEnum;
use serde::Serialize;

/// Supported document file types
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileType {
    /// Microsoft Word document (.docx)
    Docx,
    /// Portable Document Format (.pdf)
    Pdf,
}

impl FileType {
    /// Get the file extension for this file type
    pub fn extension(&self) -> &'static str {
        match self {
            FileType::Docx => ".docx",
            FileType::Pdf => ".pdf",
        }
    }

    /// Human readable label used in listings
    pub fn label(&self) -> &'static str {
        match self {
            FileType::Docx => "DOCX",
            FileType::Pdf => "PDF",
        }
    }
}

/// Ordered, non-empty list of lowercase keywords without duplicates.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeywordSet(Vec<String>);

impl KeywordSet {
    /// Build a set from raw tokens. Tokens are trimmed and lowercased, blanks
    /// are dropped and repeated keywords keep their first position.
    pub fn new<I, S>(tokens: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut keywords: Vec<String> = Vec::new();
        for token in tokens {
            let keyword = token.as_ref().trim().to_lowercase();
            if keyword.is_empty() || keywords.contains(&keyword) {
                continue;
            }
            keywords.push(keyword);
        }

        if keywords.is_empty() {
            bail!("Please enter at least one keyword.");
        }

        Ok(Self(keywords))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn position(&self, keyword: &str) -> Option<usize> {
        self.0.iter().position(|k| k == keyword)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

/// A document with its extracted text, lowercased once at construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocumentRecord {
    name: String,
    text: String,
}

impl DocumentRecord {
    pub fn new(name: impl Into<String>, text: &str) -> Self {
        Self {
            name: name.into(),
            text: text.to_lowercase(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Where the bytes of a pending document come from.
#[derive(Clone, Debug)]
pub enum Payload {
    /// Already read into memory, e.g. from an archive entry
    Bytes(Vec<u8>),
    /// Read from disk inside the extraction task
    Path(PathBuf),
}

/// A document that has been enumerated but not yet extracted.
#[derive(Clone, Debug)]
pub struct PendingDocument {
    pub name: String,
    pub file_type: FileType,
    pub payload: Payload,
}

/// A document excluded from the report because it could not be read.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SkippedDocument {
    pub name: String,
    pub reason: String,
}

/// Report output formats
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
    Csv,
    Html,
}
