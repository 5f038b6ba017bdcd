use std::fs::File;
use std::io::Read;
use std::path::Path;

use nom::bytes::complete::take_while;
use nom::character::complete::char;
use nom::multi::separated_list1;
use nom::IResult;

use anyhow::{bail, Context, Result};

use crate::types::{FileType, KeywordSet};

/// Split a keyword line on commas. Empty tokens are kept so callers can
/// tell `",java"` apart from `"java"`.
pub fn parse_keyword_list(input: &str) -> IResult<&str, Vec<&str>> {
    separated_list1(char(','), take_while(|c: char| c != ','))(input)
}

/// Parse a comma-separated keyword string into a [`KeywordSet`].
///
/// The first token must not be blank after trimming; later blank tokens are
/// ignored and duplicates collapse onto their first occurrence.
pub fn parse_keywords(input: &str) -> Result<KeywordSet> {
    let tokens = match parse_keyword_list(input) {
        Ok((_, tokens)) => tokens,
        Err(_) => bail!("Failed to parse keyword list: '{}'", input),
    };

    if tokens.first().map_or(true, |first| first.trim().is_empty()) {
        bail!("Please enter at least one keyword.");
    }

    KeywordSet::new(tokens)
}

/// Read keywords from a file
pub fn read_keywords_from_file(path: &Path) -> Result<KeywordSet> {
    let mut file = File::open(path)
        .with_context(|| format!("Failed to open keywords file: {}", path.display()))?;

    let mut content = String::new();
    file.read_to_string(&mut content)
        .with_context(|| format!("Failed to read keywords file: {}", path.display()))?;

    read_keywords_from_string(&content)
}

fn read_keywords_from_string(content: &str) -> Result<KeywordSet> {
    let lines: Vec<&str> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .collect();

    if lines.is_empty() {
        bail!("No keywords found in input");
    }

    parse_keywords(&lines.join(","))
}

/// Parse file type from a file name, ignoring extension case
pub fn parse_filetype(file_path: &str) -> Result<FileType> {
    let lower = file_path.to_lowercase();
    if lower.ends_with(FileType::Docx.extension()) {
        Ok(FileType::Docx)
    } else if lower.ends_with(FileType::Pdf.extension()) {
        Ok(FileType::Pdf)
    } else {
        bail!(
            "Unsupported file type. Only .docx and .pdf files are supported. Got: {}",
            file_path
        )
    }
}

/// Whether a path names a zip archive
pub fn is_archive(file_path: &str) -> bool {
    file_path.to_lowercase().ends_with(".zip")
}
