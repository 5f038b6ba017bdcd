use anyhow::{anyhow, Context, Result};
use std::io::{Cursor, Read, Seek};
use tracing::debug;
use zip::ZipArchive;

const DEFAULT_DOCUMENT_PART: &str = "word/document.xml";

enum AttributeType {
    OfficeDocument,
}

impl AttributeType {
    fn as_str(&self) -> &'static str {
        match self {
            AttributeType::OfficeDocument => {
                "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument"
            }
        }
    }
}

/// Resolve the main document part through the package relationships.
fn get_doc_name<R>(archive: &mut ZipArchive<R>) -> Result<Option<String>>
where
    R: Seek,
    R: Read,
{
    let mut rels = match archive.by_name("_rels/.rels") {
        Ok(rels) => rels,
        Err(zip::result::ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e).context("Failed to open package relationships"),
    };
    let mut rels_buffer = String::new();
    rels.read_to_string(&mut rels_buffer)
        .context("Failed to read package relationships")?;

    let rel_xml =
        roxmltree::Document::parse(&rels_buffer).context("Could not parse relationships XML")?;

    let doc_name = rel_xml
        .descendants()
        .filter(|elem| elem.attribute("Type") == Some(AttributeType::OfficeDocument.as_str()))
        .find_map(|elem| elem.attribute("Target"))
        .map(|target| target.trim_start_matches('/').to_owned());

    Ok(doc_name)
}

// Tab stops in paragraph properties are also named `tab`; only tabs inside
// a run are content.
fn is_run_tab(elem: &roxmltree::Node) -> bool {
    elem.has_tag_name("tab") && elem.parent().map_or(false, |parent| parent.has_tag_name("r"))
}

/// Extract the raw text of a DOCX document held in memory.
///
/// Paragraphs become lines; run text inside a paragraph is concatenated and
/// `w:tab` elements become tab characters.
pub fn extract_text(bytes: &[u8]) -> Result<String> {
    let mut archive =
        ZipArchive::new(Cursor::new(bytes)).context("Document is not a valid DOCX package")?;

    let doc_name = get_doc_name(&mut archive)?.unwrap_or_else(|| DEFAULT_DOCUMENT_PART.to_owned());
    debug!(part = %doc_name, "resolved main document part");

    let mut document = archive
        .by_name(&doc_name)
        .map_err(|_| anyhow!("Could not find document part '{}' in package", doc_name))?;

    let mut buffer = String::new();
    document
        .read_to_string(&mut buffer)
        .context("Failed to read document part")?;

    let doc = roxmltree::Document::parse(&buffer).context("Could not parse document XML")?;

    let paragraphs = doc
        .descendants()
        .filter(|elem| elem.has_tag_name("p"))
        .fold(Vec::new(), |mut acc, paragraph| {
            let line = paragraph
                .descendants()
                .filter(|elem| elem.has_tag_name("t") || is_run_tab(elem))
                .fold(String::new(), |mut line, elem| {
                    if elem.has_tag_name("tab") {
                        line.push('\t');
                    } else if let Some(text) = elem.text() {
                        line.push_str(text);
                    }
                    line
                });
            acc.push(line);
            acc
        });

    Ok(paragraphs.join("\n"))
}
