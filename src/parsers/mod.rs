pub mod docx;
pub mod pdf;

use anyhow::Result;

use crate::types::FileType;

/// Extract plain text from document bytes according to their type.
pub fn extract_text(file_type: FileType, bytes: &[u8]) -> Result<String> {
    match file_type {
        FileType::Docx => docx::extract_text(bytes),
        FileType::Pdf => pdf::extract_text(bytes),
    }
}
