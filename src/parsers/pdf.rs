use anyhow::{Context, Result};
use std::time::Instant;
use tracing::debug;

/// Extract the text layer of a PDF document held in memory.
pub fn extract_text(bytes: &[u8]) -> Result<String> {
    let start = Instant::now();
    let text = pdf_extract::extract_text_from_mem(bytes)
        .with_context(|| format!("Failed to extract text from pdf ({} bytes)", bytes.len()))?;
    debug!(
        elapsed_ms = start.elapsed().as_millis() as u64,
        chars = text.len(),
        "extracted pdf text"
    );

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_text_rejects_garbage() {
        assert!(extract_text(b"this is not a pdf").is_err());
    }
}
