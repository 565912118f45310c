use docx_rs::{read_docx, DocumentChild};
use domain::models::{Document, Page};
use memmap2::Mmap;
use shared::error::{AssistantError, Result};
use std::fs::File;
use std::path::Path;
use tracing::info;

const PAGE_BREAK: char = '\u{c}';

/// Load the source document into pages. PDF and DOCX are extracted; anything else is read as text.
pub fn load_document(path: impl AsRef<Path>) -> Result<Document> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(AssistantError::Document(format!(
            "document not found: {}",
            path.display()
        )));
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    let pages = match ext.as_str() {
        "pdf" => split_pages(&extract_pdf(path)?),
        "docx" => vec![Page {
            number: 1,
            text: extract_docx(path)?,
        }],
        _ => split_pages(&read_text(path)?),
    };

    let document = Document::new(path, pages);
    if document.is_empty() {
        return Err(AssistantError::Document(format!(
            "{} contains no text",
            path.display()
        )));
    }
    info!(
        path = %path.display(),
        pages = document.pages().len(),
        "loaded document"
    );
    Ok(document)
}

fn extract_pdf(path: &Path) -> Result<String> {
    pdf_extract::extract_text(path).map_err(|e| {
        AssistantError::Document(format!(
            "failed to extract text from PDF '{}': {}",
            path.display(),
            e
        ))
    })
}

fn extract_docx(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).map_err(AssistantError::document)?;
    let docx = read_docx(&bytes).map_err(|e| {
        AssistantError::Document(format!("failed to parse DOCX '{}': {}", path.display(), e))
    })?;
    let mut text = String::new();
    for child in &docx.document.children {
        if let DocumentChild::Paragraph(p) = child {
            text.push_str(&p.raw_text());
            text.push('\n');
        }
    }
    Ok(text)
}

fn read_text(path: &Path) -> Result<String> {
    let file = File::open(path).map_err(AssistantError::document)?;
    if file.metadata().map_err(AssistantError::document)?.len() == 0 {
        return Ok(String::new());
    }
    let mmap = unsafe { Mmap::map(&file).map_err(AssistantError::document)? };
    // Lossy conversion ensures non-UTF8 bytes don't abort loading.
    Ok(String::from_utf8_lossy(&mmap).into_owned())
}

/// Split on form feeds, numbering pages from 1 and dropping blank trailing pages.
fn split_pages(text: &str) -> Vec<Page> {
    let mut pages: Vec<Page> = text
        .split(PAGE_BREAK)
        .enumerate()
        .map(|(i, t)| Page {
            number: i + 1,
            text: t.to_string(),
        })
        .collect();
    while pages.len() > 1 && pages.last().is_some_and(|p| p.text.trim().is_empty()) {
        pages.pop();
    }
    pages
}
