//! Text Extractor: turns an uploaded PDF, DOCX or plain-text document into text.
//!
//! The kind is decided by MIME type, with the file extension as a fallback when the
//! client sent no type or a generic `application/octet-stream`. Anything else is
//! unsupported and produces no text.

use std::any::Any;
use std::io::{Cursor, Read};
use std::path::Path;

use bytes::Bytes;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::task::JoinError;

const MIME_PDF: &str = "application/pdf";
const MIME_DOCX: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
const MIME_TEXT: &str = "text/plain";
const MIME_OCTET_STREAM: &str = "application/octet-stream";

const DOCX_BODY_PART: &str = "word/document.xml";

static PARAGRAPH_END: Lazy<Regex> = Lazy::new(|| Regex::new(r"</w:p>").expect("static pattern"));
static TAB: Lazy<Regex> = Lazy::new(|| Regex::new(r"<w:tab\s*/>").expect("static pattern"));
static LINE_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<w:(?:br|cr)\b[^>]*/>").expect("static pattern"));
static ANY_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("static pattern"));
static XML_ENTITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&(?:#x([0-9A-Fa-f]+)|#([0-9]+)|(lt|gt|quot|apos|amp));").expect("static pattern")
});

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("PDF extraction failed: {0}")]
    Pdf(String),

    #[error("DOCX archive error: {0}")]
    Docx(#[from] zip::result::ZipError),

    #[error("I/O error while reading document: {0}")]
    Io(#[from] std::io::Error),

    #[error("Extractor panicked: {0}")]
    Panicked(String),

    #[error("Extraction task was cancelled: {0}")]
    Cancelled(String),
}

impl From<JoinError> for ExtractError {
    fn from(e: JoinError) -> Self {
        if e.is_panic() {
            ExtractError::Panicked(panic_message(e.into_panic()))
        } else {
            ExtractError::Cancelled(e.to_string())
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Pdf,
    Docx,
    PlainText,
}

impl DocumentKind {
    /// Resolves the document kind from the declared MIME type and the file name.
    pub fn detect(mime_type: Option<&str>, file_name: &str) -> Option<Self> {
        let mime = mime_type
            .map(|m| {
                m.split(';')
                    .next()
                    .unwrap_or_default()
                    .trim()
                    .to_ascii_lowercase()
            })
            .filter(|m| !m.is_empty());

        match mime.as_deref() {
            Some(MIME_PDF) => Some(DocumentKind::Pdf),
            Some(MIME_DOCX) => Some(DocumentKind::Docx),
            Some(MIME_TEXT) => Some(DocumentKind::PlainText),
            None | Some(MIME_OCTET_STREAM) => Self::from_extension(file_name),
            Some(_) => None,
        }
    }

    fn from_extension(file_name: &str) -> Option<Self> {
        let ext = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())?
            .to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(DocumentKind::Pdf),
            "docx" => Some(DocumentKind::Docx),
            "txt" => Some(DocumentKind::PlainText),
            _ => None,
        }
    }
}

pub fn extract_text(kind: DocumentKind, content: &[u8]) -> Result<String, ExtractError> {
    match kind {
        DocumentKind::Pdf => pdf_extract::extract_text_from_mem(content)
            .map_err(|e| ExtractError::Pdf(e.to_string())),
        DocumentKind::Docx => extract_docx(content),
        DocumentKind::PlainText => Ok(String::from_utf8_lossy(content).into_owned()),
    }
}

/// Runs [`extract_text`] on the blocking pool. The PDF decoder panics on some
/// malformed input; such a panic ends the blocking task only and comes back as
/// `ExtractError::Panicked`.
pub async fn extract_text_blocking(
    kind: DocumentKind,
    content: Bytes,
) -> Result<String, ExtractError> {
    tokio::task::spawn_blocking(move || extract_text(kind, &content)).await?
}

fn extract_docx(content: &[u8]) -> Result<String, ExtractError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(content))?;
    let mut xml = String::new();
    archive.by_name(DOCX_BODY_PART)?.read_to_string(&mut xml)?;
    Ok(docx_xml_to_text(&xml))
}

/// Flattens WordprocessingML into text: paragraphs become lines, tabs and breaks
/// are kept, every other tag is dropped.
fn docx_xml_to_text(xml: &str) -> String {
    let text = PARAGRAPH_END.replace_all(xml, "\n");
    let text = TAB.replace_all(&text, "\t");
    let text = LINE_BREAK.replace_all(&text, "\n");
    let text = ANY_TAG.replace_all(&text, "");

    unescape_xml(text.trim())
}

/// Decodes the predefined entities and numeric character references in one pass,
/// so `&amp;lt;` stays `&lt;`. References to invalid code points are left as is.
fn unescape_xml(text: &str) -> String {
    XML_ENTITY
        .replace_all(text, |caps: &Captures| {
            let decoded = if let Some(hex) = caps.get(1) {
                u32::from_str_radix(hex.as_str(), 16).ok().and_then(char::from_u32)
            } else if let Some(dec) = caps.get(2) {
                dec.as_str().parse::<u32>().ok().and_then(char::from_u32)
            } else {
                match caps.get(3).map(|m| m.as_str()) {
                    Some("lt") => Some('<'),
                    Some("gt") => Some('>'),
                    Some("quot") => Some('"'),
                    Some("apos") => Some('\''),
                    Some("amp") => Some('&'),
                    _ => None,
                }
            };
            decoded.map_or_else(|| caps[0].to_string(), String::from)
        })
        .into_owned()
}
