//! PDF text extraction via pdfium.
//!
//! The document parser only needs the text of each page, so extraction sits
//! behind the [`TextExtractor`] trait: the pdfium-backed implementation is
//! used in production and tests can hand in page text directly.

use crate::error::ParseError;
use pdfium_render::prelude::*;
use tracing::{debug, info};

/// Source of per-page text for a PDF.
pub trait TextExtractor {
    /// Return the text of every page, in page order.
    fn extract_pages(&self, bytes: &[u8], password: Option<&str>) -> Result<Vec<String>, ParseError>;
}

/// [`TextExtractor`] backed by a bound pdfium library.
pub struct PdfiumTextExtractor<'a> {
    pdfium: &'a Pdfium,
}

impl<'a> PdfiumTextExtractor<'a> {
    pub fn new(pdfium: &'a Pdfium) -> Self {
        Self { pdfium }
    }
}

impl TextExtractor for PdfiumTextExtractor<'_> {
    fn extract_pages(&self, bytes: &[u8], password: Option<&str>) -> Result<Vec<String>, ParseError> {
        let document = self
            .pdfium
            .load_pdf_from_byte_slice(bytes, password)
            .map_err(|e| load_error(e, password.is_some()))?;

        let pages = document.pages();
        let total_pages = pages.len() as usize;
        info!("PDF loaded: {} pages", total_pages);

        let mut texts = Vec::with_capacity(total_pages);
        for (idx, page) in pages.iter().enumerate() {
            let text = page.text().map_err(|e| ParseError::TextExtraction {
                page: idx + 1,
                detail: format!("{:?}", e),
            })?;
            let all = text.all();
            debug!("Extracted page {} → {} chars", idx + 1, all.len());
            texts.push(all);
        }

        Ok(texts)
    }
}

fn load_error(e: PdfiumError, had_password: bool) -> ParseError {
    let detail = format!("{:?}", e);
    if detail.contains("Password") || detail.contains("password") {
        if had_password {
            ParseError::WrongPassword
        } else {
            ParseError::PasswordRequired
        }
    } else {
        ParseError::CorruptPdf { detail }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedText(Vec<String>);

    impl TextExtractor for FixedText {
        fn extract_pages(&self, _bytes: &[u8], _password: Option<&str>) -> Result<Vec<String>, ParseError> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn trait_objects_work() {
        let ex: Box<dyn TextExtractor> = Box::new(FixedText(vec!["page one".into()]));
        assert_eq!(ex.extract_pages(b"%PDF", None).unwrap(), vec!["page one"]);
    }
}
