//! PDF parsing and per-page text extraction.

use docchat_core::{AppError, AppResult};
use lopdf::Document;

/// Extraction backend: turns raw bytes into a paged text source.
///
/// Constructed once at startup and reused for every ingestion.
pub trait TextExtractor: Send + Sync {
    /// Parse `bytes` into a page source.
    fn open(&self, bytes: &[u8]) -> AppResult<Box<dyn PageSource>>;
}

/// A parsed document whose pages are read one at a time.
pub trait PageSource: Send + Sync {
    /// Number of pages in the document.
    fn page_count(&self) -> u32;

    /// Text fragments of a page, in reading order. Pages are 1-indexed.
    fn page_fragments(&self, page: u32) -> AppResult<Vec<String>>;
}

/// [`TextExtractor`] backed by `lopdf`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfExtractor;

impl LopdfExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl TextExtractor for LopdfExtractor {
    fn open(&self, bytes: &[u8]) -> AppResult<Box<dyn PageSource>> {
        let doc = Document::load_mem(bytes)
            .map_err(|e| AppError::Ingest(format!("Failed to parse PDF: {}", e)))?;

        let pages: Vec<u32> = doc.get_pages().keys().copied().collect();
        tracing::debug!("Parsed PDF with {} pages", pages.len());

        Ok(Box::new(LopdfPages { doc, pages }))
    }
}

struct LopdfPages {
    doc: Document,
    // Page numbers as reported by the page tree, ascending
    pages: Vec<u32>,
}

impl PageSource for LopdfPages {
    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn page_fragments(&self, page: u32) -> AppResult<Vec<String>> {
        let number = page
            .checked_sub(1)
            .and_then(|index| self.pages.get(index as usize))
            .copied()
            .ok_or_else(|| AppError::Ingest(format!("Page {} is out of range", page)))?;

        let text = self
            .doc
            .extract_text(&[number])
            .map_err(|e| AppError::Ingest(format!("Failed to extract page {}: {}", page, e)))?;

        Ok(text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Object, Stream};

    /// Build a PDF in memory with one page per entry; each string is one text line.
    pub(crate) fn build_pdf(pages: &[&[&str]]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => font_id,
            },
        });

        let mut kids: Vec<Object> = Vec::new();
        for lines in pages {
            let mut operations = Vec::new();
            for (i, line) in lines.iter().enumerate() {
                operations.push(Operation::new("BT", vec![]));
                operations.push(Operation::new("Tf", vec!["F1".into(), 12.into()]));
                operations.push(Operation::new(
                    "Td",
                    vec![72.into(), (720 - 20 * i as i64).into()],
                ));
                operations.push(Operation::new("Tj", vec![Object::string_literal(*line)]));
                operations.push(Operation::new("ET", vec![]));
            }
            let content = Content { operations };
            let content_id =
                doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn test_lopdf_extracts_pages_in_order() {
        let pdf = build_pdf(&[&["Admission deadline is May 1."], &[], &["Fees", "are due"]]);
        let source = LopdfExtractor::new().open(&pdf).unwrap();

        assert_eq!(source.page_count(), 3);

        let first = source.page_fragments(1).unwrap().join(" ");
        assert!(first.contains("Admission deadline is May 1."));

        assert!(source.page_fragments(2).unwrap().is_empty());

        let third = source.page_fragments(3).unwrap().join(" ");
        assert!(third.contains("Fees"));
        assert!(third.contains("are due"));
    }

    #[test]
    fn test_page_out_of_range() {
        let pdf = build_pdf(&[&["only page"]]);
        let source = LopdfExtractor::new().open(&pdf).unwrap();
        assert!(source.page_fragments(0).is_err());
        assert!(source.page_fragments(2).is_err());
    }

    #[test]
    fn test_garbage_is_ingest_error() {
        let err = LopdfExtractor::new().open(b"not a pdf").err().unwrap();
        assert!(matches!(err, AppError::Ingest(_)));
        assert!(err.to_string().starts_with("Failed to parse PDF"));
    }
}
