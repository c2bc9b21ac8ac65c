//! Single-student PDF report, drawn with pdfium.
//!
//! Layout (A4, points, origin bottom-left):
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │ Title                                    │
//! │ ──────────────────────────────────────── │
//! │ Registration No  1RV20CS001              │
//! │ Name             ALICE SMITH             │
//! │ Department       CSE                     │
//! │                                          │
//! │ Subject              Marks   Status      │
//! │ CS501                45      [PASS]      │  status cell filled green/red/amber
//! │ …                                        │  continues on new pages when full
//! │ Total Marks 105   Absent Subjects 1      │
//! │ [ RESULT: FAIL                         ] │  banner filled green/red
//! └──────────────────────────────────────────┘
//! ```
//!
//! Text widths are not measured. Long subject names are shortened to fit
//! their column instead.

use crate::config::ProcessingConfig;
use crate::engine::bind_pdfium;
use crate::error::{MarksheetError, RenderError};
use crate::model::{ColorTag, ResultStatus, StudentData};
use crate::report::ReportRenderer;
use pdfium_render::prelude::*;
use tracing::debug;

const PAGE_WIDTH: f32 = 595.0;
const PAGE_HEIGHT: f32 = 842.0;
const MARGIN: f32 = 50.0;
const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;
const ROW_HEIGHT: f32 = 20.0;
/// Baseline offset of text inside a table row.
const ROW_PAD: f32 = 6.0;
const COL_SUBJECT: f32 = MARGIN + 8.0;
const COL_MARK: f32 = 345.0;
const COL_STATUS: f32 = 432.0;
const STATUS_CELL_LEFT: f32 = COL_STATUS - 8.0;
const STATUS_CELL_WIDTH: f32 = PAGE_WIDTH - MARGIN - STATUS_CELL_LEFT;
const SUBJECT_MAX_CHARS: usize = 46;
/// Lowest baseline a table row may use before a page break.
const BOTTOM_LIMIT: f32 = MARGIN + 30.0;

/// [`ReportRenderer`] producing an A4 PDF per student.
pub struct PdfReportRenderer<'a> {
    pdfium: &'a Pdfium,
    title: String,
}

impl<'a> PdfReportRenderer<'a> {
    pub fn new(pdfium: &'a Pdfium, title: impl Into<String>) -> Self {
        Self {
            pdfium,
            title: title.into(),
        }
    }

    /// Bind pdfium as configured and use the configured report title.
    pub fn from_config(config: &ProcessingConfig) -> Result<PdfReportRenderer<'static>, MarksheetError> {
        Ok(PdfReportRenderer::new(bind_pdfium(config)?, config.report_title.clone()))
    }

    fn build(&self, student: &StudentData) -> Result<Vec<u8>, PdfiumError> {
        let document = self.pdfium.create_new_pdf()?;
        let mut canvas = Canvas::new(document);
        canvas.new_page()?;

        // Title
        let y = canvas.y;
        canvas.text(MARGIN, y, &self.title, Font::Bold, 18.0, dark())?;
        canvas.y -= 14.0;
        canvas.rect(MARGIN, canvas.y, CONTENT_WIDTH, 1.0, Some(grey(160)), None)?;
        canvas.y -= 26.0;

        // Identity block
        for (label, value) in [
            ("Registration No", student.reg_no.as_str()),
            ("Name", student.name.as_str()),
            ("Department", student.department.as_str()),
        ] {
            let y = canvas.y;
            canvas.text(MARGIN, y, label, Font::Bold, 11.0, dark())?;
            canvas.text(MARGIN + 115.0, y, or_dash(value), Font::Regular, 11.0, dark())?;
            canvas.y -= 18.0;
        }
        canvas.y -= 16.0;

        // Subject table
        canvas.table_header()?;
        for subject in &student.subjects {
            if canvas.y < BOTTOM_LIMIT {
                canvas.new_page()?;
                canvas.table_header()?;
            }
            let y = canvas.y;
            let status_color = pdf_color(subject.status.color());
            canvas.rect(
                STATUS_CELL_LEFT,
                y - ROW_PAD,
                STATUS_CELL_WIDTH,
                ROW_HEIGHT,
                Some(status_color),
                None,
            )?;
            canvas.text(COL_SUBJECT, y, &fit(&subject.subject, SUBJECT_MAX_CHARS), Font::Regular, 10.0, dark())?;
            canvas.text(COL_MARK, y, &subject.mark.to_string(), Font::Regular, 10.0, dark())?;
            canvas.text(COL_STATUS, y, subject.status.as_str(), Font::Bold, 10.0, white())?;
            canvas.rect(MARGIN, y - ROW_PAD, CONTENT_WIDTH, 0.5, Some(grey(200)), None)?;
            canvas.y -= ROW_HEIGHT;
        }

        // Summary and result banner
        if canvas.y - 70.0 < MARGIN {
            canvas.new_page()?;
        }
        canvas.y -= 16.0;
        let y = canvas.y;
        canvas.text(MARGIN, y, "Total Marks", Font::Bold, 11.0, dark())?;
        canvas.text(MARGIN + 115.0, y, &crate::model::format_number(student.total_marks), Font::Regular, 11.0, dark())?;
        canvas.y -= 18.0;
        let y = canvas.y;
        canvas.text(MARGIN, y, "Absent Subjects", Font::Bold, 11.0, dark())?;
        canvas.text(MARGIN + 115.0, y, &student.absent_count.to_string(), Font::Regular, 11.0, dark())?;
        canvas.y -= 34.0;

        let y = canvas.y;
        let banner = match student.result_status {
            ResultStatus::Pass => pdf_color(ColorTag::Green),
            ResultStatus::Fail => pdf_color(ColorTag::Red),
        };
        canvas.rect(MARGIN, y - 10.0, CONTENT_WIDTH, 30.0, Some(banner), None)?;
        let label = format!("RESULT: {}", student.result_status);
        canvas.text(MARGIN + 12.0, y, &label, Font::Bold, 14.0, white())?;

        debug!("Report for {} laid out on {} page(s)", student.reg_no, canvas.pages);
        canvas.finish()
    }
}

impl ReportRenderer for PdfReportRenderer<'_> {
    fn render_student(&self, student: &StudentData) -> Result<Vec<u8>, RenderError> {
        self.build(student).map_err(|e| RenderError::Pdf {
            reg_no: student.reg_no.clone(),
            detail: format!("{:?}", e),
        })
    }
}

#[derive(Clone, Copy)]
enum Font {
    Regular,
    Bold,
}

/// Drawing state: the document, the page being filled and the cursor.
struct Canvas<'a> {
    document: PdfDocument<'a>,
    page: Option<PdfPage<'a>>,
    regular: PdfFontToken,
    bold: PdfFontToken,
    /// Baseline of the next line on the current page.
    y: f32,
    pages: usize,
}

impl<'a> Canvas<'a> {
    fn new(mut document: PdfDocument<'a>) -> Self {
        let regular = document.fonts_mut().helvetica();
        let bold = document.fonts_mut().helvetica_bold();
        Self {
            document,
            page: None,
            regular,
            bold,
            y: PAGE_HEIGHT - MARGIN,
            pages: 0,
        }
    }

    fn new_page(&mut self) -> Result<(), PdfiumError> {
        self.page = None;
        let page = self
            .document
            .pages_mut()
            .create_page_at_end(PdfPagePaperSize::a4())?;
        self.page = Some(page);
        self.pages += 1;
        self.y = PAGE_HEIGHT - MARGIN - 10.0;

        let footer = format!("Page {}", self.pages);
        self.text(PAGE_WIDTH - MARGIN - 40.0, MARGIN / 2.0, &footer, Font::Regular, 8.0, grey(120))
    }

    fn table_header(&mut self) -> Result<(), PdfiumError> {
        let y = self.y;
        self.rect(MARGIN, y - ROW_PAD, CONTENT_WIDTH, ROW_HEIGHT, Some(grey(230)), None)?;
        self.text(COL_SUBJECT, y, "Subject", Font::Bold, 10.0, dark())?;
        self.text(COL_MARK, y, "Marks", Font::Bold, 10.0, dark())?;
        self.text(COL_STATUS, y, "Status", Font::Bold, 10.0, dark())?;
        self.y -= ROW_HEIGHT;
        Ok(())
    }

    fn text(&mut self, x: f32, y: f32, text: &str, font: Font, size: f32, color: PdfColor) -> Result<(), PdfiumError> {
        let font = match font {
            Font::Regular => self.regular,
            Font::Bold => self.bold,
        };
        let mut object = PdfPageTextObject::new(&self.document, text, font, PdfPoints::new(size))?;
        object.set_fill_color(color)?;
        object.translate(PdfPoints::new(x), PdfPoints::new(y))?;
        if let Some(page) = self.page.as_mut() {
            page.objects_mut().add_text_object(object)?;
        }
        Ok(())
    }

    fn rect(
        &mut self,
        left: f32,
        bottom: f32,
        width: f32,
        height: f32,
        fill: Option<PdfColor>,
        stroke: Option<PdfColor>,
    ) -> Result<(), PdfiumError> {
        if let Some(page) = self.page.as_mut() {
            page.objects_mut().create_path_object_rect(
                PdfRect::new_from_values(bottom, left, bottom + height, left + width),
                stroke,
                stroke.map(|_| PdfPoints::new(0.5)),
                fill,
            )?;
        }
        Ok(())
    }

    fn finish(mut self) -> Result<Vec<u8>, PdfiumError> {
        self.page = None;
        self.document.save_to_bytes()
    }
}

fn pdf_color(tag: ColorTag) -> PdfColor {
    let (r, g, b) = tag.rgb();
    PdfColor::new(r, g, b, 255)
}

fn grey(level: u8) -> PdfColor {
    PdfColor::new(level, level, level, 255)
}

fn dark() -> PdfColor {
    PdfColor::new(30, 30, 30, 255)
}

fn white() -> PdfColor {
    PdfColor::new(255, 255, 255, 255)
}

fn or_dash(value: &str) -> &str {
    if value.trim().is_empty() {
        "-"
    } else {
        value
    }
}

/// Shorten `text` to at most `max` characters, marking the cut with `...`.
fn fit(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", kept.trim_end())
}
