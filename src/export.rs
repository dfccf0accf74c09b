use anyhow::{anyhow, Context};
use printpdf::{BuiltinFont, IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference, Point};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::calc::Report;
use crate::config::DashboardConfig;
use crate::view;

pub const REPORT_TITLE: &str = "Student Performance Report";

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const TITLE_HEIGHT_MM: f32 = 10.0;
const LINE_HEIGHT_MM: f32 = 8.0;
const TITLE_FONT_PT: f32 = 16.0;
const BODY_FONT_PT: f32 = 12.0;
const CELL_PAD_MM: f32 = 2.0;
const SUBJECT_COL_MM: f32 = 60.0;
const MARKS_COL_MM: f32 = 40.0;

/// One write instruction for the document, in page order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum DocOp {
    Title { text: String },
    Line { text: String },
    Gap { mm: f32 },
    Row { cells: Vec<Cell>, bold: bool },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cell {
    pub text: String,
    pub width_mm: f32,
}

impl DocOp {
    fn line(text: impl Into<String>) -> Self {
        DocOp::Line { text: text.into() }
    }

    fn row(subject: &str, marks: &str, bold: bool) -> Self {
        DocOp::Row {
            cells: vec![
                Cell {
                    text: subject.to_string(),
                    width_mm: SUBJECT_COL_MM,
                },
                Cell {
                    text: marks.to_string(),
                    width_mm: MARKS_COL_MM,
                },
            ],
            bold,
        }
    }

    fn height(&self) -> f32 {
        match self {
            DocOp::Title { .. } => TITLE_HEIGHT_MM,
            DocOp::Line { .. } | DocOp::Row { .. } => LINE_HEIGHT_MM,
            DocOp::Gap { mm } => *mm,
        }
    }

    fn texts(&self) -> Vec<&str> {
        match self {
            DocOp::Title { text } | DocOp::Line { text } => vec![text.as_str()],
            DocOp::Row { cells, .. } => cells.iter().map(|c| c.text.as_str()).collect(),
            DocOp::Gap { .. } => Vec::new(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Generate the dashboard before exporting.")]
    NoReport,

    #[error("The dashboard changed since it was displayed; regenerate before exporting.")]
    StaleReport { requested: String, current: String },

    #[error("Failed to save PDF: {reason}")]
    Write { path: PathBuf, reason: String },
}

impl ExportError {
    pub fn code(&self) -> &'static str {
        match self {
            ExportError::NoReport => "no_report",
            ExportError::StaleReport { .. } => "stale_report",
            ExportError::Write { .. } => "write_failed",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ExportError::NoReport => "No Report",
            ExportError::StaleReport { .. } => "Stale Report",
            ExportError::Write { .. } => "Save Error",
        }
    }
}

pub fn build_document(report: &Report, config: &DashboardConfig) -> Vec<DocOp> {
    let student = &report.student;
    let mut ops = vec![
        DocOp::Title {
            text: REPORT_TITLE.to_string(),
        },
        DocOp::Gap { mm: 4.0 },
        DocOp::line(format!("Name: {}", student.name)),
        DocOp::line(format!("Roll: {}", student.roll_number)),
        DocOp::line(format!("Class: {}", student.class_name)),
        DocOp::line(format!(
            "Attendance: {}",
            view::format_attendance(student.attendance_percent)
        )),
        DocOp::Gap { mm: 6.0 },
        DocOp::row("Subject", "Marks", true),
    ];
    for s in &report.subjects {
        ops.push(DocOp::row(&s.subject, &view::format_number(s.mark), false));
    }
    ops.push(DocOp::Gap { mm: 6.0 });
    ops.push(DocOp::line(format!(
        "Total: {}",
        view::format_total(report.total, report.max_total)
    )));
    ops.push(DocOp::line(format!(
        "Average: {}",
        view::format_percent(report.average)
    )));
    ops.push(DocOp::line(format!(
        "Grade: {}  (GPA: {})",
        report.grade.as_str(),
        view::format_gpa(report.gpa)
    )));
    ops.push(DocOp::line(format!(
        "Class Average: {}",
        view::format_percent(report.class_average)
    )));
    if config.show_generated_at {
        ops.push(DocOp::Gap { mm: 6.0 });
        ops.push(DocOp::line(format!("Generated: {}", report.generated_at)));
    }
    ops
}

/// Appends `.pdf` when the chosen path has no extension, like the save dialog's
/// default extension filter.
pub fn with_pdf_extension(path: &Path) -> PathBuf {
    if path.extension().is_some() {
        path.to_path_buf()
    } else {
        path.with_extension("pdf")
    }
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

fn draw_cell_border(layer: &PdfLayerReference, x: f32, top: f32, width: f32, height: f32) {
    let corners = [
        (x, top),
        (x + width, top),
        (x + width, top - height),
        (x, top - height),
    ];
    layer.add_line(Line {
        points: corners
            .iter()
            .map(|(px, py)| (Point::new(Mm(*px), Mm(*py)), false))
            .collect(),
        is_closed: true,
    });
}

fn draw_op(layer: &PdfLayerReference, fonts: &Fonts, op: &DocOp, left: f32, top: f32) {
    let baseline = top - op.height() + CELL_PAD_MM;
    match op {
        DocOp::Title { text } => {
            layer.use_text(text.as_str(), TITLE_FONT_PT, Mm(left), Mm(baseline), &fonts.bold);
        }
        DocOp::Line { text } => {
            layer.use_text(text.as_str(), BODY_FONT_PT, Mm(left), Mm(baseline), &fonts.regular);
        }
        DocOp::Gap { .. } => {}
        DocOp::Row { cells, bold } => {
            let font = if *bold { &fonts.bold } else { &fonts.regular };
            let mut x = left;
            for cell in cells {
                draw_cell_border(layer, x, top, cell.width_mm, LINE_HEIGHT_MM);
                layer.use_text(
                    cell.text.as_str(),
                    BODY_FONT_PT,
                    Mm(x + CELL_PAD_MM),
                    Mm(baseline),
                    font,
                );
                x += cell.width_mm;
            }
        }
    }
}

/// The built-in Helvetica faces are written with a single-byte Latin-1
/// encoding; the renderer drops anything outside it without complaint.
fn builtin_font_covers(c: char) -> bool {
    matches!(c as u32, 0x20..=0x7E | 0xA0..=0xFF)
}

/// Fails on the first character the built-in fonts cannot show, so a document
/// is never written with parts of a name missing.
pub fn check_encodable(ops: &[DocOp]) -> anyhow::Result<()> {
    for text in ops.iter().flat_map(DocOp::texts) {
        if let Some(c) = text.chars().find(|c| !builtin_font_covers(*c)) {
            return Err(anyhow!(
                "character {:?} in {:?} cannot be encoded with the built-in PDF font",
                c,
                text
            ));
        }
    }
    Ok(())
}

/// Renders `ops` onto A4 pages, breaking to a new page whenever the next op
/// would cross the bottom margin, then writes the file in one go.
pub fn write_pdf(ops: &[DocOp], path: &Path, margin_mm: f32) -> anyhow::Result<()> {
    check_encodable(ops)?;
    let (doc, page, layer) = PdfDocument::new(
        REPORT_TITLE,
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        "Layer 1",
    );
    let fonts = Fonts {
        regular: doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| anyhow!("failed to load Helvetica: {e:?}"))?,
        bold: doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| anyhow!("failed to load Helvetica-Bold: {e:?}"))?,
    };

    let mut current = doc.get_page(page).get_layer(layer);
    current.set_outline_thickness(0.5);
    let mut top = PAGE_HEIGHT_MM - margin_mm;
    let mut page_no = 1;
    for op in ops {
        if top - op.height() < margin_mm {
            page_no += 1;
            let (p, l) = doc.add_page(
                Mm(PAGE_WIDTH_MM),
                Mm(PAGE_HEIGHT_MM),
                format!("Layer {}", page_no),
            );
            current = doc.get_page(p).get_layer(l);
            current.set_outline_thickness(0.5);
            top = PAGE_HEIGHT_MM - margin_mm;
            if matches!(op, DocOp::Gap { .. }) {
                continue;
            }
        }
        draw_op(&current, &fonts, op, margin_mm, top);
        top -= op.height();
    }

    let bytes = doc
        .save_to_bytes()
        .map_err(|e| anyhow!("failed to render PDF: {e:?}"))?;
    std::fs::write(path, bytes)
        .with_context(|| format!("failed to write {}", path.to_string_lossy()))?;
    Ok(())
}

/// Writes `report` to `path` (with `.pdf` appended when it has no extension)
/// and returns the path actually written.
pub fn export_report(
    report: &Report,
    config: &DashboardConfig,
    path: &Path,
) -> Result<PathBuf, ExportError> {
    let out = with_pdf_extension(path);
    let ops = build_document(report, config);
    write_pdf(&ops, &out, config.margin_mm as f32).map_err(|e| ExportError::Write {
        path: out.clone(),
        reason: format!("{e:#}"),
    })?;
    Ok(out)
}
