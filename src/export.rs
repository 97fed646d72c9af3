use printpdf::{BuiltinFont, Mm, PdfDocument};
use std::io::BufWriter;
use thiserror::Error;

use crate::models::{ContentBag, ContentType};
use crate::presentation::panel_for;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("PDF error: {0}")] Pdf(String),
}

const WRAP_AT: usize = 95;
const TOP: f32 = 275.0;
const BOTTOM: f32 = 20.0;
const LINE: f32 = 5.0;

/// Lines of one content block, headings included, in panel order.
fn block_lines(kind: ContentType, bag: &ContentBag) -> Vec<String> {
    let Some(payload) = bag.get(kind) else { return Vec::new() };
    let panel = panel_for(kind, payload);
    let mut lines = vec![panel.title.clone()];
    for section in &panel.sections {
        lines.push(format!("{}:", section.heading));
        lines.extend(section.body.to_plain_text().lines().map(str::to_string));
        lines.push(String::new());
    }
    lines
}

/// Plain-text export of every content type in `order` that has a result.
pub fn to_text(bag: &ContentBag, order: &[ContentType]) -> String {
    order
        .iter()
        .filter(|t| bag.contains(**t))
        .map(|t| block_lines(*t, bag).join("\n"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Summary page plus one page per content type; long lines are wrapped.
pub fn to_pdf(product_name: &str, bag: &ContentBag, order: &[ContentType]) -> Result<Vec<u8>, ExportError> {
    let (doc, page, layer) = PdfDocument::new(
        format!("Product content: {}", truncate(product_name, 48)),
        Mm(210.0),
        Mm(297.0),
        "Layer 1",
    );
    let font = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(|e| ExportError::Pdf(e.to_string()))?;
    let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold).map_err(|e| ExportError::Pdf(e.to_string()))?;

    let summary = doc.get_page(page).get_layer(layer);
    summary.use_text("Generated Product Content", 20.0, Mm(15.0), Mm(TOP), &bold);
    summary.use_text(truncate(product_name, 140), 11.0, Mm(15.0), Mm(TOP - 15.0), &font);
    let included: Vec<ContentType> = order.iter().copied().filter(|t| bag.contains(*t)).collect();
    let listing = included.iter().map(|t| t.label()).collect::<Vec<_>>().join(", ");
    summary.use_text(format!("Contents: {}", listing), 10.0, Mm(15.0), Mm(TOP - 27.0), &font);

    for kind in included {
        let (page, layer) = doc.add_page(Mm(210.0), Mm(297.0), kind.label());
        let mut current = doc.get_page(page).get_layer(layer);
        let mut lines = block_lines(kind, bag).into_iter();
        if let Some(title) = lines.next() {
            current.use_text(title, 16.0, Mm(15.0), Mm(TOP), &bold);
        }
        let mut y = TOP - 12.0;
        for line in lines.flat_map(|l| wrap(&l, WRAP_AT)) {
            if y < BOTTOM {
                let (page, layer) = doc.add_page(Mm(210.0), Mm(297.0), kind.label());
                current = doc.get_page(page).get_layer(layer);
                y = TOP;
            }
            current.use_text(line, 10.0, Mm(15.0), Mm(y), &font);
            y -= LINE;
        }
    }

    let mut buf: Vec<u8> = Vec::new();
    {
        let mut writer = BufWriter::new(&mut buf);
        doc.save(&mut writer).map_err(|e| ExportError::Pdf(e.to_string()))?;
    }
    Ok(buf)
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max { s.to_string() } else { format!("{}…", s.chars().take(max).collect::<String>()) }
}

/// Greedy word wrap; words longer than `width` are split.
fn wrap(line: &str, width: usize) -> Vec<String> {
    if line.chars().count() <= width {
        return vec![line.to_string()];
    }
    let mut out = Vec::new();
    let mut current = String::new();
    for word in line.split_whitespace() {
        let mut word: String = word.to_string();
        while word.chars().count() > width {
            if !current.is_empty() {
                out.push(std::mem::take(&mut current));
            }
            let head: String = word.chars().take(width).collect();
            word = word.chars().skip(width).collect();
            out.push(head);
        }
        if !current.is_empty() && current.chars().count() + 1 + word.chars().count() > width {
            out.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&word);
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}
