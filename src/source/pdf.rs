//! PDF page source backed by lopdf.
//!
//! Spans are recovered by walking each page's content stream and tracking
//! the text and graphics matrices, which is enough to get a font size, a
//! vertical position and a base font name per show-text operation.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use lopdf::content::Content;
use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId};
use unicode_normalization::UnicodeNormalization;

use crate::error::{Error, Result};
use crate::model::Span;

use super::PageSource;

/// PDF magic bytes: %PDF-
const PDF_MAGIC: &[u8] = b"%PDF-";
const VERSION_LEN: usize = 3; // e.g., "1.7"

/// US Letter height, used when no MediaBox can be resolved.
const DEFAULT_PAGE_HEIGHT: f32 = 792.0;

/// Ascender estimate as a fraction of font size; maps a baseline to a top edge.
const ASCENT_RATIO: f32 = 0.8;

/// A PDF document exposed as a [`PageSource`].
pub struct PdfSource {
    doc: LopdfDocument,
    pages: Vec<ObjectId>,
    name: String,
}

impl PdfSource {
    /// Open a PDF file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::from_bytes(&data, name)
    }

    /// Load a PDF from bytes; `name` is the base name used as title fallback.
    pub fn from_bytes(data: &[u8], name: impl Into<String>) -> Result<Self> {
        check_header(data)?;

        let doc = LopdfDocument::load_mem(data)?;
        if doc.is_encrypted() {
            return Err(Error::Encrypted);
        }

        let pages = doc.get_pages().into_values().collect();
        Ok(Self {
            doc,
            pages,
            name: name.into(),
        })
    }

    /// PDF version string.
    pub fn version(&self) -> String {
        self.doc.version.to_string()
    }

    fn page_id(&self, index: usize) -> Result<ObjectId> {
        self.pages
            .get(index)
            .copied()
            .ok_or(Error::PageOutOfRange(index, self.pages.len()))
    }

    /// Vertical extent of the MediaBox, walking up the page tree if needed.
    fn page_bounds(&self, page_id: ObjectId) -> VerticalBounds {
        self.doc
            .get_dictionary(page_id)
            .ok()
            .and_then(|dict| self.find_media_box(dict, 0))
            .map(|[_, lly, _, ury]| VerticalBounds {
                bottom: lly.min(ury),
                top: lly.max(ury),
            })
            .filter(|bounds| bounds.height() > 0.0)
            .unwrap_or_default()
    }

    fn find_media_box(&self, dict: &Dictionary, depth: usize) -> Option<[f32; 4]> {
        // Page trees are shallow; the bound only guards against cycles.
        if depth > 32 {
            return None;
        }

        if let Ok(obj) = dict.get(b"MediaBox") {
            let obj = self.resolve(obj);
            if let Ok(array) = obj.as_array() {
                let nums: Vec<f32> = array
                    .iter()
                    .filter_map(|o| number(self.resolve(o)))
                    .collect();
                if nums.len() >= 4 {
                    return Some([nums[0], nums[1], nums[2], nums[3]]);
                }
            }
        }

        let parent = dict.get(b"Parent").ok()?.as_reference().ok()?;
        let parent_dict = self.doc.get_dictionary(parent).ok()?;
        self.find_media_box(parent_dict, depth + 1)
    }

    fn resolve<'a>(&'a self, obj: &'a Object) -> &'a Object {
        match obj {
            Object::Reference(id) => self.doc.get_object(*id).unwrap_or(obj),
            _ => obj,
        }
    }

    /// Walk a page's content stream and collect positioned text runs.
    fn extract_runs(&self, page_id: ObjectId) -> Result<Vec<TextRun>> {
        let page_fonts = self
            .doc
            .get_page_fonts(page_id)
            .map_err(|e| Error::PdfParse(e.to_string()))?;

        let base_fonts: HashMap<Vec<u8>, String> = page_fonts
            .iter()
            .map(|(name, dict)| {
                let base_font = dict
                    .get(b"BaseFont")
                    .ok()
                    .and_then(|o| o.as_name().ok())
                    .map(|n| String::from_utf8_lossy(n).into_owned())
                    .unwrap_or_else(|| String::from_utf8_lossy(name).into_owned());
                (name.clone(), base_font)
            })
            .collect();

        let data = self
            .doc
            .get_page_content(page_id)
            .map_err(|e| Error::TextExtract(format!("content stream: {}", e)))?;
        let content = Content::decode(&data).map_err(|e| Error::PdfParse(e.to_string()))?;

        let mut state = TextState::default();
        let mut runs = Vec::new();

        for op in &content.operations {
            let operands = &op.operands;
            match op.operator.as_str() {
                "q" => state.save(),
                "Q" => state.restore(),
                "cm" => {
                    if let Some(m) = matrix_from(operands) {
                        state.ctm = m.concat(&state.ctm);
                    }
                }
                "BT" => state.begin_text(),
                "Tf" => {
                    if operands.len() >= 2 {
                        if let Object::Name(font) = &operands[0] {
                            state.font_key = font.clone();
                        }
                        state.font_size = number(&operands[1]).unwrap_or(12.0);
                    }
                }
                "TL" => {
                    if let Some(leading) = operands.first().and_then(number) {
                        state.leading = leading;
                    }
                }
                "Td" | "TD" => {
                    if operands.len() >= 2 {
                        let tx = number(&operands[0]).unwrap_or(0.0);
                        let ty = number(&operands[1]).unwrap_or(0.0);
                        if op.operator == "TD" {
                            state.leading = -ty;
                        }
                        state.move_line(tx, ty);
                    }
                }
                "Tm" => {
                    if let Some(m) = matrix_from(operands) {
                        state.line_matrix = m;
                        state.text_matrix = m;
                    }
                }
                "T*" => state.next_line(),
                "Tj" | "TJ" | "'" | "\"" => {
                    if matches!(op.operator.as_str(), "'" | "\"") {
                        state.next_line();
                    }
                    let text = match op.operator.as_str() {
                        "TJ" => match operands.first() {
                            Some(Object::Array(items)) => {
                                self.decode_array(&page_fonts, &state.font_key, items)
                            }
                            _ => String::new(),
                        },
                        "\"" => self.decode_operand(&page_fonts, &state.font_key, operands.get(2)),
                        _ => self.decode_operand(&page_fonts, &state.font_key, operands.first()),
                    };

                    if !text.trim().is_empty() {
                        let rendering = state.text_matrix.concat(&state.ctm);
                        let font_name = base_fonts
                            .get(&state.font_key)
                            .cloned()
                            .unwrap_or_default();
                        runs.push(TextRun {
                            text,
                            baseline: rendering.f,
                            size: state.font_size * rendering.vertical_scale(),
                            font_name,
                        });
                    }
                }
                _ => {}
            }
        }

        Ok(runs)
    }

    fn decode_operand(
        &self,
        fonts: &BTreeMap<Vec<u8>, &Dictionary>,
        font_key: &[u8],
        operand: Option<&Object>,
    ) -> String {
        match operand {
            Some(Object::String(bytes, _)) => self.decode_bytes(fonts, font_key, bytes),
            _ => String::new(),
        }
    }

    /// Decode a TJ array; large negative kerning adjustments become spaces.
    fn decode_array(
        &self,
        fonts: &BTreeMap<Vec<u8>, &Dictionary>,
        font_key: &[u8],
        items: &[Object],
    ) -> String {
        // 1/1000 text space units; roughly a word gap for most fonts.
        const SPACE_THRESHOLD: f32 = 200.0;

        let mut combined = String::new();
        for item in items {
            match item {
                Object::String(bytes, _) => {
                    combined.push_str(&self.decode_bytes(fonts, font_key, bytes));
                }
                other => {
                    let adjustment = number(other).map(|n| -n).unwrap_or(0.0);
                    let ends_blank = combined.is_empty()
                        || combined.ends_with(' ')
                        || combined.ends_with('\u{00A0}');
                    if adjustment > SPACE_THRESHOLD && !ends_blank {
                        if let Some(c) = combined.chars().last() {
                            if !is_spaceless_script_char(c) {
                                combined.push(' ');
                            }
                        }
                    }
                }
            }
        }
        combined
    }

    fn decode_bytes(
        &self,
        fonts: &BTreeMap<Vec<u8>, &Dictionary>,
        font_key: &[u8],
        bytes: &[u8],
    ) -> String {
        fonts
            .get(font_key)
            .and_then(|font| font.get_font_encoding(&self.doc).ok())
            .and_then(|encoding| LopdfDocument::decode_text(&encoding, bytes).ok())
            .unwrap_or_else(|| decode_text_simple(bytes))
    }

    fn info_dictionary(&self) -> Option<&Dictionary> {
        match self.doc.trailer.get(b"Info").ok()? {
            Object::Reference(id) => self.doc.get_dictionary(*id).ok(),
            Object::Dictionary(dict) => Some(dict),
            _ => None,
        }
    }
}

impl PageSource for PdfSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_spans(&self, index: usize) -> Result<Vec<Span>> {
        let page_id = self.page_id(index)?;
        let bounds = self.page_bounds(page_id);

        let spans = self
            .extract_runs(page_id)?
            .into_iter()
            .map(|run| {
                let top = run.baseline + run.size * ASCENT_RATIO;
                let y_ratio = bounds.ratio_from_top(top);
                let bold = is_bold_font(&run.font_name);
                Span::new(run.text.nfc().collect::<String>(), run.size, y_ratio, index)
                    .with_bold(bold)
            })
            .collect();

        Ok(spans)
    }

    fn page_text(&self, index: usize) -> Result<String> {
        self.page_id(index)?;
        let page_number = index as u32 + 1;
        self.doc
            .extract_text(&[page_number])
            .map(|text| text.nfc().collect())
            .map_err(|e| Error::TextExtract(format!("Page {}: {}", page_number, e)))
    }

    fn title(&self) -> Option<String> {
        let info = self.info_dictionary()?;
        match info.get(b"Title").ok()? {
            Object::String(bytes, _) => Some(decode_text_simple(bytes)),
            Object::Name(bytes) => Some(String::from_utf8_lossy(bytes).into_owned()),
            _ => None,
        }
    }
}

/// Check that `data` starts with a `%PDF-x.y` header.
pub fn is_pdf_bytes(data: &[u8]) -> bool {
    check_header(data).is_ok()
}

fn check_header(data: &[u8]) -> Result<()> {
    if data.len() < PDF_MAGIC.len() + VERSION_LEN || !data.starts_with(PDF_MAGIC) {
        return Err(Error::UnknownFormat);
    }

    let version = &data[PDF_MAGIC.len()..PDF_MAGIC.len() + VERSION_LEN];
    if !(version[0].is_ascii_digit() && version[1] == b'.' && version[2].is_ascii_digit()) {
        return Err(Error::UnsupportedVersion(
            String::from_utf8_lossy(version).into_owned(),
        ));
    }

    Ok(())
}

/// Lower and upper edges of a page's MediaBox.
#[derive(Debug, Clone, Copy, PartialEq)]
struct VerticalBounds {
    bottom: f32,
    top: f32,
}

impl VerticalBounds {
    fn height(&self) -> f32 {
        self.top - self.bottom
    }

    /// Distance of `y` below the top edge as a fraction of the page height.
    fn ratio_from_top(&self, y: f32) -> f32 {
        ((self.top - y) / self.height()).clamp(0.0, 1.0)
    }
}

impl Default for VerticalBounds {
    fn default() -> Self {
        Self {
            bottom: 0.0,
            top: DEFAULT_PAGE_HEIGHT,
        }
    }
}

/// A show-text operation resolved to user space.
#[derive(Debug, Clone)]
struct TextRun {
    text: String,
    baseline: f32,
    size: f32,
    font_name: String,
}

/// Affine matrix `[a b c d e f]` as used by PDF.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Matrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
}

impl Matrix {
    const IDENTITY: Matrix = Matrix {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    fn translation(tx: f32, ty: f32) -> Self {
        Matrix {
            e: tx,
            f: ty,
            ..Self::IDENTITY
        }
    }

    /// `self × other`
    fn concat(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    fn vertical_scale(&self) -> f32 {
        (self.c * self.c + self.d * self.d).sqrt()
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// The parts of the graphics state that `q` saves and `Q` restores.
#[derive(Debug, Clone)]
struct SavedState {
    ctm: Matrix,
    font_key: Vec<u8>,
    font_size: f32,
    leading: f32,
}

/// Text and graphics state tracked while walking a content stream.
#[derive(Debug, Clone)]
struct TextState {
    ctm: Matrix,
    saved: Vec<SavedState>,
    text_matrix: Matrix,
    line_matrix: Matrix,
    font_key: Vec<u8>,
    font_size: f32,
    leading: f32,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            ctm: Matrix::IDENTITY,
            saved: Vec::new(),
            text_matrix: Matrix::IDENTITY,
            line_matrix: Matrix::IDENTITY,
            font_key: Vec::new(),
            font_size: 12.0,
            leading: 0.0,
        }
    }
}

impl TextState {
    fn save(&mut self) {
        self.saved.push(SavedState {
            ctm: self.ctm,
            font_key: self.font_key.clone(),
            font_size: self.font_size,
            leading: self.leading,
        });
    }

    fn restore(&mut self) {
        if let Some(saved) = self.saved.pop() {
            self.ctm = saved.ctm;
            self.font_key = saved.font_key;
            self.font_size = saved.font_size;
            self.leading = saved.leading;
        }
    }

    fn begin_text(&mut self) {
        self.text_matrix = Matrix::IDENTITY;
        self.line_matrix = Matrix::IDENTITY;
    }

    fn move_line(&mut self, tx: f32, ty: f32) {
        self.line_matrix = Matrix::translation(tx, ty).concat(&self.line_matrix);
        self.text_matrix = self.line_matrix;
    }

    fn next_line(&mut self) {
        let leading = if self.leading != 0.0 {
            self.leading
        } else {
            self.font_size
        };
        self.move_line(0.0, -leading);
    }
}

fn matrix_from(operands: &[Object]) -> Option<Matrix> {
    if operands.len() < 6 {
        return None;
    }
    let n: Vec<f32> = operands.iter().take(6).filter_map(number).collect();
    if n.len() < 6 {
        return None;
    }
    Some(Matrix {
        a: n[0],
        b: n[1],
        c: n[2],
        d: n[3],
        e: n[4],
        f: n[5],
    })
}

fn number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Font-weight flag inferred from the base font name.
fn is_bold_font(font_name: &str) -> bool {
    let lower = font_name.to_lowercase();
    ["bold", "black", "heavy", "semibold", "demi"]
        .iter()
        .any(|marker| lower.contains(marker))
}

/// Scripts that do not separate words with spaces (Chinese, Japanese kana).
fn is_spaceless_script_char(c: char) -> bool {
    matches!(c as u32,
        0x4E00..=0x9FFF
        | 0x3400..=0x4DBF
        | 0x20000..=0x2EBEF
        | 0x3040..=0x309F
        | 0x30A0..=0x30FF
        | 0x3000..=0x303F)
}

/// Decode PDF string bytes without a font encoding: UTF-16BE with BOM,
/// then UTF-8, then Latin-1.
fn decode_text_simple(bytes: &[u8]) -> String {
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = rest
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }

    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}
