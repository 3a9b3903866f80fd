//! Fixed-layout page assembly

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, StringFormat};

use crate::encoding::encode_win_ansi;
use crate::error::PdfError;
use crate::image::{deflated, ImageAsset};
use crate::metrics::{text_width_mm, FontStyle};
use crate::{LINE_HEIGHT_FACTOR, PT_PER_MM};

/// Page size in millimetres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width_mm: f32,
    pub height_mm: f32,
}

impl PageSize {
    pub fn a4() -> Self {
        Self {
            width_mm: 210.0,
            height_mm: 297.0,
        }
    }

    fn points(&self) -> (f32, f32) {
        (self.width_mm * PT_PER_MM, self.height_mm * PT_PER_MM)
    }
}

/// Rectangle in millimetres, origin at the page's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MmRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl MmRect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Grow by `by` on every side.
    pub fn inflate(&self, by: f32) -> Self {
        Self::new(
            self.x - by,
            self.y - by,
            self.width + 2.0 * by,
            self.height + 2.0 * by,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
}

/// Handle to an image registered with a [`PageBuilder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageRef(usize);

/// Collects drawing operations for one page and writes the document.
///
/// The output contains no timestamps or random identifiers, so the same
/// drawing calls always produce the same bytes.
pub struct PageBuilder {
    size: PageSize,
    operations: Vec<Operation>,
    images: Vec<ImageAsset>,
    opacities: Vec<f32>,
    font: FontStyle,
    font_size: f32,
    title: Option<String>,
}

impl PageBuilder {
    pub fn new(size: PageSize) -> Self {
        Self {
            size,
            operations: Vec::new(),
            images: Vec::new(),
            opacities: Vec::new(),
            font: FontStyle::Regular,
            font_size: 12.0,
            title: None,
        }
    }

    /// Document title stored in the info dictionary.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn register_image(&mut self, image: ImageAsset) -> ImageRef {
        self.images.push(image);
        ImageRef(self.images.len() - 1)
    }

    pub fn set_font(&mut self, style: FontStyle, size_pt: f32) {
        self.font = style;
        self.font_size = size_pt;
    }

    /// Distance between consecutive baselines at the current font size, in mm.
    pub fn line_height_mm(&self) -> f32 {
        self.font_size * LINE_HEIGHT_FACTOR / PT_PER_MM
    }

    /// Draw one line of text with its baseline at `y_mm`.
    pub fn text(&mut self, text: &str, x_mm: f32, y_mm: f32, align: Align) {
        let x_mm = match align {
            Align::Left => x_mm,
            Align::Center => x_mm - text_width_mm(text, self.font, self.font_size) / 2.0,
        };
        let (x, y) = self.to_user_space(x_mm, y_mm);

        self.operations.extend([
            Operation::new("BT", vec![]),
            Operation::new(
                "Tf",
                vec![
                    Object::Name(self.font.resource_name().to_vec()),
                    Object::Real(self.font_size),
                ],
            ),
            Operation::new("Td", vec![Object::Real(x), Object::Real(y)]),
            Operation::new(
                "Tj",
                vec![Object::String(encode_win_ansi(text), StringFormat::Literal)],
            ),
            Operation::new("ET", vec![]),
        ]);
    }

    /// Draw pre-wrapped lines starting with the first baseline at `y_mm`.
    pub fn text_lines<S: AsRef<str>>(&mut self, lines: &[S], x_mm: f32, y_mm: f32) {
        let step = self.line_height_mm();
        for (i, line) in lines.iter().enumerate() {
            self.text(line.as_ref(), x_mm, y_mm + step * i as f32, Align::Left);
        }
    }

    /// Place an image scaled to `rect`. `opacity` below 1.0 goes through an
    /// ExtGState that is scoped to this drawing only.
    pub fn image(&mut self, image: ImageRef, rect: MmRect, opacity: Option<f32>) {
        let (x, top) = self.to_user_space(rect.x, rect.y);
        let width = rect.width * PT_PER_MM;
        let height = rect.height * PT_PER_MM;

        self.operations.push(Operation::new("q", vec![]));
        if let Some(opacity) = opacity.filter(|o| *o < 1.0) {
            let name = self.opacity_state(opacity.clamp(0.0, 1.0));
            self.operations
                .push(Operation::new("gs", vec![Object::Name(name.into_bytes())]));
        }
        self.operations.extend([
            Operation::new(
                "cm",
                vec![
                    Object::Real(width),
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Real(height),
                    Object::Real(x),
                    Object::Real(top - height),
                ],
            ),
            Operation::new(
                "Do",
                vec![Object::Name(format!("Im{}", image.0).into_bytes())],
            ),
            Operation::new("Q", vec![]),
        ]);
    }

    fn opacity_state(&mut self, opacity: f32) -> String {
        let index = match self.opacities.iter().position(|o| *o == opacity) {
            Some(i) => i,
            None => {
                self.opacities.push(opacity);
                self.opacities.len() - 1
            }
        };
        format!("GS{}", index)
    }

    fn to_user_space(&self, x_mm: f32, y_mm: f32) -> (f32, f32) {
        let (_, page_height) = self.size.points();
        (x_mm * PT_PER_MM, page_height - y_mm * PT_PER_MM)
    }

    /// Write the page as a complete single-page PDF.
    pub fn finish(self) -> Result<Vec<u8>, PdfError> {
        let mut doc = Document::with_version("1.4");
        let pages_id = doc.new_object_id();

        let mut fonts = Dictionary::new();
        for style in [FontStyle::Regular, FontStyle::Bold] {
            let mut font = Dictionary::new();
            font.set("Type", Object::Name(b"Font".to_vec()));
            font.set("Subtype", Object::Name(b"Type1".to_vec()));
            font.set("BaseFont", Object::Name(style.base_font().to_vec()));
            font.set("Encoding", Object::Name(b"WinAnsiEncoding".to_vec()));
            let font_id = doc.add_object(font);
            fonts.set(style.resource_name(), Object::Reference(font_id));
        }

        let mut xobjects = Dictionary::new();
        for (i, image) in self.images.iter().enumerate() {
            let id = image.write_xobject(&mut doc)?;
            xobjects.set(format!("Im{}", i).into_bytes(), Object::Reference(id));
        }

        let mut gstates = Dictionary::new();
        for (i, opacity) in self.opacities.iter().enumerate() {
            let mut gs = Dictionary::new();
            gs.set("Type", Object::Name(b"ExtGState".to_vec()));
            gs.set("ca", Object::Real(*opacity));
            gs.set("CA", Object::Real(*opacity));
            gstates.set(format!("GS{}", i).into_bytes(), Object::Dictionary(gs));
        }

        let mut resources = Dictionary::new();
        resources.set("Font", Object::Dictionary(fonts));
        if !xobjects.is_empty() {
            resources.set("XObject", Object::Dictionary(xobjects));
        }
        if !gstates.is_empty() {
            resources.set("ExtGState", Object::Dictionary(gstates));
        }
        let resources_id = doc.add_object(resources);

        let content = Content {
            operations: self.operations,
        };
        let encoded = content
            .encode()
            .map_err(|e| PdfError::Encode(e.to_string()))?;
        let content_id = doc.add_object(deflated(Dictionary::new(), &encoded)?);

        let (width, height) = self.size.points();
        let mut page = Dictionary::new();
        page.set("Type", Object::Name(b"Page".to_vec()));
        page.set("Parent", Object::Reference(pages_id));
        page.set(
            "MediaBox",
            Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(width),
                Object::Real(height),
            ]),
        );
        page.set("Contents", Object::Reference(content_id));
        page.set("Resources", Object::Reference(resources_id));
        let page_id = doc.add_object(page);

        let mut pages = Dictionary::new();
        pages.set("Type", Object::Name(b"Pages".to_vec()));
        pages.set("Kids", Object::Array(vec![Object::Reference(page_id)]));
        pages.set("Count", Object::Integer(1));
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let mut catalog = Dictionary::new();
        catalog.set("Type", Object::Name(b"Catalog".to_vec()));
        catalog.set("Pages", Object::Reference(pages_id));
        let catalog_id = doc.add_object(catalog);
        doc.trailer.set("Root", Object::Reference(catalog_id));

        if let Some(title) = &self.title {
            let mut info = Dictionary::new();
            info.set(
                "Title",
                Object::String(encode_win_ansi(title), StringFormat::Literal),
            );
            info.set(
                "Producer",
                Object::String(b"cert-pdf".to_vec(), StringFormat::Literal),
            );
            let info_id = doc.add_object(info);
            doc.trailer.set("Info", Object::Reference(info_id));
        }

        let mut output = Vec::new();
        doc.save_to(&mut output)
            .map_err(|e| PdfError::Save(e.to_string()))?;
        Ok(output)
    }
}

/// Text drawn by `Tj` operators on the first page, in drawing order.
///
/// Strings are returned as WinAnsi bytes decoded through Latin-1, which is
/// exact for everything [`encode_win_ansi`] produces except the few
/// typographic punctuation slots.
pub fn page_text_runs(pdf: &[u8]) -> Result<Vec<String>, PdfError> {
    let doc = Document::load_mem(pdf).map_err(|e| PdfError::Parse(e.to_string()))?;
    let page_id = doc
        .get_pages()
        .get(&1)
        .copied()
        .ok_or_else(|| PdfError::Parse("document has no pages".to_string()))?;
    let raw = doc
        .get_page_content(page_id)
        .map_err(|e| PdfError::Parse(e.to_string()))?;
    let content = Content::decode(&raw).map_err(|e| PdfError::Parse(e.to_string()))?;

    Ok(content
        .operations
        .iter()
        .filter(|op| op.operator == "Tj")
        .filter_map(|op| match op.operands.first() {
            Some(Object::String(bytes, _)) => Some(bytes.iter().map(|&b| b as char).collect()),
            _ => None,
        })
        .collect())
}
