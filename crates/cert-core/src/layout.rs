//! Fixed A4 certificate layout
//!
//! Coordinates are millimetres from the top-left corner. Text positions are
//! baselines.

use cert_pdf::{wrap_text, Align, FontStyle, ImageAsset, MmRect, PageBuilder, PageSize, PdfError};

use crate::text::CertificateText;

pub const PAGE_CENTER_X: f32 = 105.0;
pub const MARGIN_X: f32 = 20.0;
pub const TEXT_WIDTH: f32 = 170.0;

pub const HEADER_Y: [f32; 5] = [20.0, 25.0, 30.0, 35.0, 40.0];
pub const TITLE_Y: f32 = 60.0;
pub const SALUTATION_Y: f32 = 80.0;
pub const CERTIFICATION_Y: f32 = 100.0;
pub const PURPOSE_Y: f32 = 120.0;
pub const ISSUANCE_Y: f32 = 140.0;
pub const CERTIFIED_BY_Y: f32 = 165.0;
pub const SIGNATORY_NAME_Y: f32 = 200.0;
pub const SIGNATORY_TITLE_Y: f32 = 205.0;

pub const HEADER_SIZE: f32 = 10.0;
pub const TITLE_SIZE: f32 = 16.0;
pub const BODY_SIZE: f32 = 12.0;

pub const WATERMARK: MmRect = MmRect {
    x: 55.0,
    y: 80.0,
    width: 100.0,
    height: 100.0,
};

/// Outset and opacity of each watermark copy, drawn in order. Larger, fainter
/// copies underneath approximate a soft edge.
pub const WATERMARK_LAYERS: [(f32, f32); 3] = [(2.0, 0.02), (1.0, 0.03), (0.0, 0.05)];

pub const SEAL: MmRect = MmRect {
    x: 150.0,
    y: 20.0,
    width: 40.0,
    height: 40.0,
};

pub const SIGNATURE: MmRect = MmRect {
    x: 20.0,
    y: 170.0,
    width: 50.0,
    height: 25.0,
};

/// Lay the certificate out on one page and write it.
pub fn render_page(
    text: &CertificateText,
    emblem: &ImageAsset,
    seal: &ImageAsset,
    signature: &ImageAsset,
) -> Result<Vec<u8>, PdfError> {
    let mut page = PageBuilder::new(PageSize::a4()).with_title("Barangay Certification");

    let emblem = page.register_image(emblem.clone());
    for (outset, opacity) in WATERMARK_LAYERS {
        page.image(emblem, WATERMARK.inflate(outset), Some(opacity));
    }

    let seal = page.register_image(seal.clone());
    page.image(seal, SEAL, None);

    page.set_font(FontStyle::Regular, HEADER_SIZE);
    for (line, y) in text.header.iter().zip(HEADER_Y) {
        page.text(line, PAGE_CENTER_X, y, Align::Center);
    }

    page.set_font(FontStyle::Bold, TITLE_SIZE);
    page.text(&text.title, PAGE_CENTER_X, TITLE_Y, Align::Center);

    page.set_font(FontStyle::Regular, BODY_SIZE);
    page.text(&text.salutation, MARGIN_X, SALUTATION_Y, Align::Left);

    let certification = wrap_text(&text.certification, FontStyle::Regular, BODY_SIZE, TEXT_WIDTH);
    page.text_lines(&certification, MARGIN_X, CERTIFICATION_Y);

    let purpose = wrap_text(&text.purpose, FontStyle::Regular, BODY_SIZE, TEXT_WIDTH);
    page.text_lines(&purpose, MARGIN_X, PURPOSE_Y);

    page.text(&text.issuance, MARGIN_X, ISSUANCE_Y, Align::Left);

    let signature = page.register_image(signature.clone());
    page.image(signature, SIGNATURE, None);

    page.text(&text.certified_by, MARGIN_X, CERTIFIED_BY_Y, Align::Left);
    page.set_font(FontStyle::Bold, BODY_SIZE);
    page.text(&text.signatory_name, MARGIN_X, SIGNATORY_NAME_Y, Align::Left);
    page.set_font(FontStyle::Regular, BODY_SIZE);
    page.text(&text.signatory_title, MARGIN_X, SIGNATORY_TITLE_Y, Align::Left);

    page.finish()
}
