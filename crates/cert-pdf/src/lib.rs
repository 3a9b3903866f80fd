//! Single-page PDF writer for fixed-layout certificates
//!
//! Positions are given in millimetres from the top-left corner of the page,
//! the convention used by browser-side PDF generators, and converted to PDF
//! user space (points, bottom-left origin) when the page is written.

pub mod encoding;
pub mod error;
pub mod image;
pub mod metrics;
pub mod page;

pub use error::PdfError;
pub use image::ImageAsset;
pub use metrics::{text_width_mm, wrap_text, FontStyle};
pub use page::{page_text_runs, Align, ImageRef, MmRect, PageBuilder, PageSize};

/// Points per millimetre.
pub const PT_PER_MM: f32 = 72.0 / 25.4;

/// Line height as a multiple of the font size.
pub const LINE_HEIGHT_FACTOR: f32 = 1.15;
