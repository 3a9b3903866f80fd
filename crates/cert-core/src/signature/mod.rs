//! Signature capture surface
//!
//! Strokes arrive in the surface's own coordinate space (CSS pixels from its
//! top-left corner) and are drawn into an RGBA raster at twice that density.
//! Ending a stroke snapshots the raster as PNG; that snapshot is the signature
//! embedded in the certificate.

pub mod input;
mod raster;

use serde::{Deserialize, Serialize};

use crate::error::CertError;
use raster::Raster;

/// Device pixels per surface unit.
pub const PIXEL_RATIO: f32 = 2.0;

/// Pen width in surface units.
pub const LINE_WIDTH: f32 = 2.0;

/// Largest accepted surface side, in surface units.
pub const MAX_SURFACE: f32 = 2048.0;

/// A point relative to the surface origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfacePoint {
    pub x: f32,
    pub y: f32,
}

impl SurfacePoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// The drawing capability driven by [`input::InputAdapter`].
pub trait SignatureCapture {
    /// Start a new stroke at `point`.
    fn begin_stroke(&mut self, point: SurfacePoint);

    /// Extend the active stroke to `point`. Ignored when no stroke is active.
    fn capture_stroke(&mut self, point: SurfacePoint);

    /// Finish the active stroke and snapshot the surface.
    fn end_stroke(&mut self);
}

/// A finalized signature snapshot, PNG encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureImage {
    png: Vec<u8>,
    width: u32,
    height: u32,
}

impl SignatureImage {
    /// Wrap an externally captured PNG signature. The image must decode and
    /// carry at least one visible, non-white pixel.
    pub fn from_png(png: Vec<u8>) -> Result<Self, CertError> {
        match inked_size(&png) {
            Ok(Some((width, height))) => Ok(Self { png, width, height }),
            Ok(None) => {
                tracing::warn!("Signature image has no visible ink");
                Err(CertError::MissingSignature)
            }
            Err(e) => {
                tracing::warn!("Unreadable signature image: {}", e);
                Err(CertError::MissingSignature)
            }
        }
    }

    pub fn png(&self) -> &[u8] {
        &self.png
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.png.is_empty() || self.width == 0 || self.height == 0
    }
}

/// Decode `png` and return its size if any pixel is inked: not fully
/// transparent and not pure white.
fn inked_size(png: &[u8]) -> Result<Option<(u32, u32)>, png::DecodingError> {
    let mut decoder = png::Decoder::new(png);
    decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);
    let mut reader = decoder.read_info()?;
    let mut buf = vec![0; reader.output_buffer_size()];
    let frame = reader.next_frame(&mut buf)?;
    let data = &buf[..frame.buffer_size()];

    let channels = frame.color_type.samples();
    let has_alpha = matches!(
        frame.color_type,
        png::ColorType::Rgba | png::ColorType::GrayscaleAlpha
    );
    let inked = data.chunks_exact(channels).any(|px| {
        let (color, visible) = if has_alpha {
            (&px[..channels - 1], px[channels - 1] > 0)
        } else {
            (px, true)
        };
        visible && color.iter().any(|&c| c < u8::MAX)
    });

    Ok((inked && frame.width > 0 && frame.height > 0).then_some((frame.width, frame.height)))
}

/// Reject surface sizes that are not finite, not positive, or larger than
/// [`MAX_SURFACE`].
pub fn check_surface(width: f32, height: f32) -> Result<(), CertError> {
    let valid = |v: f32| v.is_finite() && v > 0.0 && v <= MAX_SURFACE;
    if valid(width) && valid(height) {
        Ok(())
    } else {
        Err(CertError::InvalidSurface { width, height })
    }
}

/// Hand-drawn signature surface for one composition session.
#[derive(Debug, Clone)]
pub struct SignaturePad {
    raster: Raster,
    strokes: Vec<Vec<SurfacePoint>>,
    drawing: bool,
    snapshot: Option<SignatureImage>,
    revision: u64,
}

impl SignaturePad {
    /// A blank surface of `width` x `height` surface units.
    pub fn new(width: f32, height: f32) -> Result<Self, CertError> {
        check_surface(width, height)?;
        let px = |v: f32| (v.max(1.0) * PIXEL_RATIO).round() as u32;
        Ok(Self {
            raster: Raster::new(px(width), px(height)),
            strokes: Vec::new(),
            drawing: false,
            snapshot: None,
            revision: 0,
        })
    }

    pub fn is_drawing(&self) -> bool {
        self.drawing
    }

    pub fn strokes(&self) -> &[Vec<SurfacePoint>] {
        &self.strokes
    }

    /// The last finalized snapshot, if anything has been drawn.
    pub fn signature(&self) -> Option<&SignatureImage> {
        self.snapshot.as_ref()
    }

    /// Bumped whenever the finalized snapshot changes.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Drop all strokes and the snapshot.
    pub fn clear_signature(&mut self) {
        self.raster.clear();
        self.strokes.clear();
        self.drawing = false;
        if self.snapshot.take().is_some() {
            self.revision += 1;
        }
    }

    fn snapshot_raster(&mut self) {
        if !self.raster.has_ink() {
            return;
        }
        match self.raster.encode_png() {
            Ok(png) => {
                self.snapshot = Some(SignatureImage {
                    png,
                    width: self.raster.width(),
                    height: self.raster.height(),
                });
                self.revision += 1;
            }
            Err(e) => tracing::error!("Failed to snapshot signature surface: {}", e),
        }
    }
}

impl SignatureCapture for SignaturePad {
    fn begin_stroke(&mut self, point: SurfacePoint) {
        self.strokes.push(vec![point]);
        self.drawing = true;
    }

    fn capture_stroke(&mut self, point: SurfacePoint) {
        if !self.drawing {
            return;
        }
        let Some(stroke) = self.strokes.last_mut() else {
            return;
        };
        if let Some(prev) = stroke.last().copied() {
            self.raster.draw_segment(
                (prev.x * PIXEL_RATIO, prev.y * PIXEL_RATIO),
                (point.x * PIXEL_RATIO, point.y * PIXEL_RATIO),
                LINE_WIDTH * PIXEL_RATIO,
            );
        }
        stroke.push(point);
    }

    fn end_stroke(&mut self) {
        if !self.drawing {
            return;
        }
        self.drawing = false;
        self.snapshot_raster();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const PNG_MAGIC: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

    fn encode(width: u32, height: u32, color: png::ColorType, data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        let mut encoder = png::Encoder::new(&mut out, width, height);
        encoder.set_color(color);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header().unwrap();
        writer.write_image_data(data).unwrap();
        writer.finish().unwrap();
        out
    }

    fn scribble(pad: &mut SignaturePad) {
        pad.begin_stroke(SurfacePoint::new(10.0, 10.0));
        pad.capture_stroke(SurfacePoint::new(60.0, 40.0));
        pad.capture_stroke(SurfacePoint::new(120.0, 20.0));
        pad.end_stroke();
    }

    #[test]
    fn test_blank_pad_has_no_signature() {
        let pad = SignaturePad::new(300.0, 128.0).unwrap();
        assert!(pad.signature().is_none());
    }

    #[test]
    fn test_stroke_produces_png_snapshot() {
        let mut pad = SignaturePad::new(300.0, 128.0).unwrap();
        scribble(&mut pad);
        let sig = pad.signature().unwrap();
        assert!(sig.png().starts_with(&PNG_MAGIC));
        assert_eq!((sig.width(), sig.height()), (600, 256));
        assert!(!sig.is_empty());
    }

    #[test]
    fn test_tap_without_movement_leaves_no_signature() {
        let mut pad = SignaturePad::new(300.0, 128.0).unwrap();
        pad.begin_stroke(SurfacePoint::new(50.0, 50.0));
        pad.end_stroke();
        assert!(pad.signature().is_none());
    }

    #[test]
    fn test_capture_without_active_stroke_is_ignored() {
        let mut pad = SignaturePad::new(300.0, 128.0).unwrap();
        pad.capture_stroke(SurfacePoint::new(5.0, 5.0));
        pad.end_stroke();
        assert!(pad.strokes().is_empty());
        assert!(pad.signature().is_none());
    }

    #[test]
    fn test_capture_after_end_is_ignored() {
        let mut pad = SignaturePad::new(300.0, 128.0).unwrap();
        scribble(&mut pad);
        let before = pad.strokes()[0].len();
        pad.capture_stroke(SurfacePoint::new(200.0, 100.0));
        assert_eq!(pad.strokes()[0].len(), before);
    }

    #[test]
    fn test_clear_is_idempotent() {
        let mut pad = SignaturePad::new(300.0, 128.0).unwrap();
        scribble(&mut pad);
        pad.clear_signature();
        assert!(pad.signature().is_none());
        assert!(pad.strokes().is_empty());
        let revision = pad.revision();
        pad.clear_signature();
        assert_eq!(pad.revision(), revision);
    }

    #[test]
    fn test_external_png_requires_magic() {
        assert!(matches!(
            SignatureImage::from_png(vec![]),
            Err(CertError::MissingSignature)
        ));
        assert!(SignatureImage::from_png(b"not a png at all, really no".to_vec()).is_err());
    }

    #[test]
    fn test_external_png_without_ink_is_missing() {
        let transparent = encode(600, 256, png::ColorType::Rgba, &vec![0; 600 * 256 * 4]);
        assert!(matches!(
            SignatureImage::from_png(transparent),
            Err(CertError::MissingSignature)
        ));

        let white = encode(40, 20, png::ColorType::Rgb, &vec![255; 40 * 20 * 3]);
        assert!(matches!(
            SignatureImage::from_png(white),
            Err(CertError::MissingSignature)
        ));
    }

    #[test]
    fn test_external_png_with_one_inked_pixel() {
        let mut pixels = vec![0; 8 * 8 * 4];
        pixels[4 * 9 + 3] = 128;
        let sig = SignatureImage::from_png(encode(8, 8, png::ColorType::Rgba, &pixels)).unwrap();
        assert_eq!((sig.width(), sig.height()), (8, 8));
    }

    #[test]
    fn test_truncated_png_is_missing() {
        let mut pad = SignaturePad::new(100.0, 50.0).unwrap();
        scribble(&mut pad);
        let png = pad.signature().unwrap().png()[..40].to_vec();
        assert!(matches!(
            SignatureImage::from_png(png),
            Err(CertError::MissingSignature)
        ));
    }

    #[test]
    fn test_surface_size_is_bounded() {
        for (w, h) in [
            (f32::INFINITY, 128.0),
            (300.0, f32::NAN),
            (0.0, 128.0),
            (-5.0, 128.0),
            (1e40_f64 as f32, 128.0),
            (MAX_SURFACE + 1.0, 128.0),
        ] {
            assert!(
                matches!(SignaturePad::new(w, h), Err(CertError::InvalidSurface { .. })),
                "{}x{} was accepted",
                w,
                h
            );
        }
        assert!(SignaturePad::new(MAX_SURFACE, 10.0).is_ok());
    }

    #[test]
    fn test_end_without_active_stroke_keeps_revision() {
        let mut pad = SignaturePad::new(300.0, 128.0).unwrap();
        scribble(&mut pad);
        assert!(!pad.is_drawing());
        let revision = pad.revision();
        pad.end_stroke();
        assert_eq!(pad.revision(), revision);
        assert!(pad.signature().is_some());
    }

    #[test]
    fn test_external_png_round_trips_snapshot() {
        let mut pad = SignaturePad::new(100.0, 50.0).unwrap();
        scribble(&mut pad);
        let png = pad.signature().unwrap().png().to_vec();
        let sig = SignatureImage::from_png(png).unwrap();
        assert_eq!((sig.width(), sig.height()), (200, 100));
    }

    proptest! {
        #[test]
        fn strokes_inside_surface_always_ink(
            x0 in 5.0f32..295.0, y0 in 5.0f32..123.0,
            x1 in 5.0f32..295.0, y1 in 5.0f32..123.0,
        ) {
            let mut pad = SignaturePad::new(300.0, 128.0).unwrap();
            pad.begin_stroke(SurfacePoint::new(x0, y0));
            pad.capture_stroke(SurfacePoint::new(x1, y1));
            pad.end_stroke();
            prop_assert!(pad.signature().is_some());
        }
    }
}
