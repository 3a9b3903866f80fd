//! Raster images embedded as PDF image XObjects
//!
//! JPEG data is passed through unchanged with `DCTDecode`. PNG data is decoded
//! to 8-bit samples and stored with `FlateDecode`; an alpha channel becomes a
//! soft mask so transparent signature pixels stay transparent on the page.

use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

use crate::error::PdfError;

const PNG_MAGIC: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

#[derive(Debug, Clone, PartialEq)]
enum Samples {
    Dct { data: Vec<u8>, components: u8 },
    Raw { color: Vec<u8>, gray: bool, alpha: Option<Vec<u8>> },
}

/// A decoded image ready to be placed on a page.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageAsset {
    width: u32,
    height: u32,
    samples: Samples,
}

impl ImageAsset {
    /// Detect the format from magic bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PdfError> {
        if bytes.starts_with(&PNG_MAGIC) {
            Self::from_png(bytes)
        } else if bytes.starts_with(&[0xFF, 0xD8]) {
            Self::from_jpeg(bytes)
        } else {
            Err(PdfError::UnsupportedImage)
        }
    }

    pub fn from_jpeg(bytes: &[u8]) -> Result<Self, PdfError> {
        let (width, height, components) = jpeg_frame(bytes)?;
        Ok(Self {
            width,
            height,
            samples: Samples::Dct {
                data: bytes.to_vec(),
                components,
            },
        })
    }

    pub fn from_png(bytes: &[u8]) -> Result<Self, PdfError> {
        let mut decoder = png::Decoder::new(bytes);
        decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);
        let mut reader = decoder
            .read_info()
            .map_err(|e| PdfError::InvalidImage(format!("PNG header: {}", e)))?;
        let mut buf = vec![0; reader.output_buffer_size()];
        let frame = reader
            .next_frame(&mut buf)
            .map_err(|e| PdfError::InvalidImage(format!("PNG data: {}", e)))?;
        let data = &buf[..frame.buffer_size()];

        let (color, gray, alpha) = match frame.color_type {
            png::ColorType::Rgb => (data.to_vec(), false, None),
            png::ColorType::Grayscale => (data.to_vec(), true, None),
            png::ColorType::Rgba => {
                let (color, alpha) = split_alpha(data, 4);
                (color, false, alpha)
            }
            png::ColorType::GrayscaleAlpha => {
                let (color, alpha) = split_alpha(data, 2);
                (color, true, alpha)
            }
            png::ColorType::Indexed => {
                return Err(PdfError::InvalidImage(
                    "indexed PNG was not expanded".to_string(),
                ))
            }
        };

        Ok(Self {
            width: frame.width,
            height: frame.height,
            samples: Samples::Raw { color, gray, alpha },
        })
    }

    /// Build an image from straight (non-premultiplied) RGBA pixels.
    pub fn from_rgba(width: u32, height: u32, rgba: &[u8]) -> Result<Self, PdfError> {
        let expected = width as usize * height as usize * 4;
        if width == 0 || height == 0 || rgba.len() != expected {
            return Err(PdfError::InvalidImage(format!(
                "expected {} RGBA bytes for {}x{}, got {}",
                expected,
                width,
                height,
                rgba.len()
            )));
        }
        let (color, alpha) = split_alpha(rgba, 4);
        Ok(Self {
            width,
            height,
            samples: Samples::Raw {
                color,
                gray: false,
                alpha,
            },
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn has_alpha(&self) -> bool {
        matches!(&self.samples, Samples::Raw { alpha: Some(_), .. })
    }

    /// Add this image (and its soft mask, if any) to `doc`.
    pub(crate) fn write_xobject(&self, doc: &mut Document) -> Result<ObjectId, PdfError> {
        match &self.samples {
            Samples::Dct { data, components } => {
                let mut dict = self.image_dict(match components {
                    1 => b"DeviceGray".as_slice(),
                    4 => b"DeviceCMYK".as_slice(),
                    _ => b"DeviceRGB".as_slice(),
                });
                dict.set("Filter", Object::Name(b"DCTDecode".to_vec()));
                let stream = Stream::new(dict, data.clone()).with_compression(false);
                Ok(doc.add_object(stream))
            }
            Samples::Raw { color, gray, alpha } => {
                let color_space: &[u8] = if *gray { b"DeviceGray" } else { b"DeviceRGB" };
                let mut dict = self.image_dict(color_space);
                if let Some(alpha) = alpha {
                    let mask_id = doc.add_object(deflated(self.image_dict(b"DeviceGray"), alpha)?);
                    dict.set("SMask", Object::Reference(mask_id));
                }
                Ok(doc.add_object(deflated(dict, color)?))
            }
        }
    }

    fn image_dict(&self, color_space: &[u8]) -> Dictionary {
        let mut dict = Dictionary::new();
        dict.set("Type", Object::Name(b"XObject".to_vec()));
        dict.set("Subtype", Object::Name(b"Image".to_vec()));
        dict.set("Width", Object::Integer(self.width as i64));
        dict.set("Height", Object::Integer(self.height as i64));
        dict.set("ColorSpace", Object::Name(color_space.to_vec()));
        dict.set("BitsPerComponent", Object::Integer(8));
        dict
    }
}

/// Separate interleaved samples into color and alpha planes. The alpha plane is
/// dropped when every pixel is opaque.
fn split_alpha(data: &[u8], channels: usize) -> (Vec<u8>, Option<Vec<u8>>) {
    let pixels = data.len() / channels;
    let mut color = Vec::with_capacity(pixels * (channels - 1));
    let mut alpha = Vec::with_capacity(pixels);
    for px in data.chunks_exact(channels) {
        color.extend_from_slice(&px[..channels - 1]);
        alpha.push(px[channels - 1]);
    }
    let alpha = if alpha.iter().all(|&a| a == 0xFF) {
        None
    } else {
        Some(alpha)
    };
    (color, alpha)
}

pub(crate) fn deflated(mut dict: Dictionary, data: &[u8]) -> Result<Stream, PdfError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(data)
        .map_err(|e| PdfError::Encode(e.to_string()))?;
    let compressed = encoder
        .finish()
        .map_err(|e| PdfError::Encode(e.to_string()))?;
    dict.set("Filter", Object::Name(b"FlateDecode".to_vec()));
    Ok(Stream::new(dict, compressed).with_compression(false))
}

/// Read width, height and component count from the first SOF segment.
fn jpeg_frame(bytes: &[u8]) -> Result<(u32, u32, u8), PdfError> {
    let invalid = |msg: &str| PdfError::InvalidImage(format!("JPEG: {}", msg));

    if !bytes.starts_with(&[0xFF, 0xD8]) {
        return Err(invalid("missing SOI marker"));
    }

    let mut i = 2;
    while i + 1 < bytes.len() {
        if bytes[i] != 0xFF {
            return Err(invalid("expected marker"));
        }
        let marker = bytes[i + 1];
        if marker == 0xFF {
            // Fill byte
            i += 1;
            continue;
        }
        i += 2;
        if marker == 0x01 || (0xD0..=0xD9).contains(&marker) {
            continue;
        }
        if i + 1 >= bytes.len() {
            break;
        }
        let len = u16::from_be_bytes([bytes[i], bytes[i + 1]]) as usize;
        if len < 2 {
            return Err(invalid("bad segment length"));
        }
        let is_sof = (0xC0..=0xCF).contains(&marker) && !matches!(marker, 0xC4 | 0xC8 | 0xCC);
        if is_sof {
            if i + 7 >= bytes.len() {
                break;
            }
            let height = u16::from_be_bytes([bytes[i + 3], bytes[i + 4]]) as u32;
            let width = u16::from_be_bytes([bytes[i + 5], bytes[i + 6]]) as u32;
            let components = bytes[i + 7];
            if width == 0 || height == 0 {
                return Err(invalid("zero dimension"));
            }
            return Ok((width, height, components));
        }
        i += len;
    }

    Err(invalid("no frame header"))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Encode an RGBA buffer as PNG.
    pub(crate) fn png_bytes(width: u32, height: u32, rgba: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut out, width, height);
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header().unwrap();
            writer.write_image_data(rgba).unwrap();
        }
        out
    }

    /// Smallest structurally valid JPEG header: SOI, SOF0, EOI.
    pub(crate) fn jpeg_stub(width: u16, height: u16) -> Vec<u8> {
        let mut data = vec![0xFF, 0xD8];
        // APP0 segment to make sure non-SOF segments are skipped
        data.extend_from_slice(&[0xFF, 0xE0, 0x00, 0x04, 0x00, 0x00]);
        data.extend_from_slice(&[0xFF, 0xC0, 0x00, 0x11, 0x08]);
        data.extend_from_slice(&height.to_be_bytes());
        data.extend_from_slice(&width.to_be_bytes());
        data.extend_from_slice(&[0x03, 1, 0x22, 0, 2, 0x11, 1, 3, 0x11, 1]);
        data.extend_from_slice(&[0xFF, 0xD9]);
        data
    }

    #[test]
    fn test_jpeg_dimensions() {
        let asset = ImageAsset::from_bytes(&jpeg_stub(640, 480)).unwrap();
        assert_eq!((asset.width(), asset.height()), (640, 480));
        assert!(!asset.has_alpha());
    }

    #[test]
    fn test_truncated_jpeg_is_rejected() {
        let err = ImageAsset::from_jpeg(&[0xFF, 0xD8, 0xFF]).unwrap_err();
        assert!(matches!(err, PdfError::InvalidImage(_)));
    }

    #[test]
    fn test_png_with_transparency_keeps_mask() {
        let mut rgba = vec![0u8; 4 * 4 * 4];
        rgba[3] = 0xFF; // one opaque black pixel
        let asset = ImageAsset::from_bytes(&png_bytes(4, 4, &rgba)).unwrap();
        assert_eq!((asset.width(), asset.height()), (4, 4));
        assert!(asset.has_alpha());
    }

    #[test]
    fn test_opaque_png_drops_mask() {
        let rgba = [10u8, 20, 30, 0xFF].repeat(9);
        let asset = ImageAsset::from_bytes(&png_bytes(3, 3, &rgba)).unwrap();
        assert!(!asset.has_alpha());
    }

    #[test]
    fn test_unknown_format() {
        assert!(matches!(
            ImageAsset::from_bytes(b"GIF89a"),
            Err(PdfError::UnsupportedImage)
        ));
    }

    #[test]
    fn test_rgba_length_is_checked() {
        assert!(ImageAsset::from_rgba(2, 2, &[0; 15]).is_err());
        assert!(ImageAsset::from_rgba(2, 2, &[0; 16]).is_ok());
    }

    #[test]
    fn test_xobject_with_smask() {
        let mut doc = Document::with_version("1.7");
        let asset = ImageAsset::from_rgba(1, 1, &[0, 0, 0, 128]).unwrap();
        let id = asset.write_xobject(&mut doc).unwrap();
        let stream = doc.get_object(id).unwrap().as_stream().unwrap();
        assert!(stream.dict.get(b"SMask").is_ok());
        assert_eq!(
            stream.dict.get(b"Filter").unwrap().as_name().unwrap(),
            b"FlateDecode"
        );
    }
}
