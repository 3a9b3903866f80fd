//! Anti-aliased round-capped line drawing into an RGBA buffer

#[derive(Debug, Clone)]
pub(super) struct Raster {
    width: u32,
    height: u32,
    /// Straight RGBA, transparent background, black ink.
    pixels: Vec<u8>,
    inked: bool,
}

impl Raster {
    pub(super) fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 4],
            inked: false,
        }
    }

    pub(super) fn width(&self) -> u32 {
        self.width
    }

    pub(super) fn height(&self) -> u32 {
        self.height
    }

    pub(super) fn has_ink(&self) -> bool {
        self.inked
    }

    pub(super) fn clear(&mut self) {
        self.pixels.fill(0);
        self.inked = false;
    }

    /// Stroke the segment `a`-`b` with round caps, in device pixels.
    pub(super) fn draw_segment(&mut self, a: (f32, f32), b: (f32, f32), line_width: f32) {
        let radius = line_width / 2.0;
        let reach = radius + 1.0;

        let min_x = (a.0.min(b.0) - reach).floor().max(0.0) as i64;
        let min_y = (a.1.min(b.1) - reach).floor().max(0.0) as i64;
        let max_x = ((a.0.max(b.0) + reach).ceil() as i64).min(self.width as i64 - 1);
        let max_y = ((a.1.max(b.1) + reach).ceil() as i64).min(self.height as i64 - 1);

        for py in min_y..=max_y {
            for px in min_x..=max_x {
                let center = (px as f32 + 0.5, py as f32 + 0.5);
                let coverage = (radius + 0.5 - distance_to_segment(center, a, b)).clamp(0.0, 1.0);
                if coverage <= 0.0 {
                    continue;
                }
                let alpha = (coverage * 255.0).round() as u8;
                let idx = (py as usize * self.width as usize + px as usize) * 4;
                if alpha > self.pixels[idx + 3] {
                    self.pixels[idx + 3] = alpha;
                    self.inked = true;
                }
            }
        }
    }

    pub(super) fn encode_png(&self) -> Result<Vec<u8>, png::EncodingError> {
        let mut out = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut out, self.width, self.height);
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header()?;
            writer.write_image_data(&self.pixels)?;
            writer.finish()?;
        }
        Ok(out)
    }

    #[cfg(test)]
    fn alpha_at(&self, x: u32, y: u32) -> u8 {
        self.pixels[(y as usize * self.width as usize + x as usize) * 4 + 3]
    }
}

fn distance_to_segment(p: (f32, f32), a: (f32, f32), b: (f32, f32)) -> f32 {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let len_sq = dx * dx + dy * dy;
    let t = if len_sq == 0.0 {
        0.0
    } else {
        (((p.0 - a.0) * dx + (p.1 - a.1) * dy) / len_sq).clamp(0.0, 1.0)
    };
    let (cx, cy) = (a.0 + t * dx, a.1 + t * dy);
    ((p.0 - cx).powi(2) + (p.1 - cy).powi(2)).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_horizontal_line_inks_along_path_only() {
        let mut raster = Raster::new(40, 20);
        raster.draw_segment((5.0, 10.0), (35.0, 10.0), 4.0);
        assert!(raster.has_ink());
        assert_eq!(raster.alpha_at(20, 10), 255);
        assert_eq!(raster.alpha_at(20, 1), 0);
    }

    #[test]
    fn test_segment_outside_surface_is_clipped() {
        let mut raster = Raster::new(10, 10);
        raster.draw_segment((-50.0, -50.0), (-40.0, -40.0), 4.0);
        assert!(!raster.has_ink());
    }

    #[test]
    fn test_clear_resets_ink() {
        let mut raster = Raster::new(10, 10);
        raster.draw_segment((1.0, 1.0), (8.0, 8.0), 4.0);
        raster.clear();
        assert!(!raster.has_ink());
        assert_eq!(raster.alpha_at(5, 5), 0);
    }

    #[test]
    fn test_distance_to_degenerate_segment() {
        assert_eq!(distance_to_segment((3.0, 4.0), (0.0, 0.0), (0.0, 0.0)), 5.0);
    }
}
