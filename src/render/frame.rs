/// 4-channel color, 0-255 per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba { r: 255, g: 255, b: 255, a: 255 };

    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Rgba {
        return Rgba { r, g, b, a };
    }

    /// Opaque gray of the given brightness.
    pub fn gray(value: u8) -> Rgba {
        return Rgba { r: value, g: value, b: value, a: 255 };
    }
}

/// Color and depth planes of one frame. The planes always share pixel
/// dimensions and are both fully cleared before each rasterization pass.
/// A depth of exactly 0.0 marks a pixel as never written.
pub struct FrameBuffer {
    pub width: u32,
    pub height: u32,
    color: Vec<u8>,  // rgba8, interleaved
    depth: Vec<f32>, // one value per pixel
}

impl FrameBuffer {
    pub fn new(width: u32, height: u32) -> FrameBuffer {
        let n_pixels = (width * height) as usize;
        return FrameBuffer {
            width,
            height,
            color: vec![0; n_pixels * 4],
            depth: vec![0.0; n_pixels],
        };
    }

    /// Zeroes both planes. The buffers are reused across frames, so this runs
    /// at the start of every render pass.
    pub fn clear(&mut self) {
        self.color.fill(0);
        self.depth.fill(0.0);
    }

    /// Rendered frame as rgba8 data, width * height * 4 bytes.
    pub fn color_data(&self) -> &[u8] {
        return &self.color[..];
    }

    pub fn depth_data(&self) -> &[f32] {
        return &self.depth[..];
    }

    /// Mutable views of both planes for the rasterizer inner loop.
    pub(crate) fn planes_mut(&mut self) -> (&mut [u8], &mut [f32]) {
        return (&mut self.color, &mut self.depth);
    }

    pub fn pixel(&self, x: u32, y: u32) -> Rgba {
        let index = ((x + y * self.width) * 4) as usize;
        return Rgba {
            r: self.color[index],
            g: self.color[index + 1],
            b: self.color[index + 2],
            a: self.color[index + 3],
        };
    }

    pub fn pixel_depth(&self, x: u32, y: u32) -> f32 {
        return self.depth[(x + y * self.width) as usize];
    }

    /// Fills the background after rasterization. With transparency enabled
    /// every pixel is alpha-blended over the background color; otherwise only
    /// pixels that were never written (alpha 0) are overwritten.
    pub fn compose_background(&mut self, background: Rgba, use_transparency: bool) {
        let bg_alpha = background.a as f32 / 255.0;
        for pixel in self.color.chunks_exact_mut(4) {
            if use_transparency {
                let coeff_px = pixel[3] as f32 / 255.0;
                let coeff_bg = bg_alpha * (1.0 - coeff_px);
                pixel[0] = (pixel[0] as f32 * coeff_px + background.r as f32 * coeff_bg) as u8;
                pixel[1] = (pixel[1] as f32 * coeff_px + background.g as f32 * coeff_bg) as u8;
                pixel[2] = (pixel[2] as f32 * coeff_px + background.b as f32 * coeff_bg) as u8;
                pixel[3] = ((coeff_px + coeff_bg) * 255.0) as u8;
            } else if pixel[3] == 0 {
                pixel[0] = background.r;
                pixel[1] = background.g;
                pixel[2] = background.b;
                pixel[3] = background.a;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_resets_both_planes() {
        let mut fb = FrameBuffer::new(4, 4);
        {
            let (color, depth) = fb.planes_mut();
            color[0] = 200;
            color[3] = 255;
            depth[0] = 5.0;
        }
        fb.clear();
        assert_eq!(fb.pixel(0, 0), Rgba::new(0, 0, 0, 0));
        assert_eq!(fb.pixel_depth(0, 0), 0.0);
    }

    #[test]
    fn opaque_background_fills_only_untouched_pixels() {
        let mut fb = FrameBuffer::new(2, 1);
        {
            let (color, _) = fb.planes_mut();
            // Pixel 0 written opaque red, pixel 1 untouched.
            color[0] = 255;
            color[3] = 255;
        }
        fb.compose_background(Rgba::new(60, 60, 60, 255), false);
        assert_eq!(fb.pixel(0, 0), Rgba::new(255, 0, 0, 255));
        assert_eq!(fb.pixel(1, 0), Rgba::new(60, 60, 60, 255));
    }

    #[test]
    fn transparent_background_blends_partial_alpha() {
        let mut fb = FrameBuffer::new(1, 1);
        {
            let (color, _) = fb.planes_mut();
            color[0] = 255; // half-transparent red
            color[3] = 127;
        }
        fb.compose_background(Rgba::new(0, 0, 0, 255), true);
        let pixel = fb.pixel(0, 0);
        // Roughly half the red survives; the result is fully opaque.
        assert!((pixel.r as i32 - 127).abs() <= 2);
        assert_eq!(pixel.a, 255);
    }

    #[test]
    fn transparent_background_keeps_opaque_pixels() {
        let mut fb = FrameBuffer::new(1, 1);
        {
            let (color, _) = fb.planes_mut();
            color[1] = 200;
            color[3] = 255;
        }
        fb.compose_background(Rgba::new(60, 60, 60, 255), true);
        assert_eq!(fb.pixel(0, 0), Rgba::new(0, 200, 0, 255));
    }
}
