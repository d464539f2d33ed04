use image::RgbaImage;

use crate::error::EngineError;
use crate::noise::NoiseField;
use crate::render::frame::Rgba;

/// RGBA sample grid addressed by normalized uv coordinates. Both coordinates
/// wrap, so any finite uv is valid.
pub struct Texture {
    image: RgbaImage,
}

impl Texture {
    pub fn from_image(path: &str) -> Result<Texture, EngineError> {
        let image = image::open(path)
            .map_err(|source| EngineError::Texture {
                path: path.to_string(),
                source,
            })?
            .to_rgba8();
        return Ok(Texture { image });
    }

    /// Grayscale texture synthesized from a noise field. `scale` is the noise
    /// coordinate step per texel.
    pub fn from_noise(width: u32, height: u32, noise: &NoiseField, scale: f32) -> Texture {
        let image = RgbaImage::from_fn(width, height, |x, y| {
            let value = noise.sample2(x as f32 * scale, y as f32 * scale) * 0.5 + 0.5;
            let brightness = (value * 255.0) as u8;
            image::Rgba([brightness, brightness, brightness, 255])
        });
        return Texture { image };
    }

    pub fn width(&self) -> u32 {
        return self.image.width();
    }

    pub fn height(&self) -> u32 {
        return self.image.height();
    }

    /// Sample at normalized uv with wrapping in both axes.
    pub fn sample(&self, u: f32, v: f32) -> Rgba {
        let x = ((wrap(u) * self.image.width() as f32) as u32).min(self.image.width() - 1);
        let y = ((wrap(v) * self.image.height() as f32) as u32).min(self.image.height() - 1);
        let pixel = self.image.get_pixel(x, y);
        return Rgba::new(pixel[0], pixel[1], pixel[2], pixel[3]);
    }
}

fn wrap(t: f32) -> f32 {
    let fractional = t.fract();
    if fractional < 0.0 {
        return fractional + 1.0;
    }
    return fractional;
}
