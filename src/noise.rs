use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Deterministic seeded gradient noise. Samples are in [-1, 1]; the same seed
/// and coordinates always produce the same value. Used for procedural vertex
/// colors and the built-in noise texture.
pub struct NoiseField {
    perm: [u8; 512],
    pub frequency: f32,
    pub octaves: u32,
    pub persistence: f32,
    pub amplitude: f32,
    pub contrast: f32,
}

impl NoiseField {
    pub fn new(seed: u64) -> NoiseField {
        let mut table: Vec<u8> = (0..=255).collect();
        table.shuffle(&mut StdRng::seed_from_u64(seed));

        let mut perm = [0u8; 512];
        for i in 0..512 {
            perm[i] = table[i & 255];
        }

        return NoiseField {
            perm,
            frequency: 1.0,
            octaves: 1,
            persistence: 0.5,
            amplitude: 1.0,
            contrast: 1.0,
        };
    }

    pub fn with_settings(
        mut self,
        frequency: f32,
        octaves: u32,
        persistence: f32,
        contrast: f32,
    ) -> NoiseField {
        self.frequency = frequency;
        self.octaves = octaves.max(1);
        self.persistence = persistence;
        self.contrast = contrast;
        return self;
    }

    /// Fractal sum of gradient noise octaves, clamped to [-1, 1].
    pub fn sample3(&self, x: f32, y: f32, z: f32) -> f32 {
        let mut total = 0.0;
        let mut frequency = self.frequency;
        let mut amplitude = self.amplitude;
        let mut range = 0.0;

        for _ in 0..self.octaves {
            total += self.gradient3(x * frequency, y * frequency, z * frequency) * amplitude;
            range += amplitude;
            frequency *= 2.0;
            amplitude *= self.persistence;
        }

        return (total / range * self.contrast).clamp(-1.0, 1.0);
    }

    pub fn sample2(&self, x: f32, y: f32) -> f32 {
        return self.sample3(x, y, 0.0);
    }

    /// One octave of classic 3D gradient noise.
    fn gradient3(&self, x: f32, y: f32, z: f32) -> f32 {
        let xi = (x.floor() as i32 & 255) as usize;
        let yi = (y.floor() as i32 & 255) as usize;
        let zi = (z.floor() as i32 & 255) as usize;

        let xf = x - x.floor();
        let yf = y - y.floor();
        let zf = z - z.floor();

        let u = fade(xf);
        let v = fade(yf);
        let w = fade(zf);

        let p = &self.perm;
        let a = p[xi] as usize + yi;
        let aa = p[a] as usize + zi;
        let ab = p[a + 1] as usize + zi;
        let b = p[xi + 1] as usize + yi;
        let ba = p[b] as usize + zi;
        let bb = p[b + 1] as usize + zi;

        let x1 = lerp(
            grad(p[aa], xf, yf, zf),
            grad(p[ba], xf - 1.0, yf, zf),
            u,
        );
        let x2 = lerp(
            grad(p[ab], xf, yf - 1.0, zf),
            grad(p[bb], xf - 1.0, yf - 1.0, zf),
            u,
        );
        let y1 = lerp(x1, x2, v);

        let x3 = lerp(
            grad(p[aa + 1], xf, yf, zf - 1.0),
            grad(p[ba + 1], xf - 1.0, yf, zf - 1.0),
            u,
        );
        let x4 = lerp(
            grad(p[ab + 1], xf, yf - 1.0, zf - 1.0),
            grad(p[bb + 1], xf - 1.0, yf - 1.0, zf - 1.0),
            u,
        );
        let y2 = lerp(x3, x4, v);

        return lerp(y1, y2, w);
    }
}

fn fade(t: f32) -> f32 {
    return t * t * t * (t * (t * 6.0 - 15.0) + 10.0);
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    return a + t * (b - a);
}

/// Picks one of 12 edge gradients from the hashed cell corner.
fn grad(hash: u8, x: f32, y: f32, z: f32) -> f32 {
    let h = hash & 15;
    let u = if h < 8 { x } else { y };
    let v = if h < 4 {
        y
    } else if h == 12 || h == 14 {
        x
    } else {
        z
    };
    let u = if h & 1 == 0 { u } else { -u };
    let v = if h & 2 == 0 { v } else { -v };
    return u + v;
}
