use nalgebra::Vector3;
use std::f32::consts::PI;

use crate::render::transform::rotate_euler_about;

/// Easing curve applied to the interpolation weight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Easing {
    #[default]
    Linear,
    Smoothstep,
    Smootherstep,
    EaseInSine,
    EaseOutSine,
    EaseInOutSine,
    EaseInQuad,
    EaseOutQuad,
    EaseInOutQuad,
}

impl Easing {
    pub fn apply(self, x: f32) -> f32 {
        return match self {
            Easing::Linear => x,
            Easing::Smoothstep => x * x * (3.0 - 2.0 * x),
            Easing::Smootherstep => x * x * x * (x * (x * 6.0 - 15.0) + 10.0),
            Easing::EaseInSine => 1.0 - (x * PI / 2.0).cos(),
            Easing::EaseOutSine => (x * PI / 2.0).sin(),
            Easing::EaseInOutSine => -((PI * x).cos() - 1.0) / 2.0,
            Easing::EaseInQuad => x * x,
            Easing::EaseOutQuad => 1.0 - (1.0 - x) * (1.0 - x),
            Easing::EaseInOutQuad => {
                if x < 0.5 {
                    2.0 * x * x
                } else {
                    1.0 - (-2.0 * x + 2.0).powi(2) / 2.0
                }
            }
        };
    }
}

/// Optional transform applied to the interpolated value before it is used.
#[derive(Debug, Clone, Copy)]
pub enum PostTransform {
    None,
    /// Treats the interpolated vector as Euler angles and revolves a fixed
    /// point around an origin by them. Replaces the old revolving-position
    /// animator subclass.
    Revolve {
        point: Vector3<f32>,
        origin: Vector3<f32>,
    },
}

/// Parameterized tween between two vectors: one value type configured by an
/// easing mode and an optional post transform, composed rather than
/// subclassed.
#[derive(Debug, Clone)]
pub struct Interpolator {
    pub start: Vector3<f32>,
    pub end: Vector3<f32>,
    pub duration: f32,
    pub easing: Easing,
    /// When set, the weight sweeps 0 -> 1 -> 0 instead of wrapping.
    pub auto_reverse: bool,
    pub post: PostTransform,
    completion: f32,
}

impl Interpolator {
    pub fn new(start: Vector3<f32>, end: Vector3<f32>, duration: f32, easing: Easing) -> Interpolator {
        return Interpolator {
            start,
            end,
            duration,
            easing,
            auto_reverse: false,
            post: PostTransform::None,
            completion: 0.0,
        };
    }

    pub fn auto_reverse(mut self) -> Interpolator {
        self.auto_reverse = true;
        return self;
    }

    pub fn revolving(mut self, point: Vector3<f32>, origin: Vector3<f32>) -> Interpolator {
        self.post = PostTransform::Revolve { point, origin };
        return self;
    }

    pub fn tick(&mut self, dt: f32) {
        self.completion += dt;
    }

    pub fn value(&self) -> Vector3<f32> {
        let interpolated = if self.duration == 0.0 {
            self.start
        } else {
            let percent = self.completion / self.duration;
            let raw = if self.auto_reverse {
                if percent % 2.0 < 1.0 {
                    percent % 1.0
                } else {
                    1.0 - percent % 1.0
                }
            } else {
                percent % 1.0
            };
            self.start.lerp(&self.end, self.easing.apply(raw))
        };

        return match self.post {
            PostTransform::None => interpolated,
            PostTransform::Revolve { point, origin } => {
                rotate_euler_about(point, interpolated, origin)
            }
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::vector;

    #[test]
    fn easing_endpoints_are_fixed() {
        for easing in [
            Easing::Linear,
            Easing::Smoothstep,
            Easing::Smootherstep,
            Easing::EaseInSine,
            Easing::EaseOutSine,
            Easing::EaseInOutSine,
            Easing::EaseInQuad,
            Easing::EaseOutQuad,
            Easing::EaseInOutQuad,
        ] {
            assert_relative_eq!(easing.apply(0.0), 0.0, epsilon = 1e-6);
            assert_relative_eq!(easing.apply(1.0), 1.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn linear_midpoint() {
        let mut tween = Interpolator::new(
            vector![0.0, 0.0, 0.0],
            vector![10.0, -4.0, 2.0],
            10.0,
            Easing::Linear,
        );
        tween.tick(5.0);
        let value = tween.value();
        assert_relative_eq!(value.x, 5.0);
        assert_relative_eq!(value.y, -2.0);
        assert_relative_eq!(value.z, 1.0);
    }

    #[test]
    fn auto_reverse_returns_toward_start() {
        let mut tween = Interpolator::new(
            vector![0.0, 0.0, 0.0],
            vector![8.0, 0.0, 0.0],
            4.0,
            Easing::Linear,
        )
        .auto_reverse();
        tween.tick(6.0); // 1.5 periods: halfway back down
        assert_relative_eq!(tween.value().x, 4.0, epsilon = 1e-4);
    }

    #[test]
    fn revolve_post_transform_orbits_origin() {
        let mut tween = Interpolator::new(
            Vector3::zeros(),
            vector![0.0, PI, 0.0],
            2.0,
            Easing::Linear,
        )
        .revolving(vector![1.0, 0.0, 0.0], Vector3::zeros());
        tween.tick(1.0); // half turn around y
        let value = tween.value();
        assert_relative_eq!(value.x, -1.0, epsilon = 1e-5);
        assert_relative_eq!(value.z, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn zero_duration_stays_at_start() {
        let tween = Interpolator::new(vector![3.0, 0.0, 0.0], vector![9.0, 0.0, 0.0], 0.0, Easing::Linear);
        assert_relative_eq!(tween.value().x, 3.0);
    }
}
