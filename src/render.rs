pub mod frame;
pub mod raster;
pub mod transform;

pub use frame::{FrameBuffer, Rgba};
pub use transform::Viewport;

use crate::camera::Camera;
use crate::scene::Scene;
use crate::texture::Texture;

/// Object-level frustum culling policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FrustumCulling {
    Off,
    /// Reject objects whose projected bounding box is fully behind the camera
    /// or fully past one side of the viewport.
    #[default]
    BoundingBox,
}

/// Object-level screen-size culling: reject objects whose projected bounding
/// box covers less than the given percentage of the viewport in either axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScreenspaceCulling {
    #[default]
    Off,
    Tenth,
    Hundredth,
    Thousandth,
    TenThousandth,
    HundredThousandth,
    Millionth,
}

impl ScreenspaceCulling {
    /// Minimum projected size as a percentage of the viewport, per axis.
    pub fn threshold_percent(self) -> Option<f32> {
        return match self {
            ScreenspaceCulling::Off => None,
            ScreenspaceCulling::Tenth => Some(10.0),
            ScreenspaceCulling::Hundredth => Some(1.0),
            ScreenspaceCulling::Thousandth => Some(0.1),
            ScreenspaceCulling::TenThousandth => Some(0.01),
            ScreenspaceCulling::HundredThousandth => Some(0.001),
            ScreenspaceCulling::Millionth => Some(0.0001),
        };
    }
}

/// Winding-based triangle rejection. The signed edge-function area decides
/// which side a triangle faces; zero-area triangles never pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BackfaceCulling {
    Off,
    #[default]
    CounterClockwise,
    Clockwise,
}

impl BackfaceCulling {
    pub fn passes(self, area: f32) -> bool {
        return match self {
            BackfaceCulling::Off => area != 0.0,
            BackfaceCulling::CounterClockwise => area < 0.0,
            BackfaceCulling::Clockwise => area > 0.0,
        };
    }
}

/// Comparison between a candidate fragment depth and the stored depth.
/// A stored depth of exactly zero means "never written" and always passes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DepthTest {
    Always,
    #[default]
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Equal,
    NotEqual,
}

impl DepthTest {
    pub fn passes(self, existing: f32, candidate: f32) -> bool {
        if existing == 0.0 {
            return true;
        }
        return match self {
            DepthTest::Always => true,
            DepthTest::Less => candidate < existing,
            DepthTest::LessEqual => candidate <= existing,
            DepthTest::Greater => candidate > existing,
            DepthTest::GreaterEqual => candidate >= existing,
            DepthTest::Equal => candidate == existing,
            DepthTest::NotEqual => candidate != existing,
        };
    }
}

/// Independent write switches for each color channel and the depth plane.
#[derive(Debug, Clone, Copy)]
pub struct ChannelMasks {
    pub red: bool,
    pub green: bool,
    pub blue: bool,
    pub alpha: bool,
    pub depth: bool,
}

impl Default for ChannelMasks {
    fn default() -> ChannelMasks {
        return ChannelMasks {
            red: true,
            green: true,
            blue: true,
            alpha: true,
            depth: true,
        };
    }
}

/// Frame-global rasterization settings. Per-object appearance lives on the
/// objects themselves; everything here applies to the whole pass.
#[derive(Debug, Clone, Copy)]
pub struct GlobalSettings {
    pub frustum_culling: FrustumCulling,
    pub screenspace_culling: ScreenspaceCulling,
    pub backface_culling: BackfaceCulling,
    pub depth_test: DepthTest,
    pub use_transparency: bool,
    pub fill_background: bool,
    pub background: Rgba,
    pub masks: ChannelMasks,
    /// Additive tolerances on the three barycentric numerators, countering
    /// float leakage at shared triangle edges. Mitigation, not a guarantee.
    pub edge_tolerance: [f32; 3],
    pub ambient_intensity: f32,
}

impl Default for GlobalSettings {
    fn default() -> GlobalSettings {
        return GlobalSettings {
            frustum_culling: FrustumCulling::default(),
            screenspace_culling: ScreenspaceCulling::default(),
            backface_culling: BackfaceCulling::default(),
            depth_test: DepthTest::default(),
            use_transparency: false,
            fill_background: false,
            background: Rgba::gray(60),
            masks: ChannelMasks::default(),
            edge_tolerance: [0.0, 0.0, 0.01],
            ambient_intensity: 0.25,
        };
    }
}

/// Everything one render pass owns: camera, output buffers, settings and the
/// texture table. Passed explicitly to the per-frame call - no process-wide
/// singletons.
pub struct RenderContext {
    pub camera: Camera,
    pub framebuffer: FrameBuffer,
    pub settings: GlobalSettings,
    pub viewport: Viewport,
    pub textures: Vec<Texture>,
}

impl RenderContext {
    pub fn new(
        width: u32,
        height: u32,
        settings: GlobalSettings,
        camera: Camera,
        textures: Vec<Texture>,
    ) -> RenderContext {
        return RenderContext {
            camera,
            framebuffer: FrameBuffer::new(width, height),
            settings,
            viewport: Viewport::new(width, height),
            textures,
        };
    }

    /// Renders one frame of the scene into the owned buffers: clear, derive
    /// lights from emitting objects, rasterize, compose the background.
    pub fn render(&mut self, scene: &Scene) {
        self.framebuffer.clear();

        let lights = scene.lights(self.camera.position, self.camera.rotation);

        raster::rasterize(
            &self.camera,
            scene,
            &lights,
            &self.settings,
            &self.viewport,
            &self.textures,
            &mut self.framebuffer,
        );

        if self.settings.fill_background {
            self.framebuffer
                .compose_background(self.settings.background, self.settings.use_transparency);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depth_test_zero_existing_always_passes() {
        for test in [
            DepthTest::Always,
            DepthTest::Less,
            DepthTest::LessEqual,
            DepthTest::Greater,
            DepthTest::GreaterEqual,
            DepthTest::Equal,
            DepthTest::NotEqual,
        ] {
            assert!(test.passes(0.0, 123.0));
        }
    }

    #[test]
    fn depth_test_comparisons() {
        assert!(DepthTest::Less.passes(10.0, 5.0));
        assert!(!DepthTest::Less.passes(5.0, 10.0));
        assert!(DepthTest::Greater.passes(5.0, 10.0));
        assert!(DepthTest::LessEqual.passes(5.0, 5.0));
        assert!(!DepthTest::NotEqual.passes(5.0, 5.0));
        assert!(DepthTest::Equal.passes(5.0, 5.0));
    }

    #[test]
    fn backface_policies() {
        assert!(BackfaceCulling::Off.passes(4.0));
        assert!(BackfaceCulling::Off.passes(-4.0));
        assert!(!BackfaceCulling::Off.passes(0.0));
        assert!(BackfaceCulling::CounterClockwise.passes(-4.0));
        assert!(!BackfaceCulling::CounterClockwise.passes(4.0));
        assert!(BackfaceCulling::Clockwise.passes(4.0));
        assert!(!BackfaceCulling::Clockwise.passes(-4.0));
    }

    #[test]
    fn screenspace_tiers_descend() {
        let tiers = [
            ScreenspaceCulling::Tenth,
            ScreenspaceCulling::Hundredth,
            ScreenspaceCulling::Thousandth,
            ScreenspaceCulling::TenThousandth,
            ScreenspaceCulling::HundredThousandth,
            ScreenspaceCulling::Millionth,
        ];
        let mut last = f32::MAX;
        for tier in tiers {
            let threshold = tier.threshold_percent().unwrap();
            assert!(threshold < last);
            last = threshold;
        }
        assert!(ScreenspaceCulling::Off.threshold_percent().is_none());
    }
}
