use std::time::{Duration, Instant};

use log::{info, warn};
use nalgebra::{vector, Vector3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use show_image::{create_window, event, ImageInfo, ImageView, WindowOptions};

use crate::camera::Camera;
use crate::error::EngineError;
use crate::input::{InputState, Key};
use crate::mesh;
use crate::noise::NoiseField;
use crate::render::{BackfaceCulling, GlobalSettings, RenderContext, Rgba, ScreenspaceCulling};
use crate::scene::animator::{Easing, Interpolator};
use crate::scene::object::{
    ColorMap, ColorSource, Emission, MappingSettings, NormalMap, RenderSettings, Transform,
    TriangleObject, UvMap,
};
use crate::scene::{AnimationTarget, ObjectAnimator, Scene};
use crate::texture::Texture;

/// Execution parameters assembled from the command line.
pub struct Params {
    pub width: u32,
    pub height: u32,
    pub print_stats: bool,
    pub scene_name: String,
    /// Replaces the scene's generated texture 0 with an image file.
    pub texture_path: Option<String>,
    pub tick_interval: Duration,
}

/// Translates a window key code into an engine key, if it is bound.
fn engine_key(key_code: event::VirtualKeyCode) -> Option<Key> {
    return match key_code {
        event::VirtualKeyCode::W => Some(Key::Forward),
        event::VirtualKeyCode::S => Some(Key::Back),
        event::VirtualKeyCode::A => Some(Key::Left),
        event::VirtualKeyCode::D => Some(Key::Right),
        event::VirtualKeyCode::Space => Some(Key::Up),
        event::VirtualKeyCode::LShift => Some(Key::Down),
        event::VirtualKeyCode::LControl => Some(Key::Sprint),
        event::VirtualKeyCode::T => Some(Key::ToggleMouse),
        _ => None,
    };
}

/// Once-a-second frame statistics, reported through the log.
struct FrameStats {
    enabled: bool,
    window_begin: Instant,
    frames: u32,
    render_time: Duration,
}

impl FrameStats {
    fn new(enabled: bool) -> FrameStats {
        return FrameStats {
            enabled,
            window_begin: Instant::now(),
            frames: 0,
            render_time: Duration::ZERO,
        };
    }

    fn record(&mut self, render_duration: Duration) {
        if !self.enabled {
            return;
        }
        self.frames += 1;
        self.render_time += render_duration;
        let elapsed = self.window_begin.elapsed().as_secs_f32();
        if elapsed >= 1.0 {
            info!(
                "fps {:.0}, render {:.1} ms/frame",
                self.frames as f32 / elapsed,
                self.render_time.as_secs_f32() * 1000.0 / self.frames as f32,
            );
            self.window_begin = Instant::now();
            self.frames = 0;
            self.render_time = Duration::ZERO;
        }
    }
}

fn spheres_scene(noise: &NoiseField) -> (Scene, Vec<Texture>, GlobalSettings) {
    let mut rng = StdRng::seed_from_u64(7);
    let sphere = mesh::icosphere(2);

    let mut objects = Vec::new();
    for i in 0..6 {
        let radius = rng.gen_range(120.0..280.0);
        let transform = Transform {
            position: vector![
                rng.gen_range(-900.0..900.0),
                rng.gen_range(-250.0..250.0),
                rng.gen_range(1200.0..2600.0)
            ],
            dimensions: vector![radius, radius, radius],
            rotation: Vector3::zeros(),
        };
        // Alternate between noise-colored and textured spheres.
        let (render_settings, mapping) = if i % 2 == 0 {
            (
                RenderSettings {
                    lighting: true,
                    ..Default::default()
                },
                MappingSettings {
                    color: ColorMap::Noise,
                    ..Default::default()
                },
            )
        } else {
            (
                RenderSettings {
                    lighting: true,
                    color_source: ColorSource::Texture,
                    texture_index: 0,
                    ..Default::default()
                },
                MappingSettings {
                    uv: UvMap::Spherical,
                    ..Default::default()
                },
            )
        };
        objects.push(TriangleObject::new(
            sphere.clone(),
            transform,
            render_settings,
            Emission::default(),
            mapping,
            noise,
        ));
    }

    // Small self-lit sphere acting as the point light of the scene.
    objects.push(TriangleObject::new(
        mesh::icosphere(1),
        Transform {
            position: vector![800.0, -100.0, 1900.0],
            dimensions: vector![40.0, 40.0, 40.0],
            rotation: Vector3::zeros(),
        },
        RenderSettings::default(),
        Emission {
            emits: true,
            color: Rgba::WHITE,
            diffuse_intensity: 0.9,
            diffuse_exponent: 2.0,
            specular_intensity: 0.35,
            specular_exponent: 8.0,
        },
        MappingSettings::default(),
        noise,
    ));

    let mut scene = Scene::new(objects);
    let last = scene.objects.len() - 1;
    scene.animators.push(ObjectAnimator {
        object_index: last,
        target: AnimationTarget::Position,
        interpolator: Interpolator::new(
            Vector3::zeros(),
            vector![0.0, 2.0 * std::f32::consts::PI, 0.0],
            24.0,
            Easing::Linear,
        )
        .revolving(vector![800.0, -100.0, 1900.0], vector![0.0, 0.0, 1900.0]),
    });
    scene.animators.push(ObjectAnimator {
        object_index: 0,
        target: AnimationTarget::Rotation,
        interpolator: Interpolator::new(
            Vector3::zeros(),
            vector![0.0, 2.0 * std::f32::consts::PI, 0.0],
            16.0,
            Easing::Linear,
        ),
    });

    let settings = GlobalSettings {
        fill_background: true,
        backface_culling: BackfaceCulling::Off,
        ..Default::default()
    };
    let textures = vec![Texture::from_noise(256, 256, noise, 0.08)];
    return (scene, textures, settings);
}

fn terrain_scene(noise: &NoiseField) -> (Scene, Vec<Texture>, GlobalSettings) {
    let mut objects = Vec::new();

    objects.push(TriangleObject::new(
        mesh::plane(48, 48),
        Transform {
            position: vector![0.0, 300.0, 2200.0],
            dimensions: vector![6000.0, 1.0, 6000.0],
            rotation: Vector3::zeros(),
        },
        RenderSettings {
            lighting: true,
            color_source: ColorSource::Texture,
            texture_index: 0,
            ..Default::default()
        },
        Emission::default(),
        MappingSettings {
            normal: NormalMap::Face,
            uv: UvMap::Planar,
            ..Default::default()
        },
        noise,
    ));

    // A sun-like emitter hanging above the ground (negative y is up).
    objects.push(TriangleObject::new(
        mesh::icosphere(1),
        Transform {
            position: vector![0.0, -500.0, 2200.0],
            dimensions: vector![60.0, 60.0, 60.0],
            rotation: Vector3::zeros(),
        },
        RenderSettings::default(),
        Emission {
            emits: true,
            color: Rgba::WHITE,
            diffuse_intensity: 0.8,
            diffuse_exponent: 1.0,
            specular_intensity: 0.2,
            specular_exponent: 4.0,
        },
        MappingSettings::default(),
        noise,
    ));

    let mut scene = Scene::new(objects);
    scene.animators.push(ObjectAnimator {
        object_index: 1,
        target: AnimationTarget::Position,
        interpolator: Interpolator::new(
            vector![0.0, -500.0, 2200.0],
            vector![0.0, -500.0, 3400.0],
            18.0,
            Easing::EaseInOutSine,
        )
        .auto_reverse(),
    });

    let settings = GlobalSettings {
        fill_background: true,
        screenspace_culling: ScreenspaceCulling::Millionth,
        ..Default::default()
    };
    let textures = vec![Texture::from_noise(512, 512, noise, 0.02)];
    return (scene, textures, settings);
}

fn build_scene(
    name: &str,
    noise: &NoiseField,
) -> Result<(Scene, Vec<Texture>, GlobalSettings), EngineError> {
    return match name {
        "spheres" => Ok(spheres_scene(noise)),
        "terrain" => Ok(terrain_scene(noise)),
        other => Err(EngineError::UnknownScene(other.to_string())),
    };
}

/// Opens the output window and runs the simulation loop until Escape or the
/// window closing. Simulation runs on a fixed tick; rendering runs as fast as
/// the window accepts frames.
pub fn run(params: Params) -> Result<(), Box<dyn std::error::Error>> {
    let noise = NoiseField::new(42).with_settings(0.01, 4, 0.5, 1.1);
    let (mut scene, mut textures, settings) = build_scene(&params.scene_name, &noise)?;
    if let Some(path) = &params.texture_path {
        let texture = Texture::from_image(path)?;
        info!("texture {}: {}x{}", path, texture.width(), texture.height());
        if textures.is_empty() {
            textures.push(texture);
        } else {
            textures[0] = texture;
        }
    }
    info!(
        "scene \"{}\": {} objects, {} textures",
        params.scene_name,
        scene.objects.len(),
        textures.len(),
    );

    let camera = Camera::new(Vector3::zeros(), Vector3::zeros(), 500.0);
    let mut context = RenderContext::new(params.width, params.height, settings, camera, textures);

    let window_options = WindowOptions {
        size: Some([params.width, params.height]),
        ..Default::default()
    };
    let window = create_window("softrender", window_options)
        .map_err(|error| EngineError::Window(error.to_string()))?;
    let event_channel = window
        .event_channel()
        .map_err(|error| EngineError::Window(error.to_string()))?;

    let mut input = InputState::new();
    let mut stats = FrameStats::new(params.print_stats);
    let tick_seconds = params.tick_interval.as_secs_f32();
    let mut next_tick = Instant::now();
    let mut exit = false;

    while !exit {
        for window_event in event_channel.try_iter() {
            match window_event {
                event::WindowEvent::KeyboardInput(keyboard) => {
                    let Some(key_code) = keyboard.input.key_code else {
                        continue;
                    };
                    if key_code == event::VirtualKeyCode::Escape
                        && keyboard.input.state.is_released()
                    {
                        exit = true;
                    } else if let Some(key) = engine_key(key_code) {
                        if key == Key::ToggleMouse {
                            if keyboard.input.state.is_released() {
                                context.camera.reading_mouse = !context.camera.reading_mouse;
                            }
                        } else {
                            input.set_pressed(key, keyboard.input.state.is_pressed());
                        }
                    }
                }
                event::WindowEvent::MouseMove(mouse) => {
                    input.add_mouse_delta(
                        mouse.position.x - mouse.prev_position.x,
                        mouse.position.y - mouse.prev_position.y,
                    );
                }
                event::WindowEvent::CloseRequested(_) => {
                    exit = true;
                }
                _ => {}
            }
        }

        // Fixed-interval simulation; catches up after a slow frame.
        while Instant::now() >= next_tick {
            let delta = input.take_mouse_delta();
            context
                .camera
                .apply_mouse(delta.x, delta.y, params.width as f32, params.height as f32);
            context.camera.tick(&input);
            scene.update(tick_seconds);
            next_tick += params.tick_interval;
        }

        let render_begin = Instant::now();
        context.render(&scene);
        stats.record(render_begin.elapsed());

        let image = ImageView::new(
            ImageInfo::rgba8(params.width, params.height),
            context.framebuffer.color_data(),
        );
        // A dropped frame is not fatal; the next loop iteration retries.
        if let Err(error) = window.set_image("render", image) {
            warn!("dropped frame: {}", error);
        }
    }

    return Ok(());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_scene_knows_both_demos() {
        let noise = NoiseField::new(0);
        for name in ["spheres", "terrain"] {
            let (scene, textures, _) = build_scene(name, &noise).unwrap();
            assert!(!scene.objects.is_empty());
            assert!(!textures.is_empty());
            assert!(scene.objects.iter().any(|object| object.emission.emits));
            assert!(!scene.animators.is_empty());
        }
    }

    #[test]
    fn build_scene_rejects_unknown_names() {
        let noise = NoiseField::new(0);
        assert!(matches!(
            build_scene("teapots", &noise),
            Err(EngineError::UnknownScene(_))
        ));
    }

    #[test]
    fn movement_keys_are_bound() {
        assert_eq!(engine_key(event::VirtualKeyCode::W), Some(Key::Forward));
        assert_eq!(engine_key(event::VirtualKeyCode::S), Some(Key::Back));
        assert_eq!(engine_key(event::VirtualKeyCode::A), Some(Key::Left));
        assert_eq!(engine_key(event::VirtualKeyCode::D), Some(Key::Right));
        assert_eq!(engine_key(event::VirtualKeyCode::Space), Some(Key::Up));
        assert_eq!(engine_key(event::VirtualKeyCode::LShift), Some(Key::Down));
        assert_eq!(engine_key(event::VirtualKeyCode::F12), None);
    }
}
