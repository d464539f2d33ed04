use nalgebra::{vector, Vector3};

use crate::camera::Camera;
use crate::render::frame::FrameBuffer;
use crate::render::transform::{self, Viewport};
use crate::render::{FrustumCulling, GlobalSettings};
use crate::scene::object::{
    AttributeInterpolation, ColorSource, Light, NormalInterpolation, RenderSettings,
    TriangleObject, VertexAttributes,
};
use crate::scene::Scene;
use crate::texture::Texture;

/// Rasterizes every visible object of the scene into the frame buffer.
pub fn rasterize(
    camera: &Camera,
    scene: &Scene,
    lights: &[Light],
    settings: &GlobalSettings,
    viewport: &Viewport,
    textures: &[Texture],
    framebuffer: &mut FrameBuffer,
) {
    for object in &scene.objects {
        if !object_visible(camera, object, settings, viewport) {
            continue;
        }
        draw_object(camera, object, lights, settings, viewport, textures, framebuffer);
    }
}

/// Object-level culling from the projected corners of the axis-aligned
/// bounding extent: the frustum test first, then the screen-size floor.
fn object_visible(
    camera: &Camera,
    object: &TriangleObject,
    settings: &GlobalSettings,
    viewport: &Viewport,
) -> bool {
    let frustum = matches!(settings.frustum_culling, FrustumCulling::BoundingBox);
    let size_threshold = settings.screenspace_culling.threshold_percent();
    if !frustum && size_threshold.is_none() {
        return true;
    }

    let corners =
        transform::bounding_corners(object.transform.position, object.transform.dimensions);
    let mut min = vector![f32::INFINITY, f32::INFINITY, f32::INFINITY];
    let mut max = vector![f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY];
    for corner in corners {
        let projected = transform::project_world(camera, corner, viewport).map(f32::round);
        min = min.inf(&projected);
        max = max.sup(&projected);
    }

    if frustum {
        let off_screen = max.z <= 0.0
            || min.x >= viewport.half_width
            || max.x < -viewport.half_width
            || min.y >= viewport.half_height
            || max.y < -viewport.half_height;
        if off_screen {
            return false;
        }
    }

    if let Some(threshold) = size_threshold {
        let width_percent = ((max.x - min.x) / viewport.width as f32 * 100.0).abs();
        let height_percent = ((max.y - min.y) / viewport.height as f32 * 100.0).abs();
        if width_percent < threshold || height_percent < threshold {
            return false;
        }
    }

    return true;
}

/// Screen-space corners and shading inputs of one triangle.
struct TriangleIn<'a> {
    screen: [Vector3<f32>; 3],
    attributes: [&'a VertexAttributes; 3],
    /// Vertex normals already rotated into the camera frame and normalized.
    normals: [Vector3<f32>; 3],
}

fn draw_object(
    camera: &Camera,
    object: &TriangleObject,
    lights: &[Light],
    settings: &GlobalSettings,
    viewport: &Viewport,
    textures: &[Texture],
    framebuffer: &mut FrameBuffer,
) {
    let n = object.vertices.len();
    if n < 3 {
        return;
    }

    let object_settings = &object.render_settings;

    // Vertex stage: the full object-to-screen transform, once per vertex.
    let screen: Vec<Vector3<f32>> = object
        .vertices
        .iter()
        .map(|&v| transform::project(camera, &object.transform, v, viewport))
        .collect();

    // Normals rotated into the camera frame once per vertex, not per pixel.
    let normals: Vec<Vector3<f32>> = object
        .attributes
        .iter()
        .map(|attributes| {
            transform::normalize_or_zero(transform::rotate_euler(
                transform::rotate_euler(attributes.normal, object.transform.rotation),
                camera.rotation,
            ))
        })
        .collect();

    // Unknown texture indices fall back to vertex color.
    let texture = match object_settings.color_source {
        ColorSource::Texture => textures.get(object_settings.texture_index),
        ColorSource::Vertex => None,
    };

    let step = object_settings.topology.step();
    let mut j = 0;
    while j + 2 < n {
        let (i1, i2, i3) = object_settings.topology.triangle_indices(j);
        let triangle = TriangleIn {
            screen: [screen[i1], screen[i2], screen[i3]],
            attributes: [
                &object.attributes[i1],
                &object.attributes[i2],
                &object.attributes[i3],
            ],
            normals: [normals[i1], normals[i2], normals[i3]],
        };
        draw_triangle(
            &triangle,
            object_settings,
            texture,
            camera,
            lights,
            settings,
            viewport,
            framebuffer,
        );
        j += step;
    }
}

/// Resolves the attribute-interpolation mode into three per-vertex weights.
fn attribute_weights(
    mode: AttributeInterpolation,
    w1: f32,
    w2: f32,
    w3: f32,
    depth: f32,
) -> (f32, f32, f32) {
    return match mode {
        AttributeInterpolation::PerspectiveCorrect => (w1 * depth, w2 * depth, w3 * depth),
        AttributeInterpolation::FirstVertex => (1.0, 0.0, 0.0),
        AttributeInterpolation::NearestVertex => {
            if w1 > w2 && w1 > w3 {
                (1.0, 0.0, 0.0)
            } else if w2 > w3 {
                (0.0, 1.0, 0.0)
            } else {
                (0.0, 0.0, 1.0)
            }
        }
    };
}

/// New/old compositing coefficients for a fragment, or None when there is
/// nothing to write. A failed depth test against a never-written pixel
/// (alpha 0) still counts as a valid background write.
fn blend_coefficients(
    depth_pass: bool,
    use_transparency: bool,
    alpha: f32,
    existing_alpha: f32,
) -> Option<(f32, f32)> {
    if depth_pass {
        if use_transparency {
            return Some((
                alpha / 255.0,
                (existing_alpha / 255.0) * (255.0 - alpha) / 255.0,
            ));
        }
        return Some((1.0, 0.0));
    }
    if use_transparency {
        return Some((
            (alpha / 255.0) * (255.0 - existing_alpha) / 255.0,
            existing_alpha / 255.0,
        ));
    }
    if existing_alpha != 0.0 {
        return None;
    }
    return Some((1.0, 0.0));
}

#[allow(clippy::too_many_arguments)]
fn draw_triangle(
    triangle: &TriangleIn,
    object_settings: &RenderSettings,
    texture: Option<&Texture>,
    camera: &Camera,
    lights: &[Light],
    globals: &GlobalSettings,
    viewport: &Viewport,
    framebuffer: &mut FrameBuffer,
) {
    let [p1, p2, p3] = triangle.screen;
    let (x1, y1, z1) = (p1.x, p1.y, p1.z);
    let (x2, y2, z2) = (p2.x, p2.y, p2.z);
    let (x3, y3, z3) = (p3.x, p3.y, p3.z);

    let half_width = viewport.half_width;
    let half_height = viewport.half_height;

    let min_z = z1.min(z2).min(z3);
    let mut min_x = x1.min(x2).min(x3);
    let mut max_x = x1.max(x2).max(x3);
    let mut min_y = y1.min(y2).min(y3);
    let mut max_y = y1.max(y2).max(y3);

    // Triangles partially behind the camera are culled, not clipped, and
    // anything fully past one viewport edge is dropped here.
    if min_z <= 0.0
        || min_x >= half_width
        || max_x < -half_width
        || min_y >= half_height
        || max_y < -half_height
    {
        return;
    }

    // Signed edge-function area; its sign is the winding. Zero-area triangles
    // never pass, which keeps the divisions below safe.
    let area = (x2 - x1) * (y3 - y1) - (y2 - y1) * (x3 - x1);
    if !globals.backface_culling.passes(area) {
        return;
    }
    let area_sign = area.signum();
    let area_abs = area.abs();

    // Vertex weights pre-divided by depth and area, so the interpolated
    // reciprocal depth is just the sum of the corrected weights.
    let z1_inverse = 1.0 / (z1 * area_abs);
    let z2_inverse = 1.0 / (z2 * area_abs);
    let z3_inverse = 1.0 / (z3 * area_abs);

    min_x = min_x.max(-half_width).floor();
    max_x = max_x.min(half_width).ceil();
    min_y = min_y.max(-half_height).floor();
    max_y = max_y.min(half_height).ceil();

    let bounding_width = (max_x - min_x) as i32;
    let bounding_height = (max_y - min_y) as i32;

    // Edge-function increments, sign-corrected by the winding so the inside
    // test reads the same for both orientations. Scanning advances the three
    // numerators by plain addition - no per-pixel multiplies.
    let y2y3 = (y2 - y3) * area_sign;
    let x3x2 = (x3 - x2) * area_sign;
    let y3y1 = (y3 - y1) * area_sign;
    let x1x3 = (x1 - x3) * area_sign;
    let w3_step_x = y2y3 + y3y1;
    let w3_step_y = x3x2 + x1x3;

    let mut w1_column = y2y3 * (min_x - x3) + x3x2 * (min_y - y3);
    let mut w2_column = y3y1 * (min_x - x3) + x1x3 * (min_y - y3);
    let mut w3_column = area_abs - w1_column - w2_column;

    // Small additive tolerances against float leakage at shared edges.
    let [t1, t2, t3] = globals.edge_tolerance;
    w1_column += t1;
    w2_column += t2;
    w3_column += t3;

    let width = viewport.width as usize;
    let row_stride = width * 4;
    let mut column_index =
        (((min_x + half_width) as usize) + ((min_y + half_height) as usize) * width) * 4;

    let ambient = globals.ambient_intensity;
    let masks = globals.masks;
    let (color_plane, depth_plane) = framebuffer.planes_mut();
    let [a1, a2, a3] = triangle.attributes;

    for ix in 0..bounding_width {
        let mut index = column_index;
        let mut w1 = w1_column;
        let mut w2 = w2_column;
        let mut w3 = w3_column;

        for iy in 0..bounding_height {
            // A pixel is inside iff all three signed numerators are >= 0.
            if w1 >= 0.0 && w2 >= 0.0 && w3 >= 0.0 {
                let pixel = index / 4;
                let existing_depth = depth_plane[pixel];
                let existing_alpha = color_plane[index + 3] as f32;

                let cw1 = w1 * z1_inverse;
                let cw2 = w2 * z2_inverse;
                let cw3 = w3 * z3_inverse;
                let depth = 1.0 / (cw1 + cw2 + cw3);

                let (pw1, pw2, pw3) = attribute_weights(
                    object_settings.attribute_interpolation,
                    cw1,
                    cw2,
                    cw3,
                    depth,
                );

                let (mut red, mut green, mut blue, alpha) = match texture {
                    Some(texture) => {
                        let u = a1.uv.x * pw1 + a2.uv.x * pw2 + a3.uv.x * pw3;
                        let v = a1.uv.y * pw1 + a2.uv.y * pw2 + a3.uv.y * pw3;
                        let sample = texture.sample(u, v);
                        (
                            sample.r as f32,
                            sample.g as f32,
                            sample.b as f32,
                            sample.a as f32,
                        )
                    }
                    None => (
                        a1.color.r as f32 * pw1 + a2.color.r as f32 * pw2 + a3.color.r as f32 * pw3,
                        a1.color.g as f32 * pw1 + a2.color.g as f32 * pw2 + a3.color.g as f32 * pw3,
                        a1.color.b as f32 * pw1 + a2.color.b as f32 * pw2 + a3.color.b as f32 * pw3,
                        a1.color.a as f32 * pw1 + a2.color.a as f32 * pw2 + a3.color.a as f32 * pw3,
                    ),
                };

                let depth_pass = globals.depth_test.passes(existing_depth, depth);
                let coefficients = blend_coefficients(
                    depth_pass,
                    globals.use_transparency,
                    alpha,
                    existing_alpha,
                );

                if let Some((coeff_new, coeff_old)) = coefficients {
                    if object_settings.lighting {
                        let normal = match object_settings.normal_interpolation {
                            NormalInterpolation::PerspectiveCorrect => {
                                transform::normalize_or_zero(
                                    triangle.normals[0] * pw1
                                        + triangle.normals[1] * pw2
                                        + triangle.normals[2] * pw3,
                                )
                            }
                            NormalInterpolation::Linear => transform::normalize_or_zero(
                                (triangle.normals[0] * cw1
                                    + triangle.normals[1] * cw2
                                    + triangle.normals[2] * cw3)
                                    * depth,
                            ),
                        };

                        // Camera-space fragment position, recovered by undoing
                        // the projection at the interpolated depth.
                        let fragment = transform::unproject_fragment(
                            vector![min_x + ix as f32, min_y + iy as f32, depth],
                            camera.z_near,
                            viewport,
                        );
                        let to_origin = transform::normalize_or_zero(-fragment);

                        let (base_r, base_g, base_b) = (red, green, blue);
                        red = base_r * ambient;
                        green = base_g * ambient;
                        blue = base_b * ambient;

                        for light in lights {
                            let to_light =
                                transform::normalize_or_zero(light.position - fragment);
                            let n_dot_l = normal.dot(&to_light);
                            let reflection = normal * (2.0 * n_dot_l) - to_light;

                            let diffuse = n_dot_l.max(0.0).powf(light.diffuse_exponent)
                                * light.diffuse_intensity;
                            let specular = reflection.dot(&to_origin).max(0.0).powf(
                                light.specular_exponent,
                            ) * light.specular_intensity;

                            // Specular suppresses diffuse proportionally so a
                            // highlight replaces surface color, not adds to it.
                            let diffuse_coefficient = diffuse * (1.0 - specular);
                            red += base_r * diffuse_coefficient
                                + light.color.r as f32 * specular;
                            green += base_g * diffuse_coefficient
                                + light.color.g as f32 * specular;
                            blue += base_b * diffuse_coefficient
                                + light.color.b as f32 * specular;
                        }
                    }

                    if depth_pass && masks.depth {
                        depth_plane[pixel] = depth;
                    }

                    let mut out_alpha = alpha;
                    if globals.use_transparency {
                        red = red * coeff_new + color_plane[index] as f32 * coeff_old;
                        green = green * coeff_new + color_plane[index + 1] as f32 * coeff_old;
                        blue = blue * coeff_new + color_plane[index + 2] as f32 * coeff_old;
                        out_alpha = (coeff_new + coeff_old) * 255.0;
                    }

                    if masks.red {
                        color_plane[index] = red as u8;
                    }
                    if masks.green {
                        color_plane[index + 1] = green as u8;
                    }
                    if masks.blue {
                        color_plane[index + 2] = blue as u8;
                    }
                    if masks.alpha {
                        color_plane[index + 3] = out_alpha as u8;
                    }
                }
            }

            index += row_stride;
            w1 += x3x2;
            w2 += x1x3;
            w3 -= w3_step_y;
        }

        column_index += 4;
        w1_column += y2y3;
        w2_column += y3y1;
        w3_column -= w3_step_x;
    }
}
